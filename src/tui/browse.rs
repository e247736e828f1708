//! 主界面渲染：搜索栏、标签栏、包列表、详情 / PKGBUILD 面板

use super::input::render_search_box;
use super::layout::{main_layout, render_footer, render_scrollbar, wrapped_height};
use super::state::{App, Focus, Mode, Tab, ViewItem, ITEM_HEIGHT};
use super::theme::Theme;
use crate::package_manager::Package;
use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const TITLE: &str = " PACWARM ";
const LABEL_WIDTH: usize = 16;

pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.base).fg(theme.text));
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());

    let areas = main_layout(inner, app.geometry.list_width);

    render_header(f, app, theme, areas.header);
    f.render_widget(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.gray)),
        areas.rule,
    );
    render_tabs(f, app, theme, areas.tabs);
    render_list(f, app, theme, areas.list);
    f.render_widget(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(theme.gray)),
        areas.separator,
    );
    render_detail(f, app, theme, areas.detail);
    render_status_bar(f, app, theme, areas.footer);
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let badge_width = TITLE.width() as u16;
    let badge = Rect { width: badge_width.min(area.width), ..area };
    let search = Rect {
        x: area.x + badge.width + 1,
        width: area.width.saturating_sub(badge.width + 1),
        ..area
    };

    f.render_widget(
        Paragraph::new(Span::styled(
            TITLE,
            Style::default()
                .fg(theme.base)
                .bg(theme.header)
                .add_modifier(Modifier::BOLD),
        )),
        badge,
    );
    render_search_box(f, &app.input, theme, app.mode == Mode::Searching, search);
}

fn render_tabs(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let spans: Vec<Span> = Tab::ALL
        .iter()
        .map(|tab| {
            let style = if *tab == app.tab {
                Style::default()
                    .fg(theme.base)
                    .bg(theme.focus)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.gray)
            };
            Span::styled(format!(" {} ", tab.title()), style)
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ===== 列表 =====

fn render_list(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    if app.visible.is_empty() {
        let (msg, color) = if app.loading {
            ("Searching...", theme.yellow)
        } else {
            ("No Packages Found", theme.red)
        };
        let y = area.y + area.height / 2;
        f.render_widget(
            Paragraph::new(Span::styled(
                msg,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Rect { y, height: 1, ..area },
        );
        return;
    }

    let page = (area.height as usize / ITEM_HEIGHT).max(1);
    let mut lines = Vec::with_capacity(page * ITEM_HEIGHT);
    for (pos, item) in app
        .view_items()
        .enumerate()
        .skip(app.list_offset)
        .take(page)
    {
        let selected = pos == app.selected;
        lines.extend(list_item(item, theme, selected, app.focus == Focus::List));
        lines.push(Line::default());
    }

    let list_area = area.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    f.render_widget(Paragraph::new(lines), list_area);
    render_scrollbar(
        f,
        theme,
        app.focus == Focus::List,
        app.visible.len() * ITEM_HEIGHT,
        app.selected * ITEM_HEIGHT,
        area,
    );
}

/// 列表中的一项：安装标记 + 高亮包名，第二行来源和版本
fn list_item(item: ViewItem, theme: &Theme, selected: bool, focused: bool) -> [Line<'static>; 2] {
    let pkg = item.package;
    let repo_color = theme.repo_color(pkg.source);
    let (marker, marker_style) = if selected {
        let color = if focused { theme.focus } else { theme.gray };
        ("▌", Style::default().fg(color))
    } else {
        (" ", Style::default())
    };
    let icon = if pkg.installed { "✓" } else { " " };

    let name_style = Style::default().fg(repo_color).add_modifier(Modifier::BOLD);
    let match_style = Style::default()
        .fg(theme.yellow)
        .bg(theme.base)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut title = vec![
        Span::styled(marker, marker_style),
        Span::styled(format!("{icon} "), Style::default().fg(repo_color)),
    ];
    title.extend(highlight_match(&pkg.name, item.query, name_style, match_style));

    let subtitle = Line::from(vec![
        Span::styled(marker, marker_style),
        Span::raw("  "),
        Span::styled(pkg.source.label(), Style::default().fg(repo_color)),
        Span::styled(
            format!(" | {}", pkg.version),
            Style::default().fg(if selected { theme.text } else { theme.gray }),
        ),
    ]);

    let mut title = Line::from(title);
    if selected {
        title = title.style(Style::default().bg(theme.highlight));
    }
    [title, subtitle]
}

/// 把包名中第一次出现的关键词（忽略大小写）单独高亮
fn highlight_match(name: &str, query: &str, base: Style, hit: Style) -> Vec<Span<'static>> {
    let lower_name = name.to_lowercase();
    let lower_query = query.to_lowercase();
    if !query.is_empty() && lower_name.len() == name.len() {
        if let Some(start) = lower_name.find(&lower_query) {
            let end = start + lower_query.len();
            if name.is_char_boundary(start) && name.is_char_boundary(end) {
                return vec![
                    Span::styled(name[..start].to_string(), base),
                    Span::styled(name[start..end].to_string(), hit),
                    Span::styled(name[end..].to_string(), base),
                ];
            }
        }
    }
    vec![Span::styled(name.to_string(), base)]
}

// ===== 详情 =====

fn render_detail(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let padded = area.inner(Margin {
        horizontal: 2,
        vertical: 0,
    });
    let lines = detail_lines(app, theme);
    let total = wrapped_height(&lines, padded.width as usize);

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.detail_scroll.min(u16::MAX as usize) as u16, 0)),
        padded,
    );
    render_scrollbar(
        f,
        theme,
        app.focus == Focus::Detail,
        total,
        app.detail_scroll,
        area,
    );
}

/// 详情面板当前内容的行数（折行后），主循环用来收敛滚动位置
pub fn detail_height(app: &App) -> usize {
    let width = app.geometry.detail_width.saturating_sub(4);
    wrapped_height(&detail_lines(app, &app.theme), width)
}

fn detail_lines(app: &App, theme: &Theme) -> Vec<Line<'static>> {
    match app.selected_package() {
        None => Vec::new(),
        Some(pkg) if app.showing_pkgbuild => pkgbuild_lines(pkg, theme),
        Some(pkg) => description_lines(pkg, theme),
    }
}

fn description_lines(pkg: &Package, theme: &Theme) -> Vec<Line<'static>> {
    let header_style = Style::default()
        .fg(theme.repo_color(pkg.source))
        .bg(theme.base)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(format!(" {} ", pkg.name), header_style)),
        Line::default(),
    ];

    if !pkg.detailed {
        lines.push(Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(theme.gray),
        )));
        return lines;
    }

    let row = |key: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{key:<width$}", width = LABEL_WIDTH),
                Style::default().fg(theme.gray).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" : ", Style::default().fg(theme.gray)),
            Span::styled(value, Style::default().fg(theme.text)),
        ])
    };
    let d = &pkg.details;

    if pkg.is_aur() {
        let mut push = |key: &str, value: String| {
            if !value.is_empty() {
                lines.push(row(key, value));
            }
        };
        push("Repository", "AUR".into());
        push("Version", pkg.version.clone());
        push("Description", pkg.description.clone());
        push("URL", pkg.url.clone());
        push("Maintainer", pkg.maintainer.clone());
        push("Votes", format!("{} (Pop: {:.2})", pkg.votes, d.popularity));
        push("Keywords", d.keywords.join("  "));
        push("Licenses", d.licenses.join("  "));
        push("Submitted", short_date(d.first_submitted));
        push("Last Modified", short_date(pkg.last_modified));

        if !d.depends.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Dependencies",
                Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                d.depends.join("  "),
                Style::default().fg(theme.text),
            )));
        }
        for (key, deps) in [
            ("Make Deps", &d.make_depends),
            ("Check Deps", &d.check_depends),
            ("Optional Deps", &d.opt_depends),
        ] {
            if !deps.is_empty() {
                lines.push(row(key, deps.join("  ")));
            }
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "[ PKGBUILD ]",
            Style::default().fg(theme.gray),
        )));
    } else {
        let list = |values: &[String]| {
            if values.is_empty() {
                "None".to_string()
            } else {
                values.join("  ")
            }
        };

        lines.push(row("Name", pkg.name.clone()));
        lines.push(row("Version", pkg.version.clone()));
        lines.push(row("Description", pkg.description.clone()));
        lines.push(row("Architecture", d.architecture.clone()));
        lines.push(row("URL", pkg.url.clone()));
        lines.push(row("Licenses", list(&d.licenses)));
        lines.push(row("Groups", list(&d.groups)));
        lines.push(row("Provides", list(&d.provides)));
        lines.push(row("Depends On", list(&d.depends)));
        lines.push(row("Optional Deps", list(&d.opt_depends)));
        lines.push(row("Required By", list(&d.required_by)));
        lines.push(row("Conflicts With", list(&d.conflicts)));
        lines.push(row("Replaces", list(&d.replaces)));
        lines.push(row("Download Size", d.download_size.clone()));
        lines.push(row("Installed Size", d.installed_size.clone()));
        lines.push(row("Packager", d.packager.clone()));
        lines.push(row("Build Date", long_date(d.build_date)));
        lines.push(row("Install Date", long_date(d.install_date)));
        lines.push(row("Install Reason", d.install_reason.clone()));
        lines.push(row("Validated By", d.validated_by.clone()));
    }

    lines
}

fn pkgbuild_lines(pkg: &Package, theme: &Theme) -> Vec<Line<'static>> {
    let text_style = Style::default().fg(theme.text);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("PKGBUILD for {}", pkg.name),
                Style::default().fg(theme.orange).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (Press 'p' to go back)", Style::default().fg(theme.gray)),
        ]),
        Line::default(),
    ];

    match pkg.details.pkgbuild.as_deref().filter(|s| !s.is_empty()) {
        None => lines.push(Line::from(Span::styled(
            "Loading PKGBUILD or not available...",
            text_style,
        ))),
        Some(script) => {
            for line in script.lines() {
                let styled = if line.trim_start().starts_with('#') {
                    Line::from(Span::styled(line.to_string(), Style::default().fg(theme.gray)))
                } else if let Some((key, value)) = line.split_once('=') {
                    Line::from(vec![
                        Span::styled(key.to_string(), Style::default().fg(theme.blue)),
                        Span::styled("=", text_style),
                        Span::styled(value.to_string(), text_style),
                    ])
                } else {
                    Line::from(Span::styled(line.to_string(), text_style))
                };
                lines.push(styled);
            }
        }
    }
    lines
}

/// YYYY-MM-DD，时间戳为 0 时返回空串
fn short_date(ts: i64) -> String {
    if ts <= 0 {
        return String::new();
    }
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// pacman 风格的完整日期，0 显示为 None
fn long_date(ts: i64) -> String {
    if ts == 0 {
        return "None".to_string();
    }
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%a %d %b %Y %I:%M:%S %p %Z").to_string())
        .unwrap_or_else(|| "None".to_string())
}

// ===== 底栏 =====

fn render_status_bar(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let hints: &[(&str, &str)] = match app.mode {
        Mode::Searching => &[("Enter", "search"), ("Esc", "browse"), ("Ctrl+C", "quit")],
        Mode::Browsing => &[
            ("/", "search"),
            ("Tab", "focus"),
            ("j/k", "move"),
            ("Ctrl+H/L", "tabs"),
            ("p", "PKGBUILD"),
            ("Enter", "install/remove"),
            ("q", "quit"),
        ],
    };
    let right = format!(
        "{} · {}/{} pkgs",
        app.helper().name(),
        app.visible.len(),
        app.packages.len()
    );
    render_footer(f, theme, hints, app.status.as_deref(), &right, area);
}

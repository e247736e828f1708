use super::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// 外框内的区域划分
pub struct Areas {
    pub header: Rect,
    pub rule: Rect,
    pub tabs: Rect,
    pub list: Rect,
    pub separator: Rect,
    pub detail: Rect,
    pub footer: Rect,
}

/// Header(1) + 分隔线(1) + 标签栏(1) + 空行(1) + 面板(弹性) + Footer(1)
pub fn main_layout(inner: Rect, list_width: usize) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(list_width as u16),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(rows[4]);

    Areas {
        header: rows[0],
        rule: rows[1],
        tabs: rows[2],
        list: columns[0],
        separator: columns[1],
        detail: columns[2],
        footer: rows[5],
    }
}

/// 底栏：左侧按键提示或状态消息，右侧附加信息
pub fn render_footer(
    f: &mut Frame,
    theme: &Theme,
    hints: &[(&str, &str)],
    status: Option<&str>,
    right: &str,
    area: Rect,
) {
    let left = match status {
        Some(msg) => Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
        )),
        None => {
            let mut spans = vec![Span::raw(" ")];
            for (i, (key, action)) in hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" · ", Style::default().fg(theme.border)));
                }
                spans.push(Span::styled(
                    key.to_string(),
                    Style::default().fg(theme.focus).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" {action}"),
                    Style::default().fg(theme.gray),
                ));
            }
            Line::from(spans)
        }
    };

    f.render_widget(Paragraph::new(left), area);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("{right} "),
            Style::default().fg(theme.gray),
        )))
        .alignment(Alignment::Right),
        area,
    );
}

/// 内容超出可见高度时在区域右侧画滚动条
pub fn render_scrollbar(
    f: &mut Frame,
    theme: &Theme,
    focused: bool,
    total: usize,
    position: usize,
    area: Rect,
) {
    if total <= area.height as usize {
        return;
    }
    let color = if focused { theme.focus } else { theme.border };
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(Style::default().fg(color));

    let mut scrollbar_state = ScrollbarState::new(total).position(position);

    f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
}

/// 按宽度折行后的大致行数，用于滚动边界
pub fn wrapped_height(lines: &[Line], width: usize) -> usize {
    let width = width.max(1);
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

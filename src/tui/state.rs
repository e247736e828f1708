use super::input::SearchInput;
use super::theme::Theme;
use crate::package_manager::actions::build_command;
use crate::package_manager::search::mark_installed;
use crate::package_manager::{AurHelper, CommandSpec, Package, Source};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// 最后一次编辑后多久触发自动搜索
pub const DEBOUNCE: Duration = Duration::from_millis(250);
/// Tick 间隔
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Ctrl+D / Ctrl+U 在列表中移动的条数
const JUMP: usize = 6;
/// 鼠标滚轮在详情面板滚动的行数
const WHEEL_LINES: usize = 3;
/// 列表中每个包占的行数（两行内容 + 一行间隔）
pub const ITEM_HEIGHT: usize = 3;

// ========== 枚举 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Searching,
    Browsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    All,
    Aur,
    Official,
    Installed,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::All, Tab::Aur, Tab::Official, Tab::Installed];

    pub fn title(self) -> &'static str {
        match self {
            Tab::All => "ALL",
            Tab::Aur => "AUR",
            Tab::Official => "OFFICIAL",
            Tab::Installed => "INSTALLED",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    pub fn matches(self, pkg: &Package) -> bool {
        match self {
            Tab::All => true,
            Tab::Aur => pkg.source == Source::Aur,
            Tab::Official => pkg.source == Source::Official,
            Tab::Installed => pkg.installed,
        }
    }
}

// ========== 事件 / 任务 ==========

#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick(Instant),
    SearchFinished { seq: u64, packages: Vec<Package> },
    InstalledRefreshed(HashSet<String>),
    DetailsLoaded(Package),
    DetailsFailed { name: String },
    PkgbuildLoaded { name: String, text: String },
    PkgbuildFailed { name: String },
}

/// 状态机产出、由主循环执行的副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Search { query: String, seq: u64 },
    FetchDetails(Package),
    FetchPkgbuild(String),
    Execute(CommandSpec),
    RefreshInstalled,
    Quit,
}

/// 列表显示项：记录 + 当前关键词（用于高亮）
#[derive(Debug, Clone, Copy)]
pub struct ViewItem<'a> {
    pub package: &'a Package,
    pub query: &'a str,
}

// ========== 布局尺寸 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    /// 列表 / 详情面板高度
    pub panel_height: usize,
    /// 外框内宽度
    pub inner_width: usize,
    pub list_width: usize,
    pub detail_width: usize,
}

impl Geometry {
    pub fn new(width: u16, height: u16) -> Self {
        let panel_height = (height as usize).saturating_sub(7).max(5);
        let inner_width = (width as usize).saturating_sub(2).max(10);
        let list_width = inner_width * 35 / 100;
        // 中间一列分隔线
        let detail_width = inner_width.saturating_sub(list_width + 1);
        Self {
            width,
            height,
            panel_height,
            inner_width,
            list_width,
            detail_width,
        }
    }

    /// 屏幕列坐标是否落在列表面板（含左边框和分隔线）
    pub fn in_list(&self, column: u16) -> bool {
        (column as usize) < self.list_width + 2
    }

    /// 列表一页能放下的包数
    pub fn page_size(&self) -> usize {
        (self.panel_height / ITEM_HEIGHT).max(1)
    }
}

// ========== App ==========

pub struct App<'a> {
    helper: &'a AurHelper,
    pub theme: Theme,
    pub mode: Mode,
    pub focus: Focus,
    pub tab: Tab,
    pub input: SearchInput,
    /// 最近一次编辑搜索框的时间
    edited_at: Option<Instant>,
    /// 最近一次发出搜索的关键词，也用于列表高亮
    pub current_query: String,
    /// Enter 提交后等待结果，期间忽略编辑
    submit_pending: bool,
    seq: u64,
    pub loading: bool,

    /// 当前结果集（未过滤）
    pub packages: Vec<Package>,
    /// 当前标签页可见的记录下标
    pub visible: Vec<usize>,
    /// 在 visible 中的选中位置
    pub selected: usize,
    pub list_offset: usize,
    last_selected: Option<(String, Source)>,

    pub showing_pkgbuild: bool,
    pub detail_scroll: usize,
    details_in_flight: HashSet<String>,
    pkgbuild_in_flight: HashSet<String>,

    pub geometry: Geometry,
    pub status: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(helper: &'a AurHelper, width: u16, height: u16) -> Self {
        Self {
            helper,
            theme: Theme::default(),
            mode: Mode::Searching,
            focus: Focus::List,
            tab: Tab::All,
            input: SearchInput::new(),
            edited_at: None,
            current_query: String::new(),
            submit_pending: false,
            seq: 0,
            loading: false,
            packages: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            list_offset: 0,
            last_selected: None,
            showing_pkgbuild: false,
            detail_scroll: 0,
            details_in_flight: HashSet::new(),
            pkgbuild_in_flight: HashSet::new(),
            geometry: Geometry::new(width, height),
            status: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn helper(&self) -> &AurHelper {
        self.helper
    }

    pub fn selected_package(&self) -> Option<&Package> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.packages.get(i))
    }

    pub fn visible_packages(&self) -> impl Iterator<Item = &Package> {
        let packages = &self.packages;
        self.visible.iter().filter_map(move |&i| packages.get(i))
    }

    pub fn view_items(&self) -> impl Iterator<Item = ViewItem<'_>> {
        let query = self.current_query.as_str();
        self.visible_packages()
            .map(move |package| ViewItem { package, query })
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// 详情滚动不超过内容末尾
    pub fn clamp_detail_scroll(&mut self, total_lines: usize) {
        let max = total_lines.saturating_sub(self.geometry.panel_height);
        self.detail_scroll = self.detail_scroll.min(max);
    }

    /// 处理一个事件，返回需要主循环执行的任务
    pub fn handle(&mut self, event: AppEvent, now: Instant) -> Vec<Task> {
        let mut tasks = Vec::new();

        match event {
            AppEvent::Input(Event::Key(key)) => self.handle_key(key, now, &mut tasks),
            AppEvent::Input(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppEvent::Input(Event::Resize(w, h)) => {
                self.geometry = Geometry::new(w, h);
                self.keep_selection_visible();
            }
            AppEvent::Input(_) => {}
            AppEvent::Tick(at) => {
                if let Some(task) = self.debounced_search(at) {
                    tasks.push(task);
                }
            }
            AppEvent::SearchFinished { seq, packages } => self.apply_results(seq, packages),
            AppEvent::InstalledRefreshed(installed) => {
                mark_installed(&mut self.packages, &installed);
                self.refresh_visible();
            }
            AppEvent::DetailsLoaded(pkg) => self.merge_details(pkg),
            AppEvent::DetailsFailed { name } => {
                log::debug!("details for {name} failed, will retry on reselect");
                self.details_in_flight.remove(&name);
            }
            AppEvent::PkgbuildLoaded { name, text } => {
                self.pkgbuild_in_flight.remove(&name);
                for pkg in self.packages.iter_mut().filter(|p| p.name == name && p.is_aur()) {
                    pkg.details.pkgbuild = Some(text.clone());
                }
            }
            AppEvent::PkgbuildFailed { name } => {
                self.pkgbuild_in_flight.remove(&name);
            }
        }

        self.sync_selection(&mut tasks);
        tasks
    }

    // ===== 搜索 =====

    fn start_search(&mut self, query: &str) -> Task {
        let query = query.trim().to_string();
        self.seq += 1;
        self.current_query = query.clone();
        self.loading = true;
        Task::Search {
            query,
            seq: self.seq,
        }
    }

    fn debounced_search(&mut self, now: Instant) -> Option<Task> {
        if self.mode != Mode::Searching || self.submit_pending || self.input.is_blank() {
            return None;
        }
        if self.input.text().trim() == self.current_query {
            return None;
        }
        let edited_at = self.edited_at?;
        if now.saturating_duration_since(edited_at) < DEBOUNCE {
            return None;
        }
        let query = self.input.text().to_string();
        Some(self.start_search(&query))
    }

    fn apply_results(&mut self, seq: u64, packages: Vec<Package>) {
        if seq != self.seq {
            log::debug!("dropping stale results (seq {seq}, latest {})", self.seq);
            return;
        }
        self.loading = false;
        self.packages = packages;
        self.selected = 0;
        self.list_offset = 0;
        // 新结果集的首项视为新的选中项
        self.last_selected = None;
        if self.submit_pending {
            self.submit_pending = false;
            self.mode = Mode::Browsing;
            self.focus = Focus::List;
        }
        self.refresh_visible();
    }

    // ===== 详情 =====

    fn merge_details(&mut self, loaded: Package) {
        self.details_in_flight.remove(&loaded.name);
        for pkg in self.packages.iter_mut().filter(|p| p.name == loaded.name) {
            let installed = pkg.installed;
            let pkgbuild = pkg.details.pkgbuild.take();
            *pkg = loaded.clone();
            pkg.installed = installed;
            if pkg.details.pkgbuild.is_none() {
                pkg.details.pkgbuild = pkgbuild;
            }
        }
    }

    /// 选中项变化时重置详情面板，必要时请求详情
    fn sync_selection(&mut self, tasks: &mut Vec<Task>) {
        let Some(pkg) = self.selected_package() else {
            self.last_selected = None;
            return;
        };
        let key = (pkg.name.clone(), pkg.source);
        if self.last_selected.as_ref() == Some(&key) {
            return;
        }

        let fetch = (!pkg.detailed && !self.details_in_flight.contains(&pkg.name))
            .then(|| pkg.clone());

        self.last_selected = Some(key);
        self.showing_pkgbuild = false;
        self.detail_scroll = 0;

        if let Some(pkg) = fetch {
            self.details_in_flight.insert(pkg.name.clone());
            tasks.push(Task::FetchDetails(pkg));
        }
    }

    fn toggle_pkgbuild(&mut self, tasks: &mut Vec<Task>) {
        let Some(pkg) = self.selected_package() else {
            return;
        };
        if !pkg.is_aur() {
            return;
        }
        let needs_fetch =
            pkg.details.pkgbuild.is_none() && !self.pkgbuild_in_flight.contains(&pkg.name);
        let name = pkg.name.clone();

        self.showing_pkgbuild = !self.showing_pkgbuild;
        self.detail_scroll = 0;
        self.focus = if self.showing_pkgbuild {
            Focus::Detail
        } else {
            Focus::List
        };

        if self.showing_pkgbuild && needs_fetch {
            self.pkgbuild_in_flight.insert(name.clone());
            tasks.push(Task::FetchPkgbuild(name));
        }
    }

    // ===== 列表 =====

    /// 根据标签页重新计算可见列表，保留选中位置
    fn refresh_visible(&mut self) {
        let tab = self.tab;
        self.visible = self
            .packages
            .iter()
            .enumerate()
            .filter(|(_, p)| tab.matches(p))
            .map(|(i, _)| i)
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
        self.keep_selection_visible();
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.visible.len().saturating_sub(1));
        self.keep_selection_visible();
    }

    fn move_down(&mut self, n: usize) {
        self.select(self.selected.saturating_add(n));
    }

    fn move_up(&mut self, n: usize) {
        self.select(self.selected.saturating_sub(n));
    }

    fn keep_selection_visible(&mut self) {
        let page = self.geometry.page_size();
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        } else if self.selected >= self.list_offset + page {
            self.list_offset = self.selected + 1 - page;
        }
    }

    fn scroll_detail_down(&mut self, n: usize) {
        self.detail_scroll = self.detail_scroll.saturating_add(n);
    }

    fn scroll_detail_up(&mut self, n: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(n);
    }

    // ===== 输入 =====

    fn handle_key(&mut self, key: KeyEvent, now: Instant, tasks: &mut Vec<Task>) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // 全局按键
        match key.code {
            KeyCode::Char('c') if ctrl => {
                tasks.push(Task::Quit);
                return;
            }
            KeyCode::Char('l') if ctrl => {
                self.tab = self.tab.next();
                self.refresh_visible();
                return;
            }
            KeyCode::Char('h') if ctrl => {
                self.tab = self.tab.prev();
                self.refresh_visible();
                return;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::List => Focus::Detail,
                    Focus::Detail => Focus::List,
                };
                return;
            }
            _ => {}
        }

        match self.mode {
            Mode::Searching => self.handle_search_key(key, now, tasks),
            Mode::Browsing => self.handle_browse_key(key, tasks),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant, tasks: &mut Vec<Task>) {
        if key.code == KeyCode::Esc {
            self.mode = Mode::Browsing;
            self.submit_pending = false;
            return;
        }
        // 提交后等待结果
        if self.submit_pending {
            return;
        }

        let edited = match key.code {
            KeyCode::Enter => {
                if self.input.is_blank() {
                    self.mode = Mode::Browsing;
                } else {
                    self.submit_pending = true;
                    let query = self.input.text().to_string();
                    tasks.push(self.start_search(&query));
                }
                false
            }
            KeyCode::Char(c) => {
                // 忽略带 Ctrl/Alt 修饰的字符
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    || key.modifiers.contains(KeyModifiers::ALT)
                {
                    return;
                }
                self.input.insert(c);
                true
            }
            KeyCode::Backspace => self.input.delete_back(),
            KeyCode::Delete => self.input.delete_forward(),
            KeyCode::Left => {
                self.input.move_left();
                false
            }
            KeyCode::Right => {
                self.input.move_right();
                false
            }
            KeyCode::Home => {
                self.input.move_home();
                false
            }
            KeyCode::End => {
                self.input.move_end();
                false
            }
            _ => false,
        };

        if edited {
            self.edited_at = Some(now);
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent, tasks: &mut Vec<Task>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let half_page = (self.geometry.panel_height / 2).max(1);
        let page = self.geometry.page_size();
        let on_list = self.focus == Focus::List;

        match key.code {
            KeyCode::Char('q') => tasks.push(Task::Quit),
            KeyCode::Char('/') => {
                self.mode = Mode::Searching;
                self.status = None;
            }
            KeyCode::Char('p') => self.toggle_pkgbuild(tasks),
            KeyCode::Enter => {
                if let Some(pkg) = self.selected_package() {
                    tasks.push(Task::Execute(build_command(pkg, self.helper)));
                    // 无论命令成败都刷新安装状态
                    tasks.push(Task::RefreshInstalled);
                }
            }

            KeyCode::Char('d') if ctrl => {
                if on_list {
                    self.move_down(JUMP);
                } else {
                    self.scroll_detail_down(half_page);
                }
            }
            KeyCode::Char('u') if ctrl => {
                if on_list {
                    self.move_up(JUMP);
                } else {
                    self.scroll_detail_up(half_page);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if on_list {
                    self.move_down(1);
                } else {
                    self.scroll_detail_down(1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if on_list {
                    self.move_up(1);
                } else {
                    self.scroll_detail_up(1);
                }
            }
            KeyCode::Char('g') | KeyCode::Home => {
                if on_list {
                    self.select(0);
                } else {
                    self.detail_scroll = 0;
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if on_list {
                    self.select(usize::MAX);
                } else {
                    // 由主循环按内容长度收敛到末尾
                    self.detail_scroll = usize::MAX;
                }
            }
            KeyCode::PageDown => {
                if on_list {
                    self.move_down(page);
                } else {
                    self.scroll_detail_down(self.geometry.panel_height);
                }
            }
            KeyCode::PageUp => {
                if on_list {
                    self.move_up(page);
                } else {
                    self.scroll_detail_up(self.geometry.panel_height);
                }
            }
            // h / l 翻页列表
            KeyCode::Char('l') | KeyCode::Right => self.move_down(page),
            KeyCode::Char('h') | KeyCode::Left => self.move_up(page),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let on_list = self.geometry.in_list(mouse.column);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.focus = if on_list { Focus::List } else { Focus::Detail };
            }
            MouseEventKind::ScrollDown => {
                if on_list {
                    self.move_down(1);
                } else {
                    self.scroll_detail_down(WHEEL_LINES);
                }
            }
            MouseEventKind::ScrollUp => {
                if on_list {
                    self.move_up(1);
                } else {
                    self.scroll_detail_up(WHEEL_LINES);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn official(name: &str) -> Package {
        Package::official(name, "1.0-1", "")
    }

    fn aur(name: &str) -> Package {
        Package {
            name: name.to_string(),
            source: Source::Aur,
            ..Default::default()
        }
    }

    fn type_text(app: &mut App, text: &str, at: Instant) -> Vec<Task> {
        text.chars()
            .flat_map(|c| app.handle(key(KeyCode::Char(c)), at))
            .collect()
    }

    /// 提交一次搜索并把结果送回，进入浏览模式
    fn browse_with(app: &mut App, packages: Vec<Package>) -> Vec<Task> {
        let t0 = Instant::now();
        type_text(app, "q", t0);
        let tasks = app.handle(key(KeyCode::Enter), t0);
        let Some(Task::Search { seq, .. }) = tasks.first().cloned() else {
            panic!("expected search task, got {tasks:?}");
        };
        app.handle(AppEvent::SearchFinished { seq, packages }, t0)
    }

    fn searches(tasks: &[Task]) -> Vec<String> {
        tasks
            .iter()
            .filter_map(|t| match t {
                Task::Search { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    fn fetches(tasks: &[Task]) -> usize {
        tasks
            .iter()
            .filter(|t| matches!(t, Task::FetchDetails(_)))
            .count()
    }

    #[test]
    fn geometry_follows_terminal_size() {
        let g = Geometry::new(100, 40);
        assert_eq!(g.panel_height, 33);
        assert_eq!(g.inner_width, 98);
        assert_eq!(g.list_width, 34);

        let tiny = Geometry::new(5, 3);
        assert_eq!(tiny.panel_height, 5);
        assert_eq!(tiny.inner_width, 10);
        assert_eq!(tiny.list_width, 3);
    }

    #[test]
    fn debounce_emits_one_search_for_final_value() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();

        app.handle(key(KeyCode::Char('g')), t0);
        app.handle(key(KeyCode::Char('i')), t0 + Duration::from_millis(50));
        app.handle(key(KeyCode::Char('t')), t0 + Duration::from_millis(120));

        let mut tasks = Vec::new();
        for ms in [100, 200, 300, 400, 500, 600] {
            let at = t0 + Duration::from_millis(ms);
            tasks.extend(app.handle(AppEvent::Tick(at), at));
        }

        assert_eq!(searches(&tasks), vec!["git"]);
        assert_eq!(app.current_query, "git");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_from_queries() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        type_text(&mut app, "git ", t0);

        let mut tasks = Vec::new();
        for ms in [300, 400, 500] {
            let at = t0 + Duration::from_millis(ms);
            tasks.extend(app.handle(AppEvent::Tick(at), at));
        }
        // 去掉空白后与上次查询相同，不再重复发起
        assert_eq!(searches(&tasks), vec!["git"]);

        let tasks = app.handle(key(KeyCode::Enter), t0);
        assert_eq!(searches(&tasks), vec!["git"]);
    }

    #[test]
    fn no_search_for_blank_buffer_or_outside_search_mode() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        type_text(&mut app, "  ", t0);
        let later = t0 + Duration::from_secs(1);
        assert!(app.handle(AppEvent::Tick(later), later).is_empty());

        app.handle(key(KeyCode::Backspace), t0);
        app.handle(key(KeyCode::Backspace), t0);
        type_text(&mut app, "vim", t0);
        app.handle(key(KeyCode::Esc), t0);
        assert_eq!(app.mode, Mode::Browsing);
        assert!(app.handle(AppEvent::Tick(later), later).is_empty());
    }

    #[test]
    fn enter_submits_and_matching_result_switches_to_browsing() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        type_text(&mut app, "git", t0);

        let tasks = app.handle(key(KeyCode::Enter), t0);
        assert_eq!(
            tasks,
            vec![Task::Search {
                query: "git".into(),
                seq: 1
            }]
        );
        assert_eq!(app.mode, Mode::Searching);

        // 等待结果期间编辑被忽略
        app.handle(key(KeyCode::Char('x')), t0);
        assert_eq!(app.input.text(), "git");

        let tasks = app.handle(
            AppEvent::SearchFinished {
                seq: 1,
                packages: vec![official("git")],
            },
            t0,
        );
        assert_eq!(app.mode, Mode::Browsing);
        assert_eq!(app.selected_package().map(|p| p.name.as_str()), Some("git"));
        assert_eq!(fetches(&tasks), 1);
    }

    #[test]
    fn enter_on_empty_buffer_leaves_search_mode() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let tasks = app.handle(key(KeyCode::Enter), Instant::now());
        assert!(tasks.is_empty());
        assert_eq!(app.mode, Mode::Browsing);
    }

    #[test]
    fn stale_results_are_ignored() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        type_text(&mut app, "gi", t0);
        let at = t0 + DEBOUNCE;
        assert_eq!(searches(&app.handle(AppEvent::Tick(at), at)), vec!["gi"]);
        type_text(&mut app, "t", at);
        let later = at + DEBOUNCE;
        assert_eq!(searches(&app.handle(AppEvent::Tick(later), later)), vec!["git"]);

        app.handle(
            AppEvent::SearchFinished {
                seq: 1,
                packages: vec![official("gimp")],
            },
            later,
        );
        assert!(app.packages.is_empty());

        app.handle(
            AppEvent::SearchFinished {
                seq: 2,
                packages: vec![official("git")],
            },
            later,
        );
        assert_eq!(app.packages.len(), 1);
        assert!(!app.loading);
    }

    #[test]
    fn details_requested_once_per_selection() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        let tasks = browse_with(&mut app, vec![official("git"), official("gitg")]);
        assert_eq!(fetches(&tasks), 1);

        // 在途时重新选中不会重复请求
        assert_eq!(fetches(&app.handle(key(KeyCode::Char('j')), t0)), 1);
        assert_eq!(fetches(&app.handle(key(KeyCode::Char('k')), t0)), 0);

        let mut loaded = official("git");
        loaded.detailed = true;
        app.handle(AppEvent::DetailsLoaded(loaded), t0);
        assert!(app.packages[0].detailed);

        // 已加载详情的记录不再请求
        app.handle(key(KeyCode::Char('j')), t0);
        assert_eq!(fetches(&app.handle(key(KeyCode::Char('k')), t0)), 0);
    }

    #[test]
    fn failed_details_are_retried_on_reselect() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        browse_with(&mut app, vec![official("git"), official("tig")]);
        app.handle(key(KeyCode::Char('j')), t0);

        app.handle(
            AppEvent::DetailsFailed {
                name: "git".into(),
            },
            t0,
        );
        assert!(!app.packages[0].detailed);

        let tasks = app.handle(key(KeyCode::Char('k')), t0);
        assert_eq!(tasks, vec![Task::FetchDetails(official("git"))]);
    }

    #[test]
    fn details_merge_keeps_installed_flag() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        let mut git = official("git");
        git.installed = true;
        browse_with(&mut app, vec![git]);

        let mut loaded = official("git");
        loaded.detailed = true;
        loaded.details.architecture = "x86_64".into();
        app.handle(AppEvent::DetailsLoaded(loaded), t0);

        assert!(app.packages[0].installed);
        assert_eq!(app.packages[0].details.architecture, "x86_64");

        // 未知包名不做任何事
        app.handle(AppEvent::DetailsLoaded(official("ghost")), t0);
        assert_eq!(app.packages.len(), 1);
    }

    #[test]
    fn tabs_filter_without_losing_records() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        let mut vim = official("vim");
        vim.installed = true;
        browse_with(&mut app, vec![official("git"), vim, aur("yay")]);

        let names = |app: &App| -> Vec<String> {
            app.visible_packages().map(|p| p.name.clone()).collect()
        };

        app.handle(ctrl('l'), t0);
        assert_eq!(app.tab, Tab::Aur);
        assert_eq!(names(&app), vec!["yay"]);

        app.handle(ctrl('l'), t0);
        assert_eq!(names(&app), vec!["git", "vim"]);

        app.handle(ctrl('l'), t0);
        assert_eq!(names(&app), vec!["vim"]);

        app.handle(ctrl('l'), t0);
        assert_eq!(app.tab, Tab::All);
        assert_eq!(names(&app), vec!["git", "vim", "yay"]);

        app.handle(ctrl('h'), t0);
        assert_eq!(app.tab, Tab::Installed);
        assert_eq!(app.packages.len(), 3);
    }

    #[test]
    fn installed_refresh_updates_flags_and_filter() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        browse_with(&mut app, vec![official("git"), aur("yay")]);
        app.handle(ctrl('h'), t0);
        assert!(app.visible.is_empty());

        let installed: HashSet<String> = ["yay".to_string()].into_iter().collect();
        app.handle(AppEvent::InstalledRefreshed(installed), t0);

        assert!(!app.packages[0].installed);
        assert!(app.packages[1].installed);
        assert_eq!(app.selected_package().map(|p| p.name.as_str()), Some("yay"));
    }

    #[test]
    fn pkgbuild_toggle_fetches_once_and_moves_focus() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        browse_with(&mut app, vec![aur("yay"), official("git")]);

        let tasks = app.handle(key(KeyCode::Char('p')), t0);
        assert_eq!(tasks, vec![Task::FetchPkgbuild("yay".into())]);
        assert!(app.showing_pkgbuild);
        assert_eq!(app.focus, Focus::Detail);

        assert!(app.handle(key(KeyCode::Char('p')), t0).is_empty());
        assert!(!app.showing_pkgbuild);
        assert_eq!(app.focus, Focus::List);

        app.handle(
            AppEvent::PkgbuildLoaded {
                name: "yay".into(),
                text: "pkgname=yay".into(),
            },
            t0,
        );
        assert!(app.handle(key(KeyCode::Char('p')), t0).is_empty());
        assert_eq!(
            app.packages[0].details.pkgbuild.as_deref(),
            Some("pkgname=yay")
        );

        // 切换选中项关闭 PKGBUILD；官方包不响应 p
        app.handle(key(KeyCode::Tab), t0);
        app.handle(key(KeyCode::Char('j')), t0);
        assert!(!app.showing_pkgbuild);
        app.handle(key(KeyCode::Char('p')), t0);
        assert!(!app.showing_pkgbuild);
    }

    #[test]
    fn selection_change_resets_detail_scroll() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        browse_with(&mut app, vec![official("git"), official("tig")]);

        app.handle(key(KeyCode::Tab), t0);
        app.handle(key(KeyCode::Char('j')), t0);
        app.handle(key(KeyCode::Char('j')), t0);
        assert_eq!(app.detail_scroll, 2);
        assert_eq!(app.selected, 0);

        app.handle(key(KeyCode::Tab), t0);
        app.handle(key(KeyCode::Char('j')), t0);
        assert_eq!(app.selected, 1);
        assert_eq!(app.detail_scroll, 0);
    }

    #[test]
    fn list_navigation_is_clamped() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        let pkgs: Vec<Package> = (0..20).map(|i| official(&format!("pkg{i:02}"))).collect();
        browse_with(&mut app, pkgs);

        app.handle(ctrl('d'), t0);
        assert_eq!(app.selected, 6);
        app.handle(key(KeyCode::Char('G')), t0);
        assert_eq!(app.selected, 19);
        app.handle(key(KeyCode::Char('j')), t0);
        assert_eq!(app.selected, 19);
        assert!(app.list_offset + app.geometry.page_size() > app.selected);
        app.handle(key(KeyCode::Char('g')), t0);
        assert_eq!(app.selected, 0);
        assert_eq!(app.list_offset, 0);
    }

    #[test]
    fn enter_builds_action_for_selection() {
        let helper = AurHelper::new("yay");
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        let mut git = official("git");
        git.installed = true;
        browse_with(&mut app, vec![aur("paru-bin"), git]);

        let tasks = app.handle(key(KeyCode::Enter), t0);
        assert_eq!(
            tasks,
            vec![
                Task::Execute(CommandSpec {
                    program: "yay".into(),
                    args: vec!["-S".into(), "paru-bin".into()],
                }),
                Task::RefreshInstalled,
            ]
        );

        app.handle(key(KeyCode::Char('j')), t0);
        let tasks = app.handle(key(KeyCode::Enter), t0);
        assert!(matches!(
            &tasks[..],
            [Task::Execute(spec), Task::RefreshInstalled]
                if spec.args == vec!["pacman", "-Rns", "git"]
        ));
    }

    #[test]
    fn quit_keys() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let t0 = Instant::now();
        // 搜索模式下 q 是普通字符
        assert!(app.handle(key(KeyCode::Char('q')), t0).is_empty());
        assert_eq!(app.handle(ctrl('c'), t0), vec![Task::Quit]);

        app.handle(key(KeyCode::Esc), t0);
        assert_eq!(app.handle(key(KeyCode::Char('q')), t0), vec![Task::Quit]);
    }

    #[test]
    fn mouse_click_sets_focus_by_column() {
        let helper = AurHelper::default();
        let mut app = App::new(&helper, 100, 40);
        let click = |column| {
            AppEvent::Input(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row: 10,
                modifiers: KeyModifiers::NONE,
            }))
        };
        let t0 = Instant::now();

        app.handle(click(80), t0);
        assert_eq!(app.focus, Focus::Detail);
        app.handle(click(10), t0);
        assert_eq!(app.focus, Focus::List);
    }
}

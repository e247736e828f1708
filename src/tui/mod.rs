mod browse;
pub mod input;
mod layout;
pub mod state;
mod suspend;
pub mod theme;

use crate::package_manager::{AurHelper, CommandSpec, PackageIndex};
use anyhow::Result;
use crossterm::event::EventStream;
use futures::StreamExt;
use state::{App, AppEvent, Task, TICK_RATE};
use std::time::Instant;
use suspend::Tui;
use theme::Theme;
use tokio::sync::mpsc;

pub async fn run(index: PackageIndex, helper: &AurHelper, theme: Theme) -> Result<()> {
    let mut terminal = suspend::enter()?;

    let result = event_loop(&mut terminal, index, helper, theme).await;

    // 无论主循环是否出错都恢复终端
    suspend::leave(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    index: PackageIndex,
    helper: &AurHelper,
    theme: Theme,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(helper, size.width, size.height).with_theme(theme);

    let (tx, mut rx) = mpsc::channel(64);
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        // 详情滚动收敛到内容末尾
        let detail_height = browse::detail_height(&app);
        app.clamp_detail_scroll(detail_height);

        terminal.draw(|f| browse::render(f, &app))?;

        let event = tokio::select! {
            Some(Ok(ev)) = events.next() => AppEvent::Input(ev),
            Some(ev) = rx.recv() => ev,
            _ = ticker.tick() => AppEvent::Tick(Instant::now()),
        };

        let mut quit = false;
        for task in app.handle(event, Instant::now()) {
            match task {
                Task::Quit => quit = true,
                Task::Execute(spec) => {
                    // 子进程需要独占终端输入，暂停事件流
                    drop(events);
                    execute(terminal, &mut app, &spec)?;
                    events = EventStream::new();
                }
                other => spawn_task(other, &index, &tx),
            }
        }
        if quit {
            break;
        }
    }

    Ok(())
}

/// 前台执行安装 / 卸载命令，把结果写到状态栏
fn execute(terminal: &mut Tui, app: &mut App, spec: &CommandSpec) -> Result<()> {
    match suspend::run_suspended(terminal, spec)? {
        Ok(status) if status.success() => app.set_status(format!("{} finished", spec.display())),
        Ok(status) => app.set_status(format!("{} exited with {status}", spec.display())),
        Err(e) => {
            log::warn!("failed to run {}: {e}", spec.display());
            app.set_status(format!("failed to run {}: {e}", spec.program));
        }
    }
    Ok(())
}

/// 后台任务，完成后通过 channel 回报
fn spawn_task(task: Task, index: &PackageIndex, tx: &mpsc::Sender<AppEvent>) {
    let index = index.clone();
    let tx_clone = tx.clone();

    match task {
        Task::Search { query, seq } => {
            tokio::spawn(async move {
                let packages = index.search(&query).await;
                let _ = tx_clone
                    .send(AppEvent::SearchFinished { seq, packages })
                    .await;
            });
        }
        Task::FetchDetails(pkg) => {
            tokio::spawn(async move {
                let event = match index.enrich(&pkg).await {
                    Ok(detailed) => AppEvent::DetailsLoaded(detailed),
                    Err(e) => {
                        log::warn!("loading details for {} failed: {e}", pkg.name);
                        AppEvent::DetailsFailed { name: pkg.name }
                    }
                };
                let _ = tx_clone.send(event).await;
            });
        }
        Task::FetchPkgbuild(name) => {
            tokio::spawn(async move {
                let event = match index.pkgbuild(&name).await {
                    Ok(text) => AppEvent::PkgbuildLoaded { name, text },
                    Err(e) => {
                        log::warn!("loading PKGBUILD for {name} failed: {e}");
                        AppEvent::PkgbuildFailed { name }
                    }
                };
                let _ = tx_clone.send(event).await;
            });
        }
        Task::RefreshInstalled => {
            tokio::spawn(async move {
                match index.installed_names().await {
                    Ok(installed) => {
                        let _ = tx_clone.send(AppEvent::InstalledRefreshed(installed)).await;
                    }
                    Err(e) => log::warn!("refreshing installed packages failed: {e}"),
                }
            });
        }
        Task::Execute(_) | Task::Quit => {}
    }
}

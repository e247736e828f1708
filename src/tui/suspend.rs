//! 终端接管：进入 / 离开 TUI，以及临时把终端交给前台命令

use crate::package_manager::actions::run_interactive;
use crate::package_manager::CommandSpec;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::process::ExitStatus;

pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// 终端初始化
pub fn enter() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// 恢复终端
pub fn leave(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// 临时退出 TUI 执行安装 / 卸载命令，结束后恢复 TUI
///
/// 外层 Result 是终端切换失败；内层是命令无法启动。
pub fn run_suspended(terminal: &mut Tui, spec: &CommandSpec) -> Result<io::Result<ExitStatus>> {
    leave(terminal)?;

    println!(":: {}", spec.display());
    println!();

    let result = run_interactive(spec);

    match &result {
        Ok(status) if status.success() => {
            println!();
            println!("✅ done");
        }
        Ok(status) => {
            println!();
            println!("❌ exited with {status}");
        }
        Err(e) => {
            println!();
            println!("❌ failed to start {}: {e}", spec.program);
        }
    }

    std::thread::sleep(std::time::Duration::from_millis(500));

    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    terminal.hide_cursor()?;
    terminal.clear()?;

    Ok(result)
}

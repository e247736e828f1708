mod config;
mod package_manager;
mod tui;

use anyhow::Result;
use clap::Parser;
use package_manager::{AurClient, AurHelper, PackageIndex, Pacman};
use std::sync::Arc;
use tui::theme::Theme;

/// 交互式搜索、查看并安装 pacman / AUR 软件包
#[derive(Debug, Parser)]
#[command(name = "pacwarm", disable_version_flag = true)]
struct Cli {
    /// 使用的 AUR helper（覆盖配置文件和自动探测）
    #[arg(short = 'H', long = "helper", value_name = "NAME")]
    helper: Option<String>,

    /// 配色主题: gruvbox, onedark, dracula, nord, catppuccin
    #[arg(short = 't', long = "theme", value_name = "NAME")]
    theme: Option<String>,

    /// 打印版本号
    #[arg(short = 'v', long = "version")]
    version: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if cli.version {
        println!("pacwarm {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = run(cli).await {
        eprintln!("pacwarm: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 加载配置，命令行参数优先
    let config = config::Config::load_or_default();

    let theme_name = cli.theme.or(config.theme).unwrap_or_default();
    let theme = if theme_name.is_empty() {
        Theme::default()
    } else {
        Theme::from_name(&theme_name)
    };

    let helper_override = cli.helper.or(config.aur_helper);
    let helper = AurHelper::from_environment(helper_override.as_deref());

    let index = PackageIndex::new(Arc::new(Pacman::default()), Arc::new(AurClient::new()));

    tui::run(index, &helper, theme).await
}

//! 包管理模块：对 pacman / AUR / AUR helper 的封装

pub mod actions;
pub mod aur;
pub mod pacman;
pub mod parser;
pub mod search;
pub mod types;

// 重新导出常用类型
pub use actions::{AurHelper, CommandSpec};
pub use aur::AurClient;
pub use pacman::Pacman;
pub use search::PackageIndex;
pub use types::{Package, Source};

use thiserror::Error;

/// 单个数据源（pacman 或 AUR）的查询错误
///
/// 这些错误都是可恢复的：搜索时该数据源贡献零条结果，详情加载时记录保持未加载状态。
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("`{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("AUR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AUR returned {status} for {what}")]
    Status {
        status: reqwest::StatusCode,
        what: String,
    },

    #[error("no info found for {0}")]
    NotFound(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

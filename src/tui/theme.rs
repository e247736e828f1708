//! 主题色定义，启动时按名称选定一次，渲染时统一从这里取色

use crate::package_manager::Source;
use ratatui::style::Color;

/// 可选主题名，第一个是默认值
pub const THEME_NAMES: &[&str] = &["gruvbox", "onedark", "dracula", "nord", "catppuccin"];

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub base: Color,
    pub text: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub orange: Color,
    pub blue: Color,
    pub purple: Color,
    pub cyan: Color,
    pub gray: Color,
    /// 选中行背景色
    pub highlight: Color,
    pub border: Color,

    /// 官方仓库包名颜色
    pub repo_official: Color,
    /// AUR 包名颜色
    pub repo_aur: Color,
    /// 标题徽章背景
    pub header: Color,
    /// 聚焦边框 / 搜索框
    pub focus: Color,
}

impl Theme {
    pub const GRUVBOX: Theme = Theme {
        base: hex(0x282828),
        text: hex(0xebdbb2),
        red: hex(0xcc241d),
        green: hex(0x98971a),
        yellow: hex(0xd79921),
        orange: hex(0xd65d0e),
        blue: hex(0x458588),
        purple: hex(0xb16286),
        cyan: hex(0x689d6a),
        gray: hex(0x928374),
        highlight: hex(0x504945),
        border: hex(0x7c6f64),
        repo_official: hex(0x98971a),
        repo_aur: hex(0xd65d0e),
        header: hex(0x98971a),
        focus: hex(0xd79921),
    };

    pub const ONEDARK: Theme = Theme {
        base: hex(0x282c34),
        text: hex(0xabb2bf),
        red: hex(0xe06c75),
        green: hex(0x98c379),
        yellow: hex(0xe5c07b),
        orange: hex(0xd19a66),
        blue: hex(0x61afef),
        purple: hex(0xc678dd),
        cyan: hex(0x56b6c2),
        gray: hex(0x5c6370),
        highlight: hex(0x3e4451),
        border: hex(0x4b5263),
        repo_official: hex(0x61afef),
        repo_aur: hex(0xc678dd),
        header: hex(0x61afef),
        focus: hex(0x98c379),
    };

    pub const DRACULA: Theme = Theme {
        base: hex(0x282a36),
        text: hex(0xf8f8f2),
        red: hex(0xff5555),
        green: hex(0x50fa7b),
        yellow: hex(0xf1fa8c),
        orange: hex(0xffb86c),
        blue: hex(0x8be9fd),
        purple: hex(0xbd93f9),
        cyan: hex(0x8be9fd),
        gray: hex(0x6272a4),
        highlight: hex(0x44475a),
        border: hex(0x6272a4),
        repo_official: hex(0xbd93f9),
        // 粉色比橙色对比度更好
        repo_aur: hex(0xff79c6),
        header: hex(0xbd93f9),
        focus: hex(0x50fa7b),
    };

    pub const NORD: Theme = Theme {
        base: hex(0x2e3440),
        text: hex(0xd8dee9),
        red: hex(0xbf616a),
        green: hex(0xa3be8c),
        yellow: hex(0xebcb8b),
        orange: hex(0xd08770),
        blue: hex(0x81a1c1),
        purple: hex(0xb48ead),
        cyan: hex(0x88c0d0),
        gray: hex(0x4c566a),
        highlight: hex(0x3b4252),
        border: hex(0x434c5e),
        repo_official: hex(0x81a1c1),
        repo_aur: hex(0xd08770),
        header: hex(0x5e81ac),
        focus: hex(0x88c0d0),
    };

    pub const CATPPUCCIN: Theme = Theme {
        base: hex(0x1e1e2e),
        text: hex(0xcdd6f4),
        red: hex(0xf38ba8),
        green: hex(0xa6e3a1),
        yellow: hex(0xf9e2af),
        orange: hex(0xfab387),
        blue: hex(0x89b4fa),
        purple: hex(0xcba6f7),
        cyan: hex(0x94e2d5),
        gray: hex(0x6c7086),
        highlight: hex(0x313244),
        border: hex(0x45475a),
        repo_official: hex(0x89b4fa),
        repo_aur: hex(0xcba6f7),
        header: hex(0xb4befe),
        focus: hex(0xf5c2e7),
    };

    /// 按名称查找主题（忽略大小写），未知名称回退到 gruvbox
    pub fn from_name(name: &str) -> Theme {
        match name.trim().to_lowercase().as_str() {
            "onedark" => Theme::ONEDARK,
            "dracula" => Theme::DRACULA,
            "nord" => Theme::NORD,
            "catppuccin" => Theme::CATPPUCCIN,
            "gruvbox" => Theme::GRUVBOX,
            other => {
                log::warn!(
                    "unknown theme {other:?} (expected one of {}), falling back to gruvbox",
                    THEME_NAMES.join(", ")
                );
                Theme::GRUVBOX
            }
        }
    }

    pub fn repo_color(&self, source: Source) -> Color {
        match source {
            Source::Official => self.repo_official,
            Source::Aur => self.repo_aur,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::GRUVBOX
    }
}

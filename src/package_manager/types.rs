//! 软件包记录相关数据类型定义

/// 软件包来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Source {
    /// 官方仓库（pacman 本地数据库）
    #[default]
    Official,
    /// AUR
    Aur,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Official => "Official",
            Source::Aur => "AUR",
        }
    }
}

/// 按需加载的扩展详情
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageDetails {
    pub architecture: String,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    pub provides: Vec<String>,
    pub depends: Vec<String>,
    pub opt_depends: Vec<String>,
    pub required_by: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub packager: String,
    pub build_date: i64,
    pub install_date: i64,
    pub install_reason: String,
    pub validated_by: String,
    pub download_size: String,
    pub installed_size: String,
    pub popularity: f64,
    pub first_submitted: i64,
    pub keywords: Vec<String>,
    pub make_depends: Vec<String>,
    pub check_depends: Vec<String>,
    /// PKGBUILD 原文，仅 AUR 包，单独加载
    pub pkgbuild: Option<String>,
}

/// 一条软件包记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub description: String,
    pub source: Source,
    pub installed: bool,
    pub votes: u32,
    pub url: String,
    pub maintainer: String,
    pub last_modified: i64,
    /// 元数据详情是否已加载
    pub detailed: bool,
    pub details: PackageDetails,
}

impl Package {
    pub fn official(name: &str, version: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            source: Source::Official,
            maintainer: "Arch Linux".to_string(),
            ..Default::default()
        }
    }

    pub fn is_aur(&self) -> bool {
        self.source == Source::Aur
    }
}

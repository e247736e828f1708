use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 固定使用的 AUR helper，未设置时自动探测
    pub aur_helper: Option<String>,
    /// 配色主题名
    pub theme: Option<String>,
}

impl Config {
    /// ~/.config/pacwarm/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pacwarm").join("config.toml"))
    }

    /// 读取默认位置的配置；文件不存在或格式错误时使用默认值
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_both_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "aur_helper = \"yay\"\ntheme = \"nord\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.aur_helper.as_deref(), Some("yay"));
        assert_eq!(config.theme.as_deref(), Some("nord"));
    }

    #[test]
    fn missing_keys_are_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"dracula\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.aur_helper, None);
        assert_eq!(config.theme.as_deref(), Some("dracula"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = [unterminated").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error_for_explicit_load() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("nope.toml")).is_err());
    }
}

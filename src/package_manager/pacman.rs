//! 本地数据源：调用 pacman 查询官方仓库与本地数据库

use super::parser::{apply_detail_output, parse_installed_names, parse_search_output};
use super::search::LocalRepo;
use super::types::Package;
use super::SourceError;
use async_trait::async_trait;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Pacman {
    pub command: String,
}

impl Default for Pacman {
    fn default() -> Self {
        Self {
            command: "pacman".to_string(),
        }
    }
}

impl Pacman {
    /// 以 C locale 执行 pacman 查询，返回 stdout
    ///
    /// 阻塞调用，异步上下文里需放进 spawn_blocking。
    fn query(&self, args: &[&str]) -> Result<String, SourceError> {
        let display = format!("{} {}", self.command, args.join(" "));
        let output = duct::cmd(&self.command, args)
            .env("LC_ALL", "C")
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|e| SourceError::Command {
                command: display.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SourceError::Command {
                command: display,
                reason: format!(
                    "exit {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// 搜索官方仓库 (pacman -Ss)
    pub fn search_blocking(&self, keyword: &str) -> Result<Vec<Package>, SourceError> {
        let raw = self.query(&["-Ss", keyword])?;
        Ok(parse_search_output(&raw, keyword))
    }

    /// 已安装包名 (pacman -Qq)
    pub fn installed_names_blocking(&self) -> Result<HashSet<String>, SourceError> {
        let raw = self.query(&["-Qq"])?;
        Ok(parse_installed_names(&raw))
    }

    /// 包详情：已安装用 -Qi，否则用 -Si
    pub fn details_blocking(&self, pkg: &Package) -> Result<Package, SourceError> {
        let flag = if pkg.installed { "-Qi" } else { "-Si" };
        let raw = self.query(&[flag, &pkg.name])?;
        let mut detailed = pkg.clone();
        apply_detail_output(&mut detailed, &raw);
        Ok(detailed)
    }
}

#[async_trait]
impl LocalRepo for Pacman {
    async fn search(&self, query: &str) -> Result<Vec<Package>, SourceError> {
        let pm = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || pm.search_blocking(&query)).await?
    }

    async fn installed_names(&self) -> Result<HashSet<String>, SourceError> {
        let pm = self.clone();
        tokio::task::spawn_blocking(move || pm.installed_names_blocking()).await?
    }

    async fn details(&self, pkg: &Package) -> Result<Package, SourceError> {
        let pm = self.clone();
        let pkg = pkg.clone();
        tokio::task::spawn_blocking(move || pm.details_blocking(&pkg)).await?
    }
}

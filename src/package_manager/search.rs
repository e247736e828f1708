//! 聚合搜索：并发查询 pacman 与 AUR，合并、标记已安装并排序

use super::types::Package;
use super::SourceError;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// 本地数据源（官方仓库 + 本地数据库）
#[async_trait]
pub trait LocalRepo: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Package>, SourceError>;
    async fn installed_names(&self) -> Result<HashSet<String>, SourceError>;
    async fn details(&self, pkg: &Package) -> Result<Package, SourceError>;
}

/// 远程数据源（AUR）
#[async_trait]
pub trait RemoteRepo: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Package>, SourceError>;
    async fn info(&self, pkg: &Package) -> Result<Package, SourceError>;
    async fn pkgbuild(&self, name: &str) -> Result<String, SourceError>;
}

/// 两个数据源的组合入口，供 TUI 后台任务使用
#[derive(Clone)]
pub struct PackageIndex {
    local: Arc<dyn LocalRepo>,
    remote: Arc<dyn RemoteRepo>,
}

impl PackageIndex {
    pub fn new(local: Arc<dyn LocalRepo>, remote: Arc<dyn RemoteRepo>) -> Self {
        Self { local, remote }
    }

    /// 并发搜索两个数据源
    ///
    /// 任一数据源失败只记录日志，贡献零条结果，不影响另一个。
    pub async fn search(&self, query: &str) -> Vec<Package> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let results: Arc<Mutex<Vec<Package>>> = Arc::new(Mutex::new(Vec::new()));

        let local_task = {
            let local = Arc::clone(&self.local);
            let results = Arc::clone(&results);
            let query = query.to_string();
            tokio::spawn(async move {
                match local.search(&query).await {
                    Ok(pkgs) => append(&results, pkgs),
                    Err(e) => log::warn!("official search for {query:?} failed: {e}"),
                }
            })
        };

        let remote_task = {
            let remote = Arc::clone(&self.remote);
            let results = Arc::clone(&results);
            let query = query.to_string();
            tokio::spawn(async move {
                match remote.search(&query).await {
                    Ok(pkgs) => append(&results, pkgs),
                    Err(e) => log::warn!("AUR search for {query:?} failed: {e}"),
                }
            })
        };

        let (local_done, remote_done) = tokio::join!(local_task, remote_task);
        for done in [local_done, remote_done] {
            if let Err(e) = done {
                log::warn!("search task aborted: {e}");
            }
        }

        let mut pkgs = match results.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        if !pkgs.is_empty() {
            self.reconcile(&mut pkgs).await;
        }

        sort_packages(&mut pkgs, query);
        log::debug!("search {query:?}: {} packages", pkgs.len());
        pkgs
    }

    /// 已安装包名集合
    pub async fn installed_names(&self) -> Result<HashSet<String>, SourceError> {
        self.local.installed_names().await
    }

    /// 用一次 -Qq 查询标记所有记录的已安装状态；查询失败时保持原值
    pub async fn reconcile(&self, pkgs: &mut [Package]) {
        match self.local.installed_names().await {
            Ok(installed) => mark_installed(pkgs, &installed),
            Err(e) => log::warn!("installed-state query failed: {e}"),
        }
    }

    /// 加载单个包的扩展详情
    pub async fn enrich(&self, pkg: &Package) -> Result<Package, SourceError> {
        if pkg.is_aur() {
            self.remote.info(pkg).await
        } else {
            self.local.details(pkg).await
        }
    }

    /// 获取 AUR 包的 PKGBUILD
    pub async fn pkgbuild(&self, name: &str) -> Result<String, SourceError> {
        self.remote.pkgbuild(name).await
    }
}

fn append(results: &Mutex<Vec<Package>>, pkgs: Vec<Package>) {
    match results.lock() {
        Ok(mut guard) => guard.extend(pkgs),
        Err(poisoned) => poisoned.into_inner().extend(pkgs),
    }
}

/// 按已安装集合设置每条记录的标记
pub fn mark_installed(pkgs: &mut [Package], installed: &HashSet<String>) {
    for pkg in pkgs.iter_mut() {
        pkg.installed = installed.contains(&pkg.name);
    }
}

/// 结果排序（稳定）：
/// 精确匹配 > 官方仓库 > AUR 票数高 > 名称短 > 字典序
pub fn sort_packages(pkgs: &mut [Package], query: &str) {
    let query = query.to_lowercase();
    pkgs.sort_by(|a, b| compare(a, b, &query));
}

fn compare(a: &Package, b: &Package, query: &str) -> Ordering {
    let a_exact = a.name.to_lowercase() == query;
    let b_exact = b.name.to_lowercase() == query;

    b_exact
        .cmp(&a_exact)
        .then_with(|| a.is_aur().cmp(&b.is_aur()))
        .then_with(|| {
            if a.is_aur() && b.is_aur() {
                b.votes.cmp(&a.votes)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.name.len().cmp(&b.name.len()))
        .then_with(|| a.name.cmp(&b.name))
}

//! 远程数据源：AUR RPC 接口与 PKGBUILD 原文

use super::search::RemoteRepo;
use super::types::{Package, Source};
use super::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const AUR_BASE_URL: &str = "https://aur.archlinux.org";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResult {
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    num_votes: u32,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    maintainer: Option<String>,
    #[serde(default)]
    last_modified: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InfoResult {
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    maintainer: Option<String>,
    #[serde(default)]
    num_votes: u32,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    first_submitted: i64,
    #[serde(default)]
    last_modified: i64,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    license: Vec<String>,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    make_depends: Vec<String>,
    #[serde(default)]
    check_depends: Vec<String>,
    #[serde(default)]
    opt_depends: Vec<String>,
    #[serde(default)]
    conflicts: Vec<String>,
    #[serde(default)]
    provides: Vec<String>,
    #[serde(default)]
    replaces: Vec<String>,
    #[serde(default)]
    groups: Vec<String>,
}

impl From<SearchResult> for Package {
    fn from(r: SearchResult) -> Self {
        Package {
            name: r.name,
            version: r.version,
            description: r.description.unwrap_or_default(),
            source: Source::Aur,
            votes: r.num_votes,
            url: r.url.unwrap_or_default(),
            maintainer: r.maintainer.unwrap_or_default(),
            last_modified: r.last_modified,
            ..Default::default()
        }
    }
}

/// AUR web 客户端
#[derive(Debug, Clone)]
pub struct AurClient {
    client: Client,
    base_url: String,
}

impl Default for AurClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AurClient {
    pub fn new() -> Self {
        Self::with_base_url(AUR_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn rpc_url(&self) -> String {
        format!("{}/rpc/", self.base_url)
    }

    /// 按名称搜索，零结果不是错误
    pub async fn search_by_name(&self, keyword: &str) -> Result<Vec<Package>, SourceError> {
        let data: RpcResponse<SearchResult> = self
            .client
            .get(self.rpc_url())
            .query(&[("v", "5"), ("type", "search"), ("by", "name"), ("arg", keyword)])
            .send()
            .await?
            .json()
            .await?;

        Ok(data.results.into_iter().map(Package::from).collect())
    }

    /// 按精确名称获取详情并合并到记录上
    pub async fn info_for(&self, pkg: &Package) -> Result<Package, SourceError> {
        let data: RpcResponse<InfoResult> = self
            .client
            .get(self.rpc_url())
            .query(&[("v", "5"), ("type", "info"), ("arg[]", pkg.name.as_str())])
            .send()
            .await?
            .json()
            .await?;

        let info = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(pkg.name.clone()))?;

        let mut p = pkg.clone();
        p.version = info.version;
        p.description = info.description.unwrap_or_default();
        p.url = info.url.unwrap_or_default();
        p.maintainer = info.maintainer.unwrap_or_default();
        p.votes = info.num_votes;
        p.last_modified = info.last_modified;

        let d = &mut p.details;
        d.popularity = info.popularity;
        d.first_submitted = info.first_submitted;
        d.keywords = info.keywords;
        d.licenses = info.license;
        d.depends = info.depends;
        d.make_depends = info.make_depends;
        d.check_depends = info.check_depends;
        d.opt_depends = info.opt_depends;
        d.conflicts = info.conflicts;
        d.provides = info.provides;
        d.replaces = info.replaces;
        d.groups = info.groups;

        p.detailed = true;
        Ok(p)
    }

    /// 获取 PKGBUILD 原文，非 200 视为错误
    pub async fn fetch_pkgbuild(&self, name: &str) -> Result<String, SourceError> {
        let mut response = self
            .client
            .get(format!("{}/cgit/aur.git/plain/PKGBUILD", self.base_url))
            .query(&[("h", name)])
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(SourceError::Status {
                status: response.status(),
                what: format!("PKGBUILD of {name}"),
            });
        }

        // 分块读取直到流结束
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl RemoteRepo for AurClient {
    async fn search(&self, query: &str) -> Result<Vec<Package>, SourceError> {
        self.search_by_name(query).await
    }

    async fn info(&self, pkg: &Package) -> Result<Package, SourceError> {
        self.info_for(pkg).await
    }

    async fn pkgbuild(&self, name: &str) -> Result<String, SourceError> {
        self.fetch_pkgbuild(name).await
    }
}

//! 安装 / 卸载动作与 AUR helper 选择

use super::types::Package;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::ExitStatus;

/// 按顺序探测的 AUR helper
const KNOWN_HELPERS: &[&str] = &["paru", "yay", "pikaur", "aura", "trizen"];
const DEFAULT_HELPER: &str = "paru";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    Install,
    Remove,
}

impl PackageAction {
    /// 已安装则卸载，否则安装
    pub fn for_package(pkg: &Package) -> Self {
        if pkg.installed {
            PackageAction::Remove
        } else {
            PackageAction::Install
        }
    }
}

/// 待执行的外部命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// 展示用的完整命令行
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 用于安装 AUR 包的 helper 程序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AurHelper {
    name: String,
}

impl AurHelper {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 选择 helper：显式指定 > AUR_HELPER（需可执行）> PATH 中第一个已知 helper > paru
    pub fn resolve(
        override_name: Option<&str>,
        env_value: Option<String>,
        path: Option<OsString>,
    ) -> Self {
        if let Some(name) = override_name.map(str::trim).filter(|n| !n.is_empty()) {
            return Self::new(name);
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| Path::new("/").to_path_buf());
        let executable = |name: &str| match &path {
            Some(p) => which::which_in(name, Some(p), &cwd).is_ok(),
            None => false,
        };

        if let Some(name) = env_value.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if executable(name) {
                return Self::new(name);
            }
            log::warn!("AUR_HELPER={name} is not executable, ignoring");
        }

        KNOWN_HELPERS
            .iter()
            .find(|name| executable(name))
            .map(|name| Self::new(*name))
            .unwrap_or_else(|| Self::new(DEFAULT_HELPER))
    }

    /// 从当前进程环境解析
    pub fn from_environment(override_name: Option<&str>) -> Self {
        let helper = Self::resolve(
            override_name,
            std::env::var("AUR_HELPER").ok(),
            std::env::var_os("PATH"),
        );
        log::info!("using AUR helper {}", helper.name);
        helper
    }

    /// aura 的 AUR 安装参数是 -A，其余都是 -S
    pub fn install_flag(&self) -> &'static str {
        let base = Path::new(&self.name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.name);
        if base == "aura" {
            "-A"
        } else {
            "-S"
        }
    }
}

impl Default for AurHelper {
    fn default() -> Self {
        Self::new(DEFAULT_HELPER)
    }
}

/// 生成对应包的安装或卸载命令
pub fn build_command(pkg: &Package, helper: &AurHelper) -> CommandSpec {
    match PackageAction::for_package(pkg) {
        PackageAction::Remove => CommandSpec::new("sudo", &["pacman", "-Rns", &pkg.name]),
        PackageAction::Install if pkg.is_aur() => {
            CommandSpec::new(helper.name(), &[helper.install_flag(), &pkg.name])
        }
        PackageAction::Install => CommandSpec::new("sudo", &["pacman", "-S", &pkg.name]),
    }
}

/// 在当前终端上前台执行命令，继承标准输入输出
///
/// 非零退出码不算错误，由调用方决定如何处理；只有无法启动时返回 Err。
pub fn run_interactive(spec: &CommandSpec) -> io::Result<ExitStatus> {
    log::info!("running {}", spec.display());
    let output = duct::cmd(&spec.program, &spec.args).unchecked().run()?;
    if !output.status.success() {
        log::warn!("{} exited with {:?}", spec.display(), output.status.code());
    }
    Ok(output.status)
}

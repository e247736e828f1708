//! pacman 输出解析函数

use super::types::Package;
use chrono::{DateTime, NaiveDateTime};
use std::collections::HashSet;

/// pacman 详情输出中的日期格式，按顺序尝试
const DATE_FORMATS_WITH_OFFSET: &[&str] = &["%a %d %b %Y %I:%M:%S %p %#z"];
const DATE_FORMATS_NAIVE: &[&str] = &["%a %d %b %Y %I:%M:%S %p %Z", "%a %b %e %H:%M:%S %Y"];

/// 解析 pacman -Ss 的搜索输出
///
/// 每个包占两行：`repo/name version ...` + 缩进的描述行。
/// 只保留包名中包含关键词（忽略大小写）的条目，pacman 也会按描述匹配，这些需要排除。
pub fn parse_search_output(output: &str, query: &str) -> Vec<Package> {
    let mut results = Vec::new();
    let lines: Vec<&str> = output.lines().collect();
    let keyword = query.to_lowercase();
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line = raw.trim();
        if line.is_empty() || is_indented(raw) || !line.contains('/') {
            i += 1;
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let name = match (parts.first(), parts.get(1)) {
            (Some(head), Some(_)) => head.split('/').nth(1).filter(|n| !n.is_empty()),
            _ => None,
        };
        let Some(name) = name else {
            i += 1;
            continue;
        };

        // 描述行总是跟在头部行后面，不匹配时一并跳过
        let desc_line = lines.get(i + 1).copied().filter(|l| is_indented(l));
        i += if desc_line.is_some() { 2 } else { 1 };

        if !name.to_lowercase().contains(&keyword) {
            continue;
        }

        let description = desc_line.map(str::trim).unwrap_or("");
        results.push(Package::official(name, parts[1], description));
    }

    results
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// 解析 pacman -Qq 输出为已安装包名集合
pub fn parse_installed_names(output: &str) -> HashSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 把 pacman -Si / -Qi 输出拆成 (键, 值列表)
///
/// 非缩进行开启新字段，缩进行是上一字段的续行（例如 Optional Deps 的多行）。
fn split_detail_fields(output: &str) -> Vec<(String, Vec<String>)> {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !is_indented(line) {
            if let Some(colon) = line.find(':') {
                let key = line[..colon].trim();
                let value = line[colon + 1..].trim();
                if !key.is_empty() {
                    fields.push((key.to_string(), vec![value.to_string()]));
                    continue;
                }
            }
        }
        if let Some((_, values)) = fields.last_mut() {
            values.push(line.trim().to_string());
        }
    }

    fields
}

fn is_absent(value: &str) -> bool {
    value.is_empty() || value == "None"
}

fn words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// 把 pacman -Si / -Qi 的详情输出合并到记录上，并标记为已加载详情
pub fn apply_detail_output(pkg: &mut Package, output: &str) {
    for (key, values) in split_detail_fields(output) {
        let values: Vec<String> = values.into_iter().filter(|v| !is_absent(v)).collect();
        let Some(first) = values.first().cloned() else {
            continue;
        };
        let joined = values.join(" ");
        let d = &mut pkg.details;

        match key.as_str() {
            "Architecture" => d.architecture = first,
            "URL" => pkg.url = first,
            "Licenses" => d.licenses = words(&joined),
            "Groups" => d.groups = words(&joined),
            "Provides" => d.provides = words(&joined),
            "Depends On" => d.depends = words(&joined),
            "Optional Deps" => d.opt_depends = values,
            "Required By" => d.required_by = words(&joined),
            "Conflicts With" => d.conflicts = words(&joined),
            "Replaces" => d.replaces = words(&joined),
            "Download Size" => d.download_size = first,
            "Installed Size" => d.installed_size = first,
            "Packager" => d.packager = first,
            "Build Date" => d.build_date = parse_pacman_date(&first),
            "Install Date" => d.install_date = parse_pacman_date(&first),
            "Install Reason" => d.install_reason = first,
            "Validated By" => d.validated_by = first,
            _ => {}
        }
    }
    pkg.detailed = true;
}

/// 解析 pacman 输出里的日期，返回 unix 时间戳；都不匹配时返回 0
pub fn parse_pacman_date(value: &str) -> i64 {
    let value = value.trim();
    for fmt in DATE_FORMATS_WITH_OFFSET {
        if let Ok(t) = DateTime::parse_from_str(value, fmt) {
            return t.timestamp();
        }
    }
    for fmt in DATE_FORMATS_NAIVE {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, fmt) {
            return t.and_utc().timestamp();
        }
    }
    DateTime::parse_from_rfc2822(value)
        .map(|t| t.timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_manager::types::Source;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    #[test]
    fn parses_two_line_entry() {
        let raw = "core/git 2.40.0-1\n    the stupid content tracker\n";
        let pkgs = parse_search_output(raw, "git");

        assert_eq!(pkgs.len(), 1);
        let git = &pkgs[0];
        assert_eq!(git.name, "git");
        assert_eq!(git.version, "2.40.0-1");
        assert_eq!(git.description, "the stupid content tracker");
        assert_eq!(git.source, Source::Official);
        assert!(!git.installed);
        assert!(!git.detailed);
    }

    #[test]
    fn skips_entries_whose_name_does_not_match() {
        let raw = "\
extra/tig 2.5.8-1
    Text-mode interface for git
extra/git-lfs 3.3.0-1 [installed]
    Git extension for versioning large files
";
        let pkgs = parse_search_output(raw, "GIT");

        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "git-lfs");
        assert_eq!(pkgs[0].description, "Git extension for versioning large files");
    }

    #[test]
    fn skips_malformed_headers() {
        let raw = "broken/\n    nothing here\nextra/gitg 44-1\n    GNOME GUI client\nlonely/entry\n";
        let pkgs = parse_search_output(raw, "git");

        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "gitg");
    }

    #[test]
    fn header_without_description_line() {
        let pkgs = parse_search_output("core/git 2.40.0-1", "git");
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].description, "");
    }

    #[test]
    fn installed_names_ignore_blank_lines() {
        let names = parse_installed_names("git\n\nbash\n  \n");
        assert_eq!(names.len(), 2);
        assert!(names.contains("git"));
        assert!(names.contains("bash"));
    }

    #[test]
    fn detail_output_maps_known_keys() {
        let raw = "\
Repository      : extra
Name            : git
Version         : 2.40.0-1
Architecture    : x86_64
URL             : https://git-scm.com/
Licenses        : GPL2
Groups          : None
Provides        : None
Depends On      : curl  expat  perl
Optional Deps   : tk: gitk and git gui
                  openssh: ssh transport and crypto
Required By     : git-lfs  tig
Conflicts With  : None
Download Size   : 6.50 MiB
Installed Size  : 36.79 MiB
Packager        : Christian Hesse <eworm@archlinux.org>
Build Date      : Sat Mar  4 22:12:50 2023
Install Reason  : Explicitly installed
Validated By    : Signature
Mystery Key     : ignored
";
        let mut pkg = Package::official("git", "2.40.0-1", "");
        apply_detail_output(&mut pkg, raw);

        assert!(pkg.detailed);
        assert_eq!(pkg.url, "https://git-scm.com/");
        let d = &pkg.details;
        assert_eq!(d.architecture, "x86_64");
        assert_eq!(d.licenses, vec!["GPL2"]);
        assert!(d.groups.is_empty());
        assert!(d.conflicts.is_empty());
        assert_eq!(d.depends, vec!["curl", "expat", "perl"]);
        assert_eq!(
            d.opt_depends,
            vec!["tk: gitk and git gui", "openssh: ssh transport and crypto"]
        );
        assert_eq!(d.required_by, vec!["git-lfs", "tig"]);
        assert_eq!(d.download_size, "6.50 MiB");
        assert_eq!(d.installed_size, "36.79 MiB");
        assert_eq!(d.install_reason, "Explicitly installed");
        assert_eq!(d.validated_by, "Signature");
        let expected = Utc.with_ymd_and_hms(2023, 3, 4, 22, 12, 50).unwrap();
        assert_eq!(d.build_date, expected.timestamp());
        assert_eq!(d.install_date, 0);
    }

    #[test]
    fn date_with_short_numeric_offset() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let expected = offset
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2005, 5, 10)
                    .unwrap()
                    .and_hms_opt(23, 30, 5)
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(
            parse_pacman_date("Tue 10 May 2005 11:30:05 PM +07"),
            expected.timestamp()
        );
    }

    #[test]
    fn date_with_zone_name_is_utc() {
        let expected = Utc.with_ymd_and_hms(2005, 5, 10, 23, 30, 5).unwrap();
        assert_eq!(
            parse_pacman_date("Tue 10 May 2005 11:30:05 PM UTC"),
            expected.timestamp()
        );
    }

    #[test]
    fn unparseable_date_is_zero() {
        assert_eq!(parse_pacman_date("sometime last week"), 0);
        assert_eq!(parse_pacman_date(""), 0);
    }
}

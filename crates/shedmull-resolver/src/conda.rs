//! Conda build pinning.
//!
//! A tool with exactly one package target is pinned to the newest conda
//! build of that name and version. Multi-package tools are left alone:
//! their image builds are disambiguated later by probing the depot.

use std::path::PathBuf;
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use shedmull_common::error::{Result, ShedmullError};
use shedmull_common::types::{PackageTarget, Resolved, ResolutionWarning};

/// Timestamps above this are milliseconds, below it seconds.
const MAX_SECONDS_TIMESTAMP: i64 = 253_402_300_799;

/// A build of a package as listed by the package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageBuild {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Build string.
    pub build: String,
    /// Upload time, when the index records one.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Package index queries.
pub trait PackageIndex {
    /// Lists the builds of `target`'s exact name and version.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be queried.
    fn builds(&self, target: &PackageTarget) -> Result<Vec<PackageBuild>>;
}

/// Package index backed by the `conda search` command.
#[derive(Debug, Clone)]
pub struct CondaCli {
    conda_bin: PathBuf,
    channels: Vec<String>,
}

impl CondaCli {
    /// Creates an index using the given executable and channels.
    #[must_use]
    pub const fn new(conda_bin: PathBuf, channels: Vec<String>) -> Self {
        Self {
            conda_bin,
            channels,
        }
    }

    fn command_args(&self, spec: &str) -> Vec<String> {
        let mut args = vec!["search".to_string(), "--json".to_string()];
        for channel in &self.channels {
            args.push("-c".to_string());
            args.push(channel.clone());
        }
        args.push(spec.to_string());
        args
    }
}

impl PackageIndex for CondaCli {
    fn builds(&self, target: &PackageTarget) -> Result<Vec<PackageBuild>> {
        let spec = search_spec(target);
        let program = which::which(&self.conda_bin).map_err(|_| ShedmullError::NotFound {
            kind: "executable",
            id: self.conda_bin.display().to_string(),
        })?;
        tracing::info!(%spec, "searching package index");
        let output = Command::new(&program)
            .args(self.command_args(&spec))
            .output()
            .map_err(|e| ShedmullError::io(&program, e))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            return parse_search_output(&stdout, target);
        }
        if is_not_found(&stdout) {
            return Ok(Vec::new());
        }
        Err(ShedmullError::Subprocess {
            program: program.display().to_string(),
            message: format!(
                "{} searching {spec}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Exact-match search spec for a target (`name==version`).
#[must_use]
pub fn search_spec(target: &PackageTarget) -> String {
    let name = target.package_name.to_lowercase();
    match &target.version {
        Some(version) => format!("{name}=={version}"),
        None => name,
    }
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    name: String,
    version: String,
    build: String,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Parses `conda search --json` output into the builds of `target`.
///
/// # Errors
///
/// Returns an error if the output is not valid JSON.
pub fn parse_search_output(stdout: &str, target: &PackageTarget) -> Result<Vec<PackageBuild>> {
    let value: Value = serde_json::from_str(stdout)?;
    let lowered = target.package_name.to_lowercase();
    let Some(entries) = value
        .get(&lowered)
        .or_else(|| value.get(&target.package_name))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };
    let builds = entries
        .iter()
        .filter_map(|e| match serde_json::from_value::<SearchEntry>(e.clone()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(package = %lowered, error = %err, "skipping unparsable search entry");
                None
            }
        })
        .filter(|e| target.version.as_deref().is_none_or(|v| v == e.version))
        .map(|e| PackageBuild {
            timestamp: e.timestamp.and_then(normalize_timestamp),
            name: e.name,
            version: e.version,
            build: e.build,
        })
        .collect();
    Ok(builds)
}

fn normalize_timestamp(raw: i64) -> Option<DateTime<Utc>> {
    if raw <= 0 {
        None
    } else if raw > MAX_SECONDS_TIMESTAMP {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

fn is_not_found(stdout: &str) -> bool {
    serde_json::from_str::<Value>(stdout)
        .ok()
        .and_then(|v| v.get("exception_name").and_then(Value::as_str).map(str::to_string))
        .is_some_and(|name| name == "PackagesNotFoundError")
}

/// Picks the most recently uploaded build; the first listed wins ties.
#[must_use]
pub fn most_recent(builds: &[PackageBuild]) -> Option<&PackageBuild> {
    builds
        .iter()
        .reduce(|best, b| if b.timestamp > best.timestamp { b } else { best })
}

/// Pins a single-package target set to its newest build.
///
/// Sets with zero or several targets, and unversioned single targets, are
/// returned unchanged.
///
/// # Errors
///
/// Returns an error if the package index query fails.
pub fn augment_targets(
    index: &dyn PackageIndex,
    targets: Vec<PackageTarget>,
) -> Result<Resolved<Vec<PackageTarget>>> {
    let [target] = targets.as_slice() else {
        return Ok(Resolved::clean(targets));
    };
    if target.version.is_none() {
        return Ok(Resolved::clean(targets));
    }
    let builds = index.builds(target)?;
    let Some(newest) = most_recent(&builds) else {
        let spec = search_spec(target);
        tracing::warn!(%spec, "no package index build found");
        let mut resolved = Resolved::clean(targets);
        resolved.warn(ResolutionWarning::PackageNotIndexed { spec });
        return Ok(resolved);
    };
    tracing::info!(
        package = %target.package_name,
        build = %newest.build,
        timestamp = ?newest.timestamp,
        "pinned conda build"
    );
    Ok(Resolved::clean(vec![target.refined(newest.build.clone())]))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct FakeIndex {
        builds: Vec<PackageBuild>,
        calls: Cell<usize>,
    }

    impl PackageIndex for FakeIndex {
        fn builds(&self, _target: &PackageTarget) -> Result<Vec<PackageBuild>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.builds.clone())
        }
    }

    fn build(name: &str, build: &str, ts: Option<i64>) -> PackageBuild {
        PackageBuild {
            name: name.into(),
            version: "1.0".into(),
            build: build.into(),
            timestamp: ts.and_then(normalize_timestamp),
        }
    }

    fn index(builds: Vec<PackageBuild>) -> FakeIndex {
        FakeIndex {
            builds,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn single_target_gets_newest_build() {
        let idx = index(vec![
            build("pkg", "h1_0", Some(1_600_000_000_000)),
            build("pkg", "h2_1", Some(1_700_000_000_000)),
            build("pkg", "h0_0", None),
        ]);
        let targets = vec![PackageTarget::new("Pkg", Some("1.0".into()))];
        let resolved = augment_targets(&idx, targets).unwrap();
        assert_eq!(resolved.value[0].build.as_deref(), Some("h2_1"));
        assert_eq!(resolved.value[0].package_name, "pkg");
        assert_eq!(resolved.value[0].package, "Pkg");
    }

    #[test]
    fn multi_target_set_is_not_augmented() {
        let idx = index(vec![build("pkg", "h1_0", Some(1))]);
        let targets = vec![
            PackageTarget::new("a", Some("1".into())),
            PackageTarget::new("b", Some("2".into())),
        ];
        let resolved = augment_targets(&idx, targets.clone()).unwrap();
        assert_eq!(resolved.value, targets);
        assert_eq!(idx.calls.get(), 0);
    }

    #[test]
    fn missing_builds_warn_and_keep_target() {
        let idx = index(Vec::new());
        let targets = vec![PackageTarget::new("pkg", Some("1.0".into()))];
        let resolved = augment_targets(&idx, targets).unwrap();
        assert!(resolved.value[0].build.is_none());
        assert_eq!(
            resolved.warnings,
            [ResolutionWarning::PackageNotIndexed {
                spec: "pkg==1.0".into()
            }]
        );
    }

    #[test]
    fn ties_keep_first_listed_build() {
        let builds = vec![build("p", "first", Some(5)), build("p", "second", Some(5))];
        assert_eq!(most_recent(&builds).unwrap().build, "first");
    }

    #[test]
    fn parse_search_output_filters_exact_version() {
        let stdout = r#"{"samtools": [
            {"name": "samtools", "version": "1.9", "build": "h8571acd_11", "timestamp": 1563000000000},
            {"name": "samtools", "version": "1.9.1", "build": "h0_0", "timestamp": 1600000000000}
        ]}"#;
        let target = PackageTarget::new("samtools", Some("1.9".into()));
        let builds = parse_search_output(stdout, &target).unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].build, "h8571acd_11");
        assert!(builds[0].timestamp.is_some());
    }

    #[test]
    fn unparsable_search_entries_are_skipped() {
        let stdout = r#"{"samtools": [
            {"name": "samtools", "version": "1.9"},
            {"name": "samtools", "version": "1.9", "build": "h8571acd_11"}
        ]}"#;
        let target = PackageTarget::new("samtools", Some("1.9".into()));
        let builds = parse_search_output(stdout, &target).unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].build, "h8571acd_11");
        assert!(builds[0].timestamp.is_none());
    }

    #[test]
    fn seconds_and_millis_timestamps_compare_correctly() {
        assert_eq!(normalize_timestamp(1_500_000_000), normalize_timestamp(1_500_000_000_000));
        assert!(normalize_timestamp(0).is_none());
    }

    #[test]
    fn not_found_error_is_recognised() {
        assert!(is_not_found(r#"{"exception_name": "PackagesNotFoundError"}"#));
        assert!(!is_not_found("garbage"));
    }

    #[test]
    fn command_args_include_channels_before_spec() {
        let cli = CondaCli::new(PathBuf::from("conda"), vec!["conda-forge".into(), "bioconda".into()]);
        assert_eq!(
            cli.command_args("bwa==0.7.17"),
            ["search", "--json", "-c", "conda-forge", "-c", "bioconda", "bwa==0.7.17"]
        );
    }
}

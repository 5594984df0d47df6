//! Mulled image naming.
//!
//! Reproduces the galaxy-tool-util naming contract bit for bit. A single
//! target is named `name:version--build`; several targets are named by
//! SHA-1 digests of their sorted names (and versions), so the result does
//! not depend on the order the targets were declared in.

use sha1::{Digest, Sha1};
use shedmull_common::types::{ImageIdentifier, MulledVersion, PackageTarget};

/// Names a target set under the given scheme.
///
/// `image_build` is the build number of the image itself (distinct from
/// the conda build of a package).
#[must_use]
pub fn image_name(
    version: MulledVersion,
    targets: &[PackageTarget],
    image_build: Option<&str>,
) -> ImageIdentifier {
    match version {
        MulledVersion::V1 => v1_image_name(targets, image_build),
        MulledVersion::V2 => v2_image_name(targets, image_build),
    }
}

/// Legacy naming: one hash over `name[=version[=build]]` lines.
#[must_use]
pub fn v1_image_name(targets: &[PackageTarget], image_build: Option<&str>) -> ImageIdentifier {
    if let [target] = targets {
        return simple_image_name(target, image_build);
    }
    let sorted = sorted_by_name(targets);
    let buffer = sorted
        .iter()
        .map(|t| conda_build_target_str(t))
        .collect::<Vec<_>>()
        .join("\n");
    let suffix = non_empty(image_build).map_or_else(String::new, |b| format!(":{b}"));
    ImageIdentifier::new(format!("mulled-v1-{}{suffix}", sha1_hex(&buffer)))
}

/// Current naming: a hash of the names as repository and a hash of the
/// versions as tag.
#[must_use]
pub fn v2_image_name(targets: &[PackageTarget], image_build: Option<&str>) -> ImageIdentifier {
    if let [target] = targets {
        return simple_image_name(target, image_build);
    }
    let sorted = sorted_by_name(targets);
    let names = sorted
        .iter()
        .map(|t| t.package_name.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let package_hash = sha1_hex(&names);

    let version_hash = if sorted.iter().any(|t| t.version.as_deref().is_some_and(|v| !v.is_empty())) {
        let versions = sorted
            .iter()
            .map(|t| t.version.as_deref().filter(|v| !v.is_empty()).unwrap_or("null"))
            .collect::<Vec<_>>()
            .join("\n");
        sha1_hex(&versions)
    } else {
        String::new()
    };

    let build_suffix = match non_empty(image_build) {
        None => String::new(),
        Some(b) if !version_hash.is_empty() => format!("-{b}"),
        Some(b) => b.to_string(),
    };
    let tag = format!("{version_hash}{build_suffix}");
    let suffix = if tag.is_empty() { String::new() } else { format!(":{tag}") };
    ImageIdentifier::new(format!("mulled-v2-{package_hash}{suffix}"))
}

/// `name[:version[--build]]`; an image build other than `"0"` stands in
/// for a missing conda build.
fn simple_image_name(target: &PackageTarget, image_build: Option<&str>) -> ImageIdentifier {
    let mut name = target.package_name.clone();
    if let Some(version) = &target.version {
        let build = target
            .build
            .as_deref()
            .or_else(|| image_build.filter(|b| *b != "0"));
        name.push(':');
        name.push_str(version);
        if let Some(build) = build {
            name.push_str("--");
            name.push_str(build);
        }
    }
    ImageIdentifier::new(name)
}

/// `name[=version[=build]]` as used in v1 hashing.
fn conda_build_target_str(target: &PackageTarget) -> String {
    let mut out = target.package_name.clone();
    if let Some(version) = target.version.as_deref().filter(|v| !v.is_empty()) {
        out.push('=');
        out.push_str(version);
        if let Some(build) = target.build.as_deref().filter(|b| !b.is_empty()) {
            out.push('=');
            out.push_str(build);
        }
    }
    out
}

fn sorted_by_name(targets: &[PackageTarget]) -> Vec<&PackageTarget> {
    let mut sorted: Vec<&PackageTarget> = targets.iter().collect();
    sorted.sort_by(|a, b| a.package_name.cmp(&b.package_name));
    sorted
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn sha1_hex(buffer: &str) -> String {
    hex::encode(Sha1::digest(buffer.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, version: Option<&str>) -> PackageTarget {
        PackageTarget::new(name, version.map(str::to_string))
    }

    fn samtools_bwa() -> Vec<PackageTarget> {
        vec![target("samtools", Some("1.3.1")), target("bwa", Some("0.7.13"))]
    }

    #[test]
    fn single_target_uses_name_and_version() {
        let targets = [target("samtools", Some("1.3.1"))];
        assert_eq!(v2_image_name(&targets, None).as_str(), "samtools:1.3.1");
        assert_eq!(v1_image_name(&targets, None).as_str(), "samtools:1.3.1");
    }

    #[test]
    fn single_target_with_conda_build() {
        let targets = [target("samtools", Some("1.3.1")).refined("py_1")];
        assert_eq!(v2_image_name(&targets, None).as_str(), "samtools:1.3.1--py_1");
        assert_eq!(v2_image_name(&targets, Some("0")).as_str(), "samtools:1.3.1--py_1");
    }

    #[test]
    fn single_target_image_build_zero_adds_no_suffix() {
        let targets = [target("samtools", Some("1.3.1"))];
        assert_eq!(v2_image_name(&targets, Some("0")).as_str(), "samtools:1.3.1");
        assert_eq!(v2_image_name(&targets, Some("2")).as_str(), "samtools:1.3.1--2");
    }

    #[test]
    fn single_unversioned_target_is_bare_name() {
        assert_eq!(v2_image_name(&[target("pigz", None)], None).as_str(), "pigz");
    }

    #[test]
    fn v2_multi_target_reference_names() {
        assert_eq!(
            v2_image_name(&samtools_bwa(), None).as_str(),
            "mulled-v2-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40:4d0535c94ef45be8459f429561f0894c3fe0ebcf"
        );
        let partly = [target("samtools", Some("1.3.1")), target("bwa", None)];
        assert_eq!(
            v2_image_name(&partly, None).as_str(),
            "mulled-v2-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40:b0c847e4fb89c343b04036e33b2daa19c4152cf5"
        );
        let versionless = [target("samtools", None), target("bwa", None)];
        assert_eq!(
            v2_image_name(&versionless, None).as_str(),
            "mulled-v2-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40"
        );
    }

    #[test]
    fn v1_multi_target_reference_names() {
        assert_eq!(
            v1_image_name(&samtools_bwa(), None).as_str(),
            "mulled-v1-b06ecbd9141f0dbbc0c287375fc0813adfcbdfbd"
        );
        let partly = [target("samtools", Some("1.3.1")), target("bwa", None)];
        assert_eq!(
            v1_image_name(&partly, None).as_str(),
            "mulled-v1-bda945976caa5734347fbf7f35066d9f58519e0c"
        );
        let versionless = [target("samtools", None), target("bwa", None)];
        assert_eq!(
            v1_image_name(&versionless, None).as_str(),
            "mulled-v1-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40"
        );
    }

    #[test]
    fn v1_hash_includes_conda_builds() {
        let targets = [
            target("samtools", Some("1.3.1")).refined("h2"),
            target("bwa", Some("0.7.13")).refined("h1"),
        ];
        assert_eq!(
            v1_image_name(&targets, None).as_str(),
            "mulled-v1-5f874872a948a7867c18c00c2553a3abf0906a4b"
        );
    }

    #[test]
    fn v2_is_order_independent() {
        let mut reversed = samtools_bwa();
        reversed.reverse();
        assert_eq!(v2_image_name(&samtools_bwa(), None), v2_image_name(&reversed, None));
    }

    #[test]
    fn v1_is_order_independent() {
        let mut reversed = samtools_bwa();
        reversed.reverse();
        assert_eq!(v1_image_name(&samtools_bwa(), None), v1_image_name(&reversed, None));
    }

    #[test]
    fn naming_is_deterministic() {
        let a = image_name(MulledVersion::V2, &samtools_bwa(), Some("1"));
        let b = image_name(MulledVersion::V2, &samtools_bwa(), Some("1"));
        assert_eq!(a, b);
    }

    #[test]
    fn multi_target_image_build_suffixes() {
        assert_eq!(
            v2_image_name(&samtools_bwa(), Some("3")).as_str(),
            "mulled-v2-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40:4d0535c94ef45be8459f429561f0894c3fe0ebcf-3"
        );
        let versionless = [target("samtools", None), target("bwa", None)];
        assert_eq!(
            v2_image_name(&versionless, Some("0")).as_str(),
            "mulled-v2-fe8faa35dbf6dc65a0f7f5d4ea12e31a79f73e40:0"
        );
        assert_eq!(
            v1_image_name(&samtools_bwa(), Some("1")).as_str(),
            "mulled-v1-b06ecbd9141f0dbbc0c287375fc0813adfcbdfbd:1"
        );
    }
}

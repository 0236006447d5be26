//! Cisco IOS and ASA version comparison
//!
//! Comparing Cisco IOS versions is error prone: releases live on multiple
//! trains and a higher number on one train is not newer than a lower number
//! on another (15.0(2)SE12 is newer than 15.2(2a)E1). Versions are only
//! ordered within the same train; everything else is incompatible.

use crate::{compare, compare_component, VersionOrder};
use regex::Regex;
use std::sync::LazyLock;

// Traditional IOS version: e.g. 15.0(2)SE12.
static RE_IOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)\((\d+)([a-zA-Z]+)?\)([a-zA-Z]+)?(\d+)?([a-z])?").unwrap()
});

// Code named IOS version: e.g. denali-16.3.1.
static RE_IOS_CODENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]+)?-?(\d+)\.(\d+)\.(\d+)").unwrap());

/// Components of a Cisco IOS version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct IosVersion {
    code_name: String, // e.g. denali, everest, fuji
    major: String,
    minor: String,
    build: String,
    interim_build: String,
    train: String,
    rebuild: String,
    sub_rebuild: String,
}

impl IosVersion {
    /// Order `self` (the target) against `template`. Versions whose
    /// code name, major, minor or train differ are incompatible; ordering
    /// across trains would need inventory lists from Cisco.
    fn compare(&self, template: &IosVersion) -> VersionOrder {
        if self.code_name != template.code_name
            || self.major != template.major
            || self.minor != template.minor
            || self.train != template.train
        {
            return VersionOrder::Incompatible;
        }

        let pairs = [
            (&template.major, &self.major),
            (&template.minor, &self.minor),
            (&template.train, &self.train),
            (&template.build, &self.build),
            (&template.interim_build, &self.interim_build),
            (&template.rebuild, &self.rebuild),
            (&template.sub_rebuild, &self.sub_rebuild),
        ];

        for (tpl_part, tgt_part) in pairs {
            if tpl_part.is_empty() && tgt_part.is_empty() {
                continue;
            }
            match compare_component(tpl_part, tgt_part) {
                VersionOrder::Equal => continue,
                order => return order,
            }
        }

        VersionOrder::Equal
    }
}

fn capture_str(caps: &regex::Captures<'_>, i: usize) -> String {
    caps.get(i).map_or(String::new(), |m| m.as_str().to_string())
}

/// Parse a traditional IOS version. The string must contain exactly one
/// version occurrence.
fn parse_ios(verstr: &str) -> Option<IosVersion> {
    let mut iter = RE_IOS.captures_iter(verstr);
    let caps = iter.next()?;
    if iter.next().is_some() {
        return None;
    }

    Some(IosVersion {
        major: capture_str(&caps, 1),
        minor: capture_str(&caps, 2),
        build: capture_str(&caps, 3),
        interim_build: capture_str(&caps, 4),
        train: capture_str(&caps, 5),
        rebuild: capture_str(&caps, 6),
        sub_rebuild: capture_str(&caps, 7),
        ..Default::default()
    })
}

/// Parse a code named IOS version (e.g. denali-16.2.2).
fn parse_ios_codenamed(verstr: &str) -> Option<IosVersion> {
    let mut iter = RE_IOS_CODENAME.captures_iter(verstr);
    let caps = iter.next()?;
    if iter.next().is_some() {
        return None;
    }

    Some(IosVersion {
        code_name: capture_str(&caps, 1),
        major: capture_str(&caps, 2),
        minor: capture_str(&caps, 3),
        build: capture_str(&caps, 4),
        ..Default::default()
    })
}

/// Compare versions for Cisco products. IOS and ASA get dedicated handling;
/// everything else falls back to the generic comparison.
pub fn compare_cisco(product: &str, template_ver: &str, target_ver: &str) -> VersionOrder {
    match product {
        "ios" => compare_cisco_ios(template_ver, target_ver),
        "adaptive_security_appliance_software" => compare_cisco_asa(template_ver, target_ver),
        _ => compare(template_ver, target_ver),
    }
}

/// Compare Cisco IOS versions. Both sides must parse with the same format
/// (traditional or code named), otherwise the pair is incompatible. When the
/// template carries no code name, the target's code name is ignored.
pub fn compare_cisco_ios(template_ver: &str, target_ver: &str) -> VersionOrder {
    // Check standard version string first.
    if let (Some(tpl), Some(tgt)) = (parse_ios(template_ver), parse_ios(target_ver)) {
        return tgt.compare(&tpl);
    }

    // Fall back to code named versions (e.g. denali-16.2.2).
    if let (Some(tpl), Some(mut tgt)) = (
        parse_ios_codenamed(template_ver),
        parse_ios_codenamed(target_ver),
    ) {
        if tpl.code_name.is_empty() {
            tgt.code_name.clear();
        }
        return tgt.compare(&tpl);
    }

    VersionOrder::Incompatible
}

// Cisco ASA version format 1: major(minor)build, as reported directly from
// the device. E.g. 9.5(1)201, 9.5(1) - equivalent to 9.5.1.201, 9.5.1.
static RE_ASA_FMT1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)\(([\d.]+)\)(\d+)?").unwrap());

// Cisco ASA version format 2: a.b.c.d, sometimes used by Cisco and NVD
// vulnerability reports. E.g. 9.5.1.201, 9.5.1.
static RE_ASA_FMT2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)\.(\d+\.?\d*)").unwrap());

/// Components of a Cisco ASA version. For 8.4(2.3)49 the major release is
/// 8.4, the minor release 2.3 and the build 49.
#[derive(Debug, Clone, Default)]
struct AsaVersion {
    major: String,
    minor: String,
    build: String,
}

impl AsaVersion {
    /// Order `self` (the target) against `template`, component-wise through
    /// the generic comparator.
    fn compare(&self, template: &AsaVersion) -> VersionOrder {
        let pairs = [
            (&template.major, &self.major),
            (&template.minor, &self.minor),
            (&template.build, &self.build),
        ];

        for (tpl_part, tgt_part) in pairs {
            if tpl_part.is_empty() && tgt_part.is_empty() {
                continue;
            }
            match compare(tpl_part, tgt_part) {
                VersionOrder::Equal => continue,
                order => return order,
            }
        }

        VersionOrder::Equal
    }
}

/// Parse Cisco ASA version information, trying format 1 then format 2.
fn parse_asa(verstr: &str) -> Option<AsaVersion> {
    if let Some(caps) = RE_ASA_FMT1.captures(verstr) {
        return Some(AsaVersion {
            major: capture_str(&caps, 1),
            minor: capture_str(&caps, 2),
            build: capture_str(&caps, 3),
        });
    }

    if let Some(caps) = RE_ASA_FMT2.captures(verstr) {
        return Some(AsaVersion {
            major: capture_str(&caps, 1),
            minor: capture_str(&caps, 2),
            ..Default::default()
        });
    }

    None
}

/// Compare Cisco ASA versions, falling back to the generic comparison when
/// either side fails to parse as an ASA version.
pub fn compare_cisco_asa(template_ver: &str, target_ver: &str) -> VersionOrder {
    let tpl = match parse_asa(template_ver) {
        Some(ver) => ver,
        None => return compare(template_ver, target_ver),
    };
    let tgt = match parse_asa(target_ver) {
        Some(ver) => ver,
        None => return compare(template_ver, target_ver),
    };

    tgt.compare(&tpl)
}

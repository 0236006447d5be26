//! Juniper Junos version comparison
//!
//! Junos versions look like 12.2R6.1 or 12.1X44-D10.4: major.minor, a
//! release type letter (R: normal, I: internal, F: feature, S: service,
//! B: beta, X: exception), a build, an optional maintenance release and an
//! optional spin. Versions are only ordered when major, minor, type and
//! build all agree; for Junos the data carries one entry per build naming
//! the lowest vulnerable patch, so cross-build ordering would create false
//! positives.

use crate::{compare_component, VersionOrder};
use regex::Regex;
use std::sync::LazyLock;

static RE_JUNOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)([a-zA-Z]+)(\d+)-?([a-zA-Z]\d+)?\.?(\d+)?").unwrap());

/// Components of a Juniper Junos firmware version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunosVersion {
    pub major: String,               // for 12.2R6.1: "12"
    pub minor: String,               // for 12.2R6.1: "2"
    pub release_type: String,        // for 12.2R6.1: "R"
    pub build: String,               // for 12.2R6.1: "6", for 12.1X44-D10.4: "44"
    pub maintenance_release: String, // for 12.1X44-D10.4: "D10", empty for 10.4S4.2
    pub spin: String,                // for 12.2R6.1: "1", for 12.1X44-D10.4: "4"
}

impl JunosVersion {
    /// Order `self` (the target) against `template`. Major, minor, type and
    /// build must all agree, otherwise the pair is incompatible
    /// (15.1X48-D160 and 15.1X49-D20 cannot be ordered, whereas
    /// 15.1X49-D10 < 15.1X49-D160).
    fn compare(&self, template: &JunosVersion) -> VersionOrder {
        if self.major != template.major
            || self.minor != template.minor
            || self.release_type != template.release_type
            || self.build != template.build
        {
            return VersionOrder::Incompatible;
        }

        // Split D160 into "D" and "160".
        let (tgt_patch_type, tgt_patch_rest) = split_maintenance(&self.maintenance_release);
        let (tpl_patch_type, tpl_patch_rest) = split_maintenance(&template.maintenance_release);

        let pairs = [
            (template.major.as_str(), self.major.as_str()),
            (template.minor.as_str(), self.minor.as_str()),
            (template.release_type.as_str(), self.release_type.as_str()),
            (template.build.as_str(), self.build.as_str()),
            (tpl_patch_type, tgt_patch_type),
            (tpl_patch_rest, tgt_patch_rest),
            (template.spin.as_str(), self.spin.as_str()),
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

fn split_maintenance(maintenance: &str) -> (&str, &str) {
    if maintenance.is_empty() {
        ("", "")
    } else {
        maintenance.split_at(1)
    }
}

/// Parse a Junos version string (uppercased). The string must contain
/// exactly one version occurrence.
pub fn parse_junos_version(raw: &str) -> Option<JunosVersion> {
    let raw = raw.to_uppercase();

    let mut iter = RE_JUNOS.captures_iter(&raw);
    let caps = iter.next()?;
    if iter.next().is_some() {
        return None;
    }

    let get = |i: usize| caps.get(i).map_or(String::new(), |m| m.as_str().to_string());
    Some(JunosVersion {
        major: get(1),
        minor: get(2),
        release_type: get(3),
        build: get(4),
        maintenance_release: get(5),
        spin: get(6),
    })
}

/// Compare versions for Juniper Junos products. A side whose parsed
/// maintenance release is empty takes it from that side's separate patch
/// string (CPE stores the D-patch in the update field).
pub fn compare_junos(
    template_ver: &str,
    target_ver: &str,
    template_patch: &str,
    target_patch: &str,
) -> VersionOrder {
    let template_patch = template_patch.to_uppercase();
    let target_patch = target_patch.to_uppercase();

    let (mut tpl, mut tgt) = match (
        parse_junos_version(template_ver),
        parse_junos_version(target_ver),
    ) {
        (Some(tpl), Some(tgt)) => (tpl, tgt),
        _ => return VersionOrder::Incompatible,
    };

    if tpl.maintenance_release.is_empty() {
        tpl.maintenance_release = template_patch;
    }
    if tgt.maintenance_release.is_empty() {
        tgt.maintenance_release = target_patch;
    }

    tgt.compare(&tpl)
}

//! VulnMatch Version - Vendor-aware version comparison
//!
//! Version strings in vulnerability data cannot be compared with a plain
//! semver ordering: Cisco IOS trains, Junos release branches, and Adobe's
//! year-prefixed Acrobat versions all carry structure where an ordering only
//! exists inside the same lineage. Every comparator here therefore returns a
//! four-valued [`VersionOrder`] whose `Incompatible` variant means "no
//! meaningful ordering exists - do not match".
//!
//! All comparators take the *template* version (from the vulnerability data)
//! first and the *target* version (from the inventory) second, and order the
//! target against the template: `Greater` means the target is newer.

pub mod adobe;
pub mod cisco;
pub mod juniper;

use regex::Regex;
use std::sync::LazyLock;

/// Outcome of comparing a target version against a template version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// Target is older than the template
    Less,
    /// Versions are equal
    Equal,
    /// Target is newer than the template
    Greater,
    /// No meaningful ordering exists; treat as a non-match
    Incompatible,
}

impl VersionOrder {
    /// The order with template and target swapped. `Incompatible` is
    /// symmetric.
    pub fn reversed(self) -> VersionOrder {
        match self {
            VersionOrder::Less => VersionOrder::Greater,
            VersionOrder::Greater => VersionOrder::Less,
            other => other,
        }
    }
}

static RE_VERSION_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.?(\d+)?\(?(\d+)?\)?([a-zA-Z]+)?\.?([a-zA-Z]+)?(\d+)?\.?(\d+)?\.?(\d+)?-?([a-z]?)(\d+)?")
        .unwrap()
});

/// Compare `target` against `template` using the generic tokenization.
///
/// Designed for matching inventory products against vulnerability templates;
/// an absolute major-version distance above 1000 is declared incompatible so
/// calendar versions (2014) are never ordered against semantic ones (14.1).
pub fn compare(template: &str, target: &str) -> VersionOrder {
    let template = template.trim();
    let target = target.trim();
    if template.to_lowercase() == target.to_lowercase() {
        return VersionOrder::Equal;
    }

    let tpl_caps = match RE_VERSION_PARTS.captures(template) {
        Some(caps) => caps,
        None => return VersionOrder::Greater,
    };
    let tgt_caps = match RE_VERSION_PARTS.captures(target) {
        Some(caps) => caps,
        None => return VersionOrder::Less,
    };

    for i in 1..tpl_caps.len() {
        let tpl_part = tpl_caps.get(i).map_or("", |m| m.as_str());
        let tgt_part = tgt_caps.get(i).map_or("", |m| m.as_str());

        if tpl_part.is_empty() && tgt_part.is_empty() {
            continue;
        }

        if i == 1 {
            if let (Ok(tpl_major), Ok(tgt_major)) =
                (tpl_part.parse::<i64>(), tgt_part.parse::<i64>())
            {
                if (tgt_major - tpl_major).abs() > 1000 {
                    return VersionOrder::Incompatible;
                }
            }
        }

        match compare_component(tpl_part, tgt_part) {
            VersionOrder::Equal => continue,
            order => return order,
        }
    }

    VersionOrder::Equal
}

/// Compare a single version component pair, numeric first with lexical
/// fallback. An empty component counts as numeric zero.
pub(crate) fn compare_component(template: &str, target: &str) -> VersionOrder {
    let tpl_num = if template.is_empty() {
        Some(0i64)
    } else {
        template.parse::<i64>().ok()
    };
    let tgt_num = if target.is_empty() {
        Some(0i64)
    } else {
        target.parse::<i64>().ok()
    };

    match (tpl_num, tgt_num) {
        (Some(tpl), Some(tgt)) => {
            if tgt > tpl {
                VersionOrder::Greater
            } else if tpl > tgt {
                VersionOrder::Less
            } else {
                VersionOrder::Equal
            }
        }
        _ => {
            if target > template {
                VersionOrder::Greater
            } else if template > target {
                VersionOrder::Less
            } else {
                VersionOrder::Equal
            }
        }
    }
}

/// Compare patch strings. An empty template patch always loses to the
/// target; otherwise the generic comparator decides.
pub fn compare_patch(template: &str, target: &str) -> VersionOrder {
    if template == target {
        return VersionOrder::Equal;
    }
    if template.is_empty() {
        return VersionOrder::Greater;
    }
    compare(template, target)
}

/// Signature of a vendor-specific comparator entry.
type VendorComparator =
    fn(product: &str, tpl_ver: &str, tgt_ver: &str, tpl_patch: &str, tgt_patch: &str) -> VersionOrder;

/// Registry of vendor-specific comparators. Vendors not listed here use the
/// generic version comparison with patch tie-breaking.
const VENDOR_COMPARATORS: &[(&str, VendorComparator)] = &[
    ("cisco", cisco_entry),
    ("adobe", adobe_entry),
    ("juniper", juniper_entry),
];

fn cisco_entry(product: &str, tpl_ver: &str, tgt_ver: &str, _: &str, _: &str) -> VersionOrder {
    cisco::compare_cisco(product, tpl_ver, tgt_ver)
}

fn adobe_entry(product: &str, tpl_ver: &str, tgt_ver: &str, _: &str, _: &str) -> VersionOrder {
    adobe::compare_adobe(product, tpl_ver, tgt_ver)
}

fn juniper_entry(
    _: &str,
    tpl_ver: &str,
    tgt_ver: &str,
    tpl_patch: &str,
    tgt_patch: &str,
) -> VersionOrder {
    juniper::compare_junos(tpl_ver, tgt_ver, tpl_patch, tgt_patch)
}

/// Compare versions for a specific `product` from `vendor`, dispatching to
/// the vendor comparator when one is registered.
pub fn compare_product(
    vendor: &str,
    product: &str,
    tpl_ver: &str,
    tgt_ver: &str,
    tpl_patch: &str,
    tgt_patch: &str,
) -> VersionOrder {
    if let Some((_, comparator)) = VENDOR_COMPARATORS.iter().find(|(name, _)| *name == vendor) {
        return comparator(product, tpl_ver, tgt_ver, tpl_patch, tgt_patch);
    }

    let order = compare(tpl_ver, tgt_ver);
    if order == VersionOrder::Equal {
        return compare_patch(tpl_patch, tgt_patch);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use VersionOrder::*;

    #[test]
    fn test_compare_generic() {
        let cases = [
            ("1.2.3", "1.2.3", Equal),
            ("1.2.3", "1.2.4", Greater),
            ("1.2.4", "1.2.3", Less),
            ("1.9", "1.10", Greater),
            ("2.17.0", "2.14.1", Less),
            ("7.51", "7.51", Equal),
            ("10.0", "10.0.1", Greater),
            ("8.0.6001", "8.0.6001", Equal),
        ];
        for (template, target, expected) in cases {
            assert_eq!(
                compare(template, target),
                expected,
                "compare({:?}, {:?})",
                template,
                target
            );
        }
    }

    #[test]
    fn test_compare_calendar_versions_incompatible() {
        assert_eq!(compare("2014", "14.1"), Incompatible);
        assert_eq!(compare("14.1", "2014"), Incompatible);
    }

    #[test]
    fn test_compare_case_and_whitespace() {
        assert_eq!(compare("8.0a", "8.0A"), Equal);
        assert_eq!(compare(" 1.2 ", "1.2"), Equal);
    }

    #[test]
    fn test_compare_unparseable_sides() {
        // No tokens on the template side: target wins.
        assert_eq!(compare("beta", "1.0"), Greater);
        // No tokens on the target side: target loses.
        assert_eq!(compare("1.0", "beta"), Less);
    }

    #[test]
    fn test_compare_antisymmetry() {
        let versions = ["1.2.3", "1.2.4", "1.10", "2.0", "9.5", "8.0a"];
        for a in versions {
            for b in versions {
                let forward = compare(a, b);
                if forward != Incompatible {
                    assert_eq!(compare(b, a), forward.reversed(), "{} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_compare_patch() {
        assert_eq!(compare_patch("", "sp1"), Greater);
        assert_eq!(compare_patch("sp1", "sp1"), Equal);
        assert_eq!(compare_patch("", ""), Equal);
        assert_eq!(compare_patch("sp1", "sp2"), Greater);
    }

    #[test]
    fn test_compare_product_dispatch() {
        // Generic vendor: patch breaks the tie.
        assert_eq!(
            compare_product("mozilla", "firefox", "61.0", "61.0", "", "x"),
            Greater
        );
        assert_eq!(
            compare_product("mozilla", "firefox", "61.0", "62.0", "", ""),
            Greater
        );
        // Cisco IOS routes to the train-aware comparator.
        assert_eq!(
            compare_product("cisco", "ios", "15.0(2)SE12", "15.2(2a)E1", "", ""),
            Incompatible
        );
        // Juniper routes to the Junos comparator.
        assert_eq!(
            compare_product("juniper", "junos", "12.1x46", "12.1x46", "d15", "d50"),
            Greater
        );
    }
}

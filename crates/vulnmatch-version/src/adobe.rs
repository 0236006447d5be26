//! Adobe Acrobat version comparison
//!
//! Acrobat's continuous track uses year-prefixed versions (2015.006.30060)
//! while the classic track reports the bare major (15.006.30060). Majors in
//! the 15-99 range are normalized to their year form before comparing; a
//! year-form version never orders against a short-form one.

use crate::{compare, VersionOrder};
use regex::Regex;
use std::sync::LazyLock;

static RE_ADOBE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,4})\.(\d{1,3})\.(\d{2,5})").unwrap());

/// Compare versions for Adobe products. Only Acrobat products get the year
/// normalization; everything else falls back to the generic comparison.
pub fn compare_adobe(product: &str, template_ver: &str, target_ver: &str) -> VersionOrder {
    if !product.starts_with("acrobat") {
        return compare(template_ver, target_ver);
    }

    let (tpl_caps, tgt_caps) = match (RE_ADOBE.captures(template_ver), RE_ADOBE.captures(target_ver))
    {
        (Some(tpl), Some(tgt)) => (tpl, tgt),
        _ => return compare(template_ver, target_ver),
    };

    let tpl_major: i64 = match tpl_caps[1].parse() {
        Ok(major) => major,
        Err(_) => return compare(template_ver, target_ver),
    };
    let tgt_major: i64 = match tgt_caps[1].parse() {
        Ok(major) => major,
        Err(_) => return compare(template_ver, target_ver),
    };

    let mut tpl_ver = format!("{}.{}.{}", &tpl_caps[1], &tpl_caps[2], &tpl_caps[3]);
    let mut tgt_ver = format!("{}.{}.{}", &tgt_caps[1], &tgt_caps[2], &tgt_caps[3]);

    if tpl_ver.len() == 12 && (15..100).contains(&tpl_major) {
        tpl_ver = format!("20{}", tpl_ver);
    }
    if tgt_ver.len() == 12 && (15..100).contains(&tgt_major) {
        tgt_ver = format!("20{}", tgt_ver);
    }

    if (tpl_ver.len() == 14 || tgt_ver.len() == 14) && tpl_ver.len() != tgt_ver.len() {
        return VersionOrder::Incompatible;
    }

    compare(&tpl_ver, &tgt_ver)
}

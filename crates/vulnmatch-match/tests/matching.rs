//! End-to-end matching against a freshly built artifact.

use serde_json::{json, Value};
use std::path::PathBuf;
use vulnmatch_db::VulnDb;
use vulnmatch_ingest::BuildParams;
use vulnmatch_match::{get_advisory, match_cves};

fn cvss3(score: f64) -> Value {
    json!({"baseMetricV3": {"cvssV3": {
        "vectorString": "CVSS:3.0/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
        "attackVector": "NETWORK", "attackComplexity": "LOW",
        "privilegesRequired": "NONE", "userInteraction": "NONE",
        "scope": "UNCHANGED", "confidentialityImpact": "HIGH",
        "integrityImpact": "HIGH", "availabilityImpact": "HIGH",
        "baseScore": score, "baseSeverity": "HIGH"
    }}})
}

fn item(cve: &str, score: f64, cpe_matches: Value) -> Value {
    json!({
        "cve": {
            "CVE_data_meta": {"ID": cve},
            "description": {"description_data": [
                {"lang": "en", "value": format!("Issue tracked as {}.", cve)}
            ]}
        },
        "configurations": {"nodes": [{"operator": "OR", "cpe_match": cpe_matches}]},
        "impact": cvss3(score),
        "publishedDate": "2018-01-10T14:29Z",
        "lastModifiedDate": "2018-02-10T14:29Z"
    })
}

fn exact_cpe(uri: &str) -> Value {
    json!([{"vulnerable": true, "cpe23Uri": uri}])
}

fn ranged_cpe(uri: &str, range: Value) -> Value {
    let mut entry = json!({"vulnerable": true, "cpe23Uri": uri});
    entry
        .as_object_mut()
        .unwrap()
        .extend(range.as_object().unwrap().clone());
    json!([entry])
}

fn junos(version: &str, patch: &str) -> Value {
    exact_cpe(&format!("cpe:2.3:o:juniper:junos:{}:{}:*:*:*:*:*:*", version, patch))
}

fn feed() -> Value {
    json!({"CVE_Items": [
        // Juniper Junos: one exact item per patch level.
        item("CVE-2018-0007", 9.8, junos("12.1x46", "d50")),
        item("CVE-2016-1279", 7.5, junos("12.1x46", "d50")),
        item("CVE-2017-2345", 6.5, junos("12.1x46", "d50")),
        item("CVE-2018-0001", 5.5, junos("12.1x46", "d50")),
        item("CVE-2017-2349", 5.0, junos("12.1x46", "d50")),
        item("CVE-2019-0999", 4.0, junos("12.1x46", "d50")),
        item("CVE-2016-9999", 9.9, junos("12.1x46", "d45")),
        item("CVE-2015-8888", 10.0, junos("15.1x49", "d50")),
        // VLC: iOS-only issue below 3.1.5.
        item("CVE-2018-19937", 9.8, ranged_cpe(
            "cpe:2.3:a:videolan:vlc_media_player:*:*:*:*:*:iphone_os:*:*",
            json!({"versionEndExcluding": "3.1.5"}),
        )),
        // Chrome below 64.0.3282.119.
        item("CVE-2018-6056", 8.8, ranged_cpe(
            "cpe:2.3:a:google:chrome:*:*:*:*:*:*:*:*",
            json!({"versionEndExcluding": "64.0.3282.119"}),
        )),
        // Firefox below 58.0.1.
        item("CVE-2018-5124", 8.1, ranged_cpe(
            "cpe:2.3:a:mozilla:firefox:*:*:*:*:*:*:*:*",
            json!({"versionEndExcluding": "58.0.1"}),
        )),
        // 7-Zip below 18.0.
        item("CVE-2016-2334", 7.8, ranged_cpe(
            "cpe:2.3:a:igor_pavlov:7-zip:*:*:*:*:*:*:*:*",
            json!({"versionEndExcluding": "18.0"}),
        )),
        // Oracle JDK below 9.0 - on the ignore list.
        item("CVE-2017-10102", 9.0, ranged_cpe(
            "cpe:2.3:a:oracle:jdk:*:*:*:*:*:*:*:*",
            json!({"versionEndExcluding": "9.0"}),
        )),
        // Cisco ASA, exact device-format version.
        item("CVE-2018-0101", 10.0, exact_cpe(
            "cpe:2.3:a:cisco:adaptive_security_appliance_software:9.5(1)201:*:*:*:*:*:*:*",
        )),
        // Start bound only: can never match.
        item("CVE-2014-1234", 5.0, ranged_cpe(
            "cpe:2.3:a:example:rangeonly:*:*:*:*:*:*:*:*",
            json!({"versionStartIncluding": "1.0"}),
        )),
    ]})
}

const VENDOR_ALIASES: &str = r#"
<vendor-aliases>
  <vendor-alias for="google">Google Inc.</vendor-alias>
  <vendor-alias for="mozilla">The Mozilla Foundation</vendor-alias>
</vendor-aliases>
"#;

const PRODUCT_ALIASES: &str = r#"
<product-aliases>
  <product vendor="google" product="chrome">
    <alias vendor="Google Inc." product="Google Chrome*"/>
  </product>
  <product vendor="igor_pavlov" product="7-zip">
    <alias vendor="Igor Pavlov" product="7-Zip*"/>
  </product>
</product-aliases>
"#;

const IGNORE_LIST: &str = r#"
<ignore-list>
  <ignore vendor="oracle" product="jdk*"/>
</ignore-list>
"#;

fn build_artifact(dir: &std::path::Path) -> PathBuf {
    let write = |name: &str, content: &str| -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    };

    let params = BuildParams {
        db_path: dir.join("vulndb.sqlite"),
        cve_paths: vec![write("nvdcve-1.1-2018.json", &feed().to_string())],
        vendor_aliases_path: write("vendor_aliases.xml", VENDOR_ALIASES),
        product_aliases_path: write("product_aliases.xml", PRODUCT_ALIASES),
        ignore_list_path: write("ignore_list.xml", IGNORE_LIST),
        ..Default::default()
    };

    vulnmatch_ingest::build(&params).unwrap();
    params.db_path
}

fn matched_cves(
    session: &mut vulnmatch_db::Session,
    systype: &str,
    publisher: &str,
    title: &str,
    version: &str,
    patch: &str,
    target_sw: &str,
) -> Vec<String> {
    match_cves(session, systype, publisher, title, version, patch, target_sw)
        .unwrap()
        .into_iter()
        .map(|m| m.advisory.cve_id)
        .collect()
}

#[test]
fn test_junos_patch_level_matching() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    // Six advisories share the d50 item; the lowest-scored one falls off the
    // top-5 cap, the d45 and 15.1x49 items do not match at all. Output is
    // sorted by CVE id.
    let cves = matched_cves(&mut session, "o", "juniper", "junos", "12.1x46", "d50", "");
    assert_eq!(
        cves,
        vec![
            "CVE-2016-1279",
            "CVE-2017-2345",
            "CVE-2017-2349",
            "CVE-2018-0001",
            "CVE-2018-0007",
        ]
    );

    // Another release train resolves nothing.
    let cves = matched_cves(&mut session, "o", "juniper", "junos", "17.3r1", "", "");
    assert!(cves.is_empty());
}

#[test]
fn test_vlc_sw_target_specificity() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let matches = match_cves(
        &mut session,
        "a",
        "videolan",
        "vlc_media_player",
        "3.0.0",
        "",
        "ios",
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].advisory.cve_id, "CVE-2018-19937");
    assert!(matches[0].targeted_sw);

    // Wrong platform, fixed version, and no platform at all.
    assert!(matched_cves(&mut session, "a", "videolan", "vlc_media_player", "3.0.0", "", "windows").is_empty());
    assert!(matched_cves(&mut session, "a", "videolan", "vlc_media_player", "3.1.5", "", "ios").is_empty());
    assert!(matched_cves(&mut session, "a", "videolan", "vlc_media_player", "3.0.0", "", "").is_empty());
}

#[test]
fn test_chrome_via_product_alias() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(
        &mut session,
        "a",
        "Google Inc.",
        "Google Chrome 63.0",
        "63.0.3239.132",
        "",
        "",
    );
    assert_eq!(cves, vec!["CVE-2018-6056"]);

    // Patched version is outside the range.
    let cves = matched_cves(
        &mut session,
        "a",
        "Google Inc.",
        "Google Chrome 65.0",
        "65.0.3325.146",
        "",
        "",
    );
    assert!(cves.is_empty());
}

#[test]
fn test_firefox_via_cpe_friendly_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    // Publisher resolves via the CPE-friendly vendor name, the title via the
    // CPE-friendly product name.
    let cves = matched_cves(
        &mut session,
        "a",
        "Mozilla",
        "Mozilla Firefox 57.0 (x64 en-US)",
        "57.0",
        "",
        "",
    );
    assert_eq!(cves, vec!["CVE-2018-5124"]);

    // The same via a vendor alias.
    let cves = matched_cves(
        &mut session,
        "a",
        "The Mozilla Foundation",
        "Mozilla Firefox 57.0 (x64 en-US)",
        "57.0",
        "",
        "",
    );
    assert_eq!(cves, vec!["CVE-2018-5124"]);
}

#[test]
fn test_7zip_alias_glob() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(
        &mut session,
        "a",
        "Igor Pavlov",
        "7-Zip 9.20 (x64 edition)",
        "9.20",
        "",
        "",
    );
    assert_eq!(cves, vec!["CVE-2016-2334"]);
}

#[test]
fn test_ignore_list_filters_product() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(&mut session, "a", "oracle", "jdk", "1.8.0", "", "");
    assert!(cves.is_empty());
}

#[test]
fn test_cisco_asa_exact_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(
        &mut session,
        "a",
        "cisco",
        "adaptive_security_appliance_software",
        "9.5(1)201",
        "",
        "",
    );
    assert_eq!(cves, vec!["CVE-2018-0101"]);

    let cves = matched_cves(
        &mut session,
        "a",
        "cisco",
        "adaptive_security_appliance_software",
        "9.995(1)201",
        "",
        "",
    );
    assert!(cves.is_empty());
}

#[test]
fn test_start_only_range_never_matches() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(&mut session, "a", "example", "rangeonly", "2.0", "", "");
    assert!(cves.is_empty());
}

#[test]
fn test_unknown_publisher_resolves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let cves = matched_cves(&mut session, "a", "Acme Ltd.", "Roadrunner Trap 1.0", "1.0", "", "");
    assert!(cves.is_empty());
}

#[test]
fn test_matching_is_deterministic_and_cached() {
    let dir = tempfile::tempdir().unwrap();
    let mut vdb = VulnDb::open(build_artifact(dir.path())).unwrap();
    let mut session = vdb.session().unwrap();

    let first = match_cves(&mut session, "o", "juniper", "junos", "12.1x46", "d50", "").unwrap();
    let second = match_cves(&mut session, "o", "juniper", "junos", "12.1x46", "d50", "").unwrap();
    assert_eq!(first, second);

    // A fresh session over the same artifact returns the same result.
    let mut other = vdb.session().unwrap();
    let third = match_cves(&mut other, "o", "juniper", "junos", "12.1x46", "d50", "").unwrap();
    assert_eq!(first, third);

    // Matched advisories can be fetched back by CVE id, case-insensitively.
    let advisory = get_advisory(&session, "cve-2018-0007").unwrap().unwrap();
    assert_eq!(advisory.cvss3_base_score, Some(9.8));
}

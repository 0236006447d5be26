//! Full artifact builds from synthetic feeds.

use serde_json::json;
use vulnmatch_db::{Session, VulnDb, Windows10Version, SOURCE_CPE, SOURCE_MSRC, SOURCE_REDHAT_OVAL};
use vulnmatch_ingest::redhat::{OvalAdvisory, OvalCve, OvalDate, OvalDefinition, OvalRelease};
use vulnmatch_ingest::BuildParams;

const EMPTY_VENDOR_ALIASES: &str = "<vendor-aliases></vendor-aliases>";
const EMPTY_PRODUCT_ALIASES: &str = "<product-aliases></product-aliases>";
const EMPTY_IGNORE_LIST: &str = "<ignore-list></ignore-list>";

fn nvd_feed() -> String {
    json!({"CVE_Items": [
        {
            "cve": {
                "CVE_data_meta": {"ID": "CVE-2019-0841"},
                "description": {"description_data": [
                    {"lang": "en", "value": "Windows AppX privilege escalation."}
                ]}
            },
            "configurations": {"nodes": [{"operator": "OR", "cpe_match": [
                {"vulnerable": true,
                 "cpe23Uri": "cpe:2.3:o:microsoft:windows_10:1809:*:*:*:*:*:x64:*"},
                {"vulnerable": true,
                 "cpe23Uri": "cpe:2.3:o:microsoft:windows_server_2019:-:*:*:*:*:*:*:*"}
            ]}]},
            "impact": {"baseMetricV3": {"cvssV3": {
                "vectorString": "CVSS:3.0/AV:L/AC:L/PR:L/UI:N/S:U/C:H/I:H/A:H",
                "attackVector": "LOCAL", "attackComplexity": "LOW",
                "privilegesRequired": "LOW", "userInteraction": "NONE",
                "scope": "UNCHANGED", "confidentialityImpact": "HIGH",
                "integrityImpact": "HIGH", "availabilityImpact": "HIGH",
                "baseScore": 7.8, "baseSeverity": "HIGH"
            }}},
            "publishedDate": "2019-04-09T21:29Z",
            "lastModifiedDate": "2019-04-15T17:52Z"
        }
    ]})
    .to_string()
}

fn msrc_feed() -> String {
    json!({"vulnerabilities": {
        "CVE-2019-0708": [
            {"product": "Windows Server 2008 R2 for x64-based Systems Service Pack 1"}
        ],
        "CVE-2019-0841": [
            {"product": "Microsoft Windows 10 Version 1809 for x64-based Systems"}
        ]
    }})
    .to_string()
}

fn redhat_release() -> OvalRelease {
    OvalRelease {
        release: "7".into(),
        definitions: vec![OvalDefinition {
            description: "TCP SACK panic.".into(),
            advisory: OvalAdvisory {
                issued: OvalDate { date: "2019-06-17".into() },
                updated: OvalDate { date: "2019-06-20".into() },
                cves: vec![OvalCve {
                    cve_id: "CVE-2019-11477".into(),
                    cvss3: "CVSS:3.0/AV:N/AC:H/PR:N/UI:N/S:U/C:N/I:N/A:H".into(),
                    href: "https://access.redhat.com/security/cve/CVE-2019-11477".into(),
                }],
            },
        }],
    }
}

fn build_params(dir: &std::path::Path) -> BuildParams {
    let write = |name: &str, content: &str| {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    };

    BuildParams {
        db_path: dir.join("vulndb.sqlite"),
        cve_paths: vec![write("nvdcve-1.1-2019.json", &nvd_feed())],
        vendor_aliases_path: write("vendor_aliases.xml", EMPTY_VENDOR_ALIASES),
        product_aliases_path: write("product_aliases.xml", EMPTY_PRODUCT_ALIASES),
        ignore_list_path: write("ignore_list.xml", EMPTY_IGNORE_LIST),
        msrc_path: Some(write("msrc.json", &msrc_feed())),
        redhat_releases: vec![redhat_release()],
        windows10_versions: vec![
            Windows10Version {
                version: "1809".into(),
                os_build: "17763.107".into(),
                availability_date: "2018-11-13".into(),
            },
            Windows10Version {
                version: "1809".into(),
                os_build: "17763.134".into(),
                availability_date: "2018-11-27".into(),
            },
        ],
    }
}

fn links_by_source(session: &Session, source: &str) -> Vec<(i64, i64)> {
    session
        .find_platform_vulnerabilities()
        .unwrap()
        .into_iter()
        .filter(|pv| pv.source == source)
        .map(|pv| (pv.platform_id, pv.vulnerability_id))
        .collect()
}

#[test]
fn test_build_full_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let params = build_params(dir.path());

    let stats = vulnmatch_ingest::build(&params).unwrap();
    assert!(stats.total_inserts > 0);
    assert_eq!(stats.windows10_versions, 1);

    let mut vdb = VulnDb::open(&params.db_path).unwrap();
    let session = vdb.session().unwrap();

    // NVD advisory present, lookup is case-insensitive.
    let nvd_advisory = session.advisory_by_cve("cve-2019-0841").unwrap().unwrap();
    assert_eq!(nvd_advisory.cvss3_base_score, Some(7.8));
    assert_eq!(nvd_advisory.has_patch, None);

    // OS-type CPEs produced platform links: Windows 10 (7) and Windows
    // Server 2019 (12).
    let cpe_links = links_by_source(&session, SOURCE_CPE);
    assert!(cpe_links.contains(&(7, nvd_advisory.id)));
    assert!(cpe_links.contains(&(12, nvd_advisory.id)));

    // MSRC linked the NVD advisory to Windows 10 again (its own dedup scope)
    // and created a minimal advisory for the CVE missing from NVD.
    let msrc_links = links_by_source(&session, SOURCE_MSRC);
    assert!(msrc_links.contains(&(7, nvd_advisory.id)));

    let msrc_advisory = session.advisory_by_cve_exact("CVE-2019-0708").unwrap().unwrap();
    assert_eq!(msrc_advisory.summary, "");
    assert!(msrc_links.contains(&(8, msrc_advisory.id)));

    // Red Hat OVAL created its advisory and linked Redhat Linux 7 (16).
    let rh_advisory = session.advisory_by_cve_exact("CVE-2019-11477").unwrap().unwrap();
    assert_eq!(rh_advisory.summary, "TCP SACK panic.");
    assert_eq!(
        links_by_source(&session, SOURCE_REDHAT_OVAL),
        vec![(16, rh_advisory.id)]
    );
}

#[test]
fn test_build_replaces_existing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let params = build_params(dir.path());

    vulnmatch_ingest::build(&params).unwrap();
    let first_size = std::fs::metadata(&params.db_path).unwrap().len();

    // A second run rebuilds from scratch rather than appending.
    let stats = vulnmatch_ingest::build(&params).unwrap();
    assert_eq!(std::fs::metadata(&params.db_path).unwrap().len(), first_size);
    assert!(stats.total_inserts > 0);
}

#[test]
fn test_build_rejects_missing_inputs() {
    let params = BuildParams::default();
    assert!(vulnmatch_ingest::build(&params).is_err());
}

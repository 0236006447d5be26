//! CPE-friendly name synthesis
//!
//! Software inventories report display names like "Mozilla Firefox 61.0
//! (x64 en-US)" while the CPE dictionary speaks in identifiers like
//! `mozilla` / `firefox`. These routines canonicalize raw publisher/title
//! strings into candidate CPE names for the resolver.

use regex::Regex;
use std::sync::LazyLock;

static RE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s|version\s|v)?\s?(\d+\.\d+(\.\d+)?(\.\d+)?)(-\S+)?").unwrap());
static RE_BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]+\)").unwrap());
static RE_MULTISPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").unwrap());
static RE_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_]*[12]\d{3}[-_]*").unwrap());

/// Prepare a CPE-friendly vendor name from a raw publisher string, making
/// lowercase and stripping out corporate suffixes.
pub fn cpe_friendly_vendor(vendor_title: &str) -> String {
    let mut target = vendor_title.to_lowercase();
    for pat in [
        " corporation",
        " incorporated",
        " systems",
        " inc.",
        " corp.",
        " s.r.o.",
        " s.a.r.l.",
        " e.h.f.",
        ".com",
        ".org",
        "http://",
        "https://",
    ] {
        target = target.replacen(pat, "", 1);
    }
    target = target.replace(',', "");
    target = target.replace('.', "");
    target = target.replace(' ', "_");
    target.trim().to_string()
}

/// Normalize a product display name: lowercase, strip version strings, the
/// vendor name, and parenthesized groups, and convert spaces to underscores.
pub fn cpe_friendly_product(title: &str, vendor: &str) -> String {
    let mut title = title.to_lowercase();
    let vendor = vendor.to_lowercase();

    title = RE_MULTISPACE.replace_all(&title, " ").into_owned();
    title = RE_VERSION.replace_all(&title, "").into_owned();
    title = title.replace('-', " ");
    title = title.replace('–', " ");

    // Strip the vendor name, restoring the pre-strip title when nothing
    // usable remains (product name equal to the vendor name is common).
    if title.contains(vendor.as_str()) {
        let bak = title.trim().to_string();
        title = title.replacen(&format!(" {} ", vendor), "", 1);
        title = title.replacen(&format!("{} ", vendor), "", 1);
        if vendor.len() > 3 {
            title = title.replacen(vendor.as_str(), "", 1);
        }

        title = title.trim().to_string();
        if title.is_empty() || RE_NUMERIC.is_match(&title) {
            title = bak;
        }
    }

    title = RE_BRACKETED.replace_all(&title, "").into_owned();
    title = title.replace("  ", " ");
    title = title.trim().to_string();
    title.replace(' ', "_")
}

/// Expand a CPE-friendly name into lookup candidates: the name itself,
/// hyphen/underscore swapped variants (flips accumulate left to right), and
/// year-stripped variants of each.
pub fn alternative_names(name: &str) -> Vec<String> {
    let mut names = vec![name.to_string()];

    let mut buf = name.as_bytes().to_vec();
    for i in 0..buf.len() {
        match buf[i] {
            b'-' => {
                buf[i] = b'_';
                names.push(String::from_utf8_lossy(&buf).into_owned());
            }
            b'_' => {
                buf[i] = b'-';
                names.push(String::from_utf8_lossy(&buf).into_owned());
            }
            _ => {}
        }
    }

    // Remove years.
    for n in names.clone() {
        let stripped = RE_YEAR.replace_all(&n, "").into_owned();
        if stripped != n {
            names.push(stripped.trim().to_string());
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpe_friendly_vendor() {
        let cases = [
            ("Microsoft Corporation", "microsoft"),
            ("Adobe Systems Incorporated", "adobe"),
            ("Dropbox, Inc.", "dropbox"),
            ("Google Inc.", "google"),
            ("Cisco Systems", "cisco"),
            ("win.rar GmbH", "winrar_gmbh"),
        ];
        for (raw, expected) in cases {
            assert_eq!(cpe_friendly_vendor(raw), expected, "vendor: {}", raw);
        }
    }

    #[test]
    fn test_cpe_friendly_product() {
        let cases = [
            ("Active Directory Authentication Library for SQL Server", "microsoft", "active_directory_authentication_library_for_sql_server"),
            ("adaptive_security_appliance_software", "cisco", "adaptive_security_appliance_software"),
            ("Adobe Acrobat Reader DC", "adobe", "acrobat_reader_dc"),
            ("Adobe Creative Cloud", "adobe", "creative_cloud"),
            ("AirPort", "apple", "airport"),
            ("Apple Application Support (64-bit)", "apple", "application_support"),
            ("Backup and Sync from Google", "google", "backup_and_sync_from"),
            ("Cisco AnyConnect Secure Mobility Client ", "cisco", "anyconnect_secure_mobility_client"),
            ("database_server", "oracle", "database_server"),
            ("GIMP 2.8.22", "gimp", "gimp"),
            ("Git version 2.14.1", "git", "git"),
            ("Google Chrome", "google", "chrome"),
            ("IIS 10.0 Express", "microsoft", "iis_express"),
            ("Intel(R) Management Engine Components", "intel", "management_engine_components"),
            ("ios", "cisco", "ios"),
            ("iTunes", "apple", "itunes"),
            ("JetBrains GoLand 2018.1.5", "jetbrains", "goland"),
            ("Microsoft Azure Libraries for .NET – v2.9", "microsoft", "azure_libraries_for_.net"),
            ("Microsoft .NET Framework 4.5.1 SDK", "microsoft", ".net_framework_sdk"),
            ("Microsoft ODBC Driver 13 for SQL Server", "microsoft", "odbc_driver_13_for_sql_server"),
            ("Microsoft SQL Server 2012 Native Client ", "microsoft", "sql_server_2012_native_client"),
            ("Microsoft SQL Server Data-Tier Application Framework (x86)", "microsoft", "sql_server_data_tier_application_framework"),
            ("Microsoft SQL Server Management Studio - 17.7", "microsoft", "sql_server_management_studio"),
            ("Microsoft Visual C++ 2005 Redistributable", "microsoft", "visual_c++_2005_redistributable"),
            ("Microsoft Visual Studio 2017", "microsoft", "visual_studio_2017"),
            ("Mozilla Firefox 61.0 (x64 en-US)", "mozilla", "firefox"),
            ("mRemoteNG", "next_generation_software", "mremoteng"),
            ("Node.js", "nodejs", "node.js"),
            ("Npcap 0.93", "nmap", "npcap"),
            ("NVIDIA Graphics Driver 391.25", "nvidia", "graphics_driver"),
            ("OpenVPN 2.4.4-I601 ", "openvpn", "openvpn"),
            ("Oracle VM VirtualBox 5.2.18", "oracle", "vm_virtualbox"),
            ("TeamViewer 12", "teamviewer", "teamviewer_12"),
            ("Tenable Nessus (x64)", "tenable", "nessus"),
            ("VLC media player", "videolan", "vlc_media_player"),
            ("VMware Workstation", "vmware", "workstation"),
            ("WinRAR 5.50 (64-bit)", "rarlab", "winrar"),
            ("WinSCP 5.11.1", "winscp", "winscp"),
        ];

        for (display, vendor, expected) in cases {
            assert_eq!(
                cpe_friendly_product(display, vendor),
                expected,
                "display name: {}",
                display
            );
        }
    }

    #[test]
    fn test_alternative_names_flip_accumulates() {
        assert_eq!(alternative_names("7-zip"), vec!["7-zip", "7_zip"]);
        assert_eq!(
            alternative_names("a-b_c"),
            vec!["a-b_c", "a_b_c", "a_b-c"]
        );
    }

    #[test]
    fn test_alternative_names_year_strip() {
        let names = alternative_names("visual_studio_2017");
        assert!(names.contains(&"visual_studio_2017".to_string()));
        assert!(names.contains(&"visual_studio".to_string()));

        let names = alternative_names("autocad-2016");
        assert!(names.contains(&"autocad".to_string()));
    }
}

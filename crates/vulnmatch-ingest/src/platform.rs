//! Platform rule compilation
//!
//! Each platform row carries a comma-separated list of regex fragments.
//! A platform is associated with an advisory when any fragment matches the
//! raw CPE URI (NVD) or the product string (MSRC).

use regex::Regex;
use vulnmatch_db::Session;
use vulnmatch_core::{Error, Result};

/// Compiled platform rules for one ingestion run.
pub struct PlatformRules {
    rules: Vec<(i64, Vec<Regex>)>,
}

impl PlatformRules {
    /// Load and compile the rules of every platform in the artifact.
    pub fn load(session: &Session) -> Result<Self> {
        let platforms = session.find_platforms()?;
        let mut rules = Vec::with_capacity(platforms.len());

        for platform in &platforms {
            let mut compiled = Vec::new();
            for fragment in platform.rule.split(',') {
                let rule = Regex::new(fragment).map_err(|e| {
                    Error::Parse(format!("invalid platform rule '{}': {}", fragment, e))
                })?;
                compiled.push(rule);
            }
            rules.push((platform.id, compiled));
        }

        Ok(Self { rules })
    }

    /// Ids of all platforms with at least one rule matching `value`.
    pub fn matching_ids(&self, value: &str) -> Vec<i64> {
        self.rules
            .iter()
            .filter(|(_, fragments)| fragments.iter().any(|rule| rule.is_match(value)))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulnmatch_db::schema;

    #[test]
    fn test_platform_rules_match_cpe() {
        let session = Session::open_in_memory().unwrap();
        schema::create_schema(session.raw()).unwrap();

        let rules = PlatformRules::load(&session).unwrap();

        // Windows 10 platform (id 7) matches both its CPE fragment and the
        // MSRC product-name fragment.
        let ids = rules.matching_ids("cpe:2.3:o:microsoft:windows_10:-:*:*:*:*:*:x64:*");
        assert!(ids.contains(&7));

        let ids = rules.matching_ids("Microsoft Windows 10 Version 1809 for x64-based Systems");
        assert!(ids.contains(&7));

        let ids = rules.matching_ids("cpe:2.3:o:redhat:enterprise_linux:7.0:*:*:*:*:*:*:*");
        assert_eq!(ids, vec![16]);

        assert!(rules.matching_ids("cpe:2.3:a:mozilla:firefox:61.0").is_empty());
    }
}

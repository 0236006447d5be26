//! CVSS ordinal encoding
//!
//! CVSS v2/v3 enumerated metrics are stored in the artifact as small-integer
//! codes that are stable across artifact versions. The mappers below convert
//! the uppercase strings found in the NVD feeds; unknown strings are logged
//! and mapped to `None` so the column stays NULL.

use tracing::debug;

// CVSS2.
pub const CVSS2_ACCESS_VECTOR_LOCAL: i64 = 100;
pub const CVSS2_ACCESS_VECTOR_NETWORK: i64 = 200;
pub const CVSS2_ACCESS_VECTOR_ADJACENT_NETWORK: i64 = 300;

pub const CVSS2_ACCESS_COMPLEXITY_LOW: i64 = 100;
pub const CVSS2_ACCESS_COMPLEXITY_MEDIUM: i64 = 200;
pub const CVSS2_ACCESS_COMPLEXITY_HIGH: i64 = 300;

pub const CVSS2_AUTHENTICATION_NONE: i64 = 100;
pub const CVSS2_AUTHENTICATION_SINGLE_INSTANCE: i64 = 200;
pub const CVSS2_AUTHENTICATION_MULTIPLE_INSTANCES: i64 = 300;

pub const CVSS2_CONFIDENTIALITY_IMPACT_NONE: i64 = 100;
pub const CVSS2_CONFIDENTIALITY_IMPACT_PARTIAL: i64 = 200;
pub const CVSS2_CONFIDENTIALITY_IMPACT_COMPLETE: i64 = 300;

// CVSS3.
pub const ATTACK_VECTOR_NETWORK: i64 = 100;
pub const ATTACK_VECTOR_ADJACENT_NETWORK: i64 = 200;
pub const ATTACK_VECTOR_LOCAL: i64 = 300;
pub const ATTACK_VECTOR_PHYSICAL: i64 = 400;

pub const ATTACK_COMPLEXITY_HIGH: i64 = 100;
pub const ATTACK_COMPLEXITY_LOW: i64 = 200;

pub const PRIVILEGES_REQUIRED_HIGH: i64 = 100;
pub const PRIVILEGES_REQUIRED_LOW: i64 = 200;
pub const PRIVILEGES_REQUIRED_NONE: i64 = 300;

pub const USER_INTERACTION_NONE: i64 = 100;
pub const USER_INTERACTION_REQUIRED: i64 = 200;

pub const SCOPE_UNCHANGED: i64 = 100;
pub const SCOPE_CHANGED: i64 = 200;

pub const CIA_NONE: i64 = 100;
pub const CIA_LOW: i64 = 200;
pub const CIA_HIGH: i64 = 300;

pub const SEVERITY_NONE: i64 = 100;
pub const SEVERITY_LOW: i64 = 200;
pub const SEVERITY_MEDIUM: i64 = 300;
pub const SEVERITY_HIGH: i64 = 400;
pub const SEVERITY_CRITICAL: i64 = 500;

/// Map a CVSS2 access vector string to its ordinal code.
pub fn cvss2_access_vector(s: &str) -> Option<i64> {
    match s {
        "LOCAL" => Some(CVSS2_ACCESS_VECTOR_LOCAL),
        "NETWORK" => Some(CVSS2_ACCESS_VECTOR_NETWORK),
        "ADJACENT_NETWORK" => Some(CVSS2_ACCESS_VECTOR_ADJACENT_NETWORK),
        _ => {
            debug!("unsupported CVSS2 access vector: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS2 access complexity string to its ordinal code.
pub fn cvss2_access_complexity(s: &str) -> Option<i64> {
    match s {
        "LOW" => Some(CVSS2_ACCESS_COMPLEXITY_LOW),
        "MEDIUM" => Some(CVSS2_ACCESS_COMPLEXITY_MEDIUM),
        "HIGH" => Some(CVSS2_ACCESS_COMPLEXITY_HIGH),
        _ => {
            debug!("unsupported CVSS2 access complexity: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS2 authentication string to its ordinal code.
pub fn cvss2_authentication(s: &str) -> Option<i64> {
    match s {
        "NONE" => Some(CVSS2_AUTHENTICATION_NONE),
        "SINGLE_INSTANCE" | "SINGLE" => Some(CVSS2_AUTHENTICATION_SINGLE_INSTANCE),
        "MULTIPLE_INSTANCES" | "MULTIPLE" => Some(CVSS2_AUTHENTICATION_MULTIPLE_INSTANCES),
        _ => {
            debug!("unsupported CVSS2 authentication: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS2 confidentiality impact string to its ordinal code.
pub fn cvss2_confidentiality_impact(s: &str) -> Option<i64> {
    match s {
        "NONE" => Some(CVSS2_CONFIDENTIALITY_IMPACT_NONE),
        "PARTIAL" => Some(CVSS2_CONFIDENTIALITY_IMPACT_PARTIAL),
        "COMPLETE" => Some(CVSS2_CONFIDENTIALITY_IMPACT_COMPLETE),
        _ => {
            debug!("unsupported CVSS2 confidentiality impact: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 attack vector string to its ordinal code.
pub fn cvss3_attack_vector(s: &str) -> Option<i64> {
    match s {
        "NETWORK" => Some(ATTACK_VECTOR_NETWORK),
        "ADJACENT_NETWORK" => Some(ATTACK_VECTOR_ADJACENT_NETWORK),
        "LOCAL" => Some(ATTACK_VECTOR_LOCAL),
        "PHYSICAL" => Some(ATTACK_VECTOR_PHYSICAL),
        _ => {
            debug!("unsupported CVSS3 attack vector: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 attack complexity string to its ordinal code.
pub fn cvss3_attack_complexity(s: &str) -> Option<i64> {
    match s {
        "HIGH" => Some(ATTACK_COMPLEXITY_HIGH),
        "LOW" => Some(ATTACK_COMPLEXITY_LOW),
        _ => {
            debug!("unsupported CVSS3 attack complexity: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 privileges required string to its ordinal code.
pub fn cvss3_privileges_required(s: &str) -> Option<i64> {
    match s {
        "HIGH" => Some(PRIVILEGES_REQUIRED_HIGH),
        "LOW" => Some(PRIVILEGES_REQUIRED_LOW),
        "NONE" => Some(PRIVILEGES_REQUIRED_NONE),
        _ => {
            debug!("unsupported CVSS3 privileges required: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 user interaction string to its ordinal code.
pub fn cvss3_user_interaction(s: &str) -> Option<i64> {
    match s {
        "NONE" => Some(USER_INTERACTION_NONE),
        "REQUIRED" => Some(USER_INTERACTION_REQUIRED),
        _ => {
            debug!("unsupported CVSS3 user interaction: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 scope string to its ordinal code.
pub fn cvss3_scope(s: &str) -> Option<i64> {
    match s {
        "UNCHANGED" => Some(SCOPE_UNCHANGED),
        "CHANGED" => Some(SCOPE_CHANGED),
        _ => {
            debug!("unsupported CVSS3 scope: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 confidentiality/integrity/availability impact string to its
/// ordinal code.
pub fn cvss3_cia_impact(s: &str) -> Option<i64> {
    match s {
        "NONE" => Some(CIA_NONE),
        "LOW" => Some(CIA_LOW),
        "HIGH" => Some(CIA_HIGH),
        _ => {
            debug!("unsupported CVSS3 impact: '{}' - ignoring", s);
            None
        }
    }
}

/// Map a CVSS3 base severity string to its ordinal code.
pub fn cvss3_severity(s: &str) -> Option<i64> {
    match s {
        "NONE" => Some(SEVERITY_NONE),
        "LOW" => Some(SEVERITY_LOW),
        "MEDIUM" => Some(SEVERITY_MEDIUM),
        "HIGH" => Some(SEVERITY_HIGH),
        "CRITICAL" => Some(SEVERITY_CRITICAL),
        _ => {
            debug!("unsupported CVSS3 base severity: '{}' - ignoring", s);
            None
        }
    }
}

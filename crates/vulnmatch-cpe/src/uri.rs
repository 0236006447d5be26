//! CPE URI tokenization and decoding
//!
//! Accepts both URI forms found in the NVD data:
//! - 2.2: `cpe:/a:vendor:product:version:update:edition:language`
//! - 2.3: `cpe:2.3:part:vendor:product:version:update:edition:language:sw_edition:target_sw:target_hw:other`

use percent_encoding::percent_decode_str;
use std::fmt;
use tracing::debug;

/// Which CPE URI form a string was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpeVersion {
    /// CPE 2.2 (`cpe:/...`)
    #[default]
    V22,
    /// CPE 2.3 (`cpe:2.3:...`)
    V23,
}

/// Decoded fields of a CPE URI
///
/// Fields not present in the URI are empty strings. Wildcards (`*`, `-`) in
/// 2.3 URIs are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpeParts {
    pub cpe_version: CpeVersion,

    /// CPE "part": "a" application, "o" operating system, "h" hardware
    pub systype: String,
    pub vendor: String,
    pub product: String,
    pub version: String,
    /// CPE calls this field "update"
    pub patch: String,
    pub edition: String,
    pub language: String,
    pub sw_edition: String,
    pub target_sw: String,
    pub target_hw: String,
    pub other: String,
}

/// CPE parsing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpeParseError {
    /// Token count below 4 (2.2) or not exactly 13 (2.3)
    InvalidLength(usize),
    /// 2.2 type token not one of `/a`, `/o`, `/h`
    InvalidType(String),
    /// Terminal unpaired escape character
    InvalidEscape,
    /// 2.3 URI whose scheme token is not `cpe`
    InvalidScheme,
}

impl fmt::Display for CpeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpeParseError::InvalidLength(n) => write!(f, "invalid CPE length (got {} tokens)", n),
            CpeParseError::InvalidType(t) => write!(f, "invalid CPE type: {}", t),
            CpeParseError::InvalidEscape => write!(f, "invalid terminal escape"),
            CpeParseError::InvalidScheme => write!(f, "CPE must start with 'cpe:'"),
        }
    }
}

impl std::error::Error for CpeParseError {}

/// Parse a CPE string of format 2.2 or 2.3 into `CpeParts`.
pub fn parse_cpe(cpe: &str) -> Result<CpeParts, CpeParseError> {
    let tokens = tokenize(cpe, ':', '\\')?;
    if tokens.len() < 4 {
        return Err(CpeParseError::InvalidLength(tokens.len()));
    }

    if tokens[1] == "2.3" {
        return parse_cpe23(cpe, &tokens);
    }

    let mut parts = CpeParts {
        cpe_version: CpeVersion::V22,
        ..Default::default()
    };
    parts.systype = match tokens[1].as_str() {
        "/a" => String::from("a"),
        "/o" => String::from("o"),
        "/h" => String::from("h"),
        other => return Err(CpeParseError::InvalidType(other.to_string())),
    };
    parts.vendor = decode_component(&tokens[2]);
    parts.product = decode_component(&tokens[3]);

    if tokens.len() > 4 {
        parts.version = decode_component(&tokens[4]);
    }
    if tokens.len() > 5 {
        parts.patch = decode_component(&tokens[5]);
    }
    if tokens.len() > 6 {
        parts.edition = decode_component(&tokens[6]);
    }
    if tokens.len() > 7 {
        parts.language = decode_component(&tokens[7]);
    }

    Ok(parts)
}

/// Parse an already tokenized CPE 2.3 string.
fn parse_cpe23(raw: &str, tokens: &[String]) -> Result<CpeParts, CpeParseError> {
    if tokens.len() != 13 {
        debug!("broken CPE23 '{}' - got {} tokens", raw, tokens.len());
        return Err(CpeParseError::InvalidLength(tokens.len()));
    }
    if tokens[0] != "cpe" {
        debug!("invalid CPE2.3: '{}'", raw);
        return Err(CpeParseError::InvalidScheme);
    }

    Ok(CpeParts {
        cpe_version: CpeVersion::V23,
        systype: tokens[2].clone(),
        vendor: decode_component(&tokens[3]),
        product: decode_component(&tokens[4]),
        version: decode_component(&tokens[5]),
        patch: decode_component(&tokens[6]),
        edition: decode_component(&tokens[7]),
        language: decode_component(&tokens[8]),
        sw_edition: decode_component(&tokens[9]),
        target_sw: decode_component(&tokens[10]),
        target_hw: decode_component(&tokens[11]),
        other: decode_component(&tokens[12]),
    })
}

/// Decode percent-encoded values in a CPE field.
fn decode_component(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    // Escaped parenthesis symbols lose the slash before percent-decoding.
    let field = field
        .replace("%5c%28", "%28")
        .replace("%5c%29", "%29")
        .replace("\\(", "(")
        .replace("\\)", ")");

    percent_decode_str(&field).decode_utf8_lossy().into_owned()
}

/// Split `s` at each non-escaped occurrence of `sep`. The escape character
/// makes the following character (including `sep` and the escape character
/// itself) literal and is not included in the token.
fn tokenize(s: &str, sep: char, escape: char) -> Result<Vec<String>, CpeParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_escape = false;

    for c in s.chars() {
        if in_escape {
            in_escape = false;
            current.push(c);
        } else if c == escape {
            in_escape = true;
        } else if c == sep {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    tokens.push(current);

    if in_escape {
        return Err(CpeParseError::InvalidEscape);
    }
    Ok(tokens)
}

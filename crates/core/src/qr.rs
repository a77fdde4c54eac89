//! QR token and short-link code parsing.
//!
//! Both arrive as untrusted text from a URL path segment and are
//! syntax-checked before any lookup.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::limits::{QR_TOKEN_PATTERN, SHORT_CODE_PATTERN};

static QR_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QR_TOKEN_PATTERN).expect("invalid QR token pattern"));

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHORT_CODE_PATTERN).expect("invalid short code pattern"));

/// A syntactically valid QR token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QrToken(String);

impl QrToken {
    /// Malformed input is indistinguishable from an unknown token.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::session_not_found("QR token is required"));
        }
        if !QR_TOKEN_REGEX.is_match(raw) {
            return Err(Error::session_not_found("invalid QR token"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A syntactically valid short-link code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        SHORT_CODE_REGEX
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

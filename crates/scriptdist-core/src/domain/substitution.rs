//! Placeholder substitution applied to text files while staging.

use std::borrow::Cow;

use super::entities::ReleaseVersion;

pub const VERSION_TOKEN: &str = "<HEAD>";
pub const SUMMARY_VERSION_TOKEN: &str = "<SUMMARY_VERSION>";
pub const DEFAULT_SUMMARY_VERSION: &str = "0.9-2023.2";

/// Token → value pairs, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pairs: Vec<(&'static str, String)>,
}

impl Placeholders {
    pub fn new(release_version: &ReleaseVersion, summary_version: impl Into<String>) -> Self {
        Self {
            pairs: vec![
                (VERSION_TOKEN, release_version.as_str().to_string()),
                (SUMMARY_VERSION_TOKEN, summary_version.into()),
            ],
        }
    }

    pub fn value_of(&self, token: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every token in text content. Binary content, and text without
    /// any token, is returned borrowed and untouched.
    pub fn apply<'a>(&self, contents: &'a [u8]) -> Cow<'a, [u8]> {
        if is_binary(contents) {
            return Cow::Borrowed(contents);
        }
        let Ok(text) = std::str::from_utf8(contents) else {
            return Cow::Borrowed(contents);
        };
        if !self.pairs.iter().any(|(token, _)| text.contains(token)) {
            return Cow::Borrowed(contents);
        }

        let mut out = text.to_string();
        for (token, value) in &self.pairs {
            out = out.replace(token, value);
        }
        Cow::Owned(out.into_bytes())
    }
}

/// Not valid UTF-8, or contains a NUL byte.
pub fn is_binary(contents: &[u8]) -> bool {
    contents.contains(&0) || std::str::from_utf8(contents).is_err()
}

//! URL patterns a model accepts for file content, keyed by media type.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::RociError;

/// Media type pattern (`image/png`, `image/*`, `*`) to accepted URL patterns.
///
/// A model that can fetch a URL itself declares it here; anything else must
/// be sent inline.
#[derive(Debug, Clone, Default)]
pub struct SupportedUrls {
    patterns: BTreeMap<String, Vec<Regex>>,
}

impl SupportedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL pattern for a media type.
    pub fn insert(&mut self, media_type: impl Into<String>, pattern: &str) -> Result<(), RociError> {
        let regex = Regex::new(pattern).map_err(|e| {
            RociError::InvalidArgument(format!("invalid URL pattern '{pattern}': {e}"))
        })?;
        self.push_unique(media_type.into(), regex);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, media_type: impl Into<String>, pattern: &str) -> Result<Self, RociError> {
        self.insert(media_type, pattern)?;
        Ok(self)
    }

    /// Add every pattern of `other` that is not already present.
    pub fn merge(&mut self, other: &SupportedUrls) {
        for (media_type, regexes) in &other.patterns {
            for regex in regexes {
                self.push_unique(media_type.clone(), regex.clone());
            }
        }
    }

    /// Union of several declarations, first-seen order preserved per media type.
    pub fn union<'a>(all: impl IntoIterator<Item = &'a SupportedUrls>) -> Self {
        let mut merged = Self::new();
        for urls in all {
            merged.merge(urls);
        }
        merged
    }

    /// Patterns declared for exactly this media type key.
    pub fn patterns(&self, media_type: &str) -> &[Regex] {
        self.patterns
            .get(media_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Whether `url` may be passed by reference for content of `media_type`.
    pub fn supports(&self, media_type: &str, url: &str) -> bool {
        self.patterns.iter().any(|(key, regexes)| {
            media_type_matches(key, media_type) && regexes.iter().any(|r| r.is_match(url))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn push_unique(&mut self, media_type: String, regex: Regex) {
        let entry = self.patterns.entry(media_type).or_default();
        if !entry.iter().any(|r| r.as_str() == regex.as_str()) {
            entry.push(regex);
        }
    }
}

fn media_type_matches(pattern: &str, media_type: &str) -> bool {
    if pattern == "*" || pattern == "*/*" || pattern.eq_ignore_ascii_case(media_type) {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(prefix) => media_type
            .split_once('/')
            .is_some_and(|(top, _)| top.eq_ignore_ascii_case(prefix)),
        None => false,
    }
}

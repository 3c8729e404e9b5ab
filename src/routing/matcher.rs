//! Path matching logic.
//!
//! # Responsibilities
//! - Match the unconsumed suffix of a request path at one node
//! - Capture named path variables for endpoints
//! - Compile filter and endpoint patterns once, at registration time
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Regex patterns are anchored: they must match the whole suffix
//! - Patterns without regex syntax degrade to exact/prefix matchers so the
//!   hot path skips the regex engine where it can

use std::collections::HashMap;

use regex::Regex;

use crate::routing::error::RegistrationError;

/// Named values captured from a request path.
pub type PathParams = HashMap<String, String>;

/// Trait for matching a path suffix against a compiled pattern.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the suffix matches this pattern.
    fn matches(&self, path: &str) -> bool;

    /// Returns the captured variables when the suffix matches.
    fn captures(&self, path: &str) -> Option<PathParams> {
        self.matches(path).then(PathParams::new)
    }

    /// Literal matchers win over patterned ones when both could match.
    fn is_literal(&self) -> bool {
        false
    }
}

/// Matches one literal path exactly.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    path: String,
}

impl ExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl PathMatcher for ExactMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }

    fn is_literal(&self) -> bool {
        true
    }
}

/// Matches the path prefix.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMatcher for PrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches an anchored regular expression. Named groups become path params.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex })
    }
}

impl PathMatcher for RegexMatcher {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let params = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(params)
    }
}

/// Matches `/users/{id}` style templates; each `{name}` spans one segment.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    inner: RegexMatcher,
}

impl TemplateMatcher {
    pub fn new(template: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::new();
        for (i, segment) in template.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
            }
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    pattern.push_str(&format!("(?P<{}>[^/]+)", name));
                }
                None => pattern.push_str(&regex::escape(segment)),
            }
        }
        Ok(Self {
            inner: RegexMatcher::new(&pattern)?,
        })
    }
}

impl PathMatcher for TemplateMatcher {
    fn matches(&self, path: &str) -> bool {
        self.inner.matches(path)
    }

    fn captures(&self, path: &str) -> Option<PathParams> {
        self.inner.captures(path)
    }
}

/// Compile a filter pattern.
///
/// Plain literals become [`ExactMatcher`], a literal followed by `.*`
/// becomes [`PrefixMatcher`], anything else is a [`RegexMatcher`].
pub fn compile_filter(pattern: &str) -> Result<Box<dyn PathMatcher>, RegistrationError> {
    if is_literal(pattern) {
        return Ok(Box::new(ExactMatcher::new(pattern)));
    }
    if let Some(prefix) = pattern.strip_suffix(".*") {
        if is_literal(prefix) {
            return Ok(Box::new(PrefixMatcher::new(prefix)));
        }
    }
    RegexMatcher::new(pattern)
        .map(|m| Box::new(m) as Box<dyn PathMatcher>)
        .map_err(|source| RegistrationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile a normalized endpoint sub-path.
pub fn compile_endpoint(sub_path: &str) -> Result<Box<dyn PathMatcher>, RegistrationError> {
    if !sub_path.contains('{') {
        return Ok(Box::new(ExactMatcher::new(sub_path)));
    }
    TemplateMatcher::new(sub_path)
        .map(|m| Box::new(m) as Box<dyn PathMatcher>)
        .map_err(|source| RegistrationError::InvalidPattern {
            pattern: sub_path.to_string(),
            source,
        })
}

fn is_literal(pattern: &str) -> bool {
    regex::escape(pattern) == pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactMatcher::new("/bar");
        assert!(matcher.matches("/bar"));
        assert!(!matcher.matches("/bar/baz"));
        assert!(!matcher.matches("/BAR"));
        assert!(matcher.is_literal());
    }

    #[test]
    fn test_regex_matcher_is_anchored() {
        let matcher = RegexMatcher::new("/ba.").unwrap();
        assert!(matcher.matches("/bar"));
        assert!(!matcher.matches("/bar/x"));
        assert!(!matcher.matches("x/bar"));
    }

    #[test]
    fn test_template_captures() {
        let matcher = TemplateMatcher::new("/users/{id}/posts/{post}").unwrap();
        let params = matcher.captures("/users/42/posts/7").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert_eq!(params.get("post").map(String::as_str), Some("7"));
        assert!(matcher.captures("/users/42/posts").is_none());
        assert!(matcher.captures("/users/4/2/posts/7").is_none());
    }

    #[test]
    fn test_template_escapes_literals() {
        let matcher = TemplateMatcher::new("/v1.0/{name}").unwrap();
        assert!(matcher.matches("/v1.0/x"));
        assert!(!matcher.matches("/v1x0/x"));
    }

    #[test]
    fn test_compile_filter_picks_cheapest_matcher() {
        let any = compile_filter(".*").unwrap();
        assert!(any.matches(""));
        assert!(any.matches("/anything/at/all"));

        let under = compile_filter("/.*").unwrap();
        assert!(under.matches("/bar"));
        assert!(!under.matches(""));

        let exact = compile_filter("/foo").unwrap();
        assert!(exact.is_literal());
        assert!(!exact.matches("/foo/bar"));

        let regex = compile_filter("/(a|b)").unwrap();
        assert!(regex.matches("/a"));
        assert!(!regex.matches("/c"));
    }

    #[test]
    fn test_compile_filter_rejects_bad_regex() {
        let err = compile_filter("/(unclosed").unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
    }
}

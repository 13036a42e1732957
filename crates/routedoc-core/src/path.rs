//! Route path handling.
//!
//! Paths are declared with `:name` captures. Documents want the `{name}`
//! form ([`convert_path`]); the router wants one capture per segment with
//! names it can share between routes ([`RoutePattern`]).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, RoutedocError};

#[allow(clippy::expect_used)]
static PATH_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(\w+)").expect("Invalid path parameter regex"));

/// Converts `:name` path parameters into `{name}` parameters.
///
/// Literal segments, trailing slashes and the root path are left untouched.
///
/// ```rust
/// use routedoc_core::path::convert_path;
///
/// assert_eq!(convert_path("/user/:id/roles/:role"), "/user/{id}/roles/{role}");
/// ```
#[must_use]
pub fn convert_path(path: &str) -> String {
    PATH_PARAM_REGEX.replace_all(path, "{$1}").into_owned()
}

/// The routing form of a colon-style path.
///
/// Every segment holding a capture is routed as a single capture named after
/// the segment's position, so `/users/:id` and `/users/:userId` share the
/// router path `/users/{p2}`. [`RoutePattern::extract`] maps the positional
/// values back to the declared names and strips literal text around them.
///
/// ```rust
/// use std::collections::HashMap;
/// use routedoc_core::path::RoutePattern;
///
/// let pattern = RoutePattern::parse("/files/:name.json").unwrap();
/// assert_eq!(pattern.router_path(), "/files/{p2}");
///
/// let raw = HashMap::from([("p2".to_string(), "report.json".to_string())]);
/// assert_eq!(pattern.extract(&raw).unwrap()["name"], "report");
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    router_path: String,
    captures: Vec<SegmentCapture>,
}

#[derive(Debug, Clone)]
struct SegmentCapture {
    key: String,
    kind: CaptureKind,
}

#[derive(Debug, Clone)]
enum CaptureKind {
    /// The segment is exactly `:name`.
    Whole(String),
    /// Captures mixed with literal text, such as `:name.json` or `:from-:to`.
    Partial { regex: Regex, names: Vec<String> },
}

impl RoutePattern {
    /// Parses a route path.
    ///
    /// # Errors
    ///
    /// Returns [`RoutedocError::InvalidPath`] if the path does not start with
    /// `/` or has a literal segment the router cannot mount.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| RoutedocError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if !path.starts_with('/') {
            return Err(invalid("paths must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut captures = Vec::new();
        for (index, segment) in path.split('/').enumerate() {
            if !PATH_PARAM_REGEX.is_match(segment) {
                if segment.starts_with([':', '*']) {
                    return Err(invalid("segments may not start with ':' or '*' without a name"));
                }
                segments.push(segment.replace('{', "{{").replace('}', "}}"));
                continue;
            }

            let key = format!("p{index}");
            let kind = capture_kind(segment)
                .map_err(|err| invalid(&format!("segment '{segment}': {err}")))?;
            segments.push(format!("{{{key}}}"));
            captures.push(SegmentCapture { key, kind });
        }

        Ok(Self {
            router_path: segments.join("/"),
            captures,
        })
    }

    #[must_use]
    pub fn router_path(&self) -> &str {
        &self.router_path
    }

    /// Maps captured segment values back to the declared parameter names.
    ///
    /// `raw` holds the router's values, keyed by positional name. Returns
    /// `None` when a segment does not fit its literal text, like `report` for
    /// `:name.json`.
    #[must_use]
    pub fn extract(&self, raw: &HashMap<String, String>) -> Option<HashMap<String, String>> {
        let mut params = HashMap::with_capacity(self.captures.len());
        for capture in &self.captures {
            let value = raw.get(&capture.key)?;
            match &capture.kind {
                CaptureKind::Whole(name) => {
                    params.insert(name.clone(), value.clone());
                }
                CaptureKind::Partial { regex, names } => {
                    let found = regex.captures(value)?;
                    for (index, name) in names.iter().enumerate() {
                        params.insert(name.clone(), found.get(index + 1)?.as_str().to_string());
                    }
                }
            }
        }
        Some(params)
    }
}

fn capture_kind(segment: &str) -> std::result::Result<CaptureKind, regex::Error> {
    if let Some(name) = segment.strip_prefix(':') {
        if PATH_PARAM_REGEX
            .find(segment)
            .is_some_and(|found| found.len() == segment.len())
        {
            return Ok(CaptureKind::Whole(name.to_string()));
        }
    }

    let mut pattern = String::from("(?s)^");
    let mut names = Vec::new();
    let mut literal_start = 0;
    for found in PATH_PARAM_REGEX.captures_iter(segment) {
        let (Some(whole), Some(name)) = (found.get(0), found.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&segment[literal_start..whole.start()]));
        pattern.push_str("(.+?)");
        names.push(name.as_str().to_string());
        literal_start = whole.end();
    }
    pattern.push_str(&regex::escape(&segment[literal_start..]));
    pattern.push('$');

    Ok(CaptureKind::Partial {
        regex: Regex::new(&pattern)?,
        names,
    })
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route template such as `/moves/{move_id}/review`.
///
/// The `{name}` placeholder syntax is the one axum routes use, so a pattern
/// can be registered with an HTTP router verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values in `other` win over values already present.
    pub fn merged(mut self, other: &PathParams) -> Self {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
        self
    }
}

impl PathPattern {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a concrete request path, ignoring a trailing slash.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.clone(), part),
            }
        }
        Some(params)
    }

    pub fn fill(&self, params: &PathParams) -> Result<String, DomainError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Param(name) => {
                    let value = params.get(name).filter(|value| !value.is_empty()).ok_or_else(
                        || DomainError::UnboundPathParameter {
                            pattern: self.raw.clone(),
                            parameter: name.clone(),
                        },
                    )?;
                    path.push_str(value);
                }
            }
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{PathParams, PathPattern};
    use crate::errors::DomainError;

    #[test]
    fn matches_extracts_parameters() {
        let pattern = PathPattern::new("/moves/{move_id}/ppm-size");
        let params = pattern.matches("/moves/abc-123/ppm-size").expect("path should match");

        assert_eq!(params.get("move_id"), Some("abc-123"));
        assert!(pattern.matches("/moves/abc-123/ppm-start").is_none());
        assert!(pattern.matches("/moves/abc-123").is_none());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let pattern = PathPattern::new("/orders");
        assert!(pattern.matches("/orders/").is_some());
        assert!(pattern.matches("/orders").is_some());
    }

    #[test]
    fn fill_substitutes_every_parameter() {
        let pattern = PathPattern::new("/service-member/{service_member_id}/name");
        let mut params = PathParams::default();
        params.insert("service_member_id", "sm-1");

        assert_eq!(pattern.fill(&params).expect("bound"), "/service-member/sm-1/name");
        assert_eq!(pattern.parameter_names().collect::<Vec<_>>(), vec!["service_member_id"]);
    }

    #[test]
    fn fill_reports_unbound_parameter() {
        let pattern = PathPattern::new("/moves/{move_id}/review");
        let error = pattern.fill(&PathParams::default()).expect_err("move id is unbound");

        assert_eq!(
            error,
            DomainError::UnboundPathParameter {
                pattern: "/moves/{move_id}/review".to_string(),
                parameter: "move_id".to_string(),
            }
        );
    }

    #[test]
    fn merged_prefers_incoming_values() {
        let mut base = PathParams::default();
        base.insert("move_id", "old");
        let mut incoming = PathParams::default();
        incoming.insert("move_id", "new");

        assert_eq!(base.merged(&incoming).get("move_id"), Some("new"));
    }
}

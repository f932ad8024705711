//! Route pattern matching.
//!
//! # Responsibilities
//! - Compile a route pattern into a matcher once, at registration
//! - Match request paths against literal prefixes
//! - Match request paths against parameterized segment patterns
//!
//! # Design Decisions
//! - A pattern with any `:name` segment is matched segment by segment and
//!   requires the same segment count as the path
//! - Any other pattern is a plain string prefix (not segment-aware), so
//!   `/api/users` also claims `/api/usersXYZ`
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// Trait for matching request paths against a compiled pattern.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this pattern.
    fn matches(&self, path: &str) -> bool;
}

/// Matches any path starting with the pattern string.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Matches paths with the same shape as a `:param` pattern.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    segments: Vec<Segment>,
}

impl SegmentMatcher {
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|part| match part.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Names of the parameter segments, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

impl Matcher for SegmentMatcher {
    fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(parts)
            .all(|(segment, part)| match segment {
                Segment::Literal(literal) => literal == part,
                Segment::Param(_) => !part.is_empty(),
            })
    }
}

/// True if any `/`-delimited segment of the pattern starts with `:`.
pub fn is_parameterized(pattern: &str) -> bool {
    pattern.split('/').any(|part| part.starts_with(':'))
}

/// Compile a pattern into the matcher that implements its semantics.
pub fn compile(pattern: &str) -> Box<dyn Matcher> {
    if is_parameterized(pattern) {
        Box::new(SegmentMatcher::new(pattern))
    } else {
        Box::new(PathPrefixMatcher::new(pattern))
    }
}

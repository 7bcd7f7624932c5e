//! Maven version parsing, comparison, and version specifications.
//!
//! Maven versions use a custom ordering that differs from semver:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers
//! - String qualifiers have a special ordering:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < `""` (release) < `sp`
//! - SNAPSHOT versions sort before their release equivalent
//!
//! A version specification is either a plain (soft) version or one or more
//! comma-separated ranges such as `[1.0,2.0),[3.0,)`.

use std::cmp::Ordering;
use std::fmt;

/// Error raised for a string that is neither a version nor a range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct VersionSpecError(pub String);

/// A parsed Maven version with comparable segments.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(QualifierKind),
    Text(String),
}

/// Well-known Maven qualifiers with defined ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let segments = parse_segments(version);
        Self {
            original: version.to_string(),
            segments,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.ends_with("-SNAPSHOT")
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let ord = compare_segments(self.segments.get(i), other.segments.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(a), Some(b)) => compare_two_segments(a, b),
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Qualifier(q) => q.cmp(&QualifierKind::Release),
        Segment::Text(s) if s.is_empty() => Ordering::Equal,
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Qualifier(a), Segment::Qualifier(b)) => a.cmp(b),
        (Segment::Numeric(_), Segment::Qualifier(_) | Segment::Text(_)) => Ordering::Greater,
        (Segment::Qualifier(_) | Segment::Text(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Segment::Qualifier(q), Segment::Text(_)) => {
            if *q >= QualifierKind::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Segment::Text(_), Segment::Qualifier(q)) => {
            if *q >= QualifierKind::Release {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    version
        .split(['.', '-'])
        .filter(|token| !token.is_empty())
        .map(classify)
        .collect()
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

/// One bracketed Maven version range.
///
/// Supports: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]` (exact).
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone)]
pub struct Bound {
    pub version: MavenVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a single range including its brackets.
    pub fn parse(spec: &str) -> Result<Self, VersionSpecError> {
        let s = spec.trim();
        let open_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(VersionSpecError(format!("'{s}' is not a range"))),
        };
        let close_inclusive = match s.chars().last() {
            Some(']') if s.len() > 1 => true,
            Some(')') if s.len() > 1 => false,
            _ => return Err(VersionSpecError(format!("unbounded range '{s}'"))),
        };
        let inner = &s[1..s.len() - 1];

        let Some((lower, upper)) = inner.split_once(',') else {
            let exact = inner.trim();
            if exact.is_empty() {
                return Err(VersionSpecError(format!("empty range '{s}'")));
            }
            if !open_inclusive || !close_inclusive {
                return Err(VersionSpecError(format!(
                    "single version must be surrounded by []: '{s}'"
                )));
            }
            let v = MavenVersion::parse(exact);
            return Ok(VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version: v,
                    inclusive: true,
                }),
            });
        };

        if upper.contains(',') {
            return Err(VersionSpecError(format!(
                "range '{s}' has more than two bounds"
            )));
        }
        let bound = |text: &str, inclusive: bool| {
            let text = text.trim();
            (!text.is_empty()).then(|| Bound {
                version: MavenVersion::parse(text),
                inclusive,
            })
        };
        let range = VersionRange {
            lower: bound(lower, open_inclusive),
            upper: bound(upper, close_inclusive),
        };
        if let (Some(lo), Some(hi)) = (&range.lower, &range.upper) {
            if lo.version > hi.version {
                return Err(VersionSpecError(format!(
                    "range '{s}' defies version ordering"
                )));
            }
        }
        Ok(range)
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &MavenVersion) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }
}

/// A declared version: either a plain recommended version or a union of ranges.
#[derive(Debug, Clone)]
pub enum VersionSpec {
    Soft(MavenVersion),
    Ranges(Vec<VersionRange>),
}

impl VersionSpec {
    /// Parse a dependency version as written in a descriptor.
    pub fn parse(spec: &str) -> Result<Self, VersionSpecError> {
        let s = spec.trim();
        if s.is_empty() {
            return Err(VersionSpecError("missing version".to_string()));
        }
        if !s.starts_with(['[', '(']) {
            if let Some(bad) = s.chars().find(|c| "[](),".contains(*c) || c.is_whitespace()) {
                return Err(VersionSpecError(format!(
                    "unexpected '{bad}' in version '{s}'"
                )));
            }
            return Ok(VersionSpec::Soft(MavenVersion::parse(s)));
        }

        let mut ranges = Vec::new();
        let mut rest = s;
        while !rest.is_empty() {
            if !rest.starts_with(['[', '(']) {
                return Err(VersionSpecError(format!(
                    "invalid sequence '{rest}' in version '{s}'"
                )));
            }
            let Some(close) = rest.find([']', ')']) else {
                return Err(VersionSpecError(format!("unbounded range '{s}'")));
            };
            ranges.push(VersionRange::parse(&rest[..=close])?);
            rest = rest[close + 1..].trim_start();
            if let Some(next) = rest.strip_prefix(',') {
                rest = next.trim_start();
                if rest.is_empty() {
                    return Err(VersionSpecError(format!("trailing comma in '{s}'")));
                }
            }
        }
        Ok(VersionSpec::Ranges(ranges))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, VersionSpec::Ranges(_))
    }

    /// Whether `version` satisfies this specification. A soft version is only
    /// satisfied by an equal version.
    pub fn contains(&self, version: &MavenVersion) -> bool {
        match self {
            VersionSpec::Soft(v) => v == version,
            VersionSpec::Ranges(ranges) => ranges.iter().any(|r| r.contains(version)),
        }
    }

    /// Highest candidate satisfying this specification.
    pub fn select<'a, I>(&self, candidates: I) -> Option<&'a MavenVersion>
    where
        I: IntoIterator<Item = &'a MavenVersion>,
    {
        candidates.into_iter().filter(|v| self.contains(v)).max()
    }
}

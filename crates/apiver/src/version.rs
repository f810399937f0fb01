//! Version and constraint types
//!
//! Versions are parsed loosely so that what clients put in headers works as
//! written:
//!
//! - `1`, `1.2`, `1.2.3`, `1.2.3.4` (any number of numeric segments)
//! - an optional `v`/`V` prefix (`v2.1`)
//! - an optional pre-release (`1.0.0-beta.2`, or appended directly: `1.0beta`)
//! - optional build metadata (`1.0.0+build.5`), ignored when comparing
//!
//! Missing segments compare as zero, so `1`, `1.0` and `1.0.0` are equal.
//!
//! Constraints are comma-separated comparators that must all hold, for example
//! `">= 1, < 3"`. Supported operators: `=` (the default when omitted), `!=`,
//! `>`, `<`, `>=`, `<=` and the pessimistic `~>`.

use crate::error::{Result, VersionError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed, comparable version
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    pre: String,
    metadata: String,
}

impl Version {
    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    /// Numeric segments as written (`1.2` has two)
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Pre-release part without the leading `-`, if any
    pub fn prerelease(&self) -> Option<&str> {
        (!self.pre.is_empty()).then_some(self.pre.as_str())
    }

    /// Build metadata without the leading `+`, if any
    pub fn metadata(&self) -> Option<&str> {
        (!self.metadata.is_empty()).then_some(self.metadata.as_str())
    }

    /// Check whether this version satisfies `constraint`
    pub fn satisfies(&self, constraint: &Constraint) -> bool {
        constraint.check(self)
    }

    fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }

    /// Segment count once padded to the `MAJOR.MINOR.PATCH` minimum
    fn padded_len(&self) -> usize {
        self.segments.len().max(3)
    }

    fn same_segments(&self, other: &Version) -> bool {
        let len = self.padded_len().max(other.padded_len());
        (0..len).all(|i| self.segment(i) == other.segment(i))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self> {
        let s = input
            .strip_prefix(|c: char| c == 'v' || c == 'V')
            .unwrap_or(input);

        if s.is_empty() {
            return Err(VersionError::version(input, "empty version string"));
        }

        let (rest, metadata) = match s.split_once('+') {
            Some((rest, metadata)) => {
                if !valid_identifiers(metadata) {
                    return Err(VersionError::version(input, "invalid build metadata"));
                }
                (rest, metadata)
            }
            None => (s, ""),
        };

        let core_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (core, pre) = rest.split_at(core_end);

        let segments = core
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(VersionError::version(input, "missing numeric segment"));
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionError::version(input, "numeric segment out of range"))
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = pre.strip_prefix('-').unwrap_or(pre);
        if core_end < rest.len() && !valid_identifiers(pre) {
            return Err(VersionError::version(input, "invalid pre-release"));
        }

        Ok(Self {
            segments,
            pre: pre.to_string(),
            metadata: metadata.to_string(),
        })
    }
}

/// Dot-separated, non-empty identifiers of `[0-9A-Za-z-~]`
fn valid_identifiers(s: &str) -> bool {
    s.split('.').all(|ident| {
        !ident.is_empty()
            && ident
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '~')
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.metadata.is_empty() {
            write!(f, "+{}", self.metadata)?;
        }
        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.padded_len().max(other.padded_len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        compare_prerelease(&self.pre, &other.pre)
    }
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        // A release sorts after any of its pre-releases
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let mut left = a.split('.');
            let mut right = b.split('.');
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(x), Some(y)) => match compare_identifier(x, y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    },
                }
            }
        }
    }
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Comparison operator of a single comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` or no operator
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=` (also `=>`)
    GreaterThanOrEqual,
    /// `<=` (also `=<`)
    LessThanOrEqual,
    /// `~>`: at least the given version, within its last specified segment
    Pessimistic,
}

impl Operator {
    /// Longest tokens first so `>=` is not read as `>`
    const TOKENS: [(&'static str, Operator); 9] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::GreaterThanOrEqual),
        ("=>", Operator::GreaterThanOrEqual),
        ("<=", Operator::LessThanOrEqual),
        ("=<", Operator::LessThanOrEqual),
        ("!=", Operator::NotEqual),
        (">", Operator::GreaterThan),
        ("<", Operator::LessThan),
        ("=", Operator::Equal),
    ];

    fn split(input: &str) -> (Self, &str) {
        for (token, op) in Self::TOKENS {
            if let Some(rest) = input.strip_prefix(token) {
                return (op, rest);
            }
        }
        (Operator::Equal, input)
    }

    /// Canonical token of this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Pessimistic => "~>",
        }
    }
}

#[derive(Debug, Clone)]
struct Comparator {
    operator: Operator,
    version: Version,
}

impl Comparator {
    fn check(&self, v: &Version) -> bool {
        let c = &self.version;
        match self.operator {
            Operator::Equal => v == c,
            Operator::NotEqual => v != c,
            Operator::GreaterThan => prerelease_check(v, c) && v > c,
            Operator::LessThan => prerelease_check(v, c) && v < c,
            Operator::GreaterThanOrEqual => prerelease_check(v, c) && v >= c,
            Operator::LessThanOrEqual => prerelease_check(v, c) && v <= c,
            Operator::Pessimistic => pessimistic(v, c),
        }
    }
}

/// A pre-release version only satisfies ranges anchored on a pre-release of
/// the same release.
fn prerelease_check(v: &Version, c: &Version) -> bool {
    match (v.is_prerelease(), c.is_prerelease()) {
        (true, true) => v.same_segments(c),
        (true, false) => false,
        _ => true,
    }
}

fn pessimistic(v: &Version, c: &Version) -> bool {
    if !prerelease_check(v, c) || (c.is_prerelease() && !v.is_prerelease()) {
        return false;
    }
    if v < c {
        return false;
    }

    // The version must be written at least as precisely as the constraint
    let specified = c.segments.len();
    if specified > v.segments.len() {
        return false;
    }

    // Every segment before the last one written must match exactly
    let last = specified - 1;
    if (0..last).any(|i| v.segment(i) != c.segment(i)) {
        return false;
    }

    c.segment(last) <= v.segment(last)
}

/// A parsed constraint such as `">= 1, < 3"`
///
/// Immutable once parsed and cheap to evaluate; matchers parse their
/// constraints once at build time and reuse them for every request.
#[derive(Debug, Clone)]
pub struct Constraint {
    comparators: Vec<Comparator>,
    source: String,
}

impl Constraint {
    /// Parse a constraint expression
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    /// Check whether `version` satisfies every comparator
    pub fn check(&self, version: &Version) -> bool {
        self.comparators.iter().all(|c| c.check(version))
    }

    /// The expression this constraint was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self> {
        let comparators = input
            .split(',')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return Err(VersionError::constraint(input, "empty comparator"));
                }

                let (operator, rest) = Operator::split(part);
                let rest = rest.trim_start();
                if rest.is_empty() {
                    return Err(VersionError::constraint(
                        input,
                        format!("missing version after `{}`", operator.as_str()),
                    ));
                }

                let version = rest
                    .parse::<Version>()
                    .map_err(|e| VersionError::constraint(input, e.to_string()))?;

                Ok(Comparator { operator, version })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            comparators,
            source: input.trim().to_string(),
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Report whether `version` satisfies `constraint`
///
/// Total over all inputs: if either string fails to parse the answer is
/// `false`.
///
/// ```
/// assert!(apiver::satisfies("1.0", ">= 1"));
/// assert!(apiver::satisfies("1.2.3", "> 1.2"));
/// assert!(!apiver::satisfies("3.0", ">= 1, < 3"));
/// assert!(!apiver::satisfies("not-a-version", ">= 1"));
/// ```
pub fn satisfies(version: &str, constraint: &str) -> bool {
    let Ok(version) = version.parse::<Version>() else {
        return false;
    };
    let Ok(constraint) = constraint.parse::<Constraint>() else {
        return false;
    };
    constraint.check(&version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(v("1").segments(), &[1]);
        assert_eq!(v("v1.2").segments(), &[1, 2]);
        assert_eq!(v("V2.1.3").segments(), &[2, 1, 3]);
        assert_eq!(v("1.2.3.4").segments(), &[1, 2, 3, 4]);

        let pre = v("1.0.0-beta.2+build.7");
        assert_eq!(pre.prerelease(), Some("beta.2"));
        assert_eq!(pre.metadata(), Some("build.7"));

        assert_eq!(v("1.0beta").prerelease(), Some("beta"));
        assert_eq!(v("1.0").prerelease(), None);
    }

    #[test]
    fn test_version_parsing_errors() {
        for input in ["", "v", "x", "1.", ".1", "1..2", "1.0-", "1.0+", "1.0 ", " 1.0", "1.0-be ta", "99999999999999999999999"] {
            assert!(input.parse::<Version>().is_err(), "{:?} should not parse", input);
        }
    }

    #[test]
    fn test_version_display_keeps_written_segments() {
        assert_eq!(v("1.0").to_string(), "1.0");
        assert_eq!(v("v2.5").to_string(), "2.5");
        assert_eq!(v("1.0beta").to_string(), "1.0-beta");
        assert_eq!(v("11.0.5+meta").to_string(), "11.0.5+meta");
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(v("1"), v("1.0.0"));
        assert_eq!(v("1.0+a"), v("1.0+b"));
        assert!(v("2.0") > v("1.9.9"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.0.0.1") > v("1.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-beta") < v("1.0.0-rc.1"));
    }

    #[test]
    fn test_operators() {
        assert!(satisfies("1.0", "1.0"));
        assert!(satisfies("1", "1.0"));
        assert!(satisfies("1.0", "= 1"));
        assert!(!satisfies("1.1", "1.0"));
        assert!(satisfies("1.1", "!= 1.0"));
        assert!(satisfies("1.0", ">=1"));
        assert!(satisfies("1.0", "=> 1"));
        assert!(satisfies("1.2.3", "> 1.2"));
        assert!(!satisfies("1.2", "> 1.2"));
        assert!(satisfies("0.9", "< 1"));
        assert!(satisfies("1.0", "<= 1"));
        assert!(satisfies("1.0", "=< 1"));
    }

    #[test]
    fn test_ranges() {
        let range = Constraint::parse(">= 2, < 3").unwrap();
        assert!(range.check(&v("2")));
        assert!(range.check(&v("2.1")));
        assert!(range.check(&v("2.9.9")));
        assert!(!range.check(&v("3.0")));
        assert!(!range.check(&v("1.9.9")));
        assert_eq!(range.to_string(), ">= 2, < 3");
    }

    #[test]
    fn test_pessimistic() {
        assert!(satisfies("1.2", "~> 1.2"));
        assert!(satisfies("1.9", "~> 1.2"));
        assert!(!satisfies("2.0", "~> 1.2"));
        assert!(!satisfies("1.1", "~> 1.2"));

        assert!(satisfies("1.2.3", "~> 1.2.3"));
        assert!(satisfies("1.2.9", "~> 1.2.3"));
        assert!(!satisfies("1.3.0", "~> 1.2.3"));
        assert!(!satisfies("1.2.2", "~> 1.2.3"));

        assert!(satisfies("3.7", "~> 1"));

        // Fewer segments than the constraint never satisfy it
        assert!(!satisfies("2", "~> 2.0"));
        assert!(!satisfies("1.2", "~> 1.2.0"));
        assert!(satisfies("1.2.0", "~> 1.2"));
    }

    #[test]
    fn test_prerelease_rules() {
        // A pre-release never satisfies a plain release range
        assert!(!satisfies("2.1.0-beta", ">= 2, < 3"));
        // Unless the range is anchored on a pre-release of the same release
        assert!(satisfies("2.1.0-beta.2", "> 2.1.0-beta.1"));
        assert!(!satisfies("2.2.0-beta.2", "> 2.1.0-beta.1"));
        // Equality ignores the rule
        assert!(satisfies("2.1.0-beta", "2.1.0-beta"));
        // Pessimistic with a pre-release admits only pre-releases
        assert!(!satisfies("1.2.0", "~> 1.2.0-beta"));
        assert!(satisfies("1.2.0-rc", "~> 1.2.0-beta"));
    }

    #[test]
    fn test_constraint_errors() {
        for input in ["", " ", ">=", ">= 1,", ",< 3", ">= x", "~> 1.0-", ">>1"] {
            assert!(input.parse::<Constraint>().is_err(), "{:?} should not parse", input);
        }

        let err = Constraint::parse(">= 1, < x").unwrap_err();
        assert!(matches!(err, VersionError::InvalidConstraint { .. }));
        assert!(err.to_string().contains(">= 1, < x"));
    }

    #[test]
    fn test_satisfies_rejects_unparseable_input() {
        assert!(!satisfies("", ">= 1"));
        assert!(!satisfies("latest", ">= 1"));
        assert!(!satisfies("1.0", "latest"));
        assert!(!satisfies("1.0", ""));
    }

    proptest! {
        #[test]
        fn prop_satisfies_is_total(version in ".{0,12}", constraint in ".{0,16}") {
            let expected = match (version.parse::<Version>(), constraint.parse::<Constraint>()) {
                (Ok(v), Ok(c)) => c.check(&v),
                _ => false,
            };
            prop_assert_eq!(satisfies(&version, &constraint), expected);
        }

        #[test]
        fn prop_padding_does_not_change_equality(major in 0u64..1000, minor in 0u64..1000) {
            let short = format!("{}.{}", major, minor);
            let long = format!("{}.{}.0", major, minor);
            prop_assert!(satisfies(&short, &long));
            prop_assert!(satisfies(&long, &short));
        }
    }
}

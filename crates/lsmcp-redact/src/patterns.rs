//! Credential name patterns.
//!
//! Two tiers: the broad set marks names that carry secrets outright
//! (keys, tokens, passwords) and rates them high; the narrow set marks
//! identifiers that are sensitive but not secret (organization or account
//! ids) and rates them low. A name matching both is high.

use crate::detect::RiskLevel;
use crate::error::{RedactionError, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// High-risk name fragments.
///
/// `key` and `auth` are short enough to occur inside ordinary words
/// (`MONKEY`, `AUTHOR`), so they must stand as their own segment: bounded
/// by `_`, `-`, `.` or the ends of the name, or starting a camelCase hump.
const HIGH_RISK_PATTERNS: &[&str] = &[
    r"(?:^|[_\-.])(?:api)?keys?(?:$|[_\-.])",
    r"(?-i:[a-z0-9]Keys?)(?:$|[_\-.]|(?-i:[A-Z]))",
    r"token",
    r"secret",
    r"passw(or)?d",
    r"pwd",
    r"credential",
    r"creds",
    r"(?:^|[_\-.])o?auth(?:$|[_\-.]|orization)",
    r"(?-i:[a-z0-9]O?Auth)(?:$|[_\-.]|orization|(?-i:[A-Z]))",
    r"bearer",
    r"jwt",
];

/// Low-risk identifier fragments.
const LOW_RISK_PATTERNS: &[&str] = &[
    r"org[_-]?id",
    r"organi[sz]ation[_-]?id",
    r"account[_-]?id",
    r"user[_-]?id",
];

static SUBSTITUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{[^{}]+\}$").expect("substitution pattern compiles"));

static DEFAULT_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::new(HIGH_RISK_PATTERNS, LOW_RISK_PATTERNS)
        .expect("built-in credential patterns compile")
});

/// Compiled credential name patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    high: Vec<Regex>,
    low: Vec<Regex>,
}

impl PatternSet {
    /// Compile a pattern set. Patterns are matched case-insensitively
    /// anywhere in the name.
    pub fn new<S: AsRef<str>>(high: &[S], low: &[S]) -> Result<Self> {
        Ok(PatternSet {
            high: compile_all(high)?,
            low: compile_all(low)?,
        })
    }

    /// Built-in patterns extended with caller-supplied ones.
    pub fn with_extra<S: AsRef<str>>(extra_high: &[S], extra_low: &[S]) -> Result<Self> {
        let mut set = DEFAULT_PATTERNS.clone();
        set.high.extend(compile_all(extra_high)?);
        set.low.extend(compile_all(extra_low)?);
        Ok(set)
    }

    /// Risk of a name, or `None` when it does not look like a credential.
    pub fn classify(&self, name: &str) -> Option<RiskLevel> {
        if self.high.iter().any(|re| re.is_match(name)) {
            Some(RiskLevel::High)
        } else if self.low.iter().any(|re| re.is_match(name)) {
            Some(RiskLevel::Low)
        } else {
            None
        }
    }

    pub fn is_potential_credential(&self, name: &str) -> bool {
        self.classify(name).is_some()
    }

    pub fn pattern_count(&self) -> usize {
        self.high.len() + self.low.len()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

/// Whether a value is a host-resolved placeholder such as `${env:API_KEY}`.
pub fn is_substitution(value: &str) -> bool {
    SUBSTITUTION.is_match(value)
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p.as_ref())
                .case_insensitive(true)
                .build()
                .map_err(|e| RedactionError::PatternError {
                    pattern: p.as_ref().to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

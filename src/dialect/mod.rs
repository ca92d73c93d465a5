//! Dialect detection.
//!
//! Every supported dialect owns a [`DialectChecker`] that scores raw bytes with a
//! weighted checklist. The [`Classifier`] runs all of them and keeps the best.

use crate::error::{DetectionError, SchemaError};
use itertools::Itertools;
use regex::bytes::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

mod canonical;
mod legacy;

pub use canonical::CanonicalChecker;
pub use legacy::LegacyChecker;

/// Bonus for finding the dialect's distinguishing top-level key in the raw bytes.
pub const KEY_PROBE_BONUS: u8 = 10;

/// Score for input that fails to parse only because of unsubstituted `$` placeholders.
pub const PLACEHOLDER_SCORE: u8 = 50;

/// A historical schema version of an app definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Nested services and components.
    V1,
    /// Flat graph of named nodes.
    V2,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of scoring bytes against a dialect. `confidence` is in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub dialect: Dialect,
    pub confidence: u8,
}

/// Scores how likely it is that some bytes are written in one particular dialect.
///
/// Implementations must never fail: unreadable input simply scores low.
pub trait DialectChecker: Send + Sync {
    fn dialect(&self) -> Dialect;
    fn score(&self, bytes: &[u8]) -> Detection;
}

/// A named boolean check run against a dialect's probe shape.
pub(crate) type Check<T> = (&'static str, fn(&T) -> bool);

/// `round(100 * passed / total)`, half away from zero.
pub(crate) fn checklist_score(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((passed.min(total) * 100) as f64 / total as f64).round() as u8
}

/// A syntax error mentioning `$` means the user's template variables were not substituted yet.
pub(crate) fn is_template_placeholder(err: &SchemaError) -> bool {
    matches!(err, SchemaError::Syntax { message, .. } if message.contains('$'))
}

/// Runs a checklist over a probe shape and logs each check.
pub(crate) fn run_checks<T>(dialect: Dialect, probe: &T, checks: &[Check<T>]) -> u8 {
    let passed = checks
        .iter()
        .filter(|(name, check)| {
            let ok = check(probe);
            debug!(dialect = %dialect, check = *name, passed = ok, "dialect check");
            ok
        })
        .count();
    checklist_score(passed, checks.len())
}

/// The scoring flow shared by the built-in checkers.
///
/// The key probe only ever contributes its bonus when the input cannot be read
/// into the probe shape; readable input is scored by the checklist alone.
pub(crate) fn score_checklist<T: DeserializeOwned>(
    dialect: Dialect,
    bytes: &[u8],
    key_probe: &Regex,
    parse_full: impl Fn(&[u8]) -> Option<SchemaError>,
    checks: &[Check<T>],
) -> Detection {
    let detection = |confidence: u8| Detection {
        dialect,
        confidence: confidence.min(100),
    };
    let bonus = if key_probe.is_match(bytes) {
        KEY_PROBE_BONUS
    } else {
        0
    };

    if let Some(err) = parse_full(bytes) {
        if is_template_placeholder(&err) {
            debug!(dialect = %dialect, error = %err, "unsubstituted template placeholder");
            return detection(PLACEHOLDER_SCORE + bonus);
        }
    }

    match serde_json::from_slice::<T>(bytes) {
        Ok(probe) => detection(run_checks(dialect, &probe, checks)),
        Err(err) => {
            debug!(dialect = %dialect, error = %err, "probe shape unreadable");
            detection(bonus)
        }
    }
}

/// Picks the dialect of an app definition from an ordered list of checkers.
pub struct Classifier {
    checkers: Vec<Box<dyn DialectChecker>>,
}

impl Default for Classifier {
    /// Registers V1 before V2, so V1 wins ties.
    fn default() -> Self {
        Self::empty()
            .with_checker(Box::new(LegacyChecker::new()))
            .with_checker(Box::new(CanonicalChecker::new()))
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A classifier without any checkers; every input is `UnknownDialect`.
    pub fn empty() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// Appends a checker. Earlier checkers win ties.
    pub fn with_checker(mut self, checker: Box<dyn DialectChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Scores of every registered checker, in registration order.
    pub fn scores(&self, bytes: &[u8]) -> Vec<Detection> {
        self.checkers
            .iter()
            .map(|checker| {
                let detection = checker.score(bytes);
                debug!(
                    dialect = %detection.dialect,
                    confidence = detection.confidence,
                    "dialect scored"
                );
                detection
            })
            .collect()
    }

    /// Returns the dialect with the strictly highest confidence.
    pub fn classify(&self, bytes: &[u8]) -> Result<Detection, DetectionError> {
        let mut best: Option<Detection> = None;
        for detection in self.scores(bytes) {
            if detection.confidence > best.map_or(0, |b| b.confidence) {
                best = Some(detection);
            }
        }

        best.ok_or_else(|| DetectionError::UnknownDialect {
            expected: self
                .checkers
                .iter()
                .map(|c| c.dialect())
                .unique()
                .join(" or "),
        })
    }
}

/// Classifies bytes with the default checkers.
pub fn classify(bytes: &[u8]) -> Result<Detection, DetectionError> {
    Classifier::default().classify(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Dialect, u8);

    impl DialectChecker for Fixed {
        fn dialect(&self) -> Dialect {
            self.0
        }
        fn score(&self, _bytes: &[u8]) -> Detection {
            Detection {
                dialect: self.0,
                confidence: self.1,
            }
        }
    }

    #[test]
    fn test_checklist_score_rounding() {
        assert_eq!(checklist_score(4, 5), 80);
        assert_eq!(checklist_score(4, 6), 67);
        assert_eq!(checklist_score(1, 6), 17);
        assert_eq!(checklist_score(6, 6), 100);
        assert_eq!(checklist_score(0, 0), 0);
    }

    #[test]
    fn test_ties_go_to_earlier_checker() {
        let classifier = Classifier::empty()
            .with_checker(Box::new(Fixed(Dialect::V2, 40)))
            .with_checker(Box::new(Fixed(Dialect::V1, 40)));
        assert_eq!(classifier.classify(b"").unwrap().dialect, Dialect::V2);
    }

    #[test]
    fn test_all_zero_is_unknown() {
        let classifier = Classifier::empty()
            .with_checker(Box::new(Fixed(Dialect::V1, 0)))
            .with_checker(Box::new(Fixed(Dialect::V2, 0)));
        let err = classifier.classify(b"").unwrap_err();
        assert_eq!(
            err,
            DetectionError::UnknownDialect {
                expected: "V1 or V2".to_string()
            }
        );
    }
}

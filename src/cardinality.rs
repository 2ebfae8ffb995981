use std::fmt::Display;

use crate::{argument_error::ArgumentError, parse_result::ParserError};

/// How many values an argument may receive over one parse.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Exact(usize),
    /// `None` is unbounded.
    Max(Option<usize>),
    /// Upper bound `None` means "at least `min`".
    Range(usize, Option<usize>),
}

impl Cardinality {
    pub fn exact(n: usize) -> Cardinality {
        Cardinality::Exact(n)
    }

    pub fn max(n: usize) -> Cardinality {
        Cardinality::Max(Some(n))
    }

    pub fn unbounded() -> Cardinality {
        Cardinality::Max(None)
    }

    pub fn range(min: usize, max: usize) -> Cardinality {
        Cardinality::Range(min, Some(max))
    }

    pub fn at_least(min: usize) -> Cardinality {
        Cardinality::Range(min, None)
    }

    pub fn upper_bound(&self) -> Option<usize> {
        match self {
            Cardinality::Exact(n) => Some(*n),
            Cardinality::Max(n) | Cardinality::Range(_, n) => *n,
        }
    }

    pub fn lower_bound(&self) -> usize {
        match self {
            Cardinality::Exact(n) | Cardinality::Range(n, _) => *n,
            Cardinality::Max(_) => 0,
        }
    }

    pub fn is_valid_number(&self, x: usize) -> bool {
        x >= self.lower_bound() && self.upper_bound().map_or(true, |max| x <= max)
    }

    /// Rejects bounds that no value-taking argument could ever satisfy.
    pub fn validate(&self, argument: &str) -> Result<(), ArgumentError> {
        match self {
            Cardinality::Exact(0) | Cardinality::Max(Some(0)) => {
                Err(ArgumentError::ZeroCardinality(argument.to_string()))
            }
            Cardinality::Range(min, Some(max)) if min > max => {
                Err(ArgumentError::InvalidRangeSize(*min, *max))
            }
            Cardinality::Range(_, Some(0)) => {
                Err(ArgumentError::ZeroCardinality(argument.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Human readable form used in usage text.
    pub fn describe(&self) -> String {
        match self {
            Cardinality::Exact(n) => format!("exactly {}", n),
            Cardinality::Max(Some(n)) => format!("at most {}", n),
            Cardinality::Max(None) => "any number".to_string(),
            Cardinality::Range(min, Some(max)) => format!("{} to {}", min, max),
            Cardinality::Range(min, None) => format!("at least {}", min),
        }
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Counts the values one argument received during a parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardinalityCounter {
    policy: Cardinality,
    seen: usize,
}

impl CardinalityCounter {
    pub fn new(policy: Cardinality) -> CardinalityCounter {
        CardinalityCounter { policy, seen: 0 }
    }

    pub fn policy(&self) -> Cardinality {
        self.policy
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn is_full(&self) -> bool {
        self.policy
            .upper_bound()
            .map_or(false, |max| self.seen >= max)
    }

    pub fn got_value(&mut self, argument: &str) -> Result<(), ParserError> {
        self.seen += 1;
        match self.policy.upper_bound() {
            Some(max) if self.seen > max => Err(ParserError::TooManyValues(
                argument.to_string(),
                self.policy,
            )),
            _ => Ok(()),
        }
    }

    /// End-of-parse check; `Max` never fails.
    pub fn check(&self, argument: &str) -> Result<(), ParserError> {
        let complete = match self.policy {
            Cardinality::Exact(n) => self.seen == n,
            Cardinality::Range(min, _) => self.seen >= min,
            Cardinality::Max(_) => true,
        };
        if complete {
            Ok(())
        } else {
            Err(ParserError::IncompleteValues(
                argument.to_string(),
                self.policy,
                self.seen,
            ))
        }
    }
}

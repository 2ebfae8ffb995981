use std::fmt::Display;

use thiserror::Error;

use crate::{argument_error::ArgumentError, argument_key::ArgumentKey, cardinality::Cardinality};

/// The kind of a parse failure, independent of the message it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownArgument,
    Deprecated,
    TooManyValues,
    IncompleteValues,
    CheckFailed,
    ConversionFailed,
    InversionNotSupported,
    MissingRequiredArgument,
    ArgumentExcluded,
    AlreadyUsed,
    ValuesNotDistinct,
    ValuesNotDisjoint,
    UnsupportedOperation,
    InvalidRegistration,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnknownArgument => "unknown argument",
            ErrorKind::Deprecated => "deprecated",
            ErrorKind::TooManyValues => "too many values",
            ErrorKind::IncompleteValues => "incomplete values",
            ErrorKind::CheckFailed => "check failed",
            ErrorKind::ConversionFailed => "conversion failed",
            ErrorKind::InversionNotSupported => "inversion not supported",
            ErrorKind::MissingRequiredArgument => "missing required argument",
            ErrorKind::ArgumentExcluded => "argument excluded",
            ErrorKind::AlreadyUsed => "already used",
            ErrorKind::ValuesNotDistinct => "values not distinct",
            ErrorKind::ValuesNotDisjoint => "values not disjoint",
            ErrorKind::UnsupportedOperation => "unsupported operation",
            ErrorKind::InvalidRegistration => "invalid registration",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("unknown argument \"{0}\"")]
    UnknownArgument(String),
    #[error("found multiple arguments {1} for abbreviated argument key \"{0}\"")]
    AmbiguousArgument(String, String),
    #[error("argument {0} is deprecated{}", replacement_hint(.1))]
    Deprecated(String, Option<String>),
    #[error("argument {0} accepts {1} values, got more")]
    TooManyValues(String, Cardinality),
    #[error("argument {0} expected {1} values, but found {2}")]
    IncompleteValues(String, Cardinality, usize),
    #[error("argument {0} is missing its value")]
    MissingValue(String),
    #[error("value \"{1}\" of argument {0} failed check: {2}")]
    CheckFailed(String, String, String),
    #[error("failed to convert value \"{1}\" of argument {0} to type {2}")]
    ConversionFailed(String, String, String),
    #[error("argument {0} takes no value, got \"{1}\"")]
    UnexpectedValue(String, String),
    #[error("argument {0} cannot be inverted")]
    InversionNotSupported(String),
    #[error("missing required argument {0}")]
    MissingRequiredArgument(String),
    #[error("argument {0} cannot be used together with {1}")]
    ArgumentExcluded(String, String),
    #[error("argument {0} was already used")]
    AlreadyUsed(String),
    #[error("arguments {0} must have distinct values")]
    ValuesNotDistinct(String),
    #[error("values of arguments {0} and {1} overlap")]
    ValuesNotDisjoint(String, String),
    #[error("operation {0} is not supported by {1}")]
    UnsupportedOperation(&'static str, String),
    #[error("{0}")]
    InvalidRegistration(#[from] ArgumentError),
}

fn replacement_hint(replacement: &Option<String>) -> String {
    replacement
        .as_ref()
        .map_or_else(String::new, |x| format!(", use {} instead", x))
}

impl ParserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParserError::UnknownArgument(_) | ParserError::AmbiguousArgument(..) => {
                ErrorKind::UnknownArgument
            }
            ParserError::Deprecated(..) => ErrorKind::Deprecated,
            ParserError::TooManyValues(..) => ErrorKind::TooManyValues,
            ParserError::IncompleteValues(..) | ParserError::MissingValue(_) => {
                ErrorKind::IncompleteValues
            }
            ParserError::CheckFailed(..) => ErrorKind::CheckFailed,
            ParserError::ConversionFailed(..) | ParserError::UnexpectedValue(..) => {
                ErrorKind::ConversionFailed
            }
            ParserError::InversionNotSupported(_) => ErrorKind::InversionNotSupported,
            ParserError::MissingRequiredArgument(_) => ErrorKind::MissingRequiredArgument,
            ParserError::ArgumentExcluded(..) => ErrorKind::ArgumentExcluded,
            ParserError::AlreadyUsed(_) => ErrorKind::AlreadyUsed,
            ParserError::ValuesNotDistinct(_) => ErrorKind::ValuesNotDistinct,
            ParserError::ValuesNotDisjoint(..) => ErrorKind::ValuesNotDisjoint,
            ParserError::UnsupportedOperation(..) => ErrorKind::UnsupportedOperation,
            ParserError::InvalidRegistration(_) => ErrorKind::InvalidRegistration,
        }
    }
}

/// One entry of a [`ParseReport`]. `key` is `None` for failures of
/// constraints spanning several arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentFailure {
    pub key: Option<ArgumentKey>,
    pub error: ParserError,
}

impl ArgumentFailure {
    pub fn new(key: Option<ArgumentKey>, error: ParserError) -> ArgumentFailure {
        ArgumentFailure { key, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Display for ArgumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: {}", key, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Every failure of one parse. Failures while processing a token abort the
/// parse, so they are reported alone; end-of-parse failures are collected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseReport {
    failures: Vec<ArgumentFailure>,
}

impl ParseReport {
    pub fn new(failures: Vec<ArgumentFailure>) -> ParseReport {
        ParseReport { failures }
    }

    pub fn single(key: Option<ArgumentKey>, error: ParserError) -> ParseReport {
        ParseReport {
            failures: vec![ArgumentFailure::new(key, error)],
        }
    }

    pub fn failures(&self) -> &[ArgumentFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first(&self) -> Option<&ArgumentFailure> {
        self.failures.first()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.failures.iter().map(ArgumentFailure::kind).collect()
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.failures.iter().any(|x| x.kind() == kind)
    }

    pub(crate) fn push(&mut self, failure: ArgumentFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn extend(&mut self, other: ParseReport) {
        self.failures.extend(other.failures);
    }
}

impl Display for ParseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.failures.iter().map(|x| x.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::{ErrorKind, ParseReport, ParserError};
    use crate::{argument_error::ArgumentError, argument_key::ArgumentKey};

    #[test]
    fn deprecated_message_names_replacement() {
        assert_eq!(
            ParserError::Deprecated("--old".to_string(), Some("--new".to_string())).to_string(),
            "argument --old is deprecated, use --new instead"
        );
        assert_eq!(
            ParserError::Deprecated("--old".to_string(), None).to_string(),
            "argument --old is deprecated"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(
            ParserError::AmbiguousArgument("f".to_string(), "[--foo, --far]".to_string()).kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            ParserError::from(ArgumentError::RegistrationClosed).kind(),
            ErrorKind::InvalidRegistration
        );
    }

    #[test]
    fn report_display() {
        let mut report = ParseReport::single(
            Some(ArgumentKey::new("x").unwrap()),
            ParserError::MissingRequiredArgument("-x".to_string()),
        );
        report.extend(ParseReport::single(
            None,
            ParserError::ValuesNotDistinct("[--a, --b]".to_string()),
        ));
        assert_eq!(
            report.to_string(),
            "-x: missing required argument -x\narguments [--a, --b] must have distinct values"
        );
        assert_eq!(
            report.kinds(),
            vec![ErrorKind::MissingRequiredArgument, ErrorKind::ValuesNotDistinct]
        );
    }
}

use thiserror::Error;

use crate::argument_key::ArgumentKeyError;

/// Errors made while registering arguments. These are programming errors and
/// are reported before any token is parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{0}")]
    InvalidKey(#[from] ArgumentKeyError),
    #[error("found duplicate argument name values {0}")]
    DuplicateArgumentName(String),
    #[error("argument {0} already has a check that cannot be combined with {1}")]
    DuplicateCheck(String, String),
    #[error("argument {0} takes no value and cannot carry {1}")]
    NoValueArgument(String, &'static str),
    #[error("argument {0} cannot be both mandatory and deprecated")]
    MandatoryDeprecated(String),
    #[error("start of Cardinality::Range {0} is > than end {1}")]
    InvalidRangeSize(usize, usize),
    #[error("argument {0} must accept at least one value")]
    ZeroCardinality(String),
    #[error("destination of argument {0} does not allow position formatters")]
    PositionFormatNotAllowed(String),
    #[error("destination of argument {0} ({1}) does not support {2}")]
    UnsupportedContainerOperation(String, String, &'static str),
    #[error("value mode {1} is not supported for argument {0}")]
    UnsupportedValueMode(String, String),
    #[error("argument {0} does not support inversion")]
    InversionNotSupported(String),
    #[error("argument {0} takes an optional value but has no implicit value")]
    MissingImplicitValue(String),
    #[error("constraint of {0} names unknown argument {1}")]
    UnknownConstraintArgument(String, String),
    #[error("constraint {0} needs at least {1} arguments")]
    InsufficientConstraintArguments(String, usize),
    #[error("constraint {0} compares arguments of different value types {1} and {2}")]
    ConstraintTypeMismatch(String, String, String),
    #[error("check range [{0}, {1}] has its lower end above its upper end")]
    InvalidCheckRange(String, String),
    #[error("invalid regular expression \"{0}\": {1}")]
    InvalidPattern(String, String),
    #[error("zero or one choice given, required at least 2 unique choices")]
    InsufficientChoices,
    #[error("duplicate choice \"{0}\" found")]
    DuplicateChoice(String),
    #[error("\"{0}\" cannot be used as inversion marker")]
    IllegalInversionMarker(char),
    #[error("arguments cannot be added once parsing started")]
    RegistrationClosed,
}

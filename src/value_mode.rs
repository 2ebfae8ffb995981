use std::fmt::Display;

use crate::argument_error::ArgumentError;

const NONE_STRING: &str = "none";
const OPTIONAL_STRING: &str = "optional";
const REQUIRED_STRING: &str = "required";
const PASSTHROUGH_STRING: &str = "passthrough";

/// Whether an argument consumes the token following its key as value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueMode {
    /// Never takes a value, e.g. flags and counters.
    None,
    /// Takes the next token unless it looks like a key, otherwise uses the
    /// implicit value.
    Optional,
    /// Always takes the next token, even if it starts with `-`.
    Required,
    /// Every remaining token belongs to the argument.
    Passthrough,
}

impl ValueMode {
    pub fn new(mode: &str, argument: &str) -> Result<ValueMode, ArgumentError> {
        match mode {
            NONE_STRING => Ok(ValueMode::None),
            OPTIONAL_STRING => Ok(ValueMode::Optional),
            REQUIRED_STRING => Ok(ValueMode::Required),
            PASSTHROUGH_STRING => Ok(ValueMode::Passthrough),
            x => Err(ArgumentError::UnsupportedValueMode(
                argument.to_string(),
                x.to_string(),
            )),
        }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, ValueMode::None)
    }
}

impl Display for ValueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            ValueMode::None => NONE_STRING,
            ValueMode::Optional => OPTIONAL_STRING,
            ValueMode::Required => REQUIRED_STRING,
            ValueMode::Passthrough => PASSTHROUGH_STRING,
        };
        write!(f, "{}", result)
    }
}

#[cfg(test)]
mod test {
    use super::ValueMode;
    use crate::argument_error::ArgumentError;

    #[test]
    fn from_string() {
        assert_eq!(ValueMode::new("optional", "-x"), Ok(ValueMode::Optional));
        assert_eq!(
            ValueMode::new("store", "-x"),
            Err(ArgumentError::UnsupportedValueMode(
                "-x".to_string(),
                "store".to_string()
            ))
        );
        assert_eq!(ValueMode::Passthrough.to_string(), "passthrough");
        assert!(!ValueMode::None.takes_value());
    }
}

use std::collections::VecDeque;

use crate::settings::HandlerSettings;

const PREFIX_CHAR: char = '-';

/// What a raw token looks like before any argument is looked up.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    EndOfOptions,
    /// `--name` or `--name=value`.
    Long {
        name: &'t str,
        value: Option<&'t str>,
        inverted: bool,
    },
    /// `-x`, `-xyz` or `-ofile`, without the prefix.
    Short { chars: &'t str, inverted: bool },
    Value(&'t str),
}

impl<'t> Token<'t> {
    pub fn classify(raw: &'t str, settings: &HandlerSettings) -> Token<'t> {
        if settings.end_of_options() == Some(raw) {
            return Token::EndOfOptions;
        }

        let (rest, inverted) = match raw.strip_prefix(settings.inversion_marker()) {
            Some(rest) if rest.starts_with(PREFIX_CHAR) => (rest, true),
            _ => (raw, false),
        };

        if let Some(long) = rest.strip_prefix("--") {
            if long.is_empty() {
                return Token::Value(raw);
            }
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            Token::Long {
                name,
                value,
                inverted,
            }
        } else if let Some(chars) = rest.strip_prefix(PREFIX_CHAR) {
            if chars.is_empty() {
                Token::Value(raw)
            } else {
                Token::Short { chars, inverted }
            }
        } else {
            Token::Value(raw)
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Token::Value(_))
    }
}

/// Whether `raw` reads as a negative number, which is taken as a value when
/// no short argument claims its first digit.
pub(crate) fn is_negative_number(raw: &str) -> bool {
    raw.starts_with(PREFIX_CHAR) && raw[1..].parse::<f64>().is_ok()
}

/// Tokens not yet consumed. Shared by a handler and its argument groups.
#[derive(Debug)]
pub(crate) struct TokenCursor {
    tokens: VecDeque<String>,
    options_ended: bool,
}

impl TokenCursor {
    pub fn new<I, S>(tokens: I) -> TokenCursor
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TokenCursor {
            tokens: tokens.into_iter().map(|x| x.as_ref().to_string()).collect(),
            options_ended: false,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn next(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.tokens.drain(..).collect()
    }

    /// After the end-of-options marker every token is a value.
    pub fn options_ended(&self) -> bool {
        self.options_ended
    }

    pub fn end_options(&mut self) {
        self.options_ended = true;
    }

    /// Next token if it is a value rather than something key-like.
    pub fn next_value(&mut self, settings: &HandlerSettings) -> Option<String> {
        let take = match self.peek() {
            None => false,
            Some(_) if self.options_ended => true,
            Some(raw) => Token::classify(raw, settings).is_value() || is_negative_number(raw),
        };
        if take {
            self.next()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::{is_negative_number, Token, TokenCursor};
    use crate::settings::HandlerSettings;

    #[test]
    fn classify() {
        let settings = HandlerSettings::default();
        assert_eq!(Token::classify("--", &settings), Token::EndOfOptions);
        assert_eq!(
            Token::classify("--name=a=b", &settings),
            Token::Long {
                name: "name",
                value: Some("a=b"),
                inverted: false
            }
        );
        assert_eq!(
            Token::classify("!-v", &settings),
            Token::Short {
                chars: "v",
                inverted: true
            }
        );
        assert_eq!(Token::classify("!x", &settings), Token::Value("!x"));
        assert_eq!(Token::classify("-", &settings), Token::Value("-"));
        assert_eq!(Token::classify("file", &settings), Token::Value("file"));
    }

    #[test]
    fn end_of_options_can_be_disabled() {
        let settings = HandlerSettings::builder()
            .with_end_of_options(None)
            .build()
            .unwrap();
        assert_eq!(Token::classify("--", &settings), Token::Value("--"));
    }

    #[test]
    fn negative_numbers() {
        assert!(is_negative_number("-5"));
        assert!(is_negative_number("-0.25"));
        assert!(!is_negative_number("-v"));
        assert!(!is_negative_number("5"));
    }

    #[test]
    fn cursor_values() {
        let settings = HandlerSettings::default();
        let mut cursor = TokenCursor::new(["1", "-2", "-x", "3"]);
        assert_eq!(cursor.next_value(&settings), Some("1".to_string()));
        assert_eq!(cursor.next_value(&settings), Some("-2".to_string()));
        assert_eq!(cursor.next_value(&settings), None);
        assert_eq!(cursor.len(), 2);
        cursor.end_options();
        assert_eq!(cursor.next_value(&settings), Some("-x".to_string()));
    }
}

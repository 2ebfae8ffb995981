use std::fmt::Display;

use thiserror::Error;

const NAME_SEPARATOR: char = ',';
const PREFIX_CHAR: char = '-';
const ILLEGAL_NAME_CHARS: [char; 3] = ['=', '!', NAME_SEPARATOR];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKeyError {
    #[error("no argument names given")]
    EmptyArgumentName,
    #[error("argument specification \"{0}\" has more than a short and a long name")]
    TooManyNames(String),
    #[error("argument specification \"{0}\" has two short names")]
    DuplicateShortName(String),
    #[error("argument specification \"{0}\" has two long names")]
    DuplicateLongName(String),
    #[error("name \"{0}\" uses a single prefix character but is longer than one character")]
    InvalidShortName(String),
    #[error("argument name \"{0}\" contains unsupported character '{1}'")]
    IllegalCharacter(String, char),
}

/// Identity of one argument: a short character, a long name, or both.
///
/// Parsed once from a specification string like `"v,verbose"` or
/// `"-v,--verbose"` and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgumentKey {
    short: Option<char>,
    long: Option<String>,
}

impl ArgumentKey {
    pub fn new(spec: &str) -> Result<ArgumentKey, ArgumentKeyError> {
        let mut short: Option<char> = None;
        let mut long: Option<String> = None;
        let mut n_names = 0;

        for raw_name in spec.split(NAME_SEPARATOR).map(str::trim) {
            if raw_name.is_empty() {
                continue;
            }
            n_names += 1;
            if n_names > 2 {
                return Err(ArgumentKeyError::TooManyNames(spec.to_string()));
            }

            let n_prefixes = raw_name.chars().take_while(|c| *c == PREFIX_CHAR).count();
            let name = &raw_name[n_prefixes..];
            validate_name(name)?;

            let is_short = match n_prefixes {
                0 => name.chars().count() == 1,
                1 if name.chars().count() == 1 => true,
                1 => return Err(ArgumentKeyError::InvalidShortName(raw_name.to_string())),
                _ => false,
            };

            if is_short {
                if short.is_some() {
                    return Err(ArgumentKeyError::DuplicateShortName(spec.to_string()));
                }
                short = name.chars().next();
            } else {
                if long.is_some() {
                    return Err(ArgumentKeyError::DuplicateLongName(spec.to_string()));
                }
                long = Some(name.to_string());
            }
        }

        if short.is_none() && long.is_none() {
            Err(ArgumentKeyError::EmptyArgumentName)
        } else {
            Ok(ArgumentKey { short, long })
        }
    }

    /// Key for a positional argument, which is only ever addressed by position.
    pub fn positional(name: &str) -> Result<ArgumentKey, ArgumentKeyError> {
        let name = name.trim();
        validate_name(name)?;
        Ok(ArgumentKey {
            short: None,
            long: Some(name.to_string()),
        })
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn matches_short(&self, c: char) -> bool {
        self.short == Some(c)
    }

    pub fn matches_long(&self, name: &str) -> bool {
        self.long.as_deref() == Some(name)
    }

    /// Whether `name` (without prefix characters) is either of this key's names.
    pub fn matches_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if self.matches_short(c) => true,
            _ => self.matches_long(name),
        }
    }

    /// Names of this key that `other` uses as well.
    pub fn overlap(&self, other: &ArgumentKey) -> Vec<String> {
        let mut overlap = Vec::new();
        if let (Some(a), Some(b)) = (self.short, other.short) {
            if a == b {
                overlap.push(format!("{}{}", PREFIX_CHAR, a));
            }
        }
        if let (Some(a), Some(b)) = (self.long.as_ref(), other.long.as_ref()) {
            if a == b {
                overlap.push(format!("{0}{0}{1}", PREFIX_CHAR, a));
            }
        }
        overlap
    }

    /// Preferred single name with prefix, long name first.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("{0}{0}{1}", PREFIX_CHAR, long),
            (None, Some(short)) => format!("{}{}", PREFIX_CHAR, short),
            (None, None) => String::new(),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ArgumentKeyError> {
    if name.is_empty() {
        return Err(ArgumentKeyError::EmptyArgumentName);
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || ILLEGAL_NAME_CHARS.contains(c))
    {
        return Err(ArgumentKeyError::IllegalCharacter(name.to_string(), c));
    }
    Ok(())
}

impl Display for ArgumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.short, &self.long) {
            (Some(short), Some(long)) => {
                write!(f, "{0}{1},{0}{0}{2}", PREFIX_CHAR, short, long)
            }
            _ => write!(f, "{}", self.display_name()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ArgumentKey, ArgumentKeyError};

    #[test]
    fn empty_argument() {
        assert_eq!(
            ArgumentKey::new("").unwrap_err(),
            ArgumentKeyError::EmptyArgumentName
        );
        assert_eq!(
            ArgumentKey::new(" , ").unwrap_err(),
            ArgumentKeyError::EmptyArgumentName
        );
    }

    #[test]
    fn short_and_long_without_prefixes() {
        let key = ArgumentKey::new("v,verbose").unwrap();
        assert_eq!(key.short_name(), Some('v'));
        assert_eq!(key.long_name(), Some("verbose"));
    }

    #[test]
    fn prefixes_and_order_are_ignored() {
        assert_eq!(
            ArgumentKey::new("--verbose,-v").unwrap(),
            ArgumentKey::new("v,verbose").unwrap()
        );
    }

    #[test]
    fn double_prefix_single_char_is_long() {
        let key = ArgumentKey::new("--x").unwrap();
        assert_eq!(key.short_name(), None);
        assert_eq!(key.long_name(), Some("x"));
    }

    #[test]
    fn long_name_with_single_prefix() {
        assert_eq!(
            ArgumentKey::new("-verbose").unwrap_err(),
            ArgumentKeyError::InvalidShortName("-verbose".to_string())
        );
    }

    #[test]
    fn too_many_names() {
        assert_eq!(
            ArgumentKey::new("a,b,c").unwrap_err(),
            ArgumentKeyError::TooManyNames("a,b,c".to_string())
        );
    }

    #[test]
    fn two_short_names() {
        assert_eq!(
            ArgumentKey::new("a,b").unwrap_err(),
            ArgumentKeyError::DuplicateShortName("a,b".to_string())
        );
    }

    #[test]
    fn two_long_names() {
        assert_eq!(
            ArgumentKey::new("foo,bar").unwrap_err(),
            ArgumentKeyError::DuplicateLongName("foo,bar".to_string())
        );
    }

    #[test]
    fn illegal_characters() {
        assert_eq!(
            ArgumentKey::new("--fo=o").unwrap_err(),
            ArgumentKeyError::IllegalCharacter("fo=o".to_string(), '=')
        );
        assert_eq!(
            ArgumentKey::new("--a b").unwrap_err(),
            ArgumentKeyError::IllegalCharacter("a b".to_string(), ' ')
        );
    }

    #[test]
    fn display() {
        assert_eq!(ArgumentKey::new("v,verbose").unwrap().to_string(), "-v,--verbose");
        assert_eq!(ArgumentKey::new("v").unwrap().to_string(), "-v");
        assert_eq!(ArgumentKey::new("name").unwrap().to_string(), "--name");
    }

    #[test]
    fn matching() {
        let key = ArgumentKey::new("o,output").unwrap();
        assert!(key.matches_name("o"));
        assert!(key.matches_name("output"));
        assert!(!key.matches_name("out"));
        assert!(!key.matches_short('x'));
    }

    #[test]
    fn overlapping_keys() {
        let a = ArgumentKey::new("o,output").unwrap();
        let b = ArgumentKey::new("o,other").unwrap();
        assert_eq!(a.overlap(&b), vec!["-o".to_string()]);
        assert!(a.overlap(&ArgumentKey::new("x").unwrap()).is_empty());
    }

    #[test]
    fn positional_key() {
        let key = ArgumentKey::positional("file").unwrap();
        assert_eq!(key.long_name(), Some("file"));
        assert_eq!(key.short_name(), None);
    }
}

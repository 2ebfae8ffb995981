//! Value checks attached to an argument.
//!
//! Each check looks at the raw (already formatted) value string before it is
//! converted and stored. Checks on one argument run in registration order and
//! the first failure aborts the assignment.

use std::{
    cmp::Ordering,
    collections::HashSet,
    fmt::Display,
    fs,
    path::Path,
    str::FromStr,
    time::{Duration, SystemTime},
};

use regex::Regex;

use crate::{argument_error::ArgumentError, string_vec_to_string};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckKind {
    LowerBound,
    UpperBound,
    Range,
    Pattern,
    Values,
    MinLength,
    MaxLength,
    AbsolutePath,
    IsFile,
    IsDirectory,
    ParentDirectoryExists,
    FileSize,
    FileAge,
    Predicate,
}

pub trait ValueCheck {
    /// `Err` carries the reason shown to the user.
    fn check_value(&self, value: &str) -> Result<(), String>;

    fn describe(&self) -> String;

    fn kind(&self) -> CheckKind;

    /// Whether this check may sit on the same argument as `other`.
    fn combinable_with(&self, other: &dyn ValueCheck) -> bool {
        let (a, b) = (self.kind(), other.kind());
        a != b && !matches!(
            (a, b),
            (CheckKind::Range, CheckKind::LowerBound)
                | (CheckKind::Range, CheckKind::UpperBound)
                | (CheckKind::LowerBound, CheckKind::Range)
                | (CheckKind::UpperBound, CheckKind::Range)
                | (CheckKind::IsFile, CheckKind::IsDirectory)
                | (CheckKind::IsDirectory, CheckKind::IsFile)
        )
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("\"{}\" is not a valid number", value))
}

pub struct LowerBound<T> {
    min: T,
}

impl<T: FromStr + PartialOrd + Display> ValueCheck for LowerBound<T> {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let number: T = parse_number(value)?;
        if number < self.min {
            Err(format!("value {} is lower than {}", number, self.min))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("value >= {}", self.min)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::LowerBound
    }
}

pub struct UpperBound<T> {
    max: T,
}

impl<T: FromStr + PartialOrd + Display> ValueCheck for UpperBound<T> {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let number: T = parse_number(value)?;
        if number > self.max {
            Err(format!("value {} is greater than {}", number, self.max))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("value <= {}", self.max)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::UpperBound
    }
}

/// Inclusive on both ends.
pub struct Range<T> {
    min: T,
    max: T,
}

impl<T: FromStr + PartialOrd + Display> ValueCheck for Range<T> {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let number: T = parse_number(value)?;
        if number < self.min || number > self.max {
            Err(format!(
                "value {} is outside of range [{}, {}]",
                number, self.min, self.max
            ))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("value in range [{}, {}]", self.min, self.max)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Range
    }
}

pub struct Pattern {
    regex: Regex,
}

impl ValueCheck for Pattern {
    fn check_value(&self, value: &str) -> Result<(), String> {
        if self.regex.is_match(value) {
            Ok(())
        } else {
            Err(format!("value does not match pattern \"{}\"", self.regex))
        }
    }

    fn describe(&self) -> String {
        format!("value matches \"{}\"", self.regex)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Pattern
    }
}

/// Enumerated set of accepted values.
pub struct Values {
    choices: Vec<String>,
    ignore_case: bool,
}

impl Values {
    fn new(choices: Vec<String>, ignore_case: bool) -> Result<Values, ArgumentError> {
        if choices.len() < 2 {
            return Err(ArgumentError::InsufficientChoices);
        }
        let mut seen_choices = HashSet::new();
        for choice in choices.iter() {
            let normalized = if ignore_case {
                choice.to_lowercase()
            } else {
                choice.clone()
            };
            if !seen_choices.insert(normalized) {
                return Err(ArgumentError::DuplicateChoice(choice.clone()));
            }
        }
        Ok(Values {
            choices,
            ignore_case,
        })
    }
}

impl ValueCheck for Values {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let found = self.choices.iter().any(|choice| {
            if self.ignore_case {
                choice.to_lowercase() == value.to_lowercase()
            } else {
                choice == value
            }
        });
        if found {
            Ok(())
        } else {
            Err(format!(
                "value \"{}\" is not one of supported values {}",
                value,
                string_vec_to_string(&self.choices, true)
            ))
        }
    }

    fn describe(&self) -> String {
        format!("value in {}", string_vec_to_string(&self.choices, true))
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Values
    }
}

pub struct MinLength(usize);

impl ValueCheck for MinLength {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let length = value.chars().count();
        if length < self.0 {
            Err(format!(
                "value has length {}, expected at least {}",
                length, self.0
            ))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("length >= {}", self.0)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::MinLength
    }
}

pub struct MaxLength(usize);

impl ValueCheck for MaxLength {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let length = value.chars().count();
        if length > self.0 {
            Err(format!(
                "value has length {}, expected at most {}",
                length, self.0
            ))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("length <= {}", self.0)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::MaxLength
    }
}

pub struct AbsolutePath;

impl ValueCheck for AbsolutePath {
    fn check_value(&self, value: &str) -> Result<(), String> {
        if Path::new(value).is_absolute() {
            Ok(())
        } else {
            Err(format!("\"{}\" is not an absolute path", value))
        }
    }

    fn describe(&self) -> String {
        "absolute path".to_string()
    }

    fn kind(&self) -> CheckKind {
        CheckKind::AbsolutePath
    }
}

pub struct IsFile;

impl ValueCheck for IsFile {
    fn check_value(&self, value: &str) -> Result<(), String> {
        if Path::new(value).is_file() {
            Ok(())
        } else {
            Err(format!("\"{}\" is not an existing file", value))
        }
    }

    fn describe(&self) -> String {
        "existing file".to_string()
    }

    fn kind(&self) -> CheckKind {
        CheckKind::IsFile
    }
}

pub struct IsDirectory;

impl ValueCheck for IsDirectory {
    fn check_value(&self, value: &str) -> Result<(), String> {
        if Path::new(value).is_dir() {
            Ok(())
        } else {
            Err(format!("\"{}\" is not an existing directory", value))
        }
    }

    fn describe(&self) -> String {
        "existing directory".to_string()
    }

    fn kind(&self) -> CheckKind {
        CheckKind::IsDirectory
    }
}

pub struct ParentDirectoryExists;

impl ValueCheck for ParentDirectoryExists {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let parent = match Path::new(value).parent() {
            // a bare file name lives in the current directory
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => return Err(format!("\"{}\" has no parent directory", value)),
        };
        if parent.is_dir() {
            Ok(())
        } else {
            Err(format!(
                "parent directory \"{}\" does not exist",
                parent.display()
            ))
        }
    }

    fn describe(&self) -> String {
        "parent directory exists".to_string()
    }

    fn kind(&self) -> CheckKind {
        CheckKind::ParentDirectoryExists
    }
}

/// Relation between a measured quantity and the configured reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

impl Comparison {
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Greater => ordering == Ordering::Greater,
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Comparison::Less => "<",
                Comparison::LessOrEqual => "<=",
                Comparison::Equal => "==",
                Comparison::GreaterOrEqual => ">=",
                Comparison::Greater => ">",
            }
        )
    }
}

pub struct FileSize {
    comparison: Comparison,
    bytes: u64,
}

impl ValueCheck for FileSize {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let metadata = fs::metadata(value)
            .map_err(|e| format!("cannot read size of \"{}\": {}", value, e))?;
        if self.comparison.holds(metadata.len().cmp(&self.bytes)) {
            Ok(())
        } else {
            Err(format!(
                "size of \"{}\" is {} bytes, expected {} {}",
                value,
                metadata.len(),
                self.comparison,
                self.bytes
            ))
        }
    }

    fn describe(&self) -> String {
        format!("file size {} {} bytes", self.comparison, self.bytes)
    }

    fn kind(&self) -> CheckKind {
        CheckKind::FileSize
    }
}

/// Compares the time since last modification against `age`.
pub struct FileAge {
    comparison: Comparison,
    age: Duration,
}

impl ValueCheck for FileAge {
    fn check_value(&self, value: &str) -> Result<(), String> {
        let modified = fs::metadata(value)
            .and_then(|x| x.modified())
            .map_err(|e| format!("cannot read modification time of \"{}\": {}", value, e))?;
        // files modified "in the future" count as brand new
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if self.comparison.holds(age.cmp(&self.age)) {
            Ok(())
        } else {
            Err(format!(
                "age of \"{}\" is {}s, expected {} {}s",
                value,
                age.as_secs(),
                self.comparison,
                self.age.as_secs()
            ))
        }
    }

    fn describe(&self) -> String {
        format!("file age {} {}s", self.comparison, self.age.as_secs())
    }

    fn kind(&self) -> CheckKind {
        CheckKind::FileAge
    }
}

/// User supplied predicate. Any number of these may sit on one argument.
pub struct Predicate {
    description: String,
    predicate: Box<dyn Fn(&str) -> bool>,
}

impl ValueCheck for Predicate {
    fn check_value(&self, value: &str) -> Result<(), String> {
        if (self.predicate)(value) {
            Ok(())
        } else {
            Err(format!("value \"{}\" does not satisfy {}", value, self.description))
        }
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Predicate
    }

    fn combinable_with(&self, _other: &dyn ValueCheck) -> bool {
        true
    }
}

pub fn lower<T: FromStr + PartialOrd + Display + 'static>(min: T) -> Box<dyn ValueCheck> {
    Box::new(LowerBound { min })
}

pub fn upper<T: FromStr + PartialOrd + Display + 'static>(max: T) -> Box<dyn ValueCheck> {
    Box::new(UpperBound { max })
}

pub fn range<T: FromStr + PartialOrd + Display + 'static>(
    min: T,
    max: T,
) -> Result<Box<dyn ValueCheck>, ArgumentError> {
    if min > max {
        return Err(ArgumentError::InvalidCheckRange(
            min.to_string(),
            max.to_string(),
        ));
    }
    Ok(Box::new(Range { min, max }))
}

pub fn pattern(regex: &str) -> Result<Box<dyn ValueCheck>, ArgumentError> {
    let regex = Regex::new(regex)
        .map_err(|e| ArgumentError::InvalidPattern(regex.to_string(), e.to_string()))?;
    Ok(Box::new(Pattern { regex }))
}

pub fn values<T: ToString>(choices: &[T]) -> Result<Box<dyn ValueCheck>, ArgumentError> {
    Ok(Box::new(Values::new(
        choices.iter().map(|x| x.to_string()).collect(),
        false,
    )?))
}

pub fn values_ignore_case<T: ToString>(choices: &[T]) -> Result<Box<dyn ValueCheck>, ArgumentError> {
    Ok(Box::new(Values::new(
        choices.iter().map(|x| x.to_string()).collect(),
        true,
    )?))
}

pub fn min_length(length: usize) -> Box<dyn ValueCheck> {
    Box::new(MinLength(length))
}

pub fn max_length(length: usize) -> Box<dyn ValueCheck> {
    Box::new(MaxLength(length))
}

pub fn absolute_path() -> Box<dyn ValueCheck> {
    Box::new(AbsolutePath)
}

pub fn is_file() -> Box<dyn ValueCheck> {
    Box::new(IsFile)
}

pub fn is_directory() -> Box<dyn ValueCheck> {
    Box::new(IsDirectory)
}

pub fn parent_directory_exists() -> Box<dyn ValueCheck> {
    Box::new(ParentDirectoryExists)
}

pub fn file_size(comparison: Comparison, bytes: u64) -> Box<dyn ValueCheck> {
    Box::new(FileSize { comparison, bytes })
}

pub fn file_age(comparison: Comparison, age: Duration) -> Box<dyn ValueCheck> {
    Box::new(FileAge { comparison, age })
}

pub fn predicate<F>(description: &str, predicate: F) -> Box<dyn ValueCheck>
where
    F: Fn(&str) -> bool + 'static,
{
    Box::new(Predicate {
        description: description.to_string(),
        predicate: Box::new(predicate),
    })
}

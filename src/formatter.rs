//! Formatters normalize a raw value before it is checked and converted.

pub trait ValueFormatter {
    fn format_value(&self, value: String) -> String;

    fn describe(&self) -> String;
}

pub struct Lowercase;

impl ValueFormatter for Lowercase {
    fn format_value(&self, value: String) -> String {
        value.to_lowercase()
    }

    fn describe(&self) -> String {
        "lowercase".to_string()
    }
}

pub struct Uppercase;

impl ValueFormatter for Uppercase {
    fn format_value(&self, value: String) -> String {
        value.to_uppercase()
    }

    fn describe(&self) -> String {
        "uppercase".to_string()
    }
}

pub struct Trim;

impl ValueFormatter for Trim {
    fn format_value(&self, value: String) -> String {
        value.trim().to_string()
    }

    fn describe(&self) -> String {
        "trim".to_string()
    }
}

pub struct Custom {
    description: String,
    formatter: Box<dyn Fn(String) -> String>,
}

impl ValueFormatter for Custom {
    fn format_value(&self, value: String) -> String {
        (self.formatter)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub fn lowercase() -> Box<dyn ValueFormatter> {
    Box::new(Lowercase)
}

pub fn uppercase() -> Box<dyn ValueFormatter> {
    Box::new(Uppercase)
}

pub fn trim() -> Box<dyn ValueFormatter> {
    Box::new(Trim)
}

pub fn custom<F>(description: &str, formatter: F) -> Box<dyn ValueFormatter>
where
    F: Fn(String) -> String + 'static,
{
    Box::new(Custom {
        description: description.to_string(),
        formatter: Box::new(formatter),
    })
}

/// Formatters of one argument, each bound to every value or to the value at
/// one position (0-based count of values the argument received).
#[derive(Default)]
pub(crate) struct FormatterList {
    formatters: Vec<(Option<usize>, Box<dyn ValueFormatter>)>,
}

impl FormatterList {
    pub fn push(&mut self, position: Option<usize>, formatter: Box<dyn ValueFormatter>) {
        self.formatters.push((position, formatter));
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    pub fn apply(&self, position: usize, value: String) -> String {
        self.formatters
            .iter()
            .filter(|(at, _)| at.map_or(true, |x| x == position))
            .fold(value, |value, (_, formatter)| formatter.format_value(value))
    }

    pub fn describe(&self) -> Vec<String> {
        self.formatters
            .iter()
            .map(|(at, formatter)| match at {
                Some(position) => format!("{} (value {})", formatter.describe(), position),
                None => formatter.describe(),
            })
            .collect()
    }
}

use crate::argument_error::ArgumentError;

const DEFAULT_INVERSION_MARKER: char = '!';
const DEFAULT_KEY_VALUE_SEPARATOR: char = '=';
const DEFAULT_END_OF_OPTIONS: &str = "--";

/// How a handler reads its token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    inversion_marker: char,
    key_value_separator: char,
    allow_abbrev: bool,
    allow_combined_short: bool,
    end_of_options: Option<String>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        HandlerSettings {
            inversion_marker: DEFAULT_INVERSION_MARKER,
            key_value_separator: DEFAULT_KEY_VALUE_SEPARATOR,
            allow_abbrev: false,
            allow_combined_short: true,
            end_of_options: Some(DEFAULT_END_OF_OPTIONS.to_string()),
        }
    }
}

impl HandlerSettings {
    pub fn builder() -> HandlerSettingsBuilder {
        HandlerSettingsBuilder::default()
    }

    pub fn inversion_marker(&self) -> char {
        self.inversion_marker
    }

    pub fn key_value_separator(&self) -> char {
        self.key_value_separator
    }

    pub fn allow_abbrev(&self) -> bool {
        self.allow_abbrev
    }

    pub fn allow_combined_short(&self) -> bool {
        self.allow_combined_short
    }

    pub fn end_of_options(&self) -> Option<&str> {
        self.end_of_options.as_deref()
    }
}

/// Every setting left unset keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandlerSettingsBuilder {
    inversion_marker: Option<char>,
    key_value_separator: Option<char>,
    allow_abbrev: Option<bool>,
    allow_combined_short: Option<bool>,
    end_of_options: Option<Option<String>>,
}

impl HandlerSettingsBuilder {
    pub fn with_inversion_marker(&self, marker: char) -> Self {
        let mut new = self.clone();
        new.inversion_marker = Some(marker);
        new
    }

    pub fn with_key_value_separator(&self, separator: char) -> Self {
        let mut new = self.clone();
        new.key_value_separator = Some(separator);
        new
    }

    pub fn with_allow_abbrev(&self, allow: bool) -> Self {
        let mut new = self.clone();
        new.allow_abbrev = Some(allow);
        new
    }

    pub fn with_allow_combined_short(&self, allow: bool) -> Self {
        let mut new = self.clone();
        new.allow_combined_short = Some(allow);
        new
    }

    /// `None` disables the end-of-options marker.
    pub fn with_end_of_options(&self, marker: Option<&str>) -> Self {
        let mut new = self.clone();
        new.end_of_options = Some(marker.map(|x| x.to_string()));
        new
    }

    pub fn build(&self) -> Result<HandlerSettings, ArgumentError> {
        let defaults = HandlerSettings::default();
        let inversion_marker = self.inversion_marker.unwrap_or(defaults.inversion_marker);
        if inversion_marker == '-' || inversion_marker.is_alphanumeric() || inversion_marker.is_whitespace()
        {
            return Err(ArgumentError::IllegalInversionMarker(inversion_marker));
        }

        Ok(HandlerSettings {
            inversion_marker,
            key_value_separator: self
                .key_value_separator
                .unwrap_or(defaults.key_value_separator),
            allow_abbrev: self.allow_abbrev.unwrap_or(defaults.allow_abbrev),
            allow_combined_short: self
                .allow_combined_short
                .unwrap_or(defaults.allow_combined_short),
            end_of_options: self
                .end_of_options
                .clone()
                .unwrap_or(defaults.end_of_options),
        })
    }
}

#[cfg(test)]
mod test {
    use super::HandlerSettings;
    use crate::argument_error::ArgumentError;

    #[test]
    fn defaults() {
        let settings = HandlerSettings::builder().build().unwrap();
        assert_eq!(settings, HandlerSettings::default());
        assert_eq!(settings.inversion_marker(), '!');
        assert_eq!(settings.key_value_separator(), '=');
        assert!(!settings.allow_abbrev());
        assert!(settings.allow_combined_short());
        assert_eq!(settings.end_of_options(), Some("--"));
    }

    #[test]
    fn overrides() {
        let settings = HandlerSettings::builder()
            .with_inversion_marker('^')
            .with_key_value_separator(':')
            .with_allow_abbrev(true)
            .with_end_of_options(None)
            .build()
            .unwrap();
        assert_eq!(settings.inversion_marker(), '^');
        assert_eq!(settings.key_value_separator(), ':');
        assert!(settings.allow_abbrev());
        assert_eq!(settings.end_of_options(), None);
    }

    #[test]
    fn illegal_inversion_marker() {
        assert_eq!(
            HandlerSettings::builder().with_inversion_marker('-').build(),
            Err(ArgumentError::IllegalInversionMarker('-'))
        );
        assert_eq!(
            HandlerSettings::builder().with_inversion_marker('n').build(),
            Err(ArgumentError::IllegalInversionMarker('n'))
        );
    }
}

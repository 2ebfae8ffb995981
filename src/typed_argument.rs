//! One registered argument: its key, its destination and everything that
//! decides whether a raw value may reach that destination.

use std::fmt::Display;

use log::trace;

use crate::{
    argument_error::ArgumentError,
    argument_key::ArgumentKey,
    cardinality::{Cardinality, CardinalityCounter},
    checks::ValueCheck,
    destination::{Destination, Shape},
    formatter::{FormatterList, ValueFormatter},
    parse_result::ParserError,
    string_vec_to_string,
    value_mode::ValueMode,
};

pub struct TypedArgument<'a> {
    key: ArgumentKey,
    positional: bool,
    description: String,
    destination: Destination<'a>,
    value_mode: ValueMode,
    cardinality: CardinalityCounter,
    checks: Vec<Box<dyn ValueCheck>>,
    formatters: FormatterList,
    mandatory: bool,
    hidden: bool,
    deprecated: bool,
    replaced_by: Option<String>,
    allows_inversion: bool,
    print_default: bool,
    implicit_value: Option<String>,
    list_separator: Option<char>,
    multiple_values: bool,
    clear_before_assign: bool,
    cleared: bool,
    unique_data: bool,
    sorted_data: bool,
    requires: Vec<String>,
    excludes: Vec<String>,
    occurrences: usize,
    position: usize,
}

impl<'a> Display for TypedArgument<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = if self.positional {
            self.name()
        } else {
            self.key.to_string()
        };
        if self.value_mode.takes_value() {
            builder += format!(" <{}>", self.destination.value_tag()).as_str();
        }
        if !self.description.is_empty() {
            builder += format!(": {}", self.description).as_str();
        }

        let mut details = Vec::new();
        if self.mandatory {
            details.push("mandatory".to_string());
        }
        if let Some(replacement) = self.replaced_by.as_ref() {
            details.push(format!("deprecated, use {}", replacement));
        } else if self.deprecated {
            details.push("deprecated".to_string());
        }
        if self.destination.shape().is_multi_valued() && self.value_mode.takes_value() {
            details.push(format!("values: {}", self.cardinality.policy().describe()));
        }
        let formatters = self.formatters.describe();
        if !formatters.is_empty() {
            details.push(format!("formatted: {}", formatters.join(", ")));
        }
        for check in self.checks.iter() {
            details.push(check.describe());
        }
        if self.print_default {
            details.push(format!("default: {}", self.destination.render()));
        }
        if !details.is_empty() {
            builder += format!(" ({})", string_vec_to_string(&details, false)).as_str();
        }
        write!(f, "{}", builder)
    }
}

impl<'a> TypedArgument<'a> {
    pub(crate) fn new(
        key: ArgumentKey,
        positional: bool,
        destination: Destination<'a>,
        description: &str,
    ) -> TypedArgument<'a> {
        let shape = destination.shape();
        let value_mode = if shape.takes_value() {
            ValueMode::Required
        } else {
            ValueMode::None
        };
        let cardinality = match shape {
            Shape::Flag | Shape::Scalar | Shape::Optional => Cardinality::max(1),
            _ => Cardinality::unbounded(),
        };

        TypedArgument {
            key,
            positional,
            description: description.to_string(),
            destination,
            value_mode,
            cardinality: CardinalityCounter::new(cardinality),
            checks: Vec::new(),
            formatters: FormatterList::default(),
            mandatory: false,
            hidden: false,
            deprecated: false,
            replaced_by: None,
            allows_inversion: false,
            print_default: false,
            implicit_value: None,
            list_separator: None,
            multiple_values: false,
            clear_before_assign: false,
            cleared: false,
            unique_data: false,
            sorted_data: false,
            requires: Vec::new(),
            excludes: Vec::new(),
            occurrences: 0,
            position: 0,
        }
    }

    pub fn key(&self) -> &ArgumentKey {
        &self.key
    }

    /// Name used in messages: the bare name for positionals, the prefixed
    /// preferred name otherwise.
    pub fn name(&self) -> String {
        match (self.positional, self.key.long_name()) {
            (true, Some(name)) => name.to_string(),
            _ => self.key.display_name(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn value_mode(&self) -> ValueMode {
        self.value_mode
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality.policy()
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn allows_inversion(&self) -> bool {
        self.allows_inversion
    }

    pub fn destination(&self) -> &Destination<'a> {
        &self.destination
    }

    pub fn with_cardinality(&mut self, cardinality: Cardinality) -> Result<&mut Self, ArgumentError> {
        cardinality.validate(&self.name())?;
        self.cardinality = CardinalityCounter::new(cardinality);
        Ok(self)
    }

    pub fn with_value_mode(&mut self, mode: ValueMode) -> Result<&mut Self, ArgumentError> {
        let shape = self.destination.shape();
        let supported = match (shape, mode) {
            (Shape::Counter, ValueMode::None) => true,
            (Shape::Flag, ValueMode::None | ValueMode::Optional) => true,
            (Shape::Container(_), ValueMode::Passthrough) => true,
            (Shape::Flag | Shape::Counter, _) | (_, ValueMode::None | ValueMode::Passthrough) => {
                false
            }
            _ => true,
        };
        if !supported {
            return Err(ArgumentError::UnsupportedValueMode(
                self.name(),
                mode.to_string(),
            ));
        }
        if mode == ValueMode::None && !self.checks.is_empty() {
            return Err(ArgumentError::NoValueArgument(self.name(), "checks"));
        }
        if mode == ValueMode::None && !self.formatters.is_empty() {
            return Err(ArgumentError::NoValueArgument(self.name(), "formatters"));
        }
        self.value_mode = mode;
        Ok(self)
    }

    pub fn add_check(&mut self, check: Box<dyn ValueCheck>) -> Result<&mut Self, ArgumentError> {
        if !self.value_mode.takes_value() {
            return Err(ArgumentError::NoValueArgument(self.name(), "checks"));
        }
        if let Some(existing) = self
            .checks
            .iter()
            .find(|existing| !existing.combinable_with(check.as_ref()))
        {
            return Err(ArgumentError::DuplicateCheck(
                self.name(),
                format!("{} / {}", existing.describe(), check.describe()),
            ));
        }
        self.checks.push(check);
        Ok(self)
    }

    pub fn add_formatter(
        &mut self,
        formatter: Box<dyn ValueFormatter>,
    ) -> Result<&mut Self, ArgumentError> {
        if !self.value_mode.takes_value() {
            return Err(ArgumentError::NoValueArgument(self.name(), "formatters"));
        }
        self.formatters.push(None, formatter);
        Ok(self)
    }

    /// Formatter for the value at `position` only, counted from 0 in the order
    /// values arrive.
    pub fn add_position_formatter(
        &mut self,
        position: usize,
        formatter: Box<dyn ValueFormatter>,
    ) -> Result<&mut Self, ArgumentError> {
        if !self.value_mode.takes_value() {
            return Err(ArgumentError::NoValueArgument(self.name(), "formatters"));
        }
        let allowed = matches!(self.destination.shape(), Shape::Container(_))
            && self.destination.capabilities().allows_position_format;
        if !allowed {
            return Err(ArgumentError::PositionFormatNotAllowed(self.name()));
        }
        self.formatters.push(Some(position), formatter);
        Ok(self)
    }

    pub fn with_mandatory(&mut self) -> Result<&mut Self, ArgumentError> {
        if self.deprecated {
            return Err(ArgumentError::MandatoryDeprecated(self.name()));
        }
        self.mandatory = true;
        Ok(self)
    }

    /// Positional arguments are mandatory unless made optional.
    pub fn with_optional(&mut self) -> &mut Self {
        self.mandatory = false;
        self
    }

    pub fn with_deprecated(&mut self) -> Result<&mut Self, ArgumentError> {
        if self.mandatory {
            return Err(ArgumentError::MandatoryDeprecated(self.name()));
        }
        self.deprecated = true;
        Ok(self)
    }

    /// Deprecates the argument, naming its successor in the error message.
    pub fn with_replaced_by(&mut self, replacement: &str) -> Result<&mut Self, ArgumentError> {
        self.with_deprecated()?;
        self.replaced_by = Some(replacement.to_string());
        Ok(self)
    }

    pub fn with_hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn with_print_default(&mut self) -> &mut Self {
        self.print_default = true;
        self
    }

    pub fn with_inversion(&mut self) -> Result<&mut Self, ArgumentError> {
        if self.destination.shape() != Shape::Flag {
            return Err(ArgumentError::InversionNotSupported(self.name()));
        }
        self.allows_inversion = true;
        Ok(self)
    }

    /// Value used in optional value mode when no value follows the key.
    pub fn with_implicit_value<T: ToString>(&mut self, value: T) -> Result<&mut Self, ArgumentError> {
        if !self.destination.shape().takes_value() && self.destination.shape() != Shape::Flag {
            return Err(ArgumentError::NoValueArgument(self.name(), "an implicit value"));
        }
        self.implicit_value = Some(value.to_string());
        Ok(self)
    }

    pub fn with_list_separator(&mut self, separator: char) -> Result<&mut Self, ArgumentError> {
        if !self.destination.shape().takes_value() {
            return Err(ArgumentError::NoValueArgument(self.name(), "a list separator"));
        }
        self.list_separator = Some(separator);
        Ok(self)
    }

    /// Lets the argument take every following token that is not a key.
    pub fn with_multiple_values(&mut self) -> Result<&mut Self, ArgumentError> {
        self.require_shape("multiple values", |shape| {
            matches!(shape, Shape::Container(_) | Shape::KeyValue(_))
        })?;
        self.multiple_values = true;
        Ok(self)
    }

    /// The first parsed value replaces whatever the destination held before.
    pub fn with_clear_before_assign(&mut self) -> Result<&mut Self, ArgumentError> {
        self.require_shape("clearing", |shape| {
            matches!(shape, Shape::Container(_) | Shape::KeyValue(_))
        })?;
        self.clear_before_assign = true;
        Ok(self)
    }

    /// Values already in the destination are skipped.
    pub fn with_unique_data(&mut self) -> Result<&mut Self, ArgumentError> {
        let has_iterators = self.destination.capabilities().has_iterators;
        self.require_shape("unique data", |shape| {
            has_iterators && matches!(shape, Shape::Container(_) | Shape::KeyValue(_))
        })?;
        self.unique_data = true;
        Ok(self)
    }

    /// Sorts the destination once parsing ended.
    pub fn with_sorted_data(&mut self) -> Result<&mut Self, ArgumentError> {
        let is_sortable = self.destination.capabilities().is_sortable;
        self.require_shape("sorting", |_| is_sortable)?;
        self.sorted_data = true;
        Ok(self)
    }

    /// Arguments that must be used as well whenever this one is used.
    pub fn requires(&mut self, names: &[&str]) -> &mut Self {
        self.requires.extend(names.iter().map(|x| x.to_string()));
        self
    }

    /// Arguments that cannot be used together with this one.
    pub fn excludes(&mut self, names: &[&str]) -> &mut Self {
        self.excludes.extend(names.iter().map(|x| x.to_string()));
        self
    }

    fn require_shape<F>(&self, operation: &'static str, supported: F) -> Result<(), ArgumentError>
    where
        F: Fn(Shape) -> bool,
    {
        let shape = self.destination.shape();
        if supported(shape) {
            Ok(())
        } else {
            Err(ArgumentError::UnsupportedContainerOperation(
                self.name(),
                shape.to_string(),
                operation,
            ))
        }
    }

    pub(crate) fn required_names(&self) -> &[String] {
        &self.requires
    }

    pub(crate) fn excluded_names(&self) -> &[String] {
        &self.excludes
    }

    pub(crate) fn implicit_value(&self) -> Option<&str> {
        self.implicit_value.as_deref()
    }

    pub(crate) fn takes_multiple_values(&self) -> bool {
        self.multiple_values
    }

    /// Checks that only make sense once every setting is known.
    pub(crate) fn validate(&self) -> Result<(), ArgumentError> {
        let shape = self.destination.shape();
        if self.value_mode == ValueMode::Optional
            && shape != Shape::Flag
            && self.implicit_value.is_none()
        {
            return Err(ArgumentError::MissingImplicitValue(self.name()));
        }
        if self.positional && !self.value_mode.takes_value() {
            return Err(ArgumentError::UnsupportedValueMode(
                self.name(),
                self.value_mode.to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn was_seen(&self) -> bool {
        self.occurrences > 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.cardinality.is_full()
    }

    /// Counts one use of the argument's key.
    pub(crate) fn mark_occurrence(&mut self) {
        self.occurrences += 1;
    }

    /// Splits one raw token by the list separator, if any is set.
    pub(crate) fn split_values(&self, raw: &str) -> Vec<String> {
        match self.list_separator {
            Some(separator) => raw.split(separator).map(|x| x.to_string()).collect(),
            None => vec![raw.to_string()],
        }
    }

    /// Runs one raw value through the pipeline up to the destination.
    /// Constraint activation is left to the handler.
    pub(crate) fn assign_value(
        &mut self,
        raw: Option<&str>,
        inverted: bool,
        count_value: bool,
        key_value_separator: char,
    ) -> Result<(), ParserError> {
        let name = self.name();
        if self.deprecated {
            return Err(ParserError::Deprecated(name, self.replaced_by.clone()));
        }
        if count_value {
            self.cardinality.got_value(&name)?;
        }
        if inverted && !self.allows_inversion {
            return Err(ParserError::InversionNotSupported(name));
        }

        let (key, value) = match raw {
            None => (None, None),
            Some(raw) => {
                let (key, value) = self.split_key_value(&name, raw, key_value_separator)?;
                let value = self.formatters.apply(self.position, value.to_string());
                for check in self.checks.iter() {
                    check
                        .check_value(&value)
                        .map_err(|reason| ParserError::CheckFailed(name.clone(), value.clone(), reason))?;
                }
                (key, Some(value))
            }
        };
        self.position += 1;

        // the first value replaces the defaults, so it has nothing to collide with
        let clear_first = self.clear_before_assign && !self.cleared;
        if self.unique_data && !clear_first {
            if let Some(value) = value.as_deref() {
                if self.destination.contains(&name, key, value)? {
                    trace!("argument {} skips duplicate value \"{}\"", name, value);
                    return Ok(());
                }
            }
        }

        if clear_first {
            self.destination
                .replace(&name, key, value.as_deref(), inverted)?;
            self.cleared = true;
        } else {
            self.destination
                .assign(&name, key, value.as_deref(), inverted)?;
        }
        trace!(
            "argument {} now holds {}",
            name,
            self.destination.render()
        );
        Ok(())
    }

    fn split_key_value<'r>(
        &self,
        name: &str,
        raw: &'r str,
        separator: char,
    ) -> Result<(Option<&'r str>, &'r str), ParserError> {
        if !matches!(self.destination.shape(), Shape::KeyValue(_)) {
            return Ok((None, raw));
        }
        match raw.split_once(separator) {
            Some((key, value)) => Ok((Some(key), value)),
            None => Err(ParserError::ConversionFailed(
                name.to_string(),
                raw.to_string(),
                self.destination.value_tag().to_string(),
            )),
        }
    }

    /// End-of-parse work for this argument. Arguments never used skip the
    /// cardinality check, presence is a matter of `mandatory` and constraints.
    pub(crate) fn finalize(&mut self) -> Result<(), ParserError> {
        if !self.was_seen() {
            return Ok(());
        }
        self.cardinality.check(&self.name())?;
        if self.sorted_data {
            self.destination.sort()?;
        }
        Ok(())
    }
}

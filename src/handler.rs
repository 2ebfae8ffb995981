use std::fmt::Display;

use log::{debug, trace, warn};

use crate::{
    argument_error::ArgumentError,
    argument_key::ArgumentKey,
    constraint::{Constraint, ConstraintEngine, ConstraintKind},
    destination::Destination,
    parse_result::{ArgumentFailure, ParseReport, ParserError},
    settings::HandlerSettings,
    string_vec_to_string,
    token::{is_negative_number, Token, TokenCursor},
    typed_argument::TypedArgument,
    value_mode::ValueMode,
};

/// Registry of the arguments of one namespace.
///
/// Arguments are registered with [`Handler::add_argument`], which hands back
/// the new argument for further configuration. The first call to
/// [`Handler::parse_args`] closes registration.
pub struct Handler<'a> {
    key: Option<ArgumentKey>,
    description: String,
    settings: HandlerSettings,
    arguments: Vec<TypedArgument<'a>>,
    positionals: Vec<usize>,
    next_positional: usize,
    groups: Vec<Handler<'a>>,
    active_group: Option<usize>,
    used: bool,
    constraints: ConstraintEngine,
    closed: bool,
}

impl<'a> Default for Handler<'a> {
    fn default() -> Self {
        Handler::new(HandlerSettings::default())
    }
}

impl<'a> Display for Handler<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_usage(""))
    }
}

impl<'a> Handler<'a> {
    pub fn new(settings: HandlerSettings) -> Handler<'a> {
        Handler {
            key: None,
            description: String::new(),
            settings,
            arguments: Vec::new(),
            positionals: Vec::new(),
            next_positional: 0,
            groups: Vec::new(),
            active_group: None,
            used: false,
            constraints: ConstraintEngine::default(),
            closed: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    pub fn arguments(&self) -> &[TypedArgument<'a>] {
        &self.arguments
    }

    /// Argument by any of its names, prefix characters optional.
    pub fn argument(&self, name: &str) -> Option<&TypedArgument<'a>> {
        self.lookup(name).map(|idx| &self.arguments[idx])
    }

    pub fn group(&self, name: &str) -> Option<&Handler<'a>> {
        let name = name.trim_start_matches('-');
        self.groups.iter().find(|group| {
            group
                .key
                .as_ref()
                .map_or(false, |key| key.matches_name(name))
        })
    }

    fn check_registration(&self, key: &ArgumentKey) -> Result<(), ArgumentError> {
        if self.closed {
            return Err(ArgumentError::RegistrationClosed);
        }
        let existing_keys = self
            .arguments
            .iter()
            .map(TypedArgument::key)
            .chain(self.groups.iter().filter_map(|group| group.key.as_ref()));
        for existing in existing_keys {
            let overlap = existing.overlap(key);
            if !overlap.is_empty() {
                return Err(ArgumentError::DuplicateArgumentName(string_vec_to_string(
                    &overlap, true,
                )));
            }
        }
        Ok(())
    }

    pub fn add_argument(
        &mut self,
        spec: &str,
        destination: Destination<'a>,
        description: &str,
    ) -> Result<&mut TypedArgument<'a>, ArgumentError> {
        let key = ArgumentKey::new(spec)?;
        self.check_registration(&key)?;
        debug!("adding argument {}", key);
        let idx = self.arguments.len();
        self.arguments
            .push(TypedArgument::new(key, false, destination, description));
        Ok(&mut self.arguments[idx])
    }

    /// Values not following a key fill positional arguments in the order
    /// they were added. Positional arguments are mandatory by default.
    pub fn add_positional(
        &mut self,
        name: &str,
        destination: Destination<'a>,
        description: &str,
    ) -> Result<&mut TypedArgument<'a>, ArgumentError> {
        let key = ArgumentKey::positional(name)?;
        self.check_registration(&key)?;
        debug!("adding positional argument {}", name);
        let idx = self.arguments.len();
        self.arguments
            .push(TypedArgument::new(key, true, destination, description));
        self.positionals.push(idx);
        let argument = &mut self.arguments[idx];
        argument.with_mandatory()?;
        Ok(argument)
    }

    /// Sub-handler whose arguments are available once its key was used.
    pub fn add_argument_group(
        &mut self,
        spec: &str,
        description: &str,
    ) -> Result<&mut Handler<'a>, ArgumentError> {
        let key = ArgumentKey::new(spec)?;
        self.check_registration(&key)?;
        debug!("adding argument group {}", key);
        let mut group = Handler::new(self.settings.clone()).with_description(description);
        group.key = Some(key);
        let idx = self.groups.len();
        self.groups.push(group);
        Ok(&mut self.groups[idx])
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<&mut Self, ArgumentError> {
        if self.closed {
            return Err(ArgumentError::RegistrationClosed);
        }
        self.constraints.add(constraint);
        Ok(self)
    }

    /// The argument must be used.
    pub fn required(&mut self, name: &str) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::Required, &[name])?)
    }

    /// At most one of the arguments may be used.
    pub fn excludes(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::Excludes, names)?)
    }

    pub fn all_of(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::AllOf, names)?)
    }

    pub fn one_of(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::OneOf, names)?)
    }

    pub fn any_of(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::AnyOf, names)?)
    }

    pub fn differ(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::Differ, names)?)
    }

    pub fn disjoint(&mut self, names: &[&str]) -> Result<&mut Self, ArgumentError> {
        self.add_constraint(Constraint::new(ConstraintKind::Disjoint, names)?)
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        let name = name.trim_start_matches('-');
        self.arguments
            .iter()
            .position(|argument| argument.key().matches_name(name))
    }

    /// Ends registration: validates every argument and resolves constraints.
    fn close(&mut self) -> Result<(), ArgumentError> {
        if self.closed {
            return Ok(());
        }
        for argument in self.arguments.iter() {
            argument.validate()?;
        }

        let mut declared = Vec::new();
        for argument in self.arguments.iter() {
            if !argument.required_names().is_empty() {
                declared.push(Constraint::from_origin(
                    ConstraintKind::Required,
                    argument.key(),
                    argument.required_names(),
                ));
            }
            if !argument.excluded_names().is_empty() {
                declared.push(Constraint::from_origin(
                    ConstraintKind::Excludes,
                    argument.key(),
                    argument.excluded_names(),
                ));
            }
        }
        for constraint in declared {
            self.constraints.add(constraint);
        }

        let arguments = &self.arguments;
        self.constraints.resolve(arguments, |name| {
            let name = name.trim_start_matches('-');
            arguments
                .iter()
                .position(|argument| argument.key().matches_name(name))
        })?;

        for group in self.groups.iter_mut() {
            group.close()?;
        }
        self.closed = true;
        debug!(
            "registration closed with {} arguments and {} groups",
            self.arguments.len(),
            self.groups.len()
        );
        Ok(())
    }

    /// Parses `tokens`, the program arguments without the program name.
    ///
    /// A failure while processing a token stops the parse and is reported
    /// alone. Otherwise every unmet end-of-parse condition is reported.
    pub fn parse_args<I, S>(&mut self, tokens: I) -> Result<(), ParseReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.close()
            .map_err(|error| ParseReport::single(None, ParserError::InvalidRegistration(error)))?;

        let mut cursor = TokenCursor::new(tokens);
        debug!("parsing {} tokens", cursor.len());
        while let Some(raw) = cursor.peek().map(str::to_string) {
            let consumed = self
                .step(&mut cursor)
                .map_err(|failure| ParseReport::new(vec![failure]))?;
            if !consumed {
                warn!("no argument for token \"{}\"", raw);
                return Err(ParseReport::single(
                    None,
                    ParserError::UnknownArgument(raw),
                ));
            }
        }

        let report = self.finish();
        if report.is_empty() {
            debug!("parse succeeded");
            Ok(())
        } else {
            warn!("parse failed:\n{}", report);
            Err(report)
        }
    }

    /// Processes the next token and the values that belong to it. `false`
    /// when neither this handler nor its active group knows the token.
    fn step(&mut self, cursor: &mut TokenCursor) -> Result<bool, ArgumentFailure> {
        if let Some(group) = self.active_group {
            if self.groups[group].step(cursor)? {
                return Ok(true);
            }
            trace!("leaving argument group {}", group);
            self.active_group = None;
        }

        let raw = match cursor.peek() {
            Some(raw) => raw.to_string(),
            None => return Ok(false),
        };
        let token = if cursor.options_ended() {
            Token::Value(&raw)
        } else {
            Token::classify(&raw, &self.settings)
        };

        match token {
            Token::EndOfOptions => {
                cursor.next();
                cursor.end_options();
                Ok(true)
            }
            Token::Long {
                name,
                value,
                inverted,
            } => match self.resolve_long(name)? {
                Some(Resolved::Argument(idx)) => {
                    cursor.next();
                    self.process_argument(idx, value.map(str::to_string), inverted, cursor)?;
                    Ok(true)
                }
                Some(Resolved::Group(idx)) => {
                    cursor.next();
                    self.enter_group(idx);
                    Ok(true)
                }
                None => Ok(false),
            },
            Token::Short { chars, inverted } => {
                if is_negative_number(&raw) && !self.has_short(chars) {
                    return self.process_positional(&raw, cursor);
                }
                self.process_short(chars, inverted, cursor)
            }
            Token::Value(value) => self.process_positional(value, cursor),
        }
    }

    fn enter_group(&mut self, idx: usize) {
        trace!("entering argument group {}", idx);
        self.groups[idx].used = true;
        self.active_group = Some(idx);
    }

    fn has_short(&self, chars: &str) -> bool {
        chars.chars().next().map_or(false, |c| {
            self.arguments.iter().any(|x| x.key().matches_short(c))
                || self
                    .groups
                    .iter()
                    .any(|x| x.key.as_ref().map_or(false, |key| key.matches_short(c)))
        })
    }

    fn resolve_short(&self, c: char) -> Option<Resolved> {
        self.arguments
            .iter()
            .position(|x| !x.is_positional() && x.key().matches_short(c))
            .map(Resolved::Argument)
            .or_else(|| {
                self.groups
                    .iter()
                    .position(|x| x.key.as_ref().map_or(false, |key| key.matches_short(c)))
                    .map(Resolved::Group)
            })
    }

    fn resolve_long(&self, name: &str) -> Result<Option<Resolved>, ArgumentFailure> {
        let exact = self
            .arguments
            .iter()
            .position(|x| !x.is_positional() && x.key().matches_long(name))
            .map(Resolved::Argument)
            .or_else(|| {
                self.groups
                    .iter()
                    .position(|x| x.key.as_ref().map_or(false, |key| key.matches_long(name)))
                    .map(Resolved::Group)
            });
        if exact.is_some() || !self.settings.allow_abbrev() {
            return Ok(exact);
        }

        let mut candidates: Vec<(String, Resolved)> = Vec::new();
        for (idx, argument) in self.arguments.iter().enumerate() {
            if let (false, Some(long)) = (argument.is_positional(), argument.key().long_name()) {
                if long.starts_with(name) {
                    candidates.push((argument.key().display_name(), Resolved::Argument(idx)));
                }
            }
        }
        for (idx, group) in self.groups.iter().enumerate() {
            if let Some(key) = group.key.as_ref() {
                if key.long_name().map_or(false, |long| long.starts_with(name)) {
                    candidates.push((key.display_name(), Resolved::Group(idx)));
                }
            }
        }

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop().map(|(_, resolved)| resolved)),
            _ => {
                let mut names: Vec<String> = candidates.into_iter().map(|(x, _)| x).collect();
                names.sort();
                Err(ArgumentFailure::new(
                    None,
                    ParserError::AmbiguousArgument(
                        name.to_string(),
                        string_vec_to_string(&names, true),
                    ),
                ))
            }
        }
    }

    fn process_short(
        &mut self,
        chars: &str,
        inverted: bool,
        cursor: &mut TokenCursor,
    ) -> Result<bool, ArgumentFailure> {
        let mut iter = chars.char_indices();
        let first = match iter.next() {
            Some((_, c)) => c,
            None => return Ok(false),
        };
        let rest = &chars[first.len_utf8()..];

        match self.resolve_short(first) {
            None => Ok(false),
            Some(Resolved::Group(idx)) if rest.is_empty() => {
                cursor.next();
                self.enter_group(idx);
                Ok(true)
            }
            Some(Resolved::Group(_)) => Ok(false),
            Some(Resolved::Argument(idx)) if rest.is_empty() => {
                cursor.next();
                self.process_argument(idx, None, inverted, cursor)?;
                Ok(true)
            }
            Some(Resolved::Argument(idx)) if self.arguments[idx].value_mode().takes_value() => {
                // -ofile and -o=file
                let value = rest.strip_prefix(self.settings.key_value_separator()).unwrap_or(rest);
                let value = value.to_string();
                cursor.next();
                self.process_argument(idx, Some(value), inverted, cursor)?;
                Ok(true)
            }
            Some(Resolved::Argument(_)) => {
                if !self.settings.allow_combined_short() {
                    return Ok(false);
                }
                let mut combined = Vec::new();
                for c in chars.chars() {
                    match self.resolve_short(c) {
                        Some(Resolved::Argument(idx))
                            if !self.arguments[idx].value_mode().takes_value() =>
                        {
                            combined.push(idx)
                        }
                        _ => return Ok(false),
                    }
                }
                cursor.next();
                for idx in combined {
                    self.process_argument(idx, None, inverted, cursor)?;
                }
                Ok(true)
            }
        }
    }

    fn failure(&self, idx: usize, error: ParserError) -> ArgumentFailure {
        ArgumentFailure::new(Some(self.arguments[idx].key().clone()), error)
    }

    fn assign_raw(
        &mut self,
        idx: usize,
        raw: &str,
        inverted: bool,
        count_value: bool,
    ) -> Result<(), ArgumentFailure> {
        let separator = self.settings.key_value_separator();
        let values = self.arguments[idx].split_values(raw);
        for value in values {
            self.arguments[idx]
                .assign_value(Some(&value), inverted, count_value, separator)
                .map_err(|error| self.failure(idx, error))?;
        }
        Ok(())
    }

    /// Handles one use of the argument at `idx` whose key token was consumed.
    fn process_argument(
        &mut self,
        idx: usize,
        inline: Option<String>,
        inverted: bool,
        cursor: &mut TokenCursor,
    ) -> Result<(), ArgumentFailure> {
        trace!("processing argument {}", self.arguments[idx].name());
        self.arguments[idx].mark_occurrence();
        let separator = self.settings.key_value_separator();

        match self.arguments[idx].value_mode() {
            ValueMode::None => {
                if let Some(value) = inline {
                    let error = ParserError::UnexpectedValue(self.arguments[idx].name(), value);
                    return Err(self.failure(idx, error));
                }
                self.arguments[idx]
                    .assign_value(None, inverted, true, separator)
                    .map_err(|error| self.failure(idx, error))?;
            }
            ValueMode::Required => {
                let value = match inline.or_else(|| cursor.next()) {
                    Some(value) => value,
                    None => {
                        let error = ParserError::MissingValue(self.arguments[idx].name());
                        return Err(self.failure(idx, error));
                    }
                };
                self.assign_raw(idx, &value, inverted, true)?;
                self.take_more_values(idx, inverted, cursor)?;
            }
            ValueMode::Optional => {
                match inline.or_else(|| cursor.next_value(&self.settings)) {
                    Some(value) => {
                        self.assign_raw(idx, &value, inverted, true)?;
                        self.take_more_values(idx, inverted, cursor)?;
                    }
                    None => {
                        let implicit = self.arguments[idx].implicit_value().map(str::to_string);
                        match implicit {
                            Some(value) => self.assign_raw(idx, &value, inverted, true)?,
                            None => self.arguments[idx]
                                .assign_value(None, inverted, true, separator)
                                .map_err(|error| self.failure(idx, error))?,
                        }
                    }
                }
            }
            ValueMode::Passthrough => {
                if let Some(value) = inline {
                    self.assign_raw(idx, &value, inverted, true)?;
                }
                for value in cursor.drain() {
                    self.arguments[idx]
                        .assign_value(Some(&value), inverted, false, separator)
                        .map_err(|error| self.failure(idx, error))?;
                }
            }
        }

        self.activate(idx)
    }

    fn take_more_values(
        &mut self,
        idx: usize,
        inverted: bool,
        cursor: &mut TokenCursor,
    ) -> Result<(), ArgumentFailure> {
        if !self.arguments[idx].takes_multiple_values() || cursor.options_ended() {
            return Ok(());
        }
        while let Some(value) = cursor.next_value(&self.settings) {
            self.assign_raw(idx, &value, inverted, true)?;
        }
        Ok(())
    }

    fn activate(&mut self, idx: usize) -> Result<(), ArgumentFailure> {
        self.constraints
            .activate(idx, &self.arguments)
            .map_err(|error| self.failure(idx, error))
    }

    fn process_positional(
        &mut self,
        raw: &str,
        cursor: &mut TokenCursor,
    ) -> Result<bool, ArgumentFailure> {
        while self.next_positional < self.positionals.len()
            && self.arguments[self.positionals[self.next_positional]].is_full()
        {
            self.next_positional += 1;
        }
        let idx = match self.positionals.get(self.next_positional) {
            Some(idx) => *idx,
            None => return Ok(false),
        };

        let raw = raw.to_string();
        cursor.next();
        trace!(
            "value \"{}\" goes to positional argument {}",
            raw,
            self.arguments[idx].name()
        );
        self.arguments[idx].mark_occurrence();
        self.assign_raw(idx, &raw, false, true)?;
        self.activate(idx)?;
        Ok(true)
    }

    /// End-of-parse conditions of this handler and of every used group.
    fn finish(&mut self) -> ParseReport {
        let mut report = ParseReport::default();
        for group in self.groups.iter_mut().filter(|x| x.used) {
            report.extend(group.finish());
        }

        for argument in self.arguments.iter_mut() {
            if let Err(error) = argument.finalize() {
                report.push(ArgumentFailure::new(Some(argument.key().clone()), error));
            }
            if argument.is_mandatory() && !argument.was_seen() {
                report.push(ArgumentFailure::new(
                    Some(argument.key().clone()),
                    ParserError::MissingRequiredArgument(argument.name()),
                ));
            }
        }

        report.extend(self.constraints.check_end_conditions(&self.arguments));
        report
    }

    pub fn usage(&self) -> String {
        self.to_string()
    }

    fn format_usage(&self, indent: &str) -> String {
        let mut builder = String::new();
        if !self.description.is_empty() {
            builder += format!("{}{}\n", indent, self.description).as_str();
        }

        for (positional, title) in [(true, "positional arguments"), (false, "arguments")] {
            let visible: Vec<&TypedArgument<'a>> = self
                .arguments
                .iter()
                .filter(|x| x.is_positional() == positional && !x.is_hidden())
                .collect();
            if visible.is_empty() {
                continue;
            }
            builder += format!("{}{}:\n", indent, title).as_str();
            for argument in visible {
                builder += format!("{}- {}\n", indent, argument).as_str();
            }
        }

        for group in self.groups.iter() {
            if let Some(key) = group.key.as_ref() {
                builder += format!("{}group {}:\n", indent, key).as_str();
            }
            builder += group.format_usage(&format!("{}  ", indent)).as_str();
        }
        builder
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolved {
    Argument(usize),
    Group(usize),
}

//! Rules spanning several arguments of one handler.
//!
//! Constraints are declared by name while arguments are registered and are
//! resolved to argument positions once registration closes. From then on the
//! engine is told about every argument use ([`ConstraintEngine::activate`])
//! and checks what is still unmet when parsing ends
//! ([`ConstraintEngine::check_end_conditions`]).

use std::{
    collections::{BTreeSet, HashSet},
    fmt::Display,
};

use log::debug;

use crate::{
    argument_error::ArgumentError,
    argument_key::ArgumentKey,
    parse_result::{ArgumentFailure, ParseReport, ParserError},
    string_vec_to_string,
    typed_argument::TypedArgument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Every participant must be used. With an origin, only once the origin
    /// was used.
    Required,
    /// Participants cannot be used together. With an origin, only the origin
    /// is exclusive with each participant.
    Excludes,
    AllOf,
    /// Exactly one participant.
    OneOf,
    /// At least one participant.
    AnyOf,
    /// Final values of the used participants must all differ.
    Differ,
    /// Final values of the used participants must not overlap.
    Disjoint,
}

impl ConstraintKind {
    fn min_participants(&self) -> usize {
        match self {
            ConstraintKind::Required | ConstraintKind::Excludes => 1,
            _ => 2,
        }
    }

    fn compares_values(&self) -> bool {
        matches!(self, ConstraintKind::Differ | ConstraintKind::Disjoint)
    }
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ConstraintKind::Required => "required",
                ConstraintKind::Excludes => "excludes",
                ConstraintKind::AllOf => "all of",
                ConstraintKind::OneOf => "one of",
                ConstraintKind::AnyOf => "any of",
                ConstraintKind::Differ => "differ",
                ConstraintKind::Disjoint => "disjoint",
            }
        )
    }
}

/// A constraint as declared, participants still by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    kind: ConstraintKind,
    participants: Vec<String>,
    origin: Option<String>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, participants: &[&str]) -> Result<Constraint, ArgumentError> {
        if participants.len() < kind.min_participants() {
            return Err(ArgumentError::InsufficientConstraintArguments(
                kind.to_string(),
                kind.min_participants(),
            ));
        }
        Ok(Constraint {
            kind,
            participants: participants.iter().map(|x| x.to_string()).collect(),
            origin: None,
        })
    }

    pub(crate) fn from_origin(
        kind: ConstraintKind,
        origin: &ArgumentKey,
        participants: &[String],
    ) -> Constraint {
        Constraint {
            kind,
            participants: participants.to_vec(),
            origin: Some(origin.display_name()),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }
}

#[derive(Debug)]
struct ResolvedConstraint {
    kind: ConstraintKind,
    origin: Option<usize>,
    participants: Vec<usize>,
    remaining: BTreeSet<usize>,
}

impl ResolvedConstraint {
    fn involves(&self, idx: usize) -> bool {
        self.origin == Some(idx) || self.participants.contains(&idx)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConstraintEngine {
    declared: Vec<Constraint>,
    resolved: Vec<ResolvedConstraint>,
    seen: HashSet<usize>,
}

fn names(arguments: &[TypedArgument<'_>], indices: &[usize]) -> String {
    let names: Vec<String> = indices.iter().map(|idx| arguments[*idx].name()).collect();
    string_vec_to_string(&names, true)
}

impl ConstraintEngine {
    pub fn add(&mut self, constraint: Constraint) {
        self.declared.push(constraint);
    }

    /// Resolves every declared constraint against the registered arguments.
    /// `lookup` maps a name as written by the user to an argument position.
    pub fn resolve<F>(
        &mut self,
        arguments: &[TypedArgument<'_>],
        lookup: F,
    ) -> Result<(), ArgumentError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let mut resolved = Vec::with_capacity(self.declared.len());
        for constraint in self.declared.iter() {
            let describe = || match &constraint.origin {
                Some(origin) => format!("{} ({})", constraint.kind, origin),
                None => constraint.kind.to_string(),
            };
            let find = |name: &str| {
                lookup(name).ok_or_else(|| {
                    ArgumentError::UnknownConstraintArgument(describe(), name.to_string())
                })
            };

            let origin = constraint.origin.as_deref().map(find).transpose()?;
            let participants = constraint
                .participants
                .iter()
                .map(|x| find(x))
                .collect::<Result<Vec<usize>, ArgumentError>>()?;

            if constraint.kind.compares_values() {
                let first = arguments[participants[0]].destination().value_tag();
                for idx in participants[1..].iter() {
                    let tag = arguments[*idx].destination().value_tag();
                    if tag != first {
                        return Err(ArgumentError::ConstraintTypeMismatch(
                            describe(),
                            first.to_string(),
                            tag.to_string(),
                        ));
                    }
                }
            }

            resolved.push(ResolvedConstraint {
                kind: constraint.kind,
                origin,
                remaining: participants.iter().copied().collect(),
                participants,
            });
        }
        debug!("resolved {} constraints", resolved.len());
        self.resolved = resolved;
        Ok(())
    }

    /// Records a use of the argument at `idx`, failing on the first
    /// constraint it violates.
    pub fn activate(
        &mut self,
        idx: usize,
        arguments: &[TypedArgument<'_>],
    ) -> Result<(), ParserError> {
        let name = || arguments[idx].name();
        let seen = &self.seen;
        let seen_other = |candidates: &[usize]| -> Option<usize> {
            candidates
                .iter()
                .copied()
                .find(|other| *other != idx && seen.contains(other))
        };

        for constraint in self.resolved.iter_mut().filter(|x| x.involves(idx)) {
            match constraint.kind {
                ConstraintKind::Excludes => {
                    let conflict = match constraint.origin {
                        Some(origin) if origin == idx => seen_other(&constraint.participants),
                        Some(origin) if seen.contains(&origin) => Some(origin),
                        Some(_) => None,
                        None => seen_other(&constraint.participants),
                    };
                    if let Some(other) = conflict {
                        return Err(ParserError::ArgumentExcluded(
                            name(),
                            arguments[other].name(),
                        ));
                    }
                }
                ConstraintKind::OneOf => {
                    if let Some(other) = seen_other(&constraint.participants) {
                        return Err(ParserError::ArgumentExcluded(
                            name(),
                            arguments[other].name(),
                        ));
                    }
                }
                ConstraintKind::AllOf => {
                    if !constraint.remaining.remove(&idx) {
                        return Err(ParserError::AlreadyUsed(name()));
                    }
                }
                ConstraintKind::Required
                | ConstraintKind::AnyOf
                | ConstraintKind::Differ
                | ConstraintKind::Disjoint => (),
            }
        }

        debug!("constraints accept {}", name());
        self.seen.insert(idx);
        Ok(())
    }

    /// Every unmet end condition, in declaration order.
    pub fn check_end_conditions(&self, arguments: &[TypedArgument<'_>]) -> ParseReport {
        let mut report = ParseReport::default();
        for constraint in self.resolved.iter() {
            let used: Vec<usize> = constraint
                .participants
                .iter()
                .copied()
                .filter(|idx| self.seen.contains(idx))
                .collect();

            match constraint.kind {
                ConstraintKind::Required => {
                    let active = constraint
                        .origin
                        .map_or(true, |origin| self.seen.contains(&origin));
                    if active {
                        let key = constraint.origin.map(|x| arguments[x].key().clone());
                        for idx in constraint.participants.iter() {
                            if !self.seen.contains(idx) {
                                report.push(ArgumentFailure::new(
                                    Some(key.clone().unwrap_or_else(|| arguments[*idx].key().clone())),
                                    ParserError::MissingRequiredArgument(arguments[*idx].name()),
                                ));
                            }
                        }
                    }
                }
                ConstraintKind::AllOf => {
                    if !constraint.remaining.is_empty() {
                        let remaining: Vec<usize> = constraint.remaining.iter().copied().collect();
                        report.push(ArgumentFailure::new(
                            None,
                            ParserError::MissingRequiredArgument(names(arguments, &remaining)),
                        ));
                    }
                }
                ConstraintKind::OneOf | ConstraintKind::AnyOf => {
                    if used.is_empty() {
                        report.push(ArgumentFailure::new(
                            None,
                            ParserError::MissingRequiredArgument(format!(
                                "{} {}",
                                constraint.kind,
                                names(arguments, &constraint.participants)
                            )),
                        ));
                    }
                }
                ConstraintKind::Differ => {
                    for (i, a) in used.iter().enumerate() {
                        for b in used[i + 1..].iter() {
                            let left = arguments[*a].destination();
                            let right = arguments[*b].destination();
                            if left.same_values(right) {
                                report.push(ArgumentFailure::new(
                                    None,
                                    ParserError::ValuesNotDistinct(names(arguments, &[*a, *b])),
                                ));
                            }
                        }
                    }
                }
                ConstraintKind::Disjoint => {
                    for (i, a) in used.iter().enumerate() {
                        for b in used[i + 1..].iter() {
                            let left = arguments[*a].destination();
                            let right = arguments[*b].destination();
                            match left.intersects(right) {
                                Ok(false) => (),
                                Ok(true) => report.push(ArgumentFailure::new(
                                    None,
                                    ParserError::ValuesNotDisjoint(
                                        arguments[*a].name(),
                                        arguments[*b].name(),
                                    ),
                                )),
                                Err(error) => report.push(ArgumentFailure::new(None, error)),
                            }
                        }
                    }
                }
                ConstraintKind::Excludes => (),
            }
        }
        report
    }
}

#[cfg(test)]
mod test {
    use super::{Constraint, ConstraintEngine, ConstraintKind};
    use crate::{
        argument_error::ArgumentError,
        argument_key::ArgumentKey,
        destination::Destination,
        parse_result::{ErrorKind, ParserError},
        typed_argument::TypedArgument,
    };

    fn argument<'a>(spec: &str, destination: Destination<'a>) -> TypedArgument<'a> {
        TypedArgument::new(ArgumentKey::new(spec).unwrap(), false, destination, "")
    }

    fn resolve(
        engine: &mut ConstraintEngine,
        arguments: &[TypedArgument<'_>],
    ) -> Result<(), ArgumentError> {
        engine.resolve(arguments, |name| {
            let name = name.trim_start_matches('-');
            arguments.iter().position(|x| x.key().matches_name(name))
        })
    }

    #[test]
    fn too_few_participants() {
        assert_eq!(
            Constraint::new(ConstraintKind::Differ, &["a"]),
            Err(ArgumentError::InsufficientConstraintArguments(
                "differ".to_string(),
                2
            ))
        );
        assert!(Constraint::new(ConstraintKind::Required, &["a"]).is_ok());
    }

    #[test]
    fn unknown_participant() {
        let (mut a, mut b) = (false, false);
        let arguments = vec![
            argument("a", Destination::flag(&mut a)),
            argument("b", Destination::flag(&mut b)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::Excludes, &["a", "c"]).unwrap());
        assert_eq!(
            resolve(&mut engine, &arguments),
            Err(ArgumentError::UnknownConstraintArgument(
                "excludes".to_string(),
                "c".to_string()
            ))
        );
    }

    #[test]
    fn mismatched_value_types() {
        let (mut a, mut b) = (0i32, 0u8);
        let arguments = vec![
            argument("a", Destination::scalar(&mut a)),
            argument("b", Destination::scalar(&mut b)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::Differ, &["a", "b"]).unwrap());
        assert!(matches!(
            resolve(&mut engine, &arguments),
            Err(ArgumentError::ConstraintTypeMismatch(..))
        ));
    }

    #[test]
    fn excludes() {
        let (mut a, mut b) = (false, false);
        let arguments = vec![
            argument("a", Destination::flag(&mut a)),
            argument("b", Destination::flag(&mut b)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::Excludes, &["a", "b"]).unwrap());
        resolve(&mut engine, &arguments).unwrap();
        engine.activate(0, &arguments).unwrap();
        engine.activate(0, &arguments).unwrap();
        assert_eq!(
            engine.activate(1, &arguments),
            Err(ParserError::ArgumentExcluded(
                "-b".to_string(),
                "-a".to_string()
            ))
        );
    }

    #[test]
    fn all_of() {
        let (mut a, mut b, mut c) = (false, false, false);
        let arguments = vec![
            argument("a", Destination::flag(&mut a)),
            argument("b", Destination::flag(&mut b)),
            argument("c", Destination::flag(&mut c)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::AllOf, &["a", "b", "c"]).unwrap());
        resolve(&mut engine, &arguments).unwrap();
        engine.activate(1, &arguments).unwrap();
        assert_eq!(
            engine.activate(1, &arguments),
            Err(ParserError::AlreadyUsed("-b".to_string()))
        );
        let report = engine.check_end_conditions(&arguments);
        assert_eq!(
            report.first().map(|x| x.error.clone()),
            Some(ParserError::MissingRequiredArgument("[-a, -c]".to_string()))
        );
        assert_eq!(report.first().and_then(|x| x.key.clone()), None);
    }

    #[test]
    fn one_of_and_any_of() {
        let (mut a, mut b) = (false, false);
        let arguments = vec![
            argument("a", Destination::flag(&mut a)),
            argument("b", Destination::flag(&mut b)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::OneOf, &["a", "b"]).unwrap());
        engine.add(Constraint::new(ConstraintKind::AnyOf, &["a", "b"]).unwrap());
        resolve(&mut engine, &arguments).unwrap();
        assert_eq!(
            engine.check_end_conditions(&arguments).kinds(),
            vec![
                ErrorKind::MissingRequiredArgument,
                ErrorKind::MissingRequiredArgument
            ]
        );
        engine.activate(0, &arguments).unwrap();
        assert!(engine.check_end_conditions(&arguments).is_empty());
        assert_eq!(
            engine.activate(1, &arguments).unwrap_err().kind(),
            ErrorKind::ArgumentExcluded
        );
    }

    #[test]
    fn required_from_origin() {
        let (mut a, mut b) = (false, false);
        let mut arguments = vec![
            argument("a", Destination::flag(&mut a)),
            argument("b", Destination::flag(&mut b)),
        ];
        arguments[0].requires(&["b"]);
        let origin = arguments[0].key().clone();
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::from_origin(
            ConstraintKind::Required,
            &origin,
            arguments[0].required_names(),
        ));
        resolve(&mut engine, &arguments).unwrap();
        assert!(engine.check_end_conditions(&arguments).is_empty());
        engine.activate(0, &arguments).unwrap();
        let report = engine.check_end_conditions(&arguments);
        assert_eq!(report.first().and_then(|x| x.key.clone()), Some(origin));
    }

    #[test]
    fn differ_and_disjoint_only_compare_used_arguments() {
        let (mut a, mut b) = (5, 5);
        let arguments = vec![
            argument("a", Destination::scalar(&mut a)),
            argument("b", Destination::scalar(&mut b)),
        ];
        let mut engine = ConstraintEngine::default();
        engine.add(Constraint::new(ConstraintKind::Differ, &["a", "b"]).unwrap());
        resolve(&mut engine, &arguments).unwrap();
        engine.activate(0, &arguments).unwrap();
        assert!(engine.check_end_conditions(&arguments).is_empty());
        engine.activate(1, &arguments).unwrap();
        assert_eq!(
            engine.check_end_conditions(&arguments).kinds(),
            vec![ErrorKind::ValuesNotDistinct]
        );
    }
}

//! Adapters giving every supported destination container shape the same
//! capability interface.
//!
//! An adapter wraps a caller owned container and stores nothing of its own.
//! What a shape can do is fixed by its [`ContainerKind`], never by the
//! instance.

use std::{
    collections::{BTreeSet, BinaryHeap, HashSet, VecDeque},
    fmt::Display,
    hash::Hash,
};

use crate::{parse_result::ParserError, string_vec_to_string};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    UniqueSet,
    SortedSet,
    Fifo,
    Stack,
    PriorityQueue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub has_iterators: bool,
    /// Only order preserving sequences can address a value by position.
    pub allows_position_format: bool,
    pub is_sortable: bool,
    /// The shape keeps its values ordered on its own.
    pub is_sorted: bool,
}

impl Capabilities {
    pub const fn new(
        has_iterators: bool,
        allows_position_format: bool,
        is_sortable: bool,
        is_sorted: bool,
    ) -> Capabilities {
        Capabilities {
            has_iterators,
            allows_position_format,
            is_sortable,
            is_sorted,
        }
    }
}

impl ContainerKind {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            ContainerKind::Sequence => Capabilities::new(true, true, true, false),
            ContainerKind::UniqueSet => Capabilities::new(true, false, false, false),
            ContainerKind::SortedSet => Capabilities::new(true, false, false, true),
            ContainerKind::Fifo => Capabilities::new(false, false, false, false),
            ContainerKind::Stack => Capabilities::new(false, false, false, false),
            ContainerKind::PriorityQueue => Capabilities::new(false, false, false, true),
        }
    }
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ContainerKind::Sequence => "sequence",
                ContainerKind::UniqueSet => "unique set",
                ContainerKind::SortedSet => "sorted set",
                ContainerKind::Fifo => "fifo queue",
                ContainerKind::Stack => "stack",
                ContainerKind::PriorityQueue => "priority queue",
            }
        )
    }
}

fn unsupported(operation: &'static str, kind: ContainerKind) -> ParserError {
    ParserError::UnsupportedOperation(operation, kind.to_string())
}

pub trait ContainerAdapter<T> {
    const KIND: ContainerKind;

    fn add_value(&mut self, value: T);

    fn contains(&self, value: &T) -> Result<bool, ParserError>;

    fn sort(&mut self) -> Result<(), ParserError>;

    fn clear(&mut self);

    fn size(&self) -> usize;

    /// Values in the order the shape hands them out. Shapes without
    /// iteration are drained from a copy, the container itself is untouched.
    fn values(&self) -> Vec<String>;

    fn capabilities(&self) -> Capabilities {
        Self::KIND.capabilities()
    }

    fn has_intersection(&self, values: &[T]) -> Result<bool, ParserError> {
        for value in values {
            if self.contains(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Never fails, `[a, b, c]` form.
    fn render(&self) -> String {
        string_vec_to_string(&self.values(), true)
    }
}

pub struct SequenceAdapter<'a, T>(pub &'a mut Vec<T>);

impl<'a, T: PartialOrd + Display> ContainerAdapter<T> for SequenceAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::Sequence;

    fn add_value(&mut self, value: T) {
        self.0.push(value);
    }

    fn contains(&self, value: &T) -> Result<bool, ParserError> {
        Ok(self.0.contains(value))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        // incomparable values (NaN) keep their relative position
        self.0
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(())
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        self.0.iter().map(|x| x.to_string()).collect()
    }
}

pub struct UniqueSetAdapter<'a, T>(pub &'a mut HashSet<T>);

impl<'a, T: Eq + Hash + Display> ContainerAdapter<T> for UniqueSetAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::UniqueSet;

    fn add_value(&mut self, value: T) {
        self.0.insert(value);
    }

    fn contains(&self, value: &T) -> Result<bool, ParserError> {
        Ok(self.0.contains(value))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(unsupported("sort", Self::KIND))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        self.0.iter().map(|x| x.to_string()).collect()
    }
}

pub struct SortedSetAdapter<'a, T>(pub &'a mut BTreeSet<T>);

impl<'a, T: Ord + Display> ContainerAdapter<T> for SortedSetAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::SortedSet;

    fn add_value(&mut self, value: T) {
        self.0.insert(value);
    }

    fn contains(&self, value: &T) -> Result<bool, ParserError> {
        Ok(self.0.contains(value))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(unsupported("sort", Self::KIND))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        self.0.iter().map(|x| x.to_string()).collect()
    }
}

pub struct FifoAdapter<'a, T>(pub &'a mut VecDeque<T>);

impl<'a, T: Clone + Display> ContainerAdapter<T> for FifoAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::Fifo;

    fn add_value(&mut self, value: T) {
        self.0.push_back(value);
    }

    fn contains(&self, _value: &T) -> Result<bool, ParserError> {
        Err(unsupported("contains", Self::KIND))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(unsupported("sort", Self::KIND))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        let mut copy = self.0.clone();
        let mut values = Vec::with_capacity(copy.len());
        while let Some(value) = copy.pop_front() {
            values.push(value.to_string());
        }
        values
    }
}

/// A `Vec` used as a stack: values come out last-in first.
pub struct StackAdapter<'a, T>(pub &'a mut Vec<T>);

impl<'a, T: Clone + Display> ContainerAdapter<T> for StackAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::Stack;

    fn add_value(&mut self, value: T) {
        self.0.push(value);
    }

    fn contains(&self, _value: &T) -> Result<bool, ParserError> {
        Err(unsupported("contains", Self::KIND))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(unsupported("sort", Self::KIND))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        let mut copy = self.0.clone();
        let mut values = Vec::with_capacity(copy.len());
        while let Some(value) = copy.pop() {
            values.push(value.to_string());
        }
        values
    }
}

pub struct PriorityQueueAdapter<'a, T>(pub &'a mut BinaryHeap<T>);

impl<'a, T: Ord + Clone + Display> ContainerAdapter<T> for PriorityQueueAdapter<'a, T> {
    const KIND: ContainerKind = ContainerKind::PriorityQueue;

    fn add_value(&mut self, value: T) {
        self.0.push(value);
    }

    fn contains(&self, _value: &T) -> Result<bool, ParserError> {
        Err(unsupported("contains", Self::KIND))
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(unsupported("sort", Self::KIND))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn values(&self) -> Vec<String> {
        let mut copy = self.0.clone();
        let mut values = Vec::with_capacity(copy.len());
        while let Some(value) = copy.pop() {
            values.push(value.to_string());
        }
        values
    }
}

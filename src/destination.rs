//! Type erasure over the caller owned places parsed values end up in.
//!
//! A [`Destination`] borrows a scalar, a container or a map for the lifetime
//! of the handler and lets the argument pipeline drive all of them through
//! one interface.

use std::{
    collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque},
    fmt::Display,
    hash::Hash,
    marker::PhantomData,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    str::FromStr,
};

use crate::{
    container::{
        Capabilities, ContainerAdapter, ContainerKind, FifoAdapter, PriorityQueueAdapter,
        SequenceAdapter, SortedSetAdapter, StackAdapter, UniqueSetAdapter,
    },
    key_value::{
        HashMapAdapter, HashMultiMapAdapter, KeyValueAdapter, KeyValueKind, MapAdapter,
        MultiMapAdapter,
    },
    parse_result::ParserError,
    string_vec_to_string,
};

/// Names a value type in diagnostics and in constraint type matching.
///
/// Implemented for the primitive and common std types; implement it for
/// own `FromStr` types to store them in a [`Destination`].
pub trait ValueType: 'static {
    const NAME: &'static str;
}

macro_rules! value_types {
    ($($value_type:ty => $name:literal),* $(,)?) => {
        $(
            impl ValueType for $value_type {
                const NAME: &'static str = $name;
            }
        )*
    };
}

value_types!(
    bool => "bool",
    char => "char",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    f32 => "f32",
    f64 => "f64",
    String => "string",
    IpAddr => "ip address",
    Ipv4Addr => "ipv4 address",
    Ipv6Addr => "ipv6 address",
    SocketAddr => "socket address",
);

/// Value type of a destination, set when the destination is created.
/// Key-value destinations carry the key and the value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueTag {
    name: &'static str,
    value: Option<&'static str>,
}

impl ValueTag {
    pub fn of<T: ValueType>() -> ValueTag {
        ValueTag {
            name: T::NAME,
            value: None,
        }
    }

    pub fn pair<K: ValueType, V: ValueType>() -> ValueTag {
        ValueTag {
            name: K::NAME,
            value: Some(V::NAME),
        }
    }
}

impl Display for ValueTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Flag,
    Counter,
    Scalar,
    Optional,
    Container(ContainerKind),
    KeyValue(KeyValueKind),
}

impl Shape {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Shape::Container(kind) => kind.capabilities(),
            Shape::KeyValue(kind) => kind.capabilities(),
            // a single slot can still have formatters for "its" value
            _ => Capabilities::new(false, true, false, false),
        }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, Shape::Flag | Shape::Counter)
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Shape::Container(_) | Shape::KeyValue(_) | Shape::Counter)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Flag => write!(f, "flag"),
            Shape::Counter => write!(f, "counter"),
            Shape::Scalar => write!(f, "scalar"),
            Shape::Optional => write!(f, "optional"),
            Shape::Container(kind) => write!(f, "{}", kind),
            Shape::KeyValue(kind) => write!(f, "{}", kind),
        }
    }
}

fn convert<T: FromStr + ValueType>(argument: &str, raw: &str) -> Result<T, ParserError> {
    raw.parse::<T>().map_err(|_| {
        ParserError::ConversionFailed(
            argument.to_string(),
            raw.to_string(),
            ValueTag::of::<T>().to_string(),
        )
    })
}

fn missing_value(argument: &str) -> ParserError {
    ParserError::MissingValue(argument.to_string())
}

fn require_iteration(slot: &dyn Slot) -> Result<(), ParserError> {
    let shape = slot.shape();
    if shape.capabilities().has_iterators {
        Ok(())
    } else {
        Err(ParserError::UnsupportedOperation("intersection", shape.to_string()))
    }
}

pub(crate) trait Slot {
    fn shape(&self) -> Shape;

    fn value_tag(&self) -> ValueTag;

    /// `key` is only set for key-value destinations. With `clear_first` the
    /// destination is cleared once the value converted.
    fn assign(
        &mut self,
        argument: &str,
        key: Option<&str>,
        value: Option<&str>,
        inverted: bool,
        clear_first: bool,
    ) -> Result<(), ParserError>;

    fn contains(&self, argument: &str, key: Option<&str>, value: &str) -> Result<bool, ParserError>;

    fn clear(&mut self);

    fn sort(&mut self) -> Result<(), ParserError>;

    fn size(&self) -> usize;

    fn values(&self) -> Vec<String>;

    /// What value-set comparisons look at: values, or keys for maps.
    fn comparison_values(&self) -> Vec<String> {
        self.values()
    }

    fn intersects(&self, other: &dyn Slot) -> Result<bool, ParserError>;

    fn render(&self) -> String {
        string_vec_to_string(&self.values(), true)
    }
}

struct FlagSlot<'a>(&'a mut bool);

impl<'a> Slot for FlagSlot<'a> {
    fn shape(&self) -> Shape {
        Shape::Flag
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::of::<bool>()
    }

    fn assign(
        &mut self,
        argument: &str,
        _key: Option<&str>,
        value: Option<&str>,
        inverted: bool,
        _clear_first: bool,
    ) -> Result<(), ParserError> {
        let value = match value {
            Some(raw) => convert::<bool>(argument, raw)?,
            None => true,
        };
        *self.0 = value != inverted;
        Ok(())
    }

    fn contains(&self, argument: &str, _key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        Ok(*self.0 == convert::<bool>(argument, value)?)
    }

    fn clear(&mut self) {}

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedOperation("sort", Shape::Flag.to_string()))
    }

    fn size(&self) -> usize {
        1
    }

    fn values(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }

    fn intersects(&self, _other: &dyn Slot) -> Result<bool, ParserError> {
        Err(ParserError::UnsupportedOperation(
            "intersection",
            Shape::Flag.to_string(),
        ))
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

struct CounterSlot<'a>(&'a mut usize);

impl<'a> Slot for CounterSlot<'a> {
    fn shape(&self) -> Shape {
        Shape::Counter
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::of::<usize>()
    }

    fn assign(
        &mut self,
        argument: &str,
        _key: Option<&str>,
        value: Option<&str>,
        _inverted: bool,
        clear_first: bool,
    ) -> Result<(), ParserError> {
        match value {
            Some(raw) => Err(ParserError::UnexpectedValue(
                argument.to_string(),
                raw.to_string(),
            )),
            None => {
                if clear_first {
                    self.clear();
                }
                *self.0 += 1;
                Ok(())
            }
        }
    }

    fn contains(&self, argument: &str, _key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        Ok(*self.0 == convert::<usize>(argument, value)?)
    }

    fn clear(&mut self) {
        *self.0 = 0;
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedOperation(
            "sort",
            Shape::Counter.to_string(),
        ))
    }

    fn size(&self) -> usize {
        1
    }

    fn values(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }

    fn intersects(&self, _other: &dyn Slot) -> Result<bool, ParserError> {
        Err(ParserError::UnsupportedOperation(
            "intersection",
            Shape::Counter.to_string(),
        ))
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

struct ScalarSlot<'a, T>(&'a mut T);

impl<'a, T: FromStr + Display + PartialEq + ValueType> Slot for ScalarSlot<'a, T> {
    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::of::<T>()
    }

    fn assign(
        &mut self,
        argument: &str,
        _key: Option<&str>,
        value: Option<&str>,
        _inverted: bool,
        _clear_first: bool,
    ) -> Result<(), ParserError> {
        let raw = value.ok_or_else(|| missing_value(argument))?;
        *self.0 = convert::<T>(argument, raw)?;
        Ok(())
    }

    fn contains(&self, argument: &str, _key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        Ok(*self.0 == convert::<T>(argument, value)?)
    }

    fn clear(&mut self) {}

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedOperation(
            "sort",
            Shape::Scalar.to_string(),
        ))
    }

    fn size(&self) -> usize {
        1
    }

    fn values(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }

    fn intersects(&self, _other: &dyn Slot) -> Result<bool, ParserError> {
        Err(ParserError::UnsupportedOperation(
            "intersection",
            Shape::Scalar.to_string(),
        ))
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

struct OptionalSlot<'a, T>(&'a mut Option<T>);

impl<'a, T: FromStr + Display + PartialEq + ValueType> Slot for OptionalSlot<'a, T> {
    fn shape(&self) -> Shape {
        Shape::Optional
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::of::<T>()
    }

    fn assign(
        &mut self,
        argument: &str,
        _key: Option<&str>,
        value: Option<&str>,
        _inverted: bool,
        _clear_first: bool,
    ) -> Result<(), ParserError> {
        let raw = value.ok_or_else(|| missing_value(argument))?;
        *self.0 = Some(convert::<T>(argument, raw)?);
        Ok(())
    }

    fn contains(&self, argument: &str, _key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        let value = convert::<T>(argument, value)?;
        Ok(self.0.as_ref().map_or(false, |x| *x == value))
    }

    fn clear(&mut self) {
        *self.0 = None;
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedOperation(
            "sort",
            Shape::Optional.to_string(),
        ))
    }

    fn size(&self) -> usize {
        usize::from(self.0.is_some())
    }

    fn values(&self) -> Vec<String> {
        self.0.iter().map(|x| x.to_string()).collect()
    }

    fn intersects(&self, _other: &dyn Slot) -> Result<bool, ParserError> {
        Err(ParserError::UnsupportedOperation(
            "intersection",
            Shape::Optional.to_string(),
        ))
    }

    fn render(&self) -> String {
        self.0.as_ref().map_or_else(String::new, |x| x.to_string())
    }
}

struct ContainerSlot<A, T> {
    adapter: A,
    value_type: PhantomData<fn() -> T>,
}

impl<A, T> Slot for ContainerSlot<A, T>
where
    A: ContainerAdapter<T>,
    T: FromStr + ValueType,
{
    fn shape(&self) -> Shape {
        Shape::Container(A::KIND)
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::of::<T>()
    }

    fn assign(
        &mut self,
        argument: &str,
        _key: Option<&str>,
        value: Option<&str>,
        _inverted: bool,
        clear_first: bool,
    ) -> Result<(), ParserError> {
        let raw = value.ok_or_else(|| missing_value(argument))?;
        let value = convert::<T>(argument, raw)?;
        if clear_first {
            self.adapter.clear();
        }
        self.adapter.add_value(value);
        Ok(())
    }

    fn contains(&self, argument: &str, _key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        self.adapter.contains(&convert::<T>(argument, value)?)
    }

    fn clear(&mut self) {
        self.adapter.clear();
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        self.adapter.sort()
    }

    fn size(&self) -> usize {
        self.adapter.size()
    }

    fn values(&self) -> Vec<String> {
        self.adapter.values()
    }

    fn intersects(&self, other: &dyn Slot) -> Result<bool, ParserError> {
        require_iteration(other)?;
        // values the other side holds but this type cannot even represent
        // can never be shared
        let candidates: Vec<T> = other
            .comparison_values()
            .iter()
            .filter_map(|x| x.parse::<T>().ok())
            .collect();
        self.adapter.has_intersection(&candidates)
    }

    fn render(&self) -> String {
        self.adapter.render()
    }
}

struct KeyValueSlot<A, K, V> {
    adapter: A,
    value_types: PhantomData<fn() -> (K, V)>,
}

impl<A, K, V> Slot for KeyValueSlot<A, K, V>
where
    A: KeyValueAdapter<K, V>,
    K: FromStr + ValueType,
    V: FromStr + ValueType,
{
    fn shape(&self) -> Shape {
        Shape::KeyValue(A::KIND)
    }

    fn value_tag(&self) -> ValueTag {
        ValueTag::pair::<K, V>()
    }

    fn assign(
        &mut self,
        argument: &str,
        key: Option<&str>,
        value: Option<&str>,
        _inverted: bool,
        clear_first: bool,
    ) -> Result<(), ParserError> {
        let raw_value = value.ok_or_else(|| missing_value(argument))?;
        let raw_key = key.ok_or_else(|| {
            ParserError::ConversionFailed(
                argument.to_string(),
                raw_value.to_string(),
                ValueTag::pair::<K, V>().to_string(),
            )
        })?;
        let key = convert::<K>(argument, raw_key)?;
        let value = convert::<V>(argument, raw_value)?;
        if clear_first {
            self.adapter.clear();
        }
        self.adapter.add_value(key, value);
        Ok(())
    }

    fn contains(&self, argument: &str, key: Option<&str>, value: &str) -> Result<bool, ParserError> {
        let key = convert::<K>(argument, key.unwrap_or(value))?;
        Ok(self.adapter.contains(&key))
    }

    fn clear(&mut self) {
        self.adapter.clear();
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        self.adapter.sort()
    }

    fn size(&self) -> usize {
        self.adapter.size()
    }

    fn values(&self) -> Vec<String> {
        self.adapter.pairs()
    }

    fn comparison_values(&self) -> Vec<String> {
        self.adapter.keys()
    }

    fn intersects(&self, other: &dyn Slot) -> Result<bool, ParserError> {
        require_iteration(other)?;
        let candidates: Vec<K> = other
            .comparison_values()
            .iter()
            .filter_map(|x| x.parse::<K>().ok())
            .collect();
        Ok(self.adapter.has_intersection(&candidates))
    }

    fn render(&self) -> String {
        self.adapter.render()
    }
}

/// Where the values of one argument are stored.
pub struct Destination<'a> {
    slot: Box<dyn Slot + 'a>,
}

impl<'a> Destination<'a> {
    fn new<S: Slot + 'a>(slot: S) -> Destination<'a> {
        Destination {
            slot: Box::new(slot),
        }
    }

    /// Set to `true` when the argument is seen, `false` when it is inverted.
    pub fn flag(dest: &'a mut bool) -> Destination<'a> {
        Destination::new(FlagSlot(dest))
    }

    /// Counts how often the argument is seen.
    pub fn counter(dest: &'a mut usize) -> Destination<'a> {
        Destination::new(CounterSlot(dest))
    }

    pub fn scalar<T>(dest: &'a mut T) -> Destination<'a>
    where
        T: FromStr + Display + PartialEq + ValueType,
    {
        Destination::new(ScalarSlot(dest))
    }

    pub fn optional<T>(dest: &'a mut Option<T>) -> Destination<'a>
    where
        T: FromStr + Display + PartialEq + ValueType,
    {
        Destination::new(OptionalSlot(dest))
    }

    fn container<A, T>(adapter: A) -> Destination<'a>
    where
        A: ContainerAdapter<T> + 'a,
        T: FromStr + ValueType,
    {
        Destination::new(ContainerSlot {
            adapter,
            value_type: PhantomData,
        })
    }

    pub fn sequence<T>(dest: &'a mut Vec<T>) -> Destination<'a>
    where
        T: FromStr + Display + PartialOrd + ValueType,
    {
        Destination::container(SequenceAdapter(dest))
    }

    pub fn unique_set<T>(dest: &'a mut HashSet<T>) -> Destination<'a>
    where
        T: FromStr + Display + Eq + Hash + ValueType,
    {
        Destination::container(UniqueSetAdapter(dest))
    }

    pub fn sorted_set<T>(dest: &'a mut BTreeSet<T>) -> Destination<'a>
    where
        T: FromStr + Display + Ord + ValueType,
    {
        Destination::container(SortedSetAdapter(dest))
    }

    pub fn fifo<T>(dest: &'a mut VecDeque<T>) -> Destination<'a>
    where
        T: FromStr + Display + Clone + ValueType,
    {
        Destination::container(FifoAdapter(dest))
    }

    pub fn stack<T>(dest: &'a mut Vec<T>) -> Destination<'a>
    where
        T: FromStr + Display + Clone + ValueType,
    {
        Destination::container(StackAdapter(dest))
    }

    pub fn priority_queue<T>(dest: &'a mut BinaryHeap<T>) -> Destination<'a>
    where
        T: FromStr + Display + Ord + Clone + ValueType,
    {
        Destination::container(PriorityQueueAdapter(dest))
    }

    fn key_value<A, K, V>(adapter: A) -> Destination<'a>
    where
        A: KeyValueAdapter<K, V> + 'a,
        K: FromStr + ValueType,
        V: FromStr + ValueType,
    {
        Destination::new(KeyValueSlot {
            adapter,
            value_types: PhantomData,
        })
    }

    pub fn map<K, V>(dest: &'a mut BTreeMap<K, V>) -> Destination<'a>
    where
        K: FromStr + Display + Ord + ValueType,
        V: FromStr + Display + ValueType,
    {
        Destination::key_value(MapAdapter(dest))
    }

    pub fn multi_map<K, V>(dest: &'a mut BTreeMap<K, Vec<V>>) -> Destination<'a>
    where
        K: FromStr + Display + Ord + ValueType,
        V: FromStr + Display + ValueType,
    {
        Destination::key_value(MultiMapAdapter(dest))
    }

    pub fn hash_map<K, V>(dest: &'a mut HashMap<K, V>) -> Destination<'a>
    where
        K: FromStr + Display + Eq + Hash + ValueType,
        V: FromStr + Display + ValueType,
    {
        Destination::key_value(HashMapAdapter(dest))
    }

    pub fn hash_multi_map<K, V>(dest: &'a mut HashMap<K, Vec<V>>) -> Destination<'a>
    where
        K: FromStr + Display + Eq + Hash + ValueType,
        V: FromStr + Display + ValueType,
    {
        Destination::key_value(HashMultiMapAdapter(dest))
    }

    pub fn shape(&self) -> Shape {
        self.slot.shape()
    }

    pub fn value_tag(&self) -> ValueTag {
        self.slot.value_tag()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.slot.shape().capabilities()
    }

    pub fn size(&self) -> usize {
        self.slot.size()
    }

    pub fn values(&self) -> Vec<String> {
        self.slot.values()
    }

    pub fn render(&self) -> String {
        self.slot.render()
    }

    pub(crate) fn assign(
        &mut self,
        argument: &str,
        key: Option<&str>,
        value: Option<&str>,
        inverted: bool,
    ) -> Result<(), ParserError> {
        self.slot.assign(argument, key, value, inverted, false)
    }

    /// Like `assign`, but replaces what the destination held before. A value
    /// that fails conversion leaves the destination untouched.
    pub(crate) fn replace(
        &mut self,
        argument: &str,
        key: Option<&str>,
        value: Option<&str>,
        inverted: bool,
    ) -> Result<(), ParserError> {
        self.slot.assign(argument, key, value, inverted, true)
    }

    pub(crate) fn contains(
        &self,
        argument: &str,
        key: Option<&str>,
        value: &str,
    ) -> Result<bool, ParserError> {
        self.slot.contains(argument, key, value)
    }

    pub(crate) fn sort(&mut self) -> Result<(), ParserError> {
        self.slot.sort()
    }

    pub(crate) fn intersects(&self, other: &Destination<'_>) -> Result<bool, ParserError> {
        self.slot.intersects(other.slot.as_ref())
    }

    /// Unordered shapes compare as multisets, ordered ones position by position.
    pub(crate) fn same_values(&self, other: &Destination<'_>) -> bool {
        let mut own = self.slot.values();
        let mut others = other.slot.values();
        if !self.capabilities().allows_position_format || !other.capabilities().allows_position_format
        {
            own.sort();
            others.sort();
        }
        own == others
    }
}

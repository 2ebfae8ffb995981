//! Adapters for associative destinations, filled from `key=value` tokens.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    hash::Hash,
};

use crate::{container::Capabilities, parse_result::ParserError, string_vec_to_string};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyValueKind {
    Map,
    MultiMap,
    HashMap,
    HashMultiMap,
}

impl KeyValueKind {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            KeyValueKind::Map | KeyValueKind::MultiMap => {
                Capabilities::new(true, false, false, true)
            }
            KeyValueKind::HashMap | KeyValueKind::HashMultiMap => {
                Capabilities::new(true, false, false, false)
            }
        }
    }
}

impl Display for KeyValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                KeyValueKind::Map => "map",
                KeyValueKind::MultiMap => "multi-map",
                KeyValueKind::HashMap => "hash map",
                KeyValueKind::HashMultiMap => "hash multi-map",
            }
        )
    }
}

pub trait KeyValueAdapter<K, V> {
    const KIND: KeyValueKind;

    /// Maps replace the value of an existing key, multi-maps keep both.
    fn add_value(&mut self, key: K, value: V);

    fn contains(&self, key: &K) -> bool;

    fn clear(&mut self);

    /// Number of stored values, not keys.
    fn size(&self) -> usize;

    fn keys(&self) -> Vec<String>;

    /// `key=value` pairs, one per stored value.
    fn pairs(&self) -> Vec<String>;

    fn capabilities(&self) -> Capabilities {
        Self::KIND.capabilities()
    }

    fn sort(&mut self) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedOperation(
            "sort",
            Self::KIND.to_string(),
        ))
    }

    /// Whether any of `keys` is present.
    fn has_intersection(&self, keys: &[K]) -> bool {
        keys.iter().any(|key| self.contains(key))
    }

    fn render(&self) -> String {
        string_vec_to_string(&self.pairs(), true)
    }
}

fn pair<K: Display, V: Display>(key: &K, value: &V) -> String {
    format!("{}={}", key, value)
}

pub struct MapAdapter<'a, K, V>(pub &'a mut BTreeMap<K, V>);

impl<'a, K: Ord + Display, V: Display> KeyValueAdapter<K, V> for MapAdapter<'a, K, V> {
    const KIND: KeyValueKind = KeyValueKind::Map;

    fn add_value(&mut self, key: K, value: V) {
        self.0.insert(key, value);
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().map(|x| x.to_string()).collect()
    }

    fn pairs(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| pair(k, v)).collect()
    }
}

pub struct MultiMapAdapter<'a, K, V>(pub &'a mut BTreeMap<K, Vec<V>>);

impl<'a, K: Ord + Display, V: Display> KeyValueAdapter<K, V> for MultiMapAdapter<'a, K, V> {
    const KIND: KeyValueKind = KeyValueKind::MultiMap;

    fn add_value(&mut self, key: K, value: V) {
        self.0.entry(key).or_default().push(value);
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().map(|x| x.to_string()).collect()
    }

    fn pairs(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| pair(k, v)))
            .collect()
    }
}

pub struct HashMapAdapter<'a, K, V>(pub &'a mut HashMap<K, V>);

impl<'a, K: Eq + Hash + Display, V: Display> KeyValueAdapter<K, V> for HashMapAdapter<'a, K, V> {
    const KIND: KeyValueKind = KeyValueKind::HashMap;

    fn add_value(&mut self, key: K, value: V) {
        self.0.insert(key, value);
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().map(|x| x.to_string()).collect()
    }

    fn pairs(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| pair(k, v)).collect()
    }
}

pub struct HashMultiMapAdapter<'a, K, V>(pub &'a mut HashMap<K, Vec<V>>);

impl<'a, K: Eq + Hash + Display, V: Display> KeyValueAdapter<K, V>
    for HashMultiMapAdapter<'a, K, V>
{
    const KIND: KeyValueKind = KeyValueKind::HashMultiMap;

    fn add_value(&mut self, key: K, value: V) {
        self.0.entry(key).or_default().push(value);
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().map(|x| x.to_string()).collect()
    }

    fn pairs(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| pair(k, v)))
            .collect()
    }
}

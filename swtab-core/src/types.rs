use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Result, SwtabError};

/// Gap character used by ssearch36 in aligned sequences.
pub const GAP: char = '-';

/// One pairwise alignment as an ordered set of `field -> value` pairs.
///
/// Field order is the order in which the fields were first inserted, which
/// is also the default output column order. Records hold only what the
/// aligner reported; accessors fail with [`SwtabError::MissingField`] rather
/// than inventing defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentRecord {
    fields: Vec<(String, String)>,
}

impl AlignmentRecord {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set `key` to `value`, keeping the original position of an existing key.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_field<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Append `value` to the field `key`, creating it if needed.
    pub fn append(&mut self, key: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => slot.push_str(value),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a field that the caller cannot do without.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| SwtabError::missing_field(key))
    }

    /// Look up a required field and parse it as an integer coordinate.
    pub fn require_usize(&self, key: &str) -> Result<usize> {
        let value = self.require(key)?;
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| SwtabError::invalid_number(key, value))
    }

    /// Parse `key` as an unsigned integer if the record has it.
    pub fn optional_usize(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            Some(_) => self.require_usize(key).map(Some),
            None => Ok(None),
        }
    }

    /// Look up a required field and parse it as a finite floating point score.
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        let value = self.require(key)?;
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SwtabError::invalid_number(key, value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AlignmentRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = AlignmentRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for AlignmentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

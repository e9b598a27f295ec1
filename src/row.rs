/*!
Dict rows: the mapping from field name to value produced for each data record.
*/
use std::fmt;

use hashbrown::hash_map::{self, HashMap};

/// A key in a [`DictRow`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A field name (or a named overflow key).
    Name(String),
    /// The unnamed key. Surplus values are stored here unless another overflow key is set.
    Unnamed,
}
impl From<&str> for Key {
    fn from(name: &str) -> Key {
        Key::Name(name.to_string())
    }
}
impl From<String> for Key {
    fn from(name: String) -> Key {
        Key::Name(name)
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Key::Name(ref name) => write!(f, "{}", name),
            Key::Unnamed => write!(f, "<unnamed>"),
        }
    }
}

/// A value in a [`DictRow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A decoded field.
    Text(String),
    /// The values beyond the last field name, in order.
    Rest(Vec<String>),
    /// No value: the record was shorter than the field name list and no default was set.
    Missing,
}
impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Text(ref text) => Some(text),
            _ => None,
        }
    }
    pub fn is_missing(&self) -> bool {
        matches!(*self, Value::Missing)
    }
}
impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Text(text.to_string())
    }
}
impl From<String> for Value {
    fn from(text: String) -> Value {
        Value::Text(text)
    }
}
impl<S: Into<String>> From<Vec<S>> for Value {
    fn from(rest: Vec<S>) -> Value {
        Value::Rest(rest.into_iter().map(Into::into).collect())
    }
}

/// One data record, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictRow {
    fields: HashMap<Key, Value>,
}

impl DictRow {
    /// Zip `row` against `fieldnames`.
    ///
    /// Values beyond the last field name are collected under `rest_key`; field names beyond the
    /// end of `row` map to `rest_value` (or `Value::Missing`). Later duplicates of a key overwrite
    /// earlier ones.
    pub fn align(
        fieldnames: &[String],
        mut row: Vec<String>,
        rest_key: &Key,
        rest_value: Option<&str>,
    ) -> DictRow {
        let n_fields = fieldnames.len();
        let n_values = row.len();
        let rest = if n_values > n_fields { row.split_off(n_fields) } else { vec![] };

        let mut fields: HashMap<Key, Value> = fieldnames
            .iter()
            .cloned()
            .map(Key::Name)
            .zip(row.into_iter().map(Value::Text))
            .collect();
        if n_values > n_fields {
            fields.insert(rest_key.clone(), Value::Rest(rest));
        } else {
            for name in &fieldnames[n_values..] {
                let value = match rest_value {
                    Some(default) => Value::Text(default.to_string()),
                    None => Value::Missing,
                };
                fields.insert(Key::Name(name.clone()), value);
            }
        }
        DictRow { fields }
    }

    /// The value for field `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(&Key::from(name))
    }
    /// The value stored under `key`, which may be an overflow key.
    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        self.fields.get(key)
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn contains_key(&self, key: &Key) -> bool {
        self.fields.contains_key(key)
    }
    pub fn iter(&self) -> hash_map::Iter<'_, Key, Value> {
        self.fields.iter()
    }
    pub fn into_map(self) -> HashMap<Key, Value> {
        self.fields
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for DictRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> DictRow {
        DictRow {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for DictRow {
    type Item = (Key, Value);
    type IntoIter = hash_map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a DictRow {
    type Item = (&'a Key, &'a Value);
    type IntoIter = hash_map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

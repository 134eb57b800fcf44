//! Attribute sets attached to block and inline constructs.

use std::collections::BTreeMap;

use crate::sx::Value;

/// The default attribute's key: a positional class or modifier written as
/// `{=value}` or as the syntax word of a verbatim/region opening line.
pub const DEFAULT_KEY: &str = "";

/// An attribute set.
///
/// Keys iterate alphabetically, which makes the encoded association list
/// deterministic.  Repeated `.class` contributions accumulate into one
/// space-joined `class` value; every other repeated key overwrites.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    map: BTreeMap<String, String>,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_owned(), value.to_owned());
    }

    pub fn set_default(&mut self, value: &str) {
        self.set(DEFAULT_KEY, value);
    }

    pub fn add_class(&mut self, class: &str) {
        match self.map.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            _ => {
                self.map.insert("class".to_owned(), class.to_owned());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes the set as the association list `((key . value) …)`.
    pub fn to_value(&self) -> Value {
        Value::list(
            self.map
                .iter()
                .map(|(k, v)| Value::cons(Value::string(k.as_str()), Value::string(v.as_str())))
                .collect::<Vec<_>>(),
        )
    }

    /// Decodes an association list back into a set.  Non-pair elements and
    /// non-string keys or values are ignored; a malformed attribute never
    /// aborts evaluation.
    pub fn from_value(v: &Value) -> Attributes {
        let mut a = Attributes::new();
        for item in v.iter() {
            if let Some((key, value)) = item.as_pair() {
                if let (Some(key), Some(value)) = (key.as_str(), value.as_str()) {
                    a.set(key, value);
                }
            }
        }
        a
    }
}

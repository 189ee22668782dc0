//! Query parameter sets for JSON protocol calls.

use std::collections::BTreeMap;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// `key=value`; omitted from the URL when empty
    Scalar(String),
    /// `key[]=v1&key[]=v2`; empty elements are kept
    List(Vec<String>),
    /// `key[sub1]=v1&key[sub2]=v2`
    Map(BTreeMap<String, String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(entries: BTreeMap<String, String>) -> Self {
        ParamValue::Map(entries)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ParamValue {
    fn from(entries: [(&str, &str); N]) -> Self {
        ParamValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Ordered parameter set for one `send_json` call.
///
/// The `action` parameter is mandatory and held apart from the rest, so a
/// set without one cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    action: String,
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    /// Start a parameter set for the given action
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Parameters::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a parameter, replacing an existing key in place.
    ///
    /// A scalar `action` replaces the action; other shapes for `action` are
    /// ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();

        if key == "action" {
            match value {
                ParamValue::Scalar(action) => self.action = action,
                other => tracing::warn!("Ignoring non-scalar action parameter: {:?}", other),
            }
            return;
        }

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Action this call performs
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Look up a non-action parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate non-action parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of non-action parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether only the action is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

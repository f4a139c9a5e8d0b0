use crate::SetupError;
use serde::{Deserialize, Serialize};

/// Raw `name -> value` attributes of one node, in declaration order.
///
/// The host fills the store before setup; nodes only read from it afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeStore {
    entries: Vec<(String, String)>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get required attribute or return a setup error
    pub fn require(&self, name: &str) -> Result<&str, SetupError> {
        self.get(name)
            .ok_or_else(|| SetupError::MissingAttribute(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = AttributeStore::new();
        for (name, value) in iter {
            store.set(name, value);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order_and_replaces_in_place() {
        let mut attrs = AttributeStore::new()
            .with("channel", "A")
            .with("timeout", "1.0");
        attrs.set("channel", "B");

        let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["channel", "timeout"]);
        assert_eq!(attrs.get("channel"), Some("B"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn require_reports_missing_name() {
        let attrs = AttributeStore::new();
        assert_eq!(
            attrs.require("channel"),
            Err(SetupError::MissingAttribute("channel".to_string()))
        );
    }
}

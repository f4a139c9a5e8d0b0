//! Resolution of the value an instruction operates on.
//!
//! A value comes either from a workspace variable (`varName`) or from an
//! inline literal (`type` + `value`). When both are given, `varName` wins and
//! the literal is ignored.

use crate::{AttributeStore, NodeError, TypeDescriptor, TypedValue, Workspace};

pub const VAR_NAME_ATTRIBUTE: &str = "varName";
pub const TYPE_ATTRIBUTE: &str = "type";
pub const VALUE_ATTRIBUTE: &str = "value";

/// Where a node's value comes from, as decided by its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource<'a> {
    Workspace(&'a str),
    Literal { ty: &'a str, value: &'a str },
}

impl<'a> ValueSource<'a> {
    /// Picks the active source, or `None` if neither is configured.
    pub fn select(attributes: &'a AttributeStore) -> Option<Self> {
        if let Some(var_name) = attributes.get(VAR_NAME_ATTRIBUTE) {
            if attributes.has(TYPE_ATTRIBUTE) || attributes.has(VALUE_ATTRIBUTE) {
                tracing::debug!(
                    "Both '{}' and a literal are set; using workspace variable '{}'",
                    VAR_NAME_ATTRIBUTE,
                    var_name
                );
            }
            return Some(ValueSource::Workspace(var_name));
        }
        match (
            attributes.get(TYPE_ATTRIBUTE),
            attributes.get(VALUE_ATTRIBUTE),
        ) {
            (Some(ty), Some(value)) => Some(ValueSource::Literal { ty, value }),
            _ => None,
        }
    }
}

/// Produces the typed value described by `attributes`.
pub fn resolve(
    attributes: &AttributeStore,
    workspace: &dyn Workspace,
) -> Result<TypedValue, NodeError> {
    let source = ValueSource::select(attributes).ok_or_else(|| {
        NodeError::Configuration(format!(
            "neither '{}' nor '{}'/'{}' attributes are set",
            VAR_NAME_ATTRIBUTE, TYPE_ATTRIBUTE, VALUE_ATTRIBUTE
        ))
    })?;

    match source {
        ValueSource::Workspace(name) => workspace
            .get_value(name)
            .ok_or_else(|| NodeError::UnavailableSource(name.to_string())),
        ValueSource::Literal { ty, value } => {
            let ty = TypeDescriptor::parse(ty).map_err(NodeError::TypeParse)?;
            TypedValue::parse(ty, value).map_err(NodeError::ValueParse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScalarType, Value};
    use std::collections::HashMap;

    struct MapWorkspace(HashMap<String, TypedValue>);

    impl Workspace for MapWorkspace {
        fn get_value(&self, name: &str) -> Option<TypedValue> {
            self.0.get(name).cloned()
        }

        fn set_value(&self, _name: &str, _value: TypedValue) -> bool {
            false
        }
    }

    fn workspace_with_x() -> MapWorkspace {
        let mut map = HashMap::new();
        map.insert(
            "x".to_string(),
            TypedValue::scalar(ScalarType::UInt32, 42u64).unwrap(),
        );
        MapWorkspace(map)
    }

    #[test]
    fn workspace_variable_takes_precedence_over_literal() {
        let attrs = AttributeStore::new()
            .with("varName", "x")
            .with("type", r#"{"type":"string"}"#)
            .with("value", "ignored");

        let resolved = resolve(&attrs, &workspace_with_x()).unwrap();
        assert_eq!(resolved.ty(), &TypeDescriptor::Scalar(ScalarType::UInt32));
        assert_eq!(resolved.value(), &Value::UInt(42));
    }

    #[test]
    fn literal_is_parsed_against_its_type() {
        let attrs = AttributeStore::new()
            .with("type", r#"{"type":"float64"}"#)
            .with("value", "1.5");

        let resolved = resolve(&attrs, &workspace_with_x()).unwrap();
        assert_eq!(resolved.value(), &Value::Float(1.5));
    }

    #[test]
    fn missing_sources_is_a_configuration_error() {
        let attrs = AttributeStore::new().with("type", r#"{"type":"bool"}"#);
        assert!(matches!(
            resolve(&attrs, &workspace_with_x()),
            Err(NodeError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_variable_is_unavailable() {
        let attrs = AttributeStore::new().with("varName", "nope");
        assert_eq!(
            resolve(&attrs, &workspace_with_x()),
            Err(NodeError::UnavailableSource("nope".to_string()))
        );
    }

    #[test]
    fn type_errors_come_before_value_errors() {
        let attrs = AttributeStore::new()
            .with("type", "not json")
            .with("value", "also not json");
        assert!(matches!(
            resolve(&attrs, &workspace_with_x()),
            Err(NodeError::TypeParse(_))
        ));

        let attrs = AttributeStore::new()
            .with("type", r#"{"type":"int8"}"#)
            .with("value", "1000");
        assert!(matches!(
            resolve(&attrs, &workspace_with_x()),
            Err(NodeError::ValueParse(_))
        ));
    }
}

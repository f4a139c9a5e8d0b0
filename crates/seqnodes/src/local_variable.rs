use seqcore::resolver::{TYPE_ATTRIBUTE, VALUE_ATTRIBUTE};
use seqcore::{
    AttributeStore, NodeError, RegistryError, SetupError, TypeDescriptor, TypedValue, Variable,
};
use seqruntime::{NodeDescriptor, VariableRegistry};
use std::sync::{PoisonError, RwLock};

pub const LOCAL_VARIABLE_TYPE: &str = "Local";

/// Plain in-memory workspace variable with a declared type.
pub struct LocalVariable {
    attributes: AttributeStore,
    ty: Option<TypeDescriptor>,
    initial: Option<TypedValue>,
    value: RwLock<Option<TypedValue>>,
}

impl LocalVariable {
    pub fn new() -> Self {
        Self {
            attributes: AttributeStore::new(),
            ty: None,
            initial: None,
            value: RwLock::new(None),
        }
    }

    fn create() -> Box<dyn Variable> {
        Box::new(Self::new())
    }
}

impl Default for LocalVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl Variable for LocalVariable {
    fn variable_type(&self) -> &str {
        LOCAL_VARIABLE_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        let ty = TypeDescriptor::parse(self.attributes.require(TYPE_ATTRIBUTE)?)
            .map_err(SetupError::TypeParse)?;
        self.initial = self
            .attributes
            .get(VALUE_ATTRIBUTE)
            .map(|text| TypedValue::parse(ty.clone(), text))
            .transpose()
            .map_err(SetupError::ValueParse)?;
        self.ty = Some(ty);
        *self.value.get_mut().unwrap_or_else(PoisonError::into_inner) = self.initial.clone();
        Ok(())
    }

    fn get_value(&self) -> Option<TypedValue> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_value(&self, value: TypedValue) -> Result<(), NodeError> {
        let ty = self.ty.as_ref().ok_or(NodeError::NotSetup)?;
        let converted = value.convert_to(ty).ok_or_else(|| NodeError::TypeMismatch {
            expected: ty.to_string(),
            actual: value.ty().to_string(),
        })?;
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(converted);
        Ok(())
    }

    fn reset(&mut self) {
        *self.value.get_mut().unwrap_or_else(PoisonError::into_inner) = self.initial.clone();
    }
}

pub fn register(registry: &VariableRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(LOCAL_VARIABLE_TYPE, LocalVariable::create)
            .with_metadata("workspace", "In-memory variable of a declared type"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqcore::{ScalarType, Value};

    fn setup_local(ty: &str, value: Option<&str>) -> Result<LocalVariable, SetupError> {
        let mut var = LocalVariable::new();
        var.attributes_mut().set(TYPE_ATTRIBUTE, ty);
        if let Some(value) = value {
            var.attributes_mut().set(VALUE_ATTRIBUTE, value);
        }
        var.setup()?;
        Ok(var)
    }

    #[test]
    fn unset_value_is_unavailable() {
        let var = setup_local(r#"{"type":"int32"}"#, None).unwrap();
        assert!(!var.is_available());
        assert!(var.get_value().is_none());
    }

    #[test]
    fn set_value_converts_to_declared_type() {
        let var = setup_local(r#"{"type":"float32"}"#, Some("1")).unwrap();
        var.set_value(TypedValue::scalar(ScalarType::UInt8, 3u64).unwrap())
            .unwrap();
        assert_eq!(var.get_value().unwrap().value(), &Value::Float(3.0));

        let err = var
            .set_value(TypedValue::scalar(ScalarType::String, "x").unwrap())
            .unwrap_err();
        assert!(matches!(err, NodeError::TypeMismatch { .. }));
    }

    #[test]
    fn reset_restores_initial_value() {
        let mut var = setup_local(r#"{"type":"bool"}"#, Some("false")).unwrap();
        var.set_value(TypedValue::scalar(ScalarType::Bool, true).unwrap())
            .unwrap();
        var.reset();
        assert_eq!(var.get_value().unwrap().value(), &Value::Bool(false));
    }

    #[test]
    fn malformed_type_fails_setup() {
        assert!(matches!(
            setup_local("bool", None),
            Err(SetupError::TypeParse(_))
        ));
        assert!(matches!(
            setup_local(r#"{"type":"bool"}"#, Some("maybe")),
            Err(SetupError::ValueParse(_))
        ));
    }
}

use crate::{SetupError, TypedValue, Variable};
use std::collections::BTreeMap;

/// Named-value store that instructions read and write by key.
pub trait Workspace: Send + Sync {
    /// Current value of `name`, or `None` if it is unknown or not available.
    fn get_value(&self, name: &str) -> Option<TypedValue>;

    /// Writes `value` to `name`; false if unknown or the value does not fit.
    fn set_value(&self, name: &str, value: TypedValue) -> bool;
}

/// Workspace backed by the variables declared in a procedure.
#[derive(Default)]
pub struct ProcedureWorkspace {
    variables: BTreeMap<String, Box<dyn Variable>>,
}

impl ProcedureWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable; false if the name is taken.
    pub fn add_variable(&mut self, name: impl Into<String>, variable: Box<dyn Variable>) -> bool {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return false;
        }
        self.variables.insert(name, variable);
        true
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.variables
            .get(name)
            .is_some_and(|v| v.is_available())
    }

    /// Sets up every variable, stopping at the first failure.
    pub fn setup(&mut self) -> Result<(), SetupError> {
        for (name, variable) in self.variables.iter_mut() {
            variable.setup().map_err(|e| {
                tracing::error!("Setup of variable '{}' failed: {}", name, e);
                e
            })?;
            tracing::debug!("Variable '{}' ({}) ready", name, variable.variable_type());
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        for variable in self.variables.values_mut() {
            variable.reset();
        }
    }
}

impl Workspace for ProcedureWorkspace {
    fn get_value(&self, name: &str) -> Option<TypedValue> {
        self.variables.get(name).and_then(|v| v.get_value())
    }

    fn set_value(&self, name: &str, value: TypedValue) -> bool {
        match self.variables.get(name) {
            Some(variable) => match variable.set_value(value) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Could not set variable '{}': {}", name, e);
                    false
                }
            },
            None => false,
        }
    }
}

use crate::AttributeStore;
use serde::{Deserialize, Serialize};

/// Complete procedure definition, as loaded from a procedure file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workspace variables; `name` is the workspace key.
    #[serde(default)]
    pub variables: Vec<NodeSpec>,
    /// Instructions, executed in order.
    #[serde(default)]
    pub instructions: Vec<NodeSpec>,
}

impl Procedure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            variables: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, variable: NodeSpec) -> &mut Self {
        self.variables.push(variable);
        self
    }

    pub fn add_instruction(&mut self, instruction: NodeSpec) -> &mut Self {
        self.instructions.push(instruction);
        self
    }
}

/// A node in a procedure: registered type name plus raw attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: AttributeStore,
}

impl NodeSpec {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            name: None,
            attributes: AttributeStore::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }
}

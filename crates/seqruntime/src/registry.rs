use once_cell::sync::Lazy;
use seqcore::{Instruction, RegistryError, Variable};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Creates a fresh, unconfigured node.
pub type NodeFactory<T> = fn() -> Box<T>;

/// One registrable node type
pub struct NodeDescriptor<T: ?Sized> {
    pub type_name: &'static str,
    pub factory: NodeFactory<T>,
    pub metadata: NodeMetadata,
}

impl<T: ?Sized> NodeDescriptor<T> {
    pub fn new(type_name: &'static str, factory: NodeFactory<T>) -> Self {
        Self {
            type_name,
            factory,
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, category: &str, description: &str) -> Self {
        self.metadata = NodeMetadata {
            description: description.to_string(),
            category: category.to_string(),
        };
        self
    }
}

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub description: String,
    pub category: String,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
        }
    }
}

/// Mapping from type name to node factory.
///
/// Registration is first-wins: a second registration of the same name is
/// refused and logged. Lookups only take a read lock and can run from any
/// number of threads.
pub struct TypeRegistry<T: ?Sized> {
    kind: &'static str,
    descriptors: RwLock<HashMap<String, NodeDescriptor<T>>>,
}

impl<T: ?Sized> TypeRegistry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register a node type
    pub fn register(&self, descriptor: NodeDescriptor<T>) -> Result<(), RegistryError> {
        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if descriptors.contains_key(descriptor.type_name) {
            tracing::warn!(
                "Refusing duplicate {} type registration: {}",
                self.kind,
                descriptor.type_name
            );
            return Err(RegistryError::DuplicateRegistration {
                registry: self.kind.to_string(),
                type_name: descriptor.type_name.to_string(),
            });
        }
        tracing::info!("Registering {} type: {}", self.kind, descriptor.type_name);
        descriptors.insert(descriptor.type_name.to_string(), descriptor);
        Ok(())
    }

    /// Create a node instance; `None` if the type is unknown
    pub fn create(&self, type_name: &str) -> Option<Box<T>> {
        let factory = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .map(|d| d.factory)?;
        Some(factory())
    }

    /// Like [`TypeRegistry::create`], with a typed error for unknown names.
    pub fn try_create(&self, type_name: &str) -> Result<Box<T>, RegistryError> {
        self.create(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                registry: self.kind.to_string(),
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_name)
    }

    /// Get all registered type names, sorted
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    pub fn get_metadata(&self, type_name: &str) -> Option<NodeMetadata> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .map(|d| d.metadata.clone())
    }
}

pub type InstructionRegistry = TypeRegistry<dyn Instruction>;
pub type VariableRegistry = TypeRegistry<dyn Variable>;

static INSTRUCTION_REGISTRY: Lazy<InstructionRegistry> =
    Lazy::new(|| TypeRegistry::new("instruction"));

static VARIABLE_REGISTRY: Lazy<VariableRegistry> = Lazy::new(|| TypeRegistry::new("variable"));

/// Process-wide instruction registry that plugins register into.
pub fn global_instruction_registry() -> &'static InstructionRegistry {
    &INSTRUCTION_REGISTRY
}

/// Process-wide variable registry that plugins register into.
pub fn global_variable_registry() -> &'static VariableRegistry {
    &VARIABLE_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seqcore::{AttributeStore, ExecutionStatus, UserInterface, Workspace};
    use std::sync::Arc;

    struct Marker {
        name: &'static str,
        attributes: AttributeStore,
    }

    #[async_trait]
    impl Instruction for Marker {
        fn instruction_type(&self) -> &str {
            self.name
        }

        fn attributes(&self) -> &AttributeStore {
            &self.attributes
        }

        fn attributes_mut(&mut self) -> &mut AttributeStore {
            &mut self.attributes
        }

        async fn execute(&self, _ui: &dyn UserInterface, _ws: &dyn Workspace) -> ExecutionStatus {
            ExecutionStatus::Success
        }
    }

    fn first() -> Box<dyn Instruction> {
        Box::new(Marker {
            name: "first",
            attributes: AttributeStore::new(),
        })
    }

    fn second() -> Box<dyn Instruction> {
        Box::new(Marker {
            name: "second",
            attributes: AttributeStore::new(),
        })
    }

    #[test]
    fn duplicate_registration_keeps_first_variant() {
        let registry = InstructionRegistry::new("instruction");

        assert!(registry.register(NodeDescriptor::new("Dup", first)).is_ok());
        let err = registry
            .register(NodeDescriptor::new("Dup", second))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                registry: "instruction".to_string(),
                type_name: "Dup".to_string()
            }
        );

        let node = registry.create("Dup").unwrap();
        assert_eq!(node.instruction_type(), "first");
        assert_eq!(registry.list_types(), vec!["Dup".to_string()]);
    }

    #[test]
    fn unknown_type_creates_nothing() {
        let registry = InstructionRegistry::new("instruction");
        assert!(registry.create("Missing").is_none());
        assert!(matches!(
            registry.try_create("Missing"),
            Err(RegistryError::UnknownType { .. })
        ));
    }

    #[test]
    fn create_is_safe_from_many_threads() {
        let registry = Arc::new(InstructionRegistry::new("instruction"));
        registry
            .register(NodeDescriptor::new("Marker", first).with_metadata("test", "marker"))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|_| registry.create("Marker").is_some())
                        .count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 100);
        }
        assert_eq!(registry.get_metadata("Marker").unwrap().category, "test");
    }

    #[test]
    fn each_create_returns_a_fresh_node() {
        let registry = InstructionRegistry::new("instruction");
        registry.register(NodeDescriptor::new("Marker", first)).unwrap();

        let mut a = registry.create("Marker").unwrap();
        a.attributes_mut().set("channel", "X");
        let b = registry.create("Marker").unwrap();
        assert!(b.attributes().is_empty());
    }
}

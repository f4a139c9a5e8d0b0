//! Sequencer host runtime
//!
//! This crate holds the process-wide type registries plugins register into,
//! the procedure loader, and a sequential runner that drives the node
//! lifecycle (setup, execute, reset).

mod loader;
mod registry;
mod runner;
mod runtime;

pub use loader::load_procedure;
pub use registry::{
    global_instruction_registry, global_variable_registry, InstructionRegistry, NodeDescriptor,
    NodeFactory, NodeMetadata, TypeRegistry, VariableRegistry,
};
pub use runner::{ProcedureRunner, RunResult};
pub use runtime::{RuntimeConfig, Sequencer};

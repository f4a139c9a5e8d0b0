use crate::registry::{
    global_instruction_registry, global_variable_registry, InstructionRegistry, VariableRegistry,
};
use chrono::Utc;
use seqcore::{
    EventBus, ExecutionEvent, ExecutionId, ExecutionStatus, Instruction, Procedure,
    ProcedureWorkspace, SequencerError,
};
use std::collections::HashSet;
use std::time::Instant;

/// Runs procedures: builds nodes through the registries, sets them up and
/// executes the instructions in order until one fails.
pub struct ProcedureRunner {
    instructions: &'static InstructionRegistry,
    variables: &'static VariableRegistry,
}

impl ProcedureRunner {
    /// Runner over the process-wide registries
    pub fn new() -> Self {
        Self::with_registries(global_instruction_registry(), global_variable_registry())
    }

    pub fn with_registries(
        instructions: &'static InstructionRegistry,
        variables: &'static VariableRegistry,
    ) -> Self {
        Self {
            instructions,
            variables,
        }
    }

    /// Checks that every node type is registered and variable names are unique.
    pub fn validate(&self, procedure: &Procedure) -> Result<(), SequencerError> {
        let mut names = HashSet::new();
        for spec in &procedure.variables {
            let name = spec.name.as_deref().ok_or_else(|| {
                SequencerError::Procedure(format!("{} variable without a name", spec.node_type))
            })?;
            if !names.insert(name) {
                return Err(SequencerError::Procedure(format!(
                    "Duplicate variable name: {}",
                    name
                )));
            }
            if !self.variables.contains(&spec.node_type) {
                return Err(unknown(self.variables.kind(), &spec.node_type));
            }
        }
        for spec in &procedure.instructions {
            if !self.instructions.contains(&spec.node_type) {
                return Err(unknown(self.instructions.kind(), &spec.node_type));
            }
        }
        Ok(())
    }

    /// Execute a procedure and return the overall outcome
    pub async fn run(
        &self,
        procedure: &Procedure,
        event_bus: &EventBus,
    ) -> Result<RunResult, SequencerError> {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();

        event_bus.emit(ExecutionEvent::ProcedureStarted {
            execution_id,
            procedure: procedure.name.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!("Starting procedure: {}", procedure.name);

        // Nodes that failed setup are dropped here, which releases anything
        // their variables already acquired.
        let (mut workspace, mut instructions) = match self.prepare(procedure) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!("Procedure '{}' could not be set up: {}", procedure.name, e);
                event_bus.emit(ExecutionEvent::ProcedureCompleted {
                    execution_id,
                    status: ExecutionStatus::Failure,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        let mut status = ExecutionStatus::Success;
        let mut executed = 0;
        for (index, instruction) in instructions.iter().enumerate() {
            let name = procedure.instructions[index].name.clone();
            event_bus.emit(ExecutionEvent::InstructionStarted {
                execution_id,
                index,
                instruction_type: instruction.instruction_type().to_string(),
                name,
                timestamp: Utc::now(),
            });

            let emitter = event_bus.create_emitter(execution_id, index);
            let start = Instant::now();
            let outcome = instruction.execute(&emitter, &workspace).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            executed += 1;

            event_bus.emit(ExecutionEvent::InstructionCompleted {
                execution_id,
                index,
                status: outcome,
                duration_ms,
                timestamp: Utc::now(),
            });

            if !outcome.is_success() {
                tracing::error!(
                    "Instruction {} ({}) failed",
                    index,
                    instruction.instruction_type()
                );
                status = ExecutionStatus::Failure;
                break;
            }
            tracing::debug!("Instruction {} completed in {}ms", index, duration_ms);
        }

        for instruction in instructions.iter_mut() {
            instruction.reset();
        }
        workspace.reset();

        let duration_ms = start_time.elapsed().as_millis() as u64;
        event_bus.emit(ExecutionEvent::ProcedureCompleted {
            execution_id,
            status,
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(
            "Procedure '{}' finished with {:?} in {}ms",
            procedure.name,
            status,
            duration_ms
        );

        Ok(RunResult {
            execution_id,
            status,
            executed_instructions: executed,
            total_instructions: procedure.instructions.len(),
        })
    }

    /// Instantiates and sets up every node of the procedure.
    fn prepare(
        &self,
        procedure: &Procedure,
    ) -> Result<(ProcedureWorkspace, Vec<Box<dyn Instruction>>), SequencerError> {
        self.validate(procedure)?;

        let mut workspace = ProcedureWorkspace::new();
        for spec in &procedure.variables {
            let mut variable = self.variables.try_create(&spec.node_type)?;
            *variable.attributes_mut() = spec.attributes.clone();
            let name = spec.name.clone().unwrap_or_default();
            workspace.add_variable(name, variable);
        }
        workspace.setup()?;

        let mut instructions = Vec::with_capacity(procedure.instructions.len());
        for (index, spec) in procedure.instructions.iter().enumerate() {
            let mut instruction = self.instructions.try_create(&spec.node_type)?;
            *instruction.attributes_mut() = spec.attributes.clone();
            if let Err(e) = instruction.setup() {
                tracing::error!("Setup of instruction {} ({}) failed: {}", index, spec.node_type, e);
                return Err(e.into());
            }
            instructions.push(instruction);
        }

        Ok((workspace, instructions))
    }
}

impl Default for ProcedureRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown(kind: &str, type_name: &str) -> SequencerError {
    SequencerError::Registry(seqcore::RegistryError::UnknownType {
        registry: kind.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Result of a procedure run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    pub executed_instructions: usize,
    pub total_instructions: usize,
}

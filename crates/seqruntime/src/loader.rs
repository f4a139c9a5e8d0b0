// crates/seqruntime/src/loader.rs
use seqcore::{Procedure, SequencerError};
use std::path::Path;

/// Reads a procedure definition from a JSON file.
pub fn load_procedure(path: impl AsRef<Path>) -> Result<Procedure, SequencerError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let procedure: Procedure = serde_json::from_str(&text)?;
    tracing::debug!(
        "Loaded procedure '{}' from {} ({} variables, {} instructions)",
        procedure.name,
        path.display(),
        procedure.variables.len(),
        procedure.instructions.len()
    );
    Ok(procedure)
}

//! Sequencer plugin nodes
//!
//! Channel instructions and variables plus a few simple workspace
//! instructions. Nothing is usable until [`register_all`] has put the node
//! types into the process-wide registries.

mod channel_read;
mod channel_write;
mod copy;
mod local_variable;
mod log;
mod server_variable;
mod util;
mod wait;

pub use channel_read::{ChannelReadInstruction, CHANNEL_READ_TYPE};
pub use channel_write::{ChannelWriteInstruction, CHANNEL_WRITE_TYPE};
pub use copy::{CopyInstruction, COPY_TYPE};
pub use local_variable::{LocalVariable, LOCAL_VARIABLE_TYPE};
pub use log::{LogInstruction, LOG_TYPE};
pub use server_variable::{ServerVariable, SERVER_VARIABLE_TYPE};
pub use wait::{WaitInstruction, WAIT_TYPE};

use seqruntime::{global_instruction_registry, global_variable_registry};
use std::sync::Once;

static REGISTER_ALL: Once = Once::new();

/// Register every plugin node type with the global registries.
///
/// Must run before any procedure is loaded. Later calls are no-ops.
pub fn register_all() {
    REGISTER_ALL.call_once(|| {
        let instructions = global_instruction_registry();
        let variables = global_variable_registry();
        let results = [
            channel_write::register(instructions),
            channel_read::register(instructions),
            log::register(instructions),
            copy::register(instructions),
            wait::register(instructions),
            server_variable::register(variables),
            local_variable::register(variables),
        ];
        for result in results {
            if let Err(e) = result {
                tracing::error!("Plugin registration failed: {}", e);
            }
        }
    });
}

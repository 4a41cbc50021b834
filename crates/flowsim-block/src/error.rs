use thiserror::Error;

use flowsim_core::{AgentId, BlockId};

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("agent {agent:?} was not admissible to block {block:?}: {reason}")]
    NotAdmissible { agent: AgentId, block: BlockId, reason: String },

    #[error("capacity violation in block {block:?}: {reason}")]
    CapacityViolation { block: BlockId, reason: String },

    #[error("required output slot not connected on block {block:?}: {slot}")]
    MissingRoute { block: BlockId, slot: String },

    #[error("cannot schedule during timed-event callback execution")]
    SchedulingLocked,
}

pub type BlockResult<T> = Result<T, BlockError>;

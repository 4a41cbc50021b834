use thiserror::Error;

use flowsim_block::BlockError;
use flowsim_resource::ResourceError;
use flowsim_schedule::SchedulerError;
use flowsim_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulator configuration error: {0}")]
    Config(String),

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("unknown block {0:?}")]
    UnknownBlock(flowsim_core::BlockId),

    #[error("unknown space {0:?}")]
    UnknownSpace(String),

    #[error("unknown resource pool {0:?}")]
    UnknownPool(flowsim_core::PoolId),
}

pub type SimResult<T> = Result<T, SimError>;

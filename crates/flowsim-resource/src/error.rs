use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource pool has no capacity for {requested} more unit(s), {available} available")]
    CapacityViolation { requested: usize, available: usize },

    #[error("resource {0} is not occupied, cannot release")]
    NotOccupied(flowsim_core::ResourceId),

    #[error("resource {0} not found in this pool")]
    NotFound(flowsim_core::ResourceId),
}

pub type ResourceResult<T> = Result<T, ResourceError>;

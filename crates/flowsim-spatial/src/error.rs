use thiserror::Error;

use flowsim_core::{AgentId, EntityId};

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from entity {from:?} to entity {to:?}")]
    NoRoute { from: EntityId, to: EntityId },

    #[error("agent {0:?} is already registered with this space")]
    AlreadyRegistered(AgentId),

    #[error("start or target position lies inside an obstacle")]
    Obstructed,

    #[error("registration rejected: {0}")]
    InvalidRegistration(String),

    #[error("entity {0:?} is not registered with this conveyor network")]
    EntityNotRegistered(EntityId),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

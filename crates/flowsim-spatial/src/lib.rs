//! Pluggable spatial managers: unobstructed movement, prism-obstacle
//! avoidance, grid-based pathfinding, and conveyor/turntable entity graphs.
//!
//! Every implementation but [`ConveyorSpace`] satisfies the shared
//! [`SpatialManager`] trait, registering agents by Cartesian start/target
//! points. `ConveyorSpace` routes between named entities instead of points
//! and so exposes its own `register`/`update` pair — see its module doc for
//! why that distinction is load-bearing rather than an inconsistency.

mod collision;
mod conveyor;
mod error;
mod grid;
mod manager;
mod movement;
mod no_collision;

pub use collision::{CollisionSpace, Obstacle};
pub use conveyor::{ConveyorSpace, EntityKind};
pub use error::{SpatialError, SpatialResult};
pub use grid::CollisionGridSpace;
pub use manager::{RegisterRequest, SpatialManager};
pub use no_collision::NoCollisionSpace;

//! Shared primitives used across every flowsim crate.
//!
//! | Module  | Contents                                              |
//! |---------|--------------------------------------------------------|
//! | `ids`   | Generational `Id`/`Slab` arena primitives               |
//! | `time`  | `Tick`, the engine's only notion of time                |
//! | `rng`   | `SimRng`, the simulator's single PRNG stream            |
//! | `point` | `Point3`, Cartesian geometry for the spatial managers   |

mod ids;
mod point;
mod rng;
mod time;

pub use ids::{AgentId, BlockId, EntityId, ObstacleId, PoolId, ResourceId, Slab, SlotId};
pub use point::Point3;
pub use rng::SimRng;
pub use time::Tick;

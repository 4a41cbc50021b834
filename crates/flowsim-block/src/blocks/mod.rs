//! The fixed taxonomy of block kinds. Each submodule is one `BlockBehavior`
//! implementation (or a small family of closely related ones).

mod combine;
mod delay;
mod gate;
mod if_block;
mod queue;
mod restricted_area;
mod seize_release;
mod sink;
mod source;
mod spatial_entry;
mod split;
mod switch;
#[cfg(test)]
mod test_support;

pub use combine::{ChildrenAgents, Combine, CONTAINER_SLOT, PICKUP_SLOT};
pub use delay::Delay;
pub use gate::{Gate, GateMode, GateState};
pub use if_block::If;
pub use queue::Queue;
pub use restricted_area::{RestrictedAreaEnd, RestrictedAreaStart, RestrictedAreaTag};
pub use seize_release::{ReleaseBlock, ResourceClaim, SeizeBlock};
pub use sink::Sink;
pub use source::Source;
pub use spatial_entry::SpatialEntry;
pub use split::{Split, CHILD_OUT, CONTAINER_OUT};
pub use switch::Switch;

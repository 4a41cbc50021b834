//! Block graph primitives.
//!
//! | module       | purpose                                                |
//! |--------------|---------------------------------------------------------|
//! | `error`      | `BlockError` / `BlockResult`                            |
//! | `behavior`   | `BlockBehavior` — the kind-specific logic trait          |
//! | `context`    | `TickCtx`, `DelayPort` — what a block invocation sees     |
//! | `block`      | `Block` / `BlockShell` — the shell/behavior split        |
//! | `blocks`     | the fixed taxonomy of concrete `BlockBehavior` kinds      |

mod behavior;
mod block;
mod blocks;
mod context;
mod error;

pub use behavior::BlockBehavior;
pub use block::{Block, BlockShell};
pub use blocks::{
    ChildrenAgents, Combine, Delay, Gate, GateMode, GateState, If, Queue, ReleaseBlock, ResourceClaim, RestrictedAreaEnd, RestrictedAreaStart,
    RestrictedAreaTag, SeizeBlock, Sink, Source, SpatialEntry, Split, Switch, CHILD_OUT, CONTAINER_OUT, CONTAINER_SLOT, PICKUP_SLOT,
};
pub use context::{DelayPort, TickCtx};
pub use error::{BlockError, BlockResult};

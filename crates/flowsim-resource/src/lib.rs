//! Seizable/releasable resource pools.
//!
//! | Module     | Contents                                    |
//! |------------|----------------------------------------------|
//! | `resource` | `ResourceAgent`, a single pooled unit         |
//! | `pool`     | `ResourcePool`, available/occupied bookkeeping|
//! | `error`    | `ResourceError`                               |

mod error;
mod pool;
mod resource;

pub use error::{ResourceError, ResourceResult};
pub use pool::ResourcePool;
pub use resource::ResourceAgent;

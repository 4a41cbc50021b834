//! Agent storage.
//!
//! | Module       | Contents                                             |
//! |--------------|-------------------------------------------------------|
//! | `agent`      | `Agent` record, `SpaceState` mirror                    |
//! | `component`  | `ComponentMap`/`ComponentVec` typed per-agent state    |
//! | `arena`      | `AgentArena`, the generational agent store             |

mod agent;
mod arena;
mod component;

pub use agent::{Agent, SpaceState};
pub use arena::AgentArena;
pub use component::{ComponentMap, ComponentVec, TypedComponentVec};

//! Tick-bucketed callback scheduling.
//!
//! | Module           | Contents                        |
//! |-------------------|----------------------------------|
//! | `timed_scheduler` | `TimedScheduler<Ctx>`            |
//! | `error`           | `SchedulerError`                 |

mod error;
mod timed_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use timed_scheduler::TimedScheduler;

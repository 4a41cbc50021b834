use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("cannot schedule a new event while the scheduler is firing due events")]
    Locked,

    #[error("a recurring event must have a non-zero interval")]
    ZeroInterval,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

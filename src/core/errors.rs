use super::types::{ContainerId, ProcessId, SimTime};

/// Contract violations raised by the engine and the step controller
///
/// Suspension is never an error; these only cover calls that can not be
/// honoured at all.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A put/get amount of zero
    InvalidAmount { container: String },
    /// A put/get amount that no level of the container could ever satisfy
    ExceedsCapacity {
        container: String,
        amount: u64,
        capacity: u64,
    },
    /// A container created with more initial stock than capacity
    InitialLevelExceedsCapacity {
        container: String,
        level: u64,
        capacity: u64,
    },
    /// Scheduling or running to a time earlier than the clock
    TimeInPast { requested: SimTime, now: SimTime },
    UnknownContainer(ContainerId),
    UnknownProcess(ProcessId),
    /// `step` called before `reset`
    NotReset,
    InvalidConfig(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidAmount { container } => {
                write!(f, "Invalid amount: requests on '{}' must be positive", container)
            }
            SimError::ExceedsCapacity {
                container,
                amount,
                capacity,
            } => write!(
                f,
                "Amount {} exceeds capacity {} of container '{}'",
                amount, capacity, container
            ),
            SimError::InitialLevelExceedsCapacity {
                container,
                level,
                capacity,
            } => write!(
                f,
                "Initial level {} exceeds capacity {} of container '{}'",
                level, capacity, container
            ),
            SimError::TimeInPast { requested, now } => {
                write!(f, "Time {} is before the current time {}", requested, now)
            }
            SimError::UnknownContainer(id) => write!(f, "Container '{}' not found", id),
            SimError::UnknownProcess(id) => write!(f, "Process '{}' not found", id),
            SimError::NotReset => write!(f, "Environment must be reset before stepping"),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

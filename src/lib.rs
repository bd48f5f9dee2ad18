pub mod core;
pub mod supply_chain;

// Re-export commonly used types
pub use crate::core::container::Container;
pub use crate::core::errors::SimError;
pub use crate::core::process::{Context, Process, Sequence, Yield};
pub use crate::core::simulation_engine::{Simulation, SimulationObserver};
pub use crate::core::types::{ContainerId, ProcessId, SimTime};
pub use crate::supply_chain::config::{DemandModel, SupplyChainConfig};
pub use crate::supply_chain::env::{Info, InfoValue, Observation, StepOutcome, SupplyChainEnv};

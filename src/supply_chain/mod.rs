//! Factory → warehouse → market model built on the core engine, plus the
//! step controller that exposes it to an external decision maker.

pub mod config;
pub mod env;
pub mod factory;
pub mod ledger;
pub mod market;
pub mod runner;
pub mod shipment;
pub mod warehouse;

pub use factory::{Factory, Produce};
pub use ledger::{ChainLedger, MarketState, StepTotals};
pub use market::{DemandDraw, Market};
pub use runner::{run_episode, run_episodes, EpisodeSummary};
pub use shipment::Shipment;
pub use warehouse::{HoldingCostAccrual, Warehouse};

use super::config::SupplyChainConfig;
use super::factory::Factory;
use super::ledger::ChainLedger;
use super::market::Market;
use super::shipment::Shipment;
use super::warehouse::Warehouse;
use crate::core::errors::SimError;
use crate::core::simulation_engine::Simulation;
use crate::core::types::SimTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What the controller sees after each reset/step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub factory_level: u64,
    pub warehouse_level: u64,
    pub market_demand: u64,
}

impl Observation {
    /// `[factory_level, warehouse_level, market_demand]`
    pub fn to_array(&self) -> [f32; 3] {
        [
            self.factory_level as f32,
            self.warehouse_level as f32,
            self.market_demand as f32,
        ]
    }
}

/// A single diagnostic value in `Info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

/// Diagnostics returned next to observations, ordered by key
pub type Info = BTreeMap<String, InfoValue>;

/// Result of one `step`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

struct Episode {
    id: Uuid,
    sim: Simulation<ChainLedger>,
    factory: Factory,
    warehouse: Warehouse,
    market: Market,
}

impl Episode {
    fn observe(&self) -> Result<Observation, SimError> {
        Ok(Observation {
            factory_level: self.sim.level(self.factory.inventory())?,
            warehouse_level: self.sim.level(self.warehouse.inventory())?,
            market_demand: self.sim.world().market.current_demand,
        })
    }
}

/// Step controller over a freshly built supply chain per episode
///
/// Each `step` turns one order decision into production and shipment
/// processes, advances the clock by exactly one tick, and turns the drained
/// ledger into a reward.
pub struct SupplyChainEnv {
    config: SupplyChainConfig,
    next_seed: u64,
    episode: Option<Episode>,
}

impl SupplyChainEnv {
    pub fn new(config: SupplyChainConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            next_seed: config.seed,
            config,
            episode: None,
        })
    }

    pub fn config(&self) -> &SupplyChainConfig {
        &self.config
    }

    /// Clamp a raw action into `[0, max_order]` and truncate it to units
    pub fn clamp_order(&self, action: f32) -> u64 {
        if action.is_nan() || action <= 0.0 {
            return 0;
        }
        let max = self.config.max_order as f64;
        (action as f64).min(max).trunc() as u64
    }

    /// Discard the current episode and start a new one
    ///
    /// Without an explicit seed, successive resets use consecutive seeds
    /// starting from the configured one.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), SimError> {
        let seed = seed.unwrap_or(self.next_seed);
        self.next_seed = seed.wrapping_add(1);
        self.episode = None;

        let config = &self.config;
        let mut sim = Simulation::new(ChainLedger::new());
        let factory = Factory::build(
            &mut sim,
            config.factory_name.clone(),
            config.factory_capacity,
            config.initial_factory_stock,
            config.factory_unit_time,
        )?;
        let warehouse = Warehouse::build(
            &mut sim,
            config.warehouse_name.clone(),
            config.warehouse_capacity,
            config.initial_warehouse_stock,
            config.holding_cost,
        )?;
        let market = Market::new(
            config.market_name.clone(),
            warehouse.inventory(),
            config.demand,
            config.unit_price,
        );

        sim.spawn(warehouse.charge_holding_cost());
        sim.spawn(market.serve_demand(seed)?);
        if config.initial_production > 0 {
            sim.spawn(factory.produce(config.initial_production));
        }

        // Warm-up tick
        sim.run_until(1)?;
        sim.world_mut().drain_step();

        let episode = Episode {
            id: Uuid::new_v4(),
            sim,
            factory,
            warehouse,
            market,
        };
        let observation = episode.observe()?;
        info!(
            "Episode {} reset (seed {}): factory {}, warehouse {}, demand {}",
            episode.id,
            seed,
            observation.factory_level,
            observation.warehouse_level,
            observation.market_demand
        );

        let mut info = Info::new();
        info.insert(
            "episode_id".to_string(),
            InfoValue::Text(episode.id.to_string()),
        );
        info.insert("seed".to_string(), InfoValue::Number(seed as f64));
        info.insert(
            "demand_mean".to_string(),
            InfoValue::Number(episode.market.demand_rate().mean()),
        );
        info.insert(
            "unit_price".to_string(),
            InfoValue::Number(episode.market.unit_price()),
        );
        self.episode = Some(episode);
        Ok((observation, info))
    }

    /// Apply one order decision and advance the simulation by one tick
    pub fn step(&mut self, action: f32) -> Result<StepOutcome, SimError> {
        let order = self.clamp_order(action);
        let config = &self.config;
        let episode = self.episode.as_mut().ok_or(SimError::NotReset)?;

        let factory_level = episode.sim.level(episode.factory.inventory())?;
        let accepted = order > 0 && factory_level >= order;
        if accepted {
            // Produce first: it suspends on its timer, so the shipment's pick-up
            // sees the stock level validated above
            episode.sim.spawn(episode.factory.produce(order));
            episode.sim.spawn(Shipment::new(
                episode.factory.inventory(),
                episode.warehouse.inventory(),
                order,
                config.transit_delay,
            ));
        } else if order > 0 {
            debug!(
                "{}: order of {} rejected, '{}' holds {}",
                episode.sim.now(),
                order,
                episode.factory.name(),
                factory_level
            );
        }

        let target = episode.sim.now() + 1;
        episode.sim.run_until(target)?;

        let totals = episode.sim.world_mut().drain_step();
        let reward = totals.revenue
            - totals.holding_cost
            - config.penalty_weight * totals.unmet_demand as f64;
        let observation = episode.observe()?;
        let now = episode.sim.now();
        let truncated = now >= config.max_steps;
        if truncated {
            info!(
                "Episode {} truncated at t={} ({} units still in transit)",
                episode.id,
                now,
                episode.sim.world().in_transit
            );
        }

        let mut info = Info::new();
        info.insert(
            "episode_id".to_string(),
            InfoValue::Text(episode.id.to_string()),
        );
        info.insert("time".to_string(), InfoValue::Number(now as f64));
        info.insert("order_accepted".to_string(), InfoValue::Flag(accepted));
        info.insert("revenue".to_string(), InfoValue::Number(totals.revenue));
        info.insert(
            "holding_cost".to_string(),
            InfoValue::Number(totals.holding_cost),
        );
        info.insert(
            "unmet_demand".to_string(),
            InfoValue::Number(totals.unmet_demand as f64),
        );
        info.insert(
            "in_transit".to_string(),
            InfoValue::Number(episode.sim.world().in_transit as f64),
        );

        Ok(StepOutcome {
            observation,
            reward,
            terminated: false,
            truncated,
            info,
        })
    }

    /// Current observation of the running episode
    pub fn observation(&self) -> Result<Observation, SimError> {
        self.episode.as_ref().ok_or(SimError::NotReset)?.observe()
    }

    pub fn now(&self) -> Option<SimTime> {
        self.episode.as_ref().map(|episode| episode.sim.now())
    }

    pub fn episode_id(&self) -> Option<Uuid> {
        self.episode.as_ref().map(|episode| episode.id)
    }

    /// The running simulation, for inspection
    pub fn simulation(&self) -> Option<&Simulation<ChainLedger>> {
        self.episode.as_ref().map(|episode| &episode.sim)
    }

    pub fn factory(&self) -> Option<&Factory> {
        self.episode.as_ref().map(|episode| &episode.factory)
    }

    pub fn warehouse(&self) -> Option<&Warehouse> {
        self.episode.as_ref().map(|episode| &episode.warehouse)
    }

    pub fn market(&self) -> Option<&Market> {
        self.episode.as_ref().map(|episode| &episode.market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply_chain::config::DemandModel;

    #[test]
    fn test_clamp_order() {
        let env = SupplyChainEnv::new(SupplyChainConfig::default()).unwrap();
        assert_eq!(env.clamp_order(-3.0), 0);
        assert_eq!(env.clamp_order(f32::NAN), 0);
        assert_eq!(env.clamp_order(42.9), 42);
        assert_eq!(env.clamp_order(1e9), 100);
        assert_eq!(env.clamp_order(f32::INFINITY), 100);
    }

    #[test]
    fn test_step_before_reset_fails() {
        let mut env = SupplyChainEnv::new(SupplyChainConfig::default()).unwrap();
        assert_eq!(env.step(10.0).unwrap_err(), SimError::NotReset);
        assert_eq!(env.observation().unwrap_err(), SimError::NotReset);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let config = SupplyChainConfig::default().with_capacities(0, 0);
        assert!(matches!(
            SupplyChainEnv::new(config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reset_runs_warm_up_tick() {
        let config = SupplyChainConfig::default().with_demand(DemandModel::Fixed(4));
        let mut env = SupplyChainEnv::new(config).unwrap();
        let (observation, info) = env.reset(Some(1)).unwrap();

        assert_eq!(env.now(), Some(1));
        assert_eq!(
            observation,
            Observation {
                factory_level: 0,
                warehouse_level: 0,
                market_demand: 4,
            }
        );
        assert!(matches!(info.get("episode_id"), Some(InfoValue::Text(_))));
        assert_eq!(info.get("demand_mean"), Some(&InfoValue::Number(4.0)));
        assert_eq!(info.get("unit_price"), Some(&InfoValue::Number(10.0)));
        // Accrual, market and the initial batch
        assert_eq!(env.simulation().unwrap().live_processes(), 3);
    }

    #[test]
    fn test_reward_combines_revenue_cost_and_penalty() {
        let config = SupplyChainConfig::default()
            .with_initial_stock(0, 100)
            .with_initial_production(0)
            .with_demand(DemandModel::Fixed(30))
            .with_unit_price(2.0)
            .with_holding_cost(0.5)
            .with_penalty_weight(3.0);
        let mut env = SupplyChainEnv::new(config).unwrap();
        env.reset(Some(0)).unwrap();
        // Warm-up sold 30 at t=0 and t=1, leaving 40

        let first = env.step(0.0).unwrap();
        // t=2: accrual on 40 (accrual runs before the market), then sell 30
        assert_eq!(first.observation.warehouse_level, 10);
        assert!((first.reward - (60.0 - 20.0)).abs() < 1e-9);

        let second = env.step(0.0).unwrap();
        // t=3: accrual on 10, sell 10, 20 unmet
        assert_eq!(second.observation.warehouse_level, 0);
        assert!((second.reward - (20.0 - 5.0 - 60.0)).abs() < 1e-9);
        assert_eq!(
            second.info.get("unmet_demand"),
            Some(&InfoValue::Number(20.0))
        );
        assert!(!second.terminated);
    }

    #[test]
    fn test_truncates_at_episode_length() {
        let config = SupplyChainConfig::default()
            .with_max_steps(4)
            .with_demand(DemandModel::Fixed(0));
        let mut env = SupplyChainEnv::new(config).unwrap();
        env.reset(None).unwrap();

        let flags: Vec<bool> = (0..4).map(|_| env.step(0.0).unwrap().truncated).collect();
        assert_eq!(flags, vec![false, false, true, true]);
    }

    #[test]
    fn test_running_env_moves_to_another_thread() {
        let config = SupplyChainConfig::default()
            .with_initial_stock(30, 0)
            .with_initial_production(0)
            .with_demand(DemandModel::Fixed(0));
        let mut env = SupplyChainEnv::new(config).unwrap();
        env.reset(Some(4)).unwrap();
        env.step(30.0).unwrap();

        let handle = std::thread::spawn(move || {
            for _ in 0..5 {
                env.step(0.0).unwrap();
            }
            env
        });
        let env = handle.join().unwrap();
        assert_eq!(env.observation().unwrap().warehouse_level, 30);
        assert_eq!(env.simulation().unwrap().world().in_transit, 0);
    }
}

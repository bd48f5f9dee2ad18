use crate::core::errors::SimError;
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

/// How the market draws its per-tick demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DemandModel {
    /// The same demand every tick
    Fixed(u64),
    /// Poisson-distributed demand with the given mean
    Poisson { mean: f64 },
    /// Uniform demand in `low..=high`
    Uniform { low: u64, high: u64 },
}

impl DemandModel {
    /// Expected demand per tick
    pub fn mean(&self) -> f64 {
        match *self {
            DemandModel::Fixed(amount) => amount as f64,
            DemandModel::Poisson { mean } => mean,
            DemandModel::Uniform { low, high } => low as f64 / 2.0 + high as f64 / 2.0,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            DemandModel::Fixed(_) => Ok(()),
            DemandModel::Poisson { mean } if mean.is_finite() && mean > 0.0 => Ok(()),
            DemandModel::Poisson { mean } => Err(SimError::InvalidConfig(format!(
                "Poisson demand mean must be positive and finite, got {}",
                mean
            ))),
            DemandModel::Uniform { low, high } if low <= high => Ok(()),
            DemandModel::Uniform { low, high } => Err(SimError::InvalidConfig(format!(
                "Uniform demand bounds are inverted: {} > {}",
                low, high
            ))),
        }
    }
}

impl Default for DemandModel {
    fn default() -> Self {
        DemandModel::Poisson { mean: 20.0 }
    }
}

/// Tunables of the supply chain and its episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyChainConfig {
    pub factory_name: String,
    pub warehouse_name: String,
    pub market_name: String,

    /// Ticks needed to produce one unit
    pub factory_unit_time: SimTime,
    pub factory_capacity: u64,
    pub initial_factory_stock: u64,
    /// Batch produced when an episode starts
    pub initial_production: u64,

    pub warehouse_capacity: u64,
    pub initial_warehouse_stock: u64,
    /// Cost per unit held in the warehouse per tick
    pub holding_cost: f64,

    pub transit_delay: SimTime,

    pub unit_price: f64,
    pub demand: DemandModel,
    /// Reward penalty per unit of unmet demand
    pub penalty_weight: f64,

    /// Upper bound actions are clamped to
    pub max_order: u64,
    /// Episode length in ticks
    pub max_steps: SimTime,
    /// Seed used by the first reset that does not pass one
    pub seed: u64,
}

impl Default for SupplyChainConfig {
    fn default() -> Self {
        Self {
            factory_name: "Factory_EU".to_string(),
            warehouse_name: "Warehouse_US".to_string(),
            market_name: "Market_NA".to_string(),
            factory_unit_time: 2,
            factory_capacity: 1000,
            initial_factory_stock: 0,
            initial_production: 100,
            warehouse_capacity: 5000,
            initial_warehouse_stock: 0,
            holding_cost: 0.1,
            transit_delay: 5,
            unit_price: 10.0,
            demand: DemandModel::default(),
            penalty_weight: 5.0,
            max_order: 100,
            max_steps: 365,
            seed: 0,
        }
    }
}

impl SupplyChainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory_unit_time(mut self, ticks: SimTime) -> Self {
        self.factory_unit_time = ticks;
        self
    }

    pub fn with_capacities(mut self, factory: u64, warehouse: u64) -> Self {
        self.factory_capacity = factory;
        self.warehouse_capacity = warehouse;
        self
    }

    pub fn with_initial_stock(mut self, factory: u64, warehouse: u64) -> Self {
        self.initial_factory_stock = factory;
        self.initial_warehouse_stock = warehouse;
        self
    }

    pub fn with_initial_production(mut self, quantity: u64) -> Self {
        self.initial_production = quantity;
        self
    }

    pub fn with_holding_cost(mut self, cost: f64) -> Self {
        self.holding_cost = cost;
        self
    }

    pub fn with_transit_delay(mut self, ticks: SimTime) -> Self {
        self.transit_delay = ticks;
        self
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = price;
        self
    }

    pub fn with_demand(mut self, demand: DemandModel) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_penalty_weight(mut self, weight: f64) -> Self {
        self.penalty_weight = weight;
        self
    }

    pub fn with_max_order(mut self, max_order: u64) -> Self {
        self.max_order = max_order;
        self
    }

    pub fn with_max_steps(mut self, max_steps: SimTime) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject settings the engine would only trip over mid-episode
    pub fn validate(&self) -> Result<(), SimError> {
        if self.factory_capacity == 0 || self.warehouse_capacity == 0 {
            return Err(SimError::InvalidConfig(
                "container capacities must be positive".to_string(),
            ));
        }
        if self.initial_factory_stock > self.factory_capacity {
            return Err(SimError::InvalidConfig(format!(
                "initial factory stock {} exceeds capacity {}",
                self.initial_factory_stock, self.factory_capacity
            )));
        }
        if self.initial_warehouse_stock > self.warehouse_capacity {
            return Err(SimError::InvalidConfig(format!(
                "initial warehouse stock {} exceeds capacity {}",
                self.initial_warehouse_stock, self.warehouse_capacity
            )));
        }
        if self.initial_production > self.factory_capacity {
            return Err(SimError::InvalidConfig(format!(
                "initial production {} exceeds factory capacity {}",
                self.initial_production, self.factory_capacity
            )));
        }
        if self.max_order > self.factory_capacity.min(self.warehouse_capacity) {
            return Err(SimError::InvalidConfig(format!(
                "max order {} does not fit both containers",
                self.max_order
            )));
        }
        for (name, value) in [
            ("holding_cost", self.holding_cost),
            ("unit_price", self.unit_price),
            ("penalty_weight", self.penalty_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        self.demand.validate()
    }
}

use serde::{Deserialize, Serialize};

/// Market counters; revenue and unmet demand accumulate until drained
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Demand drawn on the latest tick
    pub current_demand: u64,
    pub unmet_demand: u64,
    pub total_revenue: f64,
}

/// Per-step accumulators handed back by `ChainLedger::drain_step`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepTotals {
    pub revenue: f64,
    pub holding_cost: f64,
    pub unmet_demand: u64,
}

/// World state shared by the supply-chain processes of one simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainLedger {
    pub market: MarketState,
    /// Holding cost accrued since the last drain
    pub holding_cost: f64,

    // Flow counters, never drained
    pub produced: u64,
    pub fulfilled: u64,
    pub in_transit: u64,
    pub total_unmet: u64,
}

impl ChainLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_production(&mut self, quantity: u64) {
        self.produced += quantity;
    }

    pub fn record_holding_cost(&mut self, cost: f64) {
        self.holding_cost += cost;
    }

    pub fn record_departure(&mut self, quantity: u64) {
        self.in_transit += quantity;
    }

    pub fn record_arrival(&mut self, quantity: u64) {
        self.in_transit -= quantity;
    }

    /// Book one tick of market activity
    pub fn record_sales(&mut self, demand: u64, fulfilled: u64, unit_price: f64) {
        let unmet = demand - fulfilled;
        self.market.current_demand = demand;
        self.market.unmet_demand += unmet;
        self.market.total_revenue += fulfilled as f64 * unit_price;
        self.fulfilled += fulfilled;
        self.total_unmet += unmet;
    }

    /// Take the per-step accumulators, leaving them at zero
    pub fn drain_step(&mut self) -> StepTotals {
        let totals = StepTotals {
            revenue: self.market.total_revenue,
            holding_cost: self.holding_cost,
            unmet_demand: self.market.unmet_demand,
        };
        self.market.total_revenue = 0.0;
        self.market.unmet_demand = 0;
        self.holding_cost = 0.0;
        totals
    }
}

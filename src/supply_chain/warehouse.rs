use super::ledger::ChainLedger;
use crate::core::errors::SimError;
use crate::core::process::{Context, Process, Yield};
use crate::core::simulation_engine::Simulation;
use crate::core::types::ContainerId;
use log::{debug, trace};

/// Storage between the factory and the market
#[derive(Debug, Clone)]
pub struct Warehouse {
    name: String,
    inventory: ContainerId,
    holding_cost: f64,
}

impl Warehouse {
    pub fn build(
        sim: &mut Simulation<ChainLedger>,
        name: impl Into<String>,
        capacity: u64,
        initial_stock: u64,
        holding_cost: f64,
    ) -> Result<Self, SimError> {
        let name = name.into();
        let inventory = sim.add_container(name.clone(), capacity, initial_stock)?;
        debug!("{}: Warehouse '{}' created.", sim.now(), name);
        Ok(Self {
            name,
            inventory,
            holding_cost,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inventory(&self) -> ContainerId {
        self.inventory
    }

    /// Unit holding cost per tick
    pub fn holding_cost(&self) -> f64 {
        self.holding_cost
    }

    /// The never-ending process charging holding cost once per tick
    pub fn charge_holding_cost(&self) -> HoldingCostAccrual {
        HoldingCostAccrual {
            label: format!("{}::holding_cost", self.name),
            inventory: self.inventory,
            unit_cost: self.holding_cost,
        }
    }
}

/// Adds `level × unit_cost` to the ledger, then sleeps one tick, forever
#[derive(Debug)]
pub struct HoldingCostAccrual {
    label: String,
    inventory: ContainerId,
    unit_cost: f64,
}

impl Process<ChainLedger> for HoldingCostAccrual {
    fn name(&self) -> &str {
        &self.label
    }

    fn resume(
        &mut self,
        ctx: &mut Context<'_, ChainLedger>,
    ) -> Result<Yield<ChainLedger>, SimError> {
        let level = ctx.level(self.inventory)?;
        let cost = level as f64 * self.unit_cost;
        trace!("{}: '{}' charged {:.2}", ctx.now(), self.label, cost);
        ctx.world_mut().record_holding_cost(cost);
        Ok(Yield::Timeout(1))
    }
}

use super::ledger::ChainLedger;
use crate::core::errors::SimError;
use crate::core::process::{Context, Process, Yield};
use crate::core::simulation_engine::Simulation;
use crate::core::types::{ContainerId, SimTime};
use log::debug;

/// Production site feeding its own output stock
#[derive(Debug, Clone)]
pub struct Factory {
    name: String,
    inventory: ContainerId,
    unit_time: SimTime,
}

impl Factory {
    /// Create the factory and its stock container inside `sim`
    pub fn build(
        sim: &mut Simulation<ChainLedger>,
        name: impl Into<String>,
        capacity: u64,
        initial_stock: u64,
        unit_time: SimTime,
    ) -> Result<Self, SimError> {
        let name = name.into();
        let inventory = sim.add_container(name.clone(), capacity, initial_stock)?;
        debug!("{}: Factory '{}' created.", sim.now(), name);
        Ok(Self {
            name,
            inventory,
            unit_time,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inventory(&self) -> ContainerId {
        self.inventory
    }

    pub fn unit_time(&self) -> SimTime {
        self.unit_time
    }

    /// A process producing `quantity` units into the factory stock
    pub fn produce(&self, quantity: u64) -> Produce {
        Produce {
            label: format!("{}::produce({})", self.name, quantity),
            factory: self.name.clone(),
            inventory: self.inventory,
            quantity,
            duration: quantity.saturating_mul(self.unit_time),
            stage: ProduceStage::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProduceStage {
    Start,
    Working,
    Storing,
}

/// Waits `quantity × unit_time`, then puts the batch into the factory stock
#[derive(Debug)]
pub struct Produce {
    label: String,
    factory: String,
    inventory: ContainerId,
    quantity: u64,
    duration: SimTime,
    stage: ProduceStage,
}

impl Process<ChainLedger> for Produce {
    fn name(&self) -> &str {
        &self.label
    }

    fn resume(
        &mut self,
        ctx: &mut Context<'_, ChainLedger>,
    ) -> Result<Yield<ChainLedger>, SimError> {
        match self.stage {
            ProduceStage::Start => {
                debug!(
                    "{}: '{}' starting production of {} units.",
                    ctx.now(),
                    self.factory,
                    self.quantity
                );
                self.stage = ProduceStage::Working;
                Ok(Yield::Timeout(self.duration))
            }
            ProduceStage::Working => {
                self.stage = ProduceStage::Storing;
                Ok(Yield::Put(self.inventory, self.quantity))
            }
            ProduceStage::Storing => {
                ctx.world_mut().record_production(self.quantity);
                debug!(
                    "{}: '{}' finished production. Current inventory: {}",
                    ctx.now(),
                    self.factory,
                    ctx.level(self.inventory)?
                );
                Ok(Yield::Finish)
            }
        }
    }
}

use super::config::DemandModel;
use super::ledger::ChainLedger;
use crate::core::errors::SimError;
use crate::core::process::{Context, Process, Yield};
use crate::core::types::ContainerId;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

/// Demand point served from one warehouse
#[derive(Debug, Clone)]
pub struct Market {
    name: String,
    warehouse: ContainerId,
    demand: DemandModel,
    unit_price: f64,
}

impl Market {
    pub fn new(
        name: impl Into<String>,
        warehouse: ContainerId,
        demand: DemandModel,
        unit_price: f64,
    ) -> Self {
        let name = name.into();
        debug!("Market '{}' attached to warehouse {}.", name, warehouse);
        Self {
            name,
            warehouse,
            demand,
            unit_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warehouse(&self) -> ContainerId {
        self.warehouse
    }

    /// The demand model, i.e. the market's demand rate
    pub fn demand_rate(&self) -> DemandModel {
        self.demand
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// The never-ending process drawing and serving demand every tick
    pub fn serve_demand(&self, seed: u64) -> Result<DemandDraw, SimError> {
        let sampler = match self.demand {
            DemandModel::Fixed(amount) => Sampler::Fixed(amount),
            DemandModel::Poisson { mean } => Sampler::Poisson(
                Poisson::new(mean).map_err(|e| SimError::InvalidConfig(e.to_string()))?,
            ),
            DemandModel::Uniform { low, high } => {
                self.demand.validate()?;
                Sampler::Uniform { low, high }
            }
        };
        Ok(DemandDraw {
            label: format!("{}::demand", self.name),
            warehouse: self.warehouse,
            unit_price: self.unit_price,
            sampler,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

#[derive(Debug)]
enum Sampler {
    Fixed(u64),
    Poisson(Poisson<f64>),
    Uniform { low: u64, high: u64 },
}

impl Sampler {
    fn draw(&self, rng: &mut StdRng) -> u64 {
        match self {
            Sampler::Fixed(amount) => *amount,
            Sampler::Poisson(poisson) => poisson.sample(rng) as u64,
            Sampler::Uniform { low, high } => rng.gen_range(*low..=*high),
        }
    }
}

/// Draws demand, takes what the warehouse holds without blocking, books the
/// sale and the shortfall, then sleeps one tick
#[derive(Debug)]
pub struct DemandDraw {
    label: String,
    warehouse: ContainerId,
    unit_price: f64,
    sampler: Sampler,
    rng: StdRng,
}

impl Process<ChainLedger> for DemandDraw {
    fn name(&self) -> &str {
        &self.label
    }

    fn resume(
        &mut self,
        ctx: &mut Context<'_, ChainLedger>,
    ) -> Result<Yield<ChainLedger>, SimError> {
        let demand = self.sampler.draw(&mut self.rng);
        let fulfilled = ctx.take_up_to(self.warehouse, demand)?;
        trace!(
            "{}: '{}' demand {} fulfilled {}",
            ctx.now(),
            self.label,
            demand,
            fulfilled
        );
        ctx.world_mut()
            .record_sales(demand, fulfilled, self.unit_price);
        Ok(Yield::Timeout(1))
    }
}

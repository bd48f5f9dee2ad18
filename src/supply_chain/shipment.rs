use super::ledger::ChainLedger;
use crate::core::errors::SimError;
use crate::core::process::{Context, Process, Yield};
use crate::core::types::{ContainerId, SimTime};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShipmentStage {
    Loading,
    Loaded,
    Arrived,
    Delivered,
}

/// Moves `quantity` units from one container to another after a transit delay
///
/// The pick-up blocks until the source holds enough stock; the drop-off
/// blocks until the destination has room.
#[derive(Debug)]
pub struct Shipment {
    label: String,
    from: ContainerId,
    to: ContainerId,
    quantity: u64,
    delay: SimTime,
    stage: ShipmentStage,
}

impl Shipment {
    pub fn new(from: ContainerId, to: ContainerId, quantity: u64, delay: SimTime) -> Self {
        Self {
            label: format!("shipment({} -> {}, {})", from, to, quantity),
            from,
            to,
            quantity,
            delay,
            stage: ShipmentStage::Loading,
        }
    }
}

impl Process<ChainLedger> for Shipment {
    fn name(&self) -> &str {
        &self.label
    }

    fn resume(
        &mut self,
        ctx: &mut Context<'_, ChainLedger>,
    ) -> Result<Yield<ChainLedger>, SimError> {
        match self.stage {
            ShipmentStage::Loading => {
                debug!(
                    "{}: Shipping {} units from '{}' to '{}'.",
                    ctx.now(),
                    self.quantity,
                    ctx.container(self.from)?.name(),
                    ctx.container(self.to)?.name()
                );
                self.stage = ShipmentStage::Loaded;
                Ok(Yield::Get(self.from, self.quantity))
            }
            ShipmentStage::Loaded => {
                ctx.world_mut().record_departure(self.quantity);
                self.stage = ShipmentStage::Arrived;
                Ok(Yield::Timeout(self.delay))
            }
            ShipmentStage::Arrived => {
                self.stage = ShipmentStage::Delivered;
                Ok(Yield::Put(self.to, self.quantity))
            }
            ShipmentStage::Delivered => {
                ctx.world_mut().record_arrival(self.quantity);
                let destination = ctx.container(self.to)?;
                debug!(
                    "{}: Shipment arrived at '{}'. Its inventory is now {}.",
                    ctx.now(),
                    destination.name(),
                    destination.level()
                );
                Ok(Yield::Finish)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulation_engine::{ProcessStatus, Simulation};

    #[test]
    fn test_delivers_after_transit_delay() {
        let mut sim = Simulation::new(ChainLedger::new());
        let source = sim.add_container("source", 100, 40).unwrap();
        let target = sim.add_container("target", 100, 0).unwrap();
        sim.spawn(Shipment::new(source, target, 30, 5));

        sim.run_until(4).unwrap();
        assert_eq!(sim.level(source).unwrap(), 10);
        assert_eq!(sim.level(target).unwrap(), 0);
        assert_eq!(sim.world().in_transit, 30);

        sim.run_until(5).unwrap();
        assert_eq!(sim.level(target).unwrap(), 30);
        assert_eq!(sim.world().in_transit, 0);
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn test_waits_for_stock_at_source() {
        let mut sim = Simulation::new(ChainLedger::new());
        let source = sim.add_container("source", 100, 0).unwrap();
        let target = sim.add_container("target", 100, 0).unwrap();
        let shipment = sim.spawn(Shipment::new(source, target, 30, 2));

        sim.run_until(3).unwrap();
        assert_eq!(
            sim.process_status(shipment),
            Some(ProcessStatus::WaitingGet(source))
        );
        assert_eq!(sim.world().in_transit, 0);
    }

    #[test]
    fn test_waits_for_room_at_destination() {
        let mut sim = Simulation::new(ChainLedger::new());
        let source = sim.add_container("source", 100, 50).unwrap();
        let target = sim.add_container("target", 40, 20).unwrap();
        let shipment = sim.spawn(Shipment::new(source, target, 30, 1));

        sim.run_until(5).unwrap();
        assert_eq!(
            sim.process_status(shipment),
            Some(ProcessStatus::WaitingPut(target))
        );
        assert_eq!(sim.world().in_transit, 30);
        assert_eq!(sim.level(target).unwrap(), 20);
    }
}

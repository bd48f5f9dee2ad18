use chainsim::supply_chain::{ChainLedger, Factory, Shipment, Warehouse};
use chainsim::{Sequence, SimError, Simulation};
use log::info;

fn main() -> Result<(), SimError> {
    env_logger::init();

    println!("Starting reference supply chain run");
    let mut sim = Simulation::new(ChainLedger::new());
    let factory = Factory::build(&mut sim, "Factory_EU", 1000, 0, 2)?;
    let warehouse = Warehouse::build(&mut sim, "Warehouse_US", 5000, 0, 0.1)?;

    sim.spawn(warehouse.charge_holding_cost());
    sim.spawn(
        Sequence::new("main")
            .then(factory.produce(100))
            .then(Shipment::new(
                factory.inventory(),
                warehouse.inventory(),
                70,
                5,
            ))
            .then(factory.produce(50)),
    );

    for checkpoint in [100, 200, 205, 305] {
        sim.run_until(checkpoint)?;
        info!(
            "t={} factory={} warehouse={} in_transit={}",
            sim.now(),
            sim.level(factory.inventory())?,
            sim.level(warehouse.inventory())?,
            sim.world().in_transit
        );
    }

    let holding = sim.world_mut().drain_step().holding_cost;
    println!("Final state at t={}:", sim.now());
    println!("  {}: {} units", factory.name(), sim.level(factory.inventory())?);
    println!("  {}: {} units", warehouse.name(), sim.level(warehouse.inventory())?);
    println!("  produced: {}", sim.world().produced);
    println!("  holding cost accrued: {:.1}", holding);
    println!("  events dispatched: {}", sim.events_dispatched());
    Ok(())
}

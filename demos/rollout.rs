use chainsim::core::execution::{ConcurrencyMode, ExecutionConfig};
use chainsim::supply_chain::run_episodes;
use chainsim::{Observation, SimError, SupplyChainConfig};

/// Order up to a warehouse target, capped by what the factory holds
fn base_stock(observation: &Observation) -> f32 {
    const TARGET: u64 = 120;
    let gap = TARGET.saturating_sub(observation.warehouse_level);
    gap.min(observation.factory_level) as f32
}

fn main() -> Result<(), SimError> {
    env_logger::init();

    let config = SupplyChainConfig::default()
        .with_initial_stock(200, 50)
        .with_factory_unit_time(1);
    let execution = ExecutionConfig::new().with_concurrency(ConcurrencyMode::Rayon);
    let seeds: Vec<u64> = (0..16).collect();

    println!("Rolling out {} episodes of {} ticks", seeds.len(), config.max_steps);
    let summaries = run_episodes(&config, &seeds, &base_stock, &execution)?;

    for summary in &summaries {
        println!(
            "seed {:>2}: reward {:>10.1}  orders {:>3}  fulfilled {:>5}  unmet {:>5}",
            summary.seed,
            summary.total_reward,
            summary.orders_accepted,
            summary.fulfilled,
            summary.unmet_demand
        );
    }

    let mean = summaries.iter().map(|s| s.total_reward).sum::<f64>() / summaries.len() as f64;
    println!("Mean episode reward: {:.1}", mean);
    Ok(())
}

use super::config::SupplyChainConfig;
use super::env::{InfoValue, Observation, SupplyChainEnv};
use crate::core::errors::SimError;
use crate::core::execution::{ConcurrencyMode, ExecutionConfig};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one complete episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub seed: u64,
    pub steps: u64,
    pub total_reward: f64,
    pub final_observation: Observation,
    pub orders_accepted: u64,
    pub produced: u64,
    pub fulfilled: u64,
    pub unmet_demand: u64,
}

/// Run one episode to truncation, asking `policy` for every order
pub fn run_episode<P>(
    config: &SupplyChainConfig,
    seed: u64,
    policy: &P,
) -> Result<EpisodeSummary, SimError>
where
    P: Fn(&Observation) -> f32,
{
    let mut env = SupplyChainEnv::new(config.clone())?;
    let (mut observation, _) = env.reset(Some(seed))?;
    let mut steps = 0;
    let mut total_reward = 0.0;
    let mut orders_accepted = 0;

    loop {
        let outcome = env.step(policy(&observation))?;
        steps += 1;
        total_reward += outcome.reward;
        if outcome.info.get("order_accepted") == Some(&InfoValue::Flag(true)) {
            orders_accepted += 1;
        }
        observation = outcome.observation;
        if outcome.terminated || outcome.truncated {
            break;
        }
    }

    let ledger = env.simulation().ok_or(SimError::NotReset)?.world();
    Ok(EpisodeSummary {
        seed,
        steps,
        total_reward,
        final_observation: observation,
        orders_accepted,
        produced: ledger.produced,
        fulfilled: ledger.fulfilled,
        unmet_demand: ledger.total_unmet,
    })
}

/// Run one episode per seed; results come back in seed order whatever the
/// concurrency mode
pub fn run_episodes<P>(
    config: &SupplyChainConfig,
    seeds: &[u64],
    policy: &P,
    execution: &ExecutionConfig,
) -> Result<Vec<EpisodeSummary>, SimError>
where
    P: Fn(&Observation) -> f32 + Sync,
{
    config.validate()?;
    execution.validate()?;
    info!(
        "Running {} episodes ({:?})",
        seeds.len(),
        execution.concurrency_mode
    );

    match execution.concurrency_mode {
        ConcurrencyMode::Sequential => seeds
            .iter()
            .map(|&seed| run_episode(config, seed, policy))
            .collect(),
        ConcurrencyMode::Rayon => {
            let run_all = || {
                seeds
                    .par_iter()
                    .map(|&seed| run_episode(config, seed, policy))
                    .collect::<Result<Vec<_>, SimError>>()
            };
            match execution.thread_pool_size {
                Some(size) => rayon::ThreadPoolBuilder::new()
                    .num_threads(size)
                    .build()
                    .map_err(|e| SimError::InvalidConfig(e.to_string()))?
                    .install(run_all),
                None => run_all(),
            }
        }
    }
}

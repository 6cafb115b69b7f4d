use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use scout_core::sim::{EpisodeStopReason, TerrainMix, World, run_episode_observed};
use scout_core::{Policy, Tile, replay_journal};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 100)]
    worlds: u32,
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "Starting fuzz harness on seed {} for {} worlds of at most {} ticks...",
        args.seed, args.worlds, args.ticks
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut won = 0;
    let mut stalled = 0;
    let mut exhausted = 0;

    for _ in 0..args.worlds {
        let world_seed = rng.next_u64();
        let width = 6 + (rng.next_u64() % 20) as usize;
        let height = 6 + (rng.next_u64() % 20) as usize;
        let policy = Policy {
            detonate_trees: rng.next_u64() % 2 == 0,
            spend_charges_on_return: rng.next_u64() % 2 == 0,
        };

        // Every other world is mostly lakes so boat travel gets exercised.
        let mix = if rng.next_u64() % 2 == 0 { TerrainMix::default() } else { TerrainMix::wetlands() };
        let mut world = World::generate_with(world_seed, width, height, mix);
        let mut violation = None;
        let result = run_episode_observed(&mut world, policy, args.ticks, |agent, world| {
            if violation.is_some() {
                return;
            }
            let state = agent.state();
            if agent.map().tile_at(state.pos) == Tile::Unknown {
                violation = Some(format!("standing on Unknown at tick {}", agent.current_tick()));
            } else if world.agent_frame_pose() != (state.pos, state.heading) {
                violation = Some(format!("pose drift at tick {}", agent.current_tick()));
            } else if state.inventory != world.agent().inventory {
                violation = Some(format!("inventory drift at tick {}", agent.current_tick()));
            }
        });

        if let Some(violation) = violation {
            bail!("Invariant failed on world seed {world_seed}: {violation}");
        }
        match result.stop_reason {
            EpisodeStopReason::Won => won += 1,
            EpisodeStopReason::Stalled => stalled += 1,
            EpisodeStopReason::BudgetExhausted => exhausted += 1,
            EpisodeStopReason::Drowned => bail!("Invariant failed: drowned on world seed {world_seed}"),
            EpisodeStopReason::Rejected { tick, action } => {
                bail!("Invariant failed: {action:?} rejected at tick {tick} on world seed {world_seed}")
            }
        }

        let replayed = replay_journal(&result.journal)?;
        if replayed.final_snapshot_hash != result.final_snapshot_hash {
            bail!("Replay hash mismatch on world seed {world_seed}");
        }
    }

    println!("Fuzzing complete: {won} won, {stalled} stalled, {exhausted} out of ticks.");
    Ok(())
}

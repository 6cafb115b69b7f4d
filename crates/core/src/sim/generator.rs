//! Seeded world generation for fuzzing and determinism checks.
//! Generated worlds are finite: the rock outside the bounds keeps boats from sailing off forever.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use super::*;

const MIN_SIDE: usize = 5;
const MAX_EXTRA_CHARGES: u64 = 3;

/// Percent of cells rolled as each terrain kind; the rest are open ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainMix {
    pub tree: u64,
    pub boulder: u64,
    pub water: u64,
    pub boat: u64,
}

impl Default for TerrainMix {
    fn default() -> Self {
        Self { tree: 12, boulder: 10, water: 10, boat: 1 }
    }
}

impl TerrainMix {
    /// Lakes and boats everywhere, for exercising boat travel.
    pub fn wetlands() -> Self {
        Self { tree: 8, boulder: 6, water: 35, boat: 3 }
    }

    fn roll(&self, roll: u64) -> Tile {
        let mut threshold = 0;
        for (share, tile) in [
            (self.tree, Tile::Tree),
            (self.boulder, Tile::Boulder),
            (self.water, Tile::Water),
            (self.boat, Tile::Boat),
        ] {
            threshold += share;
            if roll < threshold {
                return tile;
            }
        }
        Tile::Empty
    }
}

impl World {
    /// A reproducible island with the default terrain mix.
    pub fn generate(seed: u64, width: usize, height: usize) -> Self {
        Self::generate_with(seed, width, height, TerrainMix::default())
    }

    /// Scattered terrain per `mix`, one axe, one goal item and a few charges, ringed by the
    /// rock that lies outside every world.
    pub fn generate_with(seed: u64, width: usize, height: usize, mix: TerrainMix) -> Self {
        let width = width.max(MIN_SIDE);
        let height = height.max(MIN_SIDE);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut tiles: Vec<Tile> =
            (0..width * height).map(|_| mix.roll(rng.next_u64() % 100)).collect();

        let spawn_index = pick(&mut rng, tiles.len());
        tiles[spawn_index] = Tile::Empty;
        let heading = Heading::ALL[pick(&mut rng, Heading::ALL.len())];

        let charges = 1 + rng.next_u64() % MAX_EXTRA_CHARGES;
        let mut items = vec![Tile::GoalItem, Tile::Axe];
        items.extend((0..charges).map(|_| Tile::Charge));
        for item in items {
            loop {
                let index = pick(&mut rng, tiles.len());
                if index != spawn_index && !tiles[index].is_item() {
                    tiles[index] = item;
                    break;
                }
            }
        }

        let at = |index: usize| Pos { y: (index / width) as i32, x: (index % width) as i32 };
        let spawn = at(spawn_index);
        let cells = tiles
            .into_iter()
            .enumerate()
            .filter(|(index, _)| *index != spawn_index)
            .map(|(index, tile)| (at(index), tile))
            .collect();
        Self::from_cells(cells, spawn, heading)
    }
}

fn pick(rng: &mut ChaCha8Rng, len: usize) -> usize {
    rng.next_u64() as usize % len
}

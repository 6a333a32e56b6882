//! Area-effect catastrophes. Stateless: every function works on the population and terrain it
//! is handed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::ParameterSet;
use crate::population::Population;
use crate::terrain::{Cell, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterKind {
    Meteor,
    Lightning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisasterOutcome {
    pub kind: DisasterKind,
    pub cell: Cell,
    pub casualties: usize,
}

/// Kills every agent strictly closer than `radius` to `center` and turns the same disc to sand.
/// Returns the number of agents killed.
pub fn meteor(
    population: &mut Population,
    terrain: &mut TerrainGrid,
    center: Cell,
    radius: u32,
) -> usize {
    let limit = (radius as i64).saturating_mul(radius as i64);
    let victims: Vec<_> = population
        .iter()
        .filter(|agent| agent.cell.distance_sq(center) < limit)
        .map(|agent| agent.id)
        .collect();
    for id in &victims {
        population.remove(*id);
    }
    terrain.apply_disaster(center, radius);
    debug!(x = center.x, y = center.y, radius, casualties = victims.len(), "meteor strike");
    victims.len()
}

/// Kills the first agent standing exactly on `cell`, if there is one.
pub fn lightning(population: &mut Population, cell: Cell) -> bool {
    let Some(victim) = population.first_at(cell) else {
        return false;
    };
    population.remove(victim);
    debug!(x = cell.x, y = cell.y, "lightning strike");
    true
}

pub fn strike(
    kind: DisasterKind,
    population: &mut Population,
    terrain: &mut TerrainGrid,
    cell: Cell,
    params: &ParameterSet,
) -> DisasterOutcome {
    let casualties = match kind {
        DisasterKind::Meteor => meteor(population, terrain, cell, params.meteor_radius),
        DisasterKind::Lightning => usize::from(lightning(population, cell)),
    };
    DisasterOutcome {
        kind,
        cell,
        casualties,
    }
}

/// The once-per-tick ambient roll: with `disaster_chance`, strike a random cell with a meteor or
/// lightning at even odds.
pub fn roll_ambient<R: Rng + ?Sized>(
    population: &mut Population,
    terrain: &mut TerrainGrid,
    params: &ParameterSet,
    rng: &mut R,
) -> Option<DisasterOutcome> {
    if rng.gen::<f64>() >= params.disaster_chance {
        return None;
    }
    let cell = terrain.random_cell(rng);
    let kind = if rng.gen::<f64>() < 0.5 {
        DisasterKind::Meteor
    } else {
        DisasterKind::Lightning
    };
    Some(strike(kind, population, terrain, cell, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Faction;
    use crate::terrain::Terrain;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn meteor_boundary_is_strict() {
        let params = ParameterSet::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..40 {
            let radius: u32 = rng.gen_range(1..8);
            let mut terrain = TerrainGrid::flat(60, 60);
            let center = Cell::new(rng.gen_range(0..60), rng.gen_range(0..60));
            let r2 = (radius * radius) as i64;
            let mut population = Population::new();
            let mut on_boundary = Vec::new();
            let mut just_inside = Vec::new();
            let r = radius as i32;
            for dx in -r..=r {
                for dy in -r..=r {
                    let d2 = (dx * dx + dy * dy) as i64;
                    let cell = center.offset(dx, dy);
                    if d2 == r2 {
                        on_boundary.push(population.spawn(&params, Faction::Human, cell));
                    } else if d2 == r2 - 1 {
                        just_inside.push(population.spawn(&params, Faction::Orc, cell));
                    }
                }
            }
            let killed = meteor(&mut population, &mut terrain, center, radius);
            assert_eq!(killed, just_inside.len());
            assert!(on_boundary.iter().all(|id| population.contains(*id)));
            assert!(just_inside.iter().all(|id| !population.contains(*id)));
        }
    }

    #[test]
    fn meteor_reshapes_terrain() {
        let mut terrain = TerrainGrid::flat(10, 10);
        terrain.set(Cell::new(4, 4), Terrain::Mountain);
        terrain.set(Cell::new(5, 6), Terrain::Water);
        let mut population = Population::new();
        assert_eq!(meteor(&mut population, &mut terrain, Cell::new(5, 5), 3), 0);
        assert_eq!(terrain.terrain_at(Cell::new(4, 4)), Some(Terrain::Sand));
        assert_eq!(terrain.terrain_at(Cell::new(5, 6)), Some(Terrain::Sand));
    }

    #[test]
    fn lightning_kills_at_most_one() {
        let params = ParameterSet::default();
        let mut population = Population::new();
        let first = population.spawn(&params, Faction::Elf, Cell::new(2, 2));
        let second = population.spawn(&params, Faction::Elf, Cell::new(2, 2));
        assert!(lightning(&mut population, Cell::new(2, 2)));
        assert!(!population.contains(first));
        assert!(population.contains(second));
        assert!(!lightning(&mut population, Cell::new(3, 3)));
    }

    #[test]
    fn ambient_roll_respects_chance() {
        let mut params = ParameterSet::default();
        let mut terrain = TerrainGrid::flat(10, 10);
        let mut population = Population::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        params.disaster_chance = 0.0;
        for _ in 0..100 {
            assert!(roll_ambient(&mut population, &mut terrain, &params, &mut rng).is_none());
        }
        params.disaster_chance = 1.0;
        let outcome = roll_ambient(&mut population, &mut terrain, &params, &mut rng).unwrap();
        assert!(terrain.contains(outcome.cell));
        assert_eq!(outcome.casualties, 0);
    }
}

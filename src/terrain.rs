//! Terrain grid - cell classification, generation and walkability queries

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cell coordinates. Signed so that operator input outside the map can be represented and
/// rejected instead of wrapping silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// King-move distance.
    pub fn chebyshev(self, other: Cell) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        dx.max(dy) as u32
    }

    /// Saturates at `i64::MAX` for cells at opposite ends of the coordinate range.
    pub fn distance_sq(self, other: Cell) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Planar Euclidean distance; no wraparound.
    pub fn distance(self, other: Cell) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }

    /// Clamps at the edges of the coordinate range instead of overflowing.
    pub fn offset(self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    Water,
    Sand,
    Mountain,
}

impl Terrain {
    pub fn is_walkable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Sand)
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            Terrain::Grass => [0, 100, 0],
            Terrain::Water => [0, 100, 255],
            Terrain::Sand => [194, 178, 128],
            Terrain::Mountain => [128, 128, 128],
        }
    }
}

fn default_width() -> u32 {
    150
}

fn default_height() -> u32 {
    100
}

fn default_water_basins() -> u32 {
    9
}

fn default_sand_patches() -> u32 {
    6
}

fn default_mountains() -> u32 {
    15
}

/// Shape of the procedurally generated map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Skip generation and leave every cell as grass.
    #[serde(default)]
    pub flat: bool,
    #[serde(default = "default_water_basins")]
    pub water_basins: u32,
    #[serde(default)]
    pub water: FeatureShape,
    #[serde(default = "default_sand_patches")]
    pub sand_patches: u32,
    #[serde(default = "FeatureShape::sand")]
    pub sand: FeatureShape,
    #[serde(default = "default_mountains")]
    pub mountains: u32,
    #[serde(default = "FeatureShape::mountain")]
    pub mountain: FeatureShape,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            flat: false,
            water_basins: default_water_basins(),
            water: FeatureShape::default(),
            sand_patches: default_sand_patches(),
            sand: FeatureShape::sand(),
            mountains: default_mountains(),
            mountain: FeatureShape::mountain(),
        }
    }
}

impl TerrainConfig {
    pub fn flat(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flat: true,
            ..Self::default()
        }
    }
}

/// Radius range and the margin kept between a feature's centre and the map edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureShape {
    pub min_radius: u32,
    pub max_radius: u32,
    pub margin_x: u32,
    pub margin_y: u32,
}

impl Default for FeatureShape {
    fn default() -> Self {
        Self {
            min_radius: 2,
            max_radius: 8,
            margin_x: 20,
            margin_y: 15,
        }
    }
}

impl FeatureShape {
    fn sand() -> Self {
        Self {
            min_radius: 3,
            max_radius: 10,
            margin_x: 25,
            margin_y: 20,
        }
    }

    fn mountain() -> Self {
        Self {
            min_radius: 0,
            max_radius: 0,
            margin_x: 15,
            margin_y: 15,
        }
    }

    fn pick_center<R: Rng + ?Sized>(&self, rng: &mut R, width: u32, height: u32) -> Cell {
        Cell::new(
            pick_axis(rng, width, self.margin_x),
            pick_axis(rng, height, self.margin_y),
        )
    }

    fn pick_radius<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let low = self.min_radius.min(self.max_radius);
        rng.gen_range(low..=self.max_radius.max(low)) as i32
    }
}

fn pick_axis<R: Rng + ?Sized>(rng: &mut R, len: u32, margin: u32) -> i32 {
    let len = len.max(1) as i32;
    let margin = margin as i32;
    if len - 1 - margin >= margin {
        rng.gen_range(margin..=len - 1 - margin)
    } else {
        rng.gen_range(0..len)
    }
}

/// Row-major terrain classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<Terrain>,
}

impl TerrainGrid {
    /// All-grass grid.
    pub fn flat(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Terrain::Grass; (width * height) as usize],
        }
    }

    pub fn generate<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Self {
        let mut grid = Self::flat(config.width, config.height);
        if !config.flat {
            grid.carve_water(config, rng);
            grid.scatter_sand(config, rng);
            grid.scatter_mountains(config, rng);
        }
        grid
    }

    /// Circular basins; overwrite anything.
    pub fn carve_water<R: Rng + ?Sized>(&mut self, config: &TerrainConfig, rng: &mut R) {
        for _ in 0..config.water_basins {
            let center = config.water.pick_center(rng, self.width, self.height);
            let radius = config.water.pick_radius(rng);
            for dx in -radius..radius {
                for dy in -radius..radius {
                    if dx * dx + dy * dy < radius * radius {
                        self.set(center.offset(dx, dy), Terrain::Water);
                    }
                }
            }
        }
    }

    /// Half-filled square patches that leave water alone.
    pub fn scatter_sand<R: Rng + ?Sized>(&mut self, config: &TerrainConfig, rng: &mut R) {
        for _ in 0..config.sand_patches {
            let center = config.sand.pick_center(rng, self.width, self.height);
            let radius = config.sand.pick_radius(rng);
            for dx in -radius..radius {
                for dy in -radius..radius {
                    if rng.gen::<f64>() > 0.5 {
                        let cell = center.offset(dx, dy);
                        if matches!(self.terrain_at(cell), Some(t) if t != Terrain::Water) {
                            self.set(cell, Terrain::Sand);
                        }
                    }
                }
            }
        }
    }

    /// Single mountain cells that leave water alone.
    pub fn scatter_mountains<R: Rng + ?Sized>(&mut self, config: &TerrainConfig, rng: &mut R) {
        for _ in 0..config.mountains {
            let cell = config.mountain.pick_center(rng, self.width, self.height);
            if matches!(self.terrain_at(cell), Some(t) if t != Terrain::Water) {
                self.set(cell, Terrain::Mountain);
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[Terrain] {
        &self.cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.y as usize * self.width as usize + cell.x as usize)
        } else {
            None
        }
    }

    pub fn terrain_at(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).map(|idx| self.cells[idx])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: Cell, terrain: Terrain) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx] = terrain;
        }
    }

    /// Grass or sand inside the map. No wraparound.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.terrain_at(cell).is_some_and(Terrain::is_walkable)
    }

    /// Toroidal wrap used by movement.
    pub fn wrap(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.x.rem_euclid(self.width as i32),
            cell.y.rem_euclid(self.height as i32),
        )
    }

    /// Turns every cell with `dx² + dy² < radius²` around `center` into sand.
    /// The `[-radius, radius)` box is clipped to the grid first, so centres far off the map are
    /// a no-op.
    pub fn apply_disaster(&mut self, center: Cell, radius: u32) {
        let radius = radius as i64;
        let limit = radius.saturating_mul(radius);
        let (cx, cy) = (center.x as i64, center.y as i64);
        let xs = (cx - radius).max(0)..(cx + radius).min(self.width as i64);
        for y in (cy - radius).max(0)..(cy + radius).min(self.height as i64) {
            for x in xs.clone() {
                let cell = Cell::new(x as i32, y as i32);
                if cell.distance_sq(center) < limit {
                    self.set(cell, Terrain::Sand);
                }
            }
        }
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        Cell::new(
            rng.gen_range(0..self.width as i32),
            rng.gen_range(0..self.height as i32),
        )
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|&&t| t == terrain).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            width: 60,
            height: 40,
            mountains: 200,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn walkability_follows_classification() {
        let mut grid = TerrainGrid::flat(4, 4);
        grid.set(Cell::new(1, 1), Terrain::Water);
        grid.set(Cell::new(2, 2), Terrain::Mountain);
        grid.set(Cell::new(3, 3), Terrain::Sand);

        assert!(grid.is_walkable(Cell::new(0, 0)));
        assert!(!grid.is_walkable(Cell::new(1, 1)));
        assert!(!grid.is_walkable(Cell::new(2, 2)));
        assert!(grid.is_walkable(Cell::new(3, 3)));
        assert!(!grid.is_walkable(Cell::new(-1, 0)));
        assert!(!grid.is_walkable(Cell::new(0, 4)));
    }

    #[test]
    fn generated_walkability_never_admits_water_or_mountain() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = TerrainGrid::generate(&small_config(), &mut rng);
        for y in -2..grid.height() as i32 + 2 {
            for x in -2..grid.width() as i32 + 2 {
                let cell = Cell::new(x, y);
                match grid.terrain_at(cell) {
                    Some(Terrain::Water) | Some(Terrain::Mountain) | None => {
                        assert!(!grid.is_walkable(cell))
                    }
                    Some(_) => assert!(grid.is_walkable(cell)),
                }
            }
        }
    }

    #[test]
    fn later_phases_never_overwrite_water() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let config = small_config();
            let mut grid = TerrainGrid::flat(config.width, config.height);
            grid.carve_water(&config, &mut rng);
            let water: Vec<bool> = grid.cells().iter().map(|t| *t == Terrain::Water).collect();
            assert!(water.iter().any(|w| *w), "seed {seed} carved no water");

            grid.scatter_sand(&config, &mut rng);
            grid.scatter_mountains(&config, &mut rng);
            for (idx, was_water) in water.iter().enumerate() {
                if *was_water {
                    assert_eq!(grid.cells()[idx], Terrain::Water);
                }
            }
        }
    }

    #[test]
    fn flat_config_stays_grass() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = TerrainGrid::generate(&TerrainConfig::flat(10, 10), &mut rng);
        assert_eq!(grid.count(Terrain::Grass), 100);
    }

    #[test]
    fn wrap_is_toroidal() {
        let grid = TerrainGrid::flat(10, 5);
        assert_eq!(grid.wrap(Cell::new(-1, -1)), Cell::new(9, 4));
        assert_eq!(grid.wrap(Cell::new(10, 5)), Cell::new(0, 0));
    }

    #[test]
    fn disaster_sands_strict_circle() {
        let mut grid = TerrainGrid::flat(11, 11);
        for idx in 0..grid.cells.len() {
            grid.cells[idx] = Terrain::Water;
        }
        grid.apply_disaster(Cell::new(5, 5), 3);
        assert_eq!(grid.terrain_at(Cell::new(5, 5)), Some(Terrain::Sand));
        assert_eq!(grid.terrain_at(Cell::new(3, 4)), Some(Terrain::Sand));
        // dx = -3 is inside the box but on the circle boundary
        assert_eq!(grid.terrain_at(Cell::new(2, 5)), Some(Terrain::Water));
        // dx = +3 is outside the half-open box
        assert_eq!(grid.terrain_at(Cell::new(8, 5)), Some(Terrain::Water));
        assert_eq!(grid.count(Terrain::Sand), 25);
    }

    #[test]
    fn disaster_near_edge_ignores_outside_cells() {
        let mut grid = TerrainGrid::flat(4, 4);
        grid.apply_disaster(Cell::new(0, 0), 3);
        assert!(grid.count(Terrain::Sand) > 0);
        assert_eq!(grid.cells().len(), 16);
    }

    #[test]
    fn distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, -4);
        assert_eq!(a.chebyshev(b), 4);
        assert_eq!(a.distance_sq(b), 25);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let far = Cell::new(i32::MAX, i32::MIN);
        assert_eq!(far.offset(1, -1), far);
        assert_eq!(far.distance_sq(Cell::new(i32::MIN, i32::MAX)), i64::MAX);

        let mut grid = TerrainGrid::flat(10, 10);
        grid.apply_disaster(far, 3);
        grid.apply_disaster(Cell::new(i32::MIN, 0), 1_000);
        assert_eq!(grid.count(Terrain::Sand), 0);

        grid.apply_disaster(Cell::new(5, 5), u32::MAX);
        assert_eq!(grid.count(Terrain::Sand), 100);
    }
}

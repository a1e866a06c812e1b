use std::collections::BTreeSet;

use ndarray::Array2;

use super::*;

/// Seeded random placement that keeps the starting cell and its whole
/// clamped 3x3 neighbourhood mine-free, so the first uncover never detonates
/// and always opens a zero-count cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SafeStartGenerator {
    seed: u64,
    start: Coord2,
}

impl SafeStartGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl PlacementGenerator for SafeStartGenerator {
    fn generate(self, config: GameConfig) -> Result<MinePlacement> {
        use rand::prelude::*;

        let (rows, cols) = config.size;

        let mut forbidden: BTreeSet<Coord2> = BTreeSet::from([self.start]);
        forbidden.extend(config.neighbours(self.start));

        let free_cells = (config.total_cells() as usize).saturating_sub(forbidden.len());
        if usize::from(config.mines) > free_cells {
            log::warn!(
                "cannot keep {:?} clear: {} mines requested but only {} cells available",
                self.start,
                config.mines,
                free_cells
            );
            return Err(GameError::InvalidMineCount);
        }

        // Rejection sampling: collisions with the forbidden zone or an
        // existing mine draw again. Terminates because mines fit in the
        // free cells.
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut placed: CellCount = 0;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        while placed < config.mines {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            if forbidden.contains(&coords) || mine_mask[coords.to_nd_index()] {
                continue;
            }
            mine_mask[coords.to_nd_index()] = true;
            placed += 1;
        }

        Ok(MinePlacement::from_mine_mask(mine_mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_the_exact_mine_count() {
        let config = GameConfig::new((9, 9), 10).unwrap();

        let placement = SafeStartGenerator::new(7, (4, 4)).generate(config).unwrap();

        assert_eq!(placement.mine_count(), 10);
        assert_eq!(placement.size(), (9, 9));
    }

    #[test]
    fn keeps_the_start_neighbourhood_clear() {
        for seed in 0..20 {
            let config = GameConfig::new((5, 5), 15).unwrap();
            let placement = SafeStartGenerator::new(seed, (0, 0))
                .generate(config)
                .unwrap();

            assert!(!placement.contains_mine((0, 0)));
            for pos in config.neighbours((0, 0)) {
                assert!(!placement.contains_mine(pos));
            }
            assert_eq!(placement.mine_count(), 15);
        }
    }

    #[test]
    fn same_seed_reproduces_the_layout() {
        let config = GameConfig::new((16, 16), 40).unwrap();

        let first = SafeStartGenerator::new(42, (8, 8)).generate(config).unwrap();
        let second = SafeStartGenerator::new(42, (8, 8)).generate(config).unwrap();
        let other = SafeStartGenerator::new(43, (8, 8)).generate(config).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn rejects_boards_with_no_room_outside_the_safe_zone() {
        let config = GameConfig::new((3, 3), 8).unwrap();

        let result = SafeStartGenerator::new(0, (1, 1)).generate(config);

        assert_eq!(result, Err(GameError::InvalidMineCount));
    }

    #[test]
    fn a_full_corner_start_still_fits() {
        // corner safe zone covers 4 cells, leaving exactly 5 free
        let config = GameConfig::new((3, 3), 5).unwrap();

        let placement = SafeStartGenerator::new(3, (0, 0)).generate(config).unwrap();

        assert_eq!(placement.mine_count(), 5);
        assert!(!placement.contains_mine((0, 0)));
        assert!(!placement.contains_mine((0, 1)));
        assert!(!placement.contains_mine((1, 0)));
        assert!(!placement.contains_mine((1, 1)));
    }
}

use crate::*;
pub use random::*;

mod random;

/// Strategy seam for mine placement.
pub trait PlacementGenerator {
    fn generate(self, config: GameConfig) -> Result<MinePlacement>;
}

use serde::{Deserialize, Serialize};

use crate::GameState;

/// Per-cell player state stored by the board.
///
/// Flagged and uncovered are distinct variants, so a cell can never be both
/// at once. The adjacent-mine count travels with the uncovered variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardCell {
    Covered,
    Flagged,
    Uncovered(u8),
}

impl BoardCell {
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Covered)
    }
}

impl Default for BoardCell {
    fn default() -> Self {
        Self::Covered
    }
}

/// Read-only projection of one cell, derived from the board cell and the
/// current game state. Recomputed on every query, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Covered,
    Uncovered(u8),
    Flagged,
    IncorrectlyFlagged,
    Mine,
    Detonated,
}

/// Derivation order matters: the first matching rule wins. Mines stay hidden
/// until the game ends, and a wrong flag only becomes visible on defeat.
pub(crate) fn project(
    cell: BoardCell,
    has_mine: bool,
    detonated: bool,
    state: GameState,
) -> CellView {
    match cell {
        BoardCell::Uncovered(count) => CellView::Uncovered(count),
        _ if detonated => CellView::Detonated,
        BoardCell::Flagged if !has_mine && matches!(state, GameState::Defeat) => {
            CellView::IncorrectlyFlagged
        }
        BoardCell::Flagged => CellView::Flagged,
        BoardCell::Covered if has_mine && state.is_terminal() => CellView::Mine,
        _ => CellView::Covered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncovered_cell_shows_its_count() {
        let view = project(BoardCell::Uncovered(3), false, false, GameState::InProgress);
        assert_eq!(view, CellView::Uncovered(3));
    }

    #[test]
    fn detonated_mine_is_visible() {
        let view = project(BoardCell::Covered, true, true, GameState::Defeat);
        assert_eq!(view, CellView::Detonated);
    }

    #[test]
    fn wrong_flag_is_hidden_until_defeat() {
        let during_play = project(BoardCell::Flagged, false, false, GameState::InProgress);
        assert_eq!(during_play, CellView::Flagged);

        let after_defeat = project(BoardCell::Flagged, false, false, GameState::Defeat);
        assert_eq!(after_defeat, CellView::IncorrectlyFlagged);
    }

    #[test]
    fn correct_flag_stays_a_flag_after_the_game() {
        let view = project(BoardCell::Flagged, true, false, GameState::Defeat);
        assert_eq!(view, CellView::Flagged);
    }

    #[test]
    fn covered_mine_is_revealed_only_at_terminal_states() {
        let during_play = project(BoardCell::Covered, true, false, GameState::InProgress);
        assert_eq!(during_play, CellView::Covered);

        let after_victory = project(BoardCell::Covered, true, false, GameState::Victory);
        assert_eq!(after_victory, CellView::Mine);

        let after_defeat = project(BoardCell::Covered, true, false, GameState::Defeat);
        assert_eq!(after_defeat, CellView::Mine);
    }

    #[test]
    fn plain_covered_cell_stays_covered() {
        let view = project(BoardCell::Covered, false, false, GameState::Victory);
        assert_eq!(view, CellView::Covered);
    }
}

use std::collections::{BTreeSet, VecDeque};

use chrono::prelude::*;
use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress (mines placed)
/// - InProgress -> Defeat (a mine was uncovered)
/// - InProgress -> Victory (every safe cell uncovered)
/// - any -> NotStarted (reset discarding mines)
/// - any with mines -> InProgress (reset keeping mines)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    InProgress,
    Defeat,
    Victory,
}

impl GameState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Defeat | Self::Victory)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Rectangular minefield: mine layout, per-cell reveal/flag state, win/loss
/// detection and elapsed-time bookkeeping.
///
/// Mutators return an error before mines are placed, and collapse to no-ops
/// once the game reached a terminal state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineField {
    config: GameConfig,
    placement: Option<MinePlacement>,
    board: Array2<BoardCell>,
    uncovered_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    detonated: Option<Coord2>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl MineField {
    /// New field with no mines placed yet; `init` picks the layout later.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            placement: None,
            board: Array2::default(config.size.to_nd_index()),
            uncovered_count: 0,
            flagged_count: 0,
            state: Default::default(),
            detonated: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Field with an explicit mine list, ready to play. Used to build
    /// reproducible boards.
    pub fn with_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let placement = MinePlacement::from_mine_coords(size, mine_coords)?;
        let config = GameConfig::new(size, placement.mine_count())?;

        let mut field = Self::new(config);
        field.placement = Some(placement);
        field.state = GameState::InProgress;
        field.started_at = Some(Utc::now());
        Ok(field)
    }

    /// Places mines at random, keeping the clamped 3x3 neighbourhood of
    /// `start` mine-free, and starts the clock.
    pub fn init(&mut self, start: Coord2, seed: u64) -> Result<()> {
        if !matches!(self.state, GameState::NotStarted) {
            return Err(GameError::AlreadyInitialized);
        }
        let start = self.config.validate_coords(start)?;

        let placement = SafeStartGenerator::new(seed, start).generate(self.config)?;
        log::debug!(
            "placed {} mines on a {:?} board, safe start {:?}",
            placement.mine_count(),
            self.config.size,
            start
        );

        self.placement = Some(placement);
        self.state = GameState::InProgress;
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// How many mines are not flagged yet; negative with excess flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    /// The mine that ended the game, if it ended in defeat.
    pub fn detonated_mine(&self) -> Option<Coord2> {
        self.detonated
    }

    /// Seconds since mines were placed, frozen once the game ends.
    /// 0 before initialization.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    pub fn visible_cell(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.project_at(coords))
    }

    /// Projection of the whole grid in row-major order.
    pub fn iter_visible(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        self.board.indexed_iter().map(|((row, col), _)| {
            let coords = (row as Coord, col as Coord);
            (coords, self.project_at(coords))
        })
    }

    pub fn neighbours(&self, coords: Coord2) -> SmallVec<[Coord2; 8]> {
        self.config.neighbours(coords)
    }

    /// Flips the flag on a covered cell; uncovered cells are left alone.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_started()?;
        if self.state.is_terminal() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            BoardCell::Covered => {
                self.board[coords.to_nd_index()] = BoardCell::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Changed
            }
            BoardCell::Flagged => {
                self.board[coords.to_nd_index()] = BoardCell::Covered;
                self.flagged_count -= 1;
                FlagOutcome::Changed
            }
            BoardCell::Uncovered(_) => FlagOutcome::NoChange,
        })
    }

    /// One-way flag used when a deduction proves a mine; never unflags.
    pub fn force_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_started()?;
        if self.state.is_terminal() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            BoardCell::Covered => {
                self.board[coords.to_nd_index()] = BoardCell::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Changed
            }
            BoardCell::Flagged | BoardCell::Uncovered(_) => FlagOutcome::NoChange,
        })
    }

    /// Uncovers one cell. Flagged and already-uncovered cells are skipped, a
    /// mine ends the game, a zero-count cell cascades over its neighbours.
    pub fn uncover(&mut self, coords: Coord2) -> Result<UncoverOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_started()?;
        if self.state.is_terminal() {
            return Ok(UncoverOutcome::NoChange);
        }

        Ok(self.uncover_single(coords))
    }

    /// Chord: when the flags around an uncovered cell account for all of its
    /// mines, uncovers every remaining neighbour in one step.
    pub fn uncover_neighbours(&mut self, coords: Coord2) -> Result<UncoverOutcome> {
        let coords = self.config.validate_coords(coords)?;
        self.check_started()?;
        if self.state.is_terminal() {
            return Ok(UncoverOutcome::NoChange);
        }

        let BoardCell::Uncovered(count) = self.board[coords.to_nd_index()] else {
            return Ok(UncoverOutcome::NoChange);
        };
        if count != self.flagged_neighbour_count(coords) {
            return Ok(UncoverOutcome::NoChange);
        }

        Ok(self
            .neighbours(coords)
            .into_iter()
            .map(|pos| self.uncover_single(pos))
            .reduce(BitOr::bitor)
            .unwrap_or(UncoverOutcome::NoChange))
    }

    /// Clears reveal/flag state. With `keep_mines` the same layout is played
    /// again from a fresh clock; without it the field returns to its
    /// uninitialized state.
    pub fn reset(&mut self, keep_mines: bool) {
        self.board.fill(BoardCell::Covered);
        self.uncovered_count = 0;
        self.flagged_count = 0;
        self.detonated = None;

        if keep_mines && self.placement.is_some() {
            self.state = GameState::InProgress;
            self.started_at = Some(Utc::now());
            self.ended_at = None;
        } else {
            self.placement = None;
            self.state = GameState::NotStarted;
            self.started_at = None;
            self.ended_at = None;
        }
        log::debug!("board reset, keep_mines: {keep_mines}, state: {:?}", self.state);
    }

    pub(crate) fn project_at(&self, coords: Coord2) -> CellView {
        project(
            self.board[coords.to_nd_index()],
            self.has_mine(coords),
            self.detonated == Some(coords),
            self.state,
        )
    }

    fn uncover_single(&mut self, coords: Coord2) -> UncoverOutcome {
        let cell = self.board[coords.to_nd_index()];
        let has_mine = self.has_mine(coords);

        match (cell, has_mine) {
            (BoardCell::Covered, true) => {
                self.detonated = Some(coords);
                log::debug!("mine detonated at {:?}", coords);
                self.end_game(false);
                UncoverOutcome::Detonated
            }
            (BoardCell::Covered, false) => {
                let count = self.adjacent_mines(coords);
                self.board[coords.to_nd_index()] = BoardCell::Uncovered(count);
                self.uncovered_count += 1;
                log::trace!("uncovered {:?}, adjacent mines: {count}", coords);

                if count == 0 {
                    self.cascade(coords);
                }

                if self.uncovered_count == self.safe_cell_count() {
                    self.end_game(true);
                    UncoverOutcome::Won
                } else {
                    UncoverOutcome::Safe
                }
            }
            _ => UncoverOutcome::NoChange,
        }
    }

    /// Worklist flood fill from a zero-count cell. Flagged cells block the
    /// cascade; non-zero cells are uncovered but not expanded.
    fn cascade(&mut self, from: Coord2) {
        let mut visited = BTreeSet::from([from]);
        let mut to_visit: VecDeque<Coord2> = self
            .neighbours(from)
            .into_iter()
            .filter(|&pos| self.board[pos.to_nd_index()].is_covered())
            .collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if !self.board[coords.to_nd_index()].is_covered() {
                continue;
            }

            let count = self.adjacent_mines(coords);
            self.board[coords.to_nd_index()] = BoardCell::Uncovered(count);
            self.uncovered_count += 1;
            log::trace!("cascade uncovered {:?}, adjacent mines: {count}", coords);

            if count == 0 {
                let next: SmallVec<[Coord2; 8]> = self
                    .neighbours(coords)
                    .into_iter()
                    .filter(|&pos| self.board[pos.to_nd_index()].is_covered())
                    .filter(|pos| !visited.contains(pos))
                    .collect();
                to_visit.extend(next);
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_terminal() {
            return;
        }

        self.state = if won {
            GameState::Victory
        } else {
            GameState::Defeat
        };
        self.ended_at = Some(Utc::now());
        log::debug!("game ended after {}s: {:?}", self.elapsed_secs(), self.state);
    }

    fn flagged_neighbour_count(&self, coords: Coord2) -> u8 {
        self.neighbours(coords)
            .iter()
            .filter(|&&pos| matches!(self.board[pos.to_nd_index()], BoardCell::Flagged))
            .count() as u8
    }

    fn check_started(&self) -> Result<()> {
        if matches!(self.state, GameState::NotStarted) {
            Err(GameError::NotInitialized)
        } else {
            Ok(())
        }
    }

    fn has_mine(&self, coords: Coord2) -> bool {
        self.placement
            .as_ref()
            .is_some_and(|placement| placement.contains_mine(coords))
    }

    fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.placement
            .as_ref()
            .map_or(0, |placement| placement.adjacent_mine_count(coords))
    }

    fn safe_cell_count(&self) -> CellCount {
        self.placement
            .as_ref()
            .map_or(0, MinePlacement::safe_cell_count)
    }
}

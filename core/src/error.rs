use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    InvalidDimension,
    #[error("Mine count must leave room for safe cells")]
    InvalidMineCount,
    #[error("Coordinates outside the board")]
    OutOfBounds,
    #[error("Mines have already been placed")]
    AlreadyInitialized,
    #[error("Mines have not been placed yet")]
    NotInitialized,
}

pub type Result<T> = core::result::Result<T, GameError>;

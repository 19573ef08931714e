use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("start control is disabled until the current round has cooled down")]
    StartDisabled,
    #[error("no target with id {0}")]
    UnknownTarget(usize),
}

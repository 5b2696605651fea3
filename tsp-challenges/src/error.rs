use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("distance matrix must be square with at least 2 nodes, got {rows}x{cols}")]
    InvalidMatrixDimension { rows: usize, cols: usize },
    #[error("distance from {from} to {to} must be finite and positive, got {value}")]
    DegenerateDistance { from: usize, to: usize, value: f64 },
    #[error("{nodes} nodes exceeds the exact solver limit of {max}")]
    TooManyNodes { nodes: usize, max: usize },
    #[error("start node {start} is out of range for {nodes} nodes")]
    StartOutOfRange { start: usize, nodes: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid tour: {0}")]
    InvalidTour(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the voxcarve engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("node index {index} is out of range (store holds {len} nodes)")]
    OutOfRange { index: usize, len: usize },

    #[error("material id {0} is outside [0, 255]")]
    MaterialOutOfRange(u32),

    #[error("material id {0} is not registered")]
    UnregisteredMaterial(u8),

    #[error("field returned non-finite distance {value} at node {index}")]
    NonFiniteField { index: usize, value: f32 },

    #[error("mesh of {leaves} leaves exceeds the 32-bit index range")]
    MeshTooLarge { leaves: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

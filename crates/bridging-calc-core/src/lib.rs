pub mod bridging;
pub mod config;
pub mod error;
pub mod trace;
pub mod types;

pub use error::BridgingError;
pub use types::*;

/// Standard result type for all bridging-calc operations
pub type BridgingResult<T> = Result<T, BridgingError>;

//! Domain result type

use super::error::DomainError;

/// Standard result type for controller and engine operations
pub type Result<T> = std::result::Result<T, DomainError>;

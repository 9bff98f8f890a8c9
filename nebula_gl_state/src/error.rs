//! Error types for the state cache
//!
//! This module defines the error taxonomy used throughout the crate:
//! contract violations (programmer errors), device failures (propagated
//! from the backend applier) and registry misuse.

use std::fmt;

/// Result type for state cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// State cache errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Caller broke the cache contract: unbalanced pop, a range past a
    /// device limit, or an unavailable extended capability
    ContractViolation(String),

    /// The backend applier rejected a forwarded call
    DeviceFailure(String),

    /// Registry misuse (context not initialized, no current instance)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::DeviceFailure(msg) => write!(f, "Device failure: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log a contract violation and produce it as an error value
///
/// # Example
///
/// ```ignore
/// let err = state_err!("nebulagl::BindingTable", "slot {} out of range", slot);
/// ```
#[macro_export]
macro_rules! state_err {
    ($source:expr, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::state_error!($source, "{}", msg);
        $crate::nebulagl::Error::ContractViolation(msg)
    }};
}

/// Log a contract violation and bail out of the current function
///
/// # Example
///
/// ```ignore
/// if count > limit {
///     state_bail!("nebulagl::ViewportState", "count {} exceeds limit {}", count, limit);
/// }
/// ```
#[macro_export]
macro_rules! state_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::state_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

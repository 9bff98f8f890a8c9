/// Current-context registry for the state cache.
///
/// Each rendering context owns one StateManager, and the device contract
/// allows one context to be current per thread. Resource-lifecycle code
/// raises release notifications without holding a reference to the owning
/// cache, so this registry maps "currently activated context" to the cache
/// instance that must process them. Activation is an explicit pointer swap,
/// performed only during context transitions, never during steady-state
/// rendering.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use crate::device::ResourceRef;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, Logger, LogSeverity};
use crate::state::StateManager;

// ===== INTERNAL STATE =====

/// Global registry storage
static CONTEXT_STATE: OnceLock<ContextState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state holding the current cache instance
struct ContextState {
    /// Cache of the context current on the process (wrapped in Mutex for
    /// thread-safe mutable access)
    current: RwLock<Option<Arc<Mutex<StateManager>>>>,
}

impl ContextState {
    fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Context activation registry
///
/// Tracks which cache instance receives release notifications and provides
/// the crate-wide logging sink.
///
/// # Example
///
/// ```ignore
/// use std::sync::{Arc, Mutex};
/// use nebula_gl_state::nebulagl::Context;
/// use nebula_gl_state::nebulagl::state::StateManager;
///
/// Context::initialize()?;
///
/// // One cache per rendering context
/// let cache = Arc::new(Mutex::new(StateManager::new(backend_applier)));
///
/// // Activate alongside the native MakeCurrent call
/// Context::make_current(cache.clone())?;
///
/// // ... render ...
///
/// Context::clear_current()?;
/// # Ok::<(), nebula_gl_state::nebulagl::Error>(())
/// ```
pub struct Context;

impl Context {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::state_error!("nebulagl::Context", "{}", error);
        error
    }

    /// Initialize the registry
    ///
    /// Must be called once at application startup before activating a cache.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        CONTEXT_STATE.get_or_init(ContextState::new);
        Ok(())
    }

    /// Drop the current instance (application / context teardown)
    ///
    /// Pending release notifications after this point become no-ops.
    pub fn shutdown() {
        if let Some(state) = CONTEXT_STATE.get() {
            if let Ok(mut current) = state.current.write() {
                *current = None;
            }
        }
    }

    /// Make `cache` the instance that receives release notifications
    ///
    /// Call this alongside the native make-current call of the windowing
    /// layer. A previously current instance is replaced: making a different
    /// context current is exactly that deliberate swap.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is not initialized.
    pub fn make_current(cache: Arc<Mutex<StateManager>>) -> Result<()> {
        let state = CONTEXT_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Context not initialized. Call Context::initialize() first.".to_string())
            ))?;

        let mut current = state.current.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context lock poisoned".to_string())
            ))?;

        *current = Some(cache);

        crate::state_info!("nebulagl::Context", "state cache made current");

        Ok(())
    }

    /// Detach the current instance without replacing it
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is not initialized.
    pub fn clear_current() -> Result<()> {
        let state = CONTEXT_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Context not initialized".to_string())
            ))?;

        let mut current = state.current.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context lock poisoned".to_string())
            ))?;

        *current = None;

        crate::state_info!("nebulagl::Context", "state cache detached");

        Ok(())
    }

    /// Get the currently activated cache instance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The registry is not initialized
    /// - No cache has been made current
    pub fn current() -> Result<Arc<Mutex<StateManager>>> {
        let state = CONTEXT_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Context not initialized. Call Context::initialize() first.".to_string())
            ))?;

        let current = state.current.read()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context lock poisoned".to_string())
            ))?;

        current.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("No state cache is current. Call Context::make_current() first.".to_string())
            ))
    }

    /// Route a resource release to the currently activated cache
    ///
    /// Must run synchronously as part of resource destruction, before the
    /// handle value becomes eligible for reuse. With no current instance
    /// this is a safe no-op: the resource belonged to a context that was
    /// never cached or has already been torn down.
    pub fn notify_release(resource: ResourceRef) {
        let Some(state) = CONTEXT_STATE.get() else {
            return;
        };
        let current = match state.current.read() {
            Ok(current) => current.clone(),
            Err(_) => return,
        };
        if let Some(cache) = current {
            if let Ok(mut cache) = cache.lock() {
                cache.invalidate_resource(resource);
            }
        }
    }

    /// Reset the registry for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = CONTEXT_STATE.get() {
            if let Ok(mut current) = state.current.write() {
                *current = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file
    /// logger, capture logger for tests, etc.)
    ///
    /// # Arguments
    ///
    /// * `logger` - Any type implementing the Logger trait
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like state_info!, state_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the state_error! macro to include the source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/*!
# Nebula GL State

Device state cache for OpenGL-style backends of the Nebula rendering stack.

Stateful graphics devices make redundant state changes expensive: every
`bind`/`enable` crosses the driver boundary even when nothing observable
changes. This crate tracks the device's believed state per rendering context,
elides calls that would be no-ops, and keeps its belief honest across
resource destruction and handle reuse.

## Architecture

- **StateManager**: per-context cache facade; every state change is a
  compare-and-maybe-forward against a backend `Applier`
- **Applier**: the narrow trait backends implement (the native device calls)
- **Context**: current-instance registry; routes resource release
  notifications to whichever cache is current on the thread
- Component caches: boolean capabilities, binding slot tables, the texture
  unit/target matrix, viewport/scissor arrays, common raster state

Backend implementations provide the `Applier`; the cache only decides whether
to invoke it and never issues a native call itself.
*/

// Internal modules
mod error;
mod context;
pub mod log;
pub mod device;
pub mod state;

// Main nebulagl namespace module
pub mod nebulagl {
    // Error types
    pub use crate::error::{Error, Result};

    // Current-context registry
    pub use crate::context::Context;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: state_* macros are NOT re-exported here - they are internal only
    }

    // Device boundary sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // State cache sub-module
    pub mod state {
        pub use crate::state::*;
    }
}

/// State cache module - all cached device state components

// Module declarations
pub mod scope;
pub mod capability;
pub mod binding;
pub mod texture;
pub mod common;
pub mod viewport;
pub mod state_manager;

// Re-exports
pub use scope::*;
pub use capability::*;
pub use binding::*;
pub use texture::*;
pub use common::*;
pub use viewport::*;
pub use state_manager::*;

//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<T>>` handles shared across threads.

pub mod aliases;

pub use aliases::*;

//! Type aliases for shared state.
//!
//! Usage counters are bumped from whichever thread runs an import or a
//! raster job, so the handles that carry them are thread-safe.
//!
//! ```rust,ignore
//! use grblstats_core::types::*;
//!
//! // Instead of: Arc<Mutex<UsageCounters>>
//! let counters: ThreadSafe<UsageCounters> = thread_safe(UsageCounters::default());
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Wrap a value in a [`ThreadSafe`] handle.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

//! Synchronization Primitives
//!
//! Safe synchronization and global state management for Rust 2024 edition,
//! plus the classic kernel-level wait-and-signal primitives built on the
//! scheduler's wait channels: [`Semaphore`], [`Lock`], and [`CondVar`].

pub mod condvar;
pub mod lock;
pub mod once_lock;
pub mod semaphore;

pub use condvar::CondVar;
pub use lock::Lock;
pub use once_lock::{GlobalState, LazyLock, OnceLock};
pub use semaphore::Semaphore;

//! Small integer ids for producer threads, reported as `it`.

use std::sync::atomic::{AtomicI32, Ordering};

pub trait ThreadIdProvider: Send + Sync {
    /// Id of the calling thread. Stable for the lifetime of the thread.
    fn thread_id(&self) -> i32;
}

static NEXT_THREAD_ID: AtomicI32 = AtomicI32::new(1);

thread_local! {
    static THREAD_ID: i32 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Assigns ids in the order threads first ask for one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultThreadIdProvider;

impl ThreadIdProvider for DefaultThreadIdProvider {
    fn thread_id(&self) -> i32 {
        THREAD_ID.with(|id| *id)
    }
}

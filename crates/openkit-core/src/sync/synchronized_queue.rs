//! Mutex guarded FIFO queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A FIFO queue safe to share between producer threads and the worker.
///
/// Every operation holds the lock for its own duration only; snapshots are
/// copies and never observe later modifications.
#[derive(Debug)]
pub struct SynchronizedQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for SynchronizedQueue<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> SynchronizedQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append to the back.
    pub fn put(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Remove and return the front element.
    pub fn get(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Remove the first element matching `predicate`. Returns it if found.
    pub fn remove_where<F>(&self, predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut items = self.lock();
        let index = items.iter().position(predicate)?;
        items.remove(index)
    }

    /// Drain every element, front to back.
    pub fn drain_all(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

impl<T: Clone> SynchronizedQueue<T> {
    /// Copy of the current contents, front to back.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}

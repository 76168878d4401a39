//! Concurrency primitives shared across the pipeline.

pub mod synchronized_queue;

pub use synchronized_queue::SynchronizedQueue;

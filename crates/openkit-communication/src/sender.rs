//! The background worker driving the sending state machine.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use openkit_core::constants::BEACON_SENDING_THREAD_NAME;
use openkit_core::{OpenKitError, OpenKitResult};

use crate::context::BeaconSendingContext;

/// Owns the worker thread. The thread executes state steps until the
/// context reaches its terminal state.
#[derive(Debug)]
pub struct BeaconSender {
    context: Arc<BeaconSendingContext>,
    handle: Mutex<Option<JoinHandle<()>>>,
    started: Mutex<bool>,
}

impl BeaconSender {
    pub fn new(context: Arc<BeaconSendingContext>) -> Self {
        Self {
            context,
            handle: Mutex::new(None),
            started: Mutex::new(false),
        }
    }

    pub fn context(&self) -> &Arc<BeaconSendingContext> {
        &self.context
    }

    /// Spawn the worker. Fails if it was spawned before.
    pub fn initialize(&self) -> OpenKitResult<()> {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        if *started {
            return Err(OpenKitError::AlreadyInitialized);
        }

        let context = Arc::clone(&self.context);
        let handle = thread::Builder::new()
            .name(BEACON_SENDING_THREAD_NAME.to_string())
            .spawn(move || Self::run(&context))
            .map_err(|e| OpenKitError::WorkerSpawn {
                reason: e.to_string(),
            })?;

        *started = true;
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    fn run(context: &BeaconSendingContext) {
        tracing::debug!("beacon sending worker started");
        while !context.is_in_terminal_state() {
            context.execute_current_state();
        }
        tracing::debug!("beacon sending worker finished");
    }

    pub fn wait_for_init(&self) -> bool {
        self.context.wait_for_init()
    }

    pub fn wait_for_init_timeout(&self, timeout: Duration) -> bool {
        self.context.wait_for_init_timeout(timeout)
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_initialized()
    }

    /// Request shutdown and wait for the worker to flush and exit.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        self.context.request_shutdown();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("beacon sending worker panicked");
            }
        }
    }
}

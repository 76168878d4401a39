//! States of the beacon sending worker.
//!
//! Each state runs one step against the [`BeaconSendingContext`] and returns
//! the state to continue with. Shutdown is checked before a step (no new
//! network work once it is observed) and again after it.

mod capture_off;
mod capture_on;
mod flush_sessions;
mod init;
mod time_sync;

use std::fmt;

use crate::context::BeaconSendingContext;

pub use time_sync::median_offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconSendingState {
    /// Initial status request with retries.
    Init,
    /// Cluster time offset estimation.
    TimeSync,
    /// Capturing: periodically upload finished and open sessions.
    CaptureOn,
    /// Not capturing: periodically ask whether capture was re-enabled.
    CaptureOff,
    /// Shutdown in progress: end and upload every session.
    FlushSessions,
    Terminal,
}

impl BeaconSendingState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::TimeSync => "TimeSync",
            Self::CaptureOn => "CaptureOn",
            Self::CaptureOff => "CaptureOff",
            Self::FlushSessions => "FlushSessions",
            Self::Terminal => "Terminal",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// State entered when shutdown is requested while in `self`.
    pub fn shutdown_state(&self) -> Self {
        match self {
            Self::Init | Self::FlushSessions | Self::Terminal => Self::Terminal,
            Self::TimeSync | Self::CaptureOn | Self::CaptureOff => Self::FlushSessions,
        }
    }

    /// Run one step and return the next state.
    pub fn execute(self, ctx: &BeaconSendingContext) -> Self {
        let _span = openkit_core::state_span!(self.name()).entered();

        let runs_during_shutdown = matches!(self, Self::FlushSessions | Self::Terminal);
        if ctx.is_shutdown_requested() && !runs_during_shutdown {
            return self.on_shutdown(ctx);
        }

        let next = match self {
            Self::Init => init::execute(ctx),
            Self::TimeSync => time_sync::execute(ctx),
            Self::CaptureOn => capture_on::execute(ctx),
            Self::CaptureOff => capture_off::execute(ctx),
            Self::FlushSessions => flush_sessions::execute(ctx),
            Self::Terminal => {
                ctx.request_shutdown();
                Self::Terminal
            }
        };

        if ctx.is_shutdown_requested() {
            return self.on_shutdown(ctx);
        }
        next
    }

    fn on_shutdown(&self, ctx: &BeaconSendingContext) -> Self {
        if matches!(self, Self::Init) {
            ctx.init_completed(false);
        }
        self.shutdown_state()
    }
}

impl fmt::Display for BeaconSendingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CaptureOn or CaptureOff, whichever the current capture policy says.
fn capture_state(ctx: &BeaconSendingContext) -> BeaconSendingState {
    if ctx.is_capture_on() {
        BeaconSendingState::CaptureOn
    } else {
        BeaconSendingState::CaptureOff
    }
}

//! Progress and output reporting.
//!
//! The solver owns the time loop; everything it produces — pressure
//! frames, receiver samples, status transitions, warnings — flows out
//! through a [`SimulationCallback`] supplied by the caller.

use crate::id::{DomainId, ReceiverId};

/// Coarse lifecycle state reported through [`SimulationCallback::on_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
    /// The solver is about to enter the time loop.
    Starting,
    /// A frame has completed.
    Running,
    /// The time loop finished normally.
    Finished,
    /// The run is aborting; the accompanying message explains why.
    Error,
}

/// Receives solver output and progress notifications.
///
/// All methods default to no-ops so implementors only handle the
/// channels they care about. Methods are invoked from the solver's
/// thread, strictly in frame order.
pub trait SimulationCallback {
    /// Lifecycle notification. `frame` is present for
    /// [`SimulationStatus::Running`] reports.
    fn on_status(&mut self, status: SimulationStatus, message: &str, frame: Option<usize>) {
        let _ = (status, message, frame);
    }

    /// A pressure frame for one domain, row-major, `width * height`
    /// samples. Emitted every n-th frame per the settings, for
    /// configured domains only (absorbing layers are not reported).
    fn on_frame(&mut self, frame: usize, domain: DomainId, width: usize, height: usize, data: &[f32]) {
        let _ = (frame, domain, width, height, data);
    }

    /// The pressure sampled at one receiver for one saved frame.
    fn on_sample(&mut self, frame: usize, receiver: ReceiverId, value: f32) {
        let _ = (frame, receiver, value);
    }

    /// A non-fatal condition, e.g. a degraded derivative window.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }
}

/// A callback that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCallback;

impl SimulationCallback for NullCallback {}

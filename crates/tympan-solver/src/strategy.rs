//! Execution strategies for the per-domain work inside a sub-step.

use tympan_core::SolverError;

/// How the derivative passes of each sub-step are scheduled.
///
/// Derivatives are pure reads of the frame's field state, so the
/// per-domain passes are independent; the strategies differ only in
/// how that independence is exploited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One domain after another on the calling thread.
    #[default]
    Sequential,
    /// Domains fan out across a rayon thread pool; results are
    /// committed in domain order, so output is identical to
    /// [`Strategy::Sequential`].
    Parallel,
    /// GPU offload. Not available in this build.
    Gpu,
}

impl Strategy {
    /// Check that this strategy can run.
    pub fn ensure_available(self) -> Result<(), SolverError> {
        match self {
            Strategy::Sequential | Strategy::Parallel => Ok(()),
            Strategy::Gpu => Err(SolverError::StrategyUnavailable { strategy: "gpu" }),
        }
    }
}

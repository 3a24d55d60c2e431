//! The frame loop: six Runge-Kutta sub-steps per frame, followed by
//! PML attenuation, receiver sampling, and frame emission.

use std::collections::HashSet;

use rayon::prelude::*;

use tympan_core::{Axis, DomainId, SimulationCallback, SimulationStatus, SolverError};
use tympan_scene::{Scene, StepDerivatives};
use tympan_spectral::WavenumberCache;

use crate::strategy::Strategy;

/// Run the simulation to completion.
///
/// Each frame snapshots the field state, runs six sub-steps — every
/// sub-step computes the four spectral derivatives for every domain,
/// then integrates all domains from the snapshot over that stage's
/// step fraction — applies the absorbing layers, and on saved frames
/// samples the receivers and emits pressure frames.
pub fn run(
    scene: &mut Scene,
    strategy: Strategy,
    callback: &mut dyn SimulationCallback,
) -> Result<(), SolverError> {
    strategy.ensure_available()?;

    let cache = WavenumberCache::new();
    let frame_count = scene.settings().frame_count();
    let save_nth = scene.settings().save_nth_frame();
    let ids = scene.domain_ids();
    let mut warned: HashSet<(DomainId, Axis)> = HashSet::new();

    callback.on_status(SimulationStatus::Starting, "starting simulation", None);
    for frame in 0..frame_count {
        callback.on_status(
            SimulationStatus::Running,
            &format!("calculating frame {}", frame + 1),
            Some(frame),
        );
        scene.push_values();

        for stage in 0..6 {
            let steps = compute_derivatives(scene, strategy, &ids, &cache);
            for (id, step) in steps {
                for axis in [Axis::X, Axis::Y] {
                    if step.degraded[axis as usize] && warned.insert((id, axis)) {
                        callback.on_warning(&format!(
                            "derivative window ran out of samples for domain {id} along {axis}; \
                             missing samples taken as zero"
                        ));
                    }
                }
                scene.commit_derivatives(id, step);
            }
            scene.apply_stage(stage);
        }

        scene.apply_pml_attenuation();

        // Frames and receiver samples share the save cadence; skipped
        // frames are never sampled at all.
        if frame % save_nth == 0 {
            for receiver in scene.receivers().to_vec() {
                let value = scene
                    .sample_receiver(&receiver, &cache)
                    .map_err(|reason| SolverError::Scene { reason })?;
                callback.on_sample(frame, receiver.id, value as f32);
            }
            for d in scene.domains().filter(|d| !d.is_pml()) {
                let size = d.rect().size;
                callback.on_frame(frame, d.id(), size.width, size.height, &d.pressure_frame());
            }
        }
    }
    callback.on_status(SimulationStatus::Finished, "simulation finished", None);
    Ok(())
}

fn compute_derivatives(
    scene: &Scene,
    strategy: Strategy,
    ids: &[DomainId],
    cache: &WavenumberCache,
) -> Vec<(DomainId, StepDerivatives)> {
    match strategy {
        Strategy::Parallel => ids
            .par_iter()
            .map(|&id| (id, scene.step_derivatives(id, cache)))
            .collect(),
        _ => ids
            .iter()
            .map(|&id| (id, scene.step_derivatives(id, cache)))
            .collect(),
    }
}

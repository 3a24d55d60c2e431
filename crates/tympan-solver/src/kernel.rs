//! The kernel facade: validates a scene description, assembles the
//! scene, and runs the solver.

use tympan_core::{
    ConfigError, Direction, DomainId, KernelError, Point, ProbeKind, Rect, SceneDescription,
    Settings, SimulationCallback, SimulationStatus, Size,
};
use tympan_scene::Scene;

use crate::solver;
use crate::strategy::Strategy;

/// Grid-space facts about an assembled simulation, for consumers that
/// need to size their output buffers before the first frame arrives.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationMetadata {
    /// One entry per configured air domain, in description order.
    pub domains: Vec<DomainMetadata>,
    /// Number of frames the run will produce.
    pub frame_count: usize,
    /// Grid spacing in metres.
    pub grid_spacing: f64,
}

/// Grid-space shape of one configured domain.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainMetadata {
    /// The domain's ID in the assembled scene.
    pub id: DomainId,
    /// The domain's name.
    pub name: String,
    /// The grid rectangle it covers.
    pub rect: Rect,
}

/// A validated, assembled simulation ready to run.
#[derive(Clone, Debug)]
pub struct Kernel {
    scene: Scene,
}

impl Kernel {
    /// Validate `description` and assemble the scene: air domains
    /// converted to grid units, absorbing layers synthesized, sources
    /// stamped, receivers placed, and the derived tables computed.
    pub fn new(description: &SceneDescription) -> Result<Self, KernelError> {
        let settings = Settings::new(description.parameters.clone())?;
        if description.domains.is_empty() {
            return Err(ConfigError::EmptyScene.into());
        }

        let dx = settings.grid_spacing();
        let mut scene = Scene::new(settings);
        for (index, spec) in description.domains.iter().enumerate() {
            for direction in Direction::ALL {
                let edge = spec.edges.get(direction);
                if !(0.0..=1.0).contains(&edge.absorption) {
                    return Err(ConfigError::InvalidAbsorption {
                        index,
                        direction,
                        value: edge.absorption,
                    }
                    .into());
                }
            }
            let top_left = Point::new(
                (spec.top_left[0] / dx).round() as i32,
                (spec.top_left[1] / dx).round() as i32,
            );
            let width = (spec.size[0] / dx).round() as i32;
            let height = (spec.size[1] / dx).round() as i32;
            if width <= 0 || height <= 0 {
                return Err(ConfigError::DegenerateDomain { index }.into());
            }
            let rect = Rect::new(top_left, Size::new(width as usize, height as usize));
            scene.add_domain(format!("domain_{index}"), rect, spec.edges)?;
        }

        scene.add_pml_layers();

        // Probes live on the staggered pressure grid, half a cell off
        // the corner lattice the domains are defined on.
        let half = dx / 2.0;
        for (index, &[x, y]) in description.speakers.iter().enumerate() {
            let (sx, sy) = (x - half, y - half);
            locate(&scene, ProbeKind::Speaker, index, x, y, sx / dx, sy / dx)?;
            scene.add_speaker(sx, sy);
        }
        for (index, &[x, y]) in description.receivers.iter().enumerate() {
            let (gx, gy) = ((x - half) / dx, (y - half) / dx);
            let container = locate(&scene, ProbeKind::Receiver, index, x, y, gx, gy)?;
            scene.add_receiver([gx, gy], container);
        }

        scene.finalize();
        Ok(Self { scene })
    }

    /// The assembled scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The run's grid-space metadata.
    pub fn metadata(&self) -> SimulationMetadata {
        SimulationMetadata {
            domains: self
                .scene
                .domains()
                .filter(|d| !d.is_pml())
                .map(|d| DomainMetadata {
                    id: d.id(),
                    name: d.name().to_string(),
                    rect: d.rect(),
                })
                .collect(),
            frame_count: self.scene.settings().frame_count(),
            grid_spacing: self.scene.settings().grid_spacing(),
        }
    }

    /// Run the simulation, reporting progress and output through
    /// `callback`. A failure is reported as an error status before it
    /// is returned.
    pub fn run(
        &mut self,
        strategy: Strategy,
        callback: &mut dyn SimulationCallback,
    ) -> Result<(), KernelError> {
        match solver::run(&mut self.scene, strategy, callback) {
            Ok(()) => Ok(()),
            Err(e) => {
                callback.on_status(SimulationStatus::Error, &e.to_string(), None);
                Err(e.into())
            }
        }
    }
}

/// Find the unique air domain strictly containing a probe, in
/// fractional grid coordinates.
fn locate(
    scene: &Scene,
    kind: ProbeKind,
    index: usize,
    x: f64,
    y: f64,
    gx: f64,
    gy: f64,
) -> Result<DomainId, KernelError> {
    let containers = scene.containers_at(gx, gy);
    match containers.as_slice() {
        [] => Err(ConfigError::UnplacedProbe { kind, index, x, y }.into()),
        [only] => Ok(*only),
        _ => Err(ConfigError::AmbiguousProbeLocation { kind, index }.into()),
    }
}

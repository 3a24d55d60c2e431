//! The domain arena and everything that ties domains together:
//! adjacency, PML synthesis, interface coefficients, derivative
//! orchestration, and probe sampling.

use num_complex::Complex64;
use smallvec::SmallVec;

use tympan_core::{
    Axis, Direction, DomainId, EdgeMap, Field2, FieldKind, Point, Rect, ReceiverId, SceneError,
    Settings, Size, VACUUM_DENSITY,
};
use tympan_spectral::{rho_array, DerivativeInput, WavenumberCache};

use crate::boundary::Boundary;
use crate::domain::{pml_alpha, pml_corner, Domain, DomainKind, PmlAttenuation, RhoKey};
use crate::probe::{Receiver, Speaker};

/// The spectral derivatives computed for one domain in one sub-step.
///
/// `None` marks a pass the domain skips (rigid media, or a PML layer's
/// tangential axis); the previously committed derivative stays in
/// effect, which for a never-updated axis means zero.
#[derive(Clone, Debug, Default)]
pub struct StepDerivatives {
    /// Pressure derivative along x, on horizontal velocity nodes.
    pub dp_dx: Option<Field2>,
    /// Pressure derivative along y, on vertical velocity nodes.
    pub dp_dy: Option<Field2>,
    /// Horizontal velocity derivative along x, on pressure cells.
    pub du_dx: Option<Field2>,
    /// Vertical velocity derivative along y, on pressure cells.
    pub dw_dy: Option<Field2>,
    /// Per-axis flag set when a derivative window ran out of samples
    /// and zeros were substituted.
    pub degraded: [bool; 2],
}

/// The arena of all domains in a simulation, with the scene-wide
/// operations the solver drives.
#[derive(Clone, Debug)]
pub struct Scene {
    settings: Settings,
    domains: Vec<Domain>,
    boundaries: Vec<Boundary>,
    speakers: Vec<Speaker>,
    receivers: Vec<Receiver>,
}

impl Scene {
    /// An empty scene.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            domains: Vec::new(),
            boundaries: Vec::new(),
            speakers: Vec::new(),
            receivers: Vec::new(),
        }
    }

    /// The settings this scene was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// All domains, in insertion order.
    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.iter()
    }

    /// The IDs of all domains, in insertion order.
    pub fn domain_ids(&self) -> Vec<DomainId> {
        self.domains.iter().map(Domain::id).collect()
    }

    /// Look up a domain by ID.
    pub fn domain(&self, id: DomainId) -> Result<&Domain, SceneError> {
        self.domains
            .get(id.index())
            .ok_or(SceneError::UnknownDomain { id })
    }

    /// The recorded shared edges.
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// The registered sources.
    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    /// The registered receivers.
    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    fn next_id(&self) -> DomainId {
        DomainId(self.domains.len() as u32)
    }

    /// Add a configured air domain.
    ///
    /// Air domains may share edges but never interiors; an overlap is
    /// rejected here rather than producing a scene that double-counts
    /// the shared cells.
    pub fn add_domain(
        &mut self,
        name: impl Into<String>,
        rect: Rect,
        edges: EdgeMap,
    ) -> Result<DomainId, SceneError> {
        let id = self.next_id();
        for d in &self.domains {
            if d.rect().projected_overlap(&rect, Axis::X).is_some()
                && d.rect().projected_overlap(&rect, Axis::Y).is_some()
            {
                return Err(SceneError::OverlappingDomains { a: d.id(), b: id });
            }
        }
        let domain = Domain::new(id, name, DomainKind::Air, rect, 1.0, edges, &self.settings);
        Ok(self.insert(domain))
    }

    fn are_neighbours(&self, a: DomainId, b: DomainId) -> bool {
        Direction::ALL
            .iter()
            .any(|&dir| self.domains[a.index()].neighbours(dir).contains(&b))
    }

    /// Insert a domain and register adjacencies with the existing
    /// arena.
    ///
    /// PML layers only pair with their own parents (and with sibling
    /// layers whose parents are neighbours); an unrelated PML layer
    /// that happens to touch a domain is not a propagation neighbour.
    fn insert(&mut self, mut b: Domain) -> DomainId {
        let b_id = b.id();
        let mut links: Vec<(DomainId, Direction, (i32, i32))> = Vec::new();

        for a in &self.domains {
            if b.is_secondary_pml() && a.is_secondary_pml() {
                continue;
            }
            if b.is_secondary_pml() && !a.is_pml() {
                continue;
            }
            if a.is_secondary_pml() && !b.is_pml() {
                continue;
            }
            if b.is_pml() && a.is_pml() {
                let parented = (b.is_secondary_pml() && b.pml_for.contains(&a.id()))
                    || (a.is_secondary_pml() && a.pml_for.contains(&b_id));
                if !parented {
                    let siblings = a.pml_for.len() == 1
                        && b.pml_for.len() == 1
                        && self.are_neighbours(a.pml_for[0], b.pml_for[0])
                        && a.is_secondary_pml() == b.is_secondary_pml();
                    if !siblings {
                        continue;
                    }
                }
            }

            // Where does b sit relative to a? Edge coincidence plus a
            // shared run of cells along that edge.
            let ar = a.rect();
            let br = b.rect();
            let placement = if ar.top_left.x == br.bottom_right().x {
                ar.projected_overlap(&br, Axis::Y).map(|s| (Direction::Left, s))
            } else if ar.bottom_right().x == br.top_left.x {
                ar.projected_overlap(&br, Axis::Y).map(|s| (Direction::Right, s))
            } else if ar.top_left.y == br.bottom_right().y {
                ar.projected_overlap(&br, Axis::X).map(|s| (Direction::Top, s))
            } else if ar.bottom_right().y == br.top_left.y {
                ar.projected_overlap(&br, Axis::X).map(|s| (Direction::Bottom, s))
            } else {
                None
            };
            let Some((direction, span)) = placement else {
                continue;
            };

            let a_is_unrelated_pml = a.is_pml() && !b.is_pml() && !a.pml_for.contains(&b_id);
            let b_is_unrelated_pml = b.is_pml() && !a.is_pml() && !b.pml_for.contains(&a.id());
            if a_is_unrelated_pml || b_is_unrelated_pml {
                continue;
            }
            links.push((a.id(), direction, span));
        }

        for (a_id, direction, span) in links {
            let ar = self.domains[a_id.index()].rect();
            let (negative, positive, position) = match direction {
                Direction::Left => (b_id, a_id, ar.top_left.x),
                Direction::Right => (a_id, b_id, ar.bottom_right().x),
                Direction::Top => (b_id, a_id, ar.top_left.y),
                Direction::Bottom => (a_id, b_id, ar.bottom_right().y),
            };
            self.boundaries.push(Boundary {
                negative,
                positive,
                normal: direction.axis(),
                position,
                span,
            });
            self.domains[a_id.index()].neighbours[direction as usize].push(b_id);
            b.neighbours[direction.opposite() as usize].push(a_id);
        }

        self.domains.push(b);
        b_id
    }

    /// Surround every air domain with absorbing layers.
    ///
    /// Each uncovered run of each air-domain edge gets a primary layer
    /// whose absorption comes from that edge (floored at a tiny value,
    /// so a hard edge becomes a rigid reflecting layer). A primary
    /// layer that spans its parent's whole edge on an absorbing edge
    /// also spawns corner layers; corners meeting from two
    /// perpendicular edges of the same parent are merged into one.
    pub fn add_pml_layers(&mut self) {
        let n = self.settings.pml_cells();

        struct PrimarySpec {
            name: String,
            alpha: f64,
            rect: Rect,
            parent: DomainId,
            local: bool,
            corners: Vec<(Direction, f64, String)>,
        }

        let mut specs: Vec<PrimarySpec> = Vec::new();
        for d in self.domains.iter().filter(|d| !d.is_pml()) {
            for side in Direction::ALL {
                let ortho = side.axis().orthogonal();
                let ranges =
                    d.vacant_ranges(side, |nb| self.domains[nb.index()].rect().range(ortho));
                for (idx, &(r0, r1)) in ranges.iter().enumerate() {
                    let mut name = format!("{}_{}", d.name(), side);
                    if ranges.len() > 1 {
                        name.push_str(&format!("_{idx}"));
                    }
                    let edge_absorption = d.edges().get(side).absorption;
                    let alpha = pml_alpha(edge_absorption);
                    let size = if side.axis() == Axis::X {
                        Size::new(n, (r1 - r0) as usize)
                    } else {
                        Size::new((r1 - r0) as usize, n)
                    };
                    let rect = Rect::new(pml_corner(d.rect(), side, r0, n), size);
                    let full_overlap = (r0, r1) == d.rect().range(ortho);

                    let mut corners = Vec::new();
                    if edge_absorption > 0.0 && full_overlap {
                        for sec in Direction::ALL {
                            if sec.axis() == side.axis() {
                                continue;
                            }
                            let sec_alpha = pml_alpha(d.edges().get(sec).absorption).min(alpha);
                            corners.push((sec, sec_alpha, format!("{name}_{sec}")));
                        }
                    }
                    specs.push(PrimarySpec {
                        name,
                        alpha,
                        rect,
                        parent: d.id(),
                        local: !full_overlap,
                        corners,
                    });
                }
            }
        }

        let mut primary_ids = Vec::with_capacity(specs.len());
        for spec in &specs {
            let id = self.next_id();
            let mut layer = Domain::new(
                id,
                spec.name.clone(),
                DomainKind::Pml,
                spec.rect,
                spec.alpha,
                EdgeMap::default(),
                &self.settings,
            );
            layer.pml_for.push(spec.parent);
            layer.local = spec.local;
            self.insert(layer);
            primary_ids.push(id);
        }

        struct Candidate {
            primary: DomainId,
            parent: DomainId,
            side: Direction,
            alpha: f64,
            rect: Rect,
            name: String,
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        for (spec, &pid) in specs.iter().zip(&primary_ids) {
            for (side, alpha, name) in &spec.corners {
                let along = match side.axis() {
                    Axis::X => spec.rect.top_left.y,
                    Axis::Y => spec.rect.top_left.x,
                };
                let origin = pml_corner(spec.rect, *side, along, n);
                candidates.push(Candidate {
                    primary: pid,
                    parent: spec.parent,
                    side: *side,
                    alpha: *alpha,
                    rect: Rect::new(origin, Size::new(n, n)),
                    name: name.clone(),
                });
            }
        }
        // Sorting by the air parent and corner rectangle puts the two
        // proposals for one corner next to each other.
        candidates.sort_by_key(|c| {
            let br = c.rect.bottom_right();
            (
                c.parent,
                c.rect.top_left.x,
                c.rect.top_left.y,
                br.x,
                br.y,
            )
        });

        // Corners arriving from two perpendicular edges of the same
        // air domain land on identical rectangles; fold them into a
        // single layer that absorbs for both primaries.
        let mut survivors: Vec<(Candidate, SmallVec<[DomainId; 1]>)> = Vec::new();
        let mut open = false;
        for c in candidates {
            if !self.domains[c.primary.index()].neighbours(c.side).is_empty() {
                continue;
            }
            let merge = open
                && survivors
                    .last()
                    .map(|(p, _)| p.parent == c.parent && p.rect == c.rect)
                    .unwrap_or(false);
            if merge {
                let last = survivors.last_mut();
                if let Some((prev, extra)) = last {
                    prev.name.push('+');
                    prev.name.push_str(&c.name);
                    extra.push(c.primary);
                }
                open = false;
            } else {
                survivors.push((c, SmallVec::new()));
                open = true;
            }
        }

        for (c, extra) in survivors {
            let id = self.next_id();
            let mut layer = Domain::new(
                id,
                c.name,
                DomainKind::SecondaryPml,
                c.rect,
                c.alpha,
                EdgeMap::default(),
                &self.settings,
            );
            layer.pml_for.push(c.primary);
            layer.pml_for.extend(extra);
            self.insert(layer);
        }
    }

    /// Compute the derived per-domain tables once the topology is
    /// frozen: interface coefficients, PML attenuation profiles, and
    /// the per-axis update flags.
    pub fn finalize(&mut self) {
        self.compute_rho_arrays();
        self.compute_pml_attenuation();
    }

    fn compute_rho_arrays(&mut self) {
        let mut tables = Vec::with_capacity(self.domains.len());
        for d in &self.domains {
            let mut table = indexmap::IndexMap::<RhoKey, _>::new();
            for axis in [Axis::X, Axis::Y] {
                let (neg_dir, pos_dir) = axis.directions();
                for &n1 in &option_list(d.neighbours(neg_dir)) {
                    for &n2 in &option_list(d.neighbours(pos_dir)) {
                        let rho_of = |n: Option<DomainId>| {
                            n.map(|i| self.domains[i.index()].rho())
                                .unwrap_or(VACUUM_DENSITY)
                        };
                        table.insert(
                            (axis, n1, n2),
                            rho_array(rho_of(n1), d.rho(), rho_of(n2)),
                        );
                    }
                }
            }
            tables.push(table);
        }
        for (d, table) in self.domains.iter_mut().zip(tables) {
            d.rho_arrays = table;
        }
    }

    fn compute_pml_attenuation(&mut self) {
        let pressure = self.settings.pml_pressure_decay().to_vec();
        let velocity = self.settings.pml_velocity_decay().to_vec();
        let oriented = |ascending: bool| -> (Vec<f64>, Vec<f64>) {
            if ascending {
                (pressure.clone(), velocity.clone())
            } else {
                (
                    pressure.iter().rev().copied().collect(),
                    velocity.iter().rev().copied().collect(),
                )
            }
        };

        let mut results: Vec<(usize, PmlAttenuation, [bool; 2])> = Vec::new();
        for (i, d) in self.domains.iter().enumerate() {
            if !d.is_pml() {
                continue;
            }
            let has = |dir: Direction| !d.neighbours(dir).is_empty();
            // A side counts as the air interface only when it has
            // neighbours and none of them is itself a PML layer.
            let air_side = |dir: Direction| {
                let list = d.neighbours(dir);
                !list.is_empty()
                    && list
                        .iter()
                        .all(|&nb| !self.domains[nb.index()].is_pml())
            };
            let air_count = Direction::ALL
                .iter()
                .flat_map(|&dir| d.neighbours(dir))
                .filter(|&&nb| !self.domains[nb.index()].is_pml())
                .count();
            let total_count = Direction::ALL
                .iter()
                .map(|&dir| d.neighbours(dir).len())
                .sum::<usize>();
            debug_assert!(
                (air_count == 1 && !d.is_secondary_pml())
                    || (total_count <= 2 && d.is_secondary_pml()),
                "unexpected PML topology for {}",
                d.name()
            );

            let (attenuation, update_axes);
            if d.is_secondary_pml() {
                if total_count == 2 {
                    debug_assert!(
                        (has(Direction::Left) || has(Direction::Right))
                            && (has(Direction::Top) || has(Direction::Bottom)),
                        "corner layer needs perpendicular neighbours"
                    );
                    let (px, vx) = oriented(has(Direction::Left));
                    let (py, vy) = oriented(has(Direction::Top));
                    attenuation = PmlAttenuation::Corner {
                        pressure_x: px,
                        velocity_x: vx,
                        pressure_y: py,
                        velocity_y: vy,
                    };
                } else {
                    let horizontal = has(Direction::Left) || has(Direction::Right);
                    let (p, v) = oriented(has(Direction::Left) || has(Direction::Top));
                    attenuation = PmlAttenuation::OneAxis {
                        axis: if horizontal { Axis::X } else { Axis::Y },
                        pressure: p,
                        velocity: v,
                    };
                }
                update_axes = [true, true];
            } else {
                let horizontal = air_side(Direction::Left) || air_side(Direction::Right);
                let ascending = air_side(Direction::Left) || air_side(Direction::Top);
                let axis = if horizontal { Axis::X } else { Axis::Y };
                let (p, v) = oriented(ascending);
                attenuation = PmlAttenuation::OneAxis {
                    axis,
                    pressure: p,
                    velocity: v,
                };
                update_axes = if air_count == 1 {
                    self.primary_update_flags(d, axis)
                } else {
                    [true, true]
                };
            }
            results.push((i, attenuation, update_axes));
        }

        for (i, attenuation, update_axes) in results {
            let d = &mut self.domains[i];
            d.attenuation = Some(attenuation);
            d.update_axes = update_axes;
        }
    }

    /// A primary layer always advances along its attenuation axis. The
    /// tangential axis only advances when the layer spans its parent's
    /// whole edge and that edge is not locally reacting.
    fn primary_update_flags(&self, d: &Domain, attenuation_axis: Axis) -> [bool; 2] {
        let mut flags = [true, true];
        let tangential = attenuation_axis.orthogonal();
        flags[tangential as usize] = if d.local {
            false
        } else {
            let mut allowed = false;
            for dir in Direction::ALL {
                let list = d.neighbours(dir);
                if list.len() == 1 && !self.domains[list[0].index()].is_pml() {
                    let parent = &self.domains[list[0].index()];
                    allowed = !parent.edges().get(dir.opposite()).locally_reacting;
                    break;
                }
            }
            allowed
        };
        flags
    }

    /// Stamp a source pulse into every air domain.
    ///
    /// `(x, y)` are world coordinates in metres, already shifted onto
    /// the staggered pressure grid by the caller. The pulse has
    /// unbounded support, so every air domain receives its tail.
    pub fn add_speaker(&mut self, x: f64, y: f64) {
        for d in self.domains.iter_mut().filter(|d| !d.is_pml()) {
            d.add_pulse(x, y, &self.settings);
        }
        self.speakers.push(Speaker { x, y });
    }

    /// The air domains strictly containing the fractional grid point.
    pub fn containers_at(&self, x: f64, y: f64) -> SmallVec<[DomainId; 2]> {
        self.domains
            .iter()
            .filter(|d| !d.is_pml() && d.contains_grid_point(x, y))
            .map(Domain::id)
            .collect()
    }

    /// Register a receiver at fractional grid coordinates inside
    /// `container`.
    pub fn add_receiver(&mut self, location: [f64; 2], container: DomainId) -> ReceiverId {
        let id = ReceiverId(self.receivers.len() as u32);
        self.receivers.push(Receiver::new(id, location, container));
        id
    }

    /// Composite every domain's pressure into one bounding-box image.
    ///
    /// Returns the bounding rectangle of the whole scene, layers
    /// included, and the summed pressure over it; cells no domain
    /// covers stay zero.
    pub fn pressure_field(&self) -> (Rect, Field2) {
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        for d in &self.domains {
            let r = d.rect();
            let br = r.bottom_right();
            min = Point::new(min.x.min(r.top_left.x), min.y.min(r.top_left.y));
            max = Point::new(max.x.max(br.x), max.y.max(br.y));
        }
        if self.domains.is_empty() {
            return (Rect::new(Point::new(0, 0), Size::new(0, 0)), Field2::zeros(0, 0));
        }
        let size = Size::new((max.x - min.x) as usize, (max.y - min.y) as usize);
        let mut image = Field2::zeros(size.width, size.height);
        for d in &self.domains {
            let origin = d.rect().top_left;
            let (ox, oy) = ((origin.x - min.x) as usize, (origin.y - min.y) as usize);
            let p = d.pressure();
            for y in 0..p.height() {
                for x in 0..p.width() {
                    image.add(ox + x, oy + y, p.get(x, y));
                }
            }
        }
        (Rect::new(min, size), image)
    }

    /// Snapshot all field state; the frame's sub-steps integrate from
    /// this snapshot.
    pub fn push_values(&mut self) {
        for d in &mut self.domains {
            d.push_values();
        }
    }

    /// Compute the spectral derivatives for one domain. Pure with
    /// respect to field state, so a parallel sub-step can fan this out
    /// across domains before committing any result.
    pub fn step_derivatives(&self, id: DomainId, cache: &WavenumberCache) -> StepDerivatives {
        let mut out = StepDerivatives::default();
        let Some(d) = self.domains.get(id.index()) else {
            debug_assert!(false, "derivative request for unknown domain");
            return out;
        };
        if d.is_rigid() {
            return out;
        }
        for axis in [Axis::X, Axis::Y] {
            if !d.updates_along(axis) {
                continue;
            }
            let (p, p_degraded) = self.axis_derivative(d, axis, FieldKind::Pressure, cache, None);
            let (v, v_degraded) = self.axis_derivative(d, axis, FieldKind::Velocity, cache, None);
            out.degraded[axis as usize] = p_degraded || v_degraded;
            match axis {
                Axis::X => {
                    out.dp_dx = Some(p);
                    out.du_dx = Some(v);
                }
                Axis::Y => {
                    out.dp_dy = Some(p);
                    out.dw_dy = Some(v);
                }
            }
        }
        out
    }

    /// Store computed derivatives back into the domain.
    pub fn commit_derivatives(&mut self, id: DomainId, step: StepDerivatives) {
        let d = &mut self.domains[id.index()];
        if let Some(f) = step.dp_dx {
            d.dp_dx = f;
        }
        if let Some(f) = step.dp_dy {
            d.dp_dy = f;
        }
        if let Some(f) = step.du_dx {
            d.du_dx = f;
        }
        if let Some(f) = step.dw_dy {
            d.dw_dy = f;
        }
    }

    /// Advance all non-rigid domains by one Runge-Kutta sub-step from
    /// the frame snapshot, then recombine the pressure components.
    pub fn apply_stage(&mut self, stage: usize) {
        let factor = self.settings.dt() * self.settings.rk_stage_factors()[stage];
        let c = self.settings.sound_speed();
        for d in &mut self.domains {
            if d.is_rigid() {
                continue;
            }
            let rho = d.rho();
            let vx = d.velocity_x_prev.sub_scaled(&d.dp_dx, factor / rho);
            let vy = d.velocity_y_prev.sub_scaled(&d.dp_dy, factor / rho);
            let px = d.pressure_x_prev.sub_scaled(&d.du_dx, factor * rho * c * c);
            let py = d.pressure_y_prev.sub_scaled(&d.dw_dy, factor * rho * c * c);
            d.velocity_x = vx;
            d.velocity_y = vy;
            d.pressure_x = px;
            d.pressure_y = py;
        }
        for d in &mut self.domains {
            d.sum_pressure();
        }
    }

    /// Apply every PML layer's attenuation profiles; called once per
    /// frame after the sub-steps.
    pub fn apply_pml_attenuation(&mut self) {
        for d in &mut self.domains {
            d.apply_attenuation();
        }
    }

    /// Sample one receiver from the current pressure field.
    pub fn sample_receiver(
        &self,
        receiver: &Receiver,
        cache: &WavenumberCache,
    ) -> Result<f64, SceneError> {
        let container = self.domain(receiver.container)?;
        if !self.settings.spectral_interpolation() {
            let p = receiver.grid_location - container.rect().top_left;
            return Ok(container.pressure().get(p.x as usize, p.y as usize));
        }

        let rect_of = |id: DomainId| self.domains[id.index()].rect();
        let missing = |direction| SceneError::MissingNeighbour {
            domain: container.id(),
            direction,
        };
        let above = container
            .neighbour_at(Direction::Top, receiver.location[0], rect_of)
            .ok_or(missing(Direction::Top))?;
        let below = container
            .neighbour_at(Direction::Bottom, receiver.location[0], rect_of)
            .ok_or(missing(Direction::Bottom))?;

        // Shift each participant's pressure field horizontally by the
        // sub-cell x offset, then take the receiver's column of each.
        let column = |id: DomainId| -> Field2 {
            let d = &self.domains[id.index()];
            let (shifted, _) = self.axis_derivative(
                d,
                Axis::X,
                FieldKind::Pressure,
                cache,
                Some(receiver.grid_offset[0]),
            );
            let x = (receiver.grid_location.x - d.rect().top_left.x) as usize;
            let mut out = Field2::zeros(shifted.height(), 1);
            for y in 0..shifted.height() {
                out.set(y, 0, shifted.get(x, y));
            }
            out
        };
        let center = column(container.id());
        let wing_above = column(above);
        let wing_below = column(below);

        let dx = self.settings.grid_spacing();
        let w = self.settings.window_size();
        let disc = cache.discretization(dx, 2 * w + container.rect().size.height + 1);
        let shift: Vec<Complex64> = disc
            .wave_numbers
            .iter()
            .zip(&disc.complex_factors)
            .map(|(&k, &j)| (j * k * receiver.grid_offset[1] * dx).exp())
            .collect();

        let rho = container
            .rho_arrays
            .get(&(Axis::Y, Some(above), Some(below)))
            .ok_or(missing(Direction::Top))?;
        let pass = tympan_spectral::row_derivative(
            cache,
            &DerivativeInput {
                center: &center,
                left: &wing_above,
                right: &wing_below,
                kind: FieldKind::Pressure,
                rho,
                factors: &shift,
                window: self.settings.window(),
                window_size: w,
            },
        );
        let dy = (receiver.grid_location.y - container.rect().top_left.y) as usize;
        Ok(pass.field.get(dy, 0))
    }

    /// The windowed spectral pass over one domain along one axis,
    /// covering every combination of opposing neighbours.
    ///
    /// With `shift` set, applies a pure phase shift of that fraction
    /// of a cell to the pressure field instead of differentiating.
    fn axis_derivative(
        &self,
        d: &Domain,
        axis: Axis,
        kind: FieldKind,
        cache: &WavenumberCache,
        shift: Option<f64>,
    ) -> (Field2, bool) {
        let w = self.settings.window_size();
        let dx = self.settings.grid_spacing();
        let (neg_dir, pos_dir) = axis.directions();
        let negs = option_list(d.neighbours(neg_dir));
        let poss = option_list(d.neighbours(pos_dir));
        let ortho = axis.orthogonal();
        let own_range = d.rect().range(ortho);
        let primary = d.rect().size.along(axis);

        let mut target = if shift.is_some() {
            debug_assert_eq!(kind, FieldKind::Pressure);
            match axis {
                Axis::X => Field2::zeros(primary + 1, d.rect().size.height),
                Axis::Y => Field2::zeros(d.rect().size.width, primary + 1),
            }
        } else {
            match (kind, axis) {
                (FieldKind::Pressure, Axis::X) => d.dp_dx.clone(),
                (FieldKind::Pressure, Axis::Y) => d.dp_dy.clone(),
                (FieldKind::Velocity, Axis::X) => d.du_dx.clone(),
                (FieldKind::Velocity, Axis::Y) => d.dw_dy.clone(),
            }
        };
        let mut degraded = false;

        for &n1 in &negs {
            for &n2 in &poss {
                let (mut lo, mut hi) = own_range;
                for n in [n1, n2].into_iter().flatten() {
                    let r = self.domains[n.index()].rect().range(ortho);
                    lo = lo.max(r.0);
                    hi = hi.min(r.1);
                }
                if lo >= hi {
                    continue;
                }
                let Some(rho) = d.rho_arrays.get(&(axis, n1, n2)) else {
                    debug_assert!(false, "missing interface coefficients");
                    continue;
                };

                let ntot = 2 * w + primary + usize::from(kind == FieldKind::Pressure);
                let disc = cache.discretization(dx, ntot);
                let shift_factors;
                let factors: &[Complex64] = match shift {
                    None => match kind {
                        FieldKind::Pressure => &disc.pressure_deriv_factors,
                        FieldKind::Velocity => &disc.velocity_deriv_factors,
                    },
                    Some(offset) => {
                        shift_factors = disc
                            .wave_numbers
                            .iter()
                            .zip(&disc.complex_factors)
                            .map(|(&k, &j)| (j * k * offset * dx).exp())
                            .collect::<Vec<_>>();
                        &shift_factors
                    }
                };

                let origin_of = |dom: &Domain| dom.rect().top_left.along(ortho);

                let center = slab(field_of(d, kind, axis), axis, lo, hi, origin_of(d));
                let (left, right);
                if kind == FieldKind::Velocity && n1.is_none() && n2.is_none() {
                    // A velocity pass with no neighbour on either side
                    // (a PML layer along its tangential axis) pads
                    // with silence rather than its own mirror.
                    left = Field2::zeros(center.width(), center.height());
                    right = left.clone();
                } else {
                    let side = |n: Option<DomainId>| -> Field2 {
                        let dom = n.map(|i| &self.domains[i.index()]).unwrap_or(d);
                        slab(field_of(dom, kind, axis), axis, lo, hi, origin_of(dom))
                    };
                    left = side(n1);
                    right = side(n2);
                }

                let pass = tympan_spectral::row_derivative(
                    cache,
                    &DerivativeInput {
                        center: &center,
                        left: &left,
                        right: &right,
                        kind,
                        rho,
                        factors,
                        window: self.settings.window(),
                        window_size: w,
                    },
                );
                degraded |= pass.degraded;
                write_slab(&mut target, &pass.field, axis, lo, own_range.0);
            }
        }
        (target, degraded)
    }
}

/// The component field a spectral pass reads from a domain.
fn field_of<'a>(dom: &'a Domain, kind: FieldKind, axis: Axis) -> &'a Field2 {
    match (kind, axis) {
        (FieldKind::Pressure, _) => &dom.pressure,
        (FieldKind::Velocity, Axis::X) => &dom.velocity_x,
        (FieldKind::Velocity, Axis::Y) => &dom.velocity_y,
    }
}

fn option_list(ids: &[DomainId]) -> SmallVec<[Option<DomainId>; 4]> {
    if ids.is_empty() {
        let mut single = SmallVec::new();
        single.push(None);
        single
    } else {
        ids.iter().map(|&i| Some(i)).collect()
    }
}

/// Cut the rows `[lo, hi)` (in scene coordinates along the axis
/// orthogonal to the derivative) out of a field. For a vertical pass
/// the cut is over columns and the result is transposed, so the
/// derivative always runs along rows.
fn slab(field: &Field2, axis: Axis, lo: i32, hi: i32, origin: i32) -> Field2 {
    let start = (lo - origin) as usize;
    let count = (hi - lo) as usize;
    match axis {
        Axis::X => {
            let mut out = Field2::zeros(field.width(), count);
            for j in 0..count {
                out.row_mut(j).copy_from_slice(field.row(start + j));
            }
            out
        }
        Axis::Y => {
            let mut out = Field2::zeros(field.height(), count);
            for j in 0..count {
                for y in 0..field.height() {
                    out.set(y, j, field.get(start + j, y));
                }
            }
            out
        }
    }
}

/// Inverse of [`slab`]: write a derivative result back into the rows
/// (or, transposed, the columns) it was cut from.
fn write_slab(target: &mut Field2, result: &Field2, axis: Axis, lo: i32, origin: i32) {
    let start = (lo - origin) as usize;
    match axis {
        Axis::X => {
            for j in 0..result.height() {
                target.row_mut(start + j).copy_from_slice(result.row(j));
            }
        }
        Axis::Y => {
            for j in 0..result.height() {
                for i in 0..result.width() {
                    target.set(start + j, i, result.get(i, j));
                }
            }
        }
    }
}

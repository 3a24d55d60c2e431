//! A rectangular simulation domain and its per-domain field state.

use indexmap::IndexMap;
use smallvec::SmallVec;

use tympan_core::{
    Axis, Direction, DomainId, EdgeMap, Field2, Point, Rect, Settings, EPSILON, VACUUM_DENSITY,
};
use tympan_spectral::RhoArray;

/// What a domain is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainKind {
    /// A configured air domain; sound propagates through it.
    Air,
    /// A synthesized absorbing layer attached to an air domain edge.
    Pml,
    /// A corner absorbing layer attached to a primary PML layer.
    SecondaryPml,
}

/// The attenuation a PML domain applies to its split fields after
/// every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PmlAttenuation {
    /// Attenuation along a single axis; edge layers and corner layers
    /// with one neighbour.
    OneAxis {
        /// The attenuated axis.
        axis: Axis,
        /// Decay per pressure cell along that axis, already oriented.
        pressure: Vec<f64>,
        /// Decay per velocity node along that axis, already oriented.
        velocity: Vec<f64>,
    },
    /// Attenuation along both axes; corner layers wedged between two
    /// perpendicular neighbours.
    Corner {
        /// Decay per pressure cell, left to right.
        pressure_x: Vec<f64>,
        /// Decay per horizontal velocity node, left to right.
        velocity_x: Vec<f64>,
        /// Decay per pressure cell, top to bottom.
        pressure_y: Vec<f64>,
        /// Decay per vertical velocity node, top to bottom.
        velocity_y: Vec<f64>,
    },
}

/// A key into a domain's interface coefficient tables: the derivative
/// axis and the neighbour on each side of it (`None` when that side
/// has no neighbour and the domain's own mirrored field stands in).
pub type RhoKey = (Axis, Option<DomainId>, Option<DomainId>);

type NeighbourList = SmallVec<[DomainId; 4]>;

/// A rectangular domain: geometry, medium, topology, and the acoustic
/// field state the solver advances.
///
/// Pressure lives on a `w x h` cell-centred grid; horizontal velocity
/// on a `(w+1) x h` grid collocated with the vertical cell edges and
/// vertical velocity on a `w x (h+1)` grid collocated with the
/// horizontal edges. Pressure is split into the components `pressure_x`
/// and `pressure_y` so a PML layer can attenuate each axis separately.
#[derive(Clone, Debug)]
pub struct Domain {
    id: DomainId,
    name: String,
    kind: DomainKind,
    rect: Rect,
    alpha: f64,
    impedance: f64,
    rho: f64,
    edges: EdgeMap,
    /// The domains this layer absorbs for: one air domain for a
    /// primary layer, one or two primary layers for a corner.
    pub(crate) pml_for: SmallVec<[DomainId; 2]>,
    /// True for a primary layer that covers only part of its parent's
    /// edge; such layers skip tangential updates.
    pub(crate) local: bool,
    pub(crate) neighbours: [NeighbourList; 4],
    pub(crate) update_axes: [bool; 2],
    pub(crate) attenuation: Option<PmlAttenuation>,
    pub(crate) rho_arrays: IndexMap<RhoKey, RhoArray>,

    pub(crate) pressure: Field2,
    pub(crate) pressure_x: Field2,
    pub(crate) pressure_y: Field2,
    pub(crate) velocity_x: Field2,
    pub(crate) velocity_y: Field2,
    pub(crate) pressure_x_prev: Field2,
    pub(crate) pressure_y_prev: Field2,
    pub(crate) velocity_x_prev: Field2,
    pub(crate) velocity_y_prev: Field2,
    /// Spectral derivatives from the latest sub-step: `dp_dx` on
    /// horizontal velocity nodes, `dp_dy` on vertical velocity nodes,
    /// `du_dx` and `dw_dy` on pressure cells.
    pub(crate) dp_dx: Field2,
    pub(crate) dp_dy: Field2,
    pub(crate) du_dx: Field2,
    pub(crate) dw_dy: Field2,
}

impl Domain {
    /// Create a domain with zeroed fields.
    ///
    /// `alpha` is the boundary absorption coefficient in `(0, 1]`; it
    /// determines the medium's impedance and effective density. Air
    /// domains use `alpha = 1`, which makes the density `air_density`.
    ///
    /// # Panics
    /// If `alpha` is not in `(0, 1]` or the rectangle is degenerate.
    pub fn new(
        id: DomainId,
        name: impl Into<String>,
        kind: DomainKind,
        rect: Rect,
        alpha: f64,
        edges: EdgeMap,
        settings: &Settings,
    ) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "alpha out of range");
        let (w, h) = (rect.size.width, rect.size.height);
        assert!(w > 0 && h > 0, "degenerate domain rectangle");

        let impedance = -((1.0 - alpha).sqrt() + 1.0) / ((1.0 - alpha).sqrt() - 1.0);
        let rho = if impedance < 1000.0 {
            settings.parameters().air_density * impedance
        } else {
            VACUUM_DENSITY
        };

        Self {
            id,
            name: name.into(),
            kind,
            rect,
            alpha,
            impedance,
            rho,
            edges,
            pml_for: SmallVec::new(),
            local: false,
            neighbours: Default::default(),
            update_axes: [true, true],
            attenuation: None,
            rho_arrays: IndexMap::new(),
            pressure: Field2::zeros(w, h),
            pressure_x: Field2::zeros(w, h),
            pressure_y: Field2::zeros(w, h),
            velocity_x: Field2::zeros(w + 1, h),
            velocity_y: Field2::zeros(w, h + 1),
            pressure_x_prev: Field2::zeros(w, h),
            pressure_y_prev: Field2::zeros(w, h),
            velocity_x_prev: Field2::zeros(w + 1, h),
            velocity_y_prev: Field2::zeros(w, h + 1),
            dp_dx: Field2::zeros(w + 1, h),
            dp_dy: Field2::zeros(w, h + 1),
            du_dx: Field2::zeros(w, h),
            dw_dy: Field2::zeros(w, h),
        }
    }

    /// This domain's identifier.
    pub fn id(&self) -> DomainId {
        self.id
    }

    /// This domain's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What this domain is for.
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    /// The grid rectangle this domain covers.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The boundary absorption coefficient this domain was built with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The effective density of this medium.
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// The edge properties of this domain (meaningful for air domains;
    /// PML layers carry defaults).
    pub fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    /// True for both primary and corner absorbing layers.
    pub fn is_pml(&self) -> bool {
        matches!(self.kind, DomainKind::Pml | DomainKind::SecondaryPml)
    }

    /// True for corner absorbing layers only.
    pub fn is_secondary_pml(&self) -> bool {
        self.kind == DomainKind::SecondaryPml
    }

    /// A fully reflecting medium: near-total absorption at the
    /// boundary pushes the impedance towards infinity and the solver
    /// never updates the interior.
    pub fn is_rigid(&self) -> bool {
        self.impedance > 1000.0
    }

    /// The domains this layer absorbs for.
    pub fn absorbs_for(&self) -> &[DomainId] {
        &self.pml_for
    }

    /// The neighbour list on one side.
    pub fn neighbours(&self, direction: Direction) -> &[DomainId] {
        &self.neighbours[direction as usize]
    }

    /// Whether the solver should advance this domain along `axis` this
    /// sub-step. Always true for air domains; primary PML layers skip
    /// their tangential axis when partial or when their parent's edge
    /// is locally reacting.
    pub fn updates_along(&self, axis: Axis) -> bool {
        self.update_axes[axis as usize]
    }

    /// True when `(x, y)`, in fractional grid coordinates, lies
    /// strictly inside this domain. Points on the perimeter do not
    /// count; a probe on a shared edge belongs to neither side.
    pub fn contains_grid_point(&self, x: f64, y: f64) -> bool {
        let tl = self.rect.top_left;
        let br = self.rect.bottom_right();
        x > tl.x as f64 && x < br.x as f64 && y > tl.y as f64 && y < br.y as f64
    }

    /// The cell-centred pressure field.
    pub fn pressure(&self) -> &Field2 {
        &self.pressure
    }

    /// The pressure field as single-precision samples for emission.
    pub fn pressure_frame(&self) -> Vec<f32> {
        self.pressure.to_f32()
    }

    /// Snapshot the split fields; the six sub-steps of a frame all
    /// integrate from this snapshot.
    pub(crate) fn push_values(&mut self) {
        self.pressure_x_prev.clone_from(&self.pressure_x);
        self.pressure_y_prev.clone_from(&self.pressure_y);
        self.velocity_x_prev.clone_from(&self.velocity_x);
        self.velocity_y_prev.clone_from(&self.velocity_y);
    }

    /// Recombine the split pressure components.
    pub(crate) fn sum_pressure(&mut self) {
        self.pressure = self.pressure_x.added(&self.pressure_y);
    }

    /// Apply this layer's attenuation profiles to the split fields.
    pub(crate) fn apply_attenuation(&mut self) {
        match &self.attenuation {
            None => {}
            Some(PmlAttenuation::OneAxis {
                axis: Axis::X,
                pressure,
                velocity,
            }) => {
                self.pressure_x.scale_columns(pressure);
                self.velocity_x.scale_columns(velocity);
            }
            Some(PmlAttenuation::OneAxis {
                axis: Axis::Y,
                pressure,
                velocity,
            }) => {
                self.pressure_y.scale_rows(pressure);
                self.velocity_y.scale_rows(velocity);
            }
            Some(PmlAttenuation::Corner {
                pressure_x,
                velocity_x,
                pressure_y,
                velocity_y,
            }) => {
                self.pressure_x.scale_columns(pressure_x);
                self.velocity_x.scale_columns(velocity_x);
                self.pressure_y.scale_rows(pressure_y);
                self.velocity_y.scale_rows(velocity_y);
            }
        }
    }

    /// Add a Gaussian pressure pulse centred at world coordinates
    /// `(sx, sy)`, split over the two pressure components by the
    /// squared direction cosines towards each cell.
    pub(crate) fn add_pulse(&mut self, sx: f64, sy: f64, settings: &Settings) {
        let dx = settings.grid_spacing();
        let bandwidth = settings.band_width();
        let local_x = sx - self.rect.top_left.x as f64 * dx;
        let local_y = sy - self.rect.top_left.y as f64 * dx;
        for row in 0..self.rect.size.height {
            for col in 0..self.rect.size.width {
                let rx = col as f64 * dx - local_x;
                let ry = row as f64 * dx - local_y;
                let pressure = (-bandwidth * (rx * rx + ry * ry)).exp();
                let angle = ry.atan2(rx);
                self.pressure.add(col, row, pressure);
                self.pressure_x
                    .add(col, row, angle.cos().powi(2) * pressure);
                self.pressure_y
                    .add(col, row, angle.sin().powi(2) * pressure);
            }
        }
    }

    /// The ranges along `direction`'s orthogonal coordinate that no
    /// neighbour on that side covers, as half-open intervals.
    pub(crate) fn vacant_ranges(&self, direction: Direction, ranges_of: impl Fn(DomainId) -> (i32, i32)) -> Vec<(i32, i32)> {
        let own = self.rect.range(direction.axis().orthogonal());
        let mut vacant = vec![own];
        for &n in self.neighbours(direction) {
            let (ns, ne) = ranges_of(n);
            let mut next = Vec::with_capacity(vacant.len() + 1);
            for (s, e) in vacant {
                if ne <= s || ns >= e {
                    next.push((s, e));
                    continue;
                }
                if ns > s {
                    next.push((s, ns));
                }
                if ne < e {
                    next.push((ne, e));
                }
            }
            vacant = next;
        }
        vacant.sort_unstable();
        vacant
    }

    /// The neighbour on `direction`'s side whose span contains the
    /// fractional coordinate `coord`, bounds inclusive.
    pub(crate) fn neighbour_at(
        &self,
        direction: Direction,
        coord: f64,
        rect_of: impl Fn(DomainId) -> Rect,
    ) -> Option<DomainId> {
        let axis = direction.axis().orthogonal();
        self.neighbours(direction).iter().copied().find(|&n| {
            let r = rect_of(n);
            coord >= r.top_left.along(axis) as f64 && coord <= r.bottom_right().along(axis) as f64
        })
    }
}

/// The PML absorption floor: a zero-absorption edge still gets a layer
/// with this alpha, which is rigid and acts as a reflecting wall.
pub(crate) fn pml_alpha(edge_absorption: f64) -> f64 {
    edge_absorption.max(EPSILON)
}

/// Point one grid cell outside `rect` in the given direction, at
/// offset `along` on the orthogonal coordinate: the top-left corner of
/// a PML layer `depth` cells deep.
pub(crate) fn pml_corner(rect: Rect, direction: Direction, along: i32, depth: usize) -> Point {
    let tl = rect.top_left;
    let n = depth as i32;
    match direction {
        Direction::Left => Point::new(tl.x - n, along),
        Direction::Right => Point::new(tl.x + rect.size.width as i32, along),
        Direction::Top => Point::new(along, tl.y - n),
        Direction::Bottom => Point::new(along, tl.y + rect.size.height as i32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tympan_core::{Settings, SimulationParameters, Size};

    fn settings() -> Settings {
        Settings::new(SimulationParameters::default()).unwrap()
    }

    fn rect(x: i32, y: i32, w: usize, h: usize) -> Rect {
        Rect {
            top_left: Point::new(x, y),
            size: Size {
                width: w,
                height: h,
            },
        }
    }

    fn air(id: u32, r: Rect) -> Domain {
        Domain::new(
            DomainId(id),
            format!("domain-{id}"),
            DomainKind::Air,
            r,
            1.0,
            EdgeMap::default(),
            &settings(),
        )
    }

    #[test]
    fn air_domain_has_air_density() {
        let d = air(0, rect(0, 0, 10, 8));
        assert!((d.rho() - 1.2).abs() < 1e-12);
        assert!(!d.is_rigid());
    }

    #[test]
    fn near_zero_absorption_is_rigid_and_vacuum_dense() {
        let d = Domain::new(
            DomainId(1),
            "wall",
            DomainKind::Pml,
            rect(0, 0, 5, 5),
            EPSILON,
            EdgeMap::default(),
            &settings(),
        );
        assert!(d.is_rigid());
        assert_eq!(d.rho(), VACUUM_DENSITY);
    }

    #[test]
    fn half_absorption_sits_between_matched_and_rigid() {
        let d = Domain::new(
            DomainId(2),
            "soft",
            DomainKind::Air,
            rect(0, 0, 5, 5),
            0.5,
            EdgeMap::default(),
            &settings(),
        );
        assert!(!d.is_rigid());
        // impedance = (sqrt(0.5)+1)/(1-sqrt(0.5)) ~ 5.8284
        assert!((d.rho() - 1.2 * 5.828_427).abs() < 1e-4);
    }

    #[test]
    fn pushed_snapshots_are_bit_identical() {
        let mut d = air(0, rect(0, 0, 10, 8));
        d.add_pulse(4.3, 3.7, &settings());
        d.push_values();
        assert_eq!(d.pressure_x.data(), d.pressure_x_prev.data());
        assert_eq!(d.pressure_y.data(), d.pressure_y_prev.data());
        assert_eq!(d.velocity_x.data(), d.velocity_x_prev.data());
        assert_eq!(d.velocity_y.data(), d.velocity_y_prev.data());
    }

    #[test]
    fn field_shapes_are_staggered() {
        let d = air(0, rect(0, 0, 10, 8));
        assert_eq!((d.pressure.width(), d.pressure.height()), (10, 8));
        assert_eq!((d.velocity_x.width(), d.velocity_x.height()), (11, 8));
        assert_eq!((d.velocity_y.width(), d.velocity_y.height()), (10, 9));
        assert_eq!((d.dp_dx.width(), d.dp_dx.height()), (11, 8));
        assert_eq!((d.dp_dy.width(), d.dp_dy.height()), (10, 9));
        assert_eq!((d.du_dx.width(), d.du_dx.height()), (10, 8));
    }

    #[test]
    fn containment_is_strict() {
        let d = air(0, rect(2, 3, 4, 4));
        assert!(d.contains_grid_point(3.5, 4.5));
        assert!(!d.contains_grid_point(2.0, 4.5));
        assert!(!d.contains_grid_point(6.0, 4.5));
        assert!(!d.contains_grid_point(3.5, 3.0));
    }

    #[test]
    fn pulse_components_sum_to_total_pressure() {
        let s = settings();
        let mut d = air(0, rect(0, 0, 12, 12));
        d.add_pulse(6.0 * s.grid_spacing(), 6.0 * s.grid_spacing(), &s);
        for row in 0..12 {
            for col in 0..12 {
                let total = d.pressure.get(col, row);
                let split = d.pressure_x.get(col, row) + d.pressure_y.get(col, row);
                assert!((total - split).abs() < 1e-12);
            }
        }
        // The peak sits at the source cell.
        assert!(d.pressure.get(6, 6) > d.pressure.get(0, 0));
    }

    #[test]
    fn vacant_ranges_subtract_neighbour_spans() {
        let mut d = air(0, rect(0, 0, 10, 10));
        // Neighbours on the right covering y in [0,3) and [6,10).
        d.neighbours[Direction::Right as usize].push(DomainId(1));
        d.neighbours[Direction::Right as usize].push(DomainId(2));
        let spans = |id: DomainId| -> (i32, i32) {
            match id.0 {
                1 => (0, 3),
                _ => (6, 10),
            }
        };
        let vacant = d.vacant_ranges(Direction::Right, spans);
        assert_eq!(vacant, vec![(3, 6)]);
    }

    #[test]
    fn vacant_ranges_with_no_neighbours_is_the_whole_side() {
        let d = air(0, rect(0, 0, 10, 7));
        let vacant = d.vacant_ranges(Direction::Top, |_| unreachable!());
        assert_eq!(vacant, vec![(0, 10)]);
    }

    #[test]
    fn attenuation_scales_the_matching_fields() {
        let s = settings();
        let mut d = Domain::new(
            DomainId(3),
            "layer",
            DomainKind::Pml,
            rect(0, 0, 4, 2),
            1.0,
            EdgeMap::default(),
            &s,
        );
        d.pressure_x.fill(1.0);
        d.velocity_x.fill(1.0);
        d.pressure_y.fill(1.0);
        d.attenuation = Some(PmlAttenuation::OneAxis {
            axis: Axis::X,
            pressure: vec![1.0, 0.5, 0.25, 0.125],
            velocity: vec![1.0, 0.8, 0.6, 0.4, 0.2],
        });
        d.apply_attenuation();
        assert!((d.pressure_x.get(1, 0) - 0.5).abs() < 1e-12);
        assert!((d.pressure_x.get(3, 1) - 0.125).abs() < 1e-12);
        assert!((d.velocity_x.get(4, 1) - 0.2).abs() < 1e-12);
        // The other split component is untouched.
        assert!((d.pressure_y.get(2, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pml_corner_points_sit_outside_the_parent() {
        let r = rect(0, 0, 10, 8);
        assert_eq!(pml_corner(r, Direction::Left, 2, 5), Point::new(-5, 2));
        assert_eq!(pml_corner(r, Direction::Right, 2, 5), Point::new(10, 2));
        assert_eq!(pml_corner(r, Direction::Top, 3, 5), Point::new(3, -5));
        assert_eq!(pml_corner(r, Direction::Bottom, 3, 5), Point::new(3, 8));
    }
}

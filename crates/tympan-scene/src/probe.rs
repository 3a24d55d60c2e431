//! Sound sources and measurement points.

use tympan_core::{DomainId, Point, ReceiverId};

/// A point source. Its Gaussian pressure pulse is stamped into every
/// air domain's initial state when the scene is assembled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speaker {
    /// World x coordinate, in metres.
    pub x: f64,
    /// World y coordinate, in metres.
    pub y: f64,
}

/// A measurement point sampled on every saved frame.
///
/// The position is kept in fractional grid coordinates, split into the
/// containing cell and the sub-cell offset. With spectral interpolation
/// enabled the offset selects a phase-shift factor; otherwise the cell
/// value is reported as-is.
///
/// Receivers hold no sample history. Each sample is delivered through
/// [`SimulationCallback::on_sample`] as it is taken, and the caller
/// owns whatever time series it wants to keep.
///
/// [`SimulationCallback::on_sample`]: tympan_core::SimulationCallback::on_sample
#[derive(Clone, Debug)]
pub struct Receiver {
    /// This receiver's identifier.
    pub id: ReceiverId,
    /// Exact position in fractional grid coordinates.
    pub location: [f64; 2],
    /// The containing cell.
    pub grid_location: Point,
    /// Position within the cell, each component in `[0, 1)`.
    pub grid_offset: [f64; 2],
    /// The air domain the receiver sits in.
    pub container: DomainId,
}

impl Receiver {
    /// Build a receiver at fractional grid coordinates inside
    /// `container`.
    pub fn new(id: ReceiverId, location: [f64; 2], container: DomainId) -> Self {
        let grid_location = Point::new(location[0].floor() as i32, location[1].floor() as i32);
        let grid_offset = [
            location[0] - grid_location.x as f64,
            location[1] - grid_location.y as f64,
        ];
        Self {
            id,
            location,
            grid_location,
            grid_offset,
            container,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_splits_location_into_cell_and_offset() {
        let r = Receiver::new(ReceiverId(0), [12.75, 3.25], DomainId(1));
        assert_eq!(r.grid_location, Point::new(12, 3));
        assert!((r.grid_offset[0] - 0.75).abs() < 1e-12);
        assert!((r.grid_offset[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_coordinates_floor_toward_negative_infinity() {
        let r = Receiver::new(ReceiverId(1), [-0.5, -2.25], DomainId(0));
        assert_eq!(r.grid_location, Point::new(-1, -3));
        assert!((r.grid_offset[0] - 0.5).abs() < 1e-12);
        assert!((r.grid_offset[1] - 0.75).abs() < 1e-12);
    }
}

//! Reflection and transmission coefficients across density interfaces.
//!
//! A derivative window reaching over a domain boundary blends the
//! neighbour's field with a mirrored copy of the local field. The blend
//! weights come from the impedance contrast between the media: a
//! matched neighbour transmits everything, a rigid wall (or missing
//! neighbour, modelled as near-infinite density) reflects everything.

use tympan_core::FieldKind;

/// Reflection/transmission coefficient table for one medium and its
/// two neighbours along an axis.
///
/// Rows are: reflection at the left interface, reflection at the
/// right interface, transmission through the left interface,
/// transmission through the right interface. Column 0 is the
/// outgoing-wave coefficient, column 1 the incoming-wave coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhoArray {
    /// Coefficients for cell-centred pressure fields.
    pub pressure: [[f64; 2]; 4],
    /// Coefficients for boundary-collocated velocity fields.
    pub velocity: [[f64; 2]; 4],
}

/// The blend weights a derivative window uses at the two interfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WingCoefficients {
    /// Weight of the left neighbour's samples.
    pub left_transmission: f64,
    /// Weight of the mirrored local samples at the left interface.
    pub left_reflection: f64,
    /// Weight of the right neighbour's samples.
    pub right_transmission: f64,
    /// Weight of the mirrored local samples at the right interface.
    pub right_reflection: f64,
}

impl RhoArray {
    /// The wing blend weights for the given node kind.
    ///
    /// Pressure wings transmit the incoming-wave coefficient; velocity
    /// wings transmit the outgoing-wave coefficient. Both reflect the
    /// outgoing-wave coefficient of their own table.
    pub fn wing_coefficients(&self, kind: FieldKind) -> WingCoefficients {
        match kind {
            FieldKind::Pressure => WingCoefficients {
                left_transmission: self.pressure[2][1],
                left_reflection: self.pressure[0][0],
                right_transmission: self.pressure[3][1],
                right_reflection: self.pressure[1][0],
            },
            FieldKind::Velocity => WingCoefficients {
                left_transmission: self.velocity[2][0],
                left_reflection: self.velocity[0][0],
                right_transmission: self.velocity[3][0],
                right_reflection: self.velocity[1][0],
            },
        }
    }
}

/// Compute the coefficient table for a medium of density `rho_mid`
/// with neighbours of density `rho_left` and `rho_right`.
pub fn rho_array(rho_left: f64, rho_mid: f64, rho_right: f64) -> RhoArray {
    let zn1 = rho_left / rho_mid;
    let inv_zn1 = rho_mid / rho_left;
    let rlw1 = (zn1 - 1.0) / (zn1 + 1.0);
    let rlw2 = (inv_zn1 - 1.0) / (inv_zn1 + 1.0);
    let tlw1 = 2.0 * zn1 / (zn1 + 1.0);
    let tlw2 = 2.0 * inv_zn1 / (inv_zn1 + 1.0);

    let zn2 = rho_right / rho_mid;
    let inv_zn2 = rho_mid / rho_right;
    let rrw1 = (zn2 - 1.0) / (zn2 + 1.0);
    let rrw2 = (inv_zn2 - 1.0) / (inv_zn2 + 1.0);
    let trw1 = 2.0 * zn2 / (zn2 + 1.0);
    let trw2 = 2.0 * inv_zn2 / (inv_zn2 + 1.0);

    RhoArray {
        pressure: [
            [rlw1, rlw2],
            [rrw1, rrw2],
            [tlw1, tlw2],
            [trw1, trw2],
        ],
        velocity: [
            [-rlw1, -rlw2],
            [-rrw1, -rrw2],
            [tlw1, tlw2],
            [trw1, trw2],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table(actual: [[f64; 2]; 4], expected: [[f64; 2]; 4]) {
        for (row_a, row_e) in actual.iter().zip(&expected) {
            for (a, e) in row_a.iter().zip(row_e) {
                assert!((a - e).abs() < 1e-6, "{a} != {e}");
            }
        }
    }

    #[test]
    fn rigid_left_neighbour() {
        let r = rho_array(1e10, 1.2, 1.2);
        assert_table(r.pressure, [[1.0, -1.0], [0.0, 0.0], [2.0, 0.0], [1.0, 1.0]]);
        assert_table(r.velocity, [[-1.0, 1.0], [0.0, 0.0], [2.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn matched_neighbours_transmit_everything() {
        let r = rho_array(1.2, 1.2, 1.2);
        assert_table(r.pressure, [[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [1.0, 1.0]]);
        assert_table(r.velocity, [[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn matched_wings_pass_neighbours_through_unreflected() {
        let w = rho_array(1.2, 1.2, 1.2).wing_coefficients(FieldKind::Pressure);
        assert_eq!(w.left_transmission, 1.0);
        assert_eq!(w.left_reflection, 0.0);
        assert_eq!(w.right_transmission, 1.0);
        assert_eq!(w.right_reflection, 0.0);
    }

    #[test]
    fn rigid_wall_wings_mirror_the_local_field() {
        let r = rho_array(1e200, 1.2, 1.2);
        let p = r.wing_coefficients(FieldKind::Pressure);
        // Pressure mirrors in phase and receives nothing through the wall.
        assert!((p.left_transmission - 0.0).abs() < 1e-12);
        assert!((p.left_reflection - 1.0).abs() < 1e-12);
        let v = r.wing_coefficients(FieldKind::Velocity);
        // Velocity mirrors with inverted sign.
        assert!((v.left_reflection + 1.0).abs() < 1e-12);
        // The velocity transmission weight stays finite at the matched
        // right interface.
        assert!((v.right_transmission - 1.0).abs() < 1e-12);
    }
}

//! Deterministic numeric primitives for the software renderer: 16.16 fixed
//! point, 32-bit binary angles and the fine trig tables they index.

mod angle;
mod fixed;
mod tables;

pub use angle::{point_to_angle, Angle, ANG180, ANG270, ANG45, ANG90};
pub use fixed::{Fixed, FRACBITS, FRACUNIT};
pub use tables::{
    finecosine, finesine, finetangent, slope_div, tantoangle, ANGLETOFINESHIFT, DBITS, FINEANGLES,
    FINEMASK, SLOPEBITS, SLOPERANGE,
};

use glam::IVec2;

/// Map points are `IVec2` whose components are raw 16.16 units.
#[inline]
pub const fn map_point(x: i32, y: i32) -> IVec2 {
    IVec2::new(x << FRACBITS, y << FRACBITS)
}

/// Component of a map point as a `Fixed`.
#[inline]
pub const fn fixed(raw: i32) -> Fixed {
    Fixed::from_bits(raw)
}

/// Distance from `from` to `to` along the dominant axis projection. This is
/// the classic distance approximation used for wall scaling: exact for the
/// perpendicular use it is put to once multiplied back through the fine
/// tables.
pub fn point_to_dist(from: IVec2, to: IVec2) -> Fixed {
    let mut dx = fixed(to.x.wrapping_sub(from.x)).abs();
    let mut dy = fixed(to.y.wrapping_sub(from.y)).abs();

    if dy > dx {
        std::mem::swap(&mut dx, &mut dy);
    }
    if dx == Fixed::ZERO {
        return Fixed::ZERO;
    }

    let slope = (dy / dx).to_bits() >> DBITS;
    let fine = (Angle::from_bits(tantoangle(slope)) + ANG90).to_fine();
    dx / finesine(fine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_axis_aligned() {
        let a = map_point(0, 0);
        assert_eq!(point_to_dist(a, map_point(100, 0)).to_int(), 100);
        assert_eq!(point_to_dist(a, map_point(0, -64)).to_int(), 64);
    }

    #[test]
    fn distance_diagonal() {
        let a = map_point(0, 0);
        let d = point_to_dist(a, map_point(30, 40)).to_int();
        // hypotenuse of 30/40/50, table quantisation gives a small error
        assert!((49..=51).contains(&d), "{d}");
    }

    #[test]
    fn distance_coincident() {
        let a = map_point(5, 5);
        assert_eq!(point_to_dist(a, a), Fixed::ZERO);
    }
}

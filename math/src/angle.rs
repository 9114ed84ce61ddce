use crate::fixed::Fixed;
use crate::tables::{
    finecosine, finesine, finetangent, slope_div, tantoangle, ANGLETOFINESHIFT, FINEANGLES,
};
use glam::IVec2;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// 32-bit binary angle measure. A full turn is the full `u32` range, so all
/// arithmetic wraps for free.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(u32);

pub const ANG45: Angle = Angle(0x2000_0000);
pub const ANG90: Angle = Angle(0x4000_0000);
pub const ANG180: Angle = Angle(0x8000_0000);
pub const ANG270: Angle = Angle(0xC000_0000);

impl Angle {
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    pub fn from_degrees(deg: f64) -> Self {
        let turns = (deg / 360.0).rem_euclid(1.0);
        Self((turns * (1u64 << 32) as f64) as u32)
    }

    /// Index into the fine trig tables.
    #[inline]
    pub const fn to_fine(self) -> usize {
        (self.0 >> ANGLETOFINESHIFT) as usize
    }

    #[inline]
    pub fn sin(self) -> Fixed {
        finesine(self.to_fine())
    }

    #[inline]
    pub fn cos(self) -> Fixed {
        finecosine(self.to_fine())
    }

    /// Tangent relative to straight ahead; meaningful for angles within a
    /// quarter turn either side of `ANG90`.
    #[inline]
    pub fn tan(self) -> Fixed {
        finetangent(self.to_fine().min(FINEANGLES / 2 - 1))
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}deg", self.0 as f64 / (1u64 << 32) as f64 * 360.0)
    }
}

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, rhs: Angle) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, rhs: Angle) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Angle {
    type Output = Angle;
    #[inline]
    fn neg(self) -> Angle {
        Angle(self.0.wrapping_neg())
    }
}

/// BAM angle of the ray from `from` to `to`, both points in 16.16 map units.
/// Octant decomposition plus the `tantoangle` lookup; coincident points give
/// angle zero.
pub fn point_to_angle(from: IVec2, to: IVec2) -> Angle {
    let x = to.x.wrapping_sub(from.x);
    let y = to.y.wrapping_sub(from.y);

    if x == 0 && y == 0 {
        return Angle::default();
    }

    if x >= 0 {
        if y >= 0 {
            if x > y {
                Angle(tantoangle(slope_div(y, x)))
            } else {
                Angle(ANG90.0 - 1 - tantoangle(slope_div(x, y)))
            }
        } else {
            let y = -y;
            if x > y {
                -Angle(tantoangle(slope_div(y, x)))
            } else {
                ANG270 + Angle(tantoangle(slope_div(x, y)))
            }
        }
    } else {
        let x = -x;
        if y >= 0 {
            if x > y {
                Angle(ANG180.0 - 1 - tantoangle(slope_div(y, x)))
            } else {
                ANG90 + Angle(tantoangle(slope_div(x, y)))
            }
        } else {
            let y = -y;
            if x > y {
                ANG180 + Angle(tantoangle(slope_div(y, x)))
            } else {
                Angle(ANG270.0 - 1 - tantoangle(slope_div(x, y)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FRACUNIT;

    fn pt(x: i32, y: i32) -> IVec2 {
        IVec2::new(x * FRACUNIT, y * FRACUNIT)
    }

    fn close(a: Angle, b: Angle) -> bool {
        let d = (a - b).to_bits();
        d < 0x0008_0000 || d > 0xFFF8_0000
    }

    #[test]
    fn wrapping_ops() {
        assert_eq!(ANG270 + ANG90 + ANG45, ANG45);
        assert_eq!(ANG45 - ANG90, -ANG45);
        assert_eq!(Angle::from_degrees(450.0), ANG90);
    }

    #[test]
    fn octant_axes() {
        let o = pt(0, 0);
        assert!(close(point_to_angle(o, pt(100, 0)), Angle(0)));
        assert!(close(point_to_angle(o, pt(0, 100)), ANG90));
        assert!(close(point_to_angle(o, pt(-100, 0)), ANG180));
        assert!(close(point_to_angle(o, pt(0, -100)), ANG270));
    }

    #[test]
    fn octant_diagonals() {
        let o = pt(0, 0);
        assert!(close(point_to_angle(o, pt(50, 50)), ANG45));
        assert!(close(point_to_angle(o, pt(-50, 50)), ANG90 + ANG45));
        assert!(close(point_to_angle(o, pt(-50, -50)), ANG180 + ANG45));
        assert!(close(point_to_angle(o, pt(50, -50)), ANG270 + ANG45));
    }

    #[test]
    fn sin_cos_agree_with_tables() {
        assert!(ANG90.sin().to_bits().abs_diff(FRACUNIT) < 32);
        assert!((ANG180.cos() + Fixed::UNIT).to_bits().abs() < 32);
        assert!(Angle(0).cos().to_bits().abs_diff(FRACUNIT) < 32);
    }
}

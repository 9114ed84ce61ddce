//! The fine-angle lookup tables behind all renderer trig.
//!
//! Angles quantise to `FINEANGLES` steps per turn. `finesine` carries an
//! extra quarter turn so cosine reads from the same table at an offset of
//! `FINEANGLES / 4`. `finetangent` spans a half turn centred on straight
//! ahead, and `tantoangle` inverts a slope in [0, 1] back to a BAM angle.

use crate::fixed::Fixed;
use lazy_static::lazy_static;
use std::f64::consts::PI;

pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;
/// Shift from a 32-bit BAM angle down to a fine-table index.
pub const ANGLETOFINESHIFT: u32 = 19;

pub const SLOPERANGE: i32 = 2048;
pub const SLOPEBITS: i32 = 11;
pub const DBITS: i32 = super::fixed::FRACBITS - SLOPEBITS;

lazy_static! {
    static ref FINESINE: [Fixed; FINEANGLES + FINEANGLES / 4] = {
        let mut t = [Fixed::ZERO; FINEANGLES + FINEANGLES / 4];
        for (i, v) in t.iter_mut().enumerate() {
            let a = (i as f64 + 0.5) * (2.0 * PI) / FINEANGLES as f64;
            *v = Fixed::from_float(a.sin());
        }
        t
    };
    static ref FINETANGENT: [Fixed; FINEANGLES / 2] = {
        let mut t = [Fixed::ZERO; FINEANGLES / 2];
        for (i, v) in t.iter_mut().enumerate() {
            let a = ((i as f64 - FINEANGLES as f64 / 4.0) + 0.5) * (2.0 * PI) / FINEANGLES as f64;
            *v = Fixed::from_float(a.tan().clamp(-(1 << 14) as f64, (1 << 14) as f64));
        }
        t
    };
    static ref TANTOANGLE: [u32; SLOPERANGE as usize + 1] = {
        let mut t = [0u32; SLOPERANGE as usize + 1];
        for (i, v) in t.iter_mut().enumerate() {
            let a = (i as f64 / SLOPERANGE as f64).atan() / (2.0 * PI);
            *v = (a * (1u64 << 32) as f64) as u32;
        }
        t
    };
}

/// Sine by fine index. The index wraps.
#[inline]
pub fn finesine(idx: usize) -> Fixed {
    FINESINE[idx & FINEMASK]
}

/// Cosine by fine index, read from the sine table a quarter turn along.
#[inline]
pub fn finecosine(idx: usize) -> Fixed {
    FINESINE[(idx & FINEMASK) + FINEANGLES / 4]
}

/// Tangent by fine index in [0, FINEANGLES/2). Out-of-range indexes clamp to
/// the nearest end rather than wrapping, so a caller that drifts a column
/// past the half-turn window gets the steepest tangent, not garbage.
#[inline]
pub fn finetangent(idx: usize) -> Fixed {
    FINETANGENT[idx.min(FINEANGLES / 2 - 1)]
}

/// BAM angle for a slope `num/den` where `0 <= num <= den`.
#[inline]
pub fn tantoangle(slope: i32) -> u32 {
    TANTOANGLE[slope.clamp(0, SLOPERANGE) as usize]
}

/// Quantise `num/den` (both 16.16, non-negative, num <= den) to the
/// `tantoangle` slope range.
#[inline]
pub fn slope_div(num: i32, den: i32) -> i32 {
    if den < 512 {
        return SLOPERANGE;
    }
    let ans = ((num as i64) << 3) / ((den as i64) >> 8);
    if ans <= SLOPERANGE as i64 {
        ans as i32
    } else {
        SLOPERANGE
    }
}

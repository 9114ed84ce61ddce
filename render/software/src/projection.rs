//! Screen-projection tables built once per view size: the angle/column
//! mappings, per-row flat slopes and the shared scale clamp.

use std::error::Error;
use std::fmt;

use math::{
    finecosine, finesine, finetangent, Angle, Fixed, ANG90, ANGLETOFINESHIFT, FINEANGLES, FRACBITS,
    FRACUNIT,
};

/// Smallest wall scale kept after projection; anything nearer-to-zero is
/// degenerate and clamped up.
pub const MIN_SCALE: Fixed = Fixed::from_bits(256);
/// Largest wall scale; walls closer than this stop growing.
pub const MAX_SCALE: Fixed = Fixed::from_bits(64 * FRACUNIT);

/// Fine-angle width of the horizontal field of view. 2048 fine angles is
/// 90 degrees.
const FIELDOFVIEW: usize = 2048;

#[derive(Debug, PartialEq, Eq)]
pub enum RenderError {
    BadViewSize { width: usize, height: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::BadViewSize { width, height } => {
                write!(f, "unusable view size {width}x{height}")
            }
        }
    }
}

impl Error for RenderError {}

pub struct Projection {
    pub screen_width: i32,
    pub screen_height: i32,
    pub centerx: i32,
    pub centery: i32,
    pub centerxfrac: Fixed,
    pub centeryfrac: Fixed,
    /// Projection plane distance, equal to `centerxfrac` for the fixed
    /// 90 degree field of view.
    pub projection: Fixed,
    /// Screen column for each fine angle in the left-to-right half circle.
    viewangletox: Vec<i32>,
    /// View-relative angle through the left edge of each screen column,
    /// `width + 1` entries.
    pub xtoviewangle: Vec<Angle>,
    /// Flat-projection slope per screen row.
    pub yslope: Vec<Fixed>,
    /// Length correction per column for flat spans off screen centre.
    pub distscale: Vec<Fixed>,
    /// View-relative angle of the left screen edge; anything further left
    /// than its mirror is off screen.
    pub clipangle: Angle,
}

impl Projection {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        if width < 2 || height < 2 || width > i16::MAX as usize || height > i16::MAX as usize {
            return Err(RenderError::BadViewSize { width, height });
        }
        let swidth = width as i32;
        let sheight = height as i32;
        let centerx = swidth / 2;
        let centery = sheight / 2;
        let centerxfrac = Fixed::from_int(centerx);
        let centeryfrac = Fixed::from_int(centery);

        // tan at the half-FOV edge is 1.0, so the focal length equals the
        // half width
        let focallength =
            centerxfrac / finetangent(FINEANGLES / 4 + FIELDOFVIEW / 2);

        let mut viewangletox = vec![0i32; FINEANGLES / 2];
        for (i, vtx) in viewangletox.iter_mut().enumerate() {
            let tan = finetangent(i);
            let t = if tan > Fixed::from_int(2) {
                -1
            } else if tan < Fixed::from_int(-2) {
                swidth + 1
            } else {
                let t = (centerxfrac - tan * focallength).to_bits() + FRACUNIT - 1;
                (t >> FRACBITS).clamp(-1, swidth + 1)
            };
            *vtx = t;
        }

        let mut xtoviewangle = vec![Angle::default(); width + 1];
        for (x, xta) in xtoviewangle.iter_mut().enumerate() {
            let mut i = 0;
            while viewangletox[i] > x as i32 {
                i += 1;
            }
            *xta = Angle::from_bits((i as u32) << ANGLETOFINESHIFT) - ANG90;
        }

        // pin the ends so angle_to_x always lands on screen
        for vtx in viewangletox.iter_mut() {
            if *vtx == -1 {
                *vtx = 0;
            } else if *vtx == swidth + 1 {
                *vtx = swidth;
            }
        }
        let clipangle = xtoviewangle[0];

        let mut yslope = Vec::with_capacity(height);
        for y in 0..sheight {
            let dy = Fixed::from_bits(((y - centery) << FRACBITS) + FRACUNIT / 2).abs();
            yslope.push(Fixed::from_int(centerx) / dy);
        }

        let mut distscale = Vec::with_capacity(width);
        for x in 0..width {
            let cosadj = finecosine(xtoviewangle[x].to_fine()).abs();
            distscale.push(Fixed::UNIT / cosadj);
        }

        Ok(Self {
            screen_width: swidth,
            screen_height: sheight,
            centerx,
            centery,
            centerxfrac,
            centeryfrac,
            projection: centerxfrac,
            viewangletox,
            xtoviewangle,
            yslope,
            distscale,
            clipangle,
        })
    }

    /// Map a view-relative angle (already clipped to the view cone) to the
    /// screen column its ray passes through.
    pub fn angle_to_x(&self, angle: Angle) -> i32 {
        let fine = (angle + ANG90).to_fine().min(FINEANGLES / 2 - 1);
        self.viewangletox[fine]
    }

    /// Projected scale of a wall at `visangle`, for a wall whose normal
    /// points along `rw_normalangle` at perpendicular distance
    /// `rw_distance`.
    pub fn scale_from_view_angle(
        &self,
        visangle: Angle,
        rw_normalangle: Angle,
        rw_distance: Fixed,
        view_angle: Angle,
    ) -> Fixed {
        let anglea = ANG90 + (visangle - view_angle);
        let angleb = ANG90 + (visangle - rw_normalangle);

        // both sines are always positive
        let sinea = finesine(anglea.to_fine());
        let sineb = finesine(angleb.to_fine());

        let num = self.projection * sineb;
        let den = rw_distance * sinea;

        if den.to_bits() > num.to_bits() >> FRACBITS {
            (num / den).clamp(MIN_SCALE, MAX_SCALE)
        } else {
            MAX_SCALE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_centre() {
        let p = Projection::new(320, 200).unwrap();
        assert_eq!(p.centerx, 160);
        assert_eq!(p.projection, Fixed::from_int(160));
        // straight ahead projects to the centre column
        let x = p.angle_to_x(Angle::from_bits(0));
        assert!((x - 160).abs() <= 1, "centre ray at {x}");
        // the full left edge of the view cone is column 0
        assert_eq!(p.angle_to_x(p.clipangle), 0);
    }

    #[test]
    fn xtoviewangle_monotonic() {
        let p = Projection::new(320, 200).unwrap();
        for w in p.xtoviewangle.windows(2) {
            // angles decrease left to right as signed view-relative values
            assert!(w[0].to_bits() as i32 >= w[1].to_bits() as i32);
        }
    }

    #[test]
    fn angle_to_x_round_trips_xtoviewangle() {
        let p = Projection::new(320, 200).unwrap();
        for x in (0..320).step_by(17) {
            let back = p.angle_to_x(p.xtoviewangle[x as usize]);
            assert!((back - x).abs() <= 1, "column {x} mapped to {back}");
        }
    }

    #[test]
    fn yslope_peaks_at_centre() {
        let p = Projection::new(320, 200).unwrap();
        assert!(p.yslope[100] > p.yslope[0]);
        assert!(p.yslope[100] > p.yslope[199]);
    }

    #[test]
    fn scale_clamped() {
        let p = Projection::new(320, 200).unwrap();
        let view = Angle::from_bits(0);
        // wall almost on top of the eye
        let s = p.scale_from_view_angle(view, ANG90, Fixed::from_bits(1), view);
        assert_eq!(s, MAX_SCALE);
        // very distant wall shrinks towards the minimum
        let s = p.scale_from_view_angle(view, ANG90, Fixed::from_int(30_000), view);
        assert!(s >= MIN_SCALE && s < Fixed::from_bits(512), "scale {s:?}");
    }

    #[test]
    fn degenerate_size_rejected() {
        assert!(Projection::new(0, 0).is_err());
        assert!(Projection::new(1, 200).is_err());
    }
}

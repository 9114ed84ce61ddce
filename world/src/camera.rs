use glam::IVec2;
use math::{Angle, Fixed};

/// Everything the renderer needs to know about the eye for one frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct Camera {
    /// Map-space position in 16.16 fixed point.
    pub pos: IVec2,
    /// Eye height above the map origin, not above the floor.
    pub viewz: Fixed,
    pub angle: Angle,
    /// Light boost from a held light source, in light-table rows.
    pub extra_light: usize,
    /// When nonzero, force all drawing through this single colormap
    /// (invulnerability style effects).
    pub fixed_colormap: usize,
}

impl Camera {
    pub fn new(pos: IVec2, viewz: Fixed, angle: Angle) -> Self {
        Self {
            pos,
            viewz,
            angle,
            extra_light: 0,
            fixed_colormap: 0,
        }
    }
}

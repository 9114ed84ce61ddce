//! The classic column-and-span software renderer: BSP front-to-back wall
//! pass, visplane flats, then sprites and masked textures sorted by depth.

mod bsp;
pub mod defs;
pub mod planes;
mod projection;
mod segs;
mod things;

#[cfg(test)]
mod tests;

use math::Angle;

pub use bsp::SoftwareRenderer;
pub use projection::{Projection, RenderError, MAX_SCALE, MIN_SCALE};

use planes::VisPlaneRender;

/// Frame-scoped state shared between the wall, plane and masked passes.
pub struct RenderData {
    /// Angle from the eye to the start vertex of the seg being clipped.
    pub rw_angle1: Angle,
    pub drawsegs: Vec<defs::DrawSeg>,
    /// Per column, the topmost solid row below the open range. Starts at
    /// the screen height and is pulled up as portal bottoms are drawn.
    pub floorclip: Vec<i32>,
    /// Per column, the bottommost solid row above the open range. Starts
    /// at -1 and is pushed down as portal tops are drawn.
    pub ceilingclip: Vec<i32>,
    pub visplane_render: VisPlaneRender,
    screen_height: i32,
}

impl RenderData {
    pub fn new(screen_width: usize, screen_height: usize) -> Self {
        Self {
            rw_angle1: Angle::default(),
            drawsegs: Vec::with_capacity(defs::MAXDRAWSEGS / 4),
            floorclip: vec![screen_height as i32; screen_width],
            ceilingclip: vec![-1; screen_width],
            visplane_render: VisPlaneRender::new(screen_width, screen_height),
            screen_height: screen_height as i32,
        }
    }

    pub fn clear_data(&mut self, view_angle: Angle, projection: &Projection) {
        self.rw_angle1 = Angle::default();
        self.drawsegs.clear();
        self.floorclip.fill(self.screen_height);
        self.ceilingclip.fill(-1);
        self.visplane_render.clear_planes(view_angle, projection);
    }
}

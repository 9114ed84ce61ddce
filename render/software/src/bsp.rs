//! Front-to-back BSP traversal with column occlusion tracking. Everything
//! visible flows from here: walls to the seg renderer, flats to visplanes,
//! sprites to the masked pass.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::IVec2;
use log::{trace, warn};
use math::{point_to_angle, Angle, ANG180};
use render_trait::PixelBuffer;
use world::{Camera, MapData, PicData, IS_SUBSECTOR_MASK};

use super::defs::ClipRange;
use super::projection::{Projection, RenderError};
use super::segs::SegRender;
use super::things::ThingRender;
use super::RenderData;

pub struct SoftwareRenderer {
    projection: Projection,
    pub(crate) r_data: RenderData,
    seg_render: SegRender,
    pub(crate) things: ThingRender,
    /// Merged list of fully occluded column ranges, bracketed by sentinel
    /// posts off both screen edges.
    pub(crate) solidsegs: Vec<ClipRange>,
    /// Subsectors in the order this frame's traversal reached them.
    pub(crate) subsector_order: Vec<u32>,
}

impl SoftwareRenderer {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        let projection = Projection::new(width, height)?;
        Ok(Self {
            r_data: RenderData::new(width, height),
            seg_render: SegRender::new(),
            things: ThingRender::new(width, height),
            solidsegs: Vec::with_capacity(64),
            subsector_order: Vec::with_capacity(64),
            projection,
        })
    }

    /// Rebuild all projection tables and per-frame buffers for a new view
    /// size.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Draw one frame of the world as seen from `camera`. The pixel buffer
    /// is not cleared first; every visible surface writes its own columns.
    pub fn render_player_view(
        &mut self,
        camera: &Camera,
        map: &MapData,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        self.clear(camera);

        {
            #[cfg(feature = "hprof")]
            profile!("render_bsp_node");
            let mut count = 0;
            self.render_bsp_node(map, camera, map.start_node, pic_data, pixels, &mut count);
            trace!("BSP traversals for render: {count}");
        }

        {
            #[cfg(feature = "hprof")]
            profile!("draw_planes");
            self.r_data
                .visplane_render
                .draw_planes(camera, &self.projection, pic_data, pixels);
        }

        {
            #[cfg(feature = "hprof")]
            profile!("draw_masked");
            self.things.draw_masked(
                camera,
                map,
                &self.projection,
                pic_data,
                &mut self.r_data,
                pixels,
            );
        }
    }

    fn clear(&mut self, camera: &Camera) {
        self.clear_clip_segs();
        self.subsector_order.clear();
        self.r_data.clear_data(camera.angle, &self.projection);
        self.things.clear();
    }

    fn clear_clip_segs(&mut self) {
        self.solidsegs.clear();
        self.solidsegs.push(ClipRange {
            first: i32::MIN,
            last: -1,
        });
        self.solidsegs.push(ClipRange {
            first: self.projection.screen_width,
            last: i32::MAX,
        });
    }

    fn store_range(
        &mut self,
        start: i32,
        stop: i32,
        seg_id: u32,
        map: &MapData,
        camera: &Camera,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        self.seg_render.store_wall_range(
            start,
            stop,
            seg_id,
            map,
            camera,
            &self.projection,
            pic_data,
            &mut self.r_data,
            pixels,
        );
    }

    /// Clip a wall seg against the view cone, decide whether it is solid or
    /// a portal and pass the visible columns on.
    #[allow(clippy::too_many_arguments)]
    fn add_line(
        &mut self,
        camera: &Camera,
        map: &MapData,
        seg_id: u32,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        #[cfg(feature = "hprof")]
        profile!("add_line");
        let Some(seg) = map.segments.get(seg_id as usize) else {
            warn!("subsector references missing seg {seg_id}, skipped");
            return;
        };

        let angle1 = point_to_angle(camera.pos, seg.v1);
        let angle2 = point_to_angle(camera.pos, seg.v2);

        // wound away from the view point
        let span = angle1 - angle2;
        if span.to_bits() >= ANG180.to_bits() {
            return;
        }

        self.r_data.rw_angle1 = angle1;
        let mut angle1 = angle1 - camera.angle;
        let mut angle2 = angle2 - camera.angle;

        let clipangle = self.projection.clipangle;
        let clipangle2 = Angle::from_bits(clipangle.to_bits() << 1);

        let tspan = angle1 + clipangle;
        if tspan.to_bits() > clipangle2.to_bits() {
            let tspan = tspan - clipangle2;
            // totally off the left edge?
            if tspan.to_bits() >= span.to_bits() {
                return;
            }
            angle1 = clipangle;
        }
        let tspan = clipangle - angle2;
        if tspan.to_bits() > clipangle2.to_bits() {
            let tspan = tspan - clipangle2;
            // totally off the right edge?
            if tspan.to_bits() >= span.to_bits() {
                return;
            }
            angle2 = -clipangle;
        }

        let x1 = self.projection.angle_to_x(angle1);
        let x2 = self.projection.angle_to_x(angle2);
        // does not cross a pixel
        if x1 == x2 {
            return;
        }
        let x2 = x2 - 1;

        let Some(back) = seg.backsector else {
            self.clip_solid_seg(x1, x2, seg_id, map, camera, pic_data, pixels);
            return;
        };
        let (Some(front), Some(back)) = (
            map.sectors.get(seg.frontsector as usize),
            map.sectors.get(back as usize),
        ) else {
            warn!("seg {seg_id} references a missing sector, skipped");
            return;
        };

        // closed door
        if back.ceilingheight <= front.floorheight || back.floorheight >= front.ceilingheight {
            self.clip_solid_seg(x1, x2, seg_id, map, camera, pic_data, pixels);
            return;
        }

        // window
        if back.ceilingheight != front.ceilingheight || back.floorheight != front.floorheight {
            self.clip_portal_seg(x1, x2, seg_id, map, camera, pic_data, pixels);
            return;
        }

        // identical planes on both sides and nothing to draw on the line
        // itself means the seg can be skipped entirely
        if back.ceilingpic == front.ceilingpic
            && back.floorpic == front.floorpic
            && back.lightlevel == front.lightlevel
            && map
                .sidedefs
                .get(seg.sidedef as usize)
                .map_or(true, |s| s.midtexture.is_none())
        {
            return;
        }

        self.clip_portal_seg(x1, x2, seg_id, map, camera, pic_data, pixels);
    }

    /// Clip a solid wall range against the occlusion list, draw the exposed
    /// fragments and merge the range in.
    #[allow(clippy::too_many_arguments)]
    fn clip_solid_seg(
        &mut self,
        first: i32,
        last: i32,
        seg_id: u32,
        map: &MapData,
        camera: &Camera,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        // find the first range that touches the new post
        let mut start = 0;
        while self.solidsegs[start].last < first - 1 {
            start += 1;
        }

        if first < self.solidsegs[start].first {
            if last < self.solidsegs[start].first - 1 {
                // entirely visible, becomes a new post
                self.store_range(first, last, seg_id, map, camera, pic_data, pixels);
                self.solidsegs.insert(start, ClipRange { first, last });
                return;
            }
            // a fragment above the existing post
            let stop = self.solidsegs[start].first - 1;
            self.store_range(first, stop, seg_id, map, camera, pic_data, pixels);
            self.solidsegs[start].first = first;
        }

        if last <= self.solidsegs[start].last {
            // bottom contained in the post
            return;
        }

        let mut next = start;
        while last >= self.solidsegs[next + 1].first - 1 {
            // fragment between two posts
            let frag_first = self.solidsegs[next].last + 1;
            let frag_last = self.solidsegs[next + 1].first - 1;
            self.store_range(frag_first, frag_last, seg_id, map, camera, pic_data, pixels);
            next += 1;

            if last <= self.solidsegs[next].last {
                self.solidsegs[start].last = self.solidsegs[next].last;
                self.solidsegs.drain(start + 1..next + 1);
                return;
            }
        }

        // fragment after the last post
        let frag_first = self.solidsegs[next].last + 1;
        self.store_range(frag_first, last, seg_id, map, camera, pic_data, pixels);
        self.solidsegs[start].last = last;
        self.solidsegs.drain(start + 1..next + 1);
    }

    /// Clip a window range: exposed fragments are drawn but the occlusion
    /// list is left untouched.
    #[allow(clippy::too_many_arguments)]
    fn clip_portal_seg(
        &mut self,
        first: i32,
        last: i32,
        seg_id: u32,
        map: &MapData,
        camera: &Camera,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        let mut start = 0;
        while self.solidsegs[start].last < first - 1 {
            start += 1;
        }

        if first < self.solidsegs[start].first {
            if last < self.solidsegs[start].first - 1 {
                self.store_range(first, last, seg_id, map, camera, pic_data, pixels);
                return;
            }
            let stop = self.solidsegs[start].first - 1;
            self.store_range(first, stop, seg_id, map, camera, pic_data, pixels);
        }

        if last <= self.solidsegs[start].last {
            return;
        }

        while last >= self.solidsegs[start + 1].first - 1 {
            let frag_first = self.solidsegs[start].last + 1;
            let frag_last = self.solidsegs[start + 1].first - 1;
            self.store_range(frag_first, frag_last, seg_id, map, camera, pic_data, pixels);
            start += 1;

            if last <= self.solidsegs[start].last {
                return;
            }
        }

        let frag_first = self.solidsegs[start].last + 1;
        self.store_range(frag_first, last, seg_id, map, camera, pic_data, pixels);
    }

    /// Open the subsector's planes, queue its sprites and feed every seg to
    /// the wall pipeline.
    fn draw_subsector(
        &mut self,
        map: &MapData,
        camera: &Camera,
        subsector_id: u32,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        #[cfg(feature = "hprof")]
        profile!("draw_subsector");
        let Some(subsector) = map.subsectors.get(subsector_id as usize) else {
            warn!("BSP leaf references missing subsector {subsector_id}, skipped");
            return;
        };
        let Some(sector) = map.sectors.get(subsector.sector as usize) else {
            warn!(
                "subsector {subsector_id} references missing sector {}, skipped",
                subsector.sector
            );
            return;
        };
        self.subsector_order.push(subsector_id);

        self.r_data.visplane_render.floorplane = if sector.floorheight < camera.viewz {
            Some(self.r_data.visplane_render.find_plane(
                sector.floorheight,
                sector.floorpic,
                sector.lightlevel,
                pic_data.sky_flat(),
            ))
        } else {
            None
        };

        self.r_data.visplane_render.ceilingplane = if sector.ceilingheight > camera.viewz
            || sector.ceilingpic == pic_data.sky_flat()
        {
            Some(self.r_data.visplane_render.find_plane(
                sector.ceilingheight,
                sector.ceilingpic,
                sector.lightlevel,
                pic_data.sky_flat(),
            ))
        } else {
            None
        };

        self.things
            .add_sprites(camera, map, subsector.sector, &self.projection, pic_data);

        let start = subsector.start_seg;
        for seg_id in start..start + subsector.seg_count {
            self.add_line(camera, map, seg_id, pic_data, pixels);
        }
    }

    /// Walk the BSP front to back from `node_id`, stopping early once the
    /// whole screen is behind solid walls.
    pub(crate) fn render_bsp_node(
        &mut self,
        map: &MapData,
        camera: &Camera,
        node_id: u32,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
        count: &mut usize,
    ) {
        *count += 1;
        // a single merged clip post means no column is open
        if self.solidsegs.len() == 1 {
            return;
        }

        if node_id & IS_SUBSECTOR_MASK != 0 {
            self.draw_subsector(map, camera, node_id & !IS_SUBSECTOR_MASK, pic_data, pixels);
            return;
        }

        let Some(node) = map.nodes.get(node_id as usize) else {
            warn!("BSP child references missing node {node_id}, subtree skipped");
            return;
        };
        let side = node.point_on_side(camera.pos);
        let children = node.children;
        let back_bb = node.bboxes[side ^ 1];

        self.render_bsp_node(map, camera, children[side], pic_data, pixels, count);

        if self.bb_extents_in_fov(&back_bb, camera) {
            self.render_bsp_node(map, camera, children[side ^ 1], pic_data, pixels, count);
        }
    }

    /// Can any part of the bounding box cross the view cone through columns
    /// that are still open?
    fn bb_extents_in_fov(&self, bbox: &[IVec2; 2], camera: &Camera) -> bool {
        #[cfg(feature = "hprof")]
        profile!("bb_extents_in_fov");
        let top = bbox[0].y;
        let bottom = bbox[1].y;
        let left = bbox[0].x;
        let right = bbox[1].x;

        let boxx = if camera.pos.x <= left {
            0
        } else if camera.pos.x < right {
            1
        } else {
            2
        };
        let boxy = if camera.pos.y >= top {
            0
        } else if camera.pos.y > bottom {
            1
        } else {
            2
        };

        let boxpos = (boxy << 2) + boxx;
        if boxpos == 5 {
            return true;
        }

        // the two corners spanning the widest angle as seen from the view
        // point, per box octant
        let (v1, v2) = match boxpos {
            0 => (IVec2::new(right, top), IVec2::new(left, bottom)),
            1 => (IVec2::new(right, top), IVec2::new(left, top)),
            2 => (IVec2::new(right, bottom), IVec2::new(left, top)),
            4 => (IVec2::new(left, top), IVec2::new(left, bottom)),
            6 => (IVec2::new(right, bottom), IVec2::new(right, top)),
            8 => (IVec2::new(left, top), IVec2::new(right, bottom)),
            9 => (IVec2::new(left, bottom), IVec2::new(right, bottom)),
            10 => (IVec2::new(left, bottom), IVec2::new(right, top)),
            _ => return true,
        };

        let mut angle1 = point_to_angle(camera.pos, v1) - camera.angle;
        let mut angle2 = point_to_angle(camera.pos, v2) - camera.angle;

        let span = angle1 - angle2;
        // the eye is inside the box
        if span.to_bits() >= ANG180.to_bits() {
            return true;
        }

        let clipangle = self.projection.clipangle;
        let clipangle2 = Angle::from_bits(clipangle.to_bits() << 1);

        let tspan = angle1 + clipangle;
        if tspan.to_bits() > clipangle2.to_bits() {
            let tspan = tspan - clipangle2;
            if tspan.to_bits() >= span.to_bits() {
                return false;
            }
            angle1 = clipangle;
        }
        let tspan = clipangle - angle2;
        if tspan.to_bits() > clipangle2.to_bits() {
            let tspan = tspan - clipangle2;
            if tspan.to_bits() >= span.to_bits() {
                return false;
            }
            angle2 = -clipangle;
        }

        let sx1 = self.projection.angle_to_x(angle1);
        let sx2 = self.projection.angle_to_x(angle2);
        if sx1 == sx2 {
            return false;
        }
        let sx2 = sx2 - 1;

        // is some part of the range still open?
        let mut start = 0;
        while self.solidsegs[start].last < sx2 {
            start += 1;
        }
        !(sx1 >= self.solidsegs[start].first && sx2 <= self.solidsegs[start].last)
    }
}

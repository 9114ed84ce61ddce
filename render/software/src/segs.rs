use log::warn;
use math::{finetangent, Angle, Fixed, ANG180, ANG90, FRACBITS, FRACUNIT};
use render_trait::PixelBuffer;
use world::pic::TRANSPARENT;
use world::{Camera, LineFlags, MapData, PicData, Segment, SideDef};

use super::defs::{DrawSeg, MAXDRAWSEGS, SIL_BOTH, SIL_BOTTOM, SIL_NONE, SIL_TOP};
use super::projection::Projection;
use super::RenderData;

/// All of the state in this struct is unique to it as it is used once per
/// seg to be rendered.
pub(crate) struct SegRender {
    /// True if any of the segs textures might be visible.
    segtextured: bool,
    /// False if the back side is the same plane.
    markfloor: bool,
    markceiling: bool,
    maskedtexture: bool,
    /// Index in to `openings` array
    maskedtexturecol: i32,
    // Texture exists?
    toptexture: bool,
    bottomtexture: bool,
    midtexture: bool,

    rw_normalangle: Angle,
    // regular wall
    rw_x: i32,
    rw_stopx: i32,
    rw_centerangle: Angle,
    rw_offset: Fixed,
    rw_distance: Fixed,
    rw_scale: Fixed,
    rw_scalestep: Fixed,
    rw_midtexturemid: Fixed,
    rw_toptexturemid: Fixed,
    rw_bottomtexturemid: Fixed,

    pixhigh: Fixed,
    pixlow: Fixed,
    pixhighstep: Fixed,
    pixlowstep: Fixed,

    topfrac: Fixed,
    topstep: Fixed,
    bottomfrac: Fixed,
    bottomstep: Fixed,

    worldtop: Fixed,
    worldbottom: Fixed,
    worldhigh: Fixed,
    worldlow: Fixed,

    /// Light level bracket for the wall, before the fake-contrast nudge.
    wall_lights: usize,
}

impl SegRender {
    pub(crate) fn new() -> Self {
        Self {
            segtextured: false,
            markfloor: false,
            markceiling: false,
            maskedtexture: false,
            maskedtexturecol: -1,
            toptexture: false,
            bottomtexture: false,
            midtexture: false,
            rw_normalangle: Angle::default(),
            rw_x: 0,
            rw_stopx: 0,
            rw_centerangle: Angle::default(),
            rw_offset: Fixed::ZERO,
            rw_distance: Fixed::ZERO,
            rw_scale: Fixed::ZERO,
            rw_scalestep: Fixed::ZERO,
            rw_midtexturemid: Fixed::ZERO,
            rw_toptexturemid: Fixed::ZERO,
            rw_bottomtexturemid: Fixed::ZERO,
            pixhigh: Fixed::ZERO,
            pixlow: Fixed::ZERO,
            pixhighstep: Fixed::ZERO,
            pixlowstep: Fixed::ZERO,
            topfrac: Fixed::ZERO,
            topstep: Fixed::ZERO,
            bottomfrac: Fixed::ZERO,
            bottomstep: Fixed::ZERO,
            worldtop: Fixed::ZERO,
            worldbottom: Fixed::ZERO,
            worldhigh: Fixed::ZERO,
            worldlow: Fixed::ZERO,
            wall_lights: 0,
        }
    }

    /// Project one visible wall range on to columns `start..=stop`, emit a
    /// drawseg for later sprite clipping and draw the solid parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn store_wall_range(
        &mut self,
        start: i32,
        stop: i32,
        seg_id: u32,
        map: &MapData,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        if rdata.drawsegs.len() >= MAXDRAWSEGS {
            return;
        }

        if start < 0 || start >= projection.screen_width || start > stop {
            warn!("bad wall range {start} to {stop}, seg {seg_id} skipped");
            return;
        }

        let Some(seg) = map.segments.get(seg_id as usize) else {
            warn!("wall range references missing seg {seg_id}, skipped");
            return;
        };
        let (Some(sidedef), Some(linedef), Some(frontsector)) = (
            map.sidedefs.get(seg.sidedef as usize),
            map.linedefs.get(seg.linedef as usize),
            map.sectors.get(seg.frontsector as usize),
        ) else {
            warn!("seg {seg_id} references missing map data, skipped");
            return;
        };
        let backsector = match seg.backsector {
            Some(b) => match map.sectors.get(b as usize) {
                Some(s) => Some(s),
                None => {
                    warn!("seg {seg_id} references missing backsector {b}, skipped");
                    return;
                }
            },
            None => None,
        };

        let mut ds_p = DrawSeg::new(seg_id);

        self.rw_normalangle = seg.angle + ANG90;
        let mut offsetangle = self.rw_normalangle - rdata.rw_angle1;
        if offsetangle.to_bits() > ANG180.to_bits() {
            offsetangle = -offsetangle;
        }
        if offsetangle.to_bits() > ANG90.to_bits() {
            offsetangle = ANG90;
        }

        let distangle = ANG90 - offsetangle;
        let hyp = math::point_to_dist(camera.pos, seg.v1);
        self.rw_distance = hyp * distangle.sin();

        let view_angle = camera.angle;

        ds_p.x1 = start;
        ds_p.x2 = stop;
        self.rw_x = start;
        self.rw_stopx = stop + 1;

        let visangle = view_angle + projection.xtoviewangle[start as usize];
        self.rw_scale = projection.scale_from_view_angle(
            visangle,
            self.rw_normalangle,
            self.rw_distance,
            view_angle,
        );
        ds_p.scale1 = self.rw_scale;

        if stop > start {
            let visangle = view_angle + projection.xtoviewangle[stop as usize];
            ds_p.scale2 = projection.scale_from_view_angle(
                visangle,
                self.rw_normalangle,
                self.rw_distance,
                view_angle,
            );
            self.rw_scalestep = Fixed::from_bits(
                (ds_p.scale2 - self.rw_scale).to_bits() / (stop - start),
            );
            ds_p.scalestep = self.rw_scalestep;
        } else {
            ds_p.scale2 = ds_p.scale1;
            self.rw_scalestep = Fixed::ZERO;
        }

        // calculate texture boundaries and decide if floor/ceiling marks
        // are needed
        let viewz = camera.viewz;
        self.worldtop = frontsector.ceilingheight - viewz;
        self.worldbottom = frontsector.floorheight - viewz;

        self.midtexture = false;
        self.toptexture = false;
        self.bottomtexture = false;
        self.maskedtexture = false;
        self.maskedtexturecol = -1;

        if let Some(backsector) = backsector {
            // two sided line
            ds_p.sprtopclip = None;
            ds_p.sprbottomclip = None;
            ds_p.silhouette = SIL_NONE;

            if frontsector.floorheight > backsector.floorheight {
                ds_p.silhouette = SIL_BOTTOM;
                ds_p.bsilheight = frontsector.floorheight;
            } else if backsector.floorheight > viewz {
                ds_p.silhouette = SIL_BOTTOM;
                ds_p.bsilheight = Fixed::MAX;
            }

            if frontsector.ceilingheight < backsector.ceilingheight {
                ds_p.silhouette |= SIL_TOP;
                ds_p.tsilheight = frontsector.ceilingheight;
            } else if backsector.ceilingheight < viewz {
                ds_p.silhouette |= SIL_TOP;
                ds_p.tsilheight = Fixed::MIN;
            }

            if backsector.ceilingheight <= frontsector.floorheight {
                ds_p.sprbottomclip = Some(rdata.visplane_render.negone_start());
                ds_p.silhouette |= SIL_BOTTOM;
                ds_p.bsilheight = Fixed::MAX;
            }

            if backsector.floorheight >= frontsector.ceilingheight {
                ds_p.sprtopclip = Some(rdata.visplane_render.screenheight_start());
                ds_p.silhouette |= SIL_TOP;
                ds_p.tsilheight = Fixed::MIN;
            }

            self.worldhigh = backsector.ceilingheight - viewz;
            self.worldlow = backsector.floorheight - viewz;

            // sky hack: never draw the upper step between two sky ceilings
            if frontsector.ceilingpic == pic_data.sky_flat()
                && backsector.ceilingpic == pic_data.sky_flat()
            {
                self.worldtop = self.worldhigh;
            }

            self.markfloor = self.worldlow != self.worldbottom
                || backsector.floorpic != frontsector.floorpic
                || backsector.lightlevel != frontsector.lightlevel;

            self.markceiling = self.worldhigh != self.worldtop
                || backsector.ceilingpic != frontsector.ceilingpic
                || backsector.lightlevel != frontsector.lightlevel;

            if backsector.ceilingheight <= frontsector.floorheight
                || backsector.floorheight >= frontsector.ceilingheight
            {
                // closed door
                self.markceiling = true;
                self.markfloor = true;
            }

            if self.worldhigh < self.worldtop {
                self.toptexture = sidedef.toptexture.is_some();
                if linedef.flags.contains(LineFlags::UNPEG_TOP) {
                    self.rw_toptexturemid = self.worldtop;
                } else if let Some(top_tex) = sidedef.toptexture {
                    let vtop = backsector.ceilingheight
                        + Fixed::from_int(pic_data.wall_height(top_tex));
                    self.rw_toptexturemid = vtop - viewz;
                }
            }

            if self.worldlow > self.worldbottom {
                self.bottomtexture = sidedef.bottomtexture.is_some();
                if linedef.flags.contains(LineFlags::UNPEG_BOTTOM) {
                    self.rw_bottomtexturemid = self.worldtop;
                } else {
                    self.rw_bottomtexturemid = self.worldlow;
                }
            }

            self.rw_toptexturemid = self.rw_toptexturemid + sidedef.rowoffset;
            self.rw_bottomtexturemid = self.rw_bottomtexturemid + sidedef.rowoffset;

            if sidedef.midtexture.is_some() {
                self.maskedtexture = true;
                let opening = rdata
                    .visplane_render
                    .reserve_opening(self.rw_stopx - self.rw_x);
                self.maskedtexturecol = opening - self.rw_x;
                ds_p.maskedtexturecol = Some(self.maskedtexturecol);
            }
        } else {
            // single sided line
            self.markfloor = true;
            self.markceiling = true;
            self.midtexture = sidedef.midtexture.is_some();

            if linedef.flags.contains(LineFlags::UNPEG_BOTTOM) {
                if let Some(mid_tex) = sidedef.midtexture {
                    let vtop =
                        frontsector.floorheight + Fixed::from_int(pic_data.wall_height(mid_tex));
                    self.rw_midtexturemid = vtop - viewz;
                } else {
                    self.rw_midtexturemid = self.worldtop;
                }
            } else {
                // top of texture at top
                self.rw_midtexturemid = self.worldtop;
            }
            self.rw_midtexturemid = self.rw_midtexturemid + sidedef.rowoffset;

            ds_p.silhouette = SIL_BOTH;
            ds_p.sprtopclip = Some(rdata.visplane_render.screenheight_start());
            ds_p.sprbottomclip = Some(rdata.visplane_render.negone_start());
            ds_p.bsilheight = Fixed::MAX;
            ds_p.tsilheight = Fixed::MIN;
        }

        // calculate rw_offset (only needed for textured lines)
        self.segtextured =
            self.midtexture || self.toptexture || self.bottomtexture || self.maskedtexture;

        if self.segtextured {
            let mut offsetangle = self.rw_normalangle - rdata.rw_angle1;
            if offsetangle.to_bits() > ANG180.to_bits() {
                offsetangle = -offsetangle;
            }
            if offsetangle.to_bits() > ANG90.to_bits() {
                offsetangle = ANG90;
            }
            self.rw_offset = hyp * offsetangle.sin();
            if (self.rw_normalangle - rdata.rw_angle1).to_bits() < ANG180.to_bits() {
                self.rw_offset = -self.rw_offset;
            }
            self.rw_offset = self.rw_offset + sidedef.textureoffset + seg.offset;
            self.rw_centerangle = ANG90 + view_angle - self.rw_normalangle;
            self.wall_lights = frontsector.lightlevel + (camera.extra_light << 4);
        }

        // a floor/ceiling plane on the wrong side of the view plane is
        // definitely invisible
        if frontsector.floorheight >= viewz {
            self.markfloor = false;
        }
        if frontsector.ceilingheight <= viewz && frontsector.ceilingpic != pic_data.sky_flat() {
            self.markceiling = false;
        }

        self.topstep = -(self.rw_scalestep * self.worldtop);
        self.topfrac = projection.centeryfrac - self.worldtop * self.rw_scale;

        self.bottomstep = -(self.rw_scalestep * self.worldbottom);
        self.bottomfrac = projection.centeryfrac - self.worldbottom * self.rw_scale;

        if backsector.is_some() {
            if self.worldhigh < self.worldtop {
                self.pixhigh = projection.centeryfrac - self.worldhigh * self.rw_scale;
                self.pixhighstep = -(self.rw_scalestep * self.worldhigh);
            }
            if self.worldlow > self.worldbottom {
                self.pixlow = projection.centeryfrac - self.worldlow * self.rw_scale;
                self.pixlowstep = -(self.rw_scalestep * self.worldlow);
            }
        }

        if self.markceiling {
            if let Some(p) = rdata.visplane_render.ceilingplane {
                let p = rdata
                    .visplane_render
                    .check_plane(self.rw_x, self.rw_stopx - 1, p);
                rdata.visplane_render.ceilingplane = Some(p);
            }
        }
        if self.markfloor {
            if let Some(p) = rdata.visplane_render.floorplane {
                let p = rdata
                    .visplane_render
                    .check_plane(self.rw_x, self.rw_stopx - 1, p);
                rdata.visplane_render.floorplane = Some(p);
            }
        }

        self.render_seg_loop(seg, sidedef, projection, pic_data, rdata, pixels);

        // save sprite clipping info
        if (ds_p.silhouette & SIL_TOP != 0 || self.maskedtexture) && ds_p.sprtopclip.is_none() {
            let opening = rdata.visplane_render.reserve_opening(self.rw_stopx - start);
            for x in start..self.rw_stopx {
                let v = rdata.ceilingclip[x as usize];
                rdata.visplane_render.openings[(opening + x - start) as usize] = v;
            }
            ds_p.sprtopclip = Some(opening - start);
        }

        if (ds_p.silhouette & SIL_BOTTOM != 0 || self.maskedtexture)
            && ds_p.sprbottomclip.is_none()
        {
            let opening = rdata.visplane_render.reserve_opening(self.rw_stopx - start);
            for x in start..self.rw_stopx {
                let v = rdata.floorclip[x as usize];
                rdata.visplane_render.openings[(opening + x - start) as usize] = v;
            }
            ds_p.sprbottomclip = Some(opening - start);
        }

        if ds_p.silhouette & SIL_TOP == 0 && self.maskedtexture {
            ds_p.silhouette |= SIL_TOP;
            ds_p.tsilheight = Fixed::MIN;
        }
        if ds_p.silhouette & SIL_BOTTOM == 0 && self.maskedtexture {
            ds_p.silhouette |= SIL_BOTTOM;
            ds_p.bsilheight = Fixed::MAX;
        }
        rdata.drawsegs.push(ds_p);
    }

    /// Per-column loop: draws wall textures, narrows the portal clips and
    /// records visplane bounds.
    #[allow(clippy::too_many_arguments)]
    fn render_seg_loop(
        &mut self,
        seg: &Segment,
        sidedef: &SideDef,
        projection: &Projection,
        pic_data: &PicData,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        let view_height = projection.screen_height;
        let round_up = Fixed::from_bits(FRACUNIT - 1);

        while self.rw_x < self.rw_stopx {
            let clip_index = self.rw_x as usize;

            // mark ceiling areas
            let mut yl = (self.topfrac + round_up).to_int();
            if yl < rdata.ceilingclip[clip_index] + 1 {
                yl = rdata.ceilingclip[clip_index] + 1;
            }

            if self.markceiling {
                let top = rdata.ceilingclip[clip_index] + 1;
                let mut bottom = yl - 1;
                if bottom >= rdata.floorclip[clip_index] {
                    bottom = rdata.floorclip[clip_index] - 1;
                }
                if top <= bottom {
                    if let Some(ceil) = rdata.visplane_render.ceilingplane {
                        let plane = &mut rdata.visplane_render.visplanes[ceil];
                        plane.top[clip_index] = top;
                        plane.bottom[clip_index] = bottom;
                    }
                }
            }

            // mark floor areas
            let mut yh = self.bottomfrac.to_int();
            if yh >= rdata.floorclip[clip_index] {
                yh = rdata.floorclip[clip_index] - 1;
            }

            if self.markfloor {
                let mut top = yh + 1;
                let bottom = rdata.floorclip[clip_index] - 1;
                if top <= rdata.ceilingclip[clip_index] {
                    top = rdata.ceilingclip[clip_index] + 1;
                }
                if top <= bottom {
                    if let Some(floor) = rdata.visplane_render.floorplane {
                        let plane = &mut rdata.visplane_render.visplanes[floor];
                        plane.top[clip_index] = top;
                        plane.bottom[clip_index] = bottom;
                    }
                }
            }

            // texture coordinates for this column
            let mut texture_column = 0i32;
            let mut dc_iscale = Fixed::ZERO;
            if self.segtextured {
                let angle =
                    self.rw_centerangle + projection.xtoviewangle[clip_index];
                texture_column = (self.rw_offset - finetangent(angle.to_fine()) * self.rw_distance)
                    .to_bits()
                    >> FRACBITS;
                dc_iscale =
                    Fixed::from_bits((u32::MAX / self.rw_scale.to_bits() as u32) as i32);
            }

            if self.midtexture {
                if yl <= yh {
                    if let Some(mid_tex) = sidedef.midtexture {
                        let colourmap = pic_data.wall_light_colormap(
                            seg.v1,
                            seg.v2,
                            self.wall_lights,
                            self.rw_scale,
                        );
                        DrawColumn::new(
                            wall_column(pic_data, mid_tex, texture_column),
                            colourmap,
                            dc_iscale,
                            self.rw_x,
                            self.rw_midtexturemid,
                            yl,
                            yh,
                        )
                        .draw(projection.centery, pixels);
                    }
                }
                rdata.ceilingclip[clip_index] = view_height;
                rdata.floorclip[clip_index] = -1;
            } else {
                if self.toptexture {
                    let mut mid = self.pixhigh.to_int();
                    self.pixhigh = self.pixhigh + self.pixhighstep;

                    if mid >= rdata.floorclip[clip_index] {
                        mid = rdata.floorclip[clip_index] - 1;
                    }

                    if mid >= yl {
                        if let Some(top_tex) = sidedef.toptexture {
                            let colourmap = pic_data.wall_light_colormap(
                                seg.v1,
                                seg.v2,
                                self.wall_lights,
                                self.rw_scale,
                            );
                            DrawColumn::new(
                                wall_column(pic_data, top_tex, texture_column),
                                colourmap,
                                dc_iscale,
                                self.rw_x,
                                self.rw_toptexturemid,
                                yl,
                                mid,
                            )
                            .draw(projection.centery, pixels);
                        }
                        rdata.ceilingclip[clip_index] = mid;
                    } else {
                        rdata.ceilingclip[clip_index] = yl - 1;
                    }
                } else if self.markceiling {
                    rdata.ceilingclip[clip_index] = yl - 1;
                }

                if self.bottomtexture {
                    let mut mid = (self.pixlow + round_up).to_int();
                    self.pixlow = self.pixlow + self.pixlowstep;

                    if mid <= rdata.ceilingclip[clip_index] {
                        mid = rdata.ceilingclip[clip_index] + 1;
                    }

                    if mid <= yh {
                        if let Some(bot_tex) = sidedef.bottomtexture {
                            let colourmap = pic_data.wall_light_colormap(
                                seg.v1,
                                seg.v2,
                                self.wall_lights,
                                self.rw_scale,
                            );
                            DrawColumn::new(
                                wall_column(pic_data, bot_tex, texture_column),
                                colourmap,
                                dc_iscale,
                                self.rw_x,
                                self.rw_bottomtexturemid,
                                mid,
                                yh,
                            )
                            .draw(projection.centery, pixels);
                        }
                        rdata.floorclip[clip_index] = mid;
                    } else {
                        rdata.floorclip[clip_index] = yh + 1;
                    }
                } else if self.markfloor {
                    rdata.floorclip[clip_index] = yh + 1;
                }

                if self.maskedtexture {
                    rdata.visplane_render.openings
                        [(self.maskedtexturecol + self.rw_x) as usize] = texture_column;
                }
            }

            self.rw_x += 1;
            self.rw_scale = self.rw_scale + self.rw_scalestep;
            self.topfrac = self.topfrac + self.topstep;
            self.bottomfrac = self.bottomfrac + self.bottomstep;
        }
    }
}

/// Fetch a wall texture column, tiling horizontally.
pub(crate) fn wall_column(pic_data: &PicData, texture: usize, column: i32) -> &[u16] {
    let pic = pic_data.wall_pic(texture);
    let w = pic.data.len() as i32;
    &pic.data[column.rem_euclid(w) as usize]
}

/// Draws a single vertical texture slice between `yl` and `yh` inclusive.
/// Transparent texels are skipped so masked and solid columns share one
/// path.
pub(crate) struct DrawColumn<'a> {
    texture_column: &'a [u16],
    colourmap: &'a [u8; 256],
    fracstep: Fixed,
    dc_x: i32,
    dc_texturemid: Fixed,
    yl: i32,
    yh: i32,
}

impl<'a> DrawColumn<'a> {
    pub(crate) fn new(
        texture_column: &'a [u16],
        colourmap: &'a [u8; 256],
        fracstep: Fixed,
        dc_x: i32,
        dc_texturemid: Fixed,
        yl: i32,
        yh: i32,
    ) -> Self {
        Self {
            texture_column,
            colourmap,
            fracstep,
            dc_x,
            dc_texturemid,
            yl,
            yh,
        }
    }

    /// A column is a vertical slice of a wall texture that, given the
    /// restrictions on the view orientation, always has constant depth.
    pub(crate) fn draw(&self, centery: i32, pixels: &mut impl PixelBuffer) {
        if self.yh < self.yl || self.texture_column.is_empty() {
            return;
        }
        let height = self.texture_column.len() as i32;
        let mut frac = self.dc_texturemid + self.fracstep * (self.yl - centery);

        for y in self.yl..=self.yh {
            let select = frac.to_int().rem_euclid(height) as usize;
            let texel = self.texture_column[select];
            if texel != TRANSPARENT {
                pixels.set_pixel(self.dc_x, y, self.colourmap[texel as usize]);
            }
            frac = frac + self.fracstep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_trait::BufferSize;

    struct TestBuf {
        size: BufferSize,
        buf: Vec<u8>,
    }

    impl TestBuf {
        fn new(w: usize, h: usize) -> Self {
            Self {
                size: BufferSize::new(w, h),
                buf: vec![0; w * h],
            }
        }
    }

    impl PixelBuffer for TestBuf {
        fn size(&self) -> &BufferSize {
            &self.size
        }
        fn clear_with(&mut self, colour: u8) {
            self.buf.fill(colour);
        }
        fn set_pixel(&mut self, x: i32, y: i32, colour: u8) {
            if x >= 0 && y >= 0 && x < self.size.width() && y < self.size.height() {
                self.buf[y as usize * self.size.width_usize() + x as usize] = colour;
            }
        }
        fn read_pixel(&self, x: i32, y: i32) -> u8 {
            self.buf[y as usize * self.size.width_usize() + x as usize]
        }
        fn buf(&self) -> &[u8] {
            &self.buf
        }
        fn buf_mut(&mut self) -> &mut [u8] {
            &mut self.buf
        }
    }

    fn identity_map() -> [u8; 256] {
        let mut m = [0u8; 256];
        for (i, v) in m.iter_mut().enumerate() {
            *v = i as u8;
        }
        m
    }

    #[test]
    fn column_unit_step_copies_texels() {
        let column: Vec<u16> = (1..=8u16).collect();
        let cm = identity_map();
        let mut buf = TestBuf::new(4, 8);
        // texturemid chosen so row 0 samples texel 0
        let mid = Fixed::from_int(4);
        DrawColumn::new(&column, &cm, Fixed::UNIT, 2, mid, 0, 7).draw(4, &mut buf);
        for y in 0..8 {
            assert_eq!(buf.read_pixel(2, y), (y + 1) as u8, "row {y}");
        }
    }

    #[test]
    fn column_skips_transparent() {
        let column = vec![5u16, TRANSPARENT, 5];
        let cm = identity_map();
        let mut buf = TestBuf::new(1, 3);
        buf.clear_with(9);
        DrawColumn::new(&column, &cm, Fixed::UNIT, 0, Fixed::from_int(1), 0, 2).draw(1, &mut buf);
        assert_eq!(buf.read_pixel(0, 0), 5);
        assert_eq!(buf.read_pixel(0, 1), 9);
        assert_eq!(buf.read_pixel(0, 2), 5);
    }

    #[test]
    fn column_empty_range_no_write() {
        let column = vec![5u16];
        let cm = identity_map();
        let mut buf = TestBuf::new(1, 1);
        DrawColumn::new(&column, &cm, Fixed::UNIT, 0, Fixed::ZERO, 1, 0).draw(0, &mut buf);
        assert_eq!(buf.read_pixel(0, 0), 0);
    }
}

//! Sprite projection and the masked draw pass: sorted vissprites clipped
//! against the drawseg silhouettes, then two-sided mid textures drawn back
//! to front.

use glam::IVec2;
use log::warn;
use math::{Angle, Fixed, FRACBITS, FRACUNIT};
use render_trait::PixelBuffer;
use world::pic::SHADOW_COLORMAP;
use world::{Camera, LineFlags, MapData, PicData, ThingFlags};

use crate::defs::{DrawSeg, SIL_BOTTOM, SIL_TOP};
use crate::projection::Projection;
use crate::segs::{wall_column, DrawColumn};
use crate::RenderData;

/// Hard cap on sprites projected per frame; the rest are dropped farthest
/// last.
const MAXVISSPRITES: usize = 160;
/// Sprites closer than this to the view plane are not drawn.
const MINZ: Fixed = Fixed::from_bits(4 * FRACUNIT);

#[derive(Debug, Clone, Copy)]
pub(crate) struct VisSprite {
    pub x1: i32,
    pub x2: i32,
    /// Map position, for depth tests against drawsegs.
    pub pos: IVec2,
    /// Bottom of the sprite in world space.
    pub gz: Fixed,
    /// Top of the sprite in world space.
    pub gzt: Fixed,
    pub start_frac: Fixed,
    pub scale: Fixed,
    pub x_iscale: Fixed,
    pub texturemid: Fixed,
    pub sprite: usize,
    pub frame: usize,
    pub light_level: usize,
    pub flags: ThingFlags,
}

pub(crate) struct ThingRender {
    vissprites: Vec<VisSprite>,
    /// Sectors already visited this frame; a sector spanning several
    /// subsectors must only queue its things once.
    checked_sectors: Vec<u32>,
    screen_width: usize,
    screen_height: i32,
}

impl ThingRender {
    pub(crate) fn new(screen_width: usize, screen_height: usize) -> Self {
        Self {
            vissprites: Vec::with_capacity(MAXVISSPRITES),
            checked_sectors: Vec::with_capacity(32),
            screen_width,
            screen_height: screen_height as i32,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.vissprites.clear();
        self.checked_sectors.clear();
    }

    /// Project every thing in `sector` unless the sector was already seen
    /// from another subsector this frame.
    pub(crate) fn add_sprites(
        &mut self,
        camera: &Camera,
        map: &MapData,
        sector_id: u32,
        projection: &Projection,
        pic_data: &PicData,
    ) {
        if self.checked_sectors.contains(&sector_id) {
            return;
        }
        self.checked_sectors.push(sector_id);

        let Some(sector) = map.sectors.get(sector_id as usize) else {
            warn!("subsector references missing sector {sector_id}, sprites skipped");
            return;
        };
        for &thing_id in &sector.things {
            let Some(thing) = map.things.get(thing_id as usize) else {
                warn!("sector {sector_id} references missing thing {thing_id}, skipped");
                continue;
            };
            self.project_sprite(thing, sector.lightlevel, camera, projection, pic_data);
        }
    }

    fn project_sprite(
        &mut self,
        thing: &world::Thing,
        light_level: usize,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
    ) {
        if thing.sprite >= pic_data.num_sprites() {
            warn!("thing references missing sprite {}", thing.sprite);
            return;
        }
        let set = pic_data.sprite_set(thing.sprite);
        let Some(pic) = set.frames.get(thing.frame) else {
            warn!(
                "sprite {} has no frame {}, thing skipped",
                thing.sprite, thing.frame
            );
            return;
        };
        if pic.data.is_empty() {
            return;
        }

        let trx = Fixed::from_bits(thing.pos.x) - Fixed::from_bits(camera.pos.x);
        let try_ = Fixed::from_bits(thing.pos.y) - Fixed::from_bits(camera.pos.y);
        let viewcos = camera.angle.cos();
        let viewsin = camera.angle.sin();

        let tz = trx * viewcos + try_ * viewsin;
        if tz < MINZ {
            return;
        }
        let xscale = projection.projection / tz;

        let mut tx = trx * viewsin - try_ * viewcos;
        // off to a side beyond 45 degrees of the depth axis
        if tx.abs() > (tz << 2) {
            return;
        }

        let sprite_width = Fixed::from_int(pic.data.len() as i32);
        tx = tx - Fixed::from_int(pic.left_offset);
        let x1 = (projection.centerxfrac + tx * xscale).to_bits() >> FRACBITS;
        if x1 > projection.screen_width {
            return;
        }
        tx = tx + sprite_width;
        let x2 = ((projection.centerxfrac + tx * xscale).to_bits() >> FRACBITS) - 1;
        if x2 < 0 {
            return;
        }

        if self.vissprites.len() >= MAXVISSPRITES {
            warn!("vissprite overflow, dropping sprite");
            return;
        }

        let gzt = thing.z + Fixed::from_int(pic.top_offset);
        let mut vis = VisSprite {
            x1: x1.max(0),
            x2: x2.min(projection.screen_width - 1),
            pos: thing.pos,
            gz: thing.z,
            gzt,
            start_frac: Fixed::ZERO,
            scale: xscale,
            x_iscale: Fixed::UNIT / xscale,
            texturemid: gzt - camera.viewz,
            sprite: thing.sprite,
            frame: thing.frame,
            light_level,
            flags: thing.flags,
        };
        if vis.x1 > x1 {
            vis.start_frac = vis.start_frac + vis.x_iscale * (vis.x1 - x1);
        }
        self.vissprites.push(vis);
    }

    /// Draw all masked geometry back to front: sorted sprites first, then
    /// any drawseg with a masked mid texture that sprites did not force out
    /// earlier.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw_masked(
        &mut self,
        camera: &Camera,
        map: &MapData,
        projection: &Projection,
        pic_data: &PicData,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        // stable: sprites at equal depth keep registration order
        self.vissprites.sort_by_key(|v| v.scale);

        for i in 0..self.vissprites.len() {
            let vis = self.vissprites[i];
            self.draw_sprite(&vis, camera, map, projection, pic_data, rdata, pixels);
        }

        for i in (0..rdata.drawsegs.len()).rev() {
            let ds = rdata.drawsegs[i];
            if ds.maskedtexturecol.is_some() {
                render_masked_seg_range(
                    camera, &ds, ds.x1, ds.x2, map, projection, pic_data, rdata, pixels,
                );
            }
        }
    }

    /// Clip one sprite against every drawseg in front of it, then draw the
    /// visible columns.
    #[allow(clippy::too_many_arguments)]
    fn draw_sprite(
        &self,
        vis: &VisSprite,
        camera: &Camera,
        map: &MapData,
        projection: &Projection,
        pic_data: &PicData,
        rdata: &mut RenderData,
        pixels: &mut impl PixelBuffer,
    ) {
        let mut clipbot = vec![-2i32; self.screen_width];
        let mut cliptop = vec![-2i32; self.screen_width];

        for i in (0..rdata.drawsegs.len()).rev() {
            let ds: DrawSeg = rdata.drawsegs[i];
            if ds.x1 > vis.x2
                || ds.x2 < vis.x1
                || (ds.silhouette == 0 && ds.maskedtexturecol.is_none())
            {
                continue;
            }
            let r1 = ds.x1.max(vis.x1);
            let r2 = ds.x2.min(vis.x2);

            let (lowscale, scale) = if ds.scale1 > ds.scale2 {
                (ds.scale2, ds.scale1)
            } else {
                (ds.scale1, ds.scale2)
            };

            let Some(seg) = map.segments.get(ds.curline as usize) else {
                warn!("drawseg references missing seg {}, skipped", ds.curline);
                continue;
            };
            if scale < vis.scale || (lowscale < vis.scale && seg.point_on_side(vis.pos) == 0) {
                // seg is behind the sprite; draw its masked texture now so
                // the sprite lands on top
                if ds.maskedtexturecol.is_some() {
                    render_masked_seg_range(
                        camera, &ds, r1, r2, map, projection, pic_data, rdata, pixels,
                    );
                }
                continue;
            }

            // seg is in front: clip the sprite by its silhouette
            let mut silhouette = ds.silhouette;
            if vis.gz >= ds.bsilheight {
                silhouette &= !SIL_BOTTOM;
            }
            if vis.gzt <= ds.tsilheight {
                silhouette &= !SIL_TOP;
            }

            if silhouette & SIL_BOTTOM != 0 {
                if let Some(off) = ds.sprbottomclip {
                    for x in r1..=r2 {
                        if clipbot[x as usize] == -2 {
                            clipbot[x as usize] =
                                rdata.visplane_render.openings[(off + x) as usize];
                        }
                    }
                }
            }
            if silhouette & SIL_TOP != 0 {
                if let Some(off) = ds.sprtopclip {
                    for x in r1..=r2 {
                        if cliptop[x as usize] == -2 {
                            cliptop[x as usize] =
                                rdata.visplane_render.openings[(off + x) as usize];
                        }
                    }
                }
            }
        }

        // anything not clipped by a seg is bounded by the screen
        for x in vis.x1..=vis.x2 {
            if clipbot[x as usize] == -2 {
                clipbot[x as usize] = self.screen_height;
            }
            if cliptop[x as usize] == -2 {
                cliptop[x as usize] = -1;
            }
        }

        self.draw_vissprite(vis, &clipbot, &cliptop, camera, projection, pic_data, pixels);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_vissprite(
        &self,
        vis: &VisSprite,
        clipbot: &[i32],
        cliptop: &[i32],
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        let pic = &pic_data.sprite_set(vis.sprite).frames[vis.frame];

        let colourmap = if camera.fixed_colormap != 0 {
            pic_data.colormap(camera.fixed_colormap)
        } else if vis.flags.contains(ThingFlags::SHADOW) {
            pic_data.colormap(SHADOW_COLORMAP)
        } else if vis.flags.contains(ThingFlags::FULL_BRIGHT) {
            pic_data.colormap(0)
        } else {
            pic_data.sprite_light_colormap(vis.light_level + (camera.extra_light << 4), vis.scale)
        };

        let dc_iscale = vis.x_iscale.abs();
        let spryscale = vis.scale;
        let sprtopscreen = projection.centeryfrac - vis.texturemid * spryscale;

        let mut frac = vis.start_frac;
        for x in vis.x1..=vis.x2 {
            let texcol = frac.to_int();
            if texcol >= 0 && (texcol as usize) < pic.data.len() {
                draw_masked_column(
                    &pic.data[texcol as usize],
                    colourmap,
                    dc_iscale,
                    x,
                    vis.texturemid,
                    sprtopscreen,
                    spryscale,
                    clipbot[x as usize],
                    cliptop[x as usize],
                    projection.centery,
                    pixels,
                );
            }
            frac = frac + vis.x_iscale;
        }
    }
}

/// Draw one vertical slice of masked texture, clipped by the floor and
/// ceiling clip values for its column.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_masked_column(
    texture_column: &[u16],
    colourmap: &[u8; 256],
    iscale: Fixed,
    x: i32,
    texturemid: Fixed,
    sprtopscreen: Fixed,
    spryscale: Fixed,
    floor_clip: i32,
    ceil_clip: i32,
    centery: i32,
    pixels: &mut impl PixelBuffer,
) {
    let bottomscreen = sprtopscreen + spryscale * (texture_column.len() as i32);
    let mut yl = (sprtopscreen + Fixed::from_bits(FRACUNIT - 1)).to_int();
    let mut yh = (bottomscreen - Fixed::from_bits(1)).to_int();

    if yh >= floor_clip {
        yh = floor_clip - 1;
    }
    if yl <= ceil_clip {
        yl = ceil_clip + 1;
    }

    if yl <= yh {
        DrawColumn::new(texture_column, colourmap, iscale, x, texturemid, yl, yh)
            .draw(centery, pixels);
    }
}

/// Masked mid texture of a two-sided line, drawn column by column through
/// the clip arrays its drawseg recorded.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_masked_seg_range(
    camera: &Camera,
    ds: &DrawSeg,
    x1: i32,
    x2: i32,
    map: &MapData,
    projection: &Projection,
    pic_data: &PicData,
    rdata: &mut RenderData,
    pixels: &mut impl PixelBuffer,
) {
    let Some(seg) = map.segments.get(ds.curline as usize) else {
        warn!("masked range references missing seg {}, skipped", ds.curline);
        return;
    };
    let (Some(sidedef), Some(linedef), Some(frontsector)) = (
        map.sidedefs.get(seg.sidedef as usize),
        map.linedefs.get(seg.linedef as usize),
        map.sectors.get(seg.frontsector as usize),
    ) else {
        warn!("seg {} references missing map data, skipped", ds.curline);
        return;
    };
    let Some(back) = seg.backsector else {
        return;
    };
    let Some(backsector) = map.sectors.get(back as usize) else {
        warn!("seg {} references missing backsector {back}, skipped", ds.curline);
        return;
    };

    let Some(texnum) = sidedef.midtexture else {
        return;
    };
    let (Some(maskedcol), Some(topoff), Some(botoff)) =
        (ds.maskedtexturecol, ds.sprtopclip, ds.sprbottomclip)
    else {
        return;
    };

    let lights = frontsector.lightlevel + (camera.extra_light << 4);

    let mut texturemid = if linedef.flags.contains(LineFlags::UNPEG_BOTTOM) {
        let base = frontsector.floorheight.max(backsector.floorheight);
        base + Fixed::from_int(pic_data.wall_height(texnum)) - camera.viewz
    } else {
        frontsector.ceilingheight.min(backsector.ceilingheight) - camera.viewz
    };
    texturemid = texturemid + sidedef.rowoffset;

    let mut spryscale = ds.scale1 + ds.scalestep * (x1 - ds.x1);

    for x in x1..=x2 {
        let col_index = (maskedcol + x) as usize;
        let texcol = rdata.visplane_render.openings[col_index];
        if texcol != i32::MAX && spryscale.to_bits() > 0 {
            let sprtopscreen = projection.centeryfrac - texturemid * spryscale;
            let iscale = Fixed::from_bits((u32::MAX / spryscale.to_bits() as u32) as i32);
            let colourmap = pic_data.wall_light_colormap(seg.v1, seg.v2, lights, spryscale);
            let floor_clip = rdata.visplane_render.openings[(botoff + x) as usize];
            let ceil_clip = rdata.visplane_render.openings[(topoff + x) as usize];
            draw_masked_column(
                wall_column(pic_data, texnum, texcol),
                colourmap,
                iscale,
                x,
                texturemid,
                sprtopscreen,
                spryscale,
                floor_clip,
                ceil_clip,
                projection.centery,
                pixels,
            );
            // never draw the same column twice
            rdata.visplane_render.openings[col_index] = i32::MAX;
        }
        spryscale = spryscale + ds.scalestep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vis() -> VisSprite {
        VisSprite {
            x1: 0,
            x2: 0,
            pos: IVec2::ZERO,
            gz: Fixed::ZERO,
            gzt: Fixed::ZERO,
            start_frac: Fixed::ZERO,
            scale: Fixed::UNIT,
            x_iscale: Fixed::UNIT,
            texturemid: Fixed::ZERO,
            sprite: 0,
            frame: 0,
            light_level: 255,
            flags: ThingFlags::empty(),
        }
    }

    #[test]
    fn sprites_sort_far_to_near() {
        let mut t = ThingRender::new(320, 200);
        let mut near = base_vis();
        near.scale = Fixed::from_int(4);
        let mut far = base_vis();
        far.scale = Fixed::from_bits(FRACUNIT / 2);
        t.vissprites.push(near);
        t.vissprites.push(far);
        t.vissprites.sort_by_key(|v| v.scale);
        assert_eq!(t.vissprites[0].scale, Fixed::from_bits(FRACUNIT / 2));
    }

    #[test]
    fn project_rejects_behind_view() {
        use math::map_point;
        let mut t = ThingRender::new(320, 200);
        let camera = Camera::new(map_point(0, 0), Fixed::from_int(41), Angle::from_bits(0));
        let pics = world::demo::demo_pic_data();
        let proj = Projection::new(320, 200).unwrap();
        let thing = world::Thing {
            pos: map_point(-100, 0),
            z: Fixed::ZERO,
            angle: Angle::default(),
            sprite: 0,
            frame: 0,
            flags: ThingFlags::empty(),
        };
        t.project_sprite(&thing, 255, &camera, &proj, &pics);
        assert!(t.vissprites.is_empty());
    }

    #[test]
    fn project_accepts_in_front() {
        use math::map_point;
        let mut t = ThingRender::new(320, 200);
        let camera = Camera::new(map_point(0, 0), Fixed::from_int(41), Angle::from_bits(0));
        let pics = world::demo::demo_pic_data();
        let proj = Projection::new(320, 200).unwrap();
        let thing = world::Thing {
            pos: map_point(128, 0),
            z: Fixed::ZERO,
            angle: Angle::default(),
            sprite: 0,
            frame: 0,
            flags: ThingFlags::empty(),
        };
        t.project_sprite(&thing, 255, &camera, &proj, &pics);
        assert_eq!(t.vissprites.len(), 1);
        let vis = &t.vissprites[0];
        assert!(vis.x1 <= vis.x2);
        // roughly centred for a dead-ahead thing
        assert!((vis.x1..=vis.x2).contains(&160) || (vis.x2 - 160).abs() < 40);
    }

    #[test]
    fn missing_frame_skipped() {
        use math::map_point;
        let mut t = ThingRender::new(320, 200);
        let camera = Camera::new(map_point(0, 0), Fixed::from_int(41), Angle::from_bits(0));
        let pics = world::demo::demo_pic_data();
        let proj = Projection::new(320, 200).unwrap();
        let thing = world::Thing {
            pos: map_point(128, 0),
            z: Fixed::ZERO,
            angle: Angle::default(),
            sprite: 0,
            frame: 99,
            flags: ThingFlags::empty(),
        };
        t.project_sprite(&thing, 255, &camera, &proj, &pics);
        assert!(t.vissprites.is_empty());
    }
}

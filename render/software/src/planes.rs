//! Floor and ceiling rendering. Wall drawing leaves per-column top/bottom
//! bounds in visplanes; this turns them into horizontal spans with constant
//! depth and maps flats on to them.

use math::{finecosine, finesine, Angle, Fixed, ANG90, FRACBITS};
use render_trait::PixelBuffer;
use world::{Camera, PicData};

use crate::defs::Visplane;
use crate::projection::Projection;
use crate::segs::{wall_column, DrawColumn};

/// Shift of a view angle down to a sky texture column.
const ANGLETOSKYSHIFT: u32 = 22;
/// Vertical anchor for sky columns.
const SKYTEXTUREMID: Fixed = Fixed::from_bits(100 << FRACBITS);

const BASE_VISPLANES: usize = 128;

pub struct VisPlaneRender {
    pub visplanes: Vec<Visplane>,
    /// Number of visplanes in use this frame.
    pub lastvisplane: usize,
    /// Plane currently collecting floor bounds, if the floor is visible.
    pub floorplane: Option<usize>,
    /// Plane currently collecting ceiling bounds, if the ceiling is visible.
    pub ceilingplane: Option<usize>,

    /// Shared clip-array arena. The first `width` entries hold the constant
    /// screen-height array, the next `width` the constant minus-one array;
    /// everything after is handed out per frame.
    pub openings: Vec<i32>,
    pub lastopening: i32,

    /// Column where each span currently under construction started.
    spanstart: Vec<i32>,

    pub basexscale: Fixed,
    pub baseyscale: Fixed,

    screen_width: usize,
    screen_height: i32,
}

impl VisPlaneRender {
    pub fn new(screen_width: usize, screen_height: usize) -> Self {
        let mut openings = vec![0i32; screen_width * 2];
        for v in openings.iter_mut().take(screen_width) {
            *v = screen_height as i32;
        }
        for v in openings.iter_mut().skip(screen_width) {
            *v = -1;
        }
        VisPlaneRender {
            visplanes: (0..BASE_VISPLANES).map(|_| Visplane::new(screen_width)).collect(),
            lastvisplane: 0,
            floorplane: None,
            ceilingplane: None,
            openings,
            lastopening: (screen_width * 2) as i32,
            spanstart: vec![0; screen_height],
            basexscale: Fixed::ZERO,
            baseyscale: Fixed::ZERO,
            screen_width,
            screen_height: screen_height as i32,
        }
    }

    /// Offset of the constant screen-height clip array.
    pub fn screenheight_start(&self) -> i32 {
        0
    }

    /// Offset of the constant minus-one clip array.
    pub fn negone_start(&self) -> i32 {
        self.screen_width as i32
    }

    /// Hand out `count` entries of the openings arena, growing it if a busy
    /// scene runs past the preallocation.
    pub fn reserve_opening(&mut self, count: i32) -> i32 {
        let start = self.lastopening;
        let need = (start + count) as usize;
        if need > self.openings.len() {
            self.openings.resize(need.next_power_of_two(), 0);
        }
        self.lastopening += count;
        start
    }

    /// Reset for a new frame and derive the span stepping basis from the
    /// view angle.
    pub fn clear_planes(&mut self, view_angle: Angle, projection: &Projection) {
        for plane in self.visplanes.iter_mut().take(self.lastvisplane) {
            plane.clear();
        }
        self.lastvisplane = 0;
        self.floorplane = None;
        self.ceilingplane = None;
        self.lastopening = (self.screen_width * 2) as i32;
        self.spanstart.fill(0);

        let fine = (view_angle - ANG90).to_fine();
        self.basexscale = finecosine(fine) / projection.centerxfrac;
        self.baseyscale = -(finesine(fine) / projection.centerxfrac);
    }

    /// Find an existing open plane matching height, picture and light, or
    /// start a new one. Sky planes all merge regardless of height or light.
    pub fn find_plane(
        &mut self,
        mut height: Fixed,
        picnum: usize,
        mut lightlevel: usize,
        sky_flat: usize,
    ) -> usize {
        if picnum == sky_flat {
            height = Fixed::ZERO;
            lightlevel = 0;
        }

        for i in 0..self.lastvisplane {
            let p = &self.visplanes[i];
            if height == p.height && picnum == p.picnum && lightlevel == p.lightlevel {
                return i;
            }
        }

        if self.lastvisplane == self.visplanes.len() {
            self.visplanes.push(Visplane::new(self.screen_width));
        }
        let i = self.lastvisplane;
        self.lastvisplane += 1;
        let p = &mut self.visplanes[i];
        p.height = height;
        p.picnum = picnum;
        p.lightlevel = lightlevel;
        p.minx = self.screen_width as i32;
        p.maxx = -1;
        i
    }

    /// Widen `plane` to cover `start..=stop`, or split off a copy when the
    /// columns are already taken.
    pub fn check_plane(&mut self, start: i32, stop: i32, plane: usize) -> usize {
        let (intrl, unionl) = if start < self.visplanes[plane].minx {
            (self.visplanes[plane].minx, start)
        } else {
            (start, self.visplanes[plane].minx)
        };
        let (intrh, unionh) = if stop > self.visplanes[plane].maxx {
            (self.visplanes[plane].maxx, stop)
        } else {
            (stop, self.visplanes[plane].maxx)
        };

        let mut x = intrl;
        while x <= intrh {
            if self.visplanes[plane].top[x as usize] != i32::MAX {
                break;
            }
            x += 1;
        }
        if x > intrh {
            self.visplanes[plane].minx = unionl;
            self.visplanes[plane].maxx = unionh;
            return plane;
        }

        let (height, picnum, lightlevel) = {
            let p = &self.visplanes[plane];
            (p.height, p.picnum, p.lightlevel)
        };
        if self.lastvisplane == self.visplanes.len() {
            self.visplanes.push(Visplane::new(self.screen_width));
        }
        let new = self.lastvisplane;
        self.lastvisplane += 1;
        let p = &mut self.visplanes[new];
        p.height = height;
        p.picnum = picnum;
        p.lightlevel = lightlevel;
        p.minx = start;
        p.maxx = stop;
        new
    }

    /// Draw every collected visplane: sky planes as unscaled texture
    /// columns, everything else as distance-stepped flat spans.
    pub fn draw_planes(
        &mut self,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        for pi in 0..self.lastvisplane {
            let plane = self.visplanes[pi].clone();
            if plane.minx > plane.maxx {
                continue;
            }

            if plane.picnum == pic_data.sky_flat() {
                self.draw_sky_plane(&plane, camera, projection, pic_data, pixels);
                continue;
            }

            let planeheight = (plane.height - camera.viewz).abs();

            let mut t1 = i32::MAX;
            let mut b1 = i32::MIN;
            for x in plane.minx..=plane.maxx + 1 {
                let (t2, b2) = if x <= plane.maxx {
                    (plane.top[x as usize], plane.bottom[x as usize])
                } else {
                    (i32::MAX, i32::MIN)
                };
                self.make_spans(
                    x,
                    t1,
                    b1,
                    t2,
                    b2,
                    planeheight,
                    &plane,
                    camera,
                    projection,
                    pic_data,
                    pixels,
                );
                t1 = t2;
                b1 = b2;
            }
        }
    }

    fn draw_sky_plane(
        &self,
        plane: &Visplane,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        // the sky is always full bright and never scales with distance
        let colourmap = pic_data.colormap(0);
        let sky_tex = pic_data.sky_texture();
        let sky_width = pic_data.wall_width(sky_tex);

        for x in plane.minx..=plane.maxx {
            let yl = plane.top[x as usize];
            let yh = plane.bottom[x as usize];
            if yl > yh || yl == i32::MAX {
                continue;
            }
            let angle = camera.angle + projection.xtoviewangle[x as usize];
            let column = (angle.to_bits() >> ANGLETOSKYSHIFT) as i32 % sky_width;
            DrawColumn::new(
                wall_column(pic_data, sky_tex, column),
                colourmap,
                Fixed::UNIT,
                x,
                SKYTEXTUREMID,
                yl,
                yh,
            )
            .draw(projection.centery, pixels);
        }
    }

    /// The classic four-loop span builder: close spans that ended at this
    /// column, open spans that begin here.
    #[allow(clippy::too_many_arguments)]
    fn make_spans(
        &mut self,
        x: i32,
        mut t1: i32,
        mut b1: i32,
        mut t2: i32,
        mut b2: i32,
        planeheight: Fixed,
        plane: &Visplane,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        while t1 < t2 && t1 <= b1 {
            self.map_plane(
                t1,
                self.spanstart[t1 as usize],
                x - 1,
                planeheight,
                plane,
                camera,
                projection,
                pic_data,
                pixels,
            );
            t1 += 1;
        }
        while b1 > b2 && b1 >= t1 {
            self.map_plane(
                b1,
                self.spanstart[b1 as usize],
                x - 1,
                planeheight,
                plane,
                camera,
                projection,
                pic_data,
                pixels,
            );
            b1 -= 1;
        }
        while t2 < t1 && t2 <= b2 {
            self.spanstart[t2 as usize] = x;
            t2 += 1;
        }
        while b2 > b1 && b2 >= t2 {
            self.spanstart[b2 as usize] = x;
            b2 -= 1;
        }
    }

    /// Map one horizontal span of a flat at screen row `y`.
    #[allow(clippy::too_many_arguments)]
    fn map_plane(
        &self,
        y: i32,
        x1: i32,
        x2: i32,
        planeheight: Fixed,
        plane: &Visplane,
        camera: &Camera,
        projection: &Projection,
        pic_data: &PicData,
        pixels: &mut impl PixelBuffer,
    ) {
        if x2 < x1 || y < 0 || y >= self.screen_height {
            return;
        }

        let distance = planeheight * projection.yslope[y as usize];
        let ds_xstep = distance * self.basexscale;
        let ds_ystep = distance * self.baseyscale;

        let length = distance * projection.distscale[x1 as usize];
        let angle = (camera.angle + projection.xtoviewangle[x1 as usize]).to_fine();
        let mut xfrac = Fixed::from_bits(camera.pos.x) + finecosine(angle) * length;
        let mut yfrac = -Fixed::from_bits(camera.pos.y) - finesine(angle) * length;

        let colourmap = if camera.fixed_colormap != 0 {
            pic_data.colormap(camera.fixed_colormap)
        } else {
            let light = plane.lightlevel + (camera.extra_light << 4);
            pic_data.flat_light_colormap(light, distance)
        };

        let flat = pic_data.flat_pic(plane.picnum);
        for x in x1..=x2 {
            let texel = pic_data.flat_texel(flat, xfrac, yfrac);
            pixels.set_pixel(x, y, colourmap[texel as usize]);
            xfrac = xfrac + ds_xstep;
            yfrac = yfrac + ds_ystep;
        }
    }
}

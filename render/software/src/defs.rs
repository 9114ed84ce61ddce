use std::fmt::Debug;

use math::Fixed;

pub const SIL_NONE: i32 = 0;
pub const SIL_BOTTOM: i32 = 1;
pub const SIL_TOP: i32 = 2;
pub const SIL_BOTH: i32 = 3;

pub const MAXDRAWSEGS: usize = 1024 * 2;

/// Record of one drawn wall range, kept for clipping sprites and drawing
/// masked mid textures after the solid passes.
#[derive(Debug, Clone, Copy)]
pub struct DrawSeg {
    /// Index into the map's segment array.
    pub curline: u32,
    pub x1: i32,
    pub x2: i32,

    pub scale1: Fixed,
    pub scale2: Fixed,
    pub scalestep: Fixed,

    /// 0=none, 1=bottom, 2=top, 3=both
    pub silhouette: i32,

    /// do not clip sprites above this
    pub bsilheight: Fixed,

    /// do not clip sprites below this
    pub tsilheight: Fixed,

    /// Index into `openings`, adjusted so `[x1]` is the first value.
    pub sprtopclip: Option<i32>,
    /// Index into `openings`, adjusted so `[x1]` is the first value.
    pub sprbottomclip: Option<i32>,

    /// Index into `openings`, adjusted so `[x1]` is the first value.
    pub maskedtexturecol: Option<i32>,
}

impl DrawSeg {
    pub fn new(seg: u32) -> Self {
        DrawSeg {
            curline: seg,
            x1: 0,
            x2: 0,
            scale1: Fixed::ZERO,
            scale2: Fixed::ZERO,
            scalestep: Fixed::ZERO,
            silhouette: 0,
            bsilheight: Fixed::ZERO,
            tsilheight: Fixed::ZERO,
            sprtopclip: None,
            sprbottomclip: None,
            maskedtexturecol: None,
        }
    }
}

/// A fully occluded range of screen columns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClipRange {
    /// Leftmost starting pixel/column
    pub first: i32,
    /// Rightmost ending pixel/column
    pub last: i32,
}

/// A run of screen columns sharing one flat, height and light level. The
/// column bounds are built while walls are drawn and filled as horizontal
/// spans afterwards.
#[derive(Clone)]
pub struct Visplane {
    pub height: Fixed,
    pub picnum: usize,
    pub lightlevel: usize,
    pub minx: i32,
    pub maxx: i32,
    /// Top bound per screen column, `i32::MAX` meaning untouched.
    pub top: Vec<i32>,
    /// Bottom bound per screen column, `i32::MIN` meaning untouched.
    pub bottom: Vec<i32>,
}

impl Debug for Visplane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visplane")
            .field("height", &self.height)
            .field("picnum", &self.picnum)
            .field("lightlevel", &self.lightlevel)
            .field("minx", &self.minx)
            .field("maxx", &self.maxx)
            .finish_non_exhaustive()
    }
}

impl Visplane {
    pub fn new(screen_width: usize) -> Self {
        Visplane {
            height: Fixed::ZERO,
            picnum: 0,
            lightlevel: 0,
            minx: 0,
            maxx: -1,
            top: vec![i32::MAX; screen_width + 1],
            bottom: vec![i32::MIN; screen_width + 1],
        }
    }

    pub fn clear(&mut self) {
        self.height = Fixed::ZERO;
        self.picnum = 0;
        self.lightlevel = 0;
        self.minx = 0;
        self.maxx = -1;
        self.top.fill(i32::MAX);
        self.bottom.fill(i32::MIN);
    }
}

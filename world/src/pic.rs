use std::error::Error;
use std::fmt;

use math::{Fixed, FRACBITS};

pub const LIGHTLEVELS: usize = 16;
pub const LIGHTSEGSHIFT: usize = 4;
pub const MAXLIGHTSCALE: usize = 48;
pub const LIGHTSCALESHIFT: usize = 12;
pub const MAXLIGHTZ: usize = 128;
pub const LIGHTZSHIFT: usize = 20;
pub const NUMCOLORMAPS: usize = 32;
/// Colormap used for objects drawn as translucent shadows.
pub const SHADOW_COLORMAP: usize = 33;

const DISTMAP: i32 = 2;

/// Raised when the asset set handed to [`PicData::new`] is unusable.
#[derive(Debug)]
pub enum AssetError {
    NoColormaps,
    ShortColormaps(usize),
    BadSkyTexture(usize),
    EmptyTexture { kind: &'static str, index: usize },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssetError::NoColormaps => write!(f, "no colormaps supplied"),
            AssetError::ShortColormaps(n) => {
                write!(f, "expected at least {} colormaps, got {n}", SHADOW_COLORMAP + 1)
            }
            AssetError::BadSkyTexture(i) => write!(f, "sky texture index {i} out of range"),
            AssetError::EmptyTexture { kind, index } => {
                write!(f, "{kind} {index} has no columns")
            }
        }
    }
}

impl Error for AssetError {}

/// A wall or sprite patch stored in column-major order. `u16::MAX` marks a
/// transparent texel.
#[derive(Debug, Clone)]
pub struct WallPic {
    pub name: String,
    /// `data[column][row]`, palette indices.
    pub data: Vec<Vec<u16>>,
}

pub const TRANSPARENT: u16 = u16::MAX;

/// A 64x64 floor/ceiling tile, row-major.
#[derive(Debug, Clone)]
pub struct FlatPic {
    pub name: String,
    pub data: [[u8; 64]; 64],
}

/// One sprite image with its screen-space anchor offsets.
#[derive(Debug, Clone)]
pub struct SpritePic {
    pub name: String,
    pub left_offset: i32,
    pub top_offset: i32,
    pub data: Vec<Vec<u16>>,
}

/// All frames for one sprite.
#[derive(Debug, Clone, Default)]
pub struct SpriteSet {
    pub frames: Vec<SpritePic>,
}

/// Immutable picture and light-table store shared by every render stage.
#[derive(Debug)]
pub struct PicData {
    walls: Vec<WallPic>,
    flats: Vec<FlatPic>,
    sprites: Vec<SpriteSet>,
    colormaps: Vec<[u8; 256]>,
    /// `[lightlevel][scale index]` colormap numbers for walls and sprites.
    light_scale: Vec<Vec<usize>>,
    /// `[lightlevel][distance index]` colormap numbers for flats.
    zlight_scale: Vec<Vec<usize>>,
    sky_flat: usize,
    sky_texture: usize,
}

impl PicData {
    pub fn new(
        walls: Vec<WallPic>,
        flats: Vec<FlatPic>,
        sprites: Vec<SpriteSet>,
        colormaps: Vec<[u8; 256]>,
        sky_flat: usize,
        sky_texture: usize,
    ) -> Result<Self, AssetError> {
        if colormaps.is_empty() {
            return Err(AssetError::NoColormaps);
        }
        if colormaps.len() <= SHADOW_COLORMAP {
            return Err(AssetError::ShortColormaps(colormaps.len()));
        }
        if sky_texture >= walls.len() {
            return Err(AssetError::BadSkyTexture(sky_texture));
        }
        for (i, wall) in walls.iter().enumerate() {
            if wall.data.is_empty() {
                return Err(AssetError::EmptyTexture { kind: "wall", index: i });
            }
        }

        let light_scale = Self::init_light_scale();
        let zlight_scale = Self::init_zlight_scale();

        Ok(Self {
            walls,
            flats,
            sprites,
            colormaps,
            light_scale,
            zlight_scale,
            sky_flat,
            sky_texture,
        })
    }

    /// Diminished-light table for walls and sprites, indexed by projected
    /// scale.
    fn init_light_scale() -> Vec<Vec<usize>> {
        (0..LIGHTLEVELS)
            .map(|i| {
                let startmap = ((LIGHTLEVELS - 1 - i) * 2 * NUMCOLORMAPS) / LIGHTLEVELS;
                (0..MAXLIGHTSCALE)
                    .map(|j| {
                        let mut level = startmap as i32 - (j as i32) / 2;
                        if level < 0 {
                            level = 0;
                        }
                        if level >= NUMCOLORMAPS as i32 {
                            level = NUMCOLORMAPS as i32 - 1;
                        }
                        level as usize
                    })
                    .collect()
            })
            .collect()
    }

    /// Diminished-light table for flats, indexed by eye distance.
    fn init_zlight_scale() -> Vec<Vec<usize>> {
        (0..LIGHTLEVELS)
            .map(|i| {
                let startmap = ((LIGHTLEVELS - 1 - i) * 2 * NUMCOLORMAPS) / LIGHTLEVELS;
                (0..MAXLIGHTZ)
                    .map(|j| {
                        let scale = Fixed::from_int(160) / Fixed::from_bits(((j as i32) + 1) << LIGHTZSHIFT);
                        let scale = scale.to_bits() >> LIGHTSCALESHIFT;
                        let mut level = startmap as i32 - scale / DISTMAP;
                        if level < 0 {
                            level = 0;
                        }
                        if level >= NUMCOLORMAPS as i32 {
                            level = NUMCOLORMAPS as i32 - 1;
                        }
                        level as usize
                    })
                    .collect()
            })
            .collect()
    }

    pub fn wall_pic(&self, num: usize) -> &WallPic {
        &self.walls[num]
    }

    pub fn flat_pic(&self, num: usize) -> &FlatPic {
        &self.flats[num]
    }

    pub fn sprite_set(&self, num: usize) -> &SpriteSet {
        &self.sprites[num]
    }

    pub fn num_sprites(&self) -> usize {
        self.sprites.len()
    }

    pub fn colormap(&self, index: usize) -> &[u8; 256] {
        &self.colormaps[index.min(self.colormaps.len() - 1)]
    }

    pub fn sky_flat(&self) -> usize {
        self.sky_flat
    }

    pub fn sky_texture(&self) -> usize {
        self.sky_texture
    }

    /// Height in rows of a wall texture (all columns share one height).
    pub fn wall_height(&self, num: usize) -> i32 {
        self.walls[num].data[0].len() as i32
    }

    pub fn wall_width(&self, num: usize) -> i32 {
        self.walls[num].data.len() as i32
    }

    /// Colormap for a wall column at the given light level and projected
    /// scale. Vertical walls get a step brighter, horizontal a step darker,
    /// the usual fake contrast.
    pub fn wall_light_colormap(
        &self,
        v1: glam::IVec2,
        v2: glam::IVec2,
        light_level: usize,
        scale: Fixed,
    ) -> &[u8; 256] {
        let mut light = (light_level >> LIGHTSEGSHIFT) as i32;
        if v1.y == v2.y {
            light -= 1;
        } else if v1.x == v2.x {
            light += 1;
        }
        let light = light.clamp(0, LIGHTLEVELS as i32 - 1) as usize;

        let mut index = (scale.to_bits() >> LIGHTSCALESHIFT) as usize;
        if index >= MAXLIGHTSCALE {
            index = MAXLIGHTSCALE - 1;
        }
        &self.colormaps[self.light_scale[light][index]]
    }

    /// Colormap for a sprite column: no fake contrast.
    pub fn sprite_light_colormap(&self, light_level: usize, scale: Fixed) -> &[u8; 256] {
        let light = ((light_level >> LIGHTSEGSHIFT) as i32).clamp(0, LIGHTLEVELS as i32 - 1) as usize;
        let mut index = (scale.to_bits() >> LIGHTSCALESHIFT) as usize;
        if index >= MAXLIGHTSCALE {
            index = MAXLIGHTSCALE - 1;
        }
        &self.colormaps[self.light_scale[light][index]]
    }

    /// Colormap for a flat span at the given light level and distance.
    pub fn flat_light_colormap(&self, light_level: usize, distance: Fixed) -> &[u8; 256] {
        let light = ((light_level >> LIGHTSEGSHIFT) as i32).clamp(0, LIGHTLEVELS as i32 - 1) as usize;
        let mut index = (distance.to_bits() >> LIGHTZSHIFT) as usize;
        if distance.to_bits() < 0 {
            index = 0;
        }
        if index >= MAXLIGHTZ {
            index = MAXLIGHTZ - 1;
        }
        &self.colormaps[self.zlight_scale[light][index]]
    }

    /// Sample a flat at fixed-point world coordinates, tiling every 64 units.
    pub fn flat_texel(&self, flat: &FlatPic, xfrac: Fixed, yfrac: Fixed) -> u8 {
        let x = (xfrac.to_bits() >> FRACBITS) & 63;
        let y = (yfrac.to_bits() >> FRACBITS) & 63;
        flat.data[y as usize][x as usize]
    }
}

//! Built-in scenes and procedurally generated pictures, enough to exercise
//! every render path without any on-disk assets.

use math::{map_point, Fixed};

use crate::builder::{leaf, MapBuilder};
use crate::map_data::MapData;
use crate::map_defs::ThingFlags;
use crate::pic::{FlatPic, PicData, SpritePic, SpriteSet, WallPic, NUMCOLORMAPS, TRANSPARENT};

const WALL_TEX: usize = 0;
const STEP_TEX: usize = 1;
const SKY_TEX: usize = 2;
const FLOOR_FLAT: usize = 0;
const CEIL_FLAT: usize = 1;
const SKY_FLAT: usize = 2;

/// Eight hue ramps of 32 shades each, shade 31 brightest.
const HUES: [[u8; 3]; 8] = [
    [200, 200, 200], // grey
    [190, 120, 80],  // brick
    [90, 170, 90],   // green
    [150, 120, 70],  // brown
    [90, 110, 200],  // blue
    [120, 160, 210], // sky
    [200, 180, 110], // tan
    [190, 70, 70],   // red
];

/// RGB palette matching the colormaps from [`demo_pic_data`].
pub fn demo_palette() -> [[u8; 3]; 256] {
    let mut pal = [[0u8; 3]; 256];
    for (i, entry) in pal.iter_mut().enumerate() {
        let base = HUES[i / 32];
        let shade = (i % 32) as u32;
        for c in 0..3 {
            entry[c] = (base[c] as u32 * shade / 31) as u8;
        }
    }
    pal
}

fn demo_colormaps() -> Vec<[u8; 256]> {
    let mut maps = Vec::with_capacity(NUMCOLORMAPS + 2);
    for l in 0..NUMCOLORMAPS {
        let mut map = [0u8; 256];
        for (i, m) in map.iter_mut().enumerate() {
            let hue = i / 32;
            let shade = (i % 32) * (NUMCOLORMAPS - l) / NUMCOLORMAPS;
            *m = (hue * 32 + shade) as u8;
        }
        maps.push(map);
    }
    // inverse greyscale for invulnerability style effects
    let mut inv = [0u8; 256];
    for (i, m) in inv.iter_mut().enumerate() {
        *m = (31 - i % 32) as u8;
    }
    maps.push(inv);
    // near-black shadow map
    let mut shadow = [0u8; 256];
    for (i, m) in shadow.iter_mut().enumerate() {
        *m = (i % 32 / 4) as u8;
    }
    maps.push(shadow);
    maps
}

fn checker_wall(name: &str, width: usize, height: usize, hue: usize) -> WallPic {
    let data = (0..width)
        .map(|c| {
            (0..height)
                .map(|r| {
                    let shade = if (c / 8 + r / 8) % 2 == 0 { 28 } else { 20 };
                    (hue * 32 + shade) as u16
                })
                .collect()
        })
        .collect();
    WallPic {
        name: name.to_string(),
        data,
    }
}

fn sky_wall() -> WallPic {
    let data = (0..256usize)
        .map(|_| {
            (0..128usize)
                .map(|r| {
                    let shade = 31 - (r / 5).min(31);
                    (5 * 32 + shade) as u16
                })
                .collect()
        })
        .collect();
    WallPic {
        name: "SKY1".to_string(),
        data,
    }
}

fn checker_flat(name: &str, hue: usize) -> FlatPic {
    let mut data = [[0u8; 64]; 64];
    for (y, row) in data.iter_mut().enumerate() {
        for (x, t) in row.iter_mut().enumerate() {
            let shade = if (x / 8 + y / 8) % 2 == 0 { 26 } else { 18 };
            *t = (hue * 32 + shade) as u8;
        }
    }
    FlatPic {
        name: name.to_string(),
        data,
    }
}

fn barrel_sprite() -> SpriteSet {
    let width = 32usize;
    let height = 64usize;
    let data = (0..width)
        .map(|c| {
            (0..height)
                .map(|r| {
                    // rounded silhouette with a transparent fringe
                    let dx = c as i32 - 16;
                    let body = dx.abs() < 12 && r > 2 && r < height - 2;
                    if body {
                        let shade = if (r / 6) % 2 == 0 { 24 } else { 16 };
                        (7 * 32 + shade) as u16
                    } else {
                        TRANSPARENT
                    }
                })
                .collect()
        })
        .collect();
    SpriteSet {
        frames: vec![SpritePic {
            name: "BARLA0".to_string(),
            left_offset: 16,
            top_offset: 64,
            data,
        }],
    }
}

/// Pictures, colormaps and light tables for the demo scenes.
pub fn demo_pic_data() -> PicData {
    let walls = vec![
        checker_wall("WALL1", 64, 128, 1),
        checker_wall("STEP1", 64, 128, 3),
        sky_wall(),
    ];
    let flats = vec![
        checker_flat("FLOOR1", 2),
        checker_flat("CEIL1", 4),
        checker_flat("F_SKY1", 0),
    ];
    let sprites = vec![barrel_sprite()];

    match PicData::new(walls, flats, sprites, demo_colormaps(), SKY_FLAT, SKY_TEX) {
        Ok(p) => p,
        // all inputs are constants, the counts above satisfy every check
        Err(e) => unreachable!("demo assets failed validation: {e}"),
    }
}

/// A single convex room, 512 units square, ceiling 128 above the floor.
pub fn single_room() -> MapData {
    let mut b = MapBuilder::new();
    let s = b.sector(0, 128, FLOOR_FLAT, CEIL_FLAT, 176);

    // wound so side 0 faces the interior
    let walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 0)),
    ];
    let mut first = None;
    for (v1, v2) in walls {
        let line = b.solid_line(v1, v2, s, WALL_TEX);
        let seg = b.seg(line, 0);
        first.get_or_insert(seg);
    }
    let ss = b.subsector(s, first.unwrap_or(0), 4);

    match b.build(leaf(ss)) {
        Ok(m) => m,
        Err(e) => unreachable!("demo scene failed validation: {e}"),
    }
}

/// Two rooms split at y = 256 with a window-style portal in the middle of
/// the dividing wall. The far room has a raised floor and lowered ceiling,
/// so the portal shows upper and lower steps.
pub fn two_rooms_portal() -> MapData {
    let mut b = MapBuilder::new();
    let near = b.sector(0, 128, FLOOR_FLAT, CEIL_FLAT, 176);
    let far = b.sector(32, 112, FLOOR_FLAT, CEIL_FLAT, 144);

    // near room perimeter
    let near_walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 256)),
        (map_point(512, 256), map_point(512, 0)),
    ];
    // dividing wall, solid flanks facing the near room
    let near_flanks = [
        (map_point(0, 256), map_point(192, 256)),
        (map_point(320, 256), map_point(512, 256)),
    ];
    let mut near_first = None;
    for (v1, v2) in near_walls.into_iter().chain(near_flanks) {
        let line = b.solid_line(v1, v2, near, WALL_TEX);
        let seg = b.seg(line, 0);
        near_first.get_or_insert(seg);
    }
    let portal = b.portal_line(
        map_point(192, 256),
        map_point(320, 256),
        near,
        far,
        Some(STEP_TEX),
        Some(STEP_TEX),
        None,
    );
    b.seg(portal, 0);
    let near_ss = b.subsector(near, near_first.unwrap_or(0), 6);

    // far room perimeter
    let far_walls = [
        (map_point(0, 256), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 256)),
    ];
    let far_flanks = [
        (map_point(192, 256), map_point(0, 256)),
        (map_point(512, 256), map_point(320, 256)),
    ];
    let mut far_first = None;
    for (v1, v2) in far_walls.into_iter().chain(far_flanks) {
        let line = b.solid_line(v1, v2, far, WALL_TEX);
        let seg = b.seg(line, 0);
        far_first.get_or_insert(seg);
    }
    b.seg(portal, 1);
    let far_ss = b.subsector(far, far_first.unwrap_or(0), 6);

    let root = b.node(
        map_point(0, 256),
        map_point(512, 0),
        [map_point(0, 256), map_point(512, 0)],
        [map_point(0, 512), map_point(512, 256)],
        [leaf(near_ss), leaf(far_ss)],
    );

    match b.build(root) {
        Ok(m) => m,
        Err(e) => unreachable!("demo scene failed validation: {e}"),
    }
}

/// The single room with one sprite standing in the middle.
pub fn room_with_sprite() -> MapData {
    let mut b = MapBuilder::new();
    let s = b.sector(0, 128, FLOOR_FLAT, CEIL_FLAT, 176);

    let walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 0)),
    ];
    let mut first = None;
    for (v1, v2) in walls {
        let line = b.solid_line(v1, v2, s, WALL_TEX);
        let seg = b.seg(line, 0);
        first.get_or_insert(seg);
    }
    let ss = b.subsector(s, first.unwrap_or(0), 4);
    b.thing(
        s,
        map_point(256, 320),
        Fixed::ZERO,
        0,
        0,
        ThingFlags::empty(),
    );

    match b.build(leaf(ss)) {
        Ok(m) => m,
        Err(e) => unreachable!("demo scene failed validation: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_and_colormaps_agree() {
        let pics = demo_pic_data();
        let pal = demo_palette();
        // colormap 0 is identity
        let cm0 = pics.colormap(0);
        for i in 0..256 {
            assert_eq!(cm0[i], i as u8);
        }
        // every colormap output is a valid palette index
        for cm in (0..NUMCOLORMAPS).map(|i| pics.colormap(i)) {
            for &out in cm.iter() {
                let _ = pal[out as usize];
            }
        }
    }

    #[test]
    fn sprite_has_transparent_fringe() {
        let pics = demo_pic_data();
        let frame = &pics.sprite_set(0).frames[0];
        assert_eq!(frame.data[0][10], TRANSPARENT);
        assert_ne!(frame.data[16][30], TRANSPARENT);
    }
}

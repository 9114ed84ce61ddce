//! Map geometry, picture assets and the per-frame view state consumed by
//! the renderers. Everything here is plain data: no rendering, no
//! simulation, just validated structures and the builders that make them.

pub mod builder;
pub mod camera;
pub mod demo;
pub mod map_data;
pub mod map_defs;
pub mod pic;

pub use builder::{leaf, MapBuilder};
pub use camera::Camera;
pub use map_data::{MapData, MapError};
pub use map_defs::{
    LineDef, LineFlags, Node, Sector, Segment, SideDef, SubSector, Thing, ThingFlags,
    IS_SUBSECTOR_MASK,
};
pub use pic::{AssetError, FlatPic, PicData, SpritePic, SpriteSet, WallPic};

use bitflags::bitflags;
use glam::IVec2;
use math::{Angle, Fixed};

bitflags! {
    /// Wall-definition flags that affect rendering.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct LineFlags: u32 {
        const BLOCKING      = 0x0001;
        const TWO_SIDED     = 0x0004;
        /// Upper texture is anchored at its bottom edge.
        const UNPEG_TOP     = 0x0008;
        /// Lower/middle texture is anchored at its bottom edge.
        const UNPEG_BOTTOM  = 0x0010;
    }
}

/// The tag bit marking a BSP child reference as a subspace leaf rather than
/// an interior node.
pub const IS_SUBSECTOR_MASK: u32 = 0x8000_0000;

/// A sector is a region sharing one floor height, ceiling height and light
/// level. Heights and light may change between frames (moving platforms are
/// an external concern); the renderer treats every frame's values as an
/// immutable snapshot.
#[derive(Debug, Default, Clone)]
pub struct Sector {
    pub num: u32,
    pub floorheight: Fixed,
    pub ceilingheight: Fixed,
    pub floorpic: usize,
    pub ceilingpic: usize,
    pub lightlevel: usize,
    /// Indexes of the bounding linedefs.
    pub lines: Vec<u32>,
    /// Indexes of the movable objects currently in this sector.
    pub things: Vec<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct SideDef {
    pub textureoffset: Fixed,
    pub rowoffset: Fixed,
    pub toptexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    pub midtexture: Option<usize>,
    /// Sector this side faces away from.
    pub sector: u32,
}

#[derive(Debug, Clone)]
pub struct LineDef {
    pub v1: IVec2,
    pub v2: IVec2,
    /// Precalculated `v2 - v1` for side tests.
    pub delta: IVec2,
    pub flags: LineFlags,
    pub front_sidedef: u32,
    pub back_sidedef: Option<u32>,
    pub frontsector: u32,
    pub backsector: Option<u32>,
}

impl LineDef {
    /// 0 is the front side. A point exactly on the line counts as front,
    /// the tie-break used uniformly for all partition tests.
    pub fn point_on_side(&self, v: IVec2) -> usize {
        let dx = v.x.wrapping_sub(self.v1.x) as i64;
        let dy = v.y.wrapping_sub(self.v1.y) as i64;

        if dy * self.delta.x as i64 <= self.delta.y as i64 * dx {
            return 0;
        }
        1
    }
}

/// A wall piece emitted by BSP subdivision: either a whole linedef side or a
/// split fragment of one.
#[derive(Debug, Clone)]
pub struct Segment {
    pub v1: IVec2,
    pub v2: IVec2,
    /// Distance along the owning linedef to `v1`.
    pub offset: Fixed,
    pub angle: Angle,
    pub sidedef: u32,
    pub linedef: u32,
    pub frontsector: u32,
    pub backsector: Option<u32>,
}

impl Segment {
    /// True if the textured side of the segment faces `point`.
    pub fn is_facing_point(&self, point: IVec2) -> bool {
        let d = (self.v2.y.wrapping_sub(self.v1.y) as i64)
            * (self.v1.x.wrapping_sub(point.x) as i64)
            - (self.v2.x.wrapping_sub(self.v1.x) as i64)
                * (self.v1.y.wrapping_sub(point.y) as i64);
        d <= 0
    }

    pub fn point_on_side(&self, v: IVec2) -> usize {
        let dx = v.x.wrapping_sub(self.v1.x) as i64;
        let dy = v.y.wrapping_sub(self.v1.y) as i64;
        let delta = self.v2 - self.v1;

        if dy * delta.x as i64 <= delta.y as i64 * dx {
            return 0;
        }
        1
    }
}

/// Convex fragment of a sector: a run of segments plus its owning sector.
#[derive(Debug, Clone)]
pub struct SubSector {
    pub sector: u32,
    pub start_seg: u32,
    pub seg_count: u32,
}

/// Interior BSP node. Children tagged with [`IS_SUBSECTOR_MASK`] reference
/// subsectors, otherwise further nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Start of the partition line.
    pub xy: IVec2,
    /// Direction of the partition line.
    pub delta: IVec2,
    /// Child bounding boxes: `[side][0]` top-left, `[side][1]` bottom-right.
    pub bboxes: [[IVec2; 2]; 2],
    pub children: [u32; 2],
}

impl Node {
    /// Which side of the partition line `v` lies on: 0 front, 1 back.
    /// A point exactly on the line is front.
    pub fn point_on_side(&self, v: IVec2) -> usize {
        let dx = v.x.wrapping_sub(self.xy.x) as i64;
        let dy = v.y.wrapping_sub(self.xy.y) as i64;

        if dy * self.delta.x as i64 <= self.delta.y as i64 * dx {
            return 0;
        }
        1
    }
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct ThingFlags: u32 {
        /// Draw with the darkest colormap regardless of light.
        const SHADOW      = 0x0001;
        /// Ignore sector light, draw full bright.
        const FULL_BRIGHT = 0x0002;
    }
}

/// Per-frame snapshot of a movable object, as supplied by the world-state
/// collaborator.
#[derive(Debug, Default, Clone)]
pub struct Thing {
    pub pos: IVec2,
    pub z: Fixed,
    pub angle: Angle,
    pub sprite: usize,
    pub frame: usize,
    pub flags: ThingFlags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use math::map_point;

    fn north_node() -> Node {
        Node {
            xy: map_point(0, 256),
            delta: map_point(1, 0),
            bboxes: [[IVec2::ZERO; 2]; 2],
            children: [0, 1],
        }
    }

    #[test]
    fn node_side_basic() {
        let n = north_node();
        assert_eq!(n.point_on_side(map_point(128, 100)), 0);
        assert_eq!(n.point_on_side(map_point(128, 300)), 1);
    }

    #[test]
    fn node_side_tie_break_is_front() {
        let n = north_node();
        assert_eq!(n.point_on_side(map_point(77, 256)), 0);
        assert_eq!(n.point_on_side(n.xy), 0);
    }

    #[test]
    fn seg_facing() {
        let seg = Segment {
            v1: map_point(0, 0),
            v2: map_point(100, 0),
            offset: Fixed::ZERO,
            angle: Angle::default(),
            sidedef: 0,
            linedef: 0,
            frontsector: 0,
            backsector: None,
        };
        // right side of v1->v2 faces negative y
        assert!(seg.is_facing_point(map_point(50, -10)));
        assert!(!seg.is_facing_point(map_point(50, 10)));
    }
}

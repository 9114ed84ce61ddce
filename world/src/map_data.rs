use std::error::Error;
use std::fmt;

use glam::IVec2;
use log::warn;

use crate::map_defs::{
    LineDef, Node, Sector, Segment, SideDef, SubSector, Thing, IS_SUBSECTOR_MASK,
};

/// Geometry or cross-reference fault found while validating a map.
#[derive(Debug, PartialEq, Eq)]
pub enum MapError {
    NoSectors,
    NoSubSectors,
    BadSectorRef { kind: &'static str, index: u32 },
    BadSideRef { linedef: u32, sidedef: u32 },
    BadSegRange { subsector: u32 },
    BadNodeChild { node: u32, child: u32 },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MapError::NoSectors => write!(f, "map has no sectors"),
            MapError::NoSubSectors => write!(f, "map has no subsectors"),
            MapError::BadSectorRef { kind, index } => {
                write!(f, "{kind} {index} references a missing sector")
            }
            MapError::BadSideRef { linedef, sidedef } => {
                write!(f, "linedef {linedef} references missing sidedef {sidedef}")
            }
            MapError::BadSegRange { subsector } => {
                write!(f, "subsector {subsector} seg range out of bounds")
            }
            MapError::BadNodeChild { node, child } => {
                write!(f, "node {node} child reference {child:#x} out of bounds")
            }
        }
    }
}

impl Error for MapError {}

/// The static geometry of one map, stored as flat arrays cross-referenced by
/// index. Built once (see [`crate::MapBuilder`]), read every frame.
#[derive(Debug, Default)]
pub struct MapData {
    pub sectors: Vec<Sector>,
    pub sidedefs: Vec<SideDef>,
    pub linedefs: Vec<LineDef>,
    pub segments: Vec<Segment>,
    pub subsectors: Vec<SubSector>,
    pub nodes: Vec<Node>,
    pub things: Vec<Thing>,
    /// Root of the BSP, possibly tagged with [`IS_SUBSECTOR_MASK`] for
    /// single-subsector maps.
    pub start_node: u32,
}

impl MapData {
    /// Check every cross-reference so rendering can index without bounds
    /// anxiety. Degenerate sectors are reported but tolerated.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.sectors.is_empty() {
            return Err(MapError::NoSectors);
        }
        if self.subsectors.is_empty() {
            return Err(MapError::NoSubSectors);
        }

        let nsec = self.sectors.len() as u32;
        let nside = self.sidedefs.len() as u32;
        let nseg = self.segments.len() as u32;

        for (i, side) in self.sidedefs.iter().enumerate() {
            if side.sector >= nsec {
                return Err(MapError::BadSectorRef {
                    kind: "sidedef",
                    index: i as u32,
                });
            }
        }

        for (i, line) in self.linedefs.iter().enumerate() {
            if line.front_sidedef >= nside {
                return Err(MapError::BadSideRef {
                    linedef: i as u32,
                    sidedef: line.front_sidedef,
                });
            }
            if let Some(back) = line.back_sidedef {
                if back >= nside {
                    return Err(MapError::BadSideRef {
                        linedef: i as u32,
                        sidedef: back,
                    });
                }
            }
            if line.frontsector >= nsec {
                return Err(MapError::BadSectorRef {
                    kind: "linedef",
                    index: i as u32,
                });
            }
        }

        for (i, seg) in self.segments.iter().enumerate() {
            if seg.sidedef >= nside || seg.frontsector >= nsec {
                return Err(MapError::BadSectorRef {
                    kind: "seg",
                    index: i as u32,
                });
            }
        }

        for (i, ss) in self.subsectors.iter().enumerate() {
            let end = ss.start_seg as u64 + ss.seg_count as u64;
            if ss.sector >= nsec {
                return Err(MapError::BadSectorRef {
                    kind: "subsector",
                    index: i as u32,
                });
            }
            if end > nseg as u64 {
                return Err(MapError::BadSegRange {
                    subsector: i as u32,
                });
            }
        }

        let check_child = |node: u32, child: u32| -> Result<(), MapError> {
            if child & IS_SUBSECTOR_MASK != 0 {
                if (child & !IS_SUBSECTOR_MASK) as usize >= self.subsectors.len() {
                    return Err(MapError::BadNodeChild { node, child });
                }
            } else if child as usize >= self.nodes.len() {
                return Err(MapError::BadNodeChild { node, child });
            }
            Ok(())
        };

        for (i, node) in self.nodes.iter().enumerate() {
            check_child(i as u32, node.children[0])?;
            check_child(i as u32, node.children[1])?;
        }
        check_child(u32::MAX, self.start_node)?;

        for (i, sec) in self.sectors.iter().enumerate() {
            if sec.ceilingheight < sec.floorheight {
                warn!("sector {i} has ceiling below floor");
            }
        }
        Ok(())
    }

    /// Walk the BSP to the leaf containing `point`. A point exactly on a
    /// partition line descends the front child.
    pub fn point_in_subsector(&self, point: IVec2) -> &SubSector {
        let mut id = self.start_node;
        while id & IS_SUBSECTOR_MASK == 0 {
            let node = &self.nodes[id as usize];
            id = node.children[node.point_on_side(point)];
        }
        &self.subsectors[(id & !IS_SUBSECTOR_MASK) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn demo_scenes_validate() {
        demo::single_room().validate().unwrap();
        demo::two_rooms_portal().validate().unwrap();
        demo::room_with_sprite().validate().unwrap();
    }

    #[test]
    fn empty_map_rejected() {
        let map = MapData::default();
        assert_eq!(map.validate(), Err(MapError::NoSectors));
    }

    #[test]
    fn point_in_subsector_two_rooms() {
        let map = demo::two_rooms_portal();
        let near = map.point_in_subsector(math::map_point(256, 128));
        let far = map.point_in_subsector(math::map_point(256, 384));
        assert_ne!(near.sector, far.sector);
    }
}

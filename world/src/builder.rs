use glam::IVec2;
use math::{point_to_angle, Angle, Fixed};

use crate::map_data::{MapData, MapError};
use crate::map_defs::{
    LineDef, LineFlags, Node, Sector, Segment, SideDef, SubSector, Thing, ThingFlags,
    IS_SUBSECTOR_MASK,
};

/// Tag a subsector index as a BSP leaf reference.
pub fn leaf(subsector: u32) -> u32 {
    subsector | IS_SUBSECTOR_MASK
}

/// Assembles a [`MapData`] from hand-placed geometry. Used by the demo
/// scenes and by tests; a file loader would fill the same arrays.
#[derive(Debug, Default)]
pub struct MapBuilder {
    map: MapData,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heights are in whole map units.
    pub fn sector(
        &mut self,
        floor: i32,
        ceiling: i32,
        floorpic: usize,
        ceilingpic: usize,
        lightlevel: usize,
    ) -> u32 {
        let num = self.map.sectors.len() as u32;
        self.map.sectors.push(Sector {
            num,
            floorheight: Fixed::from_int(floor),
            ceilingheight: Fixed::from_int(ceiling),
            floorpic,
            ceilingpic,
            lightlevel,
            lines: Vec::new(),
            things: Vec::new(),
        });
        num
    }

    /// One-sided wall. Returns the linedef index.
    pub fn solid_line(&mut self, v1: IVec2, v2: IVec2, sector: u32, midtexture: usize) -> u32 {
        let side = self.map.sidedefs.len() as u32;
        self.map.sidedefs.push(SideDef {
            textureoffset: Fixed::ZERO,
            rowoffset: Fixed::ZERO,
            toptexture: None,
            bottomtexture: None,
            midtexture: Some(midtexture),
            sector,
        });
        self.push_line(v1, v2, LineFlags::BLOCKING, side, None, sector, None)
    }

    /// Two-sided wall between `front` and `back`. Upper and lower textures
    /// cover the steps where the sectors differ.
    pub fn portal_line(
        &mut self,
        v1: IVec2,
        v2: IVec2,
        front: u32,
        back: u32,
        toptexture: Option<usize>,
        bottomtexture: Option<usize>,
        midtexture: Option<usize>,
    ) -> u32 {
        let fside = self.map.sidedefs.len() as u32;
        self.map.sidedefs.push(SideDef {
            textureoffset: Fixed::ZERO,
            rowoffset: Fixed::ZERO,
            toptexture,
            bottomtexture,
            midtexture,
            sector: front,
        });
        let bside = self.map.sidedefs.len() as u32;
        self.map.sidedefs.push(SideDef {
            textureoffset: Fixed::ZERO,
            rowoffset: Fixed::ZERO,
            toptexture,
            bottomtexture,
            midtexture,
            sector: back,
        });
        self.push_line(
            v1,
            v2,
            LineFlags::TWO_SIDED,
            fside,
            Some(bside),
            front,
            Some(back),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn push_line(
        &mut self,
        v1: IVec2,
        v2: IVec2,
        flags: LineFlags,
        front_sidedef: u32,
        back_sidedef: Option<u32>,
        frontsector: u32,
        backsector: Option<u32>,
    ) -> u32 {
        let num = self.map.linedefs.len() as u32;
        self.map.linedefs.push(LineDef {
            v1,
            v2,
            delta: v2 - v1,
            flags,
            front_sidedef,
            back_sidedef,
            frontsector,
            backsector,
        });
        self.map.sectors[frontsector as usize].lines.push(num);
        if let Some(back) = backsector {
            self.map.sectors[back as usize].lines.push(num);
        }
        num
    }

    /// Emit a seg for one side of a linedef: side 0 runs v1 to v2, side 1
    /// the reverse. Returns the seg index.
    pub fn seg(&mut self, linedef: u32, side: usize) -> u32 {
        let line = self.map.linedefs[linedef as usize].clone();
        let (v1, v2, sidedef, frontsector, backsector) = if side == 0 {
            (
                line.v1,
                line.v2,
                line.front_sidedef,
                line.frontsector,
                line.backsector,
            )
        } else {
            (
                line.v2,
                line.v1,
                line.back_sidedef.unwrap_or(line.front_sidedef),
                line.backsector.unwrap_or(line.frontsector),
                Some(line.frontsector),
            )
        };
        let num = self.map.segments.len() as u32;
        self.map.segments.push(Segment {
            v1,
            v2,
            offset: Fixed::ZERO,
            angle: point_to_angle(v1, v2),
            sidedef,
            linedef,
            frontsector,
            backsector,
        });
        num
    }

    /// Emit a partial seg covering the linedef from `from` to `to`, offset
    /// by the distance from the linedef start.
    pub fn partial_seg(&mut self, linedef: u32, side: usize, from: IVec2, to: IVec2) -> u32 {
        let num = self.seg(linedef, side);
        let seg = &mut self.map.segments[num as usize];
        let start = seg.v1;
        seg.offset = math::point_to_dist(start, from);
        seg.v1 = from;
        seg.v2 = to;
        num
    }

    pub fn subsector(&mut self, sector: u32, start_seg: u32, seg_count: u32) -> u32 {
        let num = self.map.subsectors.len() as u32;
        self.map.subsectors.push(SubSector {
            sector,
            start_seg,
            seg_count,
        });
        num
    }

    pub fn node(
        &mut self,
        xy: IVec2,
        delta: IVec2,
        bbox_front: [IVec2; 2],
        bbox_back: [IVec2; 2],
        children: [u32; 2],
    ) -> u32 {
        let num = self.map.nodes.len() as u32;
        self.map.nodes.push(Node {
            xy,
            delta,
            bboxes: [bbox_front, bbox_back],
            children,
        });
        num
    }

    pub fn thing(
        &mut self,
        sector: u32,
        pos: IVec2,
        z: Fixed,
        sprite: usize,
        frame: usize,
        flags: ThingFlags,
    ) -> u32 {
        let num = self.map.things.len() as u32;
        self.map.things.push(Thing {
            pos,
            z,
            angle: Angle::default(),
            sprite,
            frame,
            flags,
        });
        self.map.sectors[sector as usize].things.push(num);
        num
    }

    pub fn build(mut self, start_node: u32) -> Result<MapData, MapError> {
        self.map.start_node = start_node;
        self.map.validate()?;
        Ok(self.map)
    }
}

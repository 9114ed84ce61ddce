//! Whole-frame scenario tests using the demo scenes. These drive the full
//! pipeline end to end with a real pixel buffer and check the frame-level
//! invariants the per-module tests cannot see.

use glam::IVec2;
use math::{map_point, Fixed, ANG270, ANG90};
use render_target::FrameBuffer;
use render_trait::PixelBuffer;
use world::demo::{demo_pic_data, room_with_sprite, single_room, two_rooms_portal};
use world::{leaf, Camera, MapBuilder, MapData, IS_SUBSECTOR_MASK};

use crate::defs::SIL_BOTH;
use crate::SoftwareRenderer;

const WIDTH: usize = 320;
const HEIGHT: usize = 200;

fn eye(pos: IVec2, angle: math::Angle) -> Camera {
    Camera::new(pos, Fixed::from_int(41), angle)
}

fn render(map: &MapData, camera: &Camera, fill: u8) -> (SoftwareRenderer, FrameBuffer) {
    let pic_data = demo_pic_data();
    let mut renderer = match SoftwareRenderer::new(WIDTH, HEIGHT) {
        Ok(r) => r,
        Err(e) => panic!("renderer setup failed: {e}"),
    };
    let mut buf = FrameBuffer::new(WIDTH, HEIGHT);
    buf.clear_with(fill);
    renderer.render_player_view(camera, map, &pic_data, &mut buf);
    (renderer, buf)
}

/// Render the scene twice with different clear colours. Any pixel the
/// renderer never touches keeps its clear colour and makes the frames
/// differ, so equal frames mean full coverage.
fn assert_full_coverage(map: &MapData, camera: &Camera) {
    let (_, a) = render(map, camera, 0);
    let (_, b) = render(map, camera, 255);
    assert_eq!(a.buf(), b.buf());
}

fn assert_solidsegs_sorted(renderer: &SoftwareRenderer) {
    for pair in renderer.solidsegs.windows(2) {
        assert!(pair[0].last < pair[1].first, "overlapping clip posts");
    }
}

#[test]
fn single_room_covers_every_pixel() {
    let map = single_room();
    let camera = eye(map_point(256, 128), ANG90);
    assert_full_coverage(&map, &camera);
}

#[test]
fn single_room_walls_fill_the_clip_list() {
    let map = single_room();
    let camera = eye(map_point(256, 128), ANG90);
    let (renderer, _) = render(&map, &camera, 0);

    // every column covered by some drawseg
    let mut covered = vec![false; WIDTH];
    for ds in &renderer.r_data.drawsegs {
        for x in ds.x1..=ds.x2 {
            covered[x as usize] = true;
        }
    }
    assert!(covered.iter().all(|c| *c));

    // the solid walls merge the sentinel posts into one
    assert_eq!(renderer.solidsegs.len(), 1);
}

#[test]
fn single_room_uses_one_floor_and_one_ceiling_plane() {
    let map = single_room();
    let camera = eye(map_point(256, 128), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.r_data.visplane_render.lastvisplane, 2);
}

#[test]
fn portal_steps_produce_a_full_silhouette() {
    let map = two_rooms_portal();
    let camera = eye(map_point(256, 64), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    assert_solidsegs_sorted(&renderer);

    // the window seg has a raised floor and lowered ceiling behind it
    let portal = renderer
        .r_data
        .drawsegs
        .iter()
        .find(|ds| map.segments[ds.curline as usize].backsector.is_some());
    let portal = match portal {
        Some(ds) => ds,
        None => panic!("portal seg was not stored"),
    };
    assert_eq!(portal.silhouette, SIL_BOTH);
    assert!(portal.sprtopclip.is_some());
    assert!(portal.sprbottomclip.is_some());
    assert!(portal.maskedtexturecol.is_none());

    // near floor and ceiling plus the far pair seen through the window
    assert!(renderer.r_data.visplane_render.lastvisplane >= 4);
}

#[test]
fn portal_scene_covers_every_pixel() {
    let map = two_rooms_portal();
    let camera = eye(map_point(256, 64), ANG90);
    assert_full_coverage(&map, &camera);
}

#[test]
fn far_planes_stay_inside_the_portal_columns() {
    let map = two_rooms_portal();
    let camera = eye(map_point(256, 64), ANG90);
    let (renderer, _) = render(&map, &camera, 0);

    let portal = renderer
        .r_data
        .drawsegs
        .iter()
        .find(|ds| map.segments[ds.curline as usize].backsector.is_some());
    let portal = match portal {
        Some(ds) => ds,
        None => panic!("portal seg was not stored"),
    };

    // the far room has light 144, so its planes are distinct from the near
    // room's and may only be marked through the window
    let vp = &renderer.r_data.visplane_render;
    let mut found = false;
    for plane in vp.visplanes.iter().take(vp.lastvisplane) {
        if plane.lightlevel == 144 && plane.minx <= plane.maxx {
            assert!(plane.minx >= portal.x1, "far plane leaks left of the portal");
            assert!(plane.maxx <= portal.x2, "far plane leaks right of the portal");
            found = true;
        }
    }
    assert!(found, "far room planes were never opened");
}

#[test]
fn sprite_in_view_changes_the_frame() {
    let camera = eye(map_point(256, 128), ANG90);
    let (_, empty) = render(&single_room(), &camera, 0);
    let (_, with_sprite) = render(&room_with_sprite(), &camera, 0);
    assert_ne!(empty.buf(), with_sprite.buf());
}

/// The portal scene rebuilt with an optional barrel in the far room, tucked
/// behind the solid flank left of the window.
fn portal_scene_with_hidden_sprite(with_thing: bool) -> MapData {
    let mut b = MapBuilder::new();
    let near = b.sector(0, 128, 0, 1, 176);
    let far = b.sector(32, 112, 0, 1, 144);

    let near_walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 256)),
        (map_point(512, 256), map_point(512, 0)),
        (map_point(0, 256), map_point(192, 256)),
        (map_point(320, 256), map_point(512, 256)),
    ];
    let mut near_first = None;
    for (v1, v2) in near_walls {
        let line = b.solid_line(v1, v2, near, 0);
        let seg = b.seg(line, 0);
        near_first.get_or_insert(seg);
    }
    let portal = b.portal_line(
        map_point(192, 256),
        map_point(320, 256),
        near,
        far,
        Some(1),
        Some(1),
        None,
    );
    b.seg(portal, 0);
    let near_ss = b.subsector(near, near_first.unwrap_or(0), 6);

    let far_walls = [
        (map_point(0, 256), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 256)),
        (map_point(192, 256), map_point(0, 256)),
        (map_point(512, 256), map_point(320, 256)),
    ];
    let mut far_first = None;
    for (v1, v2) in far_walls {
        let line = b.solid_line(v1, v2, far, 0);
        let seg = b.seg(line, 0);
        far_first.get_or_insert(seg);
    }
    b.seg(portal, 1);
    let far_ss = b.subsector(far, far_first.unwrap_or(0), 6);

    if with_thing {
        b.thing(
            far,
            map_point(64, 320),
            Fixed::from_int(32),
            0,
            0,
            world::ThingFlags::empty(),
        );
    }

    let root = b.node(
        map_point(0, 256),
        map_point(512, 0),
        [map_point(0, 256), map_point(512, 0)],
        [map_point(0, 512), map_point(512, 256)],
        [leaf(near_ss), leaf(far_ss)],
    );
    match b.build(root) {
        Ok(m) => m,
        Err(e) => panic!("test scene failed validation: {e}"),
    }
}

#[test]
fn sprite_behind_a_solid_wall_is_invisible() {
    // the barrel sits behind the left flank of the dividing wall, well
    // inside the view cone but with no open column reaching it
    let camera = eye(map_point(256, 64), ANG90);
    let (_, without) = render(&portal_scene_with_hidden_sprite(false), &camera, 0);
    let (_, with) = render(&portal_scene_with_hidden_sprite(true), &camera, 0);
    assert_eq!(without.buf(), with.buf());
}

#[test]
fn sprite_behind_the_view_is_culled() {
    // facing away from the sprite the frames must be identical
    let camera = eye(map_point(256, 128), ANG270);
    let (_, empty) = render(&single_room(), &camera, 0);
    let (_, with_sprite) = render(&room_with_sprite(), &camera, 0);
    assert_eq!(empty.buf(), with_sprite.buf());
}

/// Two rooms of identical heights divided by a two-sided line carrying only
/// a mid texture.
fn rooms_with_masked_divider(midtexture: Option<usize>) -> MapData {
    let mut b = MapBuilder::new();
    let near = b.sector(0, 128, 0, 1, 176);
    let far = b.sector(0, 128, 0, 1, 144);
    let divider = b.portal_line(map_point(0, 256), map_point(512, 256), near, far, None, None, midtexture);

    let near_walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 256)),
        (map_point(512, 256), map_point(512, 0)),
    ];
    let mut near_first = None;
    for (v1, v2) in near_walls {
        let line = b.solid_line(v1, v2, near, 0);
        let seg = b.seg(line, 0);
        near_first.get_or_insert(seg);
    }
    b.seg(divider, 0);
    let near_ss = b.subsector(near, near_first.unwrap_or(0), 4);

    let far_walls = [
        (map_point(0, 256), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 256)),
    ];
    let mut far_first = None;
    for (v1, v2) in far_walls {
        let line = b.solid_line(v1, v2, far, 0);
        let seg = b.seg(line, 0);
        far_first.get_or_insert(seg);
    }
    b.seg(divider, 1);
    let far_ss = b.subsector(far, far_first.unwrap_or(0), 4);

    let root = b.node(
        map_point(0, 256),
        map_point(512, 0),
        [map_point(0, 256), map_point(512, 0)],
        [map_point(0, 512), map_point(512, 256)],
        [leaf(near_ss), leaf(far_ss)],
    );
    match b.build(root) {
        Ok(m) => m,
        Err(e) => panic!("test scene failed validation: {e}"),
    }
}

#[test]
fn masked_midtexture_is_stored_and_drawn() {
    let camera = eye(map_point(256, 64), ANG90);
    let (renderer, masked_frame) = render(&rooms_with_masked_divider(Some(0)), &camera, 0);

    let masked = renderer
        .r_data
        .drawsegs
        .iter()
        .any(|ds| ds.maskedtexturecol.is_some());
    assert!(masked, "no drawseg reserved a masked column range");

    // the same scene without the mid texture shows the far room instead
    let (_, open_frame) = render(&rooms_with_masked_divider(None), &camera, 0);
    assert_ne!(masked_frame.buf(), open_frame.buf());
}

#[test]
fn zero_height_sector_renders_without_panic() {
    let mut b = MapBuilder::new();
    let s = b.sector(0, 0, 0, 1, 176);
    let walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 512)),
        (map_point(0, 512), map_point(512, 512)),
        (map_point(512, 512), map_point(512, 0)),
    ];
    let mut first = None;
    for (v1, v2) in walls {
        let line = b.solid_line(v1, v2, s, 0);
        let seg = b.seg(line, 0);
        first.get_or_insert(seg);
    }
    let ss = b.subsector(s, first.unwrap_or(0), 4);
    let map = match b.build(leaf(ss)) {
        Ok(m) => m,
        Err(e) => panic!("test scene failed validation: {e}"),
    };

    let camera = eye(map_point(256, 128), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    // the eye sits above the collapsed sector so only the floor opens
    assert_eq!(renderer.r_data.visplane_render.lastvisplane, 1);
}

#[test]
fn dangling_sector_reference_is_skipped() {
    let mut map = single_room();
    for seg in &mut map.segments {
        seg.frontsector = 999;
    }
    let camera = eye(map_point(256, 128), ANG90);
    // every wall fragment is dropped but the frame still completes
    let (renderer, _) = render(&map, &camera, 0);
    assert!(renderer.r_data.drawsegs.is_empty());
}

#[test]
fn broken_bsp_references_do_not_abort_the_frame() {
    let camera = eye(map_point(256, 128), ANG90);

    let mut map = single_room();
    map.subsectors[0].sector = 999;
    let (_, frame) = render(&map, &camera, 7);
    assert!(frame.buf().iter().all(|&p| p == 7));

    let mut map = single_room();
    map.start_node = 42;
    let (_, frame) = render(&map, &camera, 7);
    assert!(frame.buf().iter().all(|&p| p == 7));
}

/// Collect every subsector id below `node_id`, in tree order.
fn subtree_leaves(map: &MapData, node_id: u32, out: &mut Vec<u32>) {
    if node_id & IS_SUBSECTOR_MASK != 0 {
        out.push(node_id & !IS_SUBSECTOR_MASK);
        return;
    }
    let node = &map.nodes[node_id as usize];
    subtree_leaves(map, node.children[0], out);
    subtree_leaves(map, node.children[1], out);
}

/// At every node, any visited subsector on the camera's side of the
/// partition must come before any visited subsector on the far side.
fn assert_front_to_back(map: &MapData, camera: &Camera, node_id: u32, order: &[u32]) {
    if node_id & IS_SUBSECTOR_MASK != 0 {
        return;
    }
    let node = &map.nodes[node_id as usize];
    let side = node.point_on_side(camera.pos);
    let mut near = Vec::new();
    let mut far = Vec::new();
    subtree_leaves(map, node.children[side], &mut near);
    subtree_leaves(map, node.children[side ^ 1], &mut far);

    let seen = |ss: u32| order.iter().position(|&v| v == ss);
    for f in far.iter().filter_map(|&f| seen(f)) {
        for n in near.iter().filter_map(|&n| seen(n)) {
            assert!(n < f, "far-side subsector visited before the near side");
        }
    }

    assert_front_to_back(map, camera, node.children[0], order);
    assert_front_to_back(map, camera, node.children[1], order);
}

#[test]
fn traversal_is_front_to_back_from_both_sides() {
    let map = two_rooms_portal();

    // standing in the near room looking through the window
    let camera = eye(map_point(256, 64), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.subsector_order, vec![0, 1]);
    assert_front_to_back(&map, &camera, map.start_node, &renderer.subsector_order);

    // and from the far room looking back
    let camera = eye(map_point(256, 448), ANG270);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.subsector_order, vec![1, 0]);
    assert_front_to_back(&map, &camera, map.start_node, &renderer.subsector_order);
}

/// Three rooms in a row joined by full-width windows, so the BSP needs two
/// nodes and the traversal order differs per camera side at each of them.
fn three_room_corridor() -> MapData {
    let mut b = MapBuilder::new();
    let near = b.sector(0, 128, 0, 1, 176);
    let mid = b.sector(16, 120, 0, 1, 160);
    let far = b.sector(32, 112, 0, 1, 144);

    let near_walls = [
        (map_point(512, 0), map_point(0, 0)),
        (map_point(0, 0), map_point(0, 256)),
        (map_point(512, 256), map_point(512, 0)),
    ];
    let mut near_first = None;
    for (v1, v2) in near_walls {
        let line = b.solid_line(v1, v2, near, 0);
        let seg = b.seg(line, 0);
        near_first.get_or_insert(seg);
    }
    let window_a = b.portal_line(
        map_point(0, 256),
        map_point(512, 256),
        near,
        mid,
        Some(1),
        Some(1),
        None,
    );
    b.seg(window_a, 0);
    let near_ss = b.subsector(near, near_first.unwrap_or(0), 4);

    let mid_walls = [
        (map_point(0, 256), map_point(0, 512)),
        (map_point(512, 512), map_point(512, 256)),
    ];
    let mut mid_first = None;
    for (v1, v2) in mid_walls {
        let line = b.solid_line(v1, v2, mid, 0);
        let seg = b.seg(line, 0);
        mid_first.get_or_insert(seg);
    }
    b.seg(window_a, 1);
    let window_b = b.portal_line(
        map_point(0, 512),
        map_point(512, 512),
        mid,
        far,
        Some(1),
        Some(1),
        None,
    );
    b.seg(window_b, 0);
    let mid_ss = b.subsector(mid, mid_first.unwrap_or(0), 4);

    let far_walls = [
        (map_point(0, 512), map_point(0, 768)),
        (map_point(0, 768), map_point(512, 768)),
        (map_point(512, 768), map_point(512, 512)),
    ];
    let mut far_first = None;
    for (v1, v2) in far_walls {
        let line = b.solid_line(v1, v2, far, 0);
        let seg = b.seg(line, 0);
        far_first.get_or_insert(seg);
    }
    b.seg(window_b, 1);
    let far_ss = b.subsector(far, far_first.unwrap_or(0), 4);

    let back = b.node(
        map_point(0, 512),
        map_point(512, 0),
        [map_point(0, 512), map_point(512, 256)],
        [map_point(0, 768), map_point(512, 512)],
        [leaf(mid_ss), leaf(far_ss)],
    );
    let root = b.node(
        map_point(0, 256),
        map_point(512, 0),
        [map_point(0, 256), map_point(512, 0)],
        [map_point(0, 768), map_point(512, 256)],
        [leaf(near_ss), back],
    );
    match b.build(root) {
        Ok(m) => m,
        Err(e) => panic!("test scene failed validation: {e}"),
    }
}

#[test]
fn two_node_tree_visits_every_room_front_to_back() {
    let map = three_room_corridor();

    let camera = eye(map_point(256, 64), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.subsector_order, vec![0, 1, 2]);
    assert_front_to_back(&map, &camera, map.start_node, &renderer.subsector_order);

    let camera = eye(map_point(256, 704), ANG270);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.subsector_order, vec![2, 1, 0]);
    assert_front_to_back(&map, &camera, map.start_node, &renderer.subsector_order);

    // from the middle room the near subtree is one leaf, the rest is the
    // whole far subtree
    let camera = eye(map_point(256, 320), ANG90);
    let (renderer, _) = render(&map, &camera, 0);
    assert_eq!(renderer.subsector_order.first(), Some(&1));
    assert_front_to_back(&map, &camera, map.start_node, &renderer.subsector_order);
}

#[test]
fn clip_arrays_reset_between_frames() {
    let map = two_rooms_portal();
    let camera = eye(map_point(256, 64), ANG90);
    let (mut renderer, _) = render(&map, &camera, 0);

    // the window narrowed some columns during the frame
    assert!(renderer.r_data.ceilingclip.iter().any(|&c| c > -1));

    let pic_data = demo_pic_data();
    let mut buf = FrameBuffer::new(WIDTH, HEIGHT);
    renderer.render_player_view(&camera, &map, &pic_data, &mut buf);
    // a second frame starts from fresh clip state and ends identically
    assert!(renderer.r_data.floorclip.iter().all(|&c| c <= HEIGHT as i32));
}

//! Small frame dumper around the software renderer: pick a built-in demo
//! scene, render it from a rotating eye point and write the frames out as
//! binary PPM with the demo palette applied.

mod cli;

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};

use log::info;
use math::{map_point, Angle, Fixed, ANG90};
use render_soft::SoftwareRenderer;
use render_target::FrameBuffer;
use render_trait::PixelBuffer;
use simplelog::TermLogger;
use world::demo::{demo_palette, demo_pic_data, room_with_sprite, single_room, two_rooms_portal};
use world::Camera;

use crate::cli::{CLIOptions, Scene};

fn main() -> Result<(), Box<dyn Error>> {
    let options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let map = match options.scene {
        Scene::Room => single_room(),
        Scene::Portal => two_rooms_portal(),
        Scene::Sprite => room_with_sprite(),
    };
    let pic_data = demo_pic_data();
    let palette = demo_palette();

    let mut renderer = SoftwareRenderer::new(options.width, options.height)?;
    let mut buffer = FrameBuffer::new(options.width, options.height);

    // the portal scene puts the eye in the near room, facing the window
    let pos = match options.scene {
        Scene::Portal => map_point(256, 64),
        _ => map_point(256, 128),
    };
    let mut camera = Camera::new(pos, Fixed::from_int(41), ANG90);

    let frames = options.frames.max(1);
    let step = Angle::from_bits(((1u64 << 32) / u64::from(frames)) as u32);
    for frame in 0..frames {
        buffer.clear_with(0);
        renderer.render_player_view(&camera, &map, &pic_data, &mut buffer);

        let path = if frames > 1 {
            format!("{}_{frame:03}.ppm", options.output)
        } else {
            format!("{}.ppm", options.output)
        };
        write_ppm(&path, &buffer, &palette)?;
        info!("wrote {path}");
        camera.angle += step;
    }

    Ok(())
}

fn write_ppm(
    path: &str,
    buffer: &FrameBuffer,
    palette: &[[u8; 3]; 256],
) -> Result<(), Box<dyn Error>> {
    let size = buffer.size();
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", size.width(), size.height())?;
    for p in buffer.buf() {
        out.write_all(&palette[*p as usize])?;
    }
    out.flush()?;
    Ok(())
}

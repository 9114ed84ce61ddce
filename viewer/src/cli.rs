use std::str::FromStr;

use argh::FromArgs;
use log::LevelFilter;

/// Render one of the built-in demo scenes to binary PPM images
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<LevelFilter>,
    /// scene to render: room, portal, sprite
    #[argh(option, default = "Scene::Room")]
    pub scene: Scene,
    /// resolution width in pixels
    #[argh(option, default = "320")]
    pub width: usize,
    /// resolution height in pixels
    #[argh(option, default = "200")]
    pub height: usize,
    /// number of frames; the view turns a full circle across them
    #[argh(option, default = "1")]
    pub frames: u32,
    /// output file name, used as a prefix when rendering multiple frames
    #[argh(option, default = "String::from(\"frame\")")]
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Room,
    Portal,
    Sprite,
}

impl FromStr for Scene {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "room" => Ok(Self::Room),
            "portal" => Ok(Self::Portal),
            "sprite" => Ok(Self::Sprite),
            _ => Err(format!("unknown scene {s}, expected room, portal or sprite")),
        }
    }
}

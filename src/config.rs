use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::gpu::DriverType;
use crate::surface::{DEFAULT_CLEAR_COLOR, RenderMode, SurfaceSettings};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PAINTBOX_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "paintbox.toml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError
{
        #[error("unable to read config: {0}")]
        Io(#[from] std::io::Error),

        #[error("invalid config `{}`: {reason}", .path.display())]
        Parse
        {
                path: PathBuf,
                reason: String,
        },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
        pub show_start_message: bool,
        pub show_exit_message: bool,
        pub window: WindowConfig,
        pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig
{
        pub class_name: String,
        pub title: String,
        pub width: u32,
        pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig
{
        pub mode: RenderMode,
        /// Red, green, blue, alpha.
        pub clear_color: [f32; 4],
        pub drivers: Vec<DriverType>,
        pub effect: PathBuf,
        pub technique: String,
        pub vsync: bool,
}

impl Default for Config
{
        fn default() -> Self
        {
                Self {
                        show_start_message: true,
                        show_exit_message: true,
                        window: WindowConfig::default(),
                        render: RenderConfig::default(),
                }
        }
}

impl Default for WindowConfig
{
        fn default() -> Self
        {
                Self {
                        class_name: String::from("PaintboxWindow"),
                        title: String::from("Paintbox"),
                        width: 800,
                        height: 600,
                }
        }
}

impl Default for RenderConfig
{
        fn default() -> Self
        {
                let surface = SurfaceSettings::default();

                Self {
                        mode: surface.mode,
                        clear_color: DEFAULT_CLEAR_COLOR,
                        drivers: surface.drivers,
                        effect: surface.effect_path,
                        technique: surface.technique,
                        vsync: surface.vsync,
                }
        }
}

impl Config
{
        /// Loads the file named by `PAINTBOX_CONFIG`, or `paintbox.toml` in
        /// the working directory.
        pub fn load() -> Result<Self, ConfigError>
        {
                let path = std::env::var_os(CONFIG_ENV)
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

                Self::from_file(&path)
        }

        pub fn from_file(path: &Path) -> Result<Self, ConfigError>
        {
                let text = std::fs::read_to_string(path)?;

                Self::from_toml_str(&text).map_err(|reason| ConfigError::Parse {
                        path: path.to_path_buf(),
                        reason,
                })
        }

        pub fn from_toml_str(text: &str) -> Result<Self, String>
        {
                toml::from_str(text).map_err(|e| e.to_string())
        }

        pub fn surface_settings(&self) -> SurfaceSettings
        {
                SurfaceSettings {
                        mode: self.render.mode,
                        clear_color: self.render.clear_color,
                        drivers: self.render.drivers.clone(),
                        effect_path: self.render.effect.clone(),
                        technique: self.render.technique.clone(),
                        vsync: self.render.vsync,
                }
        }
}

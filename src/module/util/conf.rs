//! Config Handler.

use serde::{Deserialize, Serialize};

/// Provides TOML config file handling.
pub mod toml {

    use super::DEFAULT_CONFIG;
    use crate::module::define;
    use std::fs::File;
    use std::io::prelude::*;
    use std::io::{self, ErrorKind};
    use std::path::Path;

    /// Loads the configuration file from the given directory.
    /// If not found, generates a default config file first.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file is located or should be created.
    ///
    pub fn load(dir: &str) -> io::Result<super::Config> {
        // Check if the config file exists
        let path = Path::new(dir).join(define::path::CONF_FILE);
        let exist: bool = path.is_file();

        if !exist {
            // Create the default config if it doesn't exist
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_CONFIG.as_bytes())?;
        }

        // Load the config
        let conf_str: String = std::fs::read_to_string(&path)?;
        toml::from_str(&conf_str).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }

    /// Saves a configuration file to the given directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file should be saved.
    /// * `conf` - The configuration data to be saved.
    ///
    pub fn save(dir: &str, conf: &super::Config) -> io::Result<()> {
        let toml_str =
            toml::to_string(conf).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        let path = crate::module::util::path::join(&[dir, define::path::CONF_FILE]);
        let mut file = File::create(path)?;
        file.write_all(toml_str.as_bytes())
    }
}

/// Represents the configuration data structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub dataset: Dataset,
    pub camera: Camera,
    pub roi: Roi,
    pub burst: Burst,
}

/// Represents dataset-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Dataset {
    pub root_dir: String,
}

/// Represents camera-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Camera {
    pub video_idx: i8,
    pub width: u16,
    pub height: u16,
    pub timeout_ms: u64,
}

/// Represents the capture region of interest.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Roi {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub off_x: u32,
    pub off_y: u32,
}

/// Represents burst-capture configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Burst {
    pub interval_ms: u64,
    pub max_count: u64,
}

// Default configuration data in TOML format
const DEFAULT_CONFIG: &str = r#"
[dataset]
  root_dir = 'dataset' # Root directory for labeled images

[camera]
  video_idx = 0 # V4L2 device index (/dev/videoN)
  width = 1280 # Capture width
  height = 720 # Capture height
  timeout_ms = 2000 # Max wait for a frame before giving up

[roi]
  enabled = false # Crop captures to the region below
  width = 300 # Crop width
  height = 300 # Crop height
  off_x = 170 # Crop X offset
  off_y = 90 # Crop Y offset

[burst]
  interval_ms = 250 # Default delay between burst captures
  max_count = 50 # Default upper bound of one burst run
"#;

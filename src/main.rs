//! This module defines the main functionality of snaplabel, an interactive
//! collector of labeled camera frames for small supervised-learning datasets.

pub mod module;

use std::sync::Arc;

use crate::module::define;
use crate::module::util::init::resource::init;

pub fn main() {
    // Prepare the resources by initializing the property struct
    let property = init();

    // Initialize the logging system with the log directory and the system name
    init_log(property.path.log.as_str(), define::system::NAME);
    log::info!("Starting snaplabel...");

    // Open the camera and start the frame acquisition thread
    let camera = match module::camera::V4l2Camera::new(&property.conf.camera) {
        Ok(camera) => camera,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // Wire the session to the dataset root and the configured crop region
    let store = module::dataset::DatasetStore::new(&property.conf.dataset.root_dir);
    let roi = property.conf.roi.enabled.then(|| property.conf.roi.clone());
    let session = module::session::CaptureSession::new(Arc::new(camera), Arc::new(store), roi);

    // Run the operator command loop until quit
    module::console::run(&session, &property.conf.burst);
    log::info!("Session ended.");
}

/// This function initializes the logger system using the log4rs crate.
///
/// # Arguments
/// * `dir` - A string slice that holds the directory where the log file will be stored
/// * `name` - A string slice that holds the name of the logger and the log file
///
fn init_log(dir: &str, name: &str) {
    use crate::module::util::path::join;
    use log::LevelFilter;
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{h({d} - {l}: {m}{n})}")))
        .build(join(&[dir, &format!("{}.log", name)]))
        .unwrap();

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(LevelFilter::Info))
        .unwrap();
    log4rs::init_config(config).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{debug, error, info, warn};
    use std::fs;
    use std::path::Path;

    // A simple test case for the init_log function
    #[test]
    fn test_log() {
        let dir = "/tmp/snaplabeltest/log";
        let name = "test_log";

        init_log(dir, name);

        debug!("Debug Message");
        info!("Info Message");
        warn!("Warning Message");
        error!("Error Message");

        let log_file_path = Path::new("/tmp/snaplabeltest/log/test_log.log");
        let log_contents = fs::read_to_string(log_file_path).expect("Failed to read log file");

        // Info level and up reaches the file
        assert!(!log_contents.contains("Debug Message"));
        assert!(log_contents.contains("Info Message"));
        assert!(log_contents.contains("Warning Message"));
        assert!(log_contents.contains("Error Message"));
    }
}

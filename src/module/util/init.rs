//! This module prepares the resources needed by the application, such as directories and configurations.
//!

pub mod resource {
    use super::AppProperty;

    /// Initialize the application resources and return an AppProperty instance
    /// containing paths and configurations.
    ///
    pub fn init() -> AppProperty {
        // Prepare the data and log directories
        let path = crate::module::util::path::dir::create_app_dirs();

        // Load the app configuration file, generating a default one on first run
        let conf = crate::module::util::conf::toml::load(&path.data).expect("Can't load config.");

        AppProperty { path, conf }
    }
}

/// This struct represents the properties of the app, such as paths and configurations.
///
#[derive(Debug, Clone)]
pub struct AppProperty {
    pub path: crate::module::util::path::AppPath, // The paths of the app resources
    pub conf: crate::module::util::conf::Config,  // The configurations of the app
}

//! Path Operations Module
//!
//! This module handles path operations for directories and files.

use std::path::PathBuf;

/// Join Paths
///
/// This function takes a slice of strings as input and joins them into a single path string.
/// It uses the PathBuf type to handle platform-specific separators and conversions.
pub fn join(paths: &[&str]) -> String {
    let mut path: PathBuf = PathBuf::new();
    for p in paths {
        path.push(p);
    }
    path.into_os_string().into_string().unwrap()
}

pub mod dir {
    //! Directory Operations Submodule

    use std::fs;
    use std::path::Path;

    use super::AppPath;
    use crate::module::define;

    /// Create Directory from Path List
    ///
    /// Joins the given path segments and creates the resulting directory.
    /// Returns `Some(path)` if the directory creation succeeds, or `None` if it fails.
    pub fn create_dir_from_path_list(paths: &[&str]) -> Option<String> {
        let path = super::join(paths);
        match fs::create_dir_all(Path::new(&path)) {
            Ok(_) => Some(path),
            Err(_) => None,
        }
    }

    /// Create Application Directories
    ///
    /// Ensures the data directory and its log subdirectory exist and
    /// returns an `AppPath` with both locations. Panics if they cannot
    /// be created, since nothing can run without them.
    pub fn create_app_dirs() -> AppPath {
        let data = match create_dir_from_path_list(&[define::path::DATA_DIR]) {
            Some(path) => path,
            None => panic!("Can't Create Data Dir."),
        };
        let log = match create_dir_from_path_list(&[&data, define::path::LOG_DIR]) {
            Some(path) => path,
            None => panic!("Can't Create Log Dir."),
        };
        AppPath { data, log }
    }
}

/// Paths of Directories
///
/// This struct represents the paths of the directories used by the application.
#[derive(Debug, Clone)]
pub struct AppPath {
    /// Data Directory Path (config file lives here)
    pub data: String,
    /// Log Directory Path
    pub log: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_create_dir_from_path_list() {
        dir::create_dir_from_path_list(&["/tmp", "snaplabeltest", "test_create_dir_from_path_list"]);

        // Assert that the directory was created
        assert!(Path::new("/tmp/snaplabeltest/test_create_dir_from_path_list").is_dir());
    }

    #[test]
    fn test_path_join() {
        assert_eq!(join(&["/test/", "test"]), "/test/test");
        assert_eq!(join(&["test", "test", "test"]), "test/test/test");
        assert_eq!(
            join(&["./test/", "test/", "test.txt"]),
            "./test/test/test.txt"
        );
    }
}

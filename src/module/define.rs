//! Definition of constants.
//!

/// System constants.
pub mod system {
    /// System name. Used for the log file and the config file stem.
    pub const NAME: &str = "snaplabel";
}

/// Path constants.
pub mod path {
    /// Directory holding the config file and the log directory.
    pub const DATA_DIR: &str = ".";
    /// Config file name.
    pub const CONF_FILE: &str = "snaplabel.toml";
    /// Log directory name.
    pub const LOG_DIR: &str = "log";
}

/// Capture constants.
pub mod capture {
    /// On-disk image format extension.
    pub const IMG_EXT: &str = "png";
    /// Width of the zero-padded sequence number. Lexicographic and
    /// numeric order coincide as long as counts stay below 10^6.
    pub const SEQ_WIDTH: usize = 6;
}

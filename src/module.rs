//! Application modules.

pub mod camera;
pub mod console;
pub mod dataset;
pub mod define;
pub mod error;
pub mod session;
pub mod util;

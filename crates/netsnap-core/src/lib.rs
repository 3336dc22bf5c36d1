pub mod config;
pub mod logging;

pub mod format;
pub mod har;
pub mod session;
pub mod store;
pub mod viewer;

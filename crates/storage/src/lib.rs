//! On-disk state: the flat config file and the icon cache.

pub mod config;
pub mod env_file;
pub mod icons;
pub mod paths;

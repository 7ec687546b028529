use std::path::PathBuf;

use directories::ProjectDirs;

pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("io", "github", "roku-remote")
        .ok_or_else(|| anyhow::anyhow!("unable to determine platform data directories"))
}

/// Directory for user-writable application data (icon cache).
pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_icon_dir() -> PathBuf {
    data_dir()
        .map(|d| d.join("icons"))
        .unwrap_or_else(|_| PathBuf::from("remote_control_icons"))
}

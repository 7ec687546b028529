//! Flat `KEY=VALUE` config file.
//!
//! No quoting or escaping: everything after the first `=` is the value.
//! Comments and blank lines are skipped on load and dropped on save.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

pub const ENV_PATH_VAR: &str = "ROKU_REMOTE_ENV";
const FILE_NAME: &str = ".env";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        let mut out = Self::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            out.set(key.trim(), value.trim());
        }
        out
    }

    /// A missing file loads as empty.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Self::parse(&raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found; using defaults");
                Ok(Self::new())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(k);
            out.push('=');
            out.push_str(v);
            out.push('\n');
        }
        out
    }

    /// Replace the whole file via a uniquely named temp file in the same
    /// directory; readers see either the old or the new contents.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(self.render().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| anyhow::anyhow!("failed to replace {}: {}", path.display(), e.error))?;
        debug!(path = %path.display(), entries = self.len(), "config file written");
        Ok(())
    }
}

/// Where the config file lives.
///
/// `$ROKU_REMOTE_ENV` if set, else the nearest `.env` in the current
/// directory or one of its ancestors, else `./.env`.
pub fn locate() -> PathBuf {
    if let Some(p) = std::env::var_os(ENV_PATH_VAR) {
        return PathBuf::from(p);
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upwards(&cwd).unwrap_or_else(|| cwd.join(FILE_NAME))
}

fn find_upwards(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(FILE_NAME))
        .find(|candidate| candidate.is_file())
}

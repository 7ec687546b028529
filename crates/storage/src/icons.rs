//! Disk cache of app icons: `<dir>/app<id>.png`.
//!
//! A file's existence is the only check. Nothing expires; bytes are written
//! exactly as the device sent them.

use std::fs;
use std::path::{Path, PathBuf};

use ecp::{EcpError, IconSource};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct IconCache {
    dir: PathBuf,
}

impl IconCache {
    /// Creates `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn icon_path(&self, app_id: &str) -> PathBuf {
        self.dir.join(format!("app{app_id}.png"))
    }

    pub fn cached(&self, app_id: &str) -> Option<PathBuf> {
        let path = self.icon_path(app_id);
        path.exists().then_some(path)
    }

    /// Cached path, or fetch once from the device at `ip` and store it.
    ///
    /// `Ok(None)` when the device answered with a non-success status.
    pub async fn ensure(
        &self,
        source: &dyn IconSource,
        ip: &str,
        app_id: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = self.cached(app_id) {
            info!(path = %path.display(), "loaded icon from cache");
            return Ok(Some(path));
        }

        let bytes = match source.icon(ip, app_id).await {
            Ok(bytes) => bytes,
            Err(EcpError::Status(code)) => {
                warn!(%ip, app_id, code, "icon failed to save");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let path = self.icon_path(app_id);
        fs::write(&path, &bytes)?;
        info!(path = %path.display(), size = bytes.len(), "saved icon");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct FakeIcons {
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl FakeIcons {
        fn ok() -> Self {
            Self {
                status: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IconSource for FakeIcons {
        async fn icon(&self, _ip: &str, app_id: &str) -> Result<Vec<u8>, EcpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(code) => Err(EcpError::Status(code)),
                None => Ok(format!("png-{app_id}").into_bytes()),
            }
        }
    }

    #[test]
    fn path_convention() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path().join("icons")).unwrap();
        assert!(cache.dir().is_dir());
        assert_eq!(
            cache.icon_path("12"),
            dir.path().join("icons").join("app12.png")
        );
        assert_eq!(cache.cached("12"), None);
    }

    #[tokio::test]
    async fn fetches_once_then_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path()).unwrap();
        let src = FakeIcons::ok();

        let first = cache.ensure(&src, "10.0.0.2", "12").await.unwrap().unwrap();
        assert_eq!(fs::read(&first).unwrap(), b"png-12");

        let second = cache.ensure(&src, "10.0.0.3", "12").await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_status_yields_none_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path()).unwrap();
        let src = FakeIcons {
            status: Some(404),
            calls: AtomicUsize::new(0),
        };

        assert_eq!(cache.ensure(&src, "10.0.0.2", "99").await.unwrap(), None);
        assert!(!cache.icon_path("99").exists());
    }
}

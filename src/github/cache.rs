use crate::error::{Result, TrendingError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Age after which a cached README is ignored (7 days)
pub const README_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// File-per-repository cache of README documents.
///
/// The file modification time is the fetch timestamp. Expired files stay on
/// disk and are simply ignored until the next `put` overwrites them.
pub struct ReadmeCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ReadmeCache {
    /// Open a cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: README_CACHE_TTL,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for a repository identifier (`owner/name` -> `owner__name.md`)
    pub fn path_for(&self, full_name: &str) -> PathBuf {
        self.dir.join(format!("{}.md", full_name.replace('/', "__")))
    }

    /// Cached README if present and fresh; unreadable entries count as misses
    pub fn get(&self, full_name: &str) -> Option<String> {
        match self.try_get(full_name) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(repo = full_name, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Like `get`, but reports unreadable entries as `CacheRead`
    pub fn try_get(&self, full_name: &str) -> Result<Option<String>> {
        let path = self.path_for(full_name);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(TrendingError::CacheRead { path, source }),
        };

        let modified = metadata
            .modified()
            .map_err(|source| TrendingError::CacheRead {
                path: path.clone(),
                source,
            })?;

        if !self.is_fresh(modified, SystemTime::now()) {
            debug!(repo = full_name, "Cached README expired");
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| TrendingError::CacheRead { path, source })
    }

    /// Store a README, replacing any previous entry
    pub fn put(&self, full_name: &str, text: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(full_name), text)?;
        Ok(())
    }

    /// Whether an entry written at `modified` is still valid at `now`
    fn is_fresh(&self, modified: SystemTime, now: SystemTime) -> bool {
        match now.duration_since(modified) {
            Ok(age) => age < self.ttl,
            // mtime in the future: clock skew, treat as just written
            Err(_) => true,
        }
    }

    /// Remove the whole cache directory
    pub fn clear(&self) -> Result<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.dir)?;
        Ok(true)
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        if !self.dir.exists() {
            return Ok(stats);
        }

        let now = SystemTime::now();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            stats.total_entries += 1;
            stats.size_bytes += metadata.len();
            if metadata
                .modified()
                .map(|m| self.is_fresh(m, now))
                .unwrap_or(false)
            {
                stats.fresh_entries += 1;
            }
        }

        Ok(stats)
    }
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub size_bytes: u64,
}

impl CacheStats {
    /// Format size in human-readable format
    pub fn format_size(&self) -> String {
        let bytes = self.size_bytes;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.2} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn backdate(path: &Path, age: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_path_for_flattens_identifier() {
        let cache = ReadmeCache::new("/tmp/cache");
        assert_eq!(
            cache.path_for("rust-lang/rust"),
            PathBuf::from("/tmp/cache/rust-lang__rust.md")
        );
    }

    #[test]
    fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path().join("readme"));

        cache.put("owner/repo", "# Title\nBody").unwrap();
        assert_eq!(cache.get("owner/repo").as_deref(), Some("# Title\nBody"));
    }

    #[test]
    fn test_missing_entry_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path());
        assert!(cache.get("owner/none").is_none());
        assert!(cache.try_get("owner/none").unwrap().is_none());
    }

    #[test]
    fn test_expired_entry_is_absent_but_kept_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path());

        cache.put("owner/repo", "old readme").unwrap();
        let path = cache.path_for("owner/repo");
        backdate(&path, README_CACHE_TTL + Duration::from_secs(60));

        assert!(cache.get("owner/repo").is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_put_refreshes_expired_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path());

        cache.put("owner/repo", "old").unwrap();
        backdate(&cache.path_for("owner/repo"), README_CACHE_TTL * 2);
        cache.put("owner/repo", "new").unwrap();

        assert_eq!(cache.get("owner/repo").as_deref(), Some("new"));
    }

    #[test]
    fn test_entry_just_inside_window_is_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path());

        cache.put("owner/repo", "readme").unwrap();
        backdate(
            &cache.path_for("owner/repo"),
            README_CACHE_TTL - Duration::from_secs(3600),
        );

        assert!(cache.get("owner/repo").is_some());
    }

    #[test]
    fn test_unreadable_entry_is_cache_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path());

        // A directory where the file should be cannot be read as text
        fs::create_dir_all(cache.path_for("owner/broken")).unwrap();

        assert!(matches!(
            cache.try_get("owner/broken"),
            Err(TrendingError::CacheRead { .. })
        ));
        assert!(cache.get("owner/broken").is_none());
    }

    #[test]
    fn test_stats_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ReadmeCache::new(temp_dir.path().join("readme"));

        assert_eq!(cache.stats().unwrap().total_entries, 0);

        cache.put("a/one", "one").unwrap();
        cache.put("b/two", "two").unwrap();
        backdate(&cache.path_for("b/two"), README_CACHE_TTL * 2);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.fresh_entries, 1);
        assert_eq!(stats.size_bytes, 6);

        assert!(cache.clear().unwrap());
        assert!(!cache.dir().exists());
        assert!(!cache.clear().unwrap());
    }

    #[test]
    fn test_format_size() {
        let stats = CacheStats {
            total_entries: 1,
            fresh_entries: 1,
            size_bytes: 2048,
        };
        assert_eq!(stats.format_size(), "2.00 KB");
    }
}

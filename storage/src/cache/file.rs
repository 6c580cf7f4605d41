//! Shard store persisted as one JSON file per shard.

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{ShardKey, ShardMap, ShardStore};

/// [`ShardStore`] writing `<dir>/<shard>.json`.
///
/// Unreadable or corrupt files read as misses. Writes go to a uniquely named
/// temporary file that is then renamed over the shard file, so concurrent
/// writers race on the rename only and the last one wins.
#[derive(Debug, Clone)]
pub struct FileShardStore {
    dir: PathBuf,
}

impl FileShardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn shard_path(&self, key: ShardKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_shard(&self, key: ShardKey, shard: &ShardMap) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut staging = tempfile::Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".json.tmp")
            .tempfile_in(&self.dir)?;
        staging.write_all(&serde_json::to_vec(shard)?)?;
        staging.persist(self.shard_path(key))?;
        Ok(())
    }
}

impl ShardStore for FileShardStore {
    fn get(&self, key: ShardKey) -> Option<ShardMap> {
        let path = self.shard_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read cache shard");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(shard) => Some(shard),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache shard");
                None
            }
        }
    }

    fn put(&self, key: ShardKey, shard: ShardMap) {
        if let Err(e) = self.write_shard(key, &shard) {
            warn!(
                dir = %self.dir.display(),
                shard = %key,
                error = %e,
                "failed to write cache shard"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShardStore::new(dir.path());
        let key = ShardKey::for_path("media/a.png");

        assert!(store.get(key).is_none());
        store.put(key, ShardMap::from([("media/a.png".to_owned(), true)]));

        let reopened = FileShardStore::new(dir.path());
        assert_eq!(reopened.get(key).unwrap().get("media/a.png"), Some(&true));
        assert!(dir.path().join(format!("{key}.json")).exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShardStore::new(dir.path().join("nested/cache"));
        let key = ShardKey::for_path("x");

        store.put(key, ShardMap::from([("x".to_owned(), true)]));
        assert!(store.get(key).is_some());
    }

    #[test]
    fn test_corrupt_shard_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShardStore::new(dir.path());
        let key = ShardKey::for_path("x");

        fs::write(dir.path().join(format!("{key}.json")), b"{not json").unwrap();
        assert!(store.get(key).is_none());
    }

    #[test]
    fn test_concurrent_writers_leave_a_valid_shard() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShardStore::new(dir.path());
        let key = ShardKey::for_path("shared");

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for round in 0..50 {
                        let path = format!("writer-{writer}/round-{round}");
                        store.put(key, ShardMap::from([(path, true)]));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let shard = store.get(key).expect("shard should parse after concurrent writes");
        assert_eq!(shard.len(), 1);
        assert!(shard.keys().all(|path| path.ends_with("round-49")));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, [format!("{key}.json")]);
    }

    #[test]
    fn test_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShardStore::new(dir.path());
        store.put(ShardKey::for_path("x"), ShardMap::new());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
        assert!(!names[0].starts_with('.'));
    }
}

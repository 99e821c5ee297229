//! Filesystem record store scoped to a single directory capability.
//!
//! Each key maps to one file. Key characters outside `[A-Za-z0-9._-]` are
//! percent-encoded, so `staircase:letter:final:v1` is stored as
//! `staircase%3Aletter%3Afinal%3Av1.json`. Writes go to a temporary file
//! that is flushed to disk and then renamed over the target, giving per-key
//! atomic replacement.

use crate::subtask::{
    domain::RecordKey,
    ports::{LocalRecordStore, RecordStoreError, RecordStoreResult},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::{self, ErrorKind, Write};
use std::sync::Arc;

const RECORD_SUFFIX: &str = ".json";
const TEMP_SUFFIX: &str = ".tmp";

/// Record store persisting one JSON file per key.
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    dir: Arc<Dir>,
}

impl FsRecordStore {
    /// Opens an existing directory as the store root.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError`] when the directory cannot be opened.
    pub fn open(path: &Utf8Path) -> RecordStoreResult<Self> {
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(RecordStoreError::persistence)?;
        Ok(Self::from_dir(dir))
    }

    /// Uses an already-opened directory capability as the store root.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }
}

/// Maps a record key to its file name.
#[must_use]
pub fn file_name_for(key: &RecordKey) -> String {
    let mut name = String::with_capacity(key.as_str().len() + RECORD_SUFFIX.len());
    for byte in key.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            name.push(char::from(byte));
        } else {
            name.push('%');
            for nibble in [byte >> 4, byte & 0x0F] {
                if let Some(digit) = char::from_digit(u32::from(nibble), 16) {
                    name.push(digit.to_ascii_uppercase());
                }
            }
        }
    }
    name.push_str(RECORD_SUFFIX);
    name
}

fn write_synced(dir: &Dir, name: &str, contents: &[u8]) -> io::Result<()> {
    let mut file = dir.create(name)?;
    file.write_all(contents)?;
    file.sync_all()
}

async fn run_blocking<F, T>(f: F) -> RecordStoreResult<T>
where
    F: FnOnce() -> RecordStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(RecordStoreError::persistence)?
}

#[async_trait]
impl LocalRecordStore for FsRecordStore {
    async fn get(&self, key: &RecordKey) -> RecordStoreResult<Option<String>> {
        let dir = Arc::clone(&self.dir);
        let file_name = file_name_for(key);
        tracing::debug!(key = %key, file = %file_name, "reading record file");
        run_blocking(move || match dir.read_to_string(&file_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RecordStoreError::persistence(err)),
        })
        .await
    }

    async fn put(&self, key: &RecordKey, value: String) -> RecordStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let file_name = file_name_for(key);
        tracing::debug!(key = %key, file = %file_name, "writing record file");
        run_blocking(move || {
            let temp_name = format!("{file_name}{TEMP_SUFFIX}");
            write_synced(&dir, &temp_name, value.as_bytes())
                .map_err(RecordStoreError::persistence)?;
            dir.rename(&temp_name, &dir, &file_name)
                .map_err(RecordStoreError::persistence)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::{FsRecordStore, file_name_for};
    use crate::subtask::{
        domain::{FeatureNamespace, RecordKey, TaskInstance, TaskKey},
        ports::LocalRecordStore,
    };
    use camino::Utf8Path;
    use eyre::{Result, eyre};

    fn key(task: &str) -> Result<RecordKey> {
        let instance = TaskInstance::new(TaskKey::new(task)?);
        Ok(RecordKey::final_record(
            &FeatureNamespace::default(),
            &instance,
            1,
        ))
    }

    #[test]
    fn file_names_escape_separators() -> Result<()> {
        assert_eq!(
            file_name_for(&key("letter_writing")?),
            "staircase%3Aletter_writing%3Afinal%3Av1.json"
        );
        let scoped = TaskInstance::scoped(TaskKey::new("closing")?, "letter-1")?;
        let scoped_key = RecordKey::final_record(&FeatureNamespace::default(), &scoped, 2);
        assert_eq!(
            file_name_for(&scoped_key),
            "staircase%3Aclosing%2Fletter-1%3Afinal%3Av2.json"
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn values_survive_reopening_the_directory() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = Utf8Path::from_path(temp.path()).ok_or_else(|| eyre!("non-UTF-8 temp dir"))?;
        let record_key = key("letter_writing")?;

        let store = FsRecordStore::open(root)?;
        assert_eq!(store.get(&record_key).await?, None);
        store.put(&record_key, "{\"version\":1}".to_owned()).await?;

        let reopened = FsRecordStore::open(root)?;
        assert_eq!(
            reopened.get(&record_key).await?.as_deref(),
            Some("{\"version\":1}")
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn put_replaces_previous_value_without_leaving_temp_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = Utf8Path::from_path(temp.path()).ok_or_else(|| eyre!("non-UTF-8 temp dir"))?;
        let record_key = key("commitment")?;
        let store = FsRecordStore::open(root)?;

        store.put(&record_key, "first".to_owned()).await?;
        store.put(&record_key, "second".to_owned()).await?;

        assert_eq!(store.get(&record_key).await?.as_deref(), Some("second"));
        let leftovers = std::fs::read_dir(temp.path())?
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn leftover_temp_file_from_a_crash_is_replaced() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = Utf8Path::from_path(temp.path()).ok_or_else(|| eyre!("non-UTF-8 temp dir"))?;
        let record_key = key("role_definition")?;
        let leftover = temp.path().join(format!("{}.tmp", file_name_for(&record_key)));
        std::fs::write(&leftover, "a much longer half-written record body")?;
        let store = FsRecordStore::open(root)?;

        store.put(&record_key, "short".to_owned()).await?;

        assert_eq!(store.get(&record_key).await?.as_deref(), Some("short"));
        assert!(!leftover.exists());
        Ok(())
    }
}

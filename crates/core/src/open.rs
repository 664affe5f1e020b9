use std::path::Path;

use crate::error::AtomicFileError;
use crate::mode::OpenMode;
use crate::options::AtomicFileOptions;
use crate::writer::AtomicFile;

/// 驗證模式字串後開啟原子寫入器。 / Opens an atomic writer after validating a mode string.
///
/// `mode` must be `"w"`/`"wt"` (text) or `"wb"` (binary). Invalid modes and
/// unknown encoding labels fail with [`AtomicFileError::Config`] before any
/// file, temporary or otherwise, is created.
pub fn open_atomic(
    path: impl AsRef<Path>,
    mode: &str,
    encoding: Option<&str>,
) -> Result<AtomicFile, AtomicFileError> {
    let mode: OpenMode = mode.parse()?;
    let mut options = AtomicFileOptions::new(mode);
    if let Some(label) = encoding {
        options = options.with_encoding(label);
    }
    AtomicFile::with_options(path, &options)
}

/// 開啟寫入器並在範圍內執行 `body`，成功時提交、失敗時捨棄。 / Opens a writer and runs `body` in scope, committing on success and abandoning on error.
pub fn with_atomic<T, E, F>(path: impl AsRef<Path>, mode: OpenMode, body: F) -> Result<T, E>
where
    F: FnOnce(&mut AtomicFile) -> Result<T, E>,
    E: From<AtomicFileError>,
{
    let mut file = AtomicFile::new(path, mode)?;
    file.scope(body)
}

/// 一次性以原子方式寫入整個內容。 / Atomically replaces `path` with `contents` in one call.
pub fn write_atomic(
    path: impl AsRef<Path>,
    contents: impl AsRef<[u8]>,
) -> Result<(), AtomicFileError> {
    let mut file = AtomicFile::new(path, OpenMode::BinaryWrite)?;
    file.write_bytes(contents.as_ref())?;
    file.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::TextEncoding;
    use std::fs;

    #[test]
    fn open_atomic_rejects_append_mode_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_atomic(dir.path().join("x.txt"), "a", None).unwrap_err();
        assert!(matches!(
            err,
            AtomicFileError::Config(ConfigError::InvalidMode(ref mode)) if mode == "a"
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn open_atomic_rejects_unknown_encoding_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_atomic(dir.path().join("x.txt"), "w", Some("nope")).unwrap_err();
        assert!(err.is_config());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn open_atomic_applies_encoding_label() {
        let dir = tempfile::tempdir().unwrap();
        let file = open_atomic(dir.path().join("x.txt"), "w", Some("utf-16be")).unwrap();
        assert_eq!(file.mode(), OpenMode::TextWrite);
        assert_eq!(file.encoding(), TextEncoding::Utf16Be);
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.json");
        fs::write(&target, b"{\"old\":true}").unwrap();

        write_atomic(&target, "{\"new\":true}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"new\":true}");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn with_atomic_returns_body_value() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("count.txt");

        let written = with_atomic(&target, OpenMode::TextWrite, |file| {
            file.write_text("three")?;
            Ok::<_, AtomicFileError>(3)
        })
        .unwrap();

        assert_eq!(written, 3);
        assert_eq!(fs::read_to_string(&target).unwrap(), "three");
    }
}

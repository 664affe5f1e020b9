use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::{Builder, NamedTempFile};

use crate::encoding::TextEncoding;
use crate::error::AtomicFileError;
use crate::mode::OpenMode;
use crate::options::AtomicFileOptions;
use crate::permissions;

const TEMP_SUFFIX: &str = ".tmp";

/// 寫入器關閉的方式。 / How a writer reached its closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 暫存檔已重新命名為目標檔。 / The temporary file was renamed over the target.
    Committed,
    /// 暫存檔已捨棄，目標檔未變動。 / The temporary file was discarded; the target is untouched.
    Abandoned,
}

#[derive(Debug)]
enum State {
    Open(BufWriter<NamedTempFile>),
    Closed(Outcome),
}

/// 先寫入同目錄暫存檔，關閉時才以重新命名原子取代目標檔的寫入器。 / A file-like writer that stages bytes in a sibling temporary file and atomically renames it over the target on close.
///
/// Readers of the target path observe either the previous contents or the
/// complete new contents, never a partial write. Dropping an open writer
/// discards the staged bytes.
///
/// Concurrent writers aimed at the same target are not coordinated: the last
/// rename to complete wins. Temporary names come from `tempfile`'s random
/// suffixes and are not hardened against hostile shared directories.
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    temp_path: PathBuf,
    mode: OpenMode,
    encoding: Option<TextEncoding>,
    sync_on_commit: bool,
    state: State,
}

impl AtomicFile {
    /// 以預設選項建立寫入器並在目標目錄建立暫存檔。 / Creates a writer with default options, creating the temp file next to the target.
    pub fn new(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, AtomicFileError> {
        Self::with_options(path, &AtomicFileOptions::new(mode))
    }

    /// 依設定建立寫入器；設定錯誤會在建立任何檔案之前回報。 / Creates a writer from options; configuration errors surface before any file is created.
    pub fn with_options(
        path: impl AsRef<Path>,
        options: &AtomicFileOptions,
    ) -> Result<Self, AtomicFileError> {
        let encoding = options.resolve_encoding()?;
        let target = path.as_ref().to_path_buf();
        let temp = create_sibling_temp(&target)?;
        let temp_path = temp.path().to_path_buf();
        debug!(
            "staging {} for {} (mode {})",
            temp_path.display(),
            target.display(),
            options.mode
        );

        Ok(Self {
            target,
            temp_path,
            mode: options.mode,
            encoding,
            sync_on_commit: options.sync_on_commit,
            state: State::Open(BufWriter::new(temp)),
        })
    }

    /// 目標檔路徑。 / The target path.
    pub fn path(&self) -> &Path {
        &self.target
    }

    /// 暫存檔路徑；關閉後回傳 `None`。 / The staging path while open, `None` once closed.
    pub fn temp_path(&self) -> Option<&Path> {
        match self.state {
            State::Open(_) => Some(&self.temp_path),
            State::Closed(_) => None,
        }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// 文字寫入使用的編碼，未指定時為 UTF-8。 / Encoding used for text writes, UTF-8 unless configured.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding.unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            State::Open(_) => None,
            State::Closed(outcome) => Some(outcome),
        }
    }

    /// 附加位元組到暫存檔。 / Appends bytes to the staged contents.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), AtomicFileError> {
        self.staged_mut()?.write_all(data)?;
        Ok(())
    }

    /// 以設定的編碼轉換文字後附加到暫存檔。 / Encodes text with the configured encoding and appends it.
    ///
    /// Binary writers only transcode when an encoding was configured
    /// explicitly; otherwise the UTF-8 bytes of `text` pass through.
    pub fn write_text(&mut self, text: &str) -> Result<(), AtomicFileError> {
        let encoding = self.encoding();
        let writer = self.staged_mut()?;
        let encoded = encoding.encode(text)?;
        writer.write_all(&encoded)?;
        Ok(())
    }

    /// 提交：關閉暫存檔、複製權限並重新命名為目標檔。 / Commits: closes the temp file, copies permissions and renames it over the target.
    ///
    /// The writer is closed afterwards whether or not the commit succeeded. On
    /// failure the temporary file is removed and the target is left as it was.
    pub fn close(&mut self) -> Result<(), AtomicFileError> {
        let writer = match mem::replace(&mut self.state, State::Closed(Outcome::Abandoned)) {
            State::Open(writer) => writer,
            closed @ State::Closed(_) => {
                self.state = closed;
                return Err(AtomicFileError::Closed);
            }
        };

        if let Err(err) = self.commit(writer) {
            debug!("commit of {} failed: {err}", self.target.display());
            return Err(err);
        }
        self.state = State::Closed(Outcome::Committed);
        debug!(
            "committed {} -> {}",
            self.temp_path.display(),
            self.target.display()
        );
        Ok(())
    }

    // 暫存檔在此處任何錯誤時都由 NamedTempFile/TempPath 的 Drop 移除。 / Any early return drops the NamedTempFile/TempPath, which removes the temp file.
    fn commit(&self, writer: BufWriter<NamedTempFile>) -> Result<(), AtomicFileError> {
        let temp = writer.into_inner().map_err(|err| err.into_error())?;
        if self.sync_on_commit {
            temp.as_file().sync_all()?;
        }
        let temp_path = temp.into_temp_path();

        if let Some(original) = permissions::capture(&self.target)? {
            permissions::apply(&temp_path, original)?;
        }

        temp_path.persist(&self.target).map_err(|err| err.error)?;
        Ok(())
    }

    /// 捨棄暫存內容而不觸碰目標檔；對已關閉的寫入器不做任何事。 / Discards staged contents without touching the target; a no-op once closed.
    pub fn abandon(&mut self) -> Result<(), AtomicFileError> {
        match mem::replace(&mut self.state, State::Closed(Outcome::Abandoned)) {
            State::Open(writer) => {
                // Buffered bytes are dropped unflushed.
                let (temp, _) = writer.into_parts();
                temp.close()?;
                debug!("abandoned {}", self.temp_path.display());
                Ok(())
            }
            closed @ State::Closed(_) => {
                self.state = closed;
                Ok(())
            }
        }
    }

    /// 在範圍內使用寫入器：成功時提交，失敗時捨棄並傳回原錯誤。 / Runs `body` against the writer, committing on `Ok` and abandoning on `Err`.
    ///
    /// If `body` already closed or abandoned the writer, a successful return
    /// leaves it as is. Once the scope ends every further `write_*` or
    /// `close` fails with [`AtomicFileError::Closed`].
    pub fn scope<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<AtomicFileError>,
    {
        match body(self) {
            Ok(value) => {
                if !self.is_closed() {
                    self.close()?;
                }
                Ok(value)
            }
            Err(err) => {
                if let Err(cleanup) = self.abandon() {
                    warn!(
                        "failed to remove {} after scope error: {cleanup}",
                        self.temp_path.display()
                    );
                }
                Err(err)
            }
        }
    }

    fn staged_mut(&mut self) -> Result<&mut BufWriter<NamedTempFile>, AtomicFileError> {
        match &mut self.state {
            State::Open(writer) => Ok(writer),
            State::Closed(_) => Err(AtomicFileError::Closed),
        }
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged_mut()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(err) = self.abandon() {
            warn!(
                "failed to remove temporary file {}: {err}",
                self.temp_path.display()
            );
        }
    }
}

fn create_sibling_temp(target: &Path) -> io::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = OsString::from(".");
    if let Some(name) = target.file_name() {
        prefix.push(name);
        prefix.push(".");
    }

    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(TEMP_SUFFIX);
    if let Some(mode) = permissions::default_create_permissions() {
        builder.permissions(mode);
    }
    builder.tempfile_in(dir)
}

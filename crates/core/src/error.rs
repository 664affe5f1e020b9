use std::io;

use thiserror::Error;

/// 建構寫入器時的設定錯誤，在觸碰檔案系統之前就會回報。 / Configuration errors, reported before the filesystem is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid mode {0:?}: expected \"w\" (text write) or \"wb\" (binary write)")]
    InvalidMode(String),
    #[error("unknown text encoding {0:?}")]
    UnknownEncoding(String),
}

/// 原子寫入過程中可能發生的錯誤。 / Errors that can occur while staging or committing an atomic write.
#[derive(Error, Debug)]
pub enum AtomicFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O operation on closed file")]
    Closed,
    #[error("text cannot be represented in target encoding {0}")]
    Unrepresentable(&'static str),
}

impl AtomicFileError {
    /// 是否為對已關閉寫入器的操作。 / Whether the error reports use of an already closed writer.
    pub fn is_closed(&self) -> bool {
        matches!(self, AtomicFileError::Closed)
    }

    pub fn is_config(&self) -> bool {
        matches!(self, AtomicFileError::Config(_))
    }
}

impl From<AtomicFileError> for io::Error {
    fn from(err: AtomicFileError) -> Self {
        match err {
            AtomicFileError::Io(inner) => inner,
            AtomicFileError::Config(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            AtomicFileError::Unrepresentable(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            AtomicFileError::Closed => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}

pub mod encoding;
pub mod error;
pub mod mode;
mod open;
pub mod options;
mod permissions;
pub mod writer;

pub use encoding::TextEncoding;
pub use error::{AtomicFileError, ConfigError};
pub use mode::OpenMode;
pub use open::{open_atomic, with_atomic, write_atomic};
pub use options::AtomicFileOptions;
pub use writer::{AtomicFile, Outcome};

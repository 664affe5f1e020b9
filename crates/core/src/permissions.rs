//! 權限位元的擷取與套用。 / Capturing and re-applying permission bits.
//!
//! Unix copies the full mode; Windows only exposes the read-only flag, so that
//! is all that survives a replacement there.

use std::fs::{self, Permissions};
use std::io::{self, ErrorKind};
use std::path::Path;

/// 讀取目標檔案目前的權限；檔案不存在時回傳 `None`。 / Reads the target's current permissions, `None` when it does not exist.
pub(crate) fn capture(target: &Path) -> io::Result<Option<Permissions>> {
    match fs::metadata(target) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

pub(crate) fn apply(path: &Path, permissions: Permissions) -> io::Result<()> {
    fs::set_permissions(path, permissions)
}

/// 新暫存檔的建立權限：`0o666`，再由 umask 過濾。 / Creation mode for new temp files: `0o666`, filtered by the process umask.
#[cfg(unix)]
pub(crate) fn default_create_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
pub(crate) fn default_create_permissions() -> Option<Permissions> {
    None
}

use serde::{Deserialize, Serialize};

use crate::encoding::TextEncoding;
use crate::error::ConfigError;
use crate::mode::OpenMode;

/// 原子寫入器的設定，可從 JSON 等設定檔反序列化。 / Settings for an atomic writer; deserializable from settings documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicFileOptions {
    #[serde(default)]
    pub mode: OpenMode,
    /// WHATWG 編碼標籤；`None` 代表 UTF-8。 / WHATWG encoding label; `None` means UTF-8.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// 重新命名前是否先 fsync 暫存檔。 / Whether the temporary file is fsynced before the rename.
    #[serde(default = "default_true")]
    pub sync_on_commit: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AtomicFileOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::default(),
            encoding: None,
            sync_on_commit: true,
        }
    }
}

impl AtomicFileOptions {
    pub fn new(mode: OpenMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// 解析設定的編碼標籤；未設定時回傳 `None`。 / Resolves the configured label, `None` when unset.
    pub fn resolve_encoding(&self) -> Result<Option<TextEncoding>, ConfigError> {
        self.encoding
            .as_deref()
            .map(TextEncoding::from_label)
            .transpose()
    }
}

use std::borrow::Cow;

use encoding_rs::{Encoding as RsEncoding, REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{AtomicFileError, ConfigError};

/// 文字模式寫入時使用的編碼。 / Encoding applied to text written through the atomic writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    /// 由 `encoding_rs` 提供的單位元組或多位元組傳統編碼。 / A legacy single- or multi-byte encoding backed by `encoding_rs`.
    Legacy(&'static RsEncoding),
}

impl TextEncoding {
    /// 依 WHATWG 標籤解析編碼（例如 `utf-8`、`latin1`、`shift_jis`）。 / Resolves an encoding from a WHATWG label such as `utf-8`, `latin1` or `shift_jis`.
    pub fn from_label(label: &str) -> Result<Self, ConfigError> {
        RsEncoding::for_label(label.trim().as_bytes())
            .filter(|encoding| *encoding != REPLACEMENT)
            .map(Self::from_rs)
            .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
    }

    fn from_rs(encoding: &'static RsEncoding) -> Self {
        if encoding == UTF_8 {
            TextEncoding::Utf8
        } else if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Legacy(encoding) => encoding.name(),
        }
    }

    /// 將文字轉為目標編碼的位元組；UTF-8 不複製。 / Encodes text into bytes for this encoding, borrowing for UTF-8.
    pub fn encode(self, text: &str) -> Result<Cow<'_, [u8]>, AtomicFileError> {
        match self {
            TextEncoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            TextEncoding::Utf16Le => Ok(Cow::Owned(encode_utf16(text, false))),
            TextEncoding::Utf16Be => Ok(Cow::Owned(encode_utf16(text, true))),
            TextEncoding::Legacy(encoding) => encode_legacy(text, encoding),
        }
    }
}

// encoding_rs 只會輸出 UTF-8 給 UTF-16 標籤，因此自行處理。 / encoding_rs maps UTF-16 output to UTF-8, so UTF-16 is encoded here.
fn encode_utf16(text: &str, big_endian: bool) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        let bytes = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        buffer.extend_from_slice(&bytes);
    }
    buffer
}

fn encode_legacy<'a>(
    text: &'a str,
    encoding: &'static RsEncoding,
) -> Result<Cow<'a, [u8]>, AtomicFileError> {
    let (cow, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(AtomicFileError::Unrepresentable(encoding.name()));
    }
    Ok(cow)
}

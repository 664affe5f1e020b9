use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 原子寫入器允許的開啟模式。 / Open modes accepted by the atomic writer.
///
/// Only write modes exist: appending or reading would need the target's
/// current contents inside the temporary file, which this writer never copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpenMode {
    #[serde(rename = "wb", alias = "binary_write")]
    BinaryWrite,
    #[default]
    #[serde(rename = "w", alias = "wt", alias = "text_write")]
    TextWrite,
}

impl OpenMode {
    /// 回傳慣用的模式字串。 / Returns the conventional mode string.
    pub fn as_str(self) -> &'static str {
        match self {
            OpenMode::BinaryWrite => "wb",
            OpenMode::TextWrite => "w",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, OpenMode::TextWrite)
    }
}

impl FromStr for OpenMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wb" | "bw" => Ok(OpenMode::BinaryWrite),
            "w" | "wt" | "tw" => Ok(OpenMode::TextWrite),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_write_modes() {
        assert_eq!("wb".parse::<OpenMode>().unwrap(), OpenMode::BinaryWrite);
        assert_eq!("w".parse::<OpenMode>().unwrap(), OpenMode::TextWrite);
        assert_eq!("wt".parse::<OpenMode>().unwrap(), OpenMode::TextWrite);
    }

    #[test]
    fn rejects_non_write_modes() {
        for mode in ["a", "r", "rb", "w+", "ab", "", "W"] {
            let err = mode.parse::<OpenMode>().unwrap_err();
            assert_eq!(err, ConfigError::InvalidMode(mode.to_string()));
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [OpenMode::BinaryWrite, OpenMode::TextWrite] {
            assert_eq!(mode.to_string().parse::<OpenMode>().unwrap(), mode);
        }
        assert!(OpenMode::default().is_text());
    }
}

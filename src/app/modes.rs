//! View and layout selector types.
//!
//! [`View`] is the closed set of mutually exclusive display filters. [`Layout`]
//! only affects presentation and never changes which files are shown.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::View;
//!
//! let view: View = "starred".parse()?;
//! assert_eq!(view, View::Starred);
//! assert_eq!(view.title(), "Starred");
//! # Ok::<(), drivedeck::DriveError>(())
//! ```

use crate::domain::error::DriveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of files shown in the recent view.
pub const RECENT_LIMIT: usize = 20;

/// Display filter applied to the file cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    /// Every visible file, excluding the local bin.
    #[default]
    MyDrive,

    /// Only files whose id is in the starred set.
    Starred,

    /// The most recently uploaded files, newest first, capped at [`RECENT_LIMIT`].
    Recent,

    /// Files moved to the local bin.
    Bin,
}

impl View {
    /// All views in sidebar order.
    pub const ALL: [Self; 4] = [Self::MyDrive, Self::Starred, Self::Recent, Self::Bin];

    /// Identifier used in configuration and commands.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::MyDrive => "myDrive",
            Self::Starred => "starred",
            Self::Recent => "recent",
            Self::Bin => "bin",
        }
    }

    /// Heading shown above the file list.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::MyDrive => "My Drive",
            Self::Starred => "Starred",
            Self::Recent => "Recent",
            Self::Bin => "Bin",
        }
    }

    /// Message shown when the view has no files and no search is active.
    #[must_use]
    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Starred => "No starred files",
            Self::Bin => "Bin is empty",
            Self::MyDrive | Self::Recent => "No files",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "mydrive" | "drive" | "files" => Ok(Self::MyDrive),
            "starred" | "star" => Ok(Self::Starred),
            "recent" => Ok(Self::Recent),
            "bin" | "trash" => Ok(Self::Bin),
            _ => Err(DriveError::Config(format!("unknown view: {s}"))),
        }
    }
}

/// Presentation of the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    /// Table with name, type, size and modified columns.
    #[default]
    List,

    /// Cards with name, size and modified date.
    Grid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_ids_and_aliases() {
        for view in View::ALL {
            assert_eq!(view.id().parse::<View>().unwrap(), view);
        }
        assert_eq!("My Drive".parse::<View>().unwrap(), View::MyDrive);
        assert_eq!("trash".parse::<View>().unwrap(), View::Bin);
        assert!("shared".parse::<View>().is_err());
    }

    #[test]
    fn serializes_with_original_ids() {
        assert_eq!(serde_json::to_string(&View::MyDrive).unwrap(), "\"myDrive\"");
        assert_eq!(serde_json::to_string(&View::Bin).unwrap(), "\"bin\"");
    }
}

//! Project data model shared by all backends.

use std::fmt;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;

/// Block folders searched on every PLC, in lookup order.
pub const BLOCK_FOLDERS: [&str; 3] = ["Program blocks", "System blocks", "Technology objects"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub plc: Option<PlcInfo>,
}

impl Device {
    #[must_use]
    pub fn is_plc(&self) -> bool {
        self.plc.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlcInfo {
    pub name: SmolStr,
}

/// Block metadata. `language` is `None` when the engineering layer could not
/// report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub name: SmolStr,
    pub kind: SmolStr,
    pub language: Option<Language>,
}

/// Programming language of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    Scl,
    Lad,
    Fbd,
    Stl,
    Graph,
    Db,
    Other(SmolStr),
}

impl Language {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "SCL" => Self::Scl,
            "LAD" => Self::Lad,
            "FBD" => Self::Fbd,
            "STL" => Self::Stl,
            "GRAPH" => Self::Graph,
            "DB" => Self::Db,
            _ => Self::Other(SmolStr::new(text.trim())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scl => "SCL",
            Self::Lad => "LAD",
            Self::Fbd => "FBD",
            Self::Stl => "STL",
            Self::Graph => "GRAPH",
            Self::Db => "DB",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One network of a diagram block. `elements` is `None` when the element
/// names could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub title: String,
    pub comment: String,
    pub elements: Option<Vec<SmolStr>>,
}

/// Where to open a project from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLocation {
    /// Project file (or project directory) path as given.
    File(PathBuf),
    /// Containing directory plus project name.
    Directory { dir: PathBuf, name: String },
}

impl ProjectLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Directory/name form of `path`: its parent and the file name up to
    /// the first '.'.
    #[must_use]
    pub fn fallback(path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .unwrap_or_default()
            .to_string();
        Self::Directory { dir, name }
    }

    /// Name reported back to the user once the project is open.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string(),
            Self::Directory { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for ProjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Directory { dir, name } => write!(f, "{name} in {}", dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parse_is_case_insensitive() {
        assert_eq!(Language::parse("scl"), Language::Scl);
        assert_eq!(Language::parse(" LAD "), Language::Lad);
        assert_eq!(Language::parse("ProDiag"), Language::Other("ProDiag".into()));
        assert_eq!(Language::parse("ProDiag").to_string(), "ProDiag");
    }

    #[test]
    fn fallback_splits_directory_and_stem() {
        let location = ProjectLocation::fallback(Path::new("/plant/Line1.ap17"));
        assert_eq!(
            location,
            ProjectLocation::Directory {
                dir: PathBuf::from("/plant"),
                name: "Line1".to_string(),
            }
        );
        assert_eq!(location.display_name(), "Line1");
    }

    #[test]
    fn file_display_name_keeps_extension() {
        let location = ProjectLocation::file("/plant/Line1.ap17");
        assert_eq!(location.display_name(), "Line1.ap17");
    }
}

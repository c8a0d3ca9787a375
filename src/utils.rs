//! Cheap-to-clone shared values passed between actors.

use std::{
    borrow::Borrow,
    fmt::Display,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// An immutable, reference counted string.
///
/// Cloning only bumps a counter, so values can be moved through channels and
/// captured by spawned tasks freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcStr(Arc<str>);

impl Default for ArcStr {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

impl Deref for ArcStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ArcStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ArcStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for ArcStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArcStr {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ArcStr {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for ArcStr {
    fn from(value: &String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}

/// An immutable, reference counted filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcPath(Arc<Path>);

impl Deref for ArcPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for ArcPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for ArcPath {
    fn from(value: &str) -> Self {
        Self(Arc::from(Path::new(value)))
    }
}

impl From<&Path> for ArcPath {
    fn from(value: &Path) -> Self {
        Self(Arc::from(value))
    }
}

impl From<PathBuf> for ArcPath {
    fn from(value: PathBuf) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&PathBuf> for ArcPath {
    fn from(value: &PathBuf) -> Self {
        Self(Arc::from(value.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_str_behaves_like_str() {
        let s = ArcStr::from("naruto");
        assert_eq!(&*s, "naruto");
        assert_eq!(s.to_string(), "naruto");
        assert_eq!(s.len(), 6);
        assert_eq!(s, ArcStr::from(String::from("naruto")));
        assert!(ArcStr::default().is_empty());
    }

    #[test]
    fn test_arc_path_serialization() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            path: ArcPath,
            name: ArcStr,
        }

        let holder = Holder {
            path: ArcPath::from("/tmp/radar"),
            name: ArcStr::from("logs"),
        };
        let toml = toml::to_string(&holder).unwrap();
        assert!(toml.contains("path = \"/tmp/radar\""));
        assert!(toml.contains("name = \"logs\""));
        let back: Holder = toml::from_str(&toml).unwrap();
        assert_eq!(back.path, holder.path);
        assert_eq!(back.name, holder.name);
        assert_eq!(back.path.join("x"), PathBuf::from("/tmp/radar/x"));
    }
}

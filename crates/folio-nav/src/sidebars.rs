//! Navigation descriptor file format.
//!
//! ```yaml
//! docs:
//!   - intro
//!   - type: category
//!     label: Cloud
//!     link: { type: doc, id: cloud/index }
//!     items:
//!       - cloud/kubernetes
//!       - { type: link, label: CNCF, href: "https://cncf.io" }
//!   - Guides: [guides/setup, guides/deploy]
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

use crate::NavError;

/// Descriptor file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarsFormat {
    Yaml,
    Json,
}

impl SidebarsFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnsupportedFormat` for anything but `yaml`, `yml`
    /// or `json`.
    pub fn from_path(path: &Path) -> Result<Self, NavError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(NavError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// One entry in a sidebar, as written.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    /// `- intro`
    DocId(String),
    /// `- { type: ..., ... }`
    Typed(TypedItem),
    /// `- Label: [items]`
    Shorthand(Ordered<Vec<SidebarItem>>),
}

/// Explicitly typed sidebar entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum TypedItem {
    Doc {
        id: String,
        label: Option<String>,
    },
    Category {
        label: String,
        #[serde(default = "default_true")]
        collapsed: bool,
        #[serde(default = "default_true")]
        collapsible: bool,
        #[serde(default)]
        items: Vec<SidebarItem>,
        link: Option<CategoryLink>,
    },
    Link {
        label: String,
        href: String,
    },
    /// Expands to the documents under `dir_name` (empty for the docs root).
    Autogenerated {
        #[serde(default, alias = "dirName")]
        dir_name: String,
    },
}

/// Page a category label links to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum CategoryLink {
    Doc { id: String },
}

fn default_true() -> bool {
    true
}

/// Map that keeps its keys in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Ordered<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Parsed navigation descriptor: sidebars in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct SidebarsFile {
    pub sidebars: Vec<(String, Vec<SidebarItem>)>,
}

impl SidebarsFile {
    /// Read and parse a descriptor, picking the format from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, has an unknown extension
    /// or doesn't parse.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let format = SidebarsFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| NavError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, format).map_err(|e| match e {
            NavError::Parse { message, .. } => NavError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Parse descriptor text.
    ///
    /// # Errors
    ///
    /// Returns `NavError::Parse` if the text is not a map of sidebar names to
    /// item lists.
    pub fn parse(text: &str, format: SidebarsFormat) -> Result<Self, NavError> {
        let parsed: Ordered<Vec<SidebarItem>> = match format {
            SidebarsFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            SidebarsFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
        .map_err(|message| NavError::Parse {
            path: None,
            message,
        })?;
        Ok(Self {
            sidebars: parsed.0,
        })
    }
}

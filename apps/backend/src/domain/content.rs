//! Location packs: the read-only catalog of locations and their roles.
//!
//! Packs are JSON documents of the form
//! `{"name": "...", "locations": [{"id"?: "...", "name": "...", "roles": [{"name": "...", "hint"?: "..."}]}]}`.
//! A pack is keyed by its file stem. The `classic` pack is compiled in.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const CLASSIC_PACK: &str = include_str!("../../content/classic.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("pack '{pack}' is not valid JSON: {source}")]
    Parse {
        pack: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("pack '{pack}' has no locations")]
    Empty { pack: String },
    #[error("location '{location}' in pack '{pack}' has no roles")]
    NoRoles { pack: String, location: String },
    #[error("location id '{location}' appears twice in pack '{pack}'")]
    DuplicateLocation { pack: String, location: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDef {
    pub name: String,
    #[serde(default)]
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub roles: Vec<RoleDef>,
}

/// What the hidden-role holder sees in the list of possible locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationSummary {
    pub id: String,
    pub name: String,
}

impl From<&Location> for LocationSummary {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPack {
    pub id: String,
    pub name: String,
    pub locations: Vec<Location>,
}

impl LocationPack {
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn summaries(&self) -> Vec<LocationSummary> {
        self.locations.iter().map(LocationSummary::from).collect()
    }
}

#[derive(Deserialize)]
struct PackFile {
    name: Option<String>,
    locations: Vec<LocationFile>,
}

#[derive(Deserialize)]
struct LocationFile {
    id: Option<String>,
    name: String,
    roles: Vec<RoleDef>,
}

/// Lowercase ASCII slug used when a location omits its id.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Parse and validate a single pack document.
pub fn parse_pack(id: &str, json: &str) -> Result<LocationPack, ContentError> {
    let file: PackFile = serde_json::from_str(json).map_err(|source| ContentError::Parse {
        pack: id.to_string(),
        source,
    })?;

    if file.locations.is_empty() {
        return Err(ContentError::Empty {
            pack: id.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut locations = Vec::with_capacity(file.locations.len());
    for raw in file.locations {
        let location_id = raw
            .id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slugify(&raw.name));
        if raw.roles.is_empty() {
            return Err(ContentError::NoRoles {
                pack: id.to_string(),
                location: raw.name,
            });
        }
        if !seen.insert(location_id.clone()) {
            return Err(ContentError::DuplicateLocation {
                pack: id.to_string(),
                location: location_id,
            });
        }
        locations.push(Location {
            id: location_id,
            name: raw.name,
            roles: raw.roles,
        });
    }

    Ok(LocationPack {
        id: id.to_string(),
        name: file.name.unwrap_or_else(|| id.to_string()),
        locations,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    packs: BTreeMap<String, LocationPack>,
}

impl ContentCatalog {
    /// Catalog holding only the compiled-in `classic` pack.
    pub fn builtin() -> Result<Self, ContentError> {
        let mut catalog = Self::default();
        catalog.insert(parse_pack("classic", CLASSIC_PACK)?);
        Ok(catalog)
    }

    pub fn from_packs(packs: impl IntoIterator<Item = LocationPack>) -> Self {
        let mut catalog = Self::default();
        for pack in packs {
            catalog.insert(pack);
        }
        catalog
    }

    pub fn insert(&mut self, pack: LocationPack) {
        self.packs.insert(pack.id.clone(), pack);
    }

    /// Load every `*.json` file in `dir`. A pack that fails validation is
    /// skipped with a warning; an unreadable directory is an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ContentError> {
        let entries = fs::read_dir(dir).map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .map_err(|source| ContentError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let json = fs::read_to_string(&path).map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;
            match parse_pack(id, &json) {
                Ok(pack) => {
                    info!(pack = %pack.id, locations = pack.locations.len(), "loaded location pack");
                    self.insert(pack);
                    loaded += 1;
                }
                Err(err) => warn!(path = %path.display(), error = %err, "skipping location pack"),
            }
        }
        Ok(loaded)
    }

    pub fn pack(&self, id: &str) -> Option<&LocationPack> {
        self.packs.get(id)
    }

    pub fn packs(&self) -> impl Iterator<Item = &LocationPack> {
        self.packs.values()
    }
}

//! Knowledge base persistence
//!
//! A single pretty-printed JSON object, name -> profile. Loading never
//! fails: a missing or blank file is created from the seed set, and an unreadable
//! one is reported and replaced by the seed set for the session while the
//! file itself is left alone until the next save.

use crate::types::KnowledgeBase;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a loaded knowledge base came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from the existing file
    Disk,
    /// No file (or a blank one) existed; the seed set was written and returned
    Seeded,
    /// The file could not be used; the seed set is in effect for this session
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub base: KnowledgeBase,
    pub origin: LoadOrigin,
}

impl Loaded {
    /// Message for the player when the stored data could not be used
    pub fn warning(&self) -> Option<String> {
        match &self.origin {
            LoadOrigin::Fallback { reason } => Some(format!(
                "No se pudo cargar el archivo de conocimiento:\n{}\nSe usará la base inicial.",
                reason
            )),
            _ => None,
        }
    }
}

/// Reads and writes the knowledge base file
pub struct KnowledgeStore {
    path: PathBuf,
    seed: KnowledgeBase,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>, seed: KnowledgeBase) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seed(&self) -> &KnowledgeBase {
        &self.seed
    }

    /// Load persisted data, falling back to the seed set
    ///
    /// A missing or blank file is treated as a first run and seeded.
    pub fn load(&self) -> Loaded {
        if !self.path.exists() {
            info!("No knowledge base at {:?}, writing seed set", self.path);
            return self.write_seed();
        }

        let parsed = self.read_raw().and_then(|content| {
            if content.trim().is_empty() {
                return Ok(None);
            }
            self.parse(&content).map(Some)
        });

        match parsed {
            Ok(Some(base)) => {
                debug!("Loaded {} characters from {:?}", base.len(), self.path);
                Loaded {
                    base,
                    origin: LoadOrigin::Disk,
                }
            }
            Ok(None) => {
                info!("Knowledge base at {:?} is empty, writing seed set", self.path);
                self.write_seed()
            }
            Err(e) => {
                warn!("Falling back to seed knowledge base: {:#}", e);
                Loaded {
                    base: self.seed.clone(),
                    origin: LoadOrigin::Fallback {
                        reason: format!("{:#}", e),
                    },
                }
            }
        }
    }

    fn write_seed(&self) -> Loaded {
        if let Err(e) = self.save(&self.seed) {
            // The seed is still usable for this session
            warn!("Could not write seed knowledge base: {:#}", e);
        }
        Loaded {
            base: self.seed.clone(),
            origin: LoadOrigin::Seeded,
        }
    }

    fn read_raw(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read knowledge base at {:?}", self.path))
    }

    fn parse(&self, content: &str) -> Result<KnowledgeBase> {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse knowledge base at {:?}", self.path))
    }

    /// Overwrite the file with the full mapping
    ///
    /// Written to a sibling temp file first, then renamed into place.
    pub fn save(&self, base: &KnowledgeBase) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let json = to_pretty_json(base)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("Could not remove {:?}: {}", tmp_path, cleanup);
                }
            }
            return Err(e).with_context(|| format!("Failed to move {:?} into place", tmp_path));
        }

        info!("Saved {} characters to {:?}", base.len(), self.path);
        Ok(())
    }
}

/// Four-space indented JSON, UTF-8 kept as-is
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

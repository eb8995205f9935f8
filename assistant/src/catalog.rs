//! In-memory catalog of academic programs.
//!
//! The catalog is read from a JSON file once at startup and shared read-only
//! for the process lifetime. Load failures do not abort the process; the
//! caller keeps serving in degraded mode with no catalog.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::CatalogError;
use crate::models::ProgramRecord;

/// The fixed, read-only program catalog.
#[derive(Debug)]
pub struct Catalog {
    programs: Vec<ProgramRecord>,
}

impl Catalog {
    /// Load the catalog from a JSON array of program records.
    ///
    /// Fails on a missing or unreadable file, malformed JSON, an empty
    /// array, or any record with an empty `name`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let programs: Vec<ProgramRecord> = serde_json::from_str(&raw)?;

        if programs.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(index) = programs.iter().position(|p| p.name.trim().is_empty()) {
            return Err(CatalogError::InvalidRecord { index });
        }

        info!(programs = programs.len(), "catalog loaded");
        Ok(Catalog { programs })
    }

    /// Build a catalog directly from records, skipping file I/O.
    pub fn from_records(programs: Vec<ProgramRecord>) -> Self {
        Catalog { programs }
    }

    pub fn programs(&self) -> &[ProgramRecord] {
        &self.programs
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

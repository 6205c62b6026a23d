//! Reference data loaded once per run
//!
//! The center taxonomy, the CPT consultant allow-list and the
//! consultant → center lookup are hand-maintained tables. They live in a
//! versioned TOML (or JSON) file rather than in the classification code.

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::algorithm::taxonomy::{AreaDefinition, CenterTaxonomy};
use crate::error::{CleanerError, Result};
use crate::utils::logging::log_warning;

/// Reference file shipped with the crate
const BUNDLED_REFERENCE: &str = include_str!("../../data/reference.toml");

/// On-disk layout of a reference file
#[derive(Debug, Deserialize)]
struct ReferenceFile {
    #[serde(default)]
    cpt_consultants: Vec<String>,
    #[serde(default)]
    consultant_centers: BTreeMap<String, String>,
    areas: Vec<AreaDefinition>,
}

/// Immutable reference tables shared by every classifier
#[derive(Debug, Clone)]
pub struct ReferenceData {
    /// Area → center mapping
    pub taxonomy: CenterTaxonomy,
    /// Consultants whose students are always corporate/CPT (uppercased)
    cpt_consultants: FxHashSet<String>,
    /// Consultant (uppercased) → center code
    consultant_centers: FxHashMap<String, String>,
}

impl ReferenceData {
    /// Create reference data from its parts
    ///
    /// Consultant names are trimmed and uppercased so they match the
    /// normalised `consultant` field.
    #[must_use]
    pub fn new<I, M>(taxonomy: CenterTaxonomy, cpt_consultants: I, consultant_centers: M) -> Self
    where
        I: IntoIterator<Item = String>,
        M: IntoIterator<Item = (String, String)>,
    {
        let cpt_consultants = cpt_consultants
            .into_iter()
            .map(|name| name.trim().to_uppercase())
            .collect();
        let consultant_centers = consultant_centers
            .into_iter()
            .map(|(name, center)| (name.trim().to_uppercase(), center.trim().to_string()))
            .collect();

        Self {
            taxonomy,
            cpt_consultants,
            consultant_centers,
        }
    }

    /// Load the reference file compiled into the crate
    ///
    /// # Errors
    /// Returns an error if the bundled file is malformed
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_REFERENCE)
    }

    /// Parse reference data from TOML
    ///
    /// # Errors
    /// Returns a configuration error if the TOML is malformed or the
    /// taxonomy is invalid
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ReferenceFile = toml::from_str(contents)
            .map_err(|e| CleanerError::config("Failed to parse reference TOML", e))?;
        Self::from_file(file)
    }

    /// Parse reference data from JSON
    ///
    /// # Errors
    /// Returns a configuration error if the JSON is malformed or the
    /// taxonomy is invalid
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let file: ReferenceFile = serde_json::from_str(contents)
            .map_err(|e| CleanerError::config("Failed to parse reference JSON", e))?;
        Self::from_file(file)
    }

    /// Load reference data from a `.toml` or `.json` file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or does not parse
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(CleanerError::ConfigError(format!(
                "Unsupported reference file type: {}",
                path.display()
            ))),
        }
    }

    fn from_file(file: ReferenceFile) -> Result<Self> {
        let taxonomy = CenterTaxonomy::new(file.areas)?;

        for (consultant, center) in &file.consultant_centers {
            if !taxonomy.contains_center(center.trim()) {
                log_warning(
                    &format!("Consultant '{consultant}' maps to undeclared center '{center}'"),
                    None,
                );
            }
        }

        Ok(Self::new(
            taxonomy,
            file.cpt_consultants,
            file.consultant_centers,
        ))
    }

    /// Check if a consultant is on the CPT allow-list
    #[must_use]
    pub fn is_cpt_consultant(&self, consultant: &str) -> bool {
        self.cpt_consultants.contains(consultant)
    }

    /// Look up the center a consultant works for
    #[must_use]
    pub fn center_for_consultant(&self, consultant: &str) -> Option<&str> {
        self.consultant_centers.get(consultant).map(String::as_str)
    }

    /// Number of consultants on the CPT allow-list
    #[must_use]
    pub fn cpt_consultant_count(&self) -> usize {
        self.cpt_consultants.len()
    }

    /// Number of consultant → center entries
    #[must_use]
    pub fn consultant_center_count(&self) -> usize {
        self.consultant_centers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_reference_parses() {
        let reference = ReferenceData::bundled().unwrap();
        assert_eq!(reference.taxonomy.area_of("GC"), Some("JKT 2"));
        assert!(reference.is_cpt_consultant("ZULFADLI ZULFADLI"));
    }

    #[test]
    fn test_bundled_reference_is_a_skeleton() {
        let reference = ReferenceData::bundled().unwrap();
        assert_eq!(reference.consultant_center_count(), 0);
        assert_eq!(reference.center_for_consultant("SITI RAHAYU"), None);
        assert_eq!(reference.taxonomy.area_names().count(), 8);
    }

    #[test]
    fn test_consultant_names_are_uppercased() {
        let taxonomy = ReferenceData::bundled().unwrap().taxonomy;
        let reference = ReferenceData::new(
            taxonomy,
            vec![" jane cpt ".to_string()],
            vec![("john sales".to_string(), "PP".to_string())],
        );
        assert!(reference.is_cpt_consultant("JANE CPT"));
        assert_eq!(reference.center_for_consultant("JOHN SALES"), Some("PP"));
    }
}

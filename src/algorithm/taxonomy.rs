//! Center taxonomy
//!
//! Static reference data grouping the valid center codes into geographic
//! areas, plus the pseudo-areas for corporate and online-only members.
//! Built once at start-up and never mutated during a run.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, Result};
use crate::models::types::{CORPORATE, ONLINE_CENTER};

const fn default_markers() -> bool {
    true
}

/// One area and the center codes it groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDefinition {
    /// Area label, e.g. `"JKT 1"`
    pub name: String,
    /// Center codes in this area, in declaration order
    pub centers: Vec<String>,
    /// Whether these codes are searched for inside student codes
    #[serde(default = "default_markers")]
    pub markers: bool,
}

impl AreaDefinition {
    /// Create an area whose codes act as student-code markers
    #[must_use]
    pub fn new(name: &str, centers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            centers: centers.iter().map(|c| (*c).to_string()).collect(),
            markers: true,
        }
    }

    /// Create an area whose codes are valid centers but never markers
    #[must_use]
    pub fn pseudo(name: &str, centers: &[&str]) -> Self {
        Self {
            markers: false,
            ..Self::new(name, centers)
        }
    }
}

/// Area → center-code mapping with a flat center index
#[derive(Debug, Clone)]
pub struct CenterTaxonomy {
    areas: Vec<AreaDefinition>,
    /// Center code → index into `areas`
    center_index: FxHashMap<String, usize>,
}

impl CenterTaxonomy {
    /// Build a taxonomy from area definitions
    ///
    /// # Errors
    /// Returns a configuration error if an area is empty or unnamed, if an
    /// area or center is declared twice, or if the `Corporate` or
    /// `Online Center` pseudo-areas are missing
    pub fn new(areas: Vec<AreaDefinition>) -> Result<Self> {
        let mut center_index = FxHashMap::default();
        let mut area_names = FxHashSet::default();

        for (idx, area) in areas.iter().enumerate() {
            if area.name.trim().is_empty() {
                return Err(CleanerError::ConfigError(format!("Area #{idx} has no name")));
            }
            if !area_names.insert(area.name.as_str()) {
                return Err(CleanerError::ConfigError(format!(
                    "Area '{}' is declared twice",
                    area.name
                )));
            }
            if area.centers.is_empty() {
                return Err(CleanerError::ConfigError(format!(
                    "Area '{}' has no centers",
                    area.name
                )));
            }
            for center in &area.centers {
                if let Some(previous) = center_index.insert(center.clone(), idx) {
                    return Err(CleanerError::ConfigError(format!(
                        "Center '{center}' is declared in both '{}' and '{}'",
                        areas[previous].name, area.name
                    )));
                }
            }
        }

        let taxonomy = Self {
            areas,
            center_index,
        };

        for pseudo in [CORPORATE, ONLINE_CENTER] {
            if taxonomy.area_of(pseudo) != Some(pseudo) {
                return Err(CleanerError::ConfigError(format!(
                    "Taxonomy must declare area '{pseudo}' containing center '{pseudo}'"
                )));
            }
        }

        Ok(taxonomy)
    }

    /// Get the area definitions in declaration order
    #[must_use]
    pub fn areas(&self) -> &[AreaDefinition] {
        &self.areas
    }

    /// Get the area labels in declaration order
    pub fn area_names(&self) -> impl Iterator<Item = &str> {
        self.areas.iter().map(|area| area.name.as_str())
    }

    /// Get every valid center code in declaration order
    pub fn centers(&self) -> impl Iterator<Item = &str> {
        self.areas
            .iter()
            .flat_map(|area| area.centers.iter().map(String::as_str))
    }

    /// Get the center codes that may appear as markers inside student codes
    pub fn marker_codes(&self) -> impl Iterator<Item = &str> {
        self.areas
            .iter()
            .filter(|area| area.markers)
            .flat_map(|area| area.centers.iter().map(String::as_str))
    }

    /// Get the area a center belongs to
    #[must_use]
    pub fn area_of(&self, center: &str) -> Option<&str> {
        self.center_index
            .get(center)
            .map(|&idx| self.areas[idx].name.as_str())
    }

    /// Check if a center is declared in any area
    #[must_use]
    pub fn contains_center(&self, center: &str) -> bool {
        self.center_index.contains_key(center)
    }

    /// Check if an area is declared
    #[must_use]
    pub fn contains_area(&self, area: &str) -> bool {
        self.areas.iter().any(|a| a.name == area)
    }
}

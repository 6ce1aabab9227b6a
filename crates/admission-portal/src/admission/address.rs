//! Offline province/district/ward dataset backing the address selectors.
//! Unlike majors and subject combinations, the geographic hierarchy ships
//! with the portal and is never fetched.

use std::fs;
use std::path::Path;

use super::domain::Province;

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("failed to read address dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("address dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup table over the full province list.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    provinces: Vec<Province>,
}

impl AddressBook {
    pub fn new(provinces: Vec<Province>) -> Self {
        Self { provinces }
    }

    /// Parse the dataset from its JSON form (an array of provinces).
    pub fn from_json_str(raw: &str) -> Result<Self, AddressError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AddressError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, id: &str) -> Option<&Province> {
        self.provinces.iter().find(|province| province.id == id)
    }
}

use super::record::WorkspaceRecord;
use crate::error::ArtifactError;
use std::fs;

impl WorkspaceRecord {
    /// Serializes the record as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string_pretty(self).map_err(|e| ArtifactError::Malformed(e.to_string()))
    }

    /// Deserializes a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        serde_json::from_str(json).map_err(|e| ArtifactError::Malformed(e.to_string()))
    }

    /// Saves the record to a JSON file.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Loads a record from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

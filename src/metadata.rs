use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Result, UploadError};

pub const METADATA_FILE: &str = "metadata.json";

/// One stored file of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub original_name: String,
    pub saved_name: String,
    pub path: String,
}

/// The sidecar written next to a submission's files.
///
/// Text fields the client left out are omitted from the JSON rather than
/// written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub files: Vec<UploadedFile>,
}

impl MetadataRecord {
    /// Writes `metadata.json` into `dir`, replacing any previous one.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self)?;
        let path = dir.join(METADATA_FILE);
        fs::write(&path, json)
            .await
            .map_err(|e| UploadError::fs("write metadata", &path, e))?;
        Ok(path)
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub metadata: MetadataRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MetadataRecord {
        MetadataRecord {
            video_title: Some("Ocean".to_string()),
            theme: None,
            files: vec![UploadedFile {
                original_name: "clip.mp4".to_string(),
                saved_name: "1718000000000.mp4".to_string(),
                path: "uploads/1718000000000/1718000000000.mp4".to_string(),
            }],
        }
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "video_title": "Ocean",
                "files": [{
                    "originalName": "clip.mp4",
                    "savedName": "1718000000000.mp4",
                    "path": "uploads/1718000000000/1718000000000.mp4"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), "stale contents that are longer").unwrap();

        let path = sample().write_to(dir.path()).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("{\n  \"video_title\": \"Ocean\""));
        let parsed: MetadataRecord = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_response_omits_folder_when_absent() {
        let response = UploadResponse {
            message: "ok".to_string(),
            metadata: MetadataRecord::default(),
            folder: None,
        };
        let value = serde_json::to_value(response).unwrap();
        assert!(value.get("folder").is_none());
        assert_eq!(value["metadata"]["files"], json!([]));
    }
}

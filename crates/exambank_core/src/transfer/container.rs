//! Two-stage payload encoding inside a JSON container.
//!
//! Payload bytes are `bitcode`, then base64 (standard alphabet), so the blob
//! survives a plain-text container unmodified.

use super::{TransferError, TransferResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::warn;
use serde::{Deserialize, Serialize};

pub const CONTAINER_FORMAT: &str = "exambank_export";
pub const CONTAINER_VERSION: &str = "1.0";

/// Exported module subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub module_name: String,
    pub pools: Vec<ExportedPool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPool {
    pub pool_name: String,
    pub tasks: Vec<String>,
}

impl ExportPayload {
    pub fn task_count(&self) -> usize {
        self.pools.iter().map(|pool| pool.tasks.len()).sum()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ContainerFile {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// Serializes a payload into container text.
pub fn encode_container(payload: &ExportPayload) -> TransferResult<String> {
    let bytes =
        bitcode::serialize(payload).map_err(|err| TransferError::Encode(err.to_string()))?;
    let container = ContainerFile {
        format: Some(CONTAINER_FORMAT.to_string()),
        version: Some(CONTAINER_VERSION.to_string()),
        data: Some(STANDARD.encode(bytes)),
    };
    serde_json::to_string_pretty(&container).map_err(|err| TransferError::Encode(err.to_string()))
}

/// Parses container text back into a payload.
///
/// # Errors
/// - `InvalidFormat` when the text is not a container or the tag is unknown.
/// - `Decode` when the payload blob is missing or corrupt.
pub fn decode_container(text: &str) -> TransferResult<ExportPayload> {
    let container: ContainerFile = serde_json::from_str(text)
        .map_err(|err| TransferError::InvalidFormat(format!("not a container file: {err}")))?;

    match container.format.as_deref() {
        Some(CONTAINER_FORMAT) => {}
        Some(other) => {
            return Err(TransferError::InvalidFormat(format!(
                "unknown format tag `{other}`"
            )))
        }
        None => return Err(TransferError::InvalidFormat("missing format tag".to_string())),
    }

    if container.version.as_deref() != Some(CONTAINER_VERSION) {
        warn!(
            "event=container_decode module=transfer status=version_mismatch version={:?} expected={CONTAINER_VERSION}",
            container.version
        );
    }

    let blob = container
        .data
        .ok_or_else(|| TransferError::Decode("missing data field".to_string()))?;
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|err| TransferError::Decode(format!("base64: {err}")))?;
    bitcode::deserialize(&bytes).map_err(|err| TransferError::Decode(format!("payload: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{decode_container, encode_container, ExportPayload, ExportedPool};
    use crate::transfer::TransferError;

    fn sample() -> ExportPayload {
        ExportPayload {
            module_name: "Algorithms".to_string(),
            pools: vec![ExportedPool {
                pool_name: "Sorting".to_string(),
                tasks: vec!["Explain *quicksort*.".to_string(), "Ümlaut & $x^2$".to_string()],
            }],
        }
    }

    #[test]
    fn container_is_readable_json_with_tag_and_version() {
        let text = encode_container(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["format"], "exambank_export");
        assert_eq!(value["version"], "1.0");
        assert!(value["data"].is_string());
        assert!(!text.contains("quicksort"));
    }

    #[test]
    fn decode_restores_payload() {
        let payload = sample();
        let decoded = decode_container(&encode_container(&payload).unwrap()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.task_count(), 2);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let text = r#"{"format": "something_else", "version": "1.0", "data": ""}"#;
        let err = decode_container(text).unwrap_err();
        assert!(matches!(err, TransferError::InvalidFormat(_)));
    }

    #[test]
    fn missing_tag_is_rejected() {
        let err = decode_container(r#"{"version": "1.0", "data": ""}"#).unwrap_err();
        assert!(matches!(err, TransferError::InvalidFormat(_)));
    }

    #[test]
    fn corrupt_blob_is_a_decode_error() {
        let text = r#"{"format": "exambank_export", "version": "1.0", "data": "%%%"}"#;
        let err = decode_container(text).unwrap_err();
        assert!(matches!(err, TransferError::Decode(_)));
    }
}

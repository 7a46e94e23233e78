//! Upload lifecycle of a document field
//!
//! ```text
//! Empty ──select──▶ Pending ──start──▶ Uploading ──complete──▶ Uploaded
//!                                        │  ▲   │
//!                                        └──┘   └──fail──▶ Failed
//!                                      progress
//! ```
//!
//! `select` (back to `Pending`) and `reset` (back to `Empty`) are accepted
//! from every state; they are how a caller cancels or replaces an artifact.
//! Any other out-of-order transition is rejected and leaves the state as it
//! was. Progress updates are trusted to arrive in issuance order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{FormError, FormResult};

use super::artifact::{Artifact, ArtifactSource, ArtifactStream};

/// Server-assigned attributes of an uploaded artifact.
pub type UploadAttributes = Map<String, JsonValue>;

/// Keys kept when an uploaded state is rendered for submission.
pub const SUBMITTED_ATTRIBUTES: [&str; 3] = ["groupId", "uuid", "version"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadState {
    #[default]
    Empty,
    Pending,
    /// `total == 0` means the size is not known yet.
    Uploading { sent: i64, total: i64 },
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
    },
    Uploaded { attributes: UploadAttributes },
}

/// Submitted form of an uploaded artifact, in wire order.
#[derive(Serialize)]
struct SubmittedReference<'a> {
    #[serde(rename = "groupId", skip_serializing_if = "Option::is_none")]
    group_id: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a JsonValue>,
}

impl UploadState {
    pub fn name(&self) -> &'static str {
        match self {
            UploadState::Empty => "empty",
            UploadState::Pending => "pending",
            UploadState::Uploading { .. } => "uploading",
            UploadState::Failed { .. } => "failed",
            UploadState::Uploaded { .. } => "uploaded",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, UploadState::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadState::Failed { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Failed { .. } | UploadState::Uploaded { .. })
    }

    pub fn attributes(&self) -> Option<&UploadAttributes> {
        match self {
            UploadState::Uploaded { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Fraction of the transfer done, when the total is known.
    pub fn progress_ratio(&self) -> Option<f64> {
        match self {
            UploadState::Uploading { sent, total } if *total > 0 => {
                Some(*sent as f64 / *total as f64)
            }
            _ => None,
        }
    }

    /// A new artifact was picked; accepted from every state.
    pub fn select(&mut self) {
        *self = UploadState::Pending;
    }

    /// Drop the artifact; accepted from every state.
    pub fn reset(&mut self) {
        *self = UploadState::Empty;
    }

    pub fn start(&mut self, total: i64) -> FormResult<()> {
        if !matches!(self, UploadState::Pending) {
            return Err(self.rejected("start uploading"));
        }
        if total < 0 {
            return Err(FormError::InvalidProgress { sent: 0, total });
        }
        *self = UploadState::Uploading { sent: 0, total };
        Ok(())
    }

    /// Record transferred bytes. `sent` never goes backwards and never passes
    /// a known total; a `total` of 0 keeps the previously known total.
    pub fn progress(&mut self, sent: i64, total: i64) -> FormResult<()> {
        let UploadState::Uploading {
            sent: previous_sent,
            total: previous_total,
        } = *self
        else {
            return Err(self.rejected("report progress"));
        };

        let total = if total == 0 { previous_total } else { total };
        if sent < previous_sent || total < 0 || (total > 0 && sent > total) {
            return Err(FormError::InvalidProgress { sent, total });
        }

        *self = UploadState::Uploading { sent, total };
        Ok(())
    }

    pub fn complete(&mut self, attributes: UploadAttributes) -> FormResult<()> {
        if !matches!(self, UploadState::Uploading { .. }) {
            return Err(self.rejected("complete the upload"));
        }
        *self = UploadState::Uploaded { attributes };
        Ok(())
    }

    pub fn fail(&mut self, cause: Option<String>) -> FormResult<()> {
        if !matches!(self, UploadState::Uploading { .. }) {
            return Err(self.rejected("fail the upload"));
        }
        *self = UploadState::Failed { cause };
        Ok(())
    }

    /// Restore a previously submitted value. The object is taken as is, with
    /// every key it carries; anything but a JSON object is rejected and the
    /// state is left untouched.
    pub fn restore(&mut self, json: &str) -> FormResult<()> {
        let value: JsonValue = serde_json::from_str(json)?;
        let JsonValue::Object(attributes) = value else {
            return Err(FormError::Deserialization(
                "uploaded document must be a JSON object".to_string(),
            ));
        };
        *self = UploadState::Uploaded { attributes };
        Ok(())
    }

    /// Compact JSON with `groupId`, `uuid` and `version` only; `None` unless
    /// uploaded.
    pub fn to_submitted_json(&self) -> Option<String> {
        let attributes = self.attributes()?;
        let reference = SubmittedReference {
            group_id: attributes.get("groupId"),
            uuid: attributes.get("uuid"),
            version: attributes.get("version"),
        };
        serde_json::to_string(&reference).ok()
    }

    fn rejected(&self, action: &'static str) -> FormError {
        FormError::InvalidTransition {
            from: self.name(),
            action,
        }
    }
}

/// Live value of a document field: the picked artifact and its upload state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentValue {
    pub artifact: Option<Artifact>,
    pub state: UploadState,
}

impl DocumentValue {
    pub fn has_value(&self) -> bool {
        !self.state.is_empty()
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        if self.state.is_empty() {
            return None;
        }
        self.artifact.as_ref()?.mime_type()
    }

    pub fn summary(&self) -> Option<&'static str> {
        if self.state.is_empty() {
            return None;
        }
        self.artifact.as_ref()?.summary()
    }

    /// Open the artifact's bytes through the host's source.
    pub fn byte_stream(&self, source: &dyn ArtifactSource) -> FormResult<Option<ArtifactStream>> {
        if self.state.is_empty() {
            return Ok(None);
        }
        match &self.artifact {
            Some(artifact) => Ok(Some(source.open(artifact)?)),
            None => Ok(None),
        }
    }

    /// Byte count of the artifact, 0 when nothing is selected or readable.
    pub fn byte_stream_length(&self, source: &dyn ArtifactSource) -> u64 {
        match self.byte_stream(source) {
            Ok(Some(stream)) => stream.length,
            Ok(None) => 0,
            Err(e) => {
                tracing::debug!(error = %e, "Artifact could not be opened");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uploaded_attributes() -> UploadAttributes {
        let JsonValue::Object(map) = json!({
            "groupId": 1234,
            "uuid": "abcd",
            "version": "1.0",
            "extra": "x",
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_happy_path() {
        let mut state = UploadState::default();
        assert!(state.is_empty());

        state.select();
        state.start(100).unwrap();
        state.progress(10, 100).unwrap();
        state.progress(60, 0).unwrap();
        assert_eq!(state, UploadState::Uploading { sent: 60, total: 100 });
        assert_eq!(state.progress_ratio(), Some(0.6));

        state.complete(uploaded_attributes()).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.name(), "uploaded");
    }

    #[test]
    fn test_progress_must_not_go_backwards() {
        let mut state = UploadState::Uploading { sent: 50, total: 100 };
        let err = state.progress(40, 100).unwrap_err();
        assert!(matches!(err, FormError::InvalidProgress { sent: 40, .. }));
        assert_eq!(state, UploadState::Uploading { sent: 50, total: 100 });
    }

    #[test]
    fn test_progress_must_not_exceed_total() {
        let mut state = UploadState::Pending;
        state.start(0).unwrap();
        state.progress(500, 0).unwrap();
        state.progress(600, 1000).unwrap();
        assert!(state.progress(1001, 1000).is_err());
    }

    #[test]
    fn test_out_of_order_transitions_are_rejected() {
        let mut state = UploadState::Uploaded {
            attributes: uploaded_attributes(),
        };
        let err = state.progress(1, 10).unwrap_err();
        assert!(matches!(
            err,
            FormError::InvalidTransition {
                from: "uploaded",
                ..
            }
        ));
        assert!(state.start(10).is_err());
        assert!(state.fail(None).is_err());
        assert_eq!(
            state,
            UploadState::Uploaded {
                attributes: uploaded_attributes()
            }
        );

        let mut empty = UploadState::Empty;
        assert!(empty.start(10).is_err());
        assert!(empty.complete(Map::new()).is_err());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_pending_cannot_finish_without_starting() {
        let mut state = UploadState::Empty;
        state.select();

        let err = state.complete(uploaded_attributes()).unwrap_err();
        assert!(matches!(
            err,
            FormError::InvalidTransition {
                from: "pending",
                ..
            }
        ));
        assert!(matches!(
            state.fail(None),
            Err(FormError::InvalidTransition {
                from: "pending",
                ..
            })
        ));
        assert_eq!(state, UploadState::Pending);
    }

    #[test]
    fn test_reset_and_reselect_from_terminal_states() {
        let mut state = UploadState::Failed {
            cause: Some("timeout".to_string()),
        };
        state.select();
        assert_eq!(state, UploadState::Pending);

        state.start(10).unwrap();
        state.fail(None).unwrap();
        state.reset();
        assert_eq!(state, UploadState::Empty);
    }

    #[test]
    fn test_submitted_json_keeps_allowed_keys_only() {
        let state = UploadState::Uploaded {
            attributes: uploaded_attributes(),
        };
        assert_eq!(
            state.to_submitted_json().as_deref(),
            Some(r#"{"groupId":1234,"uuid":"abcd","version":"1.0"}"#)
        );
        assert_eq!(UploadState::Pending.to_submitted_json(), None);
        assert_eq!(
            UploadState::Uploading { sent: 1, total: 10 }.to_submitted_json(),
            None
        );
        assert_eq!(UploadState::Failed { cause: None }.to_submitted_json(), None);
    }

    #[test]
    fn test_restore_keeps_every_key() {
        let mut state = UploadState::Pending;
        state
            .restore(r#"{"groupId":1234,"uuid":"abcd","version":"1.0","title":"t"}"#)
            .unwrap();
        let attributes = state.attributes().unwrap();
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes["groupId"], json!(1234));
        assert_eq!(attributes["title"], json!("t"));
    }

    #[test]
    fn test_restore_rejects_malformed_json() {
        let mut state = UploadState::Pending;
        assert!(matches!(
            state.restore("{\"groupId\":"),
            Err(FormError::Deserialization(_))
        ));
        assert!(matches!(
            state.restore("[1, 2]"),
            Err(FormError::Deserialization(_))
        ));
        assert_eq!(state, UploadState::Pending);
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = UploadState::Uploading { sent: 3, total: 9 };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"status":"uploading","sent":3,"total":9}"#);
        let back: UploadState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_uploaded_state_keeps_status_attribute() {
        let mut attributes = uploaded_attributes();
        attributes.insert("status".to_string(), json!(0));
        let state = UploadState::Uploaded { attributes };

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.starts_with(r#"{"status":"uploaded","attributes":{"#));
        let back: UploadState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.attributes().unwrap()["status"], json!(0));
    }

    #[test]
    fn test_document_value_views_without_artifact() {
        let value = DocumentValue::default();
        assert!(!value.has_value());
        assert_eq!(value.mime_type(), None);
        assert_eq!(value.summary(), None);
        assert_eq!(
            value.byte_stream_length(&crate::models::LocalArtifactSource),
            0
        );

        let pending = DocumentValue {
            artifact: None,
            state: UploadState::Pending,
        };
        assert!(pending.has_value());
        assert_eq!(pending.mime_type(), None);
    }
}

//! Field descriptors
//!
//! A [`FieldDescriptor`] is one declared form field: metadata resolved for a
//! locale, a compiled validator and the live value. Metadata is read-only
//! once built; the value changes through the setters and upload operations
//! below, each of which notifies the registered observers.

use std::fmt;
use std::sync::Arc;

use crate::error::{FormError, FormResult};
use crate::hooks::{FieldEvent, FieldObserver};
use crate::validation::Validator;

use super::artifact::{Artifact, ArtifactSource, ArtifactStream};
use super::data_type::{DataType, EditorKind};
use super::upload::{DocumentValue, UploadAttributes, UploadState};
use super::value::{FieldOption, FieldValue};

/// Metadata of a field as read from a schema document, before any value is
/// attached.
#[derive(Debug, Clone, Default)]
pub struct FieldDefinition {
    pub name: String,
    pub data_type: Option<DataType>,
    pub editor_kind: Option<EditorKind>,
    pub required: bool,
    pub repeatable: bool,
    pub read_only: bool,
    pub show_label: bool,
    pub multiple: bool,
    pub index_type: Option<String>,
    pub label: Option<String>,
    pub tip: Option<String>,
    pub predefined_value: Option<String>,
    pub options: Vec<FieldOption>,
    pub validator: Validator,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    data_type: DataType,
    editor_kind: EditorKind,
    required: bool,
    repeatable: bool,
    read_only: bool,
    show_label: bool,
    multiple: bool,
    index_type: Option<String>,
    label: Option<String>,
    tip: Option<String>,
    predefined_value: Option<String>,
    options: Vec<FieldOption>,
    validator: Validator,
    current_value: FieldValue,
    observers: Vec<Arc<dyn FieldObserver>>,
}

impl FieldDescriptor {
    /// Build a descriptor and seed its value from the predefined value.
    /// A predefined value that does not parse for the field's type is logged
    /// and ignored.
    pub fn new(definition: FieldDefinition) -> Self {
        let data_type = definition
            .data_type
            .unwrap_or_else(|| DataType::Unsupported(String::new()));
        let editor_kind = definition
            .editor_kind
            .unwrap_or_else(|| data_type.default_editor());
        let predefined_value = definition.predefined_value.filter(|value| !value.is_empty());

        let mut field = Self {
            current_value: FieldValue::empty_for(&data_type, editor_kind),
            name: definition.name,
            data_type,
            editor_kind,
            required: definition.required,
            repeatable: definition.repeatable,
            read_only: definition.read_only,
            show_label: definition.show_label,
            multiple: definition.multiple,
            index_type: definition.index_type,
            label: definition.label,
            tip: definition.tip,
            predefined_value,
            options: definition.options,
            validator: definition.validator,
            observers: Vec::new(),
        };

        if let Some(predefined) = field.predefined_value.clone() {
            if let Err(e) = field.seed(&predefined) {
                tracing::warn!(
                    field = %field.name,
                    error = %e,
                    "Ignoring predefined value"
                );
            }
        }

        field
    }

    fn seed(&mut self, predefined: &str) -> FormResult<()> {
        match &mut self.current_value {
            FieldValue::Document(document) => {
                if predefined.trim_start().starts_with('{') {
                    document.state.restore(predefined)?;
                }
                Ok(())
            }
            current => {
                *current =
                    current.parse_like(Some(predefined), &self.name, &self.data_type, &self.options)?;
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn editor_kind(&self) -> EditorKind {
        self.editor_kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn show_label(&self) -> bool {
        self.show_label
    }

    /// Whether a select field accepts more than one option.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn index_type(&self) -> Option<&str> {
        self.index_type.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }

    pub fn predefined_value(&self) -> Option<&str> {
        self.predefined_value.as_deref()
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn current_value(&self) -> &FieldValue {
        &self.current_value
    }

    pub fn is_artifact(&self) -> bool {
        matches!(self.current_value, FieldValue::Document(_))
    }

    pub fn add_observer(&mut self, observer: Arc<dyn FieldObserver>) {
        self.observers.push(observer);
    }

    /// Whether the current value may be submitted.
    ///
    /// A required field without a value and a document whose upload failed
    /// are invalid whatever the validator says; otherwise the validator runs
    /// on the canonical string. A field without a value is valid.
    pub fn validate(&self) -> bool {
        if let FieldValue::Document(document) = &self.current_value {
            if document.state.is_failed() {
                return false;
            }
        }

        if self.current_value.is_empty() {
            return !self.required;
        }

        match self.current_value.to_canonical_string() {
            Some(canonical) => self.validator.evaluates(&canonical),
            None => true,
        }
    }

    /// The validator's message when the field does not validate.
    pub fn validation_error(&self) -> Option<&str> {
        if self.validate() {
            None
        } else {
            Some(self.validator.error_message())
        }
    }

    /// Replace the value. The variant must match the field's slot.
    pub fn set_current_value(&mut self, value: FieldValue) -> FormResult<()> {
        if std::mem::discriminant(&value) != std::mem::discriminant(&self.current_value) {
            return Err(FormError::invalid_value(
                &self.name,
                format!("value does not fit a {} field", self.data_type),
            ));
        }
        self.replace_value(value);
        Ok(())
    }

    /// Parse and store a canonical string. `None` or `""` clears the value;
    /// for document fields a JSON object restores an uploaded state.
    pub fn set_current_value_as_string(&mut self, raw: Option<&str>) -> FormResult<()> {
        let raw = raw.filter(|raw| !raw.is_empty());

        if let FieldValue::Document(document) = &self.current_value {
            let mut document = document.clone();
            match raw {
                Some(json) => document.state.restore(json)?,
                None => {
                    document.state.reset();
                    document.artifact = None;
                }
            }
            self.replace_value(FieldValue::Document(document));
            return Ok(());
        }

        let value = self
            .current_value
            .parse_like(raw, &self.name, &self.data_type, &self.options)?;
        self.replace_value(value);
        Ok(())
    }

    pub fn current_value_as_string(&self) -> Option<String> {
        self.current_value.to_canonical_string()
    }

    pub fn current_value_as_label(&self) -> Option<String> {
        self.current_value.to_label()
    }

    fn replace_value(&mut self, value: FieldValue) {
        let old_value = self.current_value.to_canonical_string();
        let old_state = self.upload_state().map(UploadState::name);
        self.current_value = value;
        let new_value = self.current_value.to_canonical_string();
        let new_state = self.upload_state().map(UploadState::name);

        tracing::debug!(field = %self.name, "Field value set");
        self.notify(FieldEvent::ValueChanged {
            field: self.name.clone(),
            old_value,
            new_value,
        });
        if let (Some(from), Some(to)) = (old_state, new_state) {
            if from != to {
                self.notify(FieldEvent::UploadStateChanged {
                    field: self.name.clone(),
                    from,
                    to,
                });
            }
        }
    }

    fn notify(&self, event: FieldEvent) {
        for observer in &self.observers {
            observer.on_field_event(&event);
        }
    }

    // Document fields

    pub fn document(&self) -> Option<&DocumentValue> {
        match &self.current_value {
            FieldValue::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn upload_state(&self) -> Option<&UploadState> {
        self.document().map(|document| &document.state)
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.document()?.artifact.as_ref()
    }

    /// Attach a locally picked artifact; the upload goes back to pending.
    pub fn select_artifact(&mut self, artifact: Artifact) -> FormResult<()> {
        self.transition("select", |document| {
            document.artifact = Some(artifact);
            document.state.select();
            Ok(())
        })
    }

    pub fn reset_upload(&mut self) -> FormResult<()> {
        self.transition("reset", |document| {
            document.artifact = None;
            document.state.reset();
            Ok(())
        })
    }

    pub fn start_upload(&mut self, total: i64) -> FormResult<()> {
        self.transition("start", |document| document.state.start(total))
    }

    pub fn upload_progress(&mut self, sent: i64, total: i64) -> FormResult<()> {
        self.transition("progress", |document| document.state.progress(sent, total))
    }

    pub fn complete_upload(&mut self, attributes: UploadAttributes) -> FormResult<()> {
        self.transition("complete", |document| document.state.complete(attributes))
    }

    pub fn fail_upload(&mut self, cause: Option<String>) -> FormResult<()> {
        self.transition("fail", |document| document.state.fail(cause))
    }

    fn transition(
        &mut self,
        action: &'static str,
        apply: impl FnOnce(&mut DocumentValue) -> FormResult<()>,
    ) -> FormResult<()> {
        let FieldValue::Document(document) = &mut self.current_value else {
            return Err(FormError::invalid_value(
                &self.name,
                format!("cannot {} an upload on a {} field", action, self.data_type),
            ));
        };

        let from = document.state.name();
        let old_value = document.state.to_submitted_json();
        if let Err(e) = apply(document) {
            tracing::warn!(
                field = %self.name,
                state = from,
                action = action,
                error = %e,
                "Upload transition rejected"
            );
            return Err(e);
        }
        let to = document.state.name();
        let new_value = document.state.to_submitted_json();

        tracing::debug!(field = %self.name, from = from, to = to, "Upload transition");
        if from != to {
            self.notify(FieldEvent::UploadStateChanged {
                field: self.name.clone(),
                from,
                to,
            });
        }
        if old_value != new_value {
            self.notify(FieldEvent::ValueChanged {
                field: self.name.clone(),
                old_value,
                new_value,
            });
        }
        Ok(())
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        self.document()?.mime_type()
    }

    pub fn human_readable_summary(&self) -> Option<&'static str> {
        self.document()?.summary()
    }

    pub fn byte_stream(&self, source: &dyn ArtifactSource) -> FormResult<Option<ArtifactStream>> {
        match self.document() {
            Some(document) => document.byte_stream(source),
            None => Ok(None),
        }
    }

    pub fn byte_stream_length(&self, source: &dyn ArtifactSource) -> u64 {
        self.document()
            .map(|document| document.byte_stream_length(source))
            .unwrap_or(0)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("editor_kind", &self.editor_kind)
            .field("required", &self.required)
            .field("label", &self.label)
            .field("predefined_value", &self.predefined_value)
            .field("validator", &self.validator.kind().name())
            .field("current_value", &self.current_value)
            .field("observers", &self.observers.len())
            .finish()
    }
}

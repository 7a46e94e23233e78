//! Hooks for reacting to field changes
//!
//! The engine never touches presentation. Hosts that need to redraw an
//! editor, persist a draft or report upload progress register a
//! [`FieldObserver`] on a field and receive a [`FieldEvent`] after every
//! accepted change.

use std::sync::Mutex;

/// Change applied to a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// The current value was replaced. Values are canonical strings.
    ValueChanged {
        field: String,
        old_value: Option<String>,
        new_value: Option<String>,
    },
    /// The upload state machine of a document field moved.
    UploadStateChanged {
        field: String,
        from: &'static str,
        to: &'static str,
    },
}

impl FieldEvent {
    pub fn field(&self) -> &str {
        match self {
            FieldEvent::ValueChanged { field, .. } | FieldEvent::UploadStateChanged { field, .. } => {
                field
            }
        }
    }
}

/// Trait for observing field changes
///
/// Called synchronously from the mutating operation, after the change has
/// been applied.
pub trait FieldObserver: Send + Sync {
    fn on_field_event(&self, event: &FieldEvent);
}

/// No-op implementation for hosts that do not observe fields
pub struct NoOpFieldObserver;

impl FieldObserver for NoOpFieldObserver {
    fn on_field_event(&self, _event: &FieldEvent) {}
}

/// Emits every event as a `tracing` debug record.
pub struct TracingFieldObserver;

impl FieldObserver for TracingFieldObserver {
    fn on_field_event(&self, event: &FieldEvent) {
        match event {
            FieldEvent::ValueChanged {
                field,
                old_value,
                new_value,
            } => tracing::debug!(
                field = %field,
                old_value = ?old_value,
                new_value = ?new_value,
                "Field value changed"
            ),
            FieldEvent::UploadStateChanged { field, from, to } => {
                tracing::debug!(field = %field, from = from, to = to, "Upload state changed")
            }
        }
    }
}

/// Keeps every event it receives. Useful for hosts that batch reactions.
#[derive(Default)]
pub struct RecordingFieldObserver {
    events: Mutex<Vec<FieldEvent>>,
}

impl RecordingFieldObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, oldest first.
    pub fn drain(&self) -> Vec<FieldEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl FieldObserver for RecordingFieldObserver {
    fn on_field_event(&self, event: &FieldEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_drains_in_order() {
        let observer = RecordingFieldObserver::new();
        observer.on_field_event(&FieldEvent::UploadStateChanged {
            field: "Photo".to_string(),
            from: "empty",
            to: "pending",
        });
        observer.on_field_event(&FieldEvent::ValueChanged {
            field: "Name".to_string(),
            old_value: None,
            new_value: Some("Ada".to_string()),
        });

        let events = observer.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field(), "Photo");
        assert_eq!(events[1].field(), "Name");
        assert!(observer.drain().is_empty());
    }
}

use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage type of a field, from the `dataType` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    String,
    Date,
    Integer,
    Number,
    Double,
    Document,
    Html,
    /// Type the engine does not know; the raw attribute is kept for the host.
    Unsupported(String),
}

impl DataType {
    /// Map a `dataType` attribute. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "boolean" => DataType::Boolean,
            "string" => DataType::String,
            "date" => DataType::Date,
            "integer" | "long" => DataType::Integer,
            "number" => DataType::Number,
            "double" | "float" => DataType::Double,
            "document-library" | "document_library" => DataType::Document,
            "html" => DataType::Html,
            _ => DataType::Unsupported(raw.trim().to_string()),
        }
    }

    /// Resolve the data type from a field's `dataType` and, when that is
    /// absent or blank, from its `type` attribute.
    pub fn resolve(data_type: Option<&str>, type_attribute: Option<&str>) -> Self {
        if let Some(raw) = data_type.filter(|raw| !raw.trim().is_empty()) {
            return DataType::parse(raw);
        }

        let Some(raw) = type_attribute.filter(|raw| !raw.trim().is_empty()) else {
            return DataType::Unsupported(String::new());
        };

        match EditorKind::from_type_attribute(raw) {
            Some(EditorKind::Checkbox) => DataType::Boolean,
            Some(EditorKind::Date) => DataType::Date,
            Some(EditorKind::Number) => match raw.trim() {
                "ddm-integer" => DataType::Integer,
                "ddm-decimal" => DataType::Double,
                _ => DataType::Number,
            },
            Some(EditorKind::Document) => DataType::Document,
            Some(EditorKind::Textarea) if raw.trim() == "ddm-text-html" => DataType::Html,
            Some(EditorKind::Text)
            | Some(EditorKind::Textarea)
            | Some(EditorKind::Select)
            | Some(EditorKind::Radio) => DataType::String,
            _ => DataType::Unsupported(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataType::Boolean => "boolean",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::Double => "double",
            DataType::Document => "document-library",
            DataType::Html => "html",
            DataType::Unsupported(raw) => raw,
        }
    }

    /// Editor used when the definition does not name a known one.
    pub fn default_editor(&self) -> EditorKind {
        match self {
            DataType::Boolean => EditorKind::Checkbox,
            DataType::String => EditorKind::Text,
            DataType::Date => EditorKind::Date,
            DataType::Integer | DataType::Number | DataType::Double => EditorKind::Number,
            DataType::Document => EditorKind::Document,
            DataType::Html => EditorKind::Textarea,
            DataType::Unsupported(_) => EditorKind::Unsupported,
        }
    }

    /// Whether values of this type are uploaded artifacts.
    pub fn is_artifact(&self) -> bool {
        matches!(self, DataType::Document)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DataType::Unsupported(_))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Rendering hint for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    Checkbox,
    Text,
    Textarea,
    Date,
    Number,
    Select,
    Radio,
    Document,
    Paragraph,
    Unsupported,
}

impl EditorKind {
    /// Map a `type` attribute to a known editor.
    pub fn from_type_attribute(raw: &str) -> Option<Self> {
        match raw.trim() {
            "checkbox" | "boolean" => Some(EditorKind::Checkbox),
            "text" => Some(EditorKind::Text),
            "textarea" | "ddm-text-html" => Some(EditorKind::Textarea),
            "ddm-date" | "date" => Some(EditorKind::Date),
            "ddm-number" | "ddm-integer" | "ddm-decimal" | "numeric" => Some(EditorKind::Number),
            "select" => Some(EditorKind::Select),
            "radio" => Some(EditorKind::Radio),
            "ddm-documentlibrary" | "document_library" | "documentlibrary" => {
                Some(EditorKind::Document)
            }
            "ddm-paragraph" | "paragraph" => Some(EditorKind::Paragraph),
            _ => None,
        }
    }

    /// Editor for a field: the `type` attribute when it names a known editor,
    /// otherwise the data type's default.
    pub fn resolve(type_attribute: Option<&str>, data_type: &DataType) -> Self {
        type_attribute
            .and_then(EditorKind::from_type_attribute)
            .unwrap_or_else(|| data_type.default_editor())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditorKind::Checkbox => "checkbox",
            EditorKind::Text => "text",
            EditorKind::Textarea => "textarea",
            EditorKind::Date => "date",
            EditorKind::Number => "number",
            EditorKind::Select => "select",
            EditorKind::Radio => "radio",
            EditorKind::Document => "document",
            EditorKind::Paragraph => "paragraph",
            EditorKind::Unsupported => "unsupported",
        }
    }

    /// Whether the editor picks among declared options.
    pub fn has_options(&self) -> bool {
        matches!(self, EditorKind::Select | EditorKind::Radio)
    }
}

impl Display for EditorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

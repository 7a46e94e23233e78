//! XML structure documents
//!
//! ```xml
//! <root available-locales="en_US,es_ES" default-locale="en_US">
//!   <dynamic-element dataType="string" type="text" name="Name" required="true">
//!     <meta-data locale="en_US">
//!       <entry name="label"><![CDATA[Name]]></entry>
//!       <entry name="predefinedValue"><![CDATA[]]></entry>
//!     </meta-data>
//!     <validation expression="contains(Name, &quot;a&quot;)" error="Needs an a"/>
//!   </dynamic-element>
//! </root>
//! ```
//!
//! The document is read into a small element tree first, then fields are
//! extracted depth first: a `dynamic-element` nested inside another one is
//! listed right after its parent. Nested `dynamic-element type="option"`
//! elements are the options of their parent, not fields.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::{FormError, FormResult};
use crate::locale::Locale;
use crate::models::{DataType, EditorKind, FieldDefinition, FieldDescriptor, FieldOption};
use crate::validation::{ValidationMap, Validator};

use super::{non_empty, parse_flag, FormSchema, MetadataResolver};

const FIELD_ELEMENT: &str = "dynamic-element";
const OPTION_TYPE: &str = "option";

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> FormResult<Self> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn is_option(&self) -> bool {
        self.name == FIELD_ELEMENT && self.attribute("type") == Some(OPTION_TYPE)
    }

    /// `entry name=".."` children as a map of entry name to text.
    fn entries(&self) -> HashMap<&str, &str> {
        self.children_named("entry")
            .filter_map(|entry| Some((entry.attribute("name")?, entry.text.as_str())))
            .collect()
    }

    /// Locale-tagged `meta-data` blocks, in document order.
    fn metadata_blocks(&self) -> Vec<(Locale, HashMap<&str, &str>)> {
        self.children_named("meta-data")
            .map(|block| {
                let locale = Locale::new(block.attribute("locale").unwrap_or_default());
                (locale, block.entries())
            })
            .collect()
    }
}

fn malformed(reason: &str) -> FormError {
    FormError::MalformedSchema(reason.to_string())
}

fn read_tree(document: &str) -> FormResult<Element> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::from_start(&start)?)?,
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("closing tag without an open element"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text.unescape()?;
                    if !text.trim().is_empty() {
                        current.text.push_str(&text);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let bytes = data.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| FormError::MalformedSchema(e.to_string()))?;
                    current.text.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FormError::MalformedSchema(format!(
            "element '{}' is never closed",
            open.name
        )));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> FormResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(malformed("document has more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

pub(crate) fn parse_document(
    document: &str,
    locale: &Locale,
    config: &EngineConfig,
) -> FormResult<FormSchema> {
    let root = read_tree(document)?;

    let available_locales: Vec<Locale> = root
        .attribute("available-locales")
        .unwrap_or_default()
        .split(',')
        .map(Locale::new)
        .filter(|locale| !locale.is_empty())
        .collect();
    let default_locale = root
        .attribute("default-locale")
        .map(Locale::new)
        .filter(|locale| !locale.is_empty());

    let resolver = MetadataResolver::new(locale, default_locale.as_ref(), config);
    let mut fields = Vec::new();
    collect_fields(&root, &resolver, &mut fields);

    Ok(FormSchema::new(available_locales, default_locale, fields))
}

fn collect_fields(parent: &Element, resolver: &MetadataResolver, fields: &mut Vec<FieldDescriptor>) {
    for element in parent.children_named(FIELD_ELEMENT) {
        if element.is_option() {
            continue;
        }
        fields.push(FieldDescriptor::new(field_definition(element, resolver)));
        collect_fields(element, resolver, fields);
    }
}

fn field_definition(element: &Element, resolver: &MetadataResolver) -> FieldDefinition {
    let name = element.attribute("name").unwrap_or_default().to_string();
    let type_attribute = element.attribute("type");
    let data_type = DataType::resolve(element.attribute("dataType"), type_attribute);
    let editor_kind = EditorKind::resolve(type_attribute, &data_type);

    if !data_type.is_supported() {
        tracing::warn!(
            field = %name,
            data_type = %data_type,
            "Unsupported field type, keeping it as a generic field"
        );
    }

    let blocks = element.metadata_blocks();
    let metadata = resolver.select(&blocks);
    let entry = |key: &str| non_empty(metadata.and_then(|m| m.get(key)).map(|v| v.to_string()));

    if metadata.is_none() && !blocks.is_empty() {
        tracing::debug!(field = %name, "No metadata block for the requested locale");
    }

    FieldDefinition {
        label: entry("label"),
        predefined_value: entry("predefinedValue"),
        tip: entry("tip"),
        required: parse_flag(element.attribute("required")),
        repeatable: parse_flag(element.attribute("repeatable")),
        read_only: parse_flag(element.attribute("readOnly")),
        show_label: parse_flag(element.attribute("showLabel")),
        multiple: parse_flag(element.attribute("multiple")),
        index_type: non_empty(element.attribute("indexType").map(str::to_string)),
        options: element
            .children
            .iter()
            .filter(|child| child.is_option())
            .map(|option| field_option(option, resolver))
            .collect(),
        validator: validator(element, &name),
        editor_kind: Some(editor_kind),
        data_type: Some(data_type),
        name,
    }
}

fn field_option(element: &Element, resolver: &MetadataResolver) -> FieldOption {
    let blocks = element.metadata_blocks();
    let label = resolver
        .select(&blocks)
        .and_then(|entries| entries.get("label"))
        .map(|label| label.to_string());

    FieldOption::new(
        element.attribute("name").unwrap_or_default(),
        element.attribute("value").unwrap_or_default(),
        non_empty(label),
    )
}

/// Rule from a `validation` child, given as attributes or as entries.
fn validator(element: &Element, field: &str) -> Validator {
    let Some(validation) = element.children_named("validation").next() else {
        return Validator::always_valid();
    };

    let entries = validation.entries();
    let lookup = |key: &str| {
        validation
            .attribute(key)
            .or_else(|| entries.get(key).copied())
            .unwrap_or_default()
    };
    let error = match lookup("error") {
        "" => lookup("errorMessage"),
        error => error,
    };
    let map = ValidationMap::new(lookup("expression"), error);

    let validator = Validator::from_validation_map(&map);
    if validator.is_always_valid() && !map.expression.trim().is_empty() {
        tracing::debug!(field = %field, expression = %map.expression, "Validation rule ignored");
    }
    validator
}

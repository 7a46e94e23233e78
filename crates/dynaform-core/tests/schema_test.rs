mod helpers;

use dynaform_core::{
    DataType, EditorKind, EngineConfig, FieldValue, FormError, Locale, SchemaParser,
};
use helpers::fixtures::{CONTACT_FORM_XSD, DOCUMENT_FIELD_XSD};
use helpers::{single_field, spanish};

#[test]
fn test_empty_predefined_value_is_none() {
    let field = single_field(DOCUMENT_FIELD_XSD, &Locale::default());
    assert_eq!(field.predefined_value(), None);
}

#[test]
fn test_missing_locale_falls_back_to_document_default() {
    let xsd = r#"<root available-locales="en_US" default-locale="en_US">
        <dynamic-element dataType="string" name="City" type="text">
            <meta-data locale="en_US">
                <entry name="label"><![CDATA[City]]></entry>
            </meta-data>
        </dynamic-element>
    </root>"#;
    let field = single_field(xsd, &spanish());
    assert_eq!(field.label(), Some("City"));
}

#[test]
fn test_unresolvable_metadata_is_none() {
    let xsd = r#"<root default-locale="en_US">
        <dynamic-element dataType="string" name="City" type="text">
            <meta-data locale="fr_FR">
                <entry name="label"><![CDATA[Ville]]></entry>
            </meta-data>
        </dynamic-element>
    </root>"#;
    let field = single_field(xsd, &spanish());
    assert_eq!(field.label(), None);
    assert_eq!(field.predefined_value(), None);
}

#[test]
fn test_cdata_is_taken_verbatim() {
    let xsd = r#"<root default-locale="en_US">
        <dynamic-element dataType="string" name="Note" type="textarea">
            <meta-data locale="en_US">
                <entry name="label"><![CDATA[  Spaced <b>label</b>  ]]></entry>
            </meta-data>
        </dynamic-element>
    </root>"#;
    let field = single_field(xsd, &Locale::default());
    assert_eq!(field.label(), Some("  Spaced <b>label</b>  "));
    assert_eq!(field.editor_kind(), EditorKind::Textarea);
}

#[test]
fn test_contact_form_in_english() {
    let schema = dynaform_core::parse_schema(CONTACT_FORM_XSD, &Locale::new("en_US")).unwrap();
    assert_eq!(
        schema.available_locales(),
        &[Locale::new("en_US"), Locale::new("es_ES")]
    );
    assert_eq!(schema.default_locale(), Some(&Locale::new("en_US")));

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec!["FullName", "Email", "Subscribe", "Birthday", "Age", "Color", "Where"]
    );

    let full_name = schema.field("FullName").unwrap();
    assert!(full_name.is_required());
    assert_eq!(full_name.tip(), Some("As written on your ID"));

    let subscribe = schema.field("Subscribe").unwrap();
    assert_eq!(subscribe.current_value(), &FieldValue::Boolean(Some(true)));

    let birthday = schema.field("Birthday").unwrap();
    assert_eq!(birthday.current_value_as_label().as_deref(), Some("1990-01-31"));
    assert_eq!(
        birthday.current_value_as_string().as_deref(),
        Some("633744000000")
    );

    let age = schema.field("Age").unwrap();
    assert_eq!(age.data_type(), &DataType::Integer);
    assert_eq!(age.editor_kind(), EditorKind::Number);
    assert_eq!(age.index_type(), Some("keyword"));

    let color = schema.field("Color").unwrap();
    assert_eq!(color.editor_kind(), EditorKind::Select);
    assert!(color.is_multiple());
    assert_eq!(color.options().len(), 2);
    assert_eq!(color.options()[0].label.as_deref(), Some("Red"));
    assert_eq!(color.current_value_as_string().as_deref(), Some(r#"["blue"]"#));
    assert_eq!(color.current_value_as_label().as_deref(), Some("Blue"));
}

#[test]
fn test_contact_form_in_spanish() {
    let fields = dynaform_core::parse(CONTACT_FORM_XSD, &spanish()).unwrap();
    assert_eq!(fields[0].label(), Some("Nombre completo"));
    assert_eq!(fields[0].tip(), None);
    assert_eq!(fields[1].label(), Some("Email"));
    assert_eq!(fields[5].options()[1].label.as_deref(), Some("Azul"));
}

#[test]
fn test_same_language_block_is_preferred_over_default() {
    let fields = dynaform_core::parse(CONTACT_FORM_XSD, &Locale::new("es_MX")).unwrap();
    assert_eq!(fields[0].label(), Some("Nombre completo"));

    let parser = SchemaParser::with_config(EngineConfig {
        language_fallback: false,
        ..EngineConfig::default()
    });
    let fields = parser.parse(CONTACT_FORM_XSD, &Locale::new("es_MX")).unwrap();
    assert_eq!(fields[0].label(), Some("Full name"));
}

#[test]
fn test_unknown_type_degrades_without_failing() {
    let schema = dynaform_core::parse_schema(CONTACT_FORM_XSD, &Locale::default()).unwrap();
    let where_field = schema.field("Where").unwrap();
    assert_eq!(
        where_field.data_type(),
        &DataType::Unsupported("geolocation".to_string())
    );
    assert_eq!(where_field.editor_kind(), EditorKind::Unsupported);
    assert_eq!(where_field.label(), Some("Where"));
    assert!(where_field.validate());
}

#[test]
fn test_form_validation() {
    let mut schema = dynaform_core::parse_schema(CONTACT_FORM_XSD, &Locale::default()).unwrap();
    assert!(!schema.is_valid());
    let invalid: Vec<&str> = schema.invalid_fields().iter().map(|f| f.name()).collect();
    assert_eq!(invalid, vec!["FullName"]);

    let field = schema.field_mut("FullName").unwrap();
    field.set_current_value_as_string(Some("Ada Lovelace")).unwrap();

    let email = schema.field_mut("Email").unwrap();
    email.set_current_value_as_string(Some("not-an-email")).unwrap();
    assert_eq!(email.validation_error(), Some("Enter a valid email"));

    email.set_current_value_as_string(Some("ada@example.com")).unwrap();
    assert!(schema.is_valid());
}

#[test]
fn test_duplicate_names_resolve_to_last_declaration() {
    let xsd = r#"<root default-locale="en_US">
        <dynamic-element dataType="string" name="Code" type="text" required="false"/>
        <dynamic-element dataType="integer" name="Code" type="ddm-integer" required="true"/>
    </root>"#;
    let schema = dynaform_core::parse_schema(xsd, &Locale::default()).unwrap();
    assert_eq!(schema.len(), 2);
    assert_eq!(schema.field("Code").unwrap().data_type(), &DataType::Integer);
    assert!(schema.field("Code").unwrap().is_required());
}

#[test]
fn test_document_without_fields_is_empty() {
    let fields = dynaform_core::parse(
        r#"<root available-locales="en_US" default-locale="en_US"></root>"#,
        &Locale::default(),
    )
    .unwrap();
    assert!(fields.is_empty());
}

#[test]
fn test_structurally_invalid_documents_are_malformed() {
    for document in [
        "",
        "   ",
        "plain text",
        "<root><dynamic-element name=\"A\"></root>",
        "<root>",
        "{\"fields\": 3}",
    ] {
        let result = dynaform_core::parse(document, &Locale::default());
        assert!(
            matches!(result, Err(FormError::MalformedSchema(_))),
            "expected malformed schema for {:?}",
            document
        );
    }
}

#[test]
fn test_json_definition_matches_xml_semantics() {
    let document = r#"{
        "availableLanguageIds": ["en_US", "es_ES"],
        "defaultLanguageId": "en_US",
        "fields": [
            {
                "name": "Color",
                "dataType": "string",
                "type": "radio",
                "required": true,
                "label": { "en_US": "Color" },
                "predefinedValue": { "en_US": "" },
                "options": [
                    { "value": "red", "label": { "en_US": "Red", "es_ES": "Rojo" } },
                    { "value": "blue", "label": { "en_US": "Blue" } }
                ],
                "validation": { "expression": "NOT(contains(Color, \"blue\"))", "errorMessage": "No blue" }
            },
            { "name": "Attachment", "dataType": "document-library", "type": "ddm-documentlibrary" }
        ]
    }"#;

    let mut schema = dynaform_core::parse_schema(document, &spanish()).unwrap();
    let color = schema.field("Color").unwrap();
    assert_eq!(color.label(), Some("Color"));
    assert_eq!(color.predefined_value(), None);
    assert_eq!(color.editor_kind(), EditorKind::Radio);
    assert_eq!(color.options()[0].label.as_deref(), Some("Rojo"));
    assert_eq!(color.options()[1].label.as_deref(), Some("Blue"));
    assert!(!color.validate());

    let color = schema.field_mut("Color").unwrap();
    color.set_current_value_as_string(Some("blue")).unwrap();
    assert_eq!(color.validation_error(), Some("No blue"));
    color.set_current_value_as_string(Some("red")).unwrap();
    assert!(color.validate());

    let attachment = schema.field("Attachment").unwrap();
    assert!(attachment.is_artifact());
    assert_eq!(attachment.editor_kind(), EditorKind::Document);
}

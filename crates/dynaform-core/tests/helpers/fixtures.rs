//! Test fixtures: schema documents and artifact blobs.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Optional document field with an empty predefined value.
pub const DOCUMENT_FIELD_XSD: &str = concat!(
    r#"<root available-locales="en_US" default-locale="en_US"> "#,
    r#"<dynamic-element dataType="document-library" "#,
    r#"indexType="keyword" "#,
    r#"name="A_Document" "#,
    r#"readOnly="false" "#,
    r#"repeatable="true" "#,
    r#"required="false" "#,
    r#"showLabel="true" "#,
    r#"type="ddm-documentlibrary" "#,
    r#"width=""> "#,
    r#"<meta-data locale="en_US"> "#,
    r#"<entry name="label"><![CDATA[A Document]]></entry> "#,
    r#"<entry name="predefinedValue"><![CDATA[]]></entry> "#,
    r#"</meta-data> "#,
    r#"</dynamic-element> </root>"#,
);

/// Required document field.
pub const REQUIRED_DOCUMENT_FIELD_XSD: &str = concat!(
    r#"<root available-locales="en_US" default-locale="en_US"> "#,
    r#"<dynamic-element dataType="document-library" "#,
    r#"name="A_Document" "#,
    r#"required="true" "#,
    r#"type="ddm-documentlibrary"> "#,
    r#"<meta-data locale="en_US"> "#,
    r#"<entry name="label"><![CDATA[A Document]]></entry> "#,
    r#"<entry name="predefinedValue"><![CDATA[]]></entry> "#,
    r#"</meta-data> "#,
    r#"</dynamic-element> </root>"#,
);

/// Form with one field of every supported editor, labels in two locales.
pub const CONTACT_FORM_XSD: &str = r#"<?xml version="1.0"?>
<root available-locales="en_US,es_ES" default-locale="en_US">
    <dynamic-element dataType="string" name="FullName" type="text" required="true" showLabel="true">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Full name]]></entry>
            <entry name="tip"><![CDATA[As written on your ID]]></entry>
        </meta-data>
        <meta-data locale="es_ES">
            <entry name="label"><![CDATA[Nombre completo]]></entry>
        </meta-data>
    </dynamic-element>
    <dynamic-element dataType="string" name="Email" type="text">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Email]]></entry>
        </meta-data>
        <validation expression="isEmailAddress(Email)" error="Enter a valid email"/>
    </dynamic-element>
    <dynamic-element dataType="boolean" name="Subscribe" type="checkbox">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Subscribe]]></entry>
            <entry name="predefinedValue"><![CDATA[true]]></entry>
        </meta-data>
    </dynamic-element>
    <dynamic-element dataType="date" name="Birthday" type="ddm-date">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Birthday]]></entry>
            <entry name="predefinedValue"><![CDATA[01/31/1990]]></entry>
        </meta-data>
    </dynamic-element>
    <dynamic-element dataType="integer" name="Age" type="ddm-integer" indexType="keyword">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Age]]></entry>
        </meta-data>
    </dynamic-element>
    <dynamic-element dataType="string" name="Color" type="select" multiple="true">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Favorite color]]></entry>
            <entry name="predefinedValue"><![CDATA[["blue"]]]></entry>
        </meta-data>
        <dynamic-element name="option_red" type="option" value="red">
            <meta-data locale="en_US">
                <entry name="label"><![CDATA[Red]]></entry>
            </meta-data>
            <meta-data locale="es_ES">
                <entry name="label"><![CDATA[Rojo]]></entry>
            </meta-data>
        </dynamic-element>
        <dynamic-element name="option_blue" type="option" value="blue">
            <meta-data locale="en_US">
                <entry name="label"><![CDATA[Blue]]></entry>
            </meta-data>
            <meta-data locale="es_ES">
                <entry name="label"><![CDATA[Azul]]></entry>
            </meta-data>
        </dynamic-element>
    </dynamic-element>
    <dynamic-element dataType="geolocation" name="Where" type="ddm-geolocation">
        <meta-data locale="en_US">
            <entry name="label"><![CDATA[Where]]></entry>
        </meta-data>
    </dynamic-element>
</root>"#;

/// Encoded 4x4 PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut buffer = Vec::new();
    RgbaImage::new(4, 4)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode png");
    buffer
}

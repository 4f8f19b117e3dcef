//! The fixed field list every confirmation record carries.
//!
//! [`Field::ALL`] is the single authoritative order used for JSON and CSV
//! serialization, table columns and sort keys.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// ISO 8601 `YYYY-MM-DD`, kept as a string.
    Date,
    Flag,
    /// Opaque data URI, or absent.
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Id,
    ProductCodeName,
    CustomerName,
    SampleSewingDate,
    ProductionDate,
    SampleEditDetails,
    OriginalForm,
    SampleImage,
    PatternImage,
    AgreedToTerms,
    Signature,
    ConfirmationDate,
    ReportCreator,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Id,
        Field::ProductCodeName,
        Field::CustomerName,
        Field::SampleSewingDate,
        Field::ProductionDate,
        Field::SampleEditDetails,
        Field::OriginalForm,
        Field::SampleImage,
        Field::PatternImage,
        Field::AgreedToTerms,
        Field::Signature,
        Field::ConfirmationDate,
        Field::ReportCreator,
    ];

    /// Wire name as it appears in JSON keys and CSV headers.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::ProductCodeName => "productCodeName",
            Field::CustomerName => "customerName",
            Field::SampleSewingDate => "sampleSewingDate",
            Field::ProductionDate => "productionDate",
            Field::SampleEditDetails => "sampleEditDetails",
            Field::OriginalForm => "originalForm",
            Field::SampleImage => "sampleImage",
            Field::PatternImage => "patternImage",
            Field::AgreedToTerms => "agreedToTerms",
            Field::Signature => "signature",
            Field::ConfirmationDate => "confirmationDate",
            Field::ReportCreator => "reportCreator",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::SampleSewingDate | Field::ProductionDate | Field::ConfirmationDate => {
                FieldKind::Date
            }
            Field::AgreedToTerms => FieldKind::Flag,
            Field::SampleImage | Field::PatternImage | Field::Signature => FieldKind::Image,
            _ => FieldKind::Text,
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Field identifiers in schema order.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    Field::ALL.iter().map(|f| f.name())
}

/// Default value for an absent field: `""` for text and dates, `false` for
/// the agreement flag, `null` for images.
pub fn default_for(field: Field) -> JsonValue {
    match field.kind() {
        FieldKind::Text | FieldKind::Date => JsonValue::String(String::new()),
        FieldKind::Flag => JsonValue::Bool(false),
        FieldKind::Image => JsonValue::Null,
    }
}

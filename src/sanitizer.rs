//! Total coercion from arbitrary external data into a [`Record`].
//!
//! Nothing here returns an error. Whatever shape a persisted blob or an
//! imported row has, each schema field is read independently and coerced to
//! its semantic type; unknown keys are dropped.

use serde_json::{Map, Value as JsonValue};

use crate::record_model::Record;
use crate::record_schema::{Field, FieldKind};

/// Coerces one JSON value to a record. Non-object input yields a record with
/// every field at its default.
pub fn sanitize_value(value: &JsonValue) -> Record {
    match value {
        JsonValue::Object(map) => sanitize(map),
        _ => sanitize(&Map::new()),
    }
}

pub fn sanitize_all<'a, I>(values: I) -> Vec<Record>
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    values.into_iter().map(sanitize_value).collect()
}

/// Builds a record from a field-name keyed mapping.
///
/// - `agreedToTerms` is `true` only for the boolean `true` or the exact
///   string `"true"`.
/// - Text and date fields become `""` when missing or `null`, otherwise the
///   value's string form.
/// - Image fields become `None` when missing, `null` or `""`.
pub fn sanitize(map: &Map<String, JsonValue>) -> Record {
    let text = |field: Field| coerce_text(map.get(field.name()));
    let image = |field: Field| coerce_image(map.get(field.name()));

    Record {
        id: text(Field::Id),
        product_code_name: text(Field::ProductCodeName),
        customer_name: text(Field::CustomerName),
        sample_sewing_date: text(Field::SampleSewingDate),
        production_date: text(Field::ProductionDate),
        sample_edit_details: text(Field::SampleEditDetails),
        original_form: text(Field::OriginalForm),
        sample_image: image(Field::SampleImage),
        pattern_image: image(Field::PatternImage),
        agreed_to_terms: coerce_flag(map.get(Field::AgreedToTerms.name())),
        signature: image(Field::Signature),
        confirmation_date: text(Field::ConfirmationDate),
        report_creator: text(Field::ReportCreator),
    }
}

/// Same as [`sanitize`] for rows that were split out of delimited text.
pub fn sanitize_row<'a, I>(pairs: I) -> Record
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let map: Map<String, JsonValue> = pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), JsonValue::String(value.to_string())))
        .collect();
    sanitize(&map)
}

fn coerce_flag(value: Option<&JsonValue>) -> bool {
    matches!(value, Some(JsonValue::Bool(true)))
        || matches!(value, Some(JsonValue::String(s)) if s == "true")
}

fn coerce_text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_image(value: Option<&JsonValue>) -> Option<String> {
    Some(coerce_text(value)).filter(|s| !s.is_empty())
}

/// Whether a serialized value already has the semantic type of `field`.
pub fn has_expected_type(field: Field, value: &JsonValue) -> bool {
    match (field.kind(), value) {
        (FieldKind::Text | FieldKind::Date, JsonValue::String(_)) => true,
        (FieldKind::Flag, JsonValue::Bool(_)) => true,
        (FieldKind::Image, JsonValue::Null | JsonValue::String(_)) => true,
        _ => false,
    }
}

//! Data model definitions for production-confirmation records.
//!
//! This module defines [`Record`], the unit the store persists and the view
//! projects, and [`RecordDraft`], the in-progress form a host edits before a
//! record is created.

use serde::{Deserialize, Serialize};

use crate::record_schema::Field;

/// Value stored in `originalForm` when the customer asked for a new form
/// instead of reusing an existing one.
pub const NEW_FORM_SENTINEL: &str = "Tạo Form Mới";

/// One production-confirmation entry.
///
/// Field declaration order is the schema order, so serde serializes every
/// record with keys in [`Field::ALL`] order.
///
/// # Absent values
///
/// - Text and date fields use `""`.
/// - Image fields use `None`, serialized as `null`.
/// - `agreed_to_terms` is always a real boolean.
///
/// Records coming from outside the process (imports, persisted JSON) should
/// go through [`crate::sanitizer::sanitize`] rather than `serde_json::from_value`,
/// since the sanitizer tolerates missing and wrongly typed fields.
///
/// # Examples
///
/// ```rust
/// use confirmation_core::record_model::Record;
///
/// let record = Record {
///     id: "BB-100".to_string(),
///     product_code_name: "POLO-01".to_string(),
///     customer_name: "Khách C".to_string(),
///     production_date: "2025-11-02".to_string(),
///     agreed_to_terms: true,
///     ..Record::default()
/// };
///
/// let json = serde_json::to_string(&record)?;
/// assert!(json.starts_with(r#"{"id":"BB-100","productCodeName":"POLO-01""#));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique within the store; never reassigned after creation.
    pub id: String,
    pub product_code_name: String,
    pub customer_name: String,
    pub sample_sewing_date: String,
    /// Date used by the view's range filter.
    pub production_date: String,
    pub sample_edit_details: String,
    pub original_form: String,
    pub sample_image: Option<String>,
    pub pattern_image: Option<String>,
    pub agreed_to_terms: bool,
    pub signature: Option<String>,
    /// Set at creation time.
    pub confirmation_date: String,
    pub report_creator: String,
}

impl Record {
    /// String form of a field, as used by sorting and CSV export.
    ///
    /// Absent images render as `""` and the agreement flag as `"true"` or
    /// `"false"`.
    pub fn field_text(&self, field: Field) -> &str {
        match field {
            Field::Id => self.id.as_str(),
            Field::ProductCodeName => self.product_code_name.as_str(),
            Field::CustomerName => self.customer_name.as_str(),
            Field::SampleSewingDate => self.sample_sewing_date.as_str(),
            Field::ProductionDate => self.production_date.as_str(),
            Field::SampleEditDetails => self.sample_edit_details.as_str(),
            Field::OriginalForm => self.original_form.as_str(),
            Field::SampleImage => self.sample_image.as_deref().unwrap_or(""),
            Field::PatternImage => self.pattern_image.as_deref().unwrap_or(""),
            Field::AgreedToTerms => {
                if self.agreed_to_terms {
                    "true"
                } else {
                    "false"
                }
            }
            Field::Signature => self.signature.as_deref().unwrap_or(""),
            Field::ConfirmationDate => self.confirmation_date.as_str(),
            Field::ReportCreator => self.report_creator.as_str(),
        }
    }
}

/// Whether the confirmation reuses an existing base form or asks for a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormSelection {
    #[default]
    Existing,
    New,
}

/// The user-editable part of a record, as captured by the form.
///
/// `id`, `confirmationDate` and `reportCreator` are assigned when the draft is
/// turned into a [`Record`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDraft {
    pub product_code_name: String,
    pub customer_name: String,
    pub sample_sewing_date: String,
    pub production_date: String,
    pub sample_edit_details: String,
    pub original_form: String,
    pub form_selection: FormSelection,
    pub sample_image: Option<String>,
    pub pattern_image: Option<String>,
    pub agreed_to_terms: bool,
    pub signature: Option<String>,
}

impl RecordDraft {
    /// Switches between reusing a form and requesting a new one. Choosing
    /// [`FormSelection::New`] fills the sentinel; going back clears it.
    pub fn select_form(&mut self, selection: FormSelection) {
        self.form_selection = selection;
        self.original_form = match selection {
            FormSelection::New => NEW_FORM_SENTINEL.to_string(),
            FormSelection::Existing => String::new(),
        };
    }

    /// A draft that asks for a new form always carries the sentinel, whatever
    /// `originalForm` held.
    pub fn into_record(
        self,
        id: String,
        confirmation_date: String,
        report_creator: String,
    ) -> Record {
        Record {
            id,
            product_code_name: self.product_code_name,
            customer_name: self.customer_name,
            sample_sewing_date: self.sample_sewing_date,
            production_date: self.production_date,
            sample_edit_details: self.sample_edit_details,
            original_form: match self.form_selection {
                FormSelection::New => NEW_FORM_SENTINEL.to_string(),
                FormSelection::Existing => self.original_form,
            },
            sample_image: self.sample_image.filter(|uri| !uri.is_empty()),
            pattern_image: self.pattern_image.filter(|uri| !uri.is_empty()),
            agreed_to_terms: self.agreed_to_terms,
            signature: self.signature.filter(|uri| !uri.is_empty()),
            confirmation_date,
            report_creator,
        }
    }
}

/// Built-in records used when nothing usable is persisted and by reset.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record {
            id: "BB-001".to_string(),
            product_code_name: "TSHIRT-POLO/2025".to_string(),
            customer_name: "Khách A".to_string(),
            sample_sewing_date: "2025-10-01".to_string(),
            production_date: "2025-10-05".to_string(),
            sample_edit_details: "May lại cổ áo, chỉnh form vai.".to_string(),
            original_form: "Form Regular".to_string(),
            sample_image: None,
            pattern_image: None,
            agreed_to_terms: true,
            signature: None,
            confirmation_date: "2025-10-06".to_string(),
            report_creator: "Phúc Hoàng".to_string(),
        },
        Record {
            id: "BB-002".to_string(),
            product_code_name: "HOODIE-HCM/GRAY".to_string(),
            customer_name: "Khách B".to_string(),
            sample_sewing_date: "2025-10-10".to_string(),
            production_date: "2025-10-15".to_string(),
            sample_edit_details: "Bổ sung bo tay, giảm độ rộng thân 1cm.".to_string(),
            original_form: "Form Oversize".to_string(),
            sample_image: None,
            pattern_image: None,
            agreed_to_terms: false,
            signature: None,
            confirmation_date: "2025-10-16".to_string(),
            report_creator: "INPETPHUCHOANG".to_string(),
        },
    ]
}

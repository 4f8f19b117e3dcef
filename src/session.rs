//! Command handlers a host UI invokes: create, update, delete, filter, sort,
//! import, reset, export.
//!
//! An [`AppSession`] owns the [`RecordStore`] and the current [`ViewState`];
//! the displayed rows are recomputed from both on every call to
//! [`AppSession::view`], never cached.

use chrono::{Local, Utc};
use log::info;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::exporters::{to_csv, to_json};
use crate::pdf_export::{PdfArtifact, PdfDocument, PdfExporter, ReportRenderer};
use crate::persistence::KeyValueStore;
use crate::query_view::{project, FilterCriteria, ViewRow, ViewState};
use crate::record_model::{FormSelection, Record, RecordDraft};
use crate::record_schema::Field;
use crate::record_store::RecordStore;

pub struct AppSession<S: KeyValueStore> {
    store: RecordStore<S>,
    view: ViewState,
    report_creator: String,
    pdf: PdfExporter,
}

/// Presence checks run before a draft becomes a record. The draft is only
/// borrowed, so a rejected form keeps its input.
pub fn validate_draft(draft: &RecordDraft) -> Result<(), AppResponse> {
    if draft.customer_name.trim().is_empty() || draft.product_code_name.trim().is_empty() {
        return Err(AppResponse::ValidationError(
            "Customer name and product code are required".to_string(),
        ));
    }
    if draft.form_selection == FormSelection::Existing && draft.original_form.trim().is_empty() {
        return Err(AppResponse::ValidationError(
            "Original form number is required when reusing a form".to_string(),
        ));
    }
    if !draft.agreed_to_terms {
        return Err(AppResponse::ValidationError(
            "The customer must agree to the terms".to_string(),
        ));
    }
    if draft.signature.as_deref().map_or(true, str::is_empty) {
        return Err(AppResponse::ValidationError(
            "A customer signature is required".to_string(),
        ));
    }
    Ok(())
}

impl<S: KeyValueStore> AppSession<S> {
    pub fn open(backend: S, config: &StoreConfig) -> Self {
        Self {
            store: RecordStore::open(backend, config),
            view: ViewState::default(),
            report_creator: config.report_creator.clone(),
            pdf: PdfExporter::new(),
        }
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn view(&self) -> Vec<ViewRow<'_>> {
        project(self.store.records(), &self.view)
    }

    /// Validates the draft, stamps id, confirmation date and creator, and
    /// appends the new record.
    pub fn create_record(&mut self, draft: &RecordDraft) -> Result<Record, AppResponse> {
        validate_draft(draft)?;

        let record = draft.clone().into_record(
            self.next_id(),
            Local::now().format("%Y-%m-%d").to_string(),
            self.report_creator.clone(),
        );
        self.store.append(record.clone())?;
        info!("Created record {}", record.id);
        Ok(record)
    }

    /// Replaces the record at a store position. `id` and `confirmationDate`
    /// are carried over from the existing record.
    pub fn update_record(
        &mut self,
        position: usize,
        mut record: Record,
    ) -> Result<Record, AppResponse> {
        let current = self
            .store
            .get(position)
            .ok_or_else(|| AppResponse::out_of_range(position, self.store.len()))?;
        record.id = current.id.clone();
        record.confirmation_date = current.confirmation_date.clone();

        self.store.replace_at(position, record.clone())?;
        Ok(record)
    }

    pub fn delete_record(&mut self, position: usize) -> Result<Record, AppResponse> {
        let removed = self.store.remove_at(position)?;
        info!("Deleted record {}", removed.id);
        Ok(removed)
    }

    pub fn apply_filter(&mut self, criteria: FilterCriteria) {
        self.view.criteria = criteria;
    }

    pub fn clear_filter(&mut self) {
        self.view.criteria = FilterCriteria::default();
    }

    pub fn set_sort(&mut self, key: Field) {
        self.view.sort.toggle(key);
    }

    pub fn import(&mut self, file_name: &str, text: &str) -> Result<usize, AppResponse> {
        self.store.import(file_name, text)
    }

    pub fn reset_to_sample(&mut self) -> Result<(), AppResponse> {
        self.store.reset_to_sample()
    }

    /// The full record set, regardless of the active filter.
    pub fn export_json(&self) -> Result<String, AppResponse> {
        to_json(self.store.records())
    }

    pub fn export_csv(&self) -> String {
        to_csv(self.store.records())
    }

    pub fn save_draft(&mut self, draft: &RecordDraft) -> Result<(), AppResponse> {
        self.store.save_draft(draft)
    }

    pub fn load_draft(&self) -> Result<Option<RecordDraft>, AppResponse> {
        self.store.load_draft()
    }

    pub async fn export_pdf<R, D>(
        &self,
        renderer: &R,
        document: D,
        position: usize,
    ) -> Result<PdfArtifact, AppResponse>
    where
        R: ReportRenderer,
        D: PdfDocument,
    {
        let record = self
            .store
            .get(position)
            .ok_or_else(|| AppResponse::out_of_range(position, self.store.len()))?;
        self.pdf.export_record(renderer, document, record).await
    }

    /// One PDF holding every row of the current view, in view order.
    pub async fn export_view_pdf<R, D>(
        &self,
        renderer: &R,
        document: D,
    ) -> Result<PdfArtifact, AppResponse>
    where
        R: ReportRenderer,
        D: PdfDocument,
    {
        let records: Vec<Record> = self.view().into_iter().map(|row| row.record.clone()).collect();
        self.pdf.export_records(renderer, document, &records).await
    }

    pub fn into_backend(self) -> S {
        self.store.into_backend()
    }

    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.store.contains_id(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

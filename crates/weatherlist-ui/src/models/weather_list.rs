//! The synchronized weather list.
//!
//! `WeatherListModel` owns the in-memory collection, the page index, the
//! new-record draft and the notification banner. User actions either change
//! local state directly (field edits, paging) or start a gateway call through
//! `services::weather_service`. Completed calls come back as
//! `WeatherServiceMessage`s and are reconciled against whatever the state is
//! *then*, always by record id.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use weatherlist_core::{AppError, Config};
use weatherlist_services::{RecordField, RecordId, WeatherDraft, WeatherGateway, WeatherRecord};

use crate::notification::{Notification, NotificationScheduler};
use crate::pager::{self, PageWindow};
use crate::services::weather_service::{self, RequestSeq, WeatherServiceMessage};

pub const MSG_ADDED: &str = "Weather added successfully";
pub const MSG_UPDATED: &str = "Weather updated successfully";
pub const MSG_DELETED: &str = "Weather deleted successfully";
pub const MSG_REFRESH_FAILED: &str = "Error refreshing weather";

/// Which result set the collection currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Full list from the last fetch.
    #[default]
    All,
    /// Result of a search.
    Searched,
}

/// One collection slot: the last server-confirmed copy plus any local edit on top.
#[derive(Debug, Clone)]
struct Entry {
    server: WeatherRecord,
    overlay: Option<WeatherRecord>,
}

impl Entry {
    fn new(server: WeatherRecord) -> Self {
        Self {
            server,
            overlay: None,
        }
    }

    fn id(&self) -> RecordId {
        self.server.id
    }

    fn visible(&self) -> &WeatherRecord {
        self.overlay.as_ref().unwrap_or(&self.server)
    }
}

pub struct WeatherListModel {
    gateway: Arc<dyn WeatherGateway>,
    runtime: Handle,
    tx: UnboundedSender<WeatherServiceMessage>,
    rx: UnboundedReceiver<WeatherServiceMessage>,

    entries: Vec<Entry>,
    mode: ViewMode,
    search_query: String,
    draft: WeatherDraft,
    current_page: usize,
    items_per_page: usize,
    notifications: NotificationScheduler,

    next_seq: RequestSeq,
    /// Only the newest collection-replacing request may land.
    latest_replace: RequestSeq,
    in_flight: usize,
}

impl WeatherListModel {
    pub fn new(gateway: Arc<dyn WeatherGateway>, runtime: Handle, config: &Config) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let notifications = NotificationScheduler::new(&config.notifications, runtime.clone());

        Self {
            gateway,
            runtime,
            tx,
            rx,
            entries: Vec::new(),
            mode: ViewMode::All,
            search_query: String::new(),
            draft: WeatherDraft::default(),
            current_page: 1,
            items_per_page: config.view.items_per_page.max(1),
            notifications,
            next_seq: 0,
            latest_replace: 0,
            in_flight: 0,
        }
    }

    // ===== Read side =====

    /// Records in collection order, local edits applied.
    pub fn records(&self) -> impl Iterator<Item = &WeatherRecord> + '_ {
        self.entries.iter().map(Entry::visible)
    }

    pub fn record(&self, id: RecordId) -> Option<&WeatherRecord> {
        self.entry(id).map(Entry::visible)
    }

    /// Last copy the server confirmed for `id`, ignoring local edits.
    pub fn server_record(&self, id: RecordId) -> Option<&WeatherRecord> {
        self.entry(id).map(|e| &e.server)
    }

    pub fn has_pending_edit(&self, id: RecordId) -> bool {
        self.entry(id).is_some_and(|e| e.overlay.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn draft(&self) -> &WeatherDraft {
        &self.draft
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Pagination for the current collection, derived fresh on every call.
    pub fn window(&self) -> PageWindow {
        pager::compute_window(self.entries.len(), self.items_per_page, self.current_page)
    }

    /// Records on the current page.
    pub fn page_records(&self) -> Vec<&WeatherRecord> {
        let window = self.window();
        self.entries[window.slice].iter().map(Entry::visible).collect()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    pub fn notifications(&self) -> &NotificationScheduler {
        &self.notifications
    }

    pub fn dismiss_notification(&mut self) {
        self.notifications.dismiss();
    }

    /// Gateway calls started but not yet reconciled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // ===== Local-only edits =====

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Change one field of a listed record without contacting the service.
    ///
    /// Returns false when no record has this id.
    pub fn edit_field(&mut self, id: RecordId, field: RecordField, value: impl Into<String>) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            tracing::debug!("Ignoring edit for unknown record {}", id);
            return false;
        };
        let Entry { server, overlay } = entry;
        let edited = overlay.get_or_insert_with(|| server.clone());
        edited.set_field(field, value);
        // Typing a field back to the confirmed value leaves nothing to commit
        if edited == server {
            *overlay = None;
        }
        true
    }

    /// Drop the local edit for `id` and show the server copy again.
    pub fn discard_edit(&mut self, id: RecordId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => entry.overlay.take().is_some(),
            None => false,
        }
    }

    pub fn edit_draft(&mut self, field: RecordField, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }

    pub fn set_draft(&mut self, draft: WeatherDraft) {
        self.draft = draft;
    }

    /// Move to `page`, clamped into the pages that exist.
    pub fn set_page(&mut self, page: usize) {
        let total = pager::total_pages(self.entries.len(), self.items_per_page);
        let clamped = pager::clamp_page(page, total);
        if clamped != page {
            tracing::debug!("Page {} out of range, clamped to {}", page, clamped);
        }
        self.current_page = clamped;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    // ===== Gateway-backed actions =====

    /// Replace the collection with the full list from the service.
    pub fn load_all(&mut self) {
        let seq = self.begin_replace();
        tracing::debug!("Loading all weather records (request {})", seq);
        weather_service::request_fetch_all(&self.tx, &self.runtime, self.gateway.clone(), seq);
    }

    /// Search by city. An empty query shows everything again.
    pub fn search(&mut self, query: &str) {
        if query.is_empty() {
            self.search_query.clear();
            self.load_all();
            return;
        }

        self.search_query = query.to_string();
        let seq = self.begin_replace();
        tracing::debug!("Searching for '{}' (request {})", query, seq);
        weather_service::request_search(
            &self.tx,
            &self.runtime,
            self.gateway.clone(),
            seq,
            query.to_string(),
        );
    }

    /// Submit whatever is in the search box.
    pub fn submit_search(&mut self) {
        let query = self.search_query.clone();
        self.search(&query);
    }

    /// Show every record whose condition text matches.
    pub fn search_by_condition(&mut self, text: &str) {
        if text.is_empty() {
            self.load_all();
            return;
        }

        let seq = self.begin_replace();
        weather_service::request_condition_search(
            &self.tx,
            &self.runtime,
            self.gateway.clone(),
            seq,
            text.to_string(),
        );
    }

    /// Show every record at exactly `temperature` degrees.
    pub fn search_by_temperature(&mut self, temperature: f64) {
        let seq = self.begin_replace();
        weather_service::request_temperature_search(
            &self.tx,
            &self.runtime,
            self.gateway.clone(),
            seq,
            temperature,
        );
    }

    /// Send the current version of `id` (local edits included) to the service.
    ///
    /// Returns false when no record has this id; nothing is sent then.
    pub fn commit(&mut self, id: RecordId) -> bool {
        let Some(record) = self.record(id).cloned() else {
            tracing::warn!("Cannot commit unknown record {}", id);
            return false;
        };
        self.in_flight += 1;
        weather_service::request_update(&self.tx, &self.runtime, self.gateway.clone(), record);
        true
    }

    /// Ask the service to delete `id`; the record stays listed until it confirms.
    pub fn remove(&mut self, id: RecordId) -> bool {
        if self.entry(id).is_none() {
            tracing::warn!("Cannot delete unknown record {}", id);
            return false;
        }
        self.in_flight += 1;
        weather_service::request_delete(&self.tx, &self.runtime, self.gateway.clone(), id);
        true
    }

    /// Create a record from the draft buffer.
    pub fn add(&mut self) {
        self.in_flight += 1;
        weather_service::request_create(
            &self.tx,
            &self.runtime,
            self.gateway.clone(),
            self.draft.clone(),
        );
    }

    /// Create several records in one call; the draft buffer is not involved.
    pub fn add_bulk(&mut self, drafts: Vec<WeatherDraft>) {
        if drafts.is_empty() {
            return;
        }
        self.in_flight += 1;
        weather_service::request_create_bulk(&self.tx, &self.runtime, self.gateway.clone(), drafts);
    }

    /// Re-read `id` from the service. Local edits are kept on top of the fresh copy.
    pub fn refresh(&mut self, id: RecordId) -> bool {
        if self.entry(id).is_none() {
            return false;
        }
        self.in_flight += 1;
        weather_service::request_refresh(&self.tx, &self.runtime, self.gateway.clone(), id);
        true
    }

    // ===== Reconciliation =====

    /// Apply every response that has already arrived. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Wait until every started gateway call has been reconciled.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(message) => self.apply(message),
                None => break,
            }
        }
    }

    fn apply(&mut self, message: WeatherServiceMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match message {
            WeatherServiceMessage::FetchAllDone { seq, result } => {
                if self.is_stale(seq) {
                    return;
                }
                match result {
                    Ok(records) => {
                        tracing::info!("Loaded {} weather records", records.len());
                        self.replace_collection(records, ViewMode::All);
                    }
                    Err(e) => self.report(e),
                }
            }
            WeatherServiceMessage::SearchDone { seq, query, result } => {
                if self.is_stale(seq) {
                    return;
                }
                match result {
                    Ok(record) => {
                        tracing::info!("Search '{}' matched record {}", query, record.id);
                        self.replace_collection(vec![record], ViewMode::Searched);
                    }
                    Err(e) => self.report(e),
                }
            }
            WeatherServiceMessage::ConditionSearchDone { seq, text, result } => {
                if self.is_stale(seq) {
                    return;
                }
                match result {
                    Ok(records) => {
                        tracing::info!("Condition '{}' matched {} records", text, records.len());
                        self.replace_collection(records, ViewMode::Searched);
                    }
                    Err(e) => self.report(e),
                }
            }
            WeatherServiceMessage::TemperatureSearchDone {
                seq,
                temperature,
                result,
            } => {
                if self.is_stale(seq) {
                    return;
                }
                match result {
                    Ok(records) => {
                        tracing::info!("{} records at {} degrees", records.len(), temperature);
                        self.replace_collection(records, ViewMode::Searched);
                    }
                    Err(e) => self.report(e),
                }
            }
            WeatherServiceMessage::RefreshDone { id, result } => match result {
                Ok(record) => match self.entry_mut(id) {
                    Some(entry) => entry.server = record,
                    None => tracing::debug!("Refreshed record {} is no longer listed", id),
                },
                Err(e) => {
                    tracing::warn!("Refresh of record {} failed: {}", id, e);
                    self.notifications.error(MSG_REFRESH_FAILED);
                }
            },
            WeatherServiceMessage::CreateDone { sent, result } => match result {
                Ok(record) => {
                    self.append(record);
                    // Keep anything typed while the request was out
                    if self.draft == sent {
                        self.draft = WeatherDraft::default();
                    }
                    self.notifications.success(MSG_ADDED);
                }
                Err(e) => self.report(e),
            },
            WeatherServiceMessage::BulkCreateDone { result } => match result {
                Ok(records) => {
                    for record in records {
                        self.append(record);
                    }
                    self.notifications.success(MSG_ADDED);
                }
                Err(e) => self.report(e),
            },
            WeatherServiceMessage::UpdateDone { id, sent, result } => match result {
                Ok(canonical) => {
                    match self.entry_mut(id) {
                        Some(entry) => {
                            entry.server = canonical;
                            // A newer local edit made after the commit stays pending
                            if entry.overlay.as_ref() == Some(&sent) {
                                entry.overlay = None;
                            }
                        }
                        None => tracing::debug!("Updated record {} is no longer listed", id),
                    }
                    self.notifications.success(MSG_UPDATED);
                }
                Err(e) => self.report(e),
            },
            WeatherServiceMessage::DeleteDone { id, result } => match result {
                Ok(()) => {
                    self.entries.retain(|e| e.id() != id);
                    self.clamp_page();
                    self.notifications.success(MSG_DELETED);
                }
                Err(e) => self.report(e),
            },
        }
    }

    fn begin_replace(&mut self) -> RequestSeq {
        self.next_seq += 1;
        self.latest_replace = self.next_seq;
        self.in_flight += 1;
        self.next_seq
    }

    fn is_stale(&self, seq: RequestSeq) -> bool {
        let stale = seq != self.latest_replace;
        if stale {
            tracing::debug!(
                "Dropping response to request {} (latest is {})",
                seq,
                self.latest_replace
            );
        }
        stale
    }

    /// Swap in a new result set. Local edits survive for records still present.
    fn replace_collection(&mut self, records: Vec<WeatherRecord>, mode: ViewMode) {
        let mut previous = std::mem::take(&mut self.entries);
        self.entries = Vec::with_capacity(records.len());

        for record in records {
            if self.entry(record.id).is_some() {
                tracing::warn!("Duplicate record id {} in response, keeping first", record.id);
                continue;
            }
            let overlay = previous
                .iter_mut()
                .find(|e| e.id() == record.id)
                .and_then(|e| e.overlay.take());
            self.entries.push(Entry {
                server: record,
                overlay,
            });
        }

        self.mode = mode;
        self.current_page = 1;
    }

    fn append(&mut self, record: WeatherRecord) {
        if self.entry(record.id).is_some() {
            tracing::debug!("Record {} already listed", record.id);
            return;
        }
        self.entries.push(Entry::new(record));
    }

    fn clamp_page(&mut self) {
        let total = pager::total_pages(self.entries.len(), self.items_per_page);
        self.current_page = pager::clamp_page(self.current_page, total);
    }

    fn report(&mut self, error: impl Into<AppError>) {
        let error = error.into();
        tracing::error!("Weather operation failed: {}", error);
        self.notifications.error(error.user_message());
    }

    fn entry(&self, id: RecordId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    fn entry_mut(&mut self, id: RecordId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }
}

impl std::fmt::Debug for WeatherListModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherListModel")
            .field("len", &self.entries.len())
            .field("mode", &self.mode)
            .field("current_page", &self.current_page)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

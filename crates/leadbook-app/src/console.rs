// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::chat::capitalize;
use crate::{
    AgentEndpoint, ChatBridge, Lead, LeadCache, LeadId, LeadPatch, LeadQuery, LeadStore,
    MutationKind, NewLead, NewLeadForm, PendingChat, SearchField, Selection, SyncError,
    filter_leads, page_count, page_slice,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Chat,
    Reset,
}

/// When the cache has to be reloaded after an operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    AfterSuccess,
    Always,
    Never,
}

impl Operation {
    /// Lead mutations reload only once the server accepted them. Chat always
    /// reloads because the agent may have written leads even when the reply
    /// failed to arrive.
    pub const fn reload_policy(self) -> ReloadPolicy {
        match self {
            Self::Create | Self::Update | Self::Delete => ReloadPolicy::AfterSuccess,
            Self::Chat => ReloadPolicy::Always,
            Self::Reset => ReloadPolicy::Never,
        }
    }
}

impl ReloadPolicy {
    pub const fn decide(self, succeeded: bool) -> Reload {
        match (self, succeeded) {
            (Self::Always, _) | (Self::AfterSuccess, true) => Reload::Needed,
            _ => Reload::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    Needed,
    Skip,
}

impl Reload {
    pub const fn is_needed(self) -> bool {
        matches!(self, Self::Needed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Outcome<T> {
    pub result: Result<T, SyncError>,
    pub reload: Reload,
}

impl<T> Outcome<T> {
    fn new(operation: Operation, result: Result<T, SyncError>) -> Self {
        let reload = operation.reload_policy().decide(result.is_ok());
        Self { result, reload }
    }

    fn ignored() -> Self
    where
        T: Default,
    {
        Self {
            result: Ok(T::default()),
            reload: Reload::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Application context: lead cache, table query, detail selection and agent
/// chat, plus the notices raised while driving them.
///
/// Remote work is split into `begin_*`/`finish_*` halves so a caller can run
/// the request elsewhere and apply the completion later. The blocking
/// helpers (`refresh`, `create`, `save`, ...) run both halves inline.
#[derive(Debug, Clone, Default)]
pub struct Console {
    cache: LeadCache,
    query: LeadQuery,
    page: usize,
    selection: Selection,
    saving: Option<LeadId>,
    chat: ChatBridge,
    notices: Vec<Notice>,
}

impl Console {
    pub fn cache(&self) -> &LeadCache {
        &self.cache
    }

    pub fn query(&self) -> &LeadQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: LeadQuery) {
        self.query = query;
        self.page = 0;
    }

    pub fn search_text_mut(&mut self, field: SearchField) -> &mut String {
        self.page = 0;
        self.query.text_mut(field)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn chat(&self) -> &ChatBridge {
        &self.chat
    }

    pub fn visible_leads(&self) -> Vec<&Lead> {
        filter_leads(self.cache.leads(), &self.query)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.visible_leads().len())
    }

    pub fn visible_page(&self) -> Vec<&Lead> {
        page_slice(&self.visible_leads(), self.page).to_vec()
    }

    pub fn turn_page(&mut self, delta: isize) {
        let last = self.page_count() as isize - 1;
        self.page = (self.page as isize + delta).clamp(0, last) as usize;
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn report(&mut self, error: &SyncError) {
        warn!(%error, "console operation failed");
        self.notify(NoticeLevel::Error, capitalize(&error.to_string()));
    }

    pub fn begin_refresh(&mut self) {
        debug!("refreshing lead cache");
        self.cache.set_loading(true);
    }

    /// Swaps in the fetched collection, or keeps the previous one on failure.
    pub fn finish_refresh(&mut self, fetched: Result<Vec<Lead>>) -> Result<(), SyncError> {
        match fetched {
            Ok(leads) => {
                info!(count = leads.len(), "lead cache refreshed");
                self.cache.replace(leads);
                self.selection.sync_with(&self.cache);
                self.turn_page(0);
                Ok(())
            }
            Err(error) => {
                self.cache.set_loading(false);
                let error = SyncError::fetch(&error);
                self.report(&error);
                Err(error)
            }
        }
    }

    pub fn begin_create(&mut self, form: &NewLeadForm) -> Result<NewLead, SyncError> {
        form.validate().map_err(|error| {
            let error = SyncError::invalid(&error);
            self.report(&error);
            error
        })
    }

    pub fn finish_create(&mut self, created: Result<Lead>) -> Outcome<Lead> {
        let result = match created {
            Ok(lead) => {
                info!(id = %lead.id, company = %lead.company_name, "lead created");
                self.notify(NoticeLevel::Success, "Lead added successfully");
                Ok(lead)
            }
            Err(error) => {
                let error = SyncError::mutation(MutationKind::Create, &error);
                self.report(&error);
                Err(error)
            }
        };
        Outcome::new(Operation::Create, result)
    }

    /// Update request for the lead being edited; `None` outside edit mode.
    /// Refused while an earlier update is still in flight.
    pub fn begin_save(&mut self) -> Option<Result<(LeadId, LeadPatch), SyncError>> {
        let request = self.selection.begin_save()?;
        if let Some(id) = self.saving {
            let error = SyncError::Invalid {
                message: format!("update of lead {id} is still in progress"),
            };
            self.report(&error);
            return Some(Err(error));
        }
        Some(match request {
            Ok((id, patch)) => {
                self.saving = Some(id);
                Ok((id, patch))
            }
            Err(error) => {
                let error = SyncError::invalid(&error);
                self.report(&error);
                Err(error)
            }
        })
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// On success the panel shows the record the server returned. On failure
    /// the panel stays in edit mode with the draft intact.
    pub fn finish_save(&mut self, updated: Result<Lead>) -> Outcome<Lead> {
        self.saving = None;
        let result = match updated {
            Ok(lead) => {
                info!(id = %lead.id, status = lead.status.as_str(), "lead updated");
                self.selection.save_succeeded(lead.clone());
                self.notify(NoticeLevel::Success, "Lead updated");
                Ok(lead)
            }
            Err(error) => {
                let error = SyncError::mutation(MutationKind::Update, &error);
                self.report(&error);
                Err(error)
            }
        };
        Outcome::new(Operation::Update, result)
    }

    pub fn finish_delete(&mut self, id: LeadId, deleted: Result<()>) -> Outcome<()> {
        let result = match deleted {
            Ok(()) => {
                info!(%id, "lead deleted");
                self.selection.lead_deleted(id);
                self.notify(NoticeLevel::Success, "Lead deleted");
                Ok(())
            }
            Err(error) => {
                let error = SyncError::mutation(MutationKind::Delete, &error);
                self.report(&error);
                Err(error)
            }
        };
        Outcome::new(Operation::Delete, result)
    }

    pub fn begin_chat(&mut self, text: &str) -> Option<PendingChat> {
        let pending = self.chat.begin_send(text)?;
        debug!(request_id = pending.request_id, "chat request issued");
        Some(pending)
    }

    /// Records the agent's reply in the transcript. Stale completions are
    /// dropped without a reload.
    pub fn finish_chat(&mut self, request_id: u64, reply: Result<String>) -> Outcome<()> {
        let result = reply.map_err(|error| SyncError::agent(&error));
        if let Err(error) = &result {
            warn!(%error, request_id, "chat request failed");
        }
        if !self.chat.finish_send(request_id, result.clone()) {
            debug!(request_id, "ignoring stale chat completion");
            return Outcome::ignored();
        }
        Outcome::new(Operation::Chat, result.map(|_| ()))
    }

    /// Reset is refused while a chat request is in flight.
    pub fn begin_reset(&mut self) -> bool {
        if self.chat.is_processing() {
            self.notify(NoticeLevel::Info, "Wait for the agent to answer before resetting");
            return false;
        }
        true
    }

    pub fn finish_reset(&mut self, reset: Result<()>) -> Outcome<()> {
        let result = match reset {
            Ok(()) => {
                info!("agent session reset");
                self.chat.reset();
                self.notify(NoticeLevel::Success, "New chat session started");
                Ok(())
            }
            Err(error) => {
                let error = SyncError::reset(&error);
                self.report(&error);
                Err(error)
            }
        };
        Outcome::new(Operation::Reset, result)
    }

    pub fn refresh<S: LeadStore + ?Sized>(&mut self, store: &S) -> Result<(), SyncError> {
        self.begin_refresh();
        self.finish_refresh(store.list_leads())
    }

    pub fn create<S: LeadStore + ?Sized>(
        &mut self,
        store: &S,
        form: &NewLeadForm,
    ) -> Result<Lead, SyncError> {
        let lead = self.begin_create(form)?;
        let outcome = self.finish_create(store.create_lead(&lead));
        self.settle(store, outcome)
    }

    pub fn save<S: LeadStore + ?Sized>(&mut self, store: &S) -> Result<Lead, SyncError> {
        let Some(request) = self.begin_save() else {
            let error = SyncError::Invalid {
                message: "no lead is being edited".to_owned(),
            };
            self.report(&error);
            return Err(error);
        };
        let (id, patch) = request?;
        let outcome = self.finish_save(store.update_lead(id, &patch));
        self.settle(store, outcome)
    }

    pub fn delete<S: LeadStore + ?Sized>(&mut self, store: &S, id: LeadId) -> Result<(), SyncError> {
        let outcome = self.finish_delete(id, store.delete_lead(id));
        self.settle(store, outcome)
    }

    /// Sends one chat message and waits for the reply. Returns false when the
    /// input was blank or another request is still in flight.
    pub fn send_chat<S: LeadStore + AgentEndpoint + ?Sized>(&mut self, store: &S, text: &str) -> bool {
        let Some(pending) = self.begin_chat(text) else {
            return false;
        };
        let outcome = self.finish_chat(pending.request_id, store.chat(&pending.message));
        let _ = self.settle(store, outcome);
        true
    }

    pub fn reset_chat<S: AgentEndpoint + ?Sized>(&mut self, store: &S) -> Result<(), SyncError> {
        if !self.begin_reset() {
            return Ok(());
        }
        self.finish_reset(store.reset()).result
    }

    // A failed reload is already reported as its own notice; the outcome of
    // the operation itself is unaffected.
    fn settle<S: LeadStore + ?Sized, T>(&mut self, store: &S, outcome: Outcome<T>) -> Result<T, SyncError> {
        if outcome.reload.is_needed() {
            let _ = self.refresh(store);
        }
        outcome.result
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{Lead, LeadCache, LeadDraft, LeadId, LeadPatch};

/// The detail panel: at most one lead, held by value.
///
/// The held copy can drift from the cache until [`Selection::sync_with`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    Viewing(Lead),
    Editing {
        lead: Lead,
        draft: LeadDraft,
    },
}

impl Selection {
    pub fn open(&mut self, lead: Lead) {
        *self = Self::Viewing(lead);
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Returns false unless a lead was being viewed.
    pub fn edit(&mut self) -> bool {
        let Self::Viewing(lead) = self else {
            return false;
        };
        let lead = lead.clone();
        let draft = LeadDraft::from_lead(&lead);
        *self = Self::Editing { lead, draft };
        true
    }

    pub fn cancel(&mut self) -> bool {
        let Self::Editing { lead, .. } = self else {
            return false;
        };
        *self = Self::Viewing(lead.clone());
        true
    }

    /// Validated update request for the lead being edited, or `None` when not
    /// editing. The selection stays in `Editing` until the outcome is known.
    pub fn begin_save(&self) -> Option<Result<(LeadId, LeadPatch)>> {
        let Self::Editing { lead, draft } = self else {
            return None;
        };
        Some(draft.validate().map(|()| (lead.id, draft.to_patch())))
    }

    /// Shows the server's copy. Ignored if the panel moved on to another lead
    /// while the update was in flight.
    pub fn save_succeeded(&mut self, updated: Lead) -> bool {
        if self.selected_id() != Some(updated.id) {
            return false;
        }
        *self = Self::Viewing(updated);
        true
    }

    pub fn lead_deleted(&mut self, id: LeadId) -> bool {
        if self.selected_id() == Some(id) {
            *self = Self::Closed;
            return true;
        }
        false
    }

    /// Re-points a viewed lead at the freshly loaded record and closes the
    /// panel if the lead no longer exists. Drafts are never touched.
    pub fn sync_with(&mut self, cache: &LeadCache) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(current) = cache.get(id) else {
            *self = Self::Closed;
            return;
        };
        if let Self::Viewing(lead) = self
            && lead != current
        {
            *lead = current.clone();
        }
    }

    pub fn lead(&self) -> Option<&Lead> {
        match self {
            Self::Closed => None,
            Self::Viewing(lead) | Self::Editing { lead, .. } => Some(lead),
        }
    }

    pub fn selected_id(&self) -> Option<LeadId> {
        self.lead().map(|lead| lead.id)
    }

    pub fn draft(&self) -> Option<&LeadDraft> {
        match self {
            Self::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut LeadDraft> {
        match self {
            Self::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::{Lead, LeadCache, LeadId, LeadStatus};

    fn lead(id: i64, name: &str) -> Lead {
        Lead {
            id: LeadId::new(id),
            company_name: name.to_owned(),
            website_url: format!("https://{id}.test"),
            location: "Paris".to_owned(),
            industry: "Retail".to_owned(),
            employee_count: "0-50".to_owned(),
            product: None,
            product_type: None,
            transport_modes: vec!["Road".to_owned()],
            import_locations: Vec::new(),
            export_locations: Vec::new(),
            status: LeadStatus::New,
        }
    }

    #[test]
    fn open_discards_unsaved_draft() {
        let mut selection = Selection::default();
        selection.open(lead(1, "Acme"));
        assert!(selection.edit());
        if let Some(draft) = selection.draft_mut() {
            draft.company_name = "Changed".to_owned();
        }

        selection.open(lead(2, "Blue"));
        assert_eq!(selection, Selection::Viewing(lead(2, "Blue")));
    }

    #[test]
    fn edit_then_cancel_restores_viewed_record() {
        let original = lead(1, "Acme");
        let mut selection = Selection::default();
        selection.open(original.clone());
        let before = selection.clone();

        assert!(selection.edit());
        if let Some(draft) = selection.draft_mut() {
            draft.transport_modes = "Sea, Air".to_owned();
            draft.status = LeadStatus::Qualified;
        }
        assert!(selection.cancel());

        assert_eq!(selection, before);
        assert_eq!(selection.lead(), Some(&original));
    }

    #[test]
    fn edit_and_cancel_are_no_ops_in_wrong_state() {
        let mut selection = Selection::default();
        assert!(!selection.edit());
        assert!(!selection.cancel());
        selection.open(lead(1, "Acme"));
        assert!(!selection.cancel());
        assert!(selection.begin_save().is_none());
    }

    #[test]
    fn begin_save_decodes_list_fields() -> anyhow::Result<()> {
        let mut selection = Selection::default();
        selection.open(lead(4, "Acme"));
        selection.edit();
        if let Some(draft) = selection.draft_mut() {
            draft.import_locations = " China,  Vietnam ,".to_owned();
        }

        let (id, patch) = selection.begin_save().expect("editing")?;
        assert_eq!(id, LeadId::new(4));
        assert_eq!(
            patch.import_locations,
            Some(vec!["China".to_owned(), "Vietnam".to_owned()])
        );
        assert!(selection.is_editing(), "still editing until the server answers");
        Ok(())
    }

    #[test]
    fn begin_save_reports_invalid_draft() {
        let mut selection = Selection::default();
        selection.open(lead(4, "Acme"));
        selection.edit();
        if let Some(draft) = selection.draft_mut() {
            draft.company_name.clear();
        }
        let outcome = selection.begin_save().expect("editing");
        assert!(outcome.is_err());
    }

    #[test]
    fn save_succeeded_shows_server_record() {
        let mut selection = Selection::default();
        selection.open(lead(1, "Acme"));
        selection.edit();

        let mut server = lead(1, "Acme");
        server.status = LeadStatus::Qualified;
        assert!(selection.save_succeeded(server.clone()));
        assert_eq!(selection, Selection::Viewing(server));
    }

    #[test]
    fn stale_save_result_is_ignored() {
        let mut selection = Selection::default();
        selection.open(lead(2, "Blue"));
        assert!(!selection.save_succeeded(lead(1, "Acme")));
        assert_eq!(selection.selected_id(), Some(LeadId::new(2)));
    }

    #[test]
    fn deleting_selected_lead_closes_panel() {
        let mut selection = Selection::default();
        selection.open(lead(1, "Acme"));
        assert!(!selection.lead_deleted(LeadId::new(2)));
        assert!(selection.is_open());
        assert!(selection.lead_deleted(LeadId::new(1)));
        assert_eq!(selection, Selection::Closed);
    }

    #[test]
    fn sync_refreshes_viewed_copy_and_keeps_drafts() {
        let mut cache = LeadCache::default();
        let mut updated = lead(1, "Acme");
        updated.status = LeadStatus::Contacted;
        cache.replace(vec![updated.clone()]);

        let mut viewing = Selection::Viewing(lead(1, "Acme"));
        viewing.sync_with(&cache);
        assert_eq!(viewing, Selection::Viewing(updated));

        let mut editing = Selection::Viewing(lead(1, "Acme"));
        editing.edit();
        let before = editing.clone();
        editing.sync_with(&cache);
        assert_eq!(editing, before);
    }

    #[test]
    fn sync_closes_panel_when_lead_disappears() {
        let mut cache = LeadCache::default();
        cache.replace(vec![lead(2, "Blue")]);

        let mut selection = Selection::Viewing(lead(1, "Acme"));
        selection.sync_with(&cache);
        assert_eq!(selection, Selection::Closed);
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::{Lead, LeadId};

/// Snapshot of every lead the server returned on the last successful fetch.
///
/// The snapshot is only ever swapped whole; there is no way to patch a single
/// entry in place.
#[derive(Debug, Clone, Default)]
pub struct LeadCache {
    leads: Arc<[Lead]>,
    generation: u64,
    loading: bool,
}

impl LeadCache {
    pub fn replace(&mut self, leads: Vec<Lead>) {
        self.leads = leads.into();
        self.generation = self.generation.saturating_add(1);
        self.loading = false;
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Shared handle to the current snapshot, unaffected by later replaces.
    pub fn snapshot(&self) -> Arc<[Lead]> {
        Arc::clone(&self.leads)
    }

    pub fn get(&self, id: LeadId) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == id)
    }

    pub fn contains(&self, id: LeadId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Number of successful replaces so far; zero until the first load lands.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use leadbook_api::Client;
use leadbook_app::{AgentEndpoint, Lead, LeadId, LeadPatch, LeadStore, NewLead};
use leadbook_testkit::MemoryStore;

/// The store the console talks to: the HTTP backend, or the in-memory demo.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(Client),
    Demo(MemoryStore),
}

impl Backend {
    pub fn label(&self) -> String {
        match self {
            Self::Http(client) => client.base_url().to_owned(),
            Self::Demo(_) => "demo".to_owned(),
        }
    }
}

impl LeadStore for Backend {
    fn list_leads(&self) -> Result<Vec<Lead>> {
        match self {
            Self::Http(client) => client.list_leads(),
            Self::Demo(store) => store.list_leads(),
        }
    }

    fn get_lead(&self, id: LeadId) -> Result<Lead> {
        match self {
            Self::Http(client) => client.get_lead(id),
            Self::Demo(store) => store.get_lead(id),
        }
    }

    fn create_lead(&self, lead: &NewLead) -> Result<Lead> {
        match self {
            Self::Http(client) => client.create_lead(lead),
            Self::Demo(store) => store.create_lead(lead),
        }
    }

    fn update_lead(&self, id: LeadId, patch: &LeadPatch) -> Result<Lead> {
        match self {
            Self::Http(client) => client.update_lead(id, patch),
            Self::Demo(store) => store.update_lead(id, patch),
        }
    }

    fn delete_lead(&self, id: LeadId) -> Result<()> {
        match self {
            Self::Http(client) => client.delete_lead(id),
            Self::Demo(store) => store.delete_lead(id),
        }
    }
}

impl AgentEndpoint for Backend {
    fn chat(&self, message: &str) -> Result<String> {
        match self {
            Self::Http(client) => client.chat(message),
            Self::Demo(store) => store.chat(message),
        }
    }

    fn reset(&self) -> Result<()> {
        match self {
            Self::Http(client) => client.reset(),
            Self::Demo(store) => store.reset(),
        }
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{Lead, LeadId, LeadPatch, NewLead};

/// Remote lead collection. Every call is a full round trip; implementations
/// do not cache.
pub trait LeadStore {
    fn list_leads(&self) -> Result<Vec<Lead>>;
    fn get_lead(&self, id: LeadId) -> Result<Lead>;
    fn create_lead(&self, lead: &NewLead) -> Result<Lead>;
    fn update_lead(&self, id: LeadId, patch: &LeadPatch) -> Result<Lead>;
    fn delete_lead(&self, id: LeadId) -> Result<()>;
}

/// Opaque remote agent. It may change leads as a side effect of `chat`.
pub trait AgentEndpoint {
    fn chat(&self, message: &str) -> Result<String>;
    fn reset(&self) -> Result<()>;
}

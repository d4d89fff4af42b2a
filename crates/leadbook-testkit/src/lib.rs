// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use leadbook_app::{
    AgentEndpoint, EMPLOYEE_COUNT_BUCKETS, Lead, LeadId, LeadPatch, LeadStatus, LeadStore,
    NewLead, ProductType,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

const COMPANY_PREFIXES: [&str; 12] = [
    "Atelier", "Maison", "Nordic", "Alpine", "Rhone", "Baltic", "Iberia", "Loire", "Danube",
    "Hansa", "Lumen", "Provence",
];

const COMPANY_SUFFIXES: [&str; 8] = [
    "Logistics",
    "Textiles",
    "Foods",
    "Robotics",
    "Cosmetics",
    "Furniture",
    "Analytics",
    "Motors",
];

const LOCATIONS: [&str; 10] = [
    "Paris, France",
    "Lyon, France",
    "Marseille, France",
    "Lille, France",
    "Hamburg, Germany",
    "Milan, Italy",
    "Barcelona, Spain",
    "Rotterdam, Netherlands",
    "Antwerp, Belgium",
    "Lisbon, Portugal",
];

const TRANSPORT_MODES: [&str; 4] = ["Sea", "Air", "Road", "Rail"];

const TRADE_LOCATIONS: [&str; 8] = [
    "China", "Vietnam", "India", "Turkey", "United States", "Morocco", "Brazil", "Japan",
];

fn industry_for(suffix: &str) -> &'static str {
    match suffix {
        "Logistics" => "Transport",
        "Textiles" => "Fashion",
        "Foods" => "Food & Beverage",
        "Robotics" => "Industrial Equipment",
        "Cosmetics" => "Beauty",
        "Furniture" => "Home Goods",
        "Analytics" => "Software",
        "Motors" => "Automotive",
        _ => "Retail",
    }
}

fn product_for(suffix: &str) -> (&'static str, ProductType) {
    match suffix {
        "Logistics" => ("Freight forwarding", ProductType::SoftwareService),
        "Textiles" => ("Organic cotton apparel", ProductType::PhysicalGoods),
        "Foods" => ("Specialty cheeses", ProductType::PhysicalGoods),
        "Robotics" => ("Warehouse robots", ProductType::PhysicalGoods),
        "Cosmetics" => ("Skincare line", ProductType::PhysicalGoods),
        "Furniture" => ("Oak dining sets", ProductType::PhysicalGoods),
        "Analytics" => ("Supply chain dashboards", ProductType::SoftwareService),
        _ => ("Electric scooters", ProductType::PhysicalGoods),
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.int_n(items.len())]
    }

    /// Up to `max` distinct entries, in `items` order.
    fn subset(&mut self, items: &[&str], max: usize) -> Vec<String> {
        let want = self.int_n(max + 1);
        let mut picked: Vec<usize> = Vec::with_capacity(want);
        while picked.len() < want.min(items.len()) {
            let index = self.int_n(items.len());
            if !picked.contains(&index) {
                picked.push(index);
            }
        }
        picked.sort_unstable();
        picked.into_iter().map(|index| items[index].to_owned()).collect()
    }
}

/// Reproducible company records for demos and tests.
#[derive(Debug, Clone)]
pub struct LeadFaker {
    rng: DeterministicRng,
}

impl LeadFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn lead(&mut self, id: LeadId) -> Lead {
        let prefix = self.rng.pick(&COMPANY_PREFIXES);
        let suffix = self.rng.pick(&COMPANY_SUFFIXES);
        let (product, product_type) = product_for(suffix);
        let slug = format!("{prefix}{suffix}").to_lowercase();

        Lead {
            id,
            company_name: format!("{prefix} {suffix}"),
            website_url: format!("https://www.{slug}.eu"),
            location: self.rng.pick(&LOCATIONS).to_owned(),
            industry: industry_for(suffix).to_owned(),
            employee_count: self.rng.pick(&EMPLOYEE_COUNT_BUCKETS).to_owned(),
            product: Some(product.to_owned()),
            product_type: Some(product_type),
            transport_modes: self.rng.subset(&TRANSPORT_MODES, 2),
            import_locations: self.rng.subset(&TRADE_LOCATIONS, 3),
            export_locations: self.rng.subset(&TRADE_LOCATIONS, 2),
            status: LeadStatus::ALL[self.rng.int_n(LeadStatus::ALL.len())],
        }
    }

    /// `count` leads with ids `1..=count`.
    pub fn leads(&mut self, count: usize) -> Vec<Lead> {
        (1..=count as i64).map(|id| self.lead(LeadId::new(id))).collect()
    }
}

/// Seed collection for `--demo`: enough leads to span more than one page.
pub fn demo_leads() -> Vec<Lead> {
    LeadFaker::new(7).leads(24)
}

/// Minimal lead with only the required fields set.
pub fn bare_lead(id: i64, company_name: &str) -> Lead {
    Lead {
        id: LeadId::new(id),
        company_name: company_name.to_owned(),
        website_url: format!("https://{}.example", company_name.to_lowercase().replace(' ', "-")),
        location: String::new(),
        industry: String::new(),
        employee_count: String::new(),
        product: None,
        product_type: None,
        transport_modes: Vec::new(),
        import_locations: Vec::new(),
        export_locations: Vec::new(),
        status: LeadStatus::New,
    }
}

/// Agent behaviour: receives the message and the live collection, returns the
/// reply. It may edit the collection to simulate agent-side writes.
pub type AgentScript = Arc<dyn Fn(&str, &mut Vec<Lead>) -> Result<String> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub chat: usize,
    pub reset: usize,
}

#[derive(Debug, Default)]
struct Failures {
    list: Option<String>,
    mutation: Option<String>,
    chat: Option<String>,
    reset: Option<String>,
}

struct Inner {
    leads: Vec<Lead>,
    failures: Failures,
    calls: CallCounts,
    agent: AgentScript,
    sessions: usize,
}

/// In-memory lead store and agent with the remote's semantics: ids are
/// `max + 1`, updates merge the set fields, deletes are idempotent.
///
/// Clones share state so one copy can sit behind worker threads while a test
/// inspects another.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryStore")
            .field("leads", &inner.leads.len())
            .field("calls", &inner.calls)
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryStore {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                leads,
                failures: Failures::default(),
                calls: CallCounts::default(),
                agent: Arc::new(demo_agent),
                sessions: 0,
            })),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_leads())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.lock().leads.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Number of successful agent resets.
    pub fn sessions_reset(&self) -> usize {
        self.lock().sessions
    }

    pub fn with_agent<F>(self, script: F) -> Self
    where
        F: Fn(&str, &mut Vec<Lead>) -> Result<String> + Send + Sync + 'static,
    {
        self.lock().agent = Arc::new(script);
        self
    }

    pub fn fail_next_list(&self, message: &str) {
        self.lock().failures.list = Some(message.to_owned());
    }

    /// Fails the next create, update or delete.
    pub fn fail_next_mutation(&self, message: &str) {
        self.lock().failures.mutation = Some(message.to_owned());
    }

    /// Fails the next chat call after running the agent script, so side
    /// effects still land the way a dropped reply would leave them.
    pub fn fail_next_chat(&self, message: &str) {
        self.lock().failures.chat = Some(message.to_owned());
    }

    pub fn fail_next_reset(&self, message: &str) {
        self.lock().failures.reset = Some(message.to_owned());
    }

    /// Direct write that bypasses the counters, for simulating another client.
    pub fn set_status(&self, id: LeadId, status: LeadStatus) -> bool {
        let mut inner = self.lock();
        match inner.leads.iter_mut().find(|lead| lead.id == id) {
            Some(lead) => {
                lead.status = status;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: LeadId) {
        self.lock().leads.retain(|lead| lead.id != id);
    }
}

fn take_failure(slot: &mut Option<String>) -> Result<()> {
    match slot.take() {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}

impl LeadStore for MemoryStore {
    fn list_leads(&self) -> Result<Vec<Lead>> {
        let mut inner = self.lock();
        inner.calls.list += 1;
        take_failure(&mut inner.failures.list)?;
        Ok(inner.leads.clone())
    }

    fn get_lead(&self, id: LeadId) -> Result<Lead> {
        let mut inner = self.lock();
        inner.calls.get += 1;
        inner
            .leads
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("Lead not found"))
    }

    fn create_lead(&self, lead: &NewLead) -> Result<Lead> {
        let mut inner = self.lock();
        inner.calls.create += 1;
        take_failure(&mut inner.failures.mutation)?;

        let next_id = inner.leads.iter().map(|lead| lead.id.get()).max().unwrap_or(0) + 1;
        let mut created = bare_lead(next_id, &lead.company_name);
        created.website_url = lead.website_url.clone();
        created.location = lead.location.clone().unwrap_or_default();
        created.industry = lead.industry.clone().unwrap_or_default();
        created.employee_count = lead.employee_count.clone().unwrap_or_default();
        inner.leads.push(created.clone());
        debug!(id = next_id, "memory store created lead");
        Ok(created)
    }

    fn update_lead(&self, id: LeadId, patch: &LeadPatch) -> Result<Lead> {
        let mut inner = self.lock();
        inner.calls.update += 1;
        take_failure(&mut inner.failures.mutation)?;

        let Some(lead) = inner.leads.iter_mut().find(|lead| lead.id == id) else {
            bail!("Lead not found");
        };
        *lead = lead.patched(patch);
        Ok(lead.clone())
    }

    fn delete_lead(&self, id: LeadId) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.delete += 1;
        take_failure(&mut inner.failures.mutation)?;
        inner.leads.retain(|lead| lead.id != id);
        Ok(())
    }
}

impl AgentEndpoint for MemoryStore {
    fn chat(&self, message: &str) -> Result<String> {
        let mut inner = self.lock();
        inner.calls.chat += 1;
        let agent = Arc::clone(&inner.agent);
        let reply = agent(message, &mut inner.leads);
        take_failure(&mut inner.failures.chat)?;
        reply
    }

    fn reset(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.reset += 1;
        take_failure(&mut inner.failures.reset)?;
        inner.sessions += 1;
        Ok(())
    }
}

/// Keyword agent used by `--demo`. Understands `summary`, `show <id>`,
/// `delete <id>` and `<status> <id>`, e.g. `qualify 3` or `contacted 3`.
pub fn demo_agent(message: &str, leads: &mut Vec<Lead>) -> Result<String> {
    let words: Vec<String> = message
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect();
    let id = words
        .iter()
        .find_map(|word| word.parse::<i64>().ok())
        .map(LeadId::new);
    let has = |needle: &str| words.iter().any(|word| word.starts_with(needle));

    if has("summar") || has("overview") {
        let mut counts: Vec<String> = LeadStatus::ALL
            .iter()
            .map(|status| {
                let count = leads.iter().filter(|lead| lead.status == *status).count();
                format!("{}: {count}", status.as_str())
            })
            .collect();
        counts.insert(0, format!("{} leads", leads.len()));
        return Ok(counts.join(", "));
    }

    let Some(id) = id else {
        return Ok("Tell me which lead to work on, for example \"qualify 3\".".to_owned());
    };
    let Some(position) = leads.iter().position(|lead| lead.id == id) else {
        return Ok(format!("I could not find lead {id}."));
    };

    if has("delet") || has("remov") {
        let removed = leads.remove(position);
        return Ok(format!("Deleted {}.", removed.company_name));
    }

    let status = if has("disqualif") {
        Some(LeadStatus::Disqualified)
    } else if has("qualif") {
        Some(LeadStatus::Qualified)
    } else if has("contact") {
        Some(LeadStatus::Contacted)
    } else if has("negotiat") {
        Some(LeadStatus::Negotiating)
    } else if has("new") {
        Some(LeadStatus::New)
    } else {
        None
    };

    let lead = &mut leads[position];
    match status {
        Some(status) => {
            lead.status = status;
            Ok(format!("{} is now {}.", lead.company_name, status.as_str()))
        }
        None => Ok(format!(
            "{} ({}) in {}, status {}.",
            lead.company_name,
            lead.industry,
            lead.location,
            lead.status.as_str()
        )),
    }
}

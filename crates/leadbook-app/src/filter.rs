// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Lead, LeadStatus};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Company,
    Location,
}

impl SearchField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Server,
    IndustryAsc,
    IndustryDesc,
}

impl SortOrder {
    pub const fn next(self) -> Self {
        match self {
            Self::Server => Self::IndustryAsc,
            Self::IndustryAsc => Self::IndustryDesc,
            Self::IndustryDesc => Self::Server,
        }
    }
}

/// Table filters. Every set predicate must hold; empty text and `None` match
/// everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadQuery {
    pub company: String,
    pub location: String,
    pub status: Option<LeadStatus>,
    pub employee_count: Option<String>,
    pub sort: SortOrder,
}

impl LeadQuery {
    pub fn matches(&self, lead: &Lead) -> bool {
        contains_ignore_case(&lead.company_name, &self.company)
            && contains_ignore_case(&lead.location, &self.location)
            && self.status.is_none_or(|status| lead.status == status)
            && self
                .employee_count
                .as_deref()
                .is_none_or(|bucket| lead.employee_count == bucket)
    }

    pub fn text(&self, field: SearchField) -> &str {
        match field {
            SearchField::Company => &self.company,
            SearchField::Location => &self.location,
        }
    }

    pub fn text_mut(&mut self, field: SearchField) -> &mut String {
        match field {
            SearchField::Company => &mut self.company,
            SearchField::Location => &mut self.location,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.company.is_empty()
            || !self.location.is_empty()
            || self.status.is_some()
            || self.employee_count.is_some()
    }
}

/// Visible subset of `leads`, in cache order unless an industry sort is set.
pub fn filter_leads<'a>(leads: &'a [Lead], query: &LeadQuery) -> Vec<&'a Lead> {
    let mut visible: Vec<&Lead> = leads.iter().filter(|lead| query.matches(lead)).collect();
    match query.sort {
        SortOrder::Server => {}
        SortOrder::IndustryAsc => visible.sort_by(|a, b| a.industry.cmp(&b.industry)),
        SortOrder::IndustryDesc => visible.sort_by(|a, b| b.industry.cmp(&a.industry)),
    }
    visible
}

pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let page = page.min(page_count(items.len()) - 1);
    let start = (page * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

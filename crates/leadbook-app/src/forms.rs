// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{EMPLOYEE_COUNT_BUCKETS, Lead, LeadPatch, LeadStatus, NewLead, ProductType};

/// Joins a list field into the single editable line shown in forms.
pub fn encode_list(values: &[String]) -> String {
    values.join(", ")
}

/// Splits an edited line back into list entries: comma separated, trimmed,
/// empty entries dropped.
pub fn decode_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    NewLead,
    EditLead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Text,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    CompanyName,
    WebsiteUrl,
    Industry,
    Location,
    EmployeeCount,
    Product,
    ProductType,
    TransportModes,
    ImportLocations,
    ExportLocations,
    Status,
}

impl DraftField {
    pub const EDIT: [Self; 11] = [
        Self::CompanyName,
        Self::WebsiteUrl,
        Self::Industry,
        Self::Location,
        Self::EmployeeCount,
        Self::Product,
        Self::ProductType,
        Self::TransportModes,
        Self::ImportLocations,
        Self::ExportLocations,
        Self::Status,
    ];

    pub const CREATE: [Self; 5] = [
        Self::CompanyName,
        Self::WebsiteUrl,
        Self::Industry,
        Self::Location,
        Self::EmployeeCount,
    ];

    pub const fn for_form(kind: FormKind) -> &'static [Self] {
        match kind {
            FormKind::NewLead => &Self::CREATE,
            FormKind::EditLead => &Self::EDIT,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CompanyName => "company name",
            Self::WebsiteUrl => "website",
            Self::Industry => "industry",
            Self::Location => "location",
            Self::EmployeeCount => "employees",
            Self::Product => "product",
            Self::ProductType => "product type",
            Self::TransportModes => "transport modes",
            Self::ImportLocations => "import locations",
            Self::ExportLocations => "export locations",
            Self::Status => "status",
        }
    }

    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::TransportModes => Some("comma-separated: Sea, Air, Road"),
            Self::ImportLocations => Some("comma-separated: China, Vietnam, ..."),
            Self::ExportLocations => Some("comma-separated: USA, Europe, ..."),
            _ => None,
        }
    }

    pub const fn input(self, kind: FormKind) -> FieldInput {
        match (self, kind) {
            (Self::ProductType | Self::Status, _) => FieldInput::Choice,
            (Self::EmployeeCount, FormKind::NewLead) => FieldInput::Choice,
            _ => FieldInput::Text,
        }
    }
}

/// Editable copy of a lead. List fields are held as encoded text until save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub company_name: String,
    pub website_url: String,
    pub industry: String,
    pub location: String,
    pub employee_count: String,
    pub product: String,
    pub product_type: Option<ProductType>,
    pub transport_modes: String,
    pub import_locations: String,
    pub export_locations: String,
    pub status: LeadStatus,
}

impl LeadDraft {
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            company_name: lead.company_name.clone(),
            website_url: lead.website_url.clone(),
            industry: lead.industry.clone(),
            location: lead.location.clone(),
            employee_count: lead.employee_count.clone(),
            product: lead.product.clone().unwrap_or_default(),
            product_type: lead.product_type,
            transport_modes: encode_list(&lead.transport_modes),
            import_locations: encode_list(&lead.import_locations),
            export_locations: encode_list(&lead.export_locations),
            status: lead.status,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            bail!("company name is required -- enter a name and retry");
        }
        if self.website_url.trim().is_empty() {
            bail!("website URL is required -- enter a URL and retry");
        }
        Ok(())
    }

    /// Full-form patch. Blank product and unset product type clear the stored
    /// values.
    pub fn to_patch(&self) -> LeadPatch {
        LeadPatch {
            company_name: Some(self.company_name.trim().to_owned()),
            website_url: Some(self.website_url.trim().to_owned()),
            location: Some(self.location.trim().to_owned()),
            industry: Some(self.industry.trim().to_owned()),
            employee_count: Some(self.employee_count.trim().to_owned()),
            product: Some(self.product.trim().to_owned()),
            product_type: Some(self.product_type),
            transport_modes: Some(decode_list(&self.transport_modes)),
            import_locations: Some(decode_list(&self.import_locations)),
            export_locations: Some(decode_list(&self.export_locations)),
            status: Some(self.status),
        }
    }

    pub fn text(&self, field: DraftField) -> String {
        match field {
            DraftField::CompanyName => self.company_name.clone(),
            DraftField::WebsiteUrl => self.website_url.clone(),
            DraftField::Industry => self.industry.clone(),
            DraftField::Location => self.location.clone(),
            DraftField::EmployeeCount => self.employee_count.clone(),
            DraftField::Product => self.product.clone(),
            DraftField::ProductType => self
                .product_type
                .map(ProductType::as_str)
                .unwrap_or("")
                .to_owned(),
            DraftField::TransportModes => self.transport_modes.clone(),
            DraftField::ImportLocations => self.import_locations.clone(),
            DraftField::ExportLocations => self.export_locations.clone(),
            DraftField::Status => self.status.as_str().to_owned(),
        }
    }

    pub fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match field {
            DraftField::CompanyName => Some(&mut self.company_name),
            DraftField::WebsiteUrl => Some(&mut self.website_url),
            DraftField::Industry => Some(&mut self.industry),
            DraftField::Location => Some(&mut self.location),
            DraftField::EmployeeCount => Some(&mut self.employee_count),
            DraftField::Product => Some(&mut self.product),
            DraftField::TransportModes => Some(&mut self.transport_modes),
            DraftField::ImportLocations => Some(&mut self.import_locations),
            DraftField::ExportLocations => Some(&mut self.export_locations),
            DraftField::ProductType | DraftField::Status => None,
        }
    }

    pub fn cycle_choice(&mut self, field: DraftField, delta: isize) {
        match field {
            DraftField::Status => self.status = self.status.cycle(delta),
            DraftField::ProductType => {
                self.product_type = cycle_optional(&ProductType::ALL, self.product_type, delta);
            }
            _ => {}
        }
    }
}

/// Add-lead form. Only company name and URL are required; the employee count
/// is picked from the fixed buckets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewLeadForm {
    pub company_name: String,
    pub website_url: String,
    pub industry: String,
    pub location: String,
    pub employee_count: Option<&'static str>,
}

impl NewLeadForm {
    pub fn validate(&self) -> Result<NewLead> {
        if self.company_name.trim().is_empty() {
            bail!("please enter company name");
        }
        if self.website_url.trim().is_empty() {
            bail!("please enter website URL");
        }
        if let Some(bucket) = self.employee_count
            && !EMPLOYEE_COUNT_BUCKETS.contains(&bucket)
        {
            bail!("employee count {bucket:?} is not one of the known size buckets");
        }

        Ok(NewLead {
            company_name: self.company_name.trim().to_owned(),
            website_url: self.website_url.trim().to_owned(),
            location: non_empty(&self.location),
            industry: non_empty(&self.industry),
            employee_count: self.employee_count.map(str::to_owned),
        })
    }

    pub fn text(&self, field: DraftField) -> String {
        match field {
            DraftField::CompanyName => self.company_name.clone(),
            DraftField::WebsiteUrl => self.website_url.clone(),
            DraftField::Industry => self.industry.clone(),
            DraftField::Location => self.location.clone(),
            DraftField::EmployeeCount => self.employee_count.unwrap_or("").to_owned(),
            _ => String::new(),
        }
    }

    pub fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match field {
            DraftField::CompanyName => Some(&mut self.company_name),
            DraftField::WebsiteUrl => Some(&mut self.website_url),
            DraftField::Industry => Some(&mut self.industry),
            DraftField::Location => Some(&mut self.location),
            _ => None,
        }
    }

    pub fn cycle_choice(&mut self, field: DraftField, delta: isize) {
        if field == DraftField::EmployeeCount {
            self.employee_count = cycle_optional(&EMPLOYEE_COUNT_BUCKETS, self.employee_count, delta);
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Steps through `choices` with `None` sitting before the first entry.
pub fn cycle_optional<T: Copy + PartialEq>(choices: &[T], current: Option<T>, delta: isize) -> Option<T> {
    let slots = choices.len() as isize + 1;
    let position = current
        .and_then(|value| choices.iter().position(|choice| *choice == value))
        .map_or(0, |index| index as isize + 1);
    let next = (position + delta).rem_euclid(slots);
    if next == 0 {
        None
    } else {
        Some(choices[next as usize - 1])
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use tracing::warn;

use crate::ids::*;

pub const EMPLOYEE_COUNT_BUCKETS: [&str; 6] =
    ["0-50", "50-100", "100-200", "200-500", "500-1000", "1000+"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    New,
    Qualified,
    Disqualified,
    Contacted,
    Negotiating,
}

impl LeadStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Qualified,
        Self::Disqualified,
        Self::Contacted,
        Self::Negotiating,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Qualified => "Qualified",
            Self::Disqualified => "Disqualified",
            Self::Contacted => "Contacted",
            Self::Negotiating => "Negotiating",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn cycle(self, delta: isize) -> Self {
        let current = Self::ALL
            .iter()
            .position(|status| *status == self)
            .unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "Physical Goods")]
    PhysicalGoods,
    #[serde(rename = "Software / Service")]
    SoftwareService,
}

impl ProductType {
    pub const ALL: [Self; 2] = [Self::PhysicalGoods, Self::SoftwareService];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhysicalGoods => "Physical Goods",
            Self::SoftwareService => "Software / Service",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// A company record as served by the remote lead store.
///
/// List fields decode absent or `null` as empty, so consumers never have to
/// distinguish "missing" from "no entries".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub company_name: String,
    pub website_url: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub employee_count: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient_product_type")]
    pub product_type: Option<ProductType>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transport_modes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub import_locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub export_locations: Vec<String>,
    #[serde(default)]
    pub status: LeadStatus,
}

impl Lead {
    pub fn patched(&self, patch: &LeadPatch) -> Self {
        let mut next = self.clone();
        if let Some(value) = &patch.company_name {
            next.company_name = value.clone();
        }
        if let Some(value) = &patch.website_url {
            next.website_url = value.clone();
        }
        if let Some(value) = &patch.location {
            next.location = value.clone();
        }
        if let Some(value) = &patch.industry {
            next.industry = value.clone();
        }
        if let Some(value) = &patch.employee_count {
            next.employee_count = value.clone();
        }
        if let Some(value) = &patch.product {
            next.product = (!value.is_empty()).then(|| value.clone());
        }
        if let Some(value) = patch.product_type {
            next.product_type = value;
        }
        if let Some(value) = &patch.transport_modes {
            next.transport_modes = value.clone();
        }
        if let Some(value) = &patch.import_locations {
            next.import_locations = value.clone();
        }
        if let Some(value) = &patch.export_locations {
            next.export_locations = value.clone();
        }
        if let Some(value) = patch.status {
            next.status = value;
        }
        next
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.trim().is_empty()))
}

/// The store keeps product type as free text; values outside the known set
/// read as unset so one odd record cannot fail a whole listing.
fn lenient_product_type<'de, D>(deserializer: D) -> Result<Option<ProductType>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let parsed = ProductType::parse(&raw);
    if parsed.is_none() {
        warn!(value = %raw, "ignoring unknown product type");
    }
    Ok(parsed)
}

/// Keeps an explicit `null` apart from an absent key.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub company_name: String,
    pub website_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
}

impl NewLead {
    pub fn new(company_name: impl Into<String>, website_url: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            website_url: website_url.into(),
            location: None,
            industry: None,
            employee_count: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    /// An empty string clears the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// `Some(None)` is sent as `null` and clears the type.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub product_type: Option<Option<ProductType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_modes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
}

impl LeadPatch {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub sent_at: OffsetDateTime,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Agent,
            content: content.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lead, LeadPatch, LeadStatus, NewLead, ProductType};
    use crate::LeadId;
    use anyhow::Result;

    #[test]
    fn lead_list_fields_default_to_empty_when_absent_or_null() -> Result<()> {
        let lead: Lead = serde_json::from_str(
            r#"{"id":3,"company_name":"Foo","website_url":"https://foo.test","location":"","industry":"","employee_count":"","transport_modes":null}"#,
        )?;
        assert!(lead.transport_modes.is_empty());
        assert!(lead.import_locations.is_empty());
        assert!(lead.export_locations.is_empty());
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.product_type, None);
        Ok(())
    }

    #[test]
    fn product_type_uses_display_labels_on_the_wire() -> Result<()> {
        let parsed: ProductType = serde_json::from_str(r#""Software / Service""#)?;
        assert_eq!(parsed, ProductType::SoftwareService);
        assert_eq!(
            serde_json::to_string(&ProductType::PhysicalGoods)?,
            r#""Physical Goods""#
        );
        Ok(())
    }

    #[test]
    fn new_lead_omits_unset_optional_fields() -> Result<()> {
        let body = serde_json::to_value(NewLead::new("Foo", "https://foo.test"))?;
        assert_eq!(
            body,
            serde_json::json!({"company_name": "Foo", "website_url": "https://foo.test"})
        );
        Ok(())
    }

    #[test]
    fn patch_serializes_only_set_fields() -> Result<()> {
        let body = serde_json::to_value(LeadPatch::status(LeadStatus::Qualified))?;
        assert_eq!(body, serde_json::json!({"status": "Qualified"}));
        assert!(LeadPatch::default().is_empty());
        assert!(!LeadPatch::status(LeadStatus::New).is_empty());
        Ok(())
    }

    #[test]
    fn patched_leaves_unset_fields_alone() {
        let lead = Lead {
            id: LeadId::new(1),
            company_name: "Acme".to_owned(),
            website_url: "https://acme.test".to_owned(),
            location: "Lyon".to_owned(),
            industry: "Retail".to_owned(),
            employee_count: "50-100".to_owned(),
            product: None,
            product_type: None,
            transport_modes: vec!["Sea".to_owned()],
            import_locations: Vec::new(),
            export_locations: Vec::new(),
            status: LeadStatus::New,
        };
        let next = lead.patched(&LeadPatch {
            location: Some("Paris".to_owned()),
            ..LeadPatch::status(LeadStatus::Contacted)
        });
        assert_eq!(next.location, "Paris");
        assert_eq!(next.status, LeadStatus::Contacted);
        assert_eq!(next.company_name, "Acme");
        assert_eq!(next.transport_modes, vec!["Sea".to_owned()]);
    }

    #[test]
    fn unknown_product_type_reads_as_unset_without_failing_the_list() -> Result<()> {
        let leads: Vec<Lead> = serde_json::from_str(
            r#"[
                {"id":1,"company_name":"Acme","website_url":"https://acme.test","product_type":"Physical Goods"},
                {"id":2,"company_name":"Globex","website_url":"https://globex.test","product":"","product_type":"Software"}
            ]"#,
        )?;
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].product_type, Some(ProductType::PhysicalGoods));
        assert_eq!(leads[1].product_type, None);
        assert_eq!(leads[1].product, None);
        Ok(())
    }

    #[test]
    fn patch_can_clear_product_and_product_type() -> Result<()> {
        let patch = LeadPatch {
            product: Some(String::new()),
            product_type: Some(None),
            ..LeadPatch::default()
        };
        let body = serde_json::to_value(&patch)?;
        assert_eq!(body, serde_json::json!({"product": "", "product_type": null}));

        let decoded: LeadPatch = serde_json::from_value(body)?;
        assert_eq!(decoded, patch);
        let absent: LeadPatch = serde_json::from_str("{}")?;
        assert_eq!(absent.product_type, None);
        Ok(())
    }

    #[test]
    fn status_parse_and_cycle() {
        assert_eq!(LeadStatus::parse("qualified"), Some(LeadStatus::Qualified));
        assert_eq!(LeadStatus::parse("Closed"), None);
        assert_eq!(LeadStatus::Negotiating.cycle(1), LeadStatus::New);
        assert_eq!(LeadStatus::New.cycle(-1), LeadStatus::Negotiating);
    }
}

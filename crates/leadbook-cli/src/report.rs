// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use leadbook_app::{Lead, encode_list};

const NAME_WIDTH: usize = 28;
const LOCATION_WIDTH: usize = 18;
const INDUSTRY_WIDTH: usize = 18;

/// Plain-text lead table for `--list`.
pub fn lead_table(leads: &[Lead]) -> String {
    if leads.is_empty() {
        return "no leads\n".to_owned();
    }

    let mut out = format!(
        "{:>4}  {:<NAME_WIDTH$}  {:<LOCATION_WIDTH$}  {:<INDUSTRY_WIDTH$}  {}\n",
        "ID", "COMPANY", "LOCATION", "INDUSTRY", "STATUS"
    );
    for lead in leads {
        out.push_str(&format!(
            "{:>4}  {:<NAME_WIDTH$}  {:<LOCATION_WIDTH$}  {:<INDUSTRY_WIDTH$}  {}\n",
            lead.id.get(),
            clip(&lead.company_name, NAME_WIDTH),
            clip(&lead.location, LOCATION_WIDTH),
            clip(&lead.industry, INDUSTRY_WIDTH),
            lead.status.as_str(),
        ));
    }
    out
}

/// Key/value dump of one lead for `--show`.
pub fn lead_detail(lead: &Lead) -> String {
    let rows = [
        ("id", lead.id.to_string()),
        ("company", lead.company_name.clone()),
        ("website", lead.website_url.clone()),
        ("location", lead.location.clone()),
        ("industry", lead.industry.clone()),
        ("employees", lead.employee_count.clone()),
        ("product", lead.product.clone().unwrap_or_default()),
        (
            "product type",
            lead.product_type
                .map(|kind| kind.as_str().to_owned())
                .unwrap_or_default(),
        ),
        ("transport", encode_list(&lead.transport_modes)),
        ("imports", encode_list(&lead.import_locations)),
        ("exports", encode_list(&lead.export_locations)),
        ("status", lead.status.as_str().to_owned()),
    ];

    rows.iter()
        .map(|(label, value)| {
            let value = if value.is_empty() { "-" } else { value.as_str() };
            format!("{label:<13}{value}\n")
        })
        .collect()
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::{clip, lead_detail, lead_table};
    use leadbook_app::{LeadStatus, ProductType};
    use leadbook_testkit::bare_lead;

    #[test]
    fn table_lists_one_row_per_lead() {
        let mut acme = bare_lead(1, "Acme");
        acme.location = "Lyon".to_owned();
        acme.status = LeadStatus::Qualified;
        let table = lead_table(&[acme, bare_lead(12, "Globex")]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  ID  COMPANY"));
        assert!(lines[1].contains("Acme") && lines[1].contains("Lyon"));
        assert!(lines[1].ends_with("Qualified"));
        assert!(lines[2].starts_with("  12  Globex"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(lead_table(&[]), "no leads\n");
    }

    #[test]
    fn detail_marks_blank_fields() {
        let mut lead = bare_lead(4, "Initech");
        lead.product_type = Some(ProductType::SoftwareService);
        lead.import_locations = vec!["Italy".to_owned(), "Spain".to_owned()];
        let detail = lead_detail(&lead);

        assert!(detail.contains("company      Initech\n"));
        assert!(detail.contains("website      https://initech.example\n"));
        assert!(detail.contains("location     -\n"));
        assert!(detail.contains("imports      Italy, Spain\n"));
        assert!(detail.contains("status       New\n"));
    }

    #[test]
    fn long_values_are_clipped() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghijk", 5), "abcd…");
    }
}

use super::super::domain::LeadRecord;
use super::super::matching::CustomerRegistry;
use super::views::{LeadReportSummary, ListMatchEntry, RegionLeadEntry, SalespersonEntry};
use serde::Serialize;
use std::collections::HashMap;

/// Label used for leads whose ad carries no region.
pub const UNKNOWN_REGION: &str = "(okänd region)";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadTotals {
    pub ads: usize,
    pub customers: usize,
    pub leads: usize,
    pub with_phone: usize,
    pub with_contact_person: usize,
    pub union_mentions: usize,
}

#[derive(Debug, Clone)]
struct ListTally {
    name: String,
    customer_rows: usize,
    matched_ads: usize,
}

#[derive(Debug, Default, Clone)]
pub struct LeadReport {
    pub totals: LeadTotals,
    lists: Vec<ListTally>,
    region_leads: HashMap<String, usize>,
    salesperson_customers: HashMap<String, usize>,
}

impl LeadReport {
    pub fn build(records: &[LeadRecord], registry: &CustomerRegistry) -> Self {
        let mut report = Self {
            lists: registry
                .lists()
                .iter()
                .map(|list| ListTally {
                    name: list.name.clone(),
                    customer_rows: list.records.len(),
                    matched_ads: 0,
                })
                .collect(),
            ..Self::default()
        };

        for record in records {
            let totals = &mut report.totals;
            totals.ads += 1;
            if record.contact.phone.is_some() {
                totals.with_phone += 1;
            }
            if record.contact.contact_name.is_some() {
                totals.with_contact_person += 1;
            }
            if record.contact.union_mention {
                totals.union_mentions += 1;
            }

            if record.is_lead() {
                totals.leads += 1;
                let region = record
                    .ad
                    .region
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_REGION.to_string());
                *report.region_leads.entry(region).or_default() += 1;
                continue;
            }

            totals.customers += 1;
            for tally in report.lists.iter_mut() {
                if record.matched_list(&tally.name) {
                    tally.matched_ads += 1;
                }
            }
            if let Some(salesperson) = record.salesperson() {
                *report
                    .salesperson_customers
                    .entry(salesperson.to_string())
                    .or_default() += 1;
            }
        }

        report
    }

    pub fn summary(&self) -> LeadReportSummary {
        let lists = self
            .lists
            .iter()
            .map(|tally| ListMatchEntry {
                list: tally.name.clone(),
                customer_rows: tally.customer_rows,
                matched_ads: tally.matched_ads,
            })
            .collect();

        let regions = ranked(&self.region_leads)
            .into_iter()
            .map(|(region, leads)| RegionLeadEntry { region, leads })
            .collect();

        let salespeople = ranked(&self.salesperson_customers)
            .into_iter()
            .map(|(salesperson, customer_ads)| SalespersonEntry {
                salesperson,
                customer_ads,
            })
            .collect();

        let lead_share_pct = if self.totals.ads == 0 {
            0.0
        } else {
            (self.totals.leads as f32 / self.totals.ads as f32) * 100.0
        };

        LeadReportSummary {
            totals: self.totals,
            lead_share_pct,
            lists,
            regions,
            salespeople,
        }
    }
}

/// Count descending, then name ascending.
fn ranked(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

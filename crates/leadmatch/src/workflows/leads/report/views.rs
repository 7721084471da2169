use super::summary::LeadTotals;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMatchEntry {
    pub list: String,
    pub customer_rows: usize,
    pub matched_ads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionLeadEntry {
    pub region: String,
    pub leads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalespersonEntry {
    pub salesperson: String,
    pub customer_ads: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadReportSummary {
    pub totals: LeadTotals,
    pub lead_share_pct: f32,
    pub lists: Vec<ListMatchEntry>,
    pub regions: Vec<RegionLeadEntry>,
    pub salespeople: Vec<SalespersonEntry>,
}

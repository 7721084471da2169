use super::domain::{JobAdField, LeadRecord};
use serde::{Deserialize, Serialize};

/// Typed selection criteria. Empty collections and `false` flags leave the
/// corresponding dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilter {
    pub regions: Vec<String>,
    pub working_hours_types: Vec<String>,
    pub occupations: Vec<String>,
    pub occupation_groups: Vec<String>,
    pub headline_query: Option<String>,
    pub require_phone: bool,
    pub exclude_union: bool,
    pub only_leads: bool,
    pub only_customers: bool,
    pub salesperson: Option<String>,
}

impl LeadFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &LeadRecord) -> bool {
        let ad = &record.ad;

        if !member_of(&self.regions, ad.field(JobAdField::Region))
            || !member_of(&self.working_hours_types, ad.field(JobAdField::WorkingHoursType))
            || !member_of(&self.occupations, ad.field(JobAdField::Occupation))
            || !member_of(&self.occupation_groups, ad.field(JobAdField::OccupationGroup))
        {
            return false;
        }

        if let Some(query) = non_blank(self.headline_query.as_deref()) {
            let query = query.to_lowercase();
            let headline_matches = ad
                .headline
                .as_deref()
                .is_some_and(|headline| headline.to_lowercase().contains(&query));
            if !headline_matches {
                return false;
            }
        }

        if self.require_phone && record.contact.phone.is_none() {
            return false;
        }
        if self.exclude_union && record.contact.union_mention {
            return false;
        }
        if self.only_leads && !record.is_lead() {
            return false;
        }
        if self.only_customers && !record.is_customer() {
            return false;
        }

        if let Some(salesperson) = non_blank(self.salesperson.as_deref()) {
            let wanted = salesperson.to_lowercase();
            return record.matches.iter().any(|matched| {
                matched
                    .salesperson
                    .as_deref()
                    .is_some_and(|name| name.trim().to_lowercase() == wanted)
            });
        }

        true
    }

    pub fn apply(&self, records: Vec<LeadRecord>) -> Vec<LeadRecord> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn member_of(allowed: &[String], value: Option<&str>) -> bool {
    if allowed.iter().all(|candidate| candidate.trim().is_empty()) {
        return true;
    }
    let Some(value) = value.map(str::trim) else {
        return false;
    };
    allowed.iter().any(|candidate| candidate.trim() == value)
}

/// Distinct values present in a record set, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub working_hours_types: Vec<String>,
    pub occupations: Vec<String>,
    pub occupation_groups: Vec<String>,
    pub salespeople: Vec<String>,
}

impl FilterOptions {
    pub fn collect(records: &[LeadRecord]) -> Self {
        let mut options = Self::default();
        for record in records {
            let ad = &record.ad;
            push_distinct(&mut options.regions, ad.region.as_deref());
            push_distinct(&mut options.working_hours_types, ad.working_hours_type.as_deref());
            push_distinct(&mut options.occupations, ad.occupation.as_deref());
            push_distinct(&mut options.occupation_groups, ad.occupation_group.as_deref());
            for matched in &record.matches {
                push_distinct(&mut options.salespeople, matched.salesperson.as_deref());
            }
        }
        options
    }
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
    let Some(value) = non_blank(value) else {
        return;
    };
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

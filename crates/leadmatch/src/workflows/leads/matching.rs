use super::domain::{CustomerList, CustomerMatch, JobAd, OrgNumber};
use std::collections::{HashMap, HashSet};

/// Ordered customer lists indexed by organization number.
#[derive(Debug, Clone, Default)]
pub struct CustomerRegistry {
    lists: Vec<CustomerList>,
    // org number -> (list index, record index), one entry per list
    index: HashMap<OrgNumber, Vec<(usize, usize)>>,
}

impl CustomerRegistry {
    /// Lists sharing a name are renamed `name-2`, `name-3`, ... so that
    /// per-list matches, report rows and export flags stay distinct.
    pub fn new(mut lists: Vec<CustomerList>) -> Self {
        disambiguate_names(&mut lists);

        let mut index: HashMap<OrgNumber, Vec<(usize, usize)>> = HashMap::new();

        for (list_index, list) in lists.iter().enumerate() {
            for (record_index, record) in list.records.iter().enumerate() {
                let entries = index.entry(record.organization_number.clone()).or_default();
                match entries.iter_mut().find(|(list, _)| *list == list_index) {
                    Some(existing) => {
                        let kept = &list.records[existing.1];
                        if kept.salesperson.is_none() && record.salesperson.is_some() {
                            existing.1 = record_index;
                        }
                    }
                    None => entries.push((list_index, record_index)),
                }
            }
        }

        Self { lists, index }
    }

    pub fn lists(&self) -> &[CustomerList] {
        &self.lists
    }

    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|list| list.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Distinct organization numbers across all lists.
    pub fn customer_count(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, organization_number: &OrgNumber) -> bool {
        self.index.contains_key(organization_number)
    }

    /// One match per list holding the ad's employer, in list order. Ads
    /// without an organization number never match.
    pub fn match_ad(&self, ad: &JobAd) -> Vec<CustomerMatch> {
        let Some(organization_number) = ad.organization_number.as_ref() else {
            return Vec::new();
        };

        self.index
            .get(organization_number)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(list_index, record_index)| {
                        let list = &self.lists[*list_index];
                        let record = &list.records[*record_index];
                        CustomerMatch {
                            list: list.name.clone(),
                            customer_name: record.name.clone(),
                            salesperson: record.salesperson.clone(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn disambiguate_names(lists: &mut [CustomerList]) {
    let mut taken: HashSet<String> = lists.iter().map(|list| list.name.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    for list in lists.iter_mut() {
        if seen.insert(list.name.clone()) {
            continue;
        }
        let mut suffix = 2;
        let renamed = loop {
            let candidate = format!("{}-{suffix}", list.name);
            if !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        taken.insert(renamed.clone());
        seen.insert(renamed.clone());
        list.name = renamed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::domain::CustomerRecord;

    fn record(org: &str, salesperson: Option<&str>) -> CustomerRecord {
        CustomerRecord {
            organization_number: OrgNumber::parse(org).expect("valid org number"),
            name: None,
            salesperson: salesperson.map(str::to_string),
        }
    }

    fn ad(org: Option<&str>) -> JobAd {
        JobAd {
            organization_number: org.and_then(OrgNumber::parse),
            ..JobAd::default()
        }
    }

    #[test]
    fn matches_across_lists_in_registry_order() {
        let registry = CustomerRegistry::new(vec![
            CustomerList::new("kunder", vec![record("556123-4567", None)]),
            CustomerList::new("avtal", vec![record("5561234567", Some("Eva"))]),
        ]);

        let matches = registry.match_ad(&ad(Some("556123 4567")));
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].list, "kunder");
        assert_eq!(matches[1].list, "avtal");
        assert_eq!(matches[1].salesperson.as_deref(), Some("Eva"));
        assert_eq!(registry.customer_count(), 1);
    }

    #[test]
    fn duplicate_rows_prefer_the_one_with_a_salesperson() {
        let registry = CustomerRegistry::new(vec![CustomerList::new(
            "kunder",
            vec![
                record("5561234567", None),
                record("5561234567", Some("Olle")),
                record("5561234567", Some("Eva")),
            ],
        )]);

        let matches = registry.match_ad(&ad(Some("5561234567")));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].salesperson.as_deref(), Some("Olle"));
    }

    #[test]
    fn ads_without_org_number_or_unknown_employers_do_not_match() {
        let registry =
            CustomerRegistry::new(vec![CustomerList::new("kunder", vec![record("5561234567", None)])]);
        assert!(registry.match_ad(&ad(None)).is_empty());
        assert!(registry.match_ad(&ad(Some("5569999999"))).is_empty());
        assert!(CustomerRegistry::default().match_ad(&ad(Some("5561234567"))).is_empty());
    }

    #[test]
    fn lists_sharing_a_name_are_kept_apart() {
        let registry = CustomerRegistry::new(vec![
            CustomerList::new("kunder", vec![record("5561234567", None)]),
            CustomerList::new("kunder", vec![record("5569999999", None)]),
            CustomerList::new("kunder-2", vec![]),
        ]);

        assert_eq!(
            registry.list_names().collect::<Vec<_>>(),
            vec!["kunder", "kunder-3", "kunder-2"]
        );
        let matches = registry.match_ad(&ad(Some("5561234567")));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].list, "kunder");
    }
}

use super::contacts::extract_contact;
use super::domain::{JobAd, LeadRecord};
use super::filter::{FilterOptions, LeadFilter};
use super::matching::CustomerRegistry;
use super::report::LeadReport;
use tracing::{debug, info};

/// Enriches job ads with customer matches and extracted contact details.
pub struct LeadPipeline<'a> {
    registry: &'a CustomerRegistry,
}

impl<'a> LeadPipeline<'a> {
    pub fn new(registry: &'a CustomerRegistry) -> Self {
        Self { registry }
    }

    pub fn enrich(&self, ad: JobAd) -> LeadRecord {
        let matches = self.registry.match_ad(&ad);
        let contact = ad
            .description
            .as_deref()
            .map(extract_contact)
            .unwrap_or_default();

        debug!(
            employer = ad.employer_name.as_deref().unwrap_or_default(),
            matched_lists = matches.len(),
            has_phone = contact.phone.is_some(),
            "enriched job ad"
        );
        LeadRecord::new(ad, contact, matches)
    }

    /// Enriches every ad, preserving input order.
    pub fn run(&self, ads: Vec<JobAd>) -> Vec<LeadRecord> {
        let records: Vec<LeadRecord> = ads.into_iter().map(|ad| self.enrich(ad)).collect();
        let customers = records.iter().filter(|record| record.is_customer()).count();

        info!(
            ads = records.len(),
            customers,
            leads = records.len() - customers,
            lists = self.registry.lists().len(),
            "matched job ads against customer registry"
        );
        records
    }
}

/// Output of a full match run: the filtered records, the selectable filter
/// values of the unfiltered set, and a report over the filtered records.
#[derive(Debug, Clone)]
pub struct LeadAnalysis {
    pub records: Vec<LeadRecord>,
    pub options: FilterOptions,
    pub report: LeadReport,
}

pub fn analyze(ads: Vec<JobAd>, registry: &CustomerRegistry, filter: &LeadFilter) -> LeadAnalysis {
    let records = LeadPipeline::new(registry).run(ads);
    let options = FilterOptions::collect(&records);
    let records = filter.apply(records);
    let report = LeadReport::build(&records, registry);

    LeadAnalysis {
        records,
        options,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::domain::{CustomerList, CustomerRecord, OrgNumber};

    fn ad(org: &str, description: Option<&str>) -> JobAd {
        JobAd {
            employer_name: Some(format!("Employer {org}")),
            organization_number: OrgNumber::parse(org),
            raw_organization_number: Some(org.to_string()),
            description: description.map(str::to_string),
            region: Some("Stockholms län".to_string()),
            ..JobAd::default()
        }
    }

    fn registry() -> CustomerRegistry {
        CustomerRegistry::new(vec![CustomerList::new(
            "kunder",
            vec![CustomerRecord {
                organization_number: OrgNumber::parse("5561234567").expect("org"),
                name: Some("Acme AB".to_string()),
                salesperson: Some("Eva".to_string()),
            }],
        )])
    }

    #[test]
    fn run_preserves_order_and_enriches_records() {
        let registry = registry();
        let records = LeadPipeline::new(&registry).run(vec![
            ad("5561234567", Some("Ring 08-123456")),
            ad("5569999999", None),
        ]);

        assert_eq!(records.len(), 2);
        assert!(records[0].is_customer());
        assert_eq!(records[0].salesperson(), Some("Eva"));
        assert_eq!(records[0].contact.phone.as_deref(), Some("08-123456"));
        assert!(records[1].is_lead());
        assert!(records[1].contact.phone.is_none());
    }

    #[test]
    fn analyze_reports_on_filtered_records_but_offers_all_options() {
        let registry = registry();
        let mut other_region = ad("5560000001", None);
        other_region.region = Some("Skåne län".to_string());

        let filter = LeadFilter {
            only_leads: true,
            ..LeadFilter::default()
        };
        let analysis = analyze(
            vec![ad("5561234567", None), other_region],
            &registry,
            &filter,
        );

        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.report.totals.ads, 1);
        assert_eq!(analysis.report.totals.leads, 1);
        assert_eq!(
            analysis.options.regions,
            vec!["Stockholms län".to_string(), "Skåne län".to_string()]
        );
    }

    #[test]
    fn same_named_lists_report_and_export_separately() {
        let mut lists = registry().lists().to_vec();
        lists.push(CustomerList::new("kunder", Vec::new()));
        let registry = CustomerRegistry::new(lists);

        let analysis = analyze(vec![ad("5561234567", None)], &registry, &LeadFilter::default());
        let summary = analysis.report.summary();
        let per_list: Vec<(&str, usize)> = summary
            .lists
            .iter()
            .map(|entry| (entry.list.as_str(), entry.matched_ads))
            .collect();
        assert_eq!(per_list, vec![("kunder", 1), ("kunder-2", 0)]);

        let mut out = Vec::new();
        crate::workflows::leads::write_csv(
            &analysis.records,
            &registry,
            &mut out,
            crate::workflows::leads::ExportColumns::Full,
        )
        .expect("csv export");
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        let header = lines.next().expect("header");
        assert!(header.ends_with("customer_kunder,customer_kunder-2"));
        assert!(lines.next().expect("row").ends_with("true,false"));
    }
}

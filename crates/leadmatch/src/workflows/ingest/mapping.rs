use super::normalizer::normalize_header;
use crate::workflows::leads::domain::JobAdField;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::OnceLock;

static JOB_AD_COLUMNS: OnceLock<HashMap<String, JobAdField>> = OnceLock::new();
static CUSTOMER_COLUMNS: OnceLock<HashMap<String, CustomerField>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CustomerField {
    OrganizationNumber,
    Name,
    Salesperson,
}

pub(crate) fn job_ad_field(header: &str) -> Option<JobAdField> {
    job_ad_columns().get(&normalize_header(header)).copied()
}

pub(crate) fn customer_field(header: &str) -> Option<CustomerField> {
    customer_columns().get(&normalize_header(header)).copied()
}

/// Maps each recognized field to the first header that names it.
pub(crate) fn resolve_columns<F, L>(headers: &[String], lookup: L) -> HashMap<F, usize>
where
    F: Copy + Eq + Hash,
    L: Fn(&str) -> Option<F>,
{
    let mut columns = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(field) = lookup(header) {
            columns.entry(field).or_insert(index);
        }
    }
    columns
}

fn job_ad_columns() -> &'static HashMap<String, JobAdField> {
    JOB_AD_COLUMNS.get_or_init(|| {
        const HEADER_TO_FIELD: &[(&str, JobAdField)] = &[
            ("id", JobAdField::Id),
            ("annons-id", JobAdField::Id),
            ("annonsid", JobAdField::Id),
            // Employer
            ("employer_name", JobAdField::EmployerName),
            ("employer.name", JobAdField::EmployerName),
            ("employer", JobAdField::EmployerName),
            ("arbetsgivare", JobAdField::EmployerName),
            ("företag", JobAdField::EmployerName),
            (
                "employer_organization_number",
                JobAdField::OrganizationNumber,
            ),
            (
                "employer.organization_number",
                JobAdField::OrganizationNumber,
            ),
            ("organization_number", JobAdField::OrganizationNumber),
            ("organisationsnummer", JobAdField::OrganizationNumber),
            ("orgnr", JobAdField::OrganizationNumber),
            ("org.nr", JobAdField::OrganizationNumber),
            ("org nr", JobAdField::OrganizationNumber),
            // Ad text
            ("headline", JobAdField::Headline),
            ("rubrik", JobAdField::Headline),
            ("annonsrubrik", JobAdField::Headline),
            ("title", JobAdField::Headline),
            ("description", JobAdField::Description),
            ("description.text", JobAdField::Description),
            ("beskrivning", JobAdField::Description),
            ("annonstext", JobAdField::Description),
            // Location
            ("region", JobAdField::Region),
            ("workplace_address.region", JobAdField::Region),
            ("län", JobAdField::Region),
            ("municipality", JobAdField::Municipality),
            ("workplace_address.municipality", JobAdField::Municipality),
            ("kommun", JobAdField::Municipality),
            // Classification
            ("working_hours_type", JobAdField::WorkingHoursType),
            ("working_hours_type.label", JobAdField::WorkingHoursType),
            ("arbetstid", JobAdField::WorkingHoursType),
            ("occupation", JobAdField::Occupation),
            ("occupation.label", JobAdField::Occupation),
            ("yrke", JobAdField::Occupation),
            ("occupation_group", JobAdField::OccupationGroup),
            ("occupation_group.label", JobAdField::OccupationGroup),
            ("yrkesgrupp", JobAdField::OccupationGroup),
            // Publication
            ("publication_date", JobAdField::PublicationDate),
            ("publiceringsdatum", JobAdField::PublicationDate),
            ("webpage_url", JobAdField::WebpageUrl),
            ("url", JobAdField::WebpageUrl),
            ("länk", JobAdField::WebpageUrl),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_FIELD.len());
        for (header, field) in HEADER_TO_FIELD {
            map.insert(normalize_header(header), *field);
        }
        map
    })
}

fn customer_columns() -> &'static HashMap<String, CustomerField> {
    CUSTOMER_COLUMNS.get_or_init(|| {
        const HEADER_TO_FIELD: &[(&str, CustomerField)] = &[
            ("orgnr", CustomerField::OrganizationNumber),
            ("org_nr", CustomerField::OrganizationNumber),
            ("org.nr", CustomerField::OrganizationNumber),
            ("org nr", CustomerField::OrganizationNumber),
            ("orgnummer", CustomerField::OrganizationNumber),
            ("organisationsnummer", CustomerField::OrganizationNumber),
            ("organization_number", CustomerField::OrganizationNumber),
            ("organisation_number", CustomerField::OrganizationNumber),
            (
                "employer_organization_number",
                CustomerField::OrganizationNumber,
            ),
            ("namn", CustomerField::Name),
            ("kund", CustomerField::Name),
            ("kundnamn", CustomerField::Name),
            ("företag", CustomerField::Name),
            ("företagsnamn", CustomerField::Name),
            ("name", CustomerField::Name),
            ("company", CustomerField::Name),
            ("customer", CustomerField::Name),
            ("säljare", CustomerField::Salesperson),
            ("saljare", CustomerField::Salesperson),
            ("ansvarig säljare", CustomerField::Salesperson),
            ("kundansvarig", CustomerField::Salesperson),
            ("ansvarig", CustomerField::Salesperson),
            ("salesperson", CustomerField::Salesperson),
            ("seller", CustomerField::Salesperson),
            ("sales_rep", CustomerField::Salesperson),
            ("account_manager", CustomerField::Salesperson),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_FIELD.len());
        for (header, field) in HEADER_TO_FIELD {
            map.insert(normalize_header(header), *field);
        }
        map
    })
}

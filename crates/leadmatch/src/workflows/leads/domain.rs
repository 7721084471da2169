use serde::{Deserialize, Serialize};
use std::fmt;

/// Employer registration number reduced to its digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgNumber(String);

impl OrgNumber {
    /// Normalizes a raw cell value. Spreadsheet floats (`5561234567.0`,
    /// `5.561234567E9`) compare equal to their text form, and the 12-digit
    /// `16`-prefixed legal-entity form collapses to 10 digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let integral = integral_form(trimmed);
        let digits: String = integral
            .as_deref()
            .unwrap_or(trimmed)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        if digits.is_empty() {
            return None;
        }

        if digits.len() == 12 && digits.starts_with("16") {
            return Some(Self(digits[2..].to_string()));
        }

        Some(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn integral_form(value: &str) -> Option<String> {
    if let Some((whole, fraction)) = value.split_once('.') {
        if !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|c| c == '0')
        {
            return Some(whole.to_string());
        }
    }

    if value.contains(['e', 'E']) {
        if let Ok(number) = value.parse::<f64>() {
            if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
                return Some(format!("{}", number as i64));
            }
        }
    }

    None
}

/// Canonical job-ad columns every source schema is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAdField {
    Id,
    EmployerName,
    OrganizationNumber,
    Headline,
    Description,
    Region,
    Municipality,
    WorkingHoursType,
    Occupation,
    OccupationGroup,
    PublicationDate,
    WebpageUrl,
}

impl JobAdField {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::Id,
            Self::EmployerName,
            Self::OrganizationNumber,
            Self::Headline,
            Self::Description,
            Self::Region,
            Self::Municipality,
            Self::WorkingHoursType,
            Self::Occupation,
            Self::OccupationGroup,
            Self::PublicationDate,
            Self::WebpageUrl,
        ]
    }

    /// Column name used in exports.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::EmployerName => "employer_name",
            Self::OrganizationNumber => "organization_number",
            Self::Headline => "headline",
            Self::Description => "description",
            Self::Region => "region",
            Self::Municipality => "municipality",
            Self::WorkingHoursType => "working_hours_type",
            Self::Occupation => "occupation",
            Self::OccupationGroup => "occupation_group",
            Self::PublicationDate => "publication_date",
            Self::WebpageUrl => "webpage_url",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAd {
    pub id: Option<String>,
    pub employer_name: Option<String>,
    pub organization_number: Option<OrgNumber>,
    pub raw_organization_number: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub municipality: Option<String>,
    pub working_hours_type: Option<String>,
    pub occupation: Option<String>,
    pub occupation_group: Option<String>,
    pub publication_date: Option<String>,
    pub webpage_url: Option<String>,
}

impl JobAd {
    /// Builds an ad from per-field cell values. The organization number is
    /// normalized here so every source shares the same comparison rule.
    pub fn from_fields<F>(mut value_of: F) -> Self
    where
        F: FnMut(JobAdField) -> Option<String>,
    {
        let raw_organization_number = value_of(JobAdField::OrganizationNumber);
        let organization_number = raw_organization_number.as_deref().and_then(OrgNumber::parse);

        Self {
            id: value_of(JobAdField::Id),
            employer_name: value_of(JobAdField::EmployerName),
            organization_number,
            raw_organization_number,
            headline: value_of(JobAdField::Headline),
            description: value_of(JobAdField::Description),
            region: value_of(JobAdField::Region),
            municipality: value_of(JobAdField::Municipality),
            working_hours_type: value_of(JobAdField::WorkingHoursType),
            occupation: value_of(JobAdField::Occupation),
            occupation_group: value_of(JobAdField::OccupationGroup),
            publication_date: value_of(JobAdField::PublicationDate),
            webpage_url: value_of(JobAdField::WebpageUrl),
        }
    }

    pub fn field(&self, field: JobAdField) -> Option<&str> {
        match field {
            JobAdField::Id => self.id.as_deref(),
            JobAdField::EmployerName => self.employer_name.as_deref(),
            JobAdField::OrganizationNumber => self.organization_number.as_ref().map(OrgNumber::as_str),
            JobAdField::Headline => self.headline.as_deref(),
            JobAdField::Description => self.description.as_deref(),
            JobAdField::Region => self.region.as_deref(),
            JobAdField::Municipality => self.municipality.as_deref(),
            JobAdField::WorkingHoursType => self.working_hours_type.as_deref(),
            JobAdField::Occupation => self.occupation.as_deref(),
            JobAdField::OccupationGroup => self.occupation_group.as_deref(),
            JobAdField::PublicationDate => self.publication_date.as_deref(),
            JobAdField::WebpageUrl => self.webpage_url.as_deref(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.raw_organization_number.is_none()
            && JobAdField::ordered()
                .into_iter()
                .all(|field| self.field(field).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub organization_number: OrgNumber,
    pub name: Option<String>,
    pub salesperson: Option<String>,
}

/// One customer registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerList {
    pub name: String,
    pub records: Vec<CustomerRecord>,
}

impl CustomerList {
    pub fn new(name: impl Into<String>, records: Vec<CustomerRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Contact fields derived from an ad's free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub union_mention: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMatch {
    pub list: String,
    pub customer_name: Option<String>,
    pub salesperson: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Customer,
    Lead,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Lead => "Lead",
        }
    }
}

/// A job ad after matching and extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(flatten)]
    pub ad: JobAd,
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub matches: Vec<CustomerMatch>,
    pub status: LeadStatus,
}

impl LeadRecord {
    pub fn new(ad: JobAd, contact: ContactDetails, matches: Vec<CustomerMatch>) -> Self {
        let status = if matches.is_empty() {
            LeadStatus::Lead
        } else {
            LeadStatus::Customer
        };

        Self {
            ad,
            contact,
            matches,
            status,
        }
    }

    pub fn is_customer(&self) -> bool {
        self.status == LeadStatus::Customer
    }

    pub fn is_lead(&self) -> bool {
        self.status == LeadStatus::Lead
    }

    pub fn matched_list(&self, list: &str) -> bool {
        self.matches.iter().any(|matched| matched.list == list)
    }

    /// First salesperson attributed by any matching list, in registry order.
    pub fn salesperson(&self) -> Option<&str> {
        self.matches
            .iter()
            .find_map(|matched| matched.salesperson.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(raw: &str) -> Option<String> {
        OrgNumber::parse(raw).map(|value| value.as_str().to_string())
    }

    #[test]
    fn org_number_keeps_only_digits() {
        assert_eq!(org("556123-4567").as_deref(), Some("5561234567"));
        assert_eq!(org(" 556123 4567 ").as_deref(), Some("5561234567"));
        assert_eq!(org("SE556123456701").as_deref(), Some("556123456701"));
        assert_eq!(org("saknas"), None);
        assert_eq!(org(""), None);
    }

    #[test]
    fn org_number_drops_spreadsheet_float_artifacts() {
        assert_eq!(org("5561234567.0").as_deref(), Some("5561234567"));
        assert_eq!(org("5.561234567E9").as_deref(), Some("5561234567"));
        assert_eq!(org("12.5").as_deref(), Some("125"));
    }

    #[test]
    fn org_number_collapses_century_prefix() {
        assert_eq!(org("16556123-4567").as_deref(), Some("5561234567"));
        assert_eq!(org("198001011234").as_deref(), Some("198001011234"));
    }

    #[test]
    fn job_ad_normalizes_org_number_and_keeps_raw_value() {
        let ad = JobAd::from_fields(|field| match field {
            JobAdField::OrganizationNumber => Some("556123-4567".to_string()),
            JobAdField::Headline => Some("Lagerarbetare".to_string()),
            _ => None,
        });

        assert_eq!(ad.raw_organization_number.as_deref(), Some("556123-4567"));
        assert_eq!(
            ad.field(JobAdField::OrganizationNumber),
            Some("5561234567")
        );
        assert!(!ad.is_blank());
        assert!(JobAd::default().is_blank());
    }

    #[test]
    fn lead_record_status_follows_matches() {
        let lead = LeadRecord::new(JobAd::default(), ContactDetails::default(), Vec::new());
        assert!(lead.is_lead());
        assert!(lead.salesperson().is_none());

        let customer = LeadRecord::new(
            JobAd::default(),
            ContactDetails::default(),
            vec![
                CustomerMatch {
                    list: "kunder".to_string(),
                    customer_name: None,
                    salesperson: None,
                },
                CustomerMatch {
                    list: "avtal".to_string(),
                    customer_name: None,
                    salesperson: Some("Eva".to_string()),
                },
            ],
        );
        assert!(customer.is_customer());
        assert!(customer.matched_list("avtal"));
        assert_eq!(customer.salesperson(), Some("Eva"));
        assert_eq!(customer.status.label(), "Customer");
    }
}

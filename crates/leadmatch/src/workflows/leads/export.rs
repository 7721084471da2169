use super::domain::{JobAdField, LeadRecord};
use super::matching::CustomerRegistry;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// File name offered for downloads, without extension.
pub const EXPORT_BASENAME: &str = "filtrerat_resultat";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportColumns {
    #[default]
    Display,
    Full,
}

const DISPLAY_FIELDS: [JobAdField; 5] = [
    JobAdField::EmployerName,
    JobAdField::OrganizationNumber,
    JobAdField::Headline,
    JobAdField::Region,
    JobAdField::WorkingHoursType,
];

pub fn write_csv<W: Write>(
    records: &[LeadRecord],
    registry: &CustomerRegistry,
    writer: W,
    columns: ExportColumns,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header(registry, columns))?;

    for record in records {
        csv_writer.write_record(row(record, registry, columns))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(records: &[LeadRecord], writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

fn header(registry: &CustomerRegistry, columns: ExportColumns) -> Vec<String> {
    match columns {
        ExportColumns::Display => DISPLAY_FIELDS
            .iter()
            .map(|field| field.column().to_string())
            .chain(["phone".to_string(), "customer".to_string()])
            .collect(),
        ExportColumns::Full => {
            let mut header: Vec<String> = JobAdField::ordered()
                .iter()
                .map(|field| field.column().to_string())
                .collect();
            header.extend(
                [
                    "raw_organization_number",
                    "phone",
                    "contact_name",
                    "contact_title",
                    "union_mention",
                    "status",
                    "matched_lists",
                    "salesperson",
                ]
                .map(str::to_string),
            );
            header.extend(registry.list_names().map(|name| format!("customer_{name}")));
            header
        }
    }
}

fn row(record: &LeadRecord, registry: &CustomerRegistry, columns: ExportColumns) -> Vec<String> {
    let text = |value: Option<&str>| value.unwrap_or_default().to_string();
    let flag = |value: bool| value.to_string();

    match columns {
        ExportColumns::Display => DISPLAY_FIELDS
            .iter()
            .map(|field| text(record.ad.field(*field)))
            .chain([
                text(record.contact.phone.as_deref()),
                flag(record.is_customer()),
            ])
            .collect(),
        ExportColumns::Full => {
            let mut row: Vec<String> = JobAdField::ordered()
                .iter()
                .map(|field| text(record.ad.field(*field)))
                .collect();
            let matched_lists: Vec<&str> = record
                .matches
                .iter()
                .map(|matched| matched.list.as_str())
                .collect();
            row.extend([
                text(record.ad.raw_organization_number.as_deref()),
                text(record.contact.phone.as_deref()),
                text(record.contact.contact_name.as_deref()),
                text(record.contact.contact_title.as_deref()),
                flag(record.contact.union_mention),
                record.status.label().to_string(),
                matched_lists.join(", "),
                text(record.salesperson()),
            ]);
            row.extend(registry.list_names().map(|name| flag(record.matched_list(name))));
            row
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::domain::{ContactDetails, CustomerList, CustomerMatch, JobAd, OrgNumber};

    fn records() -> Vec<LeadRecord> {
        let ad = JobAd {
            employer_name: Some("Acme AB".to_string()),
            organization_number: OrgNumber::parse("556123-4567"),
            raw_organization_number: Some("556123-4567".to_string()),
            headline: Some("Kock, heltid".to_string()),
            region: Some("Skåne län".to_string()),
            ..JobAd::default()
        };
        vec![
            LeadRecord::new(
                ad,
                ContactDetails {
                    phone: Some("08-123456".to_string()),
                    ..ContactDetails::default()
                },
                vec![CustomerMatch {
                    list: "kunder".to_string(),
                    customer_name: Some("Acme AB".to_string()),
                    salesperson: Some("Eva".to_string()),
                }],
            ),
            LeadRecord::new(JobAd::default(), ContactDetails::default(), Vec::new()),
        ]
    }

    fn registry() -> CustomerRegistry {
        CustomerRegistry::new(vec![
            CustomerList::new("kunder", Vec::new()),
            CustomerList::new("avtal", Vec::new()),
        ])
    }

    #[test]
    fn display_columns_are_compact() {
        let mut out = Vec::new();
        write_csv(&records(), &registry(), &mut out, ExportColumns::Display).expect("csv export");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "employer_name,organization_number,headline,region,working_hours_type,phone,customer"
        );
        assert_eq!(
            lines[1],
            "Acme AB,5561234567,\"Kock, heltid\",Skåne län,,08-123456,true"
        );
        assert_eq!(lines[2], ",,,,,,false");
    }

    #[test]
    fn full_columns_include_per_list_flags() {
        let mut out = Vec::new();
        write_csv(&records(), &registry(), &mut out, ExportColumns::Full).expect("csv export");
        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(headers.len(), 12 + 8 + 2);
        assert_eq!(&headers[20], "customer_kunder");
        assert_eq!(&headers[21], "customer_avtal");

        let first = reader.records().next().expect("row").expect("valid row");
        assert_eq!(&first[12], "556123-4567");
        assert_eq!(&first[17], "Customer");
        assert_eq!(&first[18], "kunder");
        assert_eq!(&first[19], "Eva");
        assert_eq!(&first[20], "true");
        assert_eq!(&first[21], "false");
    }

    #[test]
    fn json_export_is_an_array_of_flat_records() {
        let mut out = Vec::new();
        write_json(&records(), &mut out).expect("json export");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        let first = &value[0];
        assert_eq!(first["employer_name"], "Acme AB");
        assert_eq!(first["organization_number"], "5561234567");
        assert_eq!(first["phone"], "08-123456");
        assert_eq!(first["status"], "customer");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}

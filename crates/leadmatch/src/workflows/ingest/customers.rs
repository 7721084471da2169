use super::mapping::{self, CustomerField};
use super::normalizer::clean_cell;
use super::table::Table;
use super::{load_table, load_table_from_reader, ImportError, SourceFormat, SourceOptions};
use crate::workflows::leads::domain::{CustomerList, CustomerRecord, OrgNumber};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub struct CustomerListImporter;

impl CustomerListImporter {
    /// Reads a customer list; the list is named after the file stem unless a
    /// name is given.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        name: Option<&str>,
        options: &SourceOptions,
    ) -> Result<CustomerList, ImportError> {
        let path = path.as_ref();
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("customers")
                .to_string(),
        };
        let table = load_table(path, options)?;
        Self::from_table(name, &table)
    }

    pub fn from_reader<R: Read>(
        name: &str,
        reader: R,
        format: SourceFormat,
        options: &SourceOptions,
    ) -> Result<CustomerList, ImportError> {
        let table = load_table_from_reader(reader, format, options)?;
        Self::from_table(name.to_string(), &table)
    }

    pub fn from_table(name: String, table: &Table) -> Result<CustomerList, ImportError> {
        let columns = mapping::resolve_columns(&table.headers, mapping::customer_field);
        let org_column = *columns
            .get(&CustomerField::OrganizationNumber)
            .ok_or_else(|| ImportError::MissingOrgColumn { list: name.clone() })?;
        let cell = |row: &[String], field: CustomerField| {
            columns
                .get(&field)
                .and_then(|column| row.get(*column))
                .and_then(|value| clean_cell(value))
        };

        let mut records = Vec::with_capacity(table.len());
        for (index, row) in table.rows.iter().enumerate() {
            let raw = row.get(org_column).map(String::as_str).unwrap_or_default();
            let Some(organization_number) = OrgNumber::parse(raw) else {
                debug!(list = %name, row = index + 1, raw, "skipping customer row without org number");
                continue;
            };

            records.push(CustomerRecord {
                organization_number,
                name: cell(row.as_slice(), CustomerField::Name),
                salesperson: cell(row.as_slice(), CustomerField::Salesperson),
            });
        }

        info!(list = %name, rows = table.len(), customers = records.len(), "imported customer list");
        Ok(CustomerList::new(name, records))
    }
}

mod customers;
mod mapping;
mod normalizer;
mod parser;
mod table;
mod workbook;

pub use customers::CustomerListImporter;
pub use parser::{read_csv, read_json_hits};
pub use table::Table;
pub use workbook::{read_xlsx, sheet_names, WorkbookError};

use crate::workflows::jobsearch::{JobAdStore, StoreError};
use crate::workflows::leads::domain::JobAd;
use normalizer::clean_cell;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error("could not read job-ad dump: {0}")]
    Store(#[from] StoreError),
    #[error("unsupported source format for {path}; expected .csv, .xlsx, .json or .db")]
    UnsupportedFormat { path: PathBuf },
    #[error("{format:?} sources cannot be read from an in-memory upload")]
    UnsupportedUpload { format: SourceFormat },
    #[error("no recognizable job-ad columns among: {}", headers.join(", "))]
    UnrecognizedSchema { headers: Vec<String> },
    #[error("customer list '{list}' has no organization number column")]
    MissingOrgColumn { list: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Json,
    Sqlite,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            "db" | "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Per-source selectors: workbook sheet and dump table.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub sheet: Option<String>,
    pub table: Option<String>,
}

pub const DEFAULT_DUMP_TABLE: &str = "annonser";

/// Loads any supported source file into a [`Table`].
pub fn load_table(path: &Path, options: &SourceOptions) -> Result<Table, ImportError> {
    let format = SourceFormat::from_path(path).ok_or_else(|| ImportError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    match format {
        SourceFormat::Sqlite => {
            let store = JobAdStore::open(path)?;
            let table = options.table.as_deref().unwrap_or(DEFAULT_DUMP_TABLE);
            Ok(store.load(table)?)
        }
        SourceFormat::Xlsx => {
            let reader = BufReader::new(File::open(path)?);
            Ok(read_xlsx(reader, options.sheet.as_deref())?)
        }
        SourceFormat::Csv | SourceFormat::Json => {
            load_table_from_reader(File::open(path)?, format, options)
        }
    }
}

/// Loads an uploaded payload. Dumps need a file on disk, so `Sqlite` is
/// rejected here.
pub fn load_table_from_reader<R: Read>(
    mut reader: R,
    format: SourceFormat,
    options: &SourceOptions,
) -> Result<Table, ImportError> {
    match format {
        SourceFormat::Csv => Ok(read_csv(reader)?),
        SourceFormat::Json => Ok(read_json_hits(reader)?),
        SourceFormat::Xlsx => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(read_xlsx(Cursor::new(bytes), options.sheet.as_deref())?)
        }
        SourceFormat::Sqlite => Err(ImportError::UnsupportedUpload { format }),
    }
}

pub struct JobAdImporter;

impl JobAdImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: &SourceOptions,
    ) -> Result<Vec<JobAd>, ImportError> {
        let table = load_table(path.as_ref(), options)?;
        Self::from_table(&table)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: SourceFormat,
        options: &SourceOptions,
    ) -> Result<Vec<JobAd>, ImportError> {
        let table = load_table_from_reader(reader, format, options)?;
        Self::from_table(&table)
    }

    /// Maps any recognized schema onto [`JobAd`]s, skipping blank rows.
    pub fn from_table(table: &Table) -> Result<Vec<JobAd>, ImportError> {
        let columns = mapping::resolve_columns(&table.headers, mapping::job_ad_field);
        if columns.is_empty() {
            return Err(ImportError::UnrecognizedSchema {
                headers: table.headers.clone(),
            });
        }

        let mut ads = Vec::with_capacity(table.len());
        for (index, row) in table.rows.iter().enumerate() {
            let ad = JobAd::from_fields(|field| {
                columns
                    .get(&field)
                    .and_then(|column| row.get(*column))
                    .and_then(|cell| clean_cell(cell))
            });

            if ad.is_blank() {
                debug!(row = index + 1, "skipping blank job-ad row");
                continue;
            }
            ads.push(ad);
        }

        info!(
            rows = table.len(),
            ads = ads.len(),
            mapped_fields = columns.len(),
            "imported job ads"
        );
        Ok(ads)
    }
}

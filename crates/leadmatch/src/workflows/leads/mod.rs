pub mod contacts;
pub mod domain;
pub mod export;
pub mod filter;
pub mod matching;
pub mod pipeline;
pub mod report;

pub use contacts::extract_contact;
pub use domain::{
    ContactDetails, CustomerList, CustomerMatch, CustomerRecord, JobAd, JobAdField, LeadRecord,
    LeadStatus, OrgNumber,
};
pub use export::{write_csv, write_json, ExportColumns, ExportError, EXPORT_BASENAME};
pub use filter::{FilterOptions, LeadFilter};
pub use matching::CustomerRegistry;
pub use pipeline::{analyze, LeadAnalysis, LeadPipeline};
pub use report::{views::LeadReportSummary, LeadReport, LeadTotals};

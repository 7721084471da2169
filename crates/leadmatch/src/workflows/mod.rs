pub mod ingest;
pub mod jobsearch;
pub mod leads;

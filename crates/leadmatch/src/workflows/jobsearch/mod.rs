mod client;
mod flatten;
mod store;

pub use client::{JobSearchClient, JobSearchError};
pub use flatten::flatten_hit;
pub use store::{JobAdStore, StoreError};

use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use leadmatch::error::AppError;
use leadmatch::workflows::ingest::{
    CustomerListImporter, ImportError, JobAdImporter, SourceFormat, SourceOptions,
};
use leadmatch::workflows::leads::{
    analyze, write_csv, CustomerList, CustomerRegistry, ExportColumns, FilterOptions,
    LeadAnalysis, LeadFilter, LeadRecord, LeadReportSummary, EXPORT_BASENAME,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedSource {
    pub(crate) format: SourceFormat,
    pub(crate) content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedCustomerList {
    pub(crate) name: String,
    #[serde(default = "default_customer_format")]
    pub(crate) format: SourceFormat,
    pub(crate) content: String,
}

fn default_customer_format() -> SourceFormat {
    SourceFormat::Csv
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadMatchRequest {
    pub(crate) jobs: UploadedSource,
    #[serde(default)]
    pub(crate) customers: Vec<UploadedCustomerList>,
    #[serde(default)]
    pub(crate) filter: LeadFilter,
    #[serde(default)]
    pub(crate) include_records: bool,
    #[serde(default)]
    pub(crate) columns: ExportColumns,
}

#[derive(Debug, Serialize)]
pub(crate) struct LeadMatchResponse {
    pub(crate) report: LeadReportSummary,
    pub(crate) options: FilterOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) records: Option<Vec<LeadRecord>>,
}

pub(crate) fn lead_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/leads/match",
            axum::routing::post(lead_match_endpoint),
        )
        .route(
            "/api/v1/leads/export",
            axum::routing::post(lead_export_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn lead_match_endpoint(
    Json(payload): Json<LeadMatchRequest>,
) -> Result<Json<LeadMatchResponse>, AppError> {
    let include_records = payload.include_records;
    let (analysis, _) = run_analysis(payload)?;
    let LeadAnalysis {
        records,
        options,
        report,
    } = analysis;

    Ok(Json(LeadMatchResponse {
        report: report.summary(),
        options,
        records: include_records.then_some(records),
    }))
}

pub(crate) async fn lead_export_endpoint(
    Json(payload): Json<LeadMatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let columns = payload.columns;
    let (analysis, registry) = run_analysis(payload)?;

    let mut body = Vec::new();
    write_csv(&analysis.records, &registry, &mut body, columns)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_BASENAME}.csv\""),
            ),
        ],
        body,
    ))
}

fn run_analysis(payload: LeadMatchRequest) -> Result<(LeadAnalysis, CustomerRegistry), AppError> {
    let LeadMatchRequest {
        jobs,
        customers,
        filter,
        ..
    } = payload;

    let options = SourceOptions::default();
    let ads = JobAdImporter::from_reader(
        Cursor::new(jobs.content.into_bytes()),
        text_format(jobs.format)?,
        &options,
    )?;

    let lists = customers
        .into_iter()
        .map(|upload| -> Result<CustomerList, ImportError> {
            CustomerListImporter::from_reader(
                &upload.name,
                Cursor::new(upload.content.into_bytes()),
                text_format(upload.format)?,
                &options,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let registry = CustomerRegistry::new(lists);
    let analysis = analyze(ads, &registry, &filter);
    Ok((analysis, registry))
}

/// JSON bodies carry text, so only CSV and JSON payloads are accepted.
fn text_format(format: SourceFormat) -> Result<SourceFormat, ImportError> {
    match format {
        SourceFormat::Csv | SourceFormat::Json => Ok(format),
        SourceFormat::Xlsx | SourceFormat::Sqlite => Err(ImportError::UnsupportedUpload { format }),
    }
}

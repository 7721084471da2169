use chrono::{Days, Local, NaiveDate};
use clap::Args;
use leadmatch::config::AppConfig;
use leadmatch::error::AppError;
use leadmatch::telemetry;
use leadmatch::workflows::ingest::{
    sheet_names, CustomerListImporter, ImportError, JobAdImporter, SourceOptions,
};
use leadmatch::workflows::jobsearch::{flatten_hit, JobAdStore, JobSearchClient};
use leadmatch::workflows::leads::{
    analyze, write_csv, write_json, CustomerRegistry, ExportColumns, LeadAnalysis, LeadFilter,
    LeadRecord,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Keep ads in this region (repeatable)
    #[arg(long = "region")]
    pub(crate) regions: Vec<String>,
    /// Keep ads with this working-hours type (repeatable)
    #[arg(long = "working-hours")]
    pub(crate) working_hours_types: Vec<String>,
    /// Keep ads for this occupation (repeatable)
    #[arg(long = "occupation")]
    pub(crate) occupations: Vec<String>,
    /// Keep ads in this occupation group (repeatable)
    #[arg(long = "occupation-group")]
    pub(crate) occupation_groups: Vec<String>,
    /// Keep ads whose headline contains this text
    #[arg(long)]
    pub(crate) headline: Option<String>,
    /// Keep only ads with a phone number
    #[arg(long)]
    pub(crate) require_phone: bool,
    /// Drop ads that mention a union
    #[arg(long)]
    pub(crate) exclude_union: bool,
    /// Keep only employers missing from every customer list
    #[arg(long)]
    pub(crate) only_leads: bool,
    /// Keep only existing customers
    #[arg(long)]
    pub(crate) only_customers: bool,
    /// Keep customers handled by this salesperson
    #[arg(long)]
    pub(crate) salesperson: Option<String>,
}

impl FilterArgs {
    pub(crate) fn to_filter(&self) -> LeadFilter {
        LeadFilter {
            regions: self.regions.clone(),
            working_hours_types: self.working_hours_types.clone(),
            occupations: self.occupations.clone(),
            occupation_groups: self.occupation_groups.clone(),
            headline_query: self.headline.clone(),
            require_phone: self.require_phone,
            exclude_union: self.exclude_union,
            only_leads: self.only_leads,
            only_customers: self.only_customers,
            salesperson: self.salesperson.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Job-ad source (.csv, .xlsx, .json or a .db dump)
    #[arg(long)]
    pub(crate) jobs: PathBuf,
    /// Worksheet to read when the source is a workbook
    #[arg(long)]
    pub(crate) sheet: Option<String>,
    /// Dump table to read (defaults to LEADMATCH_TABLE)
    #[arg(long)]
    pub(crate) table: Option<String>,
    /// Customer lists to match against
    #[arg(long, num_args = 1..)]
    pub(crate) customers: Vec<PathBuf>,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
    /// Write the filtered records to a .csv or .json file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Export every column instead of the compact view
    #[arg(long)]
    pub(crate) full: bool,
    /// Print each matching record
    #[arg(long)]
    pub(crate) list: bool,
}

/// Longest look-back accepted by `--days`, roughly a century.
pub(crate) const MAX_REFRESH_DAYS: i64 = 36_500;

#[derive(Args, Debug)]
pub(crate) struct RefreshArgs {
    /// First publication day to fetch (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last publication day to fetch (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// Days to look back when --from is not given
    #[arg(
        long,
        default_value_t = 7,
        value_parser = clap::value_parser!(u32).range(..=MAX_REFRESH_DAYS)
    )]
    pub(crate) days: u32,
    /// SQLite dump to append to (defaults to LEADMATCH_DB_PATH)
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
    /// Dump table (defaults to LEADMATCH_TABLE)
    #[arg(long)]
    pub(crate) table: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct SheetsArgs {
    /// Excel workbook to inspect
    pub(crate) path: PathBuf,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let options = SourceOptions {
        sheet: args.sheet.clone(),
        table: Some(args.table.clone().unwrap_or(config.store.table)),
    };
    let ads = JobAdImporter::from_path(&args.jobs, &options)?;

    let lists = args
        .customers
        .iter()
        .map(|path| CustomerListImporter::from_path(path, None, &SourceOptions::default()))
        .collect::<Result<Vec<_>, _>>()?;
    let registry = CustomerRegistry::new(lists);

    let analysis = analyze(ads, &registry, &args.filter.to_filter());
    render_report(&analysis, &args.jobs);

    if args.list {
        render_records(&analysis.records);
    }

    if let Some(output) = args.output.as_deref() {
        let columns = if args.full {
            ExportColumns::Full
        } else {
            ExportColumns::Display
        };
        write_export(output, &analysis.records, &registry, columns)?;
        println!("\nExported {} records to {}", analysis.records.len(), output.display());
    }

    Ok(())
}

pub(crate) async fn run_refresh(args: RefreshArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let (start, end) = refresh_window(args.from, args.to, args.days, Local::now().date_naive());
    let db_path = args
        .db
        .unwrap_or_else(|| PathBuf::from(&config.store.db_path));
    let table = args.table.unwrap_or(config.store.table);

    let client = JobSearchClient::new(config.jobsearch)?;
    let hits = client.fetch_range(start, end).await?;
    if hits.is_empty() {
        println!("No job ads found between {start} and {end}.");
        return Ok(());
    }

    let rows: Vec<BTreeMap<String, String>> = hits.iter().map(flatten_hit).collect();
    let mut store = JobAdStore::open(&db_path)?;
    let written = store.append(&table, &rows)?;

    info!(%start, %end, written, db = %db_path.display(), table = %table, "refreshed job-ad dump");
    println!(
        "Saved {written} job ads published {start}..={end} to {} ({table})",
        db_path.display()
    );
    Ok(())
}

pub(crate) fn run_sheets(args: SheetsArgs) -> Result<(), AppError> {
    let reader = BufReader::new(File::open(&args.path)?);
    let names = sheet_names(reader).map_err(ImportError::from)?;
    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Explicit bounds win; otherwise the window ends today and starts `days`
/// earlier, clamped to the earliest representable date.
pub(crate) fn refresh_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    days: u32,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = to.unwrap_or(today);
    let start = from.unwrap_or_else(|| {
        end.checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    });
    (start, end)
}

fn write_export(
    path: &Path,
    records: &[LeadRecord],
    registry: &CustomerRegistry,
    columns: ExportColumns,
) -> Result<(), AppError> {
    let writer = BufWriter::new(File::create(path)?);
    let is_json = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    if is_json {
        write_json(records, writer)?;
    } else {
        write_csv(records, registry, writer, columns)?;
    }
    Ok(())
}

fn render_report(analysis: &LeadAnalysis, source: &Path) {
    let summary = analysis.report.summary();
    let totals = summary.totals;

    println!("Lead report for {}", source.display());
    println!(
        "- {} ads | {} customers | {} leads ({:.0}% leads)",
        totals.ads, totals.customers, totals.leads, summary.lead_share_pct
    );
    println!(
        "- {} with phone | {} with contact person | {} mention a union",
        totals.with_phone, totals.with_contact_person, totals.union_mentions
    );

    if !summary.lists.is_empty() {
        println!("Customer lists:");
        for entry in &summary.lists {
            println!(
                "  - {}: {} customers, {} matching ads",
                entry.list, entry.customer_rows, entry.matched_ads
            );
        }
    }

    if !summary.regions.is_empty() {
        println!("Leads by region:");
        for entry in &summary.regions {
            println!("  - {}: {}", entry.region, entry.leads);
        }
    }

    if !summary.salespeople.is_empty() {
        println!("Customer ads by salesperson:");
        for entry in &summary.salespeople {
            println!("  - {}: {}", entry.salesperson, entry.customer_ads);
        }
    }
}

fn render_records(records: &[LeadRecord]) {
    println!("\nRecords:");
    for record in records {
        let ad = &record.ad;
        println!(
            "  - [{}] {} ({}) | {} | {}",
            record.status.label(),
            ad.employer_name.as_deref().unwrap_or("-"),
            ad.organization_number
                .as_ref()
                .map(|number| number.as_str())
                .unwrap_or("-"),
            ad.headline.as_deref().unwrap_or("-"),
            ad.region.as_deref().unwrap_or("-"),
        );
        if let Some(phone) = record.contact.phone.as_deref() {
            println!("      phone: {phone}");
        }
        if let Some(name) = record.contact.contact_name.as_deref() {
            match record.contact.contact_title.as_deref() {
                Some(title) => println!("      contact: {name} ({title})"),
                None => println!("      contact: {name}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn refresh_window_defaults_to_the_last_days() {
        let today = date("2025-03-10");
        assert_eq!(
            refresh_window(None, None, 7, today),
            (date("2025-03-03"), today)
        );
        assert_eq!(
            refresh_window(Some(date("2025-03-01")), Some(date("2025-03-02")), 7, today),
            (date("2025-03-01"), date("2025-03-02"))
        );
        assert_eq!(
            refresh_window(None, Some(date("2025-02-01")), 1, today),
            (date("2025-01-31"), date("2025-02-01"))
        );
    }

    #[test]
    fn refresh_window_clamps_huge_look_backs() {
        let today = date("2025-03-10");
        assert_eq!(
            refresh_window(None, None, 200_000_000, today),
            (NaiveDate::MIN, today)
        );
    }
}

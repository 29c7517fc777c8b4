use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing::info;

use ktima_core::{chart_bundle, run, to_csv_bytes, Granularity, PipelineError, TrendReport};
use ktima_parser::{load_sources, scan_builtin_dir, select_years, SourceFile};

use super::{load_config, parse_filter};

#[derive(Args, Debug)]
pub struct TrendsArgs {
    /// Tabular source files (.xlsx / .csv)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Built-in sources directory, used when no FILEs are given
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Years to include from the built-in directory, e.g. 2021,2022
    /// (default: every file with a year token)
    #[arg(long, value_delimiter = ',')]
    years: Vec<i32>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time bucket: month, quarter or year
    #[arg(short, long, value_parser = granularity_from_str)]
    granularity: Option<Granularity>,

    /// Sale date column name
    #[arg(long)]
    date_col: Option<String>,

    /// Year built column name
    #[arg(long)]
    built_col: Option<String>,

    /// Main area column name (sqm)
    #[arg(long)]
    main_area_col: Option<String>,

    /// Auxiliary area column name (sqm)
    #[arg(long)]
    aux_area_col: Option<String>,

    /// Include auxiliary area in traded sqm
    #[arg(long)]
    include_aux: bool,

    /// Old threshold: built in or before this year
    #[arg(long)]
    pre_year: Option<i32>,

    /// New building: built within this many years of the sale
    #[arg(long)]
    new_within: Option<i32>,

    /// Equality filter, repeatable: COLUMN=VALUE
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,

    /// Tag every row with its source label in a 'source' column
    #[arg(long)]
    tag_source: bool,

    /// Write the aggregate table as CSV (UTF-8 with BOM)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write chart-ready series as JSON
    #[arg(long)]
    charts: Option<PathBuf>,
}

fn granularity_from_str(value: &str) -> Result<Granularity, String> {
    Granularity::try_from(value)
}

pub fn handle_trends(mut args: TrendsArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(granularity) = args.granularity {
        config.granularity = granularity;
    }
    if let Some(date_col) = args.date_col.take() {
        config.columns.date = date_col;
    }
    if let Some(built_col) = args.built_col.take() {
        config.columns.built_year = built_col;
    }
    if let Some(main_area_col) = args.main_area_col.take() {
        config.columns.main_area = main_area_col;
    }
    if let Some(aux_area_col) = args.aux_area_col.take() {
        config.columns.aux_area = aux_area_col;
    }
    if args.include_aux {
        config.include_aux = true;
    }
    if let Some(pre_year) = args.pre_year {
        config.age.pre_year = pre_year;
    }
    if let Some(new_within) = args.new_within {
        config.age.last_n = new_within;
    }
    for spec in &args.filters {
        let (column, value) = parse_filter(spec)?;
        config.filters.insert(column, value);
    }

    let sources = select_sources(&args)?;
    if sources.is_empty() {
        println!("No sources selected. Pick different years or check the directory.");
        return Ok(());
    }

    info!(sources = sources.len(), granularity = %config.granularity, "starting trend aggregation");

    let loaded = load_sources(&sources, args.tag_source, None)?;
    for report in &loaded.reports {
        println!("Loaded {} ({} rows)", report.path.display(), report.rows);
    }

    let report = match run(&loaded.table, &config) {
        Ok(report) => report,
        Err(PipelineError::NoData(reason)) => {
            println!("\nNo data to display: {reason}.");
            println!("Adjust the source selection or filters and retry.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!();
    print_report(&report);

    if report.dropped_dates > 0 {
        println!(
            "Note: {} row(s) dropped for unparseable sale dates.",
            report.dropped_dates
        );
    }
    if report.filtered_out > 0 {
        println!("Note: {} row(s) excluded by filters.", report.filtered_out);
    }

    if let Some(path) = &args.out {
        let bytes = to_csv_bytes(&report)?;
        fs::write(path, bytes)
            .with_context(|| format!("failed to write CSV to '{}'", path.display()))?;
        println!("Aggregate table written to {}", path.display());
    }

    if let Some(path) = &args.charts {
        let bundle = chart_bundle(&report);
        let json = serde_json::to_vec_pretty(&bundle)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write charts to '{}'", path.display()))?;
        println!("Chart series written to {}", path.display());
    }

    Ok(())
}

fn select_sources(args: &TrendsArgs) -> Result<Vec<SourceFile>> {
    if !args.files.is_empty() {
        return Ok(args.files.iter().map(SourceFile::new).collect());
    }
    if let Some(dir) = &args.dir {
        let listing = scan_builtin_dir(dir)?;
        return Ok(select_years(&listing, &args.years));
    }
    bail!("provide source FILEs or --dir with a built-in sources directory");
}

fn print_report(report: &TrendReport) {
    let labels = report.age_labels();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header: Vec<String> = vec![
        "period".to_string(),
        "sales".to_string(),
        "traded_sqm".to_string(),
    ];
    header.extend(labels.iter().cloned());
    header.extend(labels.iter().map(|label| format!("{label}_pct")));
    table.set_header(header);

    for row in report.rows() {
        let mut cells: Vec<String> = vec![
            row.period.clone(),
            row.sales.to_string(),
            format!("{:.1}", row.traded_sqm),
        ];
        cells.extend(row.age_counts.iter().map(u64::to_string));
        cells.extend(row.age_pct.iter().map(|pct| format!("{pct:.1}")));
        table.add_row(cells);
    }

    println!(
        "Sales per {}: {} period(s), {} transaction(s)",
        report.granularity,
        report.rows().len(),
        report.aggregated
    );
    println!("{table}");
}

//! # Salesprint CLI
//!
//! Usage:
//!   salesprint weekly-sales weekly.json
//!   salesprint earnings earnings.json --author "Jane Doe" -o earnings.pdf
//!   salesprint monthly-sales monthly.json --chart chart.png --config report.json

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use serde::de::DeserializeOwned;

use salesprint::assembler::write_file;
use salesprint::image_loader::load_image;
use salesprint::records::{
    load_records, DailySales, Earnings, MonthlySales, MonthlySalesRange, RecordFormat, ReportKind,
    WeeklySales, WeeklySalesRange,
};
use salesprint::{ReportAssembler, ReportConfig, ReportMeta, Result};

#[derive(Parser, Debug)]
#[command(name = "salesprint")]
#[command(about = "Render sales records as a paginated PDF report")]
#[command(version)]
struct Cli {
    /// Report kind: weekly-sales, monthly-sales, daily-sales, monthly-range,
    /// weekly-range or earnings
    kind: ReportKind,

    /// JSON array of records for the chosen kind
    data: PathBuf,

    /// Report title (defaults to the kind's title)
    #[arg(long)]
    title: Option<String>,

    /// Name printed in the footer credit
    #[arg(long, default_value = "Course Admin")]
    author: String,

    /// Creation date printed in the footer (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// PNG or JPEG chart drawn above the table on the first page: a file
    /// path, a `data:image/...;base64,` URI or raw base64
    #[arg(long, value_name = "IMAGE")]
    chart: Option<String>,

    /// JSON file overriding page geometry and theme
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output path (defaults to the temporary report directory)
    #[arg(short = 'o', long, value_name = "PDF")]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(path) => eprintln!("✓ Written report to {}", path.display()),
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };
    let assembler = ReportAssembler::new(config);

    let mut meta = ReportMeta::for_kind(cli.kind, cli.author.as_str());
    if let Some(title) = &cli.title {
        meta = meta.with_title(title.as_str());
    }
    if let Some(date) = cli.date {
        meta = meta.with_date(date);
    }
    if let Some(chart) = &cli.chart {
        meta = meta.with_chart(load_image(chart)?);
    }

    match cli.kind {
        ReportKind::WeeklySales => emit::<WeeklySales>(cli, &assembler, &meta),
        ReportKind::MonthlySales => emit::<MonthlySales>(cli, &assembler, &meta),
        ReportKind::DailySales => emit::<DailySales>(cli, &assembler, &meta),
        ReportKind::MonthlyRange => emit::<MonthlySalesRange>(cli, &assembler, &meta),
        ReportKind::WeeklyRange => emit::<WeeklySalesRange>(cli, &assembler, &meta),
        ReportKind::Earnings => emit::<Earnings>(cli, &assembler, &meta),
    }
}

fn emit<R: RecordFormat + DeserializeOwned>(
    cli: &Cli,
    assembler: &ReportAssembler,
    meta: &ReportMeta,
) -> Result<PathBuf> {
    let records: Vec<R> = load_records(&cli.data);
    match &cli.output {
        Some(path) => {
            let bytes = assembler.assemble(&records, meta)?;
            write_file(path, &bytes)?;
            Ok(path.clone())
        }
        None => assembler.write(&records, meta),
    }
}

use clap::Parser;
use std::process::ExitCode;
use stock_etl::{logging, EtlConfig, Pipeline};

#[derive(Parser)]
#[command(name = "stock_etl")]
#[command(about = "Run ETL pipeline for S&P 500 data")]
#[command(version = "0.1.0")]
struct Cli {
    /// Cutoff date (YYYY-MM-DD); only rows dated before it are loaded.
    /// Defaults to DEFAULT_CUTOFF_DATE
    #[arg(long)]
    cutoff: Option<String>,

    /// Destination table. Defaults to ETL_TABLE_NAME, then "stocks"
    #[arg(long)]
    table: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = EtlConfig::from_env()?;
    if let Some(table) = cli.table {
        config = config.with_table_name(table)?;
    }

    let _guard = logging::init_logging(&config.log_dir)?;

    let cutoff = match config.resolve_cutoff(cli.cutoff.as_deref()) {
        Ok(cutoff) => cutoff,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let report = Pipeline::new(config).run(&cutoff);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

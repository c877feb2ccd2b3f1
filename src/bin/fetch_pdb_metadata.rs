use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pdb_summary::app::{App, ProgressSink};
use pdb_summary::config::{ConfigLoader, ConfigOverrides};
use pdb_summary::domain::EntryId;
use pdb_summary::error::FetchError;
use pdb_summary::output::{ConsoleProgress, JsonOutput, QuietProgress};
use pdb_summary::rcsb::RcsbHttpClient;

#[derive(Parser)]
#[command(name = "fetch-pdb-metadata")]
#[command(about = "Summarize RCSB PDB entries into a JSON file for static sites")]
#[command(version, author)]
struct Cli {
    /// Number of entries to summarize.
    count: Option<usize>,

    /// Config file to read instead of ./pdb-summary.json.
    #[arg(long)]
    config: Option<String>,

    /// Output file. Defaults to public/pdb-summary.json under the working directory.
    #[arg(long)]
    output: Option<String>,

    /// Identifiers requested per search page.
    #[arg(long)]
    page_size: Option<usize>,

    /// Pause after each entry, in milliseconds. 0 disables pacing.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Resolve the organism of the given entries and exit.
    #[arg(long, value_name = "ID")]
    probe: Vec<String>,

    /// Print a JSON summary on stdout instead of progress lines.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FetchError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FetchError) -> u8 {
    match error {
        FetchError::ConfigRead(_)
        | FetchError::ConfigParse(_)
        | FetchError::InvalidMethod(_)
        | FetchError::InvalidPageSize(_)
        | FetchError::InvalidEntryId(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = ConfigLoader::resolve(cli.config.as_deref())?.apply(ConfigOverrides {
        target_count: cli.count,
        page_size: cli.page_size,
        delay_ms: cli.delay_ms,
        output: cli.output,
    })?;

    let sink: &dyn ProgressSink = if cli.json {
        &QuietProgress
    } else {
        &ConsoleProgress
    };

    let rcsb = RcsbHttpClient::new(resolved.endpoints.clone(), resolved.timeout)?;
    let app = App::new(rcsb, resolved.run_options());

    if !cli.probe.is_empty() {
        let ids = cli
            .probe
            .iter()
            .map(|id| id.parse::<EntryId>())
            .collect::<Result<Vec<_>, _>>()?;
        let results = app.probe_organisms(&ids, sink);
        if cli.json {
            JsonOutput::print_json(&results).into_diagnostic()?;
        }
        return Ok(());
    }

    let result = app.run_to_file(resolved.target_count, &resolved.output, sink)?;

    if cli.json {
        JsonOutput::print_json(&result.summary(resolved.output.as_str())).into_diagnostic()?;
        return Ok(());
    }

    println!(
        "✅ Successfully saved {} PDB entries to {}",
        result.records.len(),
        resolved.output
    );
    if let Some(sample) = result.records.first() {
        println!(
            "📊 Sample entry: {} - {} - {}",
            sample.pdb_id, sample.protein_name, sample.organism
        );
    }
    if !result.skipped.is_empty() {
        println!("Skipped {} entries", result.skipped.len());
    }
    println!("✅ Metadata fetch completed successfully!");
    Ok(())
}

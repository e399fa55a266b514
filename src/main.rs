use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use update_resolver::config::UpdateConfig;
use update_resolver::error::{CheckError, InstallError};
use update_resolver::logging;
use update_resolver::manifest::{HttpManifestFetcher, ManifestSource, acronym};
use update_resolver::update::notify::notify_all;
use update_resolver::update::{
    CheckRequest, UpdateChecker, UpdateInstaller, UpdateNotifier, UpdateRecord, UpdateRegistry,
    UpdateStatus,
};
use update_resolver::version::compare_version_sign;

#[derive(Parser)]
#[command(name = "update-resolver")]
#[command(version, about = "Resolve update manifests and report newer versions")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file (defaults to update-resolver.log in the data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long, global = true, conflicts_with = "log_file")]
    log_stderr: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check one identifier against a manifest
    Check {
        /// Manifest URL or local file
        #[arg(long)]
        manifest: String,
        #[arg(long)]
        name: String,
        /// Alternative name in the manifest (defaults to the name's acronym)
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        current_version: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Merge every record of a manifest and report newer versions
    List {
        #[arg(long)]
        manifest: String,
        /// Include records that are not newer
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Compare two versions; prints -1, 0 or 1
    Compare { a: String, b: String },
}

/// Record plus derived status, as printed by `--json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordReport {
    #[serde(flatten)]
    record: UpdateRecord,
    status: UpdateStatus,
}

impl From<UpdateRecord> for RecordReport {
    fn from(record: UpdateRecord) -> Self {
        let status = record.status();
        Self { record, status }
    }
}

struct ConsoleNotifier;

impl UpdateNotifier for ConsoleNotifier {
    fn updates_found(&self, count: usize) {
        println!("Found {count} update(s):");
    }

    fn update_available(&self, record: &UpdateRecord) {
        println!("  {} {}", record.identifier, record.version_changes());
        for note in &record.release_notes {
            println!("    - {note}");
        }
    }

    fn auto_update_disabled(&self, record: &UpdateRecord) {
        if let Some(url) = &record.download_url {
            println!("    download: {url}");
        }
    }

    fn no_update(&self, identifier: &str) {
        println!("No update found for {identifier}");
    }

    fn check_failed(&self, identifier: &str, error: &CheckError) {
        eprintln!("Update check for {identifier} failed: {error}");
    }
}

/// Prints where an update would be downloaded from; never writes anything
struct PrintInstaller;

impl UpdateInstaller for PrintInstaller {
    fn install(&self, record: &UpdateRecord) -> Result<(), InstallError> {
        let url = record
            .download_url
            .as_deref()
            .ok_or_else(|| InstallError::MissingUrl(record.identifier.clone()))?;
        println!("    install {} from {url}", record.remote_version);
        Ok(())
    }
}

fn manifest_source(manifest: &str) -> anyhow::Result<ManifestSource> {
    if manifest.starts_with("http://") || manifest.starts_with("https://") {
        Ok(ManifestSource::url(manifest))
    } else {
        ManifestSource::from_file(Path::new(manifest)).context("Failed to load manifest")
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, config: UpdateConfig) -> anyhow::Result<ExitCode> {
    let registry = Arc::new(UpdateRegistry::new());
    let fetcher = Arc::new(HttpManifestFetcher::new(&config)?);
    let auto_update = config.auto_update;
    let checker = UpdateChecker::new(
        registry.clone(),
        fetcher,
        tokio::runtime::Handle::current(),
        config,
    )
    .with_notifier(Arc::new(ConsoleNotifier));
    checker.mark_ready();

    match cli.command {
        Command::Check {
            manifest,
            name,
            alias,
            current_version,
            json,
        } => {
            let alias = alias.unwrap_or_else(|| acronym(&name));
            let mut request = CheckRequest::new(&name, manifest_source(&manifest)?).alias(alias);
            if let Some(version) = current_version {
                request = request.current_version(version);
            }

            // Failures were already reported through ConsoleNotifier
            let Ok(entry) = checker.check(request).wait().await else {
                return Ok(ExitCode::FAILURE);
            };

            match (entry.map(|entry| entry.snapshot()), json) {
                (Some(record), true) => print_json(&RecordReport::from(record))?,
                (None, true) => print_json(&Option::<RecordReport>::None)?,
                (Some(record), false) if record.is_valid() => {
                    ConsoleNotifier.updates_found(1);
                    ConsoleNotifier.update_available(&record);
                    ConsoleNotifier.auto_update_disabled(&record);
                }
                (Some(record), false) => {
                    println!(
                        "{} is {} ({})",
                        record.identifier,
                        record.status().as_str(),
                        record.version_changes()
                    );
                }
                (None, false) => ConsoleNotifier.no_update(&name),
            }
        }
        Command::List {
            manifest,
            all,
            json,
        } => {
            if checker
                .check_manifest(manifest_source(&manifest)?)
                .wait()
                .await
                .is_err()
            {
                return Ok(ExitCode::FAILURE);
            }

            let entries = if all {
                registry.list_all()
            } else {
                registry.list_valid()
            };

            if json {
                let reports: Vec<RecordReport> = entries
                    .iter()
                    .map(|entry| RecordReport::from(entry.snapshot()))
                    .collect();
                print_json(&reports)?;
            } else if all {
                for entry in entries {
                    let record = entry.snapshot();
                    println!("{} {}", record.identifier, record.remote_version);
                }
            } else if notify_all(&registry, &ConsoleNotifier, &PrintInstaller, auto_update) == 0 {
                println!("No updates found");
            }
        }
        Command::Compare { a, b } => {
            println!("{}", compare_version_sign(Some(a.as_str()), Some(b.as_str()))?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_file = logging::destination(cli.log_file.as_deref(), cli.log_stderr);
    let _guard =
        logging::init(log_file.as_deref(), cli.log_json).context("Failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => UpdateConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => UpdateConfig::default(),
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config))
}

use achievement_migrate_core::{
    load_concurrency_from_env, MigrateConfig, MigrateError, Migrator, DEFAULT_DOCUMENT_FILE_NAME,
};
use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use flags::RecordBoundaryFlag;
use std::path::PathBuf;

mod flags;
pub mod report;

/// Exit status for invalid input paths or flag combinations.
pub const EXIT_CONFIGURATION: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "achievement-migrate")]
#[command(
    about = "Move badge and trophy references from the achievements file into module and learning path documents",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Root achievements document
    #[arg(long, value_name = "FILE")]
    achievements: PathBuf,

    /// Module roots; every subdirectory may hold one module document
    #[arg(long, value_name = "DIR", value_delimiter = ',')]
    modules: Vec<PathBuf>,

    /// Learning path root; every subdirectory may hold one learning path document
    #[arg(long, value_name = "DIR")]
    learning_paths: Option<PathBuf>,

    /// Child document file name inside each subdirectory
    #[arg(long, default_value = DEFAULT_DOCUMENT_FILE_NAME)]
    file_name: String,

    /// Where to write the achievements file minus migrated records
    /// (default: <achievements>-next.yml beside the input)
    #[arg(long, value_name = "FILE")]
    proposed_out: Option<PathBuf>,

    /// Write unclaimed achievements to FILE
    /// (default when given without a value: <achievements>-deprecated.yml)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    deprecated_out: Option<Option<PathBuf>>,

    /// How far a root record extends past its `- uid:` line
    #[arg(long, value_enum)]
    record_boundary: Option<RecordBoundaryFlag>,

    /// Fixed number of lines per root record (implies --record-boundary fixed)
    #[arg(long, value_name = "N")]
    record_lines: Option<usize>,

    /// Reconcile and report without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn to_config(&self) -> MigrateConfig {
        let boundary = RecordBoundaryFlag::as_domain(self.record_boundary, self.record_lines);
        let mut config = MigrateConfig::new(&self.achievements)
            .with_module_roots(&self.modules)
            .with_document_file_name(&self.file_name)
            .with_record_boundary(boundary)
            .with_dry_run(self.dry_run)
            .with_load_concurrency(load_concurrency_from_env());

        if let Some(root) = &self.learning_paths {
            config = config.with_learning_path_root(root);
        }
        if let Some(path) = &self.proposed_out {
            config = config.with_proposed_root_path(path);
        }
        match &self.deprecated_out {
            Some(Some(path)) => config = config.with_deprecated_path(path),
            Some(None) => config = config.with_default_deprecated_path(),
            None => {}
        }
        config
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = cli.to_config();
    log::debug!(
        "Record boundary: {}, load concurrency: {}",
        cli.record_boundary
            .map_or("default", RecordBoundaryFlag::as_str),
        config.load_concurrency
    );

    let report = match Migrator::new(config).run().await {
        Ok(report) => report,
        Err(MigrateError::Configuration(problems)) => {
            for problem in &problems {
                eprintln!("Error: {problem}");
            }
            std::process::exit(EXIT_CONFIGURATION);
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Migration of {} failed", cli.achievements.display())
            })
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_summary(&report));
    }
    if report.has_issues() {
        log::warn!(
            "{} conflicted and {} unwritten achievements stay in the proposed root",
            report.totals.conflicted,
            report.totals.write_failures
        );
    }

    Ok(())
}

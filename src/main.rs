use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vss_mapper::cli::{self, Command, PipelineArgs};
use vss_mapper::{convert, Conversion, Diagnostics, EnrichmentConfig, FsResolver, Severity};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // RUST_LOG wins over the verbose flag, e.g. RUST_LOG=vss_mapper::loader=trace
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("vss_mapper=debug")
    } else {
        EnvFilter::new("vss_mapper=info")
    };

    // Logs go to stderr; stdout carries only the model or the check report
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("Logging initialized (verbose={})", args.verbose);

    let passed = match args.command {
        Command::Convert { spec, pipeline, output } => {
            let conversion = run_pipeline(&spec, &pipeline)?;
            let json = conversion.model.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("Failed to write model to {}", path.display()))?;
                    info!("Wrote {} signal(s) to {}", conversion.model.len(), path.display());
                }
                None => println!("{json}"),
            }
            eprintln!("{}", summary(&conversion));
            passes(&conversion.diagnostics, &pipeline)
        }
        Command::Check { spec, pipeline } => {
            let conversion = run_pipeline(&spec, &pipeline)?;
            for diagnostic in conversion.diagnostics.iter() {
                println!("{diagnostic}");
            }
            println!("{}", summary(&conversion));
            passes(&conversion.diagnostics, &pipeline)
        }
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_pipeline(spec: &Path, pipeline: &PipelineArgs) -> Result<Conversion> {
    let config = match &pipeline.config_dir {
        Some(dir) => EnrichmentConfig::from_dir(dir)
            .with_context(|| format!("Failed to load configuration from {}", dir.display()))?,
        None => {
            debug!("No configuration directory given; using empty tables");
            EnrichmentConfig::default()
        }
    };

    let base_dir = spec.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let root = spec
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a spec file path: {}", spec.display()))?;

    let resolver = FsResolver::new(base_dir);
    convert(root, &resolver, &config).with_context(|| format!("Failed to convert {}", spec.display()))
}

fn summary(conversion: &Conversion) -> String {
    let count = |severity: Severity| conversion.diagnostics.count_severity(severity);
    format!(
        "{} signal(s) from {} node(s), {} enriched; {} error(s), {} warning(s), {} info",
        conversion.model.len(),
        conversion.node_count,
        conversion.enriched_count,
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    )
}

/// False when warnings are denied and any were recorded
fn passes(diagnostics: &Diagnostics, pipeline: &PipelineArgs) -> bool {
    if pipeline.deny_warnings && diagnostics.has_warnings() {
        eprintln!("Failing: diagnostics recorded and --deny-warnings is set");
        return false;
    }
    true
}

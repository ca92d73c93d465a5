use anyhow::{Context, Result};
use appdef::prelude::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Detect, migrate and expand declarative app definitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dialect of a definition and the score of every checker
    Detect {
        /// Path to the app definition JSON file
        file: PathBuf,
    },
    /// Print the canonical V2 form of a definition
    Migrate {
        /// Path to the app definition JSON file
        file: PathBuf,
        /// Published ports are allocated right above this number
        #[arg(long, default_value_t = appdef::transform::DEFAULT_PORT_BASE)]
        port_base: u16,
    },
    /// Print the instance descriptors a definition expands into
    Expand {
        /// Path to the app definition JSON file
        file: PathBuf,
        /// Organization the app is deployed for
        #[arg(long)]
        org: String,
        /// Target environment, e.g. `prod`
        #[arg(long)]
        env: String,
        /// Application name; defaults to the name carried by the definition
        #[arg(long)]
        app: Option<String>,
    },
    /// Print the application name of a definition
    Name {
        /// Path to the app definition JSON file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect { file } => run_detect(&file),
        Command::Migrate { file, port_base } => run_migrate(&file, port_base),
        Command::Expand {
            file,
            org,
            env,
            app,
        } => run_expand(&file, org, env, app),
        Command::Name { file } => {
            let bytes = read_definition(&file)?;
            println!("{}", Pipeline::new().app_name(&bytes)?);
            Ok(())
        }
    }
}

fn read_definition(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read definition file '{}'", path.display()))
}

fn run_detect(path: &Path) -> Result<()> {
    let bytes = read_definition(path)?;
    let classifier = Classifier::default();

    for score in classifier.scores(&bytes) {
        println!("  {:<4} {:>3}%", score.dialect, score.confidence);
    }
    let detection = classifier
        .classify(&bytes)
        .with_context(|| format!("Could not detect the dialect of '{}'", path.display()))?;
    println!("-> {} ({}%)", detection.dialect, detection.confidence);
    Ok(())
}

fn run_migrate(path: &Path, port_base: u16) -> Result<()> {
    let bytes = read_definition(path)?;
    let pipeline = Pipeline::builder().with_port_base(port_base).build();

    let (detection, graph) = pipeline
        .normalize(&bytes)
        .with_context(|| format!("Failed to migrate '{}'", path.display()))?;
    if detection.dialect == Dialect::V2 {
        eprintln!("'{}' is already a V2 definition", path.display());
    }
    println!("{}", graph.to_json()?);
    Ok(())
}

fn run_expand(path: &Path, org: String, env: String, app: Option<String>) -> Result<()> {
    let start = Instant::now();
    let bytes = read_definition(path)?;
    let pipeline = Pipeline::new();

    let app = match app {
        Some(app) => app,
        None => pipeline.app_name(&bytes)?,
    };
    let deployment = DeploymentContext::new(org, env, app);
    let instances = pipeline
        .expand(&deployment, &bytes)
        .with_context(|| format!("Failed to expand '{}'", path.display()))?;

    // --- Dry-run scheduling ---
    let mut repository = LocalRepository::new();
    for instance in instances {
        repository.schedule(instance)?;
    }

    println!("{}", serde_json::to_string_pretty(repository.instances())?);
    eprintln!(
        "Expanded {} instances in {:?}",
        repository.len(),
        start.elapsed()
    );
    Ok(())
}

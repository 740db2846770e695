use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sf_archive::Format;
use sf_core::Stopwatch;
use sf_models::Advection1d;
use sf_project::Project;
use sf_results::{FileSink, OutputDir, resume};
use sf_sim::{Channel, run_fresh};
use tracing::info;

mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "stepflow CLI - time-stepping driver for hyperbolic solvers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Run the advection model described by a project file
    Run {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Resume from this checkpoint instead of starting fresh
        #[arg(long)]
        restart: Option<PathBuf>,
        /// Override the archive format (text, binary or json)
        #[arg(long)]
        format: Option<String>,
        /// Override the output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Do not print iteration messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// Write a project file with default settings
    Init {
        /// Path of the project file to create (.yaml, .yml or .json)
        project_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List checkpoints in a project's output directory
    Checkpoints {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            restart,
            format,
            output_dir,
            quiet,
        } => cmd_run(
            &project_path,
            restart.as_deref(),
            format.as_deref(),
            output_dir,
            quiet,
        ),
        Commands::Init {
            project_path,
            force,
        } => cmd_init(&project_path, force),
        Commands::Checkpoints { project_path } => cmd_checkpoints(&project_path),
    }
}

fn load_project(project_path: &Path) -> CliResult<Project<Advection1d>> {
    Ok(sf_project::load(project_path)?)
}

/// Relative output directories are taken from the project file's directory.
fn resolve_output_dir(project_path: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        return dir;
    }
    match project_path.parent() {
        Some(parent) => parent.join(dir),
        None => dir,
    }
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_project(project_path)?;
    println!("✓ Project is valid: {}", project.name);
    println!(
        "  RK{} / CFL {} / t_final {}",
        project.driver.rk_order, project.driver.cfl, project.driver.t_final
    );
    for channel in Channel::ALL {
        let spec = project.driver.schedule(channel);
        println!(
            "  {:<10} every {} (time kind {}, {:?})",
            channel.name(),
            spec.interval,
            spec.time_kind,
            spec.policy
        );
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    restart: Option<&Path>,
    format: Option<&str>,
    output_dir: Option<PathBuf>,
    quiet: bool,
) -> CliResult<()> {
    let project = load_project(project_path)?;
    let config = project.run_config();
    let format: Format = format.unwrap_or(project.output.format.as_str()).parse()?;
    let root = resolve_output_dir(
        project_path,
        output_dir.unwrap_or_else(|| project.output.directory.clone()),
    );

    println!("Running {}", project.name);
    println!("  output: {} ({})", root.display(), format);

    let dir = OutputDir::new(root, format)?;
    let mut sink = FileSink::for_config(dir, &config)?;
    if quiet {
        sink = sink.quiet();
    }

    let stopwatch = Stopwatch::start();
    let (state, driver) = match restart {
        Some(path) => resume(&config, path, &mut sink)?,
        None => run_fresh(&config, &mut sink)?,
    };
    let wall = stopwatch.elapsed_seconds();
    info!(wall_seconds = wall, "run complete");

    println!("✓ Run completed at t = {:.5}", state.time);
    println!("  Iterations: {}", driver.iteration);
    println!(
        "  Checkpoints: {}  Products: {}",
        driver.clock(Channel::Checkpoint).count + 1,
        driver.clock(Channel::Product).count + 1
    );
    println!("  Timeseries rows: {}", driver.timeseries.rows());
    println!("  Wall time: {:.3} s", wall);
    Ok(())
}

fn cmd_init(project_path: &Path, force: bool) -> CliResult<()> {
    if project_path.exists() && !force {
        return Err(error::CliError::Exists {
            path: project_path.display().to_string(),
        });
    }
    let project = Project::new("Advection demo", Advection1d::default());
    sf_project::save(project_path, &project)?;
    println!("✓ Wrote {}", project_path.display());
    Ok(())
}

fn cmd_checkpoints(project_path: &Path) -> CliResult<()> {
    let project = load_project(project_path)?;
    let format: Format = project.output.format.parse()?;
    let root = resolve_output_dir(project_path, project.output.directory.clone());
    if !root.exists() {
        println!("No outputs in {}", root.display());
        return Ok(());
    }

    let dir = OutputDir::new(root, format)?;
    let checkpoints = dir.list_checkpoints()?;
    if checkpoints.is_empty() {
        println!("No checkpoints in {}", dir.root().display());
    } else {
        println!("Checkpoints in {}:", dir.root().display());
        for (number, path) in checkpoints {
            println!("  {:04}  {}", number, path.display());
        }
    }
    Ok(())
}

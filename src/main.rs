use clap::{Parser, Subcommand};
use docusaurus_migrate::migrate::{self, MigrateOptions};
use docusaurus_migrate::output;
use docusaurus_migrate::versions::EmptyVersionPolicy;
use std::path::PathBuf;

/// Shared arguments for commands that build a plan.
#[derive(clap::Args, Clone)]
struct PlanArgs {
    /// Legacy website directory (contains siteConfig.js)
    site_dir: PathBuf,

    /// Directory for the migrated site
    new_dir: PathBuf,

    /// Skip versioned docs and sidebars
    #[arg(long)]
    no_versions: bool,

    /// Skip translated content
    #[arg(long)]
    no_translations: bool,

    /// Remove registered versions that have neither sidebar nor docs
    #[arg(long)]
    drop_empty_versions: bool,

    /// Maximum parallel workers (clamped to available cores)
    #[arg(long)]
    jobs: Option<usize>,
}

impl PlanArgs {
    fn options(&self) -> MigrateOptions {
        MigrateOptions {
            include_versions: !self.no_versions,
            include_translations: !self.no_translations,
            empty_versions: if self.drop_empty_versions {
                EmptyVersionPolicy::Drop
            } else {
                EmptyVersionPolicy::Keep
            },
        }
    }
}

#[derive(Parser)]
#[command(name = "docusaurus-migrate")]
#[command(about = "Migrate a Docusaurus v1 site to the v2 layout")]
#[command(long_about = "\
Migrate a Docusaurus v1 site to the v2 layout

The legacy website directory is read, a plan of file operations is built,
and only then is the new site written. Nothing is written by 'plan'.

Legacy layout:

  project/
  ├── docs/                            # Docs (or customDocsPath)
  └── website/                         # SITE_DIR
      ├── siteConfig.js                # Site config (or siteConfig.json)
      ├── sidebars.json                # Navigation trees
      ├── versions.json                # Version registry, newest first
      ├── versioned_docs/version-X/    # Per-version doc snapshots
      ├── versioned_sidebars/          # Per-version sidebar overlays
      ├── translated_docs/<locale>/    # Translations
      ├── blog/  pages/  static/
      └── package.json

Missing sidebars, version overlays and empty locales are reported as
warnings; the migration continues.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the plan and write the migrated site
    Migrate(PlanArgs),
    /// Build and print the plan without writing anything
    Plan {
        #[command(flatten)]
        args: PlanArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Migrate(args) => {
            init_thread_pool(args.jobs);
            println!("==> Planning {}", args.site_dir.display());
            let migration = migrate::migrate(&args.site_dir, &args.new_dir, &args.options())?;
            output::print_plan_output(&migration);
            output::print_warnings(&migration.warnings);

            println!("==> Writing {}", args.new_dir.display());
            match migrate::execute(&migration.plan) {
                Ok(report) => output::print_execution_report(&report, &args.new_dir),
                Err(err) => {
                    output::print_execution_error(&err);
                    return Err(err.into());
                }
            }
            println!("==> Migration complete: {}", args.new_dir.display());
        }
        Command::Plan { args, json } => {
            init_thread_pool(args.jobs);
            let migration = migrate::migrate(&args.site_dir, &args.new_dir, &args.options())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&migration.plan)?);
            } else {
                output::print_plan_operations(&migration.plan);
                println!();
                output::print_plan_output(&migration);
                output::print_warnings(&migration.warnings);
            }
        }
    }

    Ok(())
}

/// Resolve the worker count: `None` uses every core, `Some(n)` is clamped to
/// `min(n, cores)`.
fn effective_threads(jobs: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    jobs.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// Initialize the rayon thread pool used for discovery and execution.
fn init_thread_pool(jobs: Option<usize>) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(effective_threads(jobs))
        .build_global()
        .ok();
}

//! Form Answers command-line tool.
//!
//! Stores form submissions, exports them as CSV, XLSX or XML, and removes
//! deleted entries.

use anyhow::Result;
use clap::{Parser, Subcommand};
use formanswers_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::context::{block_on, CliContext};
use cli::entries::SubmitArgs;
use cli::export::ExportArgs;

/// Exit code when an export matches nothing.
const EXIT_NO_ENTRIES: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "formanswers", about = "Store, export and clean up form submissions")]
struct Cli {
    /// Configuration file (default: $FORMANSWERS_HOME/config.toml)
    #[arg(long, global = true, env = "FORMANSWERS_CONFIG")]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store one submission
    Submit {
        /// Page scope the form belongs to
        #[arg(long)]
        scope: i64,

        /// Form name
        #[arg(long)]
        form: String,

        /// Answers as a JSON object, or - to read from stdin
        answers: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submission counts per scope and form
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one submission
    Show {
        /// Submission id
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forms with active submissions in a scope
    Forms {
        #[arg(long)]
        scope: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Field sets a form has been submitted with
    Variants {
        /// Form name
        form: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export submissions and mark them as exported
    Export(ExportArgs),

    /// Mark all entries of a form in a scope as deleted
    DeleteForm {
        /// Form name
        form: String,

        #[arg(long)]
        scope: i64,
    },

    /// Count deleted entries waiting to be removed
    PrepareRemove {
        #[arg(long)]
        scope: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Permanently remove deleted entries of a scope
    Remove {
        #[arg(long)]
        scope: i64,

        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
}

fn run_command(cli: Cli) -> Result<()> {
    let ctx = CliContext::load(cli.config.as_deref(), cli.db)?;

    match cli.command {
        Commands::Submit {
            scope,
            form,
            answers,
            json,
        } => block_on(cli::entries::submit(
            &ctx,
            SubmitArgs {
                scope,
                form,
                answers,
                json,
            },
        )),
        Commands::List { json } => block_on(cli::entries::list(&ctx, json)),
        Commands::Show { id, json } => block_on(cli::entries::show(&ctx, id, json)),
        Commands::Forms { scope, json } => block_on(cli::forms::forms(&ctx, scope, json)),
        Commands::Variants { form, json } => block_on(cli::forms::variants(&ctx, &form, json)),
        Commands::Export(args) => block_on(cli::export::run(&ctx, args)),
        Commands::DeleteForm { form, scope } => {
            block_on(cli::remove::delete_form(&ctx, &form, scope))
        }
        Commands::PrepareRemove { scope, json } => {
            block_on(cli::remove::prepare_remove(&ctx, scope, json))
        }
        Commands::Remove { scope, yes } => block_on(cli::remove::remove(&ctx, scope, yes)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "formanswers",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(app_err) = err.downcast_ref::<formanswers::Error>() {
                if app_err.is_no_entries() {
                    eprintln!("WARNING: {}", app_err);
                    return ExitCode::from(EXIT_NO_ENTRIES);
                }
            }
            if let Some(helpful) = err.downcast_ref::<cli::error::HelpfulError>() {
                eprint!("{}", helpful);
            } else {
                eprintln!("ERROR: {:#}", err);
            }
            ExitCode::from(1)
        }
    }
}

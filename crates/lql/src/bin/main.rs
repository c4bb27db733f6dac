//! LQL command-line interface

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use lql::cli::output::{self, OutputFormat};
use lql::cli::{Input, check, compile, inspect, load_options};
use lql::{CompileOptions, ParseMode};
use std::path::PathBuf;

/// LQL command-line tool
#[derive(Parser)]
#[command(name = "lql")]
#[command(author, version, about = "Logic Query Language (LQL) tools", long_about = None)]
struct Cli {
    /// Verbose logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Compile options file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parse mode
    #[arg(long, value_enum, global = true)]
    mode: Option<Mode>,

    /// Maximum nesting of parentheses, NOT and function application
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Stop at the first failing statement
    Fast,
    /// Report every failing statement
    Analysis,
}

impl From<Mode> for ParseMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fast => Self::Fast,
            Mode::Analysis => Self::Analysis,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile statements to criteria
    Compile {
        /// LQL file (default: stdin)
        file: Option<PathBuf>,

        /// Compile this text instead of a file
        #[arg(short, long)]
        expression: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Check LQL files and report every diagnostic
    Check {
        /// LQL files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the token stream
    Tokens {
        /// LQL file (default: stdin)
        file: Option<PathBuf>,

        /// Tokenize this text instead of a file
        #[arg(short, long)]
        expression: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the parsed syntax tree as JSON
    Ast {
        /// LQL file (default: stdin)
        file: Option<PathBuf>,

        /// Parse this text instead of a file
        #[arg(short, long)]
        expression: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn resolve_options(cli: &Cli) -> Result<CompileOptions> {
    let mut options = load_options(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        options = options.with_mode(mode.into());
    }
    if let Some(max_depth) = cli.max_depth {
        options = options.with_max_depth(max_depth);
    }
    Ok(options)
}

fn run(cli: Cli) -> Result<bool> {
    let options = resolve_options(&cli)?;

    match cli.command {
        Commands::Compile {
            file,
            expression,
            format,
        } => {
            let config = compile::CompileConfig {
                input: Input::from_args(file, expression)?,
                format,
                options,
                output_file: cli.output,
            };
            compile::compile(config).map(|()| true)
        }

        Commands::Check { files } => {
            let config = check::CheckConfig {
                files,
                options,
                verbose: cli.verbose > 0,
            };
            check::check(config).map(|report| report.is_success())
        }

        Commands::Tokens {
            file,
            expression,
            format,
        } => {
            let config = inspect::InspectConfig {
                input: Input::from_args(file, expression)?,
                format,
                options,
                output_file: cli.output,
            };
            inspect::tokens(config).map(|()| true)
        }

        Commands::Ast {
            file,
            expression,
            format,
        } => {
            let config = inspect::InspectConfig {
                input: Input::from_args(file, expression)?,
                format,
                options,
                output_file: cli.output,
            };
            inspect::ast(config).map(|()| true)
        }
    }
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}

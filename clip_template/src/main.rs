use clap::{Parser, Subcommand, ValueEnum};
use clip_template::batch::{self, BatchConfig, BatchResults};
use clip_template::config::{LoggingPreferences, RuntimeConfig};
use clip_template::config::runtime::LogLevel;
use clip_template::file_processor::FileProcessor;
use clip_template::logging;
use clip_template::pipeline::{self, CheckOptions, FileReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "clip-template", version, about = "Check web clipper templates for syntax errors and unknown variables")]
struct Cli {
    /// Runtime configuration file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log pipeline events to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check template files and directories
    Check {
        /// Template files (.template, .tmpl), clipper JSON exports or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Skip the unknown-variable check
        #[arg(long)]
        no_validate: bool,

        /// Extra variable name to accept (repeatable)
        #[arg(long = "known", value_name = "VAR")]
        known: Vec<String>,

        /// Check files on the calling thread only
        #[arg(long)]
        sequential: bool,

        /// Do not descend into subdirectories
        #[arg(long)]
        no_recursive: bool,

        /// Stop at the first file that cannot be read
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the token stream of a template as JSON
    Tokens { file: PathBuf },
    /// Print the syntax tree of a template as JSON
    Ast { file: PathBuf },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match cli.config.as_deref() {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error[{}]: {}", e.error_code(), e);
                return ExitCode::FAILURE;
            }
        },
        None => RuntimeConfig::default(),
    };

    if let Err(e) = init_logging(&runtime.logging, cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match cli.command {
        Command::Check {
            paths,
            format,
            no_validate,
            known,
            sequential,
            no_recursive,
            fail_fast,
        } => {
            let options = CheckOptions {
                validate: !no_validate,
                validation: runtime.validation.clone().with_known_variables(known),
            };
            let mut batch_config = BatchConfig::from_preferences(&runtime.batch);
            if sequential {
                batch_config = batch_config.sequential();
            }
            if no_recursive {
                batch_config.recursive = false;
            }
            batch_config.fail_fast = fail_fast;

            let processor = FileProcessor::from_preferences(&runtime.file_processor);
            run_check(&paths, &processor, &options, &batch_config, format)
        }
        Command::Tokens { file } => {
            let processor = FileProcessor::from_preferences(&runtime.file_processor);
            print_json_for(&file, &processor, |source| {
                serde_json::to_string_pretty(&clip_template::tokenize(source))
            })
        }
        Command::Ast { file } => {
            let processor = FileProcessor::from_preferences(&runtime.file_processor);
            print_json_for(&file, &processor, |source| {
                serde_json::to_string_pretty(&clip_template::parse(source))
            })
        }
    }
}

fn init_logging(preferences: &LoggingPreferences, verbose: bool) -> Result<(), String> {
    let mut preferences = preferences.clone();
    if verbose {
        preferences.enable_console_logging = true;
        preferences.min_log_level = LogLevel::Debug;
    }
    if !preferences.enable_console_logging {
        return Ok(());
    }

    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()
}

fn run_check(
    paths: &[PathBuf],
    processor: &FileProcessor,
    options: &CheckOptions,
    config: &BatchConfig,
    format: OutputFormat,
) -> ExitCode {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            match batch::discover_template_files(path, config) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    eprintln!("error[{}]: {}", e.error_code(), e);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    let results = match batch::check_files(&files, processor, options, config) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error[{}]: {}", e.error_code(), e);
            return ExitCode::FAILURE;
        }
    };

    let summary = results.summary();
    match format {
        OutputFormat::Human => print_human(&results),
        OutputFormat::Json => match pipeline::format_json(&results.reports, summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error formatting report: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_human(results: &BatchResults) {
    for report in &results.reports {
        print_report(report);
    }
    for (path, error) in &results.failed_files {
        eprintln!("{}: error[{}]: {}", path.display(), error.error_code(), error);
    }
    println!("{}", results.summary());
}

fn print_report(report: &FileReport) {
    print!("{}", pipeline::format_human(report));
}

fn print_json_for<F>(file: &Path, processor: &FileProcessor, render: F) -> ExitCode
where
    F: FnOnce(&str) -> Result<String, serde_json::Error>,
{
    let source = match processor.process_file(file) {
        Ok(result) => result.source,
        Err(e) => {
            eprintln!("{}: error[{}]: {}", file.display(), e.error_code(), e);
            return ExitCode::FAILURE;
        }
    };

    match render(&source) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error formatting output: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! git-ai-commit configuration CLI
//!
//! Entry point for the `git-ai-commit` command-line tool.

use clap::{Parser, Subcommand};
use git_ai_commit::config::{inspect_repo, CliOverrides, ConfigPaths, ConfigResolver, MergedConfig};
use git_ai_commit::trust::{TrustDecision, TrustStore};
use git_ai_commit::{EmbeddedPresets, GitCli, PresetProvider, SearchPath, TerminalConsent};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "GIT_AI_COMMIT_LOG";

#[derive(Parser)]
#[command(name = "git-ai-commit")]
#[command(about = "Resolve git-ai-commit configuration and manage repo config trust", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the effective configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Engine to use, overriding config files
        #[arg(long)]
        engine: Option<String>,

        /// Prompt preset name
        #[arg(long)]
        prompt: Option<String>,

        /// Prompt file, relative to the current directory
        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Repository config trust
    Trust {
        #[command(subcommand)]
        action: TrustCommands,
    },

    /// List embedded prompt presets
    Presets,
}

#[derive(Subcommand)]
enum TrustCommands {
    /// Show whether the current repository config is trusted (never prompts)
    Status,

    /// List trusted repository configs
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config {
            json,
            engine,
            prompt,
            prompt_file,
        } => {
            let overrides = CliOverrides {
                engine,
                prompt,
                prompt_file,
            };
            run_config(overrides, json);
        }
        Commands::Trust { action } => match action {
            TrustCommands::Status => run_trust_status(),
            TrustCommands::List { json } => run_trust_list(json),
        },
        Commands::Presets => run_presets(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn config_paths() -> ConfigPaths {
    match ConfigPaths::from_env() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_config(overrides: CliOverrides, json_output: bool) {
    let repo = GitCli::new();
    let mut consent = TerminalConsent::from_terminal();

    let config = ConfigResolver::new(config_paths(), &repo, &SearchPath, &EmbeddedPresets, &mut consent)
        .with_overrides(overrides)
        .resolve();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_config(&config);
    }
}

fn print_config(config: &MergedConfig) {
    match config.engine_command() {
        Some(cmd) => {
            let from = match config.engine_origin {
                Some(origin) => origin.to_string(),
                None => "autodetected".to_string(),
            };
            println!("Engine: {} ({})", config.engine, from);
            println!("  Command: {}", cmd.command_line());
        }
        None => println!("Engine: none (no engine configured or found on PATH)"),
    }

    println!("Prompt: from {}", config.prompt_origin);
    match &config.prompt_source {
        git_ai_commit::PromptSource::Preset { name } => println!("  Preset: {}", name),
        git_ai_commit::PromptSource::File { path } => println!("  File: {}", path.display()),
    }

    let options = config.filter_options();
    println!("Filter:");
    if options.max_file_lines == 0 {
        println!("  Max lines per file: unlimited");
    } else {
        println!("  Max lines per file: {}", options.max_file_lines);
    }
    println!("  Excluded: {}", options.exclude_patterns.join(", "));

    println!("Sources:");
    for source in &config.sources {
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => {
                println!("  {}: {} (sha256 {})", source.origin, path.display(), digest)
            }
            _ => println!("  {}", source.origin),
        }
    }
}

fn run_trust_status() {
    let repo = GitCli::new();

    match inspect_repo(&config_paths(), &repo) {
        Ok(None) => println!("No repo config found."),
        Ok(Some(eval)) => {
            println!("{}: {}", eval.config_path.display(), eval.decision);
            println!("  Hash: {}", eval.hash);
            if eval.decision != TrustDecision::Trusted {
                println!("  Run `git-ai-commit config` in a terminal to review and trust it.");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_trust_list(json_output: bool) {
    let paths = config_paths();
    let store = match TrustStore::open(paths.trust_store()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading trust store: {}", e);
            process::exit(1);
        }
    };

    if json_output {
        match serde_json::to_string_pretty(store.entries()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if store.is_empty() {
        println!("No trusted repo configs.");
        return;
    }

    println!("Trusted repo configs ({} total):\n", store.len());
    for entry in store.entries() {
        println!("  {}", entry.config_path.display());
        println!("    Repo: {}", entry.repo_root.display());
        println!("    Hash: {}", entry.hash);
    }
}

fn run_presets() {
    for name in EmbeddedPresets.names() {
        println!("{}", name);
    }
}

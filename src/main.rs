//! paperctl command-line entry point.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use paperctl::cli::{ClassifyArgs, Cli, Commands, SortArgs};
use paperctl::{
    build_path, colors, Classifier, ClassifierOptions, CodeRegistry, Config, FileMover, PromptResolver,
    Scanner, SortOptions, Sorter,
};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Disable colors if requested
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet, cli.no_color);

    // Handle help and version commands first
    match cli.command {
        Commands::ShowHelp => {
            Cli::print_help();
            return Ok(());
        }
        Commands::Version => {
            Cli::print_version();
            return Ok(());
        }
        _ => {}
    }

    tracing::debug!(command = cli.command.name(), "starting");
    let mut config = Config::load().context("Failed to load configuration")?;

    match &cli.command {
        Commands::Sort(args) => handle_sort(&mut config, args, cli.verbose, cli.quiet)?,
        Commands::Classify(args) => handle_classify(&config, args)?,
        Commands::Init => handle_init(&config)?,
        Commands::Config => config.display(),
        Commands::ShowHelp | Commands::Version => unreachable!(),
    }

    Ok(())
}

/// Diagnostics go to stderr; RUST_LOG overrides the flags
fn init_tracing(verbose: bool, quiet: bool, no_color: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_target(false)
        .without_time()
        .init();
}

fn load_registry(cli_codes: &[PathBuf], config: &Config) -> Result<CodeRegistry> {
    let codes: &[PathBuf] = if cli_codes.is_empty() { &config.codes } else { cli_codes };

    if codes.is_empty() {
        anyhow::bail!("No codes files given. Pass --codes or run `paperctl init`");
    }

    let registry = CodeRegistry::from_csv_paths(codes).context("Failed to load syllabus codes")?;
    if registry.is_empty() {
        anyhow::bail!("No syllabus codes found in {} file(s)", codes.len());
    }

    Ok(registry)
}

fn handle_sort(config: &mut Config, args: &SortArgs, verbose: bool, quiet: bool) -> Result<()> {
    let registry = load_registry(&args.codes, config)?;
    let output = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .context("No output directory given. Pass --output or run `paperctl init`")?;

    let interactive = args.interactive || config.prompt_missing;
    let options = ClassifierOptions {
        fuzzy: config.fuzzy && !args.strict,
        ..Default::default()
    };
    let mut classifier = Classifier::new(registry, options);
    if interactive {
        classifier = classifier.with_resolver(Box::new(PromptResolver));
    }

    let sort_options = SortOptions {
        dry_run: args.dry_run,
        copy: args.copy || config.copy,
        force: args.force || config.force,
        quit_on_error: args.quit_on_error || config.quit_on_error,
    };

    let scan = Scanner::new(&classifier, args.recursive || config.recursive).scan(&args.paths);
    if scan.is_empty() {
        if !quiet {
            println!("{} No files to sort", "✨".green());
        }
        return Ok(());
    }

    if !quiet {
        println!("{} {} file{} → {}",
            "📚 Sorting".color(colors::HEADER),
            scan.files.len(),
            if scan.files.len() == 1 { "" } else { "s" },
            output.display().to_string().color(colors::PATH));
        if !scan.excluded.is_empty() {
            println!("   {} inside already sorted folders ignored", scan.excluded.len());
        }
        if args.dry_run {
            println!("{} DRY RUN: Showing what would be done", "🌵".yellow());
            println!("   No files will be modified");
        }
        println!();
    }

    let mut sorter = Sorter::new(&classifier, FileMover::new(output, sort_options))
        .show_pattern(args.output_pattern)
        .quiet(quiet)
        .progress(!verbose && !args.dry_run && !interactive);

    let result = sorter.run(&scan.files).map(|_| ());
    let report = sorter.into_report();

    if !quiet {
        report.print_summary(args.dry_run);
    }

    result.context("Sorting stopped at the first error")?;

    if !args.dry_run && Config::config_path()?.exists() {
        config.mark_sorted();
        if let Err(e) = config.save() {
            tracing::warn!("Could not record sort time: {:#}", e);
        }
    }

    Ok(())
}

fn handle_classify(config: &Config, args: &ClassifyArgs) -> Result<()> {
    let registry = load_registry(&args.codes, config)?;
    let options = ClassifierOptions {
        fuzzy: config.fuzzy && !args.strict,
        ..Default::default()
    };
    let classifier = Classifier::new(registry, options);

    for name in &args.names {
        let path = Path::new(name);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());

        let classified = classifier
            .classify_path(path, true)
            .and_then(|record| build_path(&record, classifier.vocab(), &file_name).map(|canonical| (record, canonical)));

        match classified {
            Ok((record, canonical)) if args.json => {
                let line = json!({
                    "name": name,
                    "record": record,
                    "path": canonical.to_slash_string(),
                });
                println!("{}", serde_json::to_string(&line)?);
            }
            Ok((record, canonical)) => {
                println!("{} {}", "✅".green(), name.bold());
                println!("   → {}", canonical.to_slash_string().color(colors::PATH));
                println!("   {} {} {} {} | {} {} | {}",
                    record.board,
                    record.level,
                    record.general_subject,
                    record.code,
                    record.month,
                    record.year,
                    record.type_str.as_deref().unwrap_or("-"));
                println!("   {}", record.pattern_id.to_string().dimmed());
            }
            Err(e) if args.json => {
                let line = json!({
                    "name": name,
                    "error": e.kind(),
                    "reason": e.to_string(),
                });
                println!("{}", serde_json::to_string(&line)?);
            }
            Err(e) => {
                println!("{} {}: {}", "❔".yellow(), name.bold(), e.to_string().color(colors::WARNING));
            }
        }
    }

    Ok(())
}

fn handle_init(current: &Config) -> Result<()> {
    let config = Config::run_wizard(current)?;
    config.save().context("Failed to save configuration")?;

    println!();
    println!("{} Setup complete! Your preferences are saved.", "✅".green());
    println!("{} Try: {}", "💡".cyan(), "paperctl sort ~/Downloads --dry-run".bold());
    Ok(())
}

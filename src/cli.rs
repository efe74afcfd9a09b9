//! Command-line definitions.

use clap::{Parser, Subcommand, Args};
use std::path::PathBuf;
use colored::*;

#[derive(Parser, Debug)]
#[command(
    name = "paperctl",
    about = "Sort exam past papers into a board/level/subject tree",
    version,
    long_about = "paperctl reads the names of downloaded past papers, works out the\n\
                  board, syllabus code, session, year and document type, and files\n\
                  them under a consistent folder tree with consistent names.\n\n\
                  Features:\n\
                  • Cambridge and Edexcel naming schemes\n\
                  • Syllabus codes from your own CSV lists\n\
                  • Zip bundles unpacked in place\n\
                  • Dry runs that show every planned move"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print detailed information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Output only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify files and move them into the output tree
    Sort(SortArgs),

    /// Show how names would be classified, without touching any file
    Classify(ClassifyArgs),

    /// Create or update the configuration interactively
    Init,

    /// Show configuration
    Config,

    /// Show help and examples
    ShowHelp,

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct SortArgs {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory to store sorted files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// CSV files containing board codes
    #[arg(short, long, num_args = 1..)]
    pub codes: Vec<PathBuf>,

    /// Index directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would happen without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Copy instead of moving files
    #[arg(short = 'C', long)]
    pub copy: bool,

    /// Overwrite files that already exist at the destination
    #[arg(short, long)]
    pub force: bool,

    /// Print the naming pattern each file matched
    #[arg(short = 'P', long)]
    pub output_pattern: bool,

    /// Only accept names that follow a known pattern
    #[arg(long)]
    pub strict: bool,

    /// Ask for details that cannot be read from a name
    #[arg(short, long)]
    pub interactive: bool,

    /// Stop at the first file that cannot be moved
    #[arg(long)]
    pub quit_on_error: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// File names to classify
    #[arg(required = true)]
    pub names: Vec<String>,

    /// CSV files containing board codes
    #[arg(short, long, num_args = 1..)]
    pub codes: Vec<PathBuf>,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Only accept names that follow a known pattern
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Print comprehensive help
    pub fn print_help() {
        println!("{}", "📚 PAPERCTL - PAST PAPER SORTER".bold().cyan());
        println!();
        println!("{}", "USAGE:".bold());
        println!("  paperctl <COMMAND> [OPTIONS]");
        println!();
        println!("{}", "COMMANDS:".bold());
        println!("  {}  Sort files into the output tree", "sort".cyan().bold());
        println!("      paperctl sort ~/Downloads -o ~/Papers -c codes.csv");
        println!("      paperctl sort ~/Downloads -r -n");
        println!("      paperctl sort bundle.zip --copy");
        println!();
        println!("  {}  Classify names only", "classify".cyan().bold());
        println!("      paperctl classify 9709_w21_qp_12.pdf -c codes.csv");
        println!("      paperctl classify wma11_01_msc_20230112.pdf --json");
        println!();
        println!("  {}  Interactive setup", "init".cyan().bold());
        println!("      paperctl init");
        println!();
        println!("  {}  Show configuration", "config".cyan().bold());
        println!("      paperctl config");
        println!();
        println!("{}", "CODES FILES:".dimmed());
        println!("  One syllabus per line, no header:");
        println!("  board, level, subject, detailed subject, master code, code, code...");
        println!("  Cambridge,A-Level,Mathematics,,,9709");
        println!("  Edexcel,IAL,Mathematics,Pure Mathematics,XMA01,WMA11,WMA12");
        println!();
        println!("{}", "SAFETY FEATURES:".bold().cyan());
        println!("  • Existing files are never overwritten without --force");
        println!("  • Names that cannot be fully read are left where they are");
        println!("  • --dry-run shows every planned move first");
    }

    /// Print version information
    pub fn print_version() {
        println!("📚 paperctl v{}", crate::VERSION);
        println!("{}", env!("CARGO_PKG_DESCRIPTION"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
    }
}

impl Commands {
    /// Get the command name
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Sort(_) => "sort",
            Commands::Classify(_) => "classify",
            Commands::Init => "init",
            Commands::Config => "config",
            Commands::ShowHelp => "help",
            Commands::Version => "version",
        }
    }
}

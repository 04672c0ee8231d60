//! sqlfrag CLI
//!
//! Command-line tool for compiling JSON command trees to SQL.

use std::path::PathBuf;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sqlfrag_cli::{DialectName, OutputFormat, compile, load_tree, render};
use sqlfrag_core::generator::GeneratorOptions;

/// Compile a command tree to SQL.
#[derive(Parser)]
#[command(name = "sqlfrag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command tree JSON file, `-` for standard input.
    input: PathBuf,

    /// Target SQL dialect.
    #[arg(short, long, env = "SQLFRAG_DIALECT", value_enum, default_value_t = DialectName::Generic)]
    dialect: DialectName,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,

    /// Keep nested selects instead of fusing them into their parent.
    #[arg(long)]
    no_fuse: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the SQL on stdout stays pipeable.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let tree = load_tree(&cli.input)?;
    let options = GeneratorOptions {
        fuse_selects: !cli.no_fuse,
    };
    let generated = compile(&tree, cli.dialect, options)?;
    info!(
        dialect = ?cli.dialect,
        parameters = generated.parameters.len(),
        columns = generated.columns.len(),
        "compiled command tree"
    );
    print!("{}", render(&generated, cli.format)?);
    Ok(())
}

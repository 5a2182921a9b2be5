use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use ttxcodec_cli::{commands, FormatChoice};

#[derive(Parser)]
#[command(name = "ttxcodec")]
#[command(about = "ttxcodec - Inspect, verify and convert teletext page files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise the sub-pages of a page file
    Inspect {
        /// Input file, "-" for stdin
        #[arg(short, long)]
        input: String,

        /// Input format, taken from the extension when omitted
        #[arg(long, value_enum)]
        format: Option<FormatChoice>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Include a hex dump of every packet
        #[arg(long)]
        packets: bool,
    },

    /// Convert a page file to another format
    Convert {
        /// Input file, "-" for stdin
        #[arg(short, long)]
        input: String,

        /// Output file, "-" for stdout
        #[arg(short, long)]
        output: String,

        /// Input format, taken from the extension when omitted
        #[arg(long, value_enum)]
        from: Option<FormatChoice>,

        /// Output format, taken from the extension when omitted
        #[arg(long, value_enum)]
        to: Option<FormatChoice>,
    },

    /// Check that a file survives save and reload unchanged
    Verify {
        /// Input file, "-" for stdin
        #[arg(short, long)]
        input: String,

        /// Input format, taken from the extension when omitted
        #[arg(long, value_enum)]
        format: Option<FormatChoice>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Inspect {
            input,
            format,
            json,
            packets,
        } => commands::inspect::execute(&input, format, json, packets),

        Commands::Convert {
            input,
            output,
            from,
            to,
        } => commands::convert::execute(&input, &output, from, to),

        Commands::Verify { input, format } => commands::verify::execute(&input, format),
    }
}

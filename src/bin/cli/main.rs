mod commands;
mod output;

use clap::{Parser, Subcommand};
use jsonfield::config::{self, CliArgs};
use jsonfield::fields;
use output::{OutputConfig, OutputFormat};
use std::process;
use tracing_subscriber::EnvFilter;

/// CLI for the jsonfield column codecs
#[derive(Parser, Debug)]
#[clap(name = "jsonfield", about = "Encode, decode and store JSON and pickled column values")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode JSON text and encode it again
    Normalize {
        /// JSON text; read from stdin when omitted
        text: Option<String>,
    },
    /// Run the JSON field read hook on stored text
    Inspect {
        /// Stored column text; read from stdin when omitted
        text: Option<String>,
    },
    /// Pickle a JSON value
    Pickle {
        /// JSON value to pickle
        value: String,
    },
    /// Unpickle a stored payload and print it as JSON
    Unpickle {
        /// Pickled text
        text: String,
    },
    /// Manage stored records
    #[command(subcommand)]
    Record(commands::record::RecordCommands),
}

/// Sets up the tracing subscriber on stderr so stdout stays machine readable
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.args.debug);

    let config = config::get_config(&cli.args);
    fields::set_column_charset(config.default_charset);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Normalize { text } => commands::codec::normalize(text, &config, &output_config),
        Commands::Inspect { text } => commands::codec::inspect(text, &config, &output_config),
        Commands::Pickle { value } => commands::codec::pickle(&value, &output_config),
        Commands::Unpickle { text } => commands::codec::unpickle(&text, &output_config),
        Commands::Record(cmd) => commands::record::execute(cmd, &config, &output_config),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

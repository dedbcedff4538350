use clap::{Parser, Subcommand};
use ferrous_capture_domain::CliOverrides;
use tracing::info;

mod bootstrap;
mod capture;

#[derive(Parser)]
#[command(name = "ferrous-capture")]
#[command(version)]
#[command(about = "Ferrous Capture - DNS traffic capture to JSON and Avro records")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Ingress filter expression, e.g. "udp port 53"
    #[arg(long, value_name = "EXPR", global = true)]
    bpf_filter: Option<String>,

    /// Emit a record for every query
    #[arg(long, global = true)]
    questions: bool,

    /// Emit a record for queries carrying an EDNS client subnet
    #[arg(long, global = true)]
    questions_ecs: bool,

    /// Parse DNS over TCP
    #[arg(long = "tcp", global = true)]
    include_tcp: bool,

    /// Source label attached to every record
    #[arg(long, global = true)]
    source: Option<String>,

    /// Sensor label attached to every record
    #[arg(long, global = true)]
    sensor: Option<String>,

    /// Output format (json, avro, avro-stream)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file; stdout when omitted
    #[arg(short = 'o', long, value_name = "PATH", global = true)]
    output: Option<String>,

    /// Stream topic for the avro-stream format
    #[arg(long, global = true)]
    topic: Option<String>,

    /// Stream message key for the avro-stream format
    #[arg(long, global = true)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read pcap or pcapng files ("-" reads stdin)
    Pcap {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,
    },

    /// Capture from a network interface until interrupted
    #[cfg(feature = "live")]
    Live {
        #[arg(value_name = "INTERFACE")]
        interface: String,

        /// Snapshot length in bytes
        #[arg(long)]
        snaplen: Option<i32>,

        /// Put the interface into promiscuous mode
        #[arg(long)]
        promiscuous: bool,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let (snaplen, promiscuous) = match &self.command {
            #[cfg(feature = "live")]
            Command::Live {
                snaplen,
                promiscuous,
                ..
            } => (*snaplen, *promiscuous),
            Command::Pcap { .. } => (None, false),
        };

        CliOverrides {
            bpf_filter: self.bpf_filter.clone(),
            snaplen,
            promiscuous,
            include_tcp: self.include_tcp,
            questions: self.questions,
            questions_ecs: self.questions_ecs,
            format: self.format.clone(),
            output_path: self.output.clone(),
            source: self.source.clone(),
            sensor: self.sensor.clone(),
            topic: self.topic.clone(),
            key: self.key.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous Capture v{}", env!("CARGO_PKG_VERSION"));

    let input = match cli.command {
        Command::Pcap { files } => capture::Input::Files(files),
        #[cfg(feature = "live")]
        Command::Live { interface, .. } => capture::Input::Interface(interface),
    };

    let outcome = capture::run(config, input).await?;

    eprintln!("{}", outcome.stats);
    outcome.result?;
    Ok(())
}

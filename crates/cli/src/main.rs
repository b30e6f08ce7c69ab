use anyhow::Context;
use clap::Parser;
use ferrous_doq_domain::CliOverrides;
use ferrous_doq_infrastructure::dns::{build_doq_client, MessageBuilder, TlsSessionCache};
use futures::future::join_all;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::str::FromStr;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "ferrous-doq")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous DoQ - DNS-over-QUIC client")]
struct Cli {
    /// Domain name to query
    name: String,

    /// Record type (A, AAAA, MX, TXT, ...)
    #[arg(default_value = "A")]
    record_type: String,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DoQ server, e.g. doq://dns.adguard-dns.com:853
    #[arg(short = 's', long)]
    server: Option<String>,

    /// TLS server name, when it differs from the server host
    #[arg(long)]
    server_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Number of concurrent identical queries
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        server: cli.server.clone(),
        server_name: cli.server_name.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous DoQ v{}", env!("CARGO_PKG_VERSION"));

    let record_type = RecordType::from_str(&cli.record_type.to_ascii_uppercase())
        .with_context(|| format!("Unknown record type: {}", cli.record_type))?;

    let session_cache = TlsSessionCache::new(config.tls.session_cache_size);
    let client = build_doq_client(&config.doq, &session_cache)?;

    // Ctrl-C cancels exchanges still waiting for a session or stream.
    let ctx = CancellationToken::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let queries = (0..cli.count.max(1))
        .map(|_| MessageBuilder::build_query(&cli.name, record_type))
        .collect::<Result<Vec<_>, _>>()?;

    let started = Instant::now();
    let results = join_all(
        queries
            .iter()
            .map(|query| client.exchange_context(&ctx, query)),
    )
    .await;

    let mut failures = 0;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(response) => print_response(i, response),
            Err(e) => {
                failures += 1;
                error!(
                    query = i,
                    server = %client.target(),
                    connection_error = e.is_connection_error(),
                    error = %e,
                    "DoQ exchange failed"
                );
            }
        }
    }

    info!(
        queries = results.len(),
        failures,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Done"
    );

    client.close().await;

    if failures > 0 {
        anyhow::bail!("{} of {} queries failed", failures, results.len());
    }
    Ok(())
}

fn print_response(index: usize, response: &Message) {
    println!(
        ";; query {} id={} rcode={} answers={}",
        index,
        response.id(),
        response.response_code(),
        response.answers().len()
    );
    for record in response.answers() {
        println!("{}", record);
    }
}

//! Basic logger usage example
//!
//! Logs to standard output and, when a collector is configured, to a
//! token-based network endpoint.
//!
//! Run with: cargo run --example basic_usage
//! Optionally set LOG_TOKEN, LOG_HOST and LOG_PORT to add a network sink.

use logfanout::access::{client_ip, AccessRecord};
use logfanout::prelude::*;
use logfanout::{logln, printf};
use std::env;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== logfanout - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .prefix_generator(prefix::timestamp(TimestampFormat::Standard))
        .build();
    logger.add_local_sink()?;

    if let (Ok(token), Ok(host), Ok(port)) =
        (env::var("LOG_TOKEN"), env::var("LOG_HOST"), env::var("LOG_PORT"))
    {
        let port = port
            .parse()
            .map_err(|_| LoggerError::config("LOG_PORT", "not a port number"))?;
        let network = logger.add_network_sink(token, host, port)?;
        network.set_prefix("demo");
        println!("Network sink registered for {}\n", network.endpoint());
    }

    println!("1. Synchronous writes:");
    logger.write(b"service starting\n")?;
    logger.write(b"multi-line records\nstay one record on the wire\n")?;

    println!("\n2. Queued writes:");
    logger.print("queued without waiting\n");
    printf!(logger, "listening on port {}\n", 8080);
    logln!(logger, "workers:", 4);

    println!("\n3. Child loggers:");
    let request = logger.child(["req=42"]);
    request.println("GET /health");

    println!("\n4. Access lines:");
    let ip = client_ip([("X-Forwarded-For", "203.0.113.9")], "10.0.0.2:51000");
    let record = AccessRecord::new("GET", "/health", 200, Duration::from_micros(850), ip)
        .with_request_id("req-42");
    #[cfg(feature = "console")]
    request.print(record.render_colored());
    #[cfg(not(feature = "console"))]
    request.print(record.render_plain());

    logger.drain(DEFAULT_SHUTDOWN_TIMEOUT);

    let metrics = logger.metrics();
    println!(
        "\nRecords written: {}, sink failures: {}, dropped: {}",
        metrics.records_written(),
        metrics.sink_failures(),
        metrics.dropped_count()
    );
    println!("\n=== Example completed successfully! ===");

    Ok(())
}

use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hungry_clients::crowd::{feed_town, Town};
use hungry_clients::customer::{leave_on, LeaveSignal};
use hungry_clients::error::ClientError;

/// Customers of the pide shop, one order each
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    server_ip: String,
    port: u16,
    num_clients: usize,
    town_size_x: i32,
    town_size_y: i32,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| ClientError::LoggingInit(e.to_string()))?;

    let town = Town::new(
        format!("{}:{}", args.server_ip, args.port),
        args.num_clients,
        args.town_size_x,
        args.town_size_y,
    )?;
    let leave = LeaveSignal::new();
    tokio::spawn(leave_on(interrupted(), leave.clone()));

    let summary = feed_town(&town, leave).await?;
    info!("{} customers done", town.clients - summary.not_placed);
    println!("{}", summary);
    Ok(())
}

/// Completes on Ctrl-C or, on unix, on SIGQUIT
async fn interrupted() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::quit()) {
            Ok(mut quit) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = quit.recv() => {}
                }
                return;
            }
            Err(e) => warn!("SIGQUIT will not cancel the orders: {}", e),
        }
    }
    ctrl_c().await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl-C will not cancel the orders: {}", e);
        std::future::pending::<()>().await;
    }
}

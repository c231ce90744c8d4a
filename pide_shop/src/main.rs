use std::net::TcpListener;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use tracing::{error, info};

use pide_shop::config::{ShopConfig, DEFAULT_LOG_FILE, MAX_ORDERS, MAX_OVEN_SIZE};
use pide_shop::error::ShopError;
use pide_shop::logging::init_logging;
use pide_shop::server::serve;
use pide_shop::shop::Shop;
use pide_shop::staff::Staff;
use pide_shop::transition_log::FileTransitionLog;

/// Pide shop server: takes orders over TCP, cooks them and delivers them
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    ip_address: String,
    port: u16,
    /// Number of cooks
    cook_pool_size: usize,
    /// Number of delivery people
    delivery_pool_size: usize,
    /// Distance units a delivery person covers per travel unit
    delivery_speed: u32,
    /// File where every order transition is written
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
    #[arg(long, default_value_t = MAX_ORDERS)]
    max_orders: usize,
    #[arg(long, default_value_t = MAX_OVEN_SIZE)]
    oven_capacity: usize,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ShopError> {
    init_logging()?;
    let config = ShopConfig::new(args.cook_pool_size, args.delivery_pool_size, args.delivery_speed)
        .with_max_orders(args.max_orders)
        .with_oven_capacity(args.oven_capacity);
    config.validate()?;

    let log = FileTransitionLog::open(&args.log_file)?;
    let addr = format!("{}:{}", args.ip_address, args.port);
    let listener = TcpListener::bind(&addr).map_err(|source| ShopError::Bind { addr: addr.clone(), source })?;

    let shop = Arc::new(Shop::new(config, Arc::new(log.recorder()))?);
    let _staff = Staff::hire(&shop)?;
    let accepting = Arc::clone(&shop);
    thread::Builder::new()
        .name("acceptor".to_owned())
        .spawn(move || serve(listener, accepting))
        .map_err(|source| ShopError::Spawn {
            name: "acceptor".to_owned(),
            source,
        })?;
    info!("[SHOP] Open at {}, press Ctrl-C to close", addr);

    wait_for_interrupt()?;
    println!("RIP PIDE SHOP... closing time");
    let report = shop.shut_down();
    println!("{}", report);
    info!("[SHOP] Transition log written to {}", log.path().display());
    log.close();
    Ok(())
}

/// Blocks the main thread until Ctrl-C
fn wait_for_interrupt() -> Result<(), ShopError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(tokio::signal::ctrl_c()).map_err(|e| {
        error!("[SHOP] Cannot listen for Ctrl-C: {}", e);
        ShopError::Io(e)
    })
}

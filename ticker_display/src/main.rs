//! Ticker Display — keeps a small always-on screen showing live quotes for one or two
//! symbols, refreshed on a fixed cadence, together with the device address, the device
//! temperature, the market session state and the time of the last refresh.
//!
//! Usage example (CLI):
//! ```bash
//! ticker_display AAPL MSFT --refresh 15
//! ```
//!
//! Startup discovers the device address (fatal if that fails), then the refresh loop
//! runs until Ctrl+C. Individual quote or sensor failures only affect their own field
//! on the screen. Set `RUST_LOG=debug` for per-refresh logging.
#![warn(missing_docs)]
mod args;
mod net;
mod renderer;
mod scheduler;
mod sensor;
mod source;

use std::io;
use std::sync::{Arc, Mutex};

use clap::Parser;
use crossbeam_channel::bounded;
use log::{error, info};
use ticker_common::{Clock, Result, SystemClock, TickerError};

use crate::args::{Args, OutputKind};
use crate::net::{InterruptibleClock, UdpProbe, resolve_address};
use crate::renderer::{JsonRenderer, Renderer, TerminalRenderer};
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::sensor::CommandProbe;
use crate::source::CnbcSource;

fn main() -> Result<(), TickerError> {
    init_logger();
    let args = Args::parse();
    info!(
        "Starting ticker display for {} (refresh {}s, fetch timeout {:?})",
        args.symbols.join(", "),
        args.refresh,
        args.fetch_timeout()
    );

    // Dropping the sender disconnects every observer of `shutdown_rx` at once.
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    let shutdown_tx = Mutex::new(Some(shutdown_tx));
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        if let Ok(mut tx) = shutdown_tx.lock() {
            tx.take();
        }
    })
    .map_err(|e| TickerError::Config(format!("Error setting Ctrl+C handler: {}", e)))?;

    let probe = UdpProbe::new(&args.probe_address);
    let startup_clock = InterruptibleClock::new(&shutdown_rx);
    let ip_address =
        match resolve_address(&probe, &net::DEFAULT_POLICY, &startup_clock, &shutdown_rx) {
            Ok(ip) => ip,
            Err(TickerError::Interrupted) => {
                info!("Ticker display stopped during startup");
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let source = CnbcSource::new(&args.quote_url, args.fetch_timeout())?;
    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            symbols: args.symbols.clone(),
            ip_address: Some(ip_address),
            fetch_timeout: args.fetch_timeout(),
        },
        Arc::new(source),
        Arc::new(CommandProbe::new(&args.sensor_command, args.fetch_timeout())),
        clock,
    );

    let mut renderer: Box<dyn Renderer> = match args.output {
        OutputKind::Terminal => Box::new(TerminalRenderer::new(io::stdout(), !args.no_color)),
        OutputKind::Json => Box::new(JsonRenderer::new(io::stdout())),
    };

    let ticks = crossbeam_channel::tick(args.refresh_interval());
    scheduler.run(renderer.as_mut(), &ticks, &shutdown_rx);

    if let Some(last) = scheduler.current() {
        info!("Last refresh at {}", last.as_of);
    }
    info!("Ticker display stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

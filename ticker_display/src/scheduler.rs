//! Refresh scheduler.
//!
//! One cooperative loop: wait for a tick, refresh, render, repeat. A refresh dispatches
//! every quote fetch and the temperature read on their own threads and waits for all of
//! them, bounded by the fetch timeout. Whatever has not answered by then is treated as
//! failed, so a hung provider costs one timeout per tick instead of stalling the display.
//!
//! A shutdown signal aborts the refresh in flight; the partial snapshot is dropped and
//! nothing is rendered.
use std::net::IpAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, after, select, unbounded};
use log::{debug, info, warn};
use ticker_common::{Clock, DisplaySnapshot, Quote, market};

use crate::renderer::Renderer;
use crate::sensor::TemperatureProbe;
use crate::source::QuoteSource;

/// Static parameters of the refresh loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tracked symbols in display order.
    pub symbols: Vec<String>,
    /// Address discovered at startup, carried into every snapshot.
    pub ip_address: Option<IpAddr>,
    /// Upper bound for the fetches of one refresh.
    pub fetch_timeout: Duration,
}

/// Answer from one of the workers dispatched by a refresh.
enum Reading {
    Quote(usize, Quote),
    Temperature(Option<f64>),
}

/// Owns the tick cadence and the current snapshot.
pub struct Scheduler {
    config: SchedulerConfig,
    source: Arc<dyn QuoteSource>,
    probe: Arc<dyn TemperatureProbe>,
    clock: Arc<dyn Clock>,
    current: Option<DisplaySnapshot>,
}

impl Scheduler {
    /// Create a scheduler; nothing is fetched until the first tick.
    pub fn new(
        config: SchedulerConfig,
        source: Arc<dyn QuoteSource>,
        probe: Arc<dyn TemperatureProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            probe,
            clock,
            current: None,
        }
    }

    /// Snapshot rendered by the last completed tick.
    pub fn current(&self) -> Option<&DisplaySnapshot> {
        self.current.as_ref()
    }

    /// Refresh immediately, then once per message on `ticks`, until `shutdown` fires or
    /// `ticks` disconnects.
    pub fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        ticks: &Receiver<Instant>,
        shutdown: &Receiver<()>,
    ) {
        info!("Tracking {}", self.config.symbols.join(", "));
        loop {
            if !self.tick(renderer, shutdown) {
                break;
            }
            select! {
                recv(shutdown) -> _ => break,
                recv(ticks) -> msg => if msg.is_err() {
                    break;
                },
            }
        }
        info!("Refresh loop stopping...");
    }

    /// Run one refresh and hand the result to `renderer`.
    ///
    /// Returns `false` if the refresh was aborted by `shutdown`.
    pub fn tick(&mut self, renderer: &mut dyn Renderer, shutdown: &Receiver<()>) -> bool {
        match self.refresh(shutdown) {
            Some(snapshot) => {
                renderer.render(&snapshot);
                self.current = Some(snapshot);
                true
            }
            None => false,
        }
    }

    /// Build a fresh snapshot, or `None` if `shutdown` fired first.
    pub fn refresh(&self, shutdown: &Receiver<()>) -> Option<DisplaySnapshot> {
        let started = Instant::now();
        let now = self.clock.now();
        let symbols = &self.config.symbols;
        debug!("Refresh started at {}", now);

        let (tx, rx) = unbounded::<Reading>();
        for (index, symbol) in symbols.iter().enumerate() {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let symbol = symbol.clone();
            thread::spawn(move || {
                let quote = source.fetch(&symbol, now);
                let _ = tx.send(Reading::Quote(index, quote));
            });
        }
        {
            let probe = Arc::clone(&self.probe);
            thread::spawn(move || {
                let _ = tx.send(Reading::Temperature(probe.read_temperature()));
            });
        }

        let deadline = after(self.config.fetch_timeout);
        let mut quotes: Vec<Option<Quote>> = vec![None; symbols.len()];
        let mut temperature = None;
        let mut outstanding = symbols.len() + 1;

        while outstanding > 0 {
            select! {
                recv(shutdown) -> _ => {
                    info!("Refresh aborted by shutdown");
                    return None;
                },
                recv(rx) -> msg => match msg {
                    Ok(Reading::Quote(index, quote)) => {
                        quotes[index] = Some(quote);
                        outstanding -= 1;
                    }
                    Ok(Reading::Temperature(celsius)) => {
                        temperature = celsius;
                        outstanding -= 1;
                    }
                    // Every worker is gone; missing answers are failures.
                    Err(_) => break,
                },
                recv(deadline) -> _ => {
                    warn!(
                        "{} reading(s) did not finish within {:?}",
                        outstanding, self.config.fetch_timeout
                    );
                    break;
                },
            }
        }

        let quotes = quotes
            .into_iter()
            .zip(symbols)
            .map(|(quote, symbol)| quote.unwrap_or_else(|| Quote::unavailable(symbol, now)))
            .collect();

        let snapshot = DisplaySnapshot {
            quotes,
            ip_address: self.config.ip_address,
            temperature_celsius: temperature,
            market_open: market::is_open(&now),
            as_of: now,
        };
        debug!("Refresh finished in {:?}", started.elapsed());
        Some(snapshot)
    }
}

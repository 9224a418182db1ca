//! Discovery of the device's outbound IP address.
//!
//! Runs once at startup. Each attempt connects a UDP socket to a well-known external
//! address, which sends nothing but makes the OS pick the outbound interface, and reads
//! the locally bound address back. Attempts are retried per [`RetryPolicy`]; running out
//! of attempts is fatal for the caller.
use std::io;
use std::net::{IpAddr, UdpSocket};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{Receiver, TryRecvError};
use log::{info, warn};
use ticker_common::retry::{RetryError, RetryPolicy};
use ticker_common::{Clock, Result, TickerError};

/// Number of discovery attempts before giving up.
pub const RETRIES: u32 = 10;
/// Delay between two discovery attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(4);

/// Default retry policy for address discovery.
pub const DEFAULT_POLICY: RetryPolicy = RetryPolicy::fixed(RETRIES, RETRY_DELAY);

/// One attempt at reading the local outbound address.
pub trait AddressProbe {
    /// Returns the local address of the outbound interface.
    fn local_address(&self) -> io::Result<IpAddr>;
}

/// Probe that connects a UDP socket to `target` and reads its local address.
pub struct UdpProbe {
    target: String,
}

impl UdpProbe {
    /// Create a probe towards `target`, e.g. `8.8.8.8:80`.
    pub fn new(target: &str) -> Self {
        Self {
            target: String::from(target),
        }
    }
}

impl AddressProbe for UdpProbe {
    fn local_address(&self) -> io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(&self.target)?;
        let ip = socket.local_addr()?.ip();
        if ip.is_unspecified() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no outbound interface",
            ));
        }
        Ok(ip)
    }
}

/// Returns `true` once `shutdown` has fired or its sender is gone.
pub fn shutdown_requested(shutdown: &Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

/// System clock whose sleeps end as soon as `shutdown` disconnects.
///
/// Shutdown is signalled by dropping the sender, so waking up here does not consume
/// the signal for later observers.
pub struct InterruptibleClock<'a> {
    shutdown: &'a Receiver<()>,
}

impl<'a> InterruptibleClock<'a> {
    /// Create a clock watching `shutdown`.
    pub fn new(shutdown: &'a Receiver<()>) -> Self {
        Self { shutdown }
    }
}

impl Clock for InterruptibleClock<'_> {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        let _ = self.shutdown.recv_timeout(duration);
    }
}

/// Discover the outbound address, retrying with `policy` until `shutdown` fires.
///
/// Individual attempt errors are logged and swallowed; only exhaustion is reported.
pub fn resolve_address(
    probe: &dyn AddressProbe,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    shutdown: &Receiver<()>,
) -> Result<IpAddr> {
    let stop = || shutdown_requested(shutdown);
    let address = policy.run_until(clock, stop, |attempt| {
        probe.local_address().map_err(|e| {
            warn!(
                "Address attempt {}/{} failed: {}",
                attempt, policy.max_attempts, e
            );
            e
        })
    });

    match address {
        Ok(ip) => {
            info!("Device address: {}", ip);
            Ok(ip)
        }
        Err(RetryError::Stopped) => Err(TickerError::Interrupted),
        Err(RetryError::Exhausted(_)) => Err(TickerError::AddressUnavailable {
            attempts: policy.max_attempts.max(1),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossbeam_channel::{Sender, bounded};
    use std::cell::Cell;
    use std::time::Instant;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeClock {
        slept: Mutex<Vec<Duration>>,
    }

    impl Clock for FakeClock {
        fn now(&self) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 1, 17)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap()
        }

        fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    /// Fails `failures` times, then answers with a fixed address.
    struct FlakyProbe {
        failures: u32,
        calls: Cell<u32>,
    }

    impl AddressProbe for FlakyProbe {
        fn local_address(&self) -> io::Result<IpAddr> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call <= self.failures {
                Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "down"))
            } else {
                Ok(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
            }
        }
    }

    #[test]
    fn test_resolves_after_transient_failures() {
        let clock = FakeClock::default();
        let (_shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let probe = FlakyProbe {
            failures: 3,
            calls: Cell::new(0),
        };
        let ip = resolve_address(&probe, &DEFAULT_POLICY, &clock, &shutdown_rx).unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(probe.calls.get(), 4);
        assert_eq!(*clock.slept.lock().unwrap(), vec![RETRY_DELAY; 3]);
    }

    #[test]
    fn test_exhausted_retries_are_fatal() {
        let clock = FakeClock::default();
        let (_shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let probe = FlakyProbe {
            failures: u32::MAX,
            calls: Cell::new(0),
        };
        let err = resolve_address(&probe, &DEFAULT_POLICY, &clock, &shutdown_rx).unwrap_err();
        assert!(matches!(err, TickerError::AddressUnavailable { attempts: RETRIES }));
        assert_eq!(probe.calls.get(), RETRIES);
        assert_eq!(clock.slept.lock().unwrap().len(), (RETRIES - 1) as usize);
    }

    #[test]
    fn test_unresolvable_target_is_an_error() {
        let probe = UdpProbe::new("not-an-address");
        assert!(probe.local_address().is_err());
    }

    /// Drops the shutdown sender on its first sleep.
    struct QuittingClock {
        shutdown_tx: Mutex<Option<Sender<()>>>,
    }

    impl Clock for QuittingClock {
        fn now(&self) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 1, 17)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap()
        }

        fn sleep(&self, _duration: Duration) {
            self.shutdown_tx.lock().unwrap().take();
        }
    }

    #[test]
    fn test_shutdown_between_attempts_interrupts() {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let clock = QuittingClock {
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        };
        let probe = FlakyProbe {
            failures: u32::MAX,
            calls: Cell::new(0),
        };
        let err = resolve_address(&probe, &DEFAULT_POLICY, &clock, &shutdown_rx).unwrap_err();
        assert!(matches!(err, TickerError::Interrupted));
        assert_eq!(probe.calls.get(), 1);
    }

    #[test]
    fn test_shutdown_before_start_skips_probe() {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        drop(shutdown_tx);
        let clock = FakeClock::default();
        let probe = FlakyProbe {
            failures: 0,
            calls: Cell::new(0),
        };
        let err = resolve_address(&probe, &DEFAULT_POLICY, &clock, &shutdown_rx).unwrap_err();
        assert!(matches!(err, TickerError::Interrupted));
        assert_eq!(probe.calls.get(), 0);
    }

    #[test]
    fn test_interruptible_sleep_wakes_on_shutdown() {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let clock = InterruptibleClock::new(&shutdown_rx);

        let started = Instant::now();
        clock.sleep(Duration::from_millis(50));
        assert!(started.elapsed() >= Duration::from_millis(50));

        drop(shutdown_tx);
        let started = Instant::now();
        clock.sleep(RETRY_DELAY);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(shutdown_requested(&shutdown_rx));
    }
}

//! Device temperature probe.
//!
//! Temperature is decorative telemetry: any failure (missing binary, non-zero exit,
//! unexpected output) is logged and reported as "absent".
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

/// Reasons a temperature read can fail. Never leaves this module.
#[derive(Error, Debug)]
pub enum SensorError {
    /// The sensor command line is empty.
    #[error("empty sensor command")]
    EmptyCommand,

    /// The command could not be started.
    #[error("failed to run sensor command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The command exited unsuccessfully.
    #[error("sensor command exited with {0}")]
    Exit(std::process::ExitStatus),

    /// The command did not finish in time and was killed.
    #[error("sensor command timed out after {0:?}")]
    Timeout(Duration),

    /// The output did not look like `temp=NN.N'C`.
    #[error("unexpected sensor output: {0:?}")]
    Parse(String),
}

/// Source of the device temperature.
pub trait TemperatureProbe: Send + Sync {
    /// Current temperature in degrees Celsius, or `None` if it cannot be read.
    fn read_temperature(&self) -> Option<f64>;
}

/// Interval between two checks of a running sensor command.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Probe running an external command such as `vcgencmd measure_temp`.
///
/// A command still running after `timeout` is killed and reaped.
pub struct CommandProbe {
    command_line: String,
    timeout: Duration,
}

impl CommandProbe {
    /// Create a probe for a whitespace separated command line.
    pub fn new(command_line: &str, timeout: Duration) -> Self {
        Self {
            command_line: String::from(command_line),
            timeout,
        }
    }

    fn run(&self) -> Result<f64, SensorError> {
        let mut parts = self.command_line.split_whitespace();
        let program = parts.next().ok_or(SensorError::EmptyCommand)?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let started = Instant::now();
        while child.try_wait()?.is_none() {
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                child.wait()?;
                return Err(SensorError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(SensorError::Exit(output.status));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        debug!("Sensor output: {}", text.trim());
        parse_temperature(&text)
    }
}

impl TemperatureProbe for CommandProbe {
    fn read_temperature(&self) -> Option<f64> {
        match self.run() {
            Ok(celsius) => Some(celsius),
            Err(e) => {
                warn!("Temperature unavailable: {}", e);
                None
            }
        }
    }
}

/// Extract the value between `=` and the next `'` in output like `temp=48.3'C`.
pub fn parse_temperature(output: &str) -> Result<f64, SensorError> {
    let parse_error = || SensorError::Parse(output.trim().to_string());
    let (_, rest) = output.split_once('=').ok_or_else(parse_error)?;
    let (value, _) = rest.split_once('\'').ok_or_else(parse_error)?;
    value.trim().parse::<f64>().map_err(|_| parse_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_parse_vcgencmd_output() {
        assert_eq!(parse_temperature("temp=48.3'C\n").unwrap(), 48.3);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_temperature("").is_err());
        assert!(parse_temperature("temp 48.3 C").is_err());
        assert!(parse_temperature("temp=48.3C").is_err());
        assert!(parse_temperature("temp=hot'C").is_err());
    }

    #[test]
    fn test_missing_binary_is_absent() {
        let probe = CommandProbe::new("definitely-not-a-sensor-binary-42", TIMEOUT);
        assert_eq!(probe.read_temperature(), None);
    }

    #[test]
    fn test_empty_command_is_absent() {
        assert_eq!(CommandProbe::new("   ", TIMEOUT).read_temperature(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_parsed() {
        let probe = CommandProbe::new("echo temp=51.0'C", TIMEOUT);
        assert_eq!(probe.read_temperature(), Some(51.0));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_is_absent() {
        assert_eq!(CommandProbe::new("false", TIMEOUT).read_temperature(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_command_is_killed() {
        let probe = CommandProbe::new("sleep 30", Duration::from_millis(100));
        let started = Instant::now();
        assert!(matches!(probe.run(), Err(SensorError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

use std::fs;
use std::io;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use super::*;

const KEEPALIVE: &[u8] = b"\0";
const MAGIC_CLOSE: &[u8] = b"V";

/// Keep-alive side of a reboot watchdog.
///
/// The host reboots once the watchdog goes unfed for longer than its own
/// timeout. The reconciler feeds it on every pass over a healthy machine and
/// stops for as long as remediation is in progress.
pub trait Watchdog: Send + Sync + fmt::Debug {
    /// Reset the watchdog timer.
    fn feed(&self);

    /// When the watchdog was last fed, or when it was created if never fed.
    fn last_food_time(&self) -> Timestamp;
}

/// In-memory watchdog that only tracks when it was fed
#[derive(Debug)]
pub struct SoftWatchdog {
    last_fed: Mutex<Timestamp>,
}

impl SoftWatchdog {
    pub fn new() -> Self {
        Self::fed_at(Timestamp::now())
    }

    pub fn fed_at(ts: Timestamp) -> Self {
        Self {
            last_fed: Mutex::new(ts),
        }
    }

    /// Concurrent feeders race on the clock, keep the latest time any of them saw
    fn record(&self, fed: Timestamp) {
        let mut last_fed = self.last_fed.lock().unwrap_or_else(PoisonError::into_inner);
        if fed > *last_fed {
            *last_fed = fed;
        }
    }
}

impl Default for SoftWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog for SoftWatchdog {
    fn feed(&self) {
        self.record(Timestamp::now());
    }

    fn last_food_time(&self) -> Timestamp {
        let last_fed = self.last_fed.lock().unwrap_or_else(PoisonError::into_inner);
        *last_fed
    }
}

/// Linux watchdog device such as `/dev/watchdog`
///
/// Opening the device arms it. Every feed writes a keep-alive byte; the
/// magic close character is written on drop so a clean shutdown of the
/// agent does not reboot the host.
#[derive(Debug)]
pub struct DeviceWatchdog {
    path: PathBuf,
    device: Mutex<fs::File>,
    fed: SoftWatchdog,
}

impl DeviceWatchdog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = fs::OpenOptions::new().write(true).open(&path)?;
        tracing::info!(path = %path.display(), "Opened watchdog device");
        Ok(Self {
            path,
            device: Mutex::new(device),
            fed: SoftWatchdog::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Watchdog for DeviceWatchdog {
    fn feed(&self) {
        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        match device.write_all(KEEPALIVE).and_then(|()| device.flush()) {
            Ok(()) => self.fed.feed(),
            Err(err) => {
                tracing::error!(
                    path = %self.path.display(),
                    %err,
                    "Failed to feed watchdog device"
                );
            }
        }
    }

    fn last_food_time(&self) -> Timestamp {
        self.fed.last_food_time()
    }
}

impl Drop for DeviceWatchdog {
    fn drop(&mut self) {
        let device = self
            .device
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = device.write_all(MAGIC_CLOSE) {
            tracing::warn!(path = %self.path.display(), %err, "Failed to disarm watchdog device");
        }
    }
}

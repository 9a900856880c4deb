//! Caller-owned devices and submission queues
//!
//! The core never owns device lifetime; a [`Device`] is created by the
//! caller and borrowed for the duration of each call. A [`Queue`] binds a
//! device to the submission machinery and tracks in-flight events so a
//! caller can drain everything with one [`Queue::wait`].

use crate::error::Result;
use crate::event::Event;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

static NEXT_DEVICE_UID: AtomicU64 = AtomicU64::new(1);

/// Opaque reference to a compute device.
///
/// Carries the vendor/platform metadata strings the identifier registry
/// matches against. The backend an identification resolves to is stable
/// for the device's lifetime.
#[derive(Debug, Clone)]
pub struct Device {
    uid: u64,
    vendor: String,
    platform: String,
    index: usize,
}

impl Device {
    fn new(vendor: impl Into<String>, platform: impl Into<String>, index: usize) -> Self {
        Self {
            uid: NEXT_DEVICE_UID.fetch_add(1, Ordering::Relaxed),
            vendor: vendor.into(),
            platform: platform.into(),
            index,
        }
    }

    /// The host CPU device.
    pub fn cpu() -> Self {
        Self::new("cpu", "host", 0)
    }

    /// A CUDA device by ordinal.
    #[cfg(feature = "cuda")]
    pub fn cuda(index: usize) -> Self {
        Self::new("nvidia corporation", "cuda", index)
    }

    /// A device described only by its platform metadata.
    ///
    /// This is the seam the surrounding platform glue uses to hand
    /// devices to the core; the registry treats unrecognized metadata as
    /// unsupported rather than failing during identification.
    pub fn from_metadata(
        vendor: impl Into<String>,
        platform: impl Into<String>,
        index: usize,
    ) -> Self {
        Self::new(vendor, platform, index)
    }

    /// Process-unique id, used as the identification memo key.
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Vendor metadata string.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Platform metadata string.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Ordinal among devices of the same platform.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Submission queue bound to one device.
///
/// Submitted work executes asynchronously; nothing performed by the core
/// blocks the calling thread beyond lookup and argument translation.
/// Waiting is always the caller's explicit choice.
#[derive(Debug)]
pub struct Queue {
    device: Device,
    in_flight: Mutex<Vec<Event>>,
}

impl Queue {
    /// Create a queue on a device.
    pub fn new(device: &Device) -> Self {
        Self {
            device: device.clone(),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// The device this queue submits to.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Track a newly submitted event, pruning completed ones.
    pub(crate) fn record(&self, ev: &Event) {
        let mut pending = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        pending.retain(|e| !e.is_complete());
        pending.push(ev.clone());
    }

    /// Wait for everything submitted on this queue so far.
    ///
    /// Returns the first deferred failure encountered, if any; remaining
    /// events are still drained so the queue ends quiescent.
    pub fn wait(&self) -> Result<()> {
        let pending = {
            let mut guard = self
                .in_flight
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        let mut first_err = None;
        for ev in pending {
            if let Err(e) = ev.wait() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_uids_unique() {
        let a = Device::cpu();
        let b = Device::cpu();
        assert_ne!(a.uid(), b.uid());
        // clones alias the same device
        assert_eq!(a.uid(), a.clone().uid());
    }

    #[test]
    fn test_queue_wait_empty() {
        let device = Device::cpu();
        let queue = Queue::new(&device);
        assert!(queue.wait().is_ok());
    }
}

//! Test and helper mocks for aquarium_core

use aquarium_traits::{ContentStore, NoiseSource};
use std::sync::{Arc, Mutex};

/// Noise source that always returns the same offset (clamped into the
/// requested range) and never reports a leak.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise {
    offset: f64,
    leak: bool,
}

impl ConstantNoise {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            leak: false,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0)
    }

    /// Same offset, but every leak draw succeeds.
    pub fn leaking(offset: f64) -> Self {
        Self { offset, leak: true }
    }
}

impl NoiseSource for ConstantNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.offset.clamp(low.min(high), high.max(low))
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.leak
    }
}

/// A content store that remembers every upsert; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    pub writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingStore {
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl ContentStore for RecordingStore {
    fn upsert(
        &mut self,
        path: &str,
        content: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut w) = self.writes.lock() {
            w.push((path.to_string(), content.to_string()));
        }
        Ok(())
    }
}

/// A content store whose every upsert fails, like an unreachable remote.
pub struct FailingStore;

impl ContentStore for FailingStore {
    fn upsert(
        &mut self,
        _path: &str,
        _content: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("remote unavailable")))
    }
}

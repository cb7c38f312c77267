pub mod clock;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-clock"))]
pub use clock::test_clock;

/// Source of random draws for the simulator.
pub trait NoiseSource {
    /// Uniform draw from the half-open range `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
    /// Returns true with probability `p` (clamped to [0, 1]).
    fn chance(&mut self, p: f64) -> bool;
}

/// Remote document store that supports create-or-replace at a fixed path.
pub trait ContentStore {
    fn upsert(
        &mut self,
        path: &str,
        content: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

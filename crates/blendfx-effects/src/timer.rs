//! Duration tracking shared by every effect.

/// Elapsed time against an optional duration.
///
/// A timer without a duration never expires; such effects run until they are
/// stopped explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectTimer {
    duration: Option<f32>,
    elapsed: f32,
}

impl EffectTimer {
    /// A timer that expires after `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            duration: Some(duration),
            elapsed: 0.0,
        }
    }

    /// A timer that never expires.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Returns `true` once expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_expired()
    }

    /// Returns `true` once elapsed time has reached the duration.
    pub fn is_expired(&self) -> bool {
        self.duration.is_some_and(|d| self.elapsed >= d)
    }

    /// Seconds accumulated so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Configured duration, if any.
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Change the duration without touching elapsed time.
    pub fn set_duration(&mut self, duration: Option<f32>) {
        self.duration = duration;
    }

    /// Seconds left before expiry, never negative.
    pub fn remaining(&self) -> Option<f32> {
        self.duration.map(|d| (d - self.elapsed).max(0.0))
    }

    /// Fraction of the duration elapsed, clamped to `[0.0, 1.0]`.
    pub fn progress(&self) -> Option<f32> {
        self.duration.map(|d| {
            if d <= 0.0 {
                1.0
            } else {
                (self.elapsed / d).clamp(0.0, 1.0)
            }
        })
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

//! Cooperative timers and tweens
//!
//! All timed effects go through a registry of named handles so a reset or
//! revive can cancel everything in one call. Replaces the untracked
//! fire-and-forget callbacks this design grew out of: every timer here has
//! an owner and can be cancelled before it mutates fresh state.

use serde::{Deserialize, Serialize};

/// Identity of a timed effect. Setting a key that is already running
/// cancels and replaces it; expiries never accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKey {
    Invulnerable,
    Shield,
    Ghost,
    Slow,
    ShootCooldown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TimerEntry {
    key: TimerKey,
    remaining: f32,
}

/// Registry of one-shot countdown timers, resolved from the tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    entries: Vec<TimerEntry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a timer. Cancel-and-replace: an existing entry
    /// for the same key is dropped, not extended.
    pub fn set(&mut self, key: TimerKey, duration: f32) {
        self.cancel(key);
        self.entries.push(TimerEntry {
            key,
            remaining: duration,
        });
    }

    /// Cancel a timer. Returns whether it was running.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    /// Cancel everything (run reset / revive).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_active(&self, key: TimerKey) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn remaining(&self, key: TimerKey) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.remaining)
    }

    /// Advance all timers; invokes `on_expire` for each key that ran out
    /// this tick, then removes it.
    pub fn tick(&mut self, dt: f32, mut on_expire: impl FnMut(TimerKey)) {
        for entry in &mut self.entries {
            entry.remaining -= dt;
        }
        // Drain expired entries in insertion order
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].remaining <= 0.0 {
                let entry = self.entries.remove(i);
                on_expire(entry.key);
            } else {
                i += 1;
            }
        }
    }
}

/// Interpolation shape for a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    /// Decelerating, 1 - (1-t)^3
    OutCubic,
    /// Half sine wave: 0 at both ends, peak at the midpoint
    Arc,
}

impl Ease {
    fn apply(self, t: f32) -> f32 {
        match self {
            Ease::Linear => t,
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
            Ease::Arc => (t * std::f32::consts::PI).sin(),
        }
    }
}

/// A duration-boxed value interpolation, advanced from the tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub ease: Ease,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            ease,
            elapsed: 0.0,
        }
    }

    /// Advance and return the current value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.from + (self.to - self.from) * self.ease.apply(t)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing() {
        let mut timers = Timers::new();
        timers.set(TimerKey::Ghost, 5.0);
        timers.set(TimerKey::Ghost, 1.0);

        // Old 5s handle must be gone; only the 1s replacement remains
        assert_eq!(timers.remaining(TimerKey::Ghost), Some(1.0));

        let mut expired = Vec::new();
        timers.tick(1.5, |k| expired.push(k));
        assert_eq!(expired, vec![TimerKey::Ghost]);
        assert!(!timers.is_active(TimerKey::Ghost));
    }

    #[test]
    fn test_independent_keys() {
        let mut timers = Timers::new();
        timers.set(TimerKey::Invulnerable, 2.0);
        timers.set(TimerKey::Ghost, 5.0);

        let mut expired = Vec::new();
        timers.tick(3.0, |k| expired.push(k));
        assert_eq!(expired, vec![TimerKey::Invulnerable]);
        assert!(timers.is_active(TimerKey::Ghost));
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        timers.set(TimerKey::Shield, 10.0);
        assert!(timers.cancel(TimerKey::Shield));
        assert!(!timers.cancel(TimerKey::Shield));

        let mut expired = Vec::new();
        timers.tick(20.0, |k| expired.push(k));
        assert!(expired.is_empty());
    }

    #[test]
    fn test_tween_out_cubic_endpoints() {
        let mut tween = Tween::new(0.0, 2.0, 0.12, Ease::OutCubic);
        assert_eq!(tween.value(), 0.0);
        tween.tick(0.06);
        // Ease-out: past the halfway value before half the duration
        assert!(tween.value() > 1.0);
        tween.tick(0.06);
        assert!(tween.finished());
        assert!((tween.value() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tween_arc_returns_to_start() {
        let mut tween = Tween::new(0.0, 1.5, 0.55, Ease::Arc);
        tween.tick(0.275);
        assert!((tween.value() - 1.5).abs() < 0.01);
        tween.tick(0.275);
        assert!(tween.value().abs() < 0.01);
        assert!(tween.finished());
    }
}

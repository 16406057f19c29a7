//! Frame-driven linear position animation.

use std::time::Duration;
use tokio::time::Instant;

use crate::spatial::WorldPosition;

#[derive(Debug, Clone, Copy)]
struct Animation {
    start: WorldPosition,
    end: WorldPosition,
    started_at: Instant,
    duration: Duration,
}

impl Animation {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }
}

/// Moves one tracked object from its current position to a target over a
/// wall-clock duration. The owner calls [`PositionAnimator::tick`] once per
/// frame and applies the returned position.
///
/// Starting a new animation while one is running replaces it.
#[derive(Debug, Default)]
pub struct PositionAnimator {
    active: Option<Animation>,
}

impl PositionAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a move from `start` to `end`. Without a start position (object
    /// not attached to the Scene yet) nothing is scheduled.
    pub fn animate_to(
        &mut self,
        start: Option<WorldPosition>,
        end: WorldPosition,
        duration: Duration,
        now: Instant,
    ) -> bool {
        let Some(start) = start else {
            tracing::warn!("animate_to without a current position, skipping");
            return false;
        };
        if self.active.is_some() {
            tracing::trace!("replacing in-flight animation");
        }
        self.active = Some(Animation {
            start,
            end,
            started_at: now,
            duration,
        });
        true
    }

    /// Advance to `now`. Returns the position to apply, or `None` when idle.
    /// The animation finishes on the tick where progress reaches 1.
    pub fn tick(&mut self, now: Instant) -> Option<WorldPosition> {
        let animation = self.active?;
        let t = animation.progress(now);
        if t >= 1.0 {
            self.active = None;
            return Some(animation.end);
        }
        Some(animation.start.lerp(&animation.end, t))
    }

    /// Drop the pending animation. No-op when idle.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<WorldPosition> {
        self.active.map(|animation| animation.end)
    }
}

//! Buddy icon animation state for a tab.
//!
//! The animator owns the icon and the index of the frame on display. It does
//! not talk to the scheduler itself: the engine arms a timer with the delay
//! returned by [`IconAnimator::current_delay`] or [`IconAnimator::tick`] and
//! stores the handle here so stale wakeups can be told apart.

use crate::model::BuddyIcon;
use crate::scheduler::TaskId;
use std::time::Duration;

/// Display size settings for buddy icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSettings {
    /// Requested display size.
    pub size: u32,
    /// Smallest allowed display size.
    pub min: u32,
    /// Largest allowed display size.
    pub max: u32,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            size: 64,
            min: 32,
            max: 96,
        }
    }
}

/// Animation cursor over a buddy icon.
#[derive(Debug, Clone)]
pub struct IconAnimator {
    icon: BuddyIcon,
    settings: IconSettings,
    frame: usize,
    timer: Option<TaskId>,
    redraws: u64,
}

impl IconAnimator {
    /// Wrap `icon`, showing its first frame.
    pub fn new(icon: BuddyIcon, settings: IconSettings) -> Self {
        Self {
            icon,
            settings,
            frame: 0,
            timer: None,
            redraws: 0,
        }
    }

    /// The icon being shown.
    pub fn icon(&self) -> &BuddyIcon {
        &self.icon
    }

    /// Whether the icon has more than one frame.
    pub fn can_animate(&self) -> bool {
        self.icon.is_animated()
    }

    /// Index of the frame on display.
    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// Scaled display size of the icon.
    pub fn display_size(&self) -> (u32, u32) {
        self.icon
            .scaled_size(self.settings.size, self.settings.min, self.settings.max)
    }

    /// How long the current frame stays up. `None` ends the animation.
    pub fn current_delay(&self) -> Option<Duration> {
        self.icon.frames.get(self.frame).and_then(|f| f.delay())
    }

    /// Whether a frame timer is armed.
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Handle of the armed frame timer.
    pub fn timer(&self) -> Option<TaskId> {
        self.timer
    }

    /// Record the armed frame timer.
    pub fn arm(&mut self, task: TaskId) {
        self.timer = Some(task);
    }

    /// Forget the frame timer, returning it for cancellation.
    pub fn disarm(&mut self) -> Option<TaskId> {
        self.timer.take()
    }

    /// Number of frame redraws so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Advance to the next frame and count one redraw.
    ///
    /// Returns the new frame's delay, or `None` if the animation has ended.
    pub fn tick(&mut self) -> Option<Duration> {
        if !self.can_animate() {
            return None;
        }
        self.frame = (self.frame + 1) % self.icon.frames.len();
        self.redraws += 1;
        self.current_delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IconFrame;

    #[test]
    fn still_icon_cannot_animate() {
        let mut animator = IconAnimator::new(BuddyIcon::still(48, 48), IconSettings::default());
        assert!(!animator.can_animate());
        assert_eq!(animator.tick(), None);
        assert_eq!(animator.redraws(), 0);
    }

    #[test]
    fn tick_cycles_frames_and_counts_redraws() {
        let mut animator =
            IconAnimator::new(BuddyIcon::animated(48, 48, 3, 200), IconSettings::default());
        assert_eq!(animator.tick(), Some(Duration::from_millis(200)));
        assert_eq!(animator.tick(), Some(Duration::from_millis(200)));
        assert_eq!(animator.tick(), Some(Duration::from_millis(200)));
        assert_eq!(animator.frame_index(), 0, "Wrapped back to the first frame");
        assert_eq!(animator.redraws(), 3);
    }

    #[test]
    fn frame_without_delay_ends_animation() {
        let icon = BuddyIcon {
            width: 48,
            height: 48,
            frames: vec![
                IconFrame {
                    delay_ms: Some(150),
                },
                IconFrame { delay_ms: None },
            ],
        };
        let mut animator = IconAnimator::new(icon, IconSettings::default());
        assert_eq!(animator.current_delay(), Some(Duration::from_millis(150)));
        assert_eq!(animator.tick(), None);
    }

    #[test]
    fn display_size_respects_bounds() {
        let settings = IconSettings {
            size: 200,
            min: 32,
            max: 96,
        };
        let animator = IconAnimator::new(BuddyIcon::still(100, 50), settings);
        assert_eq!(animator.display_size(), (96, 48));
    }

    #[test]
    fn arm_and_disarm_track_timer() {
        let mut sched = crate::scheduler::Scheduler::new();
        let task = sched.add_idle(crate::scheduler::Wakeup::IconFrame(
            crate::model::TabId::from_raw(1),
        ));
        let mut animator =
            IconAnimator::new(BuddyIcon::animated(48, 48, 2, 100), IconSettings::default());
        animator.arm(task);
        assert!(animator.is_running());
        assert_eq!(animator.disarm(), Some(task));
        assert!(!animator.is_running());
    }
}

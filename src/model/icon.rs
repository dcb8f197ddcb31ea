//! Buddy icons and their display scaling.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum delay between animation frames. Malformed animations that declare
/// shorter (or zero) delays are slowed down to this.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(100);

/// One frame of a buddy icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconFrame {
    /// How long this frame stays up, in milliseconds. `None` means the frame
    /// is final and the animation stops on it.
    #[serde(default)]
    pub delay_ms: Option<u32>,
}

impl IconFrame {
    /// Delay before the next frame, floored at [`MIN_FRAME_DELAY`].
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms
            .map(|ms| Duration::from_millis(u64::from(ms)).max(MIN_FRAME_DELAY))
    }
}

/// A buddy icon: pixel dimensions plus one or more frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddyIcon {
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Frames in display order. Static images have exactly one.
    pub frames: Vec<IconFrame>,
}

impl BuddyIcon {
    /// A single-frame image.
    pub fn still(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: vec![IconFrame { delay_ms: None }],
        }
    }

    /// A looping animation with `frame_count` frames of `delay_ms` each.
    pub fn animated(width: u32, height: u32, frame_count: usize, delay_ms: u32) -> Self {
        Self {
            width,
            height,
            frames: vec![
                IconFrame {
                    delay_ms: Some(delay_ms)
                };
                frame_count
            ],
        }
    }

    /// Whether the icon is a true multi-frame animation.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Display dimensions when scaled to fit a `size`×`size` box, with `size`
    /// clamped into `[min, max]`. Aspect ratio is preserved and neither side
    /// collapses below one pixel.
    pub fn scaled_size(&self, size: u32, min: u32, max: u32) -> (u32, u32) {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let bound = size.clamp(lo, hi).max(1);
        let (w, h) = (self.width.max(1), self.height.max(1));
        if w >= h {
            let scaled_h = (u64::from(h) * u64::from(bound) / u64::from(w)).max(1);
            (bound, scaled_h as u32)
        } else {
            let scaled_w = (u64::from(w) * u64::from(bound) / u64::from(h)).max(1);
            (scaled_w as u32, bound)
        }
    }
}

//! Screen geometry: window rectangles and tab-strip hit testing.
//!
//! Tabs share the strip along the top edge of a window in equal slices.
//! All coordinates are screen pixels.

use serde::{Deserialize, Serialize};

/// Height of the tab strip along the top edge of every window.
pub const TAB_STRIP_HEIGHT: u32 = 24;

/// A screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl Point {
    /// Build a point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle. Contains `[x, x+width) × [y, y+height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Build a rectangle.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of half-size `radius` centred on `center` (the drag deadzone).
    pub fn around(center: Point, radius: u32) -> Self {
        let r = i32::try_from(radius).unwrap_or(i32::MAX / 2);
        Self {
            x: center.x.saturating_sub(r),
            y: center.y.saturating_sub(r),
            width: radius.saturating_mul(2).saturating_add(1),
            height: radius.saturating_mul(2).saturating_add(1),
        }
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Whether `point` lies inside.
    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        px >= i64::from(self.x) && px < self.right() && py >= i64::from(self.y) && py < self.bottom()
    }

    /// The tab strip band of a window with this frame.
    pub fn tab_strip(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height.min(TAB_STRIP_HEIGHT))
    }

    /// Left edge of slot `index` when the strip is split into `count` slices.
    /// `index == count` yields the right edge.
    fn slot_edge(&self, index: usize, count: usize) -> i64 {
        if count == 0 {
            return i64::from(self.x);
        }
        i64::from(self.x) + i64::from(self.width) * index as i64 / count as i64
    }

    /// Label rectangles of `count` tabs laid out along the strip.
    pub fn tab_rects(&self, count: usize) -> Vec<Rect> {
        let strip = self.tab_strip();
        (0..count)
            .map(|i| {
                let left = strip.slot_edge(i, count);
                let right = strip.slot_edge(i + 1, count);
                Rect::new(
                    left as i32,
                    strip.y,
                    (right - left).max(0) as u32,
                    strip.height,
                )
            })
            .collect()
    }

    /// Index of the tab label under `point`, if any.
    pub fn tab_at(&self, count: usize, point: Point) -> Option<usize> {
        if count == 0 || !self.tab_strip().contains(point) {
            return None;
        }
        self.tab_rects(count)
            .iter()
            .position(|rect| rect.contains(point))
    }

    /// Insertion index for a tab dropped at `point` into a strip of `count`
    /// tabs: the number of tab centres strictly left of the pointer.
    pub fn insertion_index(&self, count: usize, point: Point) -> usize {
        let strip = self.tab_strip();
        let px = i64::from(point.x);
        (0..count)
            .filter(|&i| {
                let center = (strip.slot_edge(i, count) + strip.slot_edge(i + 1, count)) / 2;
                center < px
            })
            .count()
    }

    /// Where the insertion hint arrow points for slot `index`.
    pub fn insertion_hint(&self, count: usize, index: usize) -> Point {
        let strip = self.tab_strip();
        let x = strip.slot_edge(index.min(count), count.max(1));
        Point::new(x as i32, strip.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::new(100, 50, 300, 200)
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(9, 9)));
        assert!(!rect.contains(Point::new(10, 5)));
        assert!(!rect.contains(Point::new(5, -1)));
    }

    #[test]
    fn deadzone_is_centred_square() {
        let zone = Rect::around(Point::new(10, 10), 4);
        assert!(zone.contains(Point::new(6, 6)));
        assert!(zone.contains(Point::new(14, 14)));
        assert!(!zone.contains(Point::new(15, 10)));
        assert!(!zone.contains(Point::new(10, 5)));
    }

    #[test]
    fn tab_rects_split_strip_evenly() {
        let rects = window().tab_rects(3);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], Rect::new(100, 50, 100, TAB_STRIP_HEIGHT));
        assert_eq!(rects[2], Rect::new(300, 50, 100, TAB_STRIP_HEIGHT));
    }

    #[test]
    fn tab_at_finds_label_under_pointer() {
        assert_eq!(window().tab_at(3, Point::new(150, 60)), Some(0));
        assert_eq!(window().tab_at(3, Point::new(250, 60)), Some(1));
        assert_eq!(window().tab_at(3, Point::new(399, 60)), Some(2));
    }

    #[test]
    fn tab_at_ignores_window_body() {
        assert_eq!(window().tab_at(3, Point::new(150, 200)), None);
    }

    #[test]
    fn insertion_index_counts_centres_left_of_pointer() {
        // centres at 150, 250, 350
        assert_eq!(window().insertion_index(3, Point::new(120, 60)), 0);
        assert_eq!(window().insertion_index(3, Point::new(200, 60)), 1);
        assert_eq!(window().insertion_index(3, Point::new(390, 60)), 3);
    }

    #[test]
    fn insertion_index_in_empty_strip_is_zero() {
        assert_eq!(window().insertion_index(0, Point::new(390, 60)), 0);
    }

    #[test]
    fn insertion_hint_points_at_slot_edge() {
        assert_eq!(window().insertion_hint(3, 1), Point::new(200, 50));
        assert_eq!(window().insertion_hint(3, 3), Point::new(400, 50));
    }
}

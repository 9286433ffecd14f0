use gpui::{Bounds, Pixels, point, px};
use gpui_component::VirtualListScrollHandle;

/// Distance from the tail within which the list counts as "at the bottom".
const FOLLOW_THRESHOLD: Pixels = px(24.);
/// Scroll jitter below this is ignored.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// What the user did between two frames, as seen from scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollMotion {
    Idle,
    ContentResized,
    UserScrolledUp,
    UserScrolledDown,
}

fn classify_motion(
    previous_offset: Pixels,
    offset: Pixels,
    previous_max: Pixels,
    max: Pixels,
) -> ScrollMotion {
    let offset_delta = f32::from(offset) - f32::from(previous_offset);
    let max_delta = (f32::from(max) - f32::from(previous_max)).abs();

    if max_delta > SCROLL_DELTA_EPSILON {
        ScrollMotion::ContentResized
    } else if offset_delta > SCROLL_DELTA_EPSILON {
        // GPUI offsets grow towards zero when scrolling up.
        ScrollMotion::UserScrolledUp
    } else if offset_delta < -SCROLL_DELTA_EPSILON {
        ScrollMotion::UserScrolledDown
    } else {
        ScrollMotion::Idle
    }
}

/// GPUI uses negative Y offsets when scrolled down, so `offset + max` reaches 0 at the tail.
fn is_at_tail(offset: Pixels, max_offset: Pixels) -> bool {
    max_offset <= Pixels::ZERO || (offset + max_offset).abs() <= FOLLOW_THRESHOLD
}

/// Keeps the message list pinned to the newest message unless the user scrolled away.
pub struct ScrollManager {
    scroll_handle: VirtualListScrollHandle,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: Pixels,
    last_max_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: VirtualListScrollHandle::new(),
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.scroll_handle
    }

    /// Requests a jump to the tail on the next frame if the user is still following it.
    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.follow_bottom || is_at_tail(self.last_scroll_offset, self.last_max_offset) {
            self.pending_scroll_to_bottom = true;
        }
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = Pixels::ZERO;
        self.last_max_offset = Pixels::ZERO;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let motion = classify_motion(
            self.last_scroll_offset,
            offset,
            self.last_max_offset,
            max_offset,
        );
        let was_at_tail = is_at_tail(self.last_scroll_offset, self.last_max_offset);

        self.follow_bottom = match motion {
            _ if self.pending_scroll_to_bottom => true,
            ScrollMotion::ContentResized if was_at_tail => true,
            ScrollMotion::UserScrolledUp => false,
            ScrollMotion::UserScrolledDown if is_at_tail(offset, max_offset) => true,
            _ => self.follow_bottom,
        };

        self.last_scroll_offset = offset;
        self.last_max_offset = max_offset;
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            let max_offset = self.scroll_handle.max_offset().height;
            let current_x = self.scroll_handle.offset().x;
            let target_y = if max_offset > Pixels::ZERO {
                -max_offset
            } else {
                Pixels::ZERO
            };
            self.scroll_handle.set_offset(point(current_x, target_y));
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }

    pub fn bounds(&self) -> Bounds<Pixels> {
        self.scroll_handle.bounds()
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_threads_always_count_as_at_the_tail() {
        assert!(is_at_tail(Pixels::ZERO, Pixels::ZERO));
        assert!(is_at_tail(px(-10.), px(-5.)));
    }

    #[test]
    fn tail_detection_uses_the_follow_threshold() {
        assert!(is_at_tail(px(-500.), px(500.)));
        assert!(is_at_tail(px(-480.), px(500.)));
        assert!(!is_at_tail(px(-300.), px(500.)));
    }

    #[test]
    fn content_growth_is_not_mistaken_for_user_scrolling() {
        assert_eq!(
            classify_motion(px(-500.), px(-500.), px(500.), px(560.)),
            ScrollMotion::ContentResized
        );
        assert_eq!(
            classify_motion(px(-500.), px(-200.), px(500.), px(500.)),
            ScrollMotion::UserScrolledUp
        );
        assert_eq!(
            classify_motion(px(-200.), px(-490.), px(500.), px(500.)),
            ScrollMotion::UserScrolledDown
        );
        assert_eq!(
            classify_motion(px(-200.), px(-200.5), px(500.), px(500.)),
            ScrollMotion::Idle
        );
    }
}

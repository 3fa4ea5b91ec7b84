//! Common types for the RemoteFX codec implementation.
//!
//! This crate provides the shared geometry type used across the codec and
//! region crates:
//! - [`Rect`] - Wire-format rectangle with u16 position and dimensions

/// A screen-space rectangle as carried in RemoteFX region blocks.
///
/// Positions and dimensions live in the unsigned 16-bit domain of the wire
/// format. Edges are computed in u32 so rectangles touching the top of the
/// domain do not overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge (x + width, exclusive).
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// Get the bottom edge (y + height, exclusive).
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// Get the area of the rectangle.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// A rectangle with zero width or height covers nothing.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check whether this rectangle overlaps another (empty rects never do).
    pub const fn intersects(&self, other: &Rect) -> bool {
        (self.x as u32) < other.right()
            && (other.x as u32) < self.right()
            && (self.y as u32) < other.bottom()
            && (other.y as u32) < self.bottom()
    }

    /// Compute the overlap of two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Some(Rect::new(
            x1,
            y1,
            (x2 - x1 as u32) as u16,
            (y2 - y1 as u32) as u16,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.area(), 5000);
        assert!(!r.is_empty());
        assert!(Rect::new(10, 20, 0, 50).is_empty());
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        let c = Rect::new(10, 0, 10, 10);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c)); // touching edges do not overlap
        assert!(!a.intersects(&Rect::new(0, 0, 0, 10)));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection(&Rect::new(20, 20, 5, 5)), None);
    }

    #[test]
    fn test_no_overflow_at_domain_edge() {
        let r = Rect::new(u16::MAX, u16::MAX, u16::MAX, u16::MAX);
        assert_eq!(r.right(), 2 * u16::MAX as u32);
        assert_eq!(r.bottom(), 2 * u16::MAX as u32);
    }
}

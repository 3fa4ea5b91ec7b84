//! Banded region representation and the scanline union/intersect ops.
//!
//! Invariants maintained by every operation:
//! - Boxes are sorted by band (y1), then by x1 within a band.
//! - All boxes in a band share the same y1 and y2; band y-ranges do not
//!   overlap.
//! - No two boxes in a band touch or overlap on x.
//! - Two vertically adjacent bands never have identical x-spans (they
//!   would have been coalesced into one taller band).
//! - `extents` is the tight bounding box of all boxes (zeroed when empty).

use rfx_common::Rect;

/// A single region box, half-open on `x2` and `y2`.
///
/// Coordinates are signed 16-bit: region consumers track damage in screen
/// space, which fits comfortably, and signed math keeps clip arithmetic
/// simple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionBox {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

impl RegionBox {
    pub const fn new(x1: i16, y1: i16, x2: i16, y2: i16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn width(&self) -> i32 {
        self.x2 as i32 - self.x1 as i32
    }

    pub const fn height(&self) -> i32 {
        self.y2 as i32 - self.y1 as i32
    }

    pub const fn area(&self) -> u64 {
        (self.width() * self.height()) as u64
    }

    /// Strict overlap test: boxes that merely share an edge do not overlap.
    const fn overlaps(&self, other: &RegionBox) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    const fn encloses(&self, other: &RegionBox) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    fn from_rect(rect: &Rect) -> Self {
        Self {
            x1: clamp_coord(rect.x as u32),
            y1: clamp_coord(rect.y as u32),
            x2: clamp_coord(rect.right()),
            y2: clamp_coord(rect.bottom()),
        }
    }
}

/// Wire rects are u16 but region coordinates are signed; anything past the
/// signed ceiling is clamped rather than wrapped.
fn clamp_coord(v: u32) -> i16 {
    v.min(i16::MAX as u32) as i16
}

const EMPTY_BOX: RegionBox = RegionBox {
    x1: 0,
    y1: 0,
    x2: 0,
    y2: 0,
};

/// A set of non-overlapping rectangles organized into horizontal bands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    boxes: Vec<RegionBox>,
    extents: RegionBox,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RegionOp {
    Union,
    Intersect,
}

impl Region {
    /// The empty region.
    pub const fn new() -> Self {
        Self {
            boxes: Vec::new(),
            extents: EMPTY_BOX,
        }
    }

    /// A region covering exactly one rectangle (empty for degenerate rects).
    pub fn from_rect(rect: &Rect) -> Self {
        if rect.is_empty() {
            return Self::new();
        }
        let b = RegionBox::from_rect(rect);
        if b.x1 >= b.x2 || b.y1 >= b.y2 {
            // Collapsed entirely by the signed-domain clamp.
            return Self::new();
        }
        Self {
            boxes: vec![b],
            extents: b,
        }
    }

    pub fn boxes(&self) -> &[RegionBox] {
        &self.boxes
    }

    /// Tight bounding box of all boxes; zeroed for the empty region.
    pub const fn extents(&self) -> RegionBox {
        self.extents
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Total covered area (boxes never overlap, so a plain sum is exact).
    pub fn covered_area(&self) -> u64 {
        self.boxes.iter().map(|b| b.area()).sum()
    }

    /// Compute the union of two regions.
    pub fn union(&self, other: &Region) -> Region {
        // Trivial operands first, then single-box containment either way.
        if std::ptr::eq(self, other) || other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        if self.boxes.len() == 1 && self.extents.encloses(&other.extents) {
            return self.clone();
        }
        if other.boxes.len() == 1 && other.extents.encloses(&self.extents) {
            return other.clone();
        }

        let boxes = region_op(self, other, RegionOp::Union);
        let extents = RegionBox {
            x1: self.extents.x1.min(other.extents.x1),
            y1: self.extents.y1.min(other.extents.y1),
            x2: self.extents.x2.max(other.extents.x2),
            y2: self.extents.y2.max(other.extents.y2),
        };
        Region { boxes, extents }
    }

    /// Union of this region with a single rectangle.
    pub fn union_rect(&self, rect: &Rect) -> Region {
        self.union(&Region::from_rect(rect))
    }

    /// Compute the intersection of two regions.
    pub fn intersect(&self, other: &Region) -> Region {
        if self.is_empty() || other.is_empty() || !self.extents.overlaps(&other.extents) {
            return Region::new();
        }
        let boxes = region_op(self, other, RegionOp::Intersect);
        let extents = extents_of(&boxes);
        Region { boxes, extents }
    }
}

fn extents_of(boxes: &[RegionBox]) -> RegionBox {
    if boxes.is_empty() {
        return EMPTY_BOX;
    }
    // Bands are y-sorted, so y bounds come from the first and last box;
    // x bounds need the full scan.
    let mut e = RegionBox {
        x1: boxes[0].x1,
        y1: boxes[0].y1,
        x2: boxes[boxes.len() - 1].x2,
        y2: boxes[boxes.len() - 1].y2,
    };
    for b in boxes {
        e.x1 = e.x1.min(b.x1);
        e.x2 = e.x2.max(b.x2);
    }
    e
}

/// Index one past the last box sharing `boxes[start].y1`.
fn band_end(boxes: &[RegionBox], start: usize) -> usize {
    let y1 = boxes[start].y1;
    let mut end = start + 1;
    while end < boxes.len() && boxes[end].y1 == y1 {
        end += 1;
    }
    end
}

/// Emit a band of boxes from one region where the other has no coverage.
fn non_overlap_band(out: &mut Vec<RegionBox>, band: &[RegionBox], y1: i16, y2: i16) {
    for b in band {
        out.push(RegionBox::new(b.x1, y1, b.x2, y2));
    }
}

/// Append a span to the current union band, extending the previous span
/// when they touch or overlap.
fn union_push(out: &mut Vec<RegionBox>, x1: i16, x2: i16, y1: i16, y2: i16) {
    if let Some(last) = out.last_mut() {
        if last.y1 == y1 && last.y2 == y2 && last.x2 >= x1 {
            if last.x2 < x2 {
                last.x2 = x2;
            }
            return;
        }
    }
    out.push(RegionBox::new(x1, y1, x2, y2));
}

/// Union of two overlapping bands: walk both span lists left to right.
fn union_overlap_band(
    out: &mut Vec<RegionBox>,
    band1: &[RegionBox],
    band2: &[RegionBox],
    y1: i16,
    y2: i16,
) {
    let (mut i, mut j) = (0, 0);
    while i < band1.len() && j < band2.len() {
        if band1[i].x1 < band2[j].x1 {
            union_push(out, band1[i].x1, band1[i].x2, y1, y2);
            i += 1;
        } else {
            union_push(out, band2[j].x1, band2[j].x2, y1, y2);
            j += 1;
        }
    }
    while i < band1.len() {
        union_push(out, band1[i].x1, band1[i].x2, y1, y2);
        i += 1;
    }
    while j < band2.len() {
        union_push(out, band2[j].x1, band2[j].x2, y1, y2);
        j += 1;
    }
}

/// Intersection of two overlapping bands: pairwise x-span intersection,
/// advancing whichever span ends first.
fn intersect_overlap_band(
    out: &mut Vec<RegionBox>,
    band1: &[RegionBox],
    band2: &[RegionBox],
    y1: i16,
    y2: i16,
) {
    let (mut i, mut j) = (0, 0);
    while i < band1.len() && j < band2.len() {
        let x1 = band1[i].x1.max(band2[j].x1);
        let x2 = band1[i].x2.min(band2[j].x2);
        if x1 < x2 {
            out.push(RegionBox::new(x1, y1, x2, y2));
        }
        if band1[i].x2 == x2 {
            i += 1;
        }
        if band2[j].x2 == x2 {
            j += 1;
        }
    }
}

/// Try to merge the band starting at `cur_start` into the band starting at
/// `prev_start` when they are vertically adjacent with identical x-spans.
///
/// Returns the index the next call should use as its previous-band start.
fn coalesce_bands(boxes: &mut Vec<RegionBox>, prev_start: usize, cur_start: usize) -> usize {
    let prev_num = cur_start - prev_start;
    let total = boxes.len();

    let band_y1 = boxes[cur_start].y1;
    let mut cur_num = 0;
    while cur_start + cur_num < total && boxes[cur_start + cur_num].y1 == band_y1 {
        cur_num += 1;
    }

    let mut ret = cur_start;
    if cur_start + cur_num < total {
        // More than one band was appended since the last call; only the
        // first can merge with the previous band, and the next call's
        // previous band is the last one appended.
        let mut last = total - 1;
        while last > 0 && boxes[last - 1].y1 == boxes[last].y1 {
            last -= 1;
        }
        ret = last;
    }

    if cur_num == prev_num && cur_num != 0 && boxes[prev_start].y2 == boxes[cur_start].y1 {
        let spans_match = (0..cur_num).all(|k| {
            boxes[prev_start + k].x1 == boxes[cur_start + k].x1
                && boxes[prev_start + k].x2 == boxes[cur_start + k].x2
        });
        if spans_match {
            let y2 = boxes[cur_start].y2;
            for k in 0..cur_num {
                boxes[prev_start + k].y2 = y2;
            }
            boxes.drain(cur_start..cur_start + cur_num);
            if cur_start + cur_num == total {
                ret = prev_start;
            } else {
                ret -= cur_num;
            }
        }
    }
    ret
}

/// The scanline engine shared by union and intersect.
///
/// Walks both regions' bands top to bottom. Where only one region has
/// coverage, union emits that band as-is (intersect emits nothing); where
/// bands overlap vertically, the clipped band is handed to the per-op
/// overlap routine. After every band append, vertically adjacent bands
/// with identical spans are coalesced.
fn region_op(reg1: &Region, reg2: &Region, op: RegionOp) -> Vec<RegionBox> {
    let b1 = &reg1.boxes;
    let b2 = &reg2.boxes;
    let mut out: Vec<RegionBox> = Vec::with_capacity(b1.len().max(b2.len()) * 2);

    let mut i1 = 0;
    let mut i2 = 0;
    let mut ybot = reg1.extents.y1.min(reg2.extents.y1);
    let mut prev_band = 0;

    loop {
        let band1_end = band_end(b1, i1);
        let band2_end = band_end(b2, i2);
        let mut cur_band = out.len();

        // Handle the part of the earlier band that starts above the other.
        let ytop;
        if b1[i1].y1 < b2[i2].y1 {
            let top = b1[i1].y1.max(ybot);
            let bot = b1[i1].y2.min(b2[i2].y1);
            if top != bot && op == RegionOp::Union {
                non_overlap_band(&mut out, &b1[i1..band1_end], top, bot);
            }
            ytop = b2[i2].y1;
        } else if b2[i2].y1 < b1[i1].y1 {
            let top = b2[i2].y1.max(ybot);
            let bot = b2[i2].y2.min(b1[i1].y1);
            if top != bot && op == RegionOp::Union {
                non_overlap_band(&mut out, &b2[i2..band2_end], top, bot);
            }
            ytop = b1[i1].y1;
        } else {
            ytop = b1[i1].y1;
        }

        if out.len() != cur_band {
            prev_band = coalesce_bands(&mut out, prev_band, cur_band);
        }

        // The vertically overlapping slice of both bands.
        ybot = b1[i1].y2.min(b2[i2].y2);
        cur_band = out.len();
        if ybot > ytop {
            match op {
                RegionOp::Union => {
                    union_overlap_band(&mut out, &b1[i1..band1_end], &b2[i2..band2_end], ytop, ybot)
                }
                RegionOp::Intersect => intersect_overlap_band(
                    &mut out,
                    &b1[i1..band1_end],
                    &b2[i2..band2_end],
                    ytop,
                    ybot,
                ),
            }
        }
        if out.len() != cur_band {
            prev_band = coalesce_bands(&mut out, prev_band, cur_band);
        }

        if b1[i1].y2 == ybot {
            i1 = band1_end;
        }
        if b2[i2].y2 == ybot {
            i2 = band2_end;
        }
        if i1 >= b1.len() || i2 >= b2.len() {
            break;
        }
    }

    // Whatever remains of the longer region.
    let cur_band = out.len();
    if op == RegionOp::Union {
        let (rest, mut i) = if i1 < b1.len() { (b1, i1) } else { (b2, i2) };
        while i < rest.len() {
            let end = band_end(rest, i);
            non_overlap_band(&mut out, &rest[i..end], rest[i].y1.max(ybot), rest[i].y2);
            i = end;
        }
    }
    if out.len() != cur_band {
        coalesce_bands(&mut out, prev_band, cur_band);
    }

    out
}

/// Assert every representation invariant on a region. Test support.
#[cfg(test)]
pub(crate) fn check_invariants(r: &Region) {
    let boxes = r.boxes();
    if boxes.is_empty() {
        assert_eq!(r.extents(), RegionBox::default());
        return;
    }
    let mut i = 0;
    let mut prev_band: Option<(usize, usize)> = None;
    while i < boxes.len() {
        let end = band_end(boxes, i);
        let y1 = boxes[i].y1;
        let y2 = boxes[i].y2;
        assert!(y1 < y2, "degenerate band");
        for b in &boxes[i..end] {
            assert_eq!(b.y1, y1);
            assert_eq!(b.y2, y2);
            assert!(b.x1 < b.x2, "degenerate box");
        }
        for w in boxes[i..end].windows(2) {
            assert!(w[0].x2 < w[1].x1, "adjacent or overlapping spans in band");
        }
        if let Some((ps, pe)) = prev_band {
            assert!(boxes[ps].y2 <= y1, "bands overlap vertically");
            if boxes[ps].y2 == y1 && pe - ps == end - i {
                let identical = (0..end - i).all(|k| {
                    boxes[ps + k].x1 == boxes[i + k].x1 && boxes[ps + k].x2 == boxes[i + k].x2
                });
                assert!(!identical, "uncoalesced identical adjacent bands");
            }
        }
        prev_band = Some((i, end));
        i = end;
    }
    assert_eq!(r.extents(), extents_of(boxes), "stale extents");
}

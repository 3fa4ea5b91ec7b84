//! Property tests for the region algebra.
//!
//! Every algebraic property is cross-checked against a brute-force pixel
//! rasterizer, so the scanline engine's banding and coalescing cannot hide
//! coverage bugs.

mod tests {
    use crate::region::check_invariants;
    use crate::{Region, RegionBox};
    use proptest::prelude::*;
    use rfx_common::Rect;

    const GRID: usize = 80;

    /// Rasterize a region onto a small boolean grid.
    fn rasterize(r: &Region) -> Vec<bool> {
        let mut grid = vec![false; GRID * GRID];
        for b in r.boxes() {
            for y in b.y1.max(0) as usize..(b.y2.max(0) as usize).min(GRID) {
                for x in b.x1.max(0) as usize..(b.x2.max(0) as usize).min(GRID) {
                    grid[y * GRID + x] = true;
                }
            }
        }
        grid
    }

    /// Rasterize raw rectangles directly (the ground truth).
    fn rasterize_rects(rects: &[Rect]) -> Vec<bool> {
        let mut grid = vec![false; GRID * GRID];
        for r in rects {
            for y in r.y as usize..(r.bottom() as usize).min(GRID) {
                for x in r.x as usize..(r.right() as usize).min(GRID) {
                    grid[y * GRID + x] = true;
                }
            }
        }
        grid
    }

    fn build_region(rects: &[Rect]) -> Region {
        rects
            .iter()
            .fold(Region::new(), |acc, r| acc.union_rect(r))
    }

    fn arbitrary_rect() -> impl Strategy<Value = Rect> {
        (0u16..60, 0u16..60, 0u16..20, 0u16..20)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    fn arbitrary_rects() -> impl Strategy<Value = Vec<Rect>> {
        prop::collection::vec(arbitrary_rect(), 0..6)
    }

    proptest! {
        #[test]
        fn union_matches_brute_force(rects in arbitrary_rects()) {
            let region = build_region(&rects);
            check_invariants(&region);
            prop_assert_eq!(rasterize(&region), rasterize_rects(&rects));
        }

        #[test]
        fn union_commutes(a in arbitrary_rects(), b in arbitrary_rects()) {
            let ra = build_region(&a);
            let rb = build_region(&b);
            let ab = ra.union(&rb);
            let ba = rb.union(&ra);
            check_invariants(&ab);
            check_invariants(&ba);
            prop_assert_eq!(ab.covered_area(), ba.covered_area());
            prop_assert_eq!(rasterize(&ab), rasterize(&ba));
        }

        #[test]
        fn union_is_associative_on_coverage(
            a in arbitrary_rects(),
            b in arbitrary_rects(),
            c in arbitrary_rects(),
        ) {
            let (ra, rb, rc) = (build_region(&a), build_region(&b), build_region(&c));
            let left = ra.union(&rb).union(&rc);
            let right = ra.union(&rb.union(&rc));
            check_invariants(&left);
            check_invariants(&right);
            prop_assert_eq!(rasterize(&left), rasterize(&right));
        }

        #[test]
        fn union_is_idempotent(rects in arbitrary_rects()) {
            let r = build_region(&rects);
            let rr = r.union(&r.clone());
            check_invariants(&rr);
            prop_assert_eq!(rr.covered_area(), r.covered_area());
            prop_assert_eq!(rr.boxes().len(), r.boxes().len());
        }

        #[test]
        fn intersect_matches_brute_force(a in arbitrary_rects(), b in arbitrary_rects()) {
            let ra = build_region(&a);
            let rb = build_region(&b);
            let i = ra.intersect(&rb);
            check_invariants(&i);

            let (ga, gb) = (rasterize_rects(&a), rasterize_rects(&b));
            let expected: Vec<bool> = ga.iter().zip(&gb).map(|(x, y)| *x && *y).collect();
            prop_assert_eq!(rasterize(&i), expected);
        }

        #[test]
        fn intersect_commutes(a in arbitrary_rects(), b in arbitrary_rects()) {
            let ra = build_region(&a);
            let rb = build_region(&b);
            prop_assert_eq!(ra.intersect(&rb), rb.intersect(&ra));
        }

        #[test]
        fn extents_are_tight(a in arbitrary_rects(), b in arbitrary_rects()) {
            let u = build_region(&a).union(&build_region(&b));
            if u.is_empty() {
                prop_assert_eq!(u.extents(), RegionBox::default());
            } else {
                let e = u.extents();
                prop_assert!(u.boxes().iter().any(|bx| bx.x1 == e.x1));
                prop_assert!(u.boxes().iter().any(|bx| bx.x2 == e.x2));
                prop_assert_eq!(u.boxes()[0].y1, e.y1);
                prop_assert_eq!(u.boxes()[u.boxes().len() - 1].y2, e.y2);
            }
        }
    }
}

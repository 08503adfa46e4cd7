//! Toroidal wrap-around for field queries.

use crate::core::types::Vec2;
use crate::math::Quad;

/// One sub-query produced by wrapping a caller rect into the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrappedQuery {
    /// Area to look up, in field coordinates (may extend below zero)
    pub area: Quad,
    /// Added to a field position to get the matching position in the caller's frame
    pub offset: Vec2,
}

/// Normalize `rect` into `field` and split any overflow into shifted queries.
///
/// The first query is always the normalized rect. If it runs past the field's
/// max edge on x and/or y, queries shifted back by one field size on that
/// axis (and on both, when both overflow) are appended, so areas near one
/// edge also see islands near the opposite edge. Rects wider than the field
/// only wrap once.
pub fn wrap_queries(rect: &Quad, field: &Quad) -> Vec<WrappedQuery> {
    let normalized = rect.wrapped_into(field);
    let delta = rect.min - normalized.min;
    let extent = field.size();

    let overflow_x = normalized.max.x > field.max.x;
    let overflow_y = normalized.max.y > field.max.y;

    let mut shifts = vec![Vec2::ZERO];
    if overflow_x {
        shifts.push(Vec2::new(-extent.x, 0.0));
    }
    if overflow_y {
        shifts.push(Vec2::new(0.0, -extent.y));
    }
    if overflow_x && overflow_y {
        shifts.push(-extent);
    }

    shifts
        .into_iter()
        .map(|shift| WrappedQuery {
            area: normalized.translated(shift),
            offset: delta - shift,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Quad {
        Quad::new(Vec2::ZERO, Vec2::splat(100.0))
    }

    #[test]
    fn test_inside_is_single_query() {
        let rect = Quad::from_coords(10.0, 10.0, 20.0, 20.0);
        let queries = wrap_queries(&rect, &field());
        assert_eq!(queries, vec![WrappedQuery { area: rect, offset: Vec2::ZERO }]);
    }

    #[test]
    fn test_negative_x_wraps_both_sides() {
        let queries = wrap_queries(&Quad::from_coords(-10.0, 0.0, 10.0, 10.0), &field());
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].area, Quad::from_coords(90.0, 0.0, 110.0, 10.0));
        assert_eq!(queries[0].offset, Vec2::new(-100.0, 0.0));
        assert_eq!(queries[1].area, Quad::from_coords(-10.0, 0.0, 10.0, 10.0));
        assert_eq!(queries[1].offset, Vec2::ZERO);
    }

    #[test]
    fn test_corner_produces_four_queries() {
        let queries = wrap_queries(&Quad::from_coords(95.0, 95.0, 105.0, 105.0), &field());
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[3].area, Quad::from_coords(-5.0, -5.0, 5.0, 5.0));
        // An island at the field origin draws just past the caller's rect min
        assert_eq!(queries[3].offset, Vec2::splat(100.0));
    }

    #[test]
    fn test_far_away_rect_normalizes() {
        let queries = wrap_queries(&Quad::from_coords(1020.0, -380.0, 1030.0, -370.0), &field());
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].area, Quad::from_coords(20.0, 20.0, 30.0, 30.0));
        assert_eq!(queries[0].offset, Vec2::new(1000.0, -400.0));
    }
}

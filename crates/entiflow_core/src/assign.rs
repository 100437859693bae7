//! Shallow-merge seam for entity types.

/// Merges a partial patch into an entity value.
///
/// The `assign` fluent method is sugar for an update applying this
/// trait, so entity types decide what a shallow merge means for them.
/// Unset patch fields leave the current value untouched.
pub trait Assign<P> {
    /// Returns a copy of `self` with `patch` merged in.
    #[must_use]
    fn assign(self, patch: P) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Default)]
    struct PointPatch {
        x: Option<i32>,
        y: Option<i32>,
    }

    impl Assign<PointPatch> for Point {
        fn assign(self, patch: PointPatch) -> Self {
            Self {
                x: patch.x.unwrap_or(self.x),
                y: patch.y.unwrap_or(self.y),
            }
        }
    }

    #[test]
    fn unset_fields_are_left_alone() {
        let point = Point { x: 1, y: 2 };
        let merged = point.assign(PointPatch {
            y: Some(5),
            ..PointPatch::default()
        });
        assert_eq!(merged, Point { x: 1, y: 5 });
    }
}

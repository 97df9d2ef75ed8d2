//! The constraint bag.
//!
//! A [`Bag`] summarizes the constraints attached to a schema node for
//! introspection and export. It is a pure fold over the node's checks: each
//! check contributes through [`Check::attach`](super::Check::attach) in
//! attachment order, and the result is stored immutably on the node.

use crate::error::Numeric;

/// Derived, read-only constraint summary of a schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bag {
    pub minimum: Option<Numeric>,
    pub maximum: Option<Numeric>,
    pub exclusive_minimum: Option<Numeric>,
    pub exclusive_maximum: Option<Numeric>,
    pub multiple_of: Option<Numeric>,
    pub format: Option<&'static str>,
    pub patterns: Vec<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub mime: Vec<String>,
}

impl Bag {
    /// Raises the lower bound if `bound` is tighter than the current one.
    pub(crate) fn tighten_min(mut self, bound: Numeric, inclusive: bool) -> Self {
        let slot = if inclusive {
            &mut self.minimum
        } else {
            &mut self.exclusive_minimum
        };
        if slot.map_or(true, |current| bound.as_f64() > current.as_f64()) {
            *slot = Some(bound);
        }
        self
    }

    /// Lowers the upper bound if `bound` is tighter than the current one.
    pub(crate) fn tighten_max(mut self, bound: Numeric, inclusive: bool) -> Self {
        let slot = if inclusive {
            &mut self.maximum
        } else {
            &mut self.exclusive_maximum
        };
        if slot.map_or(true, |current| bound.as_f64() < current.as_f64()) {
            *slot = Some(bound);
        }
        self
    }

    pub(crate) fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(self.min_length.map_or(min, |cur| cur.max(min)));
        self
    }

    pub(crate) fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(self.max_length.map_or(max, |cur| cur.min(max)));
        self
    }

    pub(crate) fn with_min_size(mut self, min: u64) -> Self {
        self.min_size = Some(self.min_size.map_or(min, |cur| cur.max(min)));
        self
    }

    pub(crate) fn with_max_size(mut self, max: u64) -> Self {
        self.max_size = Some(self.max_size.map_or(max, |cur| cur.min(max)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_only_tighten() {
        let bag = Bag::default()
            .tighten_min(Numeric::Number(5.0), true)
            .tighten_min(Numeric::Number(3.0), true)
            .tighten_max(Numeric::Number(10.0), false)
            .tighten_max(Numeric::Number(20.0), false);

        assert_eq!(bag.minimum, Some(Numeric::Number(5.0)));
        assert_eq!(bag.exclusive_maximum, Some(Numeric::Number(10.0)));
        assert_eq!(bag.maximum, None);
    }

    #[test]
    fn test_lengths_intersect() {
        let bag = Bag::default()
            .with_min_length(2)
            .with_min_length(4)
            .with_max_length(8)
            .with_max_length(6);
        assert_eq!((bag.min_length, bag.max_length), (Some(4), Some(6)));
    }
}

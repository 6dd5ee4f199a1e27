//! Edge detection over two consecutive samples of a single-bit signal.
//!
//! None of these keep history: the caller holds the previous sample and
//! passes both in.

/// `true` when the signal went from low to high.
pub fn rose(previous: bool, current: bool) -> bool {
    !previous && current
}

/// `true` when the signal went from high to low.
pub fn fell(previous: bool, current: bool) -> bool {
    previous && !current
}

/// `true` when both samples sit at `value`.
pub fn stayed(previous: bool, current: bool, value: bool) -> bool {
    previous == value && current == value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    High,
    Low,
}

impl Edge {
    /// Classifies the transition between two samples.
    pub fn between(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            (true, true) => Edge::High,
            (false, false) => Edge::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [(bool, bool); 4] = [(false, false), (false, true), (true, false), (true, true)];

    #[test]
    fn test_rose_truth_table() {
        let expected = [false, true, false, false];
        for ((previous, current), want) in SAMPLES.iter().zip(expected) {
            assert_eq!(rose(*previous, *current), want, "rose({previous}, {current})");
        }
    }

    #[test]
    fn test_fell_truth_table() {
        let expected = [false, false, true, false];
        for ((previous, current), want) in SAMPLES.iter().zip(expected) {
            assert_eq!(fell(*previous, *current), want, "fell({previous}, {current})");
        }
    }

    #[test]
    fn test_stayed_truth_table() {
        for value in [false, true] {
            for (previous, current) in SAMPLES {
                let want = previous == value && current == value;
                assert_eq!(stayed(previous, current, value), want);
            }
        }
        assert!(stayed(true, true, true));
        assert!(!stayed(false, true, false));
        assert!(!stayed(false, true, true));
    }

    #[test]
    fn test_edge_classification_agrees_with_predicates() {
        for (previous, current) in SAMPLES {
            let edge = Edge::between(previous, current);
            assert_eq!(edge == Edge::Rising, rose(previous, current));
            assert_eq!(edge == Edge::Falling, fell(previous, current));
            assert_eq!(edge == Edge::High, stayed(previous, current, true));
            assert_eq!(edge == Edge::Low, stayed(previous, current, false));
        }
    }
}

/// Asserts that two floats are within `eps` of each other.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-9)
    };
    ($left:expr, $right:expr, $eps:expr) => {
        let (l, r) = ($left, $right);
        assert!((l - r).abs() <= $eps, "{} and {} differ by more than {}", l, r, $eps);
    };
}

/// Asserts that every generation score of a game report is non-negative.
#[macro_export]
macro_rules! assert_scores_non_negative {
    ($report:expr) => {
        for (generation, score) in $report.generation_scores.iter().enumerate() {
            assert!(
                *score >= 0.0,
                "Generation {} scored {} below zero",
                generation,
                score
            );
        }
    };
}

/// Asserts the number of live dynamic bodies in a scripted world.
#[macro_export]
macro_rules! assert_live_rigs {
    ($world:expr, $rigs:expr) => {
        assert_eq!(
            $world.live_dynamic_bodies(),
            $rigs * 3,
            "Live rig count mismatch"
        );
    };
}

use weatherbot::setup_logging;

#[test]
fn test_logging_setup() {
    // Only one global subscriber can be installed per process, so this is
    // the single test in this binary that calls it.
    let result = std::panic::catch_unwind(|| {
        setup_logging();
        tracing::info!(session_key = "C1-100.1", "logging initialized");
    });

    assert!(result.is_ok(), "setup_logging function should not panic");
}

use std::sync::Once;

static INIT: Once = Once::new();

/// Routes battle logging to the test output. Safe to call from every test.
pub fn setup_test_environment() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_core::Level::DEBUG)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .try_init();
    });
}

use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Quiet mode suppresses human output (`SCHEMA_BOOTSTRAP_QUIET=1`).
/// JSON output and errors are never suppressed.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("SCHEMA_BOOTSTRAP_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Force quiet mode on (from `--quiet`). Has no effect once `is_quiet` was read.
pub fn set_quiet(quiet: bool) {
    let _ = QUIET.set(quiet);
}

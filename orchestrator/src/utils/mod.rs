pub mod logging;
pub mod metrics;

/// Compares two byte strings in time independent of where they differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks a caller supplied secret against the configured one.
///
/// Always false when no secret is configured or the supplied one is empty.
pub fn secret_matches(configured: Option<&str>, supplied: &str) -> bool {
    match configured {
        Some(expected) if !expected.is_empty() && !supplied.is_empty() => {
            constant_time_eq(expected.as_bytes(), supplied.as_bytes())
        }
        _ => false,
    }
}

#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a `&'static [&'static Regex]` pattern cascade. Order is priority:
/// extraction tries each pattern in turn and stops at the first capture.
#[macro_export]
macro_rules! cascade {
    ($($pat:literal),+ $(,)?) => {{
        static PATTERNS: once_cell::sync::Lazy<Vec<&'static regex::Regex>> =
            once_cell::sync::Lazy::new(|| vec![$($crate::regex!($pat)),+]);
        &**PATTERNS
    }};
}

/// The conventional end-of-options separator.
pub(crate) const DOUBLE_DASH: &str = "--";

/// The repetition suffix in pattern syntax.
pub(crate) const ELLIPSIS: &str = "...";

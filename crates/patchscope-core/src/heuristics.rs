//! Label heuristics used to infer edges the backend does not report
//!
//! Monitors and loopbacks are only recognisable from their labels. Each
//! heuristic is a plain prefix/token parser so it can be tested on its own.

/// Prefix the audio server puts on monitor sources.
pub const MONITOR_PREFIX: &str = "Monitor of ";

/// Prefix of labels produced by the loopback module.
pub const LOOPBACK_PREFIX: &str = "Loopback";

/// Drop the trailing id token from a display label.
///
/// Display labels end in a single space and the node id (`"Foo sink_5"`);
/// this returns `"Foo"`. Only that separator is removed, so whitespace that
/// belongs to the label is kept. A label without a separator strips to the
/// empty string.
pub fn strip_id_suffix(label: &str) -> &str {
    match label.rfind(' ') {
        Some(pos) => &label[..pos],
        None => "",
    }
}

/// The device a monitor label refers to.
///
/// `"Monitor of Built-in Audio"` yields `Some("Built-in Audio")`. Anything
/// not starting with [`MONITOR_PREFIX`], or naming nothing, yields `None`.
pub fn monitor_target(label: &str) -> Option<&str> {
    label
        .strip_prefix(MONITOR_PREFIX)
        .filter(|target| !target.is_empty())
}

/// The loopback ordinal a label starts with.
///
/// The ordinal is the first whitespace-separated token when it is `L`
/// followed by one or more ASCII digits: `"L2 Loopback to Speakers"` yields
/// `Some("L2")`. Leading whitespace is ignored.
pub fn loopback_ordinal(label: &str) -> Option<&str> {
    let token = label.split_whitespace().next()?;
    let digits = token.strip_prefix('L')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(token)
    } else {
        None
    }
}

pub fn is_loopback_label(label: &str) -> bool {
    label.starts_with(LOOPBACK_PREFIX)
}

/// Prepend the ordinal marker for the `n`-th loopback.
pub fn tag_loopback(label: &str, n: usize) -> String {
    format!("L{} {}", n, label)
}

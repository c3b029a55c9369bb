//! Node label text: compact id suffixes and word wrapping

/// Id prefixes and their compact forms. Longer prefixes come first so that
/// `sink_input_` is not mistaken for `sink_`.
const SHORT_PREFIXES: [(&str, &str); 4] = [
    ("source_output_", "SO."),
    ("sink_input_", "SI."),
    ("source_", "sr."),
    ("sink_", "sn."),
];

/// Rewrite the trailing id token of a display label in compact form:
/// `Speakers sink_12` becomes `Speakers sn.12`. Labels without a
/// recognisable id token are returned unchanged.
pub fn short_label(label: &str) -> String {
    let (head, token) = match label.rsplit_once(' ') {
        Some((head, token)) => (Some(head), token),
        None => (None, label),
    };

    let short = SHORT_PREFIXES.iter().find_map(|(prefix, replacement)| {
        let digits = token.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(format!("{}{}", replacement, digits))
    });

    match (head, short) {
        (Some(head), Some(short)) => format!("{} {}", head, short),
        (None, Some(short)) => short,
        _ => label.to_string(),
    }
}

/// Greedy word wrap at `width` characters. Words longer than a line are
/// broken across lines.
pub fn wrap_label(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        let line_len = line.chars().count();

        if line_len > 0 && line_len + 1 + word.len() <= width {
            line.push(' ');
            line.extend(word.iter());
            continue;
        }
        if line_len > 0 {
            lines.push(std::mem::take(&mut line));
        }
        while word.len() > width {
            lines.push(word.drain(..width).collect());
        }
        line.extend(word.iter());
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Shorten then wrap.
pub fn node_text(label: &str, width: usize) -> String {
    wrap_label(&short_label(label), width)
}

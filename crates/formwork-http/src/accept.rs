//! `Accept-Language` header parsing.

/// Parses an `Accept-Language` header value into language tags ordered by
/// descending quality.
///
/// Entries with an unparseable or absent `q` parameter default to quality
/// `1.0`; ties keep the header's order; `*` and zero-quality entries are
/// dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = Vec::new();
    for part in header.split(',') {
        let mut pieces = part.split(';');
        let tag = pieces.next().unwrap_or("").trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }
        let mut quality = 1.0_f32;
        for piece in pieces {
            if let Some(raw) = piece.trim().strip_prefix("q=") {
                quality = raw.trim().parse().unwrap_or(1.0);
            }
        }
        if quality > 0.0 {
            entries.push((tag.to_string(), quality));
        }
    }
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

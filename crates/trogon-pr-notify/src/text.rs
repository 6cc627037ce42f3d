const ELLIPSIS: char = '…';

/// Cuts `s` to at most `max` Unicode code points, appending `…` when it was
/// longer. `max == 0` yields an empty string.
pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&s[..cut]);
            out.push(ELLIPSIS);
            out
        }
    }
}

use std::borrow::Cow;

/// Truncates a string to at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes or display columns, and cuts
/// exactly at the limit: no ellipsis, no word-boundary trimming.
///
/// Returns `Cow::Borrowed` when the string already fits.
///
/// # Examples
///
/// ```
/// use tubefeed::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello World", 5), "Hello");
/// assert_eq!(truncate_chars("Short", 10), "Short");
/// assert_eq!(truncate_chars("日本語テスト", 3), "日本語");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(s[..byte_idx].to_string()),
        None => Cow::Borrowed(s),
    }
}

/// Removes characters that may not appear anywhere in an XML 1.0 document.
///
/// XML forbids most C0 control characters (even escaped) as well as
/// U+FFFE and U+FFFF. Video titles and descriptions occasionally carry
/// them, and a single one makes the whole feed unparseable.
///
/// Preserves: tab (0x09), newline (0x0A), carriage return (0x0D).
///
/// Returns `Cow::Borrowed` when nothing needs stripping (common case).
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_invalid_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_invalid_xml_char(c)).collect())
}

fn is_invalid_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

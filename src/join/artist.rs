/// Characters stripped from both ends of each artist entry.
const ENTRY_TRIM: [char; 3] = [' ', '\'', '"'];

/// Extract the first artist from a Spotify `artists` cell.
///
/// Supported syntax, nothing else is guessed:
///
/// * surrounding whitespace is ignored;
/// * one pair of enclosing brackets, `[` ... `]`, is removed when both are present;
/// * the rest is split on every comma, quoting included;
/// * each entry is stripped of spaces, `'` and `"` at both ends;
/// * the first non-empty entry is the primary artist.
///
/// ```
/// use mmtd::join::primary_artist;
/// assert_eq!(primary_artist(Some("['Sam Smith', 'Kim Petras']")).as_deref(), Some("Sam Smith"));
/// assert_eq!(primary_artist(Some("Adele")).as_deref(), Some("Adele"));
/// assert_eq!(primary_artist(Some("[]")), None);
/// ```
pub fn primary_artist(cell: Option<&str>) -> Option<String> {
    let s = cell?.trim();
    let s = match s.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner,
        None => s,
    };
    s.split(',')
        .map(|entry| entry.trim_matches(&ENTRY_TRIM[..]))
        .find(|entry| !entry.is_empty())
        .map(str::to_string)
}

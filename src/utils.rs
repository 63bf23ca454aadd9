//! Helpers shared by the workloads: byte decoding and the hand-rolled
//! CSV line splitting the cleaning jobs rely on.

use anyhow::Result;
use bytes::Bytes;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String> {
    Ok(String::from_utf8(buf.as_ref().into())?)
}

/// Split on commas that sit outside double quotes.
///
/// Quotes are kept in the fields and empty trailing fields are preserved,
/// so `a,"b,c",` gives `["a", "\"b,c\"", ""]`.
pub fn split_outside_quotes(line: &str) -> Vec<&str> {
    // a comma separates fields when an even number of quotes follows it
    let mut quotes_after = line.bytes().filter(|&b| b == b'"').count();
    let mut fields = Vec::new();
    let mut start = 0;
    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quotes_after -= 1,
            b',' if quotes_after % 2 == 0 => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Read exactly `n` fields from a CSV line.
///
/// A double quote toggles quoting and is not copied into the field. Text
/// after the `n`-th separator is ignored; missing fields are empty.
pub fn take_quoted_fields(line: &str, n: usize) -> Vec<String> {
    let mut fields = Vec::with_capacity(n);
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        if fields.len() == n {
            break;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if fields.len() < n {
        fields.push(current);
    }
    fields.resize(n, String::new());
    fields
}

/// Quote a CSV field when it contains a comma, a quote or a newline.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

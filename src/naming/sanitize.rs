//! Filesystem-safe tokens

/// Reduce `text` to ASCII letters, digits, spaces, `_` and `-`, trimmed.
///
/// German umlauts and `ß` are transliterated first and any whitespace becomes a
/// plain space, so `"Müller\nGmbH"` turns into `"Mueller GmbH"`.
pub fn sanitize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            'ä' => result.push_str("ae"),
            'ö' => result.push_str("oe"),
            'ü' => result.push_str("ue"),
            'Ä' => result.push_str("Ae"),
            'Ö' => result.push_str("Oe"),
            'Ü' => result.push_str("Ue"),
            'ß' => result.push_str("ss"),
            'ẞ' => result.push_str("SS"),
            c if c.is_whitespace() => result.push(' '),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => result.push(c),
            _ => {}
        }
    }

    result.trim().to_string()
}

/// Sanitize a company name and join its words with underscores.
///
/// Runs of spaces left behind by removed characters (`Müller & Söhne`) collapse
/// into one `_`, giving `Mueller_Soehne` rather than `Mueller__Soehne`.
pub fn sanitize_company(name: &str) -> String {
    sanitize(name)
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

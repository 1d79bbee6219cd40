//! Byte-to-text decoding shared by the readers

use encoding_rs::Encoding;

/// Pick the encoding of a byte buffer
///
/// 1. A byte order mark wins
/// 2. Valid UTF-8 is taken as UTF-8
/// 3. The hint (from an XML declaration or the user) when it names a known encoding
/// 4. Windows-1252, common in old ebooks
pub(crate) fn detect_encoding(bytes: &[u8], hint: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return encoding_rs::UTF_8;
    }
    hint.and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(encoding_rs::WINDOWS_1252)
}

/// Decode bytes with the given encoding, honouring a BOM if present
pub(crate) fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Encoding named in an `<?xml ... encoding="..."?>` declaration
pub(crate) fn xml_declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let decl_end = head.find("?>")?;
    let decl = &head[..decl_end];
    let start = decl.find("encoding")? + "encoding".len();
    let rest = decl[start..].trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_string())
}

/// Cut text to at most `max` characters on a character boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((pos, _)) => format!("{}…", text[..pos].trim_end()),
        None => text.to_string(),
    }
}

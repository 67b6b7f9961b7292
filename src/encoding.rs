//! Decoding of downloaded pages.
//!
//! The documentation host does not always declare the right charset, so the
//! encoding is detected from the body first and declarations only break ties.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use log::debug;

/// Picks the encoding of `body`.
///
/// In order: byte-order mark, valid UTF-8, `<meta>` charset in the first
/// 1024 bytes, charset of the `Content-Type` header, windows-1252.
/// Declarations are only consulted for bytes that are not UTF-8, so a
/// declared UTF-8 or UTF-16 is ignored at that point.
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if std::str::from_utf8(body).is_ok() {
        return UTF_8;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(1024)]);
    let meta = regex!(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>]+)"#)
        .captures(&head)
        .and_then(|c| Encoding::for_label(c.get(1)?.as_str().as_bytes()));
    meta.into_iter()
        .chain(content_type.and_then(charset_of_content_type))
        .find(|&encoding| !is_unicode(encoding))
        .unwrap_or(WINDOWS_1252)
}

fn is_unicode(encoding: &'static Encoding) -> bool {
    encoding == UTF_8 || encoding == UTF_16LE || encoding == UTF_16BE
}

fn charset_of_content_type(content_type: &str) -> Option<&'static Encoding> {
    let label = regex!(r#"(?i)charset\s*=\s*"?([^";\s]+)"#)
        .captures(content_type)?
        .get(1)?
        .as_str();
    Encoding::for_label(label.as_bytes())
}

/// Decodes `body` into text, replacing malformed sequences.
pub fn decode(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(body, content_type);
    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        debug!("Malformed {} sequences were replaced", encoding.name());
    }
    text.into_owned()
}

//! Best-effort text cleanup for post bodies.
//!
//! Nothing here understands HTML structure: tag stripping is a literal
//! `<`/`>` scan and entity decoding covers a fixed table only.

use crate::domain::model::ContentFormat;

/// `&amp;` 必須最後處理，否則 `&amp;lt;` 會被解碼兩次
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// 依格式正規化原始內容
pub fn normalize(raw: &str, format: ContentFormat) -> String {
    let cleaned = cleanup_content(raw);
    match format {
        ContentFormat::Html => cleaned,
        ContentFormat::Text => strip_html_tags(&cleaned),
    }
}

/// Removes one layer of enclosing quotes, resolves escape sequences and
/// decodes the common HTML entities.
pub fn cleanup_content(raw: &str) -> String {
    let mut content = raw;
    if content.len() > 2 && content.starts_with('"') && content.ends_with('"') {
        content = &content[1..content.len() - 1];
    }

    let mut content = content.replace("\\\"", "\"");

    if let Some(unescaped) = unescape_json(&content) {
        content = unescaped;
    }

    decode_entities(&content)
}

pub fn decode_entities(text: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, literal)| acc.replace(entity, literal))
}

/// 以 JSON 字串規則解開 `\uXXXX`、`\n` 等跳脫序列；失敗時回傳 None
fn unescape_json(text: &str) -> Option<String> {
    if !text.contains('\\') {
        return None;
    }

    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for ch in text.chars() {
        match ch {
            '"' => literal.push_str("\\\""),
            c if c.is_control() && (c as u32) < 0x20 => {
                literal.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => literal.push(c),
        }
    }
    literal.push('"');

    serde_json::from_str::<String>(&literal).ok()
}

/// Drops everything between `<` and `>` and squeezes the leftover whitespace.
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                result.push(' ');
            }
            c if !in_tag => result.push(c),
            _ => {}
        }
    }

    let mut text = result.replace("&nbsp;", " ");
    while text.contains("\n\n") {
        text = text.replace("\n\n", "\n");
    }
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_tags_basic() {
        assert_eq!(strip_html_tags("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_strip_html_tags_collapses_whitespace() {
        let html = "<h1>Title</h1>\n\n\n<p>First   line</p>\n\n<p>Second&nbsp;line</p>";
        assert_eq!(strip_html_tags(html), "Title \n First line \n Second line");
    }

    #[test]
    fn test_strip_html_tags_ignores_attributes() {
        assert_eq!(
            strip_html_tags(r#"<a href="https://example.com" title="x">link</a> text"#),
            "link text"
        );
    }

    #[test]
    fn test_cleanup_removes_enclosing_quotes() {
        assert_eq!(cleanup_content("\"<p>hi</p>\""), "<p>hi</p>");
        // 長度不足時不處理
        assert_eq!(cleanup_content("\"\""), "\"\"");
    }

    #[test]
    fn test_cleanup_unescapes_quotes() {
        assert_eq!(
            cleanup_content(r#"<a href=\"/x\">link</a>"#),
            r#"<a href="/x">link</a>"#
        );
    }

    #[test]
    fn test_cleanup_resolves_unicode_and_entities() {
        assert_eq!(cleanup_content(r"\u0041 &amp; B"), "A & B");
        assert_eq!(cleanup_content(r"\uc548\ub155"), "안녕");
        assert_eq!(cleanup_content(r"line1\nline2"), "line1\nline2");
    }

    #[test]
    fn test_cleanup_keeps_invalid_escapes() {
        // 無效的跳脫序列：保留原文，只處理實體
        assert_eq!(cleanup_content(r"C:\dir &lt;x&gt;"), r"C:\dir <x>");
    }

    #[test]
    fn test_cleanup_preserves_real_newlines_during_unescape() {
        assert_eq!(cleanup_content("a\n\\u0042"), "a\nB");
    }

    #[test]
    fn test_entity_decoding_is_idempotent() {
        let input = "Tom &amp; Jerry &lt;3&gt; &quot;cheese&quot;&nbsp;&#39;ok&apos;";
        let once = cleanup_content(input);
        assert_eq!(once, "Tom & Jerry <3> \"cheese\" 'ok'");
        assert_eq!(cleanup_content(&once), once);
    }

    #[test]
    fn test_amp_decoded_last() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_normalize_by_format() {
        let raw = r"<p>\u0041 &amp; B</p>";
        assert_eq!(normalize(raw, ContentFormat::Html), "<p>A & B</p>");
        assert_eq!(normalize(raw, ContentFormat::Text), "A & B");
    }
}

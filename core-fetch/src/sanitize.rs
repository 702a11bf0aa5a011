//! Markup sanitization for chapter bodies.
//!
//! The catalog serves chapter text with embedded markup. Display wants plain
//! text: tags stripped, block-level tags turned into paragraph breaks,
//! `script`/`style` content dropped entirely, HTML entities decoded, and
//! whitespace normalized. Markup that cannot be stripped safely (an
//! unterminated tag) is a [`FetchError::Parse`].

use crate::error::{FetchError, Result};

/// Block-level tags that separate paragraphs when stripped.
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "section", "article", "blockquote", "hr", "pre",
];

/// Strip markup from a chapter body.
///
/// Paragraphs in the output are separated by a blank line. Runs of spaces and
/// tabs collapse to a single space; leading and trailing whitespace is
/// trimmed.
pub fn strip_markup(input: &str) -> Result<String> {
    let mut raw = String::with_capacity(input.len());
    let mut cursor = input;

    while let Some(open) = cursor.find('<') {
        push_decoded(&mut raw, &cursor[..open]);

        let tag_area = &cursor[open + 1..];
        let close = tag_area
            .find('>')
            .ok_or_else(|| FetchError::Parse("unterminated markup tag".to_string()))?;
        let tag = &tag_area[..close];
        cursor = &tag_area[close + 1..];

        let name = tag_name(tag);
        if name == "script" || name == "style" {
            if !tag.ends_with('/') {
                cursor = skip_element(cursor, &name)?;
            }
        } else if BLOCK_TAGS.contains(&name.as_str()) {
            raw.push('\n');
        }
    }
    push_decoded(&mut raw, cursor);

    Ok(normalize(&raw))
}

/// Count of non-whitespace characters; the fallback when the catalog reports
/// a zero word count.
pub fn glyph_count(text: &str) -> u32 {
    text.chars().filter(|c| !c.is_whitespace()).count() as u32
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Skip past the closing tag of a `script`/`style` element, dropping its
/// content.
fn skip_element<'a>(cursor: &'a str, name: &str) -> Result<&'a str> {
    let lowered = cursor.to_ascii_lowercase();
    let needle = format!("</{}", name);
    let at = lowered
        .find(&needle)
        .ok_or_else(|| FetchError::Parse(format!("unterminated {} element", name)))?;

    let after = &cursor[at..];
    let close = after
        .find('>')
        .ok_or_else(|| FetchError::Parse("unterminated markup tag".to_string()))?;
    Ok(&after[close + 1..])
}

/// Append `text` with HTML entities decoded. An ampersand that does not start
/// a recognizable entity passes through literally.
fn push_decoded(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];

        match tail.find(';') {
            Some(end) if end > 0 && end <= 10 => {
                if let Some(decoded) = decode_entity(&tail[..end]) {
                    out.push(decoded);
                    rest = &tail[end + 1..];
                    continue;
                }
                out.push('&');
                rest = tail;
            }
            _ => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse().ok()?
        };
        return char::from_u32(code);
    }

    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "middot" => '\u{B7}',
        "bull" => '\u{2022}',
        "copy" => '\u{A9}',
        "reg" => '\u{AE}',
        "trade" => '\u{2122}',
        _ => return None,
    })
}

/// Collapse intra-paragraph whitespace and join non-empty paragraphs with a
/// blank line.
fn normalize(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    for paragraph in raw.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            continue;
        };

        if !result.is_empty() {
            result.push_str("\n\n");
        }
        result.push_str(first);
        for word in words {
            result.push(' ');
            result.push_str(word);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(strip_markup("just words").unwrap(), "just words");
    }

    #[test]
    fn test_block_tags_become_paragraph_breaks() {
        let body = "<p>First line.</p><p>Second line.</p>";
        assert_eq!(strip_markup(body).unwrap(), "First line.\n\nSecond line.");
    }

    #[test]
    fn test_br_breaks_paragraph() {
        assert_eq!(strip_markup("one<br/>two").unwrap(), "one\n\ntwo");
    }

    #[test]
    fn test_inline_tags_stripped_without_break() {
        assert_eq!(
            strip_markup("a <em>very</em> <span class=\"x\">quiet</span> road").unwrap(),
            "a very quiet road"
        );
    }

    #[test]
    fn test_script_and_style_content_dropped() {
        let body = "before<script>alert('x');</script>after<style>p { color: red }</style>";
        assert_eq!(strip_markup(body).unwrap(), "beforeafter");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            strip_markup("Fish &amp; Chips &mdash; 5&nbsp;coins").unwrap(),
            "Fish & Chips \u{2014} 5 coins"
        );
        assert_eq!(strip_markup("&#65;&#x42;").unwrap(), "AB");
    }

    #[test]
    fn test_unknown_entity_passes_through() {
        assert_eq!(strip_markup("&bogus; &x").unwrap(), "&bogus; &x");
    }

    #[test]
    fn test_whitespace_normalized() {
        let body = "<p>  spaced \t out  </p><p>   </p><p>next</p>";
        assert_eq!(strip_markup(body).unwrap(), "spaced out\n\nnext");
    }

    #[test]
    fn test_unterminated_tag_is_parse_error() {
        assert!(matches!(
            strip_markup("broken <p oops"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            strip_markup("<script>never closed"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_glyph_count_ignores_whitespace() {
        assert_eq!(glyph_count("a b\nc\t"), 3);
        assert_eq!(glyph_count("   "), 0);
    }
}

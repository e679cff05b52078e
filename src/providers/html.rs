use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    hidden_blocks: Vec<Regex>,
    breaks: Regex,
    tags: Regex,
    numeric_entity: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        hidden_blocks: vec![
            Regex::new(r"(?is)<!--.*?-->").expect("Invalid comment regex"),
            Regex::new(r"(?is)<script\b.*?</script\s*>").expect("Invalid script regex"),
            Regex::new(r"(?is)<style\b.*?</style\s*>").expect("Invalid style regex"),
            Regex::new(r"(?is)<noscript\b.*?</noscript\s*>").expect("Invalid noscript regex"),
            Regex::new(r"(?is)<template\b.*?</template\s*>").expect("Invalid template regex"),
            Regex::new(r"(?is)<head\b.*?</head\s*>").expect("Invalid head regex"),
        ],
        breaks: Regex::new(r"(?i)</?(p|div|br|li|tr|td|th|h[1-6]|section|article|header|footer)\b[^>]*>")
            .expect("Invalid block regex"),
        tags: Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"),
        numeric_entity: Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("Invalid entity regex"),
        whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
    })
}

fn decode_entities(text: &str) -> String {
    let numeric = patterns().numeric_entity.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Visible text of an HTML page, words separated by single spaces
///
/// Scripts, styles, comments and the document head are dropped; block
/// elements become word breaks so adjacent paragraphs don't run together.
pub fn extract_visible_text(html: &str) -> String {
    let p = patterns();
    let mut text = html.to_string();
    for block in &p.hidden_blocks {
        text = block.replace_all(&text, " ").into_owned();
    }
    let text = p.breaks.replace_all(&text, " ");
    let text = p.tags.replace_all(&text, "");
    let text = decode_entities(&text);
    p.whitespace.replace_all(&text, " ").trim().to_string()
}

use scraper::{ElementRef, Selector};

// Tags that visually break the line; rewritten to newlines before the
// remaining markup is stripped. Only attribute-less forms appear inside the
// content containers this runs on.
const NEWLINE_TAGS: [&str; 16] = [
    "<br>", "</li>", "<p>", "</p>", "<h1>", "</h1>", "<h2>", "</h2>", "<h3>", "</h3>", "<h4>",
    "</h4>", "<h5>", "</h5>", "<h6>", "</h6>",
];

/// Flatten a content container into display-ready plain text.
///
/// Walks the container's child blocks: empty blocks contribute nothing,
/// obfuscated `data-cfemail` addresses are decoded, block-level tags become
/// newlines, list items become "- "-prefixed lines, every other tag is
/// dropped keeping its text. Malformed markup degrades to partial or empty
/// text; this never fails.
pub fn extract_text(root: ElementRef<'_>) -> String {
    let email_selector = Selector::parse("a[data-cfemail]").unwrap();

    let mut out = String::new();
    for node in root.children() {
        let Some(block) = ElementRef::wrap(node) else {
            continue;
        };
        // Skip blocks that render no text at all
        if block.text().collect::<String>().is_empty() {
            continue;
        }
        let mut html = block.html();
        if html.contains("data-cfemail=") {
            let encoded = block
                .select(&email_selector)
                .next()
                .and_then(|a| a.value().attr("data-cfemail"));
            if let Some(email) = encoded.and_then(decode_cfemail) {
                out.push_str(&email);
                out.push('\n');
            }
            continue;
        }
        for tag in NEWLINE_TAGS {
            html = html.replace(tag, "\n");
        }
        html = html.replace("<li>", "\n- ");
        strip_tags_into(&html, &mut out);
        out.push('\n');
    }

    // Cleaning up the text
    while out.contains("\n\n") {
        out = out.replace("\n\n", "\n");
    }
    out = out.replace("-\n", "- ");
    html_escape::decode_html_entities(&out).trim().to_string()
}

/// Decode a `data-cfemail` attribute value: the first hex byte is the XOR
/// key, each following byte pair XORs back to one character. Anything that
/// does not decode cleanly yields `None`.
pub fn decode_cfemail(fp: &str) -> Option<String> {
    if !fp.is_ascii() || fp.len() < 4 || fp.len() % 2 != 0 {
        return None;
    }
    let key = u8::from_str_radix(&fp[..2], 16).ok()?;
    let mut email = String::with_capacity(fp.len() / 2 - 1);
    for i in (2..fp.len()).step_by(2) {
        let byte = u8::from_str_radix(&fp[i..i + 2], 16).ok()?;
        email.push(char::from(byte ^ key));
    }
    Some(email)
}

// Keep only the text outside of <...> tag markers.
fn strip_tags_into(html: &str, out: &mut String) {
    let mut write = true;
    for ch in html.chars() {
        if write && ch == '<' {
            write = false;
        }
        if !write && ch == '>' {
            write = true;
            continue;
        }
        if write {
            out.push(ch);
        }
    }
}

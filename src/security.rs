/// Entities produced by [`escape_html`]. An ampersand that already starts one
/// of these is left alone, so escaping an escaped string is a no-op.
const ENTITIES: [&str; 6] = ["&amp;", "&lt;", "&gt;", "&#39;", "&#34;", "&quot;"];

/// Escapes `<`, `>`, `&`, `'` and `"` so stored text is inert when rendered as HTML.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for (idx, ch) in input.char_indices() {
        match ch {
            '&' => {
                let rest = &input[idx..];
                if ENTITIES.iter().any(|entity| rest.starts_with(entity)) {
                    escaped.push('&');
                } else {
                    escaped.push_str("&amp;");
                }
            }
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Trims surrounding whitespace, then escapes.
pub fn sanitize_input(input: &str) -> String {
    escape_html(input.trim())
}

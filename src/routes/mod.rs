/**
 * Routes Module
 * API route handlers
 */

pub mod blog;
pub mod chat;
pub mod contact;
pub mod diagnostics;
pub mod health;
pub mod projects;
pub mod quotes;

/// Escape text destined for an HTML page shell. Stored `conteudo_html`
/// is inserted raw; everything else goes through here.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b x="1">&'"#),
            "&lt;b x=&quot;1&quot;&gt;&amp;&#39;"
        );
        assert_eq!(escape_html("texto simples"), "texto simples");
    }
}

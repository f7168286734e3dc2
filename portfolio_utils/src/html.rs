//! Escaping of user supplied text that ends up inside HTML markup.

/// Replacements applied by [`escape_html`], in order.
///
/// `&` must stay first, otherwise the entities introduced by the later
/// replacements would be escaped again.
const REPLACEMENTS: [(char, &str); 6] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
];

/// Escapes the characters `& < > " ' /` so that `text` can be embedded into
/// HTML markup.
///
/// This function is not idempotent: escaping an already escaped string escapes
/// the ampersands of the existing entities again. Escape each value exactly
/// once, right before it is embedded into markup.
///
/// #### Example
/// ```rust
/// # use portfolio_utils::html::escape_html;
/// assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;&#x2F;b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(text.to_owned(), |text, &(from, to)| text.replace(from, to))
}

/// Converts line breaks (`\r\n`, `\r` or `\n`) into `<br>` tags.
///
/// Apply this after [`escape_html`], since the inserted tags would be escaped
/// otherwise.
pub fn nl2br(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>\n")
}

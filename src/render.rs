//! HTML rendering of conversation history
//!
//! Turns are rendered as chat bubbles inside a scrollable container; the
//! stylesheet lives in the page served at `/`.

use crate::providers::Role;
use crate::session::Turn;

/// Chat page served at `/`
pub const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Render turns as chat bubbles
///
/// User turns get the `user` bubble class, assistant turns the `bot` class.
/// System turns are not shown. Text is HTML-escaped and line breaks are kept.
///
/// # Examples
///
/// ```
/// use modechat::render::render_history;
/// use modechat::session::Turn;
///
/// let html = render_history(&[Turn::user("1 < 2?"), Turn::assistant("Yes.")]);
/// assert!(html.contains("<div class='bubble user'>1 &lt; 2?</div>"));
/// assert!(html.contains("<div class='bubble bot'>Yes.</div>"));
/// ```
pub fn render_history(turns: &[Turn]) -> String {
    let mut html = String::from("<div class='chat-container'>");
    for turn in turns {
        let class = match turn.role {
            Role::User => "user",
            Role::Assistant => "bot",
            Role::System => continue,
        };
        html.push_str("<div class='bubble ");
        html.push_str(class);
        html.push_str("'>");
        html.push_str(&escape_html(&turn.text).replace('\n', "<br>"));
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

/// Escape text for inclusion in HTML content or quoted attributes
pub fn escape_html(text: &str) -> String {
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

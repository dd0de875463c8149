//! Approximate HTML to JSX rewriting for project custom code.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SCRIPT_OR_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b([^>]*)>(.*?)</(?:script|style)\s*>").unwrap());
static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bclass=").unwrap());
static FOR_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfor=").unwrap());
static VOID_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(br|hr)\s*/?>").unwrap());
static VOID_WITH_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(img|input|meta|link)\b([^>]*?)\s*/?>").unwrap());

/// Rewrite an HTML snippet into JSX that renders the same markup.
///
/// This is a string rewrite, not a parser:
///
/// - `class=` and `for=` become `className=` and `htmlFor=`.
/// - `br`, `hr`, `img`, `input`, `meta` and `link` are self-closed.
/// - `<script>` and `<style>` become the `Script` and `Style` helpers with
///   their body passed as a string literal.
///
/// Nested or malformed markup is not repaired. Attribute values that contain
/// `class=` or `for=` are rewritten too, and `>` inside a void element's
/// attribute value ends the tag early.
#[must_use]
pub fn html_to_jsx(html: &str) -> String {
    // Script and style bodies are lifted first so the attribute rewrites
    // below never touch their contents.
    let mut bodies = Vec::new();
    let lifted = SCRIPT_OR_STYLE.replace_all(html, |caps: &Captures<'_>| {
        let component = if caps[1].eq_ignore_ascii_case("script") {
            "Script"
        } else {
            "Style"
        };
        let body = &caps[3];
        let placeholder = format!("\u{0}{}\u{0}", bodies.len());
        bodies.push(if body.trim().is_empty() {
            format!("<{component}{} />", &caps[2])
        } else {
            let literal = serde_json::to_string(body).unwrap_or_else(|_| "\"\"".to_owned());
            format!("<{component}{}>{{{literal}}}</{component}>", &caps[2])
        });
        placeholder
    });

    let out = CLASS_ATTR.replace_all(&lifted, "className=");
    let out = FOR_ATTR.replace_all(&out, "htmlFor=");
    let out = VOID_BARE.replace_all(&out, "<$1 />");
    let mut out = VOID_WITH_ATTRS
        .replace_all(&out, "<$1$2 />")
        .into_owned();

    for (index, body) in bodies.iter().enumerate() {
        out = out.replace(&format!("\u{0}{index}\u{0}"), body);
    }
    out
}

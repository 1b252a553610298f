//! HTML answer cleanup for make-it-real embeds.

const HTML_FENCE: &str = "```html";
const FENCE: &str = "```";

/// Extract the HTML document from an answer. A fenced ```` ```html ````
/// block wins; otherwise the trimmed answer is used as-is.
#[must_use]
pub fn preprocess_html(answer: &str) -> String {
    let Some(start) = answer.find(HTML_FENCE) else {
        return answer.trim().to_owned();
    };
    let body = &answer[start + HTML_FENCE.len()..];
    let body = match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim().to_owned()
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;

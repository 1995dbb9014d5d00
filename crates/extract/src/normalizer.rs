/// Strip the code-fence wrapping completion services like to put around
/// structured output, despite being told not to. The interior is left
/// untouched and no allocation happens; applying this twice is the same as
/// applying it once.
pub fn normalize(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // The opening fence may carry a language tag ("```json"). Drop the
        // tag line only when it actually looks like one, so a fence glued
        // straight onto the payload loses just the backticks.
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            _ => rest.strip_prefix("json").unwrap_or(rest),
        };
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim().chars().all(|c| c.is_ascii_alphanumeric())
}

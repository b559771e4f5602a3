//! Pull the JSON payload out of free-form model text.

/// Return the outermost JSON array or object in `raw`.
///
/// Whichever opener comes first decides the shape; the payload runs to the
/// last matching closer. Prose and code fences around it are ignored.
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find(['[', '{'])?;
    let closer = if raw[start..].starts_with('[') { ']' } else { '}' };
    let end = raw.rfind(closer)?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

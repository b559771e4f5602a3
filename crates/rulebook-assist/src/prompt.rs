//! Prompt text for grouping requests.

/// System prompt describing the grouping payload.
pub const SYSTEM_PROMPT: &str = "\
You split a single agent instruction document into focused rule files.

Answer with a JSON array and nothing else. Each element is an object:
  {\"name\": \"kebab-case-slug\",
   \"description\": \"one line, at least 5 characters\",
   \"headings\": [\"Exact heading text\", ...],
   \"directory\": \"optional/slug/path\",
   \"kind\": \"rule\" | \"skill\" | \"agent\" | \"command\"}

Rules:
- Every level-2 heading of the document belongs to exactly one element.
- Copy heading text exactly as written, without the leading #'s.
- List headings in the order their content should appear.
- Never rewrite, summarize or invent document content.
- Omit \"directory\" and \"kind\" unless the document clearly calls for them.";

/// Build the user message for a request.
pub fn user_message(document: &str, feedback: Option<&str>) -> String {
    let mut message = format!("<document>\n{}\n</document>", document.trim_end());
    if let Some(feedback) = feedback {
        message.push_str("\n\n");
        message.push_str(&feedback_message(feedback));
    }
    message
}

/// Explain why a previous answer was rejected.
pub fn feedback_message(error: &str) -> String {
    format!(
        "Your previous answer was rejected: {error}\n\
         Return a corrected JSON array that follows the required shape."
    )
}

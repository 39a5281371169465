//! Email subject/body rendering.
//!
//! Comment text is untrusted user input: it is HTML-escaped and truncated
//! before it is embedded in a message body.

/// Maximum preview length embedded in mention emails, in characters.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Inline style for the link button in notification emails.
const BUTTON_STYLE: &str = "display:inline-block;padding:10px 18px;background:#4f46e5;\
                            color:#ffffff;text-decoration:none;border-radius:6px";

/// Escape text for safe embedding in an HTML body.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Truncate text to [`PREVIEW_MAX_CHARS`] characters, appending an
/// ellipsis when anything was cut.
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    preview.push('…');
    preview
}

/// Render the mention notification email.
///
/// The preview is truncated first and escaped second, so the ellipsis
/// cannot be produced by cutting an entity in half.
pub fn mention_email(author_name: &str, comment_text: &str, link: &str) -> (String, String) {
    let subject = format!("{author_name} mentioned you");
    let preview = escape_html(&truncate_preview(comment_text));
    let body = format!(
        "<p><strong>{}</strong> mentioned you in a comment:</p>\n\
         <blockquote>{preview}</blockquote>\n\
         <p><a href=\"{link}\" style=\"{BUTTON_STYLE}\">View conversation</a></p>",
        escape_html(author_name)
    );
    (subject, body)
}

/// Render the task-assignment notification email.
pub fn assignment_email(task_title: &str, link: &str) -> (String, String) {
    let subject = format!("Task assigned: {task_title}");
    let body = format!(
        "<p>You were assigned the task <strong>{}</strong>.</p>\n\
         <p><a href=\"{link}\" style=\"{BUTTON_STYLE}\">Open task</a></p>",
        escape_html(task_title)
    );
    (subject, body)
}

/// Render the extension-request notification email sent to admins.
pub fn extension_email(requester_name: &str, task_title: &str, link: &str) -> (String, String) {
    let subject = format!("Extension requested for: {task_title}");
    let body = format!(
        "<p><strong>{}</strong> requested a deadline extension on <strong>{}</strong>.</p>\n\
         <p><a href=\"{link}\" style=\"{BUTTON_STYLE}\">Review request</a></p>",
        escape_html(requester_name),
        escape_html(task_title)
    );
    (subject, body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            escape_html(r#"<b>"bold" & 'loud'</b>"#),
            "&lt;b&gt;&quot;bold&quot; &amp; &#39;loud&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn short_text_is_not_truncated() {
        let text = "a".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(truncate_preview(&text), text);
    }

    #[test]
    fn long_text_truncates_with_ellipsis() {
        let text = "a".repeat(PREVIEW_MAX_CHARS + 50);
        let preview = truncate_preview(&text);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(PREVIEW_MAX_CHARS + 1);
        let preview = truncate_preview(&text);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn mention_email_embeds_escaped_preview_and_link() {
        let (subject, body) = mention_email("Jane Doe", "see <this> now", "https://app/tasks");
        assert_eq!(subject, "Jane Doe mentioned you");
        assert!(body.contains("see &lt;this&gt; now"));
        assert!(body.contains("https://app/tasks"));
        assert!(!body.contains("<this>"));
    }

    #[test]
    fn mention_email_truncates_long_comments() {
        let comment = "x".repeat(500);
        let (_, body) = mention_email("Jane", &comment, "https://app");
        assert!(body.contains('…'));
        assert!(!body.contains(&"x".repeat(201)));
    }

    #[test]
    fn assignment_email_names_the_task() {
        let (subject, body) = assignment_email("Quarterly report", "https://app/tasks");
        assert!(subject.contains("Quarterly report"));
        assert!(body.contains("Quarterly report"));
    }

    #[test]
    fn extension_email_names_requester_and_task() {
        let (subject, body) = extension_email("Bob", "Launch prep", "https://app");
        assert!(subject.contains("Launch prep"));
        assert!(body.contains("Bob"));
    }
}

use anyhow::{Result, anyhow};
use log::warn;
use serde_json::Value;

use crate::domain::email::{EmailBody, EmailDetails, EmailId, EmailSummary};

/// Normalises any known list response into summaries. The list lives under
/// `messages`, else `emails`, else the payload is the list itself; anything
/// else (e.g. `{"success": true}`) means an empty list. Entries that do not
/// decode are skipped.
pub fn decode_list_response(value: Value) -> Vec<EmailSummary> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => ["messages", "emails"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<EmailSummary>(item) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Skipping malformed list entry: {e}");
                None
            }
        })
        .collect()
}

/// Reads a single-email payload. Some backends nest it under `email`.
/// Each field is read on its own so one odd value does not blank the rest.
pub fn decode_email_details(id: &EmailId, value: Value) -> Result<EmailDetails> {
    let inner = match value.get("email") {
        Some(nested) if nested.is_object() => nested.clone(),
        _ => value,
    };
    if !inner.is_object() {
        return Err(anyhow!("email {id}: expected a JSON object"));
    }
    let body = inner.get("body").unwrap_or(&Value::Null);
    Ok(EmailDetails {
        id: id.clone(),
        from: text_field(&inner, "from"),
        to: text_field(&inner, "to"),
        cc: text_field(&inner, "cc"),
        bcc: text_field(&inner, "bcc"),
        subject: text_field(&inner, "subject"),
        date: text_field(&inner, "date"),
        snippet: text_field(&inner, "snippet"),
        body: EmailBody {
            html: text_field(body, "html"),
            text: text_field(body, "text"),
        },
        raw: inner,
    })
}

/// A string field, or a list of strings joined with ", " (address headers
/// sometimes arrive that way). Blank and mistyped values read as absent.
fn text_field(obj: &Value, key: &str) -> Option<String> {
    let joined = match obj.get(key)? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => {
            warn!("Ignoring email field {key}: unexpected value {other}");
            return None;
        }
    };
    Some(joined).filter(|v| !v.trim().is_empty())
}

/// Renders an HTML body to wrapped plain text for the terminal.
pub fn html_to_text(html: &str, width: usize) -> String {
    html2text::config::plain()
        .string_from_read(html.as_bytes(), width.max(20))
        .unwrap_or_else(|_| html.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_field_wins() {
        let list = decode_list_response(json!({
            "success": true,
            "messages": [{"id": "m1", "threadId": "t1"}, {"id": "m2", "threadId": "t2"}],
            "emails": [{"id": "ignored"}]
        }));
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert_eq!(list[0].thread_id.as_deref(), Some("t1"));
    }

    #[test]
    fn emails_field_carries_headers() {
        let list = decode_list_response(json!({
            "success": true,
            "count": 1,
            "emails": [{
                "id": "e1", "threadId": "t9", "from": "Alice <a@x.io>",
                "subject": "Standup", "snippet": "notes inside", "labels": ["INBOX"]
            }]
        }));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].subject.as_deref(), Some("Standup"));
        assert_eq!(list[0].from.as_deref(), Some("Alice <a@x.io>"));
    }

    #[test]
    fn bare_list_is_accepted() {
        let list = decode_list_response(json!([{"id": "b1"}]));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].thread_id, None);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(decode_list_response(json!({"success": true})).is_empty());
        assert!(decode_list_response(json!({"messages": null})).is_empty());
        assert!(decode_list_response(json!("nope")).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped_not_the_whole_list() {
        let list = decode_list_response(json!({
            "messages": [
                {"id": "m1", "threadId": "t1"},
                {"threadId": "t2"},
                {"id": "m3", "subject": 42},
                {"id": "m4"}
            ]
        }));
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m4"]);
    }

    #[test]
    fn emails_used_when_messages_is_not_a_list() {
        let list = decode_list_response(json!({"messages": null, "emails": [{"id": "e1"}]}));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn details_from_flat_payload() {
        let d = decode_email_details(
            &"X".to_string(),
            json!({
                "success": true, "emailId": "X",
                "from": "bob@x.io", "to": "me@x.io", "subject": "Hi",
                "cc": "", "body": {"html": "<p>Hi</p>", "text": "Hi"}
            }),
        )
        .unwrap();
        assert_eq!(d.from.as_deref(), Some("bob@x.io"));
        assert_eq!(d.cc, None);
        assert_eq!(d.body.text.as_deref(), Some("Hi"));
        assert_eq!(d.raw["emailId"], "X");
    }

    #[test]
    fn details_nested_under_email() {
        let d = decode_email_details(
            &"Y".to_string(),
            json!({"success": true, "email": {"subject": "Nested", "date": "Mon, 1 Jan"}}),
        )
        .unwrap();
        assert_eq!(d.subject.as_deref(), Some("Nested"));
        assert_eq!(d.body, EmailBody::default());
    }

    #[test]
    fn one_odd_field_keeps_the_others() {
        let d = decode_email_details(
            &"X".to_string(),
            json!({
                "from": "bob@x.io", "subject": "Hi",
                "cc": ["a@x.io", "b@x.io"], "date": 1700000000,
                "body": {"html": null, "text": "hello"}
            }),
        )
        .unwrap();
        assert_eq!(d.from.as_deref(), Some("bob@x.io"));
        assert_eq!(d.subject.as_deref(), Some("Hi"));
        assert_eq!(d.cc.as_deref(), Some("a@x.io, b@x.io"));
        assert_eq!(d.date, None);
        assert_eq!(d.body.html, None);
        assert_eq!(d.body.text.as_deref(), Some("hello"));
    }

    #[test]
    fn details_must_be_an_object() {
        assert!(decode_email_details(&"Z".to_string(), json!([1, 2])).is_err());
    }

    #[test]
    fn html_is_flattened() {
        let text = html_to_text("<h1>Title</h1><p>Hello there</p>", 80);
        assert!(text.contains("Title"));
        assert!(text.contains("Hello there"));
        assert!(!text.contains("<p>"));
    }
}

//! Prompt templates for reply generation

/// System message sent with every chat completion
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant with a long-term memory. \
Use the facts you remember about the user when they are relevant, and never invent facts about them.";

/// Reply prompt.
///
/// Placeholders: {facts}, {search}, {conversation}
pub const REPLY_PROMPT: &str = r#"Things you remember about the user:
{facts}
{search}
Recent conversation:
{conversation}

Reply to the user's last message."#;

/// Shown in place of the fact list when nothing was retrieved
const NO_FACTS: &str = "(nothing yet)";

/// Render the reply prompt from retrieved facts, formatted search results
/// and the working-memory transcript.
pub fn build_reply_prompt(facts: &[String], search: &str, conversation: &str) -> String {
    let facts = if facts.is_empty() {
        NO_FACTS.to_string()
    } else {
        facts
            .iter()
            .map(|f| format!("- {f}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    fill_template(
        REPLY_PROMPT,
        &[
            ("{facts}", facts.as_str()),
            ("{search}", search),
            ("{conversation}", conversation),
        ],
    )
}

/// Substitute placeholders in a single left-to-right pass.
///
/// Inserted values are never scanned again, so user text that happens to
/// contain a placeholder is kept literally.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_facts() {
        let prompt = build_reply_prompt(
            &["User stated: my name is Ada".to_string(), "User preference: tea".to_string()],
            "",
            "user: hi",
        );
        assert!(prompt.contains("- User stated: my name is Ada\n- User preference: tea"));
        assert!(prompt.contains("Recent conversation:\nuser: hi"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_prompt_without_facts() {
        let prompt = build_reply_prompt(&[], "", "user: hi");
        assert!(prompt.contains("(nothing yet)"));
    }

    #[test]
    fn test_prompt_includes_search_block() {
        let prompt = build_reply_prompt(&[], "\n=== SEARCH RESULTS FOR: x ===\n", "user: x");
        assert!(prompt.contains("=== SEARCH RESULTS FOR: x ==="));
    }

    #[test]
    fn test_placeholders_in_facts_stay_literal() {
        let facts = vec![
            r#"User asked to remember: "{conversation}""#.to_string(),
            "User fact: braces {search} too".to_string(),
        ];
        let prompt = build_reply_prompt(&facts, "RESULTS", "user: private transcript");

        assert!(prompt.contains(r#"- User asked to remember: "{conversation}""#));
        assert!(prompt.contains("- User fact: braces {search} too"));
        assert_eq!(prompt.matches("user: private transcript").count(), 1);
        assert_eq!(prompt.matches("RESULTS").count(), 1);
    }

    #[test]
    fn test_placeholder_in_search_block_stays_literal() {
        let prompt = build_reply_prompt(&[], "snippet with {conversation}", "user: hi");
        assert!(prompt.contains("snippet with {conversation}"));
        assert_eq!(prompt.matches("user: hi").count(), 1);
    }
}

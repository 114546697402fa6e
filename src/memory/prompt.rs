//! Renders the current memory state into the text block embedded in the
//! model's system instructions.

use super::{CoreValue, MemoryError, MemoryStore};

/// Build the memory section of the system prompt.
///
/// Core facts render as `- key: value` bullets under a "Core memory:" header,
/// list values joined with ", ". User facts follow under a "User memory:"
/// header preceded by a blank line. Either section is omitted when empty;
/// both empty yields an empty string. Output is passed through verbatim —
/// no escaping.
pub fn build_memory_prompt(store: &MemoryStore) -> Result<String, MemoryError> {
    let core = store.load_core()?;
    let user = store.load_user()?;

    let mut lines: Vec<String> = Vec::new();

    if !core.is_empty() {
        lines.push("Core memory:".to_string());
        for (key, value) in &core {
            match value {
                CoreValue::Text(text) => lines.push(format!("- {}: {}", key, text)),
                CoreValue::List(items) => lines.push(format!("- {}: {}", key, items.join(", "))),
            }
        }
    }

    if !user.facts.is_empty() {
        lines.push("\nUser memory:".to_string());
        for fact in &user.facts {
            lines.push(format!("- {}", fact));
        }
    }

    Ok(lines.join("\n"))
}

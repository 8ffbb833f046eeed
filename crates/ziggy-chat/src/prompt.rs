//! Prompt composition for the recommendation backends.
//!
//! Both the in-process backend and the recommendation service build the
//! model input here: system instruction, prior transcript, new message.

use std::fmt::Write;

use ziggy_core::{ConversationTurn, MenuItem};

const PERSONA: &str = "You are Ziggy, a friendly food recommendation assistant for a food \
delivery service. Your job is to help customers find the right dishes on our menu.";

const GUIDELINES: &str = "\
When making recommendations:
1. Take the customer's preferences, dietary restrictions, spice tolerance and budget into account
2. Only recommend items that are currently available
3. Consider ratings and popular choices
4. Explain briefly why each item suits the customer
5. Present recommendations clearly with item name, description, price and rating
6. Keep the tone conversational and friendly
7. If nothing matches the request well, suggest the closest alternatives and say why";

/// Render the available items as the menu section of the system prompt.
pub fn menu_context<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a MenuItem>,
{
    let mut out = String::new();
    for item in items.into_iter().filter(|item| item.availability) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "- {} (ID: {})", item.name, item.id);
        let _ = writeln!(out, "  Description: {}", item.description);
        let _ = writeln!(out, "  Category: {}", item.category);
        let _ = writeln!(out, "  Price: ${}", item.price);
        let _ = writeln!(out, "  Rating: {}/5", item.rating);
        let _ = writeln!(out, "  Spice Level: {}", item.spice_level);
        let _ = writeln!(out, "  Tags: {}", item.tags.join(", "));
        out.push('\n');
    }
    out
}

/// Full system instruction with the menu embedded.
pub fn system_prompt<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a MenuItem>,
{
    format!(
        "{}\n\nHere is our current menu:\n{}\n{}",
        PERSONA,
        menu_context(items),
        GUIDELINES
    )
}

/// Model input: system instruction, every prior turn in order, then the new user message.
pub fn compose_messages(
    system: String,
    history: &[ConversationTurn],
    message: &str,
) -> Vec<ConversationTurn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ConversationTurn::system(system));
    messages.extend(history.iter().cloned());
    messages.push(ConversationTurn::user(message));
    messages
}

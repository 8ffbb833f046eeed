//! Canned answers for frequently asked questions.
//!
//! Keys are already normalized (lowercase, no `?.!`, trimmed).

const FAQ_ENTRIES: &[(&str, &str)] = &[
    (
        "what is your name",
        "My name is Ziggy, your friendly assistant.",
    ),
    (
        "what services do you provide",
        "I can help you with food recommendations and general queries.",
    ),
    (
        "how can i track my order",
        "You can track your order by visiting the 'My Orders' section in your account.",
    ),
];

/// Exact lookup of a normalized question.
pub fn lookup(normalized: &str) -> Option<&'static str> {
    FAQ_ENTRIES
        .iter()
        .find(|(question, _)| *question == normalized)
        .map(|(_, answer)| *answer)
}

/// All known questions, in table order.
pub fn questions() -> impl Iterator<Item = &'static str> {
    FAQ_ENTRIES.iter().map(|(question, _)| *question)
}

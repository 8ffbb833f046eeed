//! Message normalization and intent classification.
//!
//! Classification is a strict priority chain: FAQ exact match, then the
//! recommendation keyword filters, then free-form generation.

use ziggy_core::MenuItem;

use crate::faq;

/// What kind of answer a message gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Canned answer from the FAQ table.
    Faq(&'static str),
    /// Rule-based menu search.
    MenuFilter(MenuFilter),
    /// Anything else goes to the recommendation backend.
    Generate,
}

/// Menu selection rule for recommendation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFilter {
    /// Low spice level and available.
    LowSpice,
    /// Tagged vegetarian and available.
    Vegetarian,
    /// Dessert or cake category. Availability is not checked.
    Dessert,
    /// Every available item.
    AllAvailable,
}

impl MenuFilter {
    /// Pick the filter for a normalized recommendation request.
    pub fn for_message(normalized: &str) -> Self {
        if normalized.contains("low spice") {
            MenuFilter::LowSpice
        } else if normalized.contains("vegetarian") {
            MenuFilter::Vegetarian
        } else if normalized.contains("dessert") || normalized.contains("sweet") {
            MenuFilter::Dessert
        } else {
            MenuFilter::AllAvailable
        }
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            MenuFilter::LowSpice => item.spice_level == "low" && item.availability,
            MenuFilter::Vegetarian => item.has_tag("vegetarian") && item.availability,
            MenuFilter::Dessert => {
                let category = item.category.to_lowercase();
                category == "desserts" || category == "cake"
            }
            MenuFilter::AllAvailable => item.availability,
        }
    }
}

/// Lowercase, drop `?`, `.` and `!`, and trim surrounding whitespace.
pub fn normalize(message: &str) -> String {
    message
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '?' | '.' | '!'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Classify an already-normalized message.
pub fn classify(normalized: &str) -> Intent {
    if let Some(answer) = faq::lookup(normalized) {
        return Intent::Faq(answer);
    }
    if normalized.contains("recommend") || normalized.contains("suggest") {
        return Intent::MenuFilter(MenuFilter::for_message(normalized));
    }
    Intent::Generate
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziggy_core::ItemId;

    fn item(category: &str, spice: &str, available: bool, tags: &[&str]) -> MenuItem {
        MenuItem {
            id: ItemId::Number(1),
            name: "Dish".to_string(),
            image: String::new(),
            price: 10.0,
            description: "Tasty".to_string(),
            category: category.to_string(),
            availability: available,
            spice_level: spice.to_string(),
            rating: 4.0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    // ---- normalize ----

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  What is YOUR name?! "), "what is your name");
        assert_eq!(normalize("Hello... world."), "hello world");
    }

    #[test]
    fn test_normalize_keeps_other_punctuation() {
        assert_eq!(normalize("Can't stop, won't stop"), "can't stop, won't stop");
    }

    #[test]
    fn test_normalize_only_punctuation_is_empty() {
        assert_eq!(normalize("?!."), "");
    }

    // ---- classify ----

    #[test]
    fn test_classify_faq() {
        let intent = classify(&normalize("How can I track my order?"));
        assert!(matches!(intent, Intent::Faq(a) if a.contains("My Orders")));
    }

    #[test]
    fn test_faq_needs_whole_message() {
        assert!(matches!(
            classify("what services do you provide"),
            Intent::Faq(_)
        ));
        assert_eq!(
            classify("what services do you provide and can you suggest food"),
            Intent::MenuFilter(MenuFilter::AllAvailable)
        );
    }

    #[test]
    fn test_classify_recommend_and_suggest() {
        assert_eq!(
            classify("can you recommend something"),
            Intent::MenuFilter(MenuFilter::AllAvailable)
        );
        assert_eq!(
            classify("suggest a vegetarian dish"),
            Intent::MenuFilter(MenuFilter::Vegetarian)
        );
    }

    #[test]
    fn test_classify_generate_fallback() {
        assert_eq!(classify("i am hungry"), Intent::Generate);
        assert_eq!(classify(""), Intent::Generate);
    }

    // ---- filter selection order ----

    #[test]
    fn test_filter_priority_order() {
        assert_eq!(
            MenuFilter::for_message("recommend low spice vegetarian dessert"),
            MenuFilter::LowSpice
        );
        assert_eq!(
            MenuFilter::for_message("recommend vegetarian dessert"),
            MenuFilter::Vegetarian
        );
        assert_eq!(
            MenuFilter::for_message("recommend something sweet"),
            MenuFilter::Dessert
        );
        assert_eq!(
            MenuFilter::for_message("recommend a dessert"),
            MenuFilter::Dessert
        );
        assert_eq!(
            MenuFilter::for_message("recommend anything"),
            MenuFilter::AllAvailable
        );
    }

    // ---- filter predicates ----

    #[test]
    fn test_low_spice_requires_availability() {
        assert!(MenuFilter::LowSpice.matches(&item("Curry", "low", true, &[])));
        assert!(!MenuFilter::LowSpice.matches(&item("Curry", "low", false, &[])));
        assert!(!MenuFilter::LowSpice.matches(&item("Curry", "Low", true, &[])));
        assert!(!MenuFilter::LowSpice.matches(&item("Curry", "high", true, &[])));
    }

    #[test]
    fn test_vegetarian_requires_tag_and_availability() {
        assert!(MenuFilter::Vegetarian.matches(&item("Curry", "low", true, &["vegetarian"])));
        assert!(!MenuFilter::Vegetarian.matches(&item("Curry", "low", false, &["vegetarian"])));
        assert!(!MenuFilter::Vegetarian.matches(&item("Curry", "low", true, &["vegan"])));
    }

    #[test]
    fn test_dessert_ignores_availability() {
        assert!(MenuFilter::Dessert.matches(&item("Desserts", "none", false, &[])));
        assert!(MenuFilter::Dessert.matches(&item("CAKE", "none", true, &[])));
        assert!(!MenuFilter::Dessert.matches(&item("Dessert", "none", true, &[])));
        assert!(!MenuFilter::Dessert.matches(&item("Rolls", "none", true, &["sweet"])));
    }

    #[test]
    fn test_all_available() {
        assert!(MenuFilter::AllAvailable.matches(&item("Rolls", "low", true, &[])));
        assert!(!MenuFilter::AllAvailable.matches(&item("Rolls", "low", false, &[])));
    }
}

//! Rule-based recommendations composed straight from the catalog.

use ziggy_core::{Catalog, MenuItem};

use crate::intent::MenuFilter;

/// Heading placed above a non-empty recommendation list.
pub const RECOMMENDATIONS_HEADER: &str = "Here are some recommendations:";

/// Reply when a filter matches nothing.
pub const NO_MATCHES_REPLY: &str =
    "I couldn't find any items matching your request. Please try a different query.";

/// Items selected by `filter`, in catalog order.
pub fn select<'a>(catalog: &'a Catalog, filter: MenuFilter) -> Vec<&'a MenuItem> {
    catalog
        .items()
        .iter()
        .filter(|item| filter.matches(item))
        .collect()
}

/// One line per item: `name: description (Price: $p, Rating: r/5)`.
pub fn format_item(item: &MenuItem) -> String {
    format!(
        "{}: {} (Price: ${}, Rating: {}/5)",
        item.name, item.description, item.price, item.rating
    )
}

/// Build the full reply for a recommendation request.
pub fn compose(catalog: &Catalog, filter: MenuFilter) -> String {
    let items = select(catalog, filter);
    if items.is_empty() {
        return NO_MATCHES_REPLY.to_string();
    }

    let lines = items
        .iter()
        .map(|item| format_item(item))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", RECOMMENDATIONS_HEADER, lines)
}

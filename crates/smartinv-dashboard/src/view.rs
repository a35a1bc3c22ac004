//! Derived views over the dashboard state.

use smartinv_types::Item;

/// Items whose name contains `term`, ignoring case.
///
/// A blank term matches everything. Order is preserved.
pub fn filter_items<'a>(items: &'a [Item], term: &str) -> Vec<&'a Item> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

/// The item list as rendered for a search term.
#[derive(Debug, Clone)]
pub struct ItemListView<'a> {
    /// Rows to show, in list order.
    pub rows: Vec<&'a Item>,
    /// Size of the unfiltered list.
    pub total: usize,
    pub selected_item_id: Option<&'a str>,
}

impl<'a> ItemListView<'a> {
    pub fn new(items: &'a [Item], term: &str, selected_item_id: Option<&'a str>) -> Self {
        Self {
            rows: filter_items(items, term),
            total: items.len(),
            selected_item_id,
        }
    }

    /// Whether the "no items" placeholder replaces the list.
    pub fn show_empty_state(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_selected(&self, item: &Item) -> bool {
        self.selected_item_id == Some(item.id.as_str())
    }
}

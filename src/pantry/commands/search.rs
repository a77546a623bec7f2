use crate::model::InventoryItem;

/// Items whose name contains `query`, ignoring case. An empty query matches
/// everything. Order is preserved.
pub fn filter<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    let query = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<InventoryItem> {
        names
            .iter()
            .map(|n| InventoryItem {
                name: n.to_string(),
                quantity: 1,
                image_url: String::new(),
            })
            .collect()
    }

    fn names<'a>(found: &[&'a InventoryItem]) -> Vec<&'a str> {
        found.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        let list = items(&["banana", "apple", "Canned Beans"]);
        assert_eq!(names(&filter(&list, "AN")), vec!["banana", "Canned Beans"]);
    }

    #[test]
    fn empty_query_matches_everything() {
        let list = items(&["banana", "apple"]);
        assert_eq!(filter(&list, "").len(), 2);
    }

    #[test]
    fn no_match_yields_nothing() {
        let list = items(&["banana"]);
        assert!(filter(&list, "kiwi").is_empty());
    }
}

//! # Comparison Set
//!
//! Transient, size-capped selection of tools a user is evaluating side by
//! side. Never persisted. Membership is by id equality, never by value.

use crate::model::Tool;

/// Maximum number of tools that can be compared at once
pub const COMPARE_LIMIT: usize = 3;

/// Toggle a tool in the comparison set.
///
/// Removes on id match, silently rejects at capacity, appends otherwise.
/// The cap is a soft limit: hitting it is not an error, the input comes
/// back unchanged.
pub fn toggle(current: &[Tool], tool: &Tool) -> Vec<Tool> {
    if current.iter().any(|t| t.id == tool.id) {
        return current.iter().filter(|t| t.id != tool.id).cloned().collect();
    }
    if current.len() >= COMPARE_LIMIT {
        return current.to_vec();
    }
    let mut next = current.to_vec();
    next.push(tool.clone());
    next
}

/// Empty the comparison set
pub fn clear() -> Vec<Tool> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Platform};

    fn tool(id: &str) -> Tool {
        Tool {
            id: id.to_string(),
            name: format!("tool-{id}"),
            category: Category::Media,
            description: String::new(),
            features: vec![],
            pricing_model: "Free".to_string(),
            official_link: "https://example.org/".to_string(),
            offline_available: false,
            platforms: vec![Platform::Web],
            pros: vec![],
            cons: vec![],
            rating: 4.0,
            popular: false,
            paid_alternative_to: None,
            image_url: None,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let set = toggle(&[], &tool("a"));
        assert_eq!(set.len(), 1);
        let set = toggle(&set, &tool("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_is_its_own_inverse_below_cap() {
        let start = vec![tool("a"), tool("b")];
        let once = toggle(&start, &tool("c"));
        let twice = toggle(&once, &tool("c"));
        assert_eq!(twice, start);
    }

    #[test]
    fn test_cap_rejects_fourth_tool_unchanged() {
        let three = vec![tool("gimp"), tool("vscode"), tool("libreoffice")];
        let after = toggle(&three, &tool("davinci"));
        assert_eq!(after, three);
    }

    #[test]
    fn test_never_exceeds_limit() {
        let mut set = Vec::new();
        for i in 0..10 {
            set = toggle(&set, &tool(&i.to_string()));
            assert!(set.len() <= COMPARE_LIMIT);
        }
    }

    #[test]
    fn test_removal_preserves_order_of_remaining() {
        let set = vec![tool("a"), tool("b"), tool("c")];
        let after = toggle(&set, &tool("b"));
        let ids: Vec<&str> = after.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_membership_is_by_id_not_value() {
        let mut renamed = tool("a");
        renamed.name = "something else".to_string();
        let set = toggle(&[tool("a")], &renamed);
        assert!(set.is_empty(), "same id must toggle off despite differing fields");
    }

    #[test]
    fn test_clear() {
        assert!(clear().is_empty());
    }
}

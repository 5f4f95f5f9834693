//! # Query Engine
//!
//! Pure filter/sort pipeline over the catalog. The presentation layer calls
//! [`run`] on every relevant state change; there is no hidden subscription
//! machinery and no side effects.

use crate::model::{Category, Platform, Tool};
use serde::{Deserialize, Serialize};

/// Sort mode for query results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Popular entries first, input order preserved within each partition
    #[default]
    Popular,
    /// Rating descending, ties keep input order
    Rating,
}

/// The active combination of search text, filters, and sort mode.
///
/// `None` for category/platform means the "All" sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub search: String,
    pub category: Option<Category>,
    pub platform: Option<Platform>,
    pub offline_only: bool,
    pub sort: SortBy,
}

/// Evaluate the query: AND-combined predicates, then a stable sort.
pub fn run(tools: &[Tool], spec: &QuerySpec) -> Vec<Tool> {
    let needle = spec.search.to_lowercase();

    let mut results: Vec<Tool> = tools
        .iter()
        .filter(|t| matches_search(t, &needle))
        .filter(|t| spec.category.map_or(true, |c| t.category == c))
        .filter(|t| spec.platform.map_or(true, |p| t.platforms.contains(&p)))
        .filter(|t| !spec.offline_only || t.offline_available)
        .cloned()
        .collect();

    // sort_by is stable, which both modes rely on: Popular is a partition,
    // not a full ordering, and equal ratings must keep their input order.
    match spec.sort {
        SortBy::Rating => {
            results.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal))
        }
        SortBy::Popular => results.sort_by_key(|t| !t.popular),
    }

    results
}

/// Case-insensitive substring match over name, description, and the
/// paid-alternative label. An empty needle matches everything.
fn matches_search(tool: &Tool, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    tool.name.to_lowercase().contains(needle)
        || tool.description.to_lowercase().contains(needle)
        || tool
            .paid_alternative_to
            .as_ref()
            .is_some_and(|alt| alt.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: &str, name: &str, rating: f64, popular: bool) -> Tool {
        Tool {
            id: id.to_string(),
            name: name.to_string(),
            category: Category::Design,
            description: String::new(),
            features: vec![],
            pricing_model: "Free".to_string(),
            official_link: "https://example.org/".to_string(),
            offline_available: true,
            platforms: vec![Platform::Linux],
            pros: vec![],
            cons: vec![],
            rating,
            popular,
            paid_alternative_to: None,
            image_url: None,
        }
    }

    fn scenario_catalog() -> Vec<Tool> {
        let mut gimp = tool("1", "GIMP", 4.5, true);
        gimp.paid_alternative_to = Some("Adobe Photoshop".to_string());
        let mut vscode = tool("2", "VSCode", 4.9, true);
        vscode.category = Category::Coding;
        let mut freecad = tool("3", "FreeCAD", 4.0, false);
        freecad.category = Category::Engineering;
        vec![gimp, vscode, freecad]
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        let tools = scenario_catalog();
        let out = run(&tools, &QuerySpec::default());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_popular_sort_partitions_and_preserves_order() {
        let tools = scenario_catalog();
        let out = run(&tools, &QuerySpec::default());
        let names: Vec<&str> = out.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["GIMP", "VSCode", "FreeCAD"]);
    }

    #[test]
    fn test_rating_sort_is_descending() {
        let tools = scenario_catalog();
        let spec = QuerySpec {
            sort: SortBy::Rating,
            ..Default::default()
        };
        let out = run(&tools, &spec);
        let names: Vec<&str> = out.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["VSCode", "GIMP", "FreeCAD"]);
        for pair in out.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }

    #[test]
    fn test_rating_ties_keep_input_order() {
        let tools = vec![
            tool("a", "A", 4.0, false),
            tool("b", "B", 4.0, false),
            tool("c", "C", 4.5, false),
            tool("d", "D", 4.0, false),
        ];
        let spec = QuerySpec {
            sort: SortBy::Rating,
            ..Default::default()
        };
        let out = run(&tools, &spec);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b", "d"]);
    }

    #[test]
    fn test_search_matches_paid_alternative() {
        let tools = scenario_catalog();
        let spec = QuerySpec {
            search: "photoshop".to_string(),
            ..Default::default()
        };
        let out = run(&tools, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "GIMP");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let tools = scenario_catalog();
        let spec = QuerySpec {
            search: "gImP".to_string(),
            ..Default::default()
        };
        assert_eq!(run(&tools, &spec).len(), 1);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let tools = scenario_catalog();
        let spec = QuerySpec {
            category: Some(Category::Coding),
            ..Default::default()
        };
        let out = run(&tools, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "VSCode");
    }

    #[test]
    fn test_platform_filter_checks_containment() {
        let mut tools = scenario_catalog();
        tools[1].platforms = vec![Platform::Web];
        let spec = QuerySpec {
            platform: Some(Platform::Linux),
            ..Default::default()
        };
        let out = run(&tools, &spec);
        assert!(out.iter().all(|t| t.platforms.contains(&Platform::Linux)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_offline_only_filter() {
        let mut tools = scenario_catalog();
        tools[2].offline_available = false;
        let spec = QuerySpec {
            offline_only: true,
            ..Default::default()
        };
        let out = run(&tools, &spec);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.offline_available));
    }

    #[test]
    fn test_predicates_are_and_combined() {
        let tools = scenario_catalog();
        let spec = QuerySpec {
            search: "gimp".to_string(),
            category: Some(Category::Coding),
            ..Default::default()
        };
        assert!(run(&tools, &spec).is_empty());
    }

    #[test]
    fn test_query_is_idempotent_and_does_not_mutate_input() {
        let tools = scenario_catalog();
        let spec = QuerySpec::default();
        let first = run(&tools, &spec);
        let second = run(&tools, &spec);
        assert_eq!(first, second);
        assert_eq!(tools, scenario_catalog());
    }
}

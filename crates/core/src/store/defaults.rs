//! Built-in default catalog bundled at compile time.
//!
//! Used whenever a persisted collection is absent or malformed. The JSON is
//! validated by the tests below, so the `expect` calls cannot fire at
//! runtime on a shipped build.

use crate::model::{StarterPack, Tool};

const DEFAULT_TOOLS: &str = include_str!("defaults/tools.json");
const DEFAULT_PACKS: &str = include_str!("defaults/packs.json");

/// The built-in tool catalog
pub fn default_tools() -> Vec<Tool> {
    serde_json::from_str(DEFAULT_TOOLS).expect("bundled tools.json is valid")
}

/// The built-in starter packs
pub fn default_packs() -> Vec<StarterPack> {
    serde_json::from_str(DEFAULT_PACKS).expect("bundled packs.json is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tools_parse_and_validate() {
        let tools = default_tools();
        assert_eq!(tools.len(), 6);
        for tool in &tools {
            tool.validate()
                .unwrap_or_else(|e| panic!("default tool '{}' invalid: {e}", tool.name));
        }
    }

    #[test]
    fn test_default_tool_ids_unique() {
        let tools = default_tools();
        let mut ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), tools.len());
    }

    #[test]
    fn test_default_packs_reference_default_tools() {
        let tools = default_tools();
        let packs = default_packs();
        assert_eq!(packs.len(), 3);
        for pack in &packs {
            for id in &pack.tool_ids {
                assert!(
                    tools.iter().any(|t| &t.id == id),
                    "pack '{}' references unknown tool id '{}'",
                    pack.title,
                    id
                );
            }
        }
    }
}

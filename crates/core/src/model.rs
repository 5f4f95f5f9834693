//! # Catalog Model
//!
//! Core record types for the ZeroCost catalog: tools, starter packs, and the
//! closed category/platform vocabularies. Wire names are camelCase to stay
//! shape-compatible with previously persisted catalogs.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Closed set of catalog categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Design,
    Coding,
    Study,
    Media,
    Productivity,
    Engineering,
    Security,
}

impl Category {
    /// All categories, in display order
    pub fn all() -> Vec<Category> {
        vec![
            Category::Design,
            Category::Coding,
            Category::Study,
            Category::Media,
            Category::Productivity,
            Category::Engineering,
            Category::Security,
        ]
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Design => "Design",
            Category::Coding => "Coding",
            Category::Study => "Study",
            Category::Media => "Media",
            Category::Productivity => "Productivity",
            Category::Engineering => "Engineering",
            Category::Security => "Security",
        }
    }
}

/// Closed set of supported platforms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    Web,
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Platform {
    /// All platforms, in display order
    pub fn all() -> Vec<Platform> {
        vec![
            Platform::Web,
            Platform::Windows,
            Platform::MacOs,
            Platform::Linux,
            Platform::Android,
            Platform::Ios,
        ]
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Web => "Web",
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }
}

/// A catalog entry: one free/open-source tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Stable identifier, assigned at creation and never reassigned
    pub id: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub pricing_model: String,
    pub official_link: String,
    pub offline_available: bool,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// Domain convention 0.0-5.0
    pub rating: f64,
    pub popular: bool,
    /// Commercial product this tool substitutes for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_alternative_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Tool {
    /// Validate the record before it may reach the store.
    ///
    /// Rejections here are boundary errors (bad form input), never a
    /// persisted state: a tool that fails validation is dropped whole.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Tool name is required");
        }
        if reqwest::Url::parse(&self.official_link).is_err() {
            bail!("Official link is not a valid URL: '{}'", self.official_link);
        }
        if self.platforms.is_empty() {
            bail!("Tool must list at least one platform");
        }
        if !(0.0..=5.0).contains(&self.rating) {
            bail!("Rating {} outside 0.0-5.0", self.rating);
        }
        Ok(())
    }
}

/// A curated bundle of tool references for a persona
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StarterPack {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Persona label, free text
    pub role: String,
    /// Ordered Tool.id references; dangling entries are tolerated
    pub tool_ids: Vec<String>,
    /// Display glyph
    pub icon: String,
}

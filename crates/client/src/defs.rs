//! Typed definition records.
//!
//! A small, representative slice of the vendor's definition schema: enough
//! for consumers to work with names, descriptions and icons without poking
//! at raw JSON. Absent fields are `Option`s (or an empty
//! [`DisplayProperties`]), never a reason to fail deserialization, since
//! vendor records omit keys freely.

use serde::Deserialize;

/// The `displayProperties` block most definitions carry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayProperties {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Relative icon path; only meaningful when `has_icon` is true.
    pub icon: Option<String>,
    pub has_icon: Option<bool>,
    pub high_res_icon: Option<String>,
}

impl DisplayProperties {
    /// Icon path, honoring the `hasIcon` flag.
    pub fn icon_path(&self) -> Option<&str> {
        match self.has_icon {
            Some(true) => self.icon.as_deref(),
            _ => None,
        }
    }
}

/// A row of `DestinyStatDefinition`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatDefinition {
    pub display_properties: DisplayProperties,
    pub aggregation_type: Option<i64>,
    pub stat_category: Option<i64>,
    pub interpolate: Option<bool>,
    pub hash: Option<u32>,
    pub index: Option<i64>,
}

/// A row of `DestinyInventoryItemDefinition` (the fields item mappers read).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemDefinition {
    pub display_properties: DisplayProperties,
    pub item_type_display_name: Option<String>,
    pub flavor_text: Option<String>,
    pub screenshot: Option<String>,
    pub inventory: Option<ItemInventoryBlock>,
    /// Foreign hash into `DestinyLoreDefinition`; absent for most items.
    pub lore_hash: Option<u32>,
    pub hash: Option<u32>,
    pub index: Option<i64>,
}

/// The `inventory` sub-block of an item definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemInventoryBlock {
    pub tier_type_name: Option<String>,
    pub max_stack_size: Option<i64>,
    pub bucket_type_hash: Option<u32>,
}

/// A row of `DestinyLoreDefinition`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoreDefinition {
    pub display_properties: DisplayProperties,
    pub subtitle: Option<String>,
    pub hash: Option<u32>,
    pub index: Option<i64>,
}

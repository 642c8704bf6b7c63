// src/roster/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical roster categories a section label is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Pre Events")]
    PreEvents,
    #[serde(rename = "Fun Events")]
    FunEvents,
    #[serde(rename = "Color & Craft Carnival")]
    ColorAndCraftCarnival,
    #[serde(rename = "Food Court")]
    FoodCourt,
    Decoration,
    Literary,
    Technical,
    Cultural,
    Core,
    Operations,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::PreEvents,
        Category::FunEvents,
        Category::ColorAndCraftCarnival,
        Category::FoodCourt,
        Category::Decoration,
        Category::Literary,
        Category::Technical,
        Category::Cultural,
        Category::Core,
        Category::Operations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::PreEvents => "Pre Events",
            Category::FunEvents => "Fun Events",
            Category::ColorAndCraftCarnival => "Color & Craft Carnival",
            Category::FoodCourt => "Food Court",
            Category::Decoration => "Decoration",
            Category::Literary => "Literary",
            Category::Technical => "Technical",
            Category::Cultural => "Cultural",
            Category::Core => "Core",
            Category::Operations => "Operations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social profile links. Never filled by extraction; serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dribbble: Option<String>,
}

/// One person on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub role: String,
    pub category: Category,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub links: Links,
}

impl MemberRecord {
    pub fn new(name: impl Into<String>, role: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            category,
            image: String::new(),
            links: Links::default(),
        }
    }
}

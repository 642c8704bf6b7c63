// src/roster/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::Category;

static TRAILING_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d{8,})$").expect("trailing phone pattern should compile"));

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a free-form section label onto one of the canonical categories.
///
/// Matching is by lower-cased substring in a fixed priority order, so
/// "Fun Events Coordinator" is a fun event and not core staff.
pub fn normalize_category(section_label: &str) -> Category {
    let sec = collapse_whitespace(&section_label.to_lowercase());

    if sec.contains("pre events") {
        Category::PreEvents
    } else if sec.contains("fun events") {
        Category::FunEvents
    } else if sec.contains("color") && sec.contains("craft") {
        Category::ColorAndCraftCarnival
    } else if sec.contains("food court") {
        Category::FoodCourt
    } else if sec.contains("decoration") {
        Category::Decoration
    } else if sec.contains("literary") {
        Category::Literary
    } else if sec.contains("technical") {
        Category::Technical
    } else if sec.contains("cultural") {
        Category::Cultural
    } else if sec.contains("student union") || sec.contains("coordinator") {
        Category::Core
    } else {
        Category::Operations
    }
}

/// Keep only the ASCII digits of `value`.
pub fn clean_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Split `"John Smith 9876543210"` into name and trailing phone digits.
/// Text without a trailing run of 8+ digits comes back whole with an empty phone.
pub fn split_name_phone(text: &str) -> (String, String) {
    let compact = collapse_whitespace(text);
    match TRAILING_PHONE.captures(&compact) {
        Some(caps) => (caps[1].trim().to_string(), clean_phone(&caps[2])),
        None => (compact, String::new()),
    }
}

/// `"<role> (<phone>)"`, or just the role when there is no phone.
pub fn with_phone(role: String, phone: &str) -> String {
    if phone.is_empty() {
        role
    } else {
        format!("{} ({})", role, phone)
    }
}

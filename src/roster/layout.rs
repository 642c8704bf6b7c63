// src/roster/layout.rs
//
// Column identifiers and heading labels of the roster sheet.

pub const SERIAL: &str = "C";
pub const SECTION: &str = "D";
pub const OVERALL: &str = "E";
pub const EVENT: &str = "F";
pub const COORDINATOR: &str = "G";
pub const COORDINATOR_PHONE: &str = "H";
pub const SUB_COORDINATOR: &str = "I";
pub const SUB_COORDINATOR_PHONE: &str = "J";

/// Column F values that are table headings rather than event names.
static EVENT_HEADINGS: &[&str] = &["events", "event", "name"];

/// Column E values that are headings rather than a person.
static OVERALL_HEADINGS: &[&str] = &["overall coordinator", "events", "event"];

/// Column G values that are headings rather than a person.
static COORDINATOR_HEADINGS: &[&str] = &["coordinator", "designation"];

/// Column I values that mean "no sub coordinator".
static SUB_COORDINATOR_BLANKS: &[&str] = &["*", "-"];
static SUB_COORDINATOR_HEADINGS: &[&str] = &["sub coordinator", "overall coordinators"];

/// Sections laid out as a plain name / designation / phone table.
static SIMPLE_TABLE_SECTIONS: &[&str] = &[
    "student union",
    "kaushlam coordinator",
    "kaushalam coordinator",
];

fn is_one_of(value: &str, labels: &[&str]) -> bool {
    let lower = value.to_lowercase();
    labels.contains(&lower.as_str())
}

pub fn is_event_heading(value: &str) -> bool {
    is_one_of(value, EVENT_HEADINGS)
}

pub fn is_overall_heading(value: &str) -> bool {
    is_one_of(value, OVERALL_HEADINGS)
}

pub fn is_coordinator_heading(value: &str) -> bool {
    is_one_of(value.trim(), COORDINATOR_HEADINGS)
}

pub fn is_sub_coordinator_blank(value: &str) -> bool {
    SUB_COORDINATOR_BLANKS.contains(&value) || is_one_of(value, SUB_COORDINATOR_HEADINGS)
}

pub fn is_simple_table_section(section: &str) -> bool {
    is_one_of(section.trim(), SIMPLE_TABLE_SECTIONS)
}

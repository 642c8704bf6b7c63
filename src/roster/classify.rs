// src/roster/classify.rs

use tracing::trace;

use super::layout::{
    self, COORDINATOR, COORDINATOR_PHONE, EVENT, OVERALL, SECTION, SERIAL, SUB_COORDINATOR,
    SUB_COORDINATOR_PHONE,
};
use super::normalize::{clean_phone, normalize_category, split_name_phone, with_phone};
use super::types::MemberRecord;
use crate::sheet::Row;

/// What to do with the remaining rules after one has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    SkipRest,
}

/// A row pattern and the records it produces.
struct Rule {
    name: &'static str,
    applies: fn(&Classifier, &Row) -> bool,
    apply: fn(&mut Classifier, &Row) -> Flow,
}

/// Evaluated top to bottom for every row. More than one rule may fire.
static RULES: &[Rule] = &[
    Rule {
        name: "event-name",
        applies: names_an_event,
        apply: remember_event_name,
    },
    Rule {
        name: "section-header",
        applies: is_section_header,
        apply: open_section,
    },
    Rule {
        name: "simple-table",
        applies: is_simple_table_row,
        apply: emit_simple_entry,
    },
    Rule {
        name: "event-coordinators",
        applies: names_an_event,
        apply: emit_event_coordinators,
    },
    Rule {
        name: "continuation",
        applies: is_continuation_row,
        apply: emit_continuation,
    },
];

/// Running state of one pass over a sheet.
#[derive(Debug, Default)]
pub struct Classifier {
    current_section: Option<String>,
    last_event_name: Option<String>,
    records: Vec<MemberRecord>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    #[cfg(test)]
    fn last_event_name(&self) -> Option<&str> {
        self.last_event_name.as_deref()
    }

    #[cfg(test)]
    fn records(&self) -> &[MemberRecord] {
        &self.records
    }

    /// Run every rule against `row`, appending whatever records it yields.
    pub fn push_row(&mut self, row: &Row) {
        for rule in RULES {
            if !(rule.applies)(self, row) {
                continue;
            }
            trace!(rule = rule.name, "rule matched");
            if (rule.apply)(self, row) == Flow::SkipRest {
                break;
            }
        }
    }

    pub fn finish(self) -> Vec<MemberRecord> {
        self.records
    }

    /// The section in force for `row`: the running one, else the row's own.
    fn section<'a>(&'a self, row: &'a Row) -> Option<&'a str> {
        self.current_section
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| Some(row.get(SECTION)).filter(|s| !s.is_empty()))
    }

    fn emit_coordinators(&mut self, event: &str, row: &Row) {
        let category = normalize_category(self.section(row).unwrap_or("Operations"));

        let coordinator = row.get(COORDINATOR);
        if !coordinator.is_empty() && !layout::is_coordinator_heading(coordinator) {
            let role = with_phone(
                format!("{} Coordinator", event),
                &clean_phone(row.get(COORDINATOR_PHONE)),
            );
            self.records
                .push(MemberRecord::new(coordinator.trim(), role, category));
        }

        let sub = row.get(SUB_COORDINATOR);
        if !sub.is_empty() && !layout::is_sub_coordinator_blank(sub) {
            let role = with_phone(
                format!("{} Sub Coordinator", event),
                &clean_phone(row.get(SUB_COORDINATOR_PHONE)),
            );
            self.records.push(MemberRecord::new(sub.trim(), role, category));
        }
    }
}

/// Build records for `rows` in order, before de-duplication.
pub fn classify<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<MemberRecord> {
    let mut classifier = Classifier::new();
    for row in rows {
        classifier.push_row(row);
    }
    classifier.finish()
}

fn names_an_event(_: &Classifier, row: &Row) -> bool {
    let event = row.get(EVENT);
    !event.is_empty() && !layout::is_event_heading(event)
}

fn remember_event_name(ctx: &mut Classifier, row: &Row) -> Flow {
    ctx.last_event_name = Some(row.get(EVENT).to_string());
    Flow::Next
}

fn is_section_header(_: &Classifier, row: &Row) -> bool {
    let serial = row.get(SERIAL);
    !serial.is_empty() && serial.chars().all(|c| c.is_ascii_digit()) && row.has(SECTION)
}

fn open_section(ctx: &mut Classifier, row: &Row) -> Flow {
    let section = row.get(SECTION).trim();
    ctx.current_section = Some(section.to_string());

    let overall = row.get(OVERALL);
    if !overall.is_empty() && !layout::is_overall_heading(overall) {
        let (name, phone) = split_name_phone(overall);
        let role = with_phone(format!("{} Overall Coordinator", section), &phone);
        ctx.records
            .push(MemberRecord::new(name, role, normalize_category(section)));
    }
    Flow::Next
}

fn is_simple_table_row(ctx: &Classifier, row: &Row) -> bool {
    row.has(EVENT)
        && row.has(COORDINATOR)
        && row.has(COORDINATOR_PHONE)
        && ctx
            .section(row)
            .is_some_and(layout::is_simple_table_section)
        && !layout::is_event_heading(row.get(EVENT))
        && !layout::is_coordinator_heading(row.get(COORDINATOR))
}

fn emit_simple_entry(ctx: &mut Classifier, row: &Row) -> Flow {
    let role = with_phone(
        row.get(COORDINATOR).trim().to_string(),
        &clean_phone(row.get(COORDINATOR_PHONE)),
    );
    let category = normalize_category(ctx.section(row).unwrap_or("Core"));
    ctx.records
        .push(MemberRecord::new(row.get(EVENT).trim(), role, category));
    Flow::SkipRest
}

fn emit_event_coordinators(ctx: &mut Classifier, row: &Row) -> Flow {
    ctx.emit_coordinators(row.get(EVENT), row);
    Flow::Next
}

fn is_continuation_row(ctx: &Classifier, row: &Row) -> bool {
    !row.has(EVENT) && ctx.last_event_name.is_some()
}

fn emit_continuation(ctx: &mut Classifier, row: &Row) -> Flow {
    if let Some(event) = ctx.last_event_name.clone() {
        ctx.emit_coordinators(&event, row);
    }
    Flow::Next
}

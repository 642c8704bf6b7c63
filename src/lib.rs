//! Turn a festival team spreadsheet (xlsx) into a JSON roster.
//!
//! [`sheet`] reads the first worksheet into rows, [`roster`] classifies rows
//! into member records, and [`output`] renders them as JSON.

pub mod output;
pub mod roster;
pub mod sheet;

pub use roster::{build_members, extract_roster, Category, MemberRecord};
pub use sheet::{read_sheet_rows, FormatError, Row};

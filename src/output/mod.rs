// src/output/mod.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::collections::{HashMap, HashSet};
use std::io;

use crate::roster::MemberRecord;

/// How the roster is laid out in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// `[{...}, {...}]`
    #[default]
    Array,
    /// `{"alice_roy": {...}, ...}`
    Keyed,
}

/// Compact JSON with `", "` / `": "` separators where every character
/// outside printable ASCII is written as a `\uXXXX` escape.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&bytes[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }
}

static NON_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern should compile"));

/// Lower-case `name`, squash everything but `[a-z0-9]` to `_`, cap at 64 chars.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let replaced = NON_SLUG.replace_all(&lower, "_");
    replaced.trim_matches('_').chars().take(64).collect()
}

/// One stable id per record: its slug, `member` when that is empty, with
/// `_2`, `_3`, ... appended to repeats in order of appearance.
pub fn member_ids(records: &[MemberRecord]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();

    records
        .iter()
        .map(|record| {
            let mut base = slugify(&record.name);
            if base.is_empty() {
                base = "member".to_string();
            }
            let n = counts.entry(base.clone()).or_insert(0);
            loop {
                *n += 1;
                let id = if *n == 1 {
                    base.clone()
                } else {
                    format!("{}_{}", base, n)
                };
                if used.insert(id.clone()) {
                    break id;
                }
            }
        })
        .collect()
}

struct Keyed<'a> {
    ids: Vec<String>,
    records: &'a [MemberRecord],
}

impl Serialize for Keyed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (id, record) in self.ids.iter().zip(self.records) {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

/// Write `records` as a single JSON document (no trailing newline).
pub fn write_members<W: io::Write>(
    writer: W,
    records: &[MemberRecord],
    shape: Shape,
) -> serde_json::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(writer, AsciiFormatter);
    match shape {
        Shape::Array => records.serialize(&mut ser),
        Shape::Keyed => Keyed {
            ids: member_ids(records),
            records,
        }
        .serialize(&mut ser),
    }
}

pub fn to_json_string(records: &[MemberRecord], shape: Shape) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    write_members(&mut buf, records, shape)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

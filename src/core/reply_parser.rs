//! Turns the model's free-text reply into [`HurricaneRecord`]s.
//!
//! Expected line shape:
//!
//! ```text
//! Name: Hurricane Agatha, Start: July 2, End: July 6, Deaths: 25, Affected Areas: Acapulco, Pacific Ocean
//! ```
//!
//! Only the first four commas separate fields, so the areas list keeps its own
//! commas. Each segment must carry its own label before the first colon; a
//! comma inside an earlier field shifts the labels and rejects the line.

use crate::domain::model::{HurricaneRecord, LineRejection, ParsedReply, RejectedLine};

const FIELD_COUNT: usize = 5;

/// (field name, expected label) in line order.
const FIELDS: [(&str, &str); FIELD_COUNT] = [
    ("name", "name"),
    ("start", "start"),
    ("end", "end"),
    ("deaths", "deaths"),
    ("affected_areas", "affected areas"),
];

pub fn parse_reply(reply: &str) -> ParsedReply {
    let mut parsed = ParsedReply::default();

    for (index, line) in reply.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.rejected.push(RejectedLine {
                line_number: index + 1,
                line: line.to_string(),
                reason,
            }),
        }
    }

    parsed
}

pub fn parse_line(line: &str) -> Result<HurricaneRecord, LineRejection> {
    let segments: Vec<&str> = line.splitn(FIELD_COUNT, ',').collect();
    if segments.len() < FIELD_COUNT {
        return Err(LineRejection::TooFewFields {
            found: segments.len(),
        });
    }

    let mut values = [""; FIELD_COUNT];
    for (slot, (segment, (field, expected))) in values
        .iter_mut()
        .zip(segments.iter().zip(FIELDS.iter()))
    {
        let (label, value) = segment
            .split_once(':')
            .ok_or(LineRejection::MissingLabel { field: *field })?;
        if !label_matches(label, expected) {
            return Err(LineRejection::UnexpectedLabel {
                field: *field,
                found: label.trim().to_string(),
            });
        }
        *slot = value.trim();
    }

    let [name, start_date, end_date, death_count, areas] = values;

    Ok(HurricaneRecord {
        name: name.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        death_count: death_count.to_string(),
        affected_areas: split_areas(areas),
    })
}

/// Case-insensitive, whitespace-collapsed; list markers such as `1.` or `-` are ignored.
fn label_matches(label: &str, expected: &str) -> bool {
    let label = label.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ')' | '-' | '*' | '•')
    });
    let words: Vec<&str> = label.split_whitespace().collect();
    words.join(" ").eq_ignore_ascii_case(expected)
}

fn split_areas(areas: &str) -> Vec<String> {
    areas
        .split(',')
        .map(str::trim)
        .filter(|area| !area.is_empty())
        .map(str::to_string)
        .collect()
}

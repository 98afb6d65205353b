use crate::domain::model::HurricaneRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

pub const DEFAULT_OUTPUT_FILE: &str = "hurricanes_1975.csv";

pub const CSV_COLUMNS: [&str; 5] = [
    "hurricane_storm_name",
    "date_start",
    "date_end",
    "number_of_deaths",
    "list_of_areas_affected",
];

/// One CSV row; field order here is the column order of the file.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    hurricane_storm_name: &'a str,
    date_start: &'a str,
    date_end: &'a str,
    number_of_deaths: &'a str,
    list_of_areas_affected: String,
}

impl<'a> From<&'a HurricaneRecord> for CsvRow<'a> {
    fn from(record: &'a HurricaneRecord) -> Self {
        Self {
            hurricane_storm_name: &record.name,
            date_start: &record.start_date,
            date_end: &record.end_date,
            number_of_deaths: &record.death_count,
            list_of_areas_affected: format_area_list(&record.affected_areas),
        }
    }
}

/// Renders the areas cell as a bracketed, quoted list: `['Acapulco', 'Pacific Ocean']`.
pub fn format_area_list(areas: &[String]) -> String {
    let quoted: Vec<String> = areas.iter().map(|area| quote_literal(area)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Single quotes unless the text holds `'` and no `"`, escaping as a Python literal would.
fn quote_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Header row plus one row per record, UTF-8, no index column.
pub fn render_csv(records: &[HurricaneRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // serialize() 只在第一筆資料時寫標題，空資料時手動寫入
    if records.is_empty() {
        writer.write_record(CSV_COLUMNS)?;
    }
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

pub async fn write_records<S: Storage>(
    storage: &S,
    file_name: &str,
    records: &[HurricaneRecord],
) -> Result<String> {
    let data = render_csv(records)?;

    tracing::debug!(
        "Writing {} rows ({} bytes) to {}",
        records.len(),
        data.len(),
        file_name
    );
    storage.write_file(file_name, &data).await?;

    Ok(storage.location(file_name))
}

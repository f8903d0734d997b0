use std::path::Path;

use crate::input::InputError;
use crate::model::items::reverse_value;
use crate::model::{Dataset, Questionnaire};

/// Reads a CSV of raw answers (header = item codes, one row per respondent)
/// into a dataset ordered like the questionnaire. Reversed items are stored
/// as `scale + 1 - value`.
pub fn load_responses(path: &Path, questionnaire: &Questionnaire) -> Result<Dataset, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    parse_responses(&headers, reader.records(), questionnaire)
}

pub fn parse_responses<I>(
    headers: &csv::StringRecord,
    records: I,
    questionnaire: &Questionnaire,
) -> Result<Dataset, InputError>
where
    I: IntoIterator<Item = Result<csv::StringRecord, csv::Error>>,
{
    let codes = questionnaire.item_codes();
    let mut columns = Vec::with_capacity(codes.len());
    let mut reversed = Vec::with_capacity(codes.len());
    for code in &codes {
        let idx = headers
            .iter()
            .position(|h| h == code)
            .ok_or_else(|| InputError::MissingColumn(code.clone()))?;
        columns.push(idx);
        reversed.push(questionnaire.item(code).map(|i| i.reversed).unwrap_or(false));
    }
    for header in headers.iter() {
        if !codes.iter().any(|c| c == header) {
            tracing::warn!(column = header, "ignoring responses column that is not a model item");
        }
    }

    let scale = questionnaire.scale;
    let mut rows = Vec::new();
    for (row_idx, record) in records.into_iter().enumerate() {
        let record = record?;
        let mut row = Vec::with_capacity(codes.len());
        for (k, &col) in columns.iter().enumerate() {
            let raw = record.get(col).unwrap_or("");
            let value = parse_answer(raw, scale).ok_or_else(|| InputError::InvalidAnswer {
                row: row_idx + 1,
                item: codes[k].clone(),
                value: raw.to_string(),
                scale,
            })?;
            let scored = if reversed[k] {
                reverse_value(value, scale)
            } else {
                value
            };
            row.push(scored as f64);
        }
        rows.push(row);
    }

    Ok(Dataset::from_rows(codes, &rows)?)
}

fn parse_answer(raw: &str, scale: u8) -> Option<u8> {
    let value = raw.parse::<u8>().ok()?;
    (1..=scale).contains(&value).then_some(value)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/responses.rs"]
mod tests;

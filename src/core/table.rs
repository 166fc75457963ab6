use crate::domain::model::{EnrichedRecord, EnrichmentResult, InputRecord, InputTable, REQUIRED_COLUMNS};
use crate::utils::error::{EnrichError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;

/// 解析輸入 CSV，缺少必要欄位時回傳 FormatError
pub fn parse_input(data: &[u8]) -> Result<InputTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EnrichError::FormatError { missing });
    }

    let index_of = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let address_idx = index_of("address");
    let city_idx = index_of("city");
    let state_idx = index_of("state");
    let zip_idx = index_of("zip_code");

    let mut records = Vec::new();
    for (position, row) in reader.records().enumerate() {
        let row = row?;
        let columns = normalize_width(&row, headers.len(), position);
        let field = |idx: usize| columns.get(idx).cloned().unwrap_or_default();

        records.push(InputRecord {
            position,
            address: field(address_idx),
            city: field(city_idx),
            state: field(state_idx),
            zip_code: field(zip_idx),
            columns,
        });
    }

    tracing::debug!(
        "Parsed {} input records with columns: {}",
        records.len(),
        headers.join(", ")
    );

    Ok(InputTable { headers, records })
}

fn normalize_width(row: &StringRecord, width: usize, position: usize) -> Vec<String> {
    let mut columns: Vec<String> = row.iter().map(str::to_string).collect();
    if columns.len() > width {
        tracing::warn!(
            "Row {} has {} fields but the header has {}; dropping the extras",
            position + 1,
            columns.len(),
            width
        );
        columns.truncate(width);
    }
    columns.resize(width, String::new());
    columns
}

/// Union of attribute keys in first-observed order, skipping input column names.
pub fn collect_attribute_columns(headers: &[String], records: &[EnrichedRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let mut columns = Vec::new();

    for record in records {
        for key in record.attributes.keys() {
            if seen.insert(key) {
                columns.push(key.to_string());
            } else if headers.iter().any(|h| h == key) {
                tracing::warn!(
                    "Attribute '{}' for row {} collides with an input column and was dropped",
                    key,
                    record.input.position + 1
                );
            }
        }
    }

    columns
}

/// 產生輸出 CSV：輸入欄位 + 所有查詢到的屬性欄位
pub fn render_output(result: &EnrichmentResult) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(
        result
            .headers
            .iter()
            .chain(result.attribute_columns.iter()),
    )?;

    for record in &result.records {
        let attribute_values = result
            .attribute_columns
            .iter()
            .map(|column| record.attributes.get(column).unwrap_or(""));
        writer.write_record(
            record
                .input
                .columns
                .iter()
                .map(String::as_str)
                .chain(attribute_values),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| EnrichError::IoError(e.into_error()))
}

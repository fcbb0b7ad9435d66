use anyhow::Context as AnyhowContext;
use async_zip::base::read::mem::ZipFileReader;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use derive_more::{Display, Error};
use log_error::LogError;
use reqwest_middleware::ClientWithMiddleware;
use std::io::Cursor;
use watch_types::inventory::{InventoryRecord, InventoryRow, RecordError, REQUIRED_COLUMNS};

/// Zero-indexed sheet row holding the column names; rows above it are a report title.
pub const HEADER_ROW: u32 = 17;

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xls", "xlsx", "xlsm", "xlsb", "ods"];

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[display("Inventory archive contains no spreadsheet")]
    NoSpreadsheet,
    #[display("Inventory archive contains {count} spreadsheets, expected one")]
    MultipleSpreadsheets { count: usize },
    #[display("Inventory workbook has no worksheets")]
    EmptyWorkbook,
    #[display("Inventory worksheet has no header row {row}")]
    NoHeaderRow { row: u32 },
}

/// Downloads the zipped inventory spreadsheet and reads every record from it.
pub async fn fetch_inventory(
    client: &ClientWithMiddleware,
    url: &str,
) -> Result<Vec<InventoryRecord>, anyhow::Error> {
    let response = client
        .get(url)
        .send()
        .await
        .context("Unable to download inventory archive")?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("HTTP {status} for {url}"));
    }
    let bytes = response.bytes().await?;
    let records = parse_archive(bytes.to_vec()).await?;
    log::info!("Read {} inventory records from {url}", records.len());
    Ok(records)
}

pub async fn parse_archive(bytes: Vec<u8>) -> Result<Vec<InventoryRecord>, anyhow::Error> {
    let (name, workbook) = extract_spreadsheet(bytes).await?;
    log::debug!("Parsing {name} ({} bytes)", workbook.len());
    read_records(workbook).with_context(|| format!("Unable to read {name}"))
}

fn is_spreadsheet(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Decompresses the single spreadsheet entry of the archive into memory.
async fn extract_spreadsheet(bytes: Vec<u8>) -> Result<(String, Vec<u8>), anyhow::Error> {
    let zip = ZipFileReader::new(bytes)
        .await
        .context("Unable to open inventory archive")?;
    let candidates = zip
        .file()
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches!(entry.dir(), Ok(false)))
        .filter_map(|(idx, entry)| {
            entry
                .filename()
                .as_str()
                .log_error("Skipping archive entry with undecodable name")
                .filter(|name| is_spreadsheet(name))
                .map(|name| (idx, name.to_string()))
        })
        .collect::<Vec<_>>();
    let (index, name) = match candidates.as_slice() {
        [] => return Err(InventoryError::NoSpreadsheet.into()),
        [single] => single.clone(),
        many => {
            return Err(InventoryError::MultipleSpreadsheets { count: many.len() }.into());
        }
    };
    let mut reader = zip.reader_with_entry(index).await?;
    let mut workbook = Vec::new();
    reader
        .read_to_end_checked(&mut workbook)
        .await
        .with_context(|| format!("Unable to extract {name}"))?;
    Ok((name, workbook))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Reads the first worksheet, taking column names from [`HEADER_ROW`].
pub fn read_rows(workbook: Vec<u8>) -> Result<Vec<InventoryRow>, anyhow::Error> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(workbook))
        .context("Unable to open inventory workbook")?;
    let range = sheets
        .worksheet_range_at(0)
        .ok_or(InventoryError::EmptyWorkbook)?
        .context("Unable to read inventory worksheet")?;
    let no_header = InventoryError::NoHeaderRow {
        row: HEADER_ROW + 1,
    };
    // The range starts at the first non-empty cell, not at A1.
    let first_row = range.start().map(|(row, _)| row).unwrap_or(0);
    let skip = HEADER_ROW.checked_sub(first_row).ok_or(no_header.clone())?;
    let mut rows = range.rows().skip(skip as usize);
    let header = rows
        .next()
        .ok_or(no_header)?
        .iter()
        .map(|c| cell_text(c).trim().to_string())
        .collect::<Vec<_>>();
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !header.iter().any(|h| h == column))
    {
        return Err(RecordError::MissingColumn { column }.into());
    }
    Ok(rows
        .map(|row| {
            header
                .iter()
                .cloned()
                .zip(row.iter().map(cell_text))
                .collect::<InventoryRow>()
        })
        .collect())
}

pub fn read_records(workbook: Vec<u8>) -> Result<Vec<InventoryRecord>, anyhow::Error> {
    read_rows(workbook)?
        .into_iter()
        .map(InventoryRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

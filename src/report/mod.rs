//! Daily reservoir report rendered as an `.xlsx` workbook.
//!
//! The report is a pure function of the request body: it never reads the
//! store. Numeric cells use the same coercion as ingestion, so unset values
//! become blank cells.

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Deserialize;

use crate::domain::status::{MIN_VOLUME, coerce_number};
use crate::domain::TelemetryRecord;
use crate::error::GatewayError;

/// MIME type of the rendered workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Column headers, in report order.
pub const HEADERS: [&str; 19] = [
    "№ п/п",
    "Наименование водохранилища",
    "НПУ",
    "2024",
    "2025",
    "НПУ",
    "ФПУ",
    "2024",
    "2025",
    "Наполнение, %",
    "Свободная емкость, млн.м³",
    "Приток 2024",
    "Приток 2025",
    "Сброс 2024",
    "Сброс 2025",
    "Макс. пропускная способность, м³/с",
    "Минимальный объем, млн.м³; год",
    "Уровень воды",
    "Уровень загрязнения",
];

/// Metric keys for the columns after name, in report order.
const METRIC_COLUMNS: [&str; 17] = [
    "npu",
    "npu_2024",
    "npu_2025",
    "volume",
    "fpu_volume",
    "volume_2024",
    "volume_2025",
    "filling",
    "free_volume",
    "daily_inflow_2024",
    "daily_inflow_2025",
    "daily_outflow_2024",
    "daily_outflow_2025",
    "max_capacity",
    MIN_VOLUME,
    "water_level",
    "pollution_level",
];

/// Zero-based row of the header line.
const HEADER_ROW: u32 = 3;

/// Request body for `POST /generate-excel`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    /// Reporting organization, used in the title.
    pub organization: String,
    /// Report date as free text, used in the title and file name.
    pub date: String,
    /// Person responsible for the report.
    pub executor: String,
    /// One entry per report row.
    #[serde(rename = "waterReservoirs", default)]
    pub water_reservoirs: Vec<TelemetryRecord>,
}

/// A single rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Empty cell.
    Blank,
}

/// Builds the data rows of the report, one per reservoir.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidMetric`] if a numeric column holds a
/// non-numeric value.
pub fn report_rows(request: &ReportRequest) -> Result<Vec<Vec<ReportCell>>, GatewayError> {
    request
        .water_reservoirs
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut row = Vec::with_capacity(HEADERS.len());
            #[allow(clippy::cast_precision_loss)]
            row.push(ReportCell::Number((index + 1) as f64));
            row.push(ReportCell::Text(record.name.clone()));
            for key in METRIC_COLUMNS {
                row.push(metric_cell(record, key)?);
            }
            Ok(row)
        })
        .collect()
}

fn metric_cell(record: &TelemetryRecord, key: &str) -> Result<ReportCell, GatewayError> {
    let value = record.metrics.get(key);
    if key == MIN_VOLUME {
        return Ok(match value {
            Some(serde_json::Value::String(s)) if !s.is_empty() => ReportCell::Text(s.clone()),
            None | Some(serde_json::Value::Null | serde_json::Value::String(_)) => {
                ReportCell::Blank
            }
            Some(other) => ReportCell::Text(other.to_string()),
        });
    }
    Ok(coerce_number(key, value)?.map_or(ReportCell::Blank, ReportCell::Number))
}

/// Renders the full workbook.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidMetric`] for bad cell values and
/// [`GatewayError::Report`] if the workbook cannot be written.
pub fn render_report(request: &ReportRequest) -> Result<Vec<u8>, GatewayError> {
    let rows = report_rows(request)?;

    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), request, &rows).map_err(report_error)?;
    let bytes = workbook.save_to_buffer().map_err(report_error)?;

    tracing::info!(
        rows = rows.len(),
        bytes = bytes.len(),
        date = %request.date,
        "report rendered"
    );
    Ok(bytes)
}

fn write_sheet(
    sheet: &mut Worksheet,
    request: &ReportRequest,
    rows: &[Vec<ReportCell>],
) -> Result<(), XlsxError> {
    sheet.write_string(
        0,
        0,
        format!(
            "Ежедневная информация по водохранилищам {} по состоянию на {}",
            request.organization, request.date
        ),
    )?;
    sheet.write_string(1, 0, format!("Исполнитель: {}", request.executor))?;

    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string(HEADER_ROW, col, header)?;
    }

    for (row_index, row) in (HEADER_ROW + 1..).zip(rows) {
        for (col, cell) in (0u16..).zip(row) {
            match cell {
                ReportCell::Number(n) => {
                    sheet.write_number(row_index, col, *n)?;
                }
                ReportCell::Text(s) => {
                    sheet.write_string(row_index, col, s.as_str())?;
                }
                ReportCell::Blank => {}
            }
        }
    }
    Ok(())
}

fn report_error(err: XlsxError) -> GatewayError {
    GatewayError::Report(err.to_string())
}

/// Attachment file name for a report dated `date`.
#[must_use]
pub fn report_filename(date: &str) -> String {
    format!("water_reservoirs_{}.xlsx", date.replace(' ', "_"))
}

/// `Content-Disposition` value for a report dated `date`.
///
/// Names that are a plain HTTP token go out as `filename=`; anything else
/// (separators such as `;` or `"`, non-ASCII text) is sent percent-encoded
/// as an RFC 5987 `filename*` parameter.
#[must_use]
pub fn content_disposition(date: &str) -> String {
    let filename = report_filename(date);
    if filename.bytes().all(is_token_byte) {
        return format!("attachment; filename={filename}");
    }
    let encoded: String = filename
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                char::from(b).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();
    format!("attachment; filename*=UTF-8''{encoded}")
}

/// RFC 9110 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

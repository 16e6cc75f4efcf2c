//! CSV and XLSX export of travel records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{Terminator, WriterBuilder};
use rust_xlsxwriter::Workbook;

use crate::domain::TravelRecord;
use crate::domain::validation::parse_date;
use crate::format::percent_encode;

/// MIME type of CSV exports.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// MIME type of XLSX exports.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const FILE_STEM: &str = "交通費記録";
const SHEET_NAME: &str = "交通費記録";
const HEADER: [&str; 4] = ["日付", "交通機関名", "交通機関", "運賃"];

/// Errors preparing an export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("no records to export in the selected range")]
    Empty,

    #[error("unknown export range: {0:?}")]
    UnknownRange(String),

    #[error("invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("invalid month (expected YYYY-MM): {0:?}")]
    InvalidMonth(String),

    #[error("unknown export format: {0:?}")]
    UnknownFormat(String),

    #[error("failed to write {format} export: {message}")]
    Write {
        format: ExportFormat,
        message: String,
    },
}

impl ExportError {
    fn write(format: ExportFormat, err: impl fmt::Display) -> Self {
        ExportError::Write {
            format,
            message: err.to_string(),
        }
    }
}

/// File format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_CONTENT_TYPE,
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// Blank input selects the default format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(ExportFormat::default()),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which records to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRange {
    All,
    /// Inclusive bounds; a missing bound is open.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// One `YYYY-MM` month.
    Monthly(String),
}

impl ExportRange {
    /// Build a range from form fields.
    ///
    /// Blank fields count as absent. A monthly range without a month uses
    /// `default_month`.
    pub fn parse(
        range: &str,
        start: Option<&str>,
        end: Option<&str>,
        month: Option<&str>,
        default_month: &str,
    ) -> Result<Self, ExportError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        match range.trim() {
            "" | "all" => Ok(ExportRange::All),
            "custom" => Ok(ExportRange::Custom {
                start: present(start).map(|v| date_field("start", v)).transpose()?,
                end: present(end).map(|v| date_field("end", v)).transpose()?,
            }),
            "monthly" => {
                let month = present(month).unwrap_or(default_month);
                if !is_month_key(month) {
                    return Err(ExportError::InvalidMonth(month.to_string()));
                }
                Ok(ExportRange::Monthly(month.to_string()))
            }
            other => Err(ExportError::UnknownRange(other.to_string())),
        }
    }

    pub fn contains(&self, record: &TravelRecord) -> bool {
        match self {
            ExportRange::All => true,
            ExportRange::Custom { start, end } => {
                start.is_none_or(|s| record.date >= s) && end.is_none_or(|e| record.date <= e)
            }
            ExportRange::Monthly(month) => record.month_key() == *month,
        }
    }

    /// Download name without extension, e.g. `交通費記録_2025-11`.
    pub fn file_stem(&self) -> String {
        let suffix = match self {
            ExportRange::All => "_全期間".to_string(),
            ExportRange::Custom {
                start: Some(s),
                end: Some(e),
            } => format!("_{s}-{e}"),
            ExportRange::Custom {
                start: Some(s),
                end: None,
            } => format!("_{s}以降"),
            ExportRange::Custom {
                start: None,
                end: Some(e),
            } => format!("_{e}まで"),
            ExportRange::Custom {
                start: None,
                end: None,
            } => String::new(),
            ExportRange::Monthly(month) => format!("_{month}"),
        };
        format!("{FILE_STEM}{suffix}")
    }
}

fn date_field(field: &'static str, value: &str) -> Result<NaiveDate, ExportError> {
    parse_date(value).ok_or_else(|| ExportError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn is_month_key(value: &str) -> bool {
    value.len() == 7 && parse_date(&format!("{value}-01")).is_some()
}

/// A generated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub contents: Vec<u8>,
}

impl ExportFile {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// `Content-Disposition` value with the UTF-8 file name percent-encoded.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"export.{}\"; filename*=UTF-8''{}",
            self.format.extension(),
            percent_encode(&self.file_name)
        )
    }
}

/// Export the records in `range` as `format`, keeping their order.
pub fn export(
    records: &[TravelRecord],
    range: &ExportRange,
    format: ExportFormat,
) -> Result<ExportFile, ExportError> {
    let selected: Vec<&TravelRecord> = records.iter().filter(|r| range.contains(r)).collect();
    if selected.is_empty() {
        return Err(ExportError::Empty);
    }

    let contents = match format {
        ExportFormat::Csv => write_csv(&selected)?,
        ExportFormat::Xlsx => write_xlsx(&selected)?,
    };

    tracing::info!(rows = selected.len(), range = ?range, %format, "exported records");
    Ok(ExportFile {
        file_name: format!("{}.{}", range.file_stem(), format.extension()),
        format,
        contents,
    })
}

fn route_label(record: &TravelRecord) -> String {
    format!("{}〜{}", record.from_station, record.to_station)
}

/// CSV with CRLF line endings, preceded by a UTF-8 byte-order mark so
/// spreadsheet tools pick the right encoding.
fn write_csv(records: &[&TravelRecord]) -> Result<Vec<u8>, ExportError> {
    let err = |e: csv::Error| ExportError::write(ExportFormat::Csv, e);

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer("\u{feff}".as_bytes().to_vec());
    writer.write_record(HEADER).map_err(err)?;
    for record in records {
        let date = record.date.to_string();
        let fare = record.fare.to_string();
        writer
            .write_record([
                date.as_str(),
                route_label(record).as_str(),
                record.company(),
                fare.as_str(),
            ])
            .map_err(err)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::write(ExportFormat::Csv, e.error()))
}

/// One worksheet with the same columns as the CSV; fares are numbers.
fn write_xlsx(records: &[&TravelRecord]) -> Result<Vec<u8>, ExportError> {
    let err = |e: rust_xlsxwriter::XlsxError| ExportError::write(ExportFormat::Xlsx, e);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(err)?;

    for (col, title) in (0u16..).zip(HEADER) {
        sheet.write_string(0, col, title).map_err(err)?;
    }
    for (row, record) in (1u32..).zip(records) {
        sheet
            .write_string(row, 0, record.date.to_string())
            .map_err(err)?;
        sheet.write_string(row, 1, route_label(record)).map_err(err)?;
        sheet.write_string(row, 2, record.company()).map_err(err)?;
        sheet
            .write_number(row, 3, record.fare.as_f64())
            .map_err(err)?;
    }

    workbook.save_to_buffer().map_err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fare, RecordId, TransportationType};

    fn record(id: &str, date: &str, from: &str, to: &str, company: Option<&str>, fare: u64) -> TravelRecord {
        TravelRecord {
            id: RecordId::new(id),
            date: parse_date(date).unwrap(),
            from_station: from.to_string(),
            to_station: to.to_string(),
            transportation_type: TransportationType::Train,
            transportation_company: company.map(str::to_string),
            fare: Fare::from_yen(fare),
        }
    }

    fn records() -> Vec<TravelRecord> {
        vec![
            record("1", "2025-11-10", "新宿", "渋谷", Some("JR"), 200),
            record("2", "2025-11-11", "池袋", "上野", None, 220),
            record("3", "2025-10-05", "渋谷", "表参道", Some("都営"), 180),
        ]
    }

    fn date(s: &str) -> Option<NaiveDate> {
        parse_date(s)
    }

    fn export_csv(records: &[TravelRecord], range: &ExportRange) -> Result<ExportFile, ExportError> {
        export(records, range, ExportFormat::Csv)
    }

    fn text(file: &ExportFile) -> String {
        String::from_utf8(file.contents.clone()).unwrap()
    }

    #[test]
    fn csv_layout() {
        let file = export_csv(&records(), &ExportRange::All).unwrap();
        assert_eq!(file.file_name, "交通費記録_全期間.csv");

        assert_eq!(file.content_type(), CSV_CONTENT_TYPE);

        let contents = text(&file);
        let body = contents.strip_prefix('\u{feff}').unwrap();
        let lines: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(lines[0], "日付,交通機関名,交通機関,運賃");
        assert_eq!(lines[1], "2025-11-10,新宿〜渋谷,JR,200");
        assert_eq!(lines[2], "2025-11-11,池袋〜上野,,220");
        assert_eq!(lines[3], "2025-10-05,渋谷〜表参道,都営,180");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn quotes_special_fields() {
        let records = vec![
            record("1", "2025-11-10", "A,B", "C", Some("say \"hi\""), 200),
            record("2", "2025-11-11", "D", "E", Some("plain"), 220),
        ];
        let contents = text(&export_csv(&records, &ExportRange::All).unwrap());
        let lines: Vec<&str> = contents.split("\r\n").collect();
        assert_eq!(lines[1], "2025-11-10,\"A,B〜C\",\"say \"\"hi\"\"\",200");
        assert_eq!(lines[2], "2025-11-11,D〜E,plain,220");
    }

    #[test]
    fn xlsx_workbook() {
        let file = export(&records(), &ExportRange::All, ExportFormat::Xlsx).unwrap();
        assert_eq!(file.file_name, "交通費記録_全期間.xlsx");
        assert_eq!(file.content_type(), XLSX_CONTENT_TYPE);
        assert!(file.contents.starts_with(b"PK\x03\x04"), "xlsx is a zip archive");
        assert!(file.content_disposition().contains("filename=\"export.xlsx\""));
    }

    #[test]
    fn format_names() {
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("xlsx".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat("pdf".to_string()))
        );
    }

    #[test]
    fn custom_range_is_inclusive() {
        let range = ExportRange::Custom {
            start: date("2025-10-05"),
            end: date("2025-11-10"),
        };
        let file = export_csv(&records(), &range).unwrap();
        assert_eq!(text(&file).matches("\r\n").count(), 3);
        assert_eq!(file.file_name, "交通費記録_2025-10-05-2025-11-10.csv");
    }

    #[test]
    fn file_names_for_open_ranges() {
        let from = ExportRange::Custom {
            start: date("2025-11-01"),
            end: None,
        };
        let until = ExportRange::Custom {
            start: None,
            end: date("2025-11-30"),
        };
        let open = ExportRange::Custom {
            start: None,
            end: None,
        };
        assert_eq!(from.file_stem(), "交通費記録_2025-11-01以降");
        assert_eq!(until.file_stem(), "交通費記録_2025-11-30まで");
        assert_eq!(open.file_stem(), "交通費記録");
        assert_eq!(
            ExportRange::Monthly("2025-11".to_string()).file_stem(),
            "交通費記録_2025-11"
        );
    }

    #[test]
    fn monthly_selects_one_month() {
        let range = ExportRange::Monthly("2025-10".to_string());
        let file = export_csv(&records(), &range).unwrap();
        let contents = text(&file);
        assert!(contents.contains("表参道"));
        assert!(!contents.contains("上野"));
    }

    #[test]
    fn empty_selection_is_error() {
        let range = ExportRange::Monthly("2024-01".to_string());
        assert_eq!(export_csv(&records(), &range), Err(ExportError::Empty));
        assert_eq!(export_csv(&[], &ExportRange::All), Err(ExportError::Empty));
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(
            ExportRange::parse("all", None, None, None, "2025-11"),
            Ok(ExportRange::All)
        );
        assert_eq!(
            ExportRange::parse("custom", Some("2025-11-01"), Some(" "), None, "2025-11"),
            Ok(ExportRange::Custom {
                start: date("2025-11-01"),
                end: None
            })
        );
        assert_eq!(
            ExportRange::parse("monthly", None, None, None, "2025-11"),
            Ok(ExportRange::Monthly("2025-11".to_string()))
        );
        assert_eq!(
            ExportRange::parse("monthly", None, None, Some("2025-13"), "2025-11"),
            Err(ExportError::InvalidMonth("2025-13".to_string()))
        );
        assert!(matches!(
            ExportRange::parse("custom", Some("11/01"), None, None, "2025-11"),
            Err(ExportError::InvalidDate { field: "start", .. })
        ));
        assert!(matches!(
            ExportRange::parse("yearly", None, None, None, "2025-11"),
            Err(ExportError::UnknownRange(_))
        ));
    }

    #[test]
    fn content_disposition_encodes_name() {
        let file = ExportFile {
            file_name: "交通費記録_全期間.csv".to_string(),
            format: ExportFormat::Csv,
            contents: Vec::new(),
        };
        let header = file.content_disposition();
        assert!(header.starts_with("attachment; "));
        assert!(header.contains("filename*=UTF-8''%E4%BA%A4"));
        assert!(header.ends_with(".csv"));
    }
}

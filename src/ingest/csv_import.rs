use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::database::enums::{LeadSource, LeadStatus};
use crate::database::models::{NewEnergyPrice, NewFuturesTick, NewLead};

/// Errors that abort an entire CSV import
///
/// Per-row problems do not abort; they are collected in the outcome so a
/// mostly-good vendor file still imports.
#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("Empty upload")]
    Empty,

    #[error("Unexpected header: expected '{expected}', got '{got}'")]
    BadHeader { expected: String, got: String },

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),
}

/// Result of one import run
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImportOutcome {
    /// Rows written (upserts count as written)
    pub imported: usize,

    /// Rows skipped as duplicates by the database
    pub skipped: usize,

    /// Row-numbered problems, e.g. "row 7: invalid tax id"
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn merge(&mut self, other: ImportOutcome) {
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }
}

/// Decode raw upload bytes to text
///
/// Vendor exports are either UTF-8 (sometimes with a BOM) or
/// Windows-1250; anything that fails strict UTF-8 goes through the
/// legacy codepage.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1250.decode(bytes);
            decoded.into_owned()
        }
    }
}

const RDN_HEADER: &[&str] = &["date", "hour", "price", "volume"];
const FUTURES_HEADER: &[&str] = &[
    "date",
    "contract",
    "settlement",
    "open",
    "high",
    "low",
    "volume",
    "open_interest",
];
const LEADS_HEADER: &[&str] = &[
    "company_name",
    "tax_id",
    "email",
    "phone",
    "street",
    "city",
    "postal_code",
    "annual_volume_mwh",
    "contract_end_date",
];

/// Parse the hourly RDN export: `date;hour;price[;volume]`
pub fn parse_rdn_csv(text: &str) -> Result<(Vec<NewEnergyPrice>, Vec<String>), CsvImportError> {
    let mut reader = reader_for(text)?;
    check_header(&mut reader, RDN_HEADER, 3)?;

    let mut ticks = Vec::new();
    let mut errors = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2; // 1-based, after the header
        let record = record?;

        match parse_rdn_record(&record) {
            Ok(tick) => ticks.push(tick),
            Err(reason) => errors.push(format!("row {}: {}", row, reason)),
        }
    }

    Ok((ticks, errors))
}

fn parse_rdn_record(record: &csv::StringRecord) -> Result<NewEnergyPrice, String> {
    let price_date = parse_date(record.get(0).unwrap_or_default())?;

    let hour: i32 = record
        .get(1)
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|_| "invalid hour".to_string())?;
    if !(0..=23).contains(&hour) {
        return Err(format!("hour {} out of range", hour));
    }

    let price = parse_decimal(record.get(2).unwrap_or_default())?;
    let volume = parse_optional_decimal(record.get(3))?;

    Ok(NewEnergyPrice::new(price_date, hour, price, volume))
}

/// Parse the futures export:
/// `date;contract;settlement[;open;high;low;volume;open_interest]`
pub fn parse_futures_csv(text: &str) -> Result<(Vec<NewFuturesTick>, Vec<String>), CsvImportError> {
    let mut reader = reader_for(text)?;
    check_header(&mut reader, FUTURES_HEADER, 3)?;

    let mut ticks = Vec::new();
    let mut errors = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2;
        let record = record?;

        match parse_futures_record(&record) {
            Ok(tick) => ticks.push(tick),
            Err(reason) => errors.push(format!("row {}: {}", row, reason)),
        }
    }

    Ok((ticks, errors))
}

fn parse_futures_record(record: &csv::StringRecord) -> Result<NewFuturesTick, String> {
    let price_date = parse_date(record.get(0).unwrap_or_default())?;

    let contract = record.get(1).unwrap_or_default().trim().to_string();
    if contract.is_empty() {
        return Err("missing contract".to_string());
    }

    let settlement = parse_decimal(record.get(2).unwrap_or_default())?;

    let open_interest = match record.get(7).map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| "invalid open_interest".to_string())?),
    };

    Ok(NewFuturesTick {
        contract,
        price_date,
        settlement,
        open_price: parse_optional_decimal(record.get(3))?,
        high_price: parse_optional_decimal(record.get(4))?,
        low_price: parse_optional_decimal(record.get(5))?,
        volume: parse_optional_decimal(record.get(6))?,
        open_interest,
    })
}

/// Parse the lead-list export used by the prospecting team
pub fn parse_leads_csv(
    text: &str,
    source: LeadSource,
) -> Result<(Vec<NewLead>, Vec<String>), CsvImportError> {
    let mut reader = reader_for(text)?;
    check_header(&mut reader, LEADS_HEADER, 2)?;

    let mut leads = Vec::new();
    let mut errors = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2;
        let record = record?;

        match parse_lead_record(&record, source) {
            Ok(lead) => leads.push(lead),
            Err(reason) => errors.push(format!("row {}: {}", row, reason)),
        }
    }

    Ok((leads, errors))
}

fn parse_lead_record(record: &csv::StringRecord, source: LeadSource) -> Result<NewLead, String> {
    let company_name = record.get(0).unwrap_or_default().trim().to_string();
    if company_name.is_empty() {
        return Err("missing company name".to_string());
    }

    let tax_id = match record.get(1).map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(normalize_tax_id(raw).ok_or_else(|| "invalid tax id".to_string())?),
    };

    let contract_end_date = match record.get(8).map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(parse_date(raw)?),
    };

    Ok(NewLead {
        company_name,
        tax_id,
        email: non_empty(record.get(2)),
        phone: non_empty(record.get(3)),
        street: non_empty(record.get(4)),
        city: non_empty(record.get(5)),
        postal_code: non_empty(record.get(6)),
        lat: None,
        lon: None,
        status: LeadStatus::New,
        source,
        annual_volume_mwh: parse_optional_decimal(record.get(7))?,
        contract_end_date,
        notes: None,
        owner_id: None,
    })
}

/// Normalise and checksum-validate a 10-digit tax id
///
/// Accepts separators ("123-456-78-90") and an optional "PL" prefix.
pub fn normalize_tax_id(raw: &str) -> Option<String> {
    let digits: String = raw
        .trim()
        .trim_start_matches("PL")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.len() != 10 {
        return None;
    }

    const WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];
    let digit_values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    let checksum: u32 = WEIGHTS
        .iter()
        .zip(&digit_values)
        .map(|(w, d)| w * d)
        .sum::<u32>()
        % 11;

    if checksum == digit_values[9] {
        Some(digits)
    } else {
        None
    }
}

fn reader_for(text: &str) -> Result<csv::Reader<&[u8]>, CsvImportError> {
    if text.trim().is_empty() {
        return Err(CsvImportError::Empty);
    }

    Ok(csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes()))
}

/// The first `required` header columns must match; trailing optional
/// columns may be absent entirely
fn check_header(
    reader: &mut csv::Reader<&[u8]>,
    expected: &[&str],
    required: usize,
) -> Result<(), CsvImportError> {
    let headers = reader.headers()?.clone();
    let got: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let matches = got.len() >= required
        && got.len() <= expected.len()
        && got.iter().zip(expected).all(|(g, e)| g == e);

    if matches {
        Ok(())
    } else {
        Err(CsvImportError::BadHeader {
            expected: expected.join(";"),
            got: got.join(";"),
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}'", raw.trim()))
}

/// Decimal with either "." or the vendor's "," separator
fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<Decimal>()
        .map_err(|_| format!("invalid number '{}'", raw.trim()))
}

fn parse_optional_decimal(raw: Option<&str>) -> Result<Option<Decimal>, String> {
    match raw.map(str::trim) {
        Some("") | None => Ok(None),
        Some(raw) => parse_decimal(raw).map(Some),
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = b"\xef\xbb\xbfdate;hour;price\n";
        assert_eq!(decode_csv_bytes(bytes), "date;hour;price\n");
    }

    #[test]
    fn test_decode_windows_1250_fallback() {
        // "Żywiec" in Windows-1250; 0xAF is Ż
        let bytes = b"\xafywiec";
        assert_eq!(decode_csv_bytes(bytes), "Żywiec");
    }

    #[test]
    fn test_parse_rdn_csv() {
        let text = "date;hour;price;volume\n\
                    2025-06-12;0;350,25;12000\n\
                    2025-06-12;1;341.10;\n";
        let (ticks, errors) = parse_rdn_csv(text).unwrap();

        assert!(errors.is_empty());
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].price, dec!(350.25));
        assert_eq!(ticks[0].volume, Some(dec!(12000)));
        assert_eq!(ticks[1].hour, 1);
        assert_eq!(ticks[1].volume, None);
    }

    #[test]
    fn test_parse_rdn_collects_row_errors() {
        let text = "date;hour;price\n\
                    2025-06-12;24;350\n\
                    2025-06-12;7;abc\n\
                    2025-06-12;8;123\n";
        let (ticks, errors) = parse_rdn_csv(text).unwrap();

        assert_eq!(ticks.len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("row 2"));
        assert!(errors[0].contains("out of range"));
        assert!(errors[1].contains("row 3"));
    }

    #[test]
    fn test_parse_rdn_rejects_wrong_header() {
        let err = parse_rdn_csv("datum;stunde;preis\n").unwrap_err();
        assert!(matches!(err, CsvImportError::BadHeader { .. }));
    }

    #[test]
    fn test_parse_futures_csv_settlement_only() {
        let text = "date;contract;settlement\n\
                    2025-03-14;BASE_Y-26;460,00\n";
        let (ticks, errors) = parse_futures_csv(text).unwrap();

        assert!(errors.is_empty());
        assert_eq!(ticks[0].contract, "BASE_Y-26");
        assert_eq!(ticks[0].settlement, dec!(460.00));
        assert!(ticks[0].high_price.is_none());
    }

    #[test]
    fn test_parse_futures_csv_full_row() {
        let text = "date;contract;settlement;open;high;low;volume;open_interest\n\
                    2025-03-14;BASE_Q-26;400;398;405;396;820;15000\n";
        let (ticks, _) = parse_futures_csv(text).unwrap();

        assert_eq!(ticks[0].high_price, Some(dec!(405)));
        assert_eq!(ticks[0].open_interest, Some(15000));
    }

    #[test]
    fn test_parse_leads_csv() {
        let text = "company_name;tax_id;email;phone;street;city;postal_code;annual_volume_mwh;contract_end_date\n\
                    Huta Szkła;526-10-40-828;biuro@huta.pl;;ul. Prosta 5;Katowice;40-001;1250,5;2026-12-31\n\
                    Piekarnia Kowalski;;;;;;;;\n";
        let (leads, errors) = parse_leads_csv(text, LeadSource::Csv).unwrap();

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].tax_id.as_deref(), Some("5261040828"));
        assert_eq!(leads[0].annual_volume_mwh, Some(dec!(1250.5)));
        assert_eq!(leads[0].status, LeadStatus::New);
        assert!(leads[1].tax_id.is_none());
    }

    #[test]
    fn test_parse_leads_rejects_bad_tax_id() {
        let text = "company_name;tax_id\n\
                    Bad Sp. z o.o.;1234567890\n";
        let (leads, errors) = parse_leads_csv(text, LeadSource::Csv).unwrap();

        assert!(leads.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid tax id"));
    }

    #[test]
    fn test_normalize_tax_id() {
        // 5261040828 is the canonical valid example
        assert_eq!(normalize_tax_id("526-104-08-28").as_deref(), Some("5261040828"));
        assert_eq!(normalize_tax_id("PL5261040828").as_deref(), Some("5261040828"));
        assert_eq!(normalize_tax_id("5261040829"), None); // bad checksum
        assert_eq!(normalize_tax_id("12345"), None);
    }

    #[test]
    fn test_empty_upload() {
        assert!(matches!(parse_rdn_csv("  \n"), Err(CsvImportError::Empty)));
    }
}

//! Bulk import of body scale CSV exports
//!
//! The scale software exports ISO-8859-15 text with German column labels,
//! `;` separated fields wrapped in double quotes, comma decimals and a notes
//! column escaped twice. A whole file is imported in one transaction: either
//! every row lands or none does.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::metabolic::MetabolicRateCalculator;
use crate::models::{ActivityLevel, NewMeasurement};
use crate::rounding::round_to_digits;
use crate::store::{self, StoreError};

/// ---------------------------------------------------------------------------
/// Format Constants
/// ---------------------------------------------------------------------------

const EXPECTED_HEADER: [&str; FIELD_COUNT] = [
  "Datum",
  "Uhrzeit",
  "Gewicht",
  "Körperfett",
  "Wasser",
  "Muskelmasse",
  "BMI",
  "Notizen",
];
const FIELD_COUNT: usize = 8;
const DELIMITER: char = ';';
const QUOTE: char = '"';
const TIMESTAMP_FORMAT: &str = "%d.%m.%y %H:%M";

/// The scale writes local wall-clock time; exports are read as Central European
/// Time without daylight saving.
const SCALE_UTC_OFFSET_SECONDS: i32 = 3600;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
  #[error("Unexpected header line: {found:?}")]
  MalformedHeader { found: Vec<String> },

  #[error("Malformed row {line_number} ({reason}): {line}")]
  MalformedRow {
    line_number: usize,
    line: String,
    reason: String,
  },

  #[error("Invalid activity level: {0}")]
  InvalidActivityLevel(String),

  #[error("Database error: {0}")]
  Database(String),
}

impl From<sqlx::Error> for ImportError {
  fn from(e: sqlx::Error) -> Self {
    ImportError::Database(e.to_string())
  }
}

impl From<StoreError> for ImportError {
  fn from(e: StoreError) -> Self {
    ImportError::Database(e.to_string())
  }
}

impl Serialize for ImportError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Line Parsing
/// ---------------------------------------------------------------------------

/// One data line split into its eight raw columns, quotes removed
#[derive(Debug, Clone, PartialEq)]
pub struct CsvLine {
  pub date: String,
  pub time: String,
  pub weight: String,
  pub body_fat: String,
  pub water: String,
  pub muscle_mass: String,
  pub bmi: String,
  pub notes: String,
}

impl CsvLine {
  /// Split on `;` into at most eight fields; the notes column keeps any
  /// further delimiters. `None` if the line has fewer than eight fields.
  pub fn split(line: &str) -> Option<Self> {
    let fields: Vec<String> = split_fields(line);
    let [date, time, weight, body_fat, water, muscle_mass, bmi, notes]: [String; FIELD_COUNT] =
      fields.try_into().ok()?;
    Some(Self {
      date,
      time,
      weight,
      body_fat,
      water,
      muscle_mass,
      bmi,
      notes,
    })
  }
}

fn split_fields(line: &str) -> Vec<String> {
  line
    .splitn(FIELD_COUNT, DELIMITER)
    .map(|field| strip_quotes(field).to_string())
    .collect()
}

/// Remove one leading and one trailing quote, only when both are there
fn strip_quotes(field: &str) -> &str {
  if field.len() >= 2 && field.starts_with(QUOTE) && field.ends_with(QUOTE) {
    &field[1..field.len() - 1]
  } else {
    field
  }
}

/// Parse `dd.mm.yy` + `HH:MM` as scale-local time
pub fn parse_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, String> {
  let raw = format!("{} {}", date.trim(), time.trim());
  let naive = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
    .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))?;

  // Two-digit years belong to this century, never the 1900s
  let naive = if naive.year() < 2000 {
    naive
      .with_year(naive.year() + 100)
      .ok_or_else(|| format!("invalid timestamp {:?}", raw))?
  } else {
    naive
  };

  let zone = FixedOffset::east_opt(SCALE_UTC_OFFSET_SECONDS)
    .ok_or_else(|| "invalid scale time zone".to_string())?;
  zone
    .from_local_datetime(&naive)
    .single()
    .map(|dt| dt.with_timezone(&Utc))
    .ok_or_else(|| format!("invalid timestamp {:?}", raw))
}

/// German number format: `,` decimals, `.` grouping. Empty means absent.
pub fn parse_decimal(raw: &str) -> Result<Option<f64>, String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }

  let normalized: String = trimmed
    .chars()
    .filter(|c| *c != '.')
    .map(|c| if c == ',' { '.' } else { c })
    .collect();

  match normalized.parse::<f64>() {
    Ok(value) if value.is_finite() => Ok(Some(value)),
    _ => Err(format!("not a number: {:?}", raw)),
  }
}

/// Undo the two escaping layers of the notes column.
///
/// The first layer is a JSON string body (`\n`, `\"`, `\\`, `\uXXXX`); the
/// scale then escapes backslashes and quotes once more, which survive the
/// first pass as `\\` and `\"`. Bare quotes and raw control characters are
/// kept as they are, so text without backslashes comes back unchanged.
pub fn unescape_notes(raw: &str) -> Result<Option<String>, String> {
  if raw.is_empty() {
    return Ok(None);
  }

  let decoded: String = serde_json::from_str(&string_literal(raw))
    .map_err(|e| format!("invalid notes escape: {}", e))?;

  let mut notes = String::with_capacity(decoded.len());
  let mut chars = decoded.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(&next) = chars.peek() {
        if next == '\\' || next == '"' {
          notes.push(next);
          chars.next();
          continue;
        }
      }
    }
    notes.push(c);
  }

  Ok(Some(notes))
}

/// Wrap a notes body in quotes, escaping only what a JSON string cannot hold
/// literally. Existing `\` escapes are left for the decoder.
fn string_literal(raw: &str) -> String {
  let mut literal = String::with_capacity(raw.len() + 2);
  literal.push(QUOTE);
  let mut chars = raw.chars();
  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        literal.push(c);
        if let Some(escaped) = chars.next() {
          literal.push(escaped);
        }
      }
      QUOTE => literal.push_str("\\\""),
      c if u32::from(c) < 0x20 => literal.push_str(&format!("\\u{:04x}", u32::from(c))),
      c => literal.push(c),
    }
  }
  literal.push(QUOTE);
  literal
}

/// Turn one data line into a measurement
pub fn parse_row<C>(
  line: &str,
  activity_level: Option<ActivityLevel>,
  calculator: &C,
) -> Result<NewMeasurement, String>
where
  C: MetabolicRateCalculator + ?Sized,
{
  let fields = CsvLine::split(line)
    .ok_or_else(|| format!("expected {} fields", FIELD_COUNT))?;

  let timestamp = parse_timestamp(&fields.date, &fields.time)?;
  let weight = parse_decimal(&fields.weight)?.ok_or_else(|| "missing weight".to_string())?;
  let body_fat_percent = parse_decimal(&fields.body_fat)?;
  let body_water_percent = parse_decimal(&fields.water)?;
  let muscle_mass_percent = parse_decimal(&fields.muscle_mass)?;
  let body_mass_index = parse_decimal(&fields.bmi)?;
  let notes = unescape_notes(&fields.notes)?;

  let metabolic_rate = match (activity_level, muscle_mass_percent) {
    (Some(level), Some(muscle)) => Some(round_to_digits(calculator.calculate(level, weight, muscle), 1)),
    _ => None,
  };

  Ok(NewMeasurement {
    timestamp,
    weight,
    body_fat_percent,
    body_water_percent,
    muscle_mass_percent,
    body_mass_index,
    metabolic_rate,
    activity_level,
    notes,
  })
}

/// ---------------------------------------------------------------------------
/// Import
/// ---------------------------------------------------------------------------

/// Decode the raw export bytes. The scale only ever writes ISO-8859-15.
pub fn decode(bytes: &[u8]) -> String {
  let (text, _) = encoding_rs::ISO_8859_15.decode_without_bom_handling(bytes);
  text.into_owned()
}

/// Import a CSV export into a profile, returns the number of stored records.
///
/// Nothing is committed unless every row parses and inserts.
pub async fn import_csv<C>(
  pool: &SqlitePool,
  bytes: &[u8],
  profile_id: i64,
  activity_level: Option<ActivityLevel>,
  calculator: &C,
) -> Result<usize, ImportError>
where
  C: MetabolicRateCalculator + ?Sized,
{
  let text = decode(bytes);
  let mut lines = text.lines();

  let header = split_fields(lines.next().unwrap_or_default());
  if header != EXPECTED_HEADER {
    warn!(?header, "Rejecting import with unexpected header");
    return Err(ImportError::MalformedHeader { found: header });
  }

  info!(profile_id, bytes = bytes.len(), ?activity_level, "Importing measurements");

  let mut tx = pool.begin().await?;
  let mut imported = 0usize;

  for (index, line) in lines.enumerate() {
    // header is line 1
    let line_number = index + 2;
    if line.trim().is_empty() {
      continue;
    }

    let measurement = parse_row(line, activity_level, calculator).map_err(|reason| {
      warn!(line_number, %reason, "Aborting import on malformed row");
      ImportError::MalformedRow {
        line_number,
        line: line.to_string(),
        reason,
      }
    })?;

    store::insert_measurement(&mut tx, profile_id, &measurement).await?;
    imported += 1;
    debug!(line_number, timestamp = %measurement.timestamp, "Imported measurement");
  }

  tx.commit().await?;

  info!(profile_id, imported, "Import complete");

  Ok(imported)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

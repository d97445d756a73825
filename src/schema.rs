//! Maps the provider's column names onto the canonical schema.
//!
//! Column names drift between yearly releases ("State Name" vs "state_name",
//! "AQI" vs "aqi_value"), so fields are located by case-insensitive substring
//! rules instead of exact names.

use crate::aggregators::types::DailyReading;
use crate::error::YearError;
use crate::parser::RawTable;
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Date,
    StateName,
    CountyName,
    Aqi,
    StateCode,
    CountyCode,
}

impl CanonicalField {
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::StateName => "state_name",
            CanonicalField::CountyName => "county_name",
            CanonicalField::Aqi => "aqi",
            CanonicalField::StateCode => "state_code",
            CanonicalField::CountyCode => "county_code",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, CanonicalField::StateCode | CanonicalField::CountyCode)
    }
}

/// Substrings a lowercased column name must all contain to be picked for a
/// field. Rules are applied in this order and a column can only be claimed
/// once.
static FIELD_RULES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Date, &["date"]),
    (CanonicalField::StateName, &["state", "name"]),
    (CanonicalField::CountyName, &["county", "name"]),
    (CanonicalField::Aqi, &["aqi"]),
    (CanonicalField::StateCode, &["state", "code"]),
    (CanonicalField::CountyCode, &["county", "code"]),
];

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Column indices of the canonical fields within a [`RawTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: usize,
    pub state_name: usize,
    pub county_name: usize,
    pub aqi: usize,
    pub state_code: Option<usize>,
    pub county_code: Option<usize>,
}

impl ColumnMapping {
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Date => Some(self.date),
            CanonicalField::StateName => Some(self.state_name),
            CanonicalField::CountyName => Some(self.county_name),
            CanonicalField::Aqi => Some(self.aqi),
            CanonicalField::StateCode => self.state_code,
            CanonicalField::CountyCode => self.county_code,
        }
    }

    /// Pairs every canonical field with the raw column it resolved to.
    pub fn describe<'a>(&self, headers: &'a [String]) -> Vec<(CanonicalField, Option<&'a str>)> {
        FIELD_RULES
            .iter()
            .map(|(field, _)| {
                let column = self
                    .index_of(*field)
                    .and_then(|i| headers.get(i))
                    .map(String::as_str);
                (*field, column)
            })
            .collect()
    }
}

/// Rows that survived normalization, plus how many were discarded.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub readings: Vec<DailyReading>,
    pub dropped: usize,
}

/// Resolves each canonical field to the first unclaimed column, in column
/// order, whose lowercased name contains all of the field's substrings.
///
/// Fails with [`YearError::MissingColumns`] when a required field is left
/// unresolved. Code columns are optional.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMapping, YearError> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut claimed = vec![false; headers.len()];
    let mut resolved: Vec<(CanonicalField, Option<usize>)> = Vec::with_capacity(FIELD_RULES.len());

    for (field, needles) in FIELD_RULES {
        let hit = lowered
            .iter()
            .enumerate()
            .find(|(i, name)| !claimed[*i] && needles.iter().all(|n| name.contains(n)))
            .map(|(i, _)| i);

        if let Some(i) = hit {
            claimed[i] = true;
        }
        resolved.push((*field, hit));
    }

    let lookup = |field: CanonicalField| {
        resolved
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, idx)| *idx)
    };

    let missing: Vec<&'static str> = resolved
        .iter()
        .filter(|(field, idx)| field.is_required() && idx.is_none())
        .map(|(field, _)| field.name())
        .collect();

    match (
        lookup(CanonicalField::Date),
        lookup(CanonicalField::StateName),
        lookup(CanonicalField::CountyName),
        lookup(CanonicalField::Aqi),
    ) {
        (Some(date), Some(state_name), Some(county_name), Some(aqi)) => Ok(ColumnMapping {
            date,
            state_name,
            county_name,
            aqi,
            state_code: lookup(CanonicalField::StateCode),
            county_code: lookup(CanonicalField::CountyCode),
        }),
        _ => Err(YearError::MissingColumns {
            missing,
            available: headers.to_vec(),
        }),
    }
}

/// Turns a date cell into a grouping key. Recognised formats are rewritten
/// as `YYYY-MM-DD` so releases with different layouts still group together;
/// anything else is kept as the trimmed cell. Blank cells yield `None`.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok());
    Some(match parsed {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    })
}

/// Coerces a code cell to an integer. Blank or non-numeric cells yield `None`.
pub fn parse_code(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    })
}

pub fn parse_aqi(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads the code at `idx`. An absent column gives `Some(None)`; a resolved
/// column whose cell does not parse gives `None`, which drops the row.
fn code_cell(record: &StringRecord, idx: Option<usize>) -> Option<Option<u32>> {
    match idx {
        None => Some(None),
        Some(i) => record.get(i).and_then(parse_code).map(Some),
    }
}

fn to_reading(record: &StringRecord, mapping: &ColumnMapping) -> Option<DailyReading> {
    let date = normalize_date(record.get(mapping.date)?)?;
    let aqi = parse_aqi(record.get(mapping.aqi)?)?;
    let state_code = code_cell(record, mapping.state_code)?;
    let county_code = code_cell(record, mapping.county_code)?;

    Some(DailyReading {
        date,
        state_name: record.get(mapping.state_name)?.to_string(),
        county_name: record.get(mapping.county_name)?.to_string(),
        aqi,
        state_code,
        county_code,
    })
}

/// Projects every row of `table` onto the canonical schema. Rows with a blank
/// date, an unparseable AQI, or an unparseable value in a resolved code
/// column are dropped and counted.
pub fn normalize(table: &RawTable, mapping: &ColumnMapping) -> Normalized {
    let mut out = Normalized::default();

    for record in &table.rows {
        match to_reading(record, mapping) {
            Some(reading) => out.readings.push(reading),
            None => out.dropped += 1,
        }
    }

    if out.dropped > 0 {
        debug!(
            entry = %table.entry_name,
            dropped = out.dropped,
            "Dropped rows with blank date, bad AQI or bad codes"
        );
    }

    out
}

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use csv::{ReaderBuilder, Trim};

use crate::errors::{InputError, InputResult};

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new().trim(Trim::All).from_reader(source)
}

fn open(path: &Path) -> InputResult<File> {
    File::open(path).map_err(|e| InputError::io(path, e))
}

fn parse_number(table: &str, key: &str, raw: &str) -> InputResult<f64> {
    raw.parse::<f64>().map_err(|_| InputError::InvalidNumber {
        table: table.to_string(),
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Two-column `Parameter,Value` table
#[derive(Debug, Clone, Default)]
pub struct KeyValueTable {
    name: String,
    values: BTreeMap<String, String>,
}

impl KeyValueTable {
    pub fn from_path(path: &Path, name: &str) -> InputResult<Self> {
        Self::from_reader(open(path)?, name)
    }

    pub fn from_reader<R: Read>(source: R, name: &str) -> InputResult<Self> {
        let mut rdr = reader(source);
        let headers = rdr.headers().map_err(|e| InputError::csv(name, e))?.clone();
        for column in ["Parameter", "Value"] {
            if !headers.iter().any(|h| h == column) {
                return Err(InputError::missing_column(name, column));
            }
        }
        let key_index = headers.iter().position(|h| h == "Parameter").unwrap_or(0);
        let value_index = headers.iter().position(|h| h == "Value").unwrap_or(1);

        let mut values = BTreeMap::new();
        for record in rdr.records() {
            let record = record.map_err(|e| InputError::csv(name, e))?;
            if let (Some(key), Some(value)) = (record.get(key_index), record.get(value_index)) {
                values.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Self { name: name.to_string(), values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_f64(&self, key: &str) -> InputResult<f64> {
        let raw = self
            .values
            .get(key)
            .ok_or_else(|| InputError::missing_parameter(&self.name, key))?;
        parse_number(&self.name, key, raw)
    }

    /// Absent and empty values are both `None`
    pub fn get_optional_f64(&self, key: &str) -> InputResult<Option<f64>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse_number(&self.name, key, raw).map(Some),
        }
    }
}

/// One row of a [`WideTable`]
#[derive(Debug, Clone)]
pub struct TableRow<'a> {
    table: &'a str,
    key: &'a str,
    cells: &'a BTreeMap<String, String>,
}

impl<'a> TableRow<'a> {
    pub fn key(&self) -> &str {
        self.key
    }

    pub fn text(&self, column: &str) -> InputResult<&'a str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| InputError::missing_column(self.table, column))
    }

    pub fn f64(&self, column: &str) -> InputResult<f64> {
        let raw = self.text(column)?;
        parse_number(self.table, &format!("{} / {}", self.key, column), raw)
    }
}

/// Table keyed by one column, with every other column addressed by header name.
/// Headers are checked against the required columns when the table is read.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    name: String,
    rows: Vec<(String, BTreeMap<String, String>)>,
}

impl WideTable {
    pub fn from_path(path: &Path, name: &str, key_column: &str, required: &[&str]) -> InputResult<Self> {
        Self::from_reader(open(path)?, name, key_column, required)
    }

    pub fn from_reader<R: Read>(source: R, name: &str, key_column: &str, required: &[&str]) -> InputResult<Self> {
        let mut rdr = reader(source);
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| InputError::csv(name, e))?
            .iter()
            .map(str::to_string)
            .collect();

        for column in std::iter::once(&key_column).chain(required.iter()) {
            if !headers.iter().any(|h| h == column) {
                return Err(InputError::missing_column(name, *column));
            }
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| InputError::csv(name, e))?;
            let cells: BTreeMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            let key = cells.get(key_column).cloned().unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            rows.push((key, cells));
        }

        Ok(Self { name: name.to_string(), rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(move |(key, cells)| TableRow {
            table: &self.name,
            key,
            cells,
        })
    }

    pub fn row(&self, key: &str) -> Option<TableRow<'_>> {
        self.rows().find(|row| row.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_lookup_parses_numbers() {
        let csv = "Parameter,Value\nWater demand [L/kg H2],21\nWater specific cost [€/m3], 1.25 \nBlank,\n";
        let table = KeyValueTable::from_reader(csv.as_bytes(), "water").unwrap();

        assert_eq!(table.get_f64("Water demand [L/kg H2]").unwrap(), 21.0);
        assert_eq!(table.get_f64("Water specific cost [€/m3]").unwrap(), 1.25);
        assert_eq!(table.get_optional_f64("Blank").unwrap(), None);
        assert!(matches!(table.get_f64("Missing"), Err(InputError::MissingParameter { .. })));
    }

    #[test]
    fn key_value_rejects_text_values() {
        let table = KeyValueTable::from_reader("Parameter,Value\nRate,six\n".as_bytes(), "global").unwrap();
        assert!(matches!(table.get_f64("Rate"), Err(InputError::InvalidNumber { .. })));
    }

    #[test]
    fn wide_table_requires_unit_bearing_columns() {
        let csv = "Infrastructure,CAPEX [€/km]\nShort road,100\n";
        let err = WideTable::from_reader(csv.as_bytes(), "infra", "Infrastructure", &["CAPEX [€/km]", "OPEX [€/km/a]"])
            .unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { ref column, .. } if column == "OPEX [€/km/a]"));
    }

    #[test]
    fn wide_table_rows_are_addressed_by_key() {
        let csv = "Infrastructure,CAPEX [€/km],OPEX [€/km/a]\nShort road,100,10\nLong road,200,20\n";
        let table = WideTable::from_reader(csv.as_bytes(), "infra", "Infrastructure", &["CAPEX [€/km]"]).unwrap();

        assert_eq!(table.len(), 2);
        let long = table.row("Long road").unwrap();
        assert_eq!(long.f64("OPEX [€/km/a]").unwrap(), 20.0);
        assert!(table.row("Bridge").is_none());
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        let err = KeyValueTable::from_path(Path::new("/nonexistent/water_parameters.csv"), "water").unwrap_err();
        assert!(matches!(err, InputError::MissingFile { .. }));
    }
}

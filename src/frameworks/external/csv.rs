//! Minimal RFC 4180 reader for the CSV files Locust and JMeter write.

/// Splits `text` into records. Quoted fields may contain commas, doubled
/// quotes and line breaks. Blank lines are skipped.
pub(super) fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => finish_record(&mut records, &mut record, &mut field),
            other => field.push(other),
        }
    }
    finish_record(&mut records, &mut record, &mut field);
    records
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    if record.is_empty() && field.is_empty() {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

/// Header-indexed view over parsed records.
pub(super) struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(super) fn parse(text: &str) -> Option<Self> {
        let mut records = parse_records(text).into_iter();
        let header = records.next()?;
        Some(Self {
            header: header.into_iter().map(|name| name.trim().to_owned()).collect(),
            rows: records.collect(),
        })
    }

    pub(super) fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    pub(super) fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row { table: self, cells })
    }
}

pub(super) struct Row<'table> {
    table: &'table Table,
    cells: &'table [String],
}

impl Row<'_> {
    pub(super) fn get(&self, name: &str) -> Option<&str> {
        let index = self.table.column(name)?;
        self.cells.get(index).map(|cell| cell.trim())
    }

    /// Numeric cell; empty, `N/A` and unparsable values read as zero.
    pub(super) fn number(&self, name: &str) -> f64 {
        self.get(name)
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    pub(super) fn count(&self, name: &str) -> u64 {
        self.get(name)
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

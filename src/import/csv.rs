//! Reads transactions from CSV files.
//!
//! The expected file has a header line followed by rows with the columns
//! `title, type, value, category`:
//!
//! ```text
//! title,type,value,category
//! Salary,income,5000,Job
//! Rent,outcome,1200,Housing
//! ```

use std::{fs::File, io::BufReader, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    Error,
    models::{CategoryTitle, TransactionType},
};

const TITLE_COLUMN: usize = 0;
const TYPE_COLUMN: usize = 1;
const VALUE_COLUMN: usize = 2;
const CATEGORY_COLUMN: usize = 3;

/// A validated row from a CSV file that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// The line in the CSV file the row was read from.
    pub line: u64,
    /// A text description of what the transaction was for.
    pub title: String,
    /// Whether the money was earned or spent.
    pub kind: TransactionType,
    /// The amount of money earned or spent.
    pub value: f64,
    /// The title of the category the row belongs to, if the row has one.
    pub category: Option<CategoryTitle>,
}

/// The rows accepted from a CSV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
    /// The accepted rows in file order.
    pub rows: Vec<ParsedRow>,
    /// The category title of every accepted row that has one, in file order.
    ///
    /// Duplicates are kept, one entry per row.
    pub category_titles: Vec<CategoryTitle>,
}

/// Read the transactions in the CSV file at `path`.
///
/// The first line is treated as a header and skipped. Every cell is trimmed,
/// and rows with an empty title, type or value are dropped.
///
/// # Errors
/// This function will return a:
/// - [Error::ReadFile] if the file cannot be opened,
/// - [Error::InvalidCSV] if the file is not valid CSV,
/// - [Error::InvalidTransactionType] if a row's type is not "income" or "outcome",
/// - or [Error::InvalidValue] if a row's value is not a finite number.
pub fn parse_csv_file(path: &Path) -> Result<ParsedCsv, Error> {
    let file = File::open(path).map_err(|error| {
        tracing::debug!("Could not open {}: {error}", path.display());
        Error::ReadFile(format!("{}: {error}", path.display()))
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let mut parsed = ParsedCsv::default();
    let mut dropped_rows = 0;

    for result in reader.records() {
        let record = result.map_err(|error| Error::InvalidCSV(error.to_string()))?;

        match parse_record(&record)? {
            Some(row) => {
                if let Some(category) = &row.category {
                    parsed.category_titles.push(category.clone());
                }
                parsed.rows.push(row);
            }
            None => dropped_rows += 1,
        }
    }

    tracing::debug!(
        "Read {} rows from {}, dropped {dropped_rows} incomplete rows",
        parsed.rows.len(),
        path.display()
    );

    Ok(parsed)
}

/// Convert a record into a row, or `None` if the record is incomplete.
fn parse_record(record: &StringRecord) -> Result<Option<ParsedRow>, Error> {
    let line = record.position().map_or(0, |position| position.line());
    let cell = |column: usize| record.get(column).unwrap_or_default();

    let title = cell(TITLE_COLUMN);
    let kind = cell(TYPE_COLUMN);
    let value = cell(VALUE_COLUMN);

    if title.is_empty() || kind.is_empty() || value.is_empty() {
        tracing::debug!("Dropping incomplete row on line {line}: {record:?}");
        return Ok(None);
    }

    let kind = kind
        .parse::<TransactionType>()
        .map_err(|_| Error::InvalidTransactionType {
            line,
            value: kind.to_owned(),
        })?;

    let value = value
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| Error::InvalidValue {
            line,
            value: value.to_owned(),
        })?;

    let category = CategoryTitle::new(cell(CATEGORY_COLUMN)).ok();

    Ok(Some(ParsedRow {
        line,
        title: title.to_owned(),
        kind,
        value,
        category,
    }))
}

#[cfg(test)]
mod parse_csv_tests {
    use std::{io::Write, path::Path};

    use tempfile::NamedTempFile;

    use crate::{
        Error,
        import::csv::{ParsedRow, parse_csv_file},
        models::{CategoryTitle, TransactionType},
    };

    fn make_csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn title(raw_title: &str) -> CategoryTitle {
        CategoryTitle::new_unchecked(raw_title)
    }

    #[test]
    fn skips_header_and_reads_rows_in_order() {
        let file = make_csv_file(
            "title,type,value,category\n\
             Salary,income,5000,Job\n\
             Rent,outcome,1200,Housing\n",
        );

        let parsed = parse_csv_file(file.path()).unwrap();

        assert_eq!(
            parsed.rows,
            vec![
                ParsedRow {
                    line: 2,
                    title: "Salary".to_owned(),
                    kind: TransactionType::Income,
                    value: 5000.0,
                    category: Some(title("Job")),
                },
                ParsedRow {
                    line: 3,
                    title: "Rent".to_owned(),
                    kind: TransactionType::Outcome,
                    value: 1200.0,
                    category: Some(title("Housing")),
                },
            ]
        );
        assert_eq!(parsed.category_titles, vec![title("Job"), title("Housing")]);
    }

    #[test]
    fn trims_every_cell() {
        let file = make_csv_file(
            "title, type, value, category\n  Loan  , income ,  1500.50 ,  Others \n",
        );

        let parsed = parse_csv_file(file.path()).unwrap();

        let row = &parsed.rows[0];
        assert_eq!(row.title, "Loan");
        assert_eq!(row.kind, TransactionType::Income);
        assert_eq!(row.value, 1500.5);
        assert_eq!(row.category, Some(title("Others")));
    }

    #[test]
    fn drops_rows_missing_title_type_or_value() {
        let file = make_csv_file(
            "title,type,value,category\n\
             ,income,10,Job\n\
             Gift,,10,Job\n\
             Bonus,income,  ,Job\n\
             Short,income\n\
             Salary,income,5000,Job\n",
        );

        let parsed = parse_csv_file(file.path()).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].title, "Salary");
        assert_eq!(parsed.category_titles, vec![title("Job")]);
    }

    #[test]
    fn keeps_duplicate_category_titles() {
        let file = make_csv_file(
            "title,type,value,category\n\
             Burger,outcome,20,Food\n\
             Pizza,outcome,30,Food\n\
             Salary,income,5000,Job\n",
        );

        let parsed = parse_csv_file(file.path()).unwrap();

        assert_eq!(
            parsed.category_titles,
            vec![title("Food"), title("Food"), title("Job")]
        );
    }

    #[test]
    fn row_without_category_has_no_category_title() {
        let file = make_csv_file("title,type,value,category\nGift,income,50,\nTip,income,5\n");

        let parsed = parse_csv_file(file.path()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.rows.iter().all(|row| row.category.is_none()));
        assert!(parsed.category_titles.is_empty());
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let file = make_csv_file("title,type,value,category\n");

        let parsed = parse_csv_file(file.path()).unwrap();

        assert!(parsed.rows.is_empty());
        assert!(parsed.category_titles.is_empty());
    }

    #[test]
    fn fails_on_value_that_is_not_a_number() {
        let file = make_csv_file("title,type,value,category\nSalary,income,lots,Job\n");

        let result = parse_csv_file(file.path());

        assert_eq!(
            result,
            Err(Error::InvalidValue {
                line: 2,
                value: "lots".to_owned()
            })
        );
    }

    #[test]
    fn fails_on_value_that_is_not_finite() {
        let file = make_csv_file("title,type,value,category\nSalary,income,NaN,Job\n");

        let result = parse_csv_file(file.path());

        assert_eq!(
            result,
            Err(Error::InvalidValue {
                line: 2,
                value: "NaN".to_owned()
            })
        );
    }

    #[test]
    fn fails_on_unknown_type() {
        let file = make_csv_file(
            "title,type,value,category\nSalary,income,5000,Job\nRent,expense,1200,Housing\n",
        );

        let result = parse_csv_file(file.path());

        assert_eq!(
            result,
            Err(Error::InvalidTransactionType {
                line: 3,
                value: "expense".to_owned()
            })
        );
    }

    #[test]
    fn fails_on_missing_file() {
        let result = parse_csv_file(Path::new("/this/file/does/not/exist.csv"));

        assert!(
            matches!(result, Err(Error::ReadFile(_))),
            "want Error::ReadFile, got {result:?}"
        );
    }
}

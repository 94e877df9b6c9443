//! Loading of the currency spreadsheet into an ordered set of rows.
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not open spreadsheet at '{}'", .path.display())]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("The spreadsheet at '{}' does not contain any sheet", .path.display())]
    NoSheet { path: PathBuf },
    #[error("Could not read the first sheet of the spreadsheet at '{}'", .path.display())]
    Sheet {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("Cannot use '{0}' as delimiter")]
    InvalidDelimiter(char),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("The first row could not be used as header as the input is empty")]
    NoHeader,
}

#[derive(Clone, Debug)]
pub struct Options {
    /// The delimiter of CSV input, unused for spreadsheets.
    pub delimiter: char,
}

impl Default for Options {
    fn default() -> Self {
        Options { delimiter: ',' }
    }
}

/// A single value in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Anything that isn't text, like numbers or dates, in its display form.
    Value(String),
    Empty,
}

impl Cell {
    /// Return the text if this cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Value(_) | Cell::Empty => None,
        }
    }

    /// The representation used when writing the cell.
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(value) | Cell::Value(value) => value,
            Cell::Empty => "",
        }
    }
}

impl From<&calamine::Data> for Cell {
    fn from(value: &calamine::Data) -> Self {
        match value {
            calamine::Data::String(text) => Cell::Text(text.clone()),
            calamine::Data::Empty => Cell::Empty,
            other => Cell::Value(other.to_string()),
        }
    }
}

/// A header line and all rows below it, in the order they were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Load the table at `path`, reading it as CSV if its extension says so, or as the first sheet of a
    /// spreadsheet otherwise.
    pub fn from_path(path: impl AsRef<Path>, opts: Options) -> Result<Self, Error> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            let file = std::fs::File::open(path).map_err(csv::Error::from)?;
            Table::from_csv(file, opts)
        } else {
            Table::from_spreadsheet(path)
        }
    }

    /// Read the first sheet of the workbook at `path`, using its first row as header.
    pub fn from_spreadsheet(path: impl AsRef<Path>) -> Result<Self, Error> {
        use calamine::Reader;
        let path = path.as_ref();
        let mut workbook = calamine::open_workbook_auto(path).map_err(|err| Error::Open {
            path: path.into(),
            source: err,
        })?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::NoSheet { path: path.into() })?
            .map_err(|err| Error::Sheet {
                path: path.into(),
                source: err,
            })?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or(Error::NoHeader)?
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(Cell::from).collect()).collect();
        tracing::info!(rows = rows.len(), path = %path.display(), "loaded spreadsheet");
        Ok(Table { headers, rows })
    }

    /// Read CSV data with a header line from `csv`.
    pub fn from_csv(csv: impl std::io::Read, Options { delimiter }: Options) -> Result<Self, Error> {
        let delimiter = delimiter
            .try_into()
            .map_err(|_| Error::InvalidDelimiter(delimiter))?;
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(csv);
        let headers: Vec<String> = csv.headers()?.iter().map(ToOwned::to_owned).collect();
        if headers.is_empty() {
            return Err(Error::NoHeader);
        }

        let mut rows = Vec::new();
        for record in csv.into_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_owned())
                        }
                    })
                    .collect(),
            );
        }
        tracing::info!(rows = rows.len(), "loaded csv");
        Ok(Table { headers, rows })
    }

    /// Return the position of the column called `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

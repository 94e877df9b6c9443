use crate::pegs::Pegs;
use crate::table::Cell;
use std::borrow::Cow;

/// The marker after which the name of the currency a currency is pegged to follows.
pub const TIED_TO: &str = "tied to:";

/// The names of the columns appended to each row, in order.
pub const DERIVED_HEADERS: [&str; 4] = ["Sub Units", "Base", "Exponent", "Tied To"];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("A {kind} column named '{name}' could not be found in the header row")]
    MissingColumn { name: String, kind: &'static str },
    #[error("The currency description in row {row} is not text")]
    NonTextCurrency { row: usize },
    #[error("Could not parse currency description '{description}' in row {row}")]
    Description {
        row: usize,
        description: String,
        source: DescriptionError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    #[error("The conversion step '{segment}' has no value")]
    MissingToken { segment: String },
    #[error("The conversion value '{token}' is not an integer")]
    ParseNumber {
        token: String,
        source: std::num::ParseIntError,
    },
}

#[derive(Clone, Debug)]
pub struct Options {
    pub iso_column: String,
    pub currency_column: String,
    pub pegs: Pegs,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            iso_column: "ISO".into(),
            currency_column: "Currency".into(),
            pegs: Pegs::default(),
        }
    }
}

/// The base of a sub unit ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Single(String),
    /// One value per conversion step, for descriptions with more than one `=`.
    Chain(Vec<String>),
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base::Single(value) => f.write_str(value),
            Base::Chain(values) => {
                f.write_str("[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{value}'")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ratio {
    pub base: Base,
    pub exponent: String,
}

/// Everything that could be learned from a single currency description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// What is left of the description after the peg and the ratio were taken out.
    pub currency: String,
    pub sub_units: String,
    /// `None` if the description didn't mention any ratio.
    pub ratio: Option<Ratio>,
    /// The ISO code of the currency this one is pegged to.
    pub tied_to: Option<String>,
}

/// A row of the input along with the values derived from its description.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// All input cells, with the description replaced by what remained of it.
    pub cells: Vec<Cell>,
    pub sub_units: String,
    pub ratio: Option<Ratio>,
    pub tied_to: Option<String>,
}

/// The normalized table, with rows in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The input headers, without the derived ones.
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Parse a single currency `description`, using `iso` to name the sub unit if the description has no ratio.
pub fn parse_description(
    description: &str,
    iso: &str,
    pegs: &Pegs,
) -> Result<Description, DescriptionError> {
    let description = description
        .replace("_x000D_\n", " ")
        .replace("\r\n", " ")
        .replace("_x000D_", " ")
        .replace('\r', " ");

    let mut clauses = description.split(TIED_TO);
    let head = clauses.next().unwrap_or_default();
    let (mut currency, tied_to) = match clauses.next() {
        Some(name) => {
            let name = name.trim();
            let iso = pegs.lookup(name).map(ToOwned::to_owned);
            if iso.is_none() {
                tracing::debug!(name, "dropping peg to unknown currency");
            }
            (head.trim().to_owned(), iso)
        }
        None => (description.clone(), None),
    };

    let (sub_units, ratio) = match currency.find('1') {
        Some(pos) => {
            let phrase = currency[pos..].trim().to_owned();
            currency.truncate(pos);
            currency = currency.trim().to_owned();
            let ratio = parse_ratio(&phrase)?;
            (phrase, Some(ratio))
        }
        None => (format!("1 {iso}"), None),
    };

    Ok(Description {
        currency,
        sub_units,
        ratio,
        tied_to,
    })
}

/// `phrase` starts with the `1` of the unit and lists conversion steps separated by `=`.
fn parse_ratio(phrase: &str) -> Result<Ratio, DescriptionError> {
    let steps: Vec<_> = phrase.split('=').skip(1).collect();
    Ok(match steps.as_slice() {
        [step] => {
            let token = leading_token(step).ok_or_else(|| DescriptionError::MissingToken {
                segment: step.to_string(),
            })?;
            let number: i64 = token.parse().map_err(|err| DescriptionError::ParseNumber {
                token: token.to_owned(),
                source: err,
            })?;
            let sci = crate::scientific_notation(number);
            // A leading 1 counts as base 10 at the same exponent, written with two digits like in `1e+02`,
            // while all other digits add one to it.
            if sci.mantissa == 1 {
                Ratio {
                    base: Base::Single("10".into()),
                    exponent: format!("{:02}", sci.exponent),
                }
            } else {
                Ratio {
                    base: Base::Single(sci.mantissa.to_string()),
                    exponent: (sci.exponent + 1).to_string(),
                }
            }
        }
        steps => Ratio {
            base: Base::Chain(
                steps
                    .iter()
                    .map(|step| leading_token(step).unwrap_or_default().to_owned())
                    .collect(),
            ),
            exponent: "1".into(),
        },
    })
}

/// The first word of `step`, if it has one.
fn leading_token(step: &str) -> Option<&str> {
    step.split_whitespace().next()
}

impl Normalized {
    /// All headers of the output, starting with the unnamed index column.
    pub fn output_headers(&self) -> impl Iterator<Item = &str> {
        std::iter::once("")
            .chain(self.headers.iter().map(String::as_str))
            .chain(DERIVED_HEADERS)
    }

    /// All fields of the output row at `idx`, starting with its index.
    fn output_fields<'a>(&self, idx: usize, record: &'a Record) -> Vec<Cow<'a, str>> {
        let mut fields: Vec<Cow<'a, str>> =
            Vec::with_capacity(self.headers.len() + DERIVED_HEADERS.len() + 1);
        fields.push(idx.to_string().into());
        fields.extend(record.cells.iter().map(|cell| Cow::Borrowed(cell.as_str())));
        fields.push(record.sub_units.as_str().into());
        match &record.ratio {
            Some(Ratio { base, exponent }) => {
                fields.push(base.to_string().into());
                fields.push(exponent.as_str().into());
            }
            None => {
                fields.push("".into());
                fields.push("".into());
            }
        }
        fields.push(record.tied_to.as_deref().unwrap_or_default().into());
        fields
    }

    /// Write all records as comma-separated values, with a header line, to `out`.
    pub fn write_csv(&self, out: impl std::io::Write) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .from_writer(out);
        out.write_record(self.output_headers())?;
        for (idx, record) in self.records.iter().enumerate() {
            let fields = self.output_fields(idx, record);
            out.write_record(fields.iter().map(|field| field.as_bytes()))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write all records for human consumption, with columns padded to the same width.
    pub fn write_table(&self, mut out: impl std::io::Write) -> std::io::Result<()> {
        let headers: Vec<Cow<'_, str>> = self.output_headers().map(Cow::Borrowed).collect();
        let lines: Vec<Vec<Cow<'_, str>>> = std::iter::once(headers)
            .chain(
                self.records
                    .iter()
                    .enumerate()
                    .map(|(idx, record)| self.output_fields(idx, record)),
            )
            .collect();
        let mut widths = Vec::<usize>::new();
        for line in &lines {
            for (column, field) in line.iter().enumerate() {
                let width = field.chars().count();
                match widths.get_mut(column) {
                    Some(max) => *max = (*max).max(width),
                    None => widths.push(width),
                }
            }
        }
        for line in &lines {
            let mut text = String::new();
            for (column, field) in line.iter().enumerate() {
                if column != 0 {
                    text.push_str("  ");
                }
                text.push_str(field);
                let padding = widths[column] - field.chars().count();
                text.extend(std::iter::repeat(' ').take(padding));
            }
            writeln!(out, "{}", text.trim_end())?;
        }
        out.flush()
    }
}

pub(crate) mod function {
    use crate::normalize::{parse_description, Description, Error, Normalized, Options, Record};
    use crate::table::{Cell, Table};

    /// Parse the description of each row in `table` and return the rows with their derived values, in order.
    pub fn normalize(
        table: &Table,
        Options {
            iso_column,
            currency_column,
            pegs,
        }: Options,
    ) -> Result<Normalized, Error> {
        let iso_index = table
            .column(&iso_column)
            .ok_or_else(|| Error::MissingColumn {
                name: iso_column.clone(),
                kind: "ISO",
            })?;
        let currency_index =
            table
                .column(&currency_column)
                .ok_or_else(|| Error::MissingColumn {
                    name: currency_column.clone(),
                    kind: "currency",
                })?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (row, cells) in table.rows.iter().enumerate() {
            let description = cells
                .get(currency_index)
                .and_then(Cell::as_text)
                .ok_or(Error::NonTextCurrency { row })?;
            let iso = cells.get(iso_index).map(Cell::as_str).unwrap_or_default();
            let Description {
                currency,
                sub_units,
                ratio,
                tied_to,
            } = parse_description(description, iso, &pegs).map_err(|err| {
                Error::Description {
                    row,
                    description: description.to_owned(),
                    source: err,
                }
            })?;
            if ratio.is_none() {
                tracing::debug!(row, iso, "no sub unit ratio in description");
            }

            let mut cells = cells.clone();
            cells[currency_index] = Cell::Text(currency);
            records.push(Record {
                cells,
                sub_units,
                ratio,
                tied_to,
            });
        }

        tracing::info!(
            rows = records.len(),
            pegged = records.iter().filter(|r| r.tied_to.is_some()).count(),
            without_ratio = records.iter().filter(|r| r.ratio.is_none()).count(),
            "normalized currency descriptions"
        );
        Ok(Normalized {
            headers: table.headers.clone(),
            records,
        })
    }
}

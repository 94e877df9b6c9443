//! The currencies other currencies can be tied to, by the name used in descriptions.
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to open peg table for reading")]
    Open(#[from] std::io::Error),
    #[error("Could not decode the peg table")]
    Decode(#[from] ron::de::SpannedError),
}

/// A lookup from the full currency name, as written after `tied to:`, to its ISO code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pegs {
    pub by_name: BTreeMap<String, String>,
}

impl Default for Pegs {
    fn default() -> Self {
        Pegs {
            by_name: [
                ("euro", "EUR"),
                ("US dollar", "USD"),
                ("Singapore dollar", "SGD"),
                ("Indian rupee", "INR"),
                ("New Zealand dollar", "NZD"),
                ("Sterling pound", "GBP"),
                ("Danish krone", "DKK"),
                ("Australian dollar", "AUD"),
                ("South African rand", "ZAR"),
                ("Hong Kong dollar", "HKD"),
                ("Sudanese pound", "SDG"),
            ]
            .into_iter()
            .map(|(name, iso)| (name.to_owned(), iso.to_owned()))
            .collect(),
        }
    }
}

impl Pegs {
    /// Read a peg table in RON format from `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(ron::de::from_reader(std::fs::File::open(path)?)?)
    }

    /// Return the ISO code for the currency called exactly `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }
}

use crate::error::PriceParseError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A product price at rest: an integer amount in minor currency units
/// (cents), or the sold-out sentinel. No other representation is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Price {
    /// Amount in minor currency units.
    Minor(u64),
    /// No purchasable price was found on the page.
    SoldOut,
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Minor(amount) => serializer.serialize_u64(*amount),
            Price::SoldOut => serializer.serialize_str("sold_out"),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Minor(u64),
            Tag(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Minor(amount) => Ok(Price::Minor(amount)),
            Raw::Tag(tag) if tag == "sold_out" => Ok(Price::SoldOut),
            Raw::Tag(tag) => Err(D::Error::custom(format!("unknown price value {tag:?}"))),
        }
    }
}

/// Per-shop price normalization strategy.
///
/// The punctuation rules are currency/locale-specific, so each shop picks
/// its format in configuration instead of sharing one global algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFormat {
    /// European formatting: `.` thousands separator, `,` decimal comma,
    /// optional trailing `,-` ("€1.234,50", "€10,-").
    #[default]
    Euro,
    /// Anglo formatting: `,` thousands separator, `.` decimal point.
    Plain,
}

impl PriceFormat {
    /// Normalizes raw price text into minor currency units.
    pub fn parse(&self, raw: &str) -> Result<u64, PriceParseError> {
        let digits = match self {
            PriceFormat::Euro => normalize_euro(raw),
            PriceFormat::Plain => normalize_plain(raw),
        };
        to_minor_units(&digits).ok_or_else(|| PriceParseError {
            text: raw.to_string(),
        })
    }
}

/// Strips currency symbols and whitespace, drops the trailing `,-`
/// convention, removes thousands-separator dots, and turns the decimal
/// comma into a decimal point.
fn normalize_euro(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !is_currency_symbol(*c))
        .collect();
    let stripped = stripped.strip_suffix(",-").unwrap_or(&stripped);
    let stripped = stripped.strip_suffix('-').unwrap_or(stripped);
    stripped.replace('.', "").replace(',', ".")
}

/// Strips currency symbols, whitespace and thousands-separator commas.
fn normalize_plain(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !is_currency_symbol(*c) && *c != ',')
        .collect()
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '€' | '$' | '£')
}

fn to_minor_units(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * 100.0).round() as u64)
}

//! Sector taxonomy: the eleven GICS US equity sectors and their SPDR ETFs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::errors::DataError;

/// A GICS sector tracked by the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Technology,
    Healthcare,
    Financial,
    ConsumerDiscretionary,
    ConsumerStaples,
    Industrial,
    Energy,
    Materials,
    Utilities,
    RealEstate,
    CommunicationServices,
}

impl Sector {
    /// All sectors, in GICS listing order
    pub fn all() -> &'static [Sector] {
        &[
            Sector::Technology,
            Sector::Healthcare,
            Sector::Financial,
            Sector::ConsumerDiscretionary,
            Sector::ConsumerStaples,
            Sector::Industrial,
            Sector::Energy,
            Sector::Materials,
            Sector::Utilities,
            Sector::RealEstate,
            Sector::CommunicationServices,
        ]
    }

    /// Human-readable sector name
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Healthcare => "Healthcare",
            Sector::Financial => "Financial",
            Sector::ConsumerDiscretionary => "Consumer Discretionary",
            Sector::ConsumerStaples => "Consumer Staples",
            Sector::Industrial => "Industrial",
            Sector::Energy => "Energy",
            Sector::Materials => "Materials",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
            Sector::CommunicationServices => "Communication Services",
        }
    }

    /// SPDR sector ETF ticker used for market data
    pub fn etf(&self) -> &'static str {
        match self {
            Sector::Technology => "XLK",
            Sector::Healthcare => "XLV",
            Sector::Financial => "XLF",
            Sector::ConsumerDiscretionary => "XLY",
            Sector::ConsumerStaples => "XLP",
            Sector::Industrial => "XLI",
            Sector::Energy => "XLE",
            Sector::Materials => "XLB",
            Sector::Utilities => "XLU",
            Sector::RealEstate => "XLRE",
            Sector::CommunicationServices => "XLC",
        }
    }

    /// News search query for this sector
    pub fn news_query(&self) -> String {
        format!("{} sector financial news", self.name())
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sector {
    type Err = DataError;

    /// Case-insensitive; accepts spaced, hyphenated, and underscored forms
    /// as well as the ETF ticker itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let sector = match normalized.as_str() {
            "technology" | "tech" | "xlk" => Sector::Technology,
            "healthcare" | "health" | "xlv" => Sector::Healthcare,
            "financial" | "financials" | "finance" | "xlf" => Sector::Financial,
            "consumerdiscretionary" | "discretionary" | "xly" => Sector::ConsumerDiscretionary,
            "consumerstaples" | "staples" | "xlp" => Sector::ConsumerStaples,
            "industrial" | "industrials" | "xli" => Sector::Industrial,
            "energy" | "xle" => Sector::Energy,
            "materials" | "xlb" => Sector::Materials,
            "utilities" | "xlu" => Sector::Utilities,
            "realestate" | "xlre" => Sector::RealEstate,
            "communicationservices" | "communication" | "communications" | "xlc" => {
                Sector::CommunicationServices
            }
            _ => return Err(DataError::UnknownSector(s.to_string())),
        };

        Ok(sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_forms() {
        assert_eq!("technology".parse::<Sector>().unwrap(), Sector::Technology);
        assert_eq!("Real Estate".parse::<Sector>().unwrap(), Sector::RealEstate);
        assert_eq!("real-estate".parse::<Sector>().unwrap(), Sector::RealEstate);
        assert_eq!(
            "consumer_staples".parse::<Sector>().unwrap(),
            Sector::ConsumerStaples
        );
        assert_eq!("XLE".parse::<Sector>().unwrap(), Sector::Energy);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("crypto".parse::<Sector>().is_err());
        assert!("".parse::<Sector>().is_err());
    }

    #[test]
    fn test_etf_mapping_is_unique() {
        let mut tickers: Vec<&str> = Sector::all().iter().map(|s| s.etf()).collect();
        tickers.sort_unstable();
        tickers.dedup();
        assert_eq!(tickers.len(), Sector::all().len());
    }

    #[test]
    fn test_news_query_format() {
        assert_eq!(
            Sector::Energy.news_query(),
            "Energy sector financial news"
        );
    }
}

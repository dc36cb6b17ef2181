use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// How a position is valued: market classes are marked to the latest quote,
/// fixed income accrues at a contracted annual rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Fund,
    Crypto,
    FixedIncome,
}

impl AssetClass {
    pub fn is_market_priced(&self) -> bool {
        !matches!(self, AssetClass::FixedIncome)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Fund => "Fund",
            AssetClass::Crypto => "Crypto",
            AssetClass::FixedIncome => "Fixed Income",
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AssetClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" | "stock" => Ok(AssetClass::Equity),
            "fund" | "mutual_fund" | "fii" => Ok(AssetClass::Fund),
            "crypto" => Ok(AssetClass::Crypto),
            "fixed_income" | "fixed-income" | "debt" | "cdb" => Ok(AssetClass::FixedIncome),
            _ => Err(anyhow::anyhow!("Invalid asset class: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_class() {
        assert_eq!("equity".parse::<AssetClass>().unwrap(), AssetClass::Equity);
        assert_eq!("Stock".parse::<AssetClass>().unwrap(), AssetClass::Equity);
        assert_eq!(
            "fixed_income".parse::<AssetClass>().unwrap(),
            AssetClass::FixedIncome
        );
        assert_eq!("CDB".parse::<AssetClass>().unwrap(), AssetClass::FixedIncome);
        assert!("bond?".parse::<AssetClass>().is_err());
    }

    #[test]
    fn test_market_priced_split() {
        assert!(AssetClass::Equity.is_market_priced());
        assert!(AssetClass::Fund.is_market_priced());
        assert!(AssetClass::Crypto.is_market_priced());
        assert!(!AssetClass::FixedIncome.is_market_priced());
    }

    #[test]
    fn test_serde_snake_case() {
        let class: AssetClass = serde_yaml::from_str("fixed_income").unwrap();
        assert_eq!(class, AssetClass::FixedIncome);
        assert_eq!(serde_yaml::to_string(&AssetClass::Equity).unwrap().trim(), "equity");
    }
}

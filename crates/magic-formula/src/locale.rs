use formula_core::ConfigError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Display language. Affects presentation strings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    #[serde(rename = "PT-BR")]
    PtBr,
    #[serde(rename = "EN-US")]
    EnUs,
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "PT-BR" => Ok(Language::PtBr),
            "EN-US" => Ok(Language::EnUs),
            other => Err(ConfigError::Invalid(format!(
                "LANGUAGE must be PT-BR or EN-US, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::PtBr => write!(f, "PT-BR"),
            Language::EnUs => write!(f, "EN-US"),
        }
    }
}

pub struct Strings {
    pub title: &'static str,
    pub caption: &'static str,
    pub logic_heading: &'static str,
    pub ticker: &'static str,
    pub report_date: &'static str,
    pub earnings_yield: &'static str,
    pub roic: &'static str,
    pub score: &'static str,
    pub rank: &'static str,
    pub empty: &'static str,
    pub failed: &'static str,
}

impl Language {
    pub fn strings(&self) -> Strings {
        match self {
            Language::PtBr => Strings {
                title: "Fórmula Mágica - Ações (TTM)",
                caption: "Dados fornecidos pela API Financial Modeling Prep",
                logic_heading: "Lógica da Fórmula Mágica",
                ticker: "Ticker",
                report_date: "Data",
                earnings_yield: "Earnings Yield",
                roic: "ROIC",
                score: "Pontuação",
                rank: "Classificação",
                empty: "Nenhuma empresa com dados suficientes para classificação.",
                failed: "Sem dados",
            },
            Language::EnUs => Strings {
                title: "Magic Formula - Stocks (TTM)",
                caption: "Data provided by Financial Modeling Prep API",
                logic_heading: "Magic Formula Logic",
                ticker: "Ticker",
                report_date: "Report Date",
                earnings_yield: "Earnings Yield",
                roic: "ROIC",
                score: "Score",
                rank: "Rank",
                empty: "No company had enough data to be ranked.",
                failed: "No data",
            },
        }
    }
}

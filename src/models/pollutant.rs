use serde::{Deserialize, Serialize};
use std::fmt;

/// The six measured pollutants, in dataset column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "pm2.5")]
    Pm25,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "so2")]
    So2,
    #[serde(rename = "no2")]
    No2,
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "o3")]
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// Column name used in the source CSV and in serialized tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2.5",
            Pollutant::Pm10 => "pm10",
            Pollutant::So2 => "so2",
            Pollutant::No2 => "no2",
            Pollutant::Co => "co",
            Pollutant::O3 => "o3",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.column_name() == s || p.display_name().to_lowercase() == s)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A numeric column that takes part in the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    Pollutant(Pollutant),
}

impl Variable {
    /// Temperature first, then the pollutants in column order.
    pub const CORRELATION_ORDER: [Variable; 7] = [
        Variable::Temperature,
        Variable::Pollutant(Pollutant::Pm25),
        Variable::Pollutant(Pollutant::Pm10),
        Variable::Pollutant(Pollutant::So2),
        Variable::Pollutant(Pollutant::No2),
        Variable::Pollutant(Pollutant::Co),
        Variable::Pollutant(Pollutant::O3),
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Variable::Temperature => "temp",
            Variable::Pollutant(p) => p.column_name(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Temperature => write!(f, "Temperature"),
            Variable::Pollutant(p) => write!(f, "{}", p),
        }
    }
}

/// Currencies accepted by the Georgian gateways.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
pub enum Currency {
    GEL,
    USD,
    EUR,
}

impl Currency {
    /// ISO 4217 numeric code, as sent on the wire by the card gateway.
    pub fn iso_4217(self) -> &'static str {
        match self {
            Self::GEL => "981",
            Self::USD => "840",
            Self::EUR => "978",
        }
    }

    pub fn from_iso_4217(code: &str) -> Option<Self> {
        match code {
            "981" => Some(Self::GEL),
            "840" => Some(Self::USD),
            "978" => Some(Self::EUR),
            _ => None,
        }
    }
}

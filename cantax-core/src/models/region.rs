use serde::{Deserialize, Serialize};

/// A tax jurisdiction: the federal government or a province/territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Federal,
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NewfoundlandAndLabrador,
    NorthwestTerritories,
    NovaScotia,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federal => "CA",
            Self::Alberta => "AB",
            Self::BritishColumbia => "BC",
            Self::Manitoba => "MB",
            Self::NewBrunswick => "NB",
            Self::NewfoundlandAndLabrador => "NL",
            Self::NorthwestTerritories => "NT",
            Self::NovaScotia => "NS",
            Self::Nunavut => "NU",
            Self::Ontario => "ON",
            Self::PrinceEdwardIsland => "PE",
            Self::Quebec => "QC",
            Self::Saskatchewan => "SK",
            Self::Yukon => "YT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CA" => Some(Self::Federal),
            "AB" => Some(Self::Alberta),
            "BC" => Some(Self::BritishColumbia),
            "MB" => Some(Self::Manitoba),
            "NB" => Some(Self::NewBrunswick),
            "NL" => Some(Self::NewfoundlandAndLabrador),
            "NT" => Some(Self::NorthwestTerritories),
            "NS" => Some(Self::NovaScotia),
            "NU" => Some(Self::Nunavut),
            "ON" => Some(Self::Ontario),
            "PE" => Some(Self::PrinceEdwardIsland),
            "QC" => Some(Self::Quebec),
            "SK" => Some(Self::Saskatchewan),
            "YT" => Some(Self::Yukon),
            _ => None,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_region() {
        let regions = [
            Region::Federal,
            Region::Alberta,
            Region::BritishColumbia,
            Region::Manitoba,
            Region::NewBrunswick,
            Region::NewfoundlandAndLabrador,
            Region::NorthwestTerritories,
            Region::NovaScotia,
            Region::Nunavut,
            Region::Ontario,
            Region::PrinceEdwardIsland,
            Region::Quebec,
            Region::Saskatchewan,
            Region::Yukon,
        ];

        for region in regions {
            assert_eq!(Region::parse(region.as_str()), Some(region));
        }
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert_eq!(Region::parse("XX"), None);
        assert_eq!(Region::parse("ca"), None);
    }

    #[test]
    fn display_uses_two_letter_code() {
        assert_eq!(Region::Federal.to_string(), "CA");
        assert_eq!(Region::Ontario.to_string(), "ON");
    }
}

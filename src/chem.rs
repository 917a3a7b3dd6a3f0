//! Static chemistry reference for the pollutant columns.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollutantKind {
    Primary,
    Secondary,
    PrimaryAndSecondary,
}

impl PollutantKind {
    pub fn label(self) -> &'static str {
        match self {
            PollutantKind::Primary => "Primary pollutant",
            PollutantKind::Secondary => "Secondary pollutant",
            PollutantKind::PrimaryAndSecondary => "Primary & secondary pollutant",
        }
    }
}

/// Reference card for one pollutant, keyed by its column name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PollutantInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub formula: &'static str,
    pub kind: PollutantKind,
    pub sources: &'static str,
    /// Reactions, one per line where relevant.
    pub chemistry: &'static str,
    pub health: &'static str,
}

pub static POLLUTANT_INFO: [PollutantInfo; 6] = [
    PollutantInfo {
        key: "PM2_5",
        name: "Particulate Matter 2.5",
        formula: "Mixture (≤ 2.5 μm)",
        kind: PollutantKind::PrimaryAndSecondary,
        sources: "Vehicle exhaust, biomass burning, industrial emissions, secondary formation from SO₂ and NOx.",
        chemistry: "Sulfates (from SO₂ oxidation), nitrates (from NOx), organic carbon and metals. \
                    Small enough to reach deep into the lungs.",
        health: "Irritates the lungs and reduces gas exchange; raises the risk of asthma, bronchitis and cardiovascular disease.",
    },
    PollutantInfo {
        key: "PM10",
        name: "Particulate Matter 10",
        formula: "Mixture (≤ 10 μm)",
        kind: PollutantKind::Primary,
        sources: "Dust, construction, road resuspension, fuel burning.",
        chemistry: "Coarse particles of dust, soil, metals and carbonaceous material. \
                    Penetrates less deeply than PM2.5.",
        health: "Irritation of eyes, nose and throat; respiratory problems.",
    },
    PollutantInfo {
        key: "NO2",
        name: "Nitrogen Dioxide",
        formula: "NO₂",
        kind: PollutantKind::PrimaryAndSecondary,
        sources: "High-temperature combustion in vehicles, power plants and industry.",
        chemistry: "Photolysis drives photochemical smog and ozone formation:\n\
                    NO₂ + hν → NO + O·\n\
                    O· + O₂ → O₃",
        health: "Irritates the respiratory tract, reduces lung function, aggravates asthma.",
    },
    PollutantInfo {
        key: "SO2",
        name: "Sulfur Dioxide",
        formula: "SO₂",
        kind: PollutantKind::Primary,
        sources: "Burning sulfur-bearing coal and oil, smelters.",
        chemistry: "Oxidises to SO₃, which forms sulfuric acid (acid rain):\n\
                    2 SO₂ + O₂ → 2 SO₃\n\
                    SO₃ + H₂O → H₂SO₄",
        health: "Irritates eyes, nose and throat; causes breathing difficulty; damages plants.",
    },
    PollutantInfo {
        key: "O3",
        name: "Ozone (tropospheric)",
        formula: "O₃",
        kind: PollutantKind::Secondary,
        sources: "Formed from NOx and volatile organic compounds (VOCs) under sunlight.",
        chemistry: "Key component of photochemical smog, produced by reactions of NO₂, O₂ and sunlight \
                    and further reactions with VOCs.",
        health: "Strong oxidant; damages lung tissue, causes chest pain and coughing.",
    },
    PollutantInfo {
        key: "CO",
        name: "Carbon Monoxide",
        formula: "CO",
        kind: PollutantKind::Primary,
        sources: "Incomplete combustion of carbon-based fuels (vehicles, stoves, generators).",
        chemistry: "Binds haemoglobin far more strongly than O₂, forming carboxyhaemoglobin:\n\
                    Hb + CO → HbCO",
        health: "Cuts oxygen supply to the body; headache and dizziness, fatal at high levels.",
    },
];

/// Look up the reference card for a pollutant column.
pub fn pollutant_info(key: &str) -> Option<&'static PollutantInfo> {
    POLLUTANT_INFO.iter().find(|p| p.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::POLLUTANTS;

    #[test]
    fn every_pollutant_column_has_a_card() {
        for key in POLLUTANTS {
            let info = pollutant_info(key).expect("reference entry");
            assert_eq!(info.key, key);
            assert!(!info.name.is_empty());
        }
        assert!(pollutant_info("AQI").is_none());
    }

    #[test]
    fn cards_follow_column_order() {
        let keys: Vec<_> = POLLUTANT_INFO.iter().map(|p| p.key).collect();
        assert_eq!(keys, POLLUTANTS);
    }
}

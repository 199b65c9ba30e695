//! Static catalog data: stock regions, contraband, territories, and venues.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::money::Cents;

/// A stock exchange region and the symbols it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRegion {
    pub name: &'static str,
    pub symbols: &'static [&'static str],
}

impl StockRegion {
    #[must_use]
    pub fn lists(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol)
    }
}

pub const STOCK_REGIONS: [StockRegion; 6] = [
    StockRegion {
        name: "Global Exchange",
        symbols: &["AURAX", "CYBRP", "ENRGY", "FINCO", "HYGEN"],
    },
    StockRegion {
        name: "Tech Innovations Hub",
        symbols: &["QUANT", "NEURO", "DATAM", "ROBOS", "SPACEX"],
    },
    StockRegion {
        name: "Emerging Markets League",
        symbols: &["AGROX", "INFRA", "MINEF", "TEXLA", "PHARM"],
    },
    StockRegion {
        name: "European Financial Core",
        symbols: &["LUXOR", "PRISM", "VANGU", "ALPHO", "ZETAO"],
    },
    StockRegion {
        name: "Asian Growth Nexus",
        symbols: &["KRYPT", "ZENIT", "DYNMC", "NEXUS", "OMEGA"],
    },
    StockRegion {
        name: "Latin American Ventures",
        symbols: &["SOLAR", "RAINF", "HARVST", "TRADE", "BRIGHT"],
    },
];

/// Every symbol across every region, in catalog order.
pub fn all_symbols() -> impl Iterator<Item = &'static str> {
    STOCK_REGIONS
        .iter()
        .flat_map(|region| region.symbols.iter().copied())
}

/// Contraband goods traded in the mafia territories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contraband {
    BlissDust,
    ShadowBloom,
    ViperVenom,
    CrimsonHaze,
    StarlightShard,
    IronWillDust,
    OceanEcho,
}

impl Contraband {
    pub const ALL: [Self; 7] = [
        Self::BlissDust,
        Self::ShadowBloom,
        Self::ViperVenom,
        Self::CrimsonHaze,
        Self::StarlightShard,
        Self::IronWillDust,
        Self::OceanEcho,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlissDust => "Bliss Dust",
            Self::ShadowBloom => "Shadow Bloom",
            Self::ViperVenom => "Viper Venom",
            Self::CrimsonHaze => "Crimson Haze",
            Self::StarlightShard => "Starlight Shard",
            Self::IronWillDust => "Iron Will Dust",
            Self::OceanEcho => "Ocean Echo",
        }
    }

    /// Base price range in whole dollars, before location volatility.
    #[must_use]
    pub const fn base_price_range(self) -> (f64, f64) {
        match self {
            Self::BlissDust => (50.0, 200.0),
            Self::ShadowBloom => (3_000.0, 10_000.0),
            Self::ViperVenom => (500.0, 2_000.0),
            Self::CrimsonHaze => (10_000.0, 30_000.0),
            Self::StarlightShard => (1_500.0, 5_000.0),
            Self::IronWillDust => (400.0, 1_500.0),
            Self::OceanEcho => (2_000.0, 8_000.0),
        }
    }
}

impl fmt::Display for Contraband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown contraband `{0}`")]
pub struct UnknownContraband(pub String);

impl FromStr for Contraband {
    type Err = UnknownContraband;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownContraband(wanted.to_string()))
    }
}

/// A mafia territory: what it trades and what it costs to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MafiaLocation {
    pub name: &'static str,
    pub contraband: &'static [Contraband],
    pub travel_cost: Cents,
}

impl MafiaLocation {
    #[must_use]
    pub fn trades(&self, item: Contraband) -> bool {
        self.contraband.contains(&item)
    }
}

pub const MAFIA_LOCATIONS: [MafiaLocation; 6] = [
    MafiaLocation {
        name: "New York",
        contraband: &[
            Contraband::CrimsonHaze,
            Contraband::ShadowBloom,
            Contraband::ViperVenom,
        ],
        travel_cost: Cents::from_dollars(500),
    },
    MafiaLocation {
        name: "Los Angeles",
        contraband: &[
            Contraband::StarlightShard,
            Contraband::ViperVenom,
            Contraband::BlissDust,
        ],
        travel_cost: Cents::from_dollars(450),
    },
    MafiaLocation {
        name: "Chicago",
        contraband: &[
            Contraband::BlissDust,
            Contraband::IronWillDust,
            Contraband::ShadowBloom,
        ],
        travel_cost: Cents::from_dollars(300),
    },
    MafiaLocation {
        name: "Miami",
        contraband: &[
            Contraband::BlissDust,
            Contraband::OceanEcho,
            Contraband::CrimsonHaze,
        ],
        travel_cost: Cents::from_dollars(400),
    },
    MafiaLocation {
        name: "Houston",
        contraband: &[
            Contraband::ShadowBloom,
            Contraband::CrimsonHaze,
            Contraband::ViperVenom,
        ],
        travel_cost: Cents::from_dollars(250),
    },
    MafiaLocation {
        name: "Denver",
        contraband: &[
            Contraband::StarlightShard,
            Contraband::IronWillDust,
            Contraband::BlissDust,
        ],
        travel_cost: Cents::from_dollars(200),
    },
];

pub const STARTING_MAFIA_LOCATION: &str = "Denver";

/// Index of a territory by name, case-insensitive.
#[must_use]
pub fn mafia_location_index(name: &str) -> Option<usize> {
    let wanted = name.trim();
    MAFIA_LOCATIONS
        .iter()
        .position(|loc| loc.name.eq_ignore_ascii_case(wanted))
}

/// Cheapest and most expensive travel cost across all territories.
#[must_use]
pub fn travel_cost_bounds() -> (Cents, Cents) {
    let costs = MAFIA_LOCATIONS.iter().map(|loc| loc.travel_cost);
    let min = costs.clone().min().unwrap_or(Cents::ZERO);
    let max = costs.max().unwrap_or(Cents::ZERO);
    (min, max)
}

/// A gambling venue with its bet bounds, odds, and payout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamblingVenue {
    pub name: &'static str,
    pub min_bet: Cents,
    pub max_bet: Cents,
    /// Probability of a winning draw in `[0, 1]`.
    pub odds: f64,
    pub entry_cost: Cents,
    pub multiplier: u32,
}

pub const GAMBLING_VENUES: [GamblingVenue; 3] = [
    GamblingVenue {
        name: "Boardwalk",
        min_bet: Cents::from_dollars(50),
        max_bet: Cents::from_dollars(5_000),
        odds: 0.30,
        entry_cost: Cents::ZERO,
        multiplier: 3,
    },
    GamblingVenue {
        name: "OldTown",
        min_bet: Cents::from_dollars(100),
        max_bet: Cents::from_dollars(10_000),
        odds: 0.40,
        entry_cost: Cents::from_dollars(500),
        multiplier: 4,
    },
    GamblingVenue {
        name: "Neon Strip",
        min_bet: Cents::from_dollars(200),
        max_bet: Cents::from_dollars(20_000),
        odds: 0.50,
        entry_cost: Cents::from_dollars(2_000),
        multiplier: 5,
    },
];

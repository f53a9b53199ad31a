use events::{Side, SteamId};

// Band edges, per valid (non bot) player. Pinned by golden tests rather
// than derived, the values follow common community usage.
pub const ECO_EQUIPMENT_CEILING: i32 = 1_000;
pub const FULL_BUY_FLOOR_CT: i32 = 4_500;
pub const FULL_BUY_FLOOR_T: i32 = 4_000;
pub const FORCE_BUY_REMAINING_CEILING: i32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EconomyType {
    Pistol,
    Eco,
    Semi,
    ForceBuy,
    Full,
}

/// Aggregated money figures for one team (or one player) going into a
/// round. `start_money` means before the buy phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EconomyFigures {
    pub start_money: i32,
    pub money_spent: i32,
    pub equipment_value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomyContext {
    pub side: Side,
    pub player_count: i32,
    pub lost_previous_round: bool,
    pub is_first_round_of_half: bool,
}

/// Banded classification of a rounds investment.
///
/// The first round of every half, overtime halves included, is a pistol
/// round by game rule. Above that the equipment value decides between eco
/// and full buy, with the force buy band reserved for teams spending down
/// to almost nothing right after losing a round.
pub fn classify(figures: EconomyFigures, ctx: EconomyContext) -> EconomyType {
    if ctx.is_first_round_of_half {
        return EconomyType::Pistol;
    }

    let players = ctx.player_count.max(1);
    if figures.equipment_value <= ECO_EQUIPMENT_CEILING * players {
        return EconomyType::Eco;
    }

    let full_floor = match ctx.side {
        Side::CounterTerrorist => FULL_BUY_FLOOR_CT,
        Side::Terrorist => FULL_BUY_FLOOR_T,
    };
    if figures.equipment_value >= full_floor * players {
        return EconomyType::Full;
    }

    let remaining = figures.start_money - figures.money_spent;
    if ctx.lost_previous_round && remaining < FORCE_BUY_REMAINING_CEILING * players {
        return EconomyType::ForceBuy;
    }

    EconomyType::Semi
}

pub fn classify_player(
    figures: EconomyFigures,
    side: Side,
    lost_previous_round: bool,
    is_first_round_of_half: bool,
) -> EconomyType {
    classify(
        figures,
        EconomyContext {
            side,
            player_count: 1,
            lost_previous_round,
            is_first_round_of_half,
        },
    )
}

/// Team level figures of a finalized round, with the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TeamEconomy {
    pub start_money: i32,
    pub money_spent: i32,
    pub equipment_value: i32,
    pub kind: EconomyType,
}

impl Default for TeamEconomy {
    fn default() -> Self {
        Self {
            start_money: 0,
            money_spent: 0,
            equipment_value: 0,
            kind: EconomyType::Eco,
        }
    }
}

/// Per player, per round money snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerEconomy {
    pub round_number: i32,
    pub player_steam_id: SteamId,
    pub player_name: String,
    pub player_side: Option<Side>,
    pub start_money: i32,
    pub money_spent: i32,
    pub equipment_value: i32,
    pub economy_type: EconomyType,
}

use events::{BombSite, RoundEndReason, Side, SteamId, WeaponClass};

use crate::economy::{PlayerEconomy, TeamEconomy};

/// A resolved kill with everything stats and clutch detection need: both
/// participants mapped to canonical accounts, sides and bot control flags
/// captured at the moment the event happened.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Kill {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub killer_steam_id: Option<SteamId>,
    pub killer_name: Option<String>,
    pub killer_side: Option<Side>,
    pub victim_steam_id: SteamId,
    pub victim_name: String,
    pub victim_side: Option<Side>,
    pub assister_steam_id: Option<SteamId>,
    pub assister_name: Option<String>,
    pub assister_side: Option<Side>,
    pub weapon: WeaponClass,
    pub is_headshot: bool,
    pub is_killer_controlling_bot: bool,
    pub is_victim_controlling_bot: bool,
    pub is_assister_controlling_bot: bool,
    pub is_trade_kill: bool,
    pub is_trade_death: bool,
}

impl Kill {
    /// World deaths (fall damage, round timer kills) count as suicides too.
    pub fn is_suicide(&self) -> bool {
        match self.killer_steam_id {
            Some(killer) => killer == self.victim_steam_id,
            None => true,
        }
    }

    pub fn is_team_kill(&self) -> bool {
        if self.is_suicide() {
            return false;
        }
        match (self.killer_side, self.victim_side) {
            (Some(killer), Some(victim)) => killer == victim,
            _ => false,
        }
    }

    /// A kill that counts towards the killers statistics.
    pub fn counts_for_killer(&self) -> bool {
        self.killer_steam_id.is_some()
            && !self.is_killer_controlling_bot
            && !self.is_suicide()
            && !self.is_team_kill()
    }

    /// A death that counts towards the victims statistics.
    pub fn counts_for_victim(&self) -> bool {
        !self.is_victim_controlling_bot && !self.is_suicide()
    }

    /// Assists against the assisters own side (flash assists on a team
    /// mate) never count, nor do assists made through a bot takeover.
    pub fn counts_for_assister(&self) -> bool {
        if self.assister_steam_id.is_none() || self.is_assister_controlling_bot {
            return false;
        }
        match (self.assister_side, self.victim_side) {
            (Some(assister), Some(victim)) => assister != victim,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Damage {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub attacker_steam_id: Option<SteamId>,
    pub attacker_side: Option<Side>,
    pub is_attacker_controlling_bot: bool,
    pub victim_steam_id: SteamId,
    pub victim_side: Option<Side>,
    pub is_victim_controlling_bot: bool,
    pub health_damage: i32,
    pub armor_damage: i32,
    pub weapon: WeaponClass,
}

impl Damage {
    /// Damage that counts towards the attackers totals: an opponent was
    /// hit, by a human, and not the attacker themselves.
    pub fn counts_for_attacker(&self) -> bool {
        let attacker = match self.attacker_steam_id {
            Some(attacker) => attacker,
            None => return false,
        };
        if attacker == self.victim_steam_id || self.is_attacker_controlling_bot {
            return false;
        }
        match (self.attacker_side, self.victim_side) {
            (Some(a), Some(v)) => a != v,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerBuy {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub player_steam_id: SteamId,
    pub player_name: String,
    pub player_side: Option<Side>,
    pub item: String,
    pub cost: i32,
    pub has_refunded: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BombPlant {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub site: BombSite,
    pub planter_steam_id: SteamId,
    pub planter_name: String,
    pub is_planter_controlling_bot: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BombDefusal {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub site: BombSite,
    pub defuser_steam_id: SteamId,
    pub defuser_name: String,
    pub is_defuser_controlling_bot: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BombExplosion {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub site: BombSite,
}

/// A player that was part of a round when it went live.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineupSlot {
    pub steam_id: SteamId,
    pub name: String,
    pub side: Side,
    pub controlling_bot: bool,
}

/// A mid round disconnect. Removed again if a bot takes the slot over,
/// since the body then stays in the round.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Departure {
    pub tick: i32,
    pub frame: i32,
    pub steam_id: SteamId,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointAward {
    pub steam_id: SteamId,
    pub points: i32,
}

/// Working state of one round while events for it come in, and the record
/// handed to the economy/clutch/stats passes once the round has ended.
///
/// A restore throws the whole record away and starts over, so nothing in
/// here survives a rollback by accident.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoundRecord {
    pub number: i32,
    pub overtime_number: i32,
    pub start_tick: i32,
    pub start_frame: i32,
    pub freeze_time_end_tick: Option<i32>,
    pub freeze_time_end_frame: Option<i32>,
    pub end_tick: Option<i32>,
    pub end_frame: Option<i32>,
    pub end_officially_tick: Option<i32>,
    pub end_officially_frame: Option<i32>,
    pub team_a_name: String,
    pub team_b_name: String,
    pub team_a_side: Side,
    pub is_first_of_half: bool,
    pub winner_side: Option<Side>,
    pub end_reason: RoundEndReason,
    pub kills: Vec<Kill>,
    pub damages: Vec<Damage>,
    pub buys: Vec<PlayerBuy>,
    pub economies: Vec<PlayerEconomy>,
    pub team_a_economy: Option<TeamEconomy>,
    pub team_b_economy: Option<TeamEconomy>,
    pub bomb_plants: Vec<BombPlant>,
    pub bomb_defusals: Vec<BombDefusal>,
    pub bomb_explosions: Vec<BombExplosion>,
    pub mvp_steam_id: Option<SteamId>,
    pub point_awards: Vec<PointAward>,
    pub lineup: Vec<LineupSlot>,
    pub departures: Vec<Departure>,
}

impl RoundRecord {
    pub fn open(
        number: i32,
        overtime_number: i32,
        tick: i32,
        frame: i32,
        team_a_name: String,
        team_b_name: String,
        team_a_side: Side,
        is_first_of_half: bool,
    ) -> Self {
        Self {
            number,
            overtime_number,
            start_tick: tick,
            start_frame: frame,
            freeze_time_end_tick: None,
            freeze_time_end_frame: None,
            end_tick: None,
            end_frame: None,
            end_officially_tick: None,
            end_officially_frame: None,
            team_a_name,
            team_b_name,
            team_a_side,
            is_first_of_half,
            winner_side: None,
            end_reason: RoundEndReason::Unassigned,
            kills: Vec::new(),
            damages: Vec::new(),
            buys: Vec::new(),
            economies: Vec::new(),
            team_a_economy: None,
            team_b_economy: None,
            bomb_plants: Vec::new(),
            bomb_defusals: Vec::new(),
            bomb_explosions: Vec::new(),
            mvp_steam_id: None,
            point_awards: Vec::new(),
            lineup: Vec::new(),
            departures: Vec::new(),
        }
    }

    pub fn ended(&self) -> bool {
        self.end_tick.is_some()
    }

    pub fn team_b_side(&self) -> Side {
        self.team_a_side.other()
    }

    pub fn team_name_on(&self, side: Side) -> &str {
        if side == self.team_a_side {
            &self.team_a_name
        } else {
            &self.team_b_name
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner_side.map(|side| self.team_name_on(side))
    }

    /// Latest economy snapshot wins, the buy phase reports several.
    pub fn record_economy(&mut self, economy: PlayerEconomy) {
        match self
            .economies
            .iter_mut()
            .find(|e| e.player_steam_id == economy.player_steam_id)
        {
            Some(existing) => *existing = economy,
            None => self.economies.push(economy),
        }
    }

    pub fn lineup_count_on(&self, side: Side) -> i32 {
        self.lineup
            .iter()
            .filter(|slot| slot.side == side && !slot.controlling_bot)
            .count() as i32
    }

    /// True once every kill of the round was made with a knife, which marks
    /// a pre live knife round on platforms that play one.
    pub fn looks_like_knife_round(&self) -> bool {
        !self.kills.is_empty()
            && self
                .kills
                .iter()
                .all(|kill| kill.weapon == WeaponClass::Knife)
    }
}

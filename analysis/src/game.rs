use events::{DemoSource, RoundEndReason, Side, SteamId, UserId};

use crate::clutch::Clutch;
use crate::economy::{EconomyType, PlayerEconomy};
use crate::rounds::{BombDefusal, BombExplosion, BombPlant, Damage, Kill, PlayerBuy, RoundRecord};
use crate::stats::Player;

/// Stable logical team label. The label follows the team across side
/// swaps, team A is whichever team started the match on CT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum TeamLetter {
    A,
    B,
}

impl TeamLetter {
    pub fn other(self) -> TeamLetter {
        match self {
            TeamLetter::A => TeamLetter::B,
            TeamLetter::B => TeamLetter::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Team {
    pub letter: TeamLetter,
    pub name: String,
    pub score: i32,
    pub score_first_half: i32,
    pub score_second_half: i32,
    pub current_side: Side,
}

/// One finalized round of the reconstructed match.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub number: i32,
    pub overtime_number: i32,
    pub start_tick: i32,
    pub start_frame: i32,
    pub freeze_time_end_tick: Option<i32>,
    pub freeze_time_end_frame: Option<i32>,
    pub end_tick: i32,
    pub end_frame: i32,
    pub end_officially_tick: i32,
    pub end_officially_frame: i32,
    pub duration_millis: i64,
    pub end_reason: RoundEndReason,
    pub winner_side: Option<Side>,
    pub winner_name: Option<String>,
    pub team_a_name: String,
    pub team_b_name: String,
    pub team_a_side: Side,
    pub team_b_side: Side,
    pub team_a_score: i32,
    pub team_b_score: i32,
    pub team_a_start_money: i32,
    pub team_b_start_money: i32,
    pub team_a_money_spent: i32,
    pub team_b_money_spent: i32,
    pub team_a_equipment_value: i32,
    pub team_b_equipment_value: i32,
    pub team_a_economy_type: EconomyType,
    pub team_b_economy_type: EconomyType,
}

impl Round {
    pub fn winner_letter(&self) -> Option<TeamLetter> {
        self.winner_side.map(|side| {
            if side == self.team_a_side {
                TeamLetter::A
            } else {
                TeamLetter::B
            }
        })
    }
}

/// Non fatal irregularities found while reconstructing. The match result
/// is still usable, but callers can tell that data was skipped or guessed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Anomaly {
    OutOfOrderRoundStart { tick: i32, number: i32, expected: i32 },
    StaleRestore { tick: i32, number: i32 },
    MissingSideSwitch { round_number: i32 },
    MatchRestarted { tick: i32 },
    KnifeRoundDiscarded { tick: i32 },
    UnresolvedPlayer { tick: i32, user: UserId },
}

/// The finished, read only match model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Match {
    pub source: DemoSource,
    pub map_name: String,
    pub tick_rate: f64,
    pub max_rounds: i32,
    pub overtime_count: i32,
    pub team_a: Team,
    pub team_b: Team,
    pub winner: Option<TeamLetter>,
    pub rounds: Vec<Round>,
    pub players: Vec<Player>,
    pub kills: Vec<Kill>,
    pub damages: Vec<Damage>,
    pub buys: Vec<PlayerBuy>,
    pub player_economies: Vec<PlayerEconomy>,
    pub clutches: Vec<Clutch>,
    pub bomb_plants: Vec<BombPlant>,
    pub bomb_defusals: Vec<BombDefusal>,
    pub bomb_explosions: Vec<BombExplosion>,
    pub anomalies: Vec<Anomaly>,
}

impl Match {
    pub fn team(&self, letter: TeamLetter) -> &Team {
        match letter {
            TeamLetter::A => &self.team_a,
            TeamLetter::B => &self.team_b,
        }
    }

    pub fn team_on(&self, side: Side) -> &Team {
        if self.team_a.current_side == side {
            &self.team_a
        } else {
            &self.team_b
        }
    }

    pub fn winner(&self) -> Option<&Team> {
        self.winner.map(|letter| self.team(letter))
    }

    pub fn player(&self, steam_id: SteamId) -> Option<&Player> {
        self.players.iter().find(|p| p.steam_id == steam_id)
    }

    pub fn round(&self, number: i32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    pub fn kills_of_round(&self, number: i32) -> impl Iterator<Item = &Kill> {
        self.kills.iter().filter(move |k| k.round_number == number)
    }

    pub fn player_economy(&self, steam_id: SteamId, round_number: i32) -> Option<&PlayerEconomy> {
        self.player_economies
            .iter()
            .find(|e| e.player_steam_id == steam_id && e.round_number == round_number)
    }

    pub fn player_clutches(&self, steam_id: SteamId) -> impl Iterator<Item = &Clutch> {
        self.clutches
            .iter()
            .filter(move |c| c.clutcher_steam_id == steam_id)
    }

    pub fn one_vs_x_won_count(&self, steam_id: SteamId, opponent_count: i32) -> usize {
        self.player_clutches(steam_id)
            .filter(|c| c.opponent_count == opponent_count && c.has_won)
            .count()
    }

    pub fn one_vs_x_lost_count(&self, steam_id: SteamId, opponent_count: i32) -> usize {
        self.player_clutches(steam_id)
            .filter(|c| c.opponent_count == opponent_count && !c.has_won)
            .count()
    }

    pub fn kill_count(&self) -> i32 {
        self.players.iter().map(|p| p.kill_count).sum()
    }

    pub fn death_count(&self) -> i32 {
        self.players.iter().map(|p| p.death_count).sum()
    }

    pub fn assist_count(&self) -> i32 {
        self.players.iter().map(|p| p.assist_count).sum()
    }
}

/// Turns the finalized records into output rounds, stamping the running
/// scores and the half splits onto teams and rounds as it goes.
pub(crate) fn build_rounds(
    records: &[RoundRecord],
    tick_rate: f64,
    team_a: &mut Team,
    team_b: &mut Team,
) -> Vec<Round> {
    let mut rounds = Vec::with_capacity(records.len());
    let mut in_first_half = true;
    let mut previous_regulation_side: Option<Side> = None;

    for record in records.iter() {
        let end_tick = record.end_tick.unwrap_or(record.start_tick);
        let end_frame = record.end_frame.unwrap_or(record.start_frame);
        let team_a_economy = record.team_a_economy.unwrap_or_default();
        let team_b_economy = record.team_b_economy.unwrap_or_default();

        if record.overtime_number == 0 {
            if let Some(previous) = previous_regulation_side {
                if previous != record.team_a_side {
                    in_first_half = false;
                }
            }
            previous_regulation_side = Some(record.team_a_side);
        }

        if let Some(winner_side) = record.winner_side {
            let winner = if winner_side == record.team_a_side {
                &mut *team_a
            } else {
                &mut *team_b
            };
            winner.score += 1;
            if record.overtime_number == 0 {
                if in_first_half {
                    winner.score_first_half += 1;
                } else {
                    winner.score_second_half += 1;
                }
            }
        }

        let rate = if tick_rate > 0.0 { tick_rate } else { 64.0 };
        let duration_millis = ((end_tick - record.start_tick) as f64 / rate * 1000.0) as i64;

        rounds.push(Round {
            number: record.number,
            overtime_number: record.overtime_number,
            start_tick: record.start_tick,
            start_frame: record.start_frame,
            freeze_time_end_tick: record.freeze_time_end_tick,
            freeze_time_end_frame: record.freeze_time_end_frame,
            end_tick,
            end_frame,
            end_officially_tick: record.end_officially_tick.unwrap_or(end_tick),
            end_officially_frame: record.end_officially_frame.unwrap_or(end_frame),
            duration_millis,
            end_reason: record.end_reason,
            winner_side: record.winner_side,
            winner_name: record.winner_name().map(|name| name.to_owned()),
            team_a_name: record.team_a_name.clone(),
            team_b_name: record.team_b_name.clone(),
            team_a_side: record.team_a_side,
            team_b_side: record.team_b_side(),
            team_a_score: team_a.score,
            team_b_score: team_b.score,
            team_a_start_money: team_a_economy.start_money,
            team_b_start_money: team_b_economy.start_money,
            team_a_money_spent: team_a_economy.money_spent,
            team_b_money_spent: team_b_economy.money_spent,
            team_a_equipment_value: team_a_economy.equipment_value,
            team_b_equipment_value: team_b_economy.equipment_value,
            team_a_economy_type: team_a_economy.kind,
            team_b_economy_type: team_b_economy.kind,
        });
    }

    rounds
}

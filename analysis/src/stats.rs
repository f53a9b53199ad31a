use events::{SteamId, WeaponClass};

use crate::game::TeamLetter;
use crate::rounds::RoundRecord;

/// Lifetime counters and identity of one player over the whole match.
/// Everything here is attributed through the canonical account id, so
/// reconnects under a new session do not split a player in two.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub steam_id: SteamId,
    pub name: String,
    pub team_letter: Option<TeamLetter>,
    pub team_name: String,
    pub kill_count: i32,
    pub death_count: i32,
    pub assist_count: i32,
    pub headshot_count: i32,
    pub mvp_count: i32,
    pub score: i32,
    pub health_damage: i32,
    pub armor_damage: i32,
    pub utility_damage: i32,
    pub trade_kill_count: i32,
    pub trade_death_count: i32,
    pub first_kill_count: i32,
    pub first_death_count: i32,
    pub one_kill_count: i32,
    pub two_kill_count: i32,
    pub three_kill_count: i32,
    pub four_kill_count: i32,
    pub five_kill_count: i32,
    pub bomb_planted_count: i32,
    pub bomb_defused_count: i32,
    pub kast_round_count: i32,
    pub rounds_played: i32,
}

impl Player {
    pub(crate) fn new(steam_id: SteamId) -> Self {
        Self {
            steam_id,
            name: String::new(),
            team_letter: None,
            team_name: String::new(),
            kill_count: 0,
            death_count: 0,
            assist_count: 0,
            headshot_count: 0,
            mvp_count: 0,
            score: 0,
            health_damage: 0,
            armor_damage: 0,
            utility_damage: 0,
            trade_kill_count: 0,
            trade_death_count: 0,
            first_kill_count: 0,
            first_death_count: 0,
            one_kill_count: 0,
            two_kill_count: 0,
            three_kill_count: 0,
            four_kill_count: 0,
            five_kill_count: 0,
            bomb_planted_count: 0,
            bomb_defused_count: 0,
            kast_round_count: 0,
            rounds_played: 0,
        }
    }

    pub fn kill_death_ratio(&self) -> f64 {
        if self.death_count == 0 {
            return self.kill_count as f64;
        }
        self.kill_count as f64 / self.death_count as f64
    }

    pub fn headshot_percentage(&self) -> f64 {
        if self.kill_count == 0 {
            return 0.0;
        }
        self.headshot_count as f64 / self.kill_count as f64 * 100.0
    }

    pub fn average_damage_per_round(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        self.health_damage as f64 / self.rounds_played as f64
    }

    pub fn average_kills_per_round(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        self.kill_count as f64 / self.rounds_played as f64
    }

    pub fn average_deaths_per_round(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        self.death_count as f64 / self.rounds_played as f64
    }

    pub fn average_assists_per_round(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        self.assist_count as f64 / self.rounds_played as f64
    }

    /// Share of rounds with a kill, assist, survival or traded death.
    pub fn kast(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        self.kast_round_count as f64 / self.rounds_played as f64 * 100.0
    }

    pub fn impact(&self) -> f64 {
        2.13 * self.average_kills_per_round() + 0.42 * self.average_assists_per_round() - 0.41
    }

    /// Approximation of the HLTV 2.0 rating from the public coefficients.
    pub fn hltv_rating_2(&self) -> f64 {
        let rating = 0.0073 * self.kast() + 0.3591 * self.average_kills_per_round()
            - 0.5329 * self.average_deaths_per_round()
            + 0.2372 * self.impact()
            + 0.0032 * self.average_damage_per_round()
            + 0.1587;
        rating.max(0.0)
    }

    /// The legacy HLTV 1.0 rating.
    pub fn hltv_rating(&self) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        let rounds = self.rounds_played as f64;
        let kill_rating = self.kill_count as f64 / rounds / 0.679;
        let survival_rating = (rounds - self.death_count as f64) / rounds / 0.317;
        let multi_kill_rating = (self.one_kill_count as f64
            + 4.0 * self.two_kill_count as f64
            + 9.0 * self.three_kill_count as f64
            + 16.0 * self.four_kill_count as f64
            + 25.0 * self.five_kill_count as f64)
            / rounds
            / 1.277;

        (kill_rating + 0.7 * survival_rating + multi_kill_rating) / 2.7
    }
}

/// Folds one finalized round into the per player totals.
pub(crate) fn apply_round(
    players: &mut std::collections::BTreeMap<SteamId, Player>,
    round: &RoundRecord,
) {
    let mut kills_this_round = std::collections::HashMap::<SteamId, i32>::new();
    let mut died = std::collections::HashSet::<SteamId>::new();
    let mut assisted = std::collections::HashSet::<SteamId>::new();
    let mut traded = std::collections::HashSet::<SteamId>::new();

    for kill in round.kills.iter() {
        died.insert(kill.victim_steam_id);

        if kill.counts_for_victim() {
            let victim = entry(players, kill.victim_steam_id);
            victim.death_count += 1;
            if kill.is_trade_death {
                victim.trade_death_count += 1;
                traded.insert(kill.victim_steam_id);
            }
        }

        if kill.counts_for_killer() {
            if let Some(killer_id) = kill.killer_steam_id {
                *kills_this_round.entry(killer_id).or_default() += 1;
                let killer = entry(players, killer_id);
                killer.kill_count += 1;
                if kill.is_headshot {
                    killer.headshot_count += 1;
                }
                if kill.is_trade_kill {
                    killer.trade_kill_count += 1;
                }
            }
        }

        if kill.counts_for_assister() {
            if let Some(assister_id) = kill.assister_steam_id {
                assisted.insert(assister_id);
                entry(players, assister_id).assist_count += 1;
            }
        }
    }

    // Opening duel of the round, bot controlled entities never open.
    let opening = round.kills.iter().find(|kill| {
        kill.counts_for_killer() && !kill.is_victim_controlling_bot
    });
    if let Some(opening) = opening {
        if let Some(killer_id) = opening.killer_steam_id {
            entry(players, killer_id).first_kill_count += 1;
        }
        entry(players, opening.victim_steam_id).first_death_count += 1;
    }

    for damage in round.damages.iter() {
        if !damage.counts_for_attacker() {
            continue;
        }
        if let Some(attacker_id) = damage.attacker_steam_id {
            let attacker = entry(players, attacker_id);
            attacker.health_damage += damage.health_damage;
            attacker.armor_damage += damage.armor_damage;
            if damage.weapon == WeaponClass::Grenade {
                attacker.utility_damage += damage.health_damage;
            }
        }
    }

    if let Some(mvp) = round.mvp_steam_id {
        entry(players, mvp).mvp_count += 1;
    }

    for award in round.point_awards.iter() {
        entry(players, award.steam_id).score += award.points;
    }

    for plant in round.bomb_plants.iter() {
        if !plant.is_planter_controlling_bot {
            entry(players, plant.planter_steam_id).bomb_planted_count += 1;
        }
    }
    for defusal in round.bomb_defusals.iter() {
        if !defusal.is_defuser_controlling_bot {
            entry(players, defusal.defuser_steam_id).bomb_defused_count += 1;
        }
    }

    for (steam_id, count) in kills_this_round.iter() {
        let player = entry(players, *steam_id);
        match count {
            1 => player.one_kill_count += 1,
            2 => player.two_kill_count += 1,
            3 => player.three_kill_count += 1,
            4 => player.four_kill_count += 1,
            _ => player.five_kill_count += 1,
        }
    }

    for slot in round.lineup.iter() {
        if slot.controlling_bot {
            continue;
        }
        let kept_round = kills_this_round.contains_key(&slot.steam_id)
            || assisted.contains(&slot.steam_id)
            || traded.contains(&slot.steam_id)
            || !died.contains(&slot.steam_id);
        if kept_round {
            entry(players, slot.steam_id).kast_round_count += 1;
        }
    }
}

fn entry(
    players: &mut std::collections::BTreeMap<SteamId, Player>,
    steam_id: SteamId,
) -> &mut Player {
    players
        .entry(steam_id)
        .or_insert_with(|| Player::new(steam_id))
}

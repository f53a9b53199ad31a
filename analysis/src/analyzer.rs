use events::{Event, EventKind, RoundEndReason, Side, SteamId, UserId};

use crate::clutch::{self, Clutch};
use crate::economy::{self, EconomyContext, EconomyFigures, EconomyType, PlayerEconomy, TeamEconomy};
use crate::game::{self, Anomaly, Match, Team, TeamLetter};
use crate::roster::Roster;
use crate::rounds::{self, Departure, LineupSlot, PointAward, RoundRecord};
use crate::stats::{self, Player};
use crate::{AnalyzeError, AnalyzeOptions, SourceQuirks};

const DEFAULT_TICK_RATE: f64 = 64.0;
const DEFAULT_MAX_ROUNDS: i32 = 24;
const DEFAULT_TEAM_A_NAME: &str = "Team A";
const DEFAULT_TEAM_B_NAME: &str = "Team B";
const TRADE_KILL_DELAY_SECONDS: f64 = 5.0;
const EQUIPMENT_VALUE_DELAY_SECONDS: f64 = 7.0;

/// Stateful reconstruction of one match. Feed it the complete event stream
/// through [`MatchAnalyzer::ingest`] and collect the result with
/// [`MatchAnalyzer::finish`]; instances are single use and share nothing,
/// parallelism happens across matches, never within one.
#[derive(Debug)]
pub struct MatchAnalyzer {
    source: events::DemoSource,
    quirks: SourceQuirks,
    started: bool,
    ended: bool,
    map_name: String,
    tick_rate: f64,
    max_rounds: i32,
    overtime_count: i32,
    team_a_name: String,
    team_b_name: String,
    team_a_side: Side,
    is_first_round_of_half: bool,
    halftime_swap_guess: Option<i32>,
    current: Option<RoundRecord>,
    finalized: Vec<RoundRecord>,
    roster: Roster,
    anomalies: Vec<Anomaly>,
}

impl MatchAnalyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        let quirks = options
            .quirks
            .unwrap_or_else(|| SourceQuirks::for_source(options.source));

        let mut analyzer = Self {
            source: options.source,
            quirks,
            started: quirks.assume_match_started,
            ended: false,
            map_name: String::new(),
            tick_rate: DEFAULT_TICK_RATE,
            max_rounds: 0,
            overtime_count: 0,
            team_a_name: DEFAULT_TEAM_A_NAME.to_owned(),
            team_b_name: DEFAULT_TEAM_B_NAME.to_owned(),
            team_a_side: Side::CounterTerrorist,
            is_first_round_of_half: true,
            halftime_swap_guess: None,
            current: None,
            finalized: Vec::new(),
            roster: Roster::default(),
            anomalies: Vec::new(),
        };
        // Sources without a start marker are live from the first event on.
        if analyzer.started {
            analyzer.open_round(0, 0);
        }
        analyzer
    }

    pub fn ingest(&mut self, event: Event) {
        let Event { tick, frame, kind } = event;

        match kind {
            EventKind::MatchStart(start) => self.on_match_start(tick, frame, start),
            EventKind::MatchEnd => {
                if self.started {
                    self.ended = true;
                }
            }
            EventKind::RoundStart(start) => self.on_round_start(tick, frame, start),
            EventKind::RoundFreezetimeEnd => self.on_freezetime_end(tick, frame),
            EventKind::RoundEnd(end) => self.on_round_end(tick, frame, end),
            EventKind::RoundEndOfficial => self.on_round_end_official(tick, frame),
            EventKind::RoundRestore(restore) => self.on_round_restore(tick, frame, restore.number),
            EventKind::RoundMvp(mvp) => self.on_mvp(tick, mvp.user),
            EventKind::ScoreAward(award) => self.on_score_award(tick, award),
            EventKind::MaxRoundsChanged(changed) => {
                // convar reports outside (0, 99) are garbage
                if changed.max_rounds > 0 && changed.max_rounds < 99 {
                    self.max_rounds = changed.max_rounds;
                }
            }
            EventKind::OvertimeCountChanged(changed) => {
                if changed.count >= 0 {
                    self.overtime_count = changed.count;
                }
            }
            EventKind::TeamSideSwitch => self.on_side_switch(),
            EventKind::TeamNamesUpdated(names) => self.on_team_names(names),
            EventKind::TimeoutEnd => self.on_timeout_end(tick, frame),
            EventKind::PlayerConnect(connect) => {
                self.roster
                    .connect(connect.user, connect.steam_id, &connect.name, connect.side);
                self.refresh_lineup_in_freezetime();
            }
            EventKind::PlayerDisconnect(disconnect) => self.on_disconnect(tick, frame, disconnect.user),
            EventKind::PlayerBecomeBot(takeover) => self.on_become_bot(takeover.user),
            EventKind::PlayerTeamChange(change) => {
                self.roster.team_change(change.user, change.side);
                self.refresh_lineup_in_freezetime();
            }
            EventKind::Kill(kill) => self.on_kill(tick, frame, kill),
            EventKind::Damage(damage) => self.on_damage(tick, frame, damage),
            EventKind::ItemPurchase(purchase) => self.on_purchase(tick, frame, purchase),
            EventKind::ItemRefund(refund) => self.on_refund(tick, refund),
            EventKind::EconomyUpdate(update) => self.on_economy_update(tick, update),
            EventKind::BombPlanted(planted) => self.on_bomb_planted(tick, frame, planted),
            EventKind::BombDefused(defused) => self.on_bomb_defused(tick, frame, defused),
            EventKind::BombExploded(exploded) => self.on_bomb_exploded(tick, frame, exploded),
        }
    }

    /// Closes the trailing round, runs the economy/clutch/stats passes over
    /// the finalized records and assembles the match.
    pub fn finish(mut self) -> Result<Match, AnalyzeError> {
        if !self.started {
            return Err(AnalyzeError::NoMatchStart);
        }

        // The genuine final round often never sees the next round start,
        // it still counts as long as it carries an end.
        let last_tick = self
            .current
            .as_ref()
            .map(|current| current.end_tick.unwrap_or(current.start_tick))
            .unwrap_or(0);
        self.close_current(last_tick);

        self.classify_economies();

        let clutches: Vec<Clutch> = self
            .finalized
            .iter()
            .flat_map(|record| clutch::detect(record))
            .collect();

        let mut player_stats = std::collections::BTreeMap::<SteamId, Player>::new();
        for record in self.finalized.iter() {
            stats::apply_round(&mut player_stats, record);
        }

        let mut team_a = Team {
            letter: TeamLetter::A,
            name: self.team_a_name.clone(),
            score: 0,
            score_first_half: 0,
            score_second_half: 0,
            current_side: self.team_a_side,
        };
        let mut team_b = Team {
            letter: TeamLetter::B,
            name: self.team_b_name.clone(),
            score: 0,
            score_first_half: 0,
            score_second_half: 0,
            current_side: self.team_a_side.other(),
        };
        let rounds = game::build_rounds(&self.finalized, self.tick_rate, &mut team_a, &mut team_b);

        let winner = if team_a.score > team_b.score {
            Some(TeamLetter::A)
        } else if team_b.score > team_a.score {
            Some(TeamLetter::B)
        } else {
            None
        };

        let rounds_played = rounds.len() as i32;
        let mut players: Vec<Player> = Vec::new();
        for (steam_id, entry) in self.roster.players() {
            let mut player = player_stats
                .remove(&steam_id)
                .unwrap_or_else(|| Player::new(steam_id));
            player.name = entry.name.clone();
            player.rounds_played = rounds_played;
            if let Some(side) = entry.side {
                let letter = if side == self.team_a_side {
                    TeamLetter::A
                } else {
                    TeamLetter::B
                };
                player.team_letter = Some(letter);
                player.team_name = if letter == TeamLetter::A {
                    team_a.name.clone()
                } else {
                    team_b.name.clone()
                };
            }
            players.push(player);
        }
        for (steam_id, mut player) in player_stats {
            player.name = self.roster.name_of(steam_id);
            player.rounds_played = rounds_played;
            players.push(player);
        }
        players.sort_unstable_by_key(|player| player.steam_id);

        let mut kills = Vec::new();
        let mut damages = Vec::new();
        let mut buys = Vec::new();
        let mut player_economies = Vec::new();
        let mut bomb_plants = Vec::new();
        let mut bomb_defusals = Vec::new();
        let mut bomb_explosions = Vec::new();
        for mut record in std::mem::take(&mut self.finalized) {
            kills.append(&mut record.kills);
            damages.append(&mut record.damages);
            buys.append(&mut record.buys);
            player_economies.append(&mut record.economies);
            bomb_plants.append(&mut record.bomb_plants);
            bomb_defusals.append(&mut record.bomb_defusals);
            bomb_explosions.append(&mut record.bomb_explosions);
        }

        tracing::info!(
            rounds = rounds.len(),
            players = players.len(),
            anomalies = self.anomalies.len(),
            "match reconstructed"
        );

        let max_rounds = self.effective_max_rounds();
        Ok(Match {
            source: self.source,
            map_name: self.map_name,
            tick_rate: self.tick_rate,
            max_rounds,
            overtime_count: self.overtime_count,
            team_a,
            team_b,
            winner,
            rounds,
            players,
            kills,
            damages,
            buys,
            player_economies,
            clutches,
            bomb_plants,
            bomb_defusals,
            bomb_explosions,
            anomalies: self.anomalies,
        })
    }

    fn effective_max_rounds(&self) -> i32 {
        if self.max_rounds > 0 {
            self.max_rounds
        } else {
            DEFAULT_MAX_ROUNDS
        }
    }

    fn trade_window_ticks(&self) -> i32 {
        (TRADE_KILL_DELAY_SECONDS * self.tick_rate) as i32
    }

    fn equipment_delay_ticks(&self) -> i32 {
        (EQUIPMENT_VALUE_DELAY_SECONDS * self.tick_rate) as i32
    }

    fn live(&self) -> bool {
        self.started && !self.ended
    }

    fn lineup_snapshot(&self) -> Vec<LineupSlot> {
        self.roster
            .lineup()
            .map(|(steam_id, entry)| LineupSlot {
                steam_id,
                name: entry.name.clone(),
                side: entry.side.unwrap_or(Side::CounterTerrorist),
                controlling_bot: entry.controlling_bot,
            })
            .collect()
    }

    fn resolve_or_flag(&mut self, tick: i32, user: UserId) -> Option<SteamId> {
        match self.roster.resolve(user) {
            Some(steam_id) => Some(steam_id),
            None => {
                tracing::warn!(tick, user = user.0, "event references an unknown session, dropped");
                self.anomalies.push(Anomaly::UnresolvedPlayer { tick, user });
                None
            }
        }
    }

    fn on_match_start(&mut self, tick: i32, frame: i32, start: events::MatchStart) {
        let discards_data = self.started
            && (!self.finalized.is_empty()
                || self
                    .current
                    .as_ref()
                    .map(|current| !current.kills.is_empty())
                    .unwrap_or(false));
        if discards_data {
            // LO3 style restarts replay the match start, only data after
            // the last one counts
            tracing::warn!(tick, "match restarted, dropping previously reconstructed rounds");
            self.anomalies.push(Anomaly::MatchRestarted { tick });
        }

        self.started = true;
        self.ended = false;
        self.finalized.clear();
        self.current = None;
        self.overtime_count = 0;
        self.is_first_round_of_half = true;
        self.halftime_swap_guess = None;
        self.team_a_side = Side::CounterTerrorist;
        if !start.map_name.is_empty() {
            self.map_name = start.map_name;
        }
        if start.tick_rate > 0.0 {
            self.tick_rate = start.tick_rate;
        }

        self.open_round(tick, frame);
    }

    fn on_round_start(&mut self, tick: i32, frame: i32, start: events::RoundStart) {
        if !self.live() {
            return;
        }

        if let Some(current) = self.current.as_ref() {
            // Round numbering is positional, the reported number only
            // guards against replayed earlier rounds without a restore
            // marker.
            if start.number < current.number {
                tracing::warn!(
                    tick,
                    number = start.number,
                    expected = current.number,
                    "round start went backwards without a restore, dropped"
                );
                self.anomalies.push(Anomaly::OutOfOrderRoundStart {
                    tick,
                    number: start.number,
                    expected: current.number,
                });
                return;
            }
        }

        self.close_current(tick);
        self.open_round(tick, frame);
    }

    fn open_round(&mut self, tick: i32, frame: i32) {
        let number = self.finalized.len() as i32 + 1;
        // A pending guess is settled once the match moves past its round.
        if self.halftime_swap_guess != Some(number) {
            self.halftime_swap_guess = None;
        }

        let halftime_round = self.effective_max_rounds() / 2 + 1;
        if number == halftime_round && self.overtime_count == 0 && !self.is_first_round_of_half {
            tracing::warn!(
                round = number,
                "no side switch seen at halftime, swapping sides as a best guess"
            );
            self.anomalies
                .push(Anomaly::MissingSideSwitch { round_number: number });
            self.swap_sides();
            self.is_first_round_of_half = true;
            self.halftime_swap_guess = Some(number);
        }

        // Overtime periods start a new half even though the side switch
        // only comes mid period.
        let entering_overtime = self
            .finalized
            .last()
            .map(|last| last.overtime_number != self.overtime_count)
            .unwrap_or(false);
        let is_first = self.is_first_round_of_half || entering_overtime;
        self.is_first_round_of_half = false;

        let mut record = RoundRecord::open(
            number,
            self.overtime_count,
            tick,
            frame,
            self.team_a_name.clone(),
            self.team_b_name.clone(),
            self.team_a_side,
            is_first,
        );
        record.lineup = self.lineup_snapshot();
        self.current = Some(record);
    }

    /// Moves an ended current round into the finalized list. Unended rounds
    /// were cancelled by whatever comes next and are dropped.
    fn close_current(&mut self, tick: i32) {
        let current = match self.current.take() {
            Some(current) => current,
            None => return,
        };

        if !current.ended() {
            tracing::debug!(number = current.number, "dropping round without an end");
            // The replacement round takes over an unspent half start.
            self.is_first_round_of_half |= current.is_first_of_half;
            return;
        }

        if self.quirks.discard_knife_rounds && current.looks_like_knife_round() {
            tracing::warn!(
                tick,
                number = current.number,
                "knife round detected, starting reconstruction over"
            );
            self.anomalies.push(Anomaly::KnifeRoundDiscarded { tick });
            self.finalized.clear();
            self.overtime_count = 0;
            self.is_first_round_of_half = true;
            return;
        }

        self.finalized.push(current);
    }

    fn on_freezetime_end(&mut self, tick: i32, frame: i32) {
        if !self.live() {
            return;
        }
        let snapshot = self.lineup_snapshot();
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };
        if current.ended() {
            return;
        }
        current.freeze_time_end_tick = Some(tick);
        current.freeze_time_end_frame = Some(frame);
        current.lineup = snapshot;
    }

    fn on_round_end(&mut self, tick: i32, frame: i32, end: events::RoundEnd) {
        if !self.live() {
            return;
        }
        let defusal_map = self.map_name.starts_with("de_");
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };

        let mut reason = end.reason;
        if reason == RoundEndReason::Unassigned {
            if let Some(from_message) = RoundEndReason::from_end_message(&end.message) {
                reason = from_message;
            }
        }
        // The objective beats the generic win reason when both were seen.
        if reason == RoundEndReason::TerroristsWin && !current.bomb_explosions.is_empty() {
            reason = RoundEndReason::TargetBombed;
        }
        if reason == RoundEndReason::CtWin && !current.bomb_defusals.is_empty() {
            reason = RoundEndReason::BombDefused;
        }
        // Old captures label saved rounds on defusal maps as hostage wins.
        if reason == RoundEndReason::HostagesRescued && defusal_map {
            reason = RoundEndReason::TargetSaved;
        }

        current.end_tick = Some(tick);
        current.end_frame = Some(frame);
        current.winner_side = end.winner;
        current.end_reason = reason;
    }

    fn on_round_end_official(&mut self, tick: i32, frame: i32) {
        if !self.started {
            return;
        }
        if let Some(current) = self.current.as_mut() {
            if current.ended() {
                if current.end_officially_tick.is_none() {
                    current.end_officially_tick = Some(tick);
                    current.end_officially_frame = Some(frame);
                }
                return;
            }
        }
        if let Some(last) = self.finalized.last_mut() {
            if last.end_officially_tick.is_none() {
                last.end_officially_tick = Some(tick);
                last.end_officially_frame = Some(frame);
            }
        }
    }

    fn on_round_restore(&mut self, tick: i32, frame: i32, number: i32) {
        if !self.live() {
            return;
        }
        let current_number = match self.current.as_ref() {
            Some(current) => current.number,
            None => return,
        };

        if number > current_number || number < 1 {
            tracing::warn!(
                tick,
                number,
                current = current_number,
                "restore outside the reconstructed range, dropped"
            );
            self.anomalies.push(Anomaly::StaleRestore { tick, number });
            return;
        }

        if number == current_number {
            // The backup replays the round currently in progress, the
            // accumulator starts over and the replayed data is
            // authoritative.
            let is_first = self
                .current
                .as_ref()
                .map(|current| current.is_first_of_half)
                .unwrap_or(false);
            tracing::debug!(number, "restoring the current round from a backup");
            self.current = None;
            self.is_first_round_of_half = is_first;
            self.open_round(tick, frame);
            return;
        }

        // The backup goes further back and invalidates finalized rounds,
        // including any side mapping or period changes that happened since.
        let keep = (number - 1).max(0) as usize;
        let restored_side = self.finalized[keep].team_a_side;
        let restored_first = self.finalized[keep].is_first_of_half;
        let restored_overtime = self.finalized[keep].overtime_number;
        tracing::debug!(
            number,
            rolled_back = self.finalized.len() - keep,
            "restore rolls finalized rounds back"
        );
        self.finalized.truncate(keep);
        if self.team_a_side != restored_side {
            self.swap_sides();
        }
        self.current = None;
        self.is_first_round_of_half = restored_first;
        self.overtime_count = restored_overtime;
        self.open_round(tick, frame);
    }

    fn on_mvp(&mut self, tick: i32, user: UserId) {
        if !self.live() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        if let Some(current) = self.current.as_mut() {
            current.mvp_steam_id = Some(steam_id);
        }
    }

    fn on_score_award(&mut self, tick: i32, award: events::ScoreAward) {
        if !self.live() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, award.user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        if let Some(current) = self.current.as_mut() {
            current.point_awards.push(PointAward {
                steam_id,
                points: award.points,
            });
        }
    }

    fn swap_sides(&mut self) {
        self.team_a_side = self.team_a_side.other();
        self.roster.swap_sides();
    }

    fn on_side_switch(&mut self) {
        if !self.live() {
            return;
        }
        // The guessed halftime swap already happened, a late switch event
        // only confirms it.
        if let Some(number) = self.halftime_swap_guess.take() {
            tracing::debug!(round = number, "late switch event confirms the halftime swap");
            self.anomalies.retain(|anomaly| {
                !matches!(anomaly, Anomaly::MissingSideSwitch { round_number } if *round_number == number)
            });
            return;
        }
        self.swap_sides();
        self.is_first_round_of_half = true;

        // The switch can land right after the round start it belongs to.
        let team_a_side = self.team_a_side;
        let snapshot = self.lineup_snapshot();
        let mut patched = false;
        if let Some(current) = self.current.as_mut() {
            if !current.ended() && current.kills.is_empty() {
                current.team_a_side = team_a_side;
                current.is_first_of_half = true;
                current.lineup = snapshot;
                patched = true;
            }
        }
        if patched {
            self.is_first_round_of_half = false;
        }
    }

    fn on_team_names(&mut self, names: events::TeamNamesUpdated) {
        // Both sides reporting one name happens on broken captures.
        if names.ct_name == names.t_name {
            return;
        }
        if !names.ct_name.is_empty() {
            if self.team_a_side == Side::CounterTerrorist {
                self.team_a_name = names.ct_name;
            } else {
                self.team_b_name = names.ct_name;
            }
        }
        if !names.t_name.is_empty() {
            if self.team_a_side == Side::Terrorist {
                self.team_a_name = names.t_name;
            } else {
                self.team_b_name = names.t_name;
            }
        }

        let team_a_name = self.team_a_name.clone();
        let team_b_name = self.team_b_name.clone();
        if let Some(current) = self.current.as_mut() {
            if !current.ended() {
                current.team_a_name = team_a_name;
                current.team_b_name = team_b_name;
            }
        }
    }

    fn on_timeout_end(&mut self, tick: i32, frame: i32) {
        if !self.live() {
            return;
        }
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };
        // A tactical pause stretches the freeze time, play resumes here.
        if !current.ended() && current.kills.is_empty() && current.freeze_time_end_tick.is_some() {
            current.freeze_time_end_tick = Some(tick);
            current.freeze_time_end_frame = Some(frame);
        }
    }

    fn refresh_lineup_in_freezetime(&mut self) {
        let refresh = self
            .current
            .as_ref()
            .map(|current| !current.ended() && current.freeze_time_end_tick.is_none())
            .unwrap_or(false);
        if !refresh {
            return;
        }
        let snapshot = self.lineup_snapshot();
        if let Some(current) = self.current.as_mut() {
            current.lineup = snapshot;
        }
    }

    fn on_disconnect(&mut self, tick: i32, frame: i32, user: UserId) {
        let steam_id = match self.roster.disconnect(user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        if !self.live() {
            return;
        }
        let freezetime = self
            .current
            .as_ref()
            .map(|current| current.freeze_time_end_tick.is_none())
            .unwrap_or(true);
        if freezetime {
            // Not playing yet, the lineup just shrinks.
            self.refresh_lineup_in_freezetime();
            return;
        }
        if let Some(current) = self.current.as_mut() {
            if !current.ended() {
                current.departures.push(Departure {
                    tick,
                    frame,
                    steam_id,
                });
            }
        }
    }

    fn on_become_bot(&mut self, user: UserId) {
        let steam_id = match self.roster.become_bot(user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        // The bot keeps the body in the round, the player did not leave.
        if let Some(current) = self.current.as_mut() {
            current
                .departures
                .retain(|departure| departure.steam_id != steam_id);
        }
    }

    fn on_kill(&mut self, tick: i32, frame: i32, kill: events::Kill) {
        if !self.live() || self.current.is_none() {
            return;
        }

        let victim_steam_id = match self.resolve_or_flag(tick, kill.victim) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let killer_steam_id = match kill.killer {
            Some(user) => match self.resolve_or_flag(tick, user) {
                Some(steam_id) => Some(steam_id),
                None => return,
            },
            None => None,
        };
        // A bad assister reference does not invalidate the kill itself.
        let assister_steam_id = match kill.assister {
            Some(user) => self.resolve_or_flag(tick, user),
            None => None,
        };

        let victim_name = self.roster.name_of(victim_steam_id);
        let victim_side = self.roster.side_of(victim_steam_id);
        let is_victim_controlling_bot = self.roster.is_controlling_bot(victim_steam_id);
        let killer_name = killer_steam_id.map(|steam_id| self.roster.name_of(steam_id));
        let killer_side = killer_steam_id.and_then(|steam_id| self.roster.side_of(steam_id));
        let is_killer_controlling_bot = killer_steam_id
            .map(|steam_id| self.roster.is_controlling_bot(steam_id))
            .unwrap_or(false);
        let assister_name = assister_steam_id.map(|steam_id| self.roster.name_of(steam_id));
        let assister_side = assister_steam_id.and_then(|steam_id| self.roster.side_of(steam_id));
        let is_assister_controlling_bot = assister_steam_id
            .map(|steam_id| self.roster.is_controlling_bot(steam_id))
            .unwrap_or(false);

        let trade_window = self.trade_window_ticks();
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };

        let mut record = rounds::Kill {
            tick,
            frame,
            round_number: current.number,
            killer_steam_id,
            killer_name,
            killer_side,
            victim_steam_id,
            victim_name,
            victim_side,
            assister_steam_id,
            assister_name,
            assister_side,
            weapon: kill.weapon,
            is_headshot: kill.is_headshot,
            is_killer_controlling_bot,
            is_victim_controlling_bot,
            is_assister_controlling_bot,
            is_trade_kill: false,
            is_trade_death: false,
        };

        // An enemy kill avenging a team mate who died moments ago trades
        // both kills.
        if let Some(killer_side) = record.killer_side {
            if !record.is_suicide() && !record.is_team_kill() {
                for prior in current.kills.iter_mut() {
                    if prior.killer_steam_id == Some(victim_steam_id)
                        && prior.victim_side == Some(killer_side)
                        && tick - prior.tick <= trade_window
                    {
                        prior.is_trade_death = true;
                        record.is_trade_kill = true;
                    }
                }
            }
        }

        current.kills.push(record);
    }

    fn on_damage(&mut self, tick: i32, frame: i32, damage: events::Damage) {
        if !self.live() || self.current.is_none() {
            return;
        }

        let victim_steam_id = match self.resolve_or_flag(tick, damage.victim) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let attacker_steam_id = match damage.attacker {
            Some(user) => match self.resolve_or_flag(tick, user) {
                Some(steam_id) => Some(steam_id),
                None => return,
            },
            None => None,
        };

        let victim_side = self.roster.side_of(victim_steam_id);
        let is_victim_controlling_bot = self.roster.is_controlling_bot(victim_steam_id);
        let attacker_side = attacker_steam_id.and_then(|steam_id| self.roster.side_of(steam_id));
        let is_attacker_controlling_bot = attacker_steam_id
            .map(|steam_id| self.roster.is_controlling_bot(steam_id))
            .unwrap_or(false);

        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return,
        };
        current.damages.push(rounds::Damage {
            tick,
            frame,
            round_number: current.number,
            attacker_steam_id,
            attacker_side,
            is_attacker_controlling_bot,
            victim_steam_id,
            victim_side,
            is_victim_controlling_bot,
            health_damage: damage.health_damage.max(0),
            armor_damage: damage.armor_damage.max(0),
            weapon: damage.weapon,
        });
    }

    fn on_purchase(&mut self, tick: i32, frame: i32, purchase: events::ItemPurchase) {
        if !self.live() || self.current.is_none() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, purchase.user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let player_name = self.roster.name_of(steam_id);
        let player_side = self.roster.side_of(steam_id);
        if let Some(current) = self.current.as_mut() {
            current.buys.push(rounds::PlayerBuy {
                tick,
                frame,
                round_number: current.number,
                player_steam_id: steam_id,
                player_name,
                player_side,
                item: purchase.item,
                cost: purchase.cost,
                has_refunded: false,
            });
        }
    }

    fn on_refund(&mut self, tick: i32, refund: events::ItemRefund) {
        if !self.live() || self.current.is_none() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, refund.user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        if let Some(current) = self.current.as_mut() {
            let buy = current.buys.iter_mut().rev().find(|buy| {
                buy.player_steam_id == steam_id && buy.item == refund.item && !buy.has_refunded
            });
            if let Some(buy) = buy {
                buy.has_refunded = true;
            }
        }
    }

    fn on_economy_update(&mut self, tick: i32, update: events::EconomyUpdate) {
        if !self.live() || self.current.is_none() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, update.user) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let player_name = self.roster.name_of(steam_id);
        let player_side = self.roster.side_of(steam_id);
        let equipment_delay = self.equipment_delay_ticks();
        if let Some(current) = self.current.as_mut() {
            // Snapshots keep coming for a moment after the freeze time,
            // anything later is mid round noise.
            if let Some(freeze_end) = current.freeze_time_end_tick {
                if tick > freeze_end + equipment_delay {
                    return;
                }
            }
            current.record_economy(PlayerEconomy {
                round_number: current.number,
                player_steam_id: steam_id,
                player_name,
                player_side,
                start_money: update.start_money,
                money_spent: update.money_spent,
                equipment_value: update.equipment_value,
                economy_type: EconomyType::Eco,
            });
        }
    }

    fn on_bomb_planted(&mut self, tick: i32, frame: i32, planted: events::BombPlanted) {
        if !self.live() || self.current.is_none() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, planted.planter) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let planter_name = self.roster.name_of(steam_id);
        let is_planter_controlling_bot = self.roster.is_controlling_bot(steam_id);
        if let Some(current) = self.current.as_mut() {
            current.bomb_plants.push(rounds::BombPlant {
                tick,
                frame,
                round_number: current.number,
                site: planted.site,
                planter_steam_id: steam_id,
                planter_name,
                is_planter_controlling_bot,
            });
        }
    }

    fn on_bomb_defused(&mut self, tick: i32, frame: i32, defused: events::BombDefused) {
        if !self.live() || self.current.is_none() {
            return;
        }
        let steam_id = match self.resolve_or_flag(tick, defused.defuser) {
            Some(steam_id) => steam_id,
            None => return,
        };
        let defuser_name = self.roster.name_of(steam_id);
        let is_defuser_controlling_bot = self.roster.is_controlling_bot(steam_id);
        if let Some(current) = self.current.as_mut() {
            current.bomb_defusals.push(rounds::BombDefusal {
                tick,
                frame,
                round_number: current.number,
                site: defused.site,
                defuser_steam_id: steam_id,
                defuser_name,
                is_defuser_controlling_bot,
            });
        }
    }

    fn on_bomb_exploded(&mut self, tick: i32, frame: i32, exploded: events::BombExploded) {
        if !self.live() {
            return;
        }
        if let Some(current) = self.current.as_mut() {
            current.bomb_explosions.push(rounds::BombExplosion {
                tick,
                frame,
                round_number: current.number,
                site: exploded.site,
            });
        }
    }

    /// Fills team and player economy classifications once all rounds are
    /// final, walking them in order so loss context lines up.
    fn classify_economies(&mut self) {
        let mut previous_winner: Option<Side> = None;

        for record in self.finalized.iter_mut() {
            let sides = [record.team_a_side, record.team_b_side()];
            let mut team_economies = [TeamEconomy::default(), TeamEconomy::default()];

            for (index, side) in sides.into_iter().enumerate() {
                let lost_previous_round = previous_winner == Some(side.other());
                let mut figures = EconomyFigures::default();

                for economy in record.economies.iter_mut() {
                    if economy.player_side != Some(side) {
                        continue;
                    }
                    if record.number == 1 {
                        // The first round reports money with the opening
                        // buys already deducted.
                        economy.start_money += economy.money_spent;
                    }
                    figures.start_money += economy.start_money;
                    figures.money_spent += economy.money_spent;
                    figures.equipment_value += economy.equipment_value;

                    economy.economy_type = economy::classify_player(
                        EconomyFigures {
                            start_money: economy.start_money,
                            money_spent: economy.money_spent,
                            equipment_value: economy.equipment_value,
                        },
                        side,
                        lost_previous_round,
                        record.is_first_of_half,
                    );
                }

                team_economies[index] = TeamEconomy {
                    start_money: figures.start_money,
                    money_spent: figures.money_spent,
                    equipment_value: figures.equipment_value,
                    kind: economy::classify(
                        figures,
                        EconomyContext {
                            side,
                            player_count: record.lineup_count_on(side),
                            lost_previous_round,
                            is_first_round_of_half: record.is_first_of_half,
                        },
                    ),
                };
            }

            record.team_a_economy = Some(team_economies[0]);
            record.team_b_economy = Some(team_economies[1]);
            previous_winner = record.winner_side;
        }
    }
}

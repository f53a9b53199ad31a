#![allow(dead_code)]

use events::{
    BombDefused, BombExploded, BombPlanted, BombSite, Damage, EconomyUpdate, Event, EventKind,
    ItemPurchase, ItemRefund, Kill, MatchStart, MaxRoundsChanged, OvertimeCountChanged,
    PlayerBecomeBot, PlayerConnect, PlayerDisconnect, PlayerTeamChange, RoundEnd, RoundEndReason,
    RoundMvp, RoundRestore, RoundStart, ScoreAward, Side, SteamId, TeamNamesUpdated, UserId,
    WeaponClass,
};

pub const TICK_RATE: f64 = 64.0;

pub fn sid(user: i32) -> SteamId {
    SteamId(76_561_198_000_000_000 + user as u64)
}

/// Builds an ordered event stream for the analyzer. Ticks only move when
/// told to via [`StreamBuilder::at`] or [`StreamBuilder::advance`], so
/// tests stay in full control of timing sensitive behavior like trade
/// windows and clutch grouping.
pub struct StreamBuilder {
    tick: i32,
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self {
            tick: 0,
            events: Vec::new(),
        }
    }

    pub fn at(mut self, tick: i32) -> Self {
        self.tick = tick;
        self
    }

    pub fn advance(mut self, ticks: i32) -> Self {
        self.tick += ticks;
        self
    }

    pub fn seconds(self, seconds: f64) -> Self {
        let ticks = (seconds * TICK_RATE) as i32;
        self.advance(ticks)
    }

    fn push(mut self, kind: EventKind) -> Self {
        self.events.push(Event {
            tick: self.tick,
            frame: self.tick / 2,
            kind,
        });
        self
    }

    pub fn connect(self, user: i32, name: &str, side: Option<Side>) -> Self {
        self.connect_as(user, sid(user), name, side)
    }

    pub fn connect_as(self, user: i32, steam_id: SteamId, name: &str, side: Option<Side>) -> Self {
        self.push(EventKind::PlayerConnect(PlayerConnect {
            user: UserId(user),
            steam_id,
            name: name.to_owned(),
            side,
        }))
    }

    /// Users 1 to 5 on CT, users 6 to 10 on T, steam ids from [`sid`].
    pub fn connect_full_teams(mut self) -> Self {
        for user in 1..=5 {
            self = self.connect(user, &format!("player{user}"), Some(Side::CounterTerrorist));
        }
        for user in 6..=10 {
            self = self.connect(user, &format!("player{user}"), Some(Side::Terrorist));
        }
        self
    }

    pub fn match_start(self, map_name: &str) -> Self {
        self.push(EventKind::MatchStart(MatchStart {
            map_name: map_name.to_owned(),
            tick_rate: TICK_RATE,
        }))
    }

    pub fn match_end(self) -> Self {
        self.push(EventKind::MatchEnd)
    }

    pub fn max_rounds(self, max_rounds: i32) -> Self {
        self.push(EventKind::MaxRoundsChanged(MaxRoundsChanged { max_rounds }))
    }

    pub fn overtime(self, count: i32) -> Self {
        self.push(EventKind::OvertimeCountChanged(OvertimeCountChanged {
            count,
        }))
    }

    pub fn team_names(self, ct_name: &str, t_name: &str) -> Self {
        self.push(EventKind::TeamNamesUpdated(TeamNamesUpdated {
            ct_name: ct_name.to_owned(),
            t_name: t_name.to_owned(),
        }))
    }

    pub fn round_start(self, number: i32) -> Self {
        self.push(EventKind::RoundStart(RoundStart { number }))
    }

    pub fn freeze_end(self) -> Self {
        self.push(EventKind::RoundFreezetimeEnd)
    }

    pub fn round_end(self, winner: Side, reason: RoundEndReason) -> Self {
        self.round_end_raw(Some(winner), reason, "")
    }

    pub fn round_end_raw(
        self,
        winner: Option<Side>,
        reason: RoundEndReason,
        message: &str,
    ) -> Self {
        self.push(EventKind::RoundEnd(RoundEnd {
            winner,
            reason,
            message: message.to_owned(),
        }))
    }

    pub fn official_end(self) -> Self {
        self.push(EventKind::RoundEndOfficial)
    }

    pub fn restore(self, number: i32) -> Self {
        self.push(EventKind::RoundRestore(RoundRestore { number }))
    }

    pub fn side_switch(self) -> Self {
        self.push(EventKind::TeamSideSwitch)
    }

    pub fn timeout_end(self) -> Self {
        self.push(EventKind::TimeoutEnd)
    }

    pub fn mvp(self, user: i32) -> Self {
        self.push(EventKind::RoundMvp(RoundMvp { user: UserId(user) }))
    }

    pub fn score(self, user: i32, points: i32) -> Self {
        self.push(EventKind::ScoreAward(ScoreAward {
            user: UserId(user),
            points,
        }))
    }

    pub fn disconnect(self, user: i32) -> Self {
        self.push(EventKind::PlayerDisconnect(PlayerDisconnect {
            user: UserId(user),
        }))
    }

    pub fn become_bot(self, user: i32) -> Self {
        self.push(EventKind::PlayerBecomeBot(PlayerBecomeBot {
            user: UserId(user),
        }))
    }

    pub fn team_change(self, user: i32, side: Option<Side>) -> Self {
        self.push(EventKind::PlayerTeamChange(PlayerTeamChange {
            user: UserId(user),
            side,
        }))
    }

    pub fn kill(self, killer: i32, victim: i32) -> Self {
        self.kill_with(Some(killer), victim, None, WeaponClass::Rifle, false)
    }

    pub fn knife_kill(self, killer: i32, victim: i32) -> Self {
        self.kill_with(Some(killer), victim, None, WeaponClass::Knife, false)
    }

    pub fn kill_with(
        self,
        killer: Option<i32>,
        victim: i32,
        assister: Option<i32>,
        weapon: WeaponClass,
        is_headshot: bool,
    ) -> Self {
        self.push(EventKind::Kill(Kill {
            killer: killer.map(UserId),
            victim: UserId(victim),
            assister: assister.map(UserId),
            weapon,
            is_headshot,
        }))
    }

    pub fn damage(self, attacker: i32, victim: i32, health: i32, armor: i32) -> Self {
        self.damage_with(Some(attacker), victim, health, armor, WeaponClass::Rifle)
    }

    pub fn damage_with(
        self,
        attacker: Option<i32>,
        victim: i32,
        health: i32,
        armor: i32,
        weapon: WeaponClass,
    ) -> Self {
        self.push(EventKind::Damage(Damage {
            attacker: attacker.map(UserId),
            victim: UserId(victim),
            health_damage: health,
            armor_damage: armor,
            weapon,
        }))
    }

    pub fn buy(self, user: i32, item: &str, cost: i32) -> Self {
        self.push(EventKind::ItemPurchase(ItemPurchase {
            user: UserId(user),
            item: item.to_owned(),
            cost,
        }))
    }

    pub fn refund(self, user: i32, item: &str, cost: i32) -> Self {
        self.push(EventKind::ItemRefund(ItemRefund {
            user: UserId(user),
            item: item.to_owned(),
            cost,
        }))
    }

    pub fn economy(self, user: i32, start_money: i32, money_spent: i32, equipment_value: i32) -> Self {
        self.push(EventKind::EconomyUpdate(EconomyUpdate {
            user: UserId(user),
            start_money,
            money_spent,
            equipment_value,
        }))
    }

    pub fn bomb_planted(self, planter: i32, site: BombSite) -> Self {
        self.push(EventKind::BombPlanted(BombPlanted {
            planter: UserId(planter),
            site,
        }))
    }

    pub fn bomb_defused(self, defuser: i32, site: BombSite) -> Self {
        self.push(EventKind::BombDefused(BombDefused {
            defuser: UserId(defuser),
            site,
        }))
    }

    pub fn bomb_exploded(self, site: BombSite) -> Self {
        self.push(EventKind::BombExploded(BombExploded { site }))
    }

    /// One canonical round: start, freeze time, a single kill, the end for
    /// `winner` with a matching reason, officially ended. Users 1 and 6 are
    /// always on opposing teams, whatever the current sides are.
    pub fn play_round(self, number: i32, winner: Side) -> Self {
        let reason = match winner {
            Side::CounterTerrorist => RoundEndReason::CtWin,
            Side::Terrorist => RoundEndReason::TerroristsWin,
        };
        self.advance(64)
            .round_start(number)
            .seconds(15.0)
            .freeze_end()
            .seconds(20.0)
            .kill(1, 6)
            .seconds(25.0)
            .round_end(winner, reason)
            .seconds(2.0)
            .official_end()
    }

    pub fn build(self) -> Vec<Event> {
        self.events
    }
}

pub fn analyze(events: Vec<Event>) -> analysis::Match {
    analyze_from(events, events::DemoSource::Valve)
}

pub fn analyze_from(events: Vec<Event>, source: events::DemoSource) -> analysis::Match {
    analysis::analyze_match(events, analysis::AnalyzeOptions::for_source(source)).unwrap()
}

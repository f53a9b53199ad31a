//! Typed demo events shared between event sources and the analysis engine.
//!
//! An event source (demo decoder, log converter, test builder) produces an
//! ordered `Vec<Event>`; the analysis crate consumes it exactly once.

/// Transient per-session slot id handed out by the server. Reconnecting
/// players get a fresh one, so it must never be used as a stats key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct UserId(pub i32);

/// Canonical account id, stable across reconnects and bot takeovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SteamId(pub u64);

impl std::fmt::Display for SteamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    #[serde(rename = "CT")]
    CounterTerrorist,
    #[serde(rename = "T")]
    Terrorist,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::CounterTerrorist => Side::Terrorist,
            Side::Terrorist => Side::CounterTerrorist,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::CounterTerrorist => write!(f, "CT"),
            Side::Terrorist => write!(f, "T"),
        }
    }
}

/// The platform that produced the capture. Only used to pick minor
/// format quirks, never to change the core reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoSource {
    Cevo,
    Challengermode,
    Ebot,
    Esea,
    Esl,
    Esplay,
    Esportal,
    Faceit,
    Fastcup,
    #[serde(rename = "5eplay")]
    FiveEPlay,
    Gamersclub,
    MatchZy,
    PerfectWorld,
    PopFlash,
    Renown,
    Valve,
    Unknown,
}

pub static SUPPORTED_DEMO_SOURCES: &[DemoSource] = &[
    DemoSource::Challengermode,
    DemoSource::Ebot,
    DemoSource::Esea,
    DemoSource::Esl,
    DemoSource::Esplay,
    DemoSource::Esportal,
    DemoSource::Faceit,
    DemoSource::Fastcup,
    DemoSource::FiveEPlay,
    DemoSource::MatchZy,
    DemoSource::PerfectWorld,
    DemoSource::PopFlash,
    DemoSource::Renown,
    DemoSource::Valve,
];

impl DemoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DemoSource::Cevo => "cevo",
            DemoSource::Challengermode => "challengermode",
            DemoSource::Ebot => "ebot",
            DemoSource::Esea => "esea",
            DemoSource::Esl => "esl",
            DemoSource::Esplay => "esplay",
            DemoSource::Esportal => "esportal",
            DemoSource::Faceit => "faceit",
            DemoSource::Fastcup => "fastcup",
            DemoSource::FiveEPlay => "5eplay",
            DemoSource::Gamersclub => "gamersclub",
            DemoSource::MatchZy => "matchzy",
            DemoSource::PerfectWorld => "perfectworld",
            DemoSource::PopFlash => "popflash",
            DemoSource::Renown => "renown",
            DemoSource::Valve => "valve",
            DemoSource::Unknown => "unknown",
        }
    }

    pub fn is_supported(self) -> bool {
        SUPPORTED_DEMO_SOURCES.contains(&self)
    }
}

impl std::fmt::Display for DemoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DemoSource {
    type Err = UnknownDemoSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            DemoSource::Cevo,
            DemoSource::Challengermode,
            DemoSource::Ebot,
            DemoSource::Esea,
            DemoSource::Esl,
            DemoSource::Esplay,
            DemoSource::Esportal,
            DemoSource::Faceit,
            DemoSource::Fastcup,
            DemoSource::FiveEPlay,
            DemoSource::Gamersclub,
            DemoSource::MatchZy,
            DemoSource::PerfectWorld,
            DemoSource::PopFlash,
            DemoSource::Renown,
            DemoSource::Valve,
        ];
        all.into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownDemoSource(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDemoSource(pub String);

impl std::fmt::Display for UnknownDemoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown demo source {:?}", self.0)
    }
}

impl std::error::Error for UnknownDemoSource {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WeaponClass {
    Unknown,
    Pistol,
    Smg,
    Heavy,
    Rifle,
    Knife,
    Grenade,
    Equipment,
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BombSite {
    A,
    B,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RoundEndReason {
    Unassigned,
    TargetBombed,
    VipEscaped,
    VipKilled,
    TerroristsEscaped,
    CtStoppedEscape,
    TerroristsStopped,
    BombDefused,
    CtWin,
    TerroristsWin,
    Draw,
    HostagesRescued,
    TargetSaved,
    HostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TerroristsSurrender,
    CtSurrender,
    TerroristsPlanted,
    CtsReachedHostage,
}

// Raw reason codes as the game engine reports them in round_end events.
pub static ROUND_END_REASON_BY_CODE: phf::Map<i32, RoundEndReason> = phf::phf_map! {
    0_i32 => RoundEndReason::Unassigned,
    1_i32 => RoundEndReason::TargetBombed,
    2_i32 => RoundEndReason::VipEscaped,
    3_i32 => RoundEndReason::VipKilled,
    4_i32 => RoundEndReason::TerroristsEscaped,
    5_i32 => RoundEndReason::CtStoppedEscape,
    6_i32 => RoundEndReason::TerroristsStopped,
    7_i32 => RoundEndReason::BombDefused,
    8_i32 => RoundEndReason::CtWin,
    9_i32 => RoundEndReason::TerroristsWin,
    10_i32 => RoundEndReason::Draw,
    11_i32 => RoundEndReason::HostagesRescued,
    12_i32 => RoundEndReason::TargetSaved,
    13_i32 => RoundEndReason::HostagesNotRescued,
    14_i32 => RoundEndReason::TerroristsNotEscaped,
    15_i32 => RoundEndReason::VipNotEscaped,
    16_i32 => RoundEndReason::GameStart,
    17_i32 => RoundEndReason::TerroristsSurrender,
    18_i32 => RoundEndReason::CtSurrender,
    19_i32 => RoundEndReason::TerroristsPlanted,
    20_i32 => RoundEndReason::CtsReachedHostage,
};

impl RoundEndReason {
    pub fn from_code(code: i32) -> RoundEndReason {
        ROUND_END_REASON_BY_CODE
            .get(&code)
            .copied()
            .unwrap_or(RoundEndReason::Unassigned)
    }

    /// Some legacy captures report reason code 0 and only carry the
    /// localization token of the round end message.
    pub fn from_end_message(message: &str) -> Option<RoundEndReason> {
        match message {
            "#SFUI_Notice_Target_Bombed" => Some(RoundEndReason::TargetBombed),
            "#SFUI_Notice_Bomb_Defused" => Some(RoundEndReason::BombDefused),
            "#SFUI_Notice_CTs_Win" => Some(RoundEndReason::CtWin),
            "#SFUI_Notice_Terrorists_Win" => Some(RoundEndReason::TerroristsWin),
            "#SFUI_Notice_Target_Saved" => Some(RoundEndReason::TargetSaved),
            "#SFUI_Notice_All_Hostages_Rescued" => Some(RoundEndReason::HostagesRescued),
            "#SFUI_Notice_Hostages_Not_Rescued" => Some(RoundEndReason::HostagesNotRescued),
            "#SFUI_Notice_Round_Draw" => Some(RoundEndReason::Draw),
            "#SFUI_Notice_Terrorists_Surrender" => Some(RoundEndReason::TerroristsSurrender),
            "#SFUI_Notice_CTs_Surrender" => Some(RoundEndReason::CtSurrender),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub tick: i32,
    pub frame: i32,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    MatchStart(MatchStart),
    MatchEnd,
    RoundStart(RoundStart),
    RoundFreezetimeEnd,
    RoundEnd(RoundEnd),
    RoundEndOfficial,
    RoundRestore(RoundRestore),
    RoundMvp(RoundMvp),
    ScoreAward(ScoreAward),
    MaxRoundsChanged(MaxRoundsChanged),
    OvertimeCountChanged(OvertimeCountChanged),
    TeamSideSwitch,
    TeamNamesUpdated(TeamNamesUpdated),
    TimeoutEnd,
    PlayerConnect(PlayerConnect),
    PlayerDisconnect(PlayerDisconnect),
    PlayerBecomeBot(PlayerBecomeBot),
    PlayerTeamChange(PlayerTeamChange),
    Kill(Kill),
    Damage(Damage),
    ItemPurchase(ItemPurchase),
    ItemRefund(ItemRefund),
    EconomyUpdate(EconomyUpdate),
    BombPlanted(BombPlanted),
    BombDefused(BombDefused),
    BombExploded(BombExploded),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchStart {
    pub map_name: String,
    pub tick_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundStart {
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundEnd {
    pub winner: Option<Side>,
    pub reason: RoundEndReason,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundRestore {
    pub number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundMvp {
    pub user: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreAward {
    pub user: UserId,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaxRoundsChanged {
    pub max_rounds: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OvertimeCountChanged {
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TeamNamesUpdated {
    pub ct_name: String,
    pub t_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerConnect {
    pub user: UserId,
    pub steam_id: SteamId,
    pub name: String,
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerDisconnect {
    pub user: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerBecomeBot {
    pub user: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerTeamChange {
    pub user: UserId,
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Kill {
    pub killer: Option<UserId>,
    pub victim: UserId,
    pub assister: Option<UserId>,
    pub weapon: WeaponClass,
    pub is_headshot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Damage {
    pub attacker: Option<UserId>,
    pub victim: UserId,
    pub health_damage: i32,
    pub armor_damage: i32,
    pub weapon: WeaponClass,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemPurchase {
    pub user: UserId,
    pub item: String,
    pub cost: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemRefund {
    pub user: UserId,
    pub item: String,
    pub cost: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EconomyUpdate {
    pub user: UserId,
    pub start_money: i32,
    pub money_spent: i32,
    pub equipment_value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BombPlanted {
    pub planter: UserId,
    pub site: BombSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BombDefused {
    pub defuser: UserId,
    pub site: BombSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BombExploded {
    pub site: BombSite,
}

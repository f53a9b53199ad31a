use events::{Side, SteamId};

use crate::rounds::RoundRecord;

/// A 1 versus N endgame situation, at most one per team per round.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clutch {
    pub tick: i32,
    pub frame: i32,
    pub round_number: i32,
    pub side: Side,
    pub opponent_count: i32,
    pub has_won: bool,
    pub clutcher_steam_id: SteamId,
    pub clutcher_name: String,
    pub clutcher_survived: bool,
    pub clutcher_kill_count: i32,
}

struct Removal {
    tick: i32,
    frame: i32,
    steam_id: SteamId,
}

/// Replays the removals of a finalized round (deaths and mid round
/// disconnects) and reports the moments a team got cut down to one.
///
/// Removals are applied per tick as one block, so a team dropping from two
/// straight to zero on a single tick never counts as a clutch. Detection
/// runs only on finalized data, which makes restores a non issue: the
/// pruned round never gets here.
pub(crate) fn detect(round: &RoundRecord) -> Vec<Clutch> {
    let mut alive: Vec<(SteamId, Side)> = round
        .lineup
        .iter()
        .map(|slot| (slot.steam_id, slot.side))
        .collect();
    if alive.is_empty() {
        return Vec::new();
    }

    let mut removals: Vec<Removal> = round
        .kills
        .iter()
        .map(|kill| Removal {
            tick: kill.tick,
            frame: kill.frame,
            steam_id: kill.victim_steam_id,
        })
        .chain(round.departures.iter().map(|dep| Removal {
            tick: dep.tick,
            frame: dep.frame,
            steam_id: dep.steam_id,
        }))
        .collect();
    removals.sort_by_key(|removal| removal.tick);

    let alive_on = |alive: &[(SteamId, Side)], side: Side| {
        alive.iter().filter(|(_, s)| *s == side).count()
    };

    let mut begins: Vec<(Side, i32, i32, SteamId, i32)> = Vec::new();
    let mut index = 0;
    while index < removals.len() {
        let group_tick = removals[index].tick;
        let group_frame = removals[index].frame;
        while index < removals.len() && removals[index].tick == group_tick {
            let gone = removals[index].steam_id;
            alive.retain(|(steam_id, _)| *steam_id != gone);
            index += 1;
        }

        for side in [Side::CounterTerrorist, Side::Terrorist] {
            if begins.iter().any(|(s, ..)| *s == side) {
                continue;
            }
            let own = alive_on(&alive, side);
            let opponents = alive_on(&alive, side.other());
            if own == 1 && opponents >= 1 {
                let clutcher = alive
                    .iter()
                    .find(|(_, s)| *s == side)
                    .map(|(steam_id, _)| *steam_id);
                if let Some(clutcher) = clutcher {
                    begins.push((side, group_tick, group_frame, clutcher, opponents as i32));
                }
            }
        }
    }

    begins
        .into_iter()
        .map(|(side, tick, frame, clutcher, opponent_count)| {
            let clutcher_kill_count = round
                .kills
                .iter()
                .filter(|kill| {
                    kill.tick > tick
                        && kill.killer_steam_id == Some(clutcher)
                        && kill.victim_steam_id != clutcher
                })
                .count() as i32;
            let clutcher_survived = !round
                .kills
                .iter()
                .any(|kill| kill.victim_steam_id == clutcher);
            let clutcher_name = round
                .lineup
                .iter()
                .find(|slot| slot.steam_id == clutcher)
                .map(|slot| slot.name.clone())
                .unwrap_or_default();

            Clutch {
                tick,
                frame,
                round_number: round.number,
                side,
                opponent_count,
                has_won: round.winner_side == Some(side),
                clutcher_steam_id: clutcher,
                clutcher_name,
                clutcher_survived,
                clutcher_kill_count,
            }
        })
        .collect()
}

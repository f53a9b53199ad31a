use events::{RoundEndReason, Side};
use pretty_assertions::assert_eq;

use support::{analyze, sid, StreamBuilder};

mod support;

#[test]
fn one_versus_two_win() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_mirage")
            .advance(64)
            .round_start(1)
            .seconds(15.0)
            .freeze_end()
            .seconds(10.0)
            .kill(1, 8)
            .seconds(2.0)
            .kill(1, 9)
            .seconds(2.0)
            .kill(1, 10)
            .seconds(2.0)
            .kill(6, 2)
            .seconds(2.0)
            .kill(6, 3)
            .seconds(2.0)
            .kill(7, 4)
            .seconds(2.0)
            .kill(7, 5)
            .seconds(5.0)
            .kill(1, 6)
            .kill(1, 7)
            .seconds(5.0)
            .round_end(Side::CounterTerrorist, RoundEndReason::CtWin)
            .build(),
    );

    assert_eq!(1, result.clutches.len());

    let clutch = &result.clutches[0];
    assert_eq!(1, clutch.round_number);
    assert_eq!(Side::CounterTerrorist, clutch.side);
    assert_eq!(2, clutch.opponent_count);
    assert_eq!(sid(1), clutch.clutcher_steam_id);
    assert_eq!("player1", clutch.clutcher_name);
    // the three frags from before the team was down to one do not count
    assert_eq!(2, clutch.clutcher_kill_count);
    assert!(clutch.has_won);
    assert!(clutch.clutcher_survived);
    assert_eq!(1, result.one_vs_x_won_count(sid(1), 2));
}

#[test]
fn a_lost_clutch_keeps_its_kills() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_inferno")
            .advance(64)
            .round_start(1)
            .seconds(15.0)
            .freeze_end()
            .seconds(10.0)
            .kill(1, 8)
            .seconds(2.0)
            .kill(2, 9)
            .seconds(2.0)
            .kill(6, 1)
            .seconds(2.0)
            .kill(7, 2)
            .seconds(2.0)
            .kill(6, 3)
            .seconds(2.0)
            .kill(10, 4)
            .seconds(5.0)
            .kill(5, 6)
            .seconds(5.0)
            .kill(7, 5)
            .seconds(5.0)
            .round_end(Side::Terrorist, RoundEndReason::TerroristsWin)
            .build(),
    );

    assert_eq!(1, result.clutches.len());

    let clutch = &result.clutches[0];
    assert_eq!(Side::CounterTerrorist, clutch.side);
    assert_eq!(3, clutch.opponent_count);
    assert_eq!(sid(5), clutch.clutcher_steam_id);
    assert_eq!(1, clutch.clutcher_kill_count);
    assert!(!clutch.has_won);
    assert!(!clutch.clutcher_survived);
    assert_eq!(1, result.one_vs_x_lost_count(sid(5), 3));
    assert_eq!(0, result.one_vs_x_won_count(sid(5), 3));
}

#[test]
fn both_sides_can_clutch_the_same_round() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_nuke")
            .advance(64)
            .round_start(1)
            .seconds(15.0)
            .freeze_end()
            .seconds(10.0)
            .kill(6, 2)
            .seconds(2.0)
            .kill(7, 3)
            .seconds(2.0)
            .kill(8, 4)
            .seconds(2.0)
            .kill(1, 6)
            .seconds(2.0)
            .kill(5, 7)
            .seconds(2.0)
            .kill(1, 8)
            .seconds(5.0)
            // a mutual pick in the same instant leaves a one on one
            .kill(1, 9)
            .kill(10, 5)
            .seconds(10.0)
            .kill(1, 10)
            .seconds(5.0)
            .round_end(Side::CounterTerrorist, RoundEndReason::CtWin)
            .build(),
    );

    assert_eq!(2, result.clutches.len());

    let ct = result
        .clutches
        .iter()
        .find(|clutch| clutch.side == Side::CounterTerrorist)
        .unwrap();
    assert_eq!(sid(1), ct.clutcher_steam_id);
    assert_eq!(1, ct.opponent_count);
    assert_eq!(1, ct.clutcher_kill_count);
    assert!(ct.has_won);
    assert!(ct.clutcher_survived);

    let t = result
        .clutches
        .iter()
        .find(|clutch| clutch.side == Side::Terrorist)
        .unwrap();
    assert_eq!(sid(10), t.clutcher_steam_id);
    assert_eq!(1, t.opponent_count);
    assert_eq!(0, t.clutcher_kill_count);
    assert!(!t.has_won);
    assert!(!t.clutcher_survived);

    assert_eq!(1, result.one_vs_x_won_count(sid(1), 1));
    assert_eq!(1, result.one_vs_x_lost_count(sid(10), 1));
}

#[test]
fn a_collapse_to_zero_is_not_a_clutch() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_overpass")
            .advance(64)
            .round_start(1)
            .seconds(15.0)
            .freeze_end()
            .seconds(10.0)
            .kill(6, 1)
            .seconds(2.0)
            .kill(6, 2)
            .seconds(2.0)
            .kill(7, 3)
            .seconds(5.0)
            // the last two die to the same grenade tick, two straight to zero
            .kill(8, 4)
            .kill(8, 5)
            .seconds(2.0)
            .round_end(Side::Terrorist, RoundEndReason::TerroristsWin)
            .build(),
    );

    assert_eq!(0, result.clutches.len());
}

#[test]
fn departures_open_a_clutch() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_ancient")
            .advance(64)
            .round_start(1)
            .seconds(15.0)
            .freeze_end()
            .seconds(10.0)
            .disconnect(2)
            .seconds(1.0)
            .disconnect(3)
            .seconds(1.0)
            .disconnect(4)
            .seconds(1.0)
            .disconnect(5)
            .seconds(30.0)
            .round_end(Side::Terrorist, RoundEndReason::TerroristsWin)
            .build(),
    );

    assert_eq!(1, result.clutches.len());

    let clutch = &result.clutches[0];
    assert_eq!(Side::CounterTerrorist, clutch.side);
    assert_eq!(5, clutch.opponent_count);
    assert_eq!(sid(1), clutch.clutcher_steam_id);
    assert_eq!(0, clutch.clutcher_kill_count);
    assert!(!clutch.has_won);
    assert!(clutch.clutcher_survived);
}

#[test]
fn no_clutch_in_an_even_round() {
    let result = analyze(
        StreamBuilder::new()
            .connect_full_teams()
            .advance(64)
            .match_start("de_vertigo")
            .play_round(1, Side::CounterTerrorist)
            .build(),
    );

    assert_eq!(0, result.clutches.len());
}

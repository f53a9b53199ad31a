use events::{Event, EventKind, RoundEndReason, Side, SteamId, UserId, WeaponClass};

fn main() {
    divan::main();
}

fn event(tick: i32, kind: EventKind) -> Event {
    Event {
        tick,
        frame: tick / 2,
        kind,
    }
}

fn synthetic_match(rounds: i32) -> Vec<Event> {
    let mut stream = Vec::new();
    let mut tick = 0;

    for user in 1..=10 {
        let side = if user <= 5 {
            Side::CounterTerrorist
        } else {
            Side::Terrorist
        };
        stream.push(event(
            tick,
            EventKind::PlayerConnect(events::PlayerConnect {
                user: UserId(user),
                steam_id: SteamId(76_561_198_000_000_000 + user as u64),
                name: format!("player{}", user),
                side: Some(side),
            }),
        ));
    }

    tick += 64;
    stream.push(event(
        tick,
        EventKind::MatchStart(events::MatchStart {
            map_name: String::from("de_dust2"),
            tick_rate: 64.0,
        }),
    ));
    stream.push(event(
        tick,
        EventKind::MaxRoundsChanged(events::MaxRoundsChanged { max_rounds: 24 }),
    ));

    for number in 1..=rounds {
        if number == 13 || number == 28 {
            stream.push(event(tick, EventKind::TeamSideSwitch));
        }
        if number == 25 {
            stream.push(event(
                tick,
                EventKind::OvertimeCountChanged(events::OvertimeCountChanged { count: 1 }),
            ));
        }

        tick += 64;
        stream.push(event(tick, EventKind::RoundStart(events::RoundStart { number })));

        tick += 15 * 64;
        for user in 1..=10 {
            stream.push(event(
                tick,
                EventKind::EconomyUpdate(events::EconomyUpdate {
                    user: UserId(user),
                    start_money: 4_000,
                    money_spent: 2_600,
                    equipment_value: 3_900,
                }),
            ));
            stream.push(event(
                tick,
                EventKind::ItemPurchase(events::ItemPurchase {
                    user: UserId(user),
                    item: String::from("weapon_ak47"),
                    cost: 2_700,
                }),
            ));
        }
        stream.push(event(tick, EventKind::RoundFreezetimeEnd));

        for (killer, victim) in [(1, 6), (7, 2), (1, 8), (9, 3), (1, 9)] {
            tick += 5 * 64;
            stream.push(event(
                tick,
                EventKind::Damage(events::Damage {
                    attacker: Some(UserId(killer)),
                    victim: UserId(victim),
                    health_damage: 72,
                    armor_damage: 11,
                    weapon: WeaponClass::Rifle,
                }),
            ));
            stream.push(event(
                tick,
                EventKind::Kill(events::Kill {
                    killer: Some(UserId(killer)),
                    victim: UserId(victim),
                    assister: None,
                    weapon: WeaponClass::Rifle,
                    is_headshot: killer == 1,
                }),
            ));
        }

        tick += 10 * 64;
        let winner = if number % 2 == 0 {
            Side::Terrorist
        } else {
            Side::CounterTerrorist
        };
        stream.push(event(
            tick,
            EventKind::RoundEnd(events::RoundEnd {
                winner: Some(winner),
                reason: if winner == Side::CounterTerrorist {
                    RoundEndReason::CtWin
                } else {
                    RoundEndReason::TerroristsWin
                },
                message: String::new(),
            }),
        ));
        stream.push(event(tick, EventKind::RoundMvp(events::RoundMvp { user: UserId(1) })));

        tick += 2 * 64;
        stream.push(event(tick, EventKind::RoundEndOfficial));
    }

    stream.push(event(tick, EventKind::MatchEnd));
    stream
}

#[divan::bench(args = [16, 24, 30])]
fn reconstruct(bencher: divan::Bencher, rounds: i32) {
    let stream = synthetic_match(rounds);
    let options = analysis::AnalyzeOptions::for_source(events::DemoSource::Valve);

    bencher.bench(|| {
        analysis::analyze_match(
            divan::black_box(&stream).iter().cloned(),
            divan::black_box(options.clone()),
        )
    });
}

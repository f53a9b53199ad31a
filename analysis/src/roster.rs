use events::{Side, SteamId, UserId};

/// One canonical player as tracked over the whole capture.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RosterEntry {
    pub name: String,
    pub side: Option<Side>,
    pub connected: bool,
    pub controlling_bot: bool,
}

/// Alias table from transient session slots to canonical accounts, plus the
/// per account state needed to attribute events correctly.
///
/// Reconnecting players show up under a fresh [`UserId`]; a disconnect
/// followed by a bot takeover keeps the old slot alive and pointing at the
/// human, flagged as bot controlled until the human comes back.
#[derive(Debug, Default)]
pub(crate) struct Roster {
    aliases: std::collections::HashMap<UserId, SteamId>,
    entries: std::collections::BTreeMap<SteamId, RosterEntry>,
}

impl Roster {
    pub fn connect(&mut self, user: UserId, steam_id: SteamId, name: &str, side: Option<Side>) {
        self.aliases.insert(user, steam_id);

        let entry = self
            .entries
            .entry(steam_id)
            .or_insert_with(|| RosterEntry {
                name: String::new(),
                side: None,
                connected: false,
                controlling_bot: false,
            });
        if !name.is_empty() {
            entry.name = name.to_owned();
        }
        if side.is_some() {
            entry.side = side;
        }
        entry.connected = true;
        entry.controlling_bot = false;
    }

    pub fn disconnect(&mut self, user: UserId) -> Option<SteamId> {
        let steam_id = self.resolve(user)?;
        if let Some(entry) = self.entries.get_mut(&steam_id) {
            entry.connected = false;
        }
        Some(steam_id)
    }

    pub fn become_bot(&mut self, user: UserId) -> Option<SteamId> {
        let steam_id = self.resolve(user)?;
        if let Some(entry) = self.entries.get_mut(&steam_id) {
            entry.controlling_bot = true;
        }
        Some(steam_id)
    }

    pub fn team_change(&mut self, user: UserId, side: Option<Side>) -> Option<SteamId> {
        let steam_id = self.resolve(user)?;
        if let Some(entry) = self.entries.get_mut(&steam_id) {
            entry.side = side;
        }
        Some(steam_id)
    }

    pub fn resolve(&self, user: UserId) -> Option<SteamId> {
        self.aliases.get(&user).copied()
    }

    pub fn entry(&self, steam_id: SteamId) -> Option<&RosterEntry> {
        self.entries.get(&steam_id)
    }

    pub fn name_of(&self, steam_id: SteamId) -> String {
        self.entry(steam_id)
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }

    pub fn side_of(&self, steam_id: SteamId) -> Option<Side> {
        self.entry(steam_id).and_then(|e| e.side)
    }

    pub fn is_controlling_bot(&self, steam_id: SteamId) -> bool {
        self.entry(steam_id)
            .map(|e| e.controlling_bot)
            .unwrap_or(false)
    }

    /// Halftime and overtime swaps move every tracked player to the
    /// opposite side in lockstep with the team mapping.
    pub fn swap_sides(&mut self) {
        for entry in self.entries.values_mut() {
            entry.side = entry.side.map(Side::other);
        }
    }

    /// Everyone currently taking part in the round: connected humans plus
    /// bot controlled slots of disconnected ones, spectators excluded.
    pub fn lineup(&self) -> impl Iterator<Item = (SteamId, &RosterEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.side.is_some() && (entry.connected || entry.controlling_bot))
            .map(|(steam_id, entry)| (*steam_id, entry))
    }

    /// Every account that ever played a side, in id order.
    pub fn players(&self) -> impl Iterator<Item = (SteamId, &RosterEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.side.is_some())
            .map(|(steam_id, entry)| (*steam_id, entry))
    }
}

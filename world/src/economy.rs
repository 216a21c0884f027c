//! Per-player mana balances.

use citadel_defence_core::{CellRect, ManaSnapshot, MatchConfig, PlayerId};

#[derive(Clone, Copy, Debug)]
struct Player {
    balance: u32,
    zone: CellRect,
}

/// Mana ledger; every balance stays within `[0, max_mana]`.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    players: Vec<Player>,
    max_mana: u32,
    active: PlayerId,
}

impl Economy {
    pub(crate) fn new(config: &MatchConfig) -> Self {
        let start = config.economy.start_mana.min(config.economy.max_mana);
        let players = (0..config.players.roster.len())
            .filter_map(|index| {
                let id = PlayerId::new(u8::try_from(index).ok()?);
                let zone = config.zone_of(id)?;
                Some(Player {
                    balance: start,
                    zone,
                })
            })
            .collect();
        Self {
            players,
            max_mana: config.economy.max_mana,
            active: config.players.active,
        }
    }

    /// Debits `amount`, or leaves the balance untouched and returns `false` if it is short.
    pub(crate) fn try_spend(&mut self, player: PlayerId, amount: u32) -> bool {
        let Some(entry) = self.player_mut(player) else {
            return false;
        };
        if amount > entry.balance {
            return false;
        }
        entry.balance -= amount;
        true
    }

    /// Adds `amount`, clamping at the cap. Returns the new balance.
    pub(crate) fn credit(&mut self, player: PlayerId, amount: u32) -> Option<u32> {
        let max = self.max_mana;
        let entry = self.player_mut(player)?;
        entry.balance = entry.balance.saturating_add(amount).min(max);
        Some(entry.balance)
    }

    /// Reverses a debit whose purchase could not be completed.
    pub(crate) fn refund(&mut self, player: PlayerId, amount: u32) -> Option<u32> {
        self.credit(player, amount)
    }

    pub(crate) fn balance(&self, player: PlayerId) -> Option<u32> {
        self.player(player).map(|entry| entry.balance)
    }

    pub(crate) fn zone(&self, player: PlayerId) -> Option<CellRect> {
        self.player(player).map(|entry| entry.zone)
    }

    pub(crate) fn active(&self) -> PlayerId {
        self.active
    }

    pub(crate) fn set_active(&mut self, player: PlayerId) -> bool {
        if self.player(player).is_none() || self.active == player {
            return false;
        }
        self.active = player;
        true
    }

    pub(crate) fn snapshots(&self) -> Vec<ManaSnapshot> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                Some(ManaSnapshot {
                    player: PlayerId::new(u8::try_from(index).ok()?),
                    balance: entry.balance,
                    max: self.max_mana,
                })
            })
            .collect()
    }

    fn player(&self, player: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(player.get()))
    }

    fn player_mut(&mut self, player: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(usize::from(player.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn economy(start: u32, max: u32) -> Economy {
        let mut config = MatchConfig::default();
        config.economy.start_mana = start;
        config.economy.max_mana = max;
        Economy::new(&config)
    }

    #[test]
    fn failed_spend_leaves_the_balance_untouched() {
        let player = PlayerId::new(0);
        let mut economy = economy(500, 500);

        assert!(economy.try_spend(player, 150));
        assert_eq!(economy.balance(player), Some(350));
        assert!(!economy.try_spend(player, 400));
        assert_eq!(economy.balance(player), Some(350));
    }

    #[test]
    fn zero_cost_spends_always_succeed() {
        let player = PlayerId::new(0);
        let mut economy = economy(0, 10);
        assert!(economy.try_spend(player, 0));
        assert_eq!(economy.balance(player), Some(0));
    }

    #[test]
    fn credit_clamps_at_the_cap() {
        let player = PlayerId::new(0);
        let mut economy = economy(450, 500);
        assert_eq!(economy.credit(player, 80), Some(500));
        assert_eq!(economy.refund(player, 1), Some(500));
    }

    #[test]
    fn unknown_players_are_rejected() {
        let mut economy = economy(100, 500);
        assert!(!economy.try_spend(PlayerId::new(3), 10));
        assert_eq!(economy.credit(PlayerId::new(3), 10), None);
        assert!(!economy.set_active(PlayerId::new(3)));
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Spend(u32),
        Credit(u32),
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (0u32..2_000).prop_map(Operation::Spend),
            (0u32..2_000).prop_map(Operation::Credit),
        ]
    }

    proptest! {
        #[test]
        fn balance_never_leaves_bounds(
            start in 0u32..1_000,
            operations in proptest::collection::vec(operation(), 0..64),
        ) {
            let max = 1_000;
            let player = PlayerId::new(0);
            let mut economy = economy(start, max);

            for operation in operations {
                let before = economy.balance(player).unwrap_or_default();
                match operation {
                    Operation::Spend(amount) => {
                        let spent = economy.try_spend(player, amount);
                        let after = economy.balance(player).unwrap_or_default();
                        if spent {
                            prop_assert_eq!(after, before - amount);
                        } else {
                            prop_assert!(amount > before);
                            prop_assert_eq!(after, before);
                        }
                    }
                    Operation::Credit(amount) => {
                        let _ = economy.credit(player, amount);
                    }
                }
                let balance = economy.balance(player).unwrap_or_default();
                prop_assert!(balance <= max);
            }
        }
    }
}

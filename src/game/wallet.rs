//! Player currency ledger

use serde::Deserialize;

/// Currency a shop cost is denominated in. The byte values are wire format
/// and match the shop metadata tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CurrencyType {
    Coin = 0x00,
    HonorToken = 0x01,
    TrophyToken = 0x02,
    FruitToken = 0x03,
    Crystal = 0x04,
    EventCrystal = 0x05,
    /// Cost denominated in units of a required catalog item, not a balance.
    Item = 0x06,
}

/// Named currency balances. Balances never go negative: a debit that would
/// overdraw is rejected and applies nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    pub coin: i64,
    pub honor_token: i64,
    pub trophy_token: i64,
    pub fruit_token: i64,
    pub crystal: i64,
    pub event_crystal: i64,
}

impl Wallet {
    pub fn balance(&self, currency: CurrencyType) -> i64 {
        match currency {
            CurrencyType::Coin => self.coin,
            CurrencyType::HonorToken => self.honor_token,
            CurrencyType::TrophyToken => self.trophy_token,
            CurrencyType::FruitToken => self.fruit_token,
            CurrencyType::Crystal => self.crystal,
            CurrencyType::EventCrystal => self.event_crystal,
            CurrencyType::Item => 0,
        }
    }

    /// Debit `amount` from the matching balance. Returns false, leaving the
    /// wallet untouched, when the balance is short or the currency is not a
    /// wallet currency.
    pub fn try_debit(&mut self, currency: CurrencyType, amount: i64) -> bool {
        let balance = match currency {
            CurrencyType::Coin => &mut self.coin,
            CurrencyType::HonorToken => &mut self.honor_token,
            CurrencyType::TrophyToken => &mut self.trophy_token,
            CurrencyType::FruitToken => &mut self.fruit_token,
            CurrencyType::Crystal => &mut self.crystal,
            CurrencyType::EventCrystal => &mut self.event_crystal,
            CurrencyType::Item => return false,
        };
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    pub fn credit(&mut self, currency: CurrencyType, amount: i64) {
        match currency {
            CurrencyType::Coin => self.coin += amount,
            CurrencyType::HonorToken => self.honor_token += amount,
            CurrencyType::TrophyToken => self.trophy_token += amount,
            CurrencyType::FruitToken => self.fruit_token += amount,
            CurrencyType::Crystal => self.crystal += amount,
            CurrencyType::EventCrystal => self.event_crystal += amount,
            CurrencyType::Item => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_exact_amount() {
        let mut wallet = Wallet {
            coin: 1000,
            ..Default::default()
        };

        assert!(wallet.try_debit(CurrencyType::Coin, 500));
        assert_eq!(wallet.coin, 500);
    }

    #[test]
    fn test_debit_insufficient_leaves_balance_unchanged() {
        let mut wallet = Wallet {
            crystal: 99,
            ..Default::default()
        };

        assert!(!wallet.try_debit(CurrencyType::Crystal, 100));
        assert_eq!(wallet.crystal, 99);
    }

    #[test]
    fn test_debit_to_zero_is_allowed() {
        let mut wallet = Wallet {
            honor_token: 40,
            ..Default::default()
        };

        assert!(wallet.try_debit(CurrencyType::HonorToken, 40));
        assert_eq!(wallet.honor_token, 0);
    }

    #[test]
    fn test_item_currency_is_not_a_balance() {
        let mut wallet = Wallet::default();
        assert!(!wallet.try_debit(CurrencyType::Item, 1));
    }
}

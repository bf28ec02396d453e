//! Coins, deposit balances, and change-making.
//!
//! Every balance is denominated in the smallest coin unit (5). [`Deposit`]
//! refuses any value that is not a multiple of 5, so every balance produced
//! by crediting coins or debiting purchases stays representable as coins.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

/// Accepted coin denominations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coin {
    Five,
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl Coin {
    /// All denominations in ascending order of value.
    pub const ALL: [Self; 5] = [
        Self::Five,
        Self::Ten,
        Self::Twenty,
        Self::Fifty,
        Self::Hundred,
    ];

    /// Face value in the smallest coin unit.
    pub const fn value(self) -> u64 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    /// Face values of every accepted coin, ascending.
    pub fn accepted_values() -> [u64; 5] {
        Self::ALL.map(Self::value)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Raised when a value is not one of the accepted denominations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("coin value not allowed: {0}")]
pub struct InvalidCoin(pub u64);

impl TryFrom<u64> for Coin {
    type Error = InvalidCoin;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|coin| coin.value() == value)
            .ok_or(InvalidCoin(value))
    }
}

/// Raised when a balance would not be a multiple of the smallest coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deposit {0} is not a multiple of 5")]
pub struct DepositNotCoinAligned(pub u64);

/// A buyer's coin balance.
///
/// ## Invariants
/// - The value is always a multiple of 5.
///
/// # Examples
/// ```
/// use backend::domain::{Coin, Deposit};
///
/// let deposit = Deposit::ZERO.credit(Coin::Fifty).expect("no overflow");
/// assert_eq!(deposit.value(), 50);
/// assert!(Deposit::new(12).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = u64, example = 30)]
pub struct Deposit(u64);

impl Deposit {
    /// Empty balance.
    pub const ZERO: Self = Self(0);

    /// Validate a raw balance.
    pub fn new(value: u64) -> Result<Self, DepositNotCoinAligned> {
        if value % Coin::Five.value() == 0 {
            Ok(Self(value))
        } else {
            Err(DepositNotCoinAligned(value))
        }
    }

    /// Raw balance in the smallest coin unit.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Balance after inserting `coin`, or `None` on overflow.
    pub fn credit(self, coin: Coin) -> Option<Self> {
        self.0.checked_add(coin.value()).map(Self)
    }

    /// Balance after spending `amount`.
    ///
    /// Returns `None` when the balance is too small or the result would not
    /// be a multiple of 5.
    pub fn debit(self, amount: u64) -> Option<Self> {
        self.0
            .checked_sub(amount)
            .and_then(|rest| Self::new(rest).ok())
    }

    /// Whether the balance covers `amount`.
    pub const fn covers(self, amount: u64) -> bool {
        self.0 >= amount
    }
}

impl fmt::Display for Deposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coin breakdown of an amount: counts of 5, 10, 20, 50 and 100 coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Vec<u64>)]
pub struct Change([u64; 5]);

impl Change {
    /// Coin counts ordered by ascending denomination.
    pub const fn counts(&self) -> [u64; 5] {
        self.0
    }

    /// Number of coins in the breakdown.
    pub fn coin_count(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Value represented by the breakdown.
    pub fn total(&self) -> u64 {
        self.0
            .iter()
            .zip(Coin::ALL)
            .map(|(count, coin)| count * coin.value())
            .sum()
    }
}

/// Decompose a balance into the fewest coins.
///
/// Greedy selection from the largest denomination down is optimal here
/// because the denomination set is canonical.
///
/// # Examples
/// ```
/// use backend::domain::{make_change, Deposit};
///
/// let change = make_change(Deposit::new(385).expect("aligned"));
/// assert_eq!(change.counts(), [1, 1, 1, 1, 3]);
/// ```
pub fn make_change(amount: Deposit) -> Change {
    let mut remaining = amount.value();
    let mut counts = [0_u64; 5];
    for (slot, coin) in counts.iter_mut().zip(Coin::ALL).rev() {
        let value = coin.value();
        *slot = remaining / value;
        remaining -= *slot * value;
    }
    Change(counts)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for coins and change-making.
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    /// Fewest coins summing to `amount`, by exhaustive dynamic programming.
    fn brute_force_min_coins(amount: u64) -> u64 {
        let steps = usize::try_from(amount / 5).expect("small amount");
        let mut best = vec![u64::MAX; steps + 1];
        best[0] = 0;
        for step in 1..=steps {
            for coin in Coin::ALL {
                let units = usize::try_from(coin.value() / 5).expect("small coin");
                if units <= step && best[step - units] != u64::MAX {
                    best[step] = best[step].min(best[step - units] + 1);
                }
            }
        }
        best[steps]
    }

    #[rstest]
    #[case(5, Coin::Five)]
    #[case(10, Coin::Ten)]
    #[case(20, Coin::Twenty)]
    #[case(50, Coin::Fifty)]
    #[case(100, Coin::Hundred)]
    fn accepted_coins_parse(#[case] raw: u64, #[case] expected: Coin) {
        assert_eq!(Coin::try_from(raw), Ok(expected));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(15)]
    #[case(25)]
    #[case(200)]
    fn other_values_are_not_coins(#[case] raw: u64) {
        assert_eq!(Coin::try_from(raw), Err(InvalidCoin(raw)));
    }

    #[rstest]
    #[case(0, [0, 0, 0, 0, 0])]
    #[case(5, [1, 0, 0, 0, 0])]
    #[case(35, [1, 1, 1, 0, 0])]
    #[case(40, [0, 0, 2, 0, 0])]
    #[case(385, [1, 1, 1, 1, 3])]
    fn make_change_examples(#[case] amount: u64, #[case] expected: [u64; 5]) {
        let deposit = Deposit::new(amount).expect("aligned amount");
        assert_eq!(make_change(deposit).counts(), expected);
    }

    #[rstest]
    fn greedy_matches_brute_force_minimum() {
        for amount in (0..=1_000).step_by(5) {
            let change = make_change(Deposit::new(amount).expect("aligned amount"));
            assert_eq!(change.total(), amount);
            assert_eq!(
                change.coin_count(),
                brute_force_min_coins(amount),
                "non-minimal change for {amount}"
            );
        }
    }

    #[rstest]
    fn debit_refuses_overdraft_and_misalignment() {
        let deposit = Deposit::new(30).expect("aligned");
        assert_eq!(deposit.debit(25), Some(Deposit::new(5).expect("aligned")));
        assert_eq!(deposit.debit(35), None);
        assert_eq!(deposit.debit(3), None);
    }

    #[rstest]
    fn new_rejects_unaligned_values() {
        assert_eq!(Deposit::new(12), Err(DepositNotCoinAligned(12)));
    }

    proptest! {
        #[test]
        fn change_sums_to_amount(units in 0_u64..2_000_000) {
            let amount = units * 5;
            let change = make_change(Deposit::new(amount).expect("aligned amount"));
            prop_assert_eq!(change.total(), amount);
        }

        #[test]
        fn credits_preserve_alignment(coins in prop::collection::vec(prop::sample::select(Coin::ALL.to_vec()), 0..64)) {
            let mut deposit = Deposit::ZERO;
            for coin in coins {
                deposit = deposit.credit(coin).expect("no overflow");
                prop_assert_eq!(deposit.value() % 5, 0);
            }
        }
    }
}

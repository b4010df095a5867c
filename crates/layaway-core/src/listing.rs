use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::whole_dollars_decimal;

/// An open layaway offer: a buyer deposits now for the right to buy
/// `btc_amount` at `strike_price` on or before `expiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u32,
    pub strike_price: Decimal,
    pub deposit: Decimal,
    pub expiry: NaiveDate,
    pub btc_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Buyer,
    Poster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionStatus {
    Active,
    Settled,
    ExpiredForfeited,
    ExpiredSettled,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PositionStatus::Active => "Active",
            PositionStatus::Settled => "Settled",
            PositionStatus::ExpiredForfeited => "Expired (Forfeited)",
            PositionStatus::ExpiredSettled => "Expired (Settled)",
        })
    }
}

/// A listing the connected user holds, either as buyer or as poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub position_id: String,
    pub role: Role,
    pub status: PositionStatus,
    pub strike_price: Decimal,
    pub deposit: Decimal,
    pub expiry: NaiveDate,
    pub btc_amount: Decimal,
}

impl UserPosition {
    /// The deposit is always the buyer's; the label depends on whose view it is.
    pub fn deposit_label(&self) -> &'static str {
        match self.role {
            Role::Buyer => "Your Deposit",
            Role::Poster => "Buyer's Deposit",
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} Strike: {} | Deposit: {} | Expiry: {} | Amount: {} BTC",
            self.id,
            whole_dollars_decimal(self.strike_price),
            whole_dollars_decimal(self.deposit),
            self.expiry,
            self.btc_amount.normalize()
        )
    }
}

impl fmt::Display for UserPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:?}] {} Strike: {} | {}: {} | Expiry: {} | Amount: {} BTC",
            self.position_id,
            self.role,
            self.status,
            whole_dollars_decimal(self.strike_price),
            self.deposit_label(),
            whole_dollars_decimal(self.deposit),
            self.expiry,
            self.btc_amount.normalize()
        )
    }
}

/// Inclusive bounds on listings. Unset bounds do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub min_strike: Option<Decimal>,
    pub max_strike: Option<Decimal>,
    pub min_deposit: Option<Decimal>,
    pub max_expiry: Option<NaiveDate>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.min_strike.is_none_or(|min| listing.strike_price >= min)
            && self.max_strike.is_none_or(|max| listing.strike_price <= max)
            && self.min_deposit.is_none_or(|min| listing.deposit >= min)
            && self.max_expiry.is_none_or(|max| listing.expiry <= max)
    }

    /// Listings satisfying every bound, in their original order.
    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| self.matches(l))
            .cloned()
            .collect()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Hardcoded market listings shown on the dashboard.
pub fn sample_listings() -> Vec<Listing> {
    let listing = |id: u32, strike: i64, deposit: i64, expiry: NaiveDate, amount: Decimal| Listing {
        id,
        strike_price: Decimal::from(strike),
        deposit: Decimal::from(deposit),
        expiry,
        btc_amount: amount,
    };

    vec![
        listing(1, 65_000, 1_000, date(2024, 12, 31), Decimal::ONE),
        listing(2, 68_000, 1_200, date(2025, 1, 15), Decimal::new(5, 1)),
        listing(3, 62_000, 800, date(2024, 11, 30), Decimal::TWO),
        listing(4, 70_000, 1_500, date(2025, 3, 1), Decimal::new(15, 1)),
        listing(5, 65_000, 950, date(2024, 12, 20), Decimal::new(8, 1)),
    ]
}

/// Hardcoded positions for the connected wallet.
pub fn sample_positions() -> Vec<UserPosition> {
    let position = |id: &str,
                    role: Role,
                    status: PositionStatus,
                    strike: i64,
                    deposit: i64,
                    expiry: NaiveDate,
                    amount: Decimal| UserPosition {
        position_id: id.to_string(),
        role,
        status,
        strike_price: Decimal::from(strike),
        deposit: Decimal::from(deposit),
        expiry,
        btc_amount: amount,
    };

    vec![
        position(
            "BUY-001",
            Role::Buyer,
            PositionStatus::Active,
            65_000,
            1_000,
            date(2024, 12, 31),
            Decimal::ONE,
        ),
        position(
            "POST-002",
            Role::Poster,
            PositionStatus::Active,
            70_000,
            1_500,
            date(2025, 3, 1),
            Decimal::new(15, 1),
        ),
        position(
            "BUY-003",
            Role::Buyer,
            PositionStatus::ExpiredForfeited,
            60_000,
            500,
            date(2024, 8, 1),
            Decimal::new(2, 1),
        ),
        position(
            "POST-004",
            Role::Poster,
            PositionStatus::Active,
            62_000,
            800,
            date(2024, 9, 15),
            Decimal::TWO,
        ),
    ]
}

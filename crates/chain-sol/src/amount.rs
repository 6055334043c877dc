//! SOL and lamport amounts.
//!
//! All ledger arithmetic is done in integer lamports. The only place a
//! floating-point value enters is [`sol_to_lamports`], which goes through the
//! float's shortest round-trip decimal text and then [`parse_sol_amount`].
//!
//! Rounding rule: digits past the ninth fractional place are rounded
//! half-to-even at the lamport boundary, so `0.0000000005` becomes 0 lamports
//! and `0.0000000015` becomes 2.

use std::fmt;

use crate::error::SolError;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Fractional digits carried by a lamport amount.
const LAMPORT_DECIMALS: usize = 9;

/// An account balance in lamports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Balance(u64);

impl Balance {
    pub const ZERO: Balance = Balance(0);

    pub const fn from_lamports(lamports: u64) -> Self {
        Self(lamports)
    }

    pub const fn lamports(self) -> u64 {
        self.0
    }

    /// Display value in whole SOL. Lossy above 2^53 lamports.
    pub fn as_sol(self) -> f64 {
        lamports_to_sol(self.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", format_sol(self.0))
    }
}

/// Convert a SOL amount to lamports.
///
/// Non-finite or non-positive input fails with [`SolError::InvalidAmount`].
/// A positive amount may still round to 0 lamports; callers that need a
/// non-zero transfer must check for that.
pub fn sol_to_lamports(sol: f64) -> Result<u64, SolError> {
    if !sol.is_finite() {
        return Err(SolError::InvalidAmount(format!("{sol} is not finite")));
    }
    if sol <= 0.0 {
        return Err(SolError::InvalidAmount(format!(
            "{sol} must be greater than zero"
        )));
    }
    // f64's Display never uses exponent notation and prints the shortest
    // decimal that round-trips, so 1.5 is "1.5" and 5e-10 is "0.0000000005".
    parse_sol_amount(&sol.to_string())
}

/// Parse decimal SOL text into lamports without going through floating point.
pub fn parse_sol_amount(text: &str) -> Result<u64, SolError> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(SolError::InvalidAmount(format!(
            "{text} must be greater than zero"
        )));
    }

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(SolError::InvalidAmount(format!("{text:?} is not a number")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SolError::InvalidAmount(format!("{text:?} is not a decimal")));
    }
    if whole.bytes().chain(frac.bytes()).all(|b| b == b'0') {
        return Err(SolError::InvalidAmount(format!(
            "{text} must be greater than zero"
        )));
    }

    let overflow = || SolError::AmountPrecision(format!("{text} SOL overflows u64 lamports"));

    let whole_lamports = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .map_err(|_| overflow())?
            .checked_mul(LAMPORTS_PER_SOL)
            .ok_or_else(overflow)?
    };

    let (kept, dropped) = frac.split_at(frac.len().min(LAMPORT_DECIMALS));
    let mut frac_lamports: u64 = 0;
    for digit in kept.bytes() {
        frac_lamports = frac_lamports * 10 + u64::from(digit - b'0');
    }
    for _ in kept.len()..LAMPORT_DECIMALS {
        frac_lamports *= 10;
    }

    let mut lamports = whole_lamports
        .checked_add(frac_lamports)
        .ok_or_else(overflow)?;

    if round_up(dropped, lamports) {
        lamports = lamports.checked_add(1).ok_or_else(overflow)?;
    }

    Ok(lamports)
}

/// Half-to-even decision for the digits cut off below one lamport.
fn round_up(dropped: &str, lamports: u64) -> bool {
    let mut digits = dropped.bytes();
    let Some(first) = digits.next() else {
        return false;
    };
    let rest_nonzero = digits.any(|b| b != b'0');
    match first.cmp(&b'5') {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => rest_nonzero || lamports % 2 == 1,
    }
}

/// Lamports as a floating-point SOL value, for display only.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Exact decimal SOL text for a lamport amount, trailing zeros trimmed.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

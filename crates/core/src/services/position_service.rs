use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::analytics::PositionSummary;
use crate::models::history::{ActionType, PositionHistoryEntry};
use crate::models::portfolio::Portfolio;
use crate::models::position::Position;
use crate::services::history_service::HistoryService;
use crate::services::ledger_service::SHARE_EPSILON;
use crate::services::round_cents;

/// How much of a position to close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CloseKind {
    /// Sell every held share
    Full,
    /// Sell the given number of shares
    Partial(f64),
}

/// Keeps the positions snapshot and the history log in step.
///
/// Every change to a position appends exactly one history entry; entries
/// are never edited or removed.
pub struct PositionService;

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Buy `shares` of `symbol` at `purchase_price`.
    ///
    /// A held symbol is increased: shares add up, the purchase price becomes
    /// the weighted average and the original purchase date is kept. Otherwise
    /// a new position is opened at `current_price`.
    /// Returns the id of the appended history entry.
    #[allow(clippy::too_many_arguments)]
    pub fn open_position(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        shares: f64,
        purchase_price: f64,
        current_price: f64,
        date_of_action: DateTime<Utc>,
        recorded_at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let symbol = Self::validate_symbol(symbol)?;
        Self::validate_positive("Shares", shares)?;
        Self::validate_positive("Purchase price", purchase_price)?;
        Self::validate_positive("Current price", current_price)?;

        let round_average = portfolio.settings.round_average_price;

        let entry = match portfolio.positions.iter_mut().find(|p| p.symbol == symbol) {
            Some(existing) => {
                let total_shares = existing.shares + shares;
                let mut average = (existing.shares * existing.purchase_price
                    + shares * purchase_price)
                    / total_shares;
                if round_average {
                    average = round_cents(average);
                }

                existing.shares = total_shares;
                existing.purchase_price = average;
                existing.price = current_price;

                debug!("Increased {symbol} by {shares} to {total_shares} @ avg {average}");

                let mut entry = PositionHistoryEntry::recorded_at(
                    ActionType::IncreasePosition,
                    symbol.as_str(),
                    shares,
                    purchase_price,
                    date_of_action,
                    recorded_at,
                );
                entry.total_shares = Some(total_shares);
                entry.new_average_price = Some(average);
                entry
            }
            None => {
                portfolio.positions.push(Position::new(
                    symbol.as_str(),
                    shares,
                    current_price,
                    date_of_action,
                    purchase_price,
                ));

                debug!("Opened {symbol}: {shares} @ {purchase_price}");

                PositionHistoryEntry::recorded_at(
                    ActionType::NewPosition,
                    symbol.as_str(),
                    shares,
                    purchase_price,
                    date_of_action,
                    recorded_at,
                )
            }
        };

        let id = entry.id;
        portfolio.history.push(entry);
        Ok(id)
    }

    /// Sell some or all shares of `symbol` at `close_price`.
    ///
    /// Realized gain is `(close_price − purchase_price) × shares`, rounded to
    /// cents, and accumulates per symbol. Closing every held share removes the
    /// position. Returns the realized gain.
    pub fn close_position(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        kind: CloseKind,
        close_price: f64,
        at: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        let symbol = Self::validate_symbol(symbol)?;
        Self::validate_positive("Close price", close_price)?;

        let idx = portfolio
            .positions
            .iter()
            .position(|p| p.symbol == symbol)
            .ok_or_else(|| CoreError::PositionNotFound(symbol.clone()))?;
        let held = portfolio.positions[idx].shares;

        let shares = match kind {
            CloseKind::Full => held,
            CloseKind::Partial(shares) => {
                Self::validate_positive("Shares", shares)?;
                shares
            }
        };
        if shares > held + SHARE_EPSILON {
            return Err(CoreError::InsufficientShares {
                symbol,
                requested: shares,
                held,
            });
        }

        let position = &mut portfolio.positions[idx];
        let realized_gain = round_cents((close_price - position.purchase_price) * shares);
        let remaining = held - shares;
        let fully_closed = kind == CloseKind::Full || remaining <= SHARE_EPSILON;

        let action_type = if kind == CloseKind::Full {
            ActionType::ClosePosition
        } else {
            ActionType::PartialClose
        };
        let mut entry = PositionHistoryEntry::new(action_type, symbol.as_str(), shares, close_price, at);
        entry.realized_gain = Some(realized_gain);

        if fully_closed {
            portfolio.positions.remove(idx);
            debug!("Closed {symbol}: {shares} @ {close_price}, realized {realized_gain}");
        } else {
            position.shares = remaining;
            position.price = close_price;
            debug!("Reduced {symbol} by {shares} to {remaining}, realized {realized_gain}");
        }

        *portfolio.realized_pnl.entry(symbol).or_insert(0.0) += realized_gain;
        portfolio.history.push(entry);
        Ok(realized_gain)
    }

    /// Set the live price of a held symbol.
    pub fn update_price(&self, portfolio: &mut Portfolio, symbol: &str, price: f64) -> Result<(), CoreError> {
        Self::validate_positive("Price", price)?;
        let upper = symbol.trim().to_uppercase();
        let position = portfolio
            .positions
            .iter_mut()
            .find(|p| p.symbol == upper)
            .ok_or(CoreError::PositionNotFound(upper))?;
        position.price = price;
        Ok(())
    }

    /// Display figures for every held position, largest value first.
    pub fn summaries(&self, portfolio: &Portfolio) -> Vec<PositionSummary> {
        let mut summaries: Vec<PositionSummary> = portfolio
            .positions
            .iter()
            .map(|p| PositionSummary {
                symbol: p.symbol.clone(),
                shares: p.shares,
                purchase_price: p.purchase_price,
                current_price: p.price,
                purchase_date: p.purchase_date,
                total_value: round_cents(p.market_value()),
                profit_loss: round_cents(p.unrealized_gain_loss()),
                percentage_change: if p.purchase_price > 0.0 {
                    round_cents((p.price - p.purchase_price) / p.purchase_price * 100.0)
                } else {
                    0.0
                },
                realized_pnl: portfolio.realized_pnl.get(&p.symbol).copied().unwrap_or(0.0),
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.total_value
                .partial_cmp(&a.total_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summaries
    }

    /// Shares held per symbol by a plain forward tally of the log in
    /// recording order: opens add, closes subtract, symbols at zero drop out.
    /// Malformed entries are left out, as in the ledger replay.
    pub fn holdings_from_history(&self, history: &[PositionHistoryEntry]) -> HashMap<String, f64> {
        let mut holdings: HashMap<String, f64> = HashMap::new();

        for entry in history.iter().filter(|e| HistoryService::is_valid(e)) {
            let amount = holdings.entry(entry.symbol.clone()).or_insert(0.0);
            if entry.action_type.is_opening() {
                *amount += entry.shares;
            } else if entry.action_type.is_closing() {
                *amount -= entry.shares;
            }
        }

        holdings.retain(|_, amount| *amount > SHARE_EPSILON);
        holdings
    }

    fn validate_symbol(symbol: &str) -> Result<String, CoreError> {
        let upper = symbol.trim().to_uppercase();
        if upper.is_empty() {
            return Err(CoreError::ValidationError("Symbol must not be empty".into()));
        }
        Ok(upper)
    }

    fn validate_positive(field: &str, value: f64) -> Result<(), CoreError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "{field} must be a positive number, got {value}"
            )));
        }
        Ok(())
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}

use chrono::{DateTime, Duration, TimeZone, Utc};
use stock_tracker_core::models::anomaly::AnomalyKind;
use stock_tracker_core::models::history::{ActionType, PositionHistoryEntry};
use stock_tracker_core::models::performance::{PerformanceMetrics, TimeRange};
use stock_tracker_core::models::portfolio::Portfolio;
use stock_tracker_core::models::position::Position;
use stock_tracker_core::models::settings::Settings;

fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  TimeRange
// ═══════════════════════════════════════════════════════════════════

mod time_range {
    use super::*;

    #[test]
    fn default_is_one_month() {
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
    }

    #[test]
    fn display_tokens() {
        let tokens: Vec<String> = TimeRange::ALL_RANGES.iter().map(|r| r.to_string()).collect();
        assert_eq!(tokens, vec!["1D", "1W", "1M", "YTD", "1Y", "ALL"]);
    }

    #[test]
    fn parse_tokens() {
        assert_eq!("1D".parse::<TimeRange>().unwrap(), TimeRange::OneDay);
        assert_eq!("1w".parse::<TimeRange>().unwrap(), TimeRange::OneWeek);
        assert_eq!(" ytd ".parse::<TimeRange>().unwrap(), TimeRange::YearToDate);
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
    }

    #[test]
    fn parse_unknown_token_fails() {
        assert!("2W".parse::<TimeRange>().is_err());
        assert!("".parse::<TimeRange>().is_err());
    }

    #[test]
    fn serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&TimeRange::YearToDate).unwrap(), "\"YTD\"");
        let back: TimeRange = serde_json::from_str("\"1Y\"").unwrap();
        assert_eq!(back, TimeRange::OneYear);
    }

    #[test]
    fn one_day_steps_hourly_others_daily() {
        assert_eq!(TimeRange::OneDay.step(), Duration::hours(1));
        for range in &TimeRange::ALL_RANGES[1..] {
            assert_eq!(range.step(), Duration::days(1));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ActionType
// ═══════════════════════════════════════════════════════════════════

mod action_type {
    use super::*;

    #[test]
    fn serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&ActionType::NewPosition).unwrap(),
            "\"NEW_POSITION\""
        );
        assert_eq!(
            serde_json::to_string(&ActionType::PartialClose).unwrap(),
            "\"PARTIAL_CLOSE\""
        );
        let back: ActionType = serde_json::from_str("\"INCREASE_POSITION\"").unwrap();
        assert_eq!(back, ActionType::IncreasePosition);
    }

    #[test]
    fn unrecognized_string_becomes_unknown() {
        let back: ActionType = serde_json::from_str("\"DIVIDEND\"").unwrap();
        assert_eq!(back, ActionType::Unknown);
    }

    #[test]
    fn opening_and_closing() {
        assert!(ActionType::NewPosition.is_opening());
        assert!(ActionType::IncreasePosition.is_opening());
        assert!(ActionType::PartialClose.is_closing());
        assert!(ActionType::ClosePosition.is_closing());
        assert!(!ActionType::Unknown.is_opening());
        assert!(!ActionType::Unknown.is_closing());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(ActionType::ClosePosition.to_string(), "CLOSE_POSITION");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PositionHistoryEntry
// ═══════════════════════════════════════════════════════════════════

mod history_entry {
    use super::*;

    #[test]
    fn new_uppercases_symbol_and_copies_instant() {
        let e = PositionHistoryEntry::new(ActionType::NewPosition, "aapl", 10.0, 100.0, dt(2024, 1, 1));
        assert_eq!(e.symbol, "AAPL");
        assert_eq!(e.timestamp, e.date_of_action);
        assert_eq!(e.notional(), 1000.0);
    }

    #[test]
    fn recorded_at_keeps_separate_timestamp() {
        let e = PositionHistoryEntry::recorded_at(
            ActionType::NewPosition,
            "MSFT",
            1.0,
            300.0,
            dt(2024, 1, 1),
            dt(2024, 2, 1),
        );
        assert_eq!(e.date_of_action, dt(2024, 1, 1));
        assert_eq!(e.timestamp, dt(2024, 2, 1));
    }

    #[test]
    fn deserializes_log_format_without_id() {
        let json = r#"{
            "type": "PARTIAL_CLOSE",
            "symbol": "AAPL",
            "shares": 4,
            "price": 120,
            "timestamp": "2024-03-01T12:00:00Z",
            "dateOfAction": "2024-02-28T00:00:00Z",
            "realizedGain": 80
        }"#;
        let e: PositionHistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.action_type, ActionType::PartialClose);
        assert_eq!(e.shares, 4.0);
        assert_eq!(e.date_of_action, dt(2024, 2, 28));
        assert_eq!(e.realized_gain, Some(80.0));
        assert_eq!(e.total_shares, None);
    }

    #[test]
    fn serializes_type_key_and_skips_empty_annotations() {
        let e = PositionHistoryEntry::new(ActionType::NewPosition, "AAPL", 1.0, 1.0, dt(2024, 1, 1));
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["type"], "NEW_POSITION");
        assert!(value.get("dateOfAction").is_some());
        assert!(value.get("realizedGain").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Position
// ═══════════════════════════════════════════════════════════════════

mod position {
    use super::*;

    #[test]
    fn new_uppercases_symbol() {
        let p = Position::new("nvda", 2.0, 500.0, dt(2024, 1, 1), 400.0);
        assert_eq!(p.symbol, "NVDA");
    }

    #[test]
    fn value_cost_and_unrealized() {
        let p = Position::new("AAPL", 10.0, 150.0, dt(2024, 1, 1), 100.0);
        assert_eq!(p.market_value(), 1500.0);
        assert_eq!(p.cost_basis(), 1000.0);
        assert_eq!(p.unrealized_gain_loss(), 500.0);
    }

    #[test]
    fn serde_camel_case() {
        let p = Position::new("AAPL", 10.0, 150.0, dt(2024, 1, 1), 100.0);
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("purchaseDate").is_some());
        assert!(value.get("purchasePrice").is_some());
        let back: Position = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings & Portfolio
// ═══════════════════════════════════════════════════════════════════

mod settings_and_portfolio {
    use super::*;

    #[test]
    fn settings_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_range, TimeRange::OneMonth);
        assert!(s.round_average_price);
    }

    #[test]
    fn settings_missing_fields_use_defaults() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn portfolio_lookup_is_case_insensitive() {
        let portfolio = Portfolio::from_parts(
            vec![Position::new("AAPL", 1.0, 1.0, dt(2024, 1, 1), 1.0)],
            Vec::new(),
        );
        assert!(portfolio.position("aapl").is_some());
        assert!(portfolio.position("MSFT").is_none());
    }

    #[test]
    fn portfolio_from_minimal_json() {
        let json = r#"{ "positions": [], "history": [] }"#;
        let portfolio: Portfolio = serde_json::from_str(json).unwrap();
        assert!(portfolio.realized_pnl.is_empty());
        assert_eq!(portfolio.settings, Settings::default());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Metrics & anomalies
// ═══════════════════════════════════════════════════════════════════

mod misc {
    use super::*;

    #[test]
    fn metrics_default_is_zeroed() {
        let m = PerformanceMetrics::default();
        assert_eq!(
            (m.week, m.month, m.ytd, m.year, m.total),
            (0.0, 0.0, 0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn anomaly_kind_display() {
        assert_eq!(AnomalyKind::NoOpenPosition.to_string(), "no open position");
        assert_eq!(AnomalyKind::UnknownActionType.to_string(), "unknown action type");
    }
}

//! Scenario tests for the setup detection engine.
//!
//! The fixture tape contains a dip at 99, an impulse to 110, then a
//! pullback. With a period-2 oscillator the pullback readings are, in
//! order: 67.3, 32.3, 15.8 — so the first beyond-threshold reading lands
//! exactly on the last candle of the creation cycle.

use chrono::{Duration, TimeZone, Utc};
use pulse_core::{Candle, Direction, Price, SetupKey, Timeframe};
use pulse_detector::{
    Classification, DetectorConfig, RemovalReason, SetupEngine, SetupEvent, SetupState, Tier,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn test_config() -> DetectorConfig {
    DetectorConfig {
        lookback: 30,
        min_impulse_pct: dec!(5),
        min_dominance: dec!(0.5),
        osc_period: 2,
        entry_extreme: dec!(30),
        deep_extreme: dec!(10),
        recovery_level: dec!(60),
        structure_buffer_pct: dec!(0.5),
        htf_confidence: dec!(0.6),
        target_proximity_pct: dec!(1),
        exhaustion_retrace: dec!(0.618),
    }
}

fn key() -> SetupKey {
    SetupKey::new("BTCUSDT", Timeframe::M15, Direction::Long)
}

/// Candles from closes: low/high are close ± 0.2, open is the previous
/// close clamped into the range, timestamps ascend by 15 minutes.
fn tape(closes: &[Decimal]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut candles = Vec::new();
    let mut prev = closes[0];
    for (i, &c) in closes.iter().enumerate() {
        let high = c + dec!(0.2);
        let low = c - dec!(0.2);
        let open = prev.max(low).min(high);
        candles.push(Candle::new(
            base + Duration::minutes(15 * i as i64),
            Price::new(open),
            Price::new(high),
            Price::new(low),
            Price::new(c),
            dec!(1000),
        ));
        prev = c;
    }
    candles
}

/// Dip, impulse to 110, pullback with the oscillator crossing the entry
/// extreme only on the very last candle.
fn impulse_and_first_extreme() -> Vec<Decimal> {
    vec![
        dec!(101),
        dec!(100.5),
        dec!(99), // impulse start (swing low)
        dec!(100.5),
        dec!(101.5),
        dec!(103),
        dec!(104.5),
        dec!(106),
        dec!(107.5),
        dec!(109),
        dec!(110), // impulse end (swing high)
        dec!(109.4),
        dec!(108.4),
        dec!(107.4), // oscillator first drops beyond 30 here
    ]
}

#[test]
fn long_entry_is_detected_on_first_extreme() {
    let mut engine = SetupEngine::new(test_config()).unwrap();
    let closes = impulse_and_first_extreme();
    let candles = tape(&closes);
    let key = key();

    // No setup while the oscillator is still neutral.
    for n in 5..candles.len() {
        assert!(
            engine.evaluate(&key, &candles[..n], None).is_none(),
            "no setup expected at cycle {n}"
        );
    }

    // The first beyond-threshold reading creates the setup.
    let event = engine.evaluate(&key, &candles, None).unwrap();
    let setup = match event {
        SetupEvent::Created(s) => s,
        other => panic!("expected Created, got {other:?}"),
    };

    assert_eq!(setup.state, SetupState::Triggered);
    assert_eq!(setup.key.direction, Direction::Long);
    assert_eq!(setup.tier, Tier::One);
    assert_eq!(setup.classification, Classification::FirstExtreme);
    assert!(setup.osc_value < dec!(30));
    assert!(setup.impulse.percent_move > dec!(11));
    assert!(setup.impulse.dominance > dec!(0.8));
    // Protective price sits a buffer below the pullback low.
    assert!(setup.protective_price < setup.pullback_extreme);
    assert_eq!(engine.tracked_count(), 1);
}

#[test]
fn structure_break_plays_out_and_removes_in_same_cycle() {
    let mut engine = SetupEngine::new(test_config()).unwrap();
    let mut closes = impulse_and_first_extreme();
    let candles = tape(&closes);
    let key = key();

    assert!(matches!(
        engine.evaluate(&key, &candles, None),
        Some(SetupEvent::Created(_))
    ));

    // Next cycle the price falls below the impulse's starting price.
    closes.push(dec!(98.5));
    let candles = tape(&closes);
    let event = engine.evaluate(&key, &candles, None).unwrap();

    match event {
        SetupEvent::Removed { setup, reason } => {
            assert_eq!(reason, RemovalReason::StructureFailure);
            assert_eq!(setup.state, SetupState::PlayedOut);
        }
        other => panic!("expected Removed, got {other:?}"),
    }
    // Deleted from the tracked map in the same step it was reported.
    assert_eq!(engine.tracked_count(), 0);
    assert!(engine.get(&key).is_none());
}

#[test]
fn second_excursion_disqualifies_and_blocks_recreation() {
    let mut engine = SetupEngine::new(test_config()).unwrap();
    let mut closes = impulse_and_first_extreme();
    let key = key();

    assert!(matches!(
        engine.evaluate(&key, &tape(&closes), None),
        Some(SetupEvent::Created(_))
    ));

    // Oscillator recovers (reading ~58): the setup starts reversing.
    closes.push(dec!(108.4));
    let event = engine.evaluate(&key, &tape(&closes), None).unwrap();
    match event {
        SetupEvent::Updated(s) => assert_eq!(s.state, SetupState::Reversing),
        other => panic!("expected Updated, got {other:?}"),
    }

    // Second drop beyond the threshold while reversing: played out.
    closes.push(dec!(107.2));
    let event = engine.evaluate(&key, &tape(&closes), None).unwrap();
    match event {
        SetupEvent::Removed { reason, .. } => {
            assert_eq!(reason, RemovalReason::SecondExcursion);
        }
        other => panic!("expected Removed, got {other:?}"),
    }
    assert_eq!(engine.tracked_count(), 0);

    // A further beyond-threshold reading is the third for this impulse:
    // the first-extreme rule forbids re-creating the setup.
    closes.push(dec!(107.0));
    assert!(engine.evaluate(&key, &tape(&closes), None).is_none());
    assert_eq!(engine.tracked_count(), 0);
}

#[test]
fn deep_extreme_enables_tier_two_adds() {
    let config = DetectorConfig {
        deep_extreme: dec!(20),
        ..test_config()
    };
    let mut engine = SetupEngine::new(config).unwrap();
    let closes = impulse_and_first_extreme();
    let key = key();

    // The entry reading (~15.8) is already beyond the deep extreme.
    let event = engine.evaluate(&key, &tape(&closes), None).unwrap();
    let setup = match event {
        SetupEvent::Created(s) => s,
        other => panic!("expected Created, got {other:?}"),
    };

    assert_eq!(setup.state, SetupState::DeepExtreme);
    assert_eq!(setup.tier, Tier::Two);
    assert!(setup.tier.allows_adds());
    // The oscillator was still sinking, so adds are currently permitted.
    assert!(setup.adds_allowed);
}

#[test]
fn opposite_direction_key_rejects_up_impulse() {
    let mut engine = SetupEngine::new(test_config()).unwrap();
    let closes = impulse_and_first_extreme();
    let short_key = SetupKey::new("BTCUSDT", Timeframe::M15, Direction::Short);

    assert!(engine.evaluate(&short_key, &tape(&closes), None).is_none());
}

#[test]
fn confident_misaligned_htf_trend_rejects() {
    use pulse_core::{HtfTrend, TrendBias};

    let mut engine = SetupEngine::new(test_config()).unwrap();
    let closes = impulse_and_first_extreme();
    let key = key();

    // Bearish with high confidence: a long setup may not form.
    let bearish = HtfTrend::new(TrendBias::Bearish, dec!(0.9));
    assert!(engine
        .evaluate(&key, &tape(&closes), Some(bearish))
        .is_none());

    // Bearish but below the confidence gate: setup forms, unconfirmed.
    let weak = HtfTrend::new(TrendBias::Bearish, dec!(0.3));
    let event = engine.evaluate(&key, &tape(&closes), Some(weak)).unwrap();
    match event {
        SetupEvent::Created(s) => {
            assert_eq!(s.htf_alignment, pulse_detector::HtfAlignment::Unconfirmed);
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn insufficient_data_is_a_silent_noop() {
    let mut engine = SetupEngine::new(test_config()).unwrap();
    let closes = impulse_and_first_extreme();
    let candles = tape(&closes);
    let key = key();

    // Too few candles for the oscillator or any swing structure.
    assert!(engine.evaluate(&key, &candles[..2], None).is_none());
    assert!(engine.evaluate(&key, &[], None).is_none());
    assert_eq!(engine.tracked_count(), 0);
}

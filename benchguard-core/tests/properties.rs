//! Property tests for the classifier
//!
//! Window bounds are inclusive, and under the per-cycle policy each counter
//! grows by exactly the number of cycles its check failed.

use benchguard_core::{
    classifier::{apply, classify, Reading},
    sample::ChannelSample,
    Range, ThresholdConfig,
};
use proptest::prelude::*;

fn window() -> impl Strategy<Value = Range> {
    (-50.0f32..50.0, 0.0f32..20.0).prop_map(|(lo, width)| Range::new(lo, lo + width))
}

fn reading() -> impl Strategy<Value = Reading> {
    (3.0f32..7.0, 0.0f32..150.0, -7.0f32..7.0)
        .prop_map(|(bus, current, signal)| Reading::new(bus, current, signal))
}

proptest! {
    #[test]
    fn range_bounds_classify_ok(supply in window(), current in window()) {
        let mut config = ThresholdConfig::default();
        config.supply_voltage_range = supply;
        config.presence_current_range = current;

        for (bus, ma) in [(supply.lo, current.lo), (supply.hi, current.hi)] {
            let health = classify(&Reading::new(bus, ma, 3.5), &config);
            prop_assert!(health.supply_ok);
            prop_assert!(health.current_ok);
        }
    }

    #[test]
    fn signal_bounds_of_both_windows_classify_ok(pos in window(), neg in window()) {
        let mut config = ThresholdConfig::default();
        config.signal_positive_range = pos;
        config.signal_negative_range = neg;

        for signal in [pos.lo, pos.hi, neg.lo, neg.hi] {
            prop_assert!(classify(&Reading::new(5.0, 15.0, signal), &config).signal_ok);
        }
    }

    #[test]
    fn counters_track_failing_cycles(readings in proptest::collection::vec(reading(), 1..64)) {
        let config = ThresholdConfig::default();
        let mut sample = ChannelSample::new(0);
        let mut expected = (0u32, 0u32, 0u32);

        for (t, reading) in readings.iter().enumerate() {
            let before = sample.counters();
            let health = apply(&mut sample, *reading, &config, t as u64).unwrap();

            expected.0 += u32::from(!health.supply_ok);
            expected.1 += u32::from(!health.signal_ok);
            expected.2 += u32::from(!health.current_ok);

            let after = sample.counters();
            prop_assert!(after.supply >= before.supply);
            prop_assert!(after.signal >= before.signal);
            prop_assert!(after.current >= before.current);
        }

        prop_assert_eq!(sample.supply_error_count(), expected.0);
        prop_assert_eq!(sample.signal_error_count(), expected.1);
        prop_assert_eq!(sample.current_error_count(), expected.2);
        prop_assert_eq!(sample.cycles() as usize, readings.len());
    }

    #[test]
    fn severity_stays_in_unit_interval(reading in reading()) {
        let health = classify(&reading, &ThresholdConfig::default());
        let score = health.severity();
        prop_assert!((0.0..=1.0).contains(&score));
        prop_assert_eq!(score == 0.0, health.all_ok());
    }
}

//! Simulated Bench Run
//!
//! Runs a short test session against the simulated source, the way the bench
//! application does on a machine without hardware attached.
//!
//! ## What You'll See
//!
//! - Relay pairs toggling on the session schedule
//! - Status transitions per channel as the relays switch
//! - A few injected faults showing up as errors
//! - The event log exported as CSV
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example simulated_bench [config.json]
//! ```

use std::sync::{Arc, Mutex};

use benchguard_core::{
    session::{SessionEvent, SessionTimer},
    time::SteppedTime,
    EventLog, Runner, SharedSource, SimulatedSource, SimulationOptions, ThresholdConfig,
    TransitionTracker,
};

fn main() {
    println!("BenchGuard Simulated Bench");
    println!("==========================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => match ThresholdConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("cannot use {path}: {e}");
                std::process::exit(1);
            }
        },
        None => ThresholdConfig {
            test_duration_s: 40,
            ..ThresholdConfig::default()
        },
    };

    println!("Supply window:  [{}, {}] V", config.supply_voltage_range.lo, config.supply_voltage_range.hi);
    println!("Current window: [{}, {}] mA", config.presence_current_range.lo, config.presence_current_range.hi);
    println!(
        "Cadence: sample every {} ms, toggle every {} s, run {} s\n",
        config.sample_interval_ms, config.relay_toggle_interval_s, config.test_duration_s
    );

    let options = SimulationOptions::default().with_faults(true).with_seed(2024);
    let source: SharedSource = Arc::new(Mutex::new(SimulatedSource::new(options)));

    // Simulated time keeps the example fast; a real bench uses the system clock
    let start = 1_714_744_800_000;
    let interval_ms = u64::from(config.sample_interval_ms);
    let mut runner = Runner::new(Arc::new(config.clone()))
        .with_time_source(Box::new(SteppedTime::new(start, interval_ms)));
    runner.set_source(&source);

    let report = runner.start();
    if !report.is_ok() {
        println!("Degraded start, failed: {:?}", report.failed());
    }

    let mut tracker = TransitionTracker::new();
    tracker.set_serial(0, Some("DEMO-0001"));
    let mut log = EventLog::for_clock(runner.clock());
    let mut timer = SessionTimer::from_config(&config, start);
    let mut now = start;

    loop {
        match timer.poll(now) {
            SessionEvent::Expired => break,
            SessionEvent::ToggleDue => {
                let on = runner.toggle_relays();
                println!("[{}] relays {}", timer.remaining_hms(now), if on { "ON" } else { "OFF" });
            }
            SessionEvent::Continue => {}
        }

        runner.step();
        let events = tracker.observe(runner.sensors(), |ch| runner.channel_relay_on(ch), &config);
        for event in &events {
            println!(
                "[{}] ch{} {:<8} {:<5} {}",
                timer.remaining_hms(now),
                event.channel + 1,
                event.category,
                event.severity,
                event.detail
            );
        }
        log.extend(events);
        now += interval_ms;
    }
    runner.stop();

    println!("\nFinal counters (supply / signal / current):");
    for sample in runner.sensors() {
        let c = sample.counters();
        println!("  ch{}: {:>4} / {:>4} / {:>4}", sample.channel() + 1, c.supply, c.signal, c.current);
    }

    println!("\nEvent log ({} entries):", log.len());
    if let Err(e) = log.write_csv(std::io::stdout().lock()) {
        eprintln!("CSV export failed: {e}");
    }
}

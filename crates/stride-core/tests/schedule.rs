use jiff::tz::{self, TimeZone};
use jiff::Timestamp;

use stride_core::schedule::{schedule_date, schedule_hour, DeliveryWindow};

fn ts(s: &str) -> Timestamp {
    s.parse().expect("valid timestamp")
}

#[test]
fn utc_date_is_calendar_date_of_timestamp() {
    let date = schedule_date(ts("2026-03-10T23:30:00Z"), &TimeZone::UTC);
    assert_eq!(date, jiff::civil::date(2026, 3, 10));
}

#[test]
fn offset_zone_moves_the_date_boundary() {
    let eastern = TimeZone::fixed(tz::offset(-5));
    // 02:00 UTC is still the previous evening five hours west.
    let date = schedule_date(ts("2026-03-11T02:00:00Z"), &eastern);
    assert_eq!(date, jiff::civil::date(2026, 3, 10));

    let tokyo = TimeZone::fixed(tz::offset(9));
    let date = schedule_date(ts("2026-03-10T20:00:00Z"), &tokyo);
    assert_eq!(date, jiff::civil::date(2026, 3, 11));
}

#[test]
fn hour_follows_zone() {
    let eastern = TimeZone::fixed(tz::offset(-5));
    assert_eq!(schedule_hour(ts("2026-03-11T14:00:00Z"), &eastern), 9);
}

#[test]
fn window_parses_and_checks_hours() {
    let window: DeliveryWindow = "7-9".parse().unwrap();
    assert!(!window.contains_hour(6));
    assert!(window.contains_hour(7));
    assert!(window.contains_hour(8));
    assert!(!window.contains_hour(9));
}

#[test]
fn window_wraps_midnight() {
    let window: DeliveryWindow = "22-2".parse().unwrap();
    assert!(window.contains_hour(23));
    assert!(window.contains_hour(1));
    assert!(!window.contains_hour(2));
    assert!(!window.contains_hour(12));
}

#[test]
fn default_window_is_always_open() {
    let window = DeliveryWindow::default();
    assert!((0..24).all(|h| window.contains_hour(h)));
    assert_eq!(window.to_string(), "0-24");
}

#[test]
fn window_rejects_garbage() {
    assert!("7".parse::<DeliveryWindow>().is_err());
    assert!("a-b".parse::<DeliveryWindow>().is_err());
    assert!("7-25".parse::<DeliveryWindow>().is_err());
}

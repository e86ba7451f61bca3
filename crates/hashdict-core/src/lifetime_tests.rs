//! Tests for the reload interval.

use crate::lifetime::*;
use std::time::Duration;

#[test]
fn test_default_is_static() {
    let lifetime = DictionaryLifetime::default();
    assert!(lifetime.is_static());
    assert_eq!(lifetime.next_update_delay(0.5), None);
    assert_eq!(lifetime, DictionaryLifetime::never());
}

#[test]
fn test_new_orders_bounds() {
    let lifetime = DictionaryLifetime::new(300, 60);
    assert_eq!(lifetime.min_sec, 60);
    assert_eq!(lifetime.max_sec, 300);
    assert!(!lifetime.is_static());
}

#[test]
fn test_next_update_delay_spans_bounds() {
    let lifetime = DictionaryLifetime::new(60, 120);
    assert_eq!(lifetime.next_update_delay(0.0), Some(Duration::from_secs(60)));
    assert_eq!(lifetime.next_update_delay(1.0), Some(Duration::from_secs(120)));
    assert_eq!(lifetime.next_update_delay(0.5), Some(Duration::from_secs(90)));
}

#[test]
fn test_next_update_delay_clamps_jitter() {
    let lifetime = DictionaryLifetime::new(10, 20);
    assert_eq!(lifetime.next_update_delay(-3.0), Some(Duration::from_secs(10)));
    assert_eq!(lifetime.next_update_delay(7.0), Some(Duration::from_secs(20)));
    assert_eq!(lifetime.next_update_delay(f64::NAN), Some(Duration::from_secs(10)));
}

#[test]
fn test_fixed_interval() {
    let lifetime = DictionaryLifetime::new(0, 30);
    assert_eq!(lifetime.next_update_delay(0.0), Some(Duration::ZERO));
    assert_eq!(lifetime.next_update_delay(1.0), Some(Duration::from_secs(30)));
}

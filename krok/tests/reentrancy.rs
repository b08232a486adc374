//! Mutation of a hook while that hook is dispatching, and nested dispatch
//! of the same tag.

mod common;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use common::{recorder, str_of, string_filter};
use krok::{Callback, Registry, Value};

#[test]
fn add_at_later_priority_runs_in_the_current_pass() {
    let registry = Arc::new(Registry::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let late = recorder(&log, 20);
    {
        let registry2 = Arc::clone(&registry);
        let log = Arc::clone(&log);
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    log.lock().unwrap().push(10);
                    registry2.add_filter("t", late.clone(), 20, 1).unwrap();
                    Ok(args[0].clone())
                }),
                10,
                1,
            )
            .unwrap();
    }

    registry.apply_filters("t", Value::unit(), &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec![10, 20]);
}

#[test]
fn add_at_earlier_priority_waits_for_the_next_pass() {
    let registry = Arc::new(Registry::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let early = recorder(&log, 5);
    {
        let registry2 = Arc::clone(&registry);
        let log = Arc::clone(&log);
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    log.lock().unwrap().push(10);
                    registry2.add_filter("t", early.clone(), 5, 1).unwrap();
                    Ok(args[0].clone())
                }),
                10,
                1,
            )
            .unwrap();
    }

    registry.apply_filters("t", Value::unit(), &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![10]);

    registry.apply_filters("t", Value::unit(), &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![10, 5, 10]);
}

#[test]
fn append_at_the_executing_priority_runs_in_the_current_pass() {
    let registry = Arc::new(Registry::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let appended = recorder(&log, 11);
    {
        let registry2 = Arc::clone(&registry);
        let log = Arc::clone(&log);
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    log.lock().unwrap().push(10);
                    registry2.add_filter("t", appended.clone(), 10, 1).unwrap();
                    Ok(args[0].clone())
                }),
                10,
                1,
            )
            .unwrap();
    }

    registry.apply_filters("t", Value::unit(), &[]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec![10, 11]);
}

#[test]
fn removing_a_not_yet_run_callback_suppresses_it() {
    let registry = Arc::new(Registry::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let late = recorder(&log, 20);
    let late_id = late.id().clone();
    registry.add_filter("t", late, 20, 1).unwrap();
    {
        let registry2 = Arc::clone(&registry);
        let log = Arc::clone(&log);
        let late_id = late_id.clone();
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    log.lock().unwrap().push(10);
                    registry2.remove_filter("t", &late_id, 20);
                    Ok(args[0].clone())
                }),
                10,
                1,
            )
            .unwrap();
    }

    registry.apply_filters("t", Value::unit(), &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![10]);
    assert_eq!(registry.filter_priority("t", &late_id), None);

    registry.apply_filters("t", Value::unit(), &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![10, 10]);
}

#[test]
fn removing_an_already_run_callback_keeps_its_output() {
    let registry = Arc::new(Registry::new());
    let early = string_filter(|s| format!("{s}e")).named("early");
    let early_id = early.id().clone();
    registry.add_filter("t", early, 5, 1).unwrap();
    {
        let registry2 = Arc::clone(&registry);
        let early_id = early_id.clone();
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    registry2.remove_filter("t", &early_id, 5);
                    Ok(Value::from(format!("{}x", str_of(&args[0]))))
                }),
                10,
                1,
            )
            .unwrap();
    }

    let out = registry.apply_filters("t", Value::from(""), &[]).unwrap();
    assert_eq!(str_of(&out), "ex");

    let out = registry.apply_filters("t", Value::from(""), &[]).unwrap();
    assert_eq!(str_of(&out), "x");
}

#[test]
fn nested_same_tag_dispatch_keeps_both_passes_coherent() {
    let registry = Arc::new(Registry::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    registry.add_filter("t", recorder(&log, 1), 1, 1).unwrap();
    registry.add_filter("t", recorder(&log, 20), 20, 1).unwrap();
    {
        let registry2 = Arc::clone(&registry);
        let log = Arc::clone(&log);
        let recursed = AtomicBool::new(false);
        registry
            .add_filter(
                "t",
                Callback::new(move |args| {
                    log.lock().unwrap().push(10);
                    if !recursed.swap(true, Ordering::SeqCst) {
                        registry2.apply_filters("t", Value::unit(), &[])?;
                    }
                    Ok(args[0].clone())
                }),
                10,
                1,
            )
            .unwrap();
    }

    registry.apply_filters("t", Value::unit(), &[]).unwrap();

    // Outer pass reaches 10, the inner pass completes 1-10-20, then the
    // outer pass resumes at 20. Both visit their full bucket set once.
    assert_eq!(*log.lock().unwrap(), vec![1, 10, 1, 10, 20, 20]);
    assert_eq!(registry.hook("t").unwrap().nesting_level(), 0);
}

#[test]
fn nesting_depth_is_unbounded() {
    let registry = Arc::new(Registry::new());
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let registry2 = Arc::clone(&registry);
        let calls = Arc::clone(&calls);
        registry
            .add_action(
                "deep",
                Callback::action(move |_| {
                    if calls.fetch_add(1, Ordering::SeqCst) + 1 < 5 {
                        registry2.do_action("deep", &[])?;
                    }
                    Ok(())
                }),
                10,
                0,
            )
            .unwrap();
    }

    registry.do_action("deep", &[]).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(registry.hook("deep").unwrap().nesting_level(), 0);
    assert_eq!(registry.did_action("deep"), 5);
}

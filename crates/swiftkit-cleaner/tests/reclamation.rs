//! End-to-end reclamation behaviour across threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use swiftkit_cleaner::{Cleaner, CleanerConfig};

fn fast_cleaner() -> Cleaner {
    Cleaner::with_config(CleanerConfig {
        thread_name: "reclamation-test".into(),
        poll_interval: Duration::from_millis(5),
    })
    .unwrap()
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[test]
fn actions_run_on_the_named_thread() {
    let cleaner = fast_cleaner();
    let seen = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    drop(cleaner.register(move || {
        *s.lock().unwrap() = thread::current().name().map(str::to_owned);
    }));
    assert!(wait_until(|| seen.lock().unwrap().is_some()));
    assert_eq!(
        seen.lock().unwrap().as_deref(),
        Some("reclamation-test")
    );
}

#[test]
fn tokens_dropped_on_many_threads_all_run() {
    let cleaner = Arc::new(fast_cleaner());
    let hits = Arc::new(AtomicUsize::new(0));

    thread::scope(|scope| {
        for _ in 0..8 {
            let cleaner = Arc::clone(&cleaner);
            let hits = Arc::clone(&hits);
            scope.spawn(move || {
                for _ in 0..50 {
                    let h = Arc::clone(&hits);
                    drop(cleaner.register(move || {
                        h.fetch_add(1, Ordering::SeqCst);
                    }));
                }
            });
        }
    });

    assert!(wait_until(|| hits.load(Ordering::SeqCst) == 400));
    let stats = cleaner.stats();
    assert_eq!(stats.registered, 400);
    assert!(wait_until(|| cleaner.stats().cleaned == 400));
    assert_eq!(cleaner.stats().pending, 0);
}

#[test]
fn panics_are_swallowed_and_later_actions_still_run() {
    let cleaner = fast_cleaner();
    let hits = Arc::new(AtomicUsize::new(0));
    for i in 0..10 {
        let h = Arc::clone(&hits);
        drop(cleaner.register(move || {
            if i % 2 == 0 {
                panic!("cleanup {i} failed");
            }
            h.fetch_add(1, Ordering::SeqCst);
        }));
    }
    assert!(wait_until(|| cleaner.stats().panicked == 5));
    assert!(wait_until(|| hits.load(Ordering::SeqCst) == 5));
    assert!(cleaner.monitor().is_running());
}

#[test]
fn live_tokens_are_not_cleaned() {
    let cleaner = fast_cleaner();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let token = cleaner.register(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    thread::sleep(Duration::from_millis(30));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(token.is_pending());
    drop(token);
    assert!(wait_until(|| hits.load(Ordering::SeqCst) == 1));
}

#[test]
fn thread_stops_once_cleaner_and_tokens_are_gone() {
    let cleaner = fast_cleaner();
    let monitor = cleaner.monitor();
    let tokens: Vec<_> = (0..3).map(|_| cleaner.register(|| {})).collect();
    drop(cleaner);
    assert!(monitor.is_running());
    drop(tokens);
    assert!(wait_until(|| !monitor.is_running()));
    assert_eq!(monitor.stats().cleaned, 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Whether each token is cleaned explicitly or dropped, every action
    /// runs exactly once.
    #[test]
    fn every_action_runs_exactly_once(explicit in proptest::collection::vec(any::<bool>(), 1..40)) {
        let cleaner = fast_cleaner();
        let counts: Arc<Vec<AtomicUsize>> =
            Arc::new((0..explicit.len()).map(|_| AtomicUsize::new(0)).collect());

        let tokens: Vec<_> = (0..explicit.len())
            .map(|i| {
                let counts = Arc::clone(&counts);
                cleaner.register(move || {
                    counts[i].fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for (token, clean_now) in tokens.into_iter().zip(explicit.iter()) {
            if *clean_now {
                prop_assert!(token.clean());
            } else {
                drop(token);
            }
        }

        let n = explicit.len() as u64;
        prop_assert!(wait_until(|| cleaner.stats().cleaned == n));
        for c in counts.iter() {
            prop_assert_eq!(c.load(Ordering::SeqCst), 1);
        }
    }
}

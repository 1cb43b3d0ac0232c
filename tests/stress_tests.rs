//! Stress testing suite for pg-rotating
//!
//! Exercises the shared credential state under concurrent opens, flips and
//! replacements. No database required.
//!
//! Run with: cargo test --test stress_tests -- --nocapture

use futures::future::BoxFuture;
use pg_rotating::credential::{Credential, CredentialState, Slot};
use pg_rotating::{Connect, DriverError, RefreshPolicy, RotatingConnector};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::Notify;

/// Accepts any pair whose password is `<username>-pw`; rejects `reject_user`
struct ConsistencyCheck {
    reject_user: Option<&'static str>,
    attempts: AtomicUsize,
}

impl ConsistencyCheck {
    fn new(reject_user: Option<&'static str>) -> Self {
        Self {
            reject_user,
            attempts: AtomicUsize::new(0),
        }
    }
}

impl Connect for ConsistencyCheck {
    type Connection = String;

    fn connect<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<String, DriverError>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            // Yield so concurrent opens interleave between snapshot and connect.
            tokio::task::yield_now().await;

            let rest = dsn.split_once("://").unwrap().1;
            let (userinfo, _) = rest.split_once('@').unwrap();
            let (user, password) = userinfo.split_once(':').unwrap();
            assert_eq!(password, format!("{}-pw", user), "torn credential pair");

            if Some(user) == self.reject_user {
                Err(DriverError::new("password authentication failed").with_code("28P01"))
            } else {
                Ok(user.to_string())
            }
        })
    }
}

fn state() -> CredentialState {
    CredentialState::new(
        Credential::new("odd_user", "odd_user-pw"),
        Credential::new("even_user", "even_user-pw"),
        Slot::Odd,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_stress_concurrent_opens() {
    println!("Test: concurrent opens");

    const TASKS: usize = 64;
    const OPENS_PER_TASK: usize = 50;

    let connector = Arc::new(RotatingConnector::new(ConsistencyCheck::new(None), state()));

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let connector = connector.clone();
        handles.push(tokio::spawn(async move {
            let mut odd = 0usize;
            for _ in 0..OPENS_PER_TASK {
                let user = connector
                    .open("postgres://db:5432/app")
                    .await
                    .expect("open should succeed");
                if user == "odd_user" {
                    odd += 1;
                }
            }
            odd
        }));
    }

    let mut odd_total = 0;
    for handle in handles {
        odd_total += handle.await.unwrap();
    }
    let total = TASKS * OPENS_PER_TASK;
    println!("  {} of {} opens used the odd slot", odd_total, total);

    // Every open flips exactly once; an even number of flips lands back on odd.
    assert_eq!(connector.state().active_slot(), Slot::Odd);
    assert_eq!(connector.driver().attempts.load(Ordering::SeqCst), total);
    assert!(odd_total > 0 && odd_total < total);
    println!("  Slot parity preserved: ✓");
}

#[test]
fn test_stress_replace_all_is_atomic() {
    println!("Test: replace_all vs concurrent snapshots");

    let state = state();
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let state = state.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut generation = 0u64;
            while !stop.load(Ordering::Relaxed) {
                generation += 1;
                let odd = format!("odd_g{}", generation);
                let even = format!("even_g{}", generation);
                let active = if generation % 2 == 0 { Slot::Odd } else { Slot::Even };
                state.replace_all(
                    Credential::new(odd.clone(), format!("{}-pw", odd)),
                    Credential::new(even.clone(), format!("{}-pw", even)),
                    active,
                );
            }
            generation
        })
    };

    let flipper = {
        let state = state.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                state.flip_active();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..20_000 {
                    let snap = state.snapshot_active();
                    assert_eq!(
                        snap.password(),
                        format!("{}-pw", snap.username()),
                        "snapshot mixed two generations"
                    );
                    let prefix = match snap.slot {
                        Slot::Odd => "odd_",
                        Slot::Even => "even_",
                    };
                    assert!(snap.username().starts_with(prefix));
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader saw a torn snapshot");
    }
    stop.store(true, Ordering::Relaxed);
    let generations = writer.join().unwrap();
    flipper.join().unwrap();
    println!("  {} generations written, no torn reads: ✓", generations);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_stress_single_flight_refresh() {
    println!("Test: concurrent failovers share one refresh");

    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());
    let connector = Arc::new(
        RotatingConnector::builder(ConsistencyCheck::new(Some("odd_user")), state())
            .refresh_policy(RefreshPolicy::SingleFlight)
            .refresher({
                let calls = calls.clone();
                let release = release.clone();
                move |_state: CredentialState| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let release = release.clone();
                    async move { release.notified().await }
                }
            })
            .build(),
    );

    let mut handles = Vec::new();
    for _ in 0..32 {
        let connector = connector.clone();
        handles.push(tokio::spawn(async move {
            let mut ok = 0usize;
            for _ in 0..10 {
                if connector.open("postgres://db:5432/app").await.is_ok() {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut ok_total = 0;
    for handle in handles {
        ok_total += handle.await.unwrap();
    }

    let attempts = connector.driver().attempts.load(Ordering::SeqCst);
    println!("  {} opens succeeded over {} attempts", ok_total, attempts);
    // Some opens started on the rejected odd slot and failed over.
    assert!(attempts > 320);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(connector.state().is_refresh_in_flight());

    release.notify_one();
    tokio::time::timeout(Duration::from_secs(5), async {
        while connector.state().is_refresh_in_flight() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("refresh task should finish once released");
    println!("  Single refresh, flag cleared: ✓");
}

use std::time::Duration;

use revmap_common::config::StorePaths;
use revmap_core::{Pipeline, Stores};
use tokio_util::sync::CancellationToken;

use crate::support::{ip, options, strings, Calls, Scenario};

/// Addresses collected by an earlier run are neither reported nor reversed
/// again, and a query is never searched twice.
#[tokio::test]
async fn second_run_skips_known_work() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::in_dir(dir.path());
    std::fs::write(&paths.ips, "1.1.1.1\n").unwrap();

    let scenario = || Scenario {
        sentences: strings(&["shared hosting providers"]),
        results: vec![(
            "shared hosting providers".into(),
            strings(&["https://1.1.1.1/a", "http://2.2.2.2/b", "https://2.2.2.2/c"]),
        )],
        ..Default::default()
    };

    let (collaborators, calls) = scenario().build();
    let stores = Stores::load(&paths).await.unwrap();
    let summary = Pipeline::new(collaborators, stores, options(4))
        .run_once(&CancellationToken::new())
        .await;

    assert_eq!(summary.queries, 1);
    assert_eq!(summary.new_ips, 1);
    assert_eq!(summary.new_domains, 1);
    assert_eq!(Calls::get(&calls.reverse), 1);
    assert_eq!(std::fs::read_to_string(&paths.ips).unwrap(), "1.1.1.1\n2.2.2.2\n");
    assert_eq!(
        std::fs::read_to_string(&paths.domains).unwrap(),
        "2.2.2.2.example\n"
    );

    let (collaborators, calls) = scenario().build();
    let stores = Stores::load(&paths).await.unwrap();
    let summary = Pipeline::new(collaborators, stores, options(4))
        .run_once(&CancellationToken::new())
        .await;

    assert_eq!(summary.queries, 0);
    assert_eq!(Calls::get(&calls.generate), 1);
    assert_eq!(Calls::get(&calls.search), 0);
    assert_eq!(Calls::get(&calls.reverse), 0);
}

#[tokio::test]
async fn empty_generation_makes_no_external_calls() {
    let (collaborators, calls) = Scenario::default().build();
    let summary = Pipeline::new(collaborators, Stores::in_memory(), options(4))
        .run_once(&CancellationToken::new())
        .await;

    assert_eq!(summary, Default::default());
    assert!(summary.found_nothing());
    assert_eq!(Calls::get(&calls.search), 0);
    assert_eq!(Calls::get(&calls.reverse), 0);
}

#[tokio::test]
async fn failed_lookup_does_not_affect_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::in_dir(dir.path());

    let (collaborators, calls) = Scenario {
        sentences: strings(&["three separate hosts"]),
        results: vec![(
            "three separate hosts".into(),
            strings(&["http://10.0.0.1/", "http://10.0.0.2/", "http://10.0.0.3/"]),
        )],
        failing: vec![ip("10.0.0.2")],
        ..Default::default()
    }
    .build();

    let stores = Stores::load(&paths).await.unwrap();
    let summary = Pipeline::new(collaborators, stores, options(4))
        .run_once(&CancellationToken::new())
        .await;

    assert_eq!(Calls::get(&calls.reverse), 3);
    assert_eq!(summary.new_ips, 3);
    assert_eq!(summary.new_domains, 2);
    assert_eq!(summary.failed_lookups, 1);
    assert!(summary.had_failures());

    let mut domains: Vec<String> = std::fs::read_to_string(&paths.domains)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    domains.sort();
    assert_eq!(domains, vec!["10.0.0.1.example", "10.0.0.3.example"]);
}

#[tokio::test]
async fn reverse_lookups_respect_the_concurrency_bound() {
    let urls: Vec<String> = (0..200)
        .map(|i| format!("http://10.1.{}.{}/", i / 250, i % 250 + 1))
        .collect();
    let (collaborators, calls) = Scenario {
        sentences: strings(&["many many hosts"]),
        results: vec![("many many hosts".into(), urls)],
        delay: Duration::from_millis(5),
        ..Default::default()
    }
    .build();

    let summary = Pipeline::new(collaborators, Stores::in_memory(), options(50))
        .run_once(&CancellationToken::new())
        .await;

    assert_eq!(summary.new_ips, 200);
    assert_eq!(summary.new_domains, 200);
    assert_eq!(Calls::get(&calls.reverse), 200);
    let peak = Calls::get(&calls.peak_in_flight);
    assert!(peak <= 50, "peak concurrency was {peak}");
    assert!(peak > 1, "lookups never overlapped");
}

#[tokio::test]
async fn cancellation_before_search_keeps_generated_queries() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::in_dir(dir.path());
    let (collaborators, calls) = Scenario {
        sentences: strings(&["first query here", "second query here"]),
        ..Default::default()
    }
    .build();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stores = Stores::load(&paths).await.unwrap();
    let summary = Pipeline::new(collaborators, stores, options(4))
        .run_once(&cancel)
        .await;

    assert!(summary.cancelled);
    assert_eq!(summary.queries, 2);
    assert_eq!(Calls::get(&calls.search), 0);
    assert_eq!(Calls::get(&calls.reverse), 0);
    assert_eq!(
        std::fs::read_to_string(&paths.queries).unwrap(),
        "first query here\nsecond query here\n"
    );
}

use std::net::IpAddr;
use std::sync::Arc;

use revmap_common::store::DedupSet;

use crate::support::ip;

#[tokio::test]
async fn reload_sees_everything_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ips.txt");

    let set: DedupSet<IpAddr> = DedupSet::load(&path).await.unwrap();
    let first = set.insert_new([ip("8.8.8.8"), ip("8.8.4.4"), ip("8.8.8.8")]);
    assert_eq!(first, vec![ip("8.8.8.8"), ip("8.8.4.4")]);
    set.append_durable(&first).await.unwrap();

    let second = set.insert_new([ip("8.8.4.4"), ip("2001:4860:4860::8888")]);
    set.append_durable(&second).await.unwrap();
    drop(set);

    let reloaded: DedupSet<IpAddr> = DedupSet::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), 3);
    assert!(reloaded.contains(&ip("2001:4860:4860::8888")));
    assert!(!reloaded.try_insert(ip("8.8.8.8")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("domains.txt");
    let set: Arc<DedupSet<String>> = Arc::new(DedupSet::load(&path).await.unwrap());

    let mut tasks = tokio::task::JoinSet::new();
    for worker in 0..8 {
        let set = set.clone();
        tasks.spawn(async move {
            for n in 0..25 {
                // Every worker offers the shared names too; only one may win each.
                let batch = set.insert_new([
                    format!("w{worker}-{n}.example"),
                    format!("shared-{n}.example"),
                ]);
                set.append_durable(&batch).await.unwrap();
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 8 * 25 + 25);
    assert!(lines.iter().all(|l| l.ends_with(".example")));

    let reloaded: DedupSet<String> = DedupSet::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), lines.len());
}

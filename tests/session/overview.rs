//! XOVER

use std::fs;

use newsd::GroupInfo;

use super::common::{TestServer, code};

#[tokio::test]
async fn test_xover_counts_match_range() {
    let server = TestServer::new();
    server.group("a.b");
    for i in 1..=10 {
        server.post("a.b", &format!("article {i}"));
    }
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    for (a, b) in [(1u64, 10u64), (3, 7), (4, 4), (10, 10)] {
        assert_eq!(client.command(&format!("XOVER {a}-{b}")).await, "224 overview follows");
        let records = client.data().await;
        assert_eq!(records.len() as u64, b - a + 1);
        for (record, n) in records.iter().zip(a..=b) {
            assert!(record.starts_with(&format!("{n}\t")), "{record}");
        }
    }
}

#[tokio::test]
async fn test_xover_record_fields() {
    let server = TestServer::new();
    server.group("a.b");
    server.post("a.b", "hello world");
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    client.command("XOVER").await;
    let records = client.data().await;
    assert_eq!(records.len(), 1);
    let fields: Vec<&str> = records[0].split('\t').collect();
    assert_eq!(fields[0], "1");
    assert_eq!(fields[1], "hello world");
    assert_eq!(fields[2], "poster@example.com");
    assert_eq!(fields[4], "<1-a.b@news.test>");
    assert_eq!(fields[7], "1");
    assert_eq!(fields[8], "Xref: news.test a.b:1");
}

#[tokio::test]
async fn test_xover_empty_group() {
    let server = TestServer::new();
    server.group("a.b");
    server.set_info("a.b", GroupInfo { start: 0, end: 0, total: 0 });
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    assert_eq!(client.command("XOVER").await, "224 overview follows");
    assert!(client.data().await.is_empty());
    assert_eq!(client.command("XOVER 1-5").await, "224 overview follows");
    assert!(client.data().await.is_empty());
}

#[tokio::test]
async fn test_xover_errors() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    assert_eq!(code(&client.command("XOVER").await), 412);
    client.command("GROUP a.b").await;
    assert_eq!(client.command("XOVER a-b").await, "501 bad article range");
}

#[tokio::test]
async fn test_unreadable_counters_fail_instead_of_using_stale_ones() {
    let server = TestServer::new();
    server.group("a.b");
    server.post("a.b", "first");
    let mut client = server.connect().await;
    assert_eq!(client.command("GROUP a.b").await, "211 1 1 1 a.b group selected");

    let info = server.spool.group_dir("a.b").unwrap().join(".info");
    fs::remove_file(&info).unwrap();
    fs::create_dir(&info).unwrap();

    assert_eq!(code(&client.command("XOVER 1").await), 403);
    assert_eq!(code(&client.command("STAT 1").await), 403);
    assert_eq!(code(&client.command("NEXT").await), 403);
    assert_eq!(client.command("DATE").await.len(), "111 YYYYMMDDhhmmss".len());
}

#[tokio::test]
async fn test_removed_group_answers_411() {
    let server = TestServer::new();
    server.group("a.b");
    server.post("a.b", "first");
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    fs::remove_file(server.spool.group_dir("a.b").unwrap().join(".config")).unwrap();

    let status = client.command("XOVER 1").await;
    assert_eq!(status, "411 No such newsgroup: no such group 'a.b'");
}

//! POST

use std::collections::HashSet;
use std::fs;

use newsd::GroupConfig;

use super::common::{TestServer, code};

fn article(group: &str, subject: &str, body_lines: usize) -> String {
    let mut text = format!("From: a@b\nNewsgroups: {group}\nSubject: {subject}\n\n");
    for i in 0..body_lines {
        text.push_str(&format!("line {i}\n"));
    }
    text
}

#[tokio::test]
async fn test_post_stores_generated_headers() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    let status = client.post(&article("a.b", "first", 2)).await;
    assert_eq!(status, "240 Article posted successfully.");

    let stored = fs::read_to_string(server.spool.group_dir("a.b").unwrap().join("1")).unwrap();
    let head: Vec<&str> = stored.lines().take_while(|l| !l.is_empty()).collect();
    assert!(head.contains(&"Message-ID: <1-a.b@news.test>"));
    assert!(head.contains(&"Path: news.test"));
    assert!(head.contains(&"NNTP-Posting-Host: 127.0.0.1"));
    assert!(head.contains(&"Xref: news.test a.b:1"));
    assert!(head.contains(&"Lines: 2"));
    assert!(stored.ends_with("\n\nline 0\nline 1\n"));

    let group = server.spool.open_group("a.b").unwrap();
    assert_eq!((group.info.start, group.info.end, group.info.total), (1, 1, 1));
}

#[tokio::test]
async fn test_post_over_line_limit_creates_nothing() {
    let server = TestServer::new();
    server.group_with(
        "a.b",
        GroupConfig {
            post_limit: 10,
            ..GroupConfig::default()
        },
    );
    let dir = server.spool.group_dir("a.b").unwrap();
    let mut client = server.connect().await;

    // without a selected group the spool enforces the limit
    let status = client.post(&article("a.b", "long", 11)).await;
    assert_eq!(code(&status), 441);
    assert!(status.contains("line limit of 10"), "{status}");
    assert!(!dir.join("1").exists());

    // with the group selected the limit applies while reading
    client.command("GROUP a.b").await;
    let status = client.post(&article("a.b", "long", 11)).await;
    assert_eq!(status, "441 Not Posted: article exceeds sanity line limit of 10.");
    assert!(!dir.join("1").exists());

    // the session is still in step with the client
    assert_eq!(client.command("GROUP a.b").await, "211 0 0 0 a.b group selected");
}

#[tokio::test]
async fn test_post_rejections() {
    let server = TestServer::new();
    server.group_with(
        "closed.group",
        GroupConfig {
            post_ok: false,
            ..GroupConfig::default()
        },
    );
    let mut client = server.connect().await;

    let status = client.post("From: a@b\nSubject: s\n\nbody\n").await;
    assert_eq!(status, "441 article has no 'Newsgroups' field");

    let status = client.post(&article("no.such", "s", 1)).await;
    assert_eq!(status, "441 no such group 'no.such'");

    let status = client.post(&article("closed.group", "s", 1)).await;
    assert_eq!(status, "441 posting disabled for group 'closed.group'");
}

#[tokio::test]
async fn test_post_with_empty_message_id_is_refused() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    let status = client
        .post("From: a@b\nNewsgroups: a.b\nSubject: s\nMessage-ID:\n\nbody\n")
        .await;
    assert_eq!(
        status,
        "441 bad Message-ID '': must be enclosed in angle brackets"
    );
    assert_eq!(client.command("GROUP a.b").await, "211 0 0 0 a.b group selected");
    assert!(!server.spool.group_dir("a.b").unwrap().join("1").exists());

    let status = client
        .post("From: a@b\nNewsgroups: a.b\nSubject: s\nMessage-ID: <good@b>\n\nbody\n")
        .await;
    assert_eq!(code(&status), 240);
    assert_eq!(client.command("STAT 1").await, "223 1 <good@b> article retrieved - request text separately");
}

#[tokio::test]
async fn test_post_keeps_cursor() {
    let server = TestServer::new();
    server.group("a.b");
    server.post("a.b", "existing");
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    assert_eq!(code(&client.post(&article("a.b", "new", 1)).await), 240);
    assert!(client.command("STAT").await.starts_with("223 1 "));
}

#[tokio::test]
async fn test_concurrent_sessions_get_distinct_numbers() {
    let server = TestServer::new();
    server.group("a.b");
    let mut first = server.connect().await;
    let mut second = server.connect().await;

    const EACH: usize = 10;
    let a = async {
        for i in 0..EACH {
            assert_eq!(code(&first.post(&article("a.b", &format!("a{i}"), 1)).await), 240);
        }
    };
    let b = async {
        for i in 0..EACH {
            assert_eq!(code(&second.post(&article("a.b", &format!("b{i}"), 1)).await), 240);
        }
    };
    tokio::join!(a, b);

    let group = server.spool.open_group("a.b").unwrap();
    assert_eq!(group.info.total, 2 * EACH as u64);
    assert!(group.info.end - group.info.start + 1 >= group.info.total);

    let numbers = server.spool.article_numbers(&group).unwrap();
    assert_eq!(numbers.len(), 2 * EACH);
    let subjects: HashSet<String> = numbers
        .iter()
        .map(|n| {
            let article = server.spool.load_article(&group, *n).unwrap();
            article.subject
        })
        .collect();
    assert_eq!(subjects.len(), 2 * EACH);
}

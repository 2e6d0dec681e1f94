//! GROUP, LISTGROUP, NEXT and LAST

use std::fs;

use newsd::GroupInfo;

use super::common::{TestServer, code};

#[tokio::test]
async fn test_group_status_line() {
    let server = TestServer::new();
    server.group("a.b");
    server.set_info("a.b", GroupInfo { start: 5, end: 42, total: 38 });

    let mut client = server.connect().await;
    assert_eq!(client.command("GROUP a.b").await, "211 38 5 42 a.b group selected");
}

#[tokio::test]
async fn test_group_unknown_and_illegal() {
    let server = TestServer::new();
    let mut client = server.connect().await;

    let status = client.command("GROUP no.such").await;
    assert_eq!(code(&status), 411);
    assert!(status.contains("no.such"));

    let status = client.command("GROUP ../etc").await;
    assert_eq!(code(&status), 411);

    assert_eq!(code(&client.command("GROUP").await), 501);
}

#[tokio::test]
async fn test_group_sees_posts_from_other_sessions() {
    let server = TestServer::new();
    server.group("rush.general");
    let mut client = server.connect().await;

    assert_eq!(
        client.command("GROUP rush.general").await,
        "211 0 0 0 rush.general group selected"
    );
    server.post("rush.general", "late arrival");

    let status = client.command("STAT 1").await;
    assert!(status.starts_with("223 1 <1-rush.general@news.test>"), "{status}");
}

#[tokio::test]
async fn test_listgroup() {
    let server = TestServer::new();
    server.group("a.b");
    for i in 1..=4 {
        server.post("a.b", &format!("article {i}"));
    }
    let dir = server.spool.group_dir("a.b").unwrap();
    fs::remove_file(dir.join("3")).unwrap();

    let mut client = server.connect().await;
    assert_eq!(code(&client.command("LISTGROUP").await), 412);

    assert_eq!(client.command("LISTGROUP a.b").await, "211 4 1 4 a.b list follows");
    assert_eq!(client.data().await, vec!["1", "2", "4"]);

    // the group is now selected
    assert!(client.command("STAT").await.starts_with("223 1 "));
}

#[tokio::test]
async fn test_next_and_last_skip_gaps() {
    let server = TestServer::new();
    server.group("a.b");
    for i in 1..=5 {
        server.post("a.b", &format!("article {i}"));
    }
    let dir = server.spool.group_dir("a.b").unwrap();
    fs::remove_file(dir.join("2")).unwrap();
    fs::remove_file(dir.join("3")).unwrap();

    let mut client = server.connect().await;
    assert_eq!(code(&client.command("NEXT").await), 412);
    client.command("GROUP a.b").await;

    assert!(client.command("NEXT").await.starts_with("223 4 <4-a.b@news.test>"));
    assert!(client.command("NEXT").await.starts_with("223 5 "));
    assert_eq!(client.command("NEXT").await, "421 no next article in this group");

    assert!(client.command("LAST").await.starts_with("223 4 "));
    assert!(client.command("LAST").await.starts_with("223 1 "));
    assert_eq!(client.command("LAST").await, "422 no previous article in this group");
}

#[tokio::test]
async fn test_next_in_empty_group() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;
    assert_eq!(code(&client.command("NEXT").await), 420);
}

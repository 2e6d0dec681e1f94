//! LIST variants and NEWGROUPS

use newsd::GroupConfig;

use super::common::{TestServer, code};

fn server() -> TestServer {
    let server = TestServer::new();
    server.group_with(
        "rush.general",
        GroupConfig {
            description: "General discussion".into(),
            creator: "erco@example.com".into(),
            ..GroupConfig::default()
        },
    );
    server.group_with(
        "rush.announce",
        GroupConfig {
            post_ok: false,
            ..GroupConfig::default()
        },
    );
    server.post("rush.general", "one");
    server.post("rush.general", "two");
    server
}

#[tokio::test]
async fn test_list_active() {
    let server = server();
    let mut client = server.connect().await;

    assert_eq!(client.command("LIST").await, "215 list of newsgroups follows");
    assert_eq!(client.data().await, vec!["rush.announce 0 0 n", "rush.general 2 1 y"]);

    assert_eq!(client.command("list active").await, "215 list of newsgroups follows");
    assert_eq!(client.data().await.len(), 2);
}

#[tokio::test]
async fn test_list_newsgroups_and_times() {
    let server = server();
    let mut client = server.connect().await;

    assert_eq!(client.command("LIST NEWSGROUPS").await, "215 information follows");
    assert_eq!(
        client.data().await,
        vec!["rush.announce -", "rush.general General discussion"]
    );

    assert_eq!(code(&client.command("LIST ACTIVE.TIMES").await), 215);
    let lines = client.data().await;
    let general: Vec<&str> = lines[1].split(' ').collect();
    assert_eq!(general[0], "rush.general");
    assert!(general[1].parse::<u64>().unwrap() > 0);
    assert_eq!(general[2], "erco@example.com");

    assert_eq!(code(&client.command("LIST SUBSCRIPTIONS").await), 215);
    assert_eq!(client.data().await, vec!["rush.announce", "rush.general"]);
}

#[tokio::test]
async fn test_list_fixed_answers() {
    let server = server();
    let mut client = server.connect().await;

    assert_eq!(client.command("LIST OVERVIEW.FMT").await, "215 information follows");
    let fields = client.data().await;
    assert_eq!(fields[0], "Subject:");
    assert!(fields.contains(&"Xref:full".to_string()));

    assert_eq!(client.command("LIST EXTENSIONS").await, "202 Extensions supported:");
    assert!(client.data().await.contains(&"XOVER".to_string()));

    assert_eq!(
        client.command("LIST ACTIVE rush.*").await,
        "503 LIST ACTIVE <wildmat>: wildmats not supported"
    );
    assert_eq!(code(&client.command("LIST DISTRIBUTIONS").await), 503);
    assert_eq!(client.command("LIST BOGUS").await, "501 Syntax error");
}

#[tokio::test]
async fn test_newgroups() {
    let server = server();
    let mut client = server.connect().await;

    assert_eq!(
        client.command("NEWGROUPS 19700102 000000 GMT").await,
        "231 list of new newsgroups follows"
    );
    assert_eq!(client.data().await.len(), 2);

    assert_eq!(code(&client.command("NEWGROUPS 20991231 235959 GMT").await), 231);
    assert!(client.data().await.is_empty());

    assert_eq!(
        client.command("NEWGROUPS yesterday").await,
        "501 Bad or missing date/time arguments"
    );
}

//! ARTICLE, HEAD, BODY and STAT

use std::fs;

use super::common::{TestServer, code};

fn server_with_articles(count: usize) -> TestServer {
    let server = TestServer::new();
    server.group("a.b");
    for i in 1..=count {
        server.post("a.b", &format!("article {i}"));
    }
    server
}

#[tokio::test]
async fn test_dot_lines_survive_post_and_fetch() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    let status = client
        .post("From: a@b\nNewsgroups: a.b\nSubject: dots\n\n..hello\n.\nplain\n")
        .await;
    assert_eq!(status, "240 Article posted successfully.");

    client.command("GROUP a.b").await;
    let status = client.command("BODY 1").await;
    assert_eq!(status, "222 1 <1-a.b@news.test> article retrieved - body follows");
    assert_eq!(client.data().await, vec!["..hello", ".", "plain"]);
}

#[tokio::test]
async fn test_head_by_message_id_keeps_cursor() {
    let server = server_with_articles(20);
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    let status = client.command("HEAD <5-a.b@news.test>").await;
    assert_eq!(status, "221 5 <5-a.b@news.test> article retrieved - head follows");
    let head = client.data().await;
    assert!(head.contains(&"Subject: article 5".to_string()));
    assert!(client.command("STAT").await.starts_with("223 1 "));

    let status = client.command("HEAD 17").await;
    assert!(status.starts_with("221 17 <17-a.b@news.test>"));
    client.data().await;
    assert!(client.command("STAT").await.starts_with("223 17 "));
}

#[tokio::test]
async fn test_article_has_head_blank_line_and_body() {
    let server = server_with_articles(1);
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;

    let status = client.command("ARTICLE").await;
    assert_eq!(status, "220 1 <1-a.b@news.test> article retrieved - head and body follow");
    let lines = client.data().await;
    let blank = lines.iter().position(String::is_empty).unwrap();
    assert_eq!(lines[0], "Subject: article 1");
    assert!(lines[..blank].iter().any(|l| l == "Xref: news.test a.b:1"));
    assert!(lines[..blank].iter().any(|l| l == "NNTP-Posting-Host: localhost"));
    assert_eq!(&lines[blank + 1..], ["body of article 1"]);
}

#[tokio::test]
async fn test_retrieval_errors() {
    let server = server_with_articles(3);
    let mut client = server.connect().await;

    assert_eq!(client.command("HEAD 1").await, "412 Not currently in newsgroup");
    client.command("GROUP a.b").await;

    assert_eq!(
        client.command("STAT 9").await,
        "423 no such article in group (range 1-3)"
    );
    assert_eq!(client.command("STAT <nope@x>").await, "430 no such article found");
    assert_eq!(code(&client.command("STAT 1x").await), 501);

    let dir = server.spool.group_dir("a.b").unwrap();
    fs::remove_file(dir.join("2")).unwrap();
    assert_eq!(code(&client.command("BODY 2").await), 423);
    // a failed lookup leaves the cursor where it was
    assert!(client.command("STAT").await.starts_with("223 1 "));
}

#[tokio::test]
async fn test_no_current_article_in_empty_group() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;
    client.command("GROUP a.b").await;
    assert_eq!(client.command("HEAD").await, "420 no article has been selected");
}

#[tokio::test]
async fn test_client_message_id_is_kept() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    let status = client
        .post("From: a@b\nNewsgroups: a.b\nSubject: s\nMessage-ID: <abc@foo>\n\nbody\n")
        .await;
    assert_eq!(code(&status), 240);

    client.command("GROUP a.b").await;
    assert_eq!(
        client.command("STAT <abc@foo>").await,
        "223 1 <abc@foo> article retrieved - request text separately"
    );
    let stored = fs::read_to_string(server.spool.group_dir("a.b").unwrap().join("1")).unwrap();
    assert!(stored.lines().any(|l| l == "Message-ID: <abc@foo>"));
}

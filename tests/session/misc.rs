//! DATE, HELP, MODE, QUIT and command errors

use super::common::{TestServer, code};

#[tokio::test]
async fn test_date() {
    let server = TestServer::new();
    let mut client = server.connect().await;
    let status = client.command("DATE").await;
    let (code_text, stamp) = status.split_once(' ').unwrap();
    assert_eq!(code_text, "111");
    assert_eq!(stamp.len(), 14);
    assert!(stamp.bytes().all(|b| b.is_ascii_digit()));
}

#[tokio::test]
async fn test_help_and_mode() {
    let server = TestServer::new();
    let mut client = server.connect().await;

    assert_eq!(client.command("HELP").await, "100 help text follows");
    assert!(client.data().await.iter().any(|l| l.starts_with("XOVER")));

    assert_eq!(
        client.command("MODE READER").await,
        "200 newsd news server ready - posting ok"
    );
    assert_eq!(code(&client.command("MODE STREAM").await), 503);
    assert_eq!(code(&client.command("MODE SIDEWAYS").await), 501);
}

#[tokio::test]
async fn test_unknown_and_unsupported() {
    let server = TestServer::new();
    let mut client = server.connect().await;

    assert_eq!(client.command("FROBNICATE").await, "500 Command not understood");
    assert_eq!(
        client.command("IHAVE <a@b>").await,
        "503 'IHAVE' not supported on this server"
    );
    assert_eq!(code(&client.command("NEWNEWS * 20240101 000000").await), 503);
    assert_eq!(code(&client.command("TAKETHIS <a@b>").await), 503);
}

#[tokio::test]
async fn test_bare_lf_and_blank_lines() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    client.send("\r\n\nGROUP a.b\n").await;
    assert_eq!(client.line().await, "211 0 0 0 a.b group selected");
}

#[tokio::test]
async fn test_post_command_split_across_writes() {
    let server = TestServer::new();
    server.group("a.b");
    let mut client = server.connect().await;

    client.send("POST\r").await;
    assert_eq!(code(&client.line().await), 340);
    client
        .send("\nFrom: a@b\r\nNewsgroups: a.b\r\nSubject: split\r\n\r\nbody\r\n.\r\n")
        .await;
    assert_eq!(client.line().await, "240 Article posted successfully.");

    client.command("GROUP a.b").await;
    assert!(client.command("HEAD 1").await.starts_with("221 1 "));
    let head = client.data().await;
    assert_eq!(head[0], "Subject: split");
}

#[tokio::test]
async fn test_quit() {
    let server = TestServer::new();
    let mut client = server.connect().await;
    assert_eq!(client.command("QUIT").await, "205 goodbye.");
}

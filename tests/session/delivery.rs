//! cc-posting, modulus spool layout and the idle timer

use std::fs;
use std::time::Duration;

use newsd::GroupConfig;

use super::common::{TestServer, code};

#[tokio::test]
async fn test_post_is_mailed_to_cc_addresses() {
    let outbox = tempfile::TempDir::new().unwrap();
    let mail = outbox.path().join("mail.out");
    let sendmail = format!("cat > '{}'", mail.display());
    let server = TestServer::with_config(|config| config.sendmail = sendmail);
    server.group_with(
        "a.b",
        GroupConfig {
            cc_post: vec!["one@x".into(), "two@x".into()],
            creator: "owner@x".into(),
            void_email: "void@x".into(),
            ..GroupConfig::default()
        },
    );

    let mut client = server.connect().await;
    let status = client
        .post("From: a@b\nNewsgroups: a.b\nSubject: cc me\nX-Private: yes\n\nbody\n")
        .await;
    assert_eq!(code(&status), 240);
    // the mail goes out before the next command is read
    client.command("DATE").await;

    let sent = fs::read_to_string(&mail).unwrap();
    let (head, body) = sent.split_once("\n\n").unwrap();
    let head: Vec<&str> = head.lines().collect();
    assert_eq!(&head[..3], ["To: void@x", "Bcc: one@x", "Bcc: two@x"]);
    assert!(head.contains(&"Subject: cc me"));
    assert!(head.contains(&"Errors-To: owner@x"));
    assert!(!head.iter().any(|l| l.starts_with("X-Private")));
    assert_eq!(body, "body\n");
}

#[tokio::test]
async fn test_modulus_layout_round_trip() {
    let server = TestServer::with_config(|config| config.msg_mod_dirs = true);
    server.group("a.b");
    let mut client = server.connect().await;

    let status = client.post("From: a@b\nNewsgroups: a.b\nSubject: mod\n\nbody\n").await;
    assert_eq!(code(&status), 240);
    let dir = server.spool.group_dir("a.b").unwrap();
    assert!(dir.join("0").join("1").is_file());

    client.command("GROUP a.b").await;
    assert!(client.command("BODY 1").await.starts_with("222 1 "));
    assert_eq!(client.data().await, vec!["body"]);
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_is_dropped() {
    let server = TestServer::with_config(|config| config.timeout_secs = 30);
    let mut client = server.connect().await;

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(client.remaining().await.is_empty());
}

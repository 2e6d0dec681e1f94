//! AUTHINFO and the authorization gate

use newsd::{AuthConfig, AuthProtect};

use super::common::{TestServer, code};

fn protected(protect: AuthProtect) -> TestServer {
    let server = TestServer::with_config(|config| {
        config.auth = AuthConfig {
            user: Some("fred".into()),
            pass: Some("secret".into()),
            protect,
            sleep_secs: 0,
        };
    });
    server.group("a.b");
    server
}

#[tokio::test]
async fn test_no_auth_configured() {
    let server = TestServer::new();
    let mut client = server.connect().await;
    assert_eq!(client.command("AUTHINFO USER fred").await, "281 No authentication needed");
    assert_eq!(client.command("AUTHINFO SIMPLE").await, "281 No authentication needed");
}

#[tokio::test]
async fn test_user_pass_login() {
    let server = protected(AuthProtect::All);
    let mut client = server.connect().await;

    assert_eq!(client.command("GROUP a.b").await, "480 Authentication required");
    assert_eq!(client.command("AUTHINFO PASS secret").await, "482 User must be specified first");

    assert_eq!(client.command("AUTHINFO USER fred").await, "381 Now supply your password");
    assert_eq!(client.command("AUTHINFO PASS wrong").await, "481 Authentication failed");
    // a failed attempt starts over
    assert_eq!(code(&client.command("AUTHINFO PASS secret").await), 482);

    client.command("AUTHINFO USER fred").await;
    assert_eq!(client.command("AUTHINFO PASS secret").await, "281 Authenticated OK");
    assert_eq!(code(&client.command("GROUP a.b").await), 211);
}

#[tokio::test]
async fn test_authinfo_simple() {
    let server = protected(AuthProtect::All);
    let mut client = server.connect().await;

    assert_eq!(
        client.command("AUTHINFO SIMPLE").await,
        "350 Go ahead with username and password"
    );
    assert_eq!(client.command("fred nope").await, "452 Authorization rejected");

    client.command("AUTHINFO SIMPLE").await;
    assert_eq!(client.command("fred secret").await, "250 Authenticated OK");
    assert_eq!(code(&client.command("GROUP a.b").await), 211);
}

#[tokio::test]
async fn test_protect_post_only() {
    let server = protected(AuthProtect::Post);
    let mut client = server.connect().await;

    assert_eq!(code(&client.command("GROUP a.b").await), 211);
    assert_eq!(code(&client.command("XOVER").await), 224);
    client.data().await;
    assert_eq!(client.command("POST").await, "480 Authentication required");
}

#[tokio::test]
async fn test_protect_read_only() {
    let server = protected(AuthProtect::Read);
    let mut client = server.connect().await;

    assert_eq!(code(&client.command("LIST").await), 480);
    assert_eq!(code(&client.command("DATE").await), 480);
    assert_eq!(code(&client.command("POST").await), 340);
}

#[tokio::test]
async fn test_bad_authinfo_arguments() {
    let server = protected(AuthProtect::All);
    let mut client = server.connect().await;
    assert_eq!(client.command("AUTHINFO USER").await, "501 Bad or unknown argument");
    assert_eq!(client.command("AUTHINFO BOGUS x").await, "501 Bad or unknown argument");
    assert_eq!(code(&client.command("AUTHINFO GENERIC x").await), 503);
}

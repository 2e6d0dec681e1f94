use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use newsd::logging::init_logging;
use newsd::{GroupConfig, NewsServer, ServerConfig, Spool, mail_gateway};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    ///
    /// Can be overridden with NEWSD_CONFIG environment variable
    #[arg(short, long, default_value = "/etc/newsd.toml", env = "NEWSD_CONFIG")]
    config: PathBuf,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the news server (default)
    Serve,
    /// Post a mail read from stdin to a group
    Mailgateway {
        /// Target group
        group: String,
    },
    /// Create a new group in the spool
    Newgroup(NewGroupArgs),
}

#[derive(Args, Debug)]
struct NewGroupArgs {
    /// Group name, e.g. `rush.general`
    name: String,

    /// One-line description shown by LIST NEWSGROUPS
    #[arg(long, default_value = "-")]
    description: String,

    /// Creator address, used as Errors-To for cc-posts
    #[arg(long, default_value = "-")]
    creator: String,

    /// Allow posting
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    postok: bool,

    /// Maximum lines per posting (0 = unlimited)
    #[arg(long, default_value_t = 1000)]
    postlimit: u32,

    /// Mail every posting to these addresses
    #[arg(long, value_delimiter = ',')]
    ccpost: Vec<String>,

    /// Reply-To for cc-posted mail
    #[arg(long)]
    replyto: Option<String>,

    /// To address for cc-posted mail
    #[arg(long, default_value = "root")]
    voidemail: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        ServerConfig::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        ServerConfig::default()
    };

    let level = if cli.debug { "debug" } else { config.log_level.as_str() };
    let _guard = init_logging(level, config.error_log.as_deref());
    if !cli.config.exists() {
        info!("{} not found, using defaults", cli.config.display());
    }

    match cli.command.unwrap_or(Cmd::Serve) {
        Cmd::Serve => serve(config),
        Cmd::Mailgateway { group } => {
            let posted = mail_gateway(&config, &group, std::io::stdin().lock())?;
            info!("gatewayed {} to {}/{}", posted.message_id, group, posted.number);
            Ok(())
        }
        Cmd::Newgroup(args) => newgroup(&config, args),
    }
}

fn serve(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let server = NewsServer::bind(config).context("starting listener")?;
        server.run_until(shutdown_signal()).await?;
        Ok(())
    })
}

fn newgroup(config: &ServerConfig, args: NewGroupArgs) -> Result<()> {
    let spool = Spool::from_config(config);
    let group_config = GroupConfig {
        description: args.description,
        creator: args.creator,
        post_ok: args.postok,
        post_limit: args.postlimit,
        cc_post: args.ccpost,
        reply_to: args.replyto,
        void_email: args.voidemail,
    };
    let group = spool
        .create_group(&args.name, &group_config)
        .with_context(|| format!("creating group {}", args.name))?;
    println!("created {} in {}", group.name, group.dir.display());
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("interrupt received"),
        Err(e) => {
            error!("cannot listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

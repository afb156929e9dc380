mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pili_client::{
    Client, ClientError, Hub, Meeting, RoomAccessPolicy, SaveasOptions, SnapshotOptions,
};
use pili_core::{play_url, rtmp_publish_url, Mac, PlayKind};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "pili")]
#[command(about = "Manage Pili live streams and RTC rooms", long_about = None)]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, short = 'c', env = "PILI_CONFIG")]
    config: Option<String>,

    /// Access key (overrides the config file)
    #[arg(long, env = "PILI_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Secret key (overrides the config file)
    #[arg(long, env = "PILI_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Hub name (overrides the config file)
    #[arg(long, env = "PILI_HUB")]
    hub: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "PILI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: pretty or json
    #[arg(long, env = "PILI_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a stream's state
    Info { key: String },
    /// Create a stream (reuses it if it already exists)
    Create { key: String },
    /// List streams in the hub
    List {
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, default_value_t = 0)]
        limit: u32,
        #[arg(long, default_value = "")]
        marker: String,
    },
    /// List streams that are live right now
    ListLive {
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, default_value_t = 0)]
        limit: u32,
        #[arg(long, default_value = "")]
        marker: String,
    },
    /// Live status of several streams
    BatchLive {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Replace a stream's transcoding profiles (none clears them)
    Converts { key: String, profiles: Vec<String> },
    /// Disable a stream, permanently or until a unix time
    Disable {
        key: String,
        #[arg(long)]
        till: Option<i64>,
    },
    /// Re-enable a stream
    Enable { key: String },
    /// Status of a stream's live session
    LiveStatus { key: String },
    /// Publishing history of a stream
    History {
        key: String,
        #[arg(long, default_value_t = 0)]
        start: i64,
        #[arg(long, default_value_t = 0)]
        end: i64,
    },
    /// Save a stream's recording as a file
    Saveas {
        key: String,
        #[arg(long, default_value = "")]
        fname: String,
        #[arg(long, default_value_t = 0)]
        start: i64,
        #[arg(long, default_value_t = 0)]
        end: i64,
        #[arg(long, default_value = "")]
        format: String,
        #[arg(long, default_value = "")]
        pipeline: String,
        #[arg(long, default_value = "")]
        notify: String,
        #[arg(long, default_value_t = 0)]
        expire_days: i64,
    },
    /// Save a still image of a stream
    Snapshot {
        key: String,
        #[arg(long, default_value = "")]
        fname: String,
        #[arg(long, default_value_t = 0)]
        time: i64,
        #[arg(long, default_value = "")]
        format: String,
    },
    /// Print a signed RTMP publish URL
    PublishUrl {
        key: String,
        #[arg(long)]
        domain: String,
        /// Seconds the URL stays valid
        #[arg(long, default_value_t = 3600)]
        ttl: i64,
    },
    /// Print a play URL (rtmp, hls, hdl or snapshot)
    PlayUrl {
        key: String,
        #[arg(long)]
        domain: String,
        #[arg(long, default_value = "rtmp")]
        kind: PlayKind,
    },
    /// Sign a room access token
    RoomToken {
        #[arg(long)]
        room: String,
        #[arg(long)]
        user: String,
        /// admin or user
        #[arg(long, default_value = "user")]
        perm: String,
        #[arg(long, default_value = "2.0")]
        version: String,
        /// Seconds the token stays valid
        #[arg(long, default_value_t = 3600)]
        ttl: i64,
    },
    /// Create an RTC room
    RoomCreate {
        #[arg(long)]
        owner: String,
        /// Empty lets the server pick a name
        #[arg(long, default_value = "")]
        room: String,
        #[arg(long, default_value_t = 0)]
        user_max: i64,
    },
    /// Show an RTC room
    RoomStatus { room: String },
    /// Delete an RTC room
    RoomDelete { room: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = CliConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = args.log_level.clone() {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format.clone() {
        config.logging.format = format;
    }
    logging::init_logging(&config.logging)?;

    if let Some(access_key) = args.access_key.clone() {
        config.access_key = access_key;
    }
    if let Some(secret_key) = args.secret_key.clone() {
        config.secret_key = secret_key;
    }
    if let Some(hub) = args.hub.clone() {
        config.hub = hub;
    }
    debug!(api = %config.client.api_base(), hub = %config.hub, "configuration loaded");

    let mac = Mac::new(config.access_key.as_str(), config.secret_key.as_bytes())
        .context("missing or invalid credentials (set PILI_ACCESS_KEY and PILI_SECRET_KEY)")?;
    let client = Client::new(mac, config.client.clone())?;

    run(&client, &config, args.command).await
}

fn hub(client: &Client, config: &CliConfig) -> Result<Hub> {
    if config.hub.is_empty() {
        bail!("no hub configured (use --hub or PILI_HUB)");
    }
    Ok(client.hub(config.hub.as_str()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn not_found(err: ClientError, what: &str) -> anyhow::Error {
    if err.is_not_exists() {
        anyhow::anyhow!("{what} not found")
    } else {
        err.into()
    }
}

async fn run(client: &Client, config: &CliConfig, command: Command) -> Result<()> {
    match command {
        Command::Info { key } => {
            let info = hub(client, config)?
                .stream(key.as_str())
                .info()
                .await
                .map_err(|e| not_found(e, &format!("stream {key}")))?;
            println!("{info}");
        }
        Command::Create { key } => {
            let hub = hub(client, config)?;
            match hub.create(&key).await {
                Ok(stream) => info!(hub = %stream.hub(), key = %stream.key(), "stream created"),
                Err(e) if e.is_exists() => warn!(key = %key, "stream already exists"),
                Err(e) => return Err(e.into()),
            }
            println!("{}", hub.stream(key.as_str()).info().await?);
        }
        Command::List {
            prefix,
            limit,
            marker,
        } => {
            let list = hub(client, config)?.list(&prefix, limit, &marker).await?;
            print_stream_list(&list.keys, &list.marker);
        }
        Command::ListLive {
            prefix,
            limit,
            marker,
        } => {
            let list = hub(client, config)?.list_live(&prefix, limit, &marker).await?;
            print_stream_list(&list.keys, &list.marker);
        }
        Command::BatchLive { keys } => {
            let items = hub(client, config)?.batch_live_status(&keys).await?;
            print_json(&items)?;
        }
        Command::Converts { key, profiles } => {
            hub(client, config)?
                .stream(key.as_str())
                .update_converts(Some(profiles.as_slice()))
                .await
                .map_err(|e| not_found(e, &format!("stream {key}")))?;
            println!("converts of {key} set to {profiles:?}");
        }
        Command::Disable { key, till } => {
            let stream = hub(client, config)?.stream(key.as_str());
            let result = match till {
                Some(till) => stream.disable_till(till).await,
                None => stream.disable().await,
            };
            result.map_err(|e| not_found(e, &format!("stream {key}")))?;
            println!("{}", stream.info().await?);
        }
        Command::Enable { key } => {
            let stream = hub(client, config)?.stream(key.as_str());
            stream
                .enable()
                .await
                .map_err(|e| not_found(e, &format!("stream {key}")))?;
            println!("{}", stream.info().await?);
        }
        Command::LiveStatus { key } => {
            match hub(client, config)?.stream(key.as_str()).live_status().await {
                Ok(status) => print_json(&status)?,
                Err(e) if e.kind() == Some(pili_core::ErrorKind::NoActiveLiveSession) => {
                    println!("{key} is not live");
                }
                Err(e) => return Err(not_found(e, &format!("stream {key}"))),
            }
        }
        Command::History { key, start, end } => {
            let records = hub(client, config)?
                .stream(key.as_str())
                .history_activity(start, end)
                .await?;
            print_json(&records)?;
        }
        Command::Saveas {
            key,
            fname,
            start,
            end,
            format,
            pipeline,
            notify,
            expire_days,
        } => {
            let opts = SaveasOptions {
                fname,
                start,
                end,
                format,
                pipeline,
                notify,
                expire_days,
            };
            let result = hub(client, config)?
                .stream(key.as_str())
                .saveas(Some(&opts))
                .await?;
            println!("fname: {}", result.fname);
            if !result.persistent_id.is_empty() {
                println!("persistent id: {}", result.persistent_id);
            }
        }
        Command::Snapshot {
            key,
            fname,
            time,
            format,
        } => {
            let opts = SnapshotOptions { fname, time, format };
            let fname = hub(client, config)?
                .stream(key.as_str())
                .snapshot(Some(&opts))
                .await?;
            println!("fname: {fname}");
        }
        Command::PublishUrl { key, domain, ttl } => {
            let hub = hub(client, config)?;
            println!("{}", rtmp_publish_url(&domain, hub.name(), &key, client.mac(), ttl)?);
        }
        Command::PlayUrl { key, domain, kind } => {
            let hub = hub(client, config)?;
            println!("{}", play_url(kind, &domain, hub.name(), &key));
        }
        Command::RoomToken {
            room,
            user,
            perm,
            version,
            ttl,
        } => {
            let policy = RoomAccessPolicy {
                room_name: room,
                user_id: user,
                perm,
                version,
                expire_at: chrono::Utc::now().timestamp() + ttl,
            };
            println!("{}", meeting(client, "").create_token(&policy)?);
        }
        Command::RoomCreate {
            owner,
            room,
            user_max,
        } => {
            let name = meeting(client, &owner).room_create(&room, user_max).await?;
            println!("room created: {name}");
        }
        Command::RoomStatus { room } => {
            let status = meeting(client, "")
                .room_status(&room)
                .await
                .map_err(|e| not_found(e, &format!("room {room}")))?;
            println!(
                "room: {}\nowner: {}\nuser max: {}",
                status.room_name, status.owner_user_id, status.user_max
            );
        }
        Command::RoomDelete { room } => {
            meeting(client, "")
                .room_delete(&room)
                .await
                .map_err(|e| not_found(e, &format!("room {room}")))?;
            println!("room {room} deleted");
        }
    }
    Ok(())
}

fn meeting(client: &Client, owner_id: &str) -> Meeting {
    client.meeting(owner_id)
}

fn print_stream_list(keys: &[String], marker: &str) {
    for key in keys {
        println!("{key}");
    }
    if !marker.is_empty() {
        println!("# next marker: {marker}");
    }
}

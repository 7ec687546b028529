use std::net::SocketAddr;
use std::sync::Arc;

use ecp::{DeviceQuery, EcpClient, EcpKey};
use serde::Serialize;
use storage::config::RemoteConfig;
use storage::env_file::{self, EnvFile};
use storage::icons::IconCache;

const DEFAULT_STANDALONE_ADMIN_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "keypress" => cmd_keypress(&args).await,
        "launch" => cmd_launch(&args).await,
        "active-app" => cmd_active_app(&args).await,
        "apps" => cmd_apps(&args).await,
        "icon" => cmd_icon(&args).await,
        "config" => cmd_config(&args),
        "admin" => cmd_admin(&args).await,
        other => anyhow::bail!("unknown command: {other} (run `cli help`)"),
    }
}

fn print_help() {
    eprintln!(
        r#"roku-remote cli

USAGE:
  cli keypress <ip> <key>
  cli launch <ip> <app_id>
  cli active-app <ip>
  cli apps <ip> [--json]
  cli icon <ip> <app_id>
  cli config show
  cli config set <KEY> <VALUE>
  cli admin [--port <port>]

KEYS:
  Up Down Left Right Select (OK) Home VolumeUp VolumeDown Power

The config file is $ROKU_REMOTE_ENV, else the nearest .env upwards from
the current directory.
"#
    );
}

async fn cmd_keypress(args: &[String]) -> anyhow::Result<()> {
    let ip = arg(args, 2, "ip")?;
    let key: EcpKey = arg(args, 3, "key")?.parse()?;
    EcpClient::new()?.keypress(ip, key).await?;
    println!("sent {key} to {ip}");
    Ok(())
}

async fn cmd_launch(args: &[String]) -> anyhow::Result<()> {
    let ip = arg(args, 2, "ip")?;
    let app_id = arg(args, 3, "app_id")?;
    EcpClient::new()?.launch(ip, app_id).await?;
    println!("launched {app_id} on {ip}");
    Ok(())
}

async fn cmd_active_app(args: &[String]) -> anyhow::Result<()> {
    let ip = arg(args, 2, "ip")?;
    let active = EcpClient::new()?.active_app(ip).await?;
    println!("{}", active.label());
    Ok(())
}

#[derive(Serialize)]
struct AppRow<'a> {
    id: &'a str,
    name: &'a str,
}

async fn cmd_apps(args: &[String]) -> anyhow::Result<()> {
    let ip = arg(args, 2, "ip")?;
    let json = match args.get(3).map(|s| s.as_str()) {
        None => false,
        Some("--json") => true,
        Some(other) => anyhow::bail!("unknown flag for apps: {other}"),
    };

    let apps = EcpClient::new()?.apps(ip).await?;
    if json {
        let rows: Vec<AppRow<'_>> = apps
            .iter()
            .map(|a| AppRow {
                id: &a.id,
                name: &a.name,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if apps.is_empty() {
        println!("(no apps reported)");
    }
    for a in apps {
        println!("{:>8}  {}", a.id, a.name);
    }
    Ok(())
}

async fn cmd_icon(args: &[String]) -> anyhow::Result<()> {
    let ip = arg(args, 2, "ip")?;
    let app_id = arg(args, 3, "app_id")?;
    let config = RemoteConfig::load(&env_file::locate())?;
    let cache = IconCache::new(&config.icon_dir)?;
    let client = EcpClient::new()?;

    match cache.ensure(&client, ip, app_id).await? {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("device did not provide an icon for {app_id}"),
    }
    Ok(())
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let sub = args.get(2).map(|s| s.as_str()).unwrap_or("show");
    let path = env_file::locate();
    match sub {
        "show" => {
            println!("# {}", path.display());
            let config = RemoteConfig::load(&path)?;
            println!("TV01_IP={}", config.tv_ips[0]);
            println!("TV02_IP={}", config.tv_ips[1]);
            for (key, id) in storage::config::APP_ID_KEYS.iter().zip(&config.app_ids) {
                println!("{key}={id}");
            }
            println!("ADMIN_PASSWORD={}", config.admin_password);
            println!("ICON_DIR={}", config.icon_dir.display());
            println!("ADMIN_PORT={}", config.admin_port);
            println!("FULLSCREEN={}", u8::from(config.fullscreen));
            Ok(())
        }
        "set" => {
            let key = arg(args, 3, "KEY")?;
            let value = arg(args, 4, "VALUE")?;
            let mut env = EnvFile::load(&path)?;
            env.set(key, value);
            env.save(&path)?;
            println!("{key}={value} -> {}", path.display());
            Ok(())
        }
        other => anyhow::bail!("unknown config subcommand: {other} (run `cli help`)"),
    }
}

async fn cmd_admin(args: &[String]) -> anyhow::Result<()> {
    let mut port = DEFAULT_STANDALONE_ADMIN_PORT;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("--port requires a value"))?;
                port = v.parse()?;
                i += 2;
            }
            other => anyhow::bail!("unknown flag for admin: {other}"),
        }
    }

    let device: Arc<dyn DeviceQuery> = Arc::new(EcpClient::new()?);
    let state = Arc::new(admin_web::AdminState::new(env_file::locate(), device));
    admin_web::serve(SocketAddr::from(([0, 0, 0, 0], port)), state).await
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(idx)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing {name} (run `cli help`)"))
}

use clap::{ArgAction, Parser, Subcommand};
use cloudflare_dns_manager::changes::{stage_change, ChangeOutcome, RecordChange};
use cloudflare_dns_manager::{Client, CloudflareApi, Config, Manager, Result};
use prettytable::{format, row, Table};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "cf-dns")]
#[command(version)]
#[command(about = "Inspect and batch-edit Cloudflare DNS zones", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, env = "CONFIG_PATH")]
    config_file: Option<PathBuf>,
    #[arg(long, env = "CLOUDFLARE_TOKEN")]
    cloudflare_token: Option<String>,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Stores the token used to authenticate against the Cloudflare API
    Login { cloudflare_token: String },
    /// Lists all zones of the account
    Zones,
    /// Lists the DNS records of a zone
    Records { zone: String },
    /// Creates or updates a single DNS record
    Set {
        zone: String,
        record_type: String,
        name: String,
        content: String,
        #[arg(long)]
        ttl: Option<u32>,
        #[arg(long, conflicts_with = "no_proxied")]
        proxied: bool,
        #[arg(long)]
        no_proxied: bool,
    },
    /// Creates or updates every record listed in a JSON file with a single flush
    Apply { file: PathBuf },
    /// Purges the edge cache of a zone
    Purge { zone: String },
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::new(args.config_file, args.cloudflare_token)?;

    if let Commands::Login { cloudflare_token } = &args.command {
        return login(&mut config, cloudflare_token);
    }

    let api = CloudflareApi::with_api_url(config.read_cloudflare_token()?, config.read_api_url());
    let mut manager = Manager::new(&api);

    match args.command {
        Commands::Login { .. } => Ok(()),
        Commands::Zones => list_zones(&mut manager),
        Commands::Records { zone } => list_records(&mut manager, &zone),
        Commands::Set {
            zone,
            record_type,
            name,
            content,
            ttl,
            proxied,
            no_proxied,
        } => {
            let change = RecordChange {
                zone,
                record_type,
                name,
                content,
                ttl,
                proxied: match (proxied, no_proxied) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let outcome = stage_change(&mut manager, &change)?;
            manager.flush()?;
            report(&change, outcome);
            Ok(())
        }
        Commands::Apply { file } => {
            let changes: Vec<RecordChange> = serde_json::from_str(&fs::read_to_string(&file)?)?;
            let mut outcomes = Vec::with_capacity(changes.len());
            for change in changes.iter() {
                outcomes.push(stage_change(&mut manager, change)?);
            }
            manager.flush()?;
            for (change, outcome) in changes.iter().zip(outcomes) {
                report(change, outcome);
            }
            println!("Applied {} record(s) from {:?}", changes.len(), file);
            Ok(())
        }
        Commands::Purge { zone } => {
            let zone = manager.get_zone(&zone)?;
            manager.purge_cache(&zone)?;
            println!("Purged edge cache of {}", zone.name());
            Ok(())
        }
    }
}

fn login(config: &mut Config, cloudflare_token: &str) -> Result<()> {
    let api = CloudflareApi::with_api_url(cloudflare_token.to_string(), config.read_api_url());

    match api.get_zones() {
        Ok(zones) => {
            config.set_config_entry("cloudflare_token", cloudflare_token)?;
            println!("Successfully logged in ({} zones visible)", zones.len());
            Ok(())
        }
        Err(e) => {
            println!("Failed to login");
            Err(e)
        }
    }
}

fn list_zones<C: Client>(manager: &mut Manager<'_, C>) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Zone", "ID", "Status", "Name Servers"]);

    for zone in manager.get_zones()? {
        table.add_row(row![
            zone.name(),
            zone.id(),
            zone.status(),
            zone.name_servers().join(", ")
        ]);
    }
    table.printstd();
    Ok(())
}

fn list_records<C: Client>(manager: &mut Manager<'_, C>, zone_name: &str) -> Result<()> {
    let zone = manager.get_zone(zone_name)?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Type", "Name", "Content", "TTL", "Proxied", "ID"]);

    for record in manager.get_dns_records(&zone)? {
        let record = record.borrow();
        let ttl = match record.ttl {
            Some(1) => "Auto".to_string(),
            Some(ttl) => ttl.to_string(),
            None => "-".to_string(),
        };
        let proxied = match record.proxied {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "-",
        };
        table.add_row(row![
            record.record_type,
            record.name,
            record.content,
            ttl,
            proxied,
            record.id().unwrap_or("Not Created")
        ]);
    }
    table.printstd();
    Ok(())
}

fn report(change: &RecordChange, outcome: ChangeOutcome) {
    let state = match outcome {
        ChangeOutcome::Created => "created",
        ChangeOutcome::Updated => "updated",
        ChangeOutcome::Unchanged => "unchanged",
    };
    println!(
        "{}: {} {} -> {} ({})",
        change.zone, change.record_type, change.name, change.content, state
    );
}

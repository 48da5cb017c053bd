use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wsdef::application::init::init;
use wsdef::application::{migrate_store, ConfigService, DefinitionService, MigrateStoreOptions};
use wsdef::cli::{format_definition, format_definition_list, Cli, Commands};
use wsdef::error::WsError;
use wsdef::infrastructure::{ldml, FileSystemStore};

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Warning: {:#}", e);
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")
}

fn run(cli: Cli) -> Result<(), WsError> {
    match cli.command {
        Commands::Init { path, font } => init(&path, font.as_deref()),
        Commands::New { key } => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            let ws = service.create(&key)?;
            println!("Created {}", ws.verbose_description());
            Ok(())
        }
        Commands::List => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            print!("{}", format_definition_list(&service.list()?));
            Ok(())
        }
        Commands::Show { id } => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            print!("{}", format_definition(&service.show(&id)?));
            Ok(())
        }
        Commands::Set { id, field, value } => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            let ws = service.set(&id, &field, &value)?;
            println!("Set {} = {} on {}", field, value, ws.rfc5646());
            Ok(())
        }
        Commands::Validate { id } => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            let ws = service.validate(&id)?;
            println!("{} is valid", ws.rfc5646());
            Ok(())
        }
        Commands::Sort { id, words } => {
            let service = DefinitionService::new(FileSystemStore::discover()?);
            for word in service.sort(&id, words)? {
                println!("{}", word);
            }
            Ok(())
        }
        Commands::Version { file } => {
            println!("{}", ldml::detect_version_file(&file)?);
            Ok(())
        }
        Commands::Migrate {
            dry_run,
            yes,
            archive_dir,
        } => {
            let store = FileSystemStore::discover()?;
            migrate_store(
                &store,
                MigrateStoreOptions {
                    dry_run,
                    yes,
                    archive_dir,
                },
            )
        }
        Commands::Config { key, value, list } => {
            let service = ConfigService::new(FileSystemStore::discover()?);

            if list {
                let config = service.list()?;
                println!("archive_on_migrate = {}", config.archive_on_migrate);
                println!("default_font = {}", config.default_font);
                println!("created = {}", config.created.to_rfc3339());
                Ok(())
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                    Ok(())
                } else {
                    println!("{}", service.get(&k)?);
                    Ok(())
                }
            } else {
                println!("Usage: wsdef config [--list | <key> [<value>]]");
                println!("Valid keys: archive_on_migrate, default_font, created");
                Ok(())
            }
        }
    }
}

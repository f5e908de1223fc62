use clap::Parser;
use roster::utils::logger;
use roster::{CliConfig, Command, FileStore, RegistryConfig, RosterEngine, RosterError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting roster CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let registry = match RegistryConfig::load(&config.registry) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("❌ Registry loading failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.code());
        }
    };
    let directory = registry.into_directory();

    let store = match FileStore::open(&config.store) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("❌ Store opening failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.code());
        }
    };

    let engine = RosterEngine::new(directory, store);

    let outcome = run_command(&engine, &config.command).await;

    match outcome {
        Ok(payload) => {
            tracing::info!("✅ Operation completed successfully");
            println!("{}", payload);
        }
        Err(e) => {
            tracing::error!("❌ Operation failed: {} (code {})", e, e.code());
            if e.is_retryable() {
                tracing::warn!("The operation is safe to retry");
            }
            eprintln!("Error: {}", e);
            std::process::exit(e.code());
        }
    }

    Ok(())
}

async fn run_command<D, S>(
    engine: &RosterEngine<D, S>,
    command: &Command,
) -> Result<String, RosterError>
where
    D: roster::IdentityDirectory,
    S: roster::EnrollmentStore,
{
    match command {
        Command::Enroll {
            mk,
            group,
            from_date,
            to_date,
            force,
        } => {
            let enrollment = engine
                .enroll(mk, group, from_date.as_deref(), to_date.as_deref(), *force)
                .await?;
            Ok(serde_json::to_string_pretty(&enrollment)?)
        }
        Command::Withdraw {
            mk,
            group,
            from_date,
            to_date,
        } => {
            let removed = engine
                .withdraw(mk, group, from_date.as_deref(), to_date.as_deref())
                .await?;
            Ok(serde_json::json!({ "removed": removed }).to_string())
        }
        Command::List { mk, group } => {
            let enrollments = engine.enrollments(mk, group).await?;
            Ok(serde_json::to_string_pretty(&enrollments)?)
        }
    }
}

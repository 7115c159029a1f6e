use clap::Parser;
use org_directory::app::menu::Menu;
use org_directory::core::ConfigProvider;
use org_directory::utils::error::ErrorSeverity;
use org_directory::utils::{logger, validation::Validate};
use org_directory::{CliConfig, DirectoryConfig, DirectoryError, DirectoryService, SqliteStore};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let outcome = match cli.resolve() {
        Ok(config) => {
            logger::init_cli_logger(config.verbose());
            run(config).await
        }
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            Err(e)
        }
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Directory session failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: DirectoryConfig) -> Result<(), DirectoryError> {
    config.validate()?;
    tracing::debug!("Resolved config: {:?}", config);

    let store = SqliteStore::open(config.database_path(), config.busy_timeout())?;
    tracing::info!("📁 Using database {}", config.database_path());
    let service = DirectoryService::new(store);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut menu = Menu::new(&service, stdin.lock(), stdout.lock());
    menu.run().await
}

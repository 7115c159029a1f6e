use crate::config::toml_config::DirectoryConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "org-directory")]
#[command(about = "Maintain and report on departments, roles and employees")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long)]
    pub database: Option<String>,

    /// Address the HTTP server binds to
    #[arg(long)]
    pub host: Option<String>,

    /// Port the HTTP server listens on
    #[arg(long)]
    pub port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Defaults, then the config file, then `PORT`, then command-line flags.
    pub fn resolve(&self) -> Result<DirectoryConfig> {
        let mut config = match &self.config {
            Some(path) => DirectoryConfig::from_file(path)?,
            None => DirectoryConfig::default(),
        };

        config.apply_port_env()?;

        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.json_logs {
            config.logging.json = Some(true);
        }
        if self.verbose {
            config.logging.verbose = Some(true);
        }

        Ok(config)
    }
}

pub mod db;
pub mod model;
pub mod console;
pub mod services;
pub mod utils;

use dotenv::dotenv;
use std::sync::Arc;
use console::Console;
use services::CredentialManager;
use utils::errors::PassguardError;
use utils::config::{Configuration, self};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

pub const APP_NAME: &str = "Passguard";

///
/// Entry point to start the app.
///
pub async fn lib_main() -> Result<(), PassguardError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to WARN if it's not specified - the console owns stdout.
    config::default_env("RUST_LOG", "WARN");

    init_tracing();

    // Load the configuration into a struct.
    let config = Configuration::from_env()?;

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // Connect to the configured store, ensuring any MongoDB indexes exist before proceeding.
    let store = db::connect(APP_NAME, &config).await?;

    let manager = CredentialManager::new(
        store,
        Arc::new(config.policy()),
        config.hashing_policy()?);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = Console::new(&manager, stdin, std::io::stdout()).run().await;

    tracing::info!("{} exiting", APP_NAME);
    result
}

///
/// Initialise tracing. Logs go to stderr so they don't interleave with the console.
///
pub fn init_tracing() {
    if let Err(err) = Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_ansi(true))
        .try_init() {
            tracing::info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
    }
}

const BANNER: &str = r#"
__________                                                 .___
\______   \_____    ______ ______ ____  __ _______ _______  __| _/
 |     ___/\__  \  /  ___//  ___// ___\|  |  \__  \\_  __ \/ __ |
 |    |     / __ \_\___ \ \___ \/ /_/  >  |  // __ \|  | \/ /_/ |
 |____|    (____  /____  >____  >___  /|____/(____  /__|  \____ |
                \/     \/     \/_____/            \/           \/
"#;

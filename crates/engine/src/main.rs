//! charsheet - character sheet manager CLI.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charsheet_engine::cli::{self, Cli};
use charsheet_engine::infrastructure::settings::AppConfig;
use charsheet_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Logs go to stderr so command output stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charsheet_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        signed_in = config.is_signed_in(),
        "Loaded configuration"
    );

    let app = App::from_config(&config).await?;
    let output = cli::run(&app, cli).await?;
    println!("{output}");
    Ok(())
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        if std::path::Path::new(filename).exists() {
            let _ = dotenvy::from_filename(filename);
        }
    }
}

use std::sync::Arc;

use anyhow::Context;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use clap::Parser;
use marketplace_backend::{
    registrar::StylistRegistrar,
    services::ProfileDirectory,
    session::{Session, SessionHandle},
    types::Environment,
};
use marketplace_storage::{profile::ProfileStorage, stylist::StylistStorage};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Registers stylist profiles in the stylist listing table
#[derive(Debug, Parser)]
#[command(name = "register-stylists")]
#[command(version, about = "Creates missing stylist records from stylist profiles")]
struct Args {
    /// Register only this user instead of every stylist profile
    #[arg(long, env = "REGISTER_USER_ID")]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let environment = Environment::from_env();

    // JSON for staging/production, plain text for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let aws_config = environment.aws_config().await;
    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));

    let profiles = Arc::new(ProfileStorage::new(
        dynamodb_client.clone(),
        environment.profiles_table_name(),
        environment.profiles_role_index_name(),
    ));
    let stylists = Arc::new(StylistStorage::new(
        dynamodb_client,
        environment.stylists_table_name(),
    ));

    let session = SessionHandle::new();
    let registrar = StylistRegistrar::new(session.clone(), profiles.clone(), stylists);

    if let Some(user_id) = args.user {
        let profile = profiles
            .get_profile(&user_id)
            .await
            .with_context(|| format!("Failed to load profile for {user_id}"))?;
        session.login(Session::new(user_id.clone(), profile));

        let outcome = registrar.add_current_user_as_stylist().await?;
        info!("Registered {}: {:?}", user_id, outcome);
        return Ok(());
    }

    let summary = registrar
        .add_all_stylists()
        .await
        .context("Stylist registration aborted")?;

    info!(
        "Registered {} of {} stylists",
        summary.success_count,
        summary.attempted()
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

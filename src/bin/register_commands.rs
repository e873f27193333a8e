// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Register the `/scheduler` slash command with Discord.
//!
//! Needs the same environment as the server plus `DISCORD_BOT_TOKEN`.
//! Registration overwrites the application's global command list.

use anyhow::Context;
use gdg_scheduler::{
    config::Config,
    services::{discord::scheduler_commands, DiscordClient},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("register_commands=info".parse()?)
                .add_directive("info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let bot_token = config
        .discord_bot_token
        .clone()
        .context("DISCORD_BOT_TOKEN must be set to register commands")?;

    let client = DiscordClient::new(&config);
    let registered = client
        .register_commands(&bot_token, &scheduler_commands())
        .await?;

    for command in &registered {
        tracing::info!(id = %command.id, name = %command.name, "Registered command");
    }
    tracing::info!(
        app_id = %config.discord_app_id,
        count = registered.len(),
        "Command registration complete"
    );

    Ok(())
}

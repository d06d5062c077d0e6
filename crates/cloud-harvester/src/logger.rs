// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter directives for `log_level`, with the HTTP stack silenced.
pub fn env_filter(log_level: &str) -> String {
    format!("h2=off,hyper=off,reqwest=off,rustls=off,{log_level}")
}

/// Installs the global subscriber. Fails if `log_level` does not parse or a subscriber is
/// already installed.
pub fn init(log_level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter(log_level))?)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Logging subsystem enabled");
    Ok(())
}

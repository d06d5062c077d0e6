// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::Arc;
use std::{future::Future, pin::Pin};
use tokio::sync::OnceCell;
use tracing::debug;

pub type TokenResolverFn =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = String> + Send>> + Send + Sync>;

/// Source of the Anodot API token sent with every submission.
#[derive(Clone)]
pub enum ApiTokenFactory {
    Static(String),
    /// Resolved on first use, e.g. from a secret store, then reused for the process lifetime.
    Resolved {
        resolver: TokenResolverFn,
        cell: Arc<OnceCell<String>>,
    },
}

impl ApiTokenFactory {
    pub fn new_from_static_token(token: &str) -> Self {
        Self::Static(token.trim().to_string())
    }

    pub fn new_from_resolver(resolver: TokenResolverFn) -> Self {
        Self::Resolved {
            resolver,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// The token, or `None` when it is blank. A resolver runs at most once.
    pub async fn get_token(&self) -> Option<&str> {
        let token = match self {
            Self::Static(token) => token.as_str(),
            Self::Resolved { resolver, cell } => {
                cell.get_or_init(|| async {
                    debug!("Resolving Anodot API token");
                    resolver().await.trim().to_string()
                })
                .await
            }
        };
        (!token.is_empty()).then_some(token)
    }
}

impl Debug for ApiTokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => write!(f, "ApiTokenFactory::Static(<redacted>)"),
            Self::Resolved { cell, .. } => write!(
                f,
                "ApiTokenFactory::Resolved(resolved: {})",
                cell.initialized()
            ),
        }
    }
}

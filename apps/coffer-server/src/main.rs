//! Coffer server
//!
//! Runs the authorization gateway in front of the Coffer API, wired to the
//! JWT authentication plugin, the static enforcer and the static resource
//! directory.
//!
//! # Configuration
//!
//! 1. Environment variables (`COFFER__<SECTION>__<KEY>`, highest priority)
//! 2. YAML file given with `--config`
//! 3. Default values (lowest priority)

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_gateway::{ApiGateway, ErrorBody};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use clap::{Parser, Subcommand};
use jwt_authn_plugin::{JwtAuthNService, PrincipalFields};
use static_authz_plugin::StaticAuthZService;
use static_directory_plugin::StaticDirectoryService;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::{AppConfig, LogFormat, LoggingConfig};

/// Coffer server
#[derive(Parser, Debug)]
#[command(name = "coffer-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a token with the configured signing key (local development)
    IssueToken(IssueTokenArgs),
}

#[derive(clap::Args, Debug)]
struct IssueTokenArgs {
    /// Subject identifier; a random one is generated when omitted
    #[arg(long)]
    subject_id: Option<Uuid>,

    #[arg(long)]
    email: String,

    /// Display name, defaults to the email
    #[arg(long)]
    name: Option<String>,

    /// Identity provider name
    #[arg(long, default_value = "local")]
    idp: String,

    /// Subject identifier at the identity provider, defaults to the email
    #[arg(long)]
    idp_subject: Option<String>,
}

impl IssueTokenArgs {
    fn into_fields(self) -> PrincipalFields {
        PrincipalFields {
            subject_id: self.subject_id.unwrap_or_else(Uuid::new_v4),
            identity_provider: self.idp,
            provider_subject_id: self.idp_subject.unwrap_or_else(|| self.email.clone()),
            display_name: self.name.unwrap_or_else(|| self.email.clone()),
            email: self.email,
        }
    }
}

fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log filter '{}'", cfg.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Build the gateway and its plugins from configuration.
fn build_gateway(cfg: &AppConfig) -> Result<ApiGateway> {
    let authn = JwtAuthNService::from_config(&cfg.authn).context("authn configuration")?;
    let authz = StaticAuthZService::from_config(&cfg.authz);
    let directory =
        StaticDirectoryService::from_config(&cfg.directory).context("directory configuration")?;

    Ok(ApiGateway::new(
        cfg.gateway.clone(),
        Arc::new(authn),
        Arc::new(authz),
        Arc::new(directory),
    ))
}

/// Downstream for authorized requests until the resource handlers are mounted.
fn not_implemented() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorBody {
            success: false,
            error_code: "NOT_IMPLEMENTED",
            error_msg: "Not implemented",
        }),
    )
        .into_response()
}

fn routes() -> Router {
    Router::new().fallback(|| async { not_implemented() })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    if let Some(Command::IssueToken(issue)) = args.command {
        let authn = JwtAuthNService::from_config(&cfg.authn).context("authn configuration")?;
        let token = authn.issue(&issue.into_fields())?;
        println!("{token}");
        return Ok(());
    }

    init_logging(&cfg.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting coffer-server");

    let gateway = build_gateway(&cfg)?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        shutdown.cancel();
    });

    gateway.serve(routes(), cancel).await
}

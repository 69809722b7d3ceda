//! Binary entry-point: read the environment, wire the server, run it.

use std::env;

use actix_web::web;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use tradepost::inbound::http::health::HealthState;
use tradepost::server::{MongoConfig, ServerConfig, create_server};

fn load_token_secret() -> std::io::Result<Vec<u8>> {
    let path =
        env::var("TOKEN_SECRET_FILE").unwrap_or_else(|_| "/var/run/secrets/token_secret".into());
    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            let allow_dev = env::var("TOKEN_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path, error = %err, "using an ephemeral signing secret (dev only)");
                let mut secret = Vec::with_capacity(32);
                secret.extend_from_slice(Uuid::new_v4().as_bytes());
                secret.extend_from_slice(Uuid::new_v4().as_bytes());
                Ok(secret)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read token secret at {path}: {err}"
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let secret = load_token_secret()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(secret, cookie_secure, bind_addr);

    if let Ok(origins) = env::var("CORS_ALLOWED_ORIGINS") {
        config = config.with_allowed_origins(
            origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        );
    }
    if let Ok(client_id) = env::var("GOOGLE_CLIENT_ID") {
        config = config.with_google_client_id(client_id);
    }
    if let Ok(uri) = env::var("MONGODB_URI") {
        let database = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "tradepost".into());
        config = config.with_mongo(MongoConfig { uri, database });
    }
    if let Ok(bucket) = env::var("S3_BUCKET") {
        config = config.with_s3_bucket(bucket);
    }
    if let Ok(key) = env::var("FCM_SERVER_KEY") {
        config = config.with_fcm_server_key(key);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await
}

pub mod booking;
pub mod line;

use crate::DynError;

use url::Url;

use std::net::SocketAddr;
use std::sync::Arc;

pub type State = Arc<Data>;

pub const DEFAULT_API_BASE: &str = "https://api.line.me";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3030";

pub struct Data {
    pub config: Config,
    pub http: reqwest::Client,
}

impl Data {
    pub fn new(config: Config) -> State {
        Arc::new(Self {
            config,
            http: reqwest::Client::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential of the messaging channel.
    pub channel_access_token: Option<String>,
    /// Recipient of every booking notification.
    pub admin_user_id: Option<String>,
    pub api_base: Url,
    pub listen: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, DynError> {
        let channel_access_token = non_empty_var("LINE_CHANNEL_ACCESS_TOKEN");
        if channel_access_token.is_none() {
            log::warn!("LINE_CHANNEL_ACCESS_TOKEN is not set, webhooks will fail");
        }
        let admin_user_id = non_empty_var("LINE_ADMIN_USER_ID");
        if admin_user_id.is_none() {
            log::warn!("LINE_ADMIN_USER_ID is not set, notifications will be skipped");
        }

        let api_base = dotenv::var("LINE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let listen = dotenv::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());

        Ok(Self {
            channel_access_token,
            admin_user_id,
            api_base: Url::parse(&api_base)?,
            listen: listen.parse()?,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    dotenv::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn state_from_env() -> Result<State, DynError> {
    let config = Config::from_env()?;
    log::info!(
        "pushing notifications via {} to {}",
        config.api_base,
        config.admin_user_id.as_deref().unwrap_or("n/a")
    );
    Ok(Data::new(config))
}

//! Runtime configuration for the arena server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Bind address for the HTTP/WS server.
    pub server_addr: String,
    /// Simulation tick period in milliseconds.
    pub tick_ms: u64,
    /// Wall-clock match length before the draw resolver runs (seconds).
    pub match_deadline_secs: u64,
    /// How long a lobby may sit unfilled before it is closed (seconds).
    pub lobby_timeout_secs: u64,
    /// Lobby controller poll period (milliseconds).
    pub lobby_poll_ms: u64,
    /// Per-client outbound queue capacity.
    pub outbound_capacity: usize,
    /// Match action channel capacity.
    pub action_capacity: usize,
    /// Name handed to the map loader at match creation.
    pub map_name: String,
}

impl Settings {
    fn from_env() -> Self {
        fn var_u64(key: &str, default: u64) -> u64 {
            env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        }

        Settings {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            tick_ms: var_u64("TICK_MS", 500),
            match_deadline_secs: var_u64("MATCH_DEADLINE_SECS", 180),
            lobby_timeout_secs: var_u64("LOBBY_TIMEOUT_SECS", 600),
            lobby_poll_ms: var_u64("LOBBY_POLL_MS", 1000),
            outbound_capacity: var_u64("OUTBOUND_CAPACITY", 20) as usize,
            action_capacity: var_u64("ACTION_CAPACITY", 40) as usize,
            map_name: env::var("MAP_NAME").unwrap_or_else(|_| "Basic Map 35x20".into()),
        }
    }

    /// Tick period expressed in seconds; the per-tick cadence increment.
    pub fn tick_seconds(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}

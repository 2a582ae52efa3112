//! Context configuration: the immutable identity and mutable settings of
//! §3's data model.

use std::time::Duration;

/// The immutable identity of a context: set once at construction and never
/// mutated afterward (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keys {
    pub publish_key: String,
    pub subscribe_key: String,
}

impl Keys {
    pub fn new(publish_key: impl Into<String>, subscribe_key: impl Into<String>) -> Self {
        Keys {
            publish_key: publish_key.into(),
            subscribe_key: subscribe_key.into(),
        }
    }
}

/// Proxy configuration. Mechanics of proxy authentication are out of scope
/// (§1); only the settings a context carries are modeled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    pub hostname: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Transport-level TLS preference for a context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsOption {
    #[default]
    Disabled,
    Enabled,
    /// Try TLS first, fall back to plain TCP if the handshake fails (the
    /// `RETRY` path of §4.1's state list).
    FallbackToPlain,
}

/// Mutable, per-context configuration (§3's "Mutable configuration" and
/// "Transport state" excluding the socket itself).
#[derive(Clone, Debug)]
pub struct Config {
    pub keys: Keys,
    pub user_id: String,
    pub auth_key: Option<String>,
    pub origin: String,
    pub port: u16,
    pub blocking_io: bool,
    pub keep_alive: bool,
    pub tls: TlsOption,
    pub proxy: Option<ProxyConfig>,
    pub transaction_timeout: Duration,
    pub connect_timeout: Duration,
    pub keep_alive_idle_timeout: Duration,
}

impl Config {
    /// Per-invariant-4.5 floor: the minimum transaction timer, used to
    /// derive the minimum heartbeat period.
    pub const MIN_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(origin: impl Into<String>) -> Self {
        Config::with_keys(origin, Keys::new(String::new(), String::new()))
    }

    pub fn with_keys(origin: impl Into<String>, keys: Keys) -> Self {
        Config {
            keys,
            user_id: String::new(),
            auth_key: None,
            origin: origin.into(),
            port: 443,
            blocking_io: false,
            keep_alive: true,
            tls: TlsOption::Enabled,
            proxy: None,
            transaction_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            keep_alive_idle_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    pub fn with_tls(mut self, tls: TlsOption) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Clones the subset of configuration a thumper should share with its
    /// paired user context (§4.5, `copy_context_settings`): auth, origin,
    /// keep-alive, and proxy, but not timeouts or TLS preference, which stay
    /// at the thumper's own defaults.
    pub fn clone_for_thumper(&self) -> Config {
        let mut cfg = Config::with_keys(self.origin.clone(), self.keys.clone());
        cfg.user_id = self.user_id.clone();
        cfg.auth_key = self.auth_key.clone();
        cfg.port = self.port;
        cfg.keep_alive = self.keep_alive;
        cfg.proxy = self.proxy.clone();
        cfg
    }
}

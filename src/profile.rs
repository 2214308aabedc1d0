//! Connection profiles: [`Profile`], [`ProfileManager`], and the process-wide
//! registry.
//!
//! A *profile* is a named, independently configurable instance of the
//! underlying runtime: its own client, pool, proxy settings and cookie store.
//! Requests that name no profile share the default one.

use crate::errors::FetchError;
use crate::options::{HttpVersion, ProfileOptions, TransportOptions};
use lazy_static::lazy_static;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Name of the shared default profile. It cannot be closed through this
/// layer; use the runtime's own shutdown.
pub const DEFAULT_PROFILE: &str = "default";

pub struct Profile {
    name: String,
    /// Current client. Replaced wholesale when options are applied; in-flight
    /// requests keep the client they started with.
    client: RwLock<Client>,
    verbose: AtomicBool,
}

impl Profile {
    fn started(name: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| FetchError::ProfileStart {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            client: RwLock::new(client),
            verbose: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn client(&self) -> Client {
        self.client.read().unwrap().clone()
    }

    pub(crate) fn verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Apply transport and profile options by rebuilding the client.
    ///
    /// A no-op when both option sets are empty, so plain requests never churn
    /// the connection pool.
    pub(crate) fn apply(
        &self,
        profile: &ProfileOptions,
        transport: &TransportOptions,
    ) -> Result<(), FetchError> {
        if profile.is_default() && transport.is_default() {
            return Ok(());
        }
        if let Some(v) = profile.verbose {
            self.verbose.store(v, Ordering::Relaxed);
        }
        let client = build_client(profile, transport)?;
        *self.client.write().unwrap() = client;
        Ok(())
    }
}

fn build_client(
    popts: &ProfileOptions,
    topts: &TransportOptions,
) -> Result<Client, FetchError> {
    let mut builder = Client::builder();

    if let Some(proxy_url) = &popts.proxy {
        let mut proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| FetchError::invalid("proxy", e.to_string()))?;
        if let Some((user, pass)) = &topts.proxy_auth {
            proxy = proxy.basic_auth(user, pass);
        }
        builder = builder.proxy(proxy);
    }
    if let Some(n) = popts.max_sessions {
        builder = builder.pool_max_idle_per_host(n);
    }
    if let Some(d) = popts.keep_alive_timeout {
        builder = builder.pool_idle_timeout(d);
    }
    if let Some(enabled) = popts.cookies {
        builder = builder.cookie_store(enabled);
    }
    if let Some(addr) = popts.ip {
        builder = builder.local_address(addr);
    }
    if let Some(d) = topts.connect_timeout {
        builder = builder.connect_timeout(d);
    }
    if topts.autoredirect == Some(false) {
        builder = builder.redirect(reqwest::redirect::Policy::none());
    }
    if topts.tls_verify == Some(false) {
        builder = builder.danger_accept_invalid_certs(true);
    }
    match topts.version {
        // No HTTP/1.0 mode in the runtime; 1.0 requests go out as 1.1.
        Some(HttpVersion::Http10) | Some(HttpVersion::Http11) => {
            builder = builder.http1_only();
        }
        Some(HttpVersion::Http2) => {
            builder = builder.http2_prior_knowledge();
        }
        None => {}
    }

    builder
        .build()
        .map_err(|e| FetchError::invalid("transport", e.to_string()))
}

pub struct ProfileManager {
    profiles: Mutex<HashMap<String, Arc<Profile>>>,
}

impl ProfileManager {
    fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Start the named profile, or return it if it already runs.
    pub fn ensure_started(&self, name: &str) -> Result<Arc<Profile>, FetchError> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(existing) = profiles.get(name) {
            // already started is not an error
            return Ok(existing.clone());
        }
        let profile = Arc::new(Profile::started(name)?);
        profiles.insert(name.to_string(), profile.clone());
        Ok(profile)
    }

    /// The shared default profile, started on first use.
    pub fn default_profile(&self) -> Result<Arc<Profile>, FetchError> {
        self.ensure_started(DEFAULT_PROFILE)
    }

    /// Stop a profile.
    ///
    /// `None` is a no-op. The default profile is rejected. Stopping a profile
    /// that never started is a no-op, matching idempotent start.
    pub fn close(&self, profile: Option<&str>) -> Result<(), FetchError> {
        match profile {
            None => Ok(()),
            Some(DEFAULT_PROFILE) => Err(FetchError::CloseDefaultProfile),
            Some(name) => {
                self.profiles.lock().unwrap().remove(name);
                Ok(())
            }
        }
    }

    /// Names of all running profiles.
    pub fn list(&self) -> Vec<String> {
        self.profiles
            .lock()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }
}

lazy_static! {
    static ref MANAGER: ProfileManager = ProfileManager::new();
}

pub fn manager() -> &'static ProfileManager {
    &MANAGER
}

/// Close a connection profile on the process-wide registry.
pub fn close(profile: Option<&str>) -> Result<(), FetchError> {
    MANAGER.close(profile)
}

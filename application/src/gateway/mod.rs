//! Resilient request gateway.
//!
//! `generate` is the single entry point for one-shot requests and never
//! fails: it walks cache, fallback chain, circuit breakers and the offline
//! responder in order, and the worst case is a placeholder response with the
//! degradation flags set in its metadata.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use conclave_domain::{
    BreakerSettings, BreakerSnapshot, CacheKey, GatewayResponse, ResponderRegistry, Role,
};

use crate::cache::ResponseCache;
use crate::health::HealthTable;
use crate::ports::responder::{GenerationRequest, Responder, ResponderError};
use crate::resilience::{CircuitBreaker, CircuitError};

/// Gateway tunables.
#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    /// Per-call budget applied when the request does not carry its own.
    pub call_timeout: Duration,
    pub breaker: BreakerSettings,
    /// How many fallback events the in-memory log retains.
    pub fallback_log_capacity: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            breaker: BreakerSettings::default(),
            fallback_log_capacity: 256,
        }
    }
}

/// One routed generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub role: Option<Role>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    /// Overrides the gateway's default per-call timeout.
    pub timeout: Option<Duration>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            role: None,
            temperature: crate::ports::responder::DEFAULT_TEMPERATURE,
            max_tokens: crate::ports::responder::DEFAULT_MAX_TOKENS,
            system_prompt: None,
            timeout: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::compute(
            &self.prompt,
            self.role.as_ref(),
            self.temperature,
            self.max_tokens,
            self.system_prompt.as_deref(),
        )
    }

    fn generation(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// A recorded handoff from one responder to the next.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackEvent {
    pub from: String,
    pub to: String,
    pub reason: String,
    pub at: DateTime<Utc>,
}

pub struct Gateway {
    registry: Arc<ResponderRegistry>,
    responders: HashMap<String, Arc<dyn Responder>>,
    breakers: HashMap<String, CircuitBreaker>,
    health: Arc<HealthTable>,
    cache: Option<ResponseCache>,
    settings: GatewaySettings,
    fallback_log: Mutex<VecDeque<FallbackEvent>>,
}

impl Gateway {
    pub fn new(
        registry: Arc<ResponderRegistry>,
        responders: HashMap<String, Arc<dyn Responder>>,
        health: Arc<HealthTable>,
        cache: Option<ResponseCache>,
        settings: GatewaySettings,
    ) -> Self {
        let breakers = registry
            .iter()
            .map(|config| {
                (
                    config.name.clone(),
                    CircuitBreaker::new(config.name.as_str(), settings.breaker),
                )
            })
            .collect();
        Self {
            registry,
            responders,
            breakers,
            health,
            cache,
            settings,
            fallback_log: Mutex::new(VecDeque::new()),
        }
    }

    pub fn registry(&self) -> &ResponderRegistry {
        &self.registry
    }

    pub fn health(&self) -> Arc<HealthTable> {
        Arc::clone(&self.health)
    }

    /// Whether a named responder has a live adapter behind it.
    pub fn has_responder(&self, name: &str) -> bool {
        self.responders.contains_key(name)
    }

    pub fn breaker_snapshot(&self, name: &str) -> Option<BreakerSnapshot> {
        self.breakers.get(name).map(|b| b.snapshot())
    }

    /// Recorded fallback handoffs, oldest first.
    pub fn fallback_events(&self) -> Vec<FallbackEvent> {
        self.lock_log().iter().cloned().collect()
    }

    /// Route one request. Never fails; degraded outcomes are flagged in the
    /// response metadata.
    pub async fn generate(&self, request: GenerateRequest) -> GatewayResponse {
        let started = Instant::now();
        let key = request.cache_key();

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&key)
        {
            debug!("serving response from cache");
            return hit.mark_cached();
        }

        let chain = self.resolve_chain(request.role.as_ref()).await;
        debug!("resolved chain: {:?}", chain);

        let mut last_error: Option<String> = None;
        for (index, name) in chain.iter().enumerate() {
            match self.call_responder(name, &request).await {
                Ok(response) => {
                    if let Some(cache) = &self.cache {
                        cache.insert(key, response.clone());
                    }
                    return response;
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!("responder {} failed: {}", name, reason);
                    let next = match chain.get(index + 1) {
                        Some(next) => Some(next.as_str()),
                        None => self.offline_candidate(&chain),
                    };
                    if let Some(next) = next {
                        self.record_fallback(name, next, &reason);
                    }
                    last_error = Some(reason);
                }
            }
        }

        if let Some(offline_name) = self.offline_candidate(&chain) {
            info!("trying offline responder {}", offline_name);
            match self.call_responder(offline_name, &request).await {
                Ok(response) => return response.mark_offline(),
                Err(e) => {
                    warn!("offline responder {} failed: {}", offline_name, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        let reason = match last_error {
            Some(err) => format!("All responders failed. Last error: {err}"),
            None => "No responder available for this request".to_string(),
        };
        warn!("{}", reason);
        let mut response = GatewayResponse::placeholder(reason)
            .mark_offline()
            .with_latency(started.elapsed().as_millis() as u64);
        if let Some(role) = &request.role {
            response = response.with_role(role);
        }
        response
    }

    /// Call one named responder through its breaker and timeout, bypassing
    /// the cache and the fallback chain. The council addresses specific
    /// participants through this.
    pub async fn call_responder(
        &self,
        name: &str,
        request: &GenerateRequest,
    ) -> Result<GatewayResponse, CircuitError<ResponderError>> {
        let responder = self
            .responders
            .get(name)
            .ok_or_else(|| CircuitError::Inner(ResponderError::NotConfigured(name.to_string())))?;
        let breaker = self
            .breakers
            .get(name)
            .ok_or_else(|| CircuitError::Inner(ResponderError::NotConfigured(name.to_string())))?;

        let timeout = request.timeout.unwrap_or(self.settings.call_timeout);
        let generation = request.generation();
        let started = Instant::now();

        let reply = breaker
            .call(|| async {
                match tokio::time::timeout(timeout, responder.generate(&generation)).await {
                    Ok(result) => result,
                    Err(_) => Err(ResponderError::Timeout),
                }
            })
            .await?;

        let mut response = GatewayResponse::new(name, responder.model_name(), reply.text)
            .with_latency(started.elapsed().as_millis() as u64);
        if let Some(usage) = reply.usage {
            response = response.with_usage(usage);
        }
        if let Some(raw) = reply.raw {
            response = response.with_raw(raw);
        }
        if let Some(role) = &request.role {
            response = response.with_role(role);
        }
        Ok(response)
    }

    /// Order of responders to try: the default responder first, then the
    /// role's chain, deduplicated, with disabled, unhealthy, unconfigured
    /// and unknown names filtered out.
    async fn resolve_chain(&self, role: Option<&Role>) -> Vec<String> {
        let mut candidates: Vec<&str> = Vec::new();
        if let Some(default) = self.registry.default_responder() {
            candidates.push(default);
        }
        if let Some(role) = role
            && let Some(chain) = self.registry.chain_for(role)
        {
            candidates.extend(chain.ordered());
        }

        let mut resolved: Vec<String> = Vec::new();
        for name in candidates {
            if resolved.iter().any(|n| n == name) {
                continue;
            }
            let Some(config) = self.registry.get(name) else {
                warn!("chain references unknown responder {}", name);
                continue;
            };
            if !config.enabled {
                debug!("skipping disabled responder {}", name);
                continue;
            }
            let Some(adapter) = self.responders.get(name) else {
                warn!("no adapter registered for responder {}", name);
                continue;
            };
            if !adapter.is_configured() {
                debug!("skipping unconfigured responder {}", name);
                continue;
            }
            if !self.health.is_usable(name).await {
                debug!("skipping unhealthy responder {}", name);
                continue;
            }
            resolved.push(name.to_string());
        }
        resolved
    }

    /// Last-resort responder, unless it was already tried in the chain.
    fn offline_candidate(&self, tried: &[String]) -> Option<&str> {
        let name = self.registry.offline_responder()?;
        if tried.iter().any(|t| t == name) {
            return None;
        }
        let config = self.registry.get(name)?;
        if !config.enabled || !self.responders.contains_key(name) {
            return None;
        }
        Some(name)
    }

    fn record_fallback(&self, from: &str, to: &str, reason: &str) {
        info!("fallback {} -> {}: {}", from, to, reason);
        let mut log = self.lock_log();
        if log.len() >= self.settings.fallback_log_capacity {
            log.pop_front();
        }
        log.push_back(FallbackEvent {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
            at: Utc::now(),
        });
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, VecDeque<FallbackEvent>> {
        match self.fallback_log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ==================== Tests ====================

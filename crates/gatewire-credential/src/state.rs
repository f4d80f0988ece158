pub type CredentialId = i64;
pub type ProviderId = i64;

/// An in-cache copy of a catalog `Credential` row, plus the counters used by
/// selection. Counters are approximate: they are refreshed wholesale by the
/// cache's periodic reload rather than kept in lockstep with the store.
#[derive(Debug, Clone)]
pub struct CachedCredential {
    pub id: CredentialId,
    pub provider_id: ProviderId,
    pub key_hash: String,
    pub rpm_limit: Option<i64>,
    pub tpm_limit: Option<i64>,
    pub daily_limit: Option<i64>,
    pub requests_count: i64,
    pub tokens_count: i64,
    pub active: bool,
    pub degraded: bool,
    /// `None` once the degradation window has elapsed, even before the next
    /// cache refresh observes the store's self-healed row.
    pub degraded_until: Option<tokio::time::Instant>,
}

impl CachedCredential {
    /// A credential is eligible for selection when it is active, not over
    /// any configured limit, and not within an active degradation window.
    pub fn is_eligible(&self, now: tokio::time::Instant) -> bool {
        if !self.active {
            return false;
        }
        if let Some(until) = self.degraded_until
            && until > now
        {
            return false;
        }
        if let Some(limit) = self.rpm_limit
            && self.requests_count >= limit
        {
            return false;
        }
        if let Some(limit) = self.tpm_limit
            && self.tokens_count >= limit
        {
            return false;
        }
        if let Some(limit) = self.daily_limit
            && self.requests_count >= limit
        {
            return false;
        }
        true
    }

    /// Composite selection score: lower is preferred. Ties broken by list
    /// order at the call site.
    pub fn score(&self) -> f64 {
        self.requests_count as f64 + (self.tokens_count as f64 / 1000.0)
    }
}

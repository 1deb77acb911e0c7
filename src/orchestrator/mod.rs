//! Advisory orchestrator - the engine's sole entry point
//!
//! Sequences profile resolution -> cache lookup -> allocation rules ->
//! advisory gateway -> cache write, and assembles the composite result.
//! Collaborators that mutate customer data are responsible for calling
//! `invalidate` on the relevant prefixes; the orchestrator does not
//! enforce that contract itself.

use crate::cache::{self, ResponseCache, ADVICE_NAMESPACE};
use crate::config::ADVICE_TTL_SECS;
use crate::error::AdvisoryError;
use crate::gateway::AdviceProvider;
use crate::models::{AdviceBundle, UserSelections};
use crate::{profile, rules, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Orchestrates a single advisory request end to end.
pub struct AdvisoryOrchestrator {
    provider: Box<dyn AdviceProvider>,
    cache: ResponseCache,
    advice_ttl_seconds: u64,
}

impl AdvisoryOrchestrator {
    pub fn new(provider: Box<dyn AdviceProvider>, cache: ResponseCache) -> Self {
        Self {
            provider,
            cache,
            advice_ttl_seconds: ADVICE_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.advice_ttl_seconds = ttl_seconds;
        self
    }

    /// Shared cache handle, for collaborators that need to invalidate
    /// after a write (`advice:{customer_id}*`, `dashboard:*`).
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Produce the composite advice bundle for one customer.
    ///
    /// Only `Validation` and `ProfileIncomplete` (and
    /// `UpstreamUnavailable` when fallback synthesis is disabled) cross
    /// this boundary as errors; every other provider failure arrives as
    /// a clearly-flagged fallback response.
    pub async fn get_advice(
        &self,
        customer_id: &str,
        raw_record: &Value,
        selections: &UserSelections,
    ) -> Result<AdviceBundle> {
        if customer_id.trim().is_empty() {
            return Err(AdvisoryError::Validation(
                "customer id must not be blank".to_string(),
            ));
        }

        let customer_profile = profile::resolve(raw_record)?;

        let fingerprint = cache::fingerprint(&customer_profile, selections);
        let key = cache::cache_key(ADVICE_NAMESPACE, customer_id, &fingerprint);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_value::<AdviceBundle>(cached) {
                Ok(bundle) => {
                    info!(customer_id, %fingerprint, "Serving advice from cache");
                    return Ok(bundle);
                }
                Err(e) => {
                    // Malformed cached payload: treat as a miss and evict.
                    let corruption = AdvisoryError::CacheCorruption(e.to_string());
                    warn!(customer_id, key = %key, error = %corruption, "Evicting corrupt cache entry");
                    self.cache.evict(&key).await;
                }
            }
        }

        debug!(customer_id, "Cache miss, computing advice");

        // Always local, always succeeds.
        let allocation = rules::evaluate(&customer_profile);

        let advisory = self
            .provider
            .request_advice(&customer_profile, &allocation, selections)
            .await?;

        let bundle = AdviceBundle {
            customer_profile,
            allocation,
            advisory,
        };

        self.cache
            .set(&key, serde_json::to_value(&bundle)?, self.advice_ttl_seconds)
            .await;

        info!(
            customer_id,
            risk_score = bundle.allocation.risk_score,
            is_fallback = bundle.advisory.is_fallback,
            "Advice computed"
        );

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdvisoryProfile, AdvisoryResponse, AllocationResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider stub that counts invocations
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AdviceProvider for CountingProvider {
        async fn request_advice(
            &self,
            _profile: &AdvisoryProfile,
            _allocation: &AllocationResult,
            _selections: &UserSelections,
        ) -> Result<AdvisoryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AdvisoryResponse {
                narrative: "Stay the course.".to_string(),
                model_id: "test-model".to_string(),
                is_fallback: false,
                generated_at: Utc::now(),
            })
        }
    }

    fn orchestrator_with_counter() -> (AdvisoryOrchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Box::new(CountingProvider {
            calls: calls.clone(),
        });
        (
            AdvisoryOrchestrator::new(provider, ResponseCache::new()),
            calls,
        )
    }

    fn raw_record() -> Value {
        json!({
            "id": "CUST_1",
            "name": "Ona Li",
            "age": 36,
            "total_assets": 420000,
            "risk_tolerance": "balanced",
            "annual_income": 110000
        })
    }

    #[tokio::test]
    async fn test_miss_then_hit_calls_provider_once() {
        let (orchestrator, calls) = orchestrator_with_counter();
        let selections = UserSelections::default();

        let first = orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();
        let second = orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_selections_miss_the_cache() {
        let (orchestrator, calls) = orchestrator_with_counter();

        orchestrator
            .get_advice("CUST_1", &raw_record(), &UserSelections::default())
            .await
            .unwrap();

        let other = UserSelections {
            focus_areas: vec!["retirement income".to_string()],
            ..UserSelections::default()
        };
        orchestrator
            .get_advice("CUST_1", &raw_record(), &other)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidation_forces_recompute() {
        let (orchestrator, calls) = orchestrator_with_counter();
        let selections = UserSelections::default();

        orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();
        let removed = orchestrator.cache().invalidate("advice:CUST_1*").await;
        assert_eq!(removed, 1);

        orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_customer_id_is_a_validation_error() {
        let (orchestrator, calls) = orchestrator_with_counter();
        let result = orchestrator
            .get_advice("  ", &raw_record(), &UserSelections::default())
            .await;

        assert!(matches!(result, Err(AdvisoryError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_incomplete_profile_propagates() {
        let (orchestrator, _) = orchestrator_with_counter();
        let result = orchestrator
            .get_advice("CUST_1", &json!({"age": 40}), &UserSelections::default())
            .await;

        assert!(matches!(result, Err(AdvisoryError::ProfileIncomplete(_))));
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_treated_as_miss() {
        let (orchestrator, calls) = orchestrator_with_counter();
        let selections = UserSelections::default();

        // Plant a malformed payload under the exact key the
        // orchestrator will compute.
        let profile = crate::profile::resolve(&raw_record()).unwrap();
        let fingerprint = cache::fingerprint(&profile, &selections);
        let key = cache::cache_key(ADVICE_NAMESPACE, "CUST_1", &fingerprint);
        orchestrator
            .cache()
            .set(&key, json!({"not": "a bundle"}), 300)
            .await;

        let bundle = orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bundle.customer_profile.id, "CUST_1");

        // The corrupt entry was replaced with a good one.
        orchestrator
            .get_advice("CUST_1", &raw_record(), &selections)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bundle_carries_deterministic_baseline() {
        let (orchestrator, _) = orchestrator_with_counter();
        let bundle = orchestrator
            .get_advice("CUST_1", &raw_record(), &UserSelections::default())
            .await
            .unwrap();

        let total: u32 = bundle.allocation.allocation.values().map(|v| *v as u32).sum();
        assert_eq!(total, 100);
        assert!(!bundle.advisory.narrative.is_empty());
    }
}

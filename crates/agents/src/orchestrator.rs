//! Pipeline orchestrator: one customer in, one [`PipelineOutcome`] out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use campaign_cdp::{compute_social_score, CustomerDirectory, SocialSignalProvider};
use campaign_core::error::CampaignResult;
use campaign_core::types::{
    CampaignPayload, CustomerRecord, Enhancement, Segment, SegmentationResult, SocialProfile,
};
use campaign_personalization::{CampaignCatalog, CampaignPersonalizer, CampaignSelector};
use campaign_segmentation::SegmentClassifier;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::enhancer::MessageEnhancer;
use crate::log::ExecutionLog;
use crate::outcome::{
    CustomerSummary, FailureKind, PipelineFailure, PipelineOutcome, PipelineResult, RunMetadata,
    SegmentationView,
};
use crate::state_machine::{PipelineState, PipelineStateMachine};

const DEFAULT_ENHANCER_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-run state. Nothing here is shared between runs.
struct PipelineRun {
    id: Uuid,
    machine: PipelineStateMachine,
    log: ExecutionLog,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            machine: PipelineStateMachine::new(),
            log: ExecutionLog::new(),
        }
    }

    fn advance(&mut self, to: PipelineState) -> CampaignResult<()> {
        self.machine.transition(to)
    }

    fn record(&mut self, message: impl Into<String>) {
        self.log.record(self.machine.state(), message, None);
    }

    fn record_with(&mut self, message: impl Into<String>, data: serde_json::Value) {
        self.log.record(self.machine.state(), message, Some(data));
    }
}

/// Everything the CAMPAIGN stage needs besides the run itself.
struct CampaignInputs<'a> {
    customer: &'a CustomerRecord,
    profile: &'a SocialProfile,
    segment: Segment,
}

pub struct PipelineOrchestrator {
    directory: Arc<CustomerDirectory>,
    social: Arc<dyn SocialSignalProvider>,
    classifier: SegmentClassifier,
    selector: CampaignSelector,
    personalizer: CampaignPersonalizer,
    enhancer: Option<Arc<dyn MessageEnhancer>>,
    enhancer_timeout: Duration,
}

impl PipelineOrchestrator {
    /// Orchestrator over the standard catalog, without an enhancer.
    pub fn new(directory: Arc<CustomerDirectory>, social: Arc<dyn SocialSignalProvider>) -> Self {
        let catalog = Arc::new(CampaignCatalog::standard());
        Self {
            directory,
            social,
            classifier: SegmentClassifier::new(),
            selector: CampaignSelector::new(catalog.clone()),
            personalizer: CampaignPersonalizer::new(catalog),
            enhancer: None,
            enhancer_timeout: DEFAULT_ENHANCER_TIMEOUT,
        }
    }

    /// Each enhancer call is cut off after `timeout`; the template text is
    /// used when it elapses.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn MessageEnhancer>, timeout: Duration) -> Self {
        self.enhancer = Some(enhancer);
        self.enhancer_timeout = timeout;
        self
    }

    /// Runs the full pipeline for one customer. Never panics on bad input;
    /// failures come back as [`PipelineOutcome::Failed`] with the partial log.
    pub async fn run(&self, customer_name: &str) -> PipelineOutcome {
        let start = Instant::now();
        metrics::counter!("pipeline.runs").increment(1);

        let mut run = PipelineRun::new();
        run.record(format!("Starting pipeline for {}", customer_name));

        let outcome = match self.execute(&mut run, customer_name).await {
            Ok(parts) => {
                let (metadata, customer, segmentation, campaign) = parts;
                PipelineOutcome::Completed(Box::new(PipelineResult {
                    metadata,
                    customer,
                    segmentation,
                    campaign: campaign.into(),
                    log: run.log,
                }))
            }
            Err(e) => {
                let failed_at = run.machine.state();
                // Error is reachable from every non-terminal stage.
                if let Err(transition_error) = run.advance(PipelineState::Error) {
                    warn!(error = %transition_error, "Could not record error state");
                }
                run.record(format!("Pipeline failed: {}", e));
                metrics::counter!("pipeline.failures").increment(1);
                error!(
                    run_id = %run.id,
                    customer = customer_name,
                    stage = %failed_at,
                    error = %e,
                    "Pipeline run failed"
                );
                PipelineOutcome::Failed(PipelineFailure {
                    run_id: run.id,
                    kind: FailureKind::from(&e),
                    error: e.to_string(),
                    failed_at,
                    log: run.log,
                })
            }
        };

        metrics::histogram!("pipeline.latency_ms").record(start.elapsed().as_secs_f64() * 1000.0);
        outcome
    }

    /// Sequential runs over every customer in the directory.
    pub async fn run_batch(&self) -> Vec<PipelineOutcome> {
        let names: Vec<String> = self
            .directory
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut outcomes = Vec::with_capacity(names.len());
        for name in &names {
            outcomes.push(self.run(name).await);
        }
        info!(
            total = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.is_success()).count(),
            "Batch complete"
        );
        outcomes
    }

    async fn execute(
        &self,
        run: &mut PipelineRun,
        customer_name: &str,
    ) -> CampaignResult<(RunMetadata, CustomerSummary, SegmentationView, CampaignPayload)> {
        let customer = self.ingest(run, customer_name)?;
        let profile = self.profile(run, &customer).await?;
        let segmentation = self.segment(run, &customer, &profile)?;
        let inputs = CampaignInputs {
            customer: &customer,
            profile: &profile,
            segment: segmentation.segment,
        };
        let campaign = self.campaign(run, inputs).await?;

        run.advance(PipelineState::Output)?;
        run.record("Assembling structured result");
        let metadata = RunMetadata {
            run_id: run.id,
            timestamp: Utc::now(),
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            stages_executed: run.log.len(),
        };
        let description = segmentation.segment.description();
        let view = SegmentationView {
            result: segmentation,
            description,
        };
        run.record("Final result consolidated");

        run.advance(PipelineState::Complete)?;
        run.record_with(
            "Pipeline completed successfully",
            json!({
                "segment": view.result.segment,
                "campaign": campaign.template_id,
            }),
        );

        Ok((metadata, CustomerSummary::from(&customer), view, campaign))
    }

    fn ingest(&self, run: &mut PipelineRun, customer_name: &str) -> CampaignResult<CustomerRecord> {
        run.advance(PipelineState::Ingest)?;
        run.record(format!("Loading customer data for {}", customer_name));

        let customer = self.directory.find_by_name(customer_name)?.clone();
        customer.validate()?;

        run.record_with(
            format!("Customer loaded: {}", customer.name),
            json!({
                "id": customer.id,
                "sector": customer.sector_str(),
                "average_spend": customer.average_spend,
            }),
        );
        Ok(customer)
    }

    async fn profile(
        &self,
        run: &mut PipelineRun,
        customer: &CustomerRecord,
    ) -> CampaignResult<SocialProfile> {
        run.advance(PipelineState::Profile)?;
        run.record(format!("Fetching social signals for customer {}", customer.id));

        let profile = self.social.get_profile(customer.id).await;
        let score = compute_social_score(&profile);

        run.record_with(
            format!("Social profile ready (score: {:.1})", score),
            json!({
                "channel": profile.channel,
                "activity_level": profile.activity_level,
                "social_score": score,
                "interests": profile.interests.iter().take(3).collect::<Vec<_>>(),
            }),
        );
        Ok(profile)
    }

    fn segment(
        &self,
        run: &mut PipelineRun,
        customer: &CustomerRecord,
        profile: &SocialProfile,
    ) -> CampaignResult<SegmentationResult> {
        run.advance(PipelineState::Segment)?;
        run.record("Running segmentation rules");

        let result = self.classifier.classify(customer, profile);
        metrics::counter!("segmentation.assigned", "segment" => result.segment.as_str())
            .increment(1);

        run.record_with(
            format!(
                "Customer assigned to {} (confidence: {:.0}%)",
                result.segment.display_name(),
                result.confidence * 100.0
            ),
            json!({
                "segment": result.segment,
                "confidence": result.confidence,
                "description": result.segment.description(),
                "reasons": result.reasons,
            }),
        );
        Ok(result)
    }

    async fn campaign(
        &self,
        run: &mut PipelineRun,
        inputs: CampaignInputs<'_>,
    ) -> CampaignResult<CampaignPayload> {
        run.advance(PipelineState::Campaign)?;
        run.record("Generating personalized campaign");

        let template_id = self.selector.select(inputs.segment, inputs.profile);
        run.record(format!("Template selected: {}", template_id));

        let mut payload = self.personalizer.personalize(
            template_id,
            inputs.customer,
            inputs.profile,
            inputs.segment,
        )?;

        if let Some(enhancer) = self.enhancer.as_ref().filter(|e| e.is_available()) {
            run.record("Enhancing message with generative model");
            self.enhance(run, &**enhancer, &mut payload, &inputs).await;
        }

        run.record_with(
            format!(
                "Campaign ready: {} via {} ({:.0}% off)",
                payload.name,
                payload.channel,
                payload.discount * 100.0
            ),
            json!({
                "template_id": payload.template_id,
                "channel": payload.channel,
                "subject": payload.subject,
                "discount": format!("{:.0}%", payload.discount * 100.0),
                "enhanced": payload.was_enhanced(),
            }),
        );
        Ok(payload)
    }

    /// At most one attempt per call; every failure keeps the template text.
    async fn enhance(
        &self,
        run: &mut PipelineRun,
        enhancer: &dyn MessageEnhancer,
        payload: &mut CampaignPayload,
        inputs: &CampaignInputs<'_>,
    ) {
        let attempt = tokio::time::timeout(
            self.enhancer_timeout,
            enhancer.enhance_message(
                &payload.body,
                inputs.customer,
                inputs.profile,
                inputs.segment,
            ),
        )
        .await;

        let enhanced = match attempt {
            Ok(enhanced) if enhanced.was_enhanced && !enhanced.message.trim().is_empty() => {
                enhanced
            }
            Ok(_) => {
                metrics::counter!("enhancer.fallbacks").increment(1);
                run.record("Enhancer unavailable, keeping template text");
                return;
            }
            Err(_) => {
                metrics::counter!("enhancer.fallbacks").increment(1);
                warn!(
                    customer = %inputs.customer.name,
                    timeout_ms = self.enhancer_timeout.as_millis() as u64,
                    "Enhancer timed out"
                );
                run.record("Enhancer timed out, keeping template text");
                return;
            }
        };

        let original_body = std::mem::replace(&mut payload.body, enhanced.message);

        let subject = tokio::time::timeout(
            self.enhancer_timeout,
            enhancer.enhance_subject(&payload.subject, inputs.customer),
        )
        .await
        .ok()
        .flatten()
        .filter(|s| !s.trim().is_empty());
        let original_subject = subject.map(|s| std::mem::replace(&mut payload.subject, s));

        payload.enhancement = Enhancement::Enhanced {
            method: enhancer.method().to_string(),
            original_body: enhanced.original_message.unwrap_or(original_body),
            original_subject,
        };
        run.record("Message enhanced with generative model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::EnhancedMessage;
    use async_trait::async_trait;
    use campaign_cdp::MockSocialProvider;
    use campaign_core::types::TemplateId;

    enum Script {
        Rewrite,
        Decline,
        Hang,
    }

    struct ScriptedEnhancer(Script);

    #[async_trait]
    impl MessageEnhancer for ScriptedEnhancer {
        fn is_available(&self) -> bool {
            true
        }

        fn method(&self) -> &str {
            "scripted"
        }

        async fn enhance_message(
            &self,
            base: &str,
            customer: &CustomerRecord,
            _profile: &SocialProfile,
            _segment: Segment,
        ) -> EnhancedMessage {
            match self.0 {
                Script::Rewrite => EnhancedMessage::rewritten(
                    base,
                    format!("Hola {}, mensaje reescrito", customer.name),
                ),
                Script::Decline => EnhancedMessage::unchanged(base),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    EnhancedMessage::rewritten(base, "tarde".to_string())
                }
            }
        }

        async fn enhance_subject(&self, _base: &str, _customer: &CustomerRecord) -> Option<String> {
            match self.0 {
                Script::Rewrite => Some("Asunto nuevo".to_string()),
                _ => None,
            }
        }
    }

    fn orchestrator() -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Arc::new(CustomerDirectory::demo()),
            Arc::new(MockSocialProvider::demo(Duration::ZERO)),
        )
    }

    #[tokio::test]
    async fn test_successful_run_walks_every_stage() {
        let outcome = orchestrator().run("Juan Perez").await;
        let result = outcome.result().expect("run should complete");

        assert_eq!(result.segmentation.result.segment, Segment::ChurnRisk);
        assert_eq!(result.campaign.payload.template_id, TemplateId::UrgentRetention);
        assert_eq!(result.metadata.customer_id, 4);

        let stages: Vec<PipelineState> = result.log.entries().iter().map(|e| e.stage).collect();
        assert_eq!(stages.first(), Some(&PipelineState::Inactive));
        assert_eq!(stages.last(), Some(&PipelineState::Complete));
        for stage in [
            PipelineState::Ingest,
            PipelineState::Profile,
            PipelineState::Segment,
            PipelineState::Campaign,
            PipelineState::Output,
        ] {
            assert!(stages.contains(&stage), "missing {stage}");
        }
        assert!(!stages.contains(&PipelineState::Error));
    }

    #[tokio::test]
    async fn test_unknown_customer_fails_at_ingest() {
        let outcome = orchestrator().run("Nadie").await;
        let failure = outcome.failure().expect("run should fail");

        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.failed_at, PipelineState::Ingest);
        assert!(failure.error.contains("customer not found"));
        assert_eq!(failure.log.last().unwrap().stage, PipelineState::Error);
    }

    #[tokio::test]
    async fn test_enhancer_rewrite_records_provenance() {
        let orchestrator = orchestrator().with_enhancer(
            Arc::new(ScriptedEnhancer(Script::Rewrite)),
            Duration::from_secs(1),
        );
        let outcome = orchestrator.run("Laura Vega").await;
        let payload = &outcome.result().unwrap().campaign.payload;

        assert_eq!(payload.body, "Hola Laura Vega, mensaje reescrito");
        assert_eq!(payload.subject, "Asunto nuevo");
        match &payload.enhancement {
            Enhancement::Enhanced {
                method,
                original_body,
                original_subject,
            } => {
                assert_eq!(method, "scripted");
                assert!(original_body.contains("Laura Vega"));
                assert!(original_subject.is_some());
            }
            Enhancement::NotEnhanced => panic!("expected enhancement"),
        }
    }

    #[tokio::test]
    async fn test_enhancer_decline_keeps_template() {
        let plain = orchestrator().run("Laura Vega").await;
        let declined = orchestrator()
            .with_enhancer(
                Arc::new(ScriptedEnhancer(Script::Decline)),
                Duration::from_secs(1),
            )
            .run("Laura Vega")
            .await;

        let plain = &plain.result().unwrap().campaign.payload;
        let declined = &declined.result().unwrap().campaign.payload;
        assert_eq!(plain.body, declined.body);
        assert!(!declined.was_enhanced());
    }

    #[tokio::test]
    async fn test_enhancer_timeout_fails_closed() {
        let outcome = orchestrator()
            .with_enhancer(
                Arc::new(ScriptedEnhancer(Script::Hang)),
                Duration::from_millis(20),
            )
            .run("Carlos Ruiz")
            .await;

        let result = outcome.result().expect("timeout must not fail the run");
        assert!(!result.campaign.payload.was_enhanced());
        assert!(result
            .log
            .entries()
            .iter()
            .any(|e| e.message.contains("timed out")));
    }

    #[tokio::test]
    async fn test_runs_own_independent_logs() {
        let orchestrator = orchestrator();
        let first = orchestrator.run("Carlos Ruiz").await;
        let second = orchestrator.run("Carlos Ruiz").await;
        assert_eq!(first.log().len(), second.log().len());
        assert_ne!(
            first.result().unwrap().metadata.run_id,
            second.result().unwrap().metadata.run_id
        );
    }

    #[tokio::test]
    async fn test_batch_covers_every_customer() {
        let outcomes = orchestrator().run_batch().await;
        assert_eq!(outcomes.len(), 8);
        assert!(outcomes.iter().all(PipelineOutcome::is_success));
    }
}

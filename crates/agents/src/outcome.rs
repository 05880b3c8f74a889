//! Records returned by a pipeline run. A run always ends in exactly one of
//! [`PipelineOutcome::Completed`] or [`PipelineOutcome::Failed`].

use campaign_core::error::CampaignError;
use campaign_core::types::{CampaignPayload, ChurnRisk, CustomerRecord, SegmentationResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::log::ExecutionLog;
use crate::state_machine::PipelineState;

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub customer_id: u32,
    pub customer_name: String,
    pub stages_executed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub name: String,
    pub sector: Option<String>,
    pub average_spend: f64,
    pub churn_risk: ChurnRisk,
}

impl From<&CustomerRecord> for CustomerSummary {
    fn from(customer: &CustomerRecord) -> Self {
        Self {
            name: customer.name.clone(),
            sector: customer.sector.clone(),
            average_spend: customer.average_spend,
            churn_risk: customer.churn_risk.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentationView {
    #[serde(flatten)]
    pub result: SegmentationResult,
    pub description: &'static str,
}

/// Serialized campaign: the payload plus `applied_discount`, an alias of
/// `discount` kept for downstream readers.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignRecord {
    #[serde(flatten)]
    pub payload: CampaignPayload,
    pub applied_discount: f64,
}

impl From<CampaignPayload> for CampaignRecord {
    fn from(payload: CampaignPayload) -> Self {
        let applied_discount = payload.applied_discount();
        Self {
            payload,
            applied_discount,
        }
    }
}

/// Final artifact of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub metadata: RunMetadata,
    pub customer: CustomerSummary,
    pub segmentation: SegmentationView,
    pub campaign: CampaignRecord,
    pub log: ExecutionLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Validation,
    Internal,
}

impl From<&CampaignError> for FailureKind {
    fn from(error: &CampaignError) -> Self {
        match error {
            CampaignError::NotFound(_) => FailureKind::NotFound,
            CampaignError::Validation(_) => FailureKind::Validation,
            _ => FailureKind::Internal,
        }
    }
}

/// Structured failure carrying the partial log up to the failing stage.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineFailure {
    pub run_id: Uuid,
    pub kind: FailureKind,
    pub error: String,
    pub failed_at: PipelineState,
    pub log: ExecutionLog,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Completed(Box<PipelineResult>),
    Failed(PipelineFailure),
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Completed(_))
    }

    pub fn result(&self) -> Option<&PipelineResult> {
        match self {
            PipelineOutcome::Completed(result) => Some(&**result),
            PipelineOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        match self {
            PipelineOutcome::Completed(_) => None,
            PipelineOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn log(&self) -> &ExecutionLog {
        match self {
            PipelineOutcome::Completed(result) => &result.log,
            PipelineOutcome::Failed(failure) => &failure.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::{Channel, Enhancement, EstimatedMetrics, TemplateId};

    fn payload() -> CampaignPayload {
        CampaignPayload {
            template_id: TemplateId::UrgentRetention,
            name: "Retención Urgente".to_string(),
            channel: Channel::Sms,
            subject: "Te extrañamos".to_string(),
            body: "Vuelve".to_string(),
            cta: "Activar".to_string(),
            discount: 0.3,
            metrics: EstimatedMetrics {
                open_rate: "98.0%".to_string(),
                click_through_rate: "6.0%".to_string(),
                conversion_rate: "2.0%".to_string(),
            },
            enhancement: Enhancement::NotEnhanced,
        }
    }

    #[test]
    fn test_campaign_record_exposes_both_discount_keys() {
        let record = CampaignRecord::from(payload());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["discount"], value["applied_discount"]);
        assert_eq!(value["applied_discount"], 0.3);
        assert_eq!(value["template_id"], "RETENCION_URGENTE");
        assert_eq!(value["enhancement"]["status"], "not_enhanced");
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(
            FailureKind::from(&CampaignError::customer_not_found("Nadie")),
            FailureKind::NotFound
        );
        assert_eq!(
            FailureKind::from(&CampaignError::Validation("bad".into())),
            FailureKind::Validation
        );
        assert_eq!(
            FailureKind::from(&CampaignError::Catalog("missing".into())),
            FailureKind::Internal
        );
    }

    #[test]
    fn test_failed_outcome_serializes_with_status_tag() {
        let outcome = PipelineOutcome::Failed(PipelineFailure {
            run_id: Uuid::new_v4(),
            kind: FailureKind::NotFound,
            error: "customer not found: Nadie".to_string(),
            failed_at: PipelineState::Ingest,
            log: ExecutionLog::new(),
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["failed_at"], "ingest");
        assert!(!outcome.is_success());
        assert!(outcome.result().is_none());
    }
}

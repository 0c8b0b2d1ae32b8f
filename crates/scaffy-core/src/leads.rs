//! Lead intake.
//!
//! Validated quote requests are handed to a [`LeadSink`]. The shipped
//! [`LoggingLeadSink`] records each lead as a structured log event and hands
//! back a receipt; it sends nothing anywhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::SiteError;
use crate::quote::{AccurateQuoteRequest, QuickEstimateRequest};

/// Acknowledgement for an accepted lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadReceipt {
    pub reference: Uuid,
    pub received_at: DateTime<Utc>,
}

impl LeadReceipt {
    #[must_use]
    pub fn issue() -> Self {
        Self {
            reference: Uuid::new_v4(),
            received_at: Utc::now(),
        }
    }

    /// First eight hex digits of the reference, upper-cased, for display.
    #[must_use]
    pub fn short_reference(&self) -> String {
        self.reference.simple().to_string()[..8].to_uppercase()
    }
}

/// Destination for submitted leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// # Errors
    ///
    /// Implementations return [`SiteError::Network`] when the lead cannot be
    /// delivered.
    async fn submit_estimate(&self, request: &QuickEstimateRequest)
    -> Result<LeadReceipt, SiteError>;

    /// # Errors
    ///
    /// As for [`LeadSink::submit_estimate`].
    async fn submit_quote(&self, request: &AccurateQuoteRequest) -> Result<LeadReceipt, SiteError>;
}

/// Logs leads and accepts them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLeadSink;

#[async_trait]
impl LeadSink for LoggingLeadSink {
    async fn submit_estimate(
        &self,
        request: &QuickEstimateRequest,
    ) -> Result<LeadReceipt, SiteError> {
        let receipt = LeadReceipt::issue();
        info!(
            reference = %receipt.reference,
            name = %request.name,
            phone = %request.phone,
            job_type = request.job_type.map_or("-", |j| j.as_str()),
            description_chars = request.description.chars().count(),
            "quick estimate received"
        );
        Ok(receipt)
    }

    async fn submit_quote(&self, request: &AccurateQuoteRequest) -> Result<LeadReceipt, SiteError> {
        let receipt = LeadReceipt::issue();
        let sections = serde_json::to_string(&request.sections)?;
        info!(
            reference = %receipt.reference,
            name = %request.name,
            phone = %request.phone,
            section_count = request.sections.len(),
            sections = %sections,
            "accurate quote received"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::quote::{BoardWidth, JobType, Section};

    #[tokio::test]
    async fn estimate_gets_a_fresh_receipt() {
        let request = QuickEstimateRequest {
            name: "Joe".to_owned(),
            phone: "07700 900000".to_owned(),
            job_type: Some(JobType::Roofing),
            description: "Chimney access".to_owned(),
        };
        let a = LoggingLeadSink.submit_estimate(&request).await.unwrap();
        let b = LoggingLeadSink.submit_estimate(&request).await.unwrap();
        assert_ne!(a.reference, b.reference);
    }

    #[tokio::test]
    async fn quote_is_accepted() {
        let request = AccurateQuoteRequest {
            name: "Joe".to_owned(),
            phone: "07700 900000".to_owned(),
            sections: vec![Section {
                id: 1,
                name: "Front".to_owned(),
                height: 6.0,
                length: 10.0,
                board_width: BoardWidth::Five,
            }],
        };
        let receipt = LoggingLeadSink.submit_quote(&request).await.unwrap();
        assert_eq!(receipt.short_reference().len(), 8);
    }
}

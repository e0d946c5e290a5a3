//! Capture orchestration: OCR, selection, validation, commission, persistence.

use std::time::Instant;

use image::DynamicImage;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::PatternRepository;
use crate::error::Result;
use crate::models::catalog::{ExtractionPattern, PaymentAccount};
use crate::models::config::{CommissionConfig, SlipscanConfig};
use crate::models::receipt::ExtractedReceipt;
use crate::ocr::TextRecognizer;
use crate::receipt::{
    commission_for, select_best_extraction, validate_receipt, CompiledPattern, MatchTier,
    StrategyKind,
};
use crate::store::{ReceiptImage, ReceiptStore, StoredReceipt};

/// Everything a capture produced, ready for review.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    /// Text the fields were extracted from.
    pub text: String,
    pub receipt: ExtractedReceipt,
    /// Review warnings; none of them block saving.
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<ExtractionPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<PaymentAccount>,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_tier: Option<MatchTier>,
}

impl CaptureOutcome {
    /// Apply the user's review edits and recompute the commission.
    ///
    /// `None` leaves the current value untouched.
    pub fn apply_review(
        &mut self,
        sender_name: Option<String>,
        customer_tip: Option<Decimal>,
        notes: Option<String>,
        rates: &CommissionConfig,
    ) {
        if let Some(sender) = sender_name {
            self.receipt.sender_name = Some(sender);
        }
        if let Some(tip) = customer_tip {
            self.receipt.customer_tip = Some(tip);
        }
        if let Some(notes) = notes {
            self.receipt.notes = Some(notes);
        }
        self.recompute_commission(rates);
    }

    fn recompute_commission(&mut self, rates: &CommissionConfig) {
        let tip = self.receipt.customer_tip.unwrap_or(Decimal::ZERO);
        self.receipt.agent_commission = self
            .receipt
            .amount
            .map(|amount| commission_for(amount, tip, rates));
    }
}

/// Runs captures against one repository and configuration.
///
/// Holds no mutable state; concurrent captures may share a pipeline.
pub struct ReceiptPipeline<'a, R: PatternRepository + ?Sized> {
    repository: &'a R,
    config: &'a SlipscanConfig,
}

impl<'a, R: PatternRepository + ?Sized> ReceiptPipeline<'a, R> {
    pub fn new(repository: &'a R, config: &'a SlipscanConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &SlipscanConfig {
        self.config
    }

    /// Extract, validate and price a receipt from already-recognized text.
    pub fn process_text(&self, text: &str) -> Result<CaptureOutcome> {
        let start = Instant::now();

        let patterns = CompiledPattern::compile_all(self.repository.list_active_patterns()?);
        let accounts = self.repository.list_active_accounts()?;
        debug!(
            "Catalog snapshot: {} active patterns, {} active accounts",
            patterns.len(),
            accounts.len()
        );

        let selection = select_best_extraction(text, &patterns, &accounts);
        let warnings = validate_receipt(
            &selection.receipt,
            &self.config.extraction.required_fields,
            &accounts,
        );
        for warning in &warnings {
            debug!("Validation: {}", warning);
        }

        let mut outcome = CaptureOutcome {
            text: text.to_string(),
            receipt: selection.receipt,
            warnings,
            pattern: selection.pattern,
            account: selection.account,
            strategy: selection.strategy,
            match_tier: selection.match_tier,
        };
        outcome.recompute_commission(&self.config.commission);

        info!(
            "Extracted receipt via {:?} in {:?}: pattern={:?}, account={:?}, {} warnings",
            outcome.strategy,
            start.elapsed(),
            outcome.receipt.matched_pattern,
            outcome.receipt.matched_account,
            outcome.warnings.len()
        );

        Ok(outcome)
    }

    /// Recognize a receipt image and process the resulting text.
    ///
    /// OCR failures abort the capture.
    pub fn process_image(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &DynamicImage,
        progress: &mut dyn FnMut(u8),
    ) -> Result<CaptureOutcome> {
        let ocr = recognizer.recognize(image, progress)?;
        if ocr.text.trim().is_empty() {
            warn!("OCR returned no text");
        }
        debug!("OCR text:\n{}", ocr.text);

        self.process_text(&ocr.text)
    }

    /// Hand a reviewed capture to the store. Errors are not retried.
    pub fn save(
        &self,
        store: &dyn ReceiptStore,
        outcome: &CaptureOutcome,
        image: Option<&ReceiptImage>,
        agent_id: &str,
    ) -> Result<StoredReceipt> {
        if !outcome.warnings.is_empty() {
            info!("Saving receipt with {} warnings", outcome.warnings.len());
        }
        Ok(store.save(&outcome.receipt, image, agent_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::{OcrError, SlipscanError};
    use crate::ocr::OcrResult;
    use crate::store::FileReceiptStore;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "Sent via GCash\nAmount 1,000.00\nRef No. 8031350663152\nAug 5, 2025 12:33 AM\n+63 915 642 9591";

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(
            &self,
            image: &DynamicImage,
            progress: &mut dyn FnMut(u8),
        ) -> std::result::Result<OcrResult, OcrError> {
            progress(50);
            progress(100);
            Ok(OcrResult {
                text: self.0.to_string(),
                image_size: (image.width(), image.height()),
                ..Default::default()
            })
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(
            &self,
            _image: &DynamicImage,
            _progress: &mut dyn FnMut(u8),
        ) -> std::result::Result<OcrResult, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_default_pattern();
        catalog.add_account(PaymentAccount::new("gcash", "Main", "0915 642 9591", "Maria Santos"));
        catalog
    }

    #[test]
    fn test_process_text() {
        let catalog = catalog();
        let config = SlipscanConfig::default();
        let outcome = ReceiptPipeline::new(&catalog, &config).process_text(TEXT).unwrap();

        assert!(outcome.warnings.is_empty());
        assert!(outcome.receipt.is_valid_account);
        assert_eq!(outcome.receipt.agent_commission, Some(Decimal::from(200)));
        assert_eq!(outcome.strategy, StrategyKind::Pattern);
    }

    #[test]
    fn test_review_recomputes_commission() {
        let catalog = catalog();
        let config = SlipscanConfig::default();
        let mut outcome = ReceiptPipeline::new(&catalog, &config).process_text(TEXT).unwrap();

        outcome.apply_review(
            Some("Juan".to_string()),
            Some(Decimal::from(100)),
            None,
            &config.commission,
        );

        assert_eq!(outcome.receipt.sender_name.as_deref(), Some("Juan"));
        assert_eq!(outcome.receipt.agent_commission, Some(Decimal::from(230)));
    }

    #[test]
    fn test_process_image_reports_progress() {
        let catalog = catalog();
        let config = SlipscanConfig::default();
        let image = DynamicImage::new_rgb8(4, 4);
        let mut seen: Vec<u8> = Vec::new();

        let outcome = ReceiptPipeline::new(&catalog, &config)
            .process_image(&FixedText(TEXT), &image, &mut |p: u8| seen.push(p))
            .unwrap();

        assert_eq!(seen, vec![50, 100]);
        assert_eq!(outcome.receipt.reference_number.as_deref(), Some("8031350663152"));
    }

    #[test]
    fn test_ocr_failure_is_fatal() {
        let catalog = catalog();
        let config = SlipscanConfig::default();
        let image = DynamicImage::new_rgb8(4, 4);

        let result = ReceiptPipeline::new(&catalog, &config).process_image(&Broken, &image, &mut |_: u8| {});
        assert!(matches!(result, Err(SlipscanError::Ocr(_))));
    }

    #[test]
    fn test_unmatched_account_still_saves() {
        let catalog = Catalog::with_default_pattern();
        let config = SlipscanConfig::default();
        let pipeline = ReceiptPipeline::new(&catalog, &config);
        let outcome = pipeline.process_text(TEXT).unwrap();

        assert_eq!(
            outcome.warnings,
            vec!["Payment was sent to +63 915 642 9591, but no accounts are configured"]
        );

        let dir = tempfile::tempdir().unwrap();
        let store = FileReceiptStore::new(dir.path());
        let stored = pipeline.save(&store, &outcome, None, "agent-1").unwrap();

        assert!(!stored.receipt.is_valid_account);
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_text_yields_warnings() {
        let catalog = catalog();
        let config = SlipscanConfig::default();
        let outcome = ReceiptPipeline::new(&catalog, &config).process_text("").unwrap();

        assert_eq!(outcome.strategy, StrategyKind::Legacy);
        assert_eq!(outcome.warnings.len(), 3);
        assert_eq!(outcome.receipt.agent_commission, None);
    }
}

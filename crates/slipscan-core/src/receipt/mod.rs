//! Receipt field extraction, account matching and review.

pub mod commission;
pub mod extractor;
pub mod legacy;
pub mod matcher;
pub mod rules;
pub mod selection;
pub mod validate;

pub use commission::{calculate_commission, commission_for, round_currency};
pub use extractor::{extract_with_pattern, probe_pattern, CompiledField, CompiledPattern, FieldProbe};
pub use legacy::{extract_legacy, LegacyStrategy};
pub use matcher::{match_account, normalize_account_number, AccountMatch, MatchTier};
pub use selection::{
    select_best_extraction, Candidate, ExtractionStrategy, PatternStrategy, Selection, StrategyKind,
};
pub use validate::validate_receipt;

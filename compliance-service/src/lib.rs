//! Entity screening against sanctions reference lists

pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod ofac;
pub mod reference;
pub mod screening;
pub mod types;

pub use config::Config;
pub use error::{ComplianceError, Result};
pub use matcher::{classify_risk, MatchIndex, MatchPolicy};
pub use normalize::{canonical_name, normalize_name, search_terms};
pub use ofac::{parse_sdn_xml, OfacSdnSource};
pub use reference::{CacheLookup, ReferenceCache, ReferenceSource};
pub use screening::ScreeningEngine;
pub use types::{
    CacheStatus, ComplianceAssessment, DomainMatch, MatchRecord, MatchSource, MatchType,
    ReferenceDataset, ReferenceEntity, RiskLevel, ScreeningVerdict,
};

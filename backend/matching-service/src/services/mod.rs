pub mod cache;
pub mod context;
pub mod diversity;
pub mod pipeline;
pub mod pre_apply;
pub mod ranking;
pub mod scoring;
pub mod signals;
pub mod sources;
pub mod weights;

pub use cache::{CacheTtls, PageKey, RankingCache};
pub use context::ContextLoader;
pub use diversity::DiversityLayer;
pub use pipeline::{MatchingService, RankingRequest};
pub use pre_apply::{PreApplyMatch, PreApplyMatcher};
pub use ranking::{PageRequest, Ranker, RankerSettings};
pub use scoring::Scorer;
pub use signals::{SignalCalculator, SignalInput, SignalRegistry, SignalSettings};
pub use sources::{CandidateSource, ViewerContextSource};
pub use weights::{ProfileExperiment, ProfileRegistry, ProfileVariant, WeightProfile};

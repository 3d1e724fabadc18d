use crate::error::{MatchingError, Result};
use crate::services::cache::CacheTtls;
use crate::services::ranking::RankerSettings;
use crate::services::signals::{EngagementWeights, SignalSettings};
use crate::services::weights::ProfileRegistry;
use ranking_cache::{MemoryCache, NoopCache, RedisCache, SharedCache};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const ENV_PREFIX: &str = "MATCHING_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    #[default]
    Memory,
    Disabled,
}

/// Engine settings, read from `MATCHING_*` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_max_consecutive")]
    pub diversity_max_consecutive: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    #[serde(default = "default_job_page_ttl")]
    pub job_page_ttl_secs: u64,
    #[serde(default = "default_feed_page_ttl")]
    pub feed_page_ttl_secs: u64,
    #[serde(default = "default_context_ttl")]
    pub context_ttl_secs: u64,

    #[serde(default = "default_half_life")]
    pub recency_half_life_hours: f64,
    #[serde(default = "default_engagement_ceiling")]
    pub engagement_reference_ceiling: f64,
    #[serde(default = "default_like_weight")]
    pub engagement_like_weight: f64,
    #[serde(default = "default_comment_weight")]
    pub engagement_comment_weight: f64,
    #[serde(default = "default_share_weight")]
    pub engagement_share_weight: f64,
    #[serde(default = "default_save_weight")]
    pub engagement_save_weight: f64,
    #[serde(default = "default_view_weight")]
    pub engagement_view_weight: f64,
    #[serde(default = "default_salary_upper_from_min")]
    pub salary_upper_from_min: f64,
    #[serde(default = "default_salary_lower_from_max")]
    pub salary_lower_from_max: f64,
    #[serde(default = "default_over_qualification_floor")]
    pub over_qualification_floor: f64,

    #[serde(default)]
    pub cache_backend: CacheBackendKind,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// JSON profiles file; built-in profiles when unset
    #[serde(default)]
    pub profiles_path: Option<String>,
}

fn default_max_consecutive() -> usize {
    crate::services::diversity::DEFAULT_MAX_CONSECUTIVE_FROM_AUTHOR
}

fn default_max_candidates() -> usize {
    crate::services::ranking::DEFAULT_MAX_CANDIDATES
}

fn default_max_page_size() -> usize {
    crate::services::ranking::DEFAULT_MAX_PAGE_SIZE
}

fn default_job_page_ttl() -> u64 {
    ranking_cache::ttl::JOB_PAGE
}

fn default_feed_page_ttl() -> u64 {
    ranking_cache::ttl::FEED_PAGE
}

fn default_context_ttl() -> u64 {
    ranking_cache::ttl::VIEWER_CONTEXT
}

fn default_half_life() -> f64 {
    crate::services::signals::DEFAULT_RECENCY_HALF_LIFE_HOURS
}

fn default_engagement_ceiling() -> f64 {
    EngagementWeights::default().reference_ceiling
}

fn default_like_weight() -> f64 {
    EngagementWeights::default().like
}

fn default_comment_weight() -> f64 {
    EngagementWeights::default().comment
}

fn default_share_weight() -> f64 {
    EngagementWeights::default().share
}

fn default_save_weight() -> f64 {
    EngagementWeights::default().save
}

fn default_view_weight() -> f64 {
    EngagementWeights::default().view
}

fn default_salary_upper_from_min() -> f64 {
    crate::services::signals::SALARY_UPPER_FROM_MIN
}

fn default_salary_lower_from_max() -> f64 {
    crate::services::signals::SALARY_LOWER_FROM_MAX
}

fn default_over_qualification_floor() -> f64 {
    crate::services::signals::OVER_QUALIFICATION_FLOOR
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diversity_max_consecutive: default_max_consecutive(),
            max_candidates: default_max_candidates(),
            max_page_size: default_max_page_size(),
            job_page_ttl_secs: default_job_page_ttl(),
            feed_page_ttl_secs: default_feed_page_ttl(),
            context_ttl_secs: default_context_ttl(),
            recency_half_life_hours: default_half_life(),
            engagement_reference_ceiling: default_engagement_ceiling(),
            engagement_like_weight: default_like_weight(),
            engagement_comment_weight: default_comment_weight(),
            engagement_share_weight: default_share_weight(),
            engagement_save_weight: default_save_weight(),
            engagement_view_weight: default_view_weight(),
            salary_upper_from_min: default_salary_upper_from_min(),
            salary_lower_from_max: default_salary_lower_from_max(),
            over_qualification_floor: default_over_qualification_floor(),
            cache_backend: CacheBackendKind::default(),
            redis_url: default_redis_url(),
            profiles_path: None,
        }
    }
}

impl Config {
    /// Load `.env` (if present) then the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config: Config = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`from_env`](Self::from_env) over explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MatchingError::Configuration(msg));

        if self.diversity_max_consecutive == 0 {
            return invalid("diversity_max_consecutive must be at least 1".to_string());
        }
        if self.max_candidates == 0 {
            return invalid("max_candidates must be at least 1".to_string());
        }
        if self.max_page_size == 0 {
            return invalid("max_page_size must be at least 1".to_string());
        }
        for (name, ttl) in [
            ("job_page_ttl_secs", self.job_page_ttl_secs),
            ("feed_page_ttl_secs", self.feed_page_ttl_secs),
            ("context_ttl_secs", self.context_ttl_secs),
        ] {
            if ttl == 0 {
                return invalid(format!("{} must be positive", name));
            }
        }
        if !(self.recency_half_life_hours.is_finite() && self.recency_half_life_hours > 0.0) {
            return invalid(format!(
                "recency_half_life_hours must be positive, got {}",
                self.recency_half_life_hours
            ));
        }
        if !(self.engagement_reference_ceiling.is_finite() && self.engagement_reference_ceiling > 1.0)
        {
            return invalid(format!(
                "engagement_reference_ceiling must be greater than 1, got {}",
                self.engagement_reference_ceiling
            ));
        }
        for (name, weight) in [
            ("engagement_like_weight", self.engagement_like_weight),
            ("engagement_comment_weight", self.engagement_comment_weight),
            ("engagement_share_weight", self.engagement_share_weight),
            ("engagement_save_weight", self.engagement_save_weight),
            ("engagement_view_weight", self.engagement_view_weight),
        ] {
            if !(weight.is_finite() && weight >= 0.0) {
                return invalid(format!("{} must be non-negative, got {}", name, weight));
            }
        }
        if !(self.salary_upper_from_min.is_finite() && self.salary_upper_from_min >= 1.0) {
            return invalid(format!(
                "salary_upper_from_min must be at least 1, got {}",
                self.salary_upper_from_min
            ));
        }
        if !(self.salary_lower_from_max > 0.0 && self.salary_lower_from_max <= 1.0) {
            return invalid(format!(
                "salary_lower_from_max must be within (0, 1], got {}",
                self.salary_lower_from_max
            ));
        }
        if !(0.0..=1.0).contains(&self.over_qualification_floor) {
            return invalid(format!(
                "over_qualification_floor must be within [0, 1], got {}",
                self.over_qualification_floor
            ));
        }
        Ok(())
    }

    pub fn signal_settings(&self) -> SignalSettings {
        SignalSettings {
            recency_half_life_hours: self.recency_half_life_hours,
            engagement: EngagementWeights {
                like: self.engagement_like_weight,
                comment: self.engagement_comment_weight,
                share: self.engagement_share_weight,
                save: self.engagement_save_weight,
                view: self.engagement_view_weight,
                reference_ceiling: self.engagement_reference_ceiling,
            },
            salary_upper_from_min: self.salary_upper_from_min,
            salary_lower_from_max: self.salary_lower_from_max,
            over_qualification_floor: self.over_qualification_floor,
        }
    }

    pub fn ranker_settings(&self) -> RankerSettings {
        RankerSettings {
            max_consecutive_from_author: self.diversity_max_consecutive,
            max_candidates: self.max_candidates,
            max_page_size: self.max_page_size,
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            job_page: self.job_page_ttl_secs,
            feed_page: self.feed_page_ttl_secs,
            viewer_context: self.context_ttl_secs,
        }
    }

    pub fn load_profiles(&self) -> Result<ProfileRegistry> {
        match &self.profiles_path {
            Some(path) => ProfileRegistry::from_path(path),
            None => {
                let registry = ProfileRegistry::builtin()?;
                info!(profiles = ?registry.ids(), "Using built-in weight profiles");
                Ok(registry)
            }
        }
    }

    /// Connects to Redis when selected
    pub async fn build_cache_backend(&self) -> Result<SharedCache> {
        let backend: SharedCache = match self.cache_backend {
            CacheBackendKind::Redis => Arc::new(RedisCache::connect(&self.redis_url).await?),
            CacheBackendKind::Memory => Arc::new(MemoryCache::new()),
            CacheBackendKind::Disabled => Arc::new(NoopCache),
        };
        info!(backend = backend.name(), "Cache backend ready");
        Ok(backend)
    }
}

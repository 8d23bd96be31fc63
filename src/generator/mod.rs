pub mod fallback;
#[cfg(feature = "network")]
pub mod gemini;
pub mod prompt;

use std::future::{Future, ready};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::topics;
use crate::error::ProviderError;
use crate::session::puzzle::{DailyPuzzle, GeneratedPuzzle};

/// What the provider is asked to write about on a given day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleRequest {
    pub date: NaiveDate,
    pub topic: &'static str,
}

impl PuzzleRequest {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            topic: topics::topic_for(date),
        }
    }
}

pub trait PuzzleProvider {
    fn generate(
        &self,
        request: &PuzzleRequest,
    ) -> impl Future<Output = Result<GeneratedPuzzle, ProviderError>> + Send;
}

/// Never generates; every day gets the fallback puzzle.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineProvider;

impl PuzzleProvider for OfflineProvider {
    fn generate(
        &self,
        _request: &PuzzleRequest,
    ) -> impl Future<Output = Result<GeneratedPuzzle, ProviderError>> + Send {
        ready(Err(ProviderError::Disabled))
    }
}

/// Provider picked at startup from config and command-line flags.
pub enum ConfiguredProvider {
    #[cfg(feature = "network")]
    Gemini(gemini::GeminiProvider),
    Offline(OfflineProvider),
}

impl ConfiguredProvider {
    pub fn from_config(config: &Config, offline: bool) -> Self {
        if offline {
            info!("offline mode, using fallback puzzle");
            return Self::Offline(OfflineProvider);
        }
        Self::online(config)
    }

    #[cfg(feature = "network")]
    fn online(config: &Config) -> Self {
        let Some(api_key) = config.resolved_api_key() else {
            warn!("no API key configured, using fallback puzzle");
            return Self::Offline(OfflineProvider);
        };
        match gemini::GeminiProvider::new(api_key, config) {
            Ok(provider) => Self::Gemini(provider),
            Err(e) => {
                warn!(error = %e, "could not build puzzle provider, using fallback puzzle");
                Self::Offline(OfflineProvider)
            }
        }
    }

    #[cfg(not(feature = "network"))]
    fn online(_config: &Config) -> Self {
        Self::Offline(OfflineProvider)
    }
}

impl PuzzleProvider for ConfiguredProvider {
    async fn generate(&self, request: &PuzzleRequest) -> Result<GeneratedPuzzle, ProviderError> {
        match self {
            #[cfg(feature = "network")]
            Self::Gemini(provider) => provider.generate(request).await,
            Self::Offline(provider) => provider.generate(request).await,
        }
    }
}

/// Asks `provider` for the day's puzzle once. Any failure, including a payload
/// that breaks the quiz contract, yields the fallback puzzle.
pub async fn fetch_or_fallback<P: PuzzleProvider>(provider: &P, date: NaiveDate) -> DailyPuzzle {
    let request = PuzzleRequest::for_date(date);
    info!(%date, topic = request.topic, "requesting puzzle");

    let result = provider
        .generate(&request)
        .await
        .and_then(|generated| {
            DailyPuzzle::from_generated(date, generated).map_err(ProviderError::Invalid)
        });

    match result {
        Ok(puzzle) => puzzle,
        Err(e) => {
            warn!(%date, error = %e, "puzzle generation failed, serving fallback");
            fallback::fallback_puzzle(date)
        }
    }
}

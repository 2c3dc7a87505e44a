// src/state.rs
use crate::errors::FloraError;
use crate::models::AnalysisResult;
use crate::services::{AnalysisClient, ImageDataUri};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze image. Please try again or use a clearer photo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Analyzing,
    Complete,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Analyzing => "analyzing",
            Status::Complete => "complete",
            Status::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Analyzing {
        image: ImageDataUri,
    },
    Complete {
        image: ImageDataUri,
        result: AnalysisResult,
        analyzed_at: DateTime<Utc>,
    },
    Error {
        image: Option<ImageDataUri>,
        message: String,
    },
}

impl AnalysisState {
    pub fn status(&self) -> Status {
        match self {
            AnalysisState::Idle => Status::Idle,
            AnalysisState::Analyzing { .. } => Status::Analyzing,
            AnalysisState::Complete { .. } => Status::Complete,
            AnalysisState::Error { .. } => Status::Error,
        }
    }

    pub fn image(&self) -> Option<&ImageDataUri> {
        match self {
            AnalysisState::Idle => None,
            AnalysisState::Analyzing { image } | AnalysisState::Complete { image, .. } => {
                Some(image)
            }
            AnalysisState::Error { image, .. } => image.as_ref(),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let (result, error, analyzed_at) = match self {
            AnalysisState::Complete {
                result,
                analyzed_at,
                ..
            } => (Some(result.clone()), None, Some(*analyzed_at)),
            AnalysisState::Error { message, .. } => (None, Some(message.clone()), None),
            _ => (None, None, None),
        };

        StateSnapshot {
            status: self.status(),
            result,
            error,
            image_uri: self.image().map(|image| image.as_str().to_string()),
            analyzed_at,
        }
    }
}

/// Flat, nullable-field rendering of the state for JSON consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub status: Status,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub image_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Issued by `submit`; a completion is only applied while its ticket is
/// still the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub scan_id: Uuid,
}

#[derive(Debug)]
pub struct StateMachine {
    state: AnalysisState,
    generation: u64,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn reject(&self, action: &'static str) -> FloraError {
        FloraError::InvalidTransition {
            action,
            status: self.state.status().as_str(),
        }
    }

    pub fn submit(&mut self, image: ImageDataUri) -> Result<Ticket, FloraError> {
        if self.state != AnalysisState::Idle {
            return Err(self.reject("submit"));
        }

        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            scan_id: Uuid::new_v4(),
        };
        info!("Scan {} submitted ({:?})", ticket.scan_id, image);
        self.state = AnalysisState::Analyzing { image };
        Ok(ticket)
    }

    /// Applies the outcome of the request identified by `ticket`. Returns
    /// `false` when the outcome is stale and was dropped.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, FloraError>,
    ) -> bool {
        if ticket.generation != self.generation {
            warn!(
                "Discarding stale result for scan {} (generation {} != {})",
                ticket.scan_id, ticket.generation, self.generation
            );
            return false;
        }

        let image = match &self.state {
            AnalysisState::Analyzing { image } => image.clone(),
            other => {
                warn!(
                    "Discarding result for scan {} while {}",
                    ticket.scan_id,
                    other.status().as_str()
                );
                return false;
            }
        };

        self.state = match outcome {
            Ok(result) => {
                info!(
                    "Scan {} complete: {} (healthy: {}, severity: {}, regions: {})",
                    ticket.scan_id,
                    result.plant_name,
                    result.is_healthy,
                    result.severity,
                    result.regions.len()
                );
                AnalysisState::Complete {
                    image,
                    result,
                    analyzed_at: Utc::now(),
                }
            }
            Err(e) => {
                error!("Scan {} failed: {}", ticket.scan_id, e);
                AnalysisState::Error {
                    image: Some(image),
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// An image that could not be read ends up where a failed analysis does.
    pub fn fail_input(&mut self, cause: &FloraError) -> Result<(), FloraError> {
        if self.state != AnalysisState::Idle {
            return Err(self.reject("accept input"));
        }

        error!("Image input failed: {}", cause);
        self.generation += 1;
        self.state = AnalysisState::Error {
            image: None,
            message: ANALYSIS_FAILED_MESSAGE.to_string(),
        };
        Ok(())
    }

    /// Always succeeds. Resetting mid-analysis abandons the request: the
    /// generation moves on, so its outcome is dropped when it lands.
    pub fn reset(&mut self) {
        match self.state.status() {
            Status::Idle => {}
            status => {
                if status == Status::Analyzing {
                    info!("Abandoning in-flight analysis (generation {})", self.generation);
                }
                self.generation += 1;
                self.state = AnalysisState::Idle;
                info!("State reset to idle");
            }
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the session's single state and the client that feeds it.
pub struct AnalysisSession {
    machine: Arc<Mutex<StateMachine>>,
    client: Arc<dyn AnalysisClient>,
}

impl AnalysisSession {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            machine: Arc::new(Mutex::new(StateMachine::new())),
            client,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateMachine> {
        self.machine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> AnalysisState {
        self.lock().state().clone()
    }

    /// Moves to `analyzing` before returning and runs the analysis in the
    /// background. The handle is only useful to callers that want to wait.
    pub fn submit(&self, image: ImageDataUri) -> Result<JoinHandle<()>, FloraError> {
        let ticket = self.lock().submit(image.clone())?;

        let machine = Arc::clone(&self.machine);
        let client = Arc::clone(&self.client);
        Ok(tokio::spawn(async move {
            info!("Scan {} sent to {}", ticket.scan_id, client.name());
            let outcome = client.analyze(image.as_str()).await;
            machine
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .complete(ticket, outcome);
        }))
    }

    pub fn fail_input(&self, cause: &FloraError) -> Result<(), FloraError> {
        self.lock().fail_input(cause)
    }

    pub fn reset(&self) {
        self.lock().reset()
    }
}

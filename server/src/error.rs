use actix_web::http::StatusCode;
use actix_web::rt::task::spawn_blocking;
use actix_web::rt::time::timeout;
use actix_web::{HttpResponse, ResponseError};
use derive_more::{Display, Error};
use serde::Serialize;

use klm_closure::closure::Algorithm;
use klm_closure::error::Error as ReasoningError;

use crate::config::Config;

#[derive(Debug, Display, Error)]
pub(crate) enum ApiError {
    #[display(fmt = "{}", error)]
    Reasoning { error: ReasoningError },
    #[display(
        fmt = "Endpoint {} timed out after {} seconds. Probably your knowledge base is too large :(",
        endpoint,
        secs
    )]
    Timeout { endpoint: &'static str, secs: u64 },
    #[display(fmt = "The request computed {} but asked for an explanation of {}", found, requested)]
    AlgorithmMismatch {
        requested: Algorithm,
        found: Algorithm,
    },
    #[display(fmt = "The evaluation request does not contain any {}", missing)]
    EmptyEvaluation { missing: &'static str },
    #[display(fmt = "The computation failed: {}", message)]
    Internal {
        #[error(not(source))]
        message: String,
    },
}

impl From<ReasoningError> for ApiError {
    fn from(error: ReasoningError) -> Self {
        ApiError::Reasoning { error }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    description: &'static str,
    message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Reasoning { error } => error.code(),
            ApiError::Timeout { .. } => "computation_timeout",
            ApiError::AlgorithmMismatch { .. } => "algorithm_mismatch",
            ApiError::EmptyEvaluation { .. } => "empty_evaluation",
            ApiError::Internal { .. } => "internal",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ApiError::Reasoning { error } => error.description(),
            ApiError::Timeout { .. } => {
                "The computation took too long, try a smaller knowledge base."
            }
            ApiError::AlgorithmMismatch { .. } => {
                "An explanation has to be requested for the closure operation which computed the result."
            }
            ApiError::EmptyEvaluation { .. } => "There is nothing to evaluate.",
            ApiError::Internal { .. } => "The service failed unexpectedly.",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Reasoning {
                error: ReasoningError::ComputationTimeout { .. },
            }
            | ApiError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Reasoning { error } if error.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::AlgorithmMismatch { .. } | ApiError::EmptyEvaluation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Reasoning { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.code(),
            description: self.description(),
            message: self.to_string(),
        })
    }
}

/// Runs `computation` on the blocking pool and gives up after the configured compute time.
pub(crate) async fn compute<T, F>(
    config: &Config,
    endpoint: &'static str,
    computation: F,
) -> Result<T, ApiError>
where
    F: FnOnce() -> klm_closure::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = timeout(
        config.compute_time,
        spawn_blocking(move || {
            #[cfg(feature = "mock_long_computations")]
            std::thread::sleep(crate::config::MOCK_DELAY);
            computation()
        }),
    )
    .await;
    match result {
        Err(_) => {
            log::warn!("{} timed out", endpoint);
            Err(ApiError::Timeout {
                endpoint,
                secs: config.compute_time.as_secs(),
            })
        }
        Ok(Err(err)) => Err(ApiError::Internal {
            message: err.to_string(),
        }),
        Ok(Ok(Err(err))) => {
            log::info!("{} failed: {}", endpoint, err);
            Err(err.into())
        }
        Ok(Ok(Ok(value))) => Ok(value),
    }
}

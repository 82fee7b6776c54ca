use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use boat_order_engine::{state_machine::TransitionError, OrderFlowError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NoRoute(String),
    /// Errors from the order engine. Their HTTP status and tag are decided here and nowhere else.
    #[error("{0}")]
    OrderFlow(#[from] OrderFlowError),
}

impl ServerError {
    /// The machine-readable tag that goes into the `error` field of the response body.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OrderFlow(e) => e.tag(),
            Self::BadRequest(_) => "bad_request",
            Self::NoRoute(_) => "not_found",
            Self::AuthenticationError(AuthError::Forbidden(_)) => "forbidden",
            Self::AuthenticationError(_) => "unauthorized",
            Self::InitializeError(_) | Self::IOError(_) | Self::ConfigurationError(_) | Self::Unspecified(_) => {
                "internal_error"
            },
        }
    }

    /// The human-readable message in the response body. Storage details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::OrderFlow(OrderFlowError::StorageError(_)) => "An unexpected storage error occurred.".to_string(),
            Self::InitializeError(_) | Self::IOError(_) | Self::ConfigurationError(_) | Self::Unspecified(_) => {
                "An unexpected error occurred.".to_string()
            },
            e => e.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::OrderFlow(e) => match e {
                OrderFlowError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::Unavailable(_) => StatusCode::BAD_REQUEST,
                OrderFlowError::InvalidTransition(_) => StatusCode::CONFLICT,
                OrderFlowError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
                OrderFlowError::ProviderRejected(_) => StatusCode::BAD_GATEWAY,
                OrderFlowError::PaymentUnavailable(_) => StatusCode::BAD_GATEWAY,
                OrderFlowError::BadRequest(_) => StatusCode::BAD_REQUEST,
                OrderFlowError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoRoute(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                    StatusCode::UNAUTHORIZED
                },
                AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "error": self.tag(), "message": self.public_message() });
        if let Self::OrderFlow(OrderFlowError::InvalidTransition(TransitionError { current, requested })) = self {
            body["current"] = json!(current);
            body["requested"] = json!(requested);
        }
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("The access token is invalid. {0}")]
    InvalidToken(String),
    #[error("The access token has expired.")]
    TokenExpired,
    #[error("Insufficient Permissions. {0}")]
    Forbidden(String),
}

//! Response handlers shared by both clients

use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::dto::ErrorBody;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an error if the request failed, or
/// deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = ensure_success(response).await?;

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response whose body is plain text
pub(crate) async fn handle_text_response(response: reqwest::Response) -> Result<String> {
    let response = ensure_success(response).await?;
    Ok(response.text().await?)
}

/// Handle an API response that returns no content (e.g., DELETE operations)
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    ensure_success(response).await.map(|_| ())
}

/// Turn the response to a create call into a [`CreateOutcome`]
pub(crate) async fn handle_create_response(
    response: reqwest::Response,
    exists_code: &str,
) -> Result<CreateOutcome> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(classify_create(status, &body, exists_code))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(response)
}

/// Classify a create response by status code and error body
///
/// Any 2xx status is `Created`. A 409 carrying `exists_code` is
/// `AlreadyExists`. Everything else is `Rejected` with whatever code the
/// body carried.
pub fn classify_create(status: u16, body: &str, exists_code: &str) -> CreateOutcome {
    if (200..300).contains(&status) {
        return CreateOutcome::Created;
    }

    let error: ErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        code: String::new(),
        message: body.to_string(),
    });

    if status == 409 && error.code == exists_code {
        return CreateOutcome::AlreadyExists;
    }

    CreateOutcome::Rejected {
        status,
        code: error.code,
        message: error.message,
    }
}

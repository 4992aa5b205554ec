use crate::infrastructure::repositories::ClientError;
use std::time::Duration;

/// Bytes of an error body kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 4096;

/// Build the shared HTTP client used for every engine and webhook call.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a reqwest failure onto the retry taxonomy.
pub fn classify_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// Check the status and read the body, never buffering more than `limit` bytes.
pub async fn read_success_body(
    mut response: reqwest::Response,
    limit: u64,
) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = read_error_body(response).await;
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if response.content_length().is_some_and(|len| len > limit) {
        return Err(ClientError::ResponseTooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify_error)? {
        if body.len() as u64 + chunk.len() as u64 > limit {
            return Err(ClientError::ResponseTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&body).trim().to_string()
}

//! Draining and checking responses.
//!
//! Only status 200 counts as success. Any other code, including 201 and 204,
//! becomes `ApiError::Upstream` carrying the body text.

use std::io::Read;

use crate::error::ApiError;
use crate::transport::RawResponse;

/// Read the whole body, close it, then check the status.
///
/// Takes the response by value so the body reader is dropped on every path,
/// including a failed read.
pub fn validate(response: RawResponse) -> Result<Vec<u8>, ApiError> {
    let RawResponse { status, mut body } = response;

    let mut bytes = Vec::new();
    let read = body.read_to_end(&mut bytes);
    drop(body);
    read.map_err(ApiError::BodyRead)?;

    if status != 200 {
        return Err(ApiError::Upstream {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(bytes)
}

//! Size-capped request body buffering

use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::HeaderMap;

use super::ValidationError;

/// Buffer `body` in memory, refusing to read more than `max_bytes`.
///
/// A `Content-Length` larger than the cap is rejected before any byte is read.
/// A body that lies about its length, or has none, is cut off as soon as the
/// cap is crossed. Both cases yield [`ValidationError::TooLarge`].
pub async fn read_capped<B>(
    headers: &HeaderMap,
    body: B,
    max_bytes: usize,
) -> Result<Bytes, ValidationError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let too_large = || ValidationError::TooLarge { limit: max_bytes };

    if let Some(len) = declared_length(headers) {
        if len > max_bytes as u64 {
            return Err(too_large());
        }
    }

    match Limited::new(body, max_bytes).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<http_body_util::LengthLimitError>().is_some() => {
            Err(too_large())
        }
        Err(e) => Err(ValidationError::Unclassified {
            detail: format!("Failed to read request body: {e}"),
        }),
    }
}

/// Parsed `Content-Length`, `None` if missing or unparsable
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok()?.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::tests_support::FailingBody;
    use http_body_util::Full;

    fn body(bytes: Vec<u8>) -> Full<Bytes> {
        Full::new(Bytes::from(bytes))
    }

    #[tokio::test]
    async fn test_body_within_limit() {
        let bytes = read_capped(&HeaderMap::new(), body(b"{\"City\":\"Oslo\"}".to_vec()), 100)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{\"City\":\"Oslo\"}");
    }

    #[tokio::test]
    async fn test_body_exactly_at_limit() {
        let bytes = read_capped(&HeaderMap::new(), body(vec![b' '; 100]), 100)
            .await
            .unwrap();
        assert_eq!(bytes.len(), 100);
    }

    #[tokio::test]
    async fn test_body_over_limit_without_content_length() {
        let err = read_capped(&HeaderMap::new(), body(vec![0; 1000]), 100)
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { limit: 100 });
    }

    #[tokio::test]
    async fn test_content_length_over_limit() {
        // The body itself is small: the declared length alone triggers the limit
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, "1000".parse().unwrap());
        let err = read_capped(&headers, body(b"{}".to_vec()), 100)
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { limit: 100 });
    }

    #[tokio::test]
    async fn test_invalid_content_length_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, "lots".parse().unwrap());
        let bytes = read_capped(&headers, body(b"{}".to_vec()), 100)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn test_read_error_is_unclassified() {
        let err = read_capped(&HeaderMap::new(), FailingBody, 100)
            .await
            .unwrap_err();
        match err {
            ValidationError::Unclassified { detail } => {
                assert!(detail.contains("connection reset by peer"), "{detail}");
            }
            other => panic!("expected Unclassified, got {other:?}"),
        }
    }
}

//! Fetch unit: retrieve one location into its record

use crate::error::{Error, Result};
use crate::format::sniff_content_type;
use crate::transport::Transport;
use crate::types::{FetchedImage, ImageRecord};

/// Derive the output file stem from a location
///
/// Takes the final `/`-separated segment of the location string and strips
/// everything from its last `.`. The location is treated as a plain path, so
/// a query string stays part of the segment: `.../cat.png?size=large` gives
/// `cat`, while `.../cat.png?v=1.2` gives `cat.png?v=1`.
///
/// # Examples
///
/// ```
/// use image_fetcher::fetch::base_name;
///
/// assert_eq!(base_name("http://x/a/cat.png"), "cat");
/// assert_eq!(base_name("http://x/a/archive.tar.gz"), "archive.tar");
/// ```
pub fn base_name(location: &str) -> String {
    let trimmed = location.trim_end_matches('/');
    if trimmed.is_empty() {
        return if location.is_empty() { "." } else { "/" }.to_string();
    }
    let segment = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    let stem = match segment.rfind('.') {
        Some(idx) => &segment[..idx],
        None => segment,
    };
    stem.to_string()
}

/// Retrieve `location` and identify what came back
///
/// The content type is sniffed from the body; any Content-Type header is
/// ignored.
///
/// # Errors
///
/// - [`Error::Transport`] if the retrieval could not complete
/// - [`Error::HttpStatus`] if the server answered with a non-2xx status
pub async fn fetch_image(transport: &dyn Transport, location: &str) -> Result<FetchedImage> {
    let response = transport.get(location).await?;

    if !response.is_success() {
        return Err(Error::HttpStatus {
            location: location.to_string(),
            status: response.status,
        });
    }

    let detected_format = sniff_content_type(&response.body).to_string();

    tracing::debug!(
        location = %location,
        bytes = response.body.len(),
        detected_format = %detected_format,
        header_content_type = ?response.content_type,
        "Fetched image"
    );

    Ok(FetchedImage {
        bytes: response.body,
        detected_format,
        base_name: base_name(location),
    })
}

/// Fetch `record`'s location and move the record to the fetched state
///
/// On error the record is left as it was.
pub async fn fetch_record(transport: &dyn Transport, record: &mut ImageRecord) -> Result<()> {
    let image = fetch_image(transport, record.location()).await?;
    record.mark_fetched(image);
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;

    /// Transport returning a fixed response for every location
    struct FixedTransport {
        status: u16,
        body: Vec<u8>,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn get(&self, _location: &str) -> Result<TransportResponse> {
            Ok(TransportResponse {
                status: self.status,
                content_type: Some("text/html".into()),
                body: self.body.clone(),
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn get(&self, location: &str) -> Result<TransportResponse> {
            Err(Error::Transport {
                location: location.to_string(),
                message: "connection refused".into(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn base_name_strips_extension_of_last_segment() {
        assert_eq!(base_name("http://x/a/cat.png"), "cat");
        assert_eq!(base_name("https://cdn.example.com/img/photo.JPG"), "photo");
        assert_eq!(base_name("http://x/a/noext"), "noext");
        assert_eq!(base_name("cat.png"), "cat");
    }

    #[test]
    fn base_name_keeps_query_string_quirk() {
        assert_eq!(base_name("http://x/cat.png?size=large"), "cat");
        assert_eq!(base_name("http://x/cat.png?v=1.2"), "cat.png?v=1");
        assert_eq!(base_name("http://x/cat?size=a/b.png"), "b");
    }

    #[test]
    fn base_name_handles_trailing_slashes_and_empty_input() {
        assert_eq!(base_name("http://x/dir/"), "dir");
        assert_eq!(base_name("http://x/a.b/"), "a");
        assert_eq!(base_name(""), ".");
        assert_eq!(base_name("///"), "/");
        assert_eq!(base_name("http://x/.hidden"), "");
    }

    #[test]
    fn base_name_is_deterministic() {
        let first = base_name("http://x/a/cat.png");
        for _ in 0..3 {
            assert_eq!(base_name("http://x/a/cat.png"), first);
        }
    }

    #[tokio::test]
    async fn fetch_populates_record_from_body_not_header() {
        let transport = FixedTransport {
            status: 200,
            body: b"GIF89a-rest-of-image".to_vec(),
        };
        let mut record = ImageRecord::new("http://x/a/cat.png");

        fetch_record(&transport, &mut record).await.unwrap();

        assert!(record.is_fetched());
        assert_eq!(record.detected_format(), Some("image/gif"));
        assert_eq!(record.base_name(), Some("cat"));
        assert_eq!(record.bytes(), Some(&b"GIF89a-rest-of-image"[..]));
    }

    #[tokio::test]
    async fn non_success_status_leaves_record_unfetched() {
        let transport = FixedTransport {
            status: 503,
            body: Vec::new(),
        };
        let mut record = ImageRecord::new("http://x/a/cat.png");

        let err = fetch_record(&transport, &mut record).await.unwrap_err();

        assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
        assert!(!record.is_fetched());
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let mut record = ImageRecord::new("http://x/a/cat.png");
        let err = fetch_record(&FailingTransport, &mut record).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(!record.is_fetched());
    }

    #[tokio::test]
    async fn fetch_image_returns_identity_without_a_record() {
        let transport = FixedTransport {
            status: 200,
            body: b"BM-bitmap".to_vec(),
        };

        let image = fetch_image(&transport, "http://x/pics/dog.bmp").await.unwrap();

        assert_eq!(image.detected_format, "image/bmp");
        assert_eq!(image.base_name, "dog");
        assert_eq!(image.bytes, b"BM-bitmap");
    }
}

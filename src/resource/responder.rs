//! Resource responder.
//!
//! # Responsibilities
//! - Ask the resource for a [`ResourceResponse`]
//! - Emit validator and caching headers
//! - Short-circuit conditional requests with 304
//! - Emit content headers, commit them, then run the write callback
//!
//! # Design Decisions
//! - `Last-Modified` and caching headers go out on 304 too; the client needs
//!   the validator and a fresh expiry
//! - Error codes win over any installed write callback
//! - A missing write callback is a defect in the resource, reported as
//!   [`ResourceError::MissingWriteCallback`] and never retried
//! - Headers are flushed before the body so browsers can render resources
//!   progressively instead of batching them with the rest of the page

use axum::http::StatusCode;

use crate::resource::attributes::Attributes;
use crate::resource::error::ResourceError;
use crate::resource::response::{ContentDisposition, ResourceResponse};
use crate::resource::Resource;

/// Answer one request for `resource`.
pub fn respond<R>(resource: &R, attributes: &mut Attributes<'_>) -> Result<(), ResourceError>
where
    R: Resource + ?Sized,
{
    let mut data = resource.new_resource_response(attributes);
    let request = attributes.request();

    // 1. Last Modified
    if let Some(last_modified) = data.last_modified() {
        attributes.response().set_last_modified_time(last_modified);
    }

    // 2. Caching
    configure_cache(&data, attributes);

    if !data.data_needs_to_be_written(request) {
        tracing::debug!(path = %request.path(), "Resource not modified");
        attributes.response().set_status(StatusCode::NOT_MODIFIED);
        return Ok(());
    }

    if let Some(code) = data.error_code() {
        tracing::debug!(path = %request.path(), status = %code, "Resource responded with error");
        attributes.response().send_error(code, data.error_message());
        return Ok(());
    }

    let callback = data
        .take_write_callback()
        .ok_or(ResourceError::MissingWriteCallback)?;

    let file_name = data.file_name();
    let mime_type = data.resolve_content_type(attributes.settings().mime_types());
    let encoding = match mime_type.as_deref() {
        Some(mime) if mime.contains("text") => data.text_encoding(),
        _ => None,
    };

    let response = attributes.response();

    // 3. Content Disposition
    match data.content_disposition() {
        ContentDisposition::Attachment => response.set_attachment_header(file_name),
        ContentDisposition::Inline => response.set_inline_header(file_name),
    }

    // 4. Mime Type (+ encoding)
    match (mime_type.as_deref(), encoding) {
        (Some(mime), Some(encoding)) => {
            response.set_content_type(&format!("{}; charset={}", mime, encoding))
        }
        (Some(mime), None) => response.set_content_type(mime),
        (None, _) => {}
    }

    // 5. Content Length
    if let Ok(length) = u64::try_from(data.content_length()) {
        response.set_content_length(length);
    }

    // 6. Commit headers
    response.flush()?;

    // 7. Write Data
    callback.write_data(attributes)
}

/// Set the client cache headers for `data`.
pub fn configure_cache(data: &ResourceResponse, attributes: &mut Attributes<'_>) {
    let now = attributes.request().timestamp();
    let duration = data.cache_duration();
    let response = attributes.response();

    if duration.is_none() {
        response.disable_caching(now);
    } else {
        response.enable_caching(duration.as_duration(), data.cache_scope(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::WebRequest;
    use crate::http::response::{BufferedResponse, CacheScope};
    use crate::resource::response::CacheDuration;
    use crate::resource::settings::ResourceSettings;
    use axum::http::header;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// Resource built from a configuration closure.
    struct TestResource<F> {
        configure: F,
    }

    impl<F> Resource for TestResource<F>
    where
        F: Fn(&mut ResourceResponse) + Send + Sync,
    {
        fn new_resource_response(&self, attributes: &Attributes<'_>) -> ResourceResponse {
            let mut response = attributes.new_resource_response();
            (self.configure)(&mut response);
            response
        }
    }

    fn resource<F: Fn(&mut ResourceResponse) + Send + Sync>(configure: F) -> TestResource<F> {
        TestResource { configure }
    }

    fn run(resource: &dyn Resource, request: &WebRequest) -> (Result<(), ResourceError>, BufferedResponse) {
        let settings = ResourceSettings::default();
        let mut response = BufferedResponse::new();
        let result = {
            let mut attributes = Attributes::new(request, &mut response, &settings);
            resource.respond(&mut attributes)
        };
        (result, response)
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn write_body(response: &mut ResourceResponse, body: &'static [u8]) {
        response.set_write_callback(move |attributes| {
            attributes.response().write(body)?;
            Ok(())
        });
    }

    #[test]
    fn test_full_response() {
        let res = resource(|r| {
            r.set_content_type("text/plain");
            r.set_text_encoding("UTF-8");
            r.set_content_length(5);
            r.set_last_modified(at(1_000_000_000));
            write_body(r, b"hello");
        });
        let (result, response) = run(&res, &WebRequest::get("/r"));

        result.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header(header::CONTENT_TYPE), Some("text/plain; charset=UTF-8"));
        assert_eq!(response.header(header::CONTENT_LENGTH), Some("5"));
        assert_eq!(response.header(header::CONTENT_DISPOSITION), Some("inline"));
        assert_eq!(response.header(header::LAST_MODIFIED), Some("Sun, 09 Sep 2001 01:46:40 GMT"));
        assert_eq!(response.header(header::CACHE_CONTROL), Some("private, max-age=3600"));
        assert_eq!(response.flush_count(), 1);
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn test_encoding_only_for_text() {
        let res = resource(|r| {
            r.set_content_type("image/png");
            r.set_text_encoding("UTF-8");
            write_body(r, b"");
        });
        let (result, response) = run(&res, &WebRequest::get("/r"));
        result.unwrap();
        assert_eq!(response.header(header::CONTENT_TYPE), Some("image/png"));
        assert!(response.header(header::CONTENT_LENGTH).is_none());
    }

    #[test]
    fn test_content_type_from_extension() {
        let res = resource(|r| {
            r.set_file_name("photo.gif");
            write_body(r, b"GIF89a");
        });
        let (result, response) = run(&res, &WebRequest::get("/r"));
        result.unwrap();
        assert_eq!(response.header(header::CONTENT_TYPE), Some("image/gif"));
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            Some("inline; filename=\"photo.gif\"")
        );
    }

    #[test]
    fn test_attachment() {
        let res = resource(|r| {
            r.set_file_name("report.pdf");
            r.set_content_disposition(ContentDisposition::Attachment);
            write_body(r, b"%PDF");
        });
        let (result, response) = run(&res, &WebRequest::get("/r"));
        result.unwrap();
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            Some("attachment; filename=\"report.pdf\"")
        );
        assert_eq!(response.header(header::CONTENT_TYPE), Some("application/pdf"));
    }

    #[test]
    fn test_not_modified_skips_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let res = resource(move |r| {
            r.set_last_modified(at(1_000_000_000));
            r.set_cache_duration_to_maximum();
            r.set_content_type("image/gif");
            let counter = counter.clone();
            r.set_write_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        });
        let request = WebRequest::get("/r")
            .with_timestamp(at(1_000_000_000))
            .with_if_modified_since(at(1_000_000_000 + 7 * 24 * 3600));
        let (result, response) = run(&res, &request);

        result.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(response.body().is_empty());
        assert!(response.header(header::CONTENT_TYPE).is_none());
        assert!(response.header(header::LAST_MODIFIED).is_some());
        // one year after the request timestamp
        assert_eq!(response.header(header::EXPIRES), Some("Mon, 09 Sep 2002 01:46:40 GMT"));
    }

    #[test]
    fn test_no_caching_regardless_of_scope() {
        for scope in [CacheScope::Private, CacheScope::Public] {
            let res = resource(move |r| {
                r.set_cache_duration(CacheDuration::NONE);
                r.set_cache_scope(scope);
                write_body(r, b"x");
            });
            let (result, response) = run(&res, &WebRequest::get("/r"));
            result.unwrap();
            assert_eq!(response.header(header::CACHE_CONTROL), Some("no-cache, no-store"));
            assert_eq!(response.header(header::PRAGMA), Some("no-cache"));
        }
    }

    #[test]
    fn test_error_wins_over_callback() {
        let res = resource(|r| {
            r.set_error_with_message(StatusCode::NOT_FOUND, Some("missing"));
            write_body(r, b"should not appear");
        });
        let (result, response) = run(&res, &WebRequest::get("/r"));
        result.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), b"missing");
    }

    #[test]
    fn test_missing_callback_is_fatal() {
        let res = resource(|r| r.set_content_type("text/plain"));
        let (result, response) = run(&res, &WebRequest::get("/r"));
        assert!(matches!(result, Err(ResourceError::MissingWriteCallback)));
        assert!(!response.is_committed());
    }

    #[test]
    fn test_identical_headers_for_identical_requests() {
        let res = resource(|r| {
            r.set_file_name("a.txt");
            r.set_text_encoding("UTF-8");
            r.set_last_modified(at(1_234_567_890));
            r.set_cache_scope(CacheScope::Public);
            write_body(r, b"same");
        });
        let request = WebRequest::get("/r").with_timestamp(at(1_300_000_000));
        let (first, a) = run(&res, &request);
        let (second, b) = run(&res, &request);
        first.unwrap();
        second.unwrap();
        assert_eq!(a.headers(), b.headers());
        assert_eq!(a.body(), b.body());
    }
}

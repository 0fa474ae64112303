use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::handlers::{collector, SubmissionHandler};
use crate::models::{MealSubmission, SubmissionOutcome};

pub mod page;

use page::PageView;

pub struct AppState {
    pub submission_handler: SubmissionHandler,
}

pub fn create_router(submission_handler: SubmissionHandler, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { submission_handler });

    Router::new()
        .route("/", get(index_page))
        .route("/calculate", get(index_page).post(calculate))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn index_page() -> Html<String> {
    Html(page::render(&PageView::idle()))
}

/// Form submit: collect, run the submission, render the page with its outcome.
async fn calculate(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Html<String>) {
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            log::warn!("⚠️ Rejected form submission: {}", rejection.body_text());
            return failure_page("", rejection.body_text());
        }
    };

    let mut submission = MealSubmission::default();
    if let Err(e) = collector::collect(multipart, &mut submission).await {
        log::warn!("⚠️ Could not collect form input: {}", e);
        return failure_page(&submission.context, e.to_string());
    }

    let outcome = state.submission_handler.submit(&submission).await;

    let status = match &outcome {
        SubmissionOutcome::MissingImage => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionOutcome::Success(_) => StatusCode::OK,
        SubmissionOutcome::Failed(_) => StatusCode::BAD_GATEWAY,
    };

    let html = page::render(&PageView {
        context: &submission.context,
        preview: submission.image.as_ref(),
        outcome: Some(&outcome),
    });

    (status, Html(html))
}

fn failure_page(context: &str, message: String) -> (StatusCode, Html<String>) {
    let outcome = SubmissionOutcome::Failed(message);
    let html = page::render(&PageView {
        context,
        outcome: Some(&outcome),
        ..PageView::idle()
    });

    (StatusCode::BAD_REQUEST, Html(html))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::inference::mock::MockInferenceService;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "----meal-form-boundary";
    const APPLE_RESPONSE: &str = "1. Apple - 95 calories\n----\nTotal calories: 95";

    struct FilePart<'a> {
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    }

    fn multipart_body(context: Option<&str>, file: Option<FilePart<'_>>) -> Vec<u8> {
        let mut body = Vec::new();

        if let Some(text) = context {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"input\"\r\n\r\n{}\r\n",
                    BOUNDARY, text
                )
                .as_bytes(),
            );
        }

        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, file.file_name, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn submit_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/calculate")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn apple_jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(200, 0x42);
        bytes
    }

    fn app_with(mock: Arc<MockInferenceService>) -> Router {
        create_router(SubmissionHandler::new(mock), 1024 * 1024)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = app_with(Arc::new(MockInferenceService::replying(APPLE_RESPONSE)));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, html) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Calorie Calculator"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app_with(Arc::new(MockInferenceService::replying(APPLE_RESPONSE)));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_apple_photo_without_context() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = app_with(mock.clone());
        let image = apple_jpeg();

        let body = multipart_body(
            Some(""),
            Some(FilePart {
                file_name: "apple.jpg",
                content_type: "image/jpeg",
                bytes: &image,
            }),
        );
        let (status, html) = send(&app, submit_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(page::SUCCESS_MESSAGE));
        assert!(html.contains(&format!("<div class=\"response\">{}</div>", APPLE_RESPONSE)));
        assert!(html.contains("<figure id=\"preview\">"));
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_context().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_no_image_makes_no_call() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = app_with(mock.clone());

        // What a browser sends when the file control was left empty
        let body = multipart_body(
            Some("breakfast"),
            Some(FilePart {
                file_name: "",
                content_type: "application/octet-stream",
                bytes: &[],
            }),
        );
        let (status, html) = send(&app, submit_request(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains(page::MISSING_IMAGE_MESSAGE));
        assert!(html.contains("value=\"breakfast\""));

        let (status, _) = send(&app, submit_request(multipart_body(Some("breakfast"), None))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_inference_failure_is_shown_and_app_keeps_serving() {
        let mock = Arc::new(MockInferenceService::failing("quota exceeded"));
        let app = app_with(mock.clone());
        let image = apple_jpeg();

        let make_body = || {
            multipart_body(
                Some("dinner"),
                Some(FilePart {
                    file_name: "apple.jpg",
                    content_type: "image/jpeg",
                    bytes: &image,
                }),
            )
        };

        let (status, html) = send(&app, submit_request(make_body())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("An error occurred: quota exceeded"));

        let (status, html) = send(&app, submit_request(make_body())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("quota exceeded"));
        assert_eq!(mock.calls(), 2);

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_identical_submissions_render_identically() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = app_with(mock.clone());
        let image = apple_jpeg();

        let make_body = || {
            multipart_body(
                Some("one apple"),
                Some(FilePart {
                    file_name: "apple.jpg",
                    content_type: "image/jpeg",
                    bytes: &image,
                }),
            )
        };

        let first = send(&app, submit_request(make_body())).await;
        let second = send(&app, submit_request(make_body())).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected_locally() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = app_with(mock.clone());

        let body = multipart_body(
            Some("my cat's lunch"),
            Some(FilePart {
                file_name: "cat.gif",
                content_type: "image/gif",
                bytes: b"GIF89a",
            }),
        );
        let (status, html) = send(&app, submit_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("An error occurred: unsupported image type"));
        assert!(html.contains("value=\"my cat's lunch\""));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = create_router(SubmissionHandler::new(mock.clone()), 64);
        let image = apple_jpeg();

        let body = multipart_body(
            None,
            Some(FilePart {
                file_name: "apple.jpg",
                content_type: "image/jpeg",
                bytes: &image,
            }),
        );
        let (status, html) = send(&app, submit_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("An error occurred"));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_multipart_post() {
        let mock = Arc::new(MockInferenceService::replying(APPLE_RESPONSE));
        let app = app_with(mock.clone());

        let request = Request::builder()
            .method("POST")
            .uri("/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, html) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("An error occurred"));
        assert_eq!(mock.calls(), 0);
    }
}

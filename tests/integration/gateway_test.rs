//! Integration tests for request validation, CORS, health and static assets.

#![cfg(unix)]

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use image::ImageFormat;

use helpers::{MultipartForm, TestApp, image_bytes};

const CONVERSION_ROUTES: [(&str, &str); 9] = [
    ("/convert-word-to-pdf", "wordFile"),
    ("/convert-pdf-to-word", "pdfFile"),
    ("/convert-jpg-to-pdf", "imageFile"),
    ("/convert-pdf-to-jpg", "pdfFile"),
    ("/convert-png-to-jpg", "pngFile"),
    ("/convert-excel-to-pdf", "excelFile"),
    ("/resize-jpg", "imageFile"),
    ("/resize-pdf", "pdfFile"),
    ("/convert", "pdfFile"),
];

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_every_route_requires_a_file() {
    let app = TestApp::new();

    for (route, _) in CONVERSION_ROUTES {
        let form = MultipartForm::new().text("width", "100");
        let response = app.post_form(route, form).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{route}");
        assert_eq!(response.text(), "No file uploaded.", "{route}");
    }
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_file_under_wrong_field_is_ignored() {
    let app = TestApp::new();

    for (route, field) in CONVERSION_ROUTES {
        let wrong = if field == "pdfFile" { "imageFile" } else { "pdfFile" };
        let form = MultipartForm::new().file(wrong, "doc.bin", "application/octet-stream", b"data");
        let response = app.post_form(route, form).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{route}");
    }
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_empty_file_part_counts_as_missing() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("pdfFile", "", "application/octet-stream", b"");
    let response = app.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .expect("request");
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
}

#[tokio::test]
async fn test_resize_requires_a_dimension() {
    let app = TestApp::new();
    let jpeg = image_bytes(20, 20, ImageFormat::Jpeg);

    for fields in [vec![], vec![("width", "")], vec![("width", "abc"), ("height", "0")]] {
        let form = fields.iter().fold(
            MultipartForm::new().file("imageFile", "a.jpg", "image/jpeg", &jpeg),
            |form, (name, value)| form.text(name, value),
        );
        let response = app.post_form("/resize-jpg", form).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{fields:?}");
        assert_eq!(response.text(), "Width or height must be provided.");
    }
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_duplicate_file_field_is_rejected() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .file("pdfFile", "a.pdf", "application/pdf", b"%PDF-1.7\n")
        .file("pdfFile", "b.pdf", "application/pdf", b"%PDF-1.7\n");
    let response = app.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let app = TestApp::with_config(|config, _| {
        config.server.max_upload_bytes = 2048;
    });

    let form =
        MultipartForm::new().file("pdfFile", "big.pdf", "application/pdf", &[b'x'; 16 * 1024]);
    let response = app.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.text(), "Upload exceeds the size limit.");
    assert_eq!(app.scratch_entries(), 0);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/convert")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_cors_allows_local_origin_on_server_port() {
    let app = TestApp::new();

    let response = app.send(preflight("http://localhost:5005")).await;

    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "http://localhost:5005"
    );
}

#[tokio::test]
async fn test_cors_rejects_foreign_origin() {
    let app = TestApp::new();

    let response = app.send(preflight("http://evil.example:5005")).await;

    assert!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_extra_origin() {
    let app = TestApp::with_config(|config, _| {
        config.server.cors.extra_origins = vec!["https://convert.example.org".to_string()];
    });

    let response = app.send(preflight("https://convert.example.org")).await;

    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://convert.example.org"
    );
}

#[tokio::test]
async fn test_static_assets_are_served_as_fallback() {
    let app = TestApp::with_config(|config, bin| {
        let public = bin.parent().expect("temp root").join("public");
        std::fs::create_dir_all(&public).expect("public dir");
        std::fs::write(public.join("index.html"), "<h1>DocShift</h1>").expect("index");
        config.server.static_dir = public.display().to_string();
    });

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "<h1>DocShift</h1>");

    let response = app.get("/health").await;
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_unknown_path_without_static_dir_is_404() {
    let app = TestApp::new();

    let response = app.get("/missing.css").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

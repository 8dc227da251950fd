//! Integration tests for the conversion endpoints.

#![cfg(unix)]

mod helpers;

use axum::http::{StatusCode, header};
use image::ImageFormat;
use lopdf::{Document, Object};

use helpers::{FAILING_TOOL, MultipartForm, PASSTHROUGH_GS, TestApp, image_bytes, install_tool};

const ONE_PAGE_PDF: &[u8] =
    b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n";

#[tokio::test]
async fn test_downgrade_returns_pdf_14() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("pdfFile", "report.pdf", "application/pdf", ONE_PAGE_PDF);
    let response = app.post_form("/convert", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=converted.pdf"
    );
    assert!(response.body.starts_with(b"%PDF-1.4"));
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_resize_keeps_aspect_ratio() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .file("imageFile", "wide.jpg", "image/jpeg", &image_bytes(100, 50, ImageFormat::Jpeg))
        .text("width", "50");
    let response = app.post_form("/resize-jpg", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/jpeg");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=resized.jpg"
    );
    let resized = image::load_from_memory(&response.body).expect("decode jpeg");
    assert_eq!((resized.width(), resized.height()), (50, 25));
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_resize_with_both_dimensions_is_exact() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .file("imageFile", "photo.png", "image/png", &image_bytes(64, 64, ImageFormat::Png))
        .text("width", "40")
        .text("height", "10");
    let response = app.post_form("/resize-jpg", form).await;

    assert_eq!(response.status, StatusCode::OK);
    let resized = image::load_from_memory(&response.body).expect("decode jpeg");
    assert_eq!((resized.width(), resized.height()), (40, 10));
}

#[tokio::test]
async fn test_png_to_jpg() {
    let app = TestApp::new();

    let form = MultipartForm::new().file(
        "pngFile",
        "logo.png",
        "image/png",
        &image_bytes(12, 8, ImageFormat::Png),
    );
    let response = app.post_form("/convert-png-to-jpg", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/jpeg");
    let decoded = image::load_from_memory_with_format(&response.body, ImageFormat::Jpeg)
        .expect("decode jpeg");
    assert_eq!((decoded.width(), decoded.height()), (12, 8));
}

#[tokio::test]
async fn test_corrupt_png_fails_and_cleans_up() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("pngFile", "broken.png", "image/png", b"not a png at all");
    let response = app.post_form("/convert-png-to-jpg", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Conversion failed.");
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_image_to_pdf_page_matches_image() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.ghostscript = install_tool(bin, "gs", PASSTHROUGH_GS);
    });

    let form = MultipartForm::new().file(
        "imageFile",
        "scan.jpg",
        "image/jpeg",
        &image_bytes(120, 80, ImageFormat::Jpeg),
    );
    let response = app.post_form("/convert-jpg-to-pdf", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");

    let doc = Document::load_mem(&response.body).expect("parse pdf");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().expect("page");
    let media_box: Vec<i64> = doc
        .get_dictionary(page_id)
        .expect("page dict")
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .expect("media box")
        .iter()
        .map(|o| o.as_i64().expect("integer"))
        .collect();
    assert_eq!(media_box, vec![0, 0, 120, 80]);
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_image_to_pdf_downgrade_failure_message() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.ghostscript = install_tool(bin, "gs", FAILING_TOOL);
    });

    let form = MultipartForm::new().file(
        "imageFile",
        "scan.png",
        "image/png",
        &image_bytes(10, 10, ImageFormat::Png),
    );
    let response = app.post_form("/convert-jpg-to-pdf", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Failed to convert to PDF 1.4.");
    assert!(!response.text().contains("tool crashed"));
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_word_and_spreadsheet_render_then_downgrade() {
    let app = TestApp::new();

    for (route, field, name) in [
        ("/convert-word-to-pdf", "wordFile", "Letter.docx"),
        ("/convert-excel-to-pdf", "excelFile", "Budget 2024.xlsx"),
    ] {
        let form =
            MultipartForm::new().file(field, name, "application/octet-stream", b"PK\x03\x04");
        let response = app.post_form(route, form).await;

        assert_eq!(response.status, StatusCode::OK, "{route}");
        assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
        assert!(response.body.starts_with(b"%PDF-1.4"), "{route}");
    }
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_spreadsheet_render_failure_message() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.libreoffice = install_tool(bin, "libreoffice", FAILING_TOOL);
    });

    let form =
        MultipartForm::new().file("excelFile", "sheet.xlsx", "application/octet-stream", b"PK");
    let response = app.post_form("/convert-excel-to-pdf", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "LibreOffice conversion failed.");
}

#[tokio::test]
async fn test_pdf_to_word() {
    let app = TestApp::new();

    let form =
        MultipartForm::new().file("pdfFile", "contract.pdf", "application/pdf", ONE_PAGE_PDF);
    let response = app.post_form("/convert-pdf-to-word", form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=converted.docx"
    );
    assert!(response.body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_pdf_to_word_missing_output() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.python = install_tool(bin, "python", "#!/bin/sh\nexit 0\n");
    });

    let form =
        MultipartForm::new().file("pdfFile", "contract.pdf", "application/pdf", ONE_PAGE_PDF);
    let response = app.post_form("/convert-pdf-to-word", form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Converted file not found.");
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_pdf_to_jpg_and_compress() {
    let app = TestApp::new();

    let form = MultipartForm::new().file("pdfFile", "slides.pdf", "application/pdf", ONE_PAGE_PDF);
    let response = app.post_form("/convert-pdf-to-jpg", form).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/jpeg");
    assert!(response.body.starts_with(&[0xFF, 0xD8]));

    let form = MultipartForm::new().file("pdfFile", "slides.pdf", "application/pdf", ONE_PAGE_PDF);
    let response = app.post_form("/resize-pdf", form).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=compressed.pdf"
    );

    assert_eq!(app.scratch_entries(), 0);
}

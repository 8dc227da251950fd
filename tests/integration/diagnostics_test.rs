//! Integration tests for the dependency probe.

#![cfg(unix)]

mod helpers;

use axum::http::StatusCode;

use helpers::{TestApp, install_tool};

#[tokio::test]
async fn test_all_tools_healthy() {
    let app = TestApp::new();

    let response = app.get("/_diagnostics").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["ok"], true);
    assert!(body["checked_at"].is_string());

    let checks = &body["checks"];
    assert_eq!(checks["uploads_writable"], true);
    assert_eq!(checks["python_bin_exists"], true);
    assert_eq!(checks["python_script_exists"], true);
    assert_eq!(checks["gs"]["stdout"], "10.02.1");
    for tool in ["gs", "libreoffice", "pdftoppm", "pdf2docx"] {
        assert!(checks[tool]["error"].is_null(), "{tool} should pass");
    }
}

#[tokio::test]
async fn test_check_keys_match_published_names() {
    let app = TestApp::new();

    let body = app.get("/_diagnostics").await.json();
    let checks = body["checks"].as_object().expect("checks object");

    for key in [
        "uploads_writable",
        "python_bin_path",
        "python_bin_exists",
        "python_script_exists",
        "gs",
        "libreoffice",
        "pdftoppm",
        "pdf2docx",
    ] {
        assert!(checks.contains_key(key), "missing {key}");
    }
    assert!(!checks.contains_key("scratch_writable"));
}

#[tokio::test]
async fn test_missing_tool_flips_ok() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.pdftoppm = bin.join("not-installed").display().to_string();
    });

    let response = app.get("/_diagnostics").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["ok"], false);

    let checks = &body["checks"];
    assert!(checks["pdftoppm"]["error"].is_string());
    for tool in ["gs", "libreoffice", "pdf2docx"] {
        assert!(checks[tool]["error"].is_null(), "{tool} should still pass");
    }
}

#[tokio::test]
async fn test_missing_pdf2docx_module() {
    let app = TestApp::with_config(|config, bin| {
        config.tools.python = install_tool(
            bin,
            "python",
            "#!/bin/sh\necho \"ModuleNotFoundError: No module named 'pdf2docx'\" >&2\nexit 1\n",
        );
    });

    let body = app.get("/_diagnostics").await.json();

    assert_eq!(body["ok"], false);
    assert_eq!(body["checks"]["python_bin_exists"], true);
    assert!(
        body["checks"]["pdf2docx"]["stderr"]
            .as_str()
            .unwrap_or_default()
            .contains("pdf2docx")
    );
    assert!(body["checks"]["gs"]["error"].is_null());
}

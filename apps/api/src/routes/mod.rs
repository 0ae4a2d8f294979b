pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;

use crate::catalog::handlers as catalog;
use crate::errors::AppError;
use crate::finalize::handlers as finalize;
use crate::letter::handlers as letter;
use crate::proposal::handlers as proposal;
use crate::state::AppState;

/// Upper bound for request bodies; uploaded proposals are the largest.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route(
            "/services",
            get(catalog::handle_list_services).post(catalog::handle_create_service),
        )
        .route("/services/facets", get(catalog::handle_service_facets))
        // Proposal
        .route("/proposal", post(proposal::handle_compute_proposal))
        .route(
            "/proposal_letter/details",
            post(letter::handle_proposal_letter),
        )
        .route("/proposal/finalize", post(finalize::handle_finalize))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// A PDF download response with `Content-Disposition: attachment`.
pub fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    let disposition = HeaderValue::from_bytes(format!("attachment; filename=\"{safe}\"").as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"proposal.pdf\""));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::CatalogStore;
    use crate::config::Config;
    use crate::finalize::postprocess::PostProcessor;
    use crate::finalize::{Finalizer, PostProcessError};
    use crate::layout::{default_geometry, StandardFont};
    use crate::letter::CoverStamper;
    use crate::pdf::document::{load_bytes, page_ids};
    use crate::pdf::fixtures::{build_pdf, write_pdf, FixtureText};
    use crate::pdf::{find_text, FontSource};

    struct CopyProcessor;

    #[async_trait]
    impl PostProcessor for CopyProcessor {
        async fn process(&self, input: &Path, output: &Path) -> Result<(), PostProcessError> {
            tokio::fs::copy(input, output)
                .await
                .map(|_| ())
                .map_err(|source| PostProcessError::Spawn {
                    program: "copy".into(),
                    source,
                })
        }

        fn name(&self) -> &str {
            "copy"
        }
    }

    struct MissingTool;

    #[async_trait]
    impl PostProcessor for MissingTool {
        async fn process(&self, _input: &Path, _output: &Path) -> Result<(), PostProcessError> {
            Err(PostProcessError::NotFound {
                program: "gs".into(),
            })
        }

        fn name(&self) -> &str {
            "missing"
        }
    }

    fn test_config(root: &Path) -> Config {
        Config {
            port: 0,
            rust_log: "debug".into(),
            catalog_path: root.join("services.csv"),
            cover_template_path: root.join("cover.pdf"),
            terms_path: root.join("terms.pdf"),
            font_bold_path: root.join("bold.otf"),
            font_regular_path: root.join("regular.otf"),
            work_dir: root.to_path_buf(),
            postprocess_timeout: Duration::from_secs(5),
            ghostscript_path: None,
            geometry: default_geometry(),
        }
    }

    fn app_with(root: &Path, processor: Arc<dyn PostProcessor>) -> Router {
        let config = test_config(root);
        write_pdf(root, "cover.pdf", &[vec![FixtureText::new("Prepared for", 72.0, 700.0)]]);
        write_pdf(root, "terms.pdf", &[vec![FixtureText::new("Terms", 72.0, 700.0)]]);
        std::fs::write(
            &config.catalog_path,
            "category,service,price,billingCycle,scopeOfWork\nAudit,Statutory audit,50000,Annual,\nAudit,Tax audit,25000,Annual,\nTax,GST filing,1500,Monthly,Returns\n",
        )
        .unwrap();

        let state = AppState {
            catalog: Arc::new(CatalogStore::new(config.catalog_path.clone())),
            stamper: Arc::new(CoverStamper::new(
                config.cover_template_path.clone(),
                FontSource::Standard(StandardFont::HelveticaBold),
                config.geometry.stamp.clone(),
            )),
            finalizer: Arc::new(Finalizer::new(
                config.terms_path.clone(),
                FontSource::Standard(StandardFont::Helvetica),
                FontSource::Standard(StandardFont::HelveticaBold),
                config.geometry.clone(),
                config.work_dir.clone(),
                processor,
            )),
        };
        build_router(state)
    }

    fn app(root: &Path) -> Router {
        app_with(root, Arc::new(CopyProcessor))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(params: Option<Value>, file: Option<&[u8]>) -> Request<Body> {
        let boundary = "proposer-test-boundary";
        let mut body = Vec::new();
        if let Some(params) = params {
            body.extend_from_slice(
                format!("--{boundary}\r\nContent-Disposition: form-data; name=\"params\"\r\n\r\n{params}\r\n")
                    .as_bytes(),
            );
        }
        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"proposal.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(file);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/proposal/finalize")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn disposition(response: &Response) -> String {
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path()).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "proposer");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path()).oneshot(get_request("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "no route for /nowhere");
    }

    #[tokio::test]
    async fn test_list_services_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path()).oneshot(get_request("/services")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let ids: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["aud-1", "aud-2", "tax-3"]);
        assert_eq!(body[2]["billingCycle"], "Monthly");
    }

    #[tokio::test]
    async fn test_search_services_by_query() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(get_request("/services?q=gst"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "tax-3");
    }

    #[tokio::test]
    async fn test_service_facets() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(get_request("/services/facets"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["categories"], json!(["Audit", "Tax"]));
        assert_eq!(body["billingCycles"], json!(["Annual", "Monthly"]));
    }

    #[tokio::test]
    async fn test_create_service_returns_201_with_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/services",
                json!({"category": "Audit", "service": "Stock audit", "price": 12000, "billingCycle": "Annual"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["id"], "aud-4");
        assert_eq!(created["scopeOfWork"], "");

        let listed = body_json(app.oneshot(get_request("/services")).await.unwrap()).await;
        assert_eq!(listed.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_service_rejects_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request(
                "POST",
                "/services",
                json!({"category": " ", "service": "x", "price": 1, "billingCycle": "Annual"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_compute_proposal() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request(
                "POST",
                "/proposal",
                json!({
                    "client": {"name": "Acme Pvt Ltd"},
                    "proposal": {"preparedBy": "CA Office"},
                    "services": [
                        {"id": "aud-1", "category": "Audit", "service": "Statutory audit", "billingCycle": "Annual", "price": 100, "discountedPrice": 80},
                        {"id": "tax-3", "category": "Tax", "service": "GST filing", "billingCycle": "Monthly", "price": 50, "discountedPrice": null}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["total"], 130.0);
        assert_eq!(body["summary"]["count"], 2);
        assert_eq!(body["services"][1]["finalPrice"], 50.0);
        assert_eq!(body["proposal"]["preparedBy"], "CA Office");
    }

    #[tokio::test]
    async fn test_proposal_letter_download() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request(
                "POST",
                "/proposal_letter/details",
                json!({"name": "Acme Pvt Ltd", "PAN": "AAACA1234A"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(disposition(&response), "attachment; filename=\"Acme_Pvt_Ltd.pdf\"");

        let bytes = body_bytes(response).await;
        let doc = load_bytes(&bytes, "letter").unwrap();
        assert_eq!(find_text(&doc, page_ids(&doc)[0], "Acme Pvt Ltd").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_proposal_letter_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(json_request("POST", "/proposal_letter/details", json!({"name": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proposal_letter_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        std::fs::remove_file(dir.path().join("cover.pdf")).unwrap();
        let response = app
            .oneshot(json_request("POST", "/proposal_letter/details", json!({"name": "Acme"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "DOCUMENT_OPEN_ERROR");
    }

    #[tokio::test]
    async fn test_finalize_download() {
        let dir = tempfile::tempdir().unwrap();
        let proposal = build_pdf(&[
            vec![FixtureText::new("Cover", 72.0, 700.0)],
            vec![FixtureText::new("Services", 72.0, 700.0)],
        ]);
        let response = app(dir.path())
            .oneshot(multipart_request(
                Some(json!({"name": "Acme", "date": "01/04/2025", "entityType": "company"})),
                Some(&proposal),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(disposition(&response), "attachment; filename=\"Acme_proposal.pdf\"");

        let bytes = body_bytes(response).await;
        let doc = load_bytes(&bytes, "final").unwrap();
        let pages = page_ids(&doc);
        assert_eq!(pages.len(), 3);
        assert_eq!(find_text(&doc, pages[2], "Page 3 of 3").unwrap().len(), 1);

        let leftovers: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with("proposal-"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[tokio::test]
    async fn test_finalize_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(multipart_request(Some(json!({"name": "Acme"})), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_finalize_without_ghostscript() {
        let dir = tempfile::tempdir().unwrap();
        let proposal = build_pdf(&[vec![FixtureText::new("Cover", 72.0, 700.0)]]);
        let response = app_with(dir.path(), Arc::new(MissingTool))
            .oneshot(multipart_request(None, Some(&proposal)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "EXTERNAL_TOOL_MISSING");
    }

    #[test]
    fn test_pdf_attachment_strips_quotes() {
        let response = pdf_attachment("A \"B\".pdf", b"%PDF".to_vec());
        assert_eq!(disposition(&response), "attachment; filename=\"A B.pdf\"");
    }
}

//! HTTP surface: `GET /generate-grades` runs the whole pipeline per request

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::pipeline::GradePipeline;

pub const SUCCESS_MESSAGE: &str = "Grade sheet generated successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to generate grade sheet";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GradePipeline>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: String,
    pub file_path: String,
    pub students_processed: usize,
}

#[derive(Debug)]
pub enum AppError {
    Pipeline(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Pipeline(e) => error!("Error: {:#}", e),
        }

        let body = Json(serde_json::json!({ "error": FAILURE_MESSAGE }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-grades", get(generate_grades))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn generate_grades(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    info!("generate-grades called");

    let summary = state.pipeline.run().await.map_err(AppError::Pipeline)?;

    Ok(Json(GenerateResponse {
        message: SUCCESS_MESSAGE.to_string(),
        file_path: summary.file_path.display().to_string(),
        students_processed: summary.students_processed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::roll_numbers;
    use crate::pacer::RequestPacer;
    use crate::pipeline::tests::{alice_and_bob, FailingWriter, MemoryWriter};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(writer: Arc<dyn crate::exporter::SheetWriter>) -> Router {
        let pipeline = GradePipeline::new(
            Arc::new(alice_and_bob()),
            writer,
            RequestPacer::disabled(),
            roll_numbers(),
        );
        router(AppState {
            pipeline: Arc::new(pipeline),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generate_grades_success() {
        let writer = Arc::new(MemoryWriter::default());
        let (status, body) = get_json(app(writer.clone()), "/generate-grades").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(body["filePath"], "/tmp/studentGrades.xlsx");
        assert_eq!(body["studentsProcessed"], 2);

        let sheets = writer.sheets.lock().unwrap();
        assert_eq!(sheets[0].rows.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_grades_failure_is_generic() {
        let (status, body) = get_json(app(Arc::new(FailingWriter)), "/generate-grades").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": FAILURE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(Arc::new(MemoryWriter::default()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

//! Synthesis HTTP Handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{
    CheckSynthesisStatus, DeleteSynthesis, GetSynthesisAudio, GetSynthesisJob, ListSynthesisJobs,
    SubmitSynthesis, SynthesisMode, UploadTextFile,
};
use crate::domain::synthesis::{JobStatus, SynthesisJob};
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, StatusQuery, SubmitSynthesisRequest, SynthesisJobResponse,
    UploadTextFileResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 提交合成任务
///
/// 服务商失败时任务仍会落库，响应以错误形式返回并附带该记录
pub async fn submit_synthesis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitSynthesisRequest>,
) -> Result<Json<ApiResponse<SynthesisJobResponse>>, ApiError> {
    let mode = match req.mode.as_deref().map(str::trim) {
        None | Some("") => SynthesisMode::default(),
        Some(raw) => SynthesisMode::from_str(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown mode: {}", raw)))?,
    };

    let command = SubmitSynthesis {
        text: req.text,
        text_file_id: req.text_file_id,
        voice_id: req.voice_id,
        model: req.model,
        speed: req.speed,
        volume: req.vol,
        format: req.format,
        mode,
        key_id: req.key_id,
    };

    let job = state.submit_synthesis_handler.handle(command).await?;

    if job.status() == JobStatus::Failed {
        let prefix = match mode {
            SynthesisMode::Async => "Async Submit Failed",
            SynthesisMode::Sync => "Synthesis Failed",
        };
        return Err(failed_job_error(prefix, &job));
    }

    Ok(Json(ApiResponse::success(SynthesisJobResponse::from(&job))))
}

fn failed_job_error(prefix: &str, job: &SynthesisJob) -> ApiError {
    let message = format!("{}: {}", prefix, job.error_detail().unwrap_or("unknown error"));
    match serde_json::to_value(SynthesisJobResponse::from(job)) {
        Ok(record) => ApiError::SynthesisFailed {
            message,
            job: record,
        },
        Err(e) => ApiError::Internal(format!("{} ({})", message, e)),
    }
}

/// 上传长文本文件（.txt / .zip），返回可用于异步合成的 text_file_id
pub async fn upload_text_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadTextFileResponse>>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut key_id: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                file = Some((filename, data));
            }
            "key_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read key_id: {}", e)))?;
                key_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::BadRequest(format!("Invalid key_id: {}", raw)))?,
                );
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    let uploaded = state
        .upload_text_file_handler
        .handle(UploadTextFile {
            filename,
            data,
            key_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(UploadTextFileResponse::from(
        uploaded,
    ))))
}

/// 合成历史（按创建时间倒序）
pub async fn list_synthesis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SynthesisJobResponse>>>, ApiError> {
    let jobs = state.list_synthesis_handler.handle(ListSynthesisJobs).await?;
    Ok(Json(ApiResponse::success(
        jobs.iter().map(SynthesisJobResponse::from).collect(),
    )))
}

/// 任务详情（只读）
pub async fn get_synthesis(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<Json<ApiResponse<SynthesisJobResponse>>, ApiError> {
    let job = state
        .get_synthesis_handler
        .handle(GetSynthesisJob { job_id })
        .await?;
    Ok(Json(ApiResponse::success(SynthesisJobResponse::from(&job))))
}

/// 检查任务状态，必要时下载产物
pub async fn check_synthesis_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<SynthesisJobResponse>>, ApiError> {
    let job = state
        .check_status_handler
        .handle(CheckSynthesisStatus {
            job_id,
            key_id: query.key_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(SynthesisJobResponse::from(&job))))
}

/// 删除任务及其音频文件
pub async fn delete_synthesis(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_synthesis_handler
        .handle(DeleteSynthesis { job_id })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 下载任务音频
pub async fn download_synthesis_audio(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<Response, ApiError> {
    let audio = state
        .get_synthesis_audio_handler
        .handle(GetSynthesisAudio { job_id })
        .await?;

    let file = tokio::fs::File::open(&audio.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?
        .len();

    // 流式返回文件内容
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, audio.content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", audio.file_name),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use super::blob::BlobStorage;
use super::domain::{ApplicationId, DocumentId, StatusId, UserId, VerificationStatus};
use super::identity::IdentityProvider;
use super::repository::RegistryRepository;
use super::service::{
    CreateApplicationRequest, PaymentRequest, RegistryApplicationService, UploadDocumentRequest,
    WorkflowError,
};

/// Shared handler state: the workflow service plus the identity provider the
/// bearer header resolves through.
pub struct ApiContext<R, B, I> {
    pub service: Arc<RegistryApplicationService<R, B>>,
    pub identity: Arc<I>,
}

impl<R, B, I> Clone for ApiContext<R, B, I> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identity: Arc::clone(&self.identity),
        }
    }
}

/// Router builder exposing the citizen and officer surfaces of the workflow.
pub fn application_router<R, B, I>(context: ApiContext<R, B, I>) -> Router
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/user/applications",
            get(list_applications_handler::<R, B, I>).post(create_application_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/applications/:application_id",
            get(get_application_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/applications/:application_id/documents",
            get(list_application_documents_handler::<R, B, I>)
                .post(upload_document_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/documents",
            get(list_my_documents_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/documents/:document_id/download",
            get(download_document_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/payments",
            post(create_payment_handler::<R, B, I>),
        )
        .route(
            "/api/v1/user/payments/application/:application_id",
            get(list_payments_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/applications",
            get(list_all_applications_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/applications/:application_id",
            get(application_detail_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/status",
            post(update_status_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/logs",
            get(application_logs_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/documents",
            get(list_all_documents_handler::<R, B, I>),
        )
        .route(
            "/api/v1/admin/documents/:document_id/verify",
            post(verify_document_handler::<R, B, I>),
        )
        .with_state(context)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate<R, B, I>(
    context: &ApiContext<R, B, I>,
    headers: &HeaderMap,
) -> Result<UserId, WorkflowError>
where
    I: IdentityProvider,
{
    let token = bearer_token(headers).ok_or(WorkflowError::Unauthenticated)?;
    Ok(context.identity.resolve_bearer(token)?)
}

fn error_response(error: WorkflowError) -> Response {
    let status = match &error {
        WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::Conflict(_) => StatusCode::CONFLICT,
        WorkflowError::InvalidInput(_) | WorkflowError::InvalidStatus(_) => {
            StatusCode::BAD_REQUEST
        }
        WorkflowError::Unauthenticated => StatusCode::UNAUTHORIZED,
        WorkflowError::Forbidden => StatusCode::FORBIDDEN,
        WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "workflow operation failed");
        json!({ "error": "internal server error" })
    } else {
        json!({ "error": error.to_string() })
    };

    (status, axum::Json(body)).into_response()
}

pub(crate) async fn create_application_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateApplicationRequest>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.create_application(user_id, request) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_applications_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.list_applications(user_id) {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_application_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .get_application(user_id, ApplicationId(application_id))
    {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

/// JSON upload body; file content crosses the boundary base64-encoded.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadDocumentBody {
    pub(crate) document_type: String,
    pub(crate) file_name: String,
    #[serde(default)]
    pub(crate) content_type: Option<String>,
    #[serde(default)]
    pub(crate) content_base64: Option<String>,
}

pub(crate) async fn upload_document_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    axum::Json(body): axum::Json<UploadDocumentBody>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    let bytes = match body.content_base64 {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(_) => {
                return error_response(WorkflowError::InvalidInput(
                    "content_base64 is not valid base64".to_string(),
                ))
            }
        },
        None => Vec::new(),
    };

    let request = UploadDocumentRequest {
        document_type: body.document_type,
        file_name: body.file_name,
        content_type: body.content_type,
        bytes,
    };

    match context
        .service
        .upload_document(user_id, ApplicationId(application_id), request)
    {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_application_documents_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .list_application_documents(user_id, ApplicationId(application_id))
    {
        Ok(documents) => (StatusCode::OK, axum::Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_my_documents_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.list_my_documents(user_id) {
        Ok(documents) => (StatusCode::OK, axum::Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn download_document_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(document_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .download_document(user_id, DocumentId(document_id))
    {
        Ok(url) => (StatusCode::OK, axum::Json(json!({ "download_url": url }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_payment_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PaymentRequest>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.create_payment(user_id, request) {
        Ok(payment) => (StatusCode::CREATED, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_payments_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .list_payments(user_id, ApplicationId(application_id))
    {
        Ok(payments) => (StatusCode::OK, axum::Json(payments)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_all_applications_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.list_all_applications(user_id) {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_detail_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .application_detail(user_id, ApplicationId(application_id))
    {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateBody {
    pub(crate) status_id: u64,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
}

pub(crate) async fn update_status_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    axum::Json(body): axum::Json<StatusUpdateBody>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.update_status(
        user_id,
        ApplicationId(application_id),
        StatusId(body.status_id),
        body.remarks,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_logs_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context
        .service
        .application_logs(user_id, ApplicationId(application_id))
    {
        Ok(logs) => (StatusCode::OK, axum::Json(logs)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_all_documents_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.list_all_documents(user_id) {
        Ok(documents) => (StatusCode::OK, axum::Json(documents)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyDocumentBody {
    pub(crate) verification_status: VerificationStatus,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
}

pub(crate) async fn verify_document_handler<R, B, I>(
    State(context): State<ApiContext<R, B, I>>,
    headers: HeaderMap,
    Path(document_id): Path<u64>,
    axum::Json(body): axum::Json<VerifyDocumentBody>,
) -> Response
where
    R: RegistryRepository + 'static,
    B: BlobStorage + 'static,
    I: IdentityProvider + 'static,
{
    let user_id = match authenticate(&context, &headers) {
        Ok(user_id) => user_id,
        Err(error) => return error_response(error),
    };

    match context.service.verify_document(
        user_id,
        DocumentId(document_id),
        body.verification_status,
        body.remarks,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

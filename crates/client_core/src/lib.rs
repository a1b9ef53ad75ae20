use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response, StatusCode,
};
use shared::{
    domain::{Notification, Student, StudentDraft, StudentId},
    error::{ErrorResponse, FieldErrors},
    protocol::{self, StudentSearch, PHOTO_PART, STUDENT_PART},
};
use thiserror::Error;
use tracing::{debug, warn};

pub mod notify;
pub mod paging;
pub mod photo;
pub mod session;
pub mod toast;

pub use notify::{NotificationChannel, NotificationSink, Subscription};
pub use paging::{PageSize, PageSummary, PagedList, Pagination};
pub use photo::{PhotoRejection, PhotoUpload};
pub use session::{FormOutcome, ListStatus, StudentSession};
pub use toast::{Toast, ToastBoard};

const NETWORK_ERROR_TITLE: &str = "Network Error";
const INVALID_RESPONSE_TITLE: &str = "Invalid response";
const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
const PAYLOAD_TOO_LARGE_MESSAGE: &str =
    "Uploaded image is too large. Maximum allowed size is 2 MB.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to encode request: {0}")]
    Encode(String),
    /// A failed call. `notified` records whether a toast already went out.
    #[error("{title}: {message}")]
    Request {
        status: Option<u16>,
        title: String,
        message: String,
        notified: bool,
    },
    /// Per-field messages meant for inline display; never toasted.
    #[error("validation failed: {}", summarize_fields(.0))]
    Validation(FieldErrors),
    #[error(transparent)]
    Photo(#[from] PhotoRejection),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the user has already been told about this failure.
    pub fn was_notified(&self) -> bool {
        match self {
            ClientError::Request { notified, .. } => *notified,
            ClientError::Photo(_) => true,
            _ => false,
        }
    }
}

/// Field errors worth showing inline: the body is labelled as a validation
/// failure, or every parsed key names a draft field. Anything else, such as
/// `Student already exists with same email: a@b.c`, is an ordinary failure.
fn validation_fields(body: &ErrorResponse) -> Option<FieldErrors> {
    let fields = FieldErrors::parse(body.message.as_deref()?);
    if fields.is_empty() {
        return None;
    }
    let draft_fields_only = fields
        .iter()
        .all(|(field, _)| StudentDraft::WIRE_FIELDS.iter().any(|known| *known == field));
    (body.is_validation_failure() || draft_fields_only).then_some(fields)
}

fn summarize_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Photo bytes as served by `GET /student/photo/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentPhoto {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, ClientError>;
    async fn get_student(&self, id: &StudentId) -> Result<Student, ClientError>;
    async fn search_students(&self, query: &StudentSearch) -> Result<Vec<Student>, ClientError>;
    async fn add_student(
        &self,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError>;
    async fn update_student(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError>;
    async fn delete_student(&self, id: &StudentId) -> Result<(), ClientError>;
    async fn fetch_photo(&self, id: &StudentId) -> Result<StudentPhoto, ClientError>;
    async fn remove_photo(&self, id: &StudentId) -> Result<(), ClientError>;
    fn photo_url(&self, id: &StudentId) -> String;
}

/// Which kind of call failed; form submissions get validation parsing and
/// the upload-size message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Query,
    Submission,
}

pub struct StudentClient {
    http: Client,
    server_url: String,
    notifications: NotificationChannel,
}

impl StudentClient {
    pub fn new(
        server_url: impl Into<String>,
        notifications: NotificationChannel,
    ) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), server_url, notifications)
    }

    pub fn with_http(
        http: Client,
        server_url: impl Into<String>,
        notifications: NotificationChannel,
    ) -> Result<Self, ClientError> {
        let server_url = server_url.into();
        let trimmed = server_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&trimmed).map_err(|source| ClientError::InvalidUrl {
            url: server_url.clone(),
            source,
        })?;
        Ok(Self {
            http,
            server_url: trimmed,
            notifications,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.server_url)
    }

    async fn execute(&self, request: RequestBuilder, kind: CallKind) -> Result<Response, ClientError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(&err)),
        };

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "student api response");
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        Err(self.status_failure(status, &raw, kind))
    }

    async fn execute_json<T>(&self, request: RequestBuilder, kind: CallKind) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.execute(request, kind).await?;
        let status = response.status();
        response
            .json::<T>()
            .await
            .map_err(|err| self.decode_failure(status, &err))
    }

    fn transport_failure(&self, err: &reqwest::Error) -> ClientError {
        let message = match err.to_string() {
            text if text.is_empty() => GENERIC_ERROR_MESSAGE.to_string(),
            text => text,
        };
        warn!(error = %message, "student api call failed without a response");
        self.publish_failure(None, NETWORK_ERROR_TITLE.to_string(), message)
    }

    /// A success status whose body could not be read or decoded.
    fn decode_failure(&self, status: StatusCode, err: &reqwest::Error) -> ClientError {
        warn!(status = status.as_u16(), error = %err, "unreadable student api response");
        self.publish_failure(
            Some(status.as_u16()),
            INVALID_RESPONSE_TITLE.to_string(),
            err.to_string(),
        )
    }

    fn status_failure(&self, status: StatusCode, raw: &str, kind: CallKind) -> ClientError {
        let body = serde_json::from_str::<ErrorResponse>(raw).ok();

        if kind == CallKind::Submission {
            if let Some(fields) = body.as_ref().and_then(validation_fields) {
                debug!(status = status.as_u16(), fields = fields.len(), "server rejected form fields");
                return ClientError::Validation(fields);
            }
        }

        let server_message = body
            .as_ref()
            .and_then(ErrorResponse::best_message)
            .map(str::to_string)
            .or_else(|| Some(raw.trim().to_string()).filter(|text| !text.is_empty()));

        let message = if kind == CallKind::Submission && status == StatusCode::PAYLOAD_TOO_LARGE {
            PAYLOAD_TOO_LARGE_MESSAGE.to_string()
        } else {
            server_message.unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            })
        };

        warn!(status = status.as_u16(), error = %message, "student api call failed");
        self.publish_failure(
            Some(status.as_u16()),
            format!("Error {}", status.as_u16()),
            message,
        )
    }

    fn publish_failure(&self, status: Option<u16>, title: String, message: String) -> ClientError {
        self.notifications
            .publish(Notification::error(title.clone(), message.clone()));
        ClientError::Request {
            status,
            title,
            message,
            notified: true,
        }
    }

    fn student_form(
        &self,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Form, ClientError> {
        if let Some(photo) = photo {
            if let Err(rejection) = photo.validate() {
                self.notifications.publish(rejection.to_notification());
                return Err(rejection.into());
            }
        }

        let json = serde_json::to_vec(draft).map_err(|e| ClientError::Encode(e.to_string()))?;
        let student = Part::bytes(json)
            .mime_str("application/json")
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let mut form = Form::new().part(STUDENT_PART, student);

        if let Some(photo) = photo {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(&photo.content_type)
                .map_err(|e| ClientError::Encode(e.to_string()))?;
            form = form.part(PHOTO_PART, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl StudentApi for StudentClient {
    async fn list_students(&self) -> Result<Vec<Student>, ClientError> {
        let request = self.http.get(self.url(protocol::list_route()));
        let students: Option<Vec<Student>> = self.execute_json(request, CallKind::Query).await?;
        Ok(students.unwrap_or_default())
    }

    async fn get_student(&self, id: &StudentId) -> Result<Student, ClientError> {
        let request = self.http.get(self.url(&protocol::find_route(id)));
        self.execute_json(request, CallKind::Query).await
    }

    async fn search_students(&self, query: &StudentSearch) -> Result<Vec<Student>, ClientError> {
        let request = self
            .http
            .get(self.url(protocol::search_route()))
            .query(query);
        let students: Option<Vec<Student>> = self.execute_json(request, CallKind::Query).await?;
        Ok(students.unwrap_or_default())
    }

    async fn add_student(
        &self,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError> {
        let form = self.student_form(draft, photo)?;
        let request = self
            .http
            .post(self.url(protocol::add_route()))
            .multipart(form);
        self.execute_json(request, CallKind::Submission).await
    }

    async fn update_student(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError> {
        let form = self.student_form(draft, photo)?;
        let request = self
            .http
            .put(self.url(&protocol::update_route(id)))
            .multipart(form);
        self.execute_json(request, CallKind::Submission).await
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&protocol::delete_route(id)));
        self.execute(request, CallKind::Query).await?;
        Ok(())
    }

    async fn fetch_photo(&self, id: &StudentId) -> Result<StudentPhoto, ClientError> {
        let request = self.http.get(self.photo_url(id));
        let response = self.execute(request, CallKind::Query).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.decode_failure(status, &err))?;
        Ok(StudentPhoto {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn remove_photo(&self, id: &StudentId) -> Result<(), ClientError> {
        let request = self.http.delete(self.photo_url(id));
        self.execute(request, CallKind::Query).await?;
        Ok(())
    }

    fn photo_url(&self, id: &StudentId) -> String {
        self.url(&protocol::photo_route(id))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

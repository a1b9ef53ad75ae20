//! List and form behaviour on top of a [`StudentApi`]: what happens to the
//! page, the list status and the toasts when a call succeeds or fails.

use shared::{
    domain::{Notification, Student, StudentDraft, StudentId},
    error::FieldErrors,
    protocol::StudentSearch,
};
use tracing::{debug, info};

use crate::{
    notify::NotificationChannel,
    paging::{PageSize, PagedList},
    photo::{PhotoRejection, PhotoUpload},
    ClientError, StudentApi,
};

/// Tells an empty list apart from one that is still loading or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Saved(Student),
    /// Server-side validation messages, keyed by field, for inline display.
    FieldErrors(FieldErrors),
    /// A required field is empty; nothing was sent.
    Incomplete,
    /// Edit form matches the stored record and no new photo was chosen.
    Unchanged,
}

pub struct StudentSession<A: StudentApi> {
    api: A,
    notifications: NotificationChannel,
    list: PagedList<Student>,
    status: ListStatus,
}

impl<A: StudentApi> StudentSession<A> {
    pub fn new(api: A, notifications: NotificationChannel, page_size: PageSize) -> Self {
        Self {
            api,
            notifications,
            list: PagedList::new(page_size),
            status: ListStatus::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    pub fn list(&self) -> &PagedList<Student> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PagedList<Student> {
        &mut self.list
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    /// Fetches every record and shows the first page. On failure the
    /// previous collection stays in place.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        self.status = ListStatus::Loading;
        match self.api.list_students().await {
            Ok(students) => {
                debug!(count = students.len(), "loaded student list");
                self.list.set_collection(students);
                self.status = ListStatus::Ready;
                Ok(())
            }
            Err(err) => {
                self.status = ListStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Like [`reload`](Self::reload) but restricted to matching records.
    pub async fn search(&mut self, query: &StudentSearch) -> Result<(), ClientError> {
        self.status = ListStatus::Loading;
        match self.api.search_students(query).await {
            Ok(students) => {
                self.list.set_collection(students);
                self.status = ListStatus::Ready;
                Ok(())
            }
            Err(err) => {
                self.status = ListStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn view(&self, id: &StudentId) -> Result<Student, ClientError> {
        self.api.get_student(id).await
    }

    /// Deletes on the server, then drops the record locally without
    /// reloading; the page is pulled back if it no longer exists.
    pub async fn delete(&mut self, id: &StudentId) -> Result<(), ClientError> {
        if let Err(err) = self.api.delete_student(id).await {
            if !err.was_notified() {
                let title = err
                    .status()
                    .map(|status| format!("Error {status}"))
                    .unwrap_or_else(|| "Delete failed".to_string());
                self.notifications.publish(Notification::error(
                    title,
                    failure_message(&err, "Failed to delete"),
                ));
            }
            return Err(err);
        }

        let removed = self.list.remove_where(|student| student.student_id == *id);
        info!(student_id = %id, removed, "deleted student");
        Ok(())
    }

    /// Validates a picked photo, warning the user when it is rejected.
    pub fn choose_photo(&self, photo: PhotoUpload) -> Result<PhotoUpload, PhotoRejection> {
        match photo.validate() {
            Ok(()) => Ok(photo),
            Err(rejection) => {
                self.notifications.publish(rejection.to_notification());
                Err(rejection)
            }
        }
    }

    pub async fn submit_new(
        &self,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<FormOutcome, ClientError> {
        if !draft.is_complete() {
            return Ok(FormOutcome::Incomplete);
        }

        let result = self.api.add_student(draft, photo).await;
        let success = Notification::success(
            "Success",
            format!("Student {} added successfully!", draft.student_name),
        );
        self.finish_submission(result, success, "Failed to add student.")
    }

    /// `original` is the draft as loaded from the server; an identical
    /// draft with no new photo is not sent.
    pub async fn submit_update(
        &self,
        id: &StudentId,
        original: &StudentDraft,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<FormOutcome, ClientError> {
        if photo.is_none() && draft == original {
            return Ok(FormOutcome::Unchanged);
        }
        if !draft.is_complete() {
            return Ok(FormOutcome::Incomplete);
        }

        let result = self.api.update_student(id, draft, photo).await;
        let success = Notification::success(
            "Updated",
            format!("Student {} updated successfully!", draft.student_name),
        );
        self.finish_submission(result, success, "Failed to update student")
    }

    pub async fn remove_photo(&self, id: &StudentId) -> Result<(), ClientError> {
        self.api.remove_photo(id).await?;
        self.notifications.publish(Notification::success(
            "Photo removed",
            format!("Photo removed for student {id}"),
        ));
        Ok(())
    }

    fn finish_submission(
        &self,
        result: Result<Student, ClientError>,
        success: Notification,
        fallback: &str,
    ) -> Result<FormOutcome, ClientError> {
        match result {
            Ok(student) => {
                self.notifications.publish(success);
                Ok(FormOutcome::Saved(student))
            }
            Err(ClientError::Validation(fields)) => Ok(FormOutcome::FieldErrors(fields)),
            Err(err) => {
                if !err.was_notified() {
                    let title = err
                        .status()
                        .map(|status| format!("Error {status}"))
                        .unwrap_or_else(|| "Error".to_string());
                    self.notifications
                        .publish(Notification::error(title, failure_message(&err, fallback)));
                }
                Err(err)
            }
        }
    }
}

fn failure_message(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Request { message, .. } if !message.is_empty() => message.clone(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

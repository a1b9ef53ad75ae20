use super::*;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::StudentPhoto;

#[derive(Default)]
struct FakeApi {
    students: Mutex<Vec<Student>>,
    fail_list: Option<String>,
    fail_delete: Option<ClientError>,
    submit_error: Mutex<Option<ClientError>>,
    submissions: Mutex<Vec<StudentDraft>>,
}

impl FakeApi {
    fn with_students(count: usize) -> Self {
        let students = (0..count).map(|i| student(&format!("S-{i}"))).collect();
        Self {
            students: Mutex::new(students),
            ..Self::default()
        }
    }

    fn submissions(&self) -> usize {
        self.submissions.lock().expect("lock").len()
    }
}

fn student(id: &str) -> Student {
    Student {
        id: None,
        student_id: StudentId::from(id),
        student_name: format!("Student {id}"),
        student_city: "Pune".to_string(),
        student_email: format!("{id}@example.com"),
        student_phone: Some(1234567890),
        photo_file_name: None,
        photo_content_type: None,
        created_at: None,
        updated_at: None,
    }
}

fn draft(name: &str) -> StudentDraft {
    StudentDraft {
        student_name: name.to_string(),
        student_city: "Pune".to_string(),
        student_email: "asha@example.com".to_string(),
        student_phone: Some(9876543210),
    }
}

fn unnotified(status: Option<u16>, message: &str) -> ClientError {
    ClientError::Request {
        status,
        title: String::new(),
        message: message.to_string(),
        notified: false,
    }
}

#[async_trait]
impl StudentApi for FakeApi {
    async fn list_students(&self) -> Result<Vec<Student>, ClientError> {
        if let Some(message) = &self.fail_list {
            return Err(unnotified(Some(500), message));
        }
        Ok(self.students.lock().expect("lock").clone())
    }

    async fn get_student(&self, id: &StudentId) -> Result<Student, ClientError> {
        self.students
            .lock()
            .expect("lock")
            .iter()
            .find(|s| s.student_id == *id)
            .cloned()
            .ok_or_else(|| unnotified(Some(404), "not found"))
    }

    async fn search_students(&self, query: &StudentSearch) -> Result<Vec<Student>, ClientError> {
        let needle = query.name.clone().unwrap_or_default();
        Ok(self
            .students
            .lock()
            .expect("lock")
            .iter()
            .filter(|s| s.student_name.contains(&needle))
            .cloned()
            .collect())
    }

    async fn add_student(
        &self,
        draft: &StudentDraft,
        _photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError> {
        self.submissions.lock().expect("lock").push(draft.clone());
        if let Some(err) = self.submit_error.lock().expect("lock").take() {
            return Err(err);
        }
        let mut saved = student("S-new");
        saved.student_name = draft.student_name.clone();
        Ok(saved)
    }

    async fn update_student(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<Student, ClientError> {
        let mut saved = self.add_student(draft, photo).await?;
        saved.student_id = id.clone();
        Ok(saved)
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), ClientError> {
        if let Some(ClientError::Request {
            status, message, ..
        }) = &self.fail_delete
        {
            return Err(unnotified(*status, message));
        }
        self.students
            .lock()
            .expect("lock")
            .retain(|s| s.student_id != *id);
        Ok(())
    }

    async fn fetch_photo(&self, _id: &StudentId) -> Result<StudentPhoto, ClientError> {
        Ok(StudentPhoto {
            content_type: Some("image/png".to_string()),
            bytes: vec![1],
        })
    }

    async fn remove_photo(&self, _id: &StudentId) -> Result<(), ClientError> {
        Ok(())
    }

    fn photo_url(&self, id: &StudentId) -> String {
        format!("http://backend.test/student/photo/{id}")
    }
}

type Recorded = Arc<Mutex<Vec<Notification>>>;

fn recording(channel: &NotificationChannel) -> (Recorded, crate::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let subscription = channel.register(move |n: &Notification| {
        sink_seen.lock().expect("lock").push(n.clone());
    });
    (seen, subscription)
}

fn new_session(api: FakeApi) -> (StudentSession<FakeApi>, Recorded, crate::Subscription) {
    let channel = NotificationChannel::new();
    let (seen, subscription) = recording(&channel);
    let session = StudentSession::new(api, channel, PageSize::default());
    (session, seen, subscription)
}

#[tokio::test]
async fn reload_shows_first_page_and_marks_ready() {
    let (mut session, _, _sub) = new_session(FakeApi::with_students(12));
    assert_eq!(session.status(), &ListStatus::Idle);

    session.reload().await.expect("reload");
    session.list_mut().go_to_page(3);
    session.reload().await.expect("reload again");

    assert_eq!(session.status(), &ListStatus::Ready);
    assert_eq!(session.list().current_page(), 1);
    assert_eq!(session.list().total_pages(), 3);
    assert_eq!(session.list().visible_window()[0].student_id, StudentId::from("S-0"));
}

#[tokio::test]
async fn failed_reload_keeps_previous_collection() {
    let (mut session, _, _sub) = new_session(FakeApi::with_students(4));
    session.reload().await.expect("reload");

    let mut failing = FakeApi::with_students(0);
    failing.fail_list = Some("database unavailable".to_string());
    let mut session = StudentSession {
        api: failing,
        ..session
    };

    session.reload().await.expect_err("reload fails");
    assert!(matches!(
        session.status(),
        ListStatus::Failed(message) if message.contains("database unavailable")
    ));
    assert_eq!(session.list().len(), 4);
}

#[tokio::test]
async fn empty_list_is_ready_not_failed() {
    let (mut session, _, _sub) = new_session(FakeApi::with_students(0));
    session.reload().await.expect("reload");
    assert_eq!(session.status(), &ListStatus::Ready);
    assert!(session.list().visible_window().is_empty());
    assert_eq!(session.list().total_pages(), 1);
}

#[tokio::test]
async fn deleting_only_item_on_last_page_moves_back() {
    let (mut session, seen, _sub) = new_session(FakeApi::with_students(11));
    session.reload().await.expect("reload");
    session.list_mut().go_to_page(3);

    session.delete(&StudentId::from("S-10")).await.expect("delete");

    assert_eq!(session.list().len(), 10);
    assert_eq!(session.list().current_page(), 2);
    assert!(seen.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn failed_delete_is_toasted_once_and_list_untouched() {
    let mut api = FakeApi::with_students(3);
    api.fail_delete = Some(unnotified(None, ""));
    let (mut session, seen, _sub) = new_session(api);
    session.reload().await.expect("reload");

    session
        .delete(&StudentId::from("S-1"))
        .await
        .expect_err("delete fails");

    assert_eq!(session.list().len(), 3);
    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title.as_deref(), Some("Delete failed"));
    assert_eq!(toasts[0].message, "Failed to delete");
}

#[tokio::test]
async fn failed_delete_with_status_uses_status_title() {
    let mut api = FakeApi::with_students(3);
    api.fail_delete = Some(unnotified(Some(500), "student is not present"));
    let (mut session, seen, _sub) = new_session(api);

    session
        .delete(&StudentId::from("S-1"))
        .await
        .expect_err("delete fails");

    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts[0].title.as_deref(), Some("Error 500"));
    assert_eq!(toasts[0].message, "student is not present");
}

#[tokio::test]
async fn successful_add_publishes_success_toast() {
    let (session, seen, _sub) = new_session(FakeApi::default());

    let outcome = session.submit_new(&draft("Asha"), None).await.expect("submit");

    assert!(matches!(outcome, FormOutcome::Saved(ref s) if s.student_name == "Asha"));
    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, shared::domain::NotificationKind::Success);
    assert_eq!(toasts[0].title.as_deref(), Some("Success"));
    assert_eq!(toasts[0].message, "Student Asha added successfully!");
}

#[tokio::test]
async fn incomplete_draft_is_not_sent() {
    let (session, seen, _sub) = new_session(FakeApi::default());
    let mut incomplete = draft("Asha");
    incomplete.student_city.clear();

    let outcome = session.submit_new(&incomplete, None).await.expect("submit");

    assert_eq!(outcome, FormOutcome::Incomplete);
    assert_eq!(session.api().submissions(), 0);
    assert!(seen.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn server_validation_is_returned_inline() {
    let api = FakeApi::default();
    *api.submit_error.lock().expect("lock") = Some(ClientError::Validation(FieldErrors::parse(
        "studentEmail: invalid",
    )));
    let (session, seen, _sub) = new_session(api);

    let outcome = session.submit_new(&draft("Asha"), None).await.expect("submit");

    let FormOutcome::FieldErrors(fields) = outcome else {
        panic!("expected field errors");
    };
    assert_eq!(fields.get("studentEmail"), Some("invalid"));
    assert!(seen.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn unnotified_submit_failure_gets_fallback_toast() {
    let api = FakeApi::default();
    *api.submit_error.lock().expect("lock") = Some(unnotified(None, ""));
    let (session, seen, _sub) = new_session(api);

    session
        .submit_new(&draft("Asha"), None)
        .await
        .expect_err("submit fails");

    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts[0].title.as_deref(), Some("Error"));
    assert_eq!(toasts[0].message, "Failed to add student.");
}

#[tokio::test]
async fn unchanged_update_is_skipped() {
    let (session, _, _sub) = new_session(FakeApi::default());
    let original = draft("Asha");

    let outcome = session
        .submit_update(&StudentId::from("S-1"), &original, &original.clone(), None)
        .await
        .expect("submit");

    assert_eq!(outcome, FormOutcome::Unchanged);
    assert_eq!(session.api().submissions(), 0);
}

#[tokio::test]
async fn update_with_new_photo_is_sent_even_if_fields_match() {
    let (session, seen, _sub) = new_session(FakeApi::default());
    let original = draft("Asha");
    let photo = PhotoUpload::new("asha.jpg", None, vec![1, 2]);

    let outcome = session
        .submit_update(&StudentId::from("S-1"), &original, &original, Some(&photo))
        .await
        .expect("submit");

    assert!(matches!(outcome, FormOutcome::Saved(ref s) if s.student_id == StudentId::from("S-1")));
    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts[0].title.as_deref(), Some("Updated"));
    assert_eq!(toasts[0].message, "Student Asha updated successfully!");
}

#[tokio::test]
async fn choose_photo_warns_on_rejection() {
    let (session, seen, _sub) = new_session(FakeApi::default());

    let rejected = session.choose_photo(PhotoUpload::new(
        "huge.png",
        None,
        vec![0; crate::photo::MAX_PHOTO_BYTES + 1],
    ));
    assert!(matches!(rejected, Err(PhotoRejection::TooLarge { .. })));

    let accepted = session.choose_photo(PhotoUpload::new("ok.gif", None, vec![0; 8]));
    assert!(accepted.is_ok());

    let toasts = seen.lock().expect("lock").clone();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, shared::domain::NotificationKind::Warning);
    assert_eq!(toasts[0].title.as_deref(), Some("File too large"));
}

#[tokio::test]
async fn search_replaces_collection_with_matches() {
    let (mut session, _, _sub) = new_session(FakeApi::with_students(12));
    session.reload().await.expect("reload");
    session.list_mut().go_to_page(2);

    session
        .search(&StudentSearch {
            name: Some("S-1".to_string()),
            ..StudentSearch::default()
        })
        .await
        .expect("search");

    // S-1, S-10, S-11
    assert_eq!(session.list().len(), 3);
    assert_eq!(session.list().current_page(), 1);
}

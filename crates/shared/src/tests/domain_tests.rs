use super::*;

fn sample_json() -> &'static str {
    r#"{
        "id": 4,
        "studentId": "STU-0004",
        "studentName": "Asha",
        "studentCity": "Pune",
        "studentEmail": "asha@example.com",
        "studentPhone": 9876543210,
        "photoFileName": "asha.png",
        "photoContentType": "image/png",
        "createdAt": "2024-03-01 09:15:00",
        "updatedAt": "2024-03-02 18:40:05"
    }"#
}

#[test]
fn deserializes_backend_record() {
    let student: Student = serde_json::from_str(sample_json()).expect("decode");
    assert_eq!(student.student_id, StudentId::from("STU-0004"));
    assert_eq!(student.student_phone, Some(9876543210));
    assert!(student.has_photo());
    let created = student.created_at.expect("created_at");
    assert_eq!(created.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-01 09:15:00");
}

#[test]
fn tolerates_missing_optional_fields() {
    let student: Student =
        serde_json::from_str(r#"{"studentId":"S1","studentName":"Bo","studentPhone":null}"#)
            .expect("decode");
    assert_eq!(student.student_city, "");
    assert_eq!(student.student_phone, None);
    assert_eq!(student.created_at, None);
    assert!(!student.has_photo());
}

#[test]
fn accepts_iso_timestamps() {
    let student: Student =
        serde_json::from_str(r#"{"studentId":"S1","createdAt":"2024-03-01T09:15:00"}"#)
            .expect("decode");
    assert!(student.created_at.is_some());
}

#[test]
fn draft_serializes_camel_case_with_null_phone() {
    let draft = StudentDraft {
        student_name: "Asha".into(),
        student_city: "Pune".into(),
        student_email: "asha@example.com".into(),
        student_phone: None,
    };
    let value = serde_json::to_value(&draft).expect("encode");
    assert_eq!(value["studentName"], "Asha");
    assert!(value["studentPhone"].is_null());
    assert!(!draft.is_complete());
}

#[test]
fn draft_from_student_copies_editable_fields() {
    let student: Student = serde_json::from_str(sample_json()).expect("decode");
    let draft = StudentDraft::from(&student);
    assert!(draft.is_complete());
    assert_eq!(draft.student_email, "asha@example.com");
}

#[test]
fn notification_display_title_falls_back_by_kind() {
    assert_eq!(
        Notification::new(NotificationKind::Error, "boom").display_title(),
        "Error"
    );
    assert_eq!(
        Notification::new(NotificationKind::Success, "ok").display_title(),
        "Info"
    );
    assert_eq!(
        Notification::warning("File too large", "x").display_title(),
        "File too large"
    );
}

#[test]
fn notification_uses_type_key_on_the_wire() {
    let value = serde_json::to_value(Notification::success("Success", "saved")).expect("encode");
    assert_eq!(value["type"], "success");
    assert_eq!(value["title"], "Success");
}

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Business identifier assigned by the backend (`studentId`), distinct from
/// the surrogate database key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl StudentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student_id: StudentId,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_city: String,
    #[serde(default)]
    pub student_email: String,
    #[serde(default)]
    pub student_phone: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_content_type: Option<String>,
    #[serde(
        default,
        with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,
}

impl Student {
    pub fn has_photo(&self) -> bool {
        self.photo_file_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }
}

/// Editable subset of a [`Student`], sent as the JSON `student` part of the
/// add/update multipart requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub student_name: String,
    pub student_city: String,
    pub student_email: String,
    pub student_phone: Option<i64>,
}

impl StudentDraft {
    /// JSON names of the editable fields, as used in validation messages.
    pub const WIRE_FIELDS: [&'static str; 4] =
        ["studentName", "studentCity", "studentEmail", "studentPhone"];

    /// All four fields must be filled before a draft can be submitted.
    pub fn is_complete(&self) -> bool {
        !self.student_name.is_empty()
            && !self.student_city.is_empty()
            && !self.student_email.is_empty()
            && self.student_phone.is_some()
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            student_name: student.student_name.clone(),
            student_city: student.student_city.clone(),
            student_email: student.student_email.clone(),
            student_phone: student.student_phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient user-facing message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            message: message.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message).with_title(title)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message).with_title(title)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message).with_title(title)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message).with_title(title)
    }

    /// Title shown to the user; untitled errors read "Error", everything else "Info".
    pub fn display_title(&self) -> &str {
        match (&self.title, self.kind) {
            (Some(title), _) if !title.is_empty() => title,
            (_, NotificationKind::Error) => "Error",
            _ => "Info",
        }
    }
}

/// Backend timestamps are local wall-clock times rendered as `yyyy-MM-dd HH:mm:ss`.
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|raw| {
            NaiveDateTime::parse_from_str(&raw, FORMAT)
                .or_else(|_| raw.parse::<NaiveDateTime>())
                .map_err(D::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

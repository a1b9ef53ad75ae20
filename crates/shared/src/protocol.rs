use serde::{Deserialize, Serialize};

use crate::domain::StudentId;

/// Query for `GET /student/search`. Omitted fields are not sent; the backend
/// returns every record when all three are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StudentSearch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

pub const STUDENT_PART: &str = "student";
pub const PHOTO_PART: &str = "photo";

pub fn list_route() -> &'static str {
    "/student/all"
}

pub fn search_route() -> &'static str {
    "/student/search"
}

pub fn add_route() -> &'static str {
    "/student/add"
}

pub fn find_route(id: &StudentId) -> String {
    format!("/student/search/id/{id}")
}

pub fn update_route(id: &StudentId) -> String {
    format!("/student/update/{id}")
}

pub fn delete_route(id: &StudentId) -> String {
    format!("/student/delete/{id}")
}

pub fn photo_route(id: &StudentId) -> String {
    format!("/student/photo/{id}")
}

//! Plain-text views of the student list, a single record and toasts.

use std::fmt::Write as _;

use client_core::{PageSummary, PagedList, Toast};
use shared::{
    domain::{NotificationKind, Student},
    error::FieldErrors,
};

const EMPTY_LIST: &str = "No students found";
const BLANK: &str = "-";

fn or_blank(value: &str) -> &str {
    if value.trim().is_empty() {
        BLANK
    } else {
        value
    }
}

fn phone_text(student: &Student) -> String {
    student
        .student_phone
        .map(|phone| phone.to_string())
        .unwrap_or_else(|| BLANK.to_string())
}

/// The visible window as a table; rows are numbered across pages.
pub fn student_table(list: &PagedList<Student>) -> String {
    let window = list.visible_window();
    if window.is_empty() {
        return format!("{EMPTY_LIST}\n");
    }

    let headers = ["#", "Photo", "ID", "Name", "City"];
    let rows: Vec<[String; 5]> = window
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            [
                (list.window_offset() + idx + 1).to_string(),
                if student.has_photo() { "yes" } else { BLANK }.to_string(),
                or_blank(student.student_id.as_str()).to_string(),
                or_blank(&student.student_name).to_string(),
                or_blank(&student.student_city).to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

pub fn page_footer(summary: PageSummary, current_page: usize, total_pages: usize) -> String {
    format!(
        "Total records: {} | Showing {} to {} | Page {} of {}",
        summary.total, summary.first, summary.last, current_page, total_pages
    )
}

pub fn list_view(list: &PagedList<Student>) -> String {
    let mut out = student_table(list);
    out.push_str(&page_footer(
        list.summary(),
        list.current_page(),
        list.total_pages(),
    ));
    out.push('\n');
    out
}

pub fn student_details(student: &Student, photo_url: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:      {}", or_blank(student.student_id.as_str()));
    let _ = writeln!(out, "Name:    {}", or_blank(&student.student_name));
    let _ = writeln!(out, "City:    {}", or_blank(&student.student_city));
    let _ = writeln!(out, "Email:   {}", or_blank(&student.student_email));
    let _ = writeln!(out, "Phone:   {}", phone_text(student));
    match (student.has_photo(), photo_url) {
        (true, Some(url)) => {
            let _ = writeln!(out, "Photo:   {url}");
        }
        _ => {
            let _ = writeln!(out, "Photo:   {BLANK}");
        }
    }
    if let Some(created) = student.created_at {
        let _ = writeln!(out, "Created: {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(updated) = student.updated_at {
        let _ = writeln!(out, "Updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }
    out
}

pub fn field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}

fn kind_marker(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "[i]",
        NotificationKind::Success => "[ok]",
        NotificationKind::Warning => "[!]",
        NotificationKind::Error => "[x]",
    }
}

pub fn toast_line(toast: &Toast) -> String {
    let notification = &toast.notification;
    format!(
        "{} {}: {}",
        kind_marker(notification.kind),
        notification.display_title(),
        notification.message
    )
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;

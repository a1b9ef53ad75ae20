use std::{
    io::Write,
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use client_core::{
    ClientError, FormOutcome, NotificationChannel, PageSize, PhotoUpload, StudentApi,
    StudentSession, Subscription, ToastBoard,
};
use shared::{
    domain::{StudentDraft, StudentId},
    protocol::StudentSearch,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::render;

const BROWSE_PROMPT: &str = "[n]ext [p]rev <page> size <n> [q]uit > ";
const BROWSE_HELP: &str = "n: next page, p: previous page, <number>: jump to page, \
size <3|5|10|15|20>: change page size, q: quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    Redraw,
    Next,
    Prev,
    /// Raw jump input; unusable values land on page 1.
    Page(String),
    Size(PageSize),
    Help,
    Invalid(String),
    Quit,
}

pub fn parse_browse_action(line: &str) -> BrowseAction {
    let line = line.trim();
    let mut words = line.split_whitespace();
    match words.next().map(str::to_ascii_lowercase).as_deref() {
        None => BrowseAction::Redraw,
        Some("n" | "next") => BrowseAction::Next,
        Some("p" | "prev") => BrowseAction::Prev,
        Some("q" | "quit" | "exit") => BrowseAction::Quit,
        Some("h" | "help" | "?") => BrowseAction::Help,
        Some("size") => match words.next().map(str::parse::<PageSize>) {
            Some(Ok(size)) => BrowseAction::Size(size),
            Some(Err(err)) => BrowseAction::Invalid(err.to_string()),
            None => BrowseAction::Invalid("size needs a value".to_string()),
        },
        Some(_) => BrowseAction::Page(line.to_string()),
    }
}

/// Optional replacements for an existing record; unset fields keep the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftEdits {
    pub name: Option<String>,
    pub city: Option<String>,
    pub email: Option<String>,
    pub phone: Option<i64>,
}

impl DraftEdits {
    pub fn apply(&self, original: &StudentDraft) -> StudentDraft {
        StudentDraft {
            student_name: self
                .name
                .clone()
                .unwrap_or_else(|| original.student_name.clone()),
            student_city: self
                .city
                .clone()
                .unwrap_or_else(|| original.student_city.clone()),
            student_email: self
                .email
                .clone()
                .unwrap_or_else(|| original.student_email.clone()),
            student_phone: self.phone.or(original.student_phone),
        }
    }
}

/// A session plus the toast board rendering its notifications. The board
/// stays attached to the channel until the console is dropped.
pub struct Console<A: StudentApi> {
    session: StudentSession<A>,
    toasts: ToastBoard,
    _subscription: Subscription,
}

impl<A: StudentApi> Console<A> {
    pub fn new(
        api: A,
        notifications: NotificationChannel,
        page_size: PageSize,
        toast_ttl: Duration,
    ) -> Self {
        let toasts = ToastBoard::new(toast_ttl);
        let subscription = toasts.attach(&notifications);
        Self {
            session: StudentSession::new(api, notifications, page_size),
            toasts,
            _subscription: subscription,
        }
    }

    pub fn session(&self) -> &StudentSession<A> {
        &self.session
    }

    /// Prints and clears every pending toast.
    pub fn flush_toasts<E: Write>(&self, err: &mut E) -> Result<()> {
        for toast in self.toasts.drain() {
            writeln!(err, "{}", render::toast_line(&toast))?;
        }
        Ok(())
    }

    /// Ends a command: flushes `out`, then prints pending toasts even if that
    /// flush failed. The command's own error takes precedence.
    pub fn finish<O: Write, E: Write>(
        &self,
        result: Result<()>,
        out: &mut O,
        err: &mut E,
    ) -> Result<()> {
        let flushed = out.flush().context("failed to flush output");
        let toasts = self.flush_toasts(err);
        result.and(flushed).and(toasts)
    }

    fn show_active_toasts<E: Write>(&self, err: &mut E) -> Result<()> {
        let now = Instant::now();
        self.toasts.prune(now);
        for toast in self.toasts.active(now) {
            writeln!(err, "{}", render::toast_line(&toast))?;
        }
        Ok(())
    }

    pub async fn list<O: Write>(
        &mut self,
        page: Option<String>,
        page_size: Option<PageSize>,
        out: &mut O,
    ) -> Result<()> {
        self.session.reload().await?;
        let list = self.session.list_mut();
        if let Some(size) = page_size {
            list.set_page_size(size);
        }
        if let Some(page) = page {
            list.go_to_page(page);
        }
        write!(out, "{}", render::list_view(self.session.list()))?;
        Ok(())
    }

    /// Interactive pager over the full list. Toasts are repeated under each
    /// redraw until they expire.
    pub async fn browse<R, O, E>(&mut self, input: R, out: &mut O, err: &mut E) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        O: Write,
        E: Write,
    {
        self.session.reload().await?;
        let mut lines = input.lines();

        loop {
            write!(out, "{}", render::list_view(self.session.list()))?;
            self.show_active_toasts(err)?;
            write!(out, "{BROWSE_PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let action = parse_browse_action(&line);
            debug!(?action, "browse input");
            let list = self.session.list_mut();
            match action {
                BrowseAction::Redraw => {}
                BrowseAction::Next => list.next_page(),
                BrowseAction::Prev => list.prev_page(),
                BrowseAction::Page(raw) => list.go_to_page(raw),
                BrowseAction::Size(size) => list.set_page_size(size),
                BrowseAction::Help => writeln!(out, "{BROWSE_HELP}")?,
                BrowseAction::Invalid(reason) => writeln!(err, "{reason}")?,
                BrowseAction::Quit => break,
            }
        }

        self.toasts.drain();
        writeln!(out)?;
        Ok(())
    }

    pub async fn show<O: Write>(&self, id: &StudentId, out: &mut O) -> Result<()> {
        let student = self.session.view(id).await?;
        let photo_url = self.session.api().photo_url(id);
        write!(out, "{}", render::student_details(&student, Some(&photo_url)))?;
        Ok(())
    }

    pub async fn add<O: Write>(
        &self,
        draft: StudentDraft,
        photo: Option<&Path>,
        out: &mut O,
    ) -> Result<()> {
        let photo = self.load_photo(photo).await?;
        let outcome = self.session.submit_new(&draft, photo.as_ref()).await?;
        report_outcome(outcome, out)
    }

    pub async fn update<O: Write>(
        &self,
        id: &StudentId,
        edits: &DraftEdits,
        photo: Option<&Path>,
        out: &mut O,
    ) -> Result<()> {
        let current = self.session.view(id).await?;
        let original = StudentDraft::from(&current);
        let draft = edits.apply(&original);
        let photo = self.load_photo(photo).await?;
        let outcome = self
            .session
            .submit_update(id, &original, &draft, photo.as_ref())
            .await?;
        report_outcome(outcome, out)
    }

    pub async fn delete<R, O>(
        &mut self,
        id: &StudentId,
        assume_yes: bool,
        mut input: R,
        out: &mut O,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        O: Write,
    {
        if !assume_yes {
            write!(
                out,
                "Are you sure you want to delete student with id {id}? \
                 This action cannot be undone. [y/N] "
            )?;
            out.flush()?;
            let mut answer = String::new();
            input.read_line(&mut answer).await?;
            if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                writeln!(out, "Delete aborted")?;
                return Ok(());
            }
        }

        self.session.delete(id).await?;
        writeln!(out, "Deleted student {id}")?;
        Ok(())
    }

    pub async fn save_photo<O: Write>(&self, id: &StudentId, dest: &Path, out: &mut O) -> Result<()> {
        let photo = self.session.api().fetch_photo(id).await?;
        tokio::fs::write(dest, &photo.bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
        writeln!(
            out,
            "Saved {} bytes ({}) to {}",
            photo.bytes.len(),
            photo.content_type.as_deref().unwrap_or("unknown type"),
            dest.display()
        )?;
        Ok(())
    }

    pub async fn remove_photo<O: Write>(&self, id: &StudentId, out: &mut O) -> Result<()> {
        self.session.remove_photo(id).await?;
        writeln!(out, "Removed photo of student {id}")?;
        Ok(())
    }

    pub async fn search<O: Write>(&mut self, query: &StudentSearch, out: &mut O) -> Result<()> {
        debug!(unfiltered = query.is_empty(), "searching students");
        self.session.search(query).await?;
        write!(out, "{}", render::list_view(self.session.list()))?;
        Ok(())
    }

    async fn load_photo(&self, path: Option<&Path>) -> Result<Option<PhotoUpload>> {
        let Some(path) = path else {
            return Ok(None);
        };
        let photo = PhotoUpload::from_file(path)
            .await
            .with_context(|| format!("failed to read photo {}", path.display()))?;
        let photo = self
            .session
            .choose_photo(photo)
            .map_err(ClientError::from)?;
        Ok(Some(photo))
    }
}

fn report_outcome<O: Write>(outcome: FormOutcome, out: &mut O) -> Result<()> {
    match outcome {
        FormOutcome::Saved(student) => {
            writeln!(out, "Saved student {}", student.student_id)?;
            Ok(())
        }
        FormOutcome::FieldErrors(errors) => {
            writeln!(out, "The server rejected some fields:")?;
            write!(out, "{}", render::field_errors(&errors))?;
            bail!("student was not saved")
        }
        FormOutcome::Incomplete => bail!("name, city, email and phone are all required"),
        FormOutcome::Unchanged => bail!("nothing to update: no field differs from the stored record"),
    }
}

/// Whether `err` still needs to be shown; failures already delivered as a
/// toast are not repeated.
pub fn needs_report(err: &anyhow::Error) -> bool {
    !err
        .downcast_ref::<ClientError>()
        .is_some_and(ClientError::was_notified)
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;

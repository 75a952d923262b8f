//! Local mirror of the lecture collection plus the add/edit form workflow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lectern_core::{
    validate_form, FormErrors, FormField, Lecture, LectureForm, LectureId, Toast, ToastSink,
};
use tracing::{info, warn};

use crate::client::LectureStore;
use crate::error::StoreError;

/// Result of [`LectureBook::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(Lecture),
    Updated(Lecture),
    /// Client-side validation failed; nothing was sent.
    Invalid(FormErrors),
    /// The store rejected the write; the cache is untouched.
    Failed(StoreError),
}

/// Shared view of whether a remote call is outstanding.
///
/// The book holds `&mut self` across its awaits, so other tasks (a renderer,
/// a spinner) watch a clone of this flag instead.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn enter(&self) -> LoadingGuard<'_> {
        self.0.store(true, Ordering::Release);
        LoadingGuard(self)
    }
}

/// Clears the flag when the call finishes or its future is dropped.
struct LoadingGuard<'a>(&'a LoadingFlag);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.store(false, Ordering::Release);
    }
}

/// Cached lectures, the current form and its per-field errors.
///
/// Every remote outcome is reported to the toast sink; the cache only changes
/// after the store confirms a write.
pub struct LectureBook {
    store: Arc<dyn LectureStore>,
    toasts: Arc<dyn ToastSink>,
    lectures: Vec<Lecture>,
    form: LectureForm,
    form_errors: FormErrors,
    loading: LoadingFlag,
}

impl LectureBook {
    pub fn new(store: Arc<dyn LectureStore>, toasts: Arc<dyn ToastSink>) -> Self {
        Self {
            store,
            toasts,
            lectures: Vec::new(),
            form: LectureForm::default(),
            form_errors: FormErrors::new(),
            loading: LoadingFlag::default(),
        }
    }

    pub fn lectures(&self) -> &[Lecture] {
        &self.lectures
    }

    pub fn form(&self) -> &LectureForm {
        &self.form
    }

    pub fn form_errors(&self) -> &FormErrors {
        &self.form_errors
    }

    /// True only while a remote call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// A handle that observes the loading state from other tasks.
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Replace the cache with the store's current collection.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let result = {
            let _loading = self.loading.enter();
            self.store.list().await
        };

        match result {
            Ok(lectures) => {
                info!(count = lectures.len(), "lectures loaded");
                self.lectures = lectures;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch lectures");
                self.toasts.show(Toast::error("Failed to fetch lectures"));
                Err(e)
            }
        }
    }

    /// Load an existing lecture into the form for editing.
    pub fn edit(&mut self, lecture: &Lecture) {
        self.form = LectureForm::from(lecture);
        self.form_errors = FormErrors::new();
    }

    /// Change one form field. A pending error on that field is cleared.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
        self.form_errors.clear_field(field);
    }

    pub fn reset_form(&mut self) {
        self.form = LectureForm::default();
        self.form_errors = FormErrors::new();
    }

    /// Validate the form, then create or update depending on whether it carries an id.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if let Err(errors) = validate_form(&self.form) {
            self.form_errors = errors.clone();
            self.toasts.show(Toast::error("Please fix form errors."));
            return SubmitOutcome::Invalid(errors);
        }
        self.form_errors = FormErrors::new();

        let fields = self.form.fields();
        let editing = self.form.id;
        let result = {
            let _loading = self.loading.enter();
            match editing {
                Some(id) => self.store.update(id, &fields).await,
                None => self.store.create(&fields).await,
            }
        };

        match result {
            Ok(lecture) if editing.is_some() => {
                info!(lecture_id = %lecture.id, "lecture updated");
                if let Some(slot) = self.lectures.iter_mut().find(|l| l.id == lecture.id) {
                    *slot = lecture.clone();
                }
                self.toasts.show(Toast::success("Lecture updated!"));
                self.reset_form();
                SubmitOutcome::Updated(lecture)
            }
            Ok(lecture) => {
                info!(lecture_id = %lecture.id, "lecture created");
                self.lectures.push(lecture.clone());
                self.toasts.show(Toast::success("Lecture added!"));
                self.reset_form();
                SubmitOutcome::Created(lecture)
            }
            Err(e) => {
                warn!(error = %e, "failed to save lecture");
                self.toasts.show(Toast::error("Error saving lecture."));
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Delete a lecture. Confirmation is the caller's job.
    pub async fn delete(&mut self, id: LectureId) -> Result<(), StoreError> {
        let result = {
            let _loading = self.loading.enter();
            self.store.delete(id).await
        };

        match result {
            Ok(()) => {
                info!(lecture_id = %id, "lecture deleted");
                self.lectures.retain(|l| l.id != id);
                self.toasts.show(Toast::success("Lecture deleted!"));
                Ok(())
            }
            Err(e) => {
                warn!(lecture_id = %id, error = %e, "failed to delete lecture");
                self.toasts.show(Toast::error("Failed to delete lecture."));
                Err(e)
            }
        }
    }
}

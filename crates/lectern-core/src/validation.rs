use regex::Regex;
use std::sync::LazyLock;

use crate::types::{parse_lecture_time, FormErrors, FormField, LectureForm};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Client-side checks run before any remote call is made.
///
/// Returns every failing field at once so the form can show all messages.
pub fn validate_form(form: &LectureForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    if form.teacher_name.trim().is_empty() {
        errors.insert(FormField::TeacherName, "Teacher name is required");
    }
    if form.lesson_name.trim().is_empty() {
        errors.insert(FormField::LessonName, "Lesson name is required");
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert(FormField::Email, "Email is required");
    } else if !EMAIL_RE.is_match(&form.email) {
        errors.insert(FormField::Email, "Invalid email format");
    }

    if form.time.trim().is_empty() {
        errors.insert(FormField::Time, "Time is required");
    } else if parse_lecture_time(&form.time).is_none() {
        errors.insert(FormField::Time, "Invalid time format");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> LectureForm {
        LectureForm {
            id: None,
            teacher_name: "Ms. A".to_string(),
            lesson_name: "Algebra".to_string(),
            email: "a@school.edu".to_string(),
            time: "2024-01-01T10:00".to_string(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate_form(&valid_form()).is_ok());
    }

    #[test]
    fn blank_teacher_name_is_required() {
        let mut form = valid_form();
        form.teacher_name = "   ".to_string();
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(errors.get(FormField::TeacherName), Some("Teacher name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate_form(&LectureForm::default()).unwrap_err();
        assert_eq!(errors.get(FormField::TeacherName), Some("Teacher name is required"));
        assert_eq!(errors.get(FormField::LessonName), Some("Lesson name is required"));
        assert_eq!(errors.get(FormField::Email), Some("Email is required"));
        assert_eq!(errors.get(FormField::Time), Some("Time is required"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["no-at-sign", "a@b", "a b@c.d", "@c.d", "a@.d x"] {
            let mut form = valid_form();
            form.email = bad.to_string();
            let errors = validate_form(&form).unwrap_err();
            assert_eq!(
                errors.get(FormField::Email),
                Some("Invalid email format"),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn unparseable_time_is_rejected() {
        let mut form = valid_form();
        form.time = "next tuesday".to_string();
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(errors.get(FormField::Time), Some("Invalid time format"));
    }
}

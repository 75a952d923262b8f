use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Store-assigned lecture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LectureId(pub i64);

impl LectureId {
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for LectureId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for LectureId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(LectureId)
            .map_err(|_| format!("invalid lecture id: {s}"))
    }
}

/// A lecture record as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub teacher_name: String,
    pub lesson_name: String,
    pub email: String,
    /// Raw scheduled-time value exactly as the store sent it.
    pub time: String,
}

impl Lecture {
    /// Dedup key for reminders. Derived from the raw time value, so a
    /// rescheduled lecture produces a fresh key.
    pub fn notification_key(&self) -> NotificationKey {
        NotificationKey::new(self.id, &self.time)
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        parse_lecture_time(&self.time)
    }

    pub fn fields(&self) -> LectureFields {
        LectureFields {
            teacher_name: self.teacher_name.clone(),
            lesson_name: self.lesson_name.clone(),
            email: self.email.clone(),
            time: self.time.clone(),
        }
    }
}

/// Request body for create and update: every field except the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureFields {
    pub teacher_name: String,
    pub lesson_name: String,
    pub email: String,
    pub time: String,
}

/// `{id}-{time}`: identifies one delivered reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationKey(pub String);

impl NotificationKey {
    pub fn new(id: LectureId, time: &str) -> Self {
        Self(format!("{}-{}", id, time))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a scheduled-time value.
///
/// Accepts RFC 3339, minute-precision UTC (`2024-01-01T10:00Z`) and the naive
/// `datetime-local` shapes (`2024-01-01T10:00`, `2024-01-01T10:00:00`), the
/// latter interpreted as UTC.
pub fn parse_lecture_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%MZ",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Editable form state. `id` is set when an existing lecture is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureForm {
    pub id: Option<LectureId>,
    pub teacher_name: String,
    pub lesson_name: String,
    pub email: String,
    pub time: String,
}

impl LectureForm {
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn fields(&self) -> LectureFields {
        LectureFields {
            teacher_name: self.teacher_name.clone(),
            lesson_name: self.lesson_name.clone(),
            email: self.email.clone(),
            time: self.time.clone(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::TeacherName => &self.teacher_name,
            FormField::LessonName => &self.lesson_name,
            FormField::Email => &self.email,
            FormField::Time => &self.time,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::TeacherName => self.teacher_name = value,
            FormField::LessonName => self.lesson_name = value,
            FormField::Email => self.email = value,
            FormField::Time => self.time = value,
        }
    }
}

impl From<&Lecture> for LectureForm {
    fn from(lecture: &Lecture) -> Self {
        Self {
            id: Some(lecture.id),
            teacher_name: lecture.teacher_name.clone(),
            lesson_name: lecture.lesson_name.clone(),
            email: lecture.email.clone(),
            time: lecture.time.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    TeacherName,
    LessonName,
    Email,
    Time,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::TeacherName,
        FormField::LessonName,
        FormField::Email,
        FormField::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::TeacherName => "teacher_name",
            FormField::LessonName => "lesson_name",
            FormField::Email => "email",
            FormField::Time => "time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::TeacherName => "Teacher Name",
            FormField::LessonName => "Lesson Name",
            FormField::Email => "Email",
            FormField::Time => "Time",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "teacher_name" => Ok(FormField::TeacherName),
            "lesson_name" => Ok(FormField::LessonName),
            "email" => Ok(FormField::Email),
            "time" => Ok(FormField::Time),
            other => Err(format!("unknown form field: {other}")),
        }
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn clear_field(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn algebra() -> Lecture {
        Lecture {
            id: LectureId(1),
            teacher_name: "Ms. A".to_string(),
            lesson_name: "Algebra".to_string(),
            email: "a@school.edu".to_string(),
            time: "2024-01-01T10:00Z".to_string(),
        }
    }

    #[test]
    fn notification_key_concatenates_id_and_raw_time() {
        assert_eq!(algebra().notification_key().as_str(), "1-2024-01-01T10:00Z");
    }

    #[test]
    fn notification_key_is_stable_for_same_id_and_time() {
        let mut other = algebra();
        other.lesson_name = "Geometry".to_string();
        assert_eq!(algebra().notification_key(), other.notification_key());
    }

    #[test]
    fn notification_key_changes_when_time_changes() {
        let mut moved = algebra();
        moved.time = "2024-01-01T11:00Z".to_string();
        assert_ne!(algebra().notification_key(), moved.notification_key());
    }

    #[test]
    fn parse_time_accepts_known_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_lecture_time("2024-01-01T10:00Z"), Some(expected));
        assert_eq!(parse_lecture_time("2024-01-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_lecture_time("2024-01-01T11:00:00+01:00"), Some(expected));
        assert_eq!(parse_lecture_time("2024-01-01T10:00"), Some(expected));
        assert_eq!(parse_lecture_time("2024-01-01T10:00:00"), Some(expected));
    }

    #[test]
    fn parse_time_rejects_garbage() {
        assert!(parse_lecture_time("").is_none());
        assert!(parse_lecture_time("tomorrow at ten").is_none());
    }

    #[test]
    fn lecture_wire_format() {
        let json = r#"{"id":7,"teacher_name":"Mr. B","lesson_name":"Chem","email":"b@x.io","time":"2024-02-01T09:30:00Z","room":"12"}"#;
        let lecture: Lecture = serde_json::from_str(json).unwrap();
        assert_eq!(lecture.id, LectureId(7));
        assert_eq!(lecture.time, "2024-02-01T09:30:00Z");

        let fields = serde_json::to_value(lecture.fields()).unwrap();
        assert!(fields.get("id").is_none(), "id must not be sent in the body");
        assert_eq!(fields["teacher_name"], "Mr. B");
    }

    #[test]
    fn form_from_lecture_enters_edit_mode() {
        let form = LectureForm::from(&algebra());
        assert!(form.is_edit());
        assert_eq!(form.value(FormField::LessonName), "Algebra");
        assert!(!LectureForm::default().is_edit());
    }

    #[test]
    fn form_errors_display_in_field_order() {
        let mut errors = FormErrors::new();
        errors.insert(FormField::Time, "Time is required");
        errors.insert(FormField::TeacherName, "Teacher name is required");
        assert_eq!(
            errors.to_string(),
            "teacher_name: Teacher name is required; time: Time is required"
        );
        errors.clear_field(FormField::Time);
        assert_eq!(errors.len(), 1);
    }
}

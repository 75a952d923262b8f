//! Plain-text rendering of the dashboard: lecture table, upcoming banner, toasts.

use lectern_core::{parse_lecture_time, Lecture, Toast, ToastLevel};
use lectern_reminders::UpcomingLesson;

const HEADERS: [&str; 5] = ["ID", "Teacher", "Lesson", "Email", "Time"];

/// `Jan 1, 2024, 10:00 AM` in UTC, hour always two digits. Unparseable times are shown as stored.
pub fn display_time(raw: &str) -> String {
    match parse_lecture_time(raw) {
        Some(at) => at.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

pub fn lecture_table(lectures: &[Lecture]) -> String {
    if lectures.is_empty() {
        return "No lectures available.\n".to_string();
    }

    let rows: Vec<[String; 5]> = lectures
        .iter()
        .map(|l| {
            [
                l.id.to_string(),
                l.teacher_name.clone(),
                l.lesson_name.clone(),
                l.email.clone(),
                display_time(&l.time),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").as_str());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// The "Upcoming Lessons" alert. Empty when there is nothing to show.
pub fn upcoming_banner(lessons: &[UpcomingLesson]) -> String {
    if lessons.is_empty() {
        return String::new();
    }
    let mut out = String::from("== Upcoming Lessons ==\n");
    for lesson in lessons {
        out.push_str(&format!(
            "  [{:>4}] {} by {}\n",
            lesson.countdown_label(),
            lesson.lecture.lesson_name,
            lesson.lecture.teacher_name
        ));
    }
    out.push_str("(type `clear` to dismiss)\n");
    out
}

pub fn toast_line(toast: &Toast) -> String {
    let tag = match toast.level {
        ToastLevel::Info => "INFO",
        ToastLevel::Success => " OK ",
        ToastLevel::Error => "FAIL",
    };
    format!("[{tag}] {}", toast.message)
}

//! Plain-text rendering of controller state.

use std::fmt::Write as _;

use client_core::{directory::format_created_at, DirectoryState, FormState};
use shared::domain::{total_pages, PageResult, Record};

pub fn render_form(state: &FormState) -> String {
    let mut out = String::from("== register ==\n");
    if let Some(message) = &state.success_message {
        let _ = writeln!(out, "ok: {message}");
    }
    if let Some(error) = &state.general_error {
        let _ = writeln!(out, "error: {error}");
    }
    for (field, value) in [
        ("username", &state.draft.username),
        ("age", &state.draft.age),
    ] {
        let _ = write!(out, "{field:<9}{value}");
        if let Some(error) = state.field_error(field) {
            let _ = write!(out, "  ! {error}");
        }
        out.push('\n');
    }
    // the store may report errors on fields the form does not show
    for (field, error) in &state.field_errors {
        if field != "username" && field != "age" {
            let _ = writeln!(out, "{field}: {error}");
        }
    }
    let submit = if state.submitting {
        "submitting..."
    } else if state.can_submit() {
        "ready"
    } else {
        "incomplete"
    };
    let _ = writeln!(out, "submit: {submit}");
    out
}

pub fn render_directory(state: &DirectoryState) -> String {
    let mut out = String::from("== directory ==\n");
    if !state.keyword.is_empty() {
        let _ = writeln!(out, "search: {}", state.keyword);
    }
    if state.loading {
        out.push_str("loading...\n");
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {error}");
        return out;
    }
    out.push_str(&render_rows(&state.records));
    let _ = writeln!(
        out,
        "{} records, page {} of {}",
        state.total,
        state.current_page,
        total_pages(state.total).max(1)
    );
    out
}

pub fn render_page(page: u32, result: &PageResult) -> String {
    let mut out = render_rows(&result.records);
    let _ = writeln!(
        out,
        "{} records, page {} of {}",
        result.pagination.total,
        page,
        result.total_pages().max(1)
    );
    out
}

pub fn render_record(record: &Record) -> String {
    format!(
        "id:         {}\nusername:   {}\nage:        {}\ncreated at: {}\n",
        record.id.0,
        record.username,
        record.age,
        format_created_at(&record.created_at)
    )
}

fn render_rows(records: &[Record]) -> String {
    if records.is_empty() {
        return "no records\n".to_string();
    }
    let mut out = format!("{:>6}  {:<20}  {:>3}  {}\n", "ID", "USERNAME", "AGE", "CREATED");
    for record in records {
        let _ = writeln!(
            out,
            "{:>6}  {:<20}  {:>3}  {}",
            record.id.0,
            record.username,
            record.age,
            format_created_at(&record.created_at)
        );
    }
    out
}

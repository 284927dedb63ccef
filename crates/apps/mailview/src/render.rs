//! Plain text rendering of widget frames

use chrono::{DateTime, Local, Utc};
use mailwidget::{ComposeFrame, DetailFrame, Filter, Frame, ListFrame, SortKey};
use std::fmt::Write;

const SENDER_WIDTH: usize = 28;
const SUBJECT_WIDTH: usize = 36;
const BODY_WIDTH: usize = 80;

pub fn render(frame: &Frame) -> String {
    match frame {
        Frame::List(list) => render_list(list),
        Frame::Detail(detail) => render_detail(detail),
        Frame::Compose(compose) => render_compose(compose),
    }
}

fn render_list(frame: &ListFrame) -> String {
    let mut out = String::new();

    let filters: Vec<String> = Filter::ALL
        .iter()
        .map(|&filter| {
            let label = format!("{} {}", filter, frame.page.badges.get(filter));
            if filter == frame.filter {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect();
    let _ = write!(out, "{}", filters.join(" "));
    if !frame.search_query.is_empty() {
        let _ = write!(out, "   search: {:?}", frame.search_query);
    }
    out.push('\n');

    let header = |key: SortKey, label: &str| {
        if key == frame.sort_by {
            format!("{} {}", label, frame.sort_dir.indicator())
        } else {
            label.to_string()
        }
    };
    let _ = writeln!(
        out,
        "  {:<4} {:<sw$} {:<jw$} {}",
        "id",
        header(SortKey::Sender, "From"),
        header(SortKey::Subject, "Subject"),
        header(SortKey::Date, "Date"),
        sw = SENDER_WIDTH,
        jw = SUBJECT_WIDTH,
    );

    if frame.page.rows.is_empty() {
        let _ = writeln!(out, "  (no mail)");
    }
    for row in &frame.page.rows {
        let marker = if row.seen { ' ' } else { '*' };
        let clip = if row.attachment_count > 0 {
            format!("@{}", row.attachment_count)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{} {:<4} {:<sw$} {:<jw$} {:<3} {}",
            marker,
            row.id.as_str(),
            truncate(&row.sender, SENDER_WIDTH),
            truncate(&row.subject, SUBJECT_WIDTH),
            clip,
            format_date(row.received_at),
            sw = SENDER_WIDTH,
            jw = SUBJECT_WIDTH,
        );
    }

    let _ = write!(
        out,
        "Page {}/{} - {} mails - {} per page {:?}",
        frame.page.page,
        frame.page.total_pages,
        frame.page.filtered_count,
        frame.page.page_size,
        frame.page_sizes
    );
    out
}

fn render_detail(frame: &DetailFrame) -> String {
    if frame.missing {
        return format!("Mail {} is no longer available. (close to go back)", frame.id);
    }

    let mut out = String::new();
    let _ = writeln!(out, "From:    {}", frame.sender);
    let _ = writeln!(out, "Subject: {}", frame.subject);
    let _ = writeln!(out, "Date:    {}", format_date(frame.received_at));
    let _ = writeln!(out, "{}", "-".repeat(40));
    if frame.loading {
        out.push_str("Loading...");
    } else if frame.is_full_body {
        out.push_str(&html_to_text(&frame.body));
    } else if frame.body.is_empty() {
        out.push_str("(no content)");
    } else {
        out.push_str(&frame.body);
    }
    out
}

fn render_compose(frame: &ComposeFrame) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "To:      {}", frame.to);
    let _ = writeln!(out, "Subject: {}", frame.subject);
    let _ = writeln!(out, "Body:");
    for line in frame.body.lines() {
        let _ = writeln!(out, "  {}", line);
    }
    let _ = writeln!(out, "Attachments:");
    for (slot, name) in frame.attachments.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", slot, name.as_deref().unwrap_or("(choose a file)"));
    }
    if frame.sending {
        out.push_str("Sending...");
    } else if let Some(error) = &frame.error {
        let _ = write!(out, "Error: {}", error);
    } else {
        out.push_str("Ready");
    }
    out
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Cut to `width` characters, marking the cut with `~`
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Convert an HTML body to wrapped plain text for the terminal
fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), BODY_WIDTH)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}

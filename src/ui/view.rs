use super::app::{ChatApp, Indicator};
use crate::api::Role;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the whole widget: header with status dots, message thread,
/// notification band, footer (and the help overlay when toggled).
pub fn draw(frame: &mut Frame, app: &ChatApp) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(3),    // thread
        Constraint::Length(1), // banner / toast
        Constraint::Length(1), // footer
    ])
    .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_thread(frame, app, chunks[1]);
    draw_notices(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    if app.show_help {
        draw_help(frame);
    }
}

fn indicator_span(label: &str, status: Indicator) -> Vec<Span<'static>> {
    let color = match status {
        Indicator::Unknown => Color::DarkGray,
        Indicator::Ready => Color::Green,
        Indicator::Error => Color::Red,
    };
    vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::raw(format!("{label}  ")),
    ]
}

fn draw_header(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let mut spans = vec![Span::styled(
        " Voice Chat ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    spans.extend(indicator_span("Mic", app.mic_status));
    spans.extend(indicator_span("API", app.api_status));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_thread(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.welcome_visible() {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from("Welcome! Press Space to record a voice message.").centered(),
            Line::from("The assistant will reply with text and speech.")
                .centered()
                .dim(),
        ]);
        frame.render_widget(welcome, inner);
        return;
    }

    // Pre-wrap to the viewport width so the thread can stay anchored to
    // the newest entry.
    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();

    for message in app.messages() {
        let (label, label_style, marker) = match message.role {
            Role::User => (
                "You",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                "🎤 voice",
            ),
            Role::Assistant => (
                "Assistant",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                "[p] replay",
            ),
        };

        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::raw("  "),
            Span::styled(message.local_time(), Style::default().dim()),
            Span::raw("  "),
            Span::styled(marker, Style::default().dim()),
        ]));

        for wrapped in wrap_to_width(&message.content, width) {
            lines.push(Line::from(wrapped));
        }
        lines.push(Line::from(""));
    }

    // Scroll to the bottom: show the newest lines that fit
    let height = inner.height as usize;
    let offset = lines.len().saturating_sub(height);
    let visible: Vec<Line> = lines.into_iter().skip(offset).collect();

    frame.render_widget(Paragraph::new(visible), inner);
}

fn draw_notices(frame: &mut Frame, app: &ChatApp, area: Rect) {
    if let Some(text) = app.banner_text() {
        let banner = Paragraph::new(Line::from(format!(" {text} ")))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(banner, area);
    } else if let Some(text) = app.toast_text() {
        let toast = Paragraph::new(Line::from(format!(" ✔ {text} ")))
            .style(Style::default().fg(Color::Black).bg(Color::Green));
        frame.render_widget(toast, area);
    }
}

fn draw_footer(frame: &mut Frame, app: &ChatApp, area: Rect) {
    if let Some(input) = &app.input {
        let prompt = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(input.as_str()),
            Span::styled("▌", Style::default().dim()),
        ]));
        frame.render_widget(prompt, area);
        return;
    }

    let mut spans = vec![Span::styled(
        format!(" {} ", app.status_text()),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if app.recording {
        spans.push(Span::styled(
            format!(" ● {} ", app.recording_duration),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::styled(
        " Space record · i type · p replay · c clear · h help · q quit",
        Style::default().dim(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 50, 12);
    frame.render_widget(Clear, area);

    let help = Paragraph::new(vec![
        Line::from("Voice Chat Help").bold().centered(),
        Line::from(""),
        Line::from("  Space   start / stop recording"),
        Line::from("  i       type a text message"),
        Line::from("  p       replay the last reply"),
        Line::from("  c       clear the conversation"),
        Line::from("  h       toggle this help"),
        Line::from("  q       quit"),
        Line::from(""),
        Line::from("Replies are spoken automatically.").dim(),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Help "));

    frame.render_widget(help, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Wrap text to fit within a given width, breaking on word boundaries.
/// Words longer than the width are hard-split so nothing gets clipped.
fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            for ch in word.chars() {
                if current_len == width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
        } else if current_len == 0 {
            current = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current);
            current = word.to_string();
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_respects_word_boundaries() {
        let lines = wrap_to_width("the quick brown fox jumps", 11);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn oversized_words_are_hard_split() {
        assert_eq!(wrap_to_width("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(
            wrap_to_width("hi abcdefgh yo", 4),
            vec!["hi", "abcd", "efgh", "yo"]
        );
    }

    #[test]
    fn wrapping_handles_degenerate_widths() {
        assert_eq!(wrap_to_width("hello", 0), vec!["hello"]);
        assert_eq!(wrap_to_width("", 10), vec![""]);
    }
}

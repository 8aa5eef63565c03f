use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode};
use super::prompt_area::wrap_lines;
use super::theme::Palette;
use crate::core::Thumbnail;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let p = app.theme.palette();
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(p.bg).fg(p.fg)),
        area,
    );

    let prompt_width = area.width.saturating_sub(2);
    let prompt_height = app.auto_grow.height(app.prompt.text(), prompt_width) + 2;
    let file_height = if app.screen.file_info_visible {
        app.screen
            .preview
            .as_ref()
            .map(|t| (t.pixels.height() as u16).div_ceil(2))
            .unwrap_or(1)
            .max(3)
            + 2
    } else {
        3
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title
            Constraint::Length(prompt_height), // Prompt
            Constraint::Length(file_height),   // Base image
            Constraint::Length(1),             // Generate button
            Constraint::Min(0),
            Constraint::Length(3),             // Status bar
            Constraint::Length(1),             // Help line
        ])
        .split(area);

    draw_title(frame, app, &p, chunks[0]);
    draw_prompt(frame, app, &p, chunks[1]);
    draw_file_info(frame, app, &p, chunks[2]);
    draw_generate_button(frame, app, &p, chunks[3]);
    draw_status(frame, app, &p, chunks[5]);
    draw_help(frame, app, &p, chunks[6]);

    if app.mode == AppMode::PickFile {
        draw_picker(frame, app, &p);
    }
    if app.screen.loading {
        draw_loading(frame, app, &p);
    } else if let Some(result) = &app.screen.result {
        draw_result(frame, app, &p, &result.image_url, result.message.as_deref());
    }
    if let Some(message) = &app.screen.alert {
        draw_alert(frame, &p, message);
    }
}

fn draw_title(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(24)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Gerador de Imagens",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - prompt to image", Style::default().fg(p.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent)),
    );
    frame.render_widget(title, chunks[0]);

    let toggle = Paragraph::new(format!("^T {}", app.theme.label()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(p.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.border)),
        );
    frame.render_widget(toggle, chunks[1]);
}

fn draw_prompt(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let width = area.width.saturating_sub(2);
    let visible = area.height.saturating_sub(2);
    let (row, col) = app.prompt.cursor_position(width);
    let scroll = row.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = wrap_lines(app.prompt.text(), width)
        .into_iter()
        .map(Line::from)
        .collect();

    let focused = app.mode == AppMode::Prompt && !app.has_overlay();
    let border = if focused { p.accent } else { p.border };

    let prompt = Paragraph::new(lines)
        .style(Style::default().fg(p.fg))
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Prompt"),
        );
    frame.render_widget(prompt, area);

    if focused {
        frame.set_cursor_position((area.x + 1 + col, area.y + 1 + row - scroll));
    }
}

fn draw_file_info(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.border))
        .title("Base image");

    if !app.screen.file_info_visible {
        let empty = Paragraph::new(Line::from(vec![
            Span::styled("No base image", Style::default().fg(p.muted)),
            Span::styled("  ^O attach", Style::default().fg(p.accent)),
        ]))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let thumb_width = app
        .screen
        .preview
        .as_ref()
        .map(|t| t.pixels.width() as u16 + 1)
        .unwrap_or(0);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(thumb_width), Constraint::Min(10)])
        .split(inner);

    if let Some(thumb) = &app.screen.preview {
        frame.render_widget(Paragraph::new(thumbnail_lines(thumb)), chunks[0]);
    }

    let mut details = vec![
        Line::from(Span::styled(
            app.screen.file_name.as_str(),
            Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(thumb) = &app.screen.preview {
        details.push(Line::from(Span::styled(
            format!("{}x{}", thumb.width, thumb.height),
            Style::default().fg(p.muted),
        )));
    }
    details.push(Line::from(Span::styled(
        "^X remove",
        Style::default().fg(p.error),
    )));

    frame.render_widget(Paragraph::new(details), chunks[1]);
}

/// Two pixel rows per cell using the upper half block
fn thumbnail_lines(thumb: &Thumbnail) -> Vec<Line<'static>> {
    let pixels = &thumb.pixels;
    let (width, height) = pixels.dimensions();

    (0..height)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span> = (0..width)
                .map(|x| {
                    let top = pixels.get_pixel(x, y);
                    let mut style = Style::default().fg(Color::Rgb(top[0], top[1], top[2]));
                    if y + 1 < height {
                        let bottom = pixels.get_pixel(x, y + 1);
                        style = style.bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                    }
                    Span::styled("▀", style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn draw_generate_button(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let style = if app.can_submit() {
        Style::default().fg(p.bg).bg(p.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.muted)
    };
    let button = Paragraph::new(Span::styled(" Enter  Generate image ", style));
    frame.render_widget(button, area);
}

fn draw_status(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let (message, style) = if app.screen.loading {
        ("Generating...".to_string(), Style::default().fg(Color::Yellow))
    } else if let Some(status) = &app.screen.status_message {
        (status.clone(), Style::default().fg(p.success))
    } else {
        ("Ready".to_string(), Style::default().fg(p.muted))
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.border))
                .title("Status"),
        );
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let help_text = if app.screen.alert.is_some() {
        "Enter/Esc: Dismiss"
    } else if app.screen.loading {
        "Ctrl+C: Quit"
    } else if app.screen.result.is_some() {
        "d: Download | Esc: Close"
    } else {
        match app.mode {
            AppMode::Prompt => "Enter: Generate | ^N: Newline | ^O: Attach | ^X: Remove | ^T: Theme | Esc: Quit",
            AppMode::PickFile => "Enter: Select | Esc: Cancel",
        }
    };

    let help = Paragraph::new(help_text).style(Style::default().fg(p.muted));
    frame.render_widget(help, area);
}

fn draw_picker(frame: &mut Frame, app: &App, p: &Palette) {
    let area = centered_rect(70, 3, frame.area());
    frame.render_widget(Clear, area);

    let input = Paragraph::new(app.picker_draft.as_str())
        .style(Style::default().fg(p.fg).bg(p.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.accent))
                .title("Base image path"),
        );
    frame.render_widget(input, area);

    let col = app.picker_draft.chars().count() as u16;
    frame.set_cursor_position((
        (area.x + 1 + col).min(area.right().saturating_sub(2)),
        area.y + 1,
    ));
}

fn draw_loading(frame: &mut Frame, app: &App, p: &Palette) {
    let area = centered_rect(40, 5, frame.area());
    frame.render_widget(Clear, area);

    let spinner = SPINNER[app.tick % SPINNER.len()];
    let loading = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Generating image...", spinner),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().bg(p.bg))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(loading, area);
}

fn draw_result(frame: &mut Frame, app: &App, p: &Palette, image_url: &str, message: Option<&str>) {
    let area = centered_rect(80, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(Span::styled(
        message.unwrap_or("Image generated"),
        Style::default().fg(p.success).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Image: ", Style::default().fg(p.muted)),
        Span::styled(image_url, Style::default().fg(p.fg)),
    ]));
    if let Some(path) = &app.downloaded {
        lines.push(Line::from(vec![
            Span::styled("Saved: ", Style::default().fg(p.muted)),
            Span::styled(path.display().to_string(), Style::default().fg(p.fg)),
        ]));
    }

    let result = Paragraph::new(lines)
        .style(Style::default().bg(p.bg))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.success))
                .title("Result"),
        );
    frame.render_widget(result, area);
}

fn draw_alert(frame: &mut Frame, p: &Palette, message: &str) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let alert = Paragraph::new(message)
        .style(Style::default().fg(p.fg).bg(p.bg))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.error))
                .title("Alert"),
        );
    frame.render_widget(alert, area);
}

/// Rectangle of `percent_x` width and `height` rows centred in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled).unwrap_or(u16::MAX).max(10).min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 7, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 7);
        assert_eq!(rect.x, 20);

        let tiny = centered_rect(60, 7, Rect::new(0, 0, 8, 3));
        assert!(tiny.width <= 8 && tiny.height <= 3);

        let wide = centered_rect(80, 9, Rect::new(0, 0, 1000, 50));
        assert_eq!(wide.width, 800);
        assert_eq!(wide.x, 100);
    }

    #[test]
    fn test_thumbnail_lines_pack_two_rows() {
        let thumb = Thumbnail {
            data_url: String::new(),
            width: 4,
            height: 3,
            pixels: RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])),
        };
        let lines = thumbnail_lines(&thumb);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 4);
    }
}

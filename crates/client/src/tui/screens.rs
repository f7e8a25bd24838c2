use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use mirra::Shape;

use crate::debug::DebugStats;
use crate::game::Session;
use crate::net::ConnectionState;
use crate::scene::{Color as Fill, RenderProxy};

const FALLBACK_SPAN: f64 = 1000.0;

/// Everything one frame of the board needs.
pub struct BoardView<'a> {
    pub session: &'a Session,
    pub stats: &'a DebugStats,
    /// `None` when no socket is attached.
    pub connection: Option<ConnectionState>,
}

pub fn render(frame: &mut Frame, view: &BoardView) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    render_board(frame, chunks[0], view.session);
    render_status(frame, chunks[1], view);

    let debug = Paragraph::new(view.session.debug_line()).style(Style::default().fg(Color::Yellow));
    frame.render_widget(debug, chunks[2]);

    if view.connection == Some(ConnectionState::Closed) {
        render_closed(frame, chunks[0]);
    }
}

fn render_board(frame: &mut Frame, area: Rect, session: &Session) {
    let registry = session.registry();
    let (x_bounds, y_bounds) = viewport(session);
    let overlay = registry.debug_overlay();
    let proxies = registry.draw_order();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Mirra ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(Marker::Braille)
        .background_color(to_color(registry.config().palette.board))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for proxy in &proxies {
                draw_proxy(ctx, proxy);
            }
            if overlay {
                for proxy in &proxies {
                    if let Some(text) = proxy.debug_text() {
                        let (x, y) = canvas_point(proxy.position.x, proxy.position.y);
                        ctx.print(
                            x,
                            y,
                            Span::styled(text.to_string(), Style::default().fg(Color::White)),
                        );
                    }
                }
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_proxy(ctx: &mut ratatui::widgets::canvas::Context, proxy: &RenderProxy) {
    let color = to_color(proxy.handle.fill);
    let (x, y) = canvas_point(proxy.position.x, proxy.position.y);

    match &proxy.handle.shape {
        Shape::Circle { radius } => ctx.draw(&Circle {
            x,
            y,
            radius: f64::from(*radius),
            color,
        }),
        Shape::Polygon { vertices } => {
            let points: Vec<(f64, f64)> = vertices
                .iter()
                .map(|v| canvas_point(proxy.position.x + v.x, proxy.position.y + v.y))
                .collect();
            for (i, &(x1, y1)) in points.iter().enumerate() {
                let (x2, y2) = points[(i + 1) % points.len()];
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                });
            }
        }
    }
}

/// Arena y grows downward, the canvas y upward.
fn canvas_point(x: f32, y: f32) -> (f64, f64) {
    (f64::from(x), -f64::from(y))
}

fn viewport(session: &Session) -> ([f64; 2], [f64; 2]) {
    if let Some(map) = session.map() {
        let r = f64::from(map.radius);
        return ([-r, r], [-r, r]);
    }

    let mount = session.mount_attributes();
    if let (Some(w), Some(h)) = (mount.board_width, mount.board_height) {
        return ([0.0, f64::from(w)], [-f64::from(h), 0.0]);
    }

    let (cx, cy) = session
        .registry()
        .get(session.player_id())
        .map(|p| canvas_point(p.position.x, p.position.y))
        .unwrap_or((0.0, 0.0));
    (
        [cx - FALLBACK_SPAN, cx + FALLBACK_SPAN],
        [cy - FALLBACK_SPAN, cy + FALLBACK_SPAN],
    )
}

fn render_status(frame: &mut Frame, area: Rect, view: &BoardView) {
    let registry = view.session.registry();
    let (socket, socket_color) = match view.connection {
        None => ("offline", Color::DarkGray),
        Some(ConnectionState::Connecting) => ("connecting", Color::Yellow),
        Some(ConnectionState::Open) => ("open", Color::Green),
        Some(ConnectionState::Closed) => ("closed", Color::Red),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" player {} ", view.session.player_id()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "| proxies {} | {:.0} fps | {:.1} snapshots/s | intents {} | socket ",
            registry.len(),
            view.stats.fps(),
            view.stats.snapshot_rate(),
            view.stats.intents_sent(),
        )),
        Span::styled(socket, Style::default().fg(socket_color)),
    ]);

    frame.render_widget(Paragraph::new(line).style(Style::default().fg(Color::White)), area);
}

fn render_closed(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(40, 5, area);
    frame.render_widget(Clear, dialog_area);

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            "Connection closed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("Esc Quit", Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(text, dialog_area);
}

fn to_color(fill: Fill) -> Color {
    let (r, g, b) = fill.rgb();
    Color::Rgb(r, g, b)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

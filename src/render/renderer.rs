use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::coach::CoachWarning;
use crate::game::{GameState, Position, SnakeColor};
use crate::metrics::GameMetrics;
use crate::session::GameSession;

const OPTION_WIDTH: u16 = 22;
const OPTION_HEIGHT: u16 = 3;
/// Rows above the first color option: title, blank, prompt, blank
const START_HEADER_ROWS: u16 = 4;

fn to_color(color: SnakeColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Where each selectable color button is drawn within `area`.
    ///
    /// Shared by drawing and mouse hit-testing so the two never disagree.
    /// Buttons that do not fit below the header are left out, so the result
    /// may be shorter than the option list on a small terminal.
    pub fn color_option_areas(area: Rect) -> Vec<Rect> {
        let count = SnakeColor::SELECTABLE.len() as u16;
        let total_height = START_HEADER_ROWS + count * OPTION_HEIGHT;
        let top = area.y + area.height.saturating_sub(total_height) / 2 + START_HEADER_ROWS;
        let width = OPTION_WIDTH.min(area.width);
        let left = area.x + (area.width - width) / 2;

        (0..count)
            .map(|i| Rect::new(left, top + i * OPTION_HEIGHT, width, OPTION_HEIGHT))
            .take_while(|rect| rect.bottom() <= area.bottom())
            .collect()
    }

    /// Index of the color button under a terminal cell, if any
    pub fn color_option_at(area: Rect, column: u16, row: u16) -> Option<usize> {
        Self::color_option_areas(area).iter().position(|rect| {
            column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
        })
    }

    pub fn render_start(&self, frame: &mut Frame, selected: usize) {
        let area = frame.area();
        let options = Self::color_option_areas(area);

        let header_top = options
            .first()
            .map_or(area.y, |first| first.y.saturating_sub(START_HEADER_ROWS));
        let header = Rect::new(area.x, header_top, area.width, START_HEADER_ROWS).intersection(area);
        let text = vec![
            Line::from(Span::styled(
                "Press SPACE to Start",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Select Snake Color:",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), header);

        for (i, (rect, color)) in options.iter().zip(SnakeColor::SELECTABLE).enumerate() {
            let border = if i == selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let button = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Gray)),
                Span::styled(
                    color.name(),
                    Style::default().fg(to_color(color)).add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(if i == selected {
                        BorderType::Double
                    } else {
                        BorderType::Plain
                    })
                    .border_style(border),
            );
            frame.render_widget(button, *rect);
        }
    }

    pub fn render_play(&self, frame: &mut Frame, session: &GameSession, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        let header = self.render_header(session, metrics);
        frame.render_widget(header, chunks[0]);

        let grid = self.render_grid(session);
        frame.render_widget(grid, chunks[1]);

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_header(&self, session: &GameSession, metrics: &GameMetrics) -> Paragraph<'_> {
        let state = session.state();
        let stats = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.high_score.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Power: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                if state.snake.powered_up {
                    state.snake.power_up_timer.to_string()
                } else {
                    "-".to_string()
                },
                Style::default().fg(Color::Blue),
            ),
        ]);

        Paragraph::new(vec![stats, Self::coach_line(session)]).alignment(Alignment::Center)
    }

    fn coach_line(session: &GameSession) -> Line<'static> {
        let (message, style) = match session.warning() {
            Some(_) => (
                CoachWarning::MESSAGE,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            None if session.coach_available() => ("", Style::default().fg(Color::White)),
            None => ("offline (no model yet)", Style::default().fg(Color::DarkGray)),
        };
        Line::from(vec![
            Span::styled("AI Coach: ", style),
            Span::styled(message, style),
        ])
    }

    fn render_grid(&self, session: &GameSession) -> Paragraph<'_> {
        let state = session.state();
        let config = session.config();
        let mut lines = Vec::with_capacity(config.rows() as usize);

        for row in 0..config.rows() {
            let spans: Vec<Span> = (0..config.columns())
                .map(|col| {
                    let pos = Position::new(col * config.cell_size, config.min_y() + row * config.cell_size);
                    Self::cell(state, pos)
                })
                .collect();
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn cell(state: &GameState, pos: Position) -> Span<'static> {
        let snake_color = to_color(state.snake.color);
        if pos == state.snake.head {
            Span::styled("■ ", Style::default().fg(snake_color).add_modifier(Modifier::BOLD))
        } else if state.snake.body.contains(&pos) {
            Span::styled("□ ", Style::default().fg(snake_color))
        } else if state.is_obstacle(pos) {
            Span::styled("▓ ", Style::default().fg(Color::Gray))
        } else if pos == state.food {
            Span::styled("O ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        } else if state.power_up.active && pos == state.power_up.position {
            Span::styled("★ ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(". ", Style::default().fg(Color::DarkGray))
        }
    }

    pub fn render_game_over(&self, frame: &mut Frame, score: i32, metrics: &GameMetrics) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    score.to_string(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.high_score.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled("Time: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
                Span::raw("    "),
                Span::styled("Coach warnings: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.warnings_raised.to_string(), Style::default().fg(Color::White)),
                Span::raw("    "),
                Span::styled("Ticks in danger: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.warned_ticks.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("SPACE", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(" to Restart", Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("ESC", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(" to Quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        let area = frame.area();
        let height = (text.len() as u16 + 2).min(area.height);
        let box_area = Rect::new(area.x, area.y + area.height.saturating_sub(height) / 2, area.width, height);

        let panel = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(panel, box_area);
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

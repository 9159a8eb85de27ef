use dragontris_engine::{GameSnapshot, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::widgets::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Full play screen: stats, board with overlays, and next-piece preview.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    snapshot: &'a GameSnapshot,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(snapshot: &'a GameSnapshot) -> Self {
        Self {
            snapshot,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    fn border_color(&self) -> Color {
        match self.snapshot.session_state {
            SessionState::NotStarted => color::GRAY,
            SessionState::Playing if self.snapshot.is_clearing() => color::CYAN,
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::LevelUp => color::GREEN,
            SessionState::GameOver => color::RED,
        }
    }

    fn popup(&self) -> Option<(Vec<String>, Style)> {
        let stats = &self.snapshot.stats;
        match self.snapshot.session_state {
            SessionState::NotStarted | SessionState::Playing => None,
            SessionState::Paused => Some((
                vec!["PAUSED".to_owned()],
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            SessionState::LevelUp => Some((
                vec![
                    format!("LEVEL {}", stats.level()),
                    "ENTER to continue".to_owned(),
                ],
                Style::new().fg(color::BLACK).bg(color::GREEN),
            )),
            SessionState::GameOver => Some((
                vec![
                    "GAME OVER!!".to_owned(),
                    format!("SCORE {}", stats.score()),
                    format!("TICKETS {}", stats.bonus_tickets()),
                ],
                Style::new().fg(color::WHITE).bg(color::RED),
            )),
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = self.border_color();
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = BoardDisplay::new(&snapshot.board)
            .falling_piece(snapshot.active_piece)
            .ghost(snapshot.ghost_piece)
            .clearing_rows(&snapshot.clearing_rows)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let next_panel = PieceDisplay::new()
            .piece(snapshot.next_piece)
            .block(panel("NEXT"));
        let stats = StatsDisplay::new(snapshot).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        if let Some((lines, style)) = self.popup() {
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let block = Block::new().style(style);
            let text = Text::from_iter(lines).style(style).centered();
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(height)), buf);
        }
    }
}

use std::iter;

use dragontris_engine::{BOARD_HEIGHT, BOARD_WIDTH, Board, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::view::widgets::CellDisplay;

#[derive(Debug, Clone, Copy)]
enum Overlay {
    None,
    Ghost(Piece),
    Falling(Piece),
}

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    clearing_rows: &'a [usize],
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            ghost: None,
            falling_piece: None,
            clearing_rows: &[],
            block: None,
        }
    }

    pub fn ghost(self, piece: Option<Piece>) -> Self {
        Self {
            ghost: piece,
            ..self
        }
    }

    pub fn falling_piece(self, piece: Option<Piece>) -> Self {
        Self {
            falling_piece: piece,
            ..self
        }
    }

    /// Rows drawn highlighted while the clear animation runs.
    pub fn clearing_rows(self, rows: &'a [usize]) -> Self {
        Self {
            clearing_rows: rows,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells(BOARD_WIDTH) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(BOARD_HEIGHT) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    fn overlays(&self) -> [[Overlay; BOARD_WIDTH]; BOARD_HEIGHT] {
        let mut overlays = [[Overlay::None; BOARD_WIDTH]; BOARD_HEIGHT];
        let pieces = [
            self.ghost.map(|piece| (piece, Overlay::Ghost(piece))),
            self.falling_piece.map(|piece| (piece, Overlay::Falling(piece))),
        ];
        for (piece, overlay) in pieces.into_iter().flatten() {
            for (x, y) in piece.occupied_positions() {
                let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };
                if let Some(slot) = overlays.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *slot = overlay;
                }
            }
        }
        overlays
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let overlays = self.overlays();

        let col_constraints = (0..BOARD_WIDTH).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..BOARD_HEIGHT).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<BOARD_HEIGHT>(&vertical)
            .into_iter()
            .map(|row| row.layout::<BOARD_WIDTH>(&horizontal));

        let rows = iter::zip(self.board.rows(), overlays);
        for (y, (grid_row, (row, overlay_row))) in iter::zip(grid_cells, rows).enumerate() {
            let clearing = self.clearing_rows.contains(&y);
            for (grid_cell, (cell, overlay)) in iter::zip(grid_row, iter::zip(row, overlay_row)) {
                let display = match overlay {
                    _ if clearing => CellDisplay::CLEARING,
                    Overlay::Falling(piece) => CellDisplay::piece(piece.kind()),
                    Overlay::Ghost(piece) if cell.is_empty() => CellDisplay::ghost(piece.kind()),
                    _ => CellDisplay::from_cell(*cell, true),
                };
                display.render(grid_cell, buf);
            }
        }
    }
}

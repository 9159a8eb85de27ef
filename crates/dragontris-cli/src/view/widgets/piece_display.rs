use dragontris_engine::{MAX_SHAPE_SIZE, PieceKind, PieceRotation};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::CellDisplay;

/// Preview of a single piece in its spawn orientation.
#[derive(Debug, Default)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

/// Bounding box of the occupied cells of `kind`: `(min_x, min_y, width, height)`.
fn spawn_bounds(kind: PieceKind) -> (i32, i32, u16, u16) {
    let shape = kind.shape(PieceRotation::SPAWN);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
    for (x, y) in shape.occupied_cells() {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let width = u16::try_from(max_x - min_x + 1).unwrap_or(0);
    let height = u16::try_from(max_y - min_y + 1).unwrap_or(0);
    (min_x, min_y, width, height)
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
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
        super::cells(MAX_SHAPE_SIZE) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(MAX_SHAPE_SIZE) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let (min_x, min_y, width, height) = spawn_bounds(piece);
        let piece_area = area.centered(
            Constraint::Length(width * CellDisplay::width()),
            Constraint::Length(height * CellDisplay::height()),
        );

        let horizontal =
            Layout::horizontal((0..width).map(|_| Constraint::Length(CellDisplay::width())))
                .flex(Flex::Center);
        let vertical =
            Layout::vertical((0..height).map(|_| Constraint::Length(CellDisplay::height())));
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal))
            .collect::<Vec<_>>();

        let occupied = CellDisplay::piece(piece);
        for (x, y) in piece.shape(PieceRotation::SPAWN).occupied_cells() {
            let cell = usize::try_from(y - min_y)
                .ok()
                .zip(usize::try_from(x - min_x).ok())
                .and_then(|(row, col)| grid_rows.get(row)?.get(col).copied());
            if let Some(cell) = cell {
                Widget::render(&occupied, cell, buf);
            }
        }
    }
}

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Largest bounding box edge of any piece shape.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

/// Draws each kind independently with equal probability.
///
/// There is no bag: long droughts of a single kind are possible and expected.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Returns the occupancy matrix of this kind in the given rotation.
    ///
    /// # Examples
    ///
    /// ```
    /// use dragontris_engine::{PieceKind, PieceRotation};
    ///
    /// let spawn = PieceKind::I.shape(PieceRotation::SPAWN);
    /// assert_eq!(spawn.occupied_cells().count(), 4);
    /// // I-piece spawns vertical and lies flat after one clockwise turn.
    /// assert!(spawn.occupied_cells().all(|(x, _)| x == 1));
    /// let turned = PieceKind::I.shape(PieceRotation::new(1));
    /// assert!(turned.occupied_cells().all(|(_, y)| y == 1));
    /// ```
    #[must_use]
    pub fn shape(self, rotation: PieceRotation) -> &'static ShapeMatrix {
        &PIECE_SHAPES[self as usize][rotation.index()]
    }

    /// Display color of the piece as an RGB triple.
    #[must_use]
    pub const fn color(self) -> (u8, u8, u8) {
        match self {
            PieceKind::I => (0x00, 0xe5, 0xff),
            PieceKind::J => (0x1e, 0x40, 0xaf),
            PieceKind::L => (0xd9, 0x77, 0x06),
            PieceKind::O => (0xfb, 0xbf, 0x24),
            PieceKind::S => (0x10, 0xb9, 0x81),
            PieceKind::T => (0x9f, 0x12, 0x39),
            PieceKind::Z => (0xef, 0x44, 0x44),
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use dragontris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use dragontris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('Z'), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Construction and rotation wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Occupancy matrix of a piece in one rotation.
///
/// Row 0 is the top of the bounding box. Only the `rows × cols` top-left
/// corner of the backing array is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    #[expect(clippy::cast_possible_truncation)]
    const fn from_bits<const R: usize, const C: usize>(bits: [[u8; C]; R]) -> Self {
        assert!(R <= MAX_SHAPE_SIZE && C <= MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < R {
            let mut c = 0;
            while c < C {
                cells[r][c] = bits[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: R as u8,
            cols: C as u8,
            cells,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Returns whether the cell at (`row`, `col`) is occupied.
    ///
    /// Cells outside the matrix are reported as unoccupied.
    #[must_use]
    pub const fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.cells[row][col]
    }

    /// Rotates the matrix 90° clockwise.
    ///
    /// An R×C matrix becomes C×R with `result[c][R - 1 - r] = self[r][c]`.
    #[must_use]
    pub const fn rotated_cw(&self) -> Self {
        let rows = self.rows();
        let cols = self.cols();
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < rows {
            let mut c = 0;
            while c < cols {
                cells[c][rows - 1 - r] = self.cells[r][c];
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Iterates occupied cells as `(dx, dy)` offsets from the top-left corner.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.cells[usize::from(r)][usize::from(c)])
                .map(move |c| (i32::from(c), i32::from(r)))
        })
    }
}

const fn shape_rotations(base: ShapeMatrix) -> [ShapeMatrix; 4] {
    let r1 = base.rotated_cw();
    let r2 = r1.rotated_cw();
    let r3 = r2.rotated_cw();
    [base, r1, r2, r3]
}

static PIECE_SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = [
    // I-piece
    shape_rotations(ShapeMatrix::from_bits([
        [0, 1, 0, 0],
        [0, 1, 0, 0],
        [0, 1, 0, 0],
        [0, 1, 0, 0],
    ])),
    // J-piece
    shape_rotations(ShapeMatrix::from_bits([[0, 1, 0], [0, 1, 0], [1, 1, 0]])),
    // L-piece
    shape_rotations(ShapeMatrix::from_bits([[0, 1, 0], [0, 1, 0], [0, 1, 1]])),
    // O-piece
    shape_rotations(ShapeMatrix::from_bits([[1, 1], [1, 1]])),
    // S-piece
    shape_rotations(ShapeMatrix::from_bits([[0, 1, 1], [1, 1, 0], [0, 0, 0]])),
    // T-piece
    shape_rotations(ShapeMatrix::from_bits([[0, 0, 0], [1, 1, 1], [0, 1, 0]])),
    // Z-piece
    shape_rotations(ShapeMatrix::from_bits([[1, 1, 0], [0, 1, 1], [0, 0, 0]])),
];

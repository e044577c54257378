use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ParseSquareError;

/// Column of the board, `a` through `h`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A, File::B, File::C, File::D,
        File::E, File::F, File::G, File::H,
    ];

    /// Zero-based index, `a` = 0.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<File> {
        Self::ALL.get(index).copied()
    }

    /// Shift by `delta` files. Leaving the board yields `None`, never a wrap.
    pub fn offset(self, delta: i8) -> Option<File> {
        let target = self.index() as i16 + delta as i16;
        if target < 0 {
            return None;
        }
        Self::from_index(target as usize)
    }

    /// Signed number of steps from `self` to `other`.
    pub fn difference(self, other: File) -> i8 {
        other.index() as i8 - self.index() as i8
    }

    pub fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }

    pub fn from_char(c: char) -> Option<File> {
        match c {
            'a'..='h' => Self::from_index(c as usize - 'a' as usize),
            _ => None,
        }
    }
}

/// Row of the board, `1` through `8`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub enum Rank {
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::R1, Rank::R2, Rank::R3, Rank::R4,
        Rank::R5, Rank::R6, Rank::R7, Rank::R8,
    ];

    /// Zero-based index, rank 1 = 0.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Rank> {
        Self::ALL.get(index).copied()
    }

    /// The rank as printed on the board (1..=8).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Rank> {
        match number {
            1..=8 => Self::from_index(number as usize - 1),
            _ => None,
        }
    }

    /// Shift by `delta` ranks. Leaving the board yields `None`, never a wrap.
    pub fn offset(self, delta: i8) -> Option<Rank> {
        let target = self.index() as i16 + delta as i16;
        if target < 0 {
            return None;
        }
        Self::from_index(target as usize)
    }

    /// Signed number of steps from `self` to `other`.
    pub fn difference(self, other: Rank) -> i8 {
        other.index() as i8 - self.index() as i8
    }
}

/// A board coordinate. Equality is by value, so squares work directly as keys.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Square {
    pub file: File,
    pub rank: Rank,
}

impl Square {
    pub const fn new(file: File, rank: Rank) -> Self {
        Square { file, rank }
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Some(Square {
            file: self.file.offset(df)?,
            rank: self.rank.offset(dr)?,
        })
    }

    /// Every square, rank 1 first, `a` to `h` within a rank.
    pub fn all() -> impl Iterator<Item = Square> {
        Rank::ALL
            .into_iter()
            .flat_map(|rank| File::ALL.into_iter().map(move |file| Square::new(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.number())
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(fc), Some(rc), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseSquareError::BadLength(s.to_string()));
        };
        let file = File::from_char(fc).ok_or(ParseSquareError::BadFile(fc))?;
        let rank = rc
            .to_digit(10)
            .and_then(|d| Rank::from_number(d as u8))
            .ok_or(ParseSquareError::BadRank(rc))?;
        Ok(Square::new(file, rank))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One of the eight unit steps a ray can take.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Direction {
    df: i8,
    dr: i8,
}

impl Direction {
    pub const NORTH: Direction = Direction { df: 0, dr: 1 };
    pub const SOUTH: Direction = Direction { df: 0, dr: -1 };
    pub const EAST: Direction = Direction { df: 1, dr: 0 };
    pub const WEST: Direction = Direction { df: -1, dr: 0 };
    pub const NORTH_EAST: Direction = Direction { df: 1, dr: 1 };
    pub const NORTH_WEST: Direction = Direction { df: -1, dr: 1 };
    pub const SOUTH_EAST: Direction = Direction { df: 1, dr: -1 };
    pub const SOUTH_WEST: Direction = Direction { df: -1, dr: -1 };

    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::EAST, Direction::WEST, Direction::NORTH, Direction::SOUTH,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NORTH_EAST, Direction::NORTH_WEST,
        Direction::SOUTH_EAST, Direction::SOUTH_WEST,
    ];
    pub const ALL: [Direction; 8] = [
        Direction::EAST, Direction::WEST, Direction::NORTH, Direction::SOUTH,
        Direction::NORTH_EAST, Direction::NORTH_WEST,
        Direction::SOUTH_EAST, Direction::SOUTH_WEST,
    ];

    /// Components must be in {-1, 0, 1} and not both zero.
    pub fn new(df: i8, dr: i8) -> Option<Direction> {
        let unit = (-1..=1).contains(&df) && (-1..=1).contains(&dr);
        (unit && (df, dr) != (0, 0)).then_some(Direction { df, dr })
    }

    pub fn step(self, from: Square) -> Option<Square> {
        from.offset(self.df, self.dr)
    }
}

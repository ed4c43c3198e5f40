// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The command stream: paired opcode and operand buffers.

use kurbo::{Line, Point, Rect, Vec2};
use stipple_core::buffer::TypedBuffer;
use stipple_core::intern::InternId;
use stipple_core::matrix::Matrix;
use stipple_core::stats::StatKind;

/// An instruction opcode.
///
/// Discriminants match [`StatKind`] so that every opcode has exactly one
/// stats category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Push a transform: `a b c d e f`.
    PushTransform = 0,
    /// Pop the most recent transform.
    PopTransform = 1,
    /// Switch style: `style_id`.
    SetStyle = 2,
    /// Set global opacity: `alpha`.
    SetOpacity = 3,
    /// `x y w h rx ry gx gy`.
    FillRect = 4,
    /// `x y w h rx ry gx gy`.
    StrokeRect = 5,
    /// Bounding rect `x y w h rx ry gx gy`.
    FillEllipse = 6,
    /// Bounding rect `x y w h rx ry gx gy`.
    StrokeEllipse = 7,
    /// `x1 y1 x2 y2 rx ry gx gy`.
    Line = 8,
    /// `image_id x y w h rx ry gx gy`.
    Image = 9,
    /// `text_id x y`.
    FillText = 10,
    /// `text_id x y`.
    StrokeText = 11,
}

impl Op {
    /// Number of `f64` operands the opcode consumes.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::PushTransform => 6,
            Self::PopTransform => 0,
            Self::SetStyle | Self::SetOpacity => 1,
            Self::FillRect
            | Self::StrokeRect
            | Self::FillEllipse
            | Self::StrokeEllipse
            | Self::Line => 8,
            Self::Image => 9,
            Self::FillText | Self::StrokeText => 3,
        }
    }

    /// Decodes an opcode byte.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::PushTransform,
            1 => Self::PopTransform,
            2 => Self::SetStyle,
            3 => Self::SetOpacity,
            4 => Self::FillRect,
            5 => Self::StrokeRect,
            6 => Self::FillEllipse,
            7 => Self::StrokeEllipse,
            8 => Self::Line,
            9 => Self::Image,
            10 => Self::FillText,
            11 => Self::StrokeText,
            _ => return None,
        })
    }

    /// The stats category this opcode is counted under.
    #[inline]
    #[must_use]
    pub const fn stat_kind(self) -> StatKind {
        match StatKind::from_u8(self as u8) {
            Some(kind) => kind,
            None => unreachable!(),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.stat_kind().name()
    }
}

/// Repetition of a draw on a grid.
///
/// The primitive is drawn `columns × rows` times; copy `(i, j)` is offset by
/// `(i · gap.x, j · gap.y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tiling {
    /// Copies along x.
    pub columns: u32,
    /// Copies along y.
    pub rows: u32,
    /// Offset between neighboring copies.
    pub gap: Vec2,
}

impl Tiling {
    /// A single copy.
    pub const NONE: Self = Self {
        columns: 1,
        rows: 1,
        gap: Vec2::ZERO,
    };

    /// Creates a grid of copies.
    #[must_use]
    pub const fn grid(columns: u32, rows: u32, gap: Vec2) -> Self {
        Self { columns, rows, gap }
    }

    /// Total number of copies.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Offsets of every copy, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.rows).flat_map(move |j| {
            (0..self.columns)
                .map(move |i| Vec2::new(f64::from(i) * self.gap.x, f64::from(j) * self.gap.y))
        })
    }

    fn operands(&self) -> [f64; 4] {
        [
            f64::from(self.columns),
            f64::from(self.rows),
            self.gap.x,
            self.gap.y,
        ]
    }

    fn from_operands(d: &[f64]) -> Self {
        Self {
            columns: count_operand(d[0]),
            rows: count_operand(d[1]),
            gap: Vec2::new(d[2], d[3]),
        }
    }
}

impl Default for Tiling {
    fn default() -> Self {
        Self::NONE
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "written from u32 counts; `as` saturates anything else"
)]
fn count_operand(value: f64) -> u32 {
    if !(value >= 0.0) {
        return 0;
    }
    value as u32
}

/// One decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// See [`Op::PushTransform`].
    PushTransform(Matrix),
    /// See [`Op::PopTransform`].
    PopTransform,
    /// See [`Op::SetStyle`].
    SetStyle(InternId),
    /// See [`Op::SetOpacity`].
    SetOpacity(f64),
    /// See [`Op::FillRect`].
    FillRect(Rect, Tiling),
    /// See [`Op::StrokeRect`].
    StrokeRect(Rect, Tiling),
    /// See [`Op::FillEllipse`].
    FillEllipse(Rect, Tiling),
    /// See [`Op::StrokeEllipse`].
    StrokeEllipse(Rect, Tiling),
    /// See [`Op::Line`].
    Line(Line, Tiling),
    /// See [`Op::Image`].
    Image(InternId, Rect, Tiling),
    /// See [`Op::FillText`].
    FillText(InternId, Point),
    /// See [`Op::StrokeText`].
    StrokeText(InternId, Point),
}

impl Command {
    /// The opcode this command is encoded with.
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::PushTransform(_) => Op::PushTransform,
            Self::PopTransform => Op::PopTransform,
            Self::SetStyle(_) => Op::SetStyle,
            Self::SetOpacity(_) => Op::SetOpacity,
            Self::FillRect(..) => Op::FillRect,
            Self::StrokeRect(..) => Op::StrokeRect,
            Self::FillEllipse(..) => Op::FillEllipse,
            Self::StrokeEllipse(..) => Op::StrokeEllipse,
            Self::Line(..) => Op::Line,
            Self::Image(..) => Op::Image,
            Self::FillText(..) => Op::FillText,
            Self::StrokeText(..) => Op::StrokeText,
        }
    }
}

/// Opcodes plus their operands, in emission order.
///
/// Each opcode consumes exactly [`Op::arity`] operands from `data`. Both
/// buffers keep their capacity across [`clear`](Self::clear).
#[derive(Clone, Debug, Default)]
pub struct CommandStream {
    ops: TypedBuffer<u8>,
    data: TypedBuffer<f64>,
}

impl CommandStream {
    /// Creates an empty stream.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: TypedBuffer::new(),
            data: TypedBuffer::new(),
        }
    }

    /// Empties both buffers, keeping capacity.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.data.clear();
    }

    /// Appends one instruction.
    pub(crate) fn push(&mut self, op: Op, operands: &[f64]) {
        debug_assert_eq!(operands.len(), op.arity(), "wrong arity for {}", op.name());
        self.ops.push(op as u8);
        self.data.push_multiple(operands);
    }

    pub(crate) fn push_rect(&mut self, op: Op, rect: Rect, tiling: Tiling) {
        let [rx, ry, gx, gy] = tiling.operands();
        self.push(
            op,
            &[rect.x0, rect.y0, rect.width(), rect.height(), rx, ry, gx, gy],
        );
    }

    pub(crate) fn push_line(&mut self, line: Line, tiling: Tiling) {
        let [rx, ry, gx, gy] = tiling.operands();
        self.push(
            Op::Line,
            &[line.p0.x, line.p0.y, line.p1.x, line.p1.y, rx, ry, gx, gy],
        );
    }

    pub(crate) fn push_image(&mut self, image: InternId, rect: Rect, tiling: Tiling) {
        let [rx, ry, gx, gy] = tiling.operands();
        self.push(
            Op::Image,
            &[
                image.to_f64(),
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                rx,
                ry,
                gx,
                gy,
            ],
        );
    }

    /// Number of instructions.
    #[inline]
    #[must_use]
    pub const fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Number of operands.
    #[inline]
    #[must_use]
    pub const fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Whether no instruction has been emitted.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Raw opcode bytes.
    #[must_use]
    pub fn ops(&self) -> &[u8] {
        self.ops.as_slice()
    }

    /// Raw operands.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        self.data.as_slice()
    }

    /// Decodes the stream.
    ///
    /// Decoding stops at the first unknown opcode or truncated operand list.
    /// Neither can be produced by the encoder.
    pub fn commands(&self) -> Commands<'_> {
        Commands {
            ops: self.ops.as_slice(),
            data: self.data.as_slice(),
            op_pos: 0,
            data_pos: 0,
        }
    }
}

/// Iterator over the decoded instructions of a [`CommandStream`].
#[derive(Clone, Debug)]
pub struct Commands<'a> {
    ops: &'a [u8],
    data: &'a [f64],
    op_pos: usize,
    data_pos: usize,
}

impl Iterator for Commands<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        let &raw = self.ops.get(self.op_pos)?;
        let Some(op) = Op::from_u8(raw) else {
            debug_assert!(false, "unknown opcode {raw}");
            return None;
        };
        let Some(d) = self.data.get(self.data_pos..self.data_pos + op.arity()) else {
            debug_assert!(false, "truncated operands for {}", op.name());
            return None;
        };
        self.op_pos += 1;
        self.data_pos += op.arity();

        let rect = |d: &[f64]| Rect::new(d[0], d[1], d[0] + d[2], d[1] + d[3]);
        let id = InternId::from_f64;
        Some(match op {
            Op::PushTransform => {
                Command::PushTransform(Matrix::new(d[0], d[1], d[2], d[3], d[4], d[5]))
            }
            Op::PopTransform => Command::PopTransform,
            Op::SetStyle => Command::SetStyle(id(d[0])?),
            Op::SetOpacity => Command::SetOpacity(d[0]),
            Op::FillRect => Command::FillRect(rect(d), Tiling::from_operands(&d[4..])),
            Op::StrokeRect => Command::StrokeRect(rect(d), Tiling::from_operands(&d[4..])),
            Op::FillEllipse => Command::FillEllipse(rect(d), Tiling::from_operands(&d[4..])),
            Op::StrokeEllipse => {
                Command::StrokeEllipse(rect(d), Tiling::from_operands(&d[4..]))
            }
            Op::Line => Command::Line(
                Line::new((d[0], d[1]), (d[2], d[3])),
                Tiling::from_operands(&d[4..]),
            ),
            Op::Image => Command::Image(
                id(d[0])?,
                rect(&d[1..]),
                Tiling::from_operands(&d[5..]),
            ),
            Op::FillText => Command::FillText(id(d[0])?, Point::new(d[1], d[2])),
            Op::StrokeText => Command::StrokeText(id(d[0])?, Point::new(d[1], d[2])),
        })
    }
}

//! Path data tokenizer
//!
//! Turns the `d` attribute of a path into a lazy stream of [`Instruction`]s.
//! Operand runs after a command letter are split into chunks of the
//! command's arity, each chunk becoming another instruction with the same
//! letter (extra moveto pairs become implicit lineto).

use crate::error::PathError;
use crate::types::Point;

/// Geometry carried by one instruction, in the coordinates written in the data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    HorizontalTo(f64),
    VerticalTo(f64),
    CurveTo {
        ctrl1: Point,
        ctrl2: Point,
        end: Point,
    },
    ClosePath,
}

/// A single drawing command with its operands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub segment: Segment,
    /// Lowercase command: operands are offsets from the pen position
    pub relative: bool,
    /// Byte offset in the path data where this instruction starts
    pub offset: usize,
}

impl Instruction {
    /// Command letter as it would be written in path data
    pub fn letter(&self) -> char {
        let upper = match self.segment {
            Segment::MoveTo(_) => 'M',
            Segment::LineTo(_) => 'L',
            Segment::HorizontalTo(_) => 'H',
            Segment::VerticalTo(_) => 'V',
            Segment::CurveTo { .. } => 'C',
            Segment::ClosePath => 'Z',
        };
        if self.relative {
            upper.to_ascii_lowercase()
        } else {
            upper
        }
    }

    fn from_operands(command: u8, ops: &[f64], offset: usize) -> Self {
        let segment = match command.to_ascii_uppercase() {
            b'M' => Segment::MoveTo(Point::new(ops[0], ops[1])),
            b'L' => Segment::LineTo(Point::new(ops[0], ops[1])),
            b'H' => Segment::HorizontalTo(ops[0]),
            b'V' => Segment::VerticalTo(ops[0]),
            b'C' => Segment::CurveTo {
                ctrl1: Point::new(ops[0], ops[1]),
                ctrl2: Point::new(ops[2], ops[3]),
                end: Point::new(ops[4], ops[5]),
            },
            _ => Segment::ClosePath,
        };
        Self {
            segment,
            relative: command.is_ascii_lowercase(),
            offset,
        }
    }
}

/// Number of operands consumed per instruction
fn arity(command: u8) -> usize {
    match command.to_ascii_uppercase() {
        b'M' | b'L' => 2,
        b'H' | b'V' => 1,
        b'C' => 6,
        _ => 0,
    }
}

fn classify(command: u8, offset: usize) -> Result<u8, PathError> {
    match command {
        b'M' | b'm' | b'L' | b'l' | b'H' | b'h' | b'V' | b'v' | b'C' | b'c' | b'Z' | b'z' => {
            Ok(command)
        }
        b'S' | b's' | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' => {
            Err(PathError::UnsupportedCommand {
                command: command as char,
                offset,
            })
        }
        _ => Err(PathError::malformed(
            offset,
            format!("unrecognized command '{}'", command as char),
        )),
    }
}

/// Single forward pass over path data. Stops after the first error.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    command: Option<u8>,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            command: None,
            done: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() || ch == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_instruction(&mut self) -> Option<Result<Instruction, PathError>> {
        self.skip_separators();
        let start = self.pos;
        let ch = self.peek()?;

        if ch.is_ascii_alphabetic() {
            self.pos += 1;
            let command = match classify(ch, start) {
                Ok(c) => c,
                Err(e) => return Some(Err(e)),
            };
            self.command = Some(command);
            return Some(self.read_operands(command, start));
        }

        if is_number_start(ch) {
            let repeated = match self.command {
                None => {
                    return Some(Err(PathError::malformed(
                        start,
                        "operands before the first command",
                    )));
                }
                Some(b'Z' | b'z') => {
                    return Some(Err(PathError::malformed(
                        start,
                        "closepath takes no operands",
                    )));
                }
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) => c,
            };
            self.command = Some(repeated);
            return Some(self.read_operands(repeated, start));
        }

        let found = self.src[start..].chars().next().unwrap_or('?');
        Some(Err(PathError::malformed(
            start,
            format!("unexpected character '{}'", found),
        )))
    }

    fn read_operands(&mut self, command: u8, offset: usize) -> Result<Instruction, PathError> {
        let k = arity(command);
        let mut ops = [0.0f64; 6];

        for (i, slot) in ops.iter_mut().take(k).enumerate() {
            self.skip_separators();
            match self.read_number() {
                Some(Ok(v)) => *slot = v,
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(PathError::malformed(
                        self.pos,
                        format!(
                            "expected {} operands for '{}', found {}",
                            k, command as char, i
                        ),
                    ));
                }
            }
        }

        Ok(Instruction::from_operands(command, &ops[..k], offset))
    }

    /// Read one SVG number. `None` when the next token does not start a number.
    fn read_number(&mut self) -> Option<Result<f64, PathError>> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut i = start;

        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }

        let int_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        let mut digits = i - int_start;

        if bytes.get(i) == Some(&b'.') {
            i += 1;
            let frac_start = i;
            while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
            digits += i - frac_start;
        }

        if digits == 0 {
            if i == start {
                return None;
            }
            self.pos = i;
            return Some(Err(PathError::malformed(
                start,
                format!("invalid number '{}'", &self.src[start..i]),
            )));
        }

        // Exponent only counts when digits follow it
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            if bytes.get(j).is_some_and(u8::is_ascii_digit) {
                while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                    j += 1;
                }
                i = j;
            }
        }

        self.pos = i;
        let text = &self.src[start..i];
        Some(text.parse::<f64>().map_err(|_| {
            PathError::malformed(start, format!("invalid number '{}'", text))
        }))
    }
}

fn is_number_start(ch: u8) -> bool {
    ch.is_ascii_digit() || matches!(ch, b'.' | b'+' | b'-')
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Instruction, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_instruction();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Tokenize path data
pub fn tokenize(data: &str) -> Tokenizer<'_> {
    Tokenizer::new(data)
}

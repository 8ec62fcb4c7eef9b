//! Path interpreter
//!
//! Walks tokenized instructions with an explicit pen state and produces one
//! [`Loop`] per subpath. Relative operands are resolved in the path's own
//! user space; the transform is applied once to the resulting absolute point.

use super::curve::CurveSampler;
use super::tokenizer::{Instruction, Segment, tokenize};
use crate::error::PathError;
use crate::types::{Loop, Point, XForm};

#[derive(Debug, Clone)]
enum PenState {
    NoSubpath,
    InSubpath {
        current: Loop,
        /// Subpath start, user space
        start: Point,
        /// Pen position, user space
        pen: Point,
    },
}

/// State machine turning instructions into loops
#[derive(Debug, Clone)]
pub struct PathInterpreter {
    xform: XForm,
    sampler: CurveSampler,
    state: PenState,
    loops: Vec<Loop>,
}

impl PathInterpreter {
    pub fn new(xform: XForm) -> Self {
        Self::with_sampler(xform, CurveSampler::default())
    }

    pub fn with_sampler(xform: XForm, sampler: CurveSampler) -> Self {
        Self {
            xform,
            sampler,
            state: PenState::NoSubpath,
            loops: Vec::new(),
        }
    }

    /// Pen position in user space; the origin before any moveto
    fn pen(&self) -> Point {
        match &self.state {
            PenState::NoSubpath => Point::default(),
            PenState::InSubpath { pen, .. } => *pen,
        }
    }

    fn resolve(&self, p: Point, relative: bool) -> Point {
        if relative { self.pen() + p } else { p }
    }

    fn flush(&mut self) {
        if let PenState::InSubpath { current, .. } =
            std::mem::replace(&mut self.state, PenState::NoSubpath)
        {
            self.loops.push(current);
        }
    }

    /// Apply one instruction
    pub fn step(&mut self, ins: &Instruction) -> Result<(), PathError> {
        let unexpected = PathError::UnexpectedCommand {
            command: ins.letter(),
            offset: ins.offset,
        };

        match ins.segment {
            Segment::MoveTo(p) => {
                let target = self.resolve(p, ins.relative);
                self.flush();
                self.state = PenState::InSubpath {
                    current: Loop::new(self.xform.apply(target)),
                    start: target,
                    pen: target,
                };
            }
            Segment::LineTo(p) => {
                let target = self.resolve(p, ins.relative);
                self.line_to(target).ok_or(unexpected)?;
            }
            Segment::HorizontalTo(x) => {
                let pen = self.pen();
                let target = Point::new(if ins.relative { pen.x + x } else { x }, pen.y);
                self.line_to(target).ok_or(unexpected)?;
            }
            Segment::VerticalTo(y) => {
                let pen = self.pen();
                let target = Point::new(pen.x, if ins.relative { pen.y + y } else { y });
                self.line_to(target).ok_or(unexpected)?;
            }
            Segment::CurveTo { ctrl1, ctrl2, end } => {
                let c1 = self.resolve(ctrl1, ins.relative);
                let c2 = self.resolve(ctrl2, ins.relative);
                let end = self.resolve(end, ins.relative);
                let xform = self.xform;
                let sampler = self.sampler;
                let PenState::InSubpath { current, pen, .. } = &mut self.state else {
                    return Err(unexpected);
                };
                sampler.sample_into(
                    xform.apply(*pen),
                    xform.apply(c1),
                    xform.apply(c2),
                    xform.apply(end),
                    &mut current.points,
                );
                *pen = end;
            }
            Segment::ClosePath => {
                let xform = self.xform;
                let PenState::InSubpath {
                    current,
                    start,
                    pen,
                } = &mut self.state
                else {
                    return Err(unexpected);
                };
                let first = xform.apply(*start);
                if current.points.last() != Some(&first) {
                    current.points.push(first);
                }
                current.closed = true;
                *pen = *start;
            }
        }
        Ok(())
    }

    fn line_to(&mut self, target: Point) -> Option<()> {
        let mapped = self.xform.apply(target);
        let PenState::InSubpath { current, pen, .. } = &mut self.state else {
            return None;
        };
        current.points.push(mapped);
        *pen = target;
        Some(())
    }

    /// Flush the open subpath and return every loop produced
    pub fn finish(mut self) -> Vec<Loop> {
        self.flush();
        self.loops
    }
}

/// Convert path data into loops, mapping every point through `xform`
pub fn path_to_loops(data: &str, xform: &XForm) -> Result<Vec<Loop>, PathError> {
    let mut interpreter = PathInterpreter::new(*xform);
    for ins in tokenize(data) {
        interpreter.step(&ins?)?;
    }
    Ok(interpreter.finish())
}

//! G-code output for pen plotters
//!
//! Each face becomes one continuous stroke: lift the pen, travel to the
//! first vertex, lower the pen, draw to every following vertex, lift again.
//! Faces are plotted in model order.

use crate::format::fixed;
use crate::mesh::PolygonModel;
use crate::types::Point;
use std::io::Write;
use tracing::info;

/// Default clearance above the drawing height for pen-up moves (mm)
pub const DEFAULT_Z_SAFETY: f64 = 2.5;

/// Machine placement and speed settings
#[derive(Debug, Clone)]
pub struct GcodeOptions {
    /// X offset from machine origin (mm)
    pub x_offset: f64,
    /// Y offset from machine origin (mm)
    pub y_offset: f64,
    /// Drawing height (mm)
    pub z_offset: f64,
    /// Extra height for pen-up moves (mm)
    pub z_safety: f64,
    /// Feed rate for all moves (mm/min)
    pub feed_rate: f64,
    /// Home all axes with `G28` before plotting
    pub home: bool,
}

impl Default for GcodeOptions {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
            z_safety: DEFAULT_Z_SAFETY,
            feed_rate: 4000.0,
            home: true,
        }
    }
}

/// One plotter motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    PenUp,
    PenDown,
    /// Move with the pen lifted
    Travel(Point),
    /// Linear move with the pen down
    Draw(Point),
}

/// Turn every face into a pen stroke
pub fn toolpath(model: &PolygonModel) -> Vec<Motion> {
    let mut motions = Vec::new();

    for face in 0..model.faces().len() {
        let mut points = model.face_points(face);
        let Some(first) = points.next() else {
            continue;
        };
        motions.push(Motion::PenUp);
        motions.push(Motion::Travel(*first));
        motions.push(Motion::PenDown);
        motions.extend(points.map(|p| Motion::Draw(*p)));
        motions.push(Motion::PenUp);
    }

    motions
}

fn g(n: f64) -> String {
    fixed(n, 3)
}

/// Write the model as G-code
pub fn write_gcode<W: Write + ?Sized>(
    out: &mut W,
    model: &PolygonModel,
    options: &GcodeOptions,
) -> std::io::Result<()> {
    let z_plot = options.z_offset;
    let z_move = z_plot + options.z_safety;
    let feed = options.feed_rate.round() as i64;

    writeln!(out, "G21 ; set units to millimeters")?;
    writeln!(out, "G90 ; use absolute coordinates")?;
    if options.home {
        writeln!(out, "G28 ; home all axes")?;
    }
    writeln!(out, "G0 Z{} F{}", g(z_move), feed)?;
    writeln!(
        out,
        "G0 X{} Y{} F{}",
        g(options.x_offset),
        g(options.y_offset),
        feed
    )?;

    let motions = toolpath(model);
    let mut strokes = 0usize;
    // Consecutive pen-up commands collapse into one
    let mut pen_down = false;

    for motion in &motions {
        match motion {
            Motion::PenUp => {
                if pen_down {
                    writeln!(out, "G0 Z{} F{}", g(z_move), feed)?;
                    pen_down = false;
                }
            }
            Motion::PenDown => {
                writeln!(out, "G1 Z{} F{}", g(z_plot), feed)?;
                pen_down = true;
                strokes += 1;
            }
            Motion::Travel(p) => writeln!(
                out,
                "G0 X{} Y{} F{}",
                g(options.x_offset + p.x),
                g(options.y_offset + p.y),
                feed
            )?,
            Motion::Draw(p) => writeln!(
                out,
                "G1 X{} Y{} F{}",
                g(options.x_offset + p.x),
                g(options.y_offset + p.y),
                feed
            )?,
        }
    }

    info!("Wrote {} strokes.", strokes);
    Ok(())
}

/// Render the model as a G-code string
pub fn model_to_gcode(model: &PolygonModel, options: &GcodeOptions) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_gcode(&mut out, model, options);
    String::from_utf8_lossy(&out).into_owned()
}

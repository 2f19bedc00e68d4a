//! Procedural Pattern Generator
//!
//! Deterministic binary phase fields used as recall targets when no image
//! has been loaded. "On" pixels sit at phase 0 (white), background at π.

use anyhow::{bail, Result};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

const ON: f64 = 0.0;
const OFF: f64 = PI;

/// Checkerboard block edge; one full period is two blocks
const CHECKER_BLOCK: usize = 4;
const STRIPE_PERIOD: usize = 8;
const CROSS_HALF_THICKNESS: f64 = 4.0;

const LETTER_A: [&str; 10] = [
    "    ####    ",
    "   ######   ",
    "  ###  ###  ",
    " ###    ### ",
    " ###    ### ",
    "############",
    "############",
    "###      ###",
    "###      ###",
    "###      ###",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Checkerboard,
    Diagonal,
    Circle,
    Cross,
    LetterA,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Checkerboard,
        PatternKind::Diagonal,
        PatternKind::Circle,
        PatternKind::Cross,
        PatternKind::LetterA,
    ];

    /// Library display name
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Checkerboard => "Checkerboard",
            PatternKind::Diagonal => "Diagonal",
            PatternKind::Circle => "Circle",
            PatternKind::Cross => "Cross",
            PatternKind::LetterA => "Letter A",
        }
    }

    /// Command-line identifier
    pub fn slug(&self) -> &'static str {
        match self {
            PatternKind::Checkerboard => "checkerboard",
            PatternKind::Diagonal => "diagonal",
            PatternKind::Circle => "circle",
            PatternKind::Cross => "cross",
            PatternKind::LetterA => "letter-a",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(|c: char| c == ' ' || c == '_', "-");
        match PatternKind::ALL.iter().find(|k| k.slug() == wanted) {
            Some(kind) => Ok(*kind),
            None => bail!("Unknown pattern '{}'", s),
        }
    }
}

/// Render `kind` on a `rows x cols` grid, row-major
pub fn generate(kind: PatternKind, rows: usize, cols: usize) -> Vec<f64> {
    match kind {
        PatternKind::Checkerboard => field(rows, cols, |x, y| {
            (x / CHECKER_BLOCK + y / CHECKER_BLOCK) % 2 == 0
        }),
        PatternKind::Diagonal => field(rows, cols, |x, y| {
            (x + y) % STRIPE_PERIOD < STRIPE_PERIOD / 2
        }),
        PatternKind::Circle => {
            let (cx, cy) = (cols as f64 / 2.0, rows as f64 / 2.0);
            let radius = rows.min(cols) as f64 / 3.0;
            field(rows, cols, |x, y| {
                let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                (dx * dx + dy * dy).sqrt() < radius
            })
        }
        PatternKind::Cross => {
            let (cx, cy) = (cols as f64 / 2.0, rows as f64 / 2.0);
            field(rows, cols, |x, y| {
                (y as f64 - cy).abs() < CROSS_HALF_THICKNESS
                    || (x as f64 - cx).abs() < CROSS_HALF_THICKNESS
            })
        }
        PatternKind::LetterA => letterform(&LETTER_A, rows, cols),
    }
}

fn field(rows: usize, cols: usize, on: impl Fn(usize, usize) -> bool) -> Vec<f64> {
    let mut pattern = Vec::with_capacity(rows * cols);
    for y in 0..rows {
        for x in 0..cols {
            pattern.push(if on(x, y) { ON } else { OFF });
        }
    }
    pattern
}

/// Stamp a character bitmap, scaled 3x2 per cell on a 32x32 grid, centered and clipped
fn letterform(template: &[&str], rows: usize, cols: usize) -> Vec<f64> {
    let mut pattern = vec![OFF; rows * cols];
    let height = template.len();
    let width = template.iter().map(|line| line.len()).max().unwrap_or(0);

    let scale_y = (rows * 3 / 32).max(1);
    let scale_x = (cols * 2 / 32).max(1);
    let start_y = (rows as isize - (height * scale_y) as isize) / 2;
    let start_x = (cols as isize - (width * scale_x) as isize) / 2;

    for (ty, line) in template.iter().enumerate() {
        for (tx, cell) in line.bytes().enumerate() {
            if cell != b'#' {
                continue;
            }
            for dy in 0..scale_y {
                for dx in 0..scale_x {
                    let y = start_y + (ty * scale_y + dy) as isize;
                    let x = start_x + (tx * scale_x + dx) as isize;
                    if (0..rows as isize).contains(&y) && (0..cols as isize).contains(&x) {
                        pattern[y as usize * cols + x as usize] = ON;
                    }
                }
            }
        }
    }
    pattern
}

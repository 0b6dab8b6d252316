//! Synthetic signature pages shared by the integration tests.
#![allow(dead_code)]

use sigmatch::{RasterImage, TextRecognizer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const PAPER: u8 = 240;
pub const INK: u8 = 20;

/// Parameters of a connected, wavy stroke with a separate underline.
#[derive(Clone, Copy, Debug)]
pub struct Cursive {
    pub amplitude: f32,
    pub period: f32,
    pub phase: f32,
}

pub const CURSIVE_A: Cursive = Cursive {
    amplitude: 30.0,
    period: 110.0,
    phase: 0.0,
};
pub const CURSIVE_B: Cursive = Cursive {
    amplitude: 22.0,
    period: 70.0,
    phase: 1.3,
};
pub const CURSIVE_C: Cursive = Cursive {
    amplitude: 34.0,
    period: 160.0,
    phase: 2.4,
};
pub const CURSIVE_D: Cursive = Cursive {
    amplitude: 26.0,
    period: 130.0,
    phase: 0.6,
};

/// Draws a cursive signature at `(ox, oy)` on a page of the given size.
pub fn cursive_page(sig: Cursive, page_w: usize, page_h: usize, ox: usize, oy: usize) -> RasterImage {
    RasterImage::from_fn(page_w, page_h, |x, y| {
        let (Some(lx), Some(ly)) = (x.checked_sub(ox), y.checked_sub(oy)) else {
            return PAPER;
        };
        let stroke = (10..350).contains(&lx) && {
            let t = lx as f32 * std::f32::consts::TAU / sig.period + sig.phase;
            let centre = 50.0 + sig.amplitude * t.sin();
            (ly as f32 - centre).abs() <= 3.5
        };
        let underline = (20..330).contains(&lx) && (96..101).contains(&ly);
        if stroke || underline {
            INK
        } else {
            PAPER
        }
    })
    .unwrap()
}

pub fn cursive(sig: Cursive) -> RasterImage {
    cursive_page(sig, 400, 140, 20, 10)
}

/// Block letters, each drawn in a 30x60 cell with a 6 px stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Letter {
    O,
    L,
    T,
    E,
    H,
    U,
}

impl Letter {
    fn covers(self, x: usize, y: usize) -> bool {
        let left = x < 6;
        let right = x >= 24;
        let top = y < 6;
        let bottom = y >= 54;
        let middle = (27..33).contains(&y);
        match self {
            Letter::O => left || right || top || bottom,
            Letter::L => left || bottom,
            Letter::T => top || (12..18).contains(&x),
            Letter::E => left || top || bottom || middle,
            Letter::H => left || right || middle,
            Letter::U => left || right || bottom,
        }
    }
}

pub const BLOCK_A: [Letter; 6] = [Letter::O, Letter::L, Letter::T, Letter::E, Letter::H, Letter::U];
pub const BLOCK_B: [Letter; 6] = [Letter::U, Letter::H, Letter::E, Letter::T, Letter::L, Letter::O];

const CELL_W: usize = 30;
const CELL_H: usize = 60;
const GAP: usize = 20;
const MARGIN: usize = 40;

/// Draws block letters separated by clear gaps.
pub fn block(letters: &[Letter]) -> RasterImage {
    let page_w = 2 * MARGIN + letters.len() * CELL_W + letters.len().saturating_sub(1) * GAP;
    RasterImage::from_fn(page_w, CELL_H + 2 * MARGIN, |x, y| {
        if y < MARGIN || y >= MARGIN + CELL_H || x < MARGIN {
            return PAPER;
        }
        let lx = x - MARGIN;
        let slot = lx / (CELL_W + GAP);
        let cx = lx % (CELL_W + GAP);
        match letters.get(slot) {
            Some(letter) if cx < CELL_W && letter.covers(cx, y - MARGIN) => INK,
            _ => PAPER,
        }
    })
    .unwrap()
}

pub fn blank_page() -> RasterImage {
    RasterImage::filled(400, 140, PAPER).unwrap()
}

/// Recognizer returning a fixed answer and counting its calls.
pub struct StubRecognizer {
    pub answer: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl StubRecognizer {
    /// Returns the recognizer and a handle to its call counter.
    pub fn new(answer: Option<&str>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = Self {
            answer: answer.map(str::to_string),
            calls: Arc::clone(&calls),
        };
        (stub, calls)
    }
}

impl TextRecognizer for StubRecognizer {
    fn name(&self) -> &str {
        "stub"
    }

    fn recognize_line(&self, _binarized: &RasterImage) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

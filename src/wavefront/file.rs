//! Plain-text wavefront coefficient files.
//!
//! The format is line based:
//!
//! ```text
//! # comment
//! type: zernike
//! radius: 10.0
//! field: 0.05        # only meaningful for seidel
//! 0.0
//! 0.25               # one coefficient per line
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Tags are matched by
//! prefix (`seid…`, `zernike…`, `poly…`, `king…` for the type); any other
//! line contributes its first token as the next coefficient. Trailing tokens
//! on a line are ignored, which allows inline comments.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::{WaveFront, WaveFrontKind};

/// Parse wavefront text, falling back to `default_radius` when no
/// `radius:` tag is present.
pub fn parse_wavefront(text: &str, default_radius: f64) -> Result<WaveFront> {
    let mut kind: Option<String> = None;
    let mut radius = default_radius;
    let mut field_angle = 0.0;
    let mut coefficients = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let head = tokens[0].to_ascii_lowercase();
        if head.starts_with("type") {
            kind = Some(tag_value(&tokens, line)?.to_ascii_lowercase());
        } else if head.starts_with("radius") {
            radius = parse_number(tag_value(&tokens, line)?, line)?;
        } else if head.starts_with("field") {
            field_angle = parse_number(tag_value(&tokens, line)?, line)?;
        } else {
            coefficients.push(parse_number(tokens[0], line)?);
        }
    }

    let kind = kind.unwrap_or_default();
    debug!(
        "Parsed wavefront file: type `{}`, radius {}, {} coefficients",
        kind,
        radius,
        coefficients.len()
    );

    if kind.starts_with("seid") {
        Ok(WaveFront::seidel(radius, six("seidel", &coefficients)?, field_angle))
    } else if kind.starts_with("zernike") {
        Ok(WaveFront::zernike(radius, coefficients))
    } else if kind.starts_with("poly") {
        Ok(WaveFront::polynomial(radius, coefficients))
    } else if kind.starts_with("king") {
        Ok(WaveFront::kingslake(radius, six("kingslake", &coefficients)?))
    } else {
        Err(Error::UnknownWaveFrontType(kind))
    }
}

/// Value of a `tag: value` or `tag:value` line.
fn tag_value<'a>(tokens: &[&'a str], line: usize) -> Result<&'a str> {
    let head = tokens[0];
    if let Some((_, rest)) = head.split_once(':') {
        if !rest.is_empty() {
            return Ok(rest);
        }
    }
    match tokens.get(1) {
        Some(value) if !value.starts_with('#') => Ok(value),
        _ => Err(Error::MissingTagValue {
            line,
            tag: head.trim_end_matches(':').to_string(),
        }),
    }
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| Error::MalformedNumber {
        line,
        token: token.to_string(),
    })
}

fn six(kind: &'static str, coefficients: &[f64]) -> Result<[f64; 6]> {
    coefficients
        .try_into()
        .map_err(|_| Error::CoefficientCount {
            kind,
            expected: 6,
            found: coefficients.len(),
        })
}

impl WaveFront {
    /// Replace this wavefront with the contents of `text`.
    ///
    /// The current radius is used when the text has no `radius:` tag.
    pub fn read_str(&self, text: &str) -> Result<WaveFront> {
        parse_wavefront(text, self.radius)
    }

    /// Load a wavefront file.
    pub fn from_file<P: AsRef<Path>>(path: P, default_radius: f64) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read wavefront file: {}", path.display()))?;
        let wf = parse_wavefront(&text, default_radius)
            .with_context(|| format!("Failed to parse wavefront file: {}", path.display()))?;
        info!(
            "Loaded {} wavefront from {} ({} coefficients)",
            wf.kind.tag(),
            path.display(),
            wf.coefficients().len()
        );
        Ok(wf)
    }

    /// Serialise in the format read by [`parse_wavefront`].
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "type: {}", self.kind.tag());
        let _ = writeln!(out, "radius: {}", self.radius);
        if let WaveFrontKind::Seidel(s) = &self.kind {
            let _ = writeln!(out, "field: {}", s.field_angle);
        }
        for c in self.coefficients() {
            let _ = writeln!(out, "{c:e}");
        }
        out
    }

    /// Write the wavefront to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write wavefront file: {}", path.display()))?;
        info!("Saved {} wavefront to {}", self.kind.tag(), path.display());
        Ok(())
    }
}

impl std::str::FromStr for WaveFront {
    type Err = Error;

    /// Parse with a unit default radius.
    fn from_str(s: &str) -> Result<Self> {
        parse_wavefront(s, 1.0)
    }
}

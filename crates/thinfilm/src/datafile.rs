//! Two-column ASCII data tables (e.g. measured n(λ))
//!
//! Files hold whitespace separated `x y` pairs, one per line. Blank lines and
//! `#` comments are skipped. Values are interpolated linearly and held flat
//! outside the tabulated domain.

use std::path::{Path, PathBuf};

use crate::error::{CoatingError, Result};

/// Tabulated (x, y) data sorted by x
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl DataTable {
    /// Build a table from unsorted points. At least one point is required.
    pub fn from_points(mut points: Vec<(f64, f64)>) -> Option<Self> {
        if points.is_empty() || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return None;
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = points.into_iter().unzip();
        Some(Self { x, y })
    }

    /// Read a table from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CoatingError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|err| CoatingError::UnexpectedFileLayout {
            path: path.to_path_buf(),
            line: 0,
            reason: format!("not a text file: {}", err),
        })?;
        let table = Self::parse(&content, path)?;
        tracing::debug!("Loaded {} data points from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse table contents; `origin` is only used for error reporting.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let layout_error = |line: usize, reason: String| CoatingError::UnexpectedFileLayout {
            path: PathBuf::from(origin),
            line,
            reason,
        };

        let mut points = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|f| !f.is_empty())
                .collect();
            if fields.len() != 2 {
                return Err(layout_error(
                    idx + 1,
                    format!("expected 2 columns, found {}", fields.len()),
                ));
            }
            let parse = |s: &str| {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| layout_error(idx + 1, format!("cannot parse '{}' as a number", s)))
            };
            points.push((parse(fields[0])?, parse(fields[1])?));
        }

        Self::from_points(points).ok_or_else(|| layout_error(0, "no data points".to_string()))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Tabulated domain `(x_min, x_max)`
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Linear interpolation, clamped to the end values outside the domain
    pub fn value(&self, x: f64) -> f64 {
        let last = self.x.len() - 1;
        if x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[last] {
            return self.y[last];
        }

        // first knot strictly greater than x
        let hi = self.x.partition_point(|&xi| xi <= x);
        let lo = hi - 1;
        let (x0, x1) = (self.x[lo], self.x[hi]);
        let (y0, y1) = (self.y[lo], self.y[hi]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

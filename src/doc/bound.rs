//! Axis-aligned bounds in model (canvas) coordinates.

use serde::{Deserialize, Serialize};

/// Rectangle stored as `[x, y, w, h]`, matching the serialized `xywh` form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bound {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bound {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Smallest bound containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Bound) -> Bound {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Bound::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Common bound of a sequence, or `None` when it is empty.
    pub fn common<'a>(bounds: impl IntoIterator<Item = &'a Bound>) -> Option<Bound> {
        bounds
            .into_iter()
            .fold(None, |acc: Option<Bound>, b| Some(acc.map_or(*b, |a| a.union(b))))
    }

    /// Serialize as the `"[x,y,w,h]"` string used by block props.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!("[{},{},{},{}]", self.x, self.y, self.w, self.h)
    }

    /// Parse the `"[x,y,w,h]"` form. Returns `None` for anything else.
    #[must_use]
    pub fn deserialize(raw: &str) -> Option<Bound> {
        let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>());
        let (Some(Ok(x)), Some(Ok(y)), Some(Ok(w)), Some(Ok(h)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        Some(Bound::new(x, y, w, h))
    }
}

//! Value filters applied between a widget's raw value and its public
//! output.
//!
//! Filters are pure `f64 -> f64` functions composed in a fixed stage
//! order: every pre-filter, then every user filter, then every
//! post-filter. Compound (vector) values run the chain element-wise.

/// A single pure value transform.
pub type Filter = Box<dyn Fn(f64) -> f64>;

/// An ordered three-stage filter chain.
///
/// Stages always run pre → user → post; within a stage, filters run in
/// insertion order, each receiving the previous output.
#[derive(Default)]
pub struct FilterChain {
    pre: Vec<Filter>,
    user: Vec<Filter>,
    post: Vec<Filter>,
}

impl FilterChain {
    /// Create an empty chain (the identity transform).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pre-stage filter.
    pub fn push_pre(&mut self, filter: Filter) {
        self.pre.push(filter);
    }

    /// Append a user-stage filter.
    pub fn push_user(&mut self, filter: Filter) {
        self.user.push(filter);
    }

    /// Append a post-stage filter.
    pub fn push_post(&mut self, filter: Filter) {
        self.post.push(filter);
    }

    /// Whether no filters are installed in any stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.user.is_empty() && self.post.is_empty()
    }

    /// Run a scalar through all three stages in order.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        self.pre
            .iter()
            .chain(self.user.iter())
            .chain(self.post.iter())
            .fold(value, |v, f| f(v))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("pre", &self.pre.len())
            .field("user", &self.user.len())
            .field("post", &self.post.len())
            .finish()
    }
}

/// Build a linear range-mapping filter.
///
/// Maps `in_min..in_max` onto `out_min..out_max`, so `scale(0.0, 1.0,
/// min, max)` turns a unit-normalized raw value into `min + v * (max -
/// min)`. Composing a scale with its inverse returns the input (within
/// floating-point tolerance).
#[must_use]
pub fn scale(in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> Filter {
    let span = in_max - in_min;
    Box::new(move |v| out_min + ((v - in_min) / span) * (out_max - out_min))
}

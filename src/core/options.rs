//! Named-option configuration protocol.
//!
//! Every configurable component exposes its hyperparameters as a map of
//! option name to [`Descriptor`]. A descriptor either pins a value, bounds a
//! numeric range, or enumerates candidates; [`Descriptor::sample`] resolves it
//! to one concrete [`OptionValue`].

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use std::collections::BTreeMap;

/// A concrete option value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Integer(v) => Some(*v as f64),
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Non-negative integer view.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            OptionValue::Integer(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<usize> for OptionValue {
    fn from(v: usize) -> Self {
        OptionValue::Integer(v as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// How an option value is chosen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Descriptor {
    /// Use exactly this value.
    Fixed(OptionValue),
    /// Sample uniformly between `min` and `max` (numeric values only).
    Range { min: OptionValue, max: OptionValue },
    /// Sample uniformly from the list.
    Enumerated(Vec<OptionValue>),
}

impl Descriptor {
    pub fn fixed(value: impl Into<OptionValue>) -> Self {
        Descriptor::Fixed(value.into())
    }

    pub fn range(min: impl Into<OptionValue>, max: impl Into<OptionValue>) -> Self {
        Descriptor::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn enumerated<T: Into<OptionValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Descriptor::Enumerated(values.into_iter().map(Into::into).collect())
    }

    /// Returns the pinned value of a `Fixed` descriptor.
    pub fn fixed_value(&self) -> Option<&OptionValue> {
        match self {
            Descriptor::Fixed(v) => Some(v),
            _ => None,
        }
    }

    /// Whether sampling can yield more than one value.
    pub fn is_variable(&self) -> bool {
        !matches!(self, Descriptor::Fixed(_))
    }

    /// Resolves the descriptor to one concrete value.
    ///
    /// Integer ranges sample from `[min, max]`, float ranges from
    /// `[min, max)`. Returns `None` for an empty list or a range whose
    /// bounds are not numeric or not of the same kind.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<OptionValue> {
        match self {
            Descriptor::Fixed(v) => Some(v.clone()),
            Descriptor::Range { min, max } => match (min, max) {
                (OptionValue::Integer(lo), OptionValue::Integer(hi)) => {
                    let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
                    Some(OptionValue::Integer(rng.random_range(lo..=hi)))
                }
                (OptionValue::Float(lo), OptionValue::Float(hi)) => {
                    let u: f64 = rng.random();
                    Some(OptionValue::Float(lo + (hi - lo) * u))
                }
                _ => None,
            },
            Descriptor::Enumerated(values) => values.choose(rng).cloned(),
        }
    }
}

/// Option name to descriptor map, ordered by name.
pub type Options = BTreeMap<String, Descriptor>;

/// Generic named-option get/set capability.
pub trait Configurable {
    /// Current options, every entry as `Descriptor::Fixed`.
    fn options(&self) -> Options {
        Options::new()
    }

    /// Applies one option; `false` on an unknown name or a value of the
    /// wrong kind.
    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        let _ = (name, descriptor);
        false
    }

    /// Applies every entry; `true` iff all of them succeeded.
    fn set_options(&mut self, options: &Options) -> bool {
        let mut all = true;
        for (name, descriptor) in options {
            if !self.set_option(name, descriptor) {
                tracing::warn!(option = %name, "option rejected");
                all = false;
            }
        }
        all
    }
}

//! Built-in formula functions.
//!
//! Numeric functions receive their arguments already coerced to numbers.
//! Functions that need lazy arguments or the resolver are dispatched by the
//! evaluator through [`NativeKind`].

/// How a built-in is evaluated.
#[derive(Clone, Copy)]
pub(crate) enum NativeKind {
    /// Pure function of coerced numeric arguments.
    Numeric(fn(&[f64]) -> f64),
    /// `round()` reads the round index; `round(x)` and `round(x, digits)` round.
    Round,
    /// `if(cond, a, b)`, evaluating only the chosen branch.
    If,
    /// `state(ref)`
    State,
    /// `owns(ref, player?)`
    Owns,
    /// `phase()`
    Phase,
}

/// A built-in function and its accepted argument counts.
#[derive(Clone, Copy)]
pub(crate) struct Native {
    pub name: &'static str,
    pub min: usize,
    pub max: Option<usize>,
    pub kind: NativeKind,
}

impl Native {
    /// Returns true if `count` arguments are accepted.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// Accepted arity, worded for error messages.
    pub fn expected(&self) -> String {
        match self.max {
            None => format!("at least {}", self.min),
            Some(max) if max == self.min => max.to_string(),
            Some(max) if max == self.min + 1 => format!("{} or {max}", self.min),
            Some(max) => format!("{} to {max}", self.min),
        }
    }
}

static NATIVES: &[Native] = &[
    Native {
        name: "max",
        min: 1,
        max: None,
        kind: NativeKind::Numeric(native_max),
    },
    Native {
        name: "min",
        min: 1,
        max: None,
        kind: NativeKind::Numeric(native_min),
    },
    Native {
        name: "sum",
        min: 0,
        max: None,
        kind: NativeKind::Numeric(native_sum),
    },
    Native {
        name: "avg",
        min: 1,
        max: None,
        kind: NativeKind::Numeric(native_avg),
    },
    Native {
        name: "abs",
        min: 1,
        max: Some(1),
        kind: NativeKind::Numeric(native_abs),
    },
    Native {
        name: "floor",
        min: 1,
        max: Some(1),
        kind: NativeKind::Numeric(native_floor),
    },
    Native {
        name: "ceil",
        min: 1,
        max: Some(1),
        kind: NativeKind::Numeric(native_ceil),
    },
    Native {
        name: "round",
        min: 0,
        max: Some(2),
        kind: NativeKind::Round,
    },
    Native {
        name: "if",
        min: 3,
        max: Some(3),
        kind: NativeKind::If,
    },
    Native {
        name: "state",
        min: 1,
        max: Some(1),
        kind: NativeKind::State,
    },
    Native {
        name: "owns",
        min: 1,
        max: Some(2),
        kind: NativeKind::Owns,
    },
    Native {
        name: "phase",
        min: 0,
        max: Some(0),
        kind: NativeKind::Phase,
    },
];

/// Looks up a built-in by name, ignoring case.
pub(crate) fn lookup(name: &str) -> Option<&'static Native> {
    NATIVES.iter().find(|n| n.name.eq_ignore_ascii_case(name))
}

/// Names of every built-in, in table order.
pub(crate) fn names() -> impl Iterator<Item = &'static str> {
    NATIVES.iter().map(|n| n.name)
}

/// Math: max
fn native_max(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Math: min
fn native_min(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Math: sum
fn native_sum(args: &[f64]) -> f64 {
    args.iter().sum()
}

/// Math: avg
#[allow(clippy::cast_precision_loss)]
fn native_avg(args: &[f64]) -> f64 {
    native_sum(args) / args.len() as f64
}

/// Math: abs
fn native_abs(args: &[f64]) -> f64 {
    args[0].abs()
}

/// Math: floor
fn native_floor(args: &[f64]) -> f64 {
    args[0].floor()
}

/// Math: ceil
fn native_ceil(args: &[f64]) -> f64 {
    args[0].ceil()
}

/// Math: round to `digits` decimal places (half away from zero).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn round_to(x: f64, digits: f64) -> f64 {
    let digits = digits.trunc().clamp(-15.0, 15.0) as i32;
    if digits == 0 {
        return x.round();
    }
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

//! The `Number` representation, selected at build time (spec.md §3).
//!
//! The reference design supports two configurations: integer-only, or an
//! IEEE-754 double. We expose both behind the `integer-numbers` feature
//! rather than a runtime switch, the idiomatic Rust way to offer a
//! compile-time configuration axis.

#[cfg(feature = "integer-numbers")]
pub type Number = i32;

#[cfg(not(feature = "integer-numbers"))]
pub type Number = f64;

/// True when this build only supports transcendental-free integer math
/// (spec.md §4.1: "integer-only builds degrade transcendentals to a
/// syntax error").
pub const INTEGER_ONLY: bool = cfg!(feature = "integer-numbers");

#[cfg(feature = "integer-numbers")]
pub fn from_i64(v: i64) -> Number {
    v as i32
}

#[cfg(not(feature = "integer-numbers"))]
pub fn from_i64(v: i64) -> Number {
    v as f64
}

#[cfg(feature = "integer-numbers")]
pub fn to_i64(n: Number) -> i64 {
    n as i64
}

#[cfg(not(feature = "integer-numbers"))]
pub fn to_i64(n: Number) -> i64 {
    n as i64
}

#[cfg(feature = "integer-numbers")]
pub fn is_zero(n: Number) -> bool {
    n == 0
}

#[cfg(not(feature = "integer-numbers"))]
pub fn is_zero(n: Number) -> bool {
    n == 0.0
}

#[cfg(feature = "integer-numbers")]
pub fn pow(a: Number, b: Number) -> Number {
    if b < 0 {
        0
    } else {
        a.checked_pow(b as u32).unwrap_or(0)
    }
}

#[cfg(not(feature = "integer-numbers"))]
pub fn pow(a: Number, b: Number) -> Number {
    a.powf(b)
}

#[cfg(feature = "integer-numbers")]
pub fn fix(n: Number) -> Number {
    n
}
#[cfg(not(feature = "integer-numbers"))]
pub fn fix(n: Number) -> Number {
    n.trunc()
}

#[cfg(feature = "integer-numbers")]
pub fn floor(n: Number) -> Number {
    n
}
#[cfg(not(feature = "integer-numbers"))]
pub fn floor(n: Number) -> Number {
    n.floor()
}

#[cfg(feature = "integer-numbers")]
pub fn ceil(n: Number) -> Number {
    n
}
#[cfg(not(feature = "integer-numbers"))]
pub fn ceil(n: Number) -> Number {
    n.ceil()
}

#[cfg(feature = "integer-numbers")]
pub fn sgn(n: Number) -> Number {
    n.signum()
}
#[cfg(not(feature = "integer-numbers"))]
pub fn sgn(n: Number) -> Number {
    if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(feature = "integer-numbers")]
pub fn abs(n: Number) -> Number {
    n.wrapping_abs()
}
#[cfg(not(feature = "integer-numbers"))]
pub fn abs(n: Number) -> Number {
    n.abs()
}

/// Used only by the transcendental opcodes, which already reject
/// integer-only builds with a syntax error before reaching here.
#[cfg(feature = "integer-numbers")]
pub fn to_f64(n: Number) -> f64 {
    n as f64
}
#[cfg(not(feature = "integer-numbers"))]
pub fn to_f64(n: Number) -> f64 {
    n
}

#[cfg(feature = "integer-numbers")]
pub fn from_f64(f: f64) -> Number {
    f as i32
}
#[cfg(not(feature = "integer-numbers"))]
pub fn from_f64(f: f64) -> Number {
    f
}

/// Prints `n` in the canonical decimal form used by `STR`/`PRN`
/// (spec.md §4.1 `STR`, §7 "number formatted per the dialect notes").
pub fn format(n: Number) -> String {
    #[cfg(feature = "integer-numbers")]
    {
        n.to_string()
    }
    #[cfg(not(feature = "integer-numbers"))]
    {
        if n == n.trunc() && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}

pub fn parse(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(from_i64(0));
    }
    #[cfg(feature = "integer-numbers")]
    {
        trimmed.parse::<i64>().ok().map(from_i64)
    }
    #[cfg(not(feature = "integer-numbers"))]
    {
        trimmed.parse::<f64>().ok()
    }
}

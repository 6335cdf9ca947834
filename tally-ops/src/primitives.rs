//! Operation primitives
//!
//! Pure functions over decimal operands. Binary arithmetic works in full
//! decimal precision. `stddev` accumulates in `f64` and converts the result
//! back through its shortest decimal text, trading exactness for the familiar
//! floating-point answer.

use tally_core::{CalcError, Number, Outcome};

pub fn add(a: &Number, b: &Number) -> Number {
    a.add(b)
}

pub fn subtract(a: &Number, b: &Number) -> Number {
    a.sub(b)
}

pub fn multiply(a: &Number, b: &Number) -> Number {
    a.mul(b)
}

/// `a / b`, or `DivisionByZero` when `b` is zero
pub fn divide(a: &Number, b: &Number) -> Outcome {
    a.checked_div(b).map_err(CalcError::from)
}

/// Calculate sum of numbers
pub fn sum(values: &[Number]) -> Number {
    values.iter().fold(Number::from_i64(0), |acc, n| acc.add(n))
}

/// Arithmetic mean, `EmptyInput` for no values
pub fn mean(values: &[Number]) -> Outcome {
    if values.is_empty() {
        return Err(CalcError::empty_input("mean"));
    }
    let count = Number::from_usize(values.len());
    sum(values).checked_div(&count).map_err(CalcError::from)
}

/// Most frequent value, `EmptyInput` for no values.
///
/// Values compare numerically, so `2` and `2.00` count together. On a tie the
/// value seen first in the input wins.
pub fn mode(values: &[Number]) -> Outcome {
    if values.is_empty() {
        return Err(CalcError::empty_input("mode"));
    }

    // (value, count) in first-seen order
    let mut counts: Vec<(&Number, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best = counts[0];
    for &(value, count) in &counts[1..] {
        if count > best.1 {
            best = (value, count);
        }
    }

    Ok(best.0.clone())
}

/// Sample standard deviation (n - 1 divisor), `InsufficientSample` below two values
pub fn stddev(values: &[Number]) -> Outcome {
    let n = values.len();
    if n < 2 {
        return Err(CalcError::insufficient_sample("stddev", 2, n));
    }

    let floats = values
        .iter()
        .map(|v| {
            v.to_f64()
                .ok_or_else(|| CalcError::overflow(format!("{} is outside the f64 range", v)))
        })
        .collect::<Result<Vec<f64>, CalcError>>()?;

    let mean = floats.iter().sum::<f64>() / n as f64;
    let squares: f64 = floats.iter().map(|x| (x - mean) * (x - mean)).sum();
    let deviation = (squares / (n - 1) as f64).sqrt();

    Number::from_f64(deviation).map_err(CalcError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::ErrorKind;

    fn nums(values: &[&str]) -> Vec<Number> {
        values.iter().map(|v| v.parse().unwrap()).collect()
    }

    fn num(s: &str) -> Number {
        s.parse().unwrap()
    }

    #[test]
    fn test_binary_arithmetic() {
        assert_eq!(add(&num("10"), &num("5")).to_plain_string(), "15");
        assert_eq!(subtract(&num("10"), &num("15")).to_plain_string(), "-5");
        assert_eq!(multiply(&num("-2.5"), &num("4")).to_plain_string(), "-10");
    }

    #[test]
    fn test_divide() {
        assert_eq!(divide(&num("10"), &num("2")).unwrap().to_plain_string(), "5");
        assert_eq!(divide(&num("1"), &num("8")).unwrap().to_plain_string(), "0.125");
    }

    #[test]
    fn test_divide_by_zero() {
        let err = divide(&num("10"), &num("0")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&nums(&["1", "2", "3"])).to_i64(), Some(6));
        assert!(sum(&[]).is_zero());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&nums(&["10", "20", "30"])).unwrap().to_plain_string(), "20");
        assert_eq!(mean(&nums(&["1", "2"])).unwrap().to_plain_string(), "1.5");
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]).unwrap_err().kind, ErrorKind::EmptyInput);
    }

    #[test]
    fn test_mode() {
        assert_eq!(mode(&nums(&["1", "2", "2", "3"])).unwrap().to_plain_string(), "2");
    }

    #[test]
    fn test_mode_tie_takes_first_seen() {
        assert_eq!(mode(&nums(&["3", "1", "1", "3"])).unwrap().to_plain_string(), "3");
        assert_eq!(mode(&nums(&["5", "4"])).unwrap().to_plain_string(), "5");
    }

    #[test]
    fn test_mode_compares_numerically() {
        assert_eq!(mode(&nums(&["7", "2", "2.0", "7.5"])).unwrap().to_plain_string(), "2");
    }

    #[test]
    fn test_mode_wide_exponents() {
        let values = nums(&["1e9000", "-1e-9000", "10e8999", "1e9000"]);
        assert_eq!(mode(&values).unwrap(), values[0]);

        let values = nums(&["-1e-9000", "1e9000", "-0.1e-8999"]);
        assert_eq!(mode(&values).unwrap(), values[0]);
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(&[]).unwrap_err().kind, ErrorKind::EmptyInput);
    }

    #[test]
    fn test_stddev() {
        let result = stddev(&nums(&["10", "20"])).unwrap();
        assert_eq!(result.to_plain_string(), "7.0710678118654755");

        let result = stddev(&nums(&["2", "4", "4", "4", "5", "5", "7", "9"])).unwrap();
        assert!(result.to_plain_string().starts_with("2.138"), "{}", result);
    }

    #[test]
    fn test_stddev_identical_values() {
        assert!(stddev(&nums(&["4", "4", "4"])).unwrap().is_zero());
    }

    #[test]
    fn test_stddev_insufficient_sample() {
        assert_eq!(stddev(&nums(&["10"])).unwrap_err().kind, ErrorKind::InsufficientSample);
        assert_eq!(stddev(&[]).unwrap_err().kind, ErrorKind::InsufficientSample);
    }

    #[test]
    fn test_stddev_out_of_f64_range() {
        let err = stddev(&nums(&["1e400", "1"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Overflow);
    }
}

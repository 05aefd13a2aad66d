//! Aggregate function module for wildlens
//!
//! This module contains the statistics the analysis and chart queries are
//! built from: sum, mean and mode over a column of values, plus the Pearson
//! correlation of two numeric series.

use std::collections::HashMap;

use crate::table::Value;

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// Sums numeric values, staying integral while every input is and the
    /// total fits in an `i64`
    Sum,
    /// Arithmetic mean of numeric values
    Mean,
    /// Most frequent non-NULL value; ties go to the value seen first
    Mode,
}

impl AggregateFunction {
    /// Execute the aggregate function on a column of values
    ///
    /// Non-numeric values are ignored by `Sum` and `Mean`. When nothing is
    /// left to aggregate the result is NULL.
    pub fn execute<'a, I>(&self, values: I) -> Value
    where
        I: IntoIterator<Item = &'a Value>,
    {
        match self {
            AggregateFunction::Sum => sum(values),
            AggregateFunction::Mean => mean(values),
            AggregateFunction::Mode => mode(values),
        }
    }
}

fn sum<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut is_float = false;
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut count = 0;

    for value in values {
        match value {
            Value::Integer(i) => {
                if is_float {
                    float_sum += *i as f64;
                } else {
                    match int_sum.checked_add(*i) {
                        Some(total) => int_sum = total,
                        None => {
                            float_sum = int_sum as f64 + *i as f64;
                            is_float = true;
                        }
                    }
                }
                count += 1;
            }
            Value::Float(f) => {
                if !is_float {
                    float_sum = int_sum as f64;
                    is_float = true;
                }
                float_sum += *f;
                count += 1;
            }
            _ => {}
        }
    }

    if count == 0 {
        return Value::Null;
    }

    if is_float {
        Value::Float(float_sum)
    } else {
        Value::Integer(int_sum)
    }
}

fn mean<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let numbers: Vec<f64> = values.into_iter().filter_map(Value::as_f64).collect();
    if numbers.is_empty() {
        return Value::Null;
    }
    Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn mode<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    // Keyed by display text so that 3 and 3.0 count as one value.
    let mut seen: Vec<&Value> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for value in values {
        if value.is_null() {
            continue;
        }
        let entry = counts.entry(value.to_string()).or_insert(0);
        if *entry == 0 {
            seen.push(value);
        }
        *entry += 1;
    }

    let mut best: Option<(&Value, usize)> = None;
    for value in seen {
        let n = counts[&value.to_string()];
        match best {
            Some((_, best_n)) if best_n >= n => {}
            _ => best = Some((value, n)),
        }
    }

    best.map(|(v, _)| v.clone()).unwrap_or(Value::Null)
}

/// Mean of the numeric values, or `None` if there are none
pub fn mean_f64<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Value>,
{
    AggregateFunction::Mean.execute(values).as_f64()
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pearson correlation coefficient of paired samples
///
/// Pairs where either side is not numeric are dropped. The result is NaN
/// when fewer than two pairs remain or when either series is constant.
pub fn pearson<'a, I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (&'a Value, &'a Value)>,
{
    let points: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();

    if points.len() < 2 {
        return f64::NAN;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_sum_function() {
        let values = vec![
            Value::Integer(10),
            Value::Null,
            Value::Integer(20),
            Value::Float(5.5),
        ];

        let sum = AggregateFunction::Sum.execute(&values);
        assert_eq!(sum, Value::Float(35.5));
    }

    #[test]
    fn test_sum_integers_only() {
        let values = vec![Value::Integer(5), Value::Integer(7)];
        assert_eq!(AggregateFunction::Sum.execute(&values), Value::Integer(12));
    }

    #[test]
    fn test_sum_overflow_switches_to_float() {
        let values = vec![Value::Integer(i64::MAX), Value::Integer(1), Value::Integer(1)];
        let total = AggregateFunction::Sum.execute(&values);
        assert!(matches!(total, Value::Float(_)));
        assert_eq!(total, Value::Float(i64::MAX as f64 + 2.0));

        let values = vec![Value::Integer(i64::MIN), Value::Integer(-1)];
        assert_eq!(
            AggregateFunction::Sum.execute(&values),
            Value::Float(i64::MIN as f64 - 1.0)
        );
    }

    #[test]
    fn test_sum_without_numbers_is_null() {
        let values = vec![text("a"), Value::Null];
        assert_eq!(AggregateFunction::Sum.execute(&values), Value::Null);
    }

    #[test]
    fn test_mean_function() {
        let values = vec![
            Value::Integer(10),
            Value::Null,
            Value::Integer(20),
            Value::Float(30.0),
        ];

        let mean = mean_f64(&values).unwrap();
        assert!((mean - 20.0).abs() < f64::EPSILON);
        assert_eq!(mean_f64(&[text("x")]), None);
    }

    #[test]
    fn test_mode_prefers_most_frequent() {
        let values = vec![text("Low"), text("High"), text("High"), Value::Null];
        assert_eq!(AggregateFunction::Mode.execute(&values), text("High"));
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let values = vec![text("Medium"), text("High"), text("High"), text("Medium")];
        assert_eq!(AggregateFunction::Mode.execute(&values), text("Medium"));

        let values = vec![text("High"), text("Low")];
        assert_eq!(AggregateFunction::Mode.execute(&values), text("High"));
    }

    #[test]
    fn test_mode_of_nothing_is_null() {
        assert_eq!(AggregateFunction::Mode.execute(&[Value::Null]), Value::Null);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = [Value::Float(0.1), Value::Float(0.5), Value::Float(0.9)];
        let ys = [Value::Integer(1), Value::Integer(5), Value::Integer(9)];
        let r = pearson(xs.iter().zip(ys.iter()));
        assert!((r - 1.0).abs() < 1e-12);

        let ys = [Value::Integer(9), Value::Integer(5), Value::Integer(1)];
        let r = pearson(xs.iter().zip(ys.iter()));
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_identical_points_is_nan() {
        let xs = [Value::Float(0.5), Value::Float(0.5)];
        let ys = [Value::Integer(3), Value::Integer(3)];
        assert!(pearson(xs.iter().zip(ys.iter())).is_nan());
    }

    #[test]
    fn test_pearson_skips_non_numeric_pairs() {
        let xs = [Value::Float(0.1), text("x"), Value::Float(0.3)];
        let ys = [Value::Integer(1), Value::Integer(100), Value::Integer(3)];
        let r = pearson(xs.iter().zip(ys.iter()));
        assert!((r - 1.0).abs() < 1e-12);
        assert!(pearson(xs[..1].iter().zip(ys[..1].iter())).is_nan());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-1.005_1), -1.01);
    }
}

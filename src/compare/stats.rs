use crate::error::EvalError;

/// Arithmetic mean; `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with an `n - 1` denominator.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Result of a two-sided paired t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedTTest {
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Paired t-test of `left - right`.
///
/// Identical samples give `t = 0, p = 1`; a constant non-zero difference gives
/// an infinite statistic and `p = 0`.
pub fn paired_t_test(left: &[f64], right: &[f64]) -> Result<PairedTTest, EvalError> {
    if left.len() != right.len() {
        return Err(EvalError::InvalidRequest(format!(
            "paired samples differ in length: {} vs {}",
            left.len(),
            right.len()
        )));
    }
    if left.len() < 2 {
        return Err(EvalError::InvalidRequest(
            "paired t-test needs at least two pairs".to_string(),
        ));
    }

    let diffs: Vec<f64> = left.iter().zip(right).map(|(a, b)| a - b).collect();
    let n = diffs.len();
    let df = n - 1;
    let d_mean = mean(&diffs).unwrap_or(0.0);
    let d_std = sample_std(&diffs).unwrap_or(0.0);

    if d_std == 0.0 {
        let (statistic, p_value) = if d_mean == 0.0 {
            (0.0, 1.0)
        } else {
            (d_mean.signum() * f64::INFINITY, 0.0)
        };
        return Ok(PairedTTest {
            statistic,
            df,
            p_value,
        });
    }

    let statistic = d_mean / (d_std / (n as f64).sqrt());
    Ok(PairedTTest {
        statistic,
        df,
        p_value: student_t_two_sided(statistic, df as f64),
    })
}

/// `P(|T| >= |t|)` for Student's t with `df` degrees of freedom.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_incomplete_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// `I_x(a, b)` evaluated with a continued fraction.
fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

const CF_MAX_ITER: usize = 300;
const CF_EPS: f64 = 1e-14;
const CF_TINY: f64 = 1e-300;

// Modified Lentz evaluation.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < CF_TINY {
        d = CF_TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=CF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < CF_TINY {
            d = CF_TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < CF_TINY {
            c = CF_TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < CF_TINY {
            d = CF_TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < CF_TINY {
            c = CF_TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < CF_EPS {
            break;
        }
    }
    h
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS[0];
    for (i, coef) in LANCZOS.iter().enumerate().skip(1) {
        sum += coef / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn mean_and_std_match_sample_definitions() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        // population std is 2, sample std is sqrt(32 / 7)
        assert!(close(sample_std(&values).expect("std"), (32.0f64 / 7.0).sqrt(), 1e-12));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn ln_gamma_hits_factorials() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-12));
        assert!(close(ln_gamma(5.0), 24.0f64.ln(), 1e-12));
        assert!(close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-12));
    }

    #[rstest]
    // Cauchy: P(|T| >= 1) = 1/2
    #[case(1.0, 1.0, 0.5)]
    // df = 2: P(|T| >= t) = 1 - t / sqrt(t^2 + 2)
    #[case(2.0, 2.0, 1.0 - 2.0 / 6.0f64.sqrt())]
    #[case(0.0, 7.0, 1.0)]
    fn two_sided_tail_matches_closed_forms(#[case] t: f64, #[case] df: f64, #[case] want: f64) {
        assert!(close(student_t_two_sided(t, df), want, 1e-9));
        assert!(close(student_t_two_sided(-t, df), want, 1e-9));
    }

    #[test]
    fn paired_test_matches_reference_values() {
        let result =
            paired_t_test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 2.0, 4.0, 4.0, 7.0]).expect("test");
        assert_eq!(result.df, 4);
        assert!(close(result.statistic, -2.138_089_935_299_395, 1e-9));
        assert!(close(result.p_value, 0.099_300_683, 1e-6));
    }

    #[test]
    fn degenerate_differences() {
        let same = paired_t_test(&[3.0, 4.0, 5.0], &[3.0, 4.0, 5.0]).expect("test");
        assert_eq!((same.statistic, same.p_value), (0.0, 1.0));

        let shifted = paired_t_test(&[4.0, 5.0, 6.0], &[3.0, 4.0, 5.0]).expect("test");
        assert!(shifted.statistic.is_infinite() && shifted.statistic > 0.0);
        assert_eq!(shifted.p_value, 0.0);
    }

    #[test]
    fn unequal_or_tiny_samples_are_rejected() {
        assert!(matches!(
            paired_t_test(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(EvalError::InvalidRequest(_))
        ));
        assert!(matches!(
            paired_t_test(&[1.0], &[2.0]),
            Err(EvalError::InvalidRequest(_))
        ));
    }
}

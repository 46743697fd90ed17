/// 分段线性评分曲线
///
/// - `actual >= ideal` -> 100
/// - `floor <= actual < ideal` -> 50 ~ 100 线性插值
/// - `actual < floor` -> 按 `actual / floor` 压缩到 0 ~ 50
pub fn piecewise_score(actual: f64, floor: f64, ideal: f64) -> f64 {
    if actual >= ideal {
        100.0
    } else if actual >= floor {
        50.0 + (actual - floor) / (ideal - floor) * 50.0
    } else if floor > 0.0 {
        (actual / floor * 50.0).max(0.0)
    } else {
        0.0
    }
}

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 总体标准差
pub fn population_std_dev(values: &[f64]) -> f64 {
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piecewise_hits_anchor_points() {
        assert_eq!(piecewise_score(0.02, 0.001, 0.02), 100.0);
        assert_eq!(piecewise_score(0.5, 0.001, 0.02), 100.0);
        assert_eq!(piecewise_score(0.001, 0.001, 0.02), 50.0);
        assert_eq!(piecewise_score(0.0, 0.001, 0.02), 0.0);
        assert!((piecewise_score(0.0005, 0.001, 0.02) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn piecewise_interpolates_between_floor_and_ideal() {
        let midpoint = (0.001 + 0.02) / 2.0;
        assert!((piecewise_score(midpoint, 0.001, 0.02) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn piecewise_is_monotonic() {
        let mut last = -1.0;
        for i in 0..=300 {
            let score = piecewise_score(i as f64 * 0.0001, 0.001, 0.02);
            assert!(score >= last);
            assert!((0.0..=100.0).contains(&score));
            last = score;
        }
    }

    #[test]
    fn std_dev_is_population_based() {
        assert_eq!(population_std_dev(&[100.0, 0.0]), 50.0);
        assert_eq!(population_std_dev(&[42.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}

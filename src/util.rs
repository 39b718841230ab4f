pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Population variance: mean of squared deviations from the mean.
pub fn variance(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;

    let squared_deviations = data
        .iter()
        .map(|value| {
            let diff = value - data_mean;

            diff * diff
        })
        .collect::<Vec<f64>>();

    mean(&squared_deviations)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

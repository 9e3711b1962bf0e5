//! Synthetic data generators for gridded fixture stores.

/// Evenly spaced axis values `start + i * step`.
///
/// Values are computed from the index rather than accumulated, so
/// quarter-degree axes land exactly on their grid points.
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Grid with a value that encodes its own position.
///
/// Each cell is `col * 1000 + row`, so `grid[row * width + col]` can be
/// checked directly after a windowed read.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Stack of `steps` test grids where each step adds `step * 100_000`.
///
/// Laid out `[step, row, col]`, matching a `[time, latitude, longitude]`
/// array.
pub fn create_time_series_grid(steps: usize, width: usize, height: usize) -> Vec<f32> {
    let base = create_test_grid(width, height);
    let mut data = Vec::with_capacity(steps * base.len());
    for step in 0..steps {
        let offset = (step * 100_000) as f32;
        data.extend(base.iter().map(|v| v + offset));
    }
    data
}

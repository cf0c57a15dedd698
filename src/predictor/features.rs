/// One-hot vector of length `classes` with a single 1.0 at `code - 1`.
///
/// The index is clamped into `[0, classes - 1]`, so codes below 1 land on the
/// first slot and codes above `classes` on the last.
pub fn one_hot(code: i64, classes: usize) -> Vec<f64> {
    let mut vector = vec![0.0; classes];
    if classes == 0 {
        return vector;
    }
    let index = code.saturating_sub(1).clamp(0, classes as i64 - 1) as usize;
    vector[index] = 1.0;
    vector
}

/// Concatenate the one-hot encodings of two codes into a `2 * classes` vector.
///
/// This is an index embedding. Adjacent codes share no weight.
pub fn encode_pair(code_a: i64, code_b: i64, classes: usize) -> Vec<f64> {
    let mut features = one_hot(code_a, classes);
    features.extend(one_hot(code_b, classes));
    features
}

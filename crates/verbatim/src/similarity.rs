/// Calculate cosine similarity between two embeddings.
///
/// Returns a value in [-1, 1]; for normalized embeddings from one model
/// family the practical range is near [0, 1]. Mismatched lengths and zero
/// vectors score 0.0 rather than erroring, since a degenerate vector can
/// never be the best match.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    dot_product / (magnitude_a * magnitude_b)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identical_vectors() {
    let v = vec![1.0, 2.0, 3.0];
    assert!((cosine(&v, &v) - 1.0).abs() < 0.001);
  }

  #[test]
  fn test_orthogonal_vectors() {
    let a = vec![1.0, 0.0];
    let b = vec![0.0, 1.0];
    assert!(cosine(&a, &b).abs() < 0.001);
  }

  #[test]
  fn test_opposite_vectors() {
    let a = vec![1.0, 2.0];
    let b = vec![-1.0, -2.0];
    assert!((cosine(&a, &b) + 1.0).abs() < 0.001);
  }

  #[test]
  fn test_zero_vector_scores_zero() {
    let a = vec![0.0, 0.0, 0.0];
    let b = vec![1.0, 2.0, 3.0];
    assert_eq!(cosine(&a, &b), 0.0);
  }

  #[test]
  fn test_length_mismatch_scores_zero() {
    let a = vec![1.0, 2.0];
    let b = vec![1.0, 2.0, 3.0];
    assert_eq!(cosine(&a, &b), 0.0);
  }

  #[test]
  fn test_closer_direction_scores_higher() {
    let query = vec![1.0, 1.0, 0.0];
    let near = vec![0.9, 1.1, 0.1];
    let far = vec![-0.5, 0.2, 5.0];
    assert!(cosine(&query, &near) > cosine(&query, &far));
  }
}

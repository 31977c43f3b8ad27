// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SOFTMAX
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Transforma scores arbitrários numa distribuição que soma 1:
//
//   softmax(v_i) = exp(v_i - max) / Σ exp(v_j - max)
//
// Subtrair o máximo não muda o resultado e impede overflow de exp().
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::types::ScoredEntry;

/// Normaliza uma coleção de entradas, retornando uma nova coleção.
///
/// Identificadores e ordem são preservados. Entrada vazia retorna vazio.
///
/// # Exemplo
///
/// ```rust
/// use cui2vec::{softmax, ScoredEntry};
///
/// let out = softmax(&[ScoredEntry::new("A", 1.0), ScoredEntry::new("B", 1.0)]);
/// assert!((out[0].value - 0.5).abs() < 1e-12);
/// ```
pub fn softmax(entries: &[ScoredEntry]) -> Vec<ScoredEntry> {
    let mut normalized = entries.to_vec();
    softmax_in_place(&mut normalized);
    normalized
}

/// Versão in-place de [`softmax`], sem alocar.
pub fn softmax_in_place(entries: &mut [ScoredEntry]) {
    if entries.is_empty() {
        return;
    }

    let max = entries
        .iter()
        .map(|e| e.value)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut sum = 0.0;
    for entry in entries.iter_mut() {
        entry.value = (entry.value - max).exp();
        sum += entry.value;
    }

    // sum >= 1, o termo do máximo vale exp(0)
    for entry in entries.iter_mut() {
        entry.value /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(entries: &[ScoredEntry]) -> f64 {
        entries.iter().map(|e| e.value).sum()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn test_sums_to_one() {
        let input = vec![
            ScoredEntry::new("A", 0.9),
            ScoredEntry::new("B", -0.3),
            ScoredEntry::new("C", 0.0),
            ScoredEntry::new("D", 0.45),
        ];
        let out = softmax(&input);

        assert_eq!(out.len(), 4);
        assert!((total(&out) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_preserves_ids_and_order() {
        let input = vec![ScoredEntry::new("X", 2.0), ScoredEntry::new("Y", 1.0)];
        let out = softmax(&input);

        assert_eq!(out[0].id, "X");
        assert_eq!(out[1].id, "Y");
        assert!(out[0].value > out[1].value);
    }

    #[test]
    fn test_matches_textbook_formula() {
        let input = vec![ScoredEntry::new("A", 1.0), ScoredEntry::new("B", 2.0)];
        let out = softmax(&input);

        let denom = 1f64.exp() + 2f64.exp();
        assert!((out[0].value - 1f64.exp() / denom).abs() < 1e-12);
        assert!((out[1].value - 2f64.exp() / denom).abs() < 1e-12);
    }

    #[test]
    fn test_large_magnitudes_do_not_overflow() {
        let input = vec![ScoredEntry::new("A", 1000.0), ScoredEntry::new("B", 999.0)];
        let out = softmax(&input);

        assert!(out.iter().all(|e| e.value.is_finite()));
        assert!((total(&out) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_entry_gets_all_mass() {
        let mut entries = vec![ScoredEntry::new("only", -42.0)];
        softmax_in_place(&mut entries);
        assert_eq!(entries[0].value, 1.0);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SIMD - SINGLE INSTRUCTION, MULTIPLE DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Operações vetoriais sobre `f64` usadas pelo motor de similaridade.
//
// Os vetores do cui2vec têm 500 dimensões em precisão dupla:
// - Loop tradicional: 500 iterações
// - AVX2 (256-bit): 125 iterações (4 doubles por instrução)
//
// O produto escalar e as duas normas são acumulados numa única passada,
// assim a checagem de magnitude zero não custa uma segunda leitura.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Motivos pelos quais um par de vetores não tem similaridade cosseno definida.
///
/// Não é uma falha da consulta: o motor apenas descarta o par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CosineError {
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("zero-magnitude vector")]
    ZeroMagnitude,

    #[error("non-finite component")]
    NonFinite,
}

/// Acumula `(a · b, ||a||², ||b||²)` - implementação escalar (fallback).
///
/// # Complexidade
/// O(n) onde n é o tamanho dos vetores
pub fn dot_and_norms_scalar(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    assert_eq!(a.len(), b.len(), "Vectors must have the same length");

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    (dot, norm_a, norm_b)
}

/// Acumula `(a · b, ||a||², ||b||²)` com AVX2 + FMA.
///
/// # Safety
///
/// O caller deve garantir que a CPU suporta AVX2 e FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn dot_and_norms_avx2(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    assert_eq!(a.len(), b.len(), "Vectors must have the same length");
    let len = a.len();

    // Acumuladores SIMD (4 doubles cada)
    let mut dot_acc = _mm256_setzero_pd();
    let mut norm_a_acc = _mm256_setzero_pd();
    let mut norm_b_acc = _mm256_setzero_pd();

    let chunks = len / 4;
    for i in 0..chunks {
        let offset = i * 4;

        let va = _mm256_loadu_pd(a.as_ptr().add(offset));
        let vb = _mm256_loadu_pd(b.as_ptr().add(offset));

        dot_acc = _mm256_fmadd_pd(va, vb, dot_acc);
        norm_a_acc = _mm256_fmadd_pd(va, va, norm_a_acc);
        norm_b_acc = _mm256_fmadd_pd(vb, vb, norm_b_acc);
    }

    let mut dot = hsum_pd_avx2(dot_acc);
    let mut norm_a = hsum_pd_avx2(norm_a_acc);
    let mut norm_b = hsum_pd_avx2(norm_b_acc);

    // Resto (len % 4)
    for i in (chunks * 4)..len {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    (dot, norm_a, norm_b)
}

/// Soma horizontal de 4 doubles em um registro AVX2
///
/// Reduz [a0,a1,a2,a3] para a0+a1+a2+a3
#[cfg(target_arch = "x86_64")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum_pd_avx2(v: __m256d) -> f64 {
    let low = _mm256_castpd256_pd128(v);
    let high = _mm256_extractf128_pd(v, 1);
    // [a0+a2, a1+a3]
    let pair = _mm_add_pd(low, high);
    let upper = _mm_unpackhi_pd(pair, pair);
    _mm_cvtsd_f64(_mm_add_sd(pair, upper))
}

/// Seleciona automaticamente a melhor implementação disponível
pub fn dot_and_norms(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return unsafe { dot_and_norms_avx2(a, b) };
        }
    }

    dot_and_norms_scalar(a, b)
}

/// Similaridade cosseno checada.
///
/// # Fórmula
/// ```text
/// cos(θ) = (A · B) / (||A|| × ||B||)
/// ```
///
/// Retorna erro em vez de NaN quando as dimensões diferem, quando algum
/// dos vetores tem magnitude zero ou quando há componentes NaN/infinitos.
/// Magnitudes que estouram (ou somem) em `f64` são reescaladas antes.
pub fn try_cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, CosineError> {
    if a.len() != b.len() {
        return Err(CosineError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = dot_and_norms(a, b);
    let cosine = if dot.is_finite() && norm_a.is_normal() && norm_b.is_normal() {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    } else {
        scaled_cosine(a, b)?
    };

    if cosine.is_finite() {
        Ok(cosine)
    } else {
        Err(CosineError::NonFinite)
    }
}

/// Caminho lento: divide cada vetor pelo maior componente absoluto.
///
/// O cosseno não muda com a escala, e com componentes em [-1, 1] as somas
/// de quadrados ficam entre 1 e `len`.
fn scaled_cosine(a: &[f64], b: &[f64]) -> Result<f64, CosineError> {
    let scale_a = max_abs(a)?;
    let scale_b = max_abs(b)?;
    if scale_a == 0.0 || scale_b == 0.0 {
        return Err(CosineError::ZeroMagnitude);
    }

    let a: Vec<f64> = a.iter().map(|x| x / scale_a).collect();
    let b: Vec<f64> = b.iter().map(|x| x / scale_b).collect();
    let (dot, norm_a, norm_b) = dot_and_norms(&a, &b);

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

fn max_abs(v: &[f64]) -> Result<f64, CosineError> {
    v.iter().try_fold(0.0f64, |max, x| {
        if x.is_finite() {
            Ok(max.max(x.abs()))
        } else {
            Err(CosineError::NonFinite)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = a.clone();

        let similarity = try_cosine_similarity(&a, &b).unwrap();
        assert!((similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let similarity = try_cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert_eq!(similarity, 0.0);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let b: Vec<f64> = a.iter().map(|x| -x).collect();

        let similarity = try_cosine_similarity(&a, &b).unwrap();
        assert!((similarity + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let err = try_cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, CosineError::DimensionMismatch { left: 2, right: 3 });
    }

    #[test]
    fn test_zero_magnitude_is_reported() {
        assert_eq!(
            try_cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]),
            Err(CosineError::ZeroMagnitude)
        );
        assert_eq!(try_cosine_similarity(&[], &[]), Err(CosineError::ZeroMagnitude));
    }

    #[test]
    fn test_simd_matches_scalar_on_large_vectors() {
        // Dimensão do cui2vec, com resto != 0 para o loop escalar
        let a: Vec<f64> = (0..501).map(|i| (i as f64).sin()).collect();
        let b: Vec<f64> = (0..501).map(|i| (i as f64).cos()).collect();

        let (dot_s, na_s, nb_s) = dot_and_norms_scalar(&a, &b);
        let (dot, na, nb) = dot_and_norms(&a, &b);

        assert!((dot_s - dot).abs() < 1e-9);
        assert!((na_s - na).abs() < 1e-9);
        assert!((nb_s - nb).abs() < 1e-9);
    }

    #[test]
    fn test_huge_magnitudes_are_rescaled() {
        let a = [1e200, 1e200];
        let b = [1e200, 0.0];

        let similarity = try_cosine_similarity(&a, &b).unwrap();
        assert!((similarity - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_magnitudes_are_rescaled() {
        let similarity = try_cosine_similarity(&[1e-200, 0.0], &[2e-200, 0.0]).unwrap();
        assert!((similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_components_are_reported() {
        assert_eq!(
            try_cosine_similarity(&[1.0, f64::NAN], &[1.0, 1.0]),
            Err(CosineError::NonFinite)
        );
        assert_eq!(
            try_cosine_similarity(&[1.0, 1.0], &[f64::INFINITY, 0.0]),
            Err(CosineError::NonFinite)
        );
    }
}

//! Módulo de otimizações de performance.
//!
//! Uma consulta de similaridade compara o alvo contra todos os ~100k
//! vetores do modelo, então o cosseno é o laço mais quente do crate.
//!
//! ## Técnicas Utilizadas
//!
//! - **SIMD (AVX2 + FMA)**: Processa 4 doubles por instrução
//! - **Passada única**: Produto escalar e normas acumulados juntos
//! - **Cache-friendly**: Acesso sequencial à memória

/// Operações vetoriais otimizadas com SIMD.
///
/// - [`try_cosine_similarity`]: Cosseno com checagem de dimensão e magnitude
/// - [`simd::dot_and_norms`]: Produto escalar + normas numa passada
///
/// Usa instruções AVX2 quando disponíveis (x86_64),
/// com fallback para implementação escalar.
pub mod simd;

pub use simd::{try_cosine_similarity, CosineError};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MOTOR DE SIMILARIDADE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Ranqueia todos os identificadores do store por similaridade cosseno com um
// alvo. Varredura exaustiva O(n), sem índice aproximado.
//
// Fluxo de uma consulta:
//   1. Busca o vetor alvo (identificador ausente é erro)
//   2. Cosseno contra todos os outros vetores, num pool Rayon de 2P threads
//   3. Pares com dimensão diferente ou magnitude zero são descartados
//   4. Softmax sobre os scores brutos
//   5. Ordena por score decrescente (empate: identificador crescente)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::config::SimilarityConfig;
use crate::performance::try_cosine_similarity;
use crate::softmax::softmax_in_place;
use crate::store::EmbeddingStore;
use crate::types::ScoredEntry;
use crate::utils::ActionTimer;

/// Erros de consulta
#[derive(Debug, thiserror::Error)]
pub enum SimilarityError {
    #[error("{0} is not in the embedding store")]
    UnknownIdentifier(String),

    #[error("failed to build similarity worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Motor de similaridade com pool de workers dedicado.
///
/// O pool tem `2P` threads (ver [`SimilarityConfig`]), então nunca há mais
/// que `2P` comparações em andamento. Um mesmo motor pode atender várias
/// consultas, inclusive de threads diferentes.
///
/// # Exemplo
///
/// ```rust
/// use cui2vec::{EmbeddingStore, SimilarityConfig, SimilarityEngine};
///
/// let store: EmbeddingStore = vec![
///     ("A".to_string(), vec![1.0, 0.0]),
///     ("B".to_string(), vec![1.0, 0.1]),
///     ("C".to_string(), vec![0.0, 1.0]),
/// ]
/// .into_iter()
/// .collect();
///
/// let engine = SimilarityEngine::new(SimilarityConfig::new().with_parallelism(2)).unwrap();
/// let ranked = engine.similar(&store, "A").unwrap();
///
/// assert_eq!(ranked[0].id, "B");
/// assert_eq!(ranked[1].id, "C");
/// ```
pub struct SimilarityEngine {
    config: SimilarityConfig,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("config", &self.config)
            .field("workers", &self.workers())
            .finish()
    }
}

impl SimilarityEngine {
    /// Cria o motor e seu pool de workers.
    pub fn new(config: SimilarityConfig) -> Result<Self, SimilarityError> {
        let workers = config.effective_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("cui2vec-sim-{i}"))
            .build()?;

        log::debug!("🔧 Pool de similaridade: {} workers", workers);
        Ok(Self { config, pool })
    }

    /// Cria o motor com P = número de cores.
    pub fn with_defaults() -> Result<Self, SimilarityError> {
        Self::new(SimilarityConfig::default())
    }

    /// Configuração em uso
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Número máximo de comparações simultâneas
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Similaridade cosseno bruta contra todos os outros identificadores.
    ///
    /// Sem softmax e sem ordenação; o alvo nunca aparece no resultado.
    pub fn raw_scores(
        &self,
        store: &EmbeddingStore,
        target: &str,
    ) -> Result<Vec<ScoredEntry>, SimilarityError> {
        let target_vector = store
            .get(target)
            .ok_or_else(|| SimilarityError::UnknownIdentifier(target.to_string()))?;

        let candidates: Vec<(&str, &[f64])> =
            store.iter().filter(|(id, _)| *id != target).collect();
        let skipped = AtomicUsize::new(0);

        // collect() do Rayon preserva a ordem de `candidates`
        let scores: Vec<ScoredEntry> = self.pool.install(|| {
            candidates
                .par_iter()
                .filter_map(|&(id, vector)| match try_cosine_similarity(target_vector, vector) {
                    Ok(score) => Some(ScoredEntry::new(id, score)),
                    Err(reason) => {
                        log::trace!("par ({}, {}) ignorado: {}", target, id, reason);
                        skipped.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                })
                .collect()
        });

        let skipped = skipped.into_inner();
        if skipped > 0 {
            log::debug!(
                "{} de {} pares ignorados (dimensão diferente, magnitude zero ou não finito)",
                skipped,
                candidates.len()
            );
        }

        Ok(scores)
    }

    /// Ranqueia os identificadores por similaridade com `target`.
    ///
    /// Retorna probabilidades (softmax dos cossenos) em ordem decrescente.
    /// Duas chamadas sobre o mesmo store retornam exatamente a mesma sequência.
    pub fn similar(
        &self,
        store: &EmbeddingStore,
        target: &str,
    ) -> Result<Vec<ScoredEntry>, SimilarityError> {
        let timer = ActionTimer::start("Consulta de similaridade");

        let mut ranked = self.raw_scores(store, target)?;
        softmax_in_place(&mut ranked);
        self.pool
            .install(|| ranked.par_sort_by(ScoredEntry::rank_cmp));

        log::info!(
            "🔎 {}: {} conceitos ranqueados em {}ms",
            target,
            ranked.len(),
            timer.elapsed_ms()
        );
        timer.stop_and_log();

        Ok(ranked)
    }

    /// Como [`similar`](Self::similar), truncado aos `k` primeiros.
    ///
    /// As probabilidades continuam relativas ao store inteiro.
    pub fn most_similar(
        &self,
        store: &EmbeddingStore,
        target: &str,
        k: usize,
    ) -> Result<Vec<ScoredEntry>, SimilarityError> {
        let mut ranked = self.similar(store, target)?;
        ranked.truncate(k);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SimilarityEngine {
        SimilarityEngine::new(SimilarityConfig::new().with_parallelism(2)).unwrap()
    }

    fn store(entries: &[(&str, &[f64])]) -> EmbeddingStore {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_pool_is_twice_the_budget() {
        assert_eq!(engine().workers(), 4);
    }

    #[test]
    fn test_orthogonal_raw_score_is_zero() {
        let store = store(&[("A", &[1.0, 0.0]), ("B", &[0.0, 1.0])]);
        let raw = engine().raw_scores(&store, "A").unwrap();

        assert_eq!(raw, vec![ScoredEntry::new("B", 0.0)]);
    }

    #[test]
    fn test_target_never_in_result() {
        let store = store(&[
            ("A", &[1.0, 0.0]),
            ("B", &[0.5, 0.5]),
            ("C", &[0.0, 1.0]),
        ]);
        let ranked = engine().similar(&store, "A").unwrap();

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|e| e.id != "A"));
    }

    #[test]
    fn test_ranked_descending_and_normalized() {
        let store = store(&[
            ("A", &[1.0, 0.0]),
            ("B", &[1.0, 0.2]),
            ("C", &[0.0, 1.0]),
            ("D", &[-1.0, 0.0]),
        ]);
        let ranked = engine().similar(&store, "A").unwrap();

        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "D"]);
        assert!(ranked.windows(2).all(|w| w[0].value >= w[1].value));

        let total: f64 = ranked.iter().map(|e| e.value).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_skips_zero_magnitude_and_mismatched_dimensions() {
        let store = store(&[
            ("A", &[1.0, 0.0]),
            ("ZERO", &[0.0, 0.0]),
            ("WIDE", &[1.0, 0.0, 0.0]),
            ("EMPTY", &[]),
            ("OK", &[2.0, 0.0]),
        ]);
        let ranked = engine().similar(&store, "A").unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "OK");
        assert_eq!(ranked[0].value, 1.0);
    }

    #[test]
    fn test_zero_magnitude_target_yields_empty_ranking() {
        let store = store(&[("A", &[0.0, 0.0]), ("B", &[1.0, 0.0])]);
        assert!(engine().similar(&store, "A").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        let store = store(&[("A", &[1.0])]);
        let err = engine().similar(&store, "NOPE").unwrap_err();
        assert!(matches!(err, SimilarityError::UnknownIdentifier(ref id) if id == "NOPE"));
    }

    #[test]
    fn test_ties_are_broken_by_identifier() {
        let store = store(&[
            ("T", &[1.0, 1.0]),
            ("Z", &[1.0, 0.0]),
            ("M", &[0.0, 1.0]),
            ("B", &[1.0, 0.0]),
        ]);
        let ranked = engine().similar(&store, "T").unwrap();

        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "M", "Z"]);
    }

    #[test]
    fn test_most_similar_truncates() {
        let store = store(&[
            ("A", &[1.0, 0.0]),
            ("B", &[1.0, 0.1]),
            ("C", &[1.0, 0.5]),
            ("D", &[0.0, 1.0]),
        ]);
        let top = engine().most_similar(&store, "A", 2).unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "B");
        assert_eq!(top[1].id, "C");
    }

    #[test]
    fn test_huge_magnitudes_stay_normalized() {
        let store = store(&[
            ("A", &[1e200, 1e200]),
            ("B", &[1e200, 0.0]),
            ("C", &[1.0, 0.0]),
        ]);

        let raw = engine().raw_scores(&store, "A").unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw.iter().all(|e| (e.value - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12));

        let ranked = engine().similar(&store, "A").unwrap();
        assert_eq!(ranked, vec![ScoredEntry::new("B", 0.5), ScoredEntry::new("C", 0.5)]);
    }

    #[test]
    fn test_skips_non_finite_vectors() {
        let store = store(&[
            ("A", &[1.0, 0.0]),
            ("NAN", &[f64::NAN, 1.0]),
            ("INF", &[f64::INFINITY, 1.0]),
            ("OK", &[1.0, 1.0]),
        ]);
        let ranked = engine().similar(&store, "A").unwrap();

        assert_eq!(ranked, vec![ScoredEntry::new("OK", 1.0)]);
    }
}

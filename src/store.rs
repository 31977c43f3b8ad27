// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EMBEDDING STORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Mapa identificador → vetor produzido por uma carga. Depois de construído
// não expõe mutação: consultas concorrentes compartilham `&EmbeddingStore`
// (ou `Arc<EmbeddingStore>`) e o borrow checker impede carga e consulta
// simultâneas sobre o mesmo store.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::similarity::{SimilarityEngine, SimilarityError};
use crate::types::{FeatureVector, ScoredEntry};

/// Motor compartilhado pelas consultas feitas direto no store.
static DEFAULT_ENGINE: OnceCell<SimilarityEngine> = OnceCell::new();

fn default_engine() -> Result<&'static SimilarityEngine, SimilarityError> {
    DEFAULT_ENGINE.get_or_try_init(SimilarityEngine::with_defaults)
}

/// Modelo cui2vec carregado em memória.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingStore {
    vectors: HashMap<String, FeatureVector>,
}

impl EmbeddingStore {
    /// Store vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Vetor de um identificador
    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Verifica se o identificador existe
    pub fn contains(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    /// Número de identificadores
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Store sem identificadores
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Identificadores em ordem lexicográfica
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.vectors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Itera sobre `(identificador, vetor)` em ordem arbitrária, porém
    /// estável enquanto o store não muda.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.vectors
            .iter()
            .map(|(id, vector)| (id.as_str(), vector.as_slice()))
    }

    /// Dimensão comum dos vetores, se todos tiverem o mesmo tamanho.
    ///
    /// A carga não impõe dimensão única; isto permite que o caller verifique.
    pub fn dimension(&self) -> Option<usize> {
        let mut lengths = self.vectors.values().map(Vec::len);
        let first = lengths.next()?;
        lengths.all(|len| len == first).then_some(first)
    }

    /// Ranqueia todos os outros identificadores por similaridade com `id`.
    ///
    /// Usa um [`SimilarityEngine`] padrão compartilhado (P = cores da CPU).
    /// Para controlar o paralelismo, use [`SimilarityEngine::similar`].
    pub fn similar(&self, id: &str) -> Result<Vec<ScoredEntry>, SimilarityError> {
        default_engine()?.similar(self, id)
    }

    /// Os `k` identificadores mais similares a `id`.
    pub fn most_similar(&self, id: &str, k: usize) -> Result<Vec<ScoredEntry>, SimilarityError> {
        default_engine()?.most_similar(self, id, k)
    }
}

impl From<HashMap<String, FeatureVector>> for EmbeddingStore {
    fn from(vectors: HashMap<String, FeatureVector>) -> Self {
        Self { vectors }
    }
}

/// Coleta pares em um store; identificadores repetidos ficam com o último vetor.
impl FromIterator<(String, FeatureVector)> for EmbeddingStore {
    fn from_iter<I: IntoIterator<Item = (String, FeatureVector)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}

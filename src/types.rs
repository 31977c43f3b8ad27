// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS FUNDAMENTAIS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Vetor de features de um identificador, na ordem das colunas do arquivo.
pub type FeatureVector = Vec<f64>;

/// Um identificador com um score em relação a um identificador alvo.
///
/// O significado de `value` depende da etapa: similaridade cosseno bruta
/// durante a agregação, probabilidade depois do softmax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    /// Identificador (ex: `C0000005`)
    #[serde(rename = "cui")]
    pub id: String,

    /// Score associado
    pub value: f64,
}

impl ScoredEntry {
    /// Cria uma nova entrada
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// Ordem de ranking: score decrescente, empate resolvido pelo identificador.
    ///
    /// Usa `total_cmp`, então a ordem é total mesmo com NaN.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for ScoredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.6}", self.id, self.value)
    }
}

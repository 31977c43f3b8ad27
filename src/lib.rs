//! # cui2vec - Implementação Rust
//!
//! Este crate carrega modelos **cui2vec** pré-treinados (identificador de
//! conceito → vetor de 500 features) e ranqueia conceitos por similaridade
//! com um conceito alvo.
//!
//! ## O que é o cui2vec?
//!
//! O cui2vec é um conjunto de embeddings de conceitos médicos (CUIs do UMLS)
//! treinados sobre milhões de registros clínicos:
//! - Artigo: <https://arxiv.org/pdf/1804.01486.pdf>
//! - Arquivo: CSV com o CUI na primeira coluna e as features nas demais
//!
//! ## Arquitetura Principal
//!
//! ### 1. Loader (`loader`)
//! Um leitor divide a fonte em linhas e as distribui por uma fila limitada
//! para workers de parsing (um por core). Inserções no mapa compartilhado
//! são exclusivas. Qualquer linha inválida aborta a carga inteira.
//!
//! ### 2. Motor de Similaridade (`similarity`)
//! Varredura exaustiva do store com similaridade cosseno, num pool Rayon de
//! 2P threads. Os scores passam por softmax e são ordenados de forma
//! determinística.
//!
//! ### 3. Softmax (`softmax`)
//! Normalização numericamente estável (subtrai o máximo antes de exp()).
//!
//! ### 4. Performance (`performance`)
//! Cosseno com AVX2 + FMA quando disponível, fallback escalar.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use cui2vec::prelude::*;
//!
//! let csv = "\"\",V1,V2\nC0000005,1.0,0.0\nC0000039,0.0,1.0\nC0000052,0.9,0.1\n";
//! let store = load_model(csv.as_bytes(), true).unwrap();
//!
//! let ranked = store.similar("C0000005").unwrap();
//! assert_eq!(ranked[0].id, "C0000052");
//! assert!(ranked.iter().all(|c| c.id != "C0000005"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o crate.
///
/// - [`ScoredEntry`]: Identificador com score
/// - [`FeatureVector`]: Vetor de features
pub mod types;

/// Store imutável produzido por uma carga.
pub mod store;

/// Carregamento concorrente de modelos.
///
/// - [`Loader`]: Pipeline leitor → fila limitada → workers
/// - [`load_model`] / [`load_model_from_path`]: Atalhos com configuração padrão
/// - [`LoadError`]: Erros de I/O e registros malformados
pub mod loader;

/// Ranking paralelo por similaridade cosseno.
pub mod similarity;

/// Normalização softmax de scores.
pub mod softmax;

/// Otimizações de performance de baixo nível.
///
/// - Similaridade cosseno com SIMD (AVX2)
/// - Checagem de dimensão e magnitude zero
pub mod performance;

/// Conversão entre CUIs (`C0000005`) e inteiros.
pub mod codec;

/// Configuração do loader e do motor via variáveis de ambiente.
///
/// - `CUI2VEC_LOADER_WORKERS`: Workers de parsing (padrão: cores da CPU)
/// - `CUI2VEC_QUEUE_CAPACITY`: Capacidade da fila de linhas
/// - `CUI2VEC_SIMILARITY_WORKERS`: Budget P das consultas (2P comparações simultâneas)
/// - `CUI2VEC_SKIP_HEADER`: Descarta a primeira linha
pub mod config;

/// Utilitários diversos.
pub mod utils;

// Re-exports principais
pub use codec::{decode_identifier, encode_identifier, CodecError, IdentifierCodec};
pub use config::{
    install_panic_hook, load_engine_config, EngineConfig, LoaderConfig, SimilarityConfig,
};
pub use loader::{load_model, load_model_from_path, LoadError, LoadReport, Loader};
pub use performance::simd::{try_cosine_similarity, CosineError};
pub use similarity::{SimilarityEngine, SimilarityError};
pub use softmax::{softmax, softmax_in_place};
pub use store::EmbeddingStore;
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// Importar tudo de uma vez:
/// ```rust
/// use cui2vec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codec::{decode_identifier, encode_identifier};
    pub use crate::config::{LoaderConfig, SimilarityConfig};
    pub use crate::loader::{load_model, load_model_from_path, Loader};
    pub use crate::similarity::SimilarityEngine;
    pub use crate::softmax::softmax;
    pub use crate::store::EmbeddingStore;
    pub use crate::types::*;
}

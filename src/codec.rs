// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CODEC DE IDENTIFICADORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Conversão entre identificadores textuais (uma letra + número com zeros à
// esquerda, ex: C0000005) e inteiros. Nem o loader nem o motor dependem
// disto; é uma conveniência para quem indexa conceitos por número.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefixo padrão de um CUI (Concept Unique Identifier)
pub const DEFAULT_PREFIX: char = 'C';

/// Largura padrão do corpo numérico
pub const DEFAULT_WIDTH: usize = 7;

/// Maior largura aceita: dígitos de `u32::MAX`
pub const MAX_WIDTH: usize = 10;

static DEFAULT_CODEC: Lazy<IdentifierCodec> = Lazy::new(IdentifierCodec::default);

/// Erros do codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("{0} is not a cui")]
    NotAnIdentifier(String),

    #[error("{0} does not fit in a u32")]
    OutOfRange(String),

    #[error("invalid identifier prefix {0:?}: expected a single ASCII letter")]
    InvalidPrefix(char),

    #[error("invalid identifier width {0}: expected 1..=10")]
    InvalidWidth(usize),
}

/// Codec para um formato fixo `<letra><dígitos>`.
#[derive(Debug, Clone)]
pub struct IdentifierCodec {
    prefix: char,
    width: usize,
    pattern: Regex,
}

impl Default for IdentifierCodec {
    fn default() -> Self {
        Self::build(DEFAULT_PREFIX, DEFAULT_WIDTH)
            .unwrap_or_else(|e| unreachable!("default identifier pattern: {e}"))
    }
}

impl IdentifierCodec {
    /// Cria um codec para outro vocabulário (ex: `D` + 6 dígitos).
    pub fn new(prefix: char, width: usize) -> Result<Self, CodecError> {
        if !prefix.is_ascii_alphabetic() {
            return Err(CodecError::InvalidPrefix(prefix));
        }
        if !(1..=MAX_WIDTH).contains(&width) {
            return Err(CodecError::InvalidWidth(width));
        }
        Self::build(prefix, width)
    }

    fn build(prefix: char, width: usize) -> Result<Self, CodecError> {
        // Prefixo ASCII, então não há metacaracteres de regex para escapar
        let pattern = Regex::new(&format!("^{prefix}([0-9]{{{width},}})$"))
            .map_err(|_| CodecError::InvalidWidth(width))?;
        Ok(Self {
            prefix,
            width,
            pattern,
        })
    }

    /// Prefixo do formato
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Largura mínima do corpo numérico
    pub fn width(&self) -> usize {
        self.width
    }

    /// Converte um inteiro para identificador.
    pub fn encode(&self, value: u32) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.width)
    }

    /// Converte um identificador para inteiro.
    ///
    /// Só aceita a forma canônica produzida por [`encode`](Self::encode):
    /// corpos mais largos que `width` não podem começar com zero.
    pub fn decode(&self, id: &str) -> Result<u32, CodecError> {
        let digits = self
            .pattern
            .captures(id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| CodecError::NotAnIdentifier(id.to_string()))?;

        if digits.len() > self.width && digits.starts_with('0') {
            return Err(CodecError::NotAnIdentifier(id.to_string()));
        }

        digits
            .parse::<u32>()
            .map_err(|_| CodecError::OutOfRange(id.to_string()))
    }
}

/// Converte um inteiro para CUI (`C` + 7 dígitos).
///
/// ```rust
/// assert_eq!(cui2vec::encode_identifier(5), "C0000005");
/// ```
pub fn encode_identifier(value: u32) -> String {
    DEFAULT_CODEC.encode(value)
}

/// Converte um CUI para inteiro.
///
/// ```rust
/// assert_eq!(cui2vec::decode_identifier("C0000005"), Ok(5));
/// assert!(cui2vec::decode_identifier("X0000005").is_err());
/// ```
pub fn decode_identifier(id: &str) -> Result<u32, CodecError> {
    DEFAULT_CODEC.decode(id)
}

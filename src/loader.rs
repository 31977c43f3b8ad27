// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LOADER DO MODELO PRÉ-TREINADO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Carrega um arquivo cui2vec (CSV: identificador + 500 features) em memória.
//
// Pipeline:
//   leitor (thread do caller) ──fila limitada──▶ N workers de parsing
//                                                    │
//                                         Mutex<HashMap> (um escritor por vez)
//
// O loader só retorna depois que o leitor esgotou a fonte E todos os workers
// terminaram (barreira do `thread::scope`). Qualquer linha malformada aborta
// a carga inteira: nenhum store parcial é devolvido.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::config::LoaderConfig;
use crate::store::EmbeddingStore;
use crate::types::FeatureVector;
use crate::utils::ActionTimer;

/// Tamanho máximo do trecho da linha mostrado nas mensagens de erro
const PREVIEW_CHARS: usize = 80;

/// Erros de carregamento
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at line {}: {} ({})", .line, .reason, preview(.content))]
    MalformedRecord {
        line: usize,
        reason: &'static str,
        content: String,
    },

    #[error(
        "invalid number {:?} in column {} at line {} ({})",
        .field,
        .column,
        .line,
        preview(.content)
    )]
    InvalidNumber {
        line: usize,
        column: usize,
        field: String,
        content: String,
        #[source]
        source: ParseFloatError,
    },

    #[error(
        "non-finite number {:?} in column {} at line {} ({})",
        .field,
        .column,
        .line,
        preview(.content)
    )]
    NonFiniteNumber {
        line: usize,
        column: usize,
        field: String,
        content: String,
    },

    #[error("failed to spawn loader worker: {0}")]
    Spawn(#[source] std::io::Error),
}

impl LoadError {
    /// Linha (1-based) onde o erro ocorreu, quando aplicável
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Io { line, .. }
            | Self::MalformedRecord { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::NonFiniteNumber { line, .. } => Some(*line),
            Self::Open { .. } | Self::Spawn(_) => None,
        }
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        format!("{content:?}")
    } else {
        let head: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{head:?}…")
    }
}

/// Resumo de uma carga
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Linhas consumidas da fonte (inclui o cabeçalho descartado)
    pub lines_read: usize,
    /// Registros parseados e inseridos
    pub records: usize,
    /// Linhas em branco ignoradas
    pub blank_lines: usize,
    /// Inserções que sobrescreveram um identificador repetido
    pub duplicates: usize,
    /// Duração total em milissegundos
    pub elapsed_ms: u128,
}

/// Uma linha da fonte, com número 1-based
struct Line {
    number: usize,
    text: String,
}

/// Estado compartilhado entre o leitor e os workers.
struct Shared {
    vectors: Mutex<HashMap<String, FeatureVector>>,
    error: Mutex<Option<LoadError>>,
    aborted: AtomicBool,
    records: AtomicUsize,
    blank_lines: AtomicUsize,
    duplicates: AtomicUsize,
}

impl Shared {
    fn new() -> Self {
        Self {
            vectors: Mutex::new(HashMap::new()),
            error: Mutex::new(None),
            aborted: AtomicBool::new(false),
            records: AtomicUsize::new(0),
            blank_lines: AtomicUsize::new(0),
            duplicates: AtomicUsize::new(0),
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    fn insert(&self, id: String, vector: FeatureVector) {
        let previous = self
            .vectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, vector);

        self.records.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Registra um erro e sinaliza abort. Mantém o de menor linha.
    fn fail(&self, err: LoadError) {
        self.aborted.store(true, Ordering::Release);

        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        let replace = match (slot.as_ref().and_then(LoadError::line), err.line()) {
            (Some(current), Some(new)) => new < current,
            (None, _) => slot.is_none(),
            (Some(_), None) => false,
        };
        if replace {
            *slot = Some(err);
        }
    }
}

/// Loader concorrente de modelos cui2vec.
///
/// # Exemplo
///
/// ```rust
/// use cui2vec::{Loader, LoaderConfig};
///
/// let csv = "\"\",V1,V2\n\"C0000005\",0.5,1.5\n\"C0000039\",-1.0,2.0\n";
/// let store = Loader::new(LoaderConfig::new().with_skip_header(true))
///     .load(csv.as_bytes())
///     .unwrap();
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.get("C0000005"), Some(&[0.5, 1.5][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Cria um loader com a configuração dada
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Configuração em uso
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Carrega o modelo e descarta o resumo.
    pub fn load<R: BufRead>(&self, reader: R) -> Result<EmbeddingStore, LoadError> {
        self.load_with_report(reader).map(|(store, _)| store)
    }

    /// Carrega o modelo e retorna também o [`LoadReport`].
    pub fn load_with_report<R: BufRead>(
        &self,
        reader: R,
    ) -> Result<(EmbeddingStore, LoadReport), LoadError> {
        let timer = ActionTimer::start("Carregamento do modelo");
        let workers = self.config.effective_workers();
        let capacity = self.config.effective_queue_capacity();
        let shared = Shared::new();

        log::debug!(
            "📥 Carregando modelo: {} workers, fila de {} linhas, skip_header={}",
            workers,
            capacity,
            self.config.skip_header
        );

        let lines_read = thread::scope(|scope| -> Result<usize, LoadError> {
            // Canal criado dentro do scope: um `?` abaixo derruba o Sender
            // e libera os workers já iniciados.
            let (tx, rx) = crossbeam_channel::bounded::<Line>(capacity);

            for worker_id in 0..workers {
                let rx = rx.clone();
                let shared = &shared;
                thread::Builder::new()
                    .name(format!("cui2vec-loader-{worker_id}"))
                    .spawn_scoped(scope, move || parse_worker(rx, shared))
                    .map_err(LoadError::Spawn)?;
            }
            drop(rx);

            Ok(self.feed(reader, tx, &shared))
        })?;

        if let Some(err) = shared
            .error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            log::warn!("❌ Carga abortada: {}", err);
            return Err(err);
        }

        let vectors = shared
            .vectors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let report = LoadReport {
            lines_read,
            records: shared.records.into_inner(),
            blank_lines: shared.blank_lines.into_inner(),
            duplicates: shared.duplicates.into_inner(),
            elapsed_ms: timer.elapsed_ms(),
        };

        log::info!(
            "📚 Modelo carregado: {} identificadores de {} linhas ({:.0} linhas/s)",
            vectors.len(),
            report.lines_read,
            timer.throughput(report.lines_read)
        );
        if report.duplicates > 0 {
            log::debug!("{} identificadores repetidos sobrescritos", report.duplicates);
        }
        timer.stop_and_log();

        Ok((EmbeddingStore::from(vectors), report))
    }

    /// Estágio leitor: distribui linhas para os workers. Retorna linhas lidas.
    fn feed<R: BufRead>(&self, reader: R, tx: Sender<Line>, shared: &Shared) -> usize {
        let mut lines = reader.lines();
        let mut number = 0;

        if self.config.skip_header {
            if let Some(header) = lines.next() {
                number += 1;
                if let Err(source) = header {
                    shared.fail(LoadError::Io { line: number, source });
                    return number;
                }
            }
        }

        for line in lines {
            if shared.is_aborted() {
                break;
            }
            number += 1;
            match line {
                Ok(text) => {
                    // Só falha se todos os workers saíram
                    if tx.send(Line { number, text }).is_err() {
                        break;
                    }
                }
                Err(source) => {
                    shared.fail(LoadError::Io { line: number, source });
                    break;
                }
            }
        }

        number
    }
}

fn parse_worker(rx: Receiver<Line>, shared: &Shared) {
    for line in rx.iter() {
        // Depois de um abort só drena a fila
        if shared.is_aborted() {
            continue;
        }
        match parse_record(&line.text, line.number) {
            Ok(Some((id, vector))) => shared.insert(id, vector),
            Ok(None) => {
                shared.blank_lines.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => shared.fail(err),
        }
    }
}

/// Parseia uma linha do modelo: identificador seguido de features.
///
/// Retorna `Ok(None)` para linhas em branco. O vetor não inclui a coluna
/// do identificador.
pub fn parse_record(line: &str, number: usize) -> Result<Option<(String, FeatureVector)>, LoadError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let malformed = |reason| LoadError::MalformedRecord {
        line: number,
        reason,
        content: line.to_string(),
    };

    let mut fields = Fields::new(line);
    let id = match fields.next() {
        Some(field) => field.map_err(malformed)?,
        None => return Ok(None),
    };
    if id.trim().is_empty() {
        return Err(malformed("empty identifier (header row? enable skip_header)"));
    }

    let mut vector = Vec::with_capacity(line.bytes().filter(|&b| b == b',').count());
    for (offset, field) in fields.enumerate() {
        let field = field.map_err(malformed)?;
        // coluna 1 é o identificador
        let column = offset + 2;
        let value = field
            .trim()
            .parse::<f64>()
            .map_err(|source| LoadError::InvalidNumber {
                line: number,
                column,
                field: field.to_string(),
                content: line.to_string(),
                source,
            })?;
        // "NaN" e "inf" passam no parse, mas não têm cosseno definido
        if !value.is_finite() {
            return Err(LoadError::NonFiniteNumber {
                line: number,
                column,
                field: field.to_string(),
                content: line.to_string(),
            });
        }
        vector.push(value);
    }

    Ok(Some((id.into_owned(), vector)))
}

/// Iterador sobre os campos de um registro separado por vírgulas.
///
/// Campos entre aspas podem conter vírgulas e aspas duplicadas (`""`).
/// Aspa sem fechamento ou aspa solta num campo sem aspas é erro.
struct Fields<'a> {
    line: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            done: false,
        }
    }

    fn quoted(&mut self) -> Result<Cow<'a, str>, &'static str> {
        let bytes = self.line.as_bytes();
        let mut value = String::new();
        let mut segment = self.pos + 1;

        loop {
            let quote = bytes[segment..]
                .iter()
                .position(|&b| b == b'"')
                .map(|offset| segment + offset)
                .ok_or("unterminated quoted field")?;

            value.push_str(&self.line[segment..quote]);

            match bytes.get(quote + 1) {
                Some(b'"') => {
                    value.push('"');
                    segment = quote + 2;
                }
                Some(b',') => {
                    self.pos = quote + 2;
                    return Ok(Cow::Owned(value));
                }
                None => {
                    self.done = true;
                    return Ok(Cow::Owned(value));
                }
                Some(_) => return Err("unexpected character after closing quote"),
            }
        }
    }

    fn unquoted(&mut self) -> Result<Cow<'a, str>, &'static str> {
        let rest = &self.line[self.pos..];
        let (field, next) = match rest.find(',') {
            Some(comma) => (&rest[..comma], Some(self.pos + comma + 1)),
            None => (rest, None),
        };

        if field.contains('"') {
            return Err("bare quote in unquoted field");
        }

        match next {
            Some(pos) => self.pos = pos,
            None => self.done = true,
        }
        Ok(Cow::Borrowed(field))
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<Cow<'a, str>, &'static str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let field = if self.line.as_bytes().get(self.pos) == Some(&b'"') {
            self.quoted()
        } else {
            self.unquoted()
        };

        if field.is_err() {
            self.done = true;
        }
        Some(field)
    }
}

/// Carrega um modelo de qualquer `Read` com a configuração padrão.
///
/// `skip_header` descarta a primeira linha incondicionalmente.
pub fn load_model<R: Read>(reader: R, skip_header: bool) -> Result<EmbeddingStore, LoadError> {
    Loader::new(LoaderConfig::new().with_skip_header(skip_header)).load(BufReader::new(reader))
}

/// Carrega um modelo a partir de um arquivo.
pub fn load_model_from_path(
    path: impl AsRef<Path>,
    skip_header: bool,
) -> Result<EmbeddingStore, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_model(file, skip_header)
}

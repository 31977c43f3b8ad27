// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO LOADER E DO MOTOR DE SIMILARIDADE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Paralelismo do carregamento e das consultas.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Capacidade da fila de linhas por worker do loader.
pub const QUEUE_SLOTS_PER_WORKER: usize = 64;

/// Configuração do loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Número de workers de parsing.
    /// Se None, usa o número de cores da CPU.
    pub workers: Option<usize>,

    /// Capacidade da fila entre o leitor e os workers.
    /// Se None, usa `QUEUE_SLOTS_PER_WORKER` × workers.
    pub queue_capacity: Option<usize>,

    /// Descarta a primeira linha (cabeçalho) incondicionalmente.
    pub skip_header: bool,
}

impl LoaderConfig {
    /// Cria configuração padrão.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define se o cabeçalho deve ser descartado.
    pub fn with_skip_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    /// Fixa o número de workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Número efetivo de workers de parsing.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Capacidade efetiva da fila de linhas.
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.effective_workers() * QUEUE_SLOTS_PER_WORKER)
            .max(1)
    }
}

/// Configuração do motor de similaridade.
#[derive(Debug, Clone, Default)]
pub struct SimilarityConfig {
    /// Budget de paralelismo P. No máximo 2P comparações rodam ao mesmo tempo.
    /// Se None, P = número de cores da CPU.
    pub parallelism: Option<usize>,
}

impl SimilarityConfig {
    /// Cria configuração padrão.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixa o budget de paralelismo P.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism.max(1));
        self
    }

    /// Número máximo de comparações simultâneas (2P).
    pub fn effective_workers(&self) -> usize {
        self.parallelism.unwrap_or_else(num_cpus::get).max(1) * 2
    }
}

/// Configuração completa do engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Carregamento
    pub loader: LoaderConfig,
    /// Consultas
    pub similarity: SimilarityConfig,
}

fn positive_env(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => {
            log::info!("📦 {}={}", name, value);
            Some(value)
        }
        _ => {
            log::warn!("⚠ {}={:?} inválido, usando padrão", name, raw);
            None
        }
    }
}

/// Interpreta flags booleanas do .env ("1", "true", "yes", "on").
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Carrega configuração a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `CUI2VEC_LOADER_WORKERS`: Workers de parsing (padrão: cores da CPU)
/// - `CUI2VEC_QUEUE_CAPACITY`: Capacidade da fila de linhas (padrão: 64 × workers)
/// - `CUI2VEC_SIMILARITY_WORKERS`: Budget P das consultas (padrão: cores da CPU)
/// - `CUI2VEC_SKIP_HEADER`: Descarta a primeira linha (padrão: false)
///
/// Valores inválidos ou zero são ignorados.
///
/// # Exemplo
///
/// ```rust,ignore
/// // .env
/// CUI2VEC_LOADER_WORKERS=4
/// CUI2VEC_SKIP_HEADER=true
///
/// // código
/// let config = load_engine_config();
/// assert_eq!(config.loader.workers, Some(4));
/// assert!(config.loader.skip_header);
/// ```
pub fn load_engine_config() -> EngineConfig {
    let mut config = EngineConfig::default();

    config.loader.workers = positive_env("CUI2VEC_LOADER_WORKERS");
    config.loader.queue_capacity = positive_env("CUI2VEC_QUEUE_CAPACITY");
    config.similarity.parallelism = positive_env("CUI2VEC_SIMILARITY_WORKERS");

    if let Ok(flag) = std::env::var("CUI2VEC_SKIP_HEADER") {
        config.loader.skip_header = parse_flag(&flag);
        log::info!("📦 CUI2VEC_SKIP_HEADER={}", config.loader.skip_header);
    }

    log::debug!(
        "🔧 Loader: {} workers, fila {} | Similaridade: {} comparações simultâneas ({} cores)",
        config.loader.effective_workers(),
        config.loader.effective_queue_capacity(),
        config.similarity.effective_workers(),
        num_cpus::get()
    );

    config
}

/// Instala panic hook que loga panics de workers antes do hook original.
///
/// Os workers do loader e do motor são threads nomeadas (`cui2vec-loader-N`,
/// `cui2vec-sim-N`), então o log identifica qual fase falhou.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        log::error!("[PANIC] Thread {} at {}: {}", thread_name, location, message);

        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("yes"));
        assert!(parse_flag("on"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert!(config.workers.is_none());
        assert!(!config.skip_header);
        assert_eq!(config.effective_workers(), num_cpus::get().max(1));
        assert_eq!(
            config.effective_queue_capacity(),
            config.effective_workers() * QUEUE_SLOTS_PER_WORKER
        );
    }

    #[test]
    fn test_loader_config_fixed_workers() {
        let config = LoaderConfig::new().with_workers(3);
        assert_eq!(config.effective_workers(), 3);
        assert_eq!(config.effective_queue_capacity(), 3 * QUEUE_SLOTS_PER_WORKER);
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        assert_eq!(LoaderConfig::new().with_workers(0).effective_workers(), 1);
        assert_eq!(SimilarityConfig::new().with_parallelism(0).effective_workers(), 2);
    }

    #[test]
    fn test_similarity_workers_are_twice_the_budget() {
        let config = SimilarityConfig::new().with_parallelism(4);
        assert_eq!(config.effective_workers(), 8);

        let dynamic = SimilarityConfig::default();
        assert_eq!(dynamic.effective_workers(), num_cpus::get().max(1) * 2);
    }
}

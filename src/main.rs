// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CUI2VEC CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI para consultar conceitos similares num modelo cui2vec.
//
// Uso:
//   cui2vec-cli cui2vec_pretrained.csv C0000005 --skip-header
//   cui2vec-cli cui2vec_pretrained.csv C0000005 --top 20 --json
//   cui2vec-cli --encode 5
//   cui2vec-cli --decode C0000005
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::{bail, Context};
use cui2vec::{
    decode_identifier, encode_identifier, install_panic_hook, load_engine_config, Loader,
    SimilarityEngine,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Número padrão de conceitos exibidos
const DEFAULT_TOP: usize = 10;

/// Argumentos do modo de consulta
struct QueryArgs {
    model: PathBuf,
    target: String,
    skip_header: bool,
    top: usize,
    json: bool,
}

/// Tenta carregar o arquivo .env do diretório atual ou do pai
fn load_dotenv() {
    for path in [PathBuf::from(".env"), PathBuf::from("../.env")] {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => return,
                Err(e) => eprintln!("⚠ Erro ao carregar {:?}: {}", path, e),
            }
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("cui2vec CLI v{}", cui2vec::VERSION);
    eprintln!();
    eprintln!("Uso: {} <modelo.csv> <CUI> [opções]", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  --skip-header      Descarta a primeira linha do arquivo");
    eprintln!("  --top <n>          Número de conceitos exibidos (padrão: {})", DEFAULT_TOP);
    eprintln!("  --json             Saída em JSON");
    eprintln!("  --encode <n>       Converte inteiro em CUI e sai");
    eprintln!("  --decode <CUI>     Converte CUI em inteiro e sai");
    eprintln!();
    eprintln!("Exemplos:");
    eprintln!("  {} cui2vec_pretrained.csv C0000005 --skip-header", program);
    eprintln!("  {} --decode C0027051", program);
}

fn parse_query_args(args: &[String]) -> anyhow::Result<QueryArgs> {
    let mut positional = Vec::new();
    let mut skip_header = false;
    let mut top = DEFAULT_TOP;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--skip-header" => skip_header = true,
            "--json" => json = true,
            "--top" => {
                let value = iter.next().context("--top requer um número")?;
                top = value
                    .parse()
                    .with_context(|| format!("--top inválido: {value}"))?;
            }
            flag if flag.starts_with("--") => bail!("opção desconhecida: {flag}"),
            _ => positional.push(arg.clone()),
        }
    }

    let [model, target] = <[String; 2]>::try_from(positional).map_err(|p| {
        anyhow::anyhow!("esperado <modelo.csv> <CUI>, recebido {} argumentos", p.len())
    })?;

    Ok(QueryArgs {
        model: PathBuf::from(model),
        target,
        skip_header,
        top,
        json,
    })
}

fn main() -> anyhow::Result<()> {
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    install_panic_hook();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("cui2vec-cli");

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(program);
        std::process::exit(1);
    }

    // Modos do codec
    if args.len() == 3 && args[1] == "--encode" {
        let value: u32 = args[2]
            .parse()
            .with_context(|| format!("inteiro inválido: {}", args[2]))?;
        println!("{}", encode_identifier(value));
        return Ok(());
    }
    if args.len() == 3 && args[1] == "--decode" {
        println!("{}", decode_identifier(&args[2])?);
        return Ok(());
    }

    let query = parse_query_args(&args[1..])?;
    let mut config = load_engine_config();
    // --skip-header ou CUI2VEC_SKIP_HEADER
    config.loader.skip_header |= query.skip_header;

    let file = File::open(&query.model)
        .with_context(|| format!("não foi possível abrir {}", query.model.display()))?;
    let (store, report) = Loader::new(config.loader)
        .load_with_report(BufReader::new(file))
        .with_context(|| format!("falha ao carregar {}", query.model.display()))?;

    log::info!(
        "✓ {} conceitos, dimensão {}, {} linhas em {}ms",
        store.len(),
        store
            .dimension()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "variável".to_string()),
        report.lines_read,
        report.elapsed_ms
    );

    let engine = SimilarityEngine::new(config.similarity)?;
    let ranked = engine.most_similar(&store, &query.target, query.top)?;

    if query.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" Conceitos similares a {}", query.target);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (rank, concept) in ranked.iter().enumerate() {
        println!("{:>4}. {}", rank + 1, concept);
    }

    Ok(())
}

//! Benchmarks de operações vetoriais.
//!
//! Testa performance de:
//! - Produto escalar + normas (scalar vs AVX2)
//! - Similaridade cosseno checada
//!
//! Executar: `cargo bench --bench simd_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cui2vec::performance::simd::{dot_and_norms, dot_and_norms_scalar, try_cosine_similarity};
use rand::Rng;

/// Gera vetor de features aleatório
fn generate_random_vector(dim: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen_range(-1.0f64..1.0)).collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Produto escalar + normas
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_dot_and_norms(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_and_norms");

    // 500 é a dimensão do cui2vec publicado
    for size in [8, 64, 500, 768, 1536].iter() {
        let a = generate_random_vector(*size);
        let b = generate_random_vector(*size);

        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("scalar", size), size, |bencher, _| {
            bencher.iter(|| black_box(dot_and_norms_scalar(&a, &b)))
        });

        group.bench_with_input(BenchmarkId::new("auto", size), size, |bencher, _| {
            bencher.iter(|| black_box(dot_and_norms(&a, &b)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Cosseno checado
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_try_cosine(c: &mut Criterion) {
    let a = generate_random_vector(500);
    let b = generate_random_vector(500);

    c.bench_function("try_cosine_similarity/500", |bencher| {
        bencher.iter(|| black_box(try_cosine_similarity(&a, &b)))
    });
}

criterion_group!(benches, bench_dot_and_norms, bench_try_cosine);

criterion_main!(benches);

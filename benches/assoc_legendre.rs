use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use perth::math::{assoc_legendre, sph_harm};

/// Uniform random cos-colatitudes in (-1, 1).
fn cos_colatitudes(rng: &mut StdRng, n: usize) -> DVector<f64> {
    DVector::from_fn(n, |_, _| 1.0 - 2.0 * rng.random::<f64>())
}

/// Low-degree tables, the regime of long-wavelength loading terms.
fn bench_low_degree(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xCAFE);
    c.bench_function("assoc_legendre/lmax_4_100k_samples", |b| {
        b.iter_batched(
            || cos_colatitudes(&mut rng, 100_000),
            |x| {
                let table = assoc_legendre(4, black_box(&x));
                black_box(table);
            },
            BatchSize::LargeInput,
        )
    });
}

/// High-degree tables, the regime of gravity-field style expansions.
fn bench_high_degree(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xFACADE);
    c.bench_function("assoc_legendre/lmax_32_10k_samples", |b| {
        b.iter_batched(
            || cos_colatitudes(&mut rng, 10_000),
            |x| {
                let table = assoc_legendre(32, black_box(&x));
                black_box(table);
            },
            BatchSize::LargeInput,
        )
    });
}

/// Normalized spherical harmonics on a scattered global grid.
fn bench_sph_harm(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    c.bench_function("sph_harm/l2_m1_100k_points", |b| {
        b.iter_batched(
            || {
                let theta =
                    DVector::from_fn(100_000, |_, _| std::f64::consts::PI * rng.random::<f64>());
                let phi =
                    DVector::from_fn(100_000, |_, _| std::f64::consts::TAU * rng.random::<f64>());
                (theta, phi)
            },
            |(theta, phi)| {
                let ylm = sph_harm(2, 1, black_box(&theta), &phi).unwrap();
                black_box(ylm);
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_low_degree, bench_high_degree, bench_sph_harm
);
criterion_main!(benches);

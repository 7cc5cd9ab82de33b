use codec_params::resolve::{resolve, split_view};
use codec_params::{config_cipher, register, Registry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rusqlite::Connection;

/// Benchmark prefix parsing for names with zero to three prefixes
fn bench_split_view(c: &mut Criterion) {
    let names = ["kdf_iter", "default:kdf_iter", "MAX:kdf_iter", "default:min:max:kdf_iter"];

    let mut group = c.benchmark_group("split_view");
    for name in names {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, &name| {
            b.iter(|| black_box(split_view(black_box(name))));
        });
    }
    group.finish();
}

/// Benchmark two-level resolution (common first, then cipher scopes)
fn bench_resolve(c: &mut Criterion) {
    let registry = Registry::new();
    let names = ["cipher", "mc_legacy_wal", "aes128cbc", "aegis", "unknown"];

    let mut group = c.benchmark_group("resolve");
    for name in names {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, &name| {
            b.iter(|| black_box(resolve(&registry, black_box(name))));
        });
    }
    group.finish();
}

/// Benchmark registry writes with and without the legacy fan-out
fn bench_config_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_cipher");

    group.bench_function("registry_write", |b| {
        let mut registry = Registry::new();
        b.iter(|| {
            black_box(
                registry
                    .config_cipher("sqlcipher", "kdf_iter", black_box(64000), None)
                    .ok(),
            )
        });
    });

    group.bench_function("registry_legacy", |b| {
        let mut registry = Registry::new();
        let legacy = codec_params::SqlCipherVersions;
        b.iter(|| {
            black_box(
                registry
                    .config_cipher("sqlcipher", "legacy", black_box(3), Some(&legacy))
                    .ok(),
            )
        });
    });

    // includes the overlay pointer lookup through SQLite
    group.bench_function("connection_read", |b| {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();
        b.iter(|| {
            black_box(config_cipher(
                Some(&conn),
                Some("sqlcipher"),
                Some("kdf_iter"),
                -1,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_split_view, bench_resolve, bench_config_cipher);
criterion_main!(benches);

//! Performance benchmarks for copconf
//!
//! These benchmarks measure the queries issued once per file or check
//! during a run:
//! - include/exclude scoping of single paths and batches
//! - check state lookups, cold and memoized
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench scope
//! cargo bench check_state
//! ```

use copconf::ConfigDocument;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::path::PathBuf;

const CONFIG: &str = r#"
AllCops:
  Include:
    - '**/*.rb'
    - '**/*.rake'
    - '**/Gemfile'
    - !ruby/regexp /\.gemspec\z/
  Exclude:
    - /project/vendor/**
    - /project/node_modules/**
    - /project/db/schema.rb
Style:
  Enabled: true
Layout:
  Enabled: false
Style/StringLiterals:
  EnforcedStyle: double_quotes
Layout/LineLength:
  Max: 120
Metrics/MethodLength:
  Enabled: true
  Exclude:
    - /project/spec/**
"#;

// ============================================================================
// Helper Functions
// ============================================================================

fn document() -> ConfigDocument {
    ConfigDocument::from_yaml_str(CONFIG, Some(PathBuf::from("/project/.rubocop.yml")))
        .expect("benchmark config parses")
        .with_working_dir("/project")
}

/// Relative paths spread over included, excluded and hidden locations
fn sample_paths(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| match i % 5 {
            0 => PathBuf::from(format!("app/models/model_{}.rb", i)),
            1 => PathBuf::from(format!("lib/tasks/task_{}.rake", i)),
            2 => PathBuf::from(format!("vendor/bundle/gem_{}/lib/gem.rb", i)),
            3 => PathBuf::from(format!(".git/objects/{}.rb", i)),
            _ => PathBuf::from(format!("docs/page_{}.md", i)),
        })
        .collect()
}

// ============================================================================
// Scope Benchmarks
// ============================================================================

/// Benchmark include/exclude matching
fn bench_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope");
    let doc = document();

    group.bench_function("in_scope_single", |b| {
        b.iter(|| black_box(doc.in_scope(black_box("app/models/user.rb"))));
    });

    group.bench_function("excluded_single", |b| {
        b.iter(|| black_box(doc.excluded(black_box("vendor/bundle/rake/lib/rake.rb"))));
    });

    for count in [100, 1_000, 10_000].iter() {
        let paths = sample_paths(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(
            BenchmarkId::new("files_to_inspect", count),
            &paths,
            |b, paths| {
                b.iter(|| black_box(doc.files_to_inspect(paths)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Check State Benchmarks
// ============================================================================

/// Benchmark check state resolution
///
/// The cold case builds a fresh document each iteration so the cache is
/// empty; the warm case measures a memoized lookup.
fn bench_check_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_state");
    let checks = [
        "Style/StringLiterals",
        "Layout/LineLength",
        "Metrics/MethodLength",
        "Lint/Unconfigured",
    ];

    group.bench_function("cold", |b| {
        b.iter(|| {
            let doc = document();
            for check in checks {
                black_box(doc.state_of(check));
            }
        });
    });

    let doc = document();
    for check in checks {
        doc.state_of(check);
    }
    group.bench_function("memoized", |b| {
        b.iter(|| {
            for check in checks {
                black_box(doc.state_of(black_box(check)));
            }
        });
    });

    group.bench_function("check_applies_to", |b| {
        b.iter(|| {
            black_box(doc.check_applies_to(
                black_box("Metrics/MethodLength"),
                black_box("spec/models/user_spec.rb"),
            ))
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(scope_benches, bench_scope,);

criterion_group!(state_benches, bench_check_state,);

criterion_main!(scope_benches, state_benches);

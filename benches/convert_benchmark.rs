//! Benchmarks for htd2md conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks build synthetic Test Case sources in memory.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use htd2md::convert::{convert_source, ConvertOptions};
use htd2md::parser::fuzzy;
use htd2md::render::{to_markdown, RenderOptions};
use htd2md::source::{RawParagraph, RawTable, SourceDocument};

/// Creates a Test Case source with the given number of test specifications.
fn create_test_case(spec_count: usize) -> SourceDocument {
    let mut source = SourceDocument::new()
        .with_paragraph(RawParagraph::bold("Test Case TC-1"))
        .with_table(RawTable::from_text_rows(&[
            &["Name of the Test Case", "Benchmark case"],
            &["Narrative: story", "A long narrative"],
        ]));

    for i in 0..spec_count {
        let ts = format!("TS-1.{}", i + 1);
        let es = format!("ES-1.{}.1", i + 1);
        source.add_paragraph(RawParagraph::bold(format!("Test Specification {ts}")));
        source.add_paragraph(RawParagraph::bold(format!("Experiment Specification {es}")));
        source.add_table(RawTable::from_text_rows(&[
            &["Reference to Test Case", "TC-1"],
            &["Title of Test", "Specification"],
            &["Test Rationale: why", "coverage"],
        ]));
        source.add_table(RawTable::from_text_rows(&[
            &["Reference to Test Case", "TC-1"],
            &["Title of Experiment", "Experiment"],
            &["Reference to Test Specification", &ts],
        ]));
    }
    source
}

/// Benchmark fuzzy heading classification.
fn bench_classify(c: &mut Criterion) {
    let labels = [
        "Control Function Identification",
        "Control Function Input",
        "Control Function Output",
        "Algorithms",
        "Use Case Example",
    ];

    c.bench_function("classify_heading", |b| {
        b.iter(|| fuzzy::classify(black_box("Control Funtion Output"), &labels));
    });
}

/// Benchmark Test Case conversion at various sizes.
fn bench_test_case_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("test_case_conversion");
    let options = ConvertOptions::default();

    for spec_count in [1, 10, 50].iter() {
        let source = create_test_case(*spec_count);

        group.bench_function(format!("{}_specifications", spec_count), |b| {
            b.iter(|| convert_source(black_box(&source), &options));
        });
    }

    group.finish();
}

/// Benchmark Markdown rendering of a converted set.
fn bench_render(c: &mut Criterion) {
    let source = create_test_case(10);
    let Some(conversion) = convert_source(&source, &ConvertOptions::default()) else {
        return;
    };
    let options = RenderOptions::new().with_frontmatter(false);

    c.bench_function("render_markdown", |b| {
        b.iter(|| {
            for (_, doc) in conversion.documents.iter() {
                let _ = to_markdown(black_box(doc), &options);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_test_case_conversion,
    bench_render,
);
criterion_main!(benches);

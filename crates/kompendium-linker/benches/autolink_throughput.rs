//! Autolink Throughput Benchmark
//!
//! Measures one autolink pass over documents of increasing size against a
//! realistically sized substance dictionary. The engine runs per request in
//! the article pipeline, so a pass over a long article should stay well
//! under a millisecond budget per kilobyte.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kompendium_core::types::{RiskLevel, Substance};
use kompendium_linker::autolink::{autolink, AutolinkConfig};
use kompendium_linker::dictionary::SubstanceDictionary;

const SUBSTANCE_NAMES: &[&str] = &[
    "Psilocybin",
    "MDMA",
    "LSD",
    "Ketamin",
    "DMT",
    "Mescalin",
    "Kratom",
    "Kava",
    "Lachgas",
    "Amphetamin",
    "Koffein",
    "Modafinil",
];

const PARAGRAPH_TEMPLATES: &[&str] = &[
    "Die Wirkung von {} setzt nach etwa dreißig Minuten ein und hält mehrere Stunden an.",
    "Studien zu {} zeigen ein breites Spektrum subjektiver Effekte bei moderater Dosierung.",
    "Im Vergleich zu anderen Substanzen ist die Datenlage zu {} vergleichsweise gut dokumentiert.",
    "Bei der Kombination mit {} ist besondere Vorsicht geboten, insbesondere bei Vorerkrankungen.",
    "Der rechtliche Status von {} unterscheidet sich je nach Land erheblich.",
];

fn make_dictionary() -> SubstanceDictionary {
    let substances: Vec<Substance> = SUBSTANCE_NAMES
        .iter()
        .map(|name| {
            Substance::builder()
                .name(*name)
                .slug(name.to_lowercase())
                .evidence_score(75)
                .risk_level(RiskLevel::Moderate)
                .monetization_enabled(true)
                .build()
        })
        .collect();
    SubstanceDictionary::build(&substances)
}

/// Builds a document with `paragraphs` paragraphs mentioning substances in
/// rotation, interleaved with headings and the occasional code block.
fn make_document(paragraphs: usize) -> String {
    let mut out = String::from("# Überblick\n\n");

    for i in 0..paragraphs {
        if i % 10 == 0 {
            out.push_str(&format!("## Abschnitt {}\n\n", i / 10 + 1));
        }
        if i % 25 == 24 {
            out.push_str("```\ndosage_mg = 125\n```\n\n");
        }

        let name = SUBSTANCE_NAMES[i % SUBSTANCE_NAMES.len()];
        let template = PARAGRAPH_TEMPLATES[i % PARAGRAPH_TEMPLATES.len()];
        out.push_str(&template.replace("{}", name));
        out.push_str("\n\n");
    }

    out
}

fn autolink_throughput_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("autolink_throughput");
    let dictionary = make_dictionary();
    let config = AutolinkConfig::default();

    for paragraphs in [10, 100, 500] {
        let document = make_document(paragraphs);

        group.throughput(Throughput::Bytes(document.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", paragraphs),
            &paragraphs,
            |b, _| b.iter(|| black_box(autolink(&document, &dictionary, &config))),
        );
    }

    group.finish();
}

fn autolink_no_candidates_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("autolink_no_candidates");
    let config = AutolinkConfig::default();
    let empty = SubstanceDictionary::build(&[]);
    let document = make_document(100);

    // Short-circuit path: empty dictionary must cost nothing.
    group.bench_function("empty_dictionary_100p", |b| {
        b.iter(|| black_box(autolink(&document, &empty, &config)))
    });

    group.finish();
}

criterion_group!(
    benches,
    autolink_throughput_benchmark,
    autolink_no_candidates_benchmark,
);
criterion_main!(benches);

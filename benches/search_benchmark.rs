// Search index and query benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use workshop_archive_search::models::{SessionDocument, SessionType};
use workshop_archive_search::search::{SearchFilters, SearchIndex, SearchOptions, TopicVocabulary};
use workshop_archive_search::taxonomy::Taxonomy;

const TOPICS: &[&str] = &[
    "Bayesian phylogenetics with BEAST",
    "Population structure and admixture",
    "Genome assembly practical",
    "Maximum likelihood tree inference",
    "RNA-seq differential expression",
    "Selection scans in population genomics",
    "Variant calling from short reads",
    "Coalescent simulation of demographic history",
];

const PRESENTERS: &[&str] = &["smith-jane", "doe-john", "lee-min", "garcia-ana", "okafor-chidi"];

fn corpus(size: usize) -> Vec<SessionDocument> {
    (0..size)
        .map(|i| {
            SessionDocument::new(
                format!("s{}", i),
                ["wog", "wpsg", "wphylo"][i % 3],
                2015 + (i % 10) as i32,
                format!("{} {}", TOPICS[i % TOPICS.len()], i),
                SessionType::Lecture,
            )
            .with_presenters(vec![PRESENTERS[i % PRESENTERS.len()]])
            .with_co_presenters(vec![PRESENTERS[(i + 2) % PRESENTERS.len()]])
            .with_techniques(vec![["BEAST", "RAxML", "PLINK", "GATK"][i % 4]])
        })
        .collect()
}

fn index_build(c: &mut Criterion) {
    let vocabulary = TopicVocabulary::default();
    let mut group = c.benchmark_group("index_build");

    for size in [100, 1_000, 5_000] {
        let docs = corpus(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &docs, |b, docs| {
            b.iter(|| SearchIndex::build(black_box(docs), &vocabulary));
        });
    }
    group.finish();
}

fn query(c: &mut Criterion) {
    let index = SearchIndex::build(&corpus(5_000), &TopicVocabulary::default());
    let options = SearchOptions::default();
    let exact = SearchOptions::builder().fuzzy_match(false).build();
    let filters = SearchFilters::new().with_workshops(["wog"]).with_years([2020, 2021]);
    let none = SearchFilters::new();

    c.bench_function("search_fuzzy_single_term", |b| {
        b.iter(|| index.search(black_box("phylo"), &none, &options));
    });
    c.bench_function("search_exact_multi_term", |b| {
        b.iter(|| index.search(black_box("population genomics smith"), &none, &exact));
    });
    c.bench_function("search_with_facets", |b| {
        b.iter(|| index.search(black_box("tree"), &filters, &options));
    });
    c.bench_function("suggest", |b| {
        b.iter(|| index.suggest(black_box("sm"), 10));
    });
}

fn taxonomy_mapping(c: &mut Criterion) {
    let taxonomy = Taxonomy::builtin();
    let terms = ["phylogenetics", "GWAS", "structure", "genome assembly", "nextflow", "knitting"];

    c.bench_function("taxonomy_map_terms", |b| {
        b.iter(|| taxonomy.map_to_taxonomy(black_box(&terms)));
    });
}

criterion_group!(benches, index_build, query, taxonomy_mapping);
criterion_main!(benches);

//! Rendering benchmarks for the three rule languages

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rulecraft::rule::{Condition, ListOp, NamedList, RuleDraft};
use rulecraft::sigma::{SigmaCommand, SigmaList, SigmaModifier, SigmaRule};
use rulecraft::snort::{ContentMatch, ContentModifier, Reference, SnortCommand, SnortRule};
use rulecraft::yara::{StringDef, StringMatch, StringType, YaraCommand, YaraRule};
use std::hint::black_box;

fn sigma_rule(conditions: usize) -> SigmaRule {
    let mut rule = SigmaRule::new("7d2c1b0e-3f4a-4b5c-9d6e-0f1a2b3c4d5e", "2024-05-01")
        .apply(SigmaCommand::SetTitle("Benchmark Rule".to_string()))
        .state;
    for i in 0..conditions {
        rule = rule
            .apply(SigmaCommand::Selection(ListOp::Add(Condition::new(
                format!("Field{}", i % 8),
                SigmaModifier::Contains,
                format!("value-{i}"),
            ))))
            .state;
        rule = rule
            .apply(SigmaCommand::List {
                list: SigmaList::Tags,
                op: ListOp::Add(format!("attack.t{:04}", 1000 + i)),
            })
            .state;
    }
    rule
}

fn snort_rule(contents: usize) -> SnortRule {
    let mut rule = SnortRule::new(100_000, "2024-05-01")
        .apply(SnortCommand::SetMsg("Benchmark \"quoted\"; rule".to_string()))
        .state;
    for i in 0..contents {
        rule = rule
            .apply(SnortCommand::Content(ListOp::Add(
                ContentMatch::new(format!("pattern{i}|0d 0a|"))
                    .with(ContentModifier::Nocase)
                    .with(ContentModifier::Within(64)),
            )))
            .state;
        rule = rule
            .apply(SnortCommand::Reference(ListOp::Add(Reference::new(
                "url",
                format!("example.com/{i}"),
            ))))
            .state;
    }
    rule
}

fn yara_rule(strings: usize) -> YaraRule {
    let mut rule = YaraRule::default()
        .apply(YaraCommand::SetRuleName("Benchmark Rule".to_string()))
        .state
        .apply(YaraCommand::SetStringMatch(StringMatch::Any))
        .state;
    for i in 0..strings {
        rule = rule
            .apply(YaraCommand::Strings(ListOp::Add(StringDef::new(
                format!("s{i}"),
                StringType::Text,
                format!("needle \\ {i}"),
            ))))
            .state;
    }
    rule
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for size in [1usize, 16, 128] {
        let sigma = sigma_rule(size);
        group.bench_with_input(BenchmarkId::new("sigma", size), &sigma, |b, rule| {
            b.iter(|| black_box(rule.render()))
        });

        let snort = snort_rule(size);
        group.bench_with_input(BenchmarkId::new("snort", size), &snort, |b, rule| {
            b.iter(|| black_box(rule.render()))
        });

        let yara = yara_rule(size);
        group.bench_with_input(BenchmarkId::new("yara", size), &yara, |b, rule| {
            b.iter(|| black_box(rule.render()))
        });
    }
    group.finish();
}

fn benchmark_named_list_insert(c: &mut Criterion) {
    let values: Vec<String> = (0..256).map(|i| format!("tag.{i}")).collect();
    c.bench_function("named list insert 256", |b| {
        b.iter(|| {
            let mut list = NamedList::new();
            for value in &values {
                list.insert(value.clone());
            }
            black_box(list.len())
        })
    });
}

criterion_group!(benches, benchmark_render, benchmark_named_list_insert);
criterion_main!(benches);

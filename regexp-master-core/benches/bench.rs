use criterion::{Criterion, black_box, criterion_group, criterion_main};
use regexp_master_core::{ListOptions, build_regexp_from_list, parse_regexp, pcre_to_js};

fn month_names() -> Vec<&'static str> {
    vec![
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ]
}

fn bench_small_list(c: &mut Criterion) {
    let words = month_names();
    let options = ListOptions::default();

    c.bench_function("build_small_list", |b| {
        b.iter(|| black_box(build_regexp_from_list(black_box(&words), &options)))
    });
}

fn bench_large_list(c: &mut Criterion) {
    let words: Vec<String> = (0..2000).map(|i| format!("item{:x}-{}", i * 7919, i % 13)).collect();
    let options = ListOptions::default();

    c.bench_function("build_large_list", |b| {
        b.iter(|| black_box(build_regexp_from_list(black_box(&words), &options)))
    });
}

fn bench_wildcards(c: &mut Criterion) {
    let words = vec!["*.example.com", "api.example.com", "*.example.org", "www.example.*"];
    let options = ListOptions::new().special_char("*", ".*?");

    c.bench_function("build_with_wildcards", |b| {
        b.iter(|| black_box(build_regexp_from_list(black_box(&words), &options)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let pattern = r"#^(?<user>[a-z0-9._%+-]+)@(?<host>(?:[a-z0-9-]+\.)+[a-z]{2,})(?=\s|$)#i";

    c.bench_function("parse_regexp", |b| {
        b.iter(|| black_box(parse_regexp(black_box(pattern))))
    });
}

fn bench_pcre_to_js(c: &mut Criterion) {
    let pattern = r"#(?<word>\pL++)\s+(?>[0-9]*+)/(.*)#s";

    c.bench_function("pcre_to_js", |b| {
        b.iter(|| black_box(pcre_to_js(black_box(pattern))))
    });
}

criterion_group!(
    benches,
    bench_small_list,
    bench_large_list,
    bench_wildcards,
    bench_parse,
    bench_pcre_to_js,
);

criterion_main!(benches);

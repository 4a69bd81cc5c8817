use std::fmt::Write;
use criterion::{criterion_group, criterion_main, Criterion};

/// An expression grammar with `levels` binary precedence levels, each level
/// left-recursive over the next one.
fn layered(levels: usize) -> String {
  let mut text = String::new();

  for level in 0..levels {
    writeln!(&mut text,
      "E{} : E{} , 'op{}' , E{} ; E{} .",
      level,
      level,
      level,
      level + 1,
      level + 1,
    ).unwrap();
  }

  writeln!(&mut text,
    "E{} : 'n' ; 'x' , [ '(' , E0 # ',' , ')' ] ; '(' , E0 , ')' .",
    levels,
  ).unwrap();

  text
}

fn ffn_benchmark(c: &mut Criterion) {
  let grammar = grammar::build(&layered(40)).unwrap();

  c.bench_function("ffn", |b| b.iter(|| ll::ffn::compute(&grammar)));
  c.bench_function("ll table", |b| b.iter(|| ll::LlTable::build(&grammar)));
  c.bench_function("left recursion", |b| b.iter(|| {
    let mut grammar = grammar.clone();
    ll::eliminate_all_left_recursion(&mut grammar)
  }));
}

criterion_group!{
  name = benches;
  config = Criterion::default().significance_level(0.1).sample_size(10);
  targets = ffn_benchmark
}
criterion_main!(benches);

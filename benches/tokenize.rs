use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use triage::ml::vectorize::{CountVectorizer, TfidfTransformer};
use triage::text::{Lemmatizer, Tokenizer};

const MESSAGE_COUNT: usize = 2_000;

fn messages() -> Vec<String> {
    const TEMPLATES: [&str; 4] = [
        "We need WATER and food in Carrefour, the children are hungry!!",
        "Tents and blankets please; our houses collapsed after the earthquake.",
        "Medical supplies requested: 3 injured women at the hospital near Leogane.",
        "Is the road to Jacmel open? Trucks with supplies are waiting since Tuesday.",
    ];
    (0..MESSAGE_COUNT)
        .map(|i| format!("{} #{i}", TEMPLATES[i % TEMPLATES.len()]))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::new(Lemmatizer::embedded().expect("embedded lemmas"));
    let messages = messages();
    c.bench_function("tokenize_messages", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for message in &messages {
                count += tokenizer.tokenize(black_box(message)).iter().count();
            }
            black_box(count)
        })
    });
}

fn bench_tfidf(c: &mut Criterion) {
    let tokenizer = Tokenizer::new(Lemmatizer::embedded().expect("embedded lemmas"));
    let messages = messages();
    let vectorizer = CountVectorizer::fit(&tokenizer, &messages).expect("vocabulary");
    let counts = vectorizer.transform(&messages);
    let mut group = c.benchmark_group("tfidf_transform");
    for smooth_idf in [true, false] {
        let tfidf = TfidfTransformer::fit(&counts, vectorizer.vocabulary_size(), smooth_idf);
        group.bench_with_input(
            BenchmarkId::from_parameter(smooth_idf),
            &tfidf,
            |b, tfidf| b.iter(|| black_box(tfidf.transform(vectorizer.transform(&messages)))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_tfidf);
criterion_main!(benches);

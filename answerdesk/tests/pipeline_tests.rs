//! End-to-end pipeline scenarios with deterministic mock backends.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use answerdesk::{
    Answer, Document, EmbeddingProvider, FixedSizeChunker, LanguageModel, NO_ANSWER_TEXT,
    RagConfig, RagError, RagPipeline, Result, TextFileSource, load_documents,
};
use async_trait::async_trait;

// ── Mock backends ──────────────────────────────────────────────────

/// Deterministic bag-of-words embedder: every distinct word maps to a
/// pseudo-random unit vector, a text embeds as the normalized sum of
/// its word vectors. Texts sharing words score high cosine similarity;
/// unrelated texts score near zero.
struct WordEmbedder {
    dims: usize,
    single_calls: AtomicUsize,
    fail: AtomicBool,
}

impl WordEmbedder {
    fn new() -> Self {
        Self { dims: 1024, single_calls: AtomicUsize::new(0), fail: AtomicBool::new(false) }
    }

    fn word_vector(&self, word: &str) -> Vec<f32> {
        let mut state = word
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3));
        let mut v = vec![0.0f32; self.dims];
        for x in v.iter_mut() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            *x = ((state >> 33) as f32) / ((1u64 << 31) as f32) - 0.5;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter_mut().for_each(|x| *x /= norm);
        v
    }

    fn text_vector(&self, text: &str) -> Result<Vec<f32>> {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return Err(RagError::Embedding {
                provider: "WordEmbedder".into(),
                message: "cannot embed empty text".into(),
            });
        }
        let mut sum = vec![0.0f32; self.dims];
        for word in &words {
            for (s, w) in sum.iter_mut().zip(self.word_vector(word)) {
                *s += w;
            }
        }
        let norm: f32 = sum.iter().map(|x| x * x).sum::<f32>().sqrt();
        sum.iter_mut().for_each(|x| *x /= norm);
        Ok(sum)
    }
}

#[async_trait]
impl EmbeddingProvider for WordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.text_vector(text)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::Embedding {
                provider: "WordEmbedder".into(),
                message: "backend down".into(),
            });
        }
        texts.iter().map(|t| self.text_vector(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Mock language model that echoes the context block back and counts
/// invocations, so tests can assert both grounding and the
/// never-call-on-empty-context policy.
struct EchoModel {
    calls: AtomicUsize,
}

impl EchoModel {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let context = prompt
            .split_once("Context: ")
            .and_then(|(_, rest)| rest.split_once("\n\nQuestion:"))
            .map(|(context, _)| context)
            .ok_or_else(|| RagError::Generation {
                provider: "echo".into(),
                message: "prompt missing context/question sections".into(),
            })?;
        Ok(format!("Based on our records: {context}"))
    }
}

/// A model whose backend is always down.
struct DownModel;

#[async_trait]
impl LanguageModel for DownModel {
    fn name(&self) -> &str {
        "down"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(RagError::Generation { provider: "down".into(), message: "quota exhausted".into() })
    }
}

fn support_corpus() -> Vec<Document> {
    vec![
        Document::new("doc1", "AngelOne supports equity trading."),
        Document::new("doc2", "Customer support hours are 9am–6pm."),
    ]
}

fn build_pipeline(
    embedder: Arc<WordEmbedder>,
    model: Arc<dyn LanguageModel>,
) -> RagPipeline {
    let config = RagConfig::builder()
        .chunk_size(40)
        .chunk_overlap(5)
        .top_k(3)
        .min_relevance(0.3)
        .build()
        .unwrap();
    RagPipeline::builder()
        .config(config)
        .embedding_provider(embedder)
        .language_model(model)
        .chunker(Arc::new(FixedSizeChunker::new(40, 5).unwrap()))
        .build()
        .unwrap()
}

// ── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn support_hours_query_hits_exactly_the_right_chunk() {
    let embedder = Arc::new(WordEmbedder::new());
    let model = Arc::new(EchoModel::new());
    let pipeline = build_pipeline(embedder, model.clone());

    let stats = pipeline.ingest(&support_corpus()).await.unwrap();
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.chunks, 2);

    let results = pipeline.retrieve("What are support hours?").await.unwrap();
    assert_eq!(results.len(), 1, "only the hours chunk clears the threshold");
    assert_eq!(results[0].chunk.document_id, "doc2");
    assert!(results[0].score >= 0.3);

    let answer = pipeline.answer_query("What are support hours?").await.unwrap();
    assert!(answer.text.contains("9am–6pm"), "answer not grounded: {}", answer.text);
    assert_eq!(answer.supporting_chunks.len(), 1);
    assert_eq!(answer.supporting_chunks[0].chunk.document_id, "doc2");
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn unrelated_query_returns_fixed_answer_without_calling_model() {
    let embedder = Arc::new(WordEmbedder::new());
    let model = Arc::new(EchoModel::new());
    let pipeline = build_pipeline(embedder, model.clone());
    pipeline.ingest(&support_corpus()).await.unwrap();

    let results = pipeline.retrieve("What is the capital of France?").await.unwrap();
    assert!(results.is_empty(), "unexpected matches: {results:?}");

    let answer = pipeline.answer_query("What is the capital of France?").await.unwrap();
    assert_eq!(answer.text, NO_ANSWER_TEXT);
    assert!(answer.supporting_chunks.is_empty());
    assert_eq!(model.call_count(), 0, "model must not be invoked with empty context");
}

#[tokio::test]
async fn k_larger_than_corpus_returns_what_exists() {
    let embedder = Arc::new(WordEmbedder::new());
    let pipeline = build_pipeline(embedder, Arc::new(EchoModel::new()));
    pipeline
        .ingest(&[Document::new("only", "Withdrawal requests settle in two days.")])
        .await
        .unwrap();

    // top_k is 3 but the index holds a single chunk.
    let results =
        pipeline.retrieve("how long do withdrawal requests take to settle").await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn query_before_ingest_is_an_index_error() {
    let pipeline = build_pipeline(Arc::new(WordEmbedder::new()), Arc::new(EchoModel::new()));
    let err = pipeline.answer_query("What are support hours?").await.unwrap_err();
    assert!(matches!(err, RagError::Index(_)));
}

#[tokio::test]
async fn mashed_key_query_short_circuits_before_embedding() {
    let embedder = Arc::new(WordEmbedder::new());
    let pipeline = build_pipeline(embedder.clone(), Arc::new(EchoModel::new()));
    pipeline.ingest(&support_corpus()).await.unwrap();

    let results = pipeline.retrieve("zzzzzz qwrtp").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(
        embedder.single_calls.load(Ordering::SeqCst),
        0,
        "implausible query must not reach the embedder"
    );
}

#[tokio::test]
async fn generation_failure_propagates_to_caller() {
    let pipeline = build_pipeline(Arc::new(WordEmbedder::new()), Arc::new(DownModel));
    pipeline.ingest(&support_corpus()).await.unwrap();

    let err = pipeline.answer_query("What are support hours?").await.unwrap_err();
    assert!(matches!(err, RagError::Generation { .. }), "got: {err:?}");
}

#[tokio::test]
async fn empty_corpus_fails_index_build() {
    let pipeline = build_pipeline(Arc::new(WordEmbedder::new()), Arc::new(EchoModel::new()));
    assert!(matches!(pipeline.ingest(&[]).await, Err(RagError::Index(_))));
    assert!(matches!(
        pipeline.ingest(&[Document::new("blank", "   \n  ")]).await,
        Err(RagError::Index(_))
    ));
}

#[tokio::test]
async fn reingest_yields_identical_chunk_texts() {
    let embedder = Arc::new(WordEmbedder::new());
    let pipeline = build_pipeline(embedder, Arc::new(EchoModel::new()));

    let first = pipeline.ingest(&support_corpus()).await.unwrap();
    let before = pipeline.retrieve("What are support hours?").await.unwrap();
    let second = pipeline.ingest(&support_corpus()).await.unwrap();
    let after = pipeline.retrieve("What are support hours?").await.unwrap();

    assert_eq!(first, second);
    let texts_before: Vec<&str> = before.iter().map(|r| r.chunk.text.as_str()).collect();
    let texts_after: Vec<&str> = after.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts_before, texts_after);
}

#[tokio::test]
async fn failed_rebuild_keeps_previous_index_live() {
    let embedder = Arc::new(WordEmbedder::new());
    let pipeline = build_pipeline(embedder.clone(), Arc::new(EchoModel::new()));
    pipeline.ingest(&support_corpus()).await.unwrap();

    embedder.fail.store(true, Ordering::SeqCst);
    let err = pipeline.ingest(&support_corpus()).await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
    embedder.fail.store(false, Ordering::SeqCst);

    // Queries still run against the index built before the failure.
    let results = pipeline.retrieve("What are support hours?").await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn embedding_empty_text_is_an_error_not_a_zero_vector() {
    let embedder = WordEmbedder::new();
    let err = embedder.embed("").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

// ── Loader ─────────────────────────────────────────────────────────

#[tokio::test]
async fn unreadable_sources_are_skipped_not_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Margin trading requires an activated segment.").unwrap();

    let sources: Vec<Arc<dyn answerdesk::DocumentSource>> = vec![
        Arc::new(TextFileSource::new("good", file.path())),
        Arc::new(TextFileSource::new("missing", "/definitely/not/here.txt")),
    ];

    let (documents, failures) = load_documents(&sources).await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "good");
    assert!(documents[0].text.contains("Margin trading"));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source_id, "missing");
    assert!(matches!(failures[0].error, RagError::Load { .. }));
    let rendered = failures[0].error.to_string();
    assert!(rendered.contains("'missing'"), "display should name the source: {rendered}");
}

// ── Generator details ──────────────────────────────────────────────

#[tokio::test]
async fn answer_supporting_chunks_preserve_rank_order() {
    let embedder = Arc::new(WordEmbedder::new());
    let model = Arc::new(EchoModel::new());
    let config = RagConfig::builder()
        .chunk_size(80)
        .chunk_overlap(0)
        .top_k(3)
        .min_relevance(0.05)
        .build()
        .unwrap();
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(embedder)
        .language_model(model)
        .chunker(Arc::new(FixedSizeChunker::new(80, 0).unwrap()))
        .build()
        .unwrap();

    pipeline
        .ingest(&[
            Document::new("a", "Brokerage charges apply to intraday trading."),
            Document::new("b", "Brokerage charges are listed on the pricing page."),
            Document::new("c", "Holidays follow the exchange calendar."),
        ])
        .await
        .unwrap();

    let answer: Answer = pipeline.answer_query("what are the brokerage charges").await.unwrap();
    assert!(!answer.supporting_chunks.is_empty());
    for pair in answer.supporting_chunks.windows(2) {
        assert!(pair[0].score >= pair[1].score, "supporting chunks out of rank order");
    }
}

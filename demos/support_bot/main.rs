//! # Support Bot Demo
//!
//! The full answer flow over a small support corpus: ingest, retrieve,
//! generate. Uses a deterministic bag-of-words embedder and an
//! extractive mock model so it runs with **zero API keys**; swap in
//! `answerdesk::openai::{OpenAiEmbedder, OpenAiChatModel}` (feature
//! `openai`) for real backends.
//!
//! Run: `cargo run --bin support_bot`

use std::sync::Arc;

use answerdesk::{
    Document, EmbeddingProvider, FixedSizeChunker, LanguageModel, RagConfig, RagPipeline,
};

// ---------------------------------------------------------------------------
// Mock backends — deterministic, offline
// ---------------------------------------------------------------------------

/// Embeds text as the normalized sum of pseudo-random unit vectors,
/// one per distinct word. Shared words mean high cosine similarity.
struct BagOfWordsEmbedder {
    dims: usize,
}

impl BagOfWordsEmbedder {
    fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn word_vector(&self, word: &str) -> Vec<f32> {
        let mut state = word
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3));
        let mut v = vec![0.0f32; self.dims];
        for x in v.iter_mut() {
            state =
                state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            *x = ((state >> 33) as f32) / ((1u64 << 31) as f32) - 0.5;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter_mut().for_each(|x| *x /= norm);
        v
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> answerdesk::Result<Vec<f32>> {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return Err(answerdesk::RagError::Embedding {
                provider: "BagOfWords".into(),
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

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Answers by extracting the context sentences that share words with
/// the question — a stand-in for a real completion backend.
struct ExtractiveModel;

#[async_trait::async_trait]
impl LanguageModel for ExtractiveModel {
    fn name(&self) -> &str {
        "extractive-mock"
    }

    async fn complete(&self, prompt: &str) -> answerdesk::Result<String> {
        let section = |start: &str, end: &str| {
            prompt.split_once(start).and_then(|(_, rest)| {
                rest.split_once(end).map(|(s, _)| s.to_string())
            })
        };
        let context = section("Context: ", "\n\nQuestion:").unwrap_or_default();
        let question = section("Question: ", "\n\nAnswer:").unwrap_or_default().to_lowercase();

        let question_words: Vec<&str> =
            question.split(|c: char| !c.is_alphanumeric()).filter(|w| w.len() > 2).collect();
        let picked: Vec<&str> = context
            .split('.')
            .map(str::trim)
            .filter(|sentence| {
                let lower = sentence.to_lowercase();
                question_words.iter().any(|w| lower.contains(w))
            })
            .take(2)
            .collect();

        if picked.is_empty() {
            Ok(context.chars().take(200).collect())
        } else {
            Ok(format!("{}.", picked.join(". ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    // Small chunks for a small corpus; top_k=3 supporting passages;
    // anything under 0.25 cosine similarity is treated as irrelevant.
    let config = RagConfig::builder()
        .chunk_size(200)
        .chunk_overlap(40)
        .top_k(3)
        .min_relevance(0.25)
        .build()?;

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config.clone())
            .embedding_provider(Arc::new(BagOfWordsEmbedder::new(1024)))
            .language_model(Arc::new(ExtractiveModel))
            .chunker(Arc::new(FixedSizeChunker::new(
                config.chunk_size,
                config.chunk_overlap,
            )?))
            .build()?,
    );

    let corpus = vec![
        Document::new(
            "account-faq",
            "To open a trading account, complete the online KYC flow and upload a \
             proof of identity. Account activation usually takes one business day. \
             There are no charges for opening an account.",
        ),
        Document::new(
            "support-faq",
            "Customer support is available from 9am to 6pm on weekdays. \
             Support requests raised outside these hours are answered the next \
             business morning.",
        ),
        Document::new(
            "fees-faq",
            "Brokerage is a flat 20 rupees per executed order for intraday trades. \
             Delivery trades carry zero brokerage. Payment gateway charges apply to \
             instant deposits.",
        ),
    ];

    println!("Ingesting {} documents...", corpus.len());
    let stats = pipeline.ingest(&corpus).await?;
    println!("  {} chunks indexed ({} dims)\n", stats.chunks, stats.dimensions);

    let questions = [
        "When is customer support available?",
        "What are the brokerage charges for intraday?",
        "What is the capital of France?",
    ];

    for question in &questions {
        println!("Q: {question}");
        let answer = pipeline.answer_query(question).await?;
        println!("A: {}", answer.text);
        for (i, result) in answer.supporting_chunks.iter().enumerate() {
            println!(
                "   source {} [score={:.3}] {} | {}",
                i + 1,
                result.score,
                result.chunk.document_id,
                &result.chunk.text.chars().take(60).collect::<String>(),
            );
        }
        println!();
    }

    Ok(())
}

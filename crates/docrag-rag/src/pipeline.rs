//! End-to-end RAG pipeline
//!
//! One run walks `Loaded → Chunked → Indexed → Retrieved → Assembled →
//! Answered` in order. A failure in any stage ends the run with a
//! [`PipelineError`] naming the stage being entered and the original error.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use docrag_core::{
    Answer, Chunk, Document, EmbeddingClient, EmbeddingError, ErrorKind, GenerationError,
    IndexedPassage, LanguageModel, PipelineError, Stage, StoreError, VectorStore,
};

use crate::chunker::Chunker;
use crate::config::PipelineConfig;
use crate::deadline::{cancellable, with_deadline};
use crate::prompt::PromptAssembler;
use crate::retriever::Retriever;

/// Pipeline over trait objects, as wired by the binary
pub type DynPipeline = Pipeline<dyn EmbeddingClient, dyn VectorStore, dyn LanguageModel>;

pub struct Pipeline<E: ?Sized, S: ?Sized, L: ?Sized> {
    config: PipelineConfig,
    chunker: Chunker,
    assembler: PromptAssembler,
    embedder: Arc<E>,
    store: Arc<S>,
    llm: Arc<L>,
    retriever: Retriever<E, S>,
}

impl<E, S, L> Pipeline<E, S, L>
where
    E: EmbeddingClient + ?Sized,
    S: VectorStore + ?Sized,
    L: LanguageModel + ?Sized,
{
    /// Create a pipeline, validating settings, chunk sizes and the prompt template
    pub fn new(config: PipelineConfig, embedder: Arc<E>, store: Arc<S>, llm: Arc<L>) -> docrag_core::Result<Self> {
        config.validate()?;
        let chunker = Chunker::from_config(config.chunking)?;
        let assembler = PromptAssembler::new(&config.prompt_template)?;
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store), config.call_timeout);

        Ok(Self {
            config,
            chunker,
            assembler,
            embedder,
            store,
            llm,
            retriever,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn retriever(&self) -> &Retriever<E, S> {
        &self.retriever
    }

    /// Load `path` and answer `question` from it
    pub async fn run_file(
        &self,
        path: impl AsRef<Path>,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer, PipelineError> {
        let path = path.as_ref();
        let document = self
            .stage(Stage::Loaded, cancel, Document::from_path(path))
            .await?;
        self.run(document, question, cancel).await
    }

    /// Index `document` and answer `question` from it
    pub async fn run(
        &self,
        document: Document,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer, PipelineError> {
        info!(
            stage = %Stage::Loaded,
            source = document.source.as_deref().unwrap_or("<memory>"),
            chars = document.content.chars().count(),
            "document loaded"
        );

        let chunks = self
            .stage(Stage::Chunked, cancel, async {
                Ok::<_, ErrorKind>(self.chunker.split(&document.content))
            })
            .await?;
        info!(stage = %Stage::Chunked, chunks = chunks.len(), "document chunked");

        let chunks_indexed = self
            .stage(Stage::Indexed, cancel, self.index(&document, &chunks))
            .await?;
        info!(
            stage = %Stage::Indexed,
            passages = chunks_indexed,
            model = self.embedder.model_name(),
            "chunks indexed"
        );

        let passages = self
            .stage(Stage::Retrieved, cancel, async {
                self.retriever
                    .retrieve(question, self.config.top_k)
                    .await
                    .map_err(ErrorKind::from)
            })
            .await?;
        info!(stage = %Stage::Retrieved, passages = passages.len(), top_k = self.config.top_k, "passages retrieved");

        let prompt = self
            .stage(Stage::Assembled, cancel, async {
                Ok::<_, ErrorKind>(self.assembler.assemble(&passages, question))
            })
            .await?;
        info!(stage = %Stage::Assembled, prompt_chars = prompt.chars().count(), "prompt assembled");

        let completion = self
            .stage(Stage::Answered, cancel, async {
                with_deadline(
                    self.config.call_timeout,
                    self.llm.generate(&prompt),
                    GenerationError::Timeout,
                )
                .await
                .map_err(ErrorKind::from)
            })
            .await?;
        info!(stage = %Stage::Answered, model = self.llm.model_name(), "answer generated");

        Ok(Answer {
            prompt,
            passages,
            completion,
            chunks_indexed,
        })
    }

    async fn index(&self, document: &Document, chunks: &[Chunk]) -> Result<usize, ErrorKind> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();

        let vectors = with_deadline(
            self.config.call_timeout,
            self.embedder.embed_batch(&texts),
            EmbeddingError::Timeout,
        )
        .await?;

        if vectors.len() != chunks.len() {
            return Err(EmbeddingError::DecodeFailure(format!(
                "embedding model returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            ))
            .into());
        }

        let model = self.embedder.model_name();
        let passages: Vec<IndexedPassage> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let passage = IndexedPassage::new(chunk.text.clone(), vector)
                    .with_metadata("chunk_index", chunk.index)
                    .with_metadata("total_chunks", chunks.len())
                    .with_metadata("embedding_model", model);
                match &document.source {
                    Some(source) => passage.with_metadata("source", source.as_str()),
                    None => passage,
                }
            })
            .collect();

        with_deadline(
            self.config.call_timeout,
            self.store.upsert(passages),
            StoreError::Timeout,
        )
        .await?;

        Ok(chunks.len())
    }

    async fn stage<T, F>(&self, stage: Stage, cancel: &CancellationToken, work: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, ErrorKind>>,
    {
        cancellable(cancel, work).await.map_err(|source| {
            warn!(%stage, error = %source, "pipeline stage failed");
            PipelineError::new(stage, source)
        })
    }
}

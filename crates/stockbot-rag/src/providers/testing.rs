//! In-process fakes for the provider traits

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::{ChatMessage, ChatModel, ToolSpec};
use crate::providers::vector_store::{IndexSpec, VectorMatch, VectorRecord, VectorStoreProvider};

/// Embeds text as a small vector derived from its bytes
#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn vector(text: &str) -> Vec<f32> {
        let sum: u32 = text.bytes().map(u32::from).sum();
        vec![1.0, (sum % 97) as f32 / 97.0, text.len() as f32]
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::embedding("quota exceeded"));
        }
        Ok(Self::vector(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::embedding("quota exceeded"));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Records every call and returns canned matches
#[derive(Default)]
pub struct InMemoryVectorStore {
    pub indexes: Mutex<HashMap<String, Vec<VectorRecord>>>,
    pub created: Mutex<Vec<IndexSpec>>,
    pub calls: AtomicUsize,
    pub matches: Mutex<Vec<VectorMatch>>,
    pub fail_upsert: bool,
    pub fail_query: bool,
}

impl InMemoryVectorStore {
    pub fn with_matches(matches: Vec<VectorMatch>) -> Self {
        Self {
            matches: Mutex::new(matches),
            ..Self::default()
        }
    }

    pub fn stored(&self, index: &str) -> Vec<VectorRecord> {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn has_index(&self, name: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.indexes.lock().unwrap().contains_key(name))
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.created.lock().unwrap().push(spec.clone());
        self.indexes
            .lock()
            .unwrap()
            .entry(spec.name.clone())
            .or_default();
        Ok(())
    }

    async fn upsert(&self, index: &str, _namespace: &str, records: &[VectorRecord]) -> Result<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(Error::vector_db("upsert rejected"));
        }
        self.indexes
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len())
    }

    async fn query(
        &self,
        _index: &str,
        _namespace: &str,
        _vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(Error::vector_db("index unavailable"));
        }
        Ok(self.matches.lock().unwrap().iter().take(top_k).cloned().collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Replays scripted assistant messages and records what it was sent
#[derive(Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<Result<ChatMessage>>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    pub seen_tools: Mutex<Vec<Vec<String>>>,
}

impl ScriptedChatModel {
    pub fn new(replies: Vec<ChatMessage>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(vec![Err(Error::llm(message))])),
            ..Self::default()
        }
    }

    pub fn turns(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.seen_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatMessage::assistant("(script exhausted)")))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

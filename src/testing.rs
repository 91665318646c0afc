//! In-process fakes for the external backends, shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{Result, VettError};
use crate::media::{Transcriber, VideoCandidate, VideoMetadata, VideoPlatform};
use crate::summarizer::TextGenerator;
use crate::web::{SearchLink, SearchProvider};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds anything mentioning photosynthesis on one axis, everything else on another.
#[derive(Default)]
pub(crate) struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(text: &str) -> Vec<f32> {
        if text.to_lowercase().contains("photosynthesis") {
            vec![1.0, 0.0, 0.0]
        } else {
            vec![0.0, 1.0, 0.0]
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Embedder whose backend is always down.
pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VettError::Embedding("embedding backend offline".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VettError::Embedding("embedding backend offline".to_string()))
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Replies with a fixed string and records every (system, user) pair.
pub(crate) struct RecordingGenerator {
    reply: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingGenerator {
    pub(crate) fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        Ok(self.reply.clone())
    }
}

pub(crate) struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(VettError::OpenAI("quota exceeded".to_string()))
    }
}

pub(crate) struct FixedTranscriber {
    text: String,
}

impl FixedTranscriber {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        Ok(self.text.clone())
    }
}

pub(crate) struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        Err(VettError::Transcription(format!(
            "could not decode {}",
            audio.display()
        )))
    }
}

/// A platform hosting exactly one video.
pub(crate) struct FakePlatform {
    id: String,
    title: String,
}

impl FakePlatform {
    pub(crate) fn with_video(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn search_top(&self, _query: &str) -> Result<Option<VideoCandidate>> {
        Ok(Some(VideoCandidate {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url(),
            thumbnail: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id),
        }))
    }

    async fn metadata(&self, _url: &str) -> Result<VideoMetadata> {
        Ok(VideoMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url(),
            thumbnail: None,
            duration_seconds: Some(60),
            channel: None,
        })
    }

    async fn download_audio(&self, _video: &str, dest_dir: &Path) -> Result<PathBuf> {
        let path = dest_dir.join("audio.m4a");
        std::fs::write(&path, b"fake audio")?;
        Ok(path)
    }
}

/// Search provider returning a fixed list of links.
pub(crate) struct StaticProvider {
    name: String,
    links: Vec<SearchLink>,
}

impl StaticProvider {
    pub(crate) fn new(name: &str, links: Vec<(String, &str)>) -> Self {
        Self {
            name: name.to_string(),
            links: links
                .into_iter()
                .map(|(url, title)| SearchLink {
                    url,
                    title: title.to_string(),
                })
                .collect(),
        }
    }

    pub(crate) fn empty(name: &str) -> Self {
        Self::new(name, Vec::new())
    }
}

#[async_trait]
impl SearchProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str, max_results: usize) -> Vec<SearchLink> {
        self.links.iter().take(max_results).cloned().collect()
    }
}

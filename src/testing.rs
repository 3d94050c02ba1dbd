//! Test doubles shared by unit tests across the crate.

use crate::{
    error::{MagicError, Result},
    gemini::GenerationClient,
    models::{FeatureKind, ImageData, StoryPage},
    store::Clock,
};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: FeatureKind,
    pub api_key: String,
    pub prompt: String,
    pub with_source: bool,
}

/// Scripted `GenerationClient`. Every call succeeds unless its index was marked to fail.
pub struct FakeClient {
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<HashSet<usize>>,
    probe_ok: AtomicBool,
    story: Mutex<Vec<StoryPage>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            probe_ok: AtomicBool::new(true),
            story: Mutex::new(
                (0..4)
                    .map(|i| StoryPage::new(format!("Page {i} text"), format!("Page {i} scene")))
                    .collect(),
            ),
        }
    }

    /// Makes the `index`-th generation call (0-based, probes excluded) fail.
    pub fn fail_call(&self, index: usize) -> &Self {
        self.failing.lock().unwrap().insert(index);
        self
    }

    pub fn reject_probe(&self) {
        self.probe_ok.store(false, Ordering::SeqCst);
    }

    pub fn with_story(self, pages: Vec<StoryPage>) -> Self {
        *self.story.lock().unwrap() = pages;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, kind: FeatureKind, api_key: &str, prompt: &str, with_source: bool) -> Result<usize> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(RecordedCall {
            kind,
            api_key: api_key.to_string(),
            prompt: prompt.to_string(),
            with_source,
        });
        if self.failing.lock().unwrap().contains(&index) {
            return Err(MagicError::Generation(format!("scripted failure on call {index}")));
        }
        Ok(index)
    }

    fn image(&self, kind: FeatureKind, api_key: &str, prompt: &str, with_source: bool) -> Result<ImageData> {
        let index = self.record(kind, api_key, prompt, with_source)?;
        Ok(ImageData::new("image/png", vec![index as u8]))
    }
}

#[async_trait]
impl GenerationClient for FakeClient {
    async fn photo(&self, api_key: &str, prompt: &str, _source: &ImageData) -> Result<ImageData> {
        self.image(FeatureKind::Photo, api_key, prompt, true)
    }

    async fn illustration(&self, api_key: &str, prompt: &str, source: Option<&ImageData>) -> Result<ImageData> {
        self.image(FeatureKind::Illustration, api_key, prompt, source.is_some())
    }

    async fn coloring(&self, api_key: &str, prompt: &str, source: Option<&ImageData>) -> Result<ImageData> {
        self.image(FeatureKind::Coloring, api_key, prompt, source.is_some())
    }

    async fn sticker(&self, api_key: &str, prompt: &str, source: Option<&ImageData>) -> Result<ImageData> {
        self.image(FeatureKind::Sticker, api_key, prompt, source.is_some())
    }

    async fn story(&self, api_key: &str, prompt: &str) -> Result<Vec<StoryPage>> {
        self.record(FeatureKind::Story, api_key, prompt, false)?;
        Ok(self.story.lock().unwrap().clone())
    }

    async fn probe(&self, _api_key: &str) -> Result<()> {
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MagicError::Generation("API key not valid".into()))
        }
    }
}

pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            today: Mutex::new(NaiveDate::from_ymd_opt(year, month, day).unwrap()),
        }
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap();
        *today = today.checked_add_days(Days::new(days)).unwrap();
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

pub fn sample_photo() -> ImageData {
    ImageData::new("image/jpeg", vec![0xff, 0xd8, 0xff])
}

use super::adapter::ImagePipeline;
use crate::{
    error::{MagicError, Result},
    models::{GenerationRequest, GenerationResult, ImageData, StoryPage},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// One image in a multi-page batch.
#[derive(Debug, Clone)]
pub struct PageJob {
    pub index: usize,
    pub label: String,
    pub request: GenerationRequest,
}

impl PageJob {
    pub fn new(index: usize, label: impl Into<String>, request: GenerationRequest) -> Self {
        Self {
            index,
            label: label.into(),
            request,
        }
    }
}

/// Where finished pages land. Writes happen in place as each page completes.
pub trait PageSlots {
    fn has_image(&self, index: usize) -> bool;

    fn store_image(&mut self, index: usize, image: ImageData);
}

impl PageSlots for Vec<Option<ImageData>> {
    fn has_image(&self, index: usize) -> bool {
        self.get(index).map_or(false, Option::is_some)
    }

    fn store_image(&mut self, index: usize, image: ImageData) {
        if index >= self.len() {
            self.resize(index + 1, None);
        }
        self[index] = Some(image);
    }
}

impl PageSlots for Vec<StoryPage> {
    fn has_image(&self, index: usize) -> bool {
        self.get(index).map_or(false, StoryPage::is_illustrated)
    }

    fn store_image(&mut self, index: usize, image: ImageData) {
        if let Some(page) = self.get_mut(index) {
            page.image = Some(image);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    PageStarted { index: usize, position: usize, total: usize, label: String },
    PageDone { index: usize },
    PageSkipped { index: usize },
    Failed { index: usize, message: String },
    Cancelled { index: usize },
    Finished { generated: usize },
}

#[derive(Debug)]
pub enum BatchStop {
    Failed { index: usize, error: MagicError },
    Cancelled { index: usize },
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: usize,
    pub skipped: usize,
    pub stopped: Option<BatchStop>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }

    /// Converts an early stop into an error, leaving completed pages untouched.
    pub fn into_result(self) -> Result<usize> {
        match self.stopped {
            None => Ok(self.generated),
            Some(BatchStop::Failed { error, .. }) => Err(error),
            Some(BatchStop::Cancelled { index }) => Err(MagicError::Generation(format!(
                "Batch cancelled before page {}",
                index
            ))),
        }
    }
}

/// Cooperative cancel flag, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs page jobs strictly one after another.
///
/// The first failure stops the batch. Pages finished before it keep their images
/// and later pages stay empty.
#[derive(Clone)]
pub struct BatchPipeline {
    pipeline: ImagePipeline,
    cancel: CancelHandle,
    events: Option<UnboundedSender<BatchEvent>>,
    force_regenerate: bool,
}

impl BatchPipeline {
    pub fn new(pipeline: ImagePipeline) -> Self {
        Self {
            pipeline,
            cancel: CancelHandle::new(),
            events: None,
            force_regenerate: false,
        }
    }

    pub fn with_events(mut self) -> (Self, UnboundedReceiverStream<BatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        (self, UnboundedReceiverStream::new(rx))
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Regenerates pages even when they already hold an image.
    pub fn force_regenerate(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn pipeline(&self) -> &ImagePipeline {
        &self.pipeline
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    pub async fn run<S: PageSlots + ?Sized>(&self, jobs: Vec<PageJob>, slots: &mut S) -> BatchReport {
        let total = jobs.len();
        let mut report = BatchReport::default();

        for (position, job) in jobs.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::warn!("Batch cancelled before page {}", job.index);
                self.emit(BatchEvent::Cancelled { index: job.index });
                report.stopped = Some(BatchStop::Cancelled { index: job.index });
                return report;
            }

            if slots.has_image(job.index) && !self.force_regenerate {
                report.skipped += 1;
                self.emit(BatchEvent::PageSkipped { index: job.index });
                continue;
            }

            self.emit(BatchEvent::PageStarted {
                index: job.index,
                position: position + 1,
                total,
                label: job.label.clone(),
            });
            log::info!("🎨 {} ({}/{})", job.label, position + 1, total);

            let outcome = self.pipeline.generate(job.request).await.and_then(|r| match r {
                GenerationResult::Image(image) => Ok(image),
                GenerationResult::Story(_) => Err(MagicError::Generation(
                    "Expected an image, got story text".into(),
                )),
            });

            match outcome {
                Ok(image) => {
                    slots.store_image(job.index, image);
                    report.generated += 1;
                    self.emit(BatchEvent::PageDone { index: job.index });
                }
                Err(error) => {
                    log::error!("Page {} failed, stopping batch: {}", job.index, error);
                    self.emit(BatchEvent::Failed {
                        index: job.index,
                        message: error.friendly_message(),
                    });
                    report.stopped = Some(BatchStop::Failed {
                        index: job.index,
                        error,
                    });
                    return report;
                }
            }
        }

        self.emit(BatchEvent::Finished {
            generated: report.generated,
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureKind, TextParams};
    use crate::store::{CredentialStore, MemoryStore};
    use crate::testing::FakeClient;
    use futures::StreamExt;

    fn pipeline(client: Arc<FakeClient>) -> ImagePipeline {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        creds.set("k").unwrap();
        ImagePipeline::new(client, creds)
    }

    fn jobs(n: usize) -> Vec<PageJob> {
        (0..n)
            .map(|i| {
                PageJob::new(
                    i,
                    format!("page {i}"),
                    GenerationRequest::new(
                        FeatureKind::Coloring,
                        None,
                        TextParams::new().with_scene(format!("scene {i}")),
                    ),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn failure_on_page_k_keeps_earlier_pages_only() {
        let client = Arc::new(FakeClient::new());
        client.fail_call(2);
        let batch = BatchPipeline::new(pipeline(client.clone()));
        let mut slots: Vec<Option<ImageData>> = vec![None; 5];

        let report = batch.run(jobs(5), &mut slots).await;

        assert_eq!(report.generated, 2);
        assert!(matches!(report.stopped, Some(BatchStop::Failed { index: 2, .. })));
        assert!(slots[0].is_some() && slots[1].is_some());
        assert!(slots[2..].iter().all(Option::is_none));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn pages_run_in_order() {
        let client = Arc::new(FakeClient::new());
        let batch = BatchPipeline::new(pipeline(client.clone()));
        let mut slots: Vec<Option<ImageData>> = Vec::new();
        let report = batch.run(jobs(3), &mut slots).await;
        assert!(report.is_complete());
        let prompts: Vec<_> = client.calls().into_iter().map(|c| c.prompt).collect();
        assert!(prompts[0].contains("scene 0"));
        assert!(prompts[2].contains("scene 2"));
        assert_eq!(slots.len(), 3);
    }

    #[tokio::test]
    async fn existing_images_are_skipped_unless_forced() {
        let client = Arc::new(FakeClient::new());
        let mut slots: Vec<Option<ImageData>> =
            vec![Some(ImageData::new("image/png", vec![42])), None];

        let report = BatchPipeline::new(pipeline(client.clone()))
            .run(jobs(2), &mut slots)
            .await;
        assert_eq!((report.generated, report.skipped), (1, 1));
        assert_eq!(slots[0].as_ref().unwrap().bytes, vec![42]);

        let report = BatchPipeline::new(pipeline(client.clone()))
            .force_regenerate(true)
            .run(jobs(1), &mut slots)
            .await;
        assert_eq!(report.generated, 1);
        assert_ne!(slots[0].as_ref().unwrap().bytes, vec![42]);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_page() {
        let client = Arc::new(FakeClient::new());
        let batch = BatchPipeline::new(pipeline(client.clone()));
        batch.cancel_handle().cancel();
        let mut slots: Vec<Option<ImageData>> = vec![None; 2];
        let report = batch.run(jobs(2), &mut slots).await;
        assert!(matches!(report.stopped, Some(BatchStop::Cancelled { index: 0 })));
        assert_eq!(client.call_count(), 0);
        assert!(report.into_result().is_err());
    }

    #[tokio::test]
    async fn progress_events_are_streamed() {
        let client = Arc::new(FakeClient::new());
        client.fail_call(1);
        let (batch, events) = BatchPipeline::new(pipeline(client)).with_events();
        let mut slots: Vec<Option<ImageData>> = vec![None; 3];
        batch.run(jobs(3), &mut slots).await;
        drop(batch);

        let events: Vec<BatchEvent> = events.collect().await;
        assert_eq!(
            events[0],
            BatchEvent::PageStarted { index: 0, position: 1, total: 3, label: "page 0".into() }
        );
        assert_eq!(events[1], BatchEvent::PageDone { index: 0 });
        assert!(matches!(events.last(), Some(BatchEvent::Failed { index: 1, .. })));
    }

    #[tokio::test]
    async fn story_pages_are_filled_in_place() {
        let client = Arc::new(FakeClient::new());
        let mut pages = vec![StoryPage::new("a", "x"), StoryPage::new("b", "y")];
        let report = BatchPipeline::new(pipeline(client)).run(jobs(2), &mut pages).await;
        assert_eq!(report.into_result().unwrap(), 2);
        assert!(pages.iter().all(StoryPage::is_illustrated));
    }
}

//! Render service: runs decode, composite, and encode work off the caller's
//! thread and reports progress.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, Rgba};
use tokio::sync::{watch, Mutex};

use mememaker_common::error::{MemeError, MemeResult};
use mememaker_meme_model::bitmap::Bitmap;
use mememaker_meme_model::geometry::CanvasSize;
use mememaker_meme_model::meme::{Flattener, Meme};

use crate::compositor::{draw_layer_guides, Compositor};

/// Progress callback for render jobs.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send + Sync>;

/// Render progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Overlays painted so far.
    pub layers_done: usize,

    /// Overlays in the meme.
    pub total_layers: usize,

    /// Current stage.
    pub stage: RenderStage,
}

/// Stages of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Decoding,
    Compositing,
    Encoding,
    Complete,
    Failed,
}

/// Options for writing a flattened meme to disk.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output PNG path.
    pub output_path: PathBuf,

    /// Outline every layer's box on the output.
    pub guides: bool,

    /// Guide outline color.
    pub guide_color: [u8; 4],
}

impl ExportOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            guides: false,
            guide_color: [255, 0, 128, 255],
        }
    }
}

/// Shared progress sink usable from a blocking task.
#[derive(Clone)]
struct Reporter(Option<Arc<ProgressCallback>>);

impl Reporter {
    fn report(&self, stage: RenderStage, layers_done: usize, total_layers: usize) {
        let Some(cb) = &self.0 else {
            return;
        };
        let progress = match stage {
            RenderStage::Decoding => 0.0,
            RenderStage::Compositing if total_layers == 0 => 0.5,
            RenderStage::Compositing => 0.1 + 0.8 * layers_done as f64 / total_layers as f64,
            RenderStage::Encoding => 0.9,
            RenderStage::Complete => 1.0,
            RenderStage::Failed => 0.0,
        };
        cb(RenderProgress {
            progress,
            layers_done,
            total_layers,
            stage,
        });
    }
}

/// A compositor that reports per-layer progress while it flattens.
struct ReportingFlattener<'a> {
    compositor: &'a Compositor,
    reporter: &'a Reporter,
}

impl ReportingFlattener<'_> {
    fn composite(&self, meme: &Meme, canvas: CanvasSize) -> MemeResult<image::RgbaImage> {
        let total = meme.layer_count();
        self.reporter.report(RenderStage::Decoding, 0, total);
        self.compositor
            .composite_with_progress(meme, canvas, &mut |done, total| {
                self.reporter.report(RenderStage::Compositing, done, total)
            })
    }
}

impl Flattener for ReportingFlattener<'_> {
    fn flatten(&self, meme: &Meme, canvas: CanvasSize) -> MemeResult<Bitmap> {
        let image = self.composite(meme, canvas)?;
        let total = meme.layer_count();
        self.reporter.report(RenderStage::Encoding, total, total);
        Bitmap::from_image(&DynamicImage::ImageRgba8(image))
    }
}

/// Clears the busy flag when a job ends, however it ends.
struct BusyGuard<'a>(&'a watch::Sender<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Runs render work on the blocking pool, one job at a time.
pub struct RenderService {
    compositor: Arc<Compositor>,
    job_lock: Mutex<()>,
    busy: watch::Sender<bool>,
}

impl RenderService {
    pub fn new(compositor: Compositor) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            compositor: Arc::new(compositor),
            job_lock: Mutex::new(()),
            busy,
        }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Observe the busy flag. It is true for the whole span of a job.
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Decode picker bytes into a bitmap without blocking the caller.
    pub async fn decode(&self, bytes: Vec<u8>) -> MemeResult<Bitmap> {
        tokio::task::spawn_blocking(move || Bitmap::from_encoded(&bytes))
            .await
            .map_err(|e| MemeError::decode(format!("decode task failed: {e}")))?
    }

    /// Build the record to persist for `meme`: a fresh thumbnail and a
    /// non-blank title. `meme` itself is never modified.
    pub async fn save(
        &self,
        meme: &Meme,
        canvas: CanvasSize,
        progress: Option<ProgressCallback>,
    ) -> MemeResult<Meme> {
        let reporter = Reporter(progress.map(Arc::new));
        let source = meme.clone();
        let meme_id = meme.id();

        let record = self
            .run(meme.layer_count(), reporter, move |compositor, reporter| {
                let flattener = ReportingFlattener {
                    compositor,
                    reporter,
                };
                source.prepare_save(canvas, &flattener)
            })
            .await?;

        tracing::info!(
            meme = %meme_id,
            title = %record.title(),
            layers = record.layer_count(),
            "Meme saved"
        );
        Ok(record)
    }

    /// Flatten `meme` to a PNG file.
    pub async fn export(
        &self,
        meme: &Meme,
        canvas: CanvasSize,
        options: ExportOptions,
        progress: Option<ProgressCallback>,
    ) -> MemeResult<PathBuf> {
        tracing::info!(
            meme = %meme.id(),
            output = %options.output_path.display(),
            guides = options.guides,
            "Starting export"
        );

        let reporter = Reporter(progress.map(Arc::new));
        let source = meme.clone();
        let output_path = options.output_path.clone();

        self.run(meme.layer_count(), reporter, move |compositor, reporter| {
            let flattener = ReportingFlattener {
                compositor,
                reporter,
            };
            let mut image = flattener.composite(&source, canvas)?;
            if options.guides {
                draw_layer_guides(&mut image, &source, canvas, Rgba(options.guide_color));
            }
            let total = source.layer_count();
            reporter.report(RenderStage::Encoding, total, total);
            if let Some(parent) = options.output_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            write_png(&image, &options.output_path)
        })
        .await?;

        tracing::info!(output = %output_path.display(), "Export complete");
        Ok(output_path)
    }

    /// Run one job on the blocking pool while holding the job lock and
    /// publishing the busy flag.
    async fn run<T, F>(&self, total_layers: usize, reporter: Reporter, job: F) -> MemeResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Compositor, &Reporter) -> MemeResult<T> + Send + 'static,
    {
        let _lock = self.job_lock.lock().await;
        self.busy.send_replace(true);
        let _busy = BusyGuard(&self.busy);

        let compositor = Arc::clone(&self.compositor);
        let task_reporter = reporter.clone();
        let result = tokio::task::spawn_blocking(move || job(&compositor, &task_reporter))
            .await
            .map_err(|e| MemeError::encode(format!("render task failed: {e}")))
            .and_then(|r| r);

        match &result {
            Ok(_) => reporter.report(RenderStage::Complete, total_layers, total_layers),
            Err(e) => {
                tracing::error!(error = %e, "Render job failed");
                reporter.report(RenderStage::Failed, 0, total_layers);
            }
        }
        result
    }
}

fn write_png(image: &image::RgbaImage, path: &Path) -> MemeResult<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(io) => MemeError::Io(io),
            other => MemeError::encode(other.to_string()),
        })
}

//! Image acquisition and placement
//!
//! Acquisition is asynchronous and may fail. Failures are never propagated:
//! the composer logs them and places a captioned placeholder box instead.

use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::LayoutConfig;
use crate::constants::PLACEHOLDER_HEIGHT;
use crate::draw::DrawCommand;
use crate::error::AcquireError;
use crate::model::{ImageBlock, ImageSource, SharedImageData};
use crate::page::Placement;
use crate::style::{Color, Stroke, TextStyle};
use crate::text::TextMetrics;

/// Space between an image and its caption
pub const CAPTION_GAP: f32 = 4.0;

/// Label used in a placeholder when the image has no caption
const UNAVAILABLE_LABEL: &str = "Image unavailable";

/// Encoded image bytes together with their natural pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub bytes: SharedImageData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Probe the encoded bytes for their pixel dimensions
    pub fn decode(bytes: SharedImageData) -> Result<Self, AcquireError> {
        let (width_px, height_px) = image::ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()?
            .into_dimensions()?;

        if width_px == 0 || height_px == 0 {
            return Err(AcquireError::Decode(format!(
                "image has empty dimensions {width_px}x{height_px}"
            )));
        }

        Ok(Self {
            bytes,
            width_px,
            height_px,
        })
    }

    /// Height after scaling to `target_width` with the aspect ratio kept
    pub fn scaled_height(&self, target_width: f32) -> f32 {
        target_width * (self.height_px as f32 / self.width_px as f32)
    }

    /// Largest size fitting in the box while keeping the aspect ratio
    pub fn fit_within(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let ratio = self.width_px as f32 / self.height_px as f32;
        let width = (max_height * ratio).min(max_width);
        (width, width / ratio)
    }
}

/// Resolves image references to encoded bytes.
///
/// Implementations decide where references point (storage, network, disk)
/// and how long to wait; a timed-out fetch is an ordinary failure.
pub trait ImageFetcher: Send + Sync {
    fn fetch(
        &self,
        reference: &str,
    ) -> impl Future<Output = Result<SharedImageData, AcquireError>> + Send;
}

/// Fetcher backed by a pre-populated map
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    images: HashMap<String, SharedImageData>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, data: Vec<u8>) {
        self.images.insert(reference.into(), Arc::new(data));
    }

    pub fn with_image(mut self, reference: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(reference, data);
        self
    }
}

impl ImageFetcher for InMemoryFetcher {
    async fn fetch(&self, reference: &str) -> Result<SharedImageData, AcquireError> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| AcquireError::NotFound(reference.to_string()))
    }
}

/// Fetcher reading files relative to a base directory.
///
/// Absolute references and references containing `..` are rejected.
#[derive(Debug, Clone)]
pub struct FilesystemFetcher {
    base: PathBuf,
}

impl FilesystemFetcher {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, AcquireError> {
        let path = Path::new(reference);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AcquireError::InvalidPath(reference.to_string()));
        }
        Ok(self.base.join(path))
    }
}

impl ImageFetcher for FilesystemFetcher {
    async fn fetch(&self, reference: &str) -> Result<SharedImageData, AcquireError> {
        let path = self.resolve(reference)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Arc::new(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AcquireError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Wraps another fetcher with a time limit
#[derive(Debug, Clone)]
pub struct TimeoutFetcher<F> {
    inner: F,
    limit: Duration,
}

impl<F> TimeoutFetcher<F> {
    pub fn new(inner: F, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl<F: ImageFetcher> ImageFetcher for TimeoutFetcher<F> {
    async fn fetch(&self, reference: &str) -> Result<SharedImageData, AcquireError> {
        tokio::time::timeout(self.limit, self.inner.fetch(reference))
            .await
            .map_err(|_| AcquireError::TimedOut(self.limit))?
    }
}

/// Obtain the bytes for a source and read their pixel dimensions
#[instrument(skip_all)]
pub async fn acquire<F: ImageFetcher>(
    source: &ImageSource,
    fetcher: &F,
) -> Result<LoadedImage, AcquireError> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes.clone(),
        ImageSource::Reference(reference) => {
            debug!("Fetching image '{}'", reference);
            fetcher.fetch(reference).await?
        }
    };
    LoadedImage::decode(bytes)
}

fn caption_style(config: &LayoutConfig) -> TextStyle {
    TextStyle::regular(config.base_font_size * 0.9)
        .italic()
        .with_color(Color::gray(0.25))
}

/// Inner margin between a placeholder frame and its label
const PLACEHOLDER_PADDING: f32 = 4.0;

fn placeholder_label(block: &ImageBlock) -> &str {
    if block.caption.is_empty() {
        UNAVAILABLE_LABEL
    } else {
        block.caption.as_str()
    }
}

/// Placeholder frame height: the fixed box, grown to fit a long label
fn placeholder_height(block: &ImageBlock, config: &LayoutConfig) -> f32 {
    let metrics = TextMetrics::from_config(config);
    let label_height = metrics.wrapped_height(
        placeholder_label(block),
        block.target_width,
        caption_style(config).font_size,
    );
    PLACEHOLDER_HEIGHT.max(label_height + 2.0 * PLACEHOLDER_PADDING)
}

/// Height of the image block: scaled image plus caption, or the
/// fixed placeholder box when the image is missing
pub fn image_height(block: &ImageBlock, image: Option<&LoadedImage>, config: &LayoutConfig) -> f32 {
    let Some(image) = image else {
        return placeholder_height(block, config);
    };

    let mut height = image.scaled_height(block.target_width);
    if !block.caption.is_empty() {
        let metrics = TextMetrics::from_config(config);
        let style = caption_style(config);
        height += CAPTION_GAP
            + metrics.wrapped_height(&block.caption, config.column_width(), style.font_size);
    }
    height
}

/// Draw commands for an image block at the reserved placement.
///
/// The image is centered in the column; a missing image becomes a dashed
/// box of the same width with the caption inside.
pub fn place_image(
    block: &ImageBlock,
    image: Option<&LoadedImage>,
    placement: &Placement,
    config: &LayoutConfig,
) -> Vec<DrawCommand> {
    let metrics = TextMetrics::from_config(config);
    let style = caption_style(config);
    let line_height = metrics.line_height(style.font_size);
    let x = placement.x + (placement.width - block.target_width).max(0.0) / 2.0;
    let mut commands = Vec::new();

    let centered = |line: &str, baseline: f32| DrawCommand::Text {
        x: placement.x + (placement.width - metrics.text_width(line, style.font_size)).max(0.0) / 2.0,
        y: baseline,
        text: line.to_string(),
        style,
    };

    match image {
        Some(image) => {
            let height = image.scaled_height(block.target_width);
            commands.push(DrawCommand::Image {
                x,
                y: placement.y,
                width: block.target_width,
                height,
                bytes: image.bytes.clone(),
            });

            if !block.caption.is_empty() {
                let top = placement.y + height + CAPTION_GAP;
                let lines = metrics.wrap(&block.caption, placement.width, style.font_size);
                for (i, line) in lines.iter().enumerate() {
                    commands.push(centered(line, top + i as f32 * line_height + style.font_size));
                }
            }
        }
        None => {
            let frame_height = placeholder_height(block, config);
            commands.push(DrawCommand::Frame {
                x,
                y: placement.y,
                width: block.target_width,
                height: frame_height,
                fill: None,
                stroke: Some(Stroke::dashed(1.0, Color::gray(0.5))),
            });

            let lines = metrics.wrap(placeholder_label(block), block.target_width, style.font_size);
            let text_height = lines.len() as f32 * line_height;
            let top = placement.y + (frame_height - text_height).max(0.0) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                commands.push(centered(line, top + i as f32 * line_height + style.font_size));
            }
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn placement() -> Placement {
        Placement {
            page: 1,
            x: 50.0,
            y: 100.0,
            width: 400.0,
            height: 0.0,
        }
    }

    #[test]
    fn test_decode_reads_dimensions() {
        let image = LoadedImage::decode(Arc::new(png(40, 20))).unwrap();
        assert_eq!((image.width_px, image.height_px), (40, 20));
        assert_eq!(image.scaled_height(200.0), 100.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = LoadedImage::decode(Arc::new(b"not an image".to_vec()));
        assert!(matches!(result, Err(AcquireError::Decode(_))));
    }

    #[test]
    fn test_fit_within_keeps_ratio() {
        let image = LoadedImage::decode(Arc::new(png(40, 20))).unwrap();
        assert_eq!(image.fit_within(1000.0, 24.0), (48.0, 24.0));
        assert_eq!(image.fit_within(20.0, 24.0), (20.0, 10.0));
    }

    #[tokio::test]
    async fn test_acquire_inline_and_fetched() {
        let fetcher = InMemoryFetcher::new().with_image("logo.png", png(10, 10));

        let inline = acquire(&ImageSource::bytes(png(8, 4)), &fetcher).await.unwrap();
        assert_eq!(inline.width_px, 8);

        let fetched = acquire(&ImageSource::reference("logo.png"), &fetcher)
            .await
            .unwrap();
        assert_eq!(fetched.height_px, 10);

        let missing = acquire(&ImageSource::reference("nope.png"), &fetcher).await;
        assert!(matches!(missing, Err(AcquireError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filesystem_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.png"), png(6, 3)).unwrap();
        let fetcher = FilesystemFetcher::new(dir.path());

        let image = acquire(&ImageSource::reference("chart.png"), &fetcher)
            .await
            .unwrap();
        assert_eq!(image.width_px, 6);

        let missing = fetcher.fetch("missing.png").await;
        assert!(matches!(missing, Err(AcquireError::NotFound(_))));

        let escape = fetcher.fetch("../etc/passwd").await;
        assert!(matches!(escape, Err(AcquireError::InvalidPath(_))));
    }

    struct SlowFetcher;

    impl ImageFetcher for SlowFetcher {
        async fn fetch(&self, _reference: &str) -> Result<SharedImageData, AcquireError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Arc::new(Vec::new()))
        }
    }

    #[tokio::test]
    async fn test_timeout_fetcher() {
        let fetcher = TimeoutFetcher::new(SlowFetcher, Duration::from_millis(10));
        let result = fetcher.fetch("slow.png").await;
        assert!(matches!(result, Err(AcquireError::TimedOut(_))));
    }

    #[test]
    fn test_place_loaded_image_scales_and_centers() {
        let config = LayoutConfig::default();
        let image = LoadedImage::decode(Arc::new(png(40, 20))).unwrap();
        let block = ImageBlock::new(ImageSource::reference("x"), "Figure 1", 200.0);

        let commands = place_image(&block, Some(&image), &placement(), &config);
        match &commands[0] {
            DrawCommand::Image {
                x, width, height, ..
            } => {
                assert_eq!(*x, 150.0);
                assert_eq!(*width, 200.0);
                assert_eq!(*height, 100.0);
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(commands[1].text().as_deref(), Some("Figure 1"));
    }

    #[test]
    fn test_placeholder_keeps_caption() {
        let config = LayoutConfig::default();
        let block = ImageBlock::new(ImageSource::reference("x"), "Site photo", 200.0);

        let commands = place_image(&block, None, &placement(), &config);
        assert!(matches!(
            commands[0],
            DrawCommand::Frame {
                stroke: Some(Stroke {
                    style: crate::style::BorderStyle::Dashed,
                    ..
                }),
                ..
            }
        ));
        assert_eq!(commands[1].text().as_deref(), Some("Site photo"));
        assert_eq!(image_height(&block, None, &config), PLACEHOLDER_HEIGHT);
    }

    #[test]
    fn test_long_placeholder_caption_stays_inside_frame() {
        let config = LayoutConfig::default();
        let caption = "Photograph of the damaged storage room taken during the inspection ".repeat(4);
        let block = ImageBlock::new(ImageSource::reference("x"), caption, 60.0);

        let height = image_height(&block, None, &config);
        assert!(height > PLACEHOLDER_HEIGHT);

        let at = placement();
        let commands = place_image(&block, None, &at, &config);
        match &commands[0] {
            DrawCommand::Frame { height: frame, .. } => assert_eq!(*frame, height),
            other => panic!("expected frame, got {other:?}"),
        }
        for command in &commands[1..] {
            if let DrawCommand::Text { y, .. } = command {
                assert!(*y <= at.y + height);
            }
        }
    }

    #[test]
    fn test_image_height_includes_caption() {
        let config = LayoutConfig::default();
        let image = LoadedImage::decode(Arc::new(png(40, 20))).unwrap();
        let bare = ImageBlock::new(ImageSource::reference("x"), "", 200.0);
        let captioned = ImageBlock::new(ImageSource::reference("x"), "Caption", 200.0);

        assert_eq!(image_height(&bare, Some(&image), &config), 100.0);
        assert!(image_height(&captioned, Some(&image), &config) > 100.0 + CAPTION_GAP);
    }
}

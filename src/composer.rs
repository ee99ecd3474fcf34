//! Document Assembler: the single pass that turns a document into pages

use tracing::{debug, instrument, trace, warn};

use crate::Result;
use crate::config::LayoutConfig;
use crate::draw::RenderedPage;
use crate::image::{ImageFetcher, InMemoryFetcher, LoadedImage, acquire, place_image};
use crate::measure::measure;
use crate::model::{Block, Document, DocumentMeta, ImageBlock};
use crate::page::{PageManager, Placement, RunningStamps};
use crate::place::{place_bullets, place_heading, place_paragraph, place_rule, place_signature};
use crate::table::{place_key_values, place_table};

/// Lays out documents with a fixed configuration.
///
/// A composer holds no per-document state: every call to
/// [`Composer::compose`] owns its own cursor, so different documents may
/// be composed concurrently through a shared reference.
#[derive(Debug, Clone)]
pub struct Composer<F = InMemoryFetcher> {
    config: LayoutConfig,
    fetcher: F,
}

impl Composer<InMemoryFetcher> {
    /// Composer without an image store; only inline image bytes resolve
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_fetcher(config, InMemoryFetcher::new())
    }
}

impl Default for Composer<InMemoryFetcher> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<F: ImageFetcher> Composer<F> {
    pub fn with_fetcher(config: LayoutConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Lay out every block of `document` in order and return the pages.
    ///
    /// Contract violations fail before any page exists. Image failures are
    /// logged and replaced by placeholders. Images are acquired one at a
    /// time, in block order, right before the block is measured.
    #[instrument(skip_all, fields(title = %document.meta.title, blocks = document.blocks.len()))]
    pub async fn compose(&self, document: &Document) -> Result<Vec<RenderedPage>> {
        self.config.validate()?;
        document.validate(self.config.column_width())?;

        let logo = self.acquire_logo(&document.meta).await;
        let stamps = RunningStamps::new(&document.meta, logo);
        let mut pager = PageManager::new(&self.config, &stamps);

        for (index, block) in document.blocks.iter().enumerate() {
            let image = match block {
                Block::Image(image) => self.acquire_block_image(index, image).await,
                _ => None,
            };

            match block {
                // Tables reserve row by row from their own layout
                Block::DataTable(table) => {
                    let result = place_table(table, &mut pager, &self.config);
                    trace!(index, pages = result.total_pages(), "Placed table");
                }
                Block::Heading(heading) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_heading(heading, &at, &self.config));
                }
                Block::KeyValueTable(table) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_key_values(table, &at, &self.config));
                }
                Block::BulletList(list) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_bullets(list, &at, &self.config));
                }
                Block::Paragraph(paragraph) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_paragraph(paragraph, &at, &self.config));
                }
                Block::Image(image_block) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_image(image_block, image.as_ref(), &at, &self.config));
                }
                Block::SignatureBlock(signature) => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_signature(signature, &at, &self.config));
                }
                Block::Rule => {
                    let at = self.reserve_block(&mut pager, index, block, image.as_ref());
                    pager.extend(place_rule(&at));
                }
            }

            pager.advance(self.config.block_spacing);
        }

        let pages = pager.finish();
        debug!("Composed {} page(s)", pages.len());
        Ok(pages)
    }

    /// Measure a single-band block and reserve its height
    fn reserve_block(
        &self,
        pager: &mut PageManager<'_>,
        index: usize,
        block: &Block,
        image: Option<&LoadedImage>,
    ) -> Placement {
        let height = measure(block, pager.column_width(), &self.config, image);
        trace!(index, kind = block.kind(), height, "Measured block");
        pager.reserve(height)
    }

    /// Compose `document` and serialize the pages as PDF bytes
    #[cfg(feature = "pdf")]
    pub async fn compose_pdf(&self, document: &Document) -> Result<Vec<u8>> {
        let pages = self.compose(document).await?;
        crate::pdf::to_pdf_bytes(&pages, &self.config, &document.meta)
    }

    async fn acquire_logo(&self, meta: &DocumentMeta) -> Option<LoadedImage> {
        if !(self.config.show_logo && self.config.header_footer) {
            return None;
        }
        let source = meta.logo.as_ref()?;

        match acquire(source, &self.fetcher).await {
            Ok(logo) => Some(logo),
            Err(err) => {
                warn!(error = %err, "Logo could not be loaded; header shows the organization name only");
                None
            }
        }
    }

    async fn acquire_block_image(&self, index: usize, block: &ImageBlock) -> Option<LoadedImage> {
        match acquire(&block.source, &self.fetcher).await {
            Ok(image) => {
                trace!(index, width = image.width_px, height = image.height_px, "Acquired image");
                Some(image)
            }
            Err(err) => {
                warn!(index, caption = %block.caption, error = %err, "Image acquisition failed; using placeholder");
                None
            }
        }
    }
}

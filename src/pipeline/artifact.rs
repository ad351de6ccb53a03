//! Artifact generation: render text to a PDF on disk.
//!
//! The document is plain A4 pages of word-wrapped Helvetica. printpdf's
//! builtin fonts only cover WinAnsi, so characters outside Latin-1 are
//! replaced with `?` in the rendering. The stored `count` is always measured on
//! the original text, never on what was drawn.
//!
//! The file is first written as `<name>.pdf.tmp` and then renamed, so a
//! returned locator always points at a complete file and a failure leaves
//! nothing behind.

use crate::config::{CountMetric, PipelineConfig};
use crate::error::GenerationError;
use crate::output::Artifact;
use chrono::Utc;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;

/// Renders text into a durable document.
///
/// Implementations are blocking; the pipeline calls them from
/// `spawn_blocking`.
pub trait ArtifactGenerator: Send + Sync {
    fn generate(&self, text: &str) -> Result<Artifact, GenerationError>;
}

/// Writes one PDF per call into `output_dir`.
#[derive(Debug, Clone)]
pub struct PdfArtifactGenerator {
    output_dir: PathBuf,
    file_prefix: String,
    count_metric: CountMetric,
    font_size: f32,
    wrap_width: usize,
}

impl PdfArtifactGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&PipelineConfig {
            output_dir: output_dir.into(),
            ..PipelineConfig::default()
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            count_metric: config.count_metric,
            font_size: config.font_size,
            wrap_width: config.wrap_width,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn next_file_name(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.pdf",
            self.file_prefix,
            Utc::now().format("%Y%m%d%H%M%S"),
            &id[..8]
        )
    }
}

impl ArtifactGenerator for PdfArtifactGenerator {
    fn generate(&self, text: &str) -> Result<Artifact, GenerationError> {
        let bytes = render_pdf(text, self.font_size, self.wrap_width)?;

        std::fs::create_dir_all(&self.output_dir).map_err(|e| GenerationError::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let file_name = self.next_file_name();
        let file_path = self.output_dir.join(&file_name);
        write_atomic(&file_path, &bytes)?;

        let count = self.count_metric.measure(text);
        debug!(
            "Wrote {} ({} bytes, count {})",
            file_path.display(),
            bytes.len(),
            count
        );

        Ok(Artifact {
            file_name,
            file_path,
            count,
        })
    }
}

/// Write `bytes` to `<path>.tmp`, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), GenerationError> {
    let tmp_path = path.with_extension("pdf.tmp");

    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        // A partial temp file may exist (e.g. disk full mid-write).
        let _ = std::fs::remove_file(&tmp_path);
        return Err(GenerationError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        warn!("Rename of {} failed, removing temp file", tmp_path.display());
        let _ = std::fs::remove_file(&tmp_path);
        GenerationError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Render `text` as an A4 PDF and return the file bytes.
pub fn render_pdf(text: &str, font_size: f32, wrap_width: usize) -> Result<Vec<u8>, GenerationError> {
    let title = document_title(text);
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| GenerationError::Render(format!("font error: {e}")))?;

    let line_height = font_size * PT_TO_MM * LINE_SPACING;
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = top;
    let mut pages = 1;

    for line in layout_lines(text, wrap_width) {
        if y < MARGIN_MM {
            let (page, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_idx);
            y = top;
            pages += 1;
        }
        if !line.is_empty() {
            layer.use_text(to_winansi_lossy(&line), font_size, Mm(MARGIN_MM), Mm(y), &font);
        }
        y -= line_height;
    }
    debug!("Rendered {} page(s)", pages);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| GenerationError::Render(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| GenerationError::Render(format!("PDF buffer error: {e}")))
}

/// First non-blank line, shortened for the PDF title field.
fn document_title(text: &str) -> String {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let mut title: String = first.chars().take(60).collect();
    if first.chars().count() > 60 {
        title.push('…');
    }
    title
}

/// Split `text` into display lines: hard line breaks are kept, long lines
/// are word-wrapped at `width` characters, and words longer than `width`
/// are hard-split.
pub fn layout_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();

    for raw in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in raw.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let piece_len = piece.len();
                if current_len > 0 && current_len + 1 + piece_len > width {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(piece);
                current_len += piece_len;
            }
        }
        out.push(current);
    }

    out
}

fn to_winansi_lossy(line: &str) -> String {
    line.chars()
        .map(|c| if (c as u32) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Library view-state controller.
//
// A single owner of everything the library screen shows: the document list,
// the one action in progress, and the last extraction result. The UI calls
// in, the controller talks to the store, scanner, and extractor, and every
// outcome the user should hear about goes out through the notifier.
//
// Long-running work is split into begin/complete pairs. `begin_*` validates
// and moves into the busy state, returning a pending handle that owns
// everything the work needs; the caller drives that handle on its own task
// and hands the result back through `complete_*`. Each pending operation
// carries an `OperationId`, so a result arriving after the user cancelled is
// recognised as stale and ignored.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};
use scanshelf_bridge::{Notifier, PendingCapture, PlatformBridge};
use scanshelf_core::config::ExportPolicy;
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::human_errors::{humanize_error, notice_for};
use scanshelf_core::types::{
    CaptureResult, DocumentList, ExtractedText, Notice, OperationId, PDF_MIME_TYPE,
    ScannedDocument, ScannerOptions,
};
use scanshelf_core::AppConfig;
use scanshelf_document::render::render_preview;
use scanshelf_document::{CancelFlag, DocumentStore, TextExtractor};
use tracing::{debug, info, instrument, warn};

use crate::environment::Environment;

// -- State ---------------------------------------------------------------------

/// What the library screen is doing. Only one non-idle state at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryState {
    Idle,
    /// The platform scanner flow is on screen.
    Capturing,
    /// Text is being extracted from `document`.
    Extracting { document: ScannedDocument },
    /// Waiting for the user to confirm (or edit) a new name.
    ConfirmingRename {
        document: ScannedDocument,
        proposed_name: String,
    },
    /// Waiting for the user to confirm deletion.
    ConfirmingDelete { document: ScannedDocument },
}

impl LibraryState {
    pub fn label(&self) -> &'static str {
        match self {
            LibraryState::Idle => "idle",
            LibraryState::Capturing => "capturing",
            LibraryState::Extracting { .. } => "extracting",
            LibraryState::ConfirmingRename { .. } => "confirming rename",
            LibraryState::ConfirmingDelete { .. } => "confirming delete",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LibraryState::Idle)
    }
}

/// A finished extraction, shown until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionView {
    pub document: ScannedDocument,
    /// The text, or a message explaining why there is none.
    pub outcome: std::result::Result<ExtractedText, String>,
}

impl ExtractionView {
    pub fn text(&self) -> Option<&ExtractedText> {
        self.outcome.as_ref().ok()
    }
}

/// What a confirmed dialog did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    Renamed(ScannedDocument),
    /// File name of the deleted document.
    Deleted(String),
}

// -- Pending operations --------------------------------------------------------

/// A started scanner flow.
#[derive(Debug)]
pub struct PendingScan {
    id: OperationId,
    capture: PendingCapture,
    cancel: CancelFlag,
}

/// The outcome of a scanner flow, ready for [`LibraryController::complete_scan`].
#[derive(Debug)]
pub struct CompletedScan {
    id: OperationId,
    result: CaptureResult,
}

impl PendingScan {
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Wait for the scanner flow to finish, or for the controller to cancel it.
    pub async fn wait(self) -> CompletedScan {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => CaptureResult::Cancelled,
            result = self.capture.wait() => result,
        };
        CompletedScan {
            id: self.id,
            result,
        }
    }
}

impl CompletedScan {
    pub fn result(&self) -> &CaptureResult {
        &self.result
    }
}

/// A started extraction.
pub struct PendingExtraction {
    id: OperationId,
    document: ScannedDocument,
    extractor: TextExtractor,
    cancel: CancelFlag,
}

/// The outcome of an extraction, ready for [`LibraryController::complete_extract`].
#[derive(Debug)]
pub struct CompletedExtraction {
    id: OperationId,
    document: ScannedDocument,
    outcome: Result<ExtractedText>,
}

impl PendingExtraction {
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Run the extraction to completion (or cancellation).
    pub async fn run(self) -> CompletedExtraction {
        let outcome = self.extractor.extract(&self.document, &self.cancel).await;
        CompletedExtraction {
            id: self.id,
            document: self.document,
            outcome,
        }
    }
}

/// Identity and cancel switch of the capture or extraction in flight.
#[derive(Debug)]
struct ActiveOperation {
    id: OperationId,
    cancel: CancelFlag,
}

// -- Controller ----------------------------------------------------------------

/// Drives the library screen.
pub struct LibraryController {
    store: DocumentStore,
    platform: Arc<dyn PlatformBridge>,
    notifier: Arc<dyn Notifier>,
    extractor: TextExtractor,
    state: LibraryState,
    documents: DocumentList,
    extraction: Option<ExtractionView>,
    active: Option<ActiveOperation>,
    scanner: ScannerOptions,
    export_file_name: String,
    export_policy: ExportPolicy,
    announce_completions: bool,
    preview_max_dimension: u32,
}

impl LibraryController {
    /// Open the store in `environment` and load the initial document list.
    #[instrument(skip_all, fields(store = %environment.store_dir.display()))]
    pub fn new(
        environment: Environment,
        platform: Arc<dyn PlatformBridge>,
        extractor: TextExtractor,
        config: &AppConfig,
    ) -> Result<Self> {
        let store = DocumentStore::open(&environment.store_dir)?;
        let mut controller = Self {
            store,
            platform,
            notifier: environment.notifier,
            extractor,
            state: LibraryState::Idle,
            documents: Vec::new(),
            extraction: None,
            active: None,
            scanner: config.scanner.clone(),
            export_file_name: config.export_file_name.clone(),
            export_policy: config.export_policy,
            announce_completions: config.announce_completions,
            preview_max_dimension: config.preview_max_dimension,
        };
        controller.refresh();
        info!(
            platform = controller.platform.platform_name(),
            documents = controller.documents.len(),
            "library controller ready"
        );
        Ok(controller)
    }

    // -- Queries ---------------------------------------------------------------

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    /// The document list as of the last refresh, newest first.
    pub fn documents(&self) -> &[ScannedDocument] {
        &self.documents
    }

    /// The extraction currently presented, if any.
    pub fn extraction(&self) -> Option<&ExtractionView> {
        self.extraction.as_ref()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Re-read the document list from disk.
    pub fn refresh(&mut self) -> &[ScannedDocument] {
        self.documents = self.store.list();
        &self.documents
    }

    // -- Capture ---------------------------------------------------------------

    /// Launch the scanner flow. The returned handle resolves when the user
    /// finishes or backs out; feed its result to [`complete_scan`](Self::complete_scan).
    #[instrument(skip_all)]
    pub fn begin_scan(&mut self) -> Result<PendingScan> {
        self.ensure_idle()?;

        let capture = match self.platform.start_capture(&self.scanner) {
            Ok(capture) => capture,
            Err(err) => {
                warn!(%err, "scanner flow could not start");
                self.report(&err);
                return Err(err);
            }
        };

        let (id, cancel) = self.start_operation();
        self.state = LibraryState::Capturing;
        info!(%id, "capture started");
        Ok(PendingScan {
            id,
            capture,
            cancel,
        })
    }

    /// Apply the outcome of a scanner flow.
    ///
    /// Returns the new document on success, `None` when the user cancelled
    /// or the result belongs to an operation that is no longer current.
    #[instrument(skip_all, fields(id = %completed.id))]
    pub fn complete_scan(&mut self, completed: CompletedScan) -> Result<Option<ScannedDocument>> {
        if !self.finish_operation(completed.id) {
            debug!("ignoring stale capture result");
            return Ok(None);
        }

        match completed.result {
            CaptureResult::Success(bytes) if bytes.is_empty() => {
                let err = ScanshelfError::CaptureFailed("scanner returned an empty document".into());
                self.report(&err);
                Err(err)
            }
            CaptureResult::Success(bytes) => {
                let persisted = self.store.persist(&bytes);
                self.refresh();
                match persisted {
                    Ok(document) => {
                        let notice = Notice::success("Scan completed");
                        self.notify(if self.announce_completions {
                            notice.announced()
                        } else {
                            notice
                        });
                        Ok(Some(document))
                    }
                    Err(err) => {
                        self.report(&err);
                        Err(err)
                    }
                }
            }
            CaptureResult::Cancelled => {
                info!("capture cancelled by user");
                Ok(None)
            }
            CaptureResult::Failed(message) => {
                let err = ScanshelfError::CaptureFailed(message);
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Begin, await, and complete a scan in one call.
    pub async fn scan(&mut self) -> Result<Option<ScannedDocument>> {
        let pending = self.begin_scan()?;
        let completed = pending.wait().await;
        self.complete_scan(completed)
    }

    // -- Extraction ------------------------------------------------------------

    /// Start extracting text from `document`. Any previously presented
    /// extraction is dismissed.
    #[instrument(skip_all, fields(file = %document.file_name))]
    pub fn begin_extract(&mut self, document: &ScannedDocument) -> Result<PendingExtraction> {
        self.ensure_idle()?;

        self.extraction = None;
        let (id, cancel) = self.start_operation();
        self.state = LibraryState::Extracting {
            document: document.clone(),
        };
        info!(%id, "extraction started");
        Ok(PendingExtraction {
            id,
            document: document.clone(),
            extractor: self.extractor.clone(),
            cancel,
        })
    }

    /// Present the outcome of an extraction.
    ///
    /// Returns `None` for stale or cancelled extractions, which present
    /// nothing.
    #[instrument(skip_all, fields(id = %completed.id, file = %completed.document.file_name))]
    pub fn complete_extract(&mut self, completed: CompletedExtraction) -> Option<&ExtractionView> {
        if !self.finish_operation(completed.id) {
            debug!("ignoring stale extraction result");
            return None;
        }

        let outcome = match completed.outcome {
            Ok(text) => {
                info!(pages = text.page_count(), "extraction presented");
                Ok(text)
            }
            Err(ScanshelfError::Cancelled) => return None,
            Err(err) => {
                if matches!(err, ScanshelfError::NotFound(_)) {
                    self.refresh();
                }
                self.report(&err);
                let human = humanize_error(&err);
                Err(format!("{} {}", human.message, human.suggestion))
            }
        };

        self.extraction = Some(ExtractionView {
            document: completed.document,
            outcome,
        });
        self.extraction.as_ref()
    }

    /// Begin, run, and complete an extraction in one call.
    pub async fn extract(&mut self, document: &ScannedDocument) -> Result<Option<ExtractionView>> {
        let pending = self.begin_extract(document)?;
        let completed = pending.run().await;
        Ok(self.complete_extract(completed).cloned())
    }

    /// Close the extraction view.
    pub fn dismiss_extraction(&mut self) {
        self.extraction = None;
    }

    /// Save the presented text next to the documents. The outcome is
    /// reported through a notice; the written path is returned on success.
    pub fn export_extraction(&self) -> Option<PathBuf> {
        let Some(text) = self.extraction.as_ref().and_then(ExtractionView::text) else {
            self.report(&ScanshelfError::NoPendingAction);
            return None;
        };

        match self
            .store
            .export_text(&self.export_file_name, &text.to_plain_text(), self.export_policy)
        {
            Ok(path) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.notify(Notice::success(format!("Text saved to {file_name}")));
                Some(path)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    // -- Rename / delete -------------------------------------------------------

    /// Open the rename dialog, pre-filled with the document's current name.
    pub fn request_rename(&mut self, document: &ScannedDocument) -> Result<()> {
        self.ensure_idle()?;
        self.state = LibraryState::ConfirmingRename {
            document: document.clone(),
            proposed_name: document.display_name().to_string(),
        };
        Ok(())
    }

    /// Update the name typed into the rename dialog.
    pub fn edit_proposed_name(&mut self, name: impl Into<String>) -> Result<()> {
        match &mut self.state {
            LibraryState::ConfirmingRename { proposed_name, .. } => {
                *proposed_name = name.into();
                Ok(())
            }
            _ => Err(ScanshelfError::NoPendingAction),
        }
    }

    /// Open the delete confirmation.
    pub fn request_delete(&mut self, document: &ScannedDocument) -> Result<()> {
        self.ensure_idle()?;
        self.state = LibraryState::ConfirmingDelete {
            document: document.clone(),
        };
        Ok(())
    }

    /// Carry out the pending rename or delete.
    ///
    /// Success or failure, the controller is back to idle with a fresh list
    /// and a notice afterwards.
    pub fn confirm(&mut self) -> Result<Confirmed> {
        match std::mem::replace(&mut self.state, LibraryState::Idle) {
            LibraryState::ConfirmingRename {
                document,
                proposed_name,
            } => {
                let renamed = self.store.rename(&document, &proposed_name);
                self.refresh();
                match renamed {
                    Ok(renamed) => {
                        self.notify(Notice::success("Renamed successfully"));
                        Ok(Confirmed::Renamed(renamed))
                    }
                    Err(err) => {
                        self.report(&err);
                        Err(err)
                    }
                }
            }
            LibraryState::ConfirmingDelete { document } => {
                let deleted = self.store.delete(&document);
                self.refresh();
                match deleted {
                    Ok(()) => {
                        if self
                            .extraction
                            .as_ref()
                            .is_some_and(|view| view.document.file_name == document.file_name)
                        {
                            self.extraction = None;
                        }
                        self.notify(Notice::success("File deleted"));
                        Ok(Confirmed::Deleted(document.file_name))
                    }
                    Err(err) => {
                        self.report(&err);
                        Err(err)
                    }
                }
            }
            other => {
                self.state = other;
                Err(ScanshelfError::NoPendingAction)
            }
        }
    }

    /// Back out of whatever is in progress.
    ///
    /// Dialogs close without side effects; a capture or extraction in flight
    /// is told to stop and its eventual result will be ignored. Returns
    /// `false` when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            info!(id = %active.id, state = self.state.label(), "operation cancelled");
        }
        let was_busy = !self.state.is_idle();
        self.state = LibraryState::Idle;
        was_busy
    }

    // -- Open / share / preview ------------------------------------------------

    /// Hand `document` to the platform viewer.
    pub fn open(&self, document: &ScannedDocument) -> Result<()> {
        self.ensure_idle()?;
        self.platform
            .open_file(&document.path, PDF_MIME_TYPE)
            .inspect_err(|err| self.report(err))
    }

    /// Offer `document` through the platform share sheet.
    pub fn share(&self, document: &ScannedDocument) -> Result<()> {
        self.ensure_idle()?;
        self.platform
            .share_file(&document.path, PDF_MIME_TYPE)
            .inspect_err(|err| self.report(err))
    }

    /// A thumbnail of the first page, if it can be rendered.
    pub fn preview(&self, document: &ScannedDocument) -> Option<DynamicImage> {
        let bytes = self.store.read(document).ok()?;
        render_preview(
            self.extractor.renderer().as_ref(),
            &bytes,
            self.preview_max_dimension,
        )
    }

    /// The preview as a `data:` URI holding a PNG, ready for an `<img>` tag.
    pub fn preview_data_uri(&self, document: &ScannedDocument) -> Option<String> {
        let preview = self.preview(document)?;
        let mut png = Vec::new();
        if let Err(err) = preview.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
            warn!(file = %document.file_name, %err, "could not encode preview");
            return None;
        }
        Some(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png)))
    }

    // -- Helpers ---------------------------------------------------------------

    fn ensure_idle(&self) -> Result<()> {
        if self.state.is_idle() {
            Ok(())
        } else {
            debug!(state = self.state.label(), "request rejected while busy");
            let err = ScanshelfError::Busy {
                state: self.state.label(),
            };
            self.report(&err);
            Err(err)
        }
    }

    fn start_operation(&mut self) -> (OperationId, CancelFlag) {
        let id = OperationId::new();
        let cancel = CancelFlag::new();
        self.active = Some(ActiveOperation {
            id,
            cancel: cancel.clone(),
        });
        (id, cancel)
    }

    /// Clear the active operation if it is `id`, returning to idle.
    fn finish_operation(&mut self, id: OperationId) -> bool {
        match &self.active {
            Some(active) if active.id == id => {
                self.active = None;
                self.state = LibraryState::Idle;
                true
            }
            _ => false,
        }
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notify(&notice);
    }

    fn report(&self, err: &ScanshelfError) {
        self.notifier.notify(&notice_for(err));
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, dictionary};
    use scanshelf_bridge::{CaptureCompleter, NativeDocumentScanner, NativeShare, NativeViewer};
    use scanshelf_core::types::NoticeKind;
    use scanshelf_document::{EmbeddedImageRenderer, TextRecognizer};

    use super::*;
    use crate::services::notices::NoticeBoard;

    // -- Fakes ---------------------------------------------------------------

    /// How the fake scanner answers the next capture.
    enum Script {
        Immediately(CaptureResult),
        /// Hand the completer to the test so it can answer later.
        Deferred,
        RefuseToStart,
    }

    #[derive(Default)]
    struct FakePlatform {
        scripts: Mutex<Vec<Script>>,
        deferred: Mutex<Option<CaptureCompleter>>,
        opened: Mutex<Vec<PathBuf>>,
        shared: Mutex<Vec<PathBuf>>,
        fail_share: bool,
    }

    impl FakePlatform {
        fn scripted(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into_iter().rev().collect()),
                ..Self::default()
            })
        }

        fn take_completer(&self) -> CaptureCompleter {
            self.deferred.lock().expect("lock").take().expect("deferred capture")
        }
    }

    impl PlatformBridge for FakePlatform {
        fn platform_name(&self) -> &str {
            "Fake"
        }
    }

    impl NativeDocumentScanner for FakePlatform {
        fn start_capture(&self, options: &ScannerOptions) -> Result<PendingCapture> {
            assert_eq!(options.page_limit, 5);
            match self.scripts.lock().expect("lock").pop() {
                Some(Script::Immediately(result)) => Ok(PendingCapture::ready(result)),
                Some(Script::Deferred) => {
                    let (completer, pending) = PendingCapture::channel();
                    *self.deferred.lock().expect("lock") = Some(completer);
                    Ok(pending)
                }
                Some(Script::RefuseToStart) | None => Err(ScanshelfError::PlatformUnavailable),
            }
        }
    }

    impl NativeShare for FakePlatform {
        fn share_file(&self, path: &Path, mime_type: &str) -> Result<()> {
            assert_eq!(mime_type, PDF_MIME_TYPE);
            if self.fail_share {
                return Err(ScanshelfError::Bridge("share sheet crashed".into()));
            }
            self.shared.lock().expect("lock").push(path.to_path_buf());
            Ok(())
        }
    }

    impl NativeViewer for FakePlatform {
        fn open_file(&self, path: &Path, _mime_type: &str) -> Result<()> {
            self.opened.lock().expect("lock").push(path.to_path_buf());
            Ok(())
        }
    }

    /// Recognizes a page as its gray shade; shade 0 is unreadable.
    struct ShadeRecognizer;

    impl TextRecognizer for ShadeRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<String> {
            match image.to_luma8().get_pixel(0, 0).0[0] {
                0 => Err(ScanshelfError::OcrError("blank page".into())),
                shade => Ok(format!("shade {shade}\n")),
            }
        }
    }

    /// A PDF whose pages are solid gray images of the given shades.
    fn scanned_pdf(shades: &[u8]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for &shade in shades {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 4,
                    "Height" => 4,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![shade; 16],
            ));
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![4.into(), 0.into(), 0.into(), 4.into(), 0.into(), 0.into()],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save PDF");
        bytes
    }

    struct Harness {
        _dir: tempfile::TempDir,
        notices: NoticeBoard,
        platform: Arc<FakePlatform>,
        controller: LibraryController,
    }

    fn harness(platform: Arc<FakePlatform>) -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let notices = NoticeBoard::new();
        let environment = Environment::new(dir.path(), Arc::new(notices.clone()));
        let extractor = TextExtractor::new(Arc::new(EmbeddedImageRenderer), Arc::new(ShadeRecognizer));
        let controller = LibraryController::new(
            environment,
            platform.clone(),
            extractor,
            &AppConfig::default(),
        )
        .expect("controller");
        Harness {
            _dir: dir,
            notices,
            platform,
            controller,
        }
    }

    fn age(document: &ScannedDocument, seconds_after_epoch: u64) {
        std::fs::File::options()
            .write(true)
            .open(&document.path)
            .expect("open")
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds_after_epoch))
            .expect("set mtime");
    }

    fn success(bytes: Vec<u8>) -> Script {
        Script::Immediately(CaptureResult::Success(bytes))
    }

    // -- Capture ---------------------------------------------------------------

    #[tokio::test]
    async fn successful_scan_persists_and_announces() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[9]))]));

        let document = h.controller.scan().await.expect("scan").expect("document");

        assert!(h.controller.state().is_idle());
        assert_eq!(h.controller.documents(), std::slice::from_ref(&document));
        let notice = h.notices.take_latest().expect("notice");
        assert_eq!(notice.message, "Scan completed");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert!(notice.announce);
    }

    #[tokio::test]
    async fn cancelled_scan_changes_nothing() {
        let mut h = harness(FakePlatform::scripted(vec![Script::Immediately(
            CaptureResult::Cancelled,
        )]));

        assert_eq!(h.controller.scan().await.expect("scan"), None);

        assert!(h.controller.state().is_idle());
        assert!(h.controller.documents().is_empty());
        assert!(h.notices.is_empty());
    }

    #[tokio::test]
    async fn failed_scan_notifies_and_returns_to_idle() {
        let mut h = harness(FakePlatform::scripted(vec![Script::Immediately(
            CaptureResult::Failed("camera busy".into()),
        )]));

        let err = h.controller.scan().await.expect_err("failed");

        assert!(matches!(err, ScanshelfError::CaptureFailed(_)));
        assert!(h.controller.state().is_idle());
        assert!(h.controller.documents().is_empty());
        assert_eq!(h.notices.take_latest().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[tokio::test]
    async fn empty_capture_is_a_failure() {
        let mut h = harness(FakePlatform::scripted(vec![success(Vec::new())]));
        assert!(matches!(
            h.controller.scan().await,
            Err(ScanshelfError::CaptureFailed(_))
        ));
        assert!(h.controller.documents().is_empty());
    }

    #[test]
    fn scanner_that_cannot_start_stays_idle() {
        let mut h = harness(FakePlatform::scripted(vec![Script::RefuseToStart]));

        let err = h.controller.begin_scan().expect_err("no scanner");

        assert!(matches!(err, ScanshelfError::PlatformUnavailable));
        assert!(h.controller.state().is_idle());
        assert_eq!(h.notices.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_capture_ignores_late_result() {
        let mut h = harness(FakePlatform::scripted(vec![Script::Deferred]));
        let pending = h.controller.begin_scan().expect("begin");
        assert_eq!(h.controller.state(), &LibraryState::Capturing);

        assert!(h.controller.cancel());
        assert!(h.controller.state().is_idle());
        // The platform flow finishes anyway.
        h.platform
            .take_completer()
            .complete(CaptureResult::Success(scanned_pdf(&[5])));

        let completed = pending.wait().await;
        assert_eq!(h.controller.complete_scan(completed).expect("stale"), None);
        assert!(h.controller.documents().is_empty());
        assert!(h.controller.store().list().is_empty());
    }

    #[tokio::test]
    async fn stale_completion_does_not_disturb_new_operation() {
        let mut h = harness(FakePlatform::scripted(vec![
            Script::Deferred,
            success(scanned_pdf(&[7])),
        ]));
        let first = h.controller.begin_scan().expect("first");
        h.controller.cancel();
        let second = h.controller.begin_scan().expect("second");

        // The first flow reports late, while the second is in progress.
        h.platform
            .take_completer()
            .complete(CaptureResult::Success(scanned_pdf(&[1])));
        let late = first.wait().await;
        assert_eq!(h.controller.complete_scan(late).expect("stale"), None);
        assert_eq!(h.controller.state(), &LibraryState::Capturing);

        let document = h
            .controller
            .complete_scan(second.wait().await)
            .expect("second completes")
            .expect("document");
        assert_eq!(h.controller.documents(), std::slice::from_ref(&document));
    }

    // -- Busy rejection --------------------------------------------------------

    #[tokio::test]
    async fn requests_while_busy_are_rejected() {
        let mut h = harness(FakePlatform::scripted(vec![
            success(scanned_pdf(&[3])),
            Script::Deferred,
        ]));
        let document = h.controller.scan().await.expect("scan").expect("doc");
        let _pending = h.controller.begin_scan().expect("capturing");

        assert!(matches!(
            h.controller.request_rename(&document),
            Err(ScanshelfError::Busy { state: "capturing" })
        ));
        assert!(matches!(
            h.controller.request_delete(&document),
            Err(ScanshelfError::Busy { .. })
        ));
        assert!(matches!(
            h.controller.begin_extract(&document),
            Err(ScanshelfError::Busy { .. })
        ));
        assert!(matches!(h.controller.begin_scan(), Err(ScanshelfError::Busy { .. })));
        assert!(matches!(h.controller.share(&document), Err(ScanshelfError::Busy { .. })));
        assert_eq!(h.controller.state(), &LibraryState::Capturing);
    }

    #[tokio::test]
    async fn busy_rejection_is_reported() {
        let mut h = harness(FakePlatform::scripted(vec![
            success(scanned_pdf(&[3])),
            Script::Deferred,
        ]));
        let document = h.controller.scan().await.expect("scan").expect("doc");
        let _pending = h.controller.begin_scan().expect("capturing");
        h.notices.drain();

        assert!(h.controller.request_delete(&document).is_err());

        let notice = h.notices.take_latest().expect("busy notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Please wait.");
    }

    // -- Extraction ------------------------------------------------------------

    #[tokio::test]
    async fn extraction_presents_text_in_page_order() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[10, 20, 30]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");

        let view = h
            .controller
            .extract(&document)
            .await
            .expect("extract")
            .expect("view");

        assert!(h.controller.state().is_idle());
        let text = view.text().expect("text");
        assert_eq!(text.page_count(), 3);
        assert_eq!(text.to_plain_text(), "shade 10\n\nshade 20\n\nshade 30");
        assert_eq!(h.controller.extraction(), Some(&view));

        h.controller.dismiss_extraction();
        assert!(h.controller.extraction().is_none());
    }

    #[tokio::test]
    async fn failed_page_presents_message_without_text() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[10, 0, 30]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");
        h.notices.drain();

        let view = h
            .controller
            .extract(&document)
            .await
            .expect("extract")
            .expect("view");

        let message = view.outcome.expect_err("page 1 fails");
        assert!(message.contains("Page 2"));
        assert_eq!(h.notices.take_latest().map(|n| n.kind), Some(NoticeKind::Error));
        assert!(h.controller.state().is_idle());
    }

    #[tokio::test]
    async fn cancelled_extraction_presents_nothing() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[10]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");

        let pending = h.controller.begin_extract(&document).expect("begin");
        assert!(matches!(h.controller.state(), LibraryState::Extracting { .. }));
        assert!(h.controller.cancel());

        let completed = pending.run().await;
        assert!(h.controller.complete_extract(completed).is_none());
        assert!(h.controller.extraction().is_none());
        assert!(h.controller.state().is_idle());
    }

    #[tokio::test]
    async fn export_writes_presented_text() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[42]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");
        h.controller.extract(&document).await.expect("extract");

        let path = h.controller.export_extraction().expect("exported");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("extracted_text.txt"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "shade 42");
        assert_eq!(
            h.notices.take_latest().map(|n| n.message),
            Some("Text saved to extracted_text.txt".into())
        );
        // The export never shows up as a document.
        assert_eq!(h.controller.refresh().len(), 1);
    }

    #[test]
    fn export_without_extraction_is_reported() {
        let h = harness(FakePlatform::scripted(vec![]));
        assert!(h.controller.export_extraction().is_none());
        assert_eq!(h.notices.len(), 1);
    }

    // -- Rename / delete -------------------------------------------------------

    #[tokio::test]
    async fn rename_flow_uses_edited_name() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[1]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");

        h.controller.request_rename(&document).expect("request");
        assert_eq!(
            h.controller.state(),
            &LibraryState::ConfirmingRename {
                document: document.clone(),
                proposed_name: document.display_name().to_string(),
            }
        );
        h.controller.edit_proposed_name("Receipt").expect("edit");

        let confirmed = h.controller.confirm().expect("confirm");

        let Confirmed::Renamed(renamed) = confirmed else {
            panic!("expected rename");
        };
        assert_eq!(renamed.file_name, "Receipt.pdf");
        assert_eq!(h.controller.documents(), std::slice::from_ref(&renamed));
        assert_eq!(
            h.notices.take_latest().map(|n| n.message),
            Some("Renamed successfully".into())
        );
    }

    #[test]
    fn cancel_discards_dialog_without_side_effects() {
        let mut h = harness(FakePlatform::scripted(vec![]));
        let document = h.controller.store().persist(b"%PDF").expect("persist");
        h.controller.refresh();

        h.controller.request_delete(&document).expect("request");
        assert!(h.controller.cancel());

        assert!(h.controller.state().is_idle());
        assert_eq!(h.controller.documents().len(), 1);
        assert!(h.notices.is_empty());
        assert!(!h.controller.cancel());
    }

    #[test]
    fn confirm_without_dialog_is_rejected() {
        let mut h = harness(FakePlatform::scripted(vec![]));
        assert!(matches!(h.controller.confirm(), Err(ScanshelfError::NoPendingAction)));
        assert!(matches!(
            h.controller.edit_proposed_name("x"),
            Err(ScanshelfError::NoPendingAction)
        ));
    }

    #[test]
    fn deleting_a_vanished_document_reports_and_refreshes() {
        let mut h = harness(FakePlatform::scripted(vec![]));
        let document = h.controller.store().persist(b"%PDF").expect("persist");
        h.controller.refresh();
        std::fs::remove_file(&document.path).expect("remove behind controller's back");

        h.controller.request_delete(&document).expect("request");
        let err = h.controller.confirm().expect_err("gone");

        assert!(matches!(err, ScanshelfError::NotFound(_)));
        assert!(h.controller.state().is_idle());
        assert!(h.controller.documents().is_empty());
        assert_eq!(h.notices.take_latest().map(|n| n.kind), Some(NoticeKind::Error));
    }

    // -- Open / share / preview ------------------------------------------------

    #[test]
    fn open_and_share_hand_over_the_path() {
        let mut h = harness(FakePlatform::scripted(vec![]));
        let document = h.controller.store().persist(b"%PDF").expect("persist");
        h.controller.refresh();

        h.controller.open(&document).expect("open");
        h.controller.share(&document).expect("share");

        assert_eq!(*h.platform.opened.lock().expect("lock"), vec![document.path.clone()]);
        assert_eq!(*h.platform.shared.lock().expect("lock"), vec![document.path.clone()]);
    }

    #[test]
    fn share_failure_becomes_a_notice() {
        let platform = Arc::new(FakePlatform {
            fail_share: true,
            ..FakePlatform::default()
        });
        let h = harness(platform);
        let document = h.controller.store().persist(b"%PDF").expect("persist");

        assert!(h.controller.share(&document).is_err());
        assert_eq!(h.notices.take_latest().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[tokio::test]
    async fn preview_renders_first_page() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[50, 60]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");

        let preview = h.controller.preview(&document).expect("preview");
        assert_eq!(preview.to_luma8().get_pixel(0, 0).0[0], 50);

        let junk = h.controller.store().persist(b"not a pdf").expect("persist");
        assert!(h.controller.preview(&junk).is_none());
    }

    #[tokio::test]
    async fn preview_data_uri_holds_a_png_thumbnail() {
        let mut h = harness(FakePlatform::scripted(vec![success(scanned_pdf(&[70]))]));
        let document = h.controller.scan().await.expect("scan").expect("doc");

        let uri = h.controller.preview_data_uri(&document).expect("data uri");

        let encoded = uri.strip_prefix("data:image/png;base64,").expect("png data uri");
        let png = general_purpose::STANDARD.decode(encoded).expect("base64");
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).expect("png");
        assert_eq!(decoded.to_luma8().get_pixel(0, 0).0[0], 70);

        let junk = h.controller.store().persist(b"not a pdf").expect("persist");
        assert!(h.controller.preview_data_uri(&junk).is_none());
    }

    // -- Scenario --------------------------------------------------------------

    #[tokio::test]
    async fn library_lifecycle() {
        let mut h = harness(FakePlatform::scripted(vec![
            success(scanned_pdf(&[1])),
            success(scanned_pdf(&[2])),
        ]));

        let b1 = h.controller.scan().await.expect("scan B1").expect("B1");
        age(&b1, 10_000);
        assert_eq!(h.controller.refresh().len(), 1);

        let b2 = h.controller.scan().await.expect("scan B2").expect("B2");
        age(&b2, 20_000);
        let names: Vec<String> = h
            .controller
            .refresh()
            .iter()
            .map(|doc| doc.file_name.clone())
            .collect();
        assert_eq!(names, vec![b2.file_name.clone(), b1.file_name.clone()]);

        // Renaming B2 onto B1's name conflicts and changes nothing.
        h.controller.request_rename(&b2).expect("request rename");
        h.controller
            .edit_proposed_name(b1.display_name())
            .expect("edit");
        assert!(matches!(
            h.controller.confirm(),
            Err(ScanshelfError::NameConflict(_))
        ));
        assert!(h.controller.state().is_idle());
        let unchanged: Vec<String> = h
            .controller
            .documents()
            .iter()
            .map(|doc| doc.file_name.clone())
            .collect();
        assert_eq!(unchanged, names);

        h.controller.request_delete(&b1).expect("request delete");
        assert_eq!(
            h.controller.confirm().expect("delete"),
            Confirmed::Deleted(b1.file_name.clone())
        );
        let remaining: Vec<&str> = h
            .controller
            .documents()
            .iter()
            .map(|doc| doc.file_name.as_str())
            .collect();
        assert_eq!(remaining, vec![b2.file_name.as_str()]);
        assert_eq!(
            h.notices.take_latest().map(|n| n.message),
            Some("File deleted".into())
        );
    }
}

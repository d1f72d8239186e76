// src/state/mod.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::analysis::worker::SubmissionResult;
use crate::analysis::{AnalysisWorker, Analyzer};
use crate::config::Settings;
use crate::file::KeyValueStorage;
use crate::input::camera::{self, Camera, CameraStream};
use crate::input::ImageFile;

pub mod history;

pub use history::HistoryStore;

/// Called from the worker thread when a result is ready (wakes the UI).
pub type Notify = Box<dyn FnOnce() + Send>;

// Screen/tab tracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Upload,
    Camera,
}

/// Result of asking for the live camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOutcome {
    Opened,
    /// No stream; the caller should offer the native capture dialog.
    Fallback,
}

// Core application state
pub struct AppState {
    pub settings: Settings,
    pub history: HistoryStore,
    pub worker: AnalysisWorker,
    camera: Box<dyn Camera>,
    camera_stream: Option<Box<dyn CameraStream>>,

    // Minimal UI state
    pub current_screen: Screen,
    pub error_message: Option<String>,
    pub last_image_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        storage: Box<dyn KeyValueStorage>,
        analyzer: Arc<dyn Analyzer>,
        camera: Box<dyn Camera>,
    ) -> Self {
        Self {
            settings,
            history: HistoryStore::hydrate(storage),
            worker: AnalysisWorker::new(analyzer),
            camera,
            camera_stream: None,
            current_screen: Screen::Upload,
            error_message: None,
            last_image_dir: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.worker.is_busy()
    }

    /// Common path for every capture source. Non-images are dropped silently.
    pub fn submit_image(&mut self, image: ImageFile, notify: Notify) -> bool {
        if !image.is_image() {
            debug!(name = %image.name, mime = %image.mime, "Ignoring non-image input");
            return false;
        }
        if !self.worker.start(image, notify) {
            return false;
        }
        self.error_message = None;
        true
    }

    pub fn submit_path(&mut self, path: &Path, notify: Notify) -> bool {
        self.last_image_dir = path.parent().map(Path::to_path_buf);
        match ImageFile::from_path(path) {
            Ok(image) => self.submit_image(image, notify),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                self.error_message = Some(format!("Could not read {}: {}", path.display(), e));
                false
            }
        }
    }

    /// Applies a finished submission, if any. Returns whether state changed.
    pub fn poll_submission(&mut self) -> bool {
        match self.worker.poll() {
            Some(result) => {
                self.apply_result(result);
                true
            }
            None => false,
        }
    }

    fn apply_result(&mut self, result: SubmissionResult) {
        match result {
            Ok(entry) => {
                if let Err(e) = self.history.push(entry) {
                    error!("Failed to persist history: {}", e);
                    self.error_message = Some(format!("Analysis saved in this session only: {}", e));
                }
            }
            Err(e) => {
                self.error_message = Some(e.to_string());
            }
        }
    }

    pub fn open_camera(&mut self) -> CameraOutcome {
        if self.camera_stream.is_some() {
            return CameraOutcome::Opened;
        }
        match self.camera.open() {
            Ok(stream) => {
                self.camera_stream = Some(stream);
                self.current_screen = Screen::Camera;
                CameraOutcome::Opened
            }
            Err(e) => {
                warn!("Camera unavailable, using capture dialog: {}", e);
                CameraOutcome::Fallback
            }
        }
    }

    pub fn camera_stream(&self) -> Option<&dyn CameraStream> {
        self.camera_stream.as_deref()
    }

    /// Leaves the camera view and releases the device.
    pub fn close_camera(&mut self) {
        if self.camera_stream.take().is_some() {
            info!("Camera view closed");
        }
        self.current_screen = Screen::Upload;
    }

    pub fn capture_and_submit(&mut self, notify: Notify) -> bool {
        let Some(stream) = self.camera_stream.take() else {
            return false;
        };
        self.current_screen = Screen::Upload;

        match camera::capture_still(stream, self.settings.camera.jpeg_quality) {
            Ok(image) => self.submit_image(image, notify),
            Err(e) => {
                warn!("Camera capture failed: {}", e);
                self.error_message = Some(format!("Camera capture failed: {}", e));
                false
            }
        }
    }

    /// Swaps in collaborators built from new settings. A new storage
    /// re-hydrates the history from that location.
    pub fn apply_settings(
        &mut self,
        settings: Settings,
        analyzer: Arc<dyn Analyzer>,
        camera: Box<dyn Camera>,
        storage: Option<Box<dyn KeyValueStorage>>,
    ) {
        self.close_camera();
        self.worker.set_analyzer(analyzer);
        self.camera = camera;
        if let Some(storage) = storage {
            self.history = HistoryStore::hydrate(storage);
        }
        self.settings = settings;
        info!(endpoint = %self.settings.endpoint.url(), "Settings applied");
    }

    #[cfg(test)]
    fn wait_for_submission(&mut self) {
        if let Some(result) = self.worker.wait() {
            self.apply_result(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::submit::tests::FixedAnalyzer;
    use crate::analysis::client::AnalyzeError;
    use crate::file::{FileStorage, MemoryStorage, StorageError};
    use crate::input::camera::tests::{red_frame, StillStream};
    use crate::input::camera::{CameraError, Frame};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    struct FakeCamera {
        frame: Option<Frame>,
        released: Arc<AtomicBool>,
    }

    impl Camera for FakeCamera {
        fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
            match &self.frame {
                Some(frame) => Ok(Box::new(StillStream {
                    frame: Some(frame.clone()),
                    released: Arc::clone(&self.released),
                })),
                None => Err(CameraError::Unsupported),
            }
        }
    }

    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: PathBuf::from("/read-only/analyses.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn no_camera() -> Box<dyn Camera> {
        Box::new(FakeCamera { frame: None, released: Arc::new(AtomicBool::new(false)) })
    }

    fn state_with(analyzer: Arc<dyn Analyzer>, storage: Box<dyn KeyValueStorage>) -> AppState {
        AppState::new(Settings::default(), storage, analyzer, no_camera())
    }

    fn gif(name: &str) -> ImageFile {
        ImageFile::new(name, b"GIF89a\x01\x00\x01\x00".to_vec())
    }

    fn noop() -> Notify {
        Box::new(|| {})
    }

    #[test]
    fn success_appends_one_persisted_entry() {
        let dir = TempDir::new().unwrap();
        let analyzer = Arc::new(FixedAnalyzer::ok("Citroen"));
        let mut state = state_with(analyzer.clone(), Box::new(FileStorage::new(dir.path())));

        let image = gif("ds.gif");
        let expected = crate::utils::to_data_url("image/gif", &image.bytes);
        assert!(state.submit_image(image, noop()));
        assert!(state.is_busy());
        state.wait_for_submission();

        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.entries()[0].image_data, expected);
        assert!(state.error_message.is_none());
        assert!(!state.is_busy());

        let reloaded = HistoryStore::hydrate(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reloaded.entries(), state.history.entries());
    }

    #[test]
    fn not_car_sets_message_and_keeps_history() {
        let mut state = state_with(
            Arc::new(FixedAnalyzer::ok("Seat")),
            Box::new(MemoryStorage::default()),
        );
        state.submit_image(gif("first.gif"), noop());
        state.wait_for_submission();
        let before = state.history.entries().to_vec();

        state.worker.set_analyzer(Arc::new(FixedAnalyzer::err(AnalyzeError::NotCar)));
        state.submit_image(gif("cat.gif"), noop());
        state.wait_for_submission();

        assert_eq!(
            state.error_message.as_deref(),
            Some("The uploaded image does not appear to be a car")
        );
        assert_eq!(state.history.entries(), before.as_slice());
    }

    #[test]
    fn new_submission_clears_previous_error() {
        let mut state = state_with(
            Arc::new(FixedAnalyzer::err(AnalyzeError::InvalidFormat)),
            Box::new(MemoryStorage::default()),
        );
        state.submit_image(gif("a.gif"), noop());
        state.wait_for_submission();
        assert!(state.error_message.is_some());

        state.worker.set_analyzer(Arc::new(FixedAnalyzer::ok("Skoda")));
        state.submit_image(gif("b.gif"), noop());
        assert!(state.error_message.is_none());
        state.wait_for_submission();
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn non_image_leaves_state_untouched() {
        let analyzer = Arc::new(FixedAnalyzer::ok("Opel"));
        let mut state = state_with(analyzer.clone(), Box::new(MemoryStorage::default()));

        let submitted = state.submit_image(ImageFile::new("notes.txt", b"hello world".to_vec()), noop());

        assert!(!submitted);
        assert!(!state.is_busy());
        assert!(state.error_message.is_none());
        assert!(state.history.is_empty());
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unreadable_path_reports_error() {
        let mut state = state_with(
            Arc::new(FixedAnalyzer::ok("Kia")),
            Box::new(MemoryStorage::default()),
        );
        assert!(!state.submit_path(Path::new("/no/such/car.png"), noop()));
        assert!(state.error_message.as_deref().unwrap().starts_with("Could not read"));
        assert_eq!(state.last_image_dir, Some(PathBuf::from("/no/such")));
    }

    #[test]
    fn persist_failure_keeps_entry_in_memory() {
        let mut state = state_with(Arc::new(FixedAnalyzer::ok("Lada")), Box::new(ReadOnlyStorage));
        state.submit_image(gif("niva.gif"), noop());
        state.wait_for_submission();

        assert_eq!(state.history.len(), 1);
        assert!(state
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("Analysis saved in this session only"));
    }

    #[test]
    fn unavailable_camera_falls_back() {
        let mut state = state_with(
            Arc::new(FixedAnalyzer::ok("BMW")),
            Box::new(MemoryStorage::default()),
        );
        assert_eq!(state.open_camera(), CameraOutcome::Fallback);
        assert_eq!(state.current_screen, Screen::Upload);
        assert!(state.camera_stream().is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn captured_frame_is_submitted_as_jpeg() {
        let released = Arc::new(AtomicBool::new(false));
        let camera = FakeCamera { frame: Some(red_frame()), released: Arc::clone(&released) };
        let mut state = AppState::new(
            Settings::default(),
            Box::new(MemoryStorage::default()),
            Arc::new(FixedAnalyzer::ok("Alfa Romeo")),
            Box::new(camera),
        );

        assert_eq!(state.open_camera(), CameraOutcome::Opened);
        assert_eq!(state.current_screen, Screen::Camera);
        assert!(state.camera_stream().unwrap().latest_frame().is_some());

        assert!(state.capture_and_submit(noop()));
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(state.current_screen, Screen::Upload);

        state.wait_for_submission();
        assert_eq!(state.history.len(), 1);
        assert!(state.history.entries()[0].image_data.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn closing_camera_view_releases_stream() {
        let released = Arc::new(AtomicBool::new(false));
        let camera = FakeCamera { frame: Some(red_frame()), released: Arc::clone(&released) };
        let mut state = AppState::new(
            Settings::default(),
            Box::new(MemoryStorage::default()),
            Arc::new(FixedAnalyzer::ok("Audi")),
            Box::new(camera),
        );

        state.open_camera();
        assert!(!released.load(Ordering::SeqCst));
        state.close_camera();

        assert!(released.load(Ordering::SeqCst));
        assert_eq!(state.current_screen, Screen::Upload);
        assert!(!state.capture_and_submit(noop()));
    }

    #[test]
    fn dropping_state_releases_open_camera() {
        let released = Arc::new(AtomicBool::new(false));
        let camera = FakeCamera { frame: Some(red_frame()), released: Arc::clone(&released) };
        let mut state = AppState::new(
            Settings::default(),
            Box::new(MemoryStorage::default()),
            Arc::new(FixedAnalyzer::ok("Mazda")),
            Box::new(camera),
        );

        state.open_camera();
        drop(state);
        assert!(released.load(Ordering::SeqCst));
    }
}

//! Workflow controller — sequences upload → sheet discovery → selection →
//! split → download → reset, and owns all workflow state.
//!
//! At most one network operation is in flight at a time; the phase itself is
//! the busy guard. While busy, every user-initiated mutating trigger is
//! rejected with `AppError::Busy`. The two timed transitions (clearing the
//! progress bar after an upload, the full reset after a successful split)
//! are explicit spawned tasks whose handles the controller owns, so a new
//! upload deterministically supersedes a pending reset instead of racing it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::{SplitParams, SplitRequest, SplitterApi, UploadParams, UploadResponse};
use crate::error::AppError;
use crate::models::file::FileEntry;
use crate::models::session::Session;
use crate::models::sheet::{SheetEntry, SheetSelection};
use crate::models::workflow::WorkflowPhase;
use crate::services::validator;
use crate::signals::{milestone, ProgressCell, SignalSink, StatusMessage, WorkflowSignal};
use crate::storage::downloads::DownloadSink;

/// Delay before the full reset after a successful split.
pub const RESET_DELAY_MS: u64 = 2_000;
/// Delay before the progress bar is cleared after a successful upload.
pub const PROGRESS_CLEAR_DELAY_MS: u64 = 500;

const UPLOAD_FAILED_MSG: &str = "file upload failed";
const SPLIT_FAILED_MSG: &str = "sheet split failed";
const SAVE_FAILED_MSG: &str = "could not save the downloaded file";

/// Orchestrates the full upload/split lifecycle against a `SplitterApi`
/// backend, saving results through a `DownloadSink` and reporting every
/// observable change through a `SignalSink`.
pub struct WorkflowController<A: SplitterApi> {
    api: A,
    downloads: Arc<dyn DownloadSink>,
    signals: Arc<dyn SignalSink>,
    progress: ProgressCell,
    reset_delay: Duration,
    progress_clear_delay: Duration,
    inner: Arc<Mutex<WorkflowInner>>,
}

#[derive(Default)]
struct WorkflowInner {
    phase: WorkflowPhase,
    session: Option<Session>,
    selection: SheetSelection,
    message: Option<StatusMessage>,
    pending_reset: Option<JoinHandle<()>>,
    pending_progress_clear: Option<JoinHandle<()>>,
}

fn set_phase(inner: &mut WorkflowInner, signals: &dyn SignalSink, phase: WorkflowPhase) {
    if inner.phase != phase {
        inner.phase = phase;
        signals.emit(WorkflowSignal::Phase(phase));
    }
}

fn set_message(inner: &mut WorkflowInner, signals: &dyn SignalSink, message: Option<StatusMessage>) {
    inner.message = message.clone();
    signals.emit(WorkflowSignal::Message(message));
}

fn abort_timers(inner: &mut WorkflowInner) {
    if let Some(handle) = inner.pending_reset.take() {
        handle.abort();
    }
    if let Some(handle) = inner.pending_progress_clear.take() {
        handle.abort();
    }
}

/// Full reset to `Idle`: no session, no sheets, no message, progress 0.
fn reset_state(inner: &mut WorkflowInner, signals: &dyn SignalSink, progress: &ProgressCell) {
    abort_timers(inner);
    inner.session = None;
    inner.selection.clear();
    set_message(inner, signals, None);
    set_phase(inner, signals, WorkflowPhase::Idle);
    progress.set(0);
}

impl<A: SplitterApi> WorkflowController<A> {
    pub fn new(api: A, downloads: Arc<dyn DownloadSink>, signals: Arc<dyn SignalSink>) -> Self {
        Self {
            progress: ProgressCell::new(signals.clone()),
            api,
            downloads,
            signals,
            reset_delay: Duration::from_millis(RESET_DELAY_MS),
            progress_clear_delay: Duration::from_millis(PROGRESS_CLEAR_DELAY_MS),
            inner: Arc::new(Mutex::new(WorkflowInner::default())),
        }
    }

    /// Override the timed-transition delays. Used by tests; production code
    /// keeps the defaults.
    pub fn with_delays(mut self, reset_delay: Duration, progress_clear_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self.progress_clear_delay = progress_clear_delay;
        self
    }

    /// Validate and upload a candidate file, discovering its sheets.
    ///
    /// On success the workflow is `Ready` with every discovered sheet
    /// selected. On failure it is back in `Idle` with nothing retained.
    /// A new upload supersedes any pending post-split reset.
    pub async fn upload(&self, file: FileEntry) -> crate::error::Result<()> {
        if let Err(err) = validator::validate(&file) {
            let mut inner = self.inner.lock().await;
            if !inner.phase.is_busy() {
                let text = err.to_string();
                set_message(&mut inner, &*self.signals, Some(StatusMessage::Error(text)));
            }
            return Err(err);
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.phase.is_busy() {
                return Err(AppError::Busy);
            }
            // Start the new cycle from a clean slate, cancelling any timed
            // transition left over from the previous one.
            abort_timers(&mut inner);
            inner.session = None;
            inner.selection.clear();
            set_message(&mut inner, &*self.signals, None);
            set_phase(&mut inner, &*self.signals, WorkflowPhase::Uploading);
        }
        self.progress.set(milestone::STARTED);

        match self.run_upload(&file).await {
            Ok(resp) => {
                let sheet_count = resp.sheets.len();
                let mut inner = self.inner.lock().await;
                inner.selection = SheetSelection::from_names(resp.sheets.clone());
                inner.session = Some(Session {
                    session_id: resp.session_id,
                    temp_file: resp.temp_file,
                    filename: resp.filename,
                    sheets: resp.sheets,
                });
                set_phase(&mut inner, &*self.signals, WorkflowPhase::Ready);
                self.signals
                    .emit(WorkflowSignal::SheetsDiscovered(inner.selection.entries()));
                drop(inner);
                self.progress.set(milestone::DONE);
                log::info!("upload successful: {} sheets found", sheet_count);
                self.schedule_progress_clear().await;
                Ok(())
            }
            Err(err) => {
                log::error!("upload error: {}", err);
                let text = match &err {
                    AppError::Upload(msg) => msg.clone(),
                    _ => UPLOAD_FAILED_MSG.to_string(),
                };
                let mut inner = self.inner.lock().await;
                inner.session = None;
                inner.selection.clear();
                set_phase(&mut inner, &*self.signals, WorkflowPhase::Idle);
                set_message(&mut inner, &*self.signals, Some(StatusMessage::Error(text)));
                drop(inner);
                self.progress.set(0);
                Err(err)
            }
        }
    }

    async fn run_upload(&self, file: &FileEntry) -> crate::error::Result<UploadResponse> {
        let data = read_file_data(&file.file_path).await?;
        self.api
            .upload(UploadParams {
                data,
                file_name: file.file_name.clone(),
                progress: self.progress.clone(),
            })
            .await
    }

    pub async fn select_all(&self) -> crate::error::Result<()> {
        self.mutate_selection(|selection| selection.select_all())
            .await
    }

    pub async fn deselect_all(&self) -> crate::error::Result<()> {
        self.mutate_selection(|selection| selection.deselect_all())
            .await
    }

    pub async fn toggle(&self, name: &str) -> crate::error::Result<()> {
        self.mutate_selection(|selection| selection.toggle(name))
            .await
    }

    async fn mutate_selection(
        &self,
        op: impl FnOnce(&mut SheetSelection),
    ) -> crate::error::Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.phase.is_busy() {
            return Err(AppError::Busy);
        }
        op(&mut inner.selection);
        self.signals.emit(WorkflowSignal::SelectionChanged {
            selected: inner.selection.selected_count(),
            total: inner.selection.total(),
        });
        Ok(())
    }

    /// Split the uploaded file down to the currently selected sheets and
    /// save the result.
    ///
    /// With an empty selection this fails locally without any network call.
    /// On success the result is handed to the download sink exactly once and
    /// a full reset is scheduled after the display delay. On failure the
    /// session and selection are preserved so the user can retry without
    /// re-uploading.
    pub async fn split(&self) -> crate::error::Result<()> {
        let (request, sheet_count) = {
            let mut inner = self.inner.lock().await;
            if inner.phase.is_busy() {
                return Err(AppError::Busy);
            }
            let session = match inner.session.clone() {
                Some(session) => session,
                None => {
                    return Err(AppError::Internal(
                        "split requested without an uploaded file".to_string(),
                    ))
                }
            };
            if inner.selection.selected_count() == 0 {
                let err = AppError::EmptySelection;
                let text = err.to_string();
                set_message(&mut inner, &*self.signals, Some(StatusMessage::Error(text)));
                return Err(err);
            }
            abort_timers(&mut inner);
            set_message(&mut inner, &*self.signals, None);
            set_phase(&mut inner, &*self.signals, WorkflowPhase::Splitting);
            let sheets = inner.selection.selected_in_order();
            let count = sheets.len();
            (
                SplitRequest {
                    session_id: session.session_id,
                    temp_file: session.temp_file,
                    filename: session.filename,
                    sheets,
                },
                count,
            )
        };
        self.progress.set(milestone::STARTED);

        match self.run_split(request).await {
            Ok((file_name, path)) => {
                let mut inner = self.inner.lock().await;
                set_phase(&mut inner, &*self.signals, WorkflowPhase::Ready);
                let text = format!(
                    "{} sheets split successfully, saved as {}",
                    sheet_count, file_name
                );
                set_message(
                    &mut inner,
                    &*self.signals,
                    Some(StatusMessage::Success(text)),
                );
                drop(inner);
                self.progress.set(milestone::DONE);
                self.signals.emit(WorkflowSignal::DownloadSaved {
                    file_name: file_name.clone(),
                    path,
                });
                log::info!("split successful: {}", file_name);
                self.schedule_reset().await;
                Ok(())
            }
            Err(err) => {
                log::error!("split error: {}", err);
                let text = match &err {
                    AppError::Split(msg) => msg.clone(),
                    AppError::Io(_) => SAVE_FAILED_MSG.to_string(),
                    _ => SPLIT_FAILED_MSG.to_string(),
                };
                let mut inner = self.inner.lock().await;
                set_phase(&mut inner, &*self.signals, WorkflowPhase::Ready);
                set_message(&mut inner, &*self.signals, Some(StatusMessage::Error(text)));
                drop(inner);
                self.progress.set(0);
                Err(err)
            }
        }
    }

    async fn run_split(&self, request: SplitRequest) -> crate::error::Result<(String, PathBuf)> {
        let payload = self
            .api
            .split(SplitParams {
                request,
                progress: self.progress.clone(),
            })
            .await?;

        let downloads = self.downloads.clone();
        let file_name = payload.file_name.clone();
        let data = payload.data;
        let save_name = payload.file_name;
        let path = tokio::task::spawn_blocking(move || downloads.save(&save_name, data))
            .await
            .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))??;
        Ok((file_name, path))
    }

    /// Immediately return to `Idle`, discarding the session, sheets, message
    /// and any pending timed transition. Rejected while an operation is in
    /// flight.
    pub async fn reset(&self) -> crate::error::Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.phase.is_busy() {
            return Err(AppError::Busy);
        }
        reset_state(&mut inner, &*self.signals, &self.progress);
        Ok(())
    }

    async fn schedule_progress_clear(&self) {
        let progress = self.progress.clone();
        let delay = self.progress_clear_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            progress.set(0);
        });
        let mut inner = self.inner.lock().await;
        if let Some(old) = inner.pending_progress_clear.replace(handle) {
            old.abort();
        }
    }

    async fn schedule_reset(&self) {
        let inner_arc = self.inner.clone();
        let signals = self.signals.clone();
        let progress = self.progress.clone();
        let delay = self.reset_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner_arc.lock().await;
            // Drop our own handle so reset_state does not abort the task
            // that is currently running it.
            inner.pending_reset.take();
            reset_state(&mut inner, &*signals, &progress);
        });
        let mut inner = self.inner.lock().await;
        if let Some(old) = inner.pending_reset.replace(handle) {
            old.abort();
        }
    }

    pub async fn phase(&self) -> WorkflowPhase {
        self.inner.lock().await.phase
    }

    /// Discovered sheets in backend order with their checked flags.
    pub async fn sheets(&self) -> Vec<SheetEntry> {
        self.inner.lock().await.selection.entries()
    }

    pub async fn selected_count(&self) -> usize {
        self.inner.lock().await.selection.selected_count()
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.lock().await.session.clone()
    }

    pub async fn message(&self) -> Option<StatusMessage> {
        self.inner.lock().await.message.clone()
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }
}

/// Read the whole candidate file off the async runtime.
async fn read_file_data(path: &str) -> crate::error::Result<Vec<u8>> {
    let path = path.to_string();
    tokio::task::spawn_blocking(move || -> crate::error::Result<Vec<u8>> {
        Ok(std::fs::read(&path)?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SplitPayload;
    use crate::signals::LogSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    enum Outcome<T> {
        Ok(T),
        Backend(String),
        Transport,
    }

    struct MockApi {
        upload: Outcome<UploadResponse>,
        split: Outcome<SplitPayload>,
        delay: Option<Duration>,
        upload_calls: Arc<AtomicUsize>,
        split_calls: Arc<AtomicUsize>,
        last_split_request: Arc<StdMutex<Option<SplitRequest>>>,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                upload: Outcome::Ok(sample_response()),
                split: Outcome::Ok(sample_payload()),
                delay: None,
                upload_calls: Arc::new(AtomicUsize::new(0)),
                split_calls: Arc::new(AtomicUsize::new(0)),
                last_split_request: Arc::new(StdMutex::new(None)),
            }
        }
    }

    impl SplitterApi for MockApi {
        async fn upload(&self, params: UploadParams) -> crate::error::Result<UploadResponse> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.upload {
                Outcome::Ok(resp) => {
                    params.progress.set(milestone::UPLOAD_HEADERS);
                    Ok(resp.clone())
                }
                Outcome::Backend(msg) => Err(AppError::Upload(msg.clone())),
                Outcome::Transport => Err(AppError::Internal("connection refused".to_string())),
            }
        }

        async fn split(&self, params: SplitParams) -> crate::error::Result<SplitPayload> {
            self.split_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_split_request.lock().unwrap() = Some(params.request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.split {
                Outcome::Ok(payload) => {
                    params.progress.set(milestone::SPLIT_HEADERS);
                    Ok(payload.clone())
                }
                Outcome::Backend(msg) => Err(AppError::Split(msg.clone())),
                Outcome::Transport => Err(AppError::Internal("connection refused".to_string())),
            }
        }
    }

    struct MemorySink {
        saves: StdMutex<Vec<(String, Vec<u8>)>>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                saves: StdMutex::new(Vec::new()),
            }
        }

        fn saves(&self) -> Vec<(String, Vec<u8>)> {
            self.saves.lock().unwrap().clone()
        }
    }

    impl DownloadSink for MemorySink {
        fn save(&self, file_name: &str, data: Vec<u8>) -> crate::error::Result<PathBuf> {
            self.saves
                .lock()
                .unwrap()
                .push((file_name.to_string(), data));
            Ok(PathBuf::from("/downloads").join(file_name))
        }
    }

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn save(&self, _file_name: &str, _data: Vec<u8>) -> crate::error::Result<PathBuf> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    struct RecordingSignals {
        signals: StdMutex<Vec<WorkflowSignal>>,
    }

    impl RecordingSignals {
        fn new() -> Self {
            Self {
                signals: StdMutex::new(Vec::new()),
            }
        }

        fn snapshot(&self) -> Vec<WorkflowSignal> {
            self.signals.lock().unwrap().clone()
        }
    }

    impl SignalSink for RecordingSignals {
        fn emit(&self, signal: WorkflowSignal) {
            self.signals.lock().unwrap().push(signal);
        }
    }

    fn sample_response() -> UploadResponse {
        UploadResponse {
            session_id: "s-1".to_string(),
            temp_file: "/tmp/s-1.xlsx".to_string(),
            filename: "report.xlsx".to_string(),
            sheets: vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()],
        }
    }

    fn sample_payload() -> SplitPayload {
        SplitPayload {
            file_name: "Jan_Feb.xlsx".to_string(),
            data: vec![5, 6, 7],
        }
    }

    fn xlsx_file(dir: &tempfile::TempDir) -> FileEntry {
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, b"workbook bytes").unwrap();
        FileEntry::from_path(&path).unwrap()
    }

    fn controller_with(
        api: MockApi,
        downloads: Arc<dyn DownloadSink>,
        signals: Arc<dyn SignalSink>,
    ) -> WorkflowController<MockApi> {
        WorkflowController::new(api, downloads, signals)
            .with_delays(Duration::from_millis(60), Duration::from_millis(30))
    }

    fn controller(api: MockApi) -> WorkflowController<MockApi> {
        controller_with(api, Arc::new(MemorySink::new()), Arc::new(LogSink))
    }

    #[tokio::test]
    async fn upload_success_reaches_ready_with_all_sheets_selected() {
        let dir = tempfile::tempdir().unwrap();
        let ctrl = controller(MockApi::new());

        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        let sheets = ctrl.sheets().await;
        assert_eq!(
            sheets.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["Jan", "Feb", "Mar"]
        );
        assert!(sheets.iter().all(|e| e.checked));
        assert_eq!(ctrl.selected_count().await, 3);
        assert_eq!(ctrl.session().await.unwrap().session_id, "s-1");
        assert_eq!(ctrl.progress(), 100);
        assert!(ctrl.message().await.is_none());

        // The progress bar clears after the short display delay.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(ctrl.progress(), 0);
        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
    }

    #[tokio::test]
    async fn upload_validation_failure_makes_no_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not a workbook").unwrap();

        let api = MockApi::new();
        let upload_calls = api.upload_calls.clone();
        let ctrl = controller(api);

        let result = ctrl.upload(FileEntry::from_path(&path).unwrap()).await;
        match result.unwrap_err() {
            AppError::Validation(_) => {}
            other => panic!("Expected AppError::Validation, got: {:?}", other),
        }
        assert_eq!(upload_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctrl.phase().await, WorkflowPhase::Idle);
        assert!(ctrl.message().await.unwrap().is_error());
    }

    #[tokio::test]
    async fn upload_backend_failure_returns_to_idle_with_backend_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockApi::new();
        api.upload = Outcome::Backend("corrupt workbook".to_string());
        let ctrl = controller(api);

        let result = ctrl.upload(xlsx_file(&dir)).await;
        assert!(result.is_err());

        assert_eq!(ctrl.phase().await, WorkflowPhase::Idle);
        assert!(ctrl.session().await.is_none());
        assert!(ctrl.sheets().await.is_empty());
        assert_eq!(ctrl.progress(), 0);
        assert_eq!(
            ctrl.message().await,
            Some(StatusMessage::Error("corrupt workbook".to_string()))
        );
    }

    #[tokio::test]
    async fn upload_transport_failure_uses_generic_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockApi::new();
        api.upload = Outcome::Transport;
        let ctrl = controller(api);

        assert!(ctrl.upload(xlsx_file(&dir)).await.is_err());
        assert_eq!(
            ctrl.message().await,
            Some(StatusMessage::Error("file upload failed".to_string()))
        );
        assert_eq!(ctrl.phase().await, WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn selection_operations_update_the_selected_count() {
        let dir = tempfile::tempdir().unwrap();
        let ctrl = controller(MockApi::new());
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        ctrl.deselect_all().await.unwrap();
        assert_eq!(ctrl.selected_count().await, 0);

        ctrl.toggle("Feb").await.unwrap();
        assert_eq!(ctrl.selected_count().await, 1);

        ctrl.select_all().await.unwrap();
        assert_eq!(ctrl.selected_count().await, 3);
    }

    #[tokio::test]
    async fn split_with_empty_selection_is_a_local_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let split_calls = api.split_calls.clone();
        let ctrl = controller(api);
        ctrl.upload(xlsx_file(&dir)).await.unwrap();
        ctrl.deselect_all().await.unwrap();

        let result = ctrl.split().await;
        match result.unwrap_err() {
            AppError::EmptySelection => {}
            other => panic!("Expected AppError::EmptySelection, got: {:?}", other),
        }
        assert_eq!(split_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        assert_eq!(
            ctrl.message().await.unwrap().text(),
            "select at least one sheet to split"
        );
    }

    #[tokio::test]
    async fn split_without_an_uploaded_file_is_rejected_locally() {
        let api = MockApi::new();
        let split_calls = api.split_calls.clone();
        let ctrl = controller(api);

        let result = ctrl.split().await;
        match result.unwrap_err() {
            AppError::Internal(_) => {}
            other => panic!("Expected AppError::Internal, got: {:?}", other),
        }
        assert_eq!(split_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn split_sends_session_verbatim_and_sheets_in_backend_order() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let last_request = api.last_split_request.clone();
        let ctrl = controller(api);
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        // Select Mar then Jan; the request must still list Jan first.
        ctrl.deselect_all().await.unwrap();
        ctrl.toggle("Mar").await.unwrap();
        ctrl.toggle("Jan").await.unwrap();
        ctrl.split().await.unwrap();

        let request = last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.session_id, "s-1");
        assert_eq!(request.temp_file, "/tmp/s-1.xlsx");
        assert_eq!(request.filename, "report.xlsx");
        assert_eq!(request.sheets, vec!["Jan", "Mar"]);
    }

    #[tokio::test]
    async fn split_success_saves_exact_bytes_once_then_fully_resets() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MemorySink::new());
        let ctrl = controller_with(MockApi::new(), sink.clone(), Arc::new(LogSink));
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        ctrl.split().await.unwrap();

        let saves = sink.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "Jan_Feb.xlsx");
        assert_eq!(saves[0].1, vec![5, 6, 7]);

        // Success message names the number of sheets split.
        let message = ctrl.message().await.unwrap();
        assert!(!message.is_error());
        assert!(message.text().contains('3'), "got: {}", message.text());
        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        assert_eq!(ctrl.progress(), 100);

        // After the display delay the workflow is back to a clean slate.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ctrl.phase().await, WorkflowPhase::Idle);
        assert!(ctrl.session().await.is_none());
        assert!(ctrl.sheets().await.is_empty());
        assert_eq!(ctrl.progress(), 0);
        assert!(ctrl.message().await.is_none());
    }

    #[tokio::test]
    async fn split_failure_preserves_session_and_selection_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockApi::new();
        api.split = Outcome::Backend("temp file expired".to_string());
        let ctrl = controller(api);
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        assert!(ctrl.split().await.is_err());

        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        assert_eq!(ctrl.session().await.unwrap().session_id, "s-1");
        assert_eq!(ctrl.selected_count().await, 3);
        assert_eq!(ctrl.progress(), 0);
        assert_eq!(
            ctrl.message().await,
            Some(StatusMessage::Error("temp file expired".to_string()))
        );
    }

    #[tokio::test]
    async fn failed_save_is_reported_and_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let ctrl = controller_with(MockApi::new(), Arc::new(FailingSink), Arc::new(LogSink));
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        let result = ctrl.split().await;
        match result.unwrap_err() {
            AppError::Io(_) => {}
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        assert!(ctrl.session().await.is_some());
        assert_eq!(
            ctrl.message().await,
            Some(StatusMessage::Error(
                "could not save the downloaded file".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn triggers_are_rejected_while_an_operation_is_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockApi::new();
        api.delay = Some(Duration::from_millis(100));
        let upload_calls = api.upload_calls.clone();
        let ctrl = Arc::new(controller(api));

        let first = {
            let ctrl = ctrl.clone();
            let file = xlsx_file(&dir);
            tokio::spawn(async move { ctrl.upload(file).await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ctrl.phase().await, WorkflowPhase::Uploading);

        let second = ctrl.upload(xlsx_file(&dir)).await;
        assert!(matches!(second.unwrap_err(), AppError::Busy));
        assert!(matches!(
            ctrl.toggle("Jan").await.unwrap_err(),
            AppError::Busy
        ));
        assert!(matches!(ctrl.split().await.unwrap_err(), AppError::Busy));
        assert!(matches!(ctrl.reset().await.unwrap_err(), AppError::Busy));
        assert_eq!(upload_calls.load(Ordering::SeqCst), 1);

        first.await.unwrap().unwrap();
        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
    }

    #[tokio::test]
    async fn upload_during_post_split_delay_supersedes_the_pending_reset() {
        let dir = tempfile::tempdir().unwrap();
        let ctrl = controller(MockApi::new());
        ctrl.upload(xlsx_file(&dir)).await.unwrap();
        ctrl.split().await.unwrap();

        // Start a new cycle before the 60ms reset fires; it must cancel the
        // pending reset instead of being wiped by it.
        ctrl.upload(xlsx_file(&dir)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(ctrl.phase().await, WorkflowPhase::Ready);
        assert!(ctrl.session().await.is_some());
        assert_eq!(ctrl.selected_count().await, 3);
    }

    #[tokio::test]
    async fn reset_returns_to_a_clean_idle_state() {
        let dir = tempfile::tempdir().unwrap();
        let ctrl = controller(MockApi::new());
        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        ctrl.reset().await.unwrap();

        assert_eq!(ctrl.phase().await, WorkflowPhase::Idle);
        assert!(ctrl.session().await.is_none());
        assert!(ctrl.sheets().await.is_empty());
        assert_eq!(ctrl.progress(), 0);
        assert!(ctrl.message().await.is_none());
    }

    #[tokio::test]
    async fn upload_emits_the_milestone_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let signals = Arc::new(RecordingSignals::new());
        let ctrl = controller_with(MockApi::new(), Arc::new(MemorySink::new()), signals.clone());

        ctrl.upload(xlsx_file(&dir)).await.unwrap();

        let progress: Vec<u8> = signals
            .snapshot()
            .into_iter()
            .filter_map(|s| match s {
                WorkflowSignal::Progress(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![10, 50, 100]);

        let snapshot = signals.snapshot();
        assert!(snapshot.contains(&WorkflowSignal::Phase(WorkflowPhase::Uploading)));
        assert!(snapshot.contains(&WorkflowSignal::Phase(WorkflowPhase::Ready)));
        assert!(snapshot
            .iter()
            .any(|s| matches!(s, WorkflowSignal::SheetsDiscovered(entries) if entries.len() == 3)));
    }

    #[tokio::test]
    async fn read_file_data_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let data = read_file_data(path.to_str().unwrap()).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn read_file_data_missing_file_is_io_error() {
        let result = read_file_data("/nonexistent/path/file.xlsx").await;
        match result.unwrap_err() {
            AppError::Io(_) => {}
            other => panic!("Expected AppError::Io, got: {:?}", other),
        }
    }
}

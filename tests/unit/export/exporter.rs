use std::sync::atomic::AtomicUsize;

use super::*;
use crate::{
    assets::{decode::PreparedImage, fonts::FontSet},
    card::model::{Batch, CardModel, LogoRef},
    foundation::core::Canvas,
};

struct SlowBackend {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowBackend {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

impl CaptureBackend for SlowBackend {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn capture(&self, _node: &CardNode) -> CardResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

struct BrokenBackend;

impl CaptureBackend for BrokenBackend {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn capture(&self, _node: &CardNode) -> CardResult<Vec<u8>> {
        Err(CardError::capture("surface lost"))
    }
}

fn fonts() -> Arc<FontSet> {
    Arc::new(FontSet::empty())
}

fn node(company: &str) -> CardNode {
    let model = CardModel::new(company, "https://acme.io", Batch::Summer2027);
    CardNode::compose(model, Canvas::new(600, 315).unwrap(), &fonts())
}

#[test]
fn file_name_replaces_whitespace_runs() {
    assert_eq!(export_file_name("Acme"), "Acme_yc_card.png");
    assert_eq!(export_file_name("Acme Labs"), "Acme_Labs_yc_card.png");
    assert_eq!(export_file_name("Acme \t  Labs  Inc"), "Acme_Labs_Inc_yc_card.png");
}

#[test]
fn file_name_never_contains_path_separators() {
    assert_eq!(export_file_name("AC/DC"), "AC_DC_yc_card.png");
    assert_eq!(export_file_name("a\\b:c*d?"), "a_b_c_d__yc_card.png");
    assert_eq!(export_file_name("Acme\u{1}Labs"), "Acme_Labs_yc_card.png");
    let escaped = export_file_name("../../../tmp/escape");
    assert!(!escaped.contains('/'));
    assert_eq!(
        std::path::Path::new(&escaped).file_name(),
        Some(std::ffi::OsStr::new(&escaped))
    );
}

#[tokio::test]
async fn export_saves_under_the_company_file_name() {
    let sink = Arc::new(MemorySink::new());
    let exporter = Exporter::new(Arc::new(SvgCapture::new(fonts())), sink.clone());

    let outcome = exporter.export(&node("Acme Labs")).await;
    assert_eq!(
        outcome,
        ExportOutcome::Saved {
            file_name: "Acme_Labs_yc_card.png".to_string(),
            path: PathBuf::from("Acme_Labs_yc_card.png"),
        }
    );
    let files = sink.files();
    assert_eq!(files.len(), 1);
    let img = image::load_from_memory(&files[0].1).unwrap();
    assert_eq!((img.width(), img.height()), (600, 315));
    assert!(!exporter.in_progress());
}

#[tokio::test]
async fn concurrent_export_is_reported_busy() {
    let backend = Arc::new(SlowBackend::new(Duration::from_millis(300)));
    let sink = Arc::new(MemorySink::new());
    let exporter = Exporter::new(backend.clone(), sink.clone());
    let n = node("Acme");

    let probe = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let busy = exporter.in_progress();
        (busy, exporter.export(&n).await)
    };
    let (first, (was_busy, second)) = tokio::join!(exporter.export(&n), probe);

    assert!(matches!(first, ExportOutcome::Saved { .. }));
    assert!(was_busy);
    assert_eq!(second, ExportOutcome::Busy);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.files().len(), 1);
    assert!(!exporter.in_progress());
}

#[tokio::test]
async fn failure_is_reported_and_clears_the_flag() {
    let exporter = Exporter::new(Arc::new(BrokenBackend), Arc::new(MemorySink::new()));
    let outcome = exporter.export(&node("Acme")).await;
    assert!(matches!(outcome, ExportOutcome::Failed(ref reason) if reason.contains("surface lost")));
    assert!(!exporter.in_progress());

    // A later export is not blocked.
    let again = exporter.export(&node("Acme")).await;
    assert!(matches!(again, ExportOutcome::Failed(_)));
}

#[tokio::test]
async fn slow_capture_times_out() {
    let exporter = Exporter::new(
        Arc::new(SlowBackend::new(Duration::from_millis(400))),
        Arc::new(MemorySink::new()),
    )
    .with_timeout(Duration::from_millis(50));
    let outcome = exporter.export(&node("Acme")).await;
    assert!(matches!(outcome, ExportOutcome::Failed(ref reason) if reason.contains("timed out")));
    assert!(!exporter.in_progress());
}

#[tokio::test]
async fn pending_logo_is_an_incomplete_paint() {
    let model = CardModel::new("Acme", "https://acme.io", Batch::Summer2027)
        .with_logo(LogoRef::Url("https://acme.io/logo.png".to_string()));
    let pending = CardNode::compose(model, Canvas::OG, &fonts());
    assert_eq!(pending.logo_state(), &LogoState::Pending);
    assert!(!pending.is_fully_painted());

    for backend in [
        Arc::new(SvgCapture::new(fonts())) as Arc<dyn CaptureBackend>,
        Arc::new(CpuCapture::new(fonts())) as Arc<dyn CaptureBackend>,
    ] {
        let exporter = Exporter::new(backend, Arc::new(MemorySink::new()));
        let outcome = exporter.export(&pending).await;
        assert!(
            matches!(outcome, ExportOutcome::Failed(ref reason) if reason.contains("incomplete paint")),
            "{outcome:?}"
        );
    }
}

#[tokio::test]
async fn failed_logo_still_exports_with_placeholder() {
    let model = CardModel::new("Acme", "https://acme.io", Batch::Summer2027)
        .with_logo(LogoRef::Bytes(Arc::new(vec![1, 2, 3])));
    let mut n = CardNode::compose(model, Canvas::OG, &fonts());
    n.load_logo(&crate::assets::logo::LogoFetcher::default()).await;
    assert_eq!(n.logo_state(), &LogoState::Failed);
    assert!(n.is_fully_painted());

    let exporter = Exporter::new(Arc::new(CpuCapture::new(fonts())), Arc::new(MemorySink::new()));
    assert!(matches!(exporter.export(&n).await, ExportOutcome::Saved { .. }));
}

#[tokio::test]
async fn directory_sink_writes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exports");
    let mut n = node("Acme Labs");
    n.set_logo_state(LogoState::Loaded(PreparedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 128, 0, 255]),
    }));
    let exporter = Exporter::new(
        Arc::new(CpuCapture::new(fonts())),
        Arc::new(DirectorySink::new(&out)),
    );
    let ExportOutcome::Saved { path, .. } = exporter.export(&n).await else {
        panic!("export failed");
    };
    assert_eq!(path, out.join("Acme_Labs_yc_card.png"));
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (600, 315));
}

#[test]
fn directory_sink_rejects_names_that_leave_the_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path().join("exports"));
    for name in ["../escape.png", "nested/card.png", "..", ""] {
        let err = sink.save(name, b"png").unwrap_err();
        assert!(matches!(err, CardError::Capture(_)), "{name}: {err}");
    }
    assert!(!dir.path().join("escape.png").exists());
    assert!(sink.save("card.png", b"png").is_ok());
}

#[tokio::test]
async fn hostile_company_names_export_inside_the_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exports");
    let exporter = Exporter::new(
        Arc::new(CpuCapture::new(fonts())),
        Arc::new(DirectorySink::new(&out)),
    );
    for company in ["AC/DC", "../../escape"] {
        let mut n = node(company);
        n.set_logo_state(LogoState::Failed);
        let ExportOutcome::Saved { path, .. } = exporter.export(&n).await else {
            panic!("export of '{company}' failed");
        };
        assert_eq!(path.parent(), Some(out.as_path()));
        assert!(path.exists());
    }
}

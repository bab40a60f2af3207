mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{admin_page, empty_frames, node, CountingCamera, FrameScript};
use fieldscan::{
    BarcodeDetector, ControllerState, DetectedCode, DetectionCapability, DetectorBackend,
    Document, ScanController, ScanError, ScanOutcome, ScanPlatform, ScanWidget, ScannerSettings,
    Symbology, UiEvent,
};

fn controller(
    doc: Arc<fieldscan::MemoryDocument>,
    camera: Arc<CountingCamera>,
    detector: Option<DetectionCapability>,
    widget: ScanWidget,
) -> ScanController {
    fieldscan::init_logging();
    let platform = ScanPlatform::new(doc, camera, detector);
    ScanController::new(platform, widget, ScannerSettings::default())
}

fn native(script: Arc<FrameScript>) -> Option<DetectionCapability> {
    let detector: Arc<dyn BarcodeDetector> = script;
    DetectionCapability::resolve(Some(detector), None, &Symbology::RETAIL)
}

#[tokio::test(start_paused = true)]
async fn scan_fills_the_row_field_and_submits_once() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::default());
    let mut frames = empty_frames(3);
    frames.push(vec![DetectedCode::new(Symbology::Ean13, "4006381333931")]);
    let script = Arc::new(FrameScript::new(frames));
    let controller = controller(
        doc.clone(),
        camera.clone(),
        native(script.clone()),
        ScanWidget::nearest(node("preview")),
    );

    let outcome = controller.trigger(node("scanA")).await;

    assert_eq!(outcome, ScanOutcome::Found("4006381333931".into()));
    assert_eq!(doc.value(&node("fieldA")).as_deref(), Some("4006381333931"));
    assert_eq!(doc.activations(&node("submitButtonB")), 1);
    assert_eq!(doc.activations(&node("search-submit")), 0);
    assert_eq!(script.calls(), 4);
    assert_eq!(camera.requests(), 1);
    assert_eq!(camera.stops(), 1);
    assert_ne!(doc.style(&node("preview"), "display").as_deref(), Some("flex"));
    assert_eq!(controller.state(), ControllerState::Delivered);
}

#[tokio::test(start_paused = true)]
async fn search_bar_uses_its_fixed_pair() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::default());
    let script = Arc::new(FrameScript::new(vec![vec![
        DetectedCode::new(Symbology::UpcA, "036000291452"),
        DetectedCode::new(Symbology::UpcE, "01234565"),
    ]]));
    let controller = controller(
        doc.clone(),
        camera,
        native(script),
        ScanWidget::fixed(node("preview"), node("searchbar"), node("search-submit")),
    );

    let outcome = controller.trigger(node("search-scan")).await;

    assert_eq!(outcome, ScanOutcome::Found("036000291452".into()));
    assert_eq!(doc.value(&node("searchbar")).as_deref(), Some("036000291452"));
    assert_eq!(doc.activations(&node("search-submit")), 1);
}

#[tokio::test(start_paused = true)]
async fn polyfill_stands_in_for_missing_native_detector() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::default());
    let broken: Arc<dyn BarcodeDetector> = Arc::new(FrameScript::new(vec![]).without_probe());
    let polyfill: Arc<dyn BarcodeDetector> = Arc::new(FrameScript::new(vec![vec![
        DetectedCode::new(Symbology::UpcA, "036000291452"),
        DetectedCode::new(Symbology::Ean13, "4006381333931"),
    ]]));
    let capability = DetectionCapability::resolve(Some(broken), Some(polyfill), &Symbology::RETAIL);
    assert_eq!(
        capability.as_ref().map(DetectionCapability::backend),
        Some(DetectorBackend::Polyfill)
    );

    let controller = controller(
        doc.clone(),
        camera,
        capability,
        ScanWidget::nearest(node("preview")),
    );
    let outcome = controller.trigger(node("scanA")).await;

    assert_eq!(outcome, ScanOutcome::Found("4006381333931".into()));
}

#[tokio::test(start_paused = true)]
async fn no_detector_disables_the_trigger_without_camera() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::default());
    let controller = controller(
        doc.clone(),
        camera.clone(),
        None,
        ScanWidget::nearest(node("preview")),
    );

    let outcome = controller.trigger(node("scanA")).await;

    assert_eq!(outcome, ScanOutcome::Failed(ScanError::CapabilityMissing));
    assert_eq!(camera.requests(), 0);
    assert!(doc.attribute(&node("scanA"), "disabled").is_some());
    assert!(!doc.attribute(&node("scanA"), "title").unwrap_or_default().is_empty());
    assert_eq!(controller.state(), ControllerState::Disabled);
}

#[tokio::test(start_paused = true)]
async fn denied_camera_stays_disabled() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::denied());
    let script = Arc::new(FrameScript::new(vec![]));
    let controller = controller(
        doc.clone(),
        camera.clone(),
        native(script.clone()),
        ScanWidget::nearest(node("preview")),
    );

    let first = controller.trigger(node("scanA")).await;
    let second = controller.trigger(node("scanA")).await;

    assert!(matches!(first, ScanOutcome::Failed(ScanError::CameraUnavailable { .. })));
    assert_eq!(first, second);
    assert_eq!(camera.requests(), 1);
    assert_eq!(script.calls(), 0);
    assert_eq!(
        doc.attribute(&node("scanA"), "title").as_deref(),
        Some("Camera unavailable: camera permission denied")
    );
}

#[tokio::test(start_paused = true)]
async fn outside_click_cancels_without_writing() {
    let doc = admin_page();
    let camera = Arc::new(CountingCamera::default());
    let script = Arc::new(FrameScript::new(vec![]));
    let controller = controller(
        doc.clone(),
        camera.clone(),
        native(script),
        ScanWidget::nearest(node("preview")),
    );
    let host = controller.clone();

    let (outcome, fired) = tokio::join!(controller.trigger(node("scanA")), async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        let inside = host.handle_event(&UiEvent::pointer_down("video"));
        let outside = host.handle_event(&UiEvent::pointer_down("header"));
        let again = host.handle_event(&UiEvent::pointer_down("header"));
        (inside, outside, again)
    });

    assert_eq!(fired, (0, 1, 0));
    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(controller.state(), ControllerState::Dismissed);
    assert_eq!(doc.value(&node("fieldA")).as_deref(), Some(""));
    assert_eq!(doc.activations(&node("submitButtonB")), 0);
    assert_eq!(camera.stops(), 1);
}

//! The process-wide `get_lip_sync` façade.
//!
//! Everything lives in one test because the global client can only be
//! configured once per process.

use base64::Engine as _;
use lip_sync::config::{EngineBackend, EngineConfig, LipSyncConfig};
use lip_sync::{configure_global, get_lip_sync, AudioInput, LipSyncError, RecognitionOptions};

fn utterance_base64() -> String {
    let bytes: Vec<u8> = (0..8_000)
        .map(|i| ((i as f32 * 0.05).sin() * 4_000.0) as i16)
        .flat_map(i16::to_le_bytes)
        .collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[tokio::test]
async fn global_client_serves_every_call_from_one_engine() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = LipSyncConfig {
        engine: EngineConfig {
            backend: EngineBackend::Fixed,
            ..EngineConfig::default()
        },
    };
    assert!(configure_global(&config));
    assert!(!configure_global(&config), "second configuration must be refused");

    let audio = utterance_base64();

    let first = get_lip_sync(audio.as_str(), &RecognitionOptions::default())
        .await
        .expect("lip sync");
    assert!(!first.mouth_cues.is_empty());
    assert_eq!(first.mouth_cues[0].start, 0.0);
    assert!(first.is_well_ordered());

    let engine = lip_sync::lipsync::global_client()
        .loader()
        .current()
        .expect("engine constructed");

    let hinted = get_lip_sync(audio.clone(), &RecognitionOptions::with_dialog_text("hello"))
        .await
        .expect("lip sync with dialog text");
    assert!(!hinted.mouth_cues.is_empty());
    assert!(hinted.is_well_ordered());

    let again = get_lip_sync(AudioInput::Base64Pcm(audio), &RecognitionOptions::default())
        .await
        .expect("repeat");
    assert_eq!(first, again);

    let still = lip_sync::lipsync::global_client()
        .loader()
        .current()
        .expect("engine constructed");
    assert!(std::sync::Arc::ptr_eq(&engine, &still));

    let err = get_lip_sync("invalid-base64-data", &RecognitionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LipSyncError::InvalidAudio(_)));
}

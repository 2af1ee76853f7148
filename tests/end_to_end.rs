//! End-to-end tests: capture file -> replay source -> driver -> session -> stream

use bleamit::sources::{Capture, ChannelSource, ReplaySource};
use bleamit::{
    AdvertisementFrame, ChannelSink, DecodedColor, DedupPolicy, Driver, DriverExit, ScanConfig,
    ScanSession, ScanStatus,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

const CAPTURE: &str = r#"
description: lamp cycling red -> green with a neighbour phone in range
frames:
  - { device: "C4:7F:51:0A:22:9E", payload: [171, 255, 0, 0], rssi: -58, offset_ms: 0 }
  - { device: "7A:10:FE:33:01:BB", manufacturer_id: 76, payload: [16, 5, 1, 24], rssi: -80, offset_ms: 15 }
  - { device: "C4:7F:51:0A:22:9E", payload: [171, 255, 0, 0], rssi: -57, offset_ms: 100 }
  - { device: "C4:7F:51:0A:22:9E", payload: [171, 255, 0, 0], rssi: -59, offset_ms: 200 }
  - { device: "C4:7F:51:0A:22:9E", payload: [171, 0, 255, 0], rssi: -58, offset_ms: 300 }
  - { device: "C4:7F:51:0A:22:9E", payload: [171, 0, 255, 0], rssi: -58, offset_ms: 1400 }
"#;

fn write_capture(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("bleamit-{}-{}.yaml", name, std::process::id()));
    std::fs::write(&path, CAPTURE).expect("temp dir should be writable");
    path
}

#[tokio::test]
async fn capture_file_replays_into_update_stream() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let path = write_capture("replay");
    let source = ReplaySource::open(&path)?.unpaced();
    std::fs::remove_file(&path)?;

    let sink = Arc::new(ChannelSink::new(16));
    let updates = sink.updates();

    let session = Arc::new(ScanSession::new(ScanConfig::default()));
    session.subscribe(&sink);
    session.start()?;

    let summary = Driver::spawn(source, Arc::clone(&session)).join().await?;
    assert_eq!(summary.exit, DriverExit::SourceExhausted);
    assert_eq!(summary.frames, 6);

    drop(sink);
    let colors: Vec<DecodedColor> = updates.map(|u| u.color).collect().await;
    assert_eq!(
        colors,
        vec![
            DecodedColor::new(255, 0, 0),
            DecodedColor::new(0, 255, 0),
            DecodedColor::new(0, 255, 0),
        ]
    );

    let stats = session.stats();
    assert_eq!(stats.wrong_vendor, 1);
    assert_eq!(stats.suppressed, 2);
    Ok(())
}

#[tokio::test]
async fn per_color_policy_from_yaml_config() -> anyhow::Result<()> {
    let config = ScanConfig::from_yaml_str("window_ms: 5000\npolicy: per_color\n")?;
    assert_eq!(config.policy, DedupPolicy::PerColor);

    let session = Arc::new(ScanSession::new(config));
    let sink = Arc::new(ChannelSink::new(16));
    let updates = sink.updates();
    session.subscribe(&sink);
    session.start()?;

    let capture = Capture::from_yaml_str(CAPTURE)?;
    Driver::spawn(ReplaySource::new(capture).unpaced(), Arc::clone(&session)).join().await?;

    drop(sink);
    // The 5s window swallows the late green repeat
    assert_eq!(updates.count().await, 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn platform_threads_feed_a_driven_session() -> anyhow::Result<()> {
    let session = Arc::new(ScanSession::default());
    let sink = Arc::new(ChannelSink::new(256));
    let mut updates = sink.updates();
    session.subscribe(&sink);
    session.start()?;

    let (feeder, source) = ChannelSource::new();
    let driver = Driver::spawn(source, Arc::clone(&session));

    let callbacks: Vec<_> = (0..4u8)
        .map(|thread| {
            let feeder = feeder.clone();
            std::thread::spawn(move || {
                let now = Instant::now();
                for lamp in 0..25u8 {
                    let device = format!("lamp-{thread}-{lamp}");
                    feeder.push(AdvertisementFrame::new(device, 0xFFFF, vec![0xAB, thread, lamp, 0], -60, now));
                }
            })
        })
        .collect();
    for callback in callbacks {
        callback.join().expect("callback thread panicked");
    }

    let mut received = 0;
    while received < 100 {
        tokio::time::timeout(Duration::from_secs(5), updates.next()).await?.expect("stream open");
        received += 1;
    }

    session.stop()?;
    drop(feeder);
    let summary = driver.join().await?;
    assert_eq!(summary.reported, 100);
    assert_eq!(session.status(), ScanStatus::Stopped);
    Ok(())
}

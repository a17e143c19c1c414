//! Report delivery tests: frames written straight onto the socket pair.

#![cfg(unix)]

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use ld2410_client::{ClientConfig, ClientError, Ld2410};
use ld2410_frame::FrameKind;
use ld2410_protocol::{BasicReport, Report, TargetStatus};

fn connect() -> (Ld2410, UnixStream) {
    let (host, device) = UnixStream::pair().unwrap();
    host.set_read_timeout(Some(Duration::from_millis(25)))
        .unwrap();
    let reader = host.try_clone().unwrap();
    let client = Ld2410::from_parts(
        Box::new(reader),
        Box::new(host),
        ClientConfig {
            command_timeout: Some(Duration::from_millis(500)),
            ..ClientConfig::default()
        },
    )
    .unwrap();
    (client, device)
}

fn report(distance: u16) -> Report {
    Report {
        basic: BasicReport {
            target_status: TargetStatus(TargetStatus::MOTION),
            motion_distance: distance,
            motion_energy: 55,
            standstill_distance: 0,
            standstill_energy: 0,
            detection_distance: distance,
        },
        engineering: None,
    }
}

fn write_report(device: &mut UnixStream, report: &Report) {
    let mut body = BytesMut::new();
    report.encode(&mut body);
    let mut wire = BytesMut::new();
    ld2410_frame::encode_frame(FrameKind::Report, &body, &mut wire).unwrap();
    device.write_all(&wire).unwrap();
}

fn wait_for_latest(client: &Ld2410) -> Report {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(report) = client.last_report() {
            return report;
        }
        assert!(Instant::now() < deadline, "no report arrived");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn last_report_tracks_the_newest() {
    let (client, mut device) = connect();
    assert!(client.last_report().is_none());

    write_report(&mut device, &report(120));
    let first = wait_for_latest(&client);
    assert_eq!(first.basic.motion_distance, 120);

    write_report(&mut device, &report(80));
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let latest = client.last_report().unwrap();
        if latest.basic.motion_distance == 80 {
            break;
        }
        assert!(Instant::now() < deadline, "latest report never updated");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn next_report_waits_for_a_fresh_one() {
    let (client, mut device) = connect();
    write_report(&mut device, &report(100));
    wait_for_latest(&client);

    // The report already in the slot does not satisfy a fresh wait.
    let err = client
        .next_report_timeout(Duration::from_millis(50))
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));

    let client = Arc::new(client);
    let waiter = {
        let client = Arc::clone(&client);
        thread::spawn(move || client.next_report())
    };
    thread::sleep(Duration::from_millis(50));
    write_report(&mut device, &report(42));
    let got = waiter.join().unwrap().unwrap();
    assert_eq!(got.basic.motion_distance, 42);
}

#[test]
fn concurrent_waiters_all_receive_the_same_report() {
    let (client, mut device) = connect();
    let client = Arc::new(client);

    let mut waiters = Vec::new();
    for _ in 0..4 {
        let client = Arc::clone(&client);
        waiters.push(thread::spawn(move || client.next_report()));
    }
    thread::sleep(Duration::from_millis(50));
    write_report(&mut device, &report(77));

    for waiter in waiters {
        let got = waiter.join().unwrap().unwrap();
        assert_eq!(got.basic.detection_distance, 77);
    }
}

#[test]
fn report_interleaved_with_reply_reaches_both_paths() {
    // A report between a request write and its reply must not disturb
    // the pending wait.
    let (client, mut device) = connect();
    let client = Arc::new(client);

    let requester = {
        let client = Arc::clone(&client);
        thread::spawn(move || client.request(ld2410_protocol::CommandCode::FirmwareVersion, &[]))
    };

    // Let the request go out, then answer it with a report first.
    thread::sleep(Duration::from_millis(50));
    write_report(&mut device, &report(33));

    let mut body = BytesMut::new();
    ld2410_protocol::Reply::encode(
        ld2410_protocol::CommandCode::FirmwareVersion,
        ld2410_protocol::ReplyStatus::SUCCESS,
        &[0x00, 0x00, 0x07, 0x02, 0x00, 0x00, 0x00, 0x00],
        &mut body,
    );
    let mut wire = BytesMut::new();
    ld2410_frame::encode_frame(FrameKind::Command, &body, &mut wire).unwrap();
    device.write_all(&wire).unwrap();

    let payload = requester.join().unwrap().unwrap();
    assert_eq!(payload.len(), 8);
    assert_eq!(wait_for_latest(&client).basic.motion_distance, 33);
}

#[test]
fn waiters_unblock_on_disconnect() {
    let (client, device) = connect();
    let client = Arc::new(client);
    let waiter = {
        let client = Arc::clone(&client);
        thread::spawn(move || client.next_report())
    };
    thread::sleep(Duration::from_millis(50));
    drop(device);
    assert!(matches!(
        waiter.join().unwrap(),
        Err(ClientError::Disconnected)
    ));
}

#[test]
fn chunked_and_garbage_laden_stream_still_delivers() {
    let (client, mut device) = connect();

    let mut wire = Vec::new();
    wire.extend_from_slice(b"noise-from-the-boot-banner");
    let mut body = BytesMut::new();
    report(64).encode(&mut body);
    let mut frame = BytesMut::new();
    ld2410_frame::encode_frame(FrameKind::Report, &body, &mut frame).unwrap();
    wire.extend_from_slice(&frame);

    // Dribble it through in tiny chunks.
    for chunk in wire.chunks(3) {
        device.write_all(chunk).unwrap();
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(wait_for_latest(&client).basic.motion_distance, 64);
}

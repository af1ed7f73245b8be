//! Lock arbitration and capability flags.

use authfob::config::TokenConfig;
use authfob::hid::frame::encode_init;
use authfob::hid::{BROADCAST_CID, CAP_LOCK, CAP_WINK, Command, ErrorCode};

use crate::mock_fob::{
    TestFob, assert_error, init_report, lock_report, parse_init_reply, ping_report,
};

#[test]
fn capabilities_are_advertised_in_init() {
    let mut fob = TestFob::new();
    let reply = fob
        .send(init_report(BROADCAST_CID, &[0; 8]))
        .expect("INIT reply");
    let (_, _, _, caps) = parse_init_reply(&reply);
    assert_eq!(caps, CAP_WINK | CAP_LOCK);
}

#[test]
fn lock_blocks_other_channels_until_expiry() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    let granted = fob.send(lock_report(cid_a, 3)).expect("lock reply");
    assert_eq!(granted.cmd, u8::from(Command::Lock));
    assert!(granted.payload.is_empty());

    // Non-owner traffic bounces while the lock is live.
    fob.now_ms += 100;
    let busy = fob.send(ping_report(cid_b, &[1])).expect("busy");
    assert_error(&busy, ErrorCode::ChannelBusy);

    // The owner is unaffected.
    let echo = fob.send(ping_report(cid_a, &[2])).expect("echo");
    assert_eq!(echo.payload.as_slice(), &[2]);

    // Lock decays through inactivity (the owner's echo refreshed it).
    fob.now_ms += 3000;
    let echo = fob.send(ping_report(cid_b, &[3])).expect("echo");
    assert_eq!(echo.payload.as_slice(), &[3]);
}

#[test]
fn owner_traffic_refreshes_the_lock() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    assert!(!fob.send(lock_report(cid_a, 3)).expect("reply").is_error());

    // 2.5 s in, the owner pings: lease now runs to 5.5 s.
    fob.now_ms += 2500;
    assert!(!fob.send(ping_report(cid_a, &[0])).expect("echo").is_error());

    fob.now_ms += 2900; // t = 5.4 s
    let busy = fob.send(ping_report(cid_b, &[0])).expect("busy");
    assert_error(&busy, ErrorCode::ChannelBusy);

    fob.now_ms += 100; // t = 5.5 s
    let echo = fob.send(ping_report(cid_b, &[0])).expect("echo");
    assert!(!echo.is_error());
}

#[test]
fn owner_unlock_releases_immediately() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    assert!(!fob.send(lock_report(cid_a, 3)).expect("reply").is_error());
    let released = fob.send(lock_report(cid_a, 0)).expect("unlock reply");
    assert_eq!(released.cmd, u8::from(Command::Lock));
    assert!(released.payload.is_empty());

    assert!(!fob.send(ping_report(cid_b, &[0])).expect("echo").is_error());
}

#[test]
fn init_is_never_blocked_by_a_lock() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    assert!(!fob.send(lock_report(cid_a, 3)).expect("reply").is_error());

    // Broadcast negotiation and per-channel re-sync both work while
    // another channel holds the lock.
    fob.now_ms += 100;
    let fresh = fob.init();
    assert_ne!(fresh, cid_a);
    let resync = fob.send(init_report(cid_b, &[7; 8])).expect("INIT reply");
    assert_eq!(resync.cid, cid_b);
    assert!(!resync.is_error());

    // But B's ordinary traffic is still locked out.
    let busy = fob.send(ping_report(cid_b, &[0])).expect("busy");
    assert_error(&busy, ErrorCode::ChannelBusy);
}

#[test]
fn foreign_lock_request_is_rejected_busy() {
    let mut fob = TestFob::new();
    let cid_a = fob.init();
    let cid_b = cid_a ^ 1;

    assert!(!fob.send(lock_report(cid_a, 3)).expect("reply").is_error());
    let busy = fob.send(lock_report(cid_b, 1)).expect("busy");
    assert_error(&busy, ErrorCode::ChannelBusy);
}

#[test]
fn lock_payload_must_be_one_byte() {
    let mut fob = TestFob::new();
    let cid = fob.init();

    let malformed = encode_init(cid, Command::Lock.into(), 2, &[3, 0]);
    let reply = fob.send(malformed).expect("error");
    assert_error(&reply, ErrorCode::InvalidLen);
}

#[test]
fn lock_unsupported_devices_reject_and_do_not_advertise() {
    let config = TokenConfig {
        lock_supported: false,
        ..TokenConfig::default()
    };
    let mut fob = TestFob::with_config(config);
    let cid = fob.init();

    let reply = fob
        .send(init_report(BROADCAST_CID, &[0; 8]))
        .expect("INIT reply");
    let (_, _, _, caps) = parse_init_reply(&reply);
    assert_eq!(caps & CAP_LOCK, 0);

    let rejected = fob.send(lock_report(cid, 3)).expect("error");
    assert_error(&rejected, ErrorCode::InvalidCmd);
}

#[test]
fn wink_blinks_when_supported() {
    let mut fob = TestFob::new();
    let cid = fob.init();

    let reply = fob
        .send(encode_init(cid, Command::Wink.into(), 0, &[]))
        .expect("wink reply");
    assert_eq!(reply.cmd, u8::from(Command::Wink));
    assert!(reply.payload.is_empty());
    assert_eq!(fob.app.winks, vec![cid]);
}

#[test]
fn wink_unsupported_devices_reject_and_do_not_advertise() {
    let config = TokenConfig {
        wink_supported: false,
        ..TokenConfig::default()
    };
    let mut fob = TestFob::with_config(config);
    let cid = fob.init();

    let reply = fob
        .send(init_report(BROADCAST_CID, &[0; 8]))
        .expect("INIT reply");
    let (_, _, _, caps) = parse_init_reply(&reply);
    assert_eq!(caps & CAP_WINK, 0);

    let rejected = fob
        .send(encode_init(cid, Command::Wink.into(), 0, &[]))
        .expect("error");
    assert_error(&rejected, ErrorCode::InvalidCmd);
    assert!(fob.app.winks.is_empty());
}
